//! Scripted transport and console fixtures shared by the integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use wm_app::config::{ConfigStore, CONFIG_KEY};
use wm_app::Console;
use wm_domain::repository::{HttpTransport, KeyValueStore};
use wm_domain::service::Toaster;
use wm_infra::MemoryKeyValueStore;
use wm_types::{HttpMethod, HttpRequest, HttpResponse, TransportError};

pub const BASE: &str = "http://api.test";

struct Rule {
    method: HttpMethod,
    path: String,
    status: u16,
    body: String,
    remaining: Option<usize>,
}

/// Answers requests from a rule table and records every request.
///
/// A rule path without `?` matches any query string. Rules are tried in
/// insertion order; `once` rules are used up after one match. Unmatched
/// requests get a FastAPI-style 404.
#[derive(Default)]
pub struct ScriptedTransport {
    rules: Mutex<Vec<Rule>>,
    seen: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn add(&self, method: HttpMethod, path: &str, status: u16, body: &str, remaining: Option<usize>) {
        self.rules.lock().unwrap().push(Rule {
            method,
            path: path.to_string(),
            status,
            body: body.to_string(),
            remaining,
        });
    }

    pub fn on(&self, method: HttpMethod, path: &str, status: u16, body: &str) -> &Self {
        self.add(method, path, status, body, None);
        self
    }

    pub fn once(&self, method: HttpMethod, path: &str, status: u16, body: &str) -> &Self {
        self.add(method, path, status, body, Some(1));
        self
    }

    /// Requests as `"METHOD /path?query"`
    pub fn calls(&self) -> Vec<String> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .map(|r| format!("{} {}", r.method, r.url.trim_start_matches(BASE)))
            .collect()
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.seen.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }
}

impl HttpTransport for ScriptedTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.seen.lock().unwrap().push(request.clone());
        let target = request.url.trim_start_matches(BASE).to_string();
        let bare = target.split('?').next().unwrap_or_default().to_string();

        let mut rules = self.rules.lock().unwrap();
        let hit = rules.iter_mut().find(|rule| {
            rule.method == request.method
                && rule.remaining != Some(0)
                && if rule.path.contains('?') {
                    rule.path == target
                } else {
                    rule.path == bare
                }
        });
        let (status, body) = match hit {
            Some(rule) => {
                if let Some(n) = rule.remaining.as_mut() {
                    *n -= 1;
                }
                (rule.status, rule.body.clone())
            }
            None => (404, r#"{"detail":"Not Found"}"#.to_string()),
        };
        Ok(HttpResponse {
            status,
            content_type: Some("application/json".to_string()),
            body,
        })
    }
}

/// Store holding a config pointed at [`BASE`] with both keys set
pub fn seeded_store(driver_ref: Option<&str>) -> Arc<MemoryKeyValueStore> {
    let mut blob = serde_json::json!({
        "baseUrl": BASE,
        "driverKey": "drv-key",
        "adminKey": "adm-key",
    });
    if let Some(r) = driver_ref {
        blob["driverName"] = serde_json::Value::String(r.to_string());
    }
    Arc::new(MemoryKeyValueStore::with_entries([(CONFIG_KEY, blob.to_string())]))
}

pub fn console_with(store: Arc<dyn KeyValueStore>, transport: Arc<ScriptedTransport>) -> Console {
    Console::with_config_store(
        ConfigStore::with_default_base(store, None),
        transport,
        Toaster::manual(),
    )
}

pub fn console(transport: Arc<ScriptedTransport>) -> Console {
    console_with(seeded_store(None), transport)
}

/// Messages of the toasts currently shown, newest first
pub fn toast_messages(console: &Console) -> Vec<String> {
    console
        .toaster()
        .snapshot()
        .into_iter()
        .filter_map(|t| t.message)
        .collect()
}
