//! HTTP client adapter
//!
//! Joins paths onto the configured base URL, attaches the API key the path
//! calls for, decodes JSON and turns failures into [`ApiError`]s.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use wm_domain::repository::HttpTransport;
use wm_domain::service::{detect_wtn, normalize_response, normalize_transport, select_key};
use wm_types::{ApiError, Error, HttpMethod, HttpRequest, Result, API_KEY_HEADER};

use crate::config::{normalize_base_url, Config};
use crate::wtn::WtnChannel;

/// Which key a request carries
#[derive(Debug, Clone, Copy)]
enum KeyChoice<'a> {
    /// Chosen from the path
    Policy,
    /// Chosen by the caller; `None` or empty sends no key
    Explicit(Option<&'a str>),
}

#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    driver_key: Option<String>,
    admin_key: Option<String>,
    wtn: Option<Arc<WtnChannel>>,
}

impl ApiClient {
    pub fn new(config: &Config, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            base_url: normalize_base_url(&config.base_url),
            driver_key: config.driver_key.clone(),
            admin_key: config.admin_key.clone(),
            wtn: None,
        }
    }

    /// Publish generated waste transfer notes to `channel`
    pub fn with_wtn_channel(mut self, channel: Arc<WtnChannel>) -> Self {
        self.wtn = Some(channel);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn driver_key(&self) -> Option<&str> {
        self.driver_key.as_deref()
    }

    pub fn admin_key(&self) -> Option<&str> {
        self.admin_key.as_deref()
    }

    /// Absolute URL for `path`
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Send one request with the key the path calls for
    pub fn request(&self, method: HttpMethod, path: &str, body: Option<&Value>) -> std::result::Result<Value, ApiError> {
        self.execute(method, path, body, KeyChoice::Policy)
    }

    /// Send one request with a caller-chosen key
    pub fn request_with_key(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&Value>,
        key: Option<&str>,
    ) -> std::result::Result<Value, ApiError> {
        self.execute(method, path, body, KeyChoice::Explicit(key))
    }

    fn execute(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&Value>,
        key: KeyChoice<'_>,
    ) -> std::result::Result<Value, ApiError> {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        let url = self.url(&path);

        let mut request = HttpRequest::new(method, url.clone());
        let key = match key {
            KeyChoice::Policy => select_key(&path, self.driver_key(), self.admin_key()),
            KeyChoice::Explicit(k) => k.filter(|k| !k.trim().is_empty()),
        };
        if let Some(key) = key {
            request = request.header(API_KEY_HEADER, key);
        }
        match (method, body) {
            (_, Some(body)) => {
                request = request
                    .header("Content-Type", "application/json")
                    .body(body.to_string());
            }
            (HttpMethod::Post | HttpMethod::Patch, None) => {
                request = request
                    .header("Content-Type", "application/json")
                    .body("{}".to_string());
            }
            _ => {}
        }

        debug!("{} {}", method, path);
        let response = self.transport.send(&request).map_err(|e| {
            warn!("{} {} failed: {}", method, path, e);
            normalize_transport(&e)
        })?;
        debug!("{} {} -> {}", method, path, response.status);

        if !response.is_success() {
            return Err(normalize_response(&response));
        }

        let value = if response.body.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&response.body).unwrap_or_else(|_| Value::String(response.body.clone()))
        };

        if let Some(channel) = &self.wtn {
            if let Some(ready) = detect_wtn(&url, &value) {
                channel.publish(ready);
            }
        }
        Ok(value)
    }

    pub(crate) fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        decode(self.request(HttpMethod::Get, path, None)?)
    }

    pub(crate) fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let body = serde_json::to_value(body)?;
        decode(self.request(HttpMethod::Post, path, Some(&body))?)
    }

    pub(crate) fn patch<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let body = serde_json::to_value(body)?;
        decode(self.request(HttpMethod::Patch, path, Some(&body))?)
    }

    pub(crate) fn delete(&self, path: &str) -> Result<Value> {
        Ok(self.request(HttpMethod::Delete, path, None)?)
    }
}

/// Decode a response body into its typed shape
pub(crate) fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| Error::UnexpectedResponse(e.to_string()))
}

/// `path?k=v&...` with values percent-encoded
pub fn with_query(path: &str, params: &[(&str, &str)]) -> String {
    if params.is_empty() {
        return path.to_string();
    }
    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    format!("{path}?{query}")
}

/// Percent-encode one path segment
pub(crate) fn segment(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}
