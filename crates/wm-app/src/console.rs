//! Console session
//!
//! Holds the loaded config and the client built from it, the toast queue,
//! the rolling result log and the cached master lists. Every call a user
//! triggers goes through [`Console::run`], which records the outcome in the
//! log and raises a toast.

use std::cell::RefCell;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info};
use wm_domain::model::Candidate;
use wm_domain::repository::{DirectoryFn, HttpTransport, KeyValueStore, UrlOpener};
use wm_domain::service::{ResultLog, Resolver, Toaster};
use wm_types::{
    ApiError, Contractor, Driver, EntityKind, Error, MetaConfig, ResolveError, Result, Vehicle,
};

use crate::client::ApiClient;
use crate::config::{Config, ConfigStore, ConfigUpdate};
use crate::wtn::WtnChannel;

pub type SharedStore = Arc<dyn KeyValueStore>;

pub struct Console {
    configs: ConfigStore<SharedStore>,
    config: Config,
    overrides: ConfigUpdate,
    transport: Arc<dyn HttpTransport>,
    client: ApiClient,
    toaster: Toaster,
    results: ResultLog,
    wtn: Arc<WtnChannel>,
    pub(crate) drivers: Vec<Driver>,
    pub(crate) vehicles: Vec<Vehicle>,
    pub(crate) contractors: Vec<Contractor>,
    pub(crate) meta: Option<MetaConfig>,
    pub(crate) selected_driver: Option<String>,
    pub(crate) selected_vehicle: Option<String>,
}

impl Console {
    /// Session over `store`, reading `$WM_API_BASE` as the fallback base URL
    pub fn new(store: SharedStore, transport: Arc<dyn HttpTransport>, toaster: Toaster) -> Self {
        Self::with_config_store(ConfigStore::new(store), transport, toaster)
    }

    pub fn with_config_store(
        configs: ConfigStore<SharedStore>,
        transport: Arc<dyn HttpTransport>,
        toaster: Toaster,
    ) -> Self {
        let config = configs.load();

        let wtn = Arc::new(WtnChannel::new());
        wtn.set_auto_open(configs.wtn_auto_open());
        let prompt = toaster.clone();
        wtn.subscribe(move |ready| {
            prompt.info(ready.url.clone(), Some("WTN ready"), None);
        });

        let client = ApiClient::new(&config, transport.clone()).with_wtn_channel(wtn.clone());
        Self {
            configs,
            config,
            overrides: ConfigUpdate::default(),
            transport,
            client,
            toaster,
            results: ResultLog::default(),
            wtn,
            drivers: Vec::new(),
            vehicles: Vec::new(),
            contractors: Vec::new(),
            meta: None,
            selected_driver: None,
            selected_vehicle: None,
        }
    }

    /// Open generated WTN PDFs with `opener` when the preference allows it
    pub fn set_opener(&self, opener: Arc<dyn UrlOpener>) {
        self.wtn.set_opener(Some(opener));
    }

    /// Per-invocation values layered over the stored config, never saved
    pub fn apply_overrides(&mut self, overrides: ConfigUpdate) {
        self.overrides = overrides;
        self.rebuild();
    }

    fn rebuild(&mut self) {
        self.config = self.configs.load().merged(&self.overrides);
        self.client = ApiClient::new(&self.config, self.transport.clone())
            .with_wtn_channel(self.wtn.clone());
        debug!("client rebuilt for {}", self.config.base_url);
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn toaster(&self) -> &Toaster {
        &self.toaster
    }

    pub fn results(&self) -> &ResultLog {
        &self.results
    }

    pub fn wtn(&self) -> &WtnChannel {
        &self.wtn
    }

    /// Persist `update` and rebuild the client from the result
    pub fn save_config(&mut self, update: ConfigUpdate) -> Result<Config> {
        let saved = self.configs.save(&update)?;
        self.rebuild();
        self.results.push("Saved config", saved.redacted());
        self.toaster.success("Configuration saved", None, None);
        Ok(saved)
    }

    pub fn reset_config(&mut self) -> Result<()> {
        self.configs.reset()?;
        self.rebuild();
        info!("configuration reset");
        self.toaster.info("Configuration reset", None, None);
        Ok(())
    }

    pub fn wtn_auto_open(&self) -> bool {
        self.configs.wtn_auto_open()
    }

    pub fn set_wtn_auto_open(&mut self, enabled: bool) -> Result<()> {
        self.configs.set_wtn_auto_open(enabled)?;
        self.wtn.set_auto_open(enabled);
        Ok(())
    }

    /// Run one API call, logging the outcome and raising a toast
    pub fn run<T, F>(&mut self, label: &str, op: F) -> Result<T>
    where
        T: Serialize,
        F: FnOnce(&ApiClient) -> Result<T>,
    {
        match op(&self.client) {
            Ok(value) => {
                self.record_success(label, &value);
                self.toaster.success(format!("{label} ✓"), None, None);
                Ok(value)
            }
            Err(err) => Err(self.fail(label, err)),
        }
    }

    pub(crate) fn record_success<T: Serialize>(&mut self, label: &str, value: &T) {
        let payload = serde_json::to_value(value).unwrap_or(Value::Null);
        self.results.push(label, payload);
    }

    pub(crate) fn record_failure(&mut self, label: &str, err: &Error) {
        let payload = json!({
            "error": err.to_string(),
            "code": err.code(),
            "fields": err.fields(),
        });
        self.results.push(format!("{label} (ERR)"), payload);
    }

    /// Log and toast a failure, handing the error back
    pub(crate) fn fail(&mut self, label: &str, err: Error) -> Error {
        self.record_failure(label, &err);
        self.toaster.error(err.to_string(), Some(label), None);
        err
    }

    pub fn drivers(&self) -> &[Driver] {
        &self.drivers
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn contractors(&self) -> &[Contractor] {
        &self.contractors
    }

    pub fn selected_driver(&self) -> Option<&Driver> {
        let id = self.selected_driver.as_deref()?;
        self.drivers.iter().find(|d| d.id == id)
    }

    pub fn selected_vehicle(&self) -> Option<&Vehicle> {
        let id = self.selected_vehicle.as_deref()?;
        self.vehicles.iter().find(|v| v.id == id)
    }

    pub fn refresh_drivers(&mut self) -> Result<&[Driver]> {
        self.drivers = self.client.list_drivers()?;
        if self.selected_driver().is_none() {
            self.selected_driver = None;
        }
        Ok(&self.drivers)
    }

    pub fn refresh_vehicles(&mut self) -> Result<&[Vehicle]> {
        self.vehicles = self.client.list_vehicles()?;
        if self.selected_vehicle().is_none() {
            self.selected_vehicle = None;
        }
        Ok(&self.vehicles)
    }

    pub fn refresh_contractors(&mut self) -> Result<&[Contractor]> {
        self.contractors = self.client.list_contractors()?;
        Ok(&self.contractors)
    }

    /// Driver id for a name or id, refreshing the cached list if needed
    pub fn resolve_driver(&mut self, input: &str) -> Result<String> {
        let client = &self.client;
        let (id, fresh) = resolve_in(EntityKind::Driver, &self.drivers, || client.list_drivers(), input)?;
        if let Some(list) = fresh {
            self.drivers = list;
        }
        Ok(id)
    }

    pub fn resolve_vehicle(&mut self, input: &str) -> Result<String> {
        let client = &self.client;
        let (id, fresh) = resolve_in(EntityKind::Vehicle, &self.vehicles, || client.list_vehicles(), input)?;
        if let Some(list) = fresh {
            self.vehicles = list;
        }
        Ok(id)
    }

    pub fn resolve_contractor(&mut self, input: &str) -> Result<String> {
        let client = &self.client;
        let (id, fresh) = resolve_in(
            EntityKind::Contractor,
            &self.contractors,
            || client.list_contractors(),
            input,
        )?;
        if let Some(list) = fresh {
            self.contractors = list;
        }
        Ok(id)
    }

    pub fn select_driver(&mut self, reference: &str) -> Result<&Driver> {
        let id = self.resolve_driver(reference)?;
        if !self.drivers.iter().any(|d| d.id == id) {
            self.refresh_drivers()?;
        }
        self.selected_driver = Some(id.clone());
        self.selected_driver()
            .ok_or_else(|| {
                Error::Resolve(ResolveError::NotFound {
                    kind: EntityKind::Driver,
                    input: reference.to_string(),
                })
            })
    }

    pub fn select_vehicle(&mut self, reference: &str) -> Result<&Vehicle> {
        let id = self.resolve_vehicle(reference)?;
        if !self.vehicles.iter().any(|v| v.id == id) {
            self.refresh_vehicles()?;
        }
        self.selected_vehicle = Some(id.clone());
        self.selected_vehicle()
            .ok_or_else(|| {
                Error::Resolve(ResolveError::NotFound {
                    kind: EntityKind::Vehicle,
                    input: reference.to_string(),
                })
            })
    }
}

/// Resolve `input` against `cached`, fetching at most once.
///
/// Returns the id plus the freshly fetched list when a fetch happened.
fn resolve_in<E, F>(
    kind: EntityKind,
    cached: &[E],
    fetch: F,
    input: &str,
) -> Result<(String, Option<Vec<E>>)>
where
    for<'a> Candidate: From<&'a E>,
    F: Fn() -> Result<Vec<E>>,
{
    let fetched: RefCell<Option<Vec<E>>> = RefCell::new(None);
    let directory = DirectoryFn::new(kind, || {
        let list = fetch().map_err(into_api_error)?;
        let candidates = list.iter().map(Candidate::from).collect();
        *fetched.borrow_mut() = Some(list);
        Ok(candidates)
    });

    let mut resolver = if cached.is_empty() {
        Resolver::new(directory)
    } else {
        Resolver::with_cache(directory, cached.iter().map(Candidate::from).collect())
    };
    let id = resolver.resolve(input)?;
    drop(resolver);
    Ok((id, fetched.into_inner()))
}

fn into_api_error(err: Error) -> ApiError {
    match err {
        Error::Api(e) => e,
        other => ApiError::new(other.to_string(), 0),
    }
}
