//! Driver flow: scanning and skip movements

use serde_json::{json, Value};
use wm_domain::service::fallback::{with_fallback, ON_BAD_QUERY, ON_VALIDATION};
use wm_types::{
    CollectFull, DeliverEmpty, FacilityDrop, HttpMethod, RelocateEmpty, Result, ReturnEmpty,
};

use crate::client::{with_query, ApiClient};

impl ApiClient {
    /// Make sure a skip with this QR exists (dev helper).
    ///
    /// Older servers only accept the query form; a 422 on the body form
    /// retries that way.
    pub fn ensure_skip_dev(&self, qr: &str) -> Result<Value> {
        let body = json!({ "qr_code": qr, "qr": qr });
        let value = with_fallback(
            ON_VALIDATION,
            || self.request(HttpMethod::Post, "/driver/dev/ensure-skip", Some(&body)),
            || {
                self.request(
                    HttpMethod::Get,
                    &with_query("/driver/dev/ensure-skip", &[("qr", qr)]),
                    None,
                )
            },
        )?;
        Ok(value)
    }

    /// Look up a skip by QR, retrying with `?q=` on 400/422
    pub fn scan(&self, qr: &str) -> Result<Value> {
        let value = with_fallback(
            ON_BAD_QUERY,
            || self.request(HttpMethod::Get, &with_query("/driver/scan", &[("qr", qr)]), None),
            || self.request(HttpMethod::Get, &with_query("/driver/scan", &[("q", qr)]), None),
        )?;
        Ok(value)
    }

    pub fn deliver_empty(&self, payload: &DeliverEmpty) -> Result<Value> {
        self.post("/driver/deliver-empty", payload)
    }

    pub fn relocate_empty(&self, payload: &RelocateEmpty) -> Result<Value> {
        self.post("/driver/relocate-empty", payload)
    }

    pub fn collect_full(&self, payload: &CollectFull) -> Result<Value> {
        self.post("/driver/collect-full", payload)
    }

    pub fn return_empty(&self, payload: &ReturnEmpty) -> Result<Value> {
        self.post("/driver/return-empty", payload)
    }

    /// Collect a full skip to a transfer facility
    pub fn drop_at_facility(&self, drop: FacilityDrop) -> Result<Value> {
        self.collect_full(&CollectFull::from(drop))
    }
}
