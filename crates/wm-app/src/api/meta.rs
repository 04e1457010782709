//! Meta and debug endpoints

use serde_json::Value;
use tracing::warn;
use wm_types::{MetaConfig, RecentWtns, Result};

use super::optional;
use crate::client::{with_query, ApiClient};

impl ApiClient {
    /// `GET /_meta/ping`
    pub fn health(&self) -> Result<Value> {
        self.get("/_meta/ping")
    }

    /// `GET /__debug/routes`; `None` when the server does not expose it
    pub fn routes(&self) -> Result<Option<Value>> {
        optional(self.get("/__debug/routes"))
    }

    pub fn mounts(&self) -> Result<Option<Value>> {
        optional(self.get("/__debug/mounts"))
    }

    pub fn skips_smoke(&self) -> Result<Option<Value>> {
        optional(self.get("/skips/__smoke"))
    }

    pub fn versions(&self) -> Result<Option<Value>> {
        optional(self.get("/meta/versions"))
    }

    /// Most recent notes from the debug listing
    pub fn latest_wtns(&self, limit: u32) -> Result<Option<RecentWtns>> {
        let limit = limit.to_string();
        optional(self.get(&with_query("/__debug/wtns", &[("limit", &limit)])))
    }

    /// Skip colors and sizes; the built-in defaults when unavailable
    pub fn meta_config(&self) -> MetaConfig {
        match self.get::<MetaConfig>("/meta/config") {
            Ok(meta) => meta,
            Err(e) => {
                warn!("meta config unavailable, using defaults: {}", e);
                MetaConfig::fallback()
            }
        }
    }
}
