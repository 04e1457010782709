//! Typed API surface
//!
//! One method on [`ApiClient`] per backend route, grouped by area. Calls
//! that bridge API versions go through [`with_fallback`] and make at most
//! one extra attempt.
//!
//! [`ApiClient`]: crate::ApiClient
//! [`with_fallback`]: wm_domain::service::with_fallback

mod admin;
mod driver;
mod jobs;
mod meta;
mod skips;
mod wtn;

pub use jobs::schedule_items;
pub use skips::LABEL_PNG_COUNT;
pub use wtn::WTN_PAGE_SIZE;

use wm_types::{ApiError, Error, Result};

/// Treat 404 as "endpoint not deployed"
pub(crate) fn optional<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(Error::Api(ApiError { code: 404, .. })) => Ok(None),
        Err(e) => Err(e),
    }
}
