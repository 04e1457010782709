//! Domain services

pub mod error_normalizer;
pub mod fallback;
pub mod key_policy;
pub mod resolver;
pub mod result_log;
pub mod toaster;
pub mod validation;
pub mod wtn_links;

pub use error_normalizer::{normalize, normalize_response, normalize_transport};
pub use fallback::with_fallback;
pub use key_policy::select_key;
pub use resolver::{looks_like_id, match_candidate, Resolver};
pub use result_log::ResultLog;
pub use toaster::{Subscription, Toaster};
pub use wtn_links::{absolute_url, detect_wtn, find_wtn_url};
