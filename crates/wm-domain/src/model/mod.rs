//! Domain model types

pub mod candidate;
pub mod result_entry;
pub mod toast;

pub use candidate::Candidate;
pub use result_entry::ResultEntry;
pub use toast::{Toast, ToastKind};
