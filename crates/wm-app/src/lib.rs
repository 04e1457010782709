//! Application service layer - config, API client, console session, workflows

pub mod api;
pub mod client;
pub mod config;
pub mod console;
pub mod workflows;
pub mod wtn;

pub use client::ApiClient;
pub use config::{Config, ConfigStore, ConfigUpdate};
pub use console::Console;
pub use workflows::{DemoInputs, PreloadSummary, NO_DRIVER_MESSAGE};
pub use wtn::WtnChannel;
