//! Ephemeral UI notifications

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Info,
    Success,
    Error,
}

impl ToastKind {
    /// Time-to-live when the caller does not override it
    pub fn default_ttl(&self) -> Duration {
        match self {
            ToastKind::Error => Duration::from_secs(6),
            ToastKind::Info | ToastKind::Success => Duration::from_secs(3),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: String,
    pub kind: ToastKind,
    pub title: Option<String>,
    pub message: Option<String>,
    pub ttl: Option<Duration>,
}

impl Toast {
    pub fn new(kind: ToastKind, message: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().simple().to_string(),
            kind,
            title: None,
            message: Some(message.into()),
            ttl: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn effective_ttl(&self) -> Duration {
        self.ttl.unwrap_or_else(|| self.kind.default_ttl())
    }
}
