//! Waste transfer note broadcast
//!
//! The client publishes here after a collection produced a note. Subscribers
//! (the console's prompt) are told about it, and the PDF is opened when the
//! auto-open preference is on and an opener is installed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{info, warn};
use wm_domain::repository::UrlOpener;
use wm_types::WtnReady;

type WtnListener = Arc<dyn Fn(&WtnReady) + Send + Sync>;

#[derive(Default)]
pub struct WtnChannel {
    listeners: Mutex<Vec<WtnListener>>,
    opener: Mutex<Option<Arc<dyn UrlOpener>>>,
    auto_open: AtomicBool,
    last: Mutex<Option<WtnReady>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl WtnChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_opener(&self, opener: Option<Arc<dyn UrlOpener>>) {
        *lock(&self.opener) = opener;
    }

    pub fn set_auto_open(&self, enabled: bool) {
        self.auto_open.store(enabled, Ordering::Relaxed);
    }

    pub fn auto_open(&self) -> bool {
        self.auto_open.load(Ordering::Relaxed)
    }

    pub fn subscribe<F>(&self, listener: F)
    where
        F: Fn(&WtnReady) + Send + Sync + 'static,
    {
        lock(&self.listeners).push(Arc::new(listener));
    }

    /// The most recent note, if any was published
    pub fn last(&self) -> Option<WtnReady> {
        lock(&self.last).clone()
    }

    pub fn publish(&self, ready: WtnReady) {
        info!("waste transfer note ready: {}", ready.url);
        *lock(&self.last) = Some(ready.clone());

        let listeners: Vec<WtnListener> = lock(&self.listeners).clone();
        for listener in listeners {
            (*listener)(&ready);
        }

        if self.auto_open() {
            let opener = lock(&self.opener).clone();
            if let Some(opener) = opener {
                if let Err(e) = opener.open(&ready.url) {
                    warn!("could not open {}: {}", ready.url, e);
                }
            }
        }
    }
}
