//! Publish/subscribe toast queue with auto-expiry
//!
//! At most [`MAX_TOASTS`] are held, newest first. Each push schedules its own
//! removal; subscribers see the whole queue after every change.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::thread;
use std::time::{Duration, Instant};

use crate::model::{Toast, ToastKind};

pub const MAX_TOASTS: usize = 5;

type Listener = Arc<dyn Fn(&[Toast]) + Send + Sync>;

#[derive(Default)]
struct Inner {
    queue: Vec<Toast>,
    deadlines: HashMap<String, Instant>,
    listeners: Vec<(u64, Listener)>,
    next_listener: u64,
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Notify listeners outside the lock so they may call back into the toaster
fn emit(inner: &Mutex<Inner>) {
    let (queue, listeners) = {
        let state = lock(inner);
        let listeners: Vec<Listener> = state.listeners.iter().map(|(_, l)| l.clone()).collect();
        (state.queue.clone(), listeners)
    };
    for listener in listeners {
        (*listener)(&queue);
    }
}

fn dismiss_in(inner: &Mutex<Inner>, id: &str) {
    let changed = {
        let mut state = lock(inner);
        let before = state.queue.len();
        state.queue.retain(|t| t.id != id);
        state.deadlines.remove(id);
        state.queue.len() != before
    };
    if changed {
        emit(inner);
    }
}

/// Cloneable handle to a shared toast queue
#[derive(Clone)]
pub struct Toaster {
    inner: Arc<Mutex<Inner>>,
    timers: bool,
}

impl Default for Toaster {
    fn default() -> Self {
        Self::new()
    }
}

impl Toaster {
    /// Toasts remove themselves after their TTL on a timer thread
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            timers: true,
        }
    }

    /// No timer threads; expire with [`Toaster::expire_due`]
    pub fn manual() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            timers: false,
        }
    }

    pub fn push(&self, toast: Toast) -> String {
        let id = toast.id.clone();
        let ttl = toast.effective_ttl();
        {
            let mut state = lock(&self.inner);
            state.queue.insert(0, toast);
            let keep = MAX_TOASTS.min(state.queue.len());
            let evicted: Vec<Toast> = state.queue.drain(keep..).collect();
            for old in evicted {
                state.deadlines.remove(&old.id);
            }
            state.deadlines.insert(id.clone(), Instant::now() + ttl);
        }
        emit(&self.inner);

        if self.timers {
            schedule_removal(Arc::downgrade(&self.inner), id.clone(), ttl);
        }
        id
    }

    pub fn info(&self, message: impl Into<String>, title: Option<&str>, ttl: Option<Duration>) -> String {
        self.push(build(ToastKind::Info, message, title, ttl))
    }

    pub fn success(&self, message: impl Into<String>, title: Option<&str>, ttl: Option<Duration>) -> String {
        self.push(build(ToastKind::Success, message, title, ttl))
    }

    pub fn error(&self, message: impl Into<String>, title: Option<&str>, ttl: Option<Duration>) -> String {
        self.push(build(ToastKind::Error, message, title, ttl))
    }

    pub fn dismiss(&self, id: &str) {
        dismiss_in(&self.inner, id);
    }

    /// Remove every toast whose deadline is at or before `now`
    pub fn expire_due(&self, now: Instant) -> usize {
        let due: Vec<String> = {
            let state = lock(&self.inner);
            state
                .deadlines
                .iter()
                .filter(|(_, deadline)| **deadline <= now)
                .map(|(id, _)| id.clone())
                .collect()
        };
        for id in &due {
            dismiss_in(&self.inner, id);
        }
        due.len()
    }

    pub fn snapshot(&self) -> Vec<Toast> {
        lock(&self.inner).queue.clone()
    }

    /// Register a listener; it is called immediately with the current queue.
    /// Dropping the returned guard unsubscribes.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&[Toast]) + Send + Sync + 'static,
    {
        let listener: Listener = Arc::new(listener);
        let (id, queue) = {
            let mut state = lock(&self.inner);
            let id = state.next_listener;
            state.next_listener += 1;
            state.listeners.push((id, listener.clone()));
            (id, state.queue.clone())
        };
        (*listener)(&queue);
        Subscription {
            id,
            inner: Arc::downgrade(&self.inner),
        }
    }
}

fn build(kind: ToastKind, message: impl Into<String>, title: Option<&str>, ttl: Option<Duration>) -> Toast {
    let mut toast = Toast::new(kind, message);
    if let Some(title) = title {
        toast = toast.with_title(title);
    }
    if let Some(ttl) = ttl {
        toast = toast.with_ttl(ttl);
    }
    toast
}

fn schedule_removal(inner: Weak<Mutex<Inner>>, id: String, ttl: Duration) {
    thread::spawn(move || {
        thread::sleep(ttl);
        if let Some(inner) = inner.upgrade() {
            dismiss_in(&inner, &id);
        }
    });
}

/// Keeps a listener registered until dropped
pub struct Subscription {
    id: u64,
    inner: Weak<Mutex<Inner>>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            lock(&inner).listeners.retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_queue_is_bounded_newest_first() {
        let toaster = Toaster::manual();
        let ids: Vec<String> = (0..6).map(|i| toaster.info(format!("msg {i}"), None, None)).collect();
        let queue = toaster.snapshot();
        assert_eq!(queue.len(), MAX_TOASTS);
        assert_eq!(queue[0].id, ids[5]);
        assert!(queue.iter().all(|t| t.id != ids[0]), "oldest should be evicted");
    }

    #[test]
    fn test_dismiss_removes_immediately() {
        let toaster = Toaster::manual();
        let keep = toaster.success("kept", None, None);
        let gone = toaster.error("gone", Some("Oops"), None);
        toaster.dismiss(&gone);
        let queue = toaster.snapshot();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].id, keep);
    }

    #[test]
    fn test_expire_uses_kind_defaults() {
        let toaster = Toaster::manual();
        toaster.info("short", None, None);
        toaster.error("long", None, None);
        toaster.success("custom", None, Some(Duration::from_secs(10)));

        let expired = toaster.expire_due(Instant::now() + Duration::from_secs(4));
        assert_eq!(expired, 1);
        let kinds: Vec<ToastKind> = toaster.snapshot().iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![ToastKind::Success, ToastKind::Error]);

        toaster.expire_due(Instant::now() + Duration::from_secs(7));
        assert_eq!(toaster.snapshot().len(), 1);
    }

    #[test]
    fn test_subscribers_receive_every_change() {
        let toaster = Toaster::manual();
        toaster.info("before", None, None);
        let calls = Arc::new(AtomicUsize::new(0));
        let last_len = Arc::new(AtomicUsize::new(usize::MAX));
        let sub = {
            let calls = calls.clone();
            let last_len = last_len.clone();
            toaster.subscribe(move |queue| {
                calls.fetch_add(1, Ordering::SeqCst);
                last_len.store(queue.len(), Ordering::SeqCst);
            })
        };
        // immediate call with current queue
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(last_len.load(Ordering::SeqCst), 1);

        let id = toaster.info("after", None, None);
        toaster.dismiss(&id);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(last_len.load(Ordering::SeqCst), 1);

        drop(sub);
        toaster.info("unobserved", None, None);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_timer_removes_toast() {
        let toaster = Toaster::new();
        toaster.info("brief", None, Some(Duration::from_millis(20)));
        assert_eq!(toaster.snapshot().len(), 1);
        let deadline = Instant::now() + Duration::from_secs(5);
        while !toaster.snapshot().is_empty() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        assert!(toaster.snapshot().is_empty());
    }
}
