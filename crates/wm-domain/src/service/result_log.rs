//! Rolling log of call results, newest first

use std::collections::VecDeque;

use serde_json::Value;

use crate::model::ResultEntry;

pub const RESULT_LOG_CAPACITY: usize = 30;

#[derive(Debug, Clone)]
pub struct ResultLog {
    entries: VecDeque<ResultEntry>,
    capacity: usize,
}

impl Default for ResultLog {
    fn default() -> Self {
        Self::new(RESULT_LOG_CAPACITY)
    }
}

impl ResultLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, title: impl Into<String>, payload: Value) -> &ResultEntry {
        self.entries.push_front(ResultEntry::new(title, payload));
        self.entries.truncate(self.capacity);
        &self.entries[0]
    }

    pub fn latest(&self) -> Option<&ResultEntry> {
        self.entries.front()
    }

    pub fn entries(&self) -> impl Iterator<Item = &ResultEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
