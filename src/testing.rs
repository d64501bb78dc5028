//! Shared helpers for in-crate tests

use std::sync::{Arc, Mutex};

/// Ordered record of calls made across several test doubles
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    entries: Arc<Mutex<Vec<&'static str>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, call: &'static str) {
        self.entries.lock().unwrap().push(call);
    }

    pub fn entries(&self) -> Vec<&'static str> {
        self.entries.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }
}
