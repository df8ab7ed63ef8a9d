//! history.rs — bounded in-memory log of raised alerts.

use std::sync::Mutex;

use crate::alerts::AlertRecord;

/// Shared between the poller (writer) and the API (reader). Oldest entries
/// are evicted once the cap is reached.
#[derive(Debug)]
pub struct AlertHistory {
    inner: Mutex<Vec<AlertRecord>>,
    cap: usize,
}

impl AlertHistory {
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            inner: Mutex::new(Vec::with_capacity(cap.min(10_000))),
            cap: cap.min(10_000),
        }
    }

    pub fn push(&self, record: AlertRecord) {
        let mut v = self.inner.lock().expect("history mutex poisoned");
        v.push(record);
        if v.len() > self.cap {
            let excess = v.len() - self.cap;
            v.drain(0..excess);
        }
    }

    /// Last `n` alerts in insertion order (oldest of the tail first).
    pub fn snapshot_last_n(&self, n: usize) -> Vec<AlertRecord> {
        let v = self.inner.lock().expect("history mutex poisoned");
        let len = v.len();
        let start = len.saturating_sub(n);
        v[start..].to_vec()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("history mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
