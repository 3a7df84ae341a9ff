//! Observation sink for benchmark results.
//!
//! Results computed inside a timed region are handed to the sink after the
//! clock stops. The sink keeps the latest value behind a lock and logs a
//! summary, so the optimizer cannot treat the timed work as dead code.

use std::hint::black_box;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use log::debug;

use crate::core::Record;

/// A value handed to the sink. Each write replaces the previous one.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Observed {
    #[default]
    Empty,
    Many(Vec<Record>),
    One(Option<Record>),
    Text(Option<String>),
}

impl Observed {
    pub fn many<'a>(records: impl IntoIterator<Item = &'a Record>) -> Self {
        Observed::Many(records.into_iter().cloned().collect())
    }

    /// Number of items held: matched records, or 0/1 for single values.
    pub fn len(&self) -> usize {
        match self {
            Observed::Empty => 0,
            Observed::Many(records) => records.len(),
            Observed::One(record) => usize::from(record.is_some()),
            Observed::Text(text) => usize::from(text.is_some()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn summary(&self) -> String {
        match self {
            Observed::Empty => "empty".to_string(),
            Observed::Many(records) => format!("{} records", records.len()),
            Observed::One(Some(record)) => format!("id {} '{}'", record.id, record.title),
            Observed::One(None) => "no match".to_string(),
            Observed::Text(Some(text)) => text.clone(),
            Observed::Text(None) => "no text".to_string(),
        }
    }
}

/// Per-run holder owned by the orchestrator and passed to every backend call.
#[derive(Debug, Default)]
pub struct ObservationSink {
    slot: Mutex<Observed>,
    writes: AtomicU64,
}

impl ObservationSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&self, label: &str, value: Observed) {
        let value = black_box(value);
        debug!("observed {}: {}", label, value.summary());
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        *slot = value;
        self.writes.fetch_add(1, Ordering::Release);
    }

    /// Size of the currently held value.
    pub fn len(&self) -> usize {
        self.slot.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn latest(&self) -> Observed {
        self.slot.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Total number of `observe` calls since creation.
    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::Acquire)
    }

    /// Drop the held value. Called once the run is over.
    pub fn clear(&self) {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        *slot = Observed::Empty;
    }
}
