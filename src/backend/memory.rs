//! Query contract over a working set already held in memory.

use std::hint::black_box;
use std::time::Duration;

use async_trait::async_trait;

use crate::backend::{QueryBackend, Timed, measure};
use crate::bench::BackendKind;
use crate::core::{BenchError, Record};
use crate::observe::{ObservationSink, Observed};

/// Answers queries by scanning the records it was handed.
///
/// The backend never copies the working set. `update` rewrites titles in
/// place, so a caller that wants a repeatable update trial supplies a fresh
/// set through [`MemoryBackend::replace_records`] or
/// [`QueryBackend::working_set_mut`].
#[derive(Debug, Default)]
pub struct MemoryBackend {
    records: Vec<Record>,
}

impl MemoryBackend {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Swap in a new working set and hand the old one back to the caller.
    pub fn replace_records(&mut self, records: Vec<Record>) -> Vec<Record> {
        std::mem::replace(&mut self.records, records)
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    pub fn fuzzy(&self, keyword: &str) -> Timed<Vec<&Record>> {
        let records = black_box(self.records.as_slice());
        measure(|| {
            records
                .iter()
                .filter(|record| record.title.contains(keyword))
                .collect()
        })
    }

    pub fn exact(&self, id: u32) -> Timed<Option<&Record>> {
        let records = black_box(self.records.as_slice());
        measure(|| records.iter().find(|record| record.id == id))
    }

    pub fn range(&self, low: i32, high: i32) -> Timed<Vec<&Record>> {
        let records = black_box(self.records.as_slice());
        measure(|| {
            records
                .iter()
                .filter(|record| record.year >= low && record.year <= high)
                .collect()
        })
    }

    /// Rewrite every title in place. The value is the number of titles changed.
    pub fn update(&mut self) -> Timed<usize> {
        let records = black_box(self.records.as_mut_slice());
        measure(|| {
            records
                .iter_mut()
                .map(Record::rewrite_title)
                .filter(|changed| *changed)
                .count()
        })
    }
}

#[async_trait]
impl QueryBackend for MemoryBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Memory
    }

    async fn fuzzy_search(
        &self,
        keyword: &str,
        sink: &ObservationSink,
    ) -> Result<Duration, BenchError> {
        let Timed { value, elapsed } = self.fuzzy(keyword);
        sink.observe("memory fuzzy", Observed::many(value));
        Ok(elapsed)
    }

    async fn exact_search(&self, id: u32, sink: &ObservationSink) -> Result<Duration, BenchError> {
        let Timed { value, elapsed } = self.exact(id);
        sink.observe("memory exact", Observed::One(value.cloned()));
        Ok(elapsed)
    }

    async fn range_search(
        &self,
        low: i32,
        high: i32,
        sink: &ObservationSink,
    ) -> Result<Duration, BenchError> {
        let Timed { value, elapsed } = self.range(low, high);
        sink.observe("memory range", Observed::many(value));
        Ok(elapsed)
    }

    async fn update_titles(&mut self, sink: &ObservationSink) -> Result<Duration, BenchError> {
        let elapsed = self.update().elapsed;
        let last = self.records.last().map(|record| record.title.clone());
        sink.observe("memory update", Observed::Text(last));
        Ok(elapsed)
    }

    fn working_set_mut(&mut self) -> Option<&mut Vec<Record>> {
        Some(&mut self.records)
    }
}
