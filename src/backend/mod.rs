//! The query contract shared by every storage backend.

use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::bench::BackendKind;
use crate::core::{BenchError, Record};
use crate::observe::ObservationSink;

pub mod database;
pub mod file;
pub mod memory;

pub use database::DatabaseBackend;
pub use file::FileBackend;
pub use memory::MemoryBackend;

/// One operation of the query contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Titles containing `keyword` (case-sensitive substring).
    Fuzzy { keyword: String },
    /// First record whose id equals `id`.
    Exact { id: u32 },
    /// Records with `low <= year <= high`. Empty when `low > high`.
    Range { low: i32, high: i32 },
    /// Rewrite every title, keeping titles whose rewrite would be too long.
    Update,
}

/// A result together with the wall-clock time spent producing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Timed<T> {
    pub value: T,
    pub elapsed: Duration,
}

/// Time `work` alone. Anything the caller does with the value happens after
/// the clock has stopped.
pub fn measure<T>(work: impl FnOnce() -> T) -> Timed<T> {
    let start = Instant::now();
    let value = work();
    let elapsed = start.elapsed();
    Timed { value, elapsed }
}

/// A storage backend that can answer the query contract.
///
/// Every method returns the elapsed time of the backend's core work only;
/// connection setup and result observation are outside the measured interval.
#[async_trait]
pub trait QueryBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    async fn fuzzy_search(
        &self,
        keyword: &str,
        sink: &ObservationSink,
    ) -> Result<Duration, BenchError>;

    async fn exact_search(&self, id: u32, sink: &ObservationSink) -> Result<Duration, BenchError>;

    async fn range_search(
        &self,
        low: i32,
        high: i32,
        sink: &ObservationSink,
    ) -> Result<Duration, BenchError>;

    async fn update_titles(&mut self, sink: &ObservationSink) -> Result<Duration, BenchError>;

    /// The caller-owned working set, for backends that hold one.
    fn working_set_mut(&mut self) -> Option<&mut Vec<Record>> {
        None
    }

    async fn execute(
        &mut self,
        query: &Query,
        sink: &ObservationSink,
    ) -> Result<Duration, BenchError> {
        match query {
            Query::Fuzzy { keyword } => self.fuzzy_search(keyword, sink).await,
            Query::Exact { id } => self.exact_search(*id, sink).await,
            Query::Range { low, high } => self.range_search(*low, *high, sink).await,
            Query::Update => self.update_titles(sink).await,
        }
    }
}
