#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use moviebench::backend::{FileBackend, MemoryBackend, QueryBackend};
use moviebench::bench::BackendKind;
use moviebench::core::{BenchError, Record};
use moviebench::env::EnvironmentControl;
use moviebench::observe::{ObservationSink, Observed};
use moviebench::testutil::setup_movie_file;

/// Environment double counting lifecycle calls.
#[derive(Clone, Default)]
pub struct RecordingEnv {
    pub prepares: Arc<AtomicUsize>,
    pub resets: Arc<AtomicUsize>,
    pub fail_reset_at: Option<usize>,
}

impl RecordingEnv {
    pub fn failing_at(reset: usize) -> Self {
        Self {
            fail_reset_at: Some(reset),
            ..Self::default()
        }
    }

    pub fn prepares(&self) -> usize {
        self.prepares.load(Ordering::SeqCst)
    }

    pub fn resets(&self) -> usize {
        self.resets.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EnvironmentControl for RecordingEnv {
    async fn prepare(&self) -> Result<(), BenchError> {
        self.prepares.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn reset(&self) -> Result<(), BenchError> {
        let n = self.resets.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_reset_at == Some(n) {
            return Err(BenchError::ProcessExitError {
                command: "docker restart movies".to_string(),
                code: 1,
                output: "no such container".to_string(),
            });
        }
        Ok(())
    }

    async fn diagnostics(&self) -> Option<String> {
        Some("fake container log".to_string())
    }
}

/// Stands in for the database backend: reports itself as `Database`, returns
/// a fixed duration, and can be told to fail every call.
pub struct StubDatabase {
    pub elapsed: Duration,
    pub fail: bool,
    pub calls: Arc<AtomicUsize>,
}

impl StubDatabase {
    pub fn new(elapsed: Duration) -> Self {
        Self {
            elapsed,
            fail: false,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(Duration::ZERO)
        }
    }

    fn answer(&self) -> Result<Duration, BenchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(BenchError::ConnectionError("connection refused".to_string()));
        }
        Ok(self.elapsed)
    }
}

#[async_trait]
impl QueryBackend for StubDatabase {
    fn kind(&self) -> BackendKind {
        BackendKind::Database
    }

    async fn fuzzy_search(&self, _: &str, _: &ObservationSink) -> Result<Duration, BenchError> {
        self.answer()
    }

    async fn exact_search(&self, _: u32, _: &ObservationSink) -> Result<Duration, BenchError> {
        self.answer()
    }

    async fn range_search(
        &self,
        _: i32,
        _: i32,
        _: &ObservationSink,
    ) -> Result<Duration, BenchError> {
        self.answer()
    }

    async fn update_titles(&mut self, _: &ObservationSink) -> Result<Duration, BenchError> {
        self.answer()
    }
}

/// Build a backend of the given kind over `records`. The TempDir keeps a file
/// backend's data alive.
pub fn make_backend(
    kind: BackendKind,
    records: &[Record],
) -> (Box<dyn QueryBackend>, Option<tempfile::TempDir>) {
    match kind {
        BackendKind::Memory => (Box::new(MemoryBackend::new(records.to_vec())), None),
        BackendKind::File => {
            let (path, temp_dir) = setup_movie_file(records);
            (Box::new(FileBackend::new(path)), Some(temp_dir))
        }
        BackendKind::Database => panic!("no database in integration tests"),
    }
}

pub fn observed_records(sink: &ObservationSink) -> Vec<Record> {
    match sink.latest() {
        Observed::Many(records) => records,
        other => panic!("expected many records, got {other:?}"),
    }
}

pub fn observed_record(sink: &ObservationSink) -> Option<Record> {
    match sink.latest() {
        Observed::One(record) => record,
        other => panic!("expected one record, got {other:?}"),
    }
}

pub fn ids(records: &[Record]) -> Vec<u32> {
    records.iter().map(|r| r.id).collect()
}
