//! Flat-file backend.
//!
//! Every query streams the data file line by line through a reused buffer;
//! the file is never read into memory as a whole. Lines that fail to decode
//! are skipped by queries and copied verbatim by the title rewrite.

mod codec;

pub use codec::{decode_line, encode_line, is_encodable, write_line};

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use log::{debug, info, trace};
use tempfile::NamedTempFile;

use crate::backend::{QueryBackend, Timed};
use crate::bench::BackendKind;
use crate::core::{BenchError, Record};
use crate::observe::{ObservationSink, Observed};

/// Moves a fully written staging file over the data file.
pub trait Installer: Send + Sync {
    fn install(&self, staged: NamedTempFile, target: &Path) -> io::Result<()>;
}

/// Installs with a single rename over the existing file. On failure the
/// original file is untouched and the staging file is removed.
#[derive(Debug, Default, Clone, Copy)]
pub struct AtomicRename;

impl Installer for AtomicRename {
    fn install(&self, staged: NamedTempFile, target: &Path) -> io::Result<()> {
        staged.persist(target).map(|_| ()).map_err(|e| e.error)
    }
}

/// Line counts from one title rewrite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteStats {
    pub rewritten: usize,
    pub unchanged: usize,
    pub passed_through: usize,
}

pub struct FileBackend {
    path: PathBuf,
    installer: Box<dyn Installer>,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            installer: Box::new(AtomicRename),
        }
    }

    pub fn with_installer(mut self, installer: impl Installer + 'static) -> Self {
        self.installer = Box::new(installer);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<BufReader<File>, BenchError> {
        let file = File::open(&self.path).map_err(|e| {
            BenchError::IoError(format!("opening {}: {}", self.path.display(), e))
        })?;
        Ok(BufReader::new(file))
    }

    /// Feed every raw line (newline stripped) to `visit` until it breaks.
    fn for_each_line(
        &self,
        mut visit: impl FnMut(&str) -> Result<ControlFlow<()>, BenchError>,
    ) -> Result<(), BenchError> {
        let mut reader = self.open()?;
        let mut buf = String::new();
        loop {
            buf.clear();
            let read = reader.read_line(&mut buf).map_err(|e| {
                BenchError::IoError(format!("reading {}: {}", self.path.display(), e))
            })?;
            if read == 0 {
                return Ok(());
            }
            let line = buf.trim_end_matches(['\n', '\r']);
            if visit(line)?.is_break() {
                return Ok(());
            }
        }
    }

    /// Feed every decodable record to `visit` until it breaks.
    fn scan(&self, mut visit: impl FnMut(Record) -> ControlFlow<()>) -> Result<(), BenchError> {
        self.for_each_line(|line| match decode_line(line) {
            Ok(record) => Ok(visit(record)),
            Err(e) => {
                trace!("skipping line: {e}");
                Ok(ControlFlow::Continue(()))
            }
        })
    }

    fn collect_where(
        &self,
        keep: impl Fn(&Record) -> bool,
    ) -> Result<Timed<Vec<Record>>, BenchError> {
        let start = Instant::now();
        let mut hits = Vec::new();
        self.scan(|record| {
            if keep(&record) {
                hits.push(record);
            }
            ControlFlow::Continue(())
        })?;
        let elapsed = start.elapsed();
        Ok(Timed {
            value: hits,
            elapsed,
        })
    }

    pub fn fuzzy(&self, keyword: &str) -> Result<Timed<Vec<Record>>, BenchError> {
        self.collect_where(|record| record.title.contains(keyword))
    }

    pub fn exact(&self, id: u32) -> Result<Timed<Option<Record>>, BenchError> {
        let start = Instant::now();
        let mut hit = None;
        self.scan(|record| {
            if record.id == id {
                hit = Some(record);
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })?;
        let elapsed = start.elapsed();
        Ok(Timed {
            value: hit,
            elapsed,
        })
    }

    pub fn range(&self, low: i32, high: i32) -> Result<Timed<Vec<Record>>, BenchError> {
        self.collect_where(|record| record.year >= low && record.year <= high)
    }

    /// Rewrite every title into a staging file next to the data file, then
    /// install it over the original.
    ///
    /// If installation fails the result is [`BenchError::FileReplaceError`]
    /// and the staging file is discarded.
    pub fn update(&self) -> Result<Timed<RewriteStats>, BenchError> {
        let start = Instant::now();
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut staged = NamedTempFile::new_in(dir).map_err(|e| {
            BenchError::IoError(format!("creating staging file in {}: {}", dir.display(), e))
        })?;

        let mut stats = RewriteStats::default();
        {
            let mut writer = BufWriter::new(staged.as_file_mut());
            self.for_each_line(|line| {
                match decode_line(line) {
                    Ok(mut record) if is_encodable(&record) => {
                        if record.rewrite_title() {
                            stats.rewritten += 1;
                        } else {
                            stats.unchanged += 1;
                        }
                        write_line(&mut writer, &record)?;
                    }
                    Ok(_) => {
                        trace!("passing line through: line break inside a field");
                        stats.passed_through += 1;
                        writer.write_all(line.as_bytes())?;
                    }
                    Err(e) => {
                        trace!("passing line through: {e}");
                        stats.passed_through += 1;
                        writer.write_all(line.as_bytes())?;
                    }
                }
                writer.write_all(b"\n")?;
                Ok(ControlFlow::Continue(()))
            })?;
            writer.flush()?;
        }
        // keep the data file's mode; staging files are created 0600
        let permissions = fs::metadata(&self.path)?.permissions();
        staged.as_file().set_permissions(permissions)?;
        staged.as_file().sync_all()?;

        self.installer
            .install(staged, &self.path)
            .map_err(|e| BenchError::FileReplaceError {
                path: self.path.display().to_string(),
                reason: e.to_string(),
            })?;
        let elapsed = start.elapsed();

        debug!(
            "rewrote {}: {} changed, {} unchanged, {} passed through",
            self.path.display(),
            stats.rewritten,
            stats.unchanged,
            stats.passed_through
        );
        Ok(Timed {
            value: stats,
            elapsed,
        })
    }

    /// Decode every record in the file, e.g. to seed a memory working set.
    pub fn load_all(&self) -> Result<Vec<Record>, BenchError> {
        let mut records = Vec::new();
        self.scan(|record| {
            records.push(record);
            ControlFlow::Continue(())
        })?;
        info!("loaded {} records from {}", records.len(), self.path.display());
        Ok(records)
    }

    /// Last raw line of the file, if any.
    pub fn last_line(&self) -> Result<Option<String>, BenchError> {
        let mut last: Option<String> = None;
        self.for_each_line(|line| {
            let slot = last.get_or_insert_with(String::new);
            slot.clear();
            slot.push_str(line);
            Ok(ControlFlow::Continue(()))
        })?;
        Ok(last)
    }
}

#[async_trait]
impl QueryBackend for FileBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::File
    }

    async fn fuzzy_search(
        &self,
        keyword: &str,
        sink: &ObservationSink,
    ) -> Result<Duration, BenchError> {
        let Timed { value, elapsed } = self.fuzzy(keyword)?;
        sink.observe("file fuzzy", Observed::Many(value));
        Ok(elapsed)
    }

    async fn exact_search(&self, id: u32, sink: &ObservationSink) -> Result<Duration, BenchError> {
        let Timed { value, elapsed } = self.exact(id)?;
        sink.observe("file exact", Observed::One(value));
        Ok(elapsed)
    }

    async fn range_search(
        &self,
        low: i32,
        high: i32,
        sink: &ObservationSink,
    ) -> Result<Duration, BenchError> {
        let Timed { value, elapsed } = self.range(low, high)?;
        sink.observe("file range", Observed::Many(value));
        Ok(elapsed)
    }

    async fn update_titles(&mut self, sink: &ObservationSink) -> Result<Duration, BenchError> {
        let elapsed = self.update()?.elapsed;
        sink.observe("file update", Observed::Text(self.last_line()?));
        Ok(elapsed)
    }
}
