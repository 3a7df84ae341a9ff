//! Benchmark orchestration: scenarios, trial loop and reporting.

mod mode;
mod orchestrator;
mod report;
mod scenario;

pub use mode::{BackendKind, BenchMode};
pub use orchestrator::Orchestrator;
pub use report::{BenchReport, ScenarioReport, Timing, TrialReport};
pub use scenario::Scenario;

use log::info;

use crate::backend::{DatabaseBackend, FileBackend, MemoryBackend, QueryBackend};
use crate::conf::{Config, RecordSource};
use crate::core::{BenchError, Record};
use crate::env::{ContainerController, EnvironmentControl};

/// Wire the participating backends and the container controller from a
/// validated config. Loads the base record set when the memory backend takes
/// part.
pub async fn build_orchestrator(config: &Config) -> Result<Orchestrator, BenchError> {
    config.validate()?;
    let participants = config.participants();
    let env = ContainerController::from_config(config);

    let base = if participants.contains(&BackendKind::Memory) {
        load_base_records(config, &env).await?
    } else {
        Vec::new()
    };

    let backends = participants
        .iter()
        .map(|kind| -> Box<dyn QueryBackend> {
            match kind {
                BackendKind::Database => Box::new(DatabaseBackend::new(config.database.clone())),
                BackendKind::Memory => Box::new(MemoryBackend::new(base.clone())),
                BackendKind::File => Box::new(FileBackend::new(config.file.path.clone())),
            }
        })
        .collect();

    info!(
        "mode {} with backends {:?}, {} base records",
        config.bench.mode,
        participants,
        base.len()
    );
    Ok(Orchestrator::new(
        config.bench.clone(),
        Box::new(env),
        backends,
        base,
    ))
}

async fn load_base_records(
    config: &Config,
    env: &ContainerController,
) -> Result<Vec<Record>, BenchError> {
    match config.bench.memory_source {
        RecordSource::Database => {
            env.prepare().await?;
            DatabaseBackend::new(config.database.clone()).load_all().await
        }
        RecordSource::File => FileBackend::new(config.file.path.clone()).load_all(),
    }
}
