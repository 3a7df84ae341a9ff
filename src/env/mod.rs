//! Environment reset between trials.

mod command;
mod container;

pub use command::{CommandOutput, CommandRunner};
pub use container::ContainerController;

use async_trait::async_trait;

use crate::core::BenchError;

/// Brings the database environment into a comparable state before trials.
#[async_trait]
pub trait EnvironmentControl: Send + Sync {
    /// Make sure the environment is up. Called once per scenario.
    async fn prepare(&self) -> Result<(), BenchError>;

    /// Reset caches and sessions. Called before every trial that touches the
    /// database.
    async fn reset(&self) -> Result<(), BenchError>;

    /// Recent environment output, used to explain a failed run.
    async fn diagnostics(&self) -> Option<String> {
        None
    }
}
