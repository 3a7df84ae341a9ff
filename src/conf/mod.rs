mod bench;
mod config;
mod container;
mod database;
mod file;

pub use bench::{BenchConfig, RecordSource};
pub use config::Config;
pub use container::ContainerConfig;
pub use database::{DatabaseConfig, Engine};
pub use file::FileConfig;
