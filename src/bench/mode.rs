use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Database,
    Memory,
    File,
}

impl BackendKind {
    pub fn name(&self) -> &'static str {
        match self {
            BackendKind::Database => "database",
            BackendKind::Memory => "memory",
            BackendKind::File => "file",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which backends a run compares.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum BenchMode {
    DbVsMemory,
    DbVsFile,
    Single,
}

impl BenchMode {
    /// Participating backends in report order. `single` selects the backend
    /// for [`BenchMode::Single`] and is ignored otherwise.
    pub fn participants(&self, single: Option<BackendKind>) -> Vec<BackendKind> {
        match self {
            BenchMode::DbVsMemory => vec![BackendKind::Database, BackendKind::Memory],
            BenchMode::DbVsFile => vec![BackendKind::Database, BackendKind::File],
            BenchMode::Single => single.into_iter().collect(),
        }
    }
}

impl fmt::Display for BenchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BenchMode::DbVsMemory => "db_vs_memory",
            BenchMode::DbVsFile => "db_vs_file",
            BenchMode::Single => "single",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_participants() {
        assert_eq!(
            BenchMode::DbVsMemory.participants(Some(BackendKind::File)),
            vec![BackendKind::Database, BackendKind::Memory]
        );
        assert_eq!(
            BenchMode::Single.participants(Some(BackendKind::Memory)),
            vec![BackendKind::Memory]
        );
        assert!(BenchMode::Single.participants(None).is_empty());
    }

    #[test]
    fn test_value_enum_names_match_config_names() {
        assert_eq!(
            BenchMode::from_str("db_vs_file", false),
            Ok(BenchMode::DbVsFile)
        );
        assert_eq!(
            BackendKind::from_str("database", false),
            Ok(BackendKind::Database)
        );
    }
}
