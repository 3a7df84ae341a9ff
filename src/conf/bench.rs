use serde::{Deserialize, Serialize};

use crate::bench::{BackendKind, BenchMode, Scenario};

/// Where the memory backend's base record set is read from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecordSource {
    Database,
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BenchConfig {
    #[serde(default = "BenchConfig::default_trials")]
    pub trials: u32,
    #[serde(default = "BenchConfig::default_mode")]
    pub mode: BenchMode,
    /// Backend under test when `mode` is `single`.
    #[serde(default)]
    pub single: Option<BackendKind>,
    #[serde(default = "BenchConfig::default_fuzzy_keyword")]
    pub fuzzy_keyword: String,
    #[serde(default = "BenchConfig::default_exact_id")]
    pub exact_id: u32,
    #[serde(default = "BenchConfig::default_range_low")]
    pub range_low: i32,
    #[serde(default = "BenchConfig::default_range_high")]
    pub range_high: i32,
    #[serde(default = "BenchConfig::default_memory_source")]
    pub memory_source: RecordSource,
    #[serde(default = "BenchConfig::default_scenarios")]
    pub scenarios: Vec<Scenario>,
}

impl BenchConfig {
    fn default_trials() -> u32 {
        20
    }

    fn default_mode() -> BenchMode {
        BenchMode::DbVsMemory
    }

    fn default_fuzzy_keyword() -> String {
        String::from("the")
    }

    fn default_exact_id() -> u32 {
        1000
    }

    fn default_range_low() -> i32 {
        1990
    }

    fn default_range_high() -> i32 {
        2000
    }

    fn default_memory_source() -> RecordSource {
        RecordSource::Database
    }

    fn default_scenarios() -> Vec<Scenario> {
        Scenario::ALL.to_vec()
    }
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            trials: Self::default_trials(),
            mode: Self::default_mode(),
            single: None,
            fuzzy_keyword: Self::default_fuzzy_keyword(),
            exact_id: Self::default_exact_id(),
            range_low: Self::default_range_low(),
            range_high: Self::default_range_high(),
            memory_source: Self::default_memory_source(),
            scenarios: Self::default_scenarios(),
        }
    }
}
