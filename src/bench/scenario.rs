use std::fmt;

use serde::{Deserialize, Serialize};

use crate::backend::Query;
use crate::conf::BenchConfig;

/// A query kind run for the configured number of trials.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    Fuzzy,
    Exact,
    Range,
    Update,
}

impl Scenario {
    pub const ALL: [Scenario; 4] = [
        Scenario::Fuzzy,
        Scenario::Exact,
        Scenario::Range,
        Scenario::Update,
    ];

    pub fn query(&self, config: &BenchConfig) -> Query {
        match self {
            Scenario::Fuzzy => Query::Fuzzy {
                keyword: config.fuzzy_keyword.clone(),
            },
            Scenario::Exact => Query::Exact {
                id: config.exact_id,
            },
            Scenario::Range => Query::Range {
                low: config.range_low,
                high: config.range_high,
            },
            Scenario::Update => Query::Update,
        }
    }

    pub fn describe(&self, config: &BenchConfig) -> String {
        match self {
            Scenario::Fuzzy => format!("fuzzy search (title contains '{}')", config.fuzzy_keyword),
            Scenario::Exact => format!("exact search (id = {})", config.exact_id),
            Scenario::Range => format!(
                "range search (year {}-{})",
                config.range_low, config.range_high
            ),
            Scenario::Update => "title update".to_string(),
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Scenario::Fuzzy => "fuzzy",
            Scenario::Exact => "exact",
            Scenario::Range => "range",
            Scenario::Update => "update",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queries_follow_config() {
        let config = BenchConfig {
            fuzzy_keyword: "War".to_string(),
            exact_id: 7,
            range_low: 2001,
            range_high: 1999,
            ..BenchConfig::default()
        };
        assert_eq!(
            Scenario::Fuzzy.query(&config),
            Query::Fuzzy {
                keyword: "War".to_string()
            }
        );
        assert_eq!(Scenario::Exact.query(&config), Query::Exact { id: 7 });
        assert_eq!(
            Scenario::Range.query(&config),
            Query::Range {
                low: 2001,
                high: 1999
            }
        );
        assert_eq!(Scenario::Update.query(&config), Query::Update);
        assert_eq!(
            Scenario::Range.describe(&config),
            "range search (year 2001-1999)"
        );
    }
}
