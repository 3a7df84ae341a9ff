use std::fmt;
use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::bench::{BackendKind, BenchMode, Scenario};

fn as_millis<S: Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(elapsed.as_secs_f64() * 1000.0)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timing {
    pub backend: BackendKind,
    #[serde(rename = "millis", serialize_with = "as_millis")]
    pub elapsed: Duration,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialReport {
    /// 1-based trial number.
    pub trial: u32,
    pub timings: Vec<Timing>,
}

impl TrialReport {
    pub fn timing(&self, backend: BackendKind) -> Option<Duration> {
        self.timings
            .iter()
            .find(|t| t.backend == backend)
            .map(|t| t.elapsed)
    }
}

impl fmt::Display for TrialReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "trial {}:", self.trial)?;
        for (i, timing) in self.timings.iter().enumerate() {
            let sep = if i == 0 { " " } else { " | " };
            write!(
                f,
                "{sep}{}={:.3} ms",
                timing.backend,
                timing.elapsed.as_secs_f64() * 1000.0
            )?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioReport {
    pub scenario: Scenario,
    pub label: String,
    pub trials: Vec<TrialReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchReport {
    pub mode: BenchMode,
    pub backends: Vec<BackendKind>,
    pub scenarios: Vec<ScenarioReport>,
}

impl fmt::Display for BenchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for scenario in &self.scenarios {
            writeln!(
                f,
                "=== {} (mode: {}, {} trials) ===",
                scenario.label,
                self.mode,
                scenario.trials.len()
            )?;
            for trial in &scenario.trials {
                writeln!(f, "{trial}")?;
            }
        }
        Ok(())
    }
}
