use log::{error, info};

use crate::backend::QueryBackend;
use crate::bench::{BackendKind, BenchMode, BenchReport, Scenario, ScenarioReport, Timing, TrialReport};
use crate::conf::BenchConfig;
use crate::core::{BenchError, Record};
use crate::env::EnvironmentControl;
use crate::observe::ObservationSink;

/// Runs every configured scenario against the participating backends.
///
/// Trials run strictly one after another. Before each trial the database
/// environment is reset (when the database participates) and, for the update
/// scenario, every backend holding a working set gets a pristine copy of the
/// base records. Any failure aborts the run.
pub struct Orchestrator {
    config: BenchConfig,
    env: Box<dyn EnvironmentControl>,
    backends: Vec<Box<dyn QueryBackend>>,
    base: Vec<Record>,
    sink: ObservationSink,
}

impl Orchestrator {
    pub fn new(
        config: BenchConfig,
        env: Box<dyn EnvironmentControl>,
        backends: Vec<Box<dyn QueryBackend>>,
        base: Vec<Record>,
    ) -> Self {
        Self {
            config,
            env,
            backends,
            base,
            sink: ObservationSink::new(),
        }
    }

    pub fn sink(&self) -> &ObservationSink {
        &self.sink
    }

    pub fn backends(&self) -> Vec<BackendKind> {
        self.backends.iter().map(|b| b.kind()).collect()
    }

    fn uses_database(&self) -> bool {
        self.backends
            .iter()
            .any(|b| b.kind() == BackendKind::Database)
    }

    pub async fn run(&mut self) -> Result<BenchReport, BenchError> {
        let mut scenarios = Vec::with_capacity(self.config.scenarios.len());
        for scenario in self.config.scenarios.clone() {
            match self.run_scenario(scenario).await {
                Ok(report) => scenarios.push(report),
                Err(e) => {
                    error!("scenario '{scenario}' aborted: {e}");
                    if self.uses_database() {
                        if let Some(logs) = self.env.diagnostics().await {
                            error!("recent environment output:\n{logs}");
                        }
                    }
                    self.sink.clear();
                    return Err(e);
                }
            }
        }
        info!(
            "run finished: {} scenarios, {} observations",
            scenarios.len(),
            self.sink.writes()
        );
        self.sink.clear();

        Ok(BenchReport {
            mode: self.mode(),
            backends: self.backends(),
            scenarios,
        })
    }

    pub async fn run_scenario(&mut self, scenario: Scenario) -> Result<ScenarioReport, BenchError> {
        let query = scenario.query(&self.config);
        let label = scenario.describe(&self.config);
        info!(
            "=== {} ({} trials, backends: {:?}) ===",
            label,
            self.config.trials,
            self.backends()
        );

        let uses_database = self.uses_database();
        if uses_database {
            self.env.prepare().await?;
        }

        let mut trials = Vec::with_capacity(self.config.trials as usize);
        for trial in 1..=self.config.trials {
            if uses_database {
                self.env.reset().await?;
            }
            if scenario == Scenario::Update {
                self.refresh_working_sets();
            }

            let mut timings = Vec::with_capacity(self.backends.len());
            for backend in self.backends.iter_mut() {
                let elapsed = backend.execute(&query, &self.sink).await?;
                timings.push(Timing {
                    backend: backend.kind(),
                    elapsed,
                });
            }

            let report = TrialReport { trial, timings };
            info!("{report}");
            trials.push(report);
        }

        Ok(ScenarioReport {
            scenario,
            label,
            trials,
        })
    }

    /// Replace every working set with a fresh copy of the untouched base set,
    /// undoing the previous update trial.
    fn refresh_working_sets(&mut self) {
        for backend in self.backends.iter_mut() {
            if let Some(working) = backend.working_set_mut() {
                working.clone_from(&self.base);
            }
        }
    }

    fn mode(&self) -> BenchMode {
        self.config.mode
    }
}
