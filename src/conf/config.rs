use config::Config as CConfig;
use serde::{Deserialize, Serialize};

use crate::{
    bench::{BackendKind, BenchMode},
    conf::{BenchConfig, ContainerConfig, DatabaseConfig, FileConfig},
    core::{
        BenchError::{self, ConfigParsingError},
        CliArgs,
    },
};

const ENV_PREFIX: &str = "MOVIEBENCH";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub bench: BenchConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub container: ContainerConfig,
    #[serde(default)]
    pub file: FileConfig,
}

impl Config {
    pub fn from_str(toml_str: &str) -> Result<Config, BenchError> {
        let config = CConfig::builder()
            .add_source(config::File::from_str(toml_str, config::FileFormat::Toml))
            .build()
            .map_err(|e| ConfigParsingError(e.to_string()))?
            .try_deserialize::<Config>()
            .map_err(|e| ConfigParsingError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from an optional TOML file, then apply `MOVIEBENCH_<SECTION>__<KEY>`
    /// environment overrides. The result is not validated yet; see
    /// [`Config::with_args`].
    pub fn load(path: Option<&str>) -> Result<Config, BenchError> {
        let mut builder = CConfig::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path));
        }
        builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ConfigParsingError(e.to_string()))?
            .try_deserialize::<Config>()
            .map_err(|e| ConfigParsingError(e.to_string()))
    }

    /// Apply command-line overrides on top of the loaded values.
    pub fn with_args(mut self, args: &CliArgs) -> Result<Config, BenchError> {
        if let Some(mode) = args.mode {
            self.bench.mode = mode;
        }
        if let Some(single) = args.single {
            self.bench.single = Some(single);
        }
        if let Some(trials) = args.trials {
            self.bench.trials = trials;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), BenchError> {
        if self.bench.trials == 0 {
            return Err(ConfigParsingError("bench.trials must be positive".into()));
        }
        if self.bench.scenarios.is_empty() {
            return Err(ConfigParsingError(
                "bench.scenarios must name at least one scenario".into(),
            ));
        }
        if self.bench.mode == BenchMode::Single && self.bench.single.is_none() {
            return Err(ConfigParsingError(
                "bench.single is required when bench.mode is 'single'".into(),
            ));
        }
        if self.participants().contains(&BackendKind::File)
            && self.file.path.as_os_str().is_empty()
        {
            return Err(ConfigParsingError(
                "file.path must be set when the file backend participates".into(),
            ));
        }
        Ok(())
    }

    /// Backends compared by the configured mode, in report order.
    pub fn participants(&self) -> Vec<BackendKind> {
        self.bench.mode.participants(self.bench.single)
    }

    pub fn container_name(&self) -> String {
        self.container
            .name
            .clone()
            .unwrap_or_else(|| self.database.engine.name().to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use super::*;
    use crate::bench::Scenario;
    use crate::conf::{Engine, RecordSource};

    #[test]
    fn load_empty_toml_gives_defaults() {
        let conf = Config::from_str("").unwrap();
        assert_eq!(conf, Config::default());
        assert_eq!(conf.bench.trials, 20);
        assert_eq!(conf.bench.scenarios, Scenario::ALL.to_vec());
        assert_eq!(conf.container_name(), "postgresql");
    }

    #[test]
    fn load_correct_toml() {
        let toml = r#"
        [bench]
        trials = 5
        mode = "single"
        single = "file"
        fuzzy_keyword = "War"
        scenarios = ["fuzzy", "update"]
        memory_source = "file"

        [database]
        engine = "opengauss"
        port = 15433

        [container]
        name = "gauss"
        settle_delay = "250ms"

        [file]
        path = "/tmp/movies.txt"
        "#;
        let conf = Config::from_str(toml).unwrap();
        assert_eq!(conf.bench.trials, 5);
        assert_eq!(conf.bench.mode, BenchMode::Single);
        assert_eq!(conf.bench.single, Some(BackendKind::File));
        assert_eq!(conf.bench.fuzzy_keyword, "War");
        assert_eq!(conf.bench.scenarios, vec![Scenario::Fuzzy, Scenario::Update]);
        assert_eq!(conf.bench.memory_source, RecordSource::File);
        assert_eq!(conf.database.engine, Engine::Opengauss);
        assert_eq!(conf.database.port(), 15433);
        assert_eq!(conf.container.settle_delay, Duration::from_millis(250));
        assert_eq!(conf.container_name(), "gauss");
        assert_eq!(conf.file.path, PathBuf::from("/tmp/movies.txt"));
        assert_eq!(conf.participants(), vec![BackendKind::File]);
    }

    #[test]
    fn reject_unknown_fields() {
        let toml = r#"
        [bench]
        trails = 5
        "#;
        assert!(matches!(
            Config::from_str(toml),
            Err(ConfigParsingError(_))
        ));
    }

    #[test]
    fn reject_zero_trials() {
        let toml = r#"
        [bench]
        trials = 0
        "#;
        assert!(matches!(
            Config::from_str(toml),
            Err(ConfigParsingError(_))
        ));
    }

    #[test]
    fn reject_single_mode_without_backend() {
        let toml = r#"
        [bench]
        mode = "single"
        "#;
        assert!(matches!(
            Config::from_str(toml),
            Err(ConfigParsingError(_))
        ));
    }

    #[test]
    fn args_override_config() {
        let args = CliArgs {
            config: None,
            mode: Some(BenchMode::DbVsFile),
            single: None,
            trials: Some(2),
            json: false,
        };
        let conf = Config::default().with_args(&args).unwrap();
        assert_eq!(conf.bench.mode, BenchMode::DbVsFile);
        assert_eq!(conf.bench.trials, 2);
        assert_eq!(
            conf.participants(),
            vec![BackendKind::Database, BackendKind::File]
        );
    }
}
