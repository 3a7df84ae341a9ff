use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ContainerConfig {
    /// Container runtime CLI, e.g. `docker` or `podman`.
    #[serde(default = "ContainerConfig::default_runtime")]
    pub runtime: String,
    /// Container name. Falls back to the database engine name.
    #[serde(default)]
    pub name: Option<String>,
    /// SQL shell available inside the container.
    #[serde(default = "ContainerConfig::default_sql_client")]
    pub sql_client: String,
    #[serde(
        with = "humantime_serde",
        default = "ContainerConfig::default_command_timeout"
    )]
    pub command_timeout: Duration,
    #[serde(
        with = "humantime_serde",
        default = "ContainerConfig::default_settle_delay"
    )]
    pub settle_delay: Duration,
    #[serde(default = "ContainerConfig::default_log_lines")]
    pub log_lines: u32,
}

impl ContainerConfig {
    fn default_runtime() -> String {
        String::from("docker")
    }

    fn default_sql_client() -> String {
        String::from("psql")
    }

    fn default_command_timeout() -> Duration {
        Duration::from_secs(30)
    }

    fn default_settle_delay() -> Duration {
        Duration::from_secs(5)
    }

    fn default_log_lines() -> u32 {
        50
    }
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            runtime: Self::default_runtime(),
            name: None,
            sql_client: Self::default_sql_client(),
            command_timeout: Self::default_command_timeout(),
            settle_delay: Self::default_settle_delay(),
            log_lines: Self::default_log_lines(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_default() {
        let conf = ContainerConfig::default();
        assert_eq!(conf.runtime, "docker");
        assert_eq!(conf.sql_client, "psql");
        assert_eq!(conf.command_timeout, Duration::from_secs(30));
        assert_eq!(conf.settle_delay, Duration::from_secs(5));
        assert!(conf.name.is_none());
    }
}
