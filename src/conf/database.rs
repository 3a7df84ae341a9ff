use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Supported relational engines. Each carries its own connection defaults.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    Postgresql,
    Opengauss,
}

impl Engine {
    pub fn name(&self) -> &'static str {
        match self {
            Engine::Postgresql => "postgresql",
            Engine::Opengauss => "opengauss",
        }
    }

    fn default_port(&self) -> u16 {
        match self {
            Engine::Postgresql => 5432,
            Engine::Opengauss => 5433,
        }
    }

    fn default_user(&self) -> &'static str {
        match self {
            Engine::Postgresql => "postgres",
            Engine::Opengauss => "openGauss",
        }
    }

    fn default_password(&self) -> &'static str {
        match self {
            Engine::Postgresql => "123456",
            Engine::Opengauss => "openGauss@123",
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Connection settings. Unset `host`/`port`/`user`/`password` resolve to the
/// engine's built-in defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    #[serde(default = "DatabaseConfig::default_engine")]
    pub engine: Engine,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "DatabaseConfig::default_dbname")]
    pub dbname: String,
    #[serde(
        with = "humantime_serde",
        default = "DatabaseConfig::default_connect_timeout"
    )]
    pub connect_timeout: Duration,
}

impl DatabaseConfig {
    fn default_engine() -> Engine {
        Engine::Postgresql
    }

    fn default_dbname() -> String {
        String::from("movies_100000")
    }

    fn default_connect_timeout() -> Duration {
        Duration::from_secs(10)
    }

    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or("localhost")
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.engine.default_port())
    }

    pub fn user(&self) -> &str {
        self.user
            .as_deref()
            .unwrap_or_else(|| self.engine.default_user())
    }

    pub fn password(&self) -> &str {
        self.password
            .as_deref()
            .unwrap_or_else(|| self.engine.default_password())
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            engine: Self::default_engine(),
            host: None,
            port: None,
            user: None,
            password: None,
            dbname: Self::default_dbname(),
            connect_timeout: Self::default_connect_timeout(),
        }
    }
}
