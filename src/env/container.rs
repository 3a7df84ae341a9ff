//! Lifecycle control of the containerized database.

use std::time::Duration;

use async_trait::async_trait;
use log::info;

use crate::conf::Config;
use crate::core::BenchError;
use crate::env::{CommandOutput, CommandRunner, EnvironmentControl};

/// Drives a container through the runtime CLI (`docker` by default).
///
/// Start, stop and restart wait `settle_delay` after the command returns,
/// since the container keeps changing state after the CLI exits.
#[derive(Debug, Clone)]
pub struct ContainerController {
    runner: CommandRunner,
    name: String,
    sql_client: String,
    user: String,
    dbname: String,
    settle_delay: Duration,
    log_lines: u32,
}

impl ContainerController {
    pub fn new(
        runner: CommandRunner,
        name: impl Into<String>,
        sql_client: impl Into<String>,
        user: impl Into<String>,
        dbname: impl Into<String>,
        settle_delay: Duration,
    ) -> Self {
        Self {
            runner,
            name: name.into(),
            sql_client: sql_client.into(),
            user: user.into(),
            dbname: dbname.into(),
            settle_delay,
            log_lines: 50,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let runner = CommandRunner::from_command_line(
            &config.container.runtime,
            config.container.command_timeout,
        );
        let mut controller = Self::new(
            runner,
            config.container_name(),
            config.container.sql_client.clone(),
            config.database.user(),
            config.database.dbname.clone(),
            config.container.settle_delay,
        );
        controller.log_lines = config.container.log_lines;
        controller
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn start(&self) -> Result<(), BenchError> {
        info!("starting container '{}'", self.name);
        self.runner.run(&["start", &self.name], true).await?;
        self.settle().await;
        Ok(())
    }

    pub async fn stop(&self) -> Result<(), BenchError> {
        info!("stopping container '{}'", self.name);
        self.runner.run(&["stop", &self.name], true).await?;
        self.settle().await;
        Ok(())
    }

    pub async fn restart(&self) -> Result<(), BenchError> {
        info!("restarting container '{}'", self.name);
        self.runner.run(&["restart", &self.name], true).await?;
        self.settle().await;
        Ok(())
    }

    /// A missing container counts as not running.
    pub async fn is_running(&self) -> Result<bool, BenchError> {
        let output = self
            .runner
            .run(&["inspect", "-f", "{{.State.Running}}", &self.name], false)
            .await?;
        Ok(output.success() && parse_running(&output.stdout))
    }

    pub async fn ensure_running(&self) -> Result<(), BenchError> {
        if self.is_running().await? {
            return Ok(());
        }
        self.start().await
    }

    /// The last `lines` lines of container logs, stdout and stderr combined.
    pub async fn logs(&self, lines: u32) -> Result<String, BenchError> {
        let lines = lines.to_string();
        let output = self
            .runner
            .run(&["logs", "--tail", &lines, &self.name], true)
            .await?;
        Ok(output.combined())
    }

    /// Run one SQL statement through the SQL shell inside the container.
    pub async fn exec_statement(&self, statement: &str) -> Result<CommandOutput, BenchError> {
        let args = self.exec_args(statement);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.runner.run(&args, true).await
    }

    /// Drop cached plans, prepared statements and session state.
    pub async fn discard_all(&self) -> Result<(), BenchError> {
        self.exec_statement("DISCARD ALL;").await?;
        Ok(())
    }

    fn exec_args(&self, statement: &str) -> Vec<String> {
        vec![
            "exec".to_string(),
            self.name.clone(),
            self.sql_client.clone(),
            "-U".to_string(),
            self.user.clone(),
            "-d".to_string(),
            self.dbname.clone(),
            "-c".to_string(),
            statement.to_string(),
        ]
    }

    async fn settle(&self) {
        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }
    }
}

#[async_trait]
impl EnvironmentControl for ContainerController {
    async fn prepare(&self) -> Result<(), BenchError> {
        self.ensure_running().await
    }

    async fn reset(&self) -> Result<(), BenchError> {
        self.restart().await?;
        self.discard_all().await
    }

    async fn diagnostics(&self) -> Option<String> {
        self.logs(self.log_lines).await.ok()
    }
}

/// Interpret `inspect` output, ignoring surrounding whitespace and quotes.
fn parse_running(output: &str) -> bool {
    let cleaned: String = output.chars().filter(|c| !matches!(c, '\'' | '"')).collect();
    cleaned.trim() == "true"
}
