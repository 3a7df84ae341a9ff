//! Relational backend. Timings come from the engine's own `EXPLAIN ANALYZE`
//! report, not from the client round trip.

mod plan;

pub use plan::{EXECUTION_TIME_MARKERS, execution_time_ms, plan_lines};

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error, info, warn};
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, NoTls, Transaction};

use crate::backend::QueryBackend;
use crate::bench::BackendKind;
use crate::conf::DatabaseConfig;
use crate::core::{BenchError, Record, TITLE_MAX_LEN, UPDATE_FROM, UPDATE_TO};
use crate::observe::ObservationSink;

const FUZZY_SQL: &str = "EXPLAIN ANALYZE SELECT * FROM movies WHERE title LIKE $1";
const EXACT_SQL: &str = "EXPLAIN ANALYZE SELECT * FROM movies WHERE movieid = $1";
const RANGE_SQL: &str =
    "EXPLAIN ANALYZE SELECT * FROM movies WHERE year_released BETWEEN $1 AND $2";
const LOAD_ALL_SQL: &str =
    "SELECT movieid, title, country, year_released, runtime FROM movies ORDER BY movieid";
const DRY_RUN_SAVEPOINT: &str = "explain_dry_run";

/// The bulk title rewrite. Rows whose rewritten title would exceed the length
/// bound are filtered by the engine itself.
pub fn update_sql() -> String {
    format!(
        "UPDATE movies SET title = replace(title, '{from}', '{to}') \
         WHERE length(replace(title, '{from}', '{to}')) <= {max}",
        from = UPDATE_FROM,
        to = UPDATE_TO,
        max = TITLE_MAX_LEN
    )
}

/// `LIKE` pattern matching `keyword` as a literal substring.
pub fn like_pattern(keyword: &str) -> String {
    let mut pattern = String::with_capacity(keyword.len() + 2);
    pattern.push('%');
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn millis(ms: f64) -> Duration {
    Duration::try_from_secs_f64(ms / 1000.0).unwrap_or_default()
}

pub struct DatabaseBackend {
    config: DatabaseConfig,
}

impl DatabaseBackend {
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Open a fresh connection. The container is restarted between trials,
    /// so connections are never reused across operations.
    pub async fn connect(&self) -> Result<Client, BenchError> {
        let (client, connection) = tokio_postgres::Config::new()
            .host(self.config.host())
            .port(self.config.port())
            .user(self.config.user())
            .password(self.config.password())
            .dbname(&self.config.dbname)
            .connect_timeout(self.config.connect_timeout)
            .connect(NoTls)
            .await
            .map_err(|e| {
                BenchError::ConnectionError(format!(
                    "{}@{}:{}/{}: {}",
                    self.config.user(),
                    self.config.host(),
                    self.config.port(),
                    self.config.dbname,
                    e
                ))
            })?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!("database connection error: {e}");
            }
        });

        Ok(client)
    }

    async fn explain(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<f64, BenchError> {
        let client = self.connect().await?;
        let rows = client.query(sql, params).await?;
        let ms = execution_time_ms(plan_lines(&rows).iter().map(String::as_str));
        debug!("{sql}: {ms} ms");
        Ok(ms)
    }

    pub async fn fuzzy(&self, keyword: &str) -> Result<f64, BenchError> {
        self.explain(FUZZY_SQL, &[&like_pattern(keyword)]).await
    }

    pub async fn exact(&self, id: u32) -> Result<f64, BenchError> {
        let id = i32::try_from(id)
            .map_err(|_| BenchError::InvalidQuery(format!("movie id {id} out of range")))?;
        self.explain(EXACT_SQL, &[&id]).await
    }

    pub async fn range(&self, low: i32, high: i32) -> Result<f64, BenchError> {
        self.explain(RANGE_SQL, &[&low, &high]).await
    }

    /// Run the title rewrite in one transaction and return the engine-reported
    /// time of the statement.
    ///
    /// The timing comes from an `EXPLAIN ANALYZE` of the same statement run
    /// inside a savepoint that is rolled back, so titles are rewritten once.
    /// Any failure rolls the whole transaction back.
    pub async fn update(&self) -> Result<f64, BenchError> {
        let mut client = self.connect().await?;
        let mut tx = client
            .transaction()
            .await
            .map_err(|e| BenchError::TransactionError(e.to_string()))?;

        match Self::update_in(&mut tx).await {
            Ok(ms) => {
                tx.commit()
                    .await
                    .map_err(|e| BenchError::TransactionError(e.to_string()))?;
                Ok(ms)
            }
            Err(e) => {
                if let Err(rollback) = tx.rollback().await {
                    warn!("rollback failed: {rollback}");
                }
                Err(BenchError::TransactionError(e.to_string()))
            }
        }
    }

    async fn update_in(tx: &mut Transaction<'_>) -> Result<f64, tokio_postgres::Error> {
        let sql = update_sql();

        let dry_run = tx.savepoint(DRY_RUN_SAVEPOINT).await?;
        let rows = dry_run.query(&format!("EXPLAIN ANALYZE {sql}"), &[]).await?;
        dry_run.rollback().await?;
        let ms = execution_time_ms(plan_lines(&rows).iter().map(String::as_str));

        let updated = tx.execute(&sql, &[]).await?;
        debug!("update touched {updated} rows in {ms} ms");
        Ok(ms)
    }

    /// Read the whole table, e.g. to seed a memory working set.
    pub async fn load_all(&self) -> Result<Vec<Record>, BenchError> {
        let client = self.connect().await?;
        let rows = client.query(LOAD_ALL_SQL, &[]).await?;
        let records = rows
            .iter()
            .map(|row| -> Result<Record, BenchError> {
                let id: i32 = row.try_get("movieid")?;
                let runtime: Option<i32> = row.try_get("runtime")?;
                Ok(Record {
                    id: u32::try_from(id).map_err(|_| {
                        BenchError::QueryError(format!("negative movieid {id}"))
                    })?,
                    title: row.try_get("title")?,
                    country: row.try_get("country")?,
                    year: row.try_get("year_released")?,
                    runtime: runtime.and_then(|r| u32::try_from(r).ok()),
                })
            })
            .collect::<Result<Vec<_>, BenchError>>()?;
        info!("loaded {} records from {}", records.len(), self.config.dbname);
        Ok(records)
    }
}

#[async_trait]
impl QueryBackend for DatabaseBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Database
    }

    async fn fuzzy_search(
        &self,
        keyword: &str,
        _sink: &ObservationSink,
    ) -> Result<Duration, BenchError> {
        Ok(millis(self.fuzzy(keyword).await?))
    }

    async fn exact_search(&self, id: u32, _sink: &ObservationSink) -> Result<Duration, BenchError> {
        Ok(millis(self.exact(id).await?))
    }

    async fn range_search(
        &self,
        low: i32,
        high: i32,
        _sink: &ObservationSink,
    ) -> Result<Duration, BenchError> {
        Ok(millis(self.range(low, high).await?))
    }

    async fn update_titles(&mut self, _sink: &ObservationSink) -> Result<Duration, BenchError> {
        Ok(millis(self.update().await?))
    }
}
