use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BenchError {
    #[error("Cannot parse config: {0}")]
    ConfigParsingError(String),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Cannot decode line: {0}")]
    DecodeError(String),
    #[error("Cannot replace data file {path}: {reason}")]
    FileReplaceError { path: String, reason: String },
    #[error("Cannot connect to database: {0}")]
    ConnectionError(String),
    #[error("Transaction failed and was rolled back: {0}")]
    TransactionError(String),
    #[error("Query failed: {0}")]
    QueryError(String),
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
    #[error("Cannot spawn '{command}': {reason}")]
    ProcessSpawnError { command: String, reason: String },
    #[error("Command timed out after {timeout:?}: {command}")]
    ProcessTimeoutError { command: String, timeout: Duration },
    #[error("Command failed (exit code {code}): {command}\noutput: {output}")]
    ProcessExitError {
        command: String,
        code: i32,
        output: String,
    },
}

impl From<std::io::Error> for BenchError {
    fn from(err: std::io::Error) -> Self {
        BenchError::IoError(err.to_string())
    }
}

impl From<tokio_postgres::Error> for BenchError {
    fn from(err: tokio_postgres::Error) -> Self {
        BenchError::QueryError(err.to_string())
    }
}
