// src/error.rs

use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can abort a run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport failure or non-2xx status from either API.
    #[error("request to {url} failed")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Response body (or input file) was not the JSON we expected.
    #[error("malformed JSON from {origin}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot access {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no build found for {url}")]
    EmptyBuild { url: String },

    #[error("build detail for {url} has no usable `{field}`")]
    MissingField { url: String, field: &'static str },

    #[error("invalid event timestamp {value:?} for {url}")]
    Timestamp {
        url: String,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("invalid term expression {expr:?}: {reason}")]
    Term { expr: String, reason: String },

    #[error("invalid status pattern")]
    Pattern(#[from] regex::Error),

    #[error("failed to write CSV")]
    Csv(#[from] csv::Error),

    #[error("No results for {query}")]
    NoResults { query: String },

    #[error("No logs for change ID {change_id}, patchset {patchset}")]
    NoLogs { change_id: String, patchset: String },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
