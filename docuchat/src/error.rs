//! Error types surfaced by the backend client and local file operations.

use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a backend request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend answered with a non-2xx status.
    #[error("backend returned {status}")]
    Backend {
        status: StatusCode,
        /// The `detail` string from the JSON error body, when present.
        detail: Option<String>,
    },

    /// The request never completed.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// A 2xx response whose body could not be decoded.
    #[error("unexpected response body: {0}")]
    Decode(String),

    /// The task running the request died before producing a result.
    #[error("request task aborted: {0}")]
    Interrupted(String),
}

impl ApiError {
    /// Backend-provided message suitable for showing to the user.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Backend { detail, .. } => detail.as_deref(),
            Self::Transport(_) | Self::Decode(_) | Self::Interrupted(_) => None,
        }
    }

    /// The detail message, or `fallback` when the backend gave none.
    pub fn user_message(&self, fallback: &str) -> String {
        self.detail().unwrap_or(fallback).to_string()
    }
}

/// Failure to save a local copy of a file.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("no file is selected for preview")]
    NothingSelected,

    #[error("could not determine a download directory")]
    NoDownloadDir,

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
