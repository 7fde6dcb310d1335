//! DocuChat - client for chatting with your own documents.
//!
//! Files are uploaded into a backend session, questions are answered from
//! them, and the selected file can be previewed or saved locally.
//!
//! Architecture:
//! - `api` speaks the backend's HTTP contract (upload, query, clear)
//! - `session`, `upload`, `chat` and `preview` are plain state machines
//!   that hand out tickets for work and apply the results
//! - `app::DocuChat` owns all state, spawns the work and applies
//!   completions one at a time
//!
//! Rendering is supplied by the embedder through
//! [`preview::DocumentRenderer`]. The crate logs through `tracing` and
//! leaves installing a subscriber to the host.

pub mod api;
pub mod app;
pub mod chat;
pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod preview;
pub mod session;
pub mod upload;

#[cfg(test)]
mod test_support;

pub use app::{DocuChat, EventKind};
pub use config::ClientConfig;
pub use error::{ApiError, DownloadError};
