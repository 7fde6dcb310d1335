//! HTTP client for the document question-answering backend.

mod client;
mod types;

pub use client::ApiClient;
pub use types::{QueryResponse, UploadResponse};
