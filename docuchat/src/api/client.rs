//! Backend requests: upload, query and clear.

use anyhow::{Context, Result};
use reqwest::multipart::{Form, Part};
use reqwest::Response;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::types::{ErrorBody, QueryResponse, UploadResponse};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::models::UploadFile;

/// Thin client over the backend's HTTP contract.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl ApiClient {
    /// Create a client for the configured backend.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { http, config })
    }

    /// Backend settings this client was built with.
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Upload `files` into `session_id` as one multipart request.
    pub async fn upload(
        &self,
        session_id: &str,
        files: &[UploadFile],
    ) -> Result<UploadResponse, ApiError> {
        let mut form = Form::new().text("session_id", session_id.to_string());
        for file in files {
            form = form.part("files", file_part(file));
        }

        debug!(session_id, files = files.len(), "uploading documents");
        let resp = self
            .http
            .post(self.config.endpoint("upload"))
            .multipart(form)
            .send()
            .await?;

        decode(check(resp).await?).await
    }

    /// Ask a question about the documents in `session_id`.
    pub async fn query(&self, session_id: &str, question: &str) -> Result<QueryResponse, ApiError> {
        let form = Form::new()
            .text("session_id", session_id.to_string())
            .text("question", question.to_string());

        debug!(session_id, "sending query");
        let resp = self
            .http
            .post(self.config.endpoint("query"))
            .multipart(form)
            .send()
            .await?;

        decode(check(resp).await?).await
    }

    /// Purge the backend's state for `session_id`.
    pub async fn clear(&self, session_id: &str) -> Result<(), ApiError> {
        let url = format!(
            "{}?session_id={}",
            self.config.endpoint("clear"),
            urlencoding::encode(session_id)
        );

        debug!(session_id, "clearing session");
        let resp = self.http.get(&url).send().await?;
        check(resp).await?;
        Ok(())
    }
}

/// Multipart part for one file, falling back to an untyped part when the
/// stored MIME type is not parseable.
fn file_part(file: &UploadFile) -> Part {
    let part = || Part::bytes(file.content().to_vec()).file_name(file.name.clone());
    part().mime_str(&file.mime_type).unwrap_or_else(|_| part())
}

/// Turn a non-2xx response into [`ApiError::Backend`].
async fn check(resp: Response) -> Result<Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.bytes().await.unwrap_or_default();
    let detail = ErrorBody::parse_detail(&body);
    debug!(%status, ?detail, "backend rejected request");
    Err(ApiError::Backend { status, detail })
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
    let body = resp.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))
}
