//! Wire types for the document backend.

use serde::Deserialize;

use crate::models::Source;

/// Body of a successful `POST /upload`.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    /// Session id the backend filed the documents under. May differ from
    /// the id that was sent.
    pub session_id: String,
    /// Number of documents the backend accepted.
    pub documents_added: usize,
    /// Human-readable summary, if the backend supplied one.
    #[serde(default)]
    pub message: Option<String>,
}

impl UploadResponse {
    /// Text for the success notification.
    pub fn summary(&self) -> String {
        self.message
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| format!("Uploaded {} documents successfully", self.documents_added))
    }
}

/// Body of a successful `POST /query`.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse {
    pub answer: String,
    #[serde(default)]
    sources: Option<Vec<Source>>,
}

impl QueryResponse {
    /// Citations; a missing or null list is empty.
    pub fn into_parts(self) -> (String, Vec<Source>) {
        (self.answer, self.sources.unwrap_or_default())
    }
}

/// Error body returned with non-2xx statuses.
///
/// `detail` is usually a string but validation failures send a list, which
/// is not shown to the user.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

impl ErrorBody {
    pub(crate) fn parse_detail(body: &[u8]) -> Option<String> {
        let parsed: Self = serde_json::from_slice(body).ok()?;
        match parsed.detail? {
            serde_json::Value::String(detail) if !detail.trim().is_empty() => Some(detail),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_summary_prefers_backend_message() {
        let resp: UploadResponse = serde_json::from_str(
            r#"{"session_id":"s1","documents_added":2,"message":"Indexed 2 files"}"#,
        )
        .unwrap();
        assert_eq!(resp.summary(), "Indexed 2 files");

        let resp: UploadResponse =
            serde_json::from_str(r#"{"session_id":"s1","documents_added":1}"#).unwrap();
        assert_eq!(resp.summary(), "Uploaded 1 documents successfully");
    }

    #[test]
    fn query_sources_default_to_empty() {
        let resp: QueryResponse =
            serde_json::from_str(r#"{"answer":"hi","sources":null}"#).unwrap();
        let (answer, sources) = resp.into_parts();
        assert_eq!(answer, "hi");
        assert!(sources.is_empty());

        let resp: QueryResponse = serde_json::from_str(
            r#"{"answer":"a","sources":[{"filename":"report.pdf","page":3,"snippet":"revenue"},{"filename":"notes.txt"}]}"#,
        )
        .unwrap();
        let (_, sources) = resp.into_parts();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].page, Some(3));
        assert_eq!(sources[1].snippet, None);
    }

    #[test]
    fn error_detail_only_when_string() {
        assert_eq!(
            ErrorBody::parse_detail(br#"{"detail":"Session not found"}"#).as_deref(),
            Some("Session not found")
        );
        assert_eq!(
            ErrorBody::parse_detail(br#"{"detail":[{"loc":["body"],"msg":"field required"}]}"#),
            None
        );
        assert_eq!(ErrorBody::parse_detail(b"<html>502</html>"), None);
        assert_eq!(ErrorBody::parse_detail(br"{}"), None);
    }
}
