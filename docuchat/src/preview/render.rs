//! Document rendering capability consumed by the preview.

use std::sync::Arc;

use async_trait::async_trait;

/// One render attempt: first page of a document at a fixed width.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub document: Arc<[u8]>,
    /// Password to unlock the document, if the user supplied one.
    pub password: Option<String>,
    /// 1-based page to draw.
    pub page: u32,
    /// Target width in pixels.
    pub width: u32,
}

/// What the rendering engine reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The document opened and the requested page was drawn.
    Loaded { page_count: u32 },
    /// The document is encrypted and the password was missing or wrong.
    PasswordRequired,
    /// Anything else: corruption, unsupported format, decode failure.
    Failed { reason: String },
}

/// A paginated-document rendering engine.
///
/// Implementations draw without interactive text or annotation layers.
#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    async fn render(&self, request: RenderRequest) -> RenderOutcome;
}
