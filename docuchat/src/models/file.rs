//! Locally-held file handles selected for upload.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::ACCEPTED_EXTENSIONS;

/// Broad category of a selected file, derived from its MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Rendered directly, no loading phase.
    Image,
    /// Rendered page by page through the document renderer.
    PaginatedDocument,
    /// Anything else the backend may accept (DOCX, TXT).
    OtherDocument,
}

impl FileKind {
    /// Classify a MIME type string.
    pub fn from_mime(mime: &str) -> Self {
        let mime = mime.to_ascii_lowercase();
        if mime.starts_with("image/") {
            Self::Image
        } else if mime == "application/pdf" {
            Self::PaginatedDocument
        } else {
            Self::OtherDocument
        }
    }

    /// Short name used in logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::PaginatedDocument => "paginated-document",
            Self::OtherDocument => "other-document",
        }
    }
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A file the user picked, held in memory.
///
/// The content is shared and never mutated after selection, so cloning a
/// handle is cheap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    /// Original file name, used for the multipart part and for downloads.
    pub name: String,
    /// MIME-like content type.
    pub mime_type: String,
    content: Arc<[u8]>,
}

impl UploadFile {
    /// Create a handle from an in-memory buffer.
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            content: content.into(),
        }
    }

    /// Create a handle guessing the MIME type from the file name.
    pub fn with_guessed_type(name: impl Into<String>, content: Vec<u8>) -> Self {
        let name = name.into();
        let mime_type = mime_guess::from_path(&name)
            .first_or_octet_stream()
            .to_string();
        Self::new(name, mime_type, content)
    }

    /// Read a file from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .with_context(|| format!("Path has no file name: {}", path.display()))?;
        let content = std::fs::read(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Self::with_guessed_type(name, content))
    }

    /// Category derived from the MIME type.
    pub fn kind(&self) -> FileKind {
        FileKind::from_mime(&self.mime_type)
    }

    /// Raw bytes.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Shared handle to the bytes, for handing to a renderer.
    pub(crate) fn shared_content(&self) -> Arc<[u8]> {
        Arc::clone(&self.content)
    }

    /// Size in bytes.
    pub fn size(&self) -> usize {
        self.content.len()
    }

    /// Size in KiB, rounded to the nearest whole number.
    pub fn size_kb(&self) -> usize {
        (self.size() + 512) / 1024
    }

    /// Whether the name matches the client-side selection filter.
    ///
    /// This is advisory only; the backend decides what it accepts.
    pub fn is_accepted(&self) -> bool {
        let name = self.name.to_ascii_lowercase();
        ACCEPTED_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_from_mime() {
        assert_eq!(FileKind::from_mime("image/png"), FileKind::Image);
        assert_eq!(FileKind::from_mime("IMAGE/JPEG"), FileKind::Image);
        assert_eq!(
            FileKind::from_mime("application/pdf"),
            FileKind::PaginatedDocument
        );
        assert_eq!(FileKind::from_mime("text/plain"), FileKind::OtherDocument);
    }

    #[test]
    fn guessed_type_uses_extension() {
        let pdf = UploadFile::with_guessed_type("report.pdf", vec![1, 2, 3]);
        assert_eq!(pdf.mime_type, "application/pdf");
        assert_eq!(pdf.kind(), FileKind::PaginatedDocument);

        let png = UploadFile::with_guessed_type("scan.png", vec![]);
        assert_eq!(png.kind(), FileKind::Image);
    }

    #[test]
    fn size_kb_rounds() {
        let file = UploadFile::new("a.txt", "text/plain", vec![0; 1536]);
        assert_eq!(file.size(), 1536);
        assert_eq!(file.size_kb(), 2);
        let small = UploadFile::new("b.txt", "text/plain", vec![0; 100]);
        assert_eq!(small.size_kb(), 0);
    }

    #[test]
    fn accepted_extensions_are_advisory() {
        assert!(UploadFile::new("Notes.DOCX", "x", vec![]).is_accepted());
        assert!(!UploadFile::new("archive.zip", "x", vec![]).is_accepted());
    }

    #[test]
    fn from_path_reads_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"hello").unwrap();

        let file = UploadFile::from_path(&path).unwrap();
        assert_eq!(file.name, "notes.txt");
        assert_eq!(file.content(), b"hello");
        assert_eq!(file.kind(), FileKind::OtherDocument);
    }
}
