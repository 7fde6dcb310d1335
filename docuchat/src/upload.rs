//! Turning a local file selection into a committed server-side session.

use thiserror::Error;
use tracing::debug;

use crate::models::UploadFile;

/// Notification when upload is triggered with nothing selected.
pub const EMPTY_SELECTION_MESSAGE: &str = "Please select at least one file";
/// Notification when an upload fails without a backend detail.
pub const UPLOAD_FAILED_MESSAGE: &str = "Upload failed. Please try again.";

/// Why an upload was refused before any request was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UploadRejection {
    #[error("no files selected")]
    EmptySelection,
    #[error("an upload is already in progress")]
    InFlight,
}

/// An upload that has been started. Carries the exact batch that was sent
/// so the same files can be committed on success.
#[derive(Debug, Clone)]
pub struct UploadTicket {
    pub session_id: String,
    pub files: Vec<UploadFile>,
}

/// Tracks the single in-flight upload.
#[derive(Debug, Default)]
pub struct UploadCoordinator {
    uploading: bool,
}

impl UploadCoordinator {
    /// Idle coordinator.
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a request is outstanding; the upload control is disabled
    /// and shows progress instead.
    pub const fn is_uploading(&self) -> bool {
        self.uploading
    }

    /// Upload is enabled when idle and `files` is non-empty.
    pub const fn can_upload(&self, files: &[UploadFile]) -> bool {
        !self.uploading && !files.is_empty()
    }

    /// Start an upload of `files` into `session_id`.
    pub fn begin(
        &mut self,
        files: Vec<UploadFile>,
        session_id: &str,
    ) -> Result<UploadTicket, UploadRejection> {
        if files.is_empty() {
            return Err(UploadRejection::EmptySelection);
        }
        if self.uploading {
            return Err(UploadRejection::InFlight);
        }

        self.uploading = true;
        debug!(session_id, files = files.len(), "upload started");
        Ok(UploadTicket {
            session_id: session_id.to_string(),
            files,
        })
    }

    /// Mark the outstanding upload as resolved, whatever the outcome.
    pub fn finish(&mut self) {
        self.uploading = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_selection_is_rejected_without_side_effects() {
        let mut uploads = UploadCoordinator::new();
        assert_eq!(
            uploads.begin(Vec::new(), "s0").unwrap_err(),
            UploadRejection::EmptySelection
        );
        assert!(!uploads.is_uploading());
    }

    #[test]
    fn only_one_upload_in_flight() {
        let mut uploads = UploadCoordinator::new();
        let files = vec![UploadFile::new("a.pdf", "application/pdf", vec![1])];
        assert!(uploads.can_upload(&files));

        let ticket = uploads.begin(files.clone(), "s0").unwrap();
        assert_eq!(ticket.session_id, "s0");
        assert_eq!(ticket.files, files);
        assert!(uploads.is_uploading());
        assert!(!uploads.can_upload(&files));
        assert_eq!(
            uploads.begin(files.clone(), "s0").unwrap_err(),
            UploadRejection::InFlight
        );

        uploads.finish();
        assert!(uploads.can_upload(&files));
    }
}
