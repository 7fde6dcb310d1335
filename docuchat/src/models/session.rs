//! Session model.

use uuid::Uuid;

use super::UploadFile;

/// The live session: a server-correlated id plus the files uploaded into it.
#[derive(Debug, Clone)]
pub struct Session {
    /// Opaque identifier. Generated locally, replaced by the backend's id
    /// after a successful upload.
    pub id: String,
    /// Committed files, in selection order.
    pub files: Vec<UploadFile>,
}

impl Session {
    /// Create an empty session with a fresh random id.
    pub fn new() -> Self {
        Self {
            id: generate_session_id(),
            files: Vec::new(),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate a random session token.
pub fn generate_session_id() -> String {
    Uuid::new_v4().to_string()
}
