//! Session identifier lifecycle and the committed file set.

use tracing::info;

use crate::models::{Session, UploadFile};

/// Notification after a new session is started.
pub const NEW_SESSION_MESSAGE: &str = "New session created";
/// Notification after the backend purged the session.
pub const CLEARED_MESSAGE: &str = "Session cleared successfully";
/// Notification when a clear fails without a backend detail.
pub const CLEAR_FAILED_MESSAGE: &str = "Failed to clear session";
/// Notification after the session id was handed over for copying.
pub const SESSION_ID_COPIED_MESSAGE: &str = "Session ID copied to clipboard";

/// A clear request that has been started and must be completed with
/// [`SessionManager::finish_clear`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearTicket {
    pub session_id: String,
}

/// Owns the live [`Session`].
///
/// The id only changes through [`SessionManager::create_session`] and
/// [`SessionManager::adopt_upload`].
#[derive(Debug, Default)]
pub struct SessionManager {
    session: Session,
    /// Bumped whenever the session is reset or replaced.
    epoch: u64,
    clearing: bool,
}

impl SessionManager {
    /// Fresh session with a random id and no files.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current session id.
    pub fn id(&self) -> &str {
        &self.session.id
    }

    /// Committed files, in selection order.
    pub fn files(&self) -> &[UploadFile] {
        &self.session.files
    }

    /// File at `index` in the committed set.
    pub fn file(&self, index: usize) -> Option<&UploadFile> {
        self.session.files.get(index)
    }

    /// Identifies the current session generation; replies tagged with an
    /// older epoch belong to a discarded session.
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    /// True while a clear request is outstanding.
    pub const fn is_clearing(&self) -> bool {
        self.clearing
    }

    /// Clearing needs files to purge and no other clear in flight.
    pub fn can_clear(&self) -> bool {
        !self.clearing && !self.session.files.is_empty()
    }

    /// Start over with a fresh local id and no files. No server call.
    pub fn create_session(&mut self) {
        self.session = Session::new();
        self.epoch += 1;
        info!(session_id = %self.session.id, "created new session");
    }

    /// Begin purging the current session on the backend.
    ///
    /// Returns `None` while another clear is still pending.
    pub fn begin_clear(&mut self) -> Option<ClearTicket> {
        if self.clearing {
            return None;
        }
        self.clearing = true;
        Some(ClearTicket {
            session_id: self.session.id.clone(),
        })
    }

    /// Apply the outcome of a clear. On success the file set is emptied and
    /// the id is retained; on failure nothing changes. Returns whether local
    /// state was purged, which is not the case when the session was replaced
    /// while the request was pending.
    pub fn finish_clear(&mut self, ticket: &ClearTicket, succeeded: bool) -> bool {
        self.clearing = false;
        if !succeeded || ticket.session_id != self.session.id {
            return false;
        }
        self.session.files.clear();
        self.epoch += 1;
        info!(session_id = %ticket.session_id, "session cleared");
        true
    }

    /// Commit a successful upload: the backend's id wins and the file set
    /// becomes exactly the uploaded batch.
    pub fn adopt_upload(&mut self, session_id: String, files: Vec<UploadFile>) {
        if session_id != self.session.id {
            info!(old = %self.session.id, new = %session_id, "backend assigned session id");
        }
        self.session = Session {
            id: session_id,
            files,
        };
        self.epoch += 1;
    }
}
