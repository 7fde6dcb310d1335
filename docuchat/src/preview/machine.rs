//! Preview state machine.
//!
//! Every load attempt is tagged with a generation number. A completion is
//! applied only if its generation is still the current one, so a slow load
//! for a file the user already moved away from cannot overwrite the state of
//! a later selection.

use tracing::{debug, warn};

use super::render::{RenderOutcome, RenderRequest};
use crate::config::{PREVIEW_PAGE, PREVIEW_WIDTH};
use crate::models::{FileKind, UploadFile};

/// Rendering state of the selected file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PreviewState {
    /// Nothing selected.
    #[default]
    Idle,
    Loading,
    /// Rendered. Images carry no page count.
    Ready { page_count: Option<u32> },
    /// Waiting for the user to type a password.
    PasswordRequired { pending_password: String },
    /// Terminal for this attempt until retry.
    Failed,
}

/// A render that must be run and its outcome passed back to
/// [`PreviewMachine::complete`].
#[derive(Debug, Clone)]
pub struct LoadTicket {
    pub generation: u64,
    /// Index of the file in the session's file set.
    pub index: usize,
    pub request: RenderRequest,
}

/// Tracks the selected file and its render state.
#[derive(Debug, Default)]
pub struct PreviewMachine {
    selected: Option<usize>,
    state: PreviewState,
    generation: u64,
}

impl PreviewMachine {
    /// Nothing selected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current render state.
    pub const fn state(&self) -> &PreviewState {
        &self.state
    }

    /// Index of the selected file.
    pub const fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Select `file` (at `index` in the session) for preview.
    ///
    /// Any in-progress state of the previous selection is dropped and the
    /// password is forgotten. Images are ready immediately and need no
    /// render; everything else returns a ticket to load.
    pub fn select(&mut self, index: usize, file: &UploadFile) -> Option<LoadTicket> {
        self.selected = Some(index);
        self.generation += 1;

        if file.kind() == FileKind::Image {
            self.state = PreviewState::Ready { page_count: None };
            return None;
        }

        self.state = PreviewState::Loading;
        debug!(
            file = %file.name,
            kind = %file.kind(),
            generation = self.generation,
            "loading preview"
        );
        Some(self.ticket(index, file, None))
    }

    /// Reselect the current file to force a fresh load attempt.
    pub fn retry(&mut self, file: &UploadFile) -> Option<LoadTicket> {
        let index = self.selected?;
        self.select(index, file)
    }

    /// Update the password being typed. Ignored unless a password is
    /// being asked for.
    pub fn set_password_input(&mut self, text: impl Into<String>) {
        if let PreviewState::PasswordRequired { pending_password } = &mut self.state {
            *pending_password = text.into();
        }
    }

    /// Retry the load with the typed password.
    pub fn submit_password(&mut self, file: &UploadFile) -> Option<LoadTicket> {
        let index = self.selected?;
        let PreviewState::PasswordRequired { pending_password } = &mut self.state else {
            return None;
        };
        let password = std::mem::take(pending_password);

        self.generation += 1;
        self.state = PreviewState::Loading;
        debug!(file = %file.name, generation = self.generation, "retrying preview with password");
        Some(self.ticket(index, file, Some(password)))
    }

    /// Apply a render outcome. Returns `false` when the completion was
    /// stale and discarded.
    pub fn complete(&mut self, generation: u64, outcome: RenderOutcome) -> bool {
        if generation != self.generation || self.state != PreviewState::Loading {
            debug!(
                generation,
                current = self.generation,
                "discarding stale preview completion"
            );
            return false;
        }

        self.state = match outcome {
            RenderOutcome::Loaded { page_count } => PreviewState::Ready {
                page_count: Some(page_count),
            },
            RenderOutcome::PasswordRequired => PreviewState::PasswordRequired {
                pending_password: String::new(),
            },
            RenderOutcome::Failed { reason } => {
                warn!(%reason, "preview failed to load");
                PreviewState::Failed
            }
        };
        true
    }

    /// Forget the selection; pending loads become stale.
    pub fn reset(&mut self) {
        self.selected = None;
        self.state = PreviewState::Idle;
        self.generation += 1;
    }

    fn ticket(&self, index: usize, file: &UploadFile, password: Option<String>) -> LoadTicket {
        LoadTicket {
            generation: self.generation,
            index,
            request: RenderRequest {
                document: file.shared_content(),
                password,
                page: PREVIEW_PAGE,
                width: PREVIEW_WIDTH,
            },
        }
    }
}
