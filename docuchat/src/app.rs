//! Application controller.
//!
//! [`DocuChat`] owns the whole client state and is the only thing that
//! mutates it. Commands run synchronously: they update state and, where a
//! request is needed, spawn it on the tokio runtime. Spawned work never
//! touches state; it posts a completion back over a channel and
//! [`DocuChat::next_event`] applies completions one at a time.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, QueryResponse, UploadResponse};
use crate::chat::{ChatCoordinator, QueryTicket};
use crate::config::ClientConfig;
use crate::error::{ApiError, DownloadError};
use crate::models::{ChatMessage, UploadFile};
use crate::notify::{Notification, Notifier};
use crate::preview::{
    self, DocumentRenderer, LoadTicket, PreviewMachine, PreviewState, RenderOutcome,
};
use crate::session::{
    ClearTicket, SessionManager, CLEARED_MESSAGE, CLEAR_FAILED_MESSAGE, NEW_SESSION_MESSAGE,
    SESSION_ID_COPIED_MESSAGE,
};
use crate::upload::{
    UploadCoordinator, UploadRejection, UploadTicket, EMPTY_SELECTION_MESSAGE,
    UPLOAD_FAILED_MESSAGE,
};

/// Which kind of completion [`DocuChat::next_event`] applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Upload,
    Clear,
    Query,
    PreviewLoad,
}

/// Result of spawned work, applied on the controller.
#[derive(Debug)]
enum Completion {
    Upload {
        ticket: UploadTicket,
        result: Result<UploadResponse, ApiError>,
    },
    Clear {
        ticket: ClearTicket,
        result: Result<(), ApiError>,
    },
    Query {
        ticket: QueryTicket,
        result: Result<QueryResponse, ApiError>,
    },
    PreviewLoad {
        generation: u64,
        outcome: RenderOutcome,
    },
}

impl Completion {
    const fn kind(&self) -> EventKind {
        match self {
            Self::Upload { .. } => EventKind::Upload,
            Self::Clear { .. } => EventKind::Clear,
            Self::Query { .. } => EventKind::Query,
            Self::PreviewLoad { .. } => EventKind::PreviewLoad,
        }
    }
}

/// Every slice of client state, each owned by one component.
#[derive(Debug, Default)]
struct AppState {
    session: SessionManager,
    uploads: UploadCoordinator,
    preview: PreviewMachine,
    chat: ChatCoordinator,
    notifier: Notifier,
}

/// The document chat client.
///
/// Commands that start requests must be called from within a tokio runtime.
pub struct DocuChat {
    state: AppState,
    api: ApiClient,
    renderer: Arc<dyn DocumentRenderer>,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
    pending: usize,
}

impl DocuChat {
    /// Create a client for `config`, previewing documents with `renderer`.
    pub fn new(config: ClientConfig, renderer: Arc<dyn DocumentRenderer>) -> Result<Self> {
        Ok(Self::with_client(ApiClient::new(config)?, renderer))
    }

    /// Create a client around an existing [`ApiClient`].
    pub fn with_client(api: ApiClient, renderer: Arc<dyn DocumentRenderer>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let state = AppState::default();
        info!(session_id = %state.session.id(), base_url = %api.config().base_url(), "client started");
        Self {
            state,
            api,
            renderer,
            tx,
            rx,
            pending: 0,
        }
    }

    // === Read access ===

    /// Session slice: id, committed files, clear status.
    pub const fn session(&self) -> &SessionManager {
        &self.state.session
    }

    /// Current session id.
    pub fn session_id(&self) -> &str {
        self.state.session.id()
    }

    /// Files committed to the session, in selection order.
    pub fn files(&self) -> &[UploadFile] {
        self.state.session.files()
    }

    /// Chat slice: history, input buffer, suggestions.
    pub const fn chat(&self) -> &ChatCoordinator {
        &self.state.chat
    }

    /// Conversation history, oldest first.
    pub fn history(&self) -> &[ChatMessage] {
        self.state.chat.history()
    }

    /// Preview slice: selection and render state.
    pub const fn preview(&self) -> &PreviewMachine {
        &self.state.preview
    }

    /// Render state of the selected file.
    pub const fn preview_state(&self) -> &PreviewState {
        self.state.preview.state()
    }

    /// The file currently selected for preview.
    pub fn selected_file(&self) -> Option<&UploadFile> {
        self.state
            .preview
            .selected()
            .and_then(|i| self.state.session.file(i))
    }

    /// The visible notification, if it has not expired.
    pub fn notification(&self) -> Option<&Notification> {
        self.state.notifier.current()
    }

    /// Hide the visible notification before it expires.
    pub fn dismiss_notification(&mut self) {
        self.state.notifier.dismiss();
    }

    /// True while an upload request is outstanding.
    pub const fn is_uploading(&self) -> bool {
        self.state.uploads.is_uploading()
    }

    /// True while a question is awaiting its answer.
    pub const fn is_sending(&self) -> bool {
        self.state.chat.is_sending()
    }

    /// Whether [`Self::upload`] would start a request for `files`.
    pub const fn can_upload(&self, files: &[UploadFile]) -> bool {
        self.state.uploads.can_upload(files)
    }

    /// Whether the clear control should be enabled.
    pub fn can_clear(&self) -> bool {
        self.state.session.can_clear()
    }

    /// Whether the input buffer can be sent.
    pub fn can_send(&self) -> bool {
        self.state.chat.can_send()
    }

    /// Number of spawned requests whose completion has not been applied.
    pub const fn pending(&self) -> usize {
        self.pending
    }

    // === Session ===

    /// Start a fresh local session: new id, no files, no history.
    pub fn new_session(&mut self) {
        self.state.session.create_session();
        self.state.chat.reset();
        self.state.preview.reset();
        self.state.notifier.notify(NEW_SESSION_MESSAGE);
    }

    /// Hand the session id to the host for copying and confirm it to the
    /// user. The clipboard itself belongs to the host.
    pub fn copy_session_id(&mut self) -> String {
        let id = self.state.session.id().to_string();
        self.state.notifier.notify(SESSION_ID_COPIED_MESSAGE);
        id
    }

    /// Ask the backend to purge the current session. Returns `false` if a
    /// clear is already pending.
    pub fn clear_session(&mut self) -> bool {
        let Some(ticket) = self.state.session.begin_clear() else {
            debug!("clear already in progress");
            return false;
        };

        let api = self.api.clone();
        let aborted = ticket.clone();
        self.spawn(
            async move {
                let result = api.clear(&ticket.session_id).await;
                Completion::Clear { ticket, result }
            },
            move |reason| Completion::Clear {
                ticket: aborted,
                result: Err(ApiError::Interrupted(reason)),
            },
        );
        true
    }

    // === Upload ===

    /// Upload `files` into the current session. Returns `false` when the
    /// upload was refused locally.
    pub fn upload(&mut self, files: Vec<UploadFile>) -> bool {
        let ticket = match self.state.uploads.begin(files, self.state.session.id()) {
            Ok(ticket) => ticket,
            Err(UploadRejection::EmptySelection) => {
                self.state.notifier.notify(EMPTY_SELECTION_MESSAGE);
                return false;
            }
            Err(UploadRejection::InFlight) => {
                debug!("upload already in progress");
                return false;
            }
        };

        let api = self.api.clone();
        let aborted = ticket.clone();
        self.spawn(
            async move {
                let result = api.upload(&ticket.session_id, &ticket.files).await;
                Completion::Upload { ticket, result }
            },
            move |reason| Completion::Upload {
                ticket: aborted,
                result: Err(ApiError::Interrupted(reason)),
            },
        );
        true
    }

    // === Chat ===

    /// Replace the text being typed.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.state.chat.set_input(text);
    }

    /// Send `text` as a question. Returns `false` for blank text or while
    /// another question is awaiting its answer.
    pub fn send(&mut self, text: &str) -> bool {
        if self.state.chat.is_sending() {
            return false;
        }
        let ticket =
            self.state
                .chat
                .send(text, self.state.session.id(), self.state.session.epoch());
        self.dispatch_query(ticket)
    }

    /// Send the input buffer.
    pub fn send_input(&mut self) -> bool {
        if self.state.chat.is_sending() {
            return false;
        }
        let ticket = self
            .state
            .chat
            .send_input(self.state.session.id(), self.state.session.epoch());
        self.dispatch_query(ticket)
    }

    /// Send one of the suggested prompts, if they are on offer.
    pub fn send_suggestion(&mut self, index: usize) -> bool {
        match self.state.chat.suggestions().get(index) {
            Some(prompt) => self.send(prompt),
            None => false,
        }
    }

    fn dispatch_query(&mut self, ticket: Option<QueryTicket>) -> bool {
        let Some(ticket) = ticket else {
            return false;
        };

        let api = self.api.clone();
        let aborted = ticket.clone();
        self.spawn(
            async move {
                let result = api.query(&ticket.session_id, &ticket.question).await;
                Completion::Query { ticket, result }
            },
            move |reason| Completion::Query {
                ticket: aborted,
                result: Err(ApiError::Interrupted(reason)),
            },
        );
        true
    }

    // === Preview ===

    /// Select the file at `index` in the session for preview.
    pub fn select_file(&mut self, index: usize) -> bool {
        let Some(file) = self.state.session.file(index) else {
            return false;
        };
        let ticket = self.state.preview.select(index, file);
        self.dispatch_load(ticket);
        true
    }

    /// Reload the selected file from scratch, forgetting any password.
    pub fn retry_preview(&mut self) -> bool {
        let Some(file) = self.selected_file().cloned() else {
            return false;
        };
        let ticket = self.state.preview.retry(&file);
        self.dispatch_load(ticket);
        true
    }

    /// Update the password being typed for a protected document.
    pub fn set_password_input(&mut self, text: impl Into<String>) {
        self.state.preview.set_password_input(text);
    }

    /// Retry loading the selected document with the typed password.
    pub fn submit_password(&mut self) -> bool {
        let Some(file) = self.selected_file().cloned() else {
            return false;
        };
        let ticket = self.state.preview.submit_password(&file);
        self.dispatch_load(ticket)
    }

    /// Save the selected file's bytes locally. `dir` defaults to the
    /// platform download directory.
    pub fn download_selected(&self, dir: Option<&Path>) -> Result<PathBuf, DownloadError> {
        let file = self.selected_file().ok_or(DownloadError::NothingSelected)?;
        preview::download(file, dir)
    }

    fn dispatch_load(&mut self, ticket: Option<LoadTicket>) -> bool {
        let Some(LoadTicket {
            generation,
            request,
            ..
        }) = ticket
        else {
            return false;
        };

        let renderer = Arc::clone(&self.renderer);
        self.spawn(
            async move {
                let outcome = renderer.render(request).await;
                Completion::PreviewLoad {
                    generation,
                    outcome,
                }
            },
            move |reason| Completion::PreviewLoad {
                generation,
                outcome: RenderOutcome::Failed { reason },
            },
        );
        true
    }

    // === Event loop ===

    /// Run `work` on the runtime and post its completion. If the work
    /// panics, `aborted` builds the completion from the panic report instead,
    /// so every spawn yields exactly one completion.
    fn spawn<F, A>(&mut self, work: F, aborted: A)
    where
        F: Future<Output = Completion> + Send + 'static,
        A: FnOnce(String) -> Completion + Send + 'static,
    {
        let tx = self.tx.clone();
        self.pending += 1;
        tokio::spawn(async move {
            let completion = match tokio::spawn(work).await {
                Ok(completion) => completion,
                Err(err) => {
                    warn!(error = %err, "background task aborted");
                    aborted(err.to_string())
                }
            };
            let _ = tx.send(completion);
        });
    }

    /// Wait for the next completion and apply it. Returns `None` when
    /// nothing is pending.
    pub async fn next_event(&mut self) -> Option<EventKind> {
        if self.pending == 0 {
            return None;
        }
        let completion = self.rx.recv().await?;
        self.pending -= 1;
        let kind = completion.kind();
        self.apply(completion);
        Some(kind)
    }

    /// Apply completions until nothing is pending, including work spawned
    /// by the completions themselves.
    pub async fn settle(&mut self) {
        while self.next_event().await.is_some() {}
    }

    fn apply(&mut self, completion: Completion) {
        match completion {
            Completion::Upload { ticket, result } => self.apply_upload(ticket, result),
            Completion::Clear { ticket, result } => self.apply_clear(&ticket, result),
            Completion::Query { ticket, result } => {
                let epoch = self.state.session.epoch();
                self.state
                    .chat
                    .finish(&ticket, epoch, result.map(QueryResponse::into_parts));
            }
            Completion::PreviewLoad {
                generation,
                outcome,
            } => {
                self.state.preview.complete(generation, outcome);
            }
        }
    }

    fn apply_upload(&mut self, ticket: UploadTicket, result: Result<UploadResponse, ApiError>) {
        self.state.uploads.finish();
        match result {
            Ok(resp) => {
                let message = resp.summary();
                info!(
                    session_id = %resp.session_id,
                    documents_added = resp.documents_added,
                    "upload succeeded"
                );
                self.state.session.adopt_upload(resp.session_id, ticket.files);
                self.state.chat.reset();
                self.state.preview.reset();
                self.select_file(0);
                self.state.notifier.notify(message);
            }
            Err(err) => {
                warn!(error = %err, "upload failed");
                self.state
                    .notifier
                    .notify(err.user_message(UPLOAD_FAILED_MESSAGE));
            }
        }
    }

    fn apply_clear(&mut self, ticket: &ClearTicket, result: Result<(), ApiError>) {
        match result {
            Ok(()) => {
                if self.state.session.finish_clear(ticket, true) {
                    self.state.chat.reset();
                    self.state.preview.reset();
                }
                self.state.notifier.notify(CLEARED_MESSAGE);
            }
            Err(err) => {
                warn!(error = %err, "clear failed");
                self.state.session.finish_clear(ticket, false);
                self.state
                    .notifier
                    .notify(err.user_message(CLEAR_FAILED_MESSAGE));
            }
        }
    }
}
