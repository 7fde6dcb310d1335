//! Data models shared by the coordinators.

mod file;
mod message;
mod session;

pub use file::{FileKind, UploadFile};
pub use message::{ChatMessage, MessageId, MessageIdGen, Sender, Source};
pub use session::{generate_session_id, Session};
