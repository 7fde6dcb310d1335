//! Preview of the file currently selected from the session.

mod download;
mod machine;
mod render;

pub use download::{default_download_dir, download};
pub use machine::{LoadTicket, PreviewMachine, PreviewState};
pub use render::{DocumentRenderer, RenderOutcome, RenderRequest};
