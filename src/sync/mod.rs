//! Routing between the editor, the viewer session and the correspondence tool

mod debounce;
mod orchestrator;
mod paths;

use std::path::{Path, PathBuf};

pub use debounce::SaveDebouncer;
pub use orchestrator::{HostFactory, SyncOptions, SyncOrchestrator};
pub use paths::{is_source_file, pdf_path_for};

/// Caret in the editor's zero-based convention
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Caret {
    pub file: PathBuf,
    pub line: u32,
    pub column: u32,
}

/// The host editor, as seen by the orchestrator
pub trait Editor {
    /// Caret of the active source document, if any
    fn caret(&self) -> Option<Caret>;

    /// Open (or focus) `file` and put the caret at zero-based `line`/`column`
    fn reveal(&mut self, file: &Path, line: u32, column: u32) -> anyhow::Result<()>;
}
