// Export modules for use in tests
pub mod notification;
pub mod panic_handler;
pub mod settings;
pub mod sync;
pub mod synctex;
pub mod viewer;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export the main entry points
pub use sync::{Caret, Editor, SyncOptions, SyncOrchestrator};
pub use synctex::{RenderPosition, SourcePosition, SyncTex, SyncTexError};
pub use viewer::{ViewerConfig, ViewerError, ViewerSession};
