//! SyncTeX correspondence: process adapter, output parsing and background queries

mod adapter;
mod parse;
mod request;
mod runner;
mod service;
mod types;
mod worker;

pub use adapter::{DEFAULT_SYNCTEX_COMMAND, SyncTex, SyncTexError};
pub use parse::{parse_forward, parse_reverse};
pub use request::{RequestId, SyncRequest, SyncResponse};
#[cfg(any(test, feature = "test-utils"))]
pub use runner::MockCommandRunner;
pub use runner::{CommandRunner, ProcessRunner, ToolOutput};
pub use service::SyncTexService;
pub use types::{RenderPosition, SourcePosition};
