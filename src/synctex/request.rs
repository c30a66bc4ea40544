//! Request and response types for the sync worker pool

use std::path::PathBuf;

use super::adapter::SyncTexError;
use super::types::{RenderPosition, SourcePosition};

/// Unique identifier for sync requests
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RequestId(pub u64);

impl RequestId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

/// One correspondence query
#[derive(Debug)]
pub enum SyncRequest {
    /// Source location to page position
    Forward {
        id: RequestId,
        source: PathBuf,
        line: u32,
        column: u32,
        pdf: PathBuf,
    },

    /// Page position to source location
    Reverse {
        id: RequestId,
        pdf: PathBuf,
        page: u32,
        x: f64,
        y: f64,
    },
}

impl SyncRequest {
    #[must_use]
    pub fn id(&self) -> RequestId {
        match self {
            Self::Forward { id, .. } | Self::Reverse { id, .. } => *id,
        }
    }
}

/// Answer to one query
#[derive(Debug)]
pub enum SyncResponse {
    Forward {
        id: RequestId,
        position: Option<RenderPosition>,
    },

    Reverse {
        id: RequestId,
        position: Option<SourcePosition>,
    },

    /// The tool could not be launched
    Failed { id: RequestId, error: SyncTexError },
}

impl SyncResponse {
    #[must_use]
    pub fn id(&self) -> RequestId {
        match self {
            Self::Forward { id, .. } | Self::Reverse { id, .. } | Self::Failed { id, .. } => *id,
        }
    }
}
