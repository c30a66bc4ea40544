//! Positions exchanged with the correspondence tool

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A point on a rendered page.
///
/// `page` is 1-based. `x`/`y` are in untransformed (scale 1) layout units of
/// that page, as reported by the tool or descaled by the renderer before it
/// posts a pointer event.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RenderPosition {
    pub page: u32,
    pub x: f64,
    pub y: f64,
}

impl RenderPosition {
    #[must_use]
    pub const fn new(page: u32, x: f64, y: f64) -> Self {
        Self { page, x, y }
    }
}

/// A location in a source document.
///
/// `line` is 1-based. `column` is already normalized: the tool may report a
/// negative column, which is stored as 0.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePosition {
    pub file: PathBuf,
    pub line: u32,
    pub column: u32,
}

impl SourcePosition {
    /// Build a position from raw tool values, clamping negative columns to 0
    #[must_use]
    pub fn from_raw(file: impl Into<PathBuf>, line: u32, raw_column: i64) -> Self {
        Self {
            file: file.into(),
            line,
            column: u32::try_from(raw_column.max(0)).unwrap_or(u32::MAX),
        }
    }
}
