//! Host-provided display surface abstraction
//!
//! The host environment owns the real sandboxed surface (and the renderer
//! painting into it). The session only sees these traits.

use std::path::{Path, PathBuf};

use flume::Sender;
use serde::{Deserialize, Serialize};

pub const VIEW_TYPE: &str = "cloverleafPdfViewer";
pub const SURFACE_TITLE: &str = "PDF Preview";

/// Host-assigned identity of one surface instance
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u64);

/// Layout slot a surface is shown in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ViewColumn {
    /// Whatever slot currently has focus
    Active,
    /// Next to the active slot
    Beside,
    One,
    #[default]
    Two,
    Three,
}

/// Creation parameters for a surface
#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceOptions {
    pub view_type: &'static str,
    pub title: String,
    pub column: ViewColumn,
    pub enable_scripts: bool,
    pub retain_context_when_hidden: bool,
    /// Directories the surface may load local resources from
    pub local_resource_roots: Vec<PathBuf>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SurfaceEventKind {
    /// Raw JSON posted by the renderer
    Message(String),
    /// The surface is gone (closed by the user or disposed by the session)
    Disposed,
}

/// Event delivered by the host on the channel bound at creation
#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceEvent {
    pub surface: SurfaceId,
    pub kind: SurfaceEventKind,
}

/// Creates surfaces. The sender is the surface's listener binding: the host
/// must deliver that surface's messages and its disposal through it.
pub trait SurfaceHost {
    fn create_surface(
        &mut self,
        options: SurfaceOptions,
        events: Sender<SurfaceEvent>,
    ) -> Box<dyn Surface>;
}

/// One live sandboxed surface
pub trait Surface {
    fn id(&self) -> SurfaceId;

    /// Source expression to use in the page's Content-Security-Policy
    fn csp_source(&self) -> String;

    /// Surface-local URL for a file under one of the resource roots
    fn resource_url(&self, path: &Path) -> String;

    fn set_html(&mut self, html: String);

    /// Fire-and-forget; returns false if the host dropped the message
    fn post_message(&mut self, json: String) -> bool;

    fn reveal(&mut self, column: Option<ViewColumn>);

    /// Current slot, if the host knows it
    fn column(&self) -> Option<ViewColumn>;

    fn dispose(&mut self);
}
