//! Viewer session: one surface, its resource allowlist and its lifecycle

use std::path::{Path, PathBuf};

use flume::{Receiver, Sender};
use log::{debug, error, info, warn};

use super::message::{InboundMessage, OutboundMessage};
use super::page::{PageAssets, generate_nonce, render_page};
use super::surface::{
    SURFACE_TITLE, Surface, SurfaceEvent, SurfaceEventKind, SurfaceHost, SurfaceId,
    SurfaceOptions, VIEW_TYPE, ViewColumn,
};
use crate::synctex::RenderPosition;

/// Renderer library location, relative to the extension root
const RENDERER_SCRIPT: &[&str] = &["node_modules", "pdfjs-dist", "build", "pdf.js"];
const RENDERER_WORKER: &[&str] = &["node_modules", "pdfjs-dist", "build", "pdf.worker.js"];

#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    #[error("PDF file not found: {}", .0.display())]
    ResourceNotFound(PathBuf),

    #[error("PDF viewer has been closed")]
    Disposed,
}

/// Where the session's surface stands in its lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Surface live, listeners bound
    Stable,
    /// Old surface torn down, replacement not yet bound
    Recreating,
    /// Closed for good
    Disposed,
}

/// Notifications relayed to subscribers
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    /// Modifier-click on a page asking for reverse sync
    SyncRequested(RenderPosition),
    Ready,
    RendererError(String),
    /// Fired once, when the session is closed for good
    Disposed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Receiving end of a session subscription
#[derive(Debug)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub events: Receiver<SessionEvent>,
}

#[derive(Clone, Debug, Default)]
pub struct ViewerConfig {
    /// Root of the installed extension; holds the renderer scripts
    pub extension_root: PathBuf,
    pub workspace_folders: Vec<PathBuf>,
    pub column: ViewColumn,
}

/// Owns a single display surface.
///
/// The raw surface never leaves the session, so recreating it is invisible to
/// anyone holding the session.
pub struct ViewerSession {
    host: Box<dyn SurfaceHost>,
    surface: Option<Box<dyn Surface>>,
    state: SessionState,
    /// Surface being torn down while `Recreating`
    replacing: Option<SurfaceId>,
    extension_root: PathBuf,
    current_document: Option<PathBuf>,
    allowed_roots: Vec<PathBuf>,
    events_tx: Sender<SurfaceEvent>,
    events_rx: Receiver<SurfaceEvent>,
    subscribers: Vec<(SubscriptionId, Sender<SessionEvent>)>,
    next_subscription: u64,
    recreations: usize,
    nonce: String,
}

impl ViewerSession {
    /// Create the session together with its first surface
    pub fn new(host: Box<dyn SurfaceHost>, config: ViewerConfig) -> Self {
        let mut allowed_roots = vec![config.extension_root.clone()];
        allowed_roots.extend(config.workspace_folders);

        let (events_tx, events_rx) = flume::unbounded();
        let mut session = Self {
            host,
            surface: None,
            state: SessionState::Stable,
            replacing: None,
            extension_root: config.extension_root,
            current_document: None,
            allowed_roots,
            events_tx,
            events_rx,
            subscribers: Vec::new(),
            next_subscription: 1,
            recreations: 0,
            nonce: String::new(),
        };
        session.surface = Some(session.create_surface(config.column));
        info!("PDF viewer session created");
        session
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.state == SessionState::Disposed
    }

    #[must_use]
    pub fn current_document(&self) -> Option<&Path> {
        self.current_document.as_deref()
    }

    #[must_use]
    pub fn allowed_roots(&self) -> &[PathBuf] {
        &self.allowed_roots
    }

    /// How many times the surface has been rebuilt for allowlist growth
    #[must_use]
    pub fn recreation_count(&self) -> usize {
        self.recreations
    }

    /// Nonce of the page in the live surface
    #[must_use]
    pub fn nonce(&self) -> &str {
        &self.nonce
    }

    /// Bring the surface to the foreground
    pub fn show(&mut self, column: ViewColumn) -> Result<(), ViewerError> {
        if self.is_disposed() {
            return Err(ViewerError::Disposed);
        }
        let surface = self.surface.as_mut().ok_or(ViewerError::Disposed)?;
        surface.reveal(Some(column));
        Ok(())
    }

    /// Display a document, growing the allowlist (and rebuilding the surface)
    /// if its directory is not yet covered
    pub fn load(&mut self, path: &Path) -> Result<(), ViewerError> {
        // A close queued by the host must win over a rebuild
        self.pump();
        if self.is_disposed() {
            return Err(ViewerError::Disposed);
        }
        if !path.exists() {
            error!("PDF file not found: {path:?}");
            return Err(ViewerError::ResourceNotFound(path.to_path_buf()));
        }

        let path = resolve_document(path);
        let dir = document_dir(&path);
        if !is_covered(&dir, &self.allowed_roots) {
            info!("Allowing resources from {dir:?}");
            self.allowed_roots.push(dir);
            self.recreate_surface();
        }

        let surface = self.surface.as_ref().ok_or(ViewerError::Disposed)?;
        let document_url = surface.resource_url(&path);
        self.current_document = Some(path);
        self.post(&OutboundMessage::LoadDocument { document_url })
    }

    /// Same as [`load`](Self::load); used after a recompilation
    pub fn reload(&mut self, path: &Path) -> Result<(), ViewerError> {
        self.load(path)
    }

    /// Scroll to a page position and flash a highlight there
    pub fn scroll_to(&mut self, position: RenderPosition) -> Result<(), ViewerError> {
        self.post(&OutboundMessage::from(position))
    }

    /// Register for session notifications
    pub fn subscribe(&mut self) -> Subscription {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        let (tx, rx) = flume::unbounded();
        self.subscribers.push((id, tx));
        Subscription { id, events: rx }
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.subscribers.retain(|(sub, _)| *sub != id);
    }

    /// Process events queued by the host; returns how many were handled
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_surface_event(event);
            handled += 1;
        }
        handled
    }

    /// Close the session: notify subscribers once, tear down the surface and
    /// drop all subscriptions. Calling it again does nothing.
    pub fn dispose(&mut self) {
        if self.is_disposed() {
            return;
        }
        self.state = SessionState::Disposed;
        info!("PDF viewer disposed");

        self.broadcast(SessionEvent::Disposed);
        if let Some(mut surface) = self.surface.take() {
            surface.dispose();
        }
        self.subscribers.clear();
        self.events_rx.drain().for_each(drop);
    }

    fn post(&mut self, message: &OutboundMessage) -> Result<(), ViewerError> {
        let surface = self.surface.as_mut().ok_or(ViewerError::Disposed)?;
        let json = message.to_json();
        debug!("-> surface {:?}: {json}", surface.id());
        if !surface.post_message(json) {
            warn!("Surface {:?} dropped a message", surface.id());
        }
        Ok(())
    }

    fn create_surface(&mut self, column: ViewColumn) -> Box<dyn Surface> {
        let options = SurfaceOptions {
            view_type: VIEW_TYPE,
            title: SURFACE_TITLE.to_string(),
            column,
            enable_scripts: true,
            retain_context_when_hidden: true,
            local_resource_roots: self.allowed_roots.clone(),
        };
        let mut surface = self.host.create_surface(options, self.events_tx.clone());

        let nonce = generate_nonce();
        let assets = PageAssets {
            csp_source: surface.csp_source(),
            renderer_script: surface.resource_url(&join_all(&self.extension_root, RENDERER_SCRIPT)),
            worker_script: surface.resource_url(&join_all(&self.extension_root, RENDERER_WORKER)),
            nonce: nonce.clone(),
        };
        surface.set_html(render_page(&assets));
        self.nonce = nonce;

        debug!("Created surface {:?} in {column:?}", surface.id());
        surface
    }

    fn recreate_surface(&mut self) {
        let column = self
            .surface
            .as_ref()
            .and_then(|s| s.column())
            .unwrap_or_default();

        self.state = SessionState::Recreating;
        if let Some(mut old) = self.surface.take() {
            debug!("Recreating surface {:?}", old.id());
            self.replacing = Some(old.id());
            old.dispose();
        }
        // Only the replaced surface's own disposal is queued by now
        self.pump();

        let surface = self.create_surface(column);
        self.surface = Some(surface);
        self.recreations += 1;
        self.replacing = None;
        self.state = SessionState::Stable;
    }

    fn handle_surface_event(&mut self, event: SurfaceEvent) {
        let current = self.surface.as_ref().map(|s| s.id());
        let is_current = current == Some(event.surface);

        match event.kind {
            SurfaceEventKind::Disposed => {
                if self.state == SessionState::Recreating && self.replacing == Some(event.surface) {
                    debug!("Suppressed disposal of {:?} during recreation", event.surface);
                } else if is_current {
                    info!("Surface {:?} closed", event.surface);
                    // The host already tore the surface down
                    self.dispose();
                } else {
                    debug!("Ignoring disposal of stale surface {:?}", event.surface);
                }
            }
            SurfaceEventKind::Message(raw) => {
                if !is_current {
                    debug!("Ignoring message from stale surface {:?}", event.surface);
                    return;
                }
                debug!("<- surface {:?}: {raw}", event.surface);
                match InboundMessage::parse(&raw) {
                    Ok(InboundMessage::SyncPdfToTex { page, x, y }) => {
                        self.broadcast(SessionEvent::SyncRequested(RenderPosition::new(page, x, y)));
                    }
                    Ok(InboundMessage::Ready) => {
                        info!("PDF viewer ready");
                        self.broadcast(SessionEvent::Ready);
                    }
                    Ok(InboundMessage::Error { text }) => {
                        warn!("PDF viewer error: {text}");
                        self.broadcast(SessionEvent::RendererError(text));
                    }
                    Err(e) => warn!("Ignoring unrecognized renderer message {raw}: {e}"),
                }
            }
        }
    }

    fn broadcast(&mut self, event: SessionEvent) {
        self.subscribers
            .retain(|(_, tx)| tx.send(event.clone()).is_ok());
    }
}

impl Drop for ViewerSession {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn join_all(root: &Path, parts: &[&str]) -> PathBuf {
    parts.iter().fold(root.to_path_buf(), |acc, part| acc.join(part))
}

/// Real location of an existing document, with `..` and symlinks resolved
fn resolve_document(path: &Path) -> PathBuf {
    std::fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

fn document_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn lowercase_components(path: &Path) -> Vec<String> {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().to_lowercase())
        .collect()
}

/// True if `dir` is one of `roots` or lies below one, ignoring case
#[must_use]
pub fn is_covered(dir: &Path, roots: &[PathBuf]) -> bool {
    let dir = lowercase_components(dir);
    roots.iter().any(|root| {
        let root = lowercase_components(root);
        !root.is_empty() && dir.starts_with(&root)
    })
}
