//! Sync orchestrator - the context object every editor action goes through

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use log::{debug, info};

use super::debounce::SaveDebouncer;
use super::paths::{is_source_file, pdf_path_for};
use super::{Caret, Editor};
use crate::notification::NotificationManager;
use crate::settings::{self, Settings};
use crate::synctex::{RenderPosition, RequestId, SyncResponse, SyncTex, SyncTexService};
use crate::viewer::{SessionEvent, Subscription, SurfaceHost, ViewColumn, ViewerConfig, ViewerSession};

const NO_DOCUMENT: &str = "No active LaTeX document";
const NO_PREVIEW: &str = "PDF preview not open. Use \"Show PDF Preview\" first.";
const NO_FORWARD_MATCH: &str =
    "SyncTeX could not find corresponding PDF location. Ensure the document is compiled with -synctex=1";
const NO_REVERSE_MATCH: &str = "Could not find source location for this position";

/// Builds a fresh host connection for each new viewer session
pub type HostFactory = Box<dyn Fn() -> Box<dyn SurfaceHost>>;

#[derive(Clone, Debug)]
pub struct SyncOptions {
    pub viewer: ViewerConfig,
    /// Slot the preview is revealed in
    pub preview_column: ViewColumn,
    /// `None` disables auto-compile on save
    pub auto_compile_delay: Option<Duration>,
}

impl SyncOptions {
    #[must_use]
    pub fn from_settings(settings: &Settings, viewer: ViewerConfig) -> Self {
        Self {
            viewer,
            preview_column: settings.preview_column,
            auto_compile_delay: settings
                .auto_compile
                .then(|| Duration::from_millis(settings.auto_compile_delay_ms)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PendingSync {
    Forward,
    Reverse,
}

/// Owns the (lazily created) viewer session and the sync worker pool.
///
/// Every operation that may rebuild the session's surface ends with
/// [`rebind`](Self::rebind), so reverse-sync events keep flowing.
pub struct SyncOrchestrator {
    service: SyncTexService,
    new_host: HostFactory,
    options: SyncOptions,
    session: Option<ViewerSession>,
    binding: Option<Subscription>,
    pending: HashMap<RequestId, PendingSync>,
    notifications: NotificationManager,
    debouncer: Option<SaveDebouncer>,
}

impl SyncOrchestrator {
    pub fn new(synctex: SyncTex, new_host: HostFactory, options: SyncOptions) -> Self {
        let service = SyncTexService::new(synctex);
        let debouncer = options.auto_compile_delay.map(SaveDebouncer::new);
        Self {
            service,
            new_host,
            options,
            session: None,
            binding: None,
            pending: HashMap::new(),
            notifications: NotificationManager::new(),
            debouncer,
        }
    }

    /// Orchestrator configured from the global settings: the configured
    /// synctex command, preview column and auto-compile delay.
    ///
    /// This is the entry point for hosts; call [`settings::load_settings`]
    /// first.
    pub fn with_settings(new_host: HostFactory, viewer: ViewerConfig) -> Self {
        let settings = settings::current();
        let synctex = SyncTex::new(settings.synctex_command.clone());
        Self::new(synctex, new_host, SyncOptions::from_settings(&settings, viewer))
    }

    /// The live session, if a preview is open
    #[must_use]
    pub fn session(&self) -> Option<&ViewerSession> {
        self.session.as_ref().filter(|s| !s.is_disposed())
    }

    pub fn notifications(&mut self) -> &mut NotificationManager {
        &mut self.notifications
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Open (or focus) the preview for the active source and load its PDF
    pub fn show_preview(&mut self, editor: &dyn Editor) {
        let Some(caret) = editor.caret() else {
            self.notifications.error(NO_DOCUMENT);
            return;
        };
        let pdf = pdf_path_for(&caret.file);

        // A preview the user already closed must not be reused
        self.refresh_session();
        let column = self.options.preview_column;
        let session = self.ensure_session();
        let result = session.show(column).and_then(|()| session.load(&pdf));
        if let Err(e) = result {
            self.notifications.error(e.to_string());
        }

        self.rebind();
    }

    /// Queue a forward sync from the editor caret; the preview scrolls once
    /// the tool answers (see [`poll`](Self::poll))
    pub fn forward_sync(&mut self, editor: &dyn Editor) -> Option<RequestId> {
        let Some(Caret { file, line, column }) = editor.caret() else {
            self.notifications.error(NO_DOCUMENT);
            return None;
        };
        self.refresh_session();
        if self.session().is_none() {
            self.notifications.error(NO_PREVIEW);
            return None;
        }
        self.rebind();

        let pdf = pdf_path_for(&file);
        let id = self.service.forward(file, line + 1, column + 1, pdf);
        self.pending.insert(id, PendingSync::Forward);
        Some(id)
    }

    /// Outcome of the external compile pipeline for `source`
    pub fn on_compiled(&mut self, source: &Path, success: bool) {
        if !success {
            self.notifications
                .error("LaTeX compilation failed. Check output for details.");
            return;
        }
        self.notifications.info("LaTeX compilation successful");

        let pdf = pdf_path_for(source);
        self.refresh_session();
        if let Some(session) = self.session.as_mut().filter(|s| !s.is_disposed()) {
            if let Err(e) = session.reload(&pdf) {
                self.notifications.error(e.to_string());
            }
            self.rebind();
        }
    }

    /// Note a saved document for auto-compile
    pub fn on_saved(&mut self, source: &Path, now: Instant) {
        if let Some(debouncer) = self.debouncer.as_mut() {
            if is_source_file(source) {
                debug!("Scheduling compile of {source:?}");
                debouncer.note_saved(source, now);
            }
        }
    }

    /// Sources whose auto-compile delay has elapsed
    pub fn due_compiles(&mut self, now: Instant) -> Vec<PathBuf> {
        self.debouncer
            .as_mut()
            .map(|d| d.take_due(now))
            .unwrap_or_default()
    }

    /// Re-establish the subscription to the session's events.
    ///
    /// Events already queued on the old subscription are handled first.
    pub fn rebind(&mut self) {
        self.handle_session_events();

        let Some(session) = self.session.as_mut() else {
            self.binding = None;
            return;
        };
        if let Some(old) = self.binding.take() {
            session.unsubscribe(old.id);
        }
        self.binding = Some(session.subscribe());
        debug!("Rebound to viewer session");
    }

    /// Drive everything that happened since the last call: surface events,
    /// reverse-sync requests and completed tool runs
    pub fn poll(&mut self, editor: &mut dyn Editor) {
        if let Some(session) = self.session.as_mut() {
            session.pump();
        }
        self.handle_session_events();

        for response in self.service.poll_responses() {
            self.handle_response(response, editor);
        }
    }

    /// Poll until no sync request is pending; false on timeout
    pub fn wait_idle(&mut self, editor: &mut dyn Editor, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            self.poll(editor);
            if self.pending.is_empty() {
                return true;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            if let Some(response) = self
                .service
                .wait_response(remaining.min(Duration::from_millis(50)))
            {
                self.handle_response(response, editor);
            }
        }
    }

    /// Close the preview
    pub fn dispose(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.dispose();
        }
        self.binding = None;
    }

    /// Apply whatever the host queued for the session, including a user close
    fn refresh_session(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.pump();
        }
        self.handle_session_events();
    }

    fn ensure_session(&mut self) -> &mut ViewerSession {
        if self.session.as_ref().is_some_and(ViewerSession::is_disposed) {
            self.session = None;
            self.binding = None;
        }
        self.session.get_or_insert_with(|| {
            ViewerSession::new((self.new_host)(), self.options.viewer.clone())
        })
    }

    fn handle_session_events(&mut self) {
        let events: Vec<SessionEvent> = match &self.binding {
            Some(sub) => sub.events.drain().collect(),
            None => return,
        };

        for event in events {
            match event {
                SessionEvent::SyncRequested(position) => self.request_reverse(position),
                SessionEvent::Ready => debug!("Viewer ready"),
                SessionEvent::RendererError(text) => {
                    self.notifications.error(format!("PDF Viewer Error: {text}"));
                }
                SessionEvent::Disposed => {
                    info!("PDF viewer closed");
                    self.session = None;
                    self.binding = None;
                }
            }
        }
    }

    fn request_reverse(&mut self, position: RenderPosition) {
        let Some(pdf) = self
            .session()
            .and_then(ViewerSession::current_document)
            .map(Path::to_path_buf)
        else {
            self.notifications.error("No PDF loaded");
            return;
        };

        let id = self
            .service
            .reverse(pdf, position.page, position.x, position.y);
        self.pending.insert(id, PendingSync::Reverse);
    }

    fn handle_response(&mut self, response: SyncResponse, editor: &mut dyn Editor) {
        let kind = self.pending.remove(&response.id());

        match response {
            SyncResponse::Forward {
                position: Some(position),
                ..
            } => {
                let Some(session) = self.session.as_mut() else {
                    self.notifications.error(NO_PREVIEW);
                    return;
                };
                if let Err(e) = session.scroll_to(position) {
                    self.notifications.error(e.to_string());
                }
            }
            SyncResponse::Forward { position: None, .. } => {
                self.notifications.warn(NO_FORWARD_MATCH);
            }
            SyncResponse::Reverse {
                position: Some(source),
                ..
            } => {
                let line = source.line.saturating_sub(1);
                let column = source.column.saturating_sub(1);
                if let Err(e) = editor.reveal(&source.file, line, column) {
                    self.notifications
                        .error(format!("Could not open {}: {e:#}", source.file.display()));
                }
            }
            SyncResponse::Reverse { position: None, .. } => {
                self.notifications.warn(NO_REVERSE_MATCH);
            }
            SyncResponse::Failed { error, .. } => {
                let message = match kind {
                    Some(PendingSync::Reverse) => format!("Reverse SyncTeX error: {error}"),
                    _ => format!("SyncTeX error: {error}"),
                };
                self.notifications.error(message);
            }
        }
    }
}
