//! In-memory collaborators for exercising sessions and the orchestrator

pub mod fake_surface {
    use std::path::Path;
    use std::sync::{Arc, Mutex, MutexGuard};

    use flume::Sender;

    use crate::viewer::{
        Surface, SurfaceEvent, SurfaceEventKind, SurfaceHost, SurfaceId, SurfaceOptions,
        ViewColumn,
    };

    struct SurfaceRecord {
        id: SurfaceId,
        options: SurfaceOptions,
        column: ViewColumn,
        html: String,
        posted: Vec<String>,
        disposed: bool,
        events: Sender<SurfaceEvent>,
    }

    #[derive(Default)]
    struct HostRecord {
        next_id: u64,
        surfaces: Vec<SurfaceRecord>,
    }

    /// Host that keeps every surface it ever created for inspection.
    ///
    /// Clones share state, so a test can hand one clone to the session and
    /// keep the other.
    #[derive(Clone, Default)]
    pub struct FakeSurfaceHost {
        inner: Arc<Mutex<HostRecord>>,
    }

    impl FakeSurfaceHost {
        pub fn new() -> Self {
            Self::default()
        }

        fn lock(&self) -> MutexGuard<'_, HostRecord> {
            self.inner
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
        }

        fn with_surface<R>(&self, id: SurfaceId, f: impl FnOnce(&mut SurfaceRecord) -> R) -> R {
            let mut inner = self.lock();
            let record = inner
                .surfaces
                .iter_mut()
                .find(|s| s.id == id)
                .unwrap_or_else(|| panic!("unknown surface {id:?}"));
            f(record)
        }

        pub fn created_count(&self) -> usize {
            self.lock().surfaces.len()
        }

        pub fn live_count(&self) -> usize {
            self.lock().surfaces.iter().filter(|s| !s.disposed).count()
        }

        /// Most recently created surface
        pub fn latest(&self) -> Option<SurfaceId> {
            self.lock().surfaces.last().map(|s| s.id)
        }

        pub fn options(&self, id: SurfaceId) -> SurfaceOptions {
            self.with_surface(id, |s| s.options.clone())
        }

        pub fn column(&self, id: SurfaceId) -> ViewColumn {
            self.with_surface(id, |s| s.column)
        }

        pub fn html(&self, id: SurfaceId) -> String {
            self.with_surface(id, |s| s.html.clone())
        }

        pub fn is_disposed(&self, id: SurfaceId) -> bool {
            self.with_surface(id, |s| s.disposed)
        }

        /// Messages posted to the surface, decoded
        pub fn posted(&self, id: SurfaceId) -> Vec<serde_json::Value> {
            self.with_surface(id, |s| {
                s.posted
                    .iter()
                    .map(|raw| serde_json::from_str(raw).expect("posted message is JSON"))
                    .collect()
            })
        }

        /// Simulate the renderer posting a message out of the surface
        pub fn renderer_post(&self, id: SurfaceId, json: &str) {
            self.with_surface(id, |s| {
                if !s.disposed {
                    let _ = s.events.send(SurfaceEvent {
                        surface: s.id,
                        kind: SurfaceEventKind::Message(json.to_string()),
                    });
                }
            });
        }

        /// Simulate the user closing the surface
        pub fn user_close(&self, id: SurfaceId) {
            self.with_surface(id, dispose_record);
        }
    }

    fn dispose_record(record: &mut SurfaceRecord) {
        if record.disposed {
            return;
        }
        record.disposed = true;
        let _ = record.events.send(SurfaceEvent {
            surface: record.id,
            kind: SurfaceEventKind::Disposed,
        });
    }

    impl SurfaceHost for FakeSurfaceHost {
        fn create_surface(
            &mut self,
            options: SurfaceOptions,
            events: Sender<SurfaceEvent>,
        ) -> Box<dyn Surface> {
            let mut inner = self.lock();
            inner.next_id += 1;
            let id = SurfaceId(inner.next_id);
            inner.surfaces.push(SurfaceRecord {
                id,
                column: options.column,
                options,
                html: String::new(),
                posted: Vec::new(),
                disposed: false,
                events,
            });
            drop(inner);

            Box::new(FakeSurface {
                id,
                host: self.clone(),
            })
        }
    }

    struct FakeSurface {
        id: SurfaceId,
        host: FakeSurfaceHost,
    }

    impl Surface for FakeSurface {
        fn id(&self) -> SurfaceId {
            self.id
        }

        fn csp_source(&self) -> String {
            "fake-resource:".to_string()
        }

        fn resource_url(&self, path: &Path) -> String {
            format!("fake-resource://{}", path.display())
        }

        fn set_html(&mut self, html: String) {
            self.host.with_surface(self.id, |s| s.html = html);
        }

        fn post_message(&mut self, json: String) -> bool {
            self.host.with_surface(self.id, |s| {
                if s.disposed {
                    false
                } else {
                    s.posted.push(json);
                    true
                }
            })
        }

        fn reveal(&mut self, column: Option<ViewColumn>) {
            if let Some(column) = column {
                self.host.with_surface(self.id, |s| s.column = column);
            }
        }

        fn column(&self) -> Option<ViewColumn> {
            Some(self.host.column(self.id))
        }

        fn dispose(&mut self) {
            self.host.with_surface(self.id, dispose_record);
        }
    }
}

pub mod fake_editor {
    use std::path::{Path, PathBuf};

    use crate::sync::{Caret, Editor};

    /// Editor with a settable caret that records every reveal
    #[derive(Debug, Default)]
    pub struct FakeEditor {
        pub caret: Option<Caret>,
        pub revealed: Vec<(PathBuf, u32, u32)>,
        pub fail_reveal: bool,
    }

    impl FakeEditor {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_caret(file: impl Into<PathBuf>, line: u32, column: u32) -> Self {
            Self {
                caret: Some(Caret {
                    file: file.into(),
                    line,
                    column,
                }),
                ..Self::default()
            }
        }
    }

    impl Editor for FakeEditor {
        fn caret(&self) -> Option<Caret> {
            self.caret.clone()
        }

        fn reveal(&mut self, file: &Path, line: u32, column: u32) -> anyhow::Result<()> {
            if self.fail_reveal {
                anyhow::bail!("cannot open {}", file.display());
            }
            self.revealed.push((file.to_path_buf(), line, column));
            Ok(())
        }
    }
}
