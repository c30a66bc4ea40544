use std::fs;
use std::path::PathBuf;

use cloverleaf::synctex::RenderPosition;
use cloverleaf::test_utils::fake_surface::FakeSurfaceHost;
use cloverleaf::viewer::{SessionEvent, SessionState, ViewColumn, ViewerConfig, ViewerSession};
use tempfile::TempDir;

fn write_pdf(dir: &std::path::Path, name: &str) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, b"%PDF-1.5").unwrap();
    path
}

fn session_with_root(root: PathBuf) -> (FakeSurfaceHost, ViewerSession) {
    let host = FakeSurfaceHost::new();
    let session = ViewerSession::new(
        Box::new(host.clone()),
        ViewerConfig {
            extension_root: root,
            workspace_folders: vec![],
            column: ViewColumn::Two,
        },
    );
    (host, session)
}

#[test]
fn allowlist_grows_once_per_new_directory() {
    let tmp = TempDir::new().unwrap();
    let base = fs::canonicalize(tmp.path()).unwrap();
    let a = base.join("A");
    let b = base.join("B");
    fs::create_dir_all(&a).unwrap();
    let first = write_pdf(&b, "first.pdf");
    let second = write_pdf(&b, "second.pdf");
    let (host, mut session) = session_with_root(a.clone());

    session.load(&first).unwrap();
    assert_eq!(session.recreation_count(), 1);
    assert_eq!(session.allowed_roots(), &[a.clone(), b.clone()]);

    session.load(&second).unwrap();
    assert_eq!(session.recreation_count(), 1);
    assert_eq!(host.created_count(), 2);
    assert_eq!(host.live_count(), 1);
}

#[test]
fn case_insensitive_coverage_skips_recreation() {
    let tmp = TempDir::new().unwrap();
    let base = fs::canonicalize(tmp.path()).unwrap();
    let pdf = write_pdf(&base.join("Docs"), "paper.pdf");
    let upper = PathBuf::from(base.to_string_lossy().to_uppercase());
    let (_host, mut session) = session_with_root(upper);

    session.load(&pdf).unwrap();
    assert_eq!(session.recreation_count(), 0);
}

#[test]
fn session_handle_stays_usable_across_recreation() {
    let tmp = TempDir::new().unwrap();
    let base = fs::canonicalize(tmp.path()).unwrap();
    let pdf = write_pdf(&base.join("out"), "doc.pdf");
    let (host, mut session) = session_with_root(base.join("ext"));
    let sub = session.subscribe();

    session.load(&pdf).unwrap();
    session
        .scroll_to(RenderPosition::new(4, 10.0, 20.0))
        .unwrap();
    session.pump();

    let live = host.latest().unwrap();
    let posted = host.posted(live);
    assert_eq!(posted.len(), 2);
    assert_eq!(posted[0]["command"], "loadDocument");
    assert_eq!(
        posted[0]["documentUrl"],
        format!("fake-resource://{}", pdf.display())
    );
    assert_eq!(posted[1]["page"], 4);

    assert_eq!(session.state(), SessionState::Stable);
    assert!(sub.events.try_recv().is_err());
}

#[test]
fn relative_parent_path_is_resolved_before_coverage() {
    let tmp = TempDir::new().unwrap();
    let base = fs::canonicalize(tmp.path()).unwrap();
    let allowed = base.join("allowed");
    fs::create_dir_all(&allowed).unwrap();
    let pdf = write_pdf(&base.join("elsewhere"), "doc.pdf");
    let (host, mut session) = session_with_root(allowed.clone());

    session
        .load(&allowed.join("..").join("elsewhere").join("doc.pdf"))
        .unwrap();

    assert_eq!(session.recreation_count(), 1);
    assert_eq!(session.current_document(), Some(pdf.as_path()));
    let live = host.latest().unwrap();
    assert!(
        host.options(live)
            .local_resource_roots
            .contains(&base.join("elsewhere"))
    );
}

#[test]
fn close_queued_before_load_wins() {
    let tmp = TempDir::new().unwrap();
    let base = fs::canonicalize(tmp.path()).unwrap();
    let pdf = write_pdf(&base.join("B"), "doc.pdf");
    let (host, mut session) = session_with_root(base.join("A"));
    let sub = session.subscribe();

    host.user_close(host.latest().unwrap());
    assert!(session.load(&pdf).is_err());
    session.pump();

    assert_eq!(session.state(), SessionState::Disposed);
    assert_eq!(host.live_count(), 0);
    assert_eq!(sub.events.drain().collect::<Vec<_>>(), vec![SessionEvent::Disposed]);
}

#[test]
fn explicit_dispose_twice_notifies_once() {
    let tmp = TempDir::new().unwrap();
    let (host, mut session) = session_with_root(tmp.path().to_path_buf());
    let sub = session.subscribe();
    let surface = host.latest().unwrap();

    session.dispose();
    session.dispose();

    assert!(host.is_disposed(surface));
    assert_eq!(sub.events.drain().collect::<Vec<_>>(), vec![SessionEvent::Disposed]);
}

#[test]
fn dropping_session_disposes_surface() {
    let tmp = TempDir::new().unwrap();
    let (host, session) = session_with_root(tmp.path().to_path_buf());
    let surface = host.latest().unwrap();

    drop(session);
    assert!(host.is_disposed(surface));
}
