//! Runs the adapter against real child processes (unix shells only)
#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use cloverleaf::synctex::{RenderPosition, SyncTex, SyncTexError};
use serial_test::serial;
use tempfile::TempDir;

/// Write an executable script standing in for the synctex binary.
///
/// Serialized so no concurrent fork holds the script open for writing.
fn fake_tool(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("fake-synctex");
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[test]
#[serial]
fn forward_parses_real_process_output() {
    let dir = TempDir::new().unwrap();
    let tool = fake_tool(dir.path(), r#"printf 'SyncTeX result begin\nPage:2\nx:100.0\ny:200.0\n'"#);
    let synctex = SyncTex::new(tool.to_string_lossy());

    let pos = synctex
        .forward_sync(Path::new("doc.tex"), 10, 5, Path::new("doc.pdf"))
        .unwrap();
    assert_eq!(pos, Some(RenderPosition::new(2, 100.0, 200.0)));
}

#[test]
#[serial]
fn tool_receives_discrete_arguments() {
    let dir = TempDir::new().unwrap();
    // Echo each argument on its own line, then emit a valid reverse result
    let tool = fake_tool(
        dir.path(),
        r#"for a in "$@"; do echo "arg=$a" >> "$(dirname "$0")/args.txt"; done
printf 'Input:/proj/doc.tex\nLine:3\n'"#,
    );
    let synctex = SyncTex::new(tool.to_string_lossy());

    let pos = synctex
        .reverse_sync(Path::new("/proj/my doc;$(x).pdf"), 1, 2.5, 3.0)
        .unwrap()
        .unwrap();
    assert_eq!(pos.line, 3);

    let args = fs::read_to_string(dir.path().join("args.txt")).unwrap();
    assert_eq!(
        args.lines().collect::<Vec<_>>(),
        vec!["arg=edit", "arg=-o", "arg=1:2.5:3:/proj/my doc;$(x).pdf"]
    );
}

#[test]
#[serial]
fn non_zero_exit_is_none() {
    let dir = TempDir::new().unwrap();
    let tool = fake_tool(dir.path(), "exit 1");
    let synctex = SyncTex::new(tool.to_string_lossy());

    assert!(
        synctex
            .forward_sync(Path::new("a.tex"), 1, 1, Path::new("a.pdf"))
            .unwrap()
            .is_none()
    );
    assert!(
        synctex
            .reverse_sync(Path::new("a.pdf"), 1, 0.0, 0.0)
            .unwrap()
            .is_none()
    );
}

#[test]
fn missing_binary_is_a_launch_error() {
    let synctex = SyncTex::new("/nonexistent/cloverleaf-synctex");
    let err = synctex
        .forward_sync(Path::new("a.tex"), 1, 1, Path::new("a.pdf"))
        .unwrap_err();
    assert!(matches!(err, SyncTexError::Launch { .. }));
    assert!(err.to_string().contains("/nonexistent/cloverleaf-synctex"));
}
