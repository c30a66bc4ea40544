use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

static SOURCE_EXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.(tex|latex)$").expect("Failed to compile source extension regex"));

/// PDF path for a source file: a trailing `.tex`/`.latex` becomes `.pdf`.
/// Any other path is returned unchanged.
#[must_use]
pub fn pdf_path_for(source: &Path) -> PathBuf {
    let source = source.to_string_lossy();
    PathBuf::from(SOURCE_EXT_RE.replace(&source, ".pdf").into_owned())
}

/// True for `.tex`/`.latex` sources
#[must_use]
pub fn is_source_file(path: &Path) -> bool {
    SOURCE_EXT_RE.is_match(&path.to_string_lossy())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_tex_and_latex() {
        assert_eq!(pdf_path_for(Path::new("/proj/doc.tex")), PathBuf::from("/proj/doc.pdf"));
        assert_eq!(pdf_path_for(Path::new("/proj/doc.latex")), PathBuf::from("/proj/doc.pdf"));
    }

    #[test]
    fn only_trailing_extension_is_replaced() {
        assert_eq!(
            pdf_path_for(Path::new("/proj/my.tex.files/doc.tex")),
            PathBuf::from("/proj/my.tex.files/doc.pdf")
        );
    }

    #[test]
    fn other_paths_are_unchanged() {
        assert_eq!(pdf_path_for(Path::new("/proj/doc.md")), PathBuf::from("/proj/doc.md"));
        assert_eq!(pdf_path_for(Path::new("/proj/doc.TEX")), PathBuf::from("/proj/doc.TEX"));
    }

    #[test]
    fn detects_source_files() {
        assert!(is_source_file(Path::new("a.tex")));
        assert!(is_source_file(Path::new("a.latex")));
        assert!(!is_source_file(Path::new("a.pdf")));
    }
}
