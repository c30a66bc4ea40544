//! Parsers for the line-oriented `key:value` output of `synctex view`/`synctex edit`

use std::sync::LazyLock;

use regex::Regex;

use super::types::{RenderPosition, SourcePosition};

static PAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Page:(\d+)").expect("Failed to compile page regex"));
static X_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"x:([0-9.]+)").expect("Failed to compile x regex"));
static Y_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"y:([0-9.]+)").expect("Failed to compile y regex"));
static INPUT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Input:(.+)").expect("Failed to compile input regex"));
static LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Line:(\d+)").expect("Failed to compile line regex"));
static COLUMN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Column:(-?\d+)").expect("Failed to compile column regex"));

fn first_capture<'a>(re: &Regex, text: &'a str) -> Option<&'a str> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Parse forward (`view`) output.
///
/// Fields may appear in any order; the first match of each wins. Returns `None`
/// unless page, x and y are all present and numeric. Pages are 1-based, so
/// `Page:0` is rejected.
#[must_use]
pub fn parse_forward(output: &str) -> Option<RenderPosition> {
    let page = first_capture(&PAGE_RE, output)?
        .parse::<u32>()
        .ok()
        .filter(|page| *page > 0)?;
    let x = first_capture(&X_RE, output)?.parse::<f64>().ok()?;
    let y = first_capture(&Y_RE, output)?.parse::<f64>().ok()?;

    Some(RenderPosition { page, x, y })
}

/// Parse reverse (`edit`) output.
///
/// `Input:` and `Line:` are required. `Column:` defaults to 0 and negative
/// values are clamped to 0.
#[must_use]
pub fn parse_reverse(output: &str) -> Option<SourcePosition> {
    let file = first_capture(&INPUT_RE, output)?.trim();
    if file.is_empty() {
        return None;
    }
    let line = first_capture(&LINE_RE, output)?.parse::<u32>().ok()?;
    let column = first_capture(&COLUMN_RE, output)
        .and_then(|c| c.parse::<i64>().ok())
        .unwrap_or(0);

    Some(SourcePosition::from_raw(file, line, column))
}
