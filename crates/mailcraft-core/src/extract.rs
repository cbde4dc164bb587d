//! HTML recovery from free-form model output
//!
//! Completion models wrap their output in markdown fences, fences without a
//! language tag, explanatory prose around raw HTML, or nothing at all. This
//! module recovers a well-formed HTML document from any of those shapes by
//! trying each form in reliability order, most explicit first.

use regex::Regex;
use std::sync::LazyLock;

static FENCED_HTML: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?si)```html\s*(.*?)```").expect("valid regex"));
static FENCED_ANY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?si)```\s*(.*?)```").expect("valid regex"));
static DOCTYPE_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?si)<!DOCTYPE html.*</html>").expect("valid regex"));
static HTML_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?si)<html.*</html>").expect("valid regex"));

/// Recovers an HTML document from raw model text.
///
/// Ordered, first match wins:
/// 1. a fenced block tagged `html`
/// 2. any generic fenced block
/// 3. a `<!DOCTYPE html>…</html>` or `<html>…</html>` span anywhere in the
///    text (first occurrence, greedy to the last closing tag)
/// 4. the trimmed text itself, when it already starts with a doctype or
///    `<html` tag
///
/// Returns `None` when no HTML can be recovered; callers must treat that as
/// failure, not partial success.
pub fn extract_html(raw: &str) -> Option<String> {
    if let Some(captures) = FENCED_HTML.captures(raw) {
        return Some(captures[1].trim().to_string());
    }
    if let Some(captures) = FENCED_ANY.captures(raw) {
        return Some(captures[1].trim().to_string());
    }
    if let Some(found) = DOCTYPE_SPAN.find(raw).or_else(|| HTML_SPAN.find(raw)) {
        return Some(found.as_str().trim().to_string());
    }
    let trimmed = raw.trim();
    if trimmed.starts_with("<!DOCTYPE html") || trimmed.starts_with("<html") {
        return Some(trimmed.to_string());
    }
    None
}
