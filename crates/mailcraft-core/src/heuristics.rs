//! String heuristics used to classify model replies and user intent
//!
//! These decisions are inherently fuzzy, so each one lives behind a single
//! named predicate. Swapping a predicate for stricter validation (an actual
//! HTML parser, a structured classification call) must not touch any
//! orchestration logic.

use regex::Regex;
use std::sync::LazyLock;

static CLARIFYING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(question|clarify|please specify|could you|can you)\b")
        .expect("valid regex")
});
static IMAGERY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)image|photo|picture|visual|banner|graphic").expect("valid regex")
});
static IMAGE_QUERY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)images? of ([^.,;\n]+)").expect("valid regex"));

/// True when a planning reply reads as clarifying questions rather than a
/// plan. The pipeline halts on these and waits for the next user turn.
pub fn is_clarifying_reply(text: &str) -> bool {
    CLARIFYING.is_match(text)
}

/// True when the user's request calls for imagery, which triggers an image
/// search before planning.
pub fn mentions_imagery(text: &str) -> bool {
    IMAGERY.is_match(text)
}

/// Derives the image search query from the user's request: the phrase after
/// "image(s) of" when present, otherwise the whole request text.
pub fn derive_image_query(text: &str) -> &str {
    IMAGE_QUERY
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
        .unwrap_or(text)
}
