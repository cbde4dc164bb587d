//! Section types and anchored, transactional document splicing
//!
//! A section is a bounded excerpt of the document targeted for independent
//! editing, carried together with enough surrounding text to anchor its
//! location. Sections are ephemeral: produced and consumed entirely within
//! one edit pipeline run. Splicing treats the whole batch as a single
//! transaction over the document snapshot: either every edited section finds
//! a safe insertion point, or the caller's document is left untouched.

use crate::errors::PipelineError;
use serde::{Deserialize, Serialize};

/// A candidate excerpt of the document plus its location anchors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub original_html: String,
    #[serde(default)]
    pub before: String,
    #[serde(default)]
    pub after: String,
}

/// A section plus the model's rewritten excerpt.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EditedSection {
    #[serde(flatten)]
    pub section: Section,
    pub new_html: String,
}

/// The structured reply expected from the section identification call.
#[derive(Debug, Deserialize)]
pub struct SectionList {
    pub sections: Vec<Section>,
}

/// The fallback section when identification fails to parse: the entire
/// document as one excerpt with empty anchors.
pub fn whole_document(html: &str) -> Section {
    Section {
        id: "whole".to_string(),
        original_html: html.to_string(),
        before: String::new(),
        after: String::new(),
    }
}

/// Splices every edited section back into the document, all-or-nothing.
///
/// Sections are applied in order against a working copy. Each one is located
/// with this tie-break order:
/// 1. with both anchors non-empty, the first occurrence of `before` and the
///    first occurrence of `after` strictly past it bracket the replacement
///    span
/// 2. otherwise the first verbatim occurrence of `original_html` is replaced
/// 3. otherwise the section is a replacement failure
///
/// If any section fails, the whole batch is rejected and the caller's
/// document must remain unchanged; a partially-edited document is worse than
/// no edit.
pub fn splice_sections(
    document: &str,
    edits: &[EditedSection],
) -> Result<String, PipelineError> {
    let mut updated = document.to_string();
    let mut failed: Vec<&str> = Vec::new();

    for edit in edits {
        let section = &edit.section;
        let mut replaced = false;

        if !section.before.is_empty() && !section.after.is_empty() {
            if let Some(before_idx) = updated.find(&section.before) {
                let span_start = before_idx + section.before.len();
                if let Some(after_offset) = updated[span_start..].find(&section.after) {
                    let span_end = span_start + after_offset;
                    updated.replace_range(span_start..span_end, &edit.new_html);
                    replaced = true;
                }
            }
        }

        if !replaced && !section.original_html.is_empty() {
            if let Some(idx) = updated.find(&section.original_html) {
                updated.replace_range(idx..idx + section.original_html.len(), &edit.new_html);
                replaced = true;
            }
        }

        if !replaced {
            log::warn!("failed to locate a safe insertion point for section id={}", section.id);
            failed.push(&section.id);
        }
    }

    if !failed.is_empty() {
        return Err(PipelineError::ReplacementFailure(format!(
            "could not anchor section(s): {}",
            failed.join(", ")
        )));
    }
    Ok(updated)
}
