//! Section edit pipeline: identify, rewrite, and re-splice document excerpts
//!
//! Follow-up edits never regenerate the document. Stage A asks the model to
//! partition the document into the section(s) relevant to the instruction.
//! Stage B rewrites each section in isolation; the per-section calls are
//! independent, so they fan out concurrently. Stage C (in [`crate::sections`])
//! splices every rewrite back into the original snapshot as a single
//! transaction. Stage A must fully complete before any stage B call, and all
//! stage B calls complete before stage C begins.

use crate::core_types::Message;
use crate::errors::PipelineError;
use crate::llm::CompletionClient;
use crate::sections::{self, EditedSection, Section, SectionList};
use futures_util::future::try_join_all;

const IDENTIFY_SYSTEM_PROMPT: &str = "You are an expert HTML email editor. Given the user's instruction and the current HTML, identify and extract the section(s) that need to be updated. If the entire HTML needs to be edited, return the whole HTML as a single section. For each section, provide a unique id, the original HTML, and enough before/after context to allow for safe replacement. Respond in JSON: { sections: [{ id, originalHtml, before, after }] }.";

const EDIT_SYSTEM_PROMPT: &str = "You are an expert at editing HTML email sections. Given a section of HTML, the user's instruction, and the before/after context, generate the updated section. Ensure the new section fits seamlessly with the before and after context. If the instruction requires editing the whole HTML, return the full, complete HTML document.";

pub const UPDATED_MESSAGE: &str = "Your template is updated! Preview it on the right.";

/// Stage A: partition the document into sections relevant to the
/// instruction.
///
/// A reply that fails to parse as the expected JSON falls back to a single
/// synthetic section spanning the whole document, trading precision for
/// robustness; the parse failure is never surfaced to the caller.
pub async fn identify(
    llm: &dyn CompletionClient,
    email_html: &str,
    user_text: &str,
) -> Result<Vec<Section>, PipelineError> {
    let user = format!("HTML:\n{}\n\nInstruction:\n{}", email_html, user_text);
    let reply = llm
        .complete(vec![Message::system(IDENTIFY_SYSTEM_PROMPT), Message::user(user)])
        .await?;

    match serde_json::from_str::<SectionList>(&reply) {
        Ok(list) => Ok(list.sections),
        Err(e) => {
            log::warn!(
                "section identification reply did not parse ({}); editing the whole document",
                e
            );
            Ok(vec![sections::whole_document(email_html)])
        }
    }
}

/// Stage B: rewrite every identified section, concurrently.
///
/// Sections are edited independently and order-independently; no section's
/// outcome depends on another's. An upstream failure on any one call fails
/// the whole request, since stage C needs every section to succeed anyway.
pub async fn edit_sections(
    llm: &dyn CompletionClient,
    sections: Vec<Section>,
    user_text: &str,
) -> Result<Vec<EditedSection>, PipelineError> {
    try_join_all(sections.into_iter().map(|section| async move {
        let user = format!(
            "Section:\n{}\n\nBefore:\n{}\n\nAfter:\n{}\n\nInstruction:\n{}",
            section.original_html, section.before, section.after, user_text
        );
        let new_html = llm
            .complete(vec![Message::system(EDIT_SYSTEM_PROMPT), Message::user(user)])
            .await?;
        Ok(EditedSection { section, new_html })
    }))
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::ScriptedCompletionClient;

    const DOCUMENT: &str = "<html><body><div id=hero>old</div></body></html>";

    #[tokio::test]
    async fn test_identify_parses_structured_reply() {
        let reply = r#"{"sections":[{"id":"hero","originalHtml":"<div id=hero>old</div>","before":"<body>","after":"</body>"}]}"#;
        let llm = ScriptedCompletionClient::replying(&[reply]);
        let found = identify(&llm, DOCUMENT, "change the hero").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "hero");
        let prompt = llm.request_text(0);
        assert!(prompt.contains(DOCUMENT));
        assert!(prompt.contains("change the hero"));
    }

    #[tokio::test]
    async fn test_identify_falls_back_to_whole_document() {
        let llm = ScriptedCompletionClient::replying(&["I think the hero section needs work."]);
        let found = identify(&llm, DOCUMENT, "change the hero").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "whole");
        assert_eq!(found[0].original_html, DOCUMENT);
        assert!(found[0].before.is_empty() && found[0].after.is_empty());
    }

    #[tokio::test]
    async fn test_identify_propagates_upstream_error() {
        let llm = ScriptedCompletionClient::new(vec![Err(PipelineError::UpstreamError(
            "unreachable".to_string(),
        ))]);
        let err = identify(&llm, DOCUMENT, "change it").await.unwrap_err();
        assert!(matches!(err, PipelineError::UpstreamError(_)));
    }

    #[tokio::test]
    async fn test_edit_sections_keeps_raw_reply_and_section_pairing() {
        let first = Section {
            id: "a".to_string(),
            original_html: "<p>one</p>".to_string(),
            before: "<body>".to_string(),
            after: "<hr>".to_string(),
        };
        let second = Section {
            id: "b".to_string(),
            original_html: "<p>two</p>".to_string(),
            before: "<hr>".to_string(),
            after: "</body>".to_string(),
        };
        let llm = ScriptedCompletionClient::replying(&["<p>ONE</p>", "<p>TWO</p>"]);
        let edited = edit_sections(&llm, vec![first, second], "capitalize")
            .await
            .unwrap();
        assert_eq!(edited.len(), 2);
        assert_eq!(edited[0].section.id, "a");
        assert_eq!(edited[0].new_html, "<p>ONE</p>");
        assert_eq!(edited[1].section.id, "b");
        assert_eq!(edited[1].new_html, "<p>TWO</p>");
        assert_eq!(llm.request_count(), 2);
    }

    #[tokio::test]
    async fn test_edit_sections_fails_whole_batch_on_one_error() {
        let section = |id: &str| Section {
            id: id.to_string(),
            original_html: "<p>x</p>".to_string(),
            before: String::new(),
            after: String::new(),
        };
        let llm = ScriptedCompletionClient::new(vec![
            Ok("<p>fine</p>".to_string()),
            Err(PipelineError::UpstreamError("edit call failed".to_string())),
        ]);
        let err = edit_sections(&llm, vec![section("a"), section("b")], "edit")
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::UpstreamError(_)));
    }
}
