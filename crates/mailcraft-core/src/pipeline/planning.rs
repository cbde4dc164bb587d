//! Planning stage: turn a request into clarifying questions or a change plan
//!
//! One completion call decides what should change in the base template. The
//! model is instructed to either ask up to three clarifying questions or
//! produce a numbered change plan, never both and never raw HTML. A reply
//! that reads as questions halts the pipeline until the next user turn; a
//! plan flows straight into the creation stage with no confirmation round
//! trip.

use crate::core_types::Message;
use crate::errors::PipelineError;
use crate::heuristics;
use crate::llm::CompletionClient;
use crate::tools::image_search::ImageSearch;

const PLANNING_SYSTEM_PROMPT: &str = "You are an expert email campaign planner. Your job is to read the user's request and the base HTML template, and decide what changes are needed to fulfill the request. If the request is vague or missing details, ask up to 3 clarifying questions (one per message, as a list or individually). If the request is clear, output a step-by-step plan as a numbered list of changes. Do not generate any HTML.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanningOutcome {
    /// The model needs more detail; the raw reply is the user-facing message.
    NeedsClarification(String),
    /// A change plan, consumed verbatim by the creation stage.
    Plan(String),
}

pub async fn run(
    llm: &dyn CompletionClient,
    images: &dyn ImageSearch,
    base_template: &str,
    user_text: &str,
) -> Result<PlanningOutcome, PipelineError> {
    let image_context = gather_image_context(images, user_text).await;
    let system = format!(
        "{}\n\nBase template:\n{}{}",
        PLANNING_SYSTEM_PROMPT, base_template, image_context
    );
    let reply = llm
        .complete(vec![Message::system(system), Message::user(user_text)])
        .await?;

    if heuristics::is_clarifying_reply(&reply) {
        Ok(PlanningOutcome::NeedsClarification(reply))
    } else {
        Ok(PlanningOutcome::Plan(reply))
    }
}

/// When the request mentions imagery, folds up to three searched image URLs
/// into the planning context. Empty when the heuristic does not fire or the
/// search comes back empty.
async fn gather_image_context(images: &dyn ImageSearch, user_text: &str) -> String {
    if !heuristics::mentions_imagery(user_text) {
        return String::new();
    }
    let urls = images.search(heuristics::derive_image_query(user_text)).await;
    if urls.is_empty() {
        return String::new();
    }
    format!(
        "\nHere are some Unsplash image URLs you can use in your plan:\n{}",
        urls.join("\n")
    )
}
