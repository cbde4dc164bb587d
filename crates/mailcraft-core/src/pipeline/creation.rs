//! Creation stage: produce a full HTML document from a plan
//!
//! One completion call rewrites the base template according to the plan. The
//! system prompt pins the model to the template: only the parts the plan
//! requires may change, never a regeneration from scratch. Malformed output
//! gets exactly one retry with a stricter prompt carrying the prior raw
//! reply; a second failure is a soft failure where the raw text becomes the
//! user-facing message and no document is produced.

use crate::core_types::Message;
use crate::errors::PipelineError;
use crate::extract::extract_html;
use crate::llm::CompletionClient;

const CREATION_SYSTEM_PROMPT: &str = "You are an expert, world-class email template designer and conversion specialist. Your job is to create highly engaging, visually appealing, and conversion-optimized HTML email templates.\n\nYou MUST use the following HTML as your starting point. Only modify the necessary parts to fulfill the user's request and the following plan. Do NOT generate a new template from scratch. Replace only the relevant placeholders or sections, and preserve the overall structure, layout, and styles of the base template.\n\nReturn ONLY the HTML code, with no explanations, markdown, or comments. Do not include any text before or after the HTML. Output must start with <!DOCTYPE html> or <html>.";

const RETRY_SYSTEM_PROMPT: &str = "Your last response did not contain valid HTML. You must return ONLY the HTML code for the email, with no explanations, markdown, or comments. Output must start with <!DOCTYPE html> or <html>. Do not include any text before or after the HTML.";

pub const READY_MESSAGE: &str = "Your template is ready! Preview it on the right.";

/// What the creation stage hands back: a user-facing message, and the
/// document when extraction succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreationOutcome {
    pub ai_message: String,
    pub html_content: Option<String>,
}

pub async fn run(
    llm: &dyn CompletionClient,
    base_template: &str,
    plan: &str,
    user_text: &str,
) -> Result<CreationOutcome, PipelineError> {
    let system = format!(
        "{}\n\nHere is the base template:\n{}\n\nHere is the plan for changes:\n{}",
        CREATION_SYSTEM_PROMPT, base_template, plan
    );
    let first = llm
        .complete(vec![Message::system(system), Message::user(user_text)])
        .await?;

    match extracted(&first) {
        Ok(html) => Ok(success(html)),
        Err(_) => {
            log::debug!("creation output was not HTML, retrying once; first attempt:\n{}", first);
            let retry_user = format!("Please try again. Here was your last response:\n{}", first);
            let second = llm
                .complete(vec![
                    Message::system(RETRY_SYSTEM_PROMPT),
                    Message::user(retry_user),
                ])
                .await?;
            match extracted(&second) {
                Ok(html) => Ok(success(html)),
                Err(_) => {
                    log::debug!("creation retry output was not HTML either:\n{}", second);
                    Ok(CreationOutcome {
                        ai_message: second,
                        html_content: None,
                    })
                }
            }
        }
    }
}

fn extracted(raw: &str) -> Result<String, PipelineError> {
    extract_html(raw).ok_or(PipelineError::ExtractionFailure)
}

fn success(html: String) -> CreationOutcome {
    CreationOutcome {
        ai_message: READY_MESSAGE.to_string(),
        html_content: Some(html),
    }
}
