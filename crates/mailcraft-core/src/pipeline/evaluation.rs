//! Evaluation stage: advisory validity checks on the final document
//!
//! Two independent yes/no completion calls: is the text a complete HTML email
//! document, and is it untruncated. Both verdicts are diagnostics recorded in
//! the audit log; they never block returning the document to the caller.

use crate::core_types::Message;
use crate::errors::PipelineError;
use crate::llm::CompletionClient;

const VALIDITY_SYSTEM_PROMPT: &str = "You are an evaluator. Check if the following text is a valid, production-ready HTML email template (starting with <!DOCTYPE html> or <html>). If it is, respond with ONLY 'HTML'. If not, respond with ONLY 'NOT_HTML'.";

const COMPLETENESS_SYSTEM_PROMPT: &str = "You are an evaluator. Check if the following HTML is complete and not cut off or truncated. Does it end with a proper closing </html> tag and contain all required sections? If it is complete, respond with ONLY 'COMPLETE'. If not, respond with ONLY 'INCOMPLETE'.";

/// Raw verdicts from the two checks, kept verbatim for the audit log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationReport {
    pub validity_verdict: String,
    pub completeness_verdict: String,
}

impl EvaluationReport {
    pub fn is_html(&self) -> bool {
        self.validity_verdict.trim() == "HTML"
    }

    pub fn is_complete(&self) -> bool {
        self.completeness_verdict.trim() == "COMPLETE"
    }

    /// The one-line summary written to the audit log.
    pub fn summary(&self) -> String {
        format!(
            "Eval1: {} | Eval2: {}",
            self.validity_verdict, self.completeness_verdict
        )
    }
}

pub async fn run(
    llm: &dyn CompletionClient,
    output: &str,
) -> Result<EvaluationReport, PipelineError> {
    let validity_verdict = llm
        .complete(vec![
            Message::system(VALIDITY_SYSTEM_PROMPT),
            Message::user(format!("Here is the text to evaluate:\n{}", output)),
        ])
        .await?;
    let completeness_verdict = llm
        .complete(vec![
            Message::system(COMPLETENESS_SYSTEM_PROMPT),
            Message::user(format!("Here is the HTML to check for completeness:\n{}", output)),
        ])
        .await?;
    Ok(EvaluationReport {
        validity_verdict,
        completeness_verdict,
    })
}
