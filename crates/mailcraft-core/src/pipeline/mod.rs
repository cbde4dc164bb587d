//! Pipeline orchestration: request routing, stage sequencing, audit trail
//!
//! The stages themselves are stateless functions of their explicit inputs and
//! the completion client capability; this module wires them together. A
//! request without an existing document routes through planning and creation;
//! a request carrying one routes through the section edit pipeline. Every
//! stage transition is recorded in the audit log, and every failure mode maps
//! to exactly one response shape.

use crate::audit::{AuditEntry, AuditSink};
use crate::core_types::{user_text, ChatRequest, ChatResponse, Stage};
use crate::errors::PipelineError;
use crate::llm::CompletionClient;
use crate::sections;
use crate::store::{self, ArtifactStore};
use crate::tools::image_search::ImageSearch;
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

pub mod creation;
pub mod edit;
pub mod evaluation;
pub mod planning;

pub use creation::READY_MESSAGE;
pub use edit::UPDATED_MESSAGE;
pub use planning::PlanningOutcome;

pub struct Pipeline {
    llm: Arc<dyn CompletionClient>,
    base_template: String,
    images: Arc<dyn ImageSearch>,
    artifacts: Arc<dyn ArtifactStore>,
    audit: Arc<dyn AuditSink>,
}

impl Pipeline {
    pub fn new(
        llm: Arc<dyn CompletionClient>,
        base_template: String,
        images: Arc<dyn ImageSearch>,
        artifacts: Arc<dyn ArtifactStore>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            llm,
            base_template,
            images,
            artifacts,
            audit,
        }
    }

    /// Processes one request end to end. Never returns an error: every
    /// failure mode is folded into the matching [`ChatResponse`] variant.
    pub async fn handle(&self, request: ChatRequest) -> ChatResponse {
        let request_id = Uuid::new_v4();
        match self.dispatch(&request, request_id).await {
            Ok(response) => response,
            Err(err) => {
                let (stage, response) = failure_response(err);
                self.log(request_id, stage, &request, response_payload(&response))
                    .await;
                response
            }
        }
    }

    async fn dispatch(
        &self,
        request: &ChatRequest,
        request_id: Uuid,
    ) -> Result<ChatResponse, PipelineError> {
        if let Some(email_html) = request.email_html.as_deref() {
            return self.run_edit(request, email_html, request_id).await;
        }
        let text = user_text(&request.messages);
        if let Some(plan) = request.plan.as_deref() {
            return self.run_creation(request, plan, &text, request_id).await;
        }
        self.run_planning(request, &text, request_id).await
    }

    async fn run_planning(
        &self,
        request: &ChatRequest,
        text: &str,
        request_id: Uuid,
    ) -> Result<ChatResponse, PipelineError> {
        let outcome =
            planning::run(&*self.llm, &*self.images, &self.base_template, text).await?;
        match outcome {
            PlanningOutcome::NeedsClarification(ai_message) => {
                self.log(
                    request_id,
                    Stage::Planning,
                    request,
                    json!({ "aiMessage": ai_message, "htmlContent": null }),
                )
                .await;
                Ok(ChatResponse::Clarification {
                    ai_message,
                    stage: Stage::Planning,
                })
            }
            PlanningOutcome::Plan(plan) => {
                self.run_creation(request, &plan, text, request_id).await
            }
        }
    }

    async fn run_creation(
        &self,
        request: &ChatRequest,
        plan: &str,
        text: &str,
        request_id: Uuid,
    ) -> Result<ChatResponse, PipelineError> {
        let outcome = creation::run(&*self.llm, &self.base_template, plan, text).await?;

        if let Some(html) = &outcome.html_content {
            let key = store::timestamp_key(Utc::now());
            self.artifacts.save(&key, html).await;
        }
        self.log(
            request_id,
            Stage::Creation,
            request,
            json!({ "aiMessage": outcome.ai_message, "htmlContent": outcome.html_content }),
        )
        .await;
        if let Some(html) = &outcome.html_content {
            self.evaluate(request, html, request_id).await;
        }

        Ok(ChatResponse::Completed {
            ai_message: outcome.ai_message,
            html_content: outcome.html_content,
            stage: Stage::Done,
        })
    }

    async fn run_edit(
        &self,
        request: &ChatRequest,
        email_html: &str,
        request_id: Uuid,
    ) -> Result<ChatResponse, PipelineError> {
        self.log(
            request_id,
            Stage::EditStart,
            request,
            json!({ "aiMessage": "Edit agent triggered", "htmlContent": null }),
        )
        .await;

        if request.messages.is_empty() {
            return Err(PipelineError::InvalidInput(
                "No messages provided for edit".to_string(),
            ));
        }
        if email_html.trim().is_empty() {
            return Err(PipelineError::InvalidInput("Invalid emailHtml".to_string()));
        }
        let text = user_text(&request.messages);

        let identified = edit::identify(&*self.llm, email_html, &text).await?;
        self.log(
            request_id,
            Stage::EditIdentify,
            request,
            json!({ "aiMessage": "Identified sections", "sections": identified }),
        )
        .await;

        let edited = edit::edit_sections(&*self.llm, identified, &text).await?;
        self.log(
            request_id,
            Stage::EditEdit,
            request,
            json!({ "aiMessage": "Edited sections", "sections": edited }),
        )
        .await;

        let updated = sections::splice_sections(email_html, &edited)?;
        self.log(
            request_id,
            Stage::EditFinal,
            request,
            json!({ "aiMessage": "Final HTML after section replacement", "htmlContent": updated }),
        )
        .await;
        self.evaluate(request, &updated, request_id).await;

        Ok(ChatResponse::Completed {
            ai_message: UPDATED_MESSAGE.to_string(),
            html_content: Some(updated),
            stage: Stage::Done,
        })
    }

    /// Advisory only: verdicts land in the audit log, failures are logged and
    /// swallowed, and nothing here can change the response.
    async fn evaluate(&self, request: &ChatRequest, html: &str, request_id: Uuid) {
        match evaluation::run(&*self.llm, html).await {
            Ok(report) => {
                self.log(
                    request_id,
                    Stage::Evaluation,
                    request,
                    json!({ "aiMessage": report.summary(), "htmlContent": null }),
                )
                .await;
            }
            Err(e) => log::warn!("evaluation checks failed: {}", e),
        }
    }

    async fn log(&self, request_id: Uuid, stage: Stage, request: &ChatRequest, response: Value) {
        let payload = serde_json::to_value(request).unwrap_or(Value::Null);
        self.audit
            .append(AuditEntry::new(request_id, stage, payload, response))
            .await;
    }
}

/// Folds a pipeline error into the stage label for its audit entry and the
/// response shape the caller sees.
fn failure_response(err: PipelineError) -> (Stage, ChatResponse) {
    match err {
        PipelineError::InvalidInput(message) => (
            Stage::EditError,
            ChatResponse::Rejected {
                error: message,
                stage: Stage::EditError,
            },
        ),
        PipelineError::ReplacementFailure(_) => (
            Stage::EditReplaceError,
            ChatResponse::Rejected {
                error: "Failed to safely replace one or more sections. The edit was not applied to avoid breaking the HTML.".to_string(),
                stage: Stage::EditReplaceError,
            },
        ),
        other => (
            Stage::Error,
            ChatResponse::Failed {
                error: "Failed to process your request".to_string(),
                details: other.to_string(),
            },
        ),
    }
}

fn response_payload(response: &ChatResponse) -> Value {
    serde_json::to_value(response).unwrap_or(Value::Null)
}
