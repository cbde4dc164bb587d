//! Core type definitions for the chat request/response contract
//!
//! This module defines the data structures exchanged between callers and the
//! pipeline. The wire format uses camelCase field names to stay compatible
//! with the chat UI that consumes it. Conversation history is owned by the
//! caller across the whole multi-turn session; the pipeline receives a copy
//! per request and returns derived text, never mutating the history itself.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Joins the content of all user-role messages, preserving chat order.
///
/// Every stage prompt works from this flattened view of the user's intent
/// rather than the raw message list.
pub fn user_text(messages: &[Message]) -> String {
    messages
        .iter()
        .filter(|m| m.role == Role::User)
        .map(|m| m.content.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// One pipeline request: conversation history plus optional routing hints.
///
/// Absence of `email_html` routes to planning and creation; its presence
/// routes to the section edit pipeline. A caller-supplied `plan` skips the
/// planning stage entirely.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
}

/// Stage labels recorded in the audit log and echoed in responses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Planning,
    Creation,
    Done,
    EditStart,
    EditIdentify,
    EditEdit,
    EditReplaceError,
    EditFinal,
    EditError,
    Evaluation,
    Error,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::Planning => "planning",
            Stage::Creation => "creation",
            Stage::Done => "done",
            Stage::EditStart => "edit-start",
            Stage::EditIdentify => "edit-identify",
            Stage::EditEdit => "edit-edit",
            Stage::EditReplaceError => "edit-replace-error",
            Stage::EditFinal => "edit-final",
            Stage::EditError => "edit-error",
            Stage::Evaluation => "evaluation",
            Stage::Error => "error",
        };
        write!(f, "{}", label)
    }
}

/// Everything the pipeline can hand back to the caller.
///
/// `Clarification` pauses the conversation and waits for the next user turn.
/// `Completed` carries the document when extraction succeeded; without
/// `html_content` it is a soft failure and the raw model text doubles as the
/// user-facing message. The two error variants map to non-success statuses.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum ChatResponse {
    #[serde(rename_all = "camelCase")]
    Clarification { ai_message: String, stage: Stage },
    #[serde(rename_all = "camelCase")]
    Completed {
        ai_message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        html_content: Option<String>,
        stage: Stage,
    },
    Rejected { error: String, stage: Stage },
    Failed { error: String, details: String },
}

impl ChatResponse {
    pub fn status_code(&self) -> u16 {
        match self {
            ChatResponse::Clarification { .. } | ChatResponse::Completed { .. } => 200,
            ChatResponse::Rejected { stage, .. } => match stage {
                Stage::EditError => 400,
                _ => 500,
            },
            ChatResponse::Failed { .. } => 500,
        }
    }
}
