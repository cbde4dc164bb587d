//! Core library for the Mailcraft email generation agent.
//!
//! This crate turns natural-language requests into HTML email documents by
//! orchestrating sequential calls to an LLM completion service. First-time
//! requests flow through a planning stage (which may pause to ask clarifying
//! questions) into a creation stage that rewrites a fixed base template.
//! Follow-up requests against an existing document go through a section edit
//! pipeline that identifies the affected excerpts, rewrites each one in
//! isolation, and re-splices them with anchored text matching instead of
//! regenerating the whole document.
//!
//! # Architecture Overview
//!
//! The crate is organized around a few subsystems:
//!
//! - **Pipeline orchestration**: request routing, stage sequencing, and
//!   failure mapping
//! - **Completion client**: a thin typed wrapper around the remote
//!   chat-completion API
//! - **Output recovery**: extraction of well-formed HTML from free-form
//!   model text, plus the string heuristics that classify model replies
//! - **Section splicing**: anchored, all-or-nothing replacement of edited
//!   document excerpts
//! - **Side channels**: append-only audit logging and fire-and-forget
//!   artifact persistence, neither of which may fail a request

pub mod audit;
pub mod config;
pub mod core_types;
pub mod errors;
pub mod extract;
pub mod heuristics;
pub mod llm;
pub mod pipeline;
pub mod sections;
pub mod store;
pub mod tools;

pub use audit::{AuditEntry, AuditSink, FileAuditSink, NullAuditSink};
pub use config::MailcraftConfig;
pub use core_types::{ChatRequest, ChatResponse, Message, Role, Stage};
pub use errors::PipelineError;
pub use extract::extract_html;
pub use llm::CompletionClient;
pub use pipeline::Pipeline;
pub use store::{ArtifactStore, FileArtifactStore, NullArtifactStore};
pub use tools::image_search::{ImageSearch, NullImageSearch, UnsplashClient};

#[cfg(test)]
pub mod test_utils;
