//! Shared fakes for pipeline tests.

use crate::audit::{AuditEntry, AuditSink};
use crate::core_types::Message;
use crate::errors::PipelineError;
use crate::llm::CompletionClient;
use crate::store::ArtifactStore;
use crate::tools::image_search::ImageSearch;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Completion client that replays a fixed script of responses and records
/// every request it receives.
pub struct ScriptedCompletionClient {
    responses: Mutex<VecDeque<Result<String, PipelineError>>>,
    pub requests: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedCompletionClient {
    pub fn new(responses: Vec<Result<String, PipelineError>>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::from(responses)),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(responses: &[&str]) -> Self {
        Self::new(responses.iter().map(|r| Ok(r.to_string())).collect())
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// The system+user prompt of the nth recorded call, flattened for
    /// assertions.
    pub fn request_text(&self, index: usize) -> String {
        self.requests.lock().unwrap()[index]
            .iter()
            .map(|m| m.content.clone())
            .collect::<Vec<_>>()
            .join("\n---\n")
    }
}

#[async_trait]
impl CompletionClient for ScriptedCompletionClient {
    async fn complete(&self, messages: Vec<Message>) -> Result<String, PipelineError> {
        self.requests.lock().unwrap().push(messages);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(PipelineError::UpstreamError(
                    "scripted client ran out of responses".to_string(),
                ))
            })
    }
}

/// Image search fake returning a fixed result set and recording queries.
pub struct RecordingImageSearch {
    pub results: Vec<String>,
    pub queries: Mutex<Vec<String>>,
}

impl RecordingImageSearch {
    pub fn new(results: Vec<String>) -> Self {
        Self {
            results,
            queries: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ImageSearch for RecordingImageSearch {
    async fn search(&self, query: &str) -> Vec<String> {
        self.queries.lock().unwrap().push(query.to_string());
        self.results.clone()
    }
}

/// Audit sink that keeps entries in memory for assertions.
#[derive(Default)]
pub struct MemoryAuditSink {
    pub entries: Mutex<Vec<AuditEntry>>,
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn append(&self, entry: AuditEntry) {
        self.entries.lock().unwrap().push(entry);
    }
}

impl MemoryAuditSink {
    pub fn stages(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.stage.to_string())
            .collect()
    }
}

/// Artifact store that keeps saved documents in memory.
#[derive(Default)]
pub struct MemoryArtifactStore {
    pub saved: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl ArtifactStore for MemoryArtifactStore {
    async fn save(&self, key: &str, content: &str) {
        self.saved
            .lock()
            .unwrap()
            .push((key.to_string(), content.to_string()));
    }
}
