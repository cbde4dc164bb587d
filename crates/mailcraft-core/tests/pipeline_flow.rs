use async_trait::async_trait;
use mailcraft_core::audit::NullAuditSink;
use mailcraft_core::core_types::{ChatRequest, ChatResponse, Message, Stage};
use mailcraft_core::errors::PipelineError;
use mailcraft_core::llm::CompletionClient;
use mailcraft_core::pipeline::{Pipeline, READY_MESSAGE, UPDATED_MESSAGE};
use mailcraft_core::store::NullArtifactStore;
use mailcraft_core::tools::image_search::NullImageSearch;
use std::sync::{Arc, Mutex};

const TEMPLATE: &str = "<html><body><h1>{{headline}}</h1></body></html>";
const DOCUMENT: &str = "<!DOCTYPE html><html><body><h1>Spring Sale</h1></body></html>";

struct MockCompletionClient {
    responses: Mutex<Vec<String>>,
}

impl MockCompletionClient {
    fn new(responses: Vec<&str>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(String::from).collect()),
        }
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    async fn complete(&self, _messages: Vec<Message>) -> Result<String, PipelineError> {
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Err(PipelineError::UpstreamError(
                "mock ran out of responses".to_string(),
            ))
        } else {
            Ok(responses.remove(0))
        }
    }
}

fn pipeline(responses: Vec<&str>) -> Pipeline {
    Pipeline::new(
        Arc::new(MockCompletionClient::new(responses)),
        TEMPLATE.to_string(),
        Arc::new(NullImageSearch),
        Arc::new(NullArtifactStore),
        Arc::new(NullAuditSink),
    )
}

#[tokio::test]
async fn full_creation_flow_produces_document() {
    let pipeline = pipeline(vec![
        "1. Put the spring sale headline in place",
        "```html\n<!DOCTYPE html><html><body><h1>Spring Sale</h1></body></html>\n```",
        "HTML",
        "COMPLETE",
    ]);
    let request = ChatRequest {
        messages: vec![Message::user("spring sale email with a bold headline")],
        email_html: None,
        plan: None,
    };

    match pipeline.handle(request).await {
        ChatResponse::Completed {
            ai_message,
            html_content,
            stage,
        } => {
            assert_eq!(ai_message, READY_MESSAGE);
            assert_eq!(html_content.as_deref(), Some(DOCUMENT));
            assert_eq!(stage, Stage::Done);
        }
        other => panic!("expected completion, got {:?}", other),
    }
}

#[tokio::test]
async fn clarification_halts_and_waits_for_the_next_turn() {
    let pipeline = pipeline(vec![
        "Before I plan this out, could you clarify the launch date?",
    ]);
    let request = ChatRequest {
        messages: vec![Message::user("make an announcement email")],
        email_html: None,
        plan: None,
    };

    match pipeline.handle(request).await {
        ChatResponse::Clarification { stage, .. } => assert_eq!(stage, Stage::Planning),
        other => panic!("expected clarification, got {:?}", other),
    }
}

#[tokio::test]
async fn edit_flow_rewrites_only_the_target_section() {
    let identify = r#"{"sections":[{"id":"headline","originalHtml":"<h1>Spring Sale</h1>","before":"<body>","after":"</body>"}]}"#;
    let pipeline = pipeline(vec![identify, "<h1>Summer Sale</h1>", "HTML", "COMPLETE"]);
    let request = ChatRequest {
        messages: vec![Message::user("change spring to summer")],
        email_html: Some(DOCUMENT.to_string()),
        plan: None,
    };

    match pipeline.handle(request).await {
        ChatResponse::Completed {
            ai_message,
            html_content,
            ..
        } => {
            assert_eq!(ai_message, UPDATED_MESSAGE);
            assert_eq!(
                html_content.as_deref(),
                Some("<!DOCTYPE html><html><body><h1>Summer Sale</h1></body></html>")
            );
        }
        other => panic!("expected completion, got {:?}", other),
    }
}

#[tokio::test]
async fn failed_replacement_leaves_document_untouched() {
    let identify = r#"{"sections":[{"id":"ghost","originalHtml":"<h2>Nope</h2>","before":"<aside>","after":"</aside>"}]}"#;
    let pipeline = pipeline(vec![identify, "<h2>Changed</h2>"]);
    let request = ChatRequest {
        messages: vec![Message::user("change the aside")],
        email_html: Some(DOCUMENT.to_string()),
        plan: None,
    };

    match pipeline.handle(request).await {
        ChatResponse::Rejected { stage, .. } => {
            assert_eq!(stage, Stage::EditReplaceError);
        }
        other => panic!("expected rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn upstream_outage_is_a_server_error() {
    let pipeline = pipeline(vec![]);
    let request = ChatRequest {
        messages: vec![Message::user("anything")],
        email_html: None,
        plan: None,
    };

    let response = pipeline.handle(request).await;
    assert_eq!(response.status_code(), 500);
    assert!(matches!(response, ChatResponse::Failed { .. }));
}
