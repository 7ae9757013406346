use futures::StreamExt;
use regdesk_core::RegdeskError;
use regdesk_core::completion::{CompletionClient, PromptMessage};
use regdesk_core::config::ProviderConfig;
use regdesk_interaction::OpenAICompletionClient;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> OpenAICompletionClient {
    let config = ProviderConfig {
        base_url: format!("{}/v1", server.uri()),
        ..ProviderConfig::default()
    };
    OpenAICompletionClient::from_config(&config, "sk-test").unwrap()
}

fn conversation() -> Vec<PromptMessage> {
    vec![
        PromptMessage::system("You are a regulatory assistant."),
        PromptMessage {
            role: regdesk_core::chat::MessageRole::User,
            content: "What is the risk level?".into(),
        },
    ]
}

fn sse_body(fragments: &[&str], done: bool) -> String {
    let mut body = String::new();
    for fragment in fragments {
        let chunk = json!({"choices": [{"delta": {"content": fragment}, "finish_reason": null}]});
        body.push_str(&format!("data: {chunk}\n\n"));
    }
    if done {
        body.push_str("data: [DONE]\n\n");
    }
    body
}

#[tokio::test]
async fn complete_once_sends_history_and_returns_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-4o",
            "max_tokens": 1000,
            "messages": [
                {"role": "system", "content": "You are a regulatory assistant."},
                {"role": "user", "content": "What is the risk level?"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-1",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "The risk level is high."}
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let answer = client_for(&server).complete_once(&conversation()).await.unwrap();
    assert_eq!(answer, "The risk level is high.");
}

#[tokio::test]
async fn complete_once_maps_rate_limit() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {"message": "Rate limit reached", "type": "requests"}
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).complete_once(&conversation()).await.unwrap_err();
    assert_eq!(
        err,
        RegdeskError::Provider {
            status_code: Some(429),
            message: "Rate limit reached".into(),
            is_retryable: true,
        }
    );
}

#[tokio::test]
async fn complete_once_rejects_empty_choices() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let err = client_for(&server).complete_once(&conversation()).await.unwrap_err();
    assert!(err.is_provider());
}

#[tokio::test]
async fn streaming_yields_fragments_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({"stream": true})))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(sse_body(&["The risk", " level", " is high."], true)),
        )
        .mount(&server)
        .await;

    let stream = client_for(&server).complete_streaming(&conversation()).await.unwrap();
    let fragments: Vec<_> = stream.collect().await;

    let text: String = fragments.into_iter().map(|f| f.unwrap()).collect();
    assert_eq!(text, "The risk level is high.");
}

#[tokio::test]
async fn streaming_truncated_body_ends_with_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(sse_body(&["The risk"], false)),
        )
        .mount(&server)
        .await;

    let stream = client_for(&server).complete_streaming(&conversation()).await.unwrap();
    let fragments: Vec<_> = stream.collect().await;

    assert_eq!(fragments.len(), 2);
    assert_eq!(fragments[0], Ok("The risk".to_string()));
    assert!(fragments[1].as_ref().unwrap_err().is_provider());
}

#[tokio::test]
async fn streaming_http_error_is_returned_before_stream() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .complete_streaming(&conversation())
        .await
        .err()
        .unwrap();
    assert!(err.is_provider());
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn unreachable_endpoint_is_retryable_provider_error() {
    let config = ProviderConfig {
        base_url: "http://127.0.0.1:9/v1".into(),
        ..ProviderConfig::default()
    };
    let client = OpenAICompletionClient::from_config(&config, "sk-test").unwrap();

    let err = client.complete_once(&conversation()).await.unwrap_err();
    assert!(matches!(err, RegdeskError::Provider { status_code: None, .. }));
}
