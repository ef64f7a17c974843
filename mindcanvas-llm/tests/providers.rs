//! Provider clients against a local stub HTTP server.

use axum::{
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use mindcanvas_core::{CanvasError, ChatTurn, LlmError};
use mindcanvas_llm::{ChatModel, CompletionRequest, GeminiClient, OpenAIClient};
use serde_json::{json, Value};

/// Serve `router` on an ephemeral local port and return its base URL.
async fn spawn_stub(router: Router) -> Result<String, String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .map_err(|e| e.to_string())?;
    let addr = listener.local_addr().map_err(|e| e.to_string())?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok(format!("http://{}", addr))
}

fn request() -> CompletionRequest {
    CompletionRequest {
        system: Some("Answer briefly.".to_string()),
        turns: vec![ChatTurn::user("What is chlorophyll?")],
        temperature: 0.7,
    }
}

async fn gemini_against(router: Router) -> Result<Result<String, CanvasError>, String> {
    let base = spawn_stub(router).await?;
    let client = GeminiClient::new("gemini-key", "gemini-test", 6000).with_base_url(base);
    Ok(client.complete(request()).await)
}

async fn openai_against(router: Router) -> Result<Result<String, CanvasError>, String> {
    let base = spawn_stub(router).await?;
    let client = OpenAIClient::new("openai-key", "gpt-test", 6000).with_base_url(format!("{}/", base));
    Ok(client.complete(request()).await)
}

fn gemini_route(router_fn: axum::routing::MethodRouter) -> Router {
    Router::new().route("/models/:call", router_fn)
}

fn openai_route(router_fn: axum::routing::MethodRouter) -> Router {
    Router::new().route("/chat/completions", router_fn)
}

async fn rate_limited() -> impl IntoResponse {
    (
        StatusCode::TOO_MANY_REQUESTS,
        [("retry-after", "2")],
        "slow down",
    )
}

async fn server_error() -> impl IntoResponse {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"error": {"message": "upstream exploded", "code": 500}})),
    )
}

async fn garbage() -> impl IntoResponse {
    (StatusCode::OK, "this is not json")
}

// ============================================================================
// GEMINI
// ============================================================================

#[tokio::test]
async fn gemini_success_sends_key_and_system_instruction() -> Result<(), String> {
    let handler = |headers: HeaderMap, Json(body): Json<Value>| async move {
        let key_ok = headers.get("x-goog-api-key").and_then(|v| v.to_str().ok()) == Some("gemini-key");
        let system = body["systemInstruction"]["parts"][0]["text"].as_str().unwrap_or_default().to_string();
        let role = body["contents"][0]["role"].as_str().unwrap_or_default().to_string();
        Json(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": format!("  {}|{}|{}  ", key_ok, system, role)}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 7, "candidatesTokenCount": 3}
        }))
    };

    let reply = gemini_against(gemini_route(post(handler)))
        .await?
        .map_err(|e| e.to_string())?;
    assert!(reply.contains("true|Answer briefly.|user"));
    Ok(())
}

#[tokio::test]
async fn gemini_429_is_rate_limited_with_retry_after() -> Result<(), String> {
    let err = gemini_against(gemini_route(post(rate_limited)))
        .await?
        .err()
        .ok_or("expected an error")?;
    assert_eq!(
        err,
        CanvasError::Llm(LlmError::RateLimited {
            provider: "gemini".to_string(),
            retry_after_ms: 2000,
        })
    );
    Ok(())
}

#[tokio::test]
async fn gemini_500_carries_decoded_message() -> Result<(), String> {
    let err = gemini_against(gemini_route(post(server_error)))
        .await?
        .err()
        .ok_or("expected an error")?;
    assert_eq!(
        err,
        CanvasError::Llm(LlmError::RequestFailed {
            provider: "gemini".to_string(),
            status: 500,
            message: "upstream exploded".to_string(),
        })
    );
    Ok(())
}

#[tokio::test]
async fn gemini_unparseable_body_is_invalid_response() -> Result<(), String> {
    let err = gemini_against(gemini_route(post(garbage)))
        .await?
        .err()
        .ok_or("expected an error")?;
    assert!(matches!(err, CanvasError::Llm(LlmError::InvalidResponse { .. })));
    Ok(())
}

// ============================================================================
// OPENAI
// ============================================================================

#[tokio::test]
async fn openai_success_sends_bearer_and_system_first() -> Result<(), String> {
    let handler = |headers: HeaderMap, Json(body): Json<Value>| async move {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let first_role = body["messages"][0]["role"].as_str().unwrap_or_default().to_string();
        let model = body["model"].as_str().unwrap_or_default().to_string();
        Json(json!({
            "choices": [{
                "message": {"role": "assistant", "content": format!("{}|{}|{}", auth, first_role, model)},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 9, "completion_tokens": 4, "total_tokens": 13}
        }))
    };

    let reply = openai_against(openai_route(post(handler)))
        .await?
        .map_err(|e| e.to_string())?;
    assert_eq!(reply, "Bearer openai-key|system|gpt-test");
    Ok(())
}

#[tokio::test]
async fn openai_429_is_rate_limited_with_retry_after() -> Result<(), String> {
    let err = openai_against(openai_route(post(rate_limited)))
        .await?
        .err()
        .ok_or("expected an error")?;
    assert_eq!(
        err,
        CanvasError::Llm(LlmError::RateLimited {
            provider: "openai".to_string(),
            retry_after_ms: 2000,
        })
    );
    Ok(())
}

#[tokio::test]
async fn openai_500_carries_decoded_message() -> Result<(), String> {
    let err = openai_against(openai_route(post(server_error)))
        .await?
        .err()
        .ok_or("expected an error")?;
    assert_eq!(
        err,
        CanvasError::Llm(LlmError::RequestFailed {
            provider: "openai".to_string(),
            status: 500,
            message: "upstream exploded".to_string(),
        })
    );
    Ok(())
}

#[tokio::test]
async fn openai_bad_bodies_are_invalid_responses() -> Result<(), String> {
    let err = openai_against(openai_route(post(garbage)))
        .await?
        .err()
        .ok_or("expected an error")?;
    assert!(matches!(err, CanvasError::Llm(LlmError::InvalidResponse { .. })));

    let no_choices = || async { Json(json!({"choices": []})) };
    let err = openai_against(openai_route(post(no_choices)))
        .await?
        .err()
        .ok_or("expected an error")?;
    assert!(matches!(err, CanvasError::Llm(LlmError::InvalidResponse { .. })));
    Ok(())
}
