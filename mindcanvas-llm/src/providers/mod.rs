//! LLM provider implementations
//!
//! Concrete [`ChatModel`](crate::ChatModel) clients for the supported
//! services, plus the rate limiting and error mapping they share.

pub mod gemini;
pub mod openai;

pub use gemini::GeminiClient;
pub use openai::OpenAIClient;

use mindcanvas_core::{CanvasError, CanvasResult, LlmError};
use reqwest::{RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Semaphore, SemaphorePermit};

pub(crate) fn request_failed(provider: &str, status: i32, message: impl Into<String>) -> CanvasError {
    CanvasError::Llm(LlmError::RequestFailed {
        provider: provider.to_string(),
        status,
        message: message.into(),
    })
}

pub(crate) fn rate_limited(provider: &str, retry_after_ms: i64) -> CanvasError {
    CanvasError::Llm(LlmError::RateLimited {
        provider: provider.to_string(),
        retry_after_ms,
    })
}

pub(crate) fn invalid_response(provider: &str, reason: impl Into<String>) -> CanvasError {
    CanvasError::Llm(LlmError::InvalidResponse {
        provider: provider.to_string(),
        reason: reason.into(),
    })
}

/// Error envelope shared by both APIs: `{"error": {"message": ...}}`.
#[derive(Debug, Clone, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

// ============================================================================
// RATE LIMITING
// ============================================================================

/// Concurrency bound plus a minimum spacing between requests.
pub(crate) struct RequestThrottle {
    permits: Arc<Semaphore>,
    last_request: AtomicU64,
    min_request_interval_ms: u64,
    start_time: Instant,
}

impl RequestThrottle {
    pub(crate) fn new(requests_per_minute: u32) -> Self {
        let rpm = requests_per_minute.max(1);
        Self {
            permits: Arc::new(Semaphore::new(rpm as usize)),
            last_request: AtomicU64::new(0),
            min_request_interval_ms: (60_000 / rpm as u64).max(10),
            start_time: Instant::now(),
        }
    }

    pub(crate) async fn acquire(&self, provider: &str) -> CanvasResult<SemaphorePermit<'_>> {
        let permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| request_failed(provider, 0, format!("Rate limiter error: {}", e)))?;

        let now_ms = self.start_time.elapsed().as_millis() as u64;
        let last_ms = self.last_request.load(Ordering::Relaxed);
        let elapsed = now_ms.saturating_sub(last_ms);

        if last_ms > 0 && elapsed < self.min_request_interval_ms {
            let wait_ms = self.min_request_interval_ms - elapsed;
            tokio::time::sleep(Duration::from_millis(wait_ms)).await;
        }

        self.last_request
            .store(self.start_time.elapsed().as_millis() as u64, Ordering::Relaxed);
        Ok(permit)
    }
}

// ============================================================================
// HTTP
// ============================================================================

/// Send a JSON request and decode the JSON reply, mapping failures to `LlmError`.
pub(crate) async fn send_json<Req: Serialize, Res: DeserializeOwned>(
    provider: &str,
    builder: RequestBuilder,
    body: &Req,
) -> CanvasResult<Res> {
    let response = builder
        .header("Content-Type", "application/json")
        .json(body)
        .send()
        .await
        .map_err(|e| request_failed(provider, 0, format!("HTTP request failed: {}", e)))?;

    let status = response.status();
    let retry_after_ms = parse_retry_after_ms(response.headers()).unwrap_or(0);

    if status.is_success() {
        return response
            .json()
            .await
            .map_err(|e| invalid_response(provider, format!("Failed to parse response: {}", e)));
    }

    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    let error_msg = match serde_json::from_str::<ApiErrorBody>(&error_text) {
        Ok(api_error) => api_error.error.message,
        Err(_) => error_text,
    };

    Err(match status {
        StatusCode::TOO_MANY_REQUESTS => rate_limited(provider, retry_after_ms),
        _ => request_failed(provider, status.as_u16() as i32, error_msg),
    })
}

fn parse_retry_after_ms(headers: &reqwest::header::HeaderMap) -> Option<i64> {
    headers
        .get("retry-after")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<f64>().ok())
        .map(|seconds| (seconds * 1000.0) as i64)
}
