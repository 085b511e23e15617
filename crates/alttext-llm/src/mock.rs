use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use alttext_core::errors::GeneratorError;
use alttext_core::generator::{AltTextGenerator, DescribeRequest};

/// Pre-programmed responses for deterministic testing without API calls.
#[derive(Clone, Debug)]
pub enum MockResponse {
    /// Return this text verbatim (untrimmed, so callers' trimming is exercised).
    Text(String),
    /// Fail the call.
    Error(GeneratorError),
    /// Wait a duration, then resolve the inner response.
    Delay(Duration, Box<MockResponse>),
}

impl MockResponse {
    pub fn text(text: &str) -> Self {
        Self::Text(text.to_string())
    }

    pub fn delayed(delay: Duration, inner: MockResponse) -> Self {
        Self::Delay(delay, Box::new(inner))
    }
}

/// Mock generator answering by image URL, falling back to a default.
/// Every call is recorded, including ones that fail.
pub struct MockGenerator {
    by_url: HashMap<String, MockResponse>,
    fallback: Option<MockResponse>,
    calls: Mutex<Vec<DescribeRequest>>,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self {
            by_url: HashMap::new(),
            fallback: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every URL gets the same response.
    pub fn always(response: MockResponse) -> Self {
        Self::new().with_default(response)
    }

    pub fn with_response(mut self, url: &str, response: MockResponse) -> Self {
        self.by_url.insert(url.to_string(), response);
        self
    }

    pub fn with_default(mut self, response: MockResponse) -> Self {
        self.fallback = Some(response);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn calls(&self) -> Vec<DescribeRequest> {
        self.calls.lock().clone()
    }

    pub fn calls_for(&self, url: &str) -> usize {
        self.calls.lock().iter().filter(|r| r.image_url == url).count()
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AltTextGenerator for MockGenerator {
    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn describe(&self, request: &DescribeRequest) -> Result<String, GeneratorError> {
        self.calls.lock().push(request.clone());

        let response = self
            .by_url
            .get(&request.image_url)
            .or(self.fallback.as_ref())
            .cloned()
            .ok_or_else(|| {
                GeneratorError::InvalidRequest(format!(
                    "MockGenerator: no response configured for {}",
                    request.image_url
                ))
            })?;

        resolve_response(response).await
    }
}

/// Resolve a MockResponse, handling Delay by sleeping first.
async fn resolve_response(response: MockResponse) -> Result<String, GeneratorError> {
    let mut current = response;
    loop {
        match current {
            MockResponse::Text(text) => return Ok(text),
            MockResponse::Error(e) => return Err(e),
            MockResponse::Delay(duration, inner) => {
                tokio::time::sleep(duration).await;
                current = *inner;
            }
        }
    }
}
