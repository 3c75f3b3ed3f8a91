use super::OcrTransport;
use crate::Result;
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// A request captured by [`MockOcrTransport`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub payload: Map<String, Value>,
    pub headers: HashMap<String, String>,
}

/// In-memory transport that replays canned responses and records requests.
///
/// Clones share state, so a clone kept by a test can observe calls made
/// through the copy handed to the provider.
#[derive(Clone)]
pub struct MockOcrTransport {
    responses: Arc<Mutex<Vec<Value>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockOcrTransport {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_response(self, response: Value) -> Self {
        self.responses.lock().unwrap().push(response);
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockOcrTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OcrTransport for MockOcrTransport {
    async fn post_ocr(
        &self,
        payload: &Map<String, Value>,
        headers: &HashMap<String, String>,
    ) -> Result<Value> {
        let mut requests = self.requests.lock().unwrap();
        requests.push(RecordedRequest {
            payload: payload.clone(),
            headers: headers.clone(),
        });

        let responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(json!({ "pages": [{ "index": 0, "markdown": "mock page" }] }))
        } else {
            let index = (requests.len() - 1) % responses.len();
            Ok(responses[index].clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_default_response() {
        let transport = MockOcrTransport::new();
        let body = transport
            .post_ocr(&Map::new(), &HashMap::new())
            .await
            .unwrap();
        assert_eq!(body["pages"][0]["markdown"], "mock page");
    }

    #[tokio::test]
    async fn test_mock_cycles_responses_and_records_requests() {
        let transport = MockOcrTransport::new()
            .with_response(json!({ "text": "first" }))
            .with_response(json!({ "text": "second" }));
        let probe = transport.clone();

        let mut payload = Map::new();
        payload.insert("model".to_string(), json!("mistral-ocr-latest"));

        let first = transport.post_ocr(&payload, &HashMap::new()).await.unwrap();
        let second = transport.post_ocr(&payload, &HashMap::new()).await.unwrap();
        let third = transport.post_ocr(&payload, &HashMap::new()).await.unwrap();

        assert_eq!(first["text"], "first");
        assert_eq!(second["text"], "second");
        assert_eq!(third["text"], "first");
        assert_eq!(probe.get_call_count(), 3);
        assert_eq!(probe.requests()[0].payload["model"], "mistral-ocr-latest");
    }
}
