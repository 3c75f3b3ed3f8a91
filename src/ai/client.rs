use super::OcrTransport;
use crate::models::{Config, DEFAULT_BASE_URL};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::time::Duration;

pub const OCR_PATH: &str = "/v1/ocr";

/// Thin reqwest wrapper for the Mistral REST API.
pub struct MistralHttpClient {
    client: Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl MistralHttpClient {
    pub fn new(api_key: String, timeout: Duration) -> Self {
        Self::new_with_client(api_key, timeout, Client::new())
    }

    pub fn new_with_client(api_key: String, timeout: Duration, client: Client) -> Self {
        Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.mistral_api_key.clone(), config.request_timeout)
            .with_base_url(config.base_url.clone())
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn post<Req: Serialize + ?Sized, Resp: DeserializeOwned>(
        &self,
        path: &str,
        request: &Req,
        headers: &HashMap<String, String>,
    ) -> Result<Resp> {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .header("Authorization", format!("Bearer {}", self.api_key));
        for (name, value) in headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.json(request).send().await.map_err(|e| {
            tracing::error!("Failed to send request to Mistral: {}", e);
            e
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            tracing::error!("Mistral API error (status {}): {}", status, error_text);
            return Err(Error::AiProvider(format!(
                "Mistral API error (status {}): {}",
                status, error_text
            )));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse Mistral response: {}\nBody: {}", e, body);
            Error::AiProvider(format!("Failed to parse Mistral response: {}", e))
        })
    }
}

#[async_trait]
impl OcrTransport for MistralHttpClient {
    async fn post_ocr(
        &self,
        payload: &Map<String, Value>,
        headers: &HashMap<String, String>,
    ) -> Result<Value> {
        tracing::debug!("Sending OCR request to {}{}", self.base_url, OCR_PATH);
        self.post(OCR_PATH, payload, headers).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_client(server: &MockServer) -> MistralHttpClient {
        MistralHttpClient::new("test-key".to_string(), Duration::from_secs(5))
            .with_base_url(server.uri())
    }

    fn payload() -> Map<String, Value> {
        json!({
            "model": "mistral-ocr-latest",
            "document": { "type": "image_url", "image_url": "https://example.com/a.png" }
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    #[tokio::test]
    async fn test_post_ocr_sends_auth_and_custom_headers() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(OCR_PATH))
            .and(header("Authorization", "Bearer test-key"))
            .and(header("X-Trace", "abc"))
            .and(body_partial_json(json!({ "model": "mistral-ocr-latest" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "text": "hi" })))
            .expect(1)
            .mount(&server)
            .await;

        let headers = HashMap::from([("X-Trace".to_string(), "abc".to_string())]);
        let body = make_client(&server)
            .post_ocr(&payload(), &headers)
            .await
            .unwrap();
        assert_eq!(body, json!({ "text": "hi" }));
    }

    #[tokio::test]
    async fn test_api_error_returns_ai_provider_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(OCR_PATH))
            .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
            .mount(&server)
            .await;

        let err = make_client(&server)
            .post_ocr(&payload(), &HashMap::new())
            .await
            .unwrap_err();
        match err {
            Error::AiProvider(message) => {
                assert!(message.contains("401"));
                assert!(message.contains("unauthorized"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_json_body_returns_ai_provider_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(OCR_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = make_client(&server)
            .post_ocr(&payload(), &HashMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AiProvider(_)));
    }

    #[test]
    fn test_with_base_url_trims_trailing_slash() {
        let client = MistralHttpClient::new("k".to_string(), Duration::from_secs(1))
            .with_base_url("http://localhost:9000/".to_string());
        assert_eq!(client.base_url(), "http://localhost:9000");
    }
}
