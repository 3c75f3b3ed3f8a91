//! Transport to the Mistral OCR endpoint
//!
//! The OCR core never talks HTTP directly; it hands a built payload to an
//! [`OcrTransport`] and receives the decoded JSON body back.

pub mod client;
pub mod mock;

pub use client::MistralHttpClient;
pub use mock::MockOcrTransport;

use crate::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;

#[async_trait]
pub trait OcrTransport: Send + Sync {
    /// POSTs `payload` to the OCR endpoint, sending `headers` in addition to
    /// the transport's own defaults.
    async fn post_ocr(
        &self,
        payload: &Map<String, Value>,
        headers: &HashMap<String, String>,
    ) -> Result<Value>;
}
