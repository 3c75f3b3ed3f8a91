//! Mistral OCR support
//!
//! [`OcrProvider`] checks that a completion request is something an OCR model
//! can serve, pulls the attachment from the latest user turn, builds the
//! request body, and turns the provider's response into an assistant message.

pub mod extract;
pub mod payload;
pub mod response;

pub use extract::{extract_text, KeySets, TextAggregator};
pub use payload::{build_payload, deep_merge};
pub use response::{build_ocr_message, UsageCounters};

use crate::ai::OcrTransport;
use crate::attachment::Attachment;
use crate::error::Capability;
use crate::models::{CompletionRequest, Message, OcrMessage, Role};
use crate::{Error, Result};

pub fn is_ocr_model(model_id: &str) -> bool {
    model_id.contains("mistral-ocr")
}

pub struct OcrProvider {
    transport: Box<dyn OcrTransport>,
    aggregator: TextAggregator,
}

impl OcrProvider {
    pub fn new(transport: Box<dyn OcrTransport>) -> Self {
        Self::with_aggregator(transport, TextAggregator::default())
    }

    pub fn with_aggregator(transport: Box<dyn OcrTransport>, aggregator: TextAggregator) -> Self {
        Self {
            transport,
            aggregator,
        }
    }

    /// Runs one OCR call for the conversation. Every precondition is checked
    /// before the transport is touched.
    pub async fn complete(
        &self,
        messages: &[Message],
        request: &CompletionRequest,
    ) -> Result<OcrMessage> {
        if !is_ocr_model(&request.model) {
            return Err(Error::UnsupportedModel(request.model.clone()));
        }
        ensure_supported(request)?;

        let attachment = latest_user_attachment(messages).ok_or(Error::MissingAttachment)?;
        let payload = build_payload(attachment, &request.model, &request.params)?;

        tracing::debug!(
            "Requesting OCR for {} attachment with model {}",
            attachment.kind(),
            request.model
        );
        let body = self.transport.post_ocr(&payload, &request.headers).await?;

        let message = build_ocr_message(&self.aggregator, body, &request.model)?;
        tracing::info!(
            "OCR complete for {} ({} chars, input_tokens={:?}, output_tokens={:?})",
            message.model_id,
            message.content.len(),
            message.input_tokens,
            message.output_tokens
        );
        Ok(message)
    }
}

fn ensure_supported(request: &CompletionRequest) -> Result<()> {
    if !request.tools.is_empty() {
        return Err(Error::UnsupportedCapability(Capability::ToolCalls));
    }
    if request.schema.is_some() {
        return Err(Error::UnsupportedCapability(Capability::ResponseSchema));
    }
    if request.stream {
        return Err(Error::UnsupportedCapability(Capability::Streaming));
    }
    Ok(())
}

/// First attachment of the most recent user message.
pub fn latest_user_attachment(messages: &[Message]) -> Option<&Attachment> {
    messages
        .iter()
        .rev()
        .find(|message| message.role == Role::User)
        .and_then(|message| message.content.attachments.first())
}
