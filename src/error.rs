//! Error handling and custom error types
//!
//! Provides unified error handling across the crate using thiserror.

use crate::attachment::AttachmentKind;
use std::fmt;
use thiserror::Error;

/// Chat features that OCR models cannot honour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    ToolCalls,
    ResponseSchema,
    Streaming,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::ToolCalls => "tool calls",
            Capability::ResponseSchema => "response schemas",
            Capability::Streaming => "streaming responses",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("AI provider error: {0}")]
    AiProvider(String),

    #[error("Mistral OCR models do not support {0}.")]
    UnsupportedCapability(Capability),

    #[error("Mistral OCR models require an attachment.")]
    MissingAttachment,

    #[error("Attachment type {0} is not supported by Mistral OCR")]
    UnsupportedAttachment(AttachmentKind),

    #[error("Model {0} is not a Mistral OCR model")]
    UnsupportedModel(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
