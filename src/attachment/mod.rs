//! Attachments handed to OCR models
//!
//! An attachment is either a remote URL or raw bytes. Its kind is derived from
//! the MIME type, and byte-backed attachments are inlined as base64 data URIs.

pub mod mime;

use crate::Result;
use base64::Engine as _;
use std::fmt;
use std::path::Path;
use url::Url;

/// Broad attachment category, derived from the MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    Image,
    Pdf,
    Text,
    Audio,
    Unknown,
}

impl AttachmentKind {
    pub fn from_mime(mime_type: &str) -> Self {
        match mime_type {
            "application/pdf" => AttachmentKind::Pdf,
            m if m.starts_with("image/") => AttachmentKind::Image,
            m if m.starts_with("text/") => AttachmentKind::Text,
            m if m.starts_with("audio/") => AttachmentKind::Audio,
            _ => AttachmentKind::Unknown,
        }
    }
}

impl fmt::Display for AttachmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AttachmentKind::Image => "image",
            AttachmentKind::Pdf => "pdf",
            AttachmentKind::Text => "text",
            AttachmentKind::Audio => "audio",
            AttachmentKind::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum AttachmentSource {
    Url(String),
    Bytes(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    source: AttachmentSource,
    mime_type: String,
    filename: Option<String>,
}

impl Attachment {
    pub fn from_url(url: impl Into<String>) -> Self {
        let url = url.into();
        let filename = Url::parse(&url).ok().and_then(|parsed| {
            parsed
                .path_segments()
                .and_then(|mut segments| segments.next_back())
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
        });
        let mime_type = filename
            .as_deref()
            .and_then(mime::mime_from_name)
            .unwrap_or(mime::OCTET_STREAM);

        Self {
            source: AttachmentSource::Url(url),
            mime_type: mime_type.to_string(),
            filename,
        }
    }

    /// Builds an attachment from raw bytes. The MIME type is sniffed from the
    /// content first and falls back to the filename extension.
    pub fn from_bytes(bytes: Vec<u8>, filename: Option<String>) -> Self {
        let sniffed = mime::detect_mime(&bytes);
        let mime_type = if sniffed == mime::OCTET_STREAM {
            filename
                .as_deref()
                .and_then(mime::mime_from_name)
                .unwrap_or(sniffed)
        } else {
            sniffed
        };

        Self {
            source: AttachmentSource::Bytes(bytes),
            mime_type: mime_type.to_string(),
            filename,
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string);
        Ok(Self::from_bytes(bytes, filename))
    }

    /// Treats `http` and `https` URLs as remote sources and anything else as a
    /// local file path.
    pub fn parse(source: &str) -> Result<Self> {
        match Url::parse(source) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(Self::from_url(source)),
            _ => Self::from_path(source),
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    pub fn kind(&self) -> AttachmentKind {
        AttachmentKind::from_mime(&self.mime_type)
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    pub fn url(&self) -> Option<&str> {
        match &self.source {
            AttachmentSource::Url(url) => Some(url),
            AttachmentSource::Bytes(_) => None,
        }
    }

    pub fn is_url(&self) -> bool {
        self.url().is_some()
    }

    /// Self-describing form sent to the provider: the URL itself for remote
    /// attachments, a `data:` URI for inline bytes.
    pub fn inline_representation(&self) -> String {
        match &self.source {
            AttachmentSource::Url(url) => url.clone(),
            AttachmentSource::Bytes(bytes) => {
                let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
                format!("data:{};base64,{}", self.mime_type, encoded)
            }
        }
    }
}
