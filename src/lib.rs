//! Mistral OCR request building and response normalization
//!
//! Builds OCR request bodies from image and PDF attachments, and flattens the
//! deeply nested, schema-less JSON that OCR backends return into one block of
//! deduplicated text.

pub mod ai;
pub mod attachment;
pub mod error;
pub mod models;
pub mod ocr;

pub use error::{Error, Result};
