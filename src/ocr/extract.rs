//! Text aggregation over OCR responses
//!
//! OCR backends do not agree on a response schema: text shows up under
//! different key names, at different depths and inside arrays, next to image
//! blobs that must not be walked. [`TextAggregator`] walks the decoded JSON
//! tree, classifies object keys against three key sets and joins the unique
//! fragments it finds.
//!
//! Within one object, textual keys are visited first (in key-set order), then
//! collection keys (in key-set order), then every remaining object or array
//! value in document order. Skip keys are never entered.

use crate::{Error, Result};
use serde_json::{Map, Value};
use std::collections::HashSet;

pub const TEXTUAL_KEYS: &[&str] = &[
    "text",
    "markdown",
    "content",
    "value",
    "raw_text",
    "rawText",
    "string",
    "plain_text",
    "plainText",
];

pub const COLLECTION_KEYS: &[&str] = &[
    "blocks",
    "pages",
    "lines",
    "paragraphs",
    "items",
    "elements",
    "entries",
    "sections",
    "text_blocks",
    "textBlocks",
];

/// Keys holding binary payloads or references.
pub const SKIP_KEYS: &[&str] = &[
    "image_url",
    "image",
    "data",
    "file_data",
    "fileData",
    "url",
    "source",
    "bytes",
    "raw",
    "binary",
];

const FRAGMENT_SEPARATOR: &str = "\n\n";

/// How an object key is treated during traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyClass {
    Textual,
    Collection,
    Skip,
    Fallback,
}

/// The three disjoint key sets driving traversal.
#[derive(Debug, Clone)]
pub struct KeySets {
    textual: Vec<String>,
    collection: Vec<String>,
    skip: HashSet<String>,
}

impl KeySets {
    /// Fails when a key appears in more than one set.
    pub fn new<T, C, S>(textual: T, collection: C, skip: S) -> Result<Self>
    where
        T: IntoIterator,
        T::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
        S: IntoIterator,
        S::Item: Into<String>,
    {
        let textual: Vec<String> = textual.into_iter().map(Into::into).collect();
        let collection: Vec<String> = collection.into_iter().map(Into::into).collect();
        let skip: HashSet<String> = skip.into_iter().map(Into::into).collect();

        let mut seen = HashSet::new();
        for key in textual.iter().chain(&collection).chain(&skip) {
            if !seen.insert(key.as_str()) {
                return Err(Error::Config(format!(
                    "OCR key '{}' is listed in more than one key set",
                    key
                )));
            }
        }

        Ok(Self {
            textual,
            collection,
            skip,
        })
    }

    /// First match wins: textual, then collection, then skip.
    pub fn classify(&self, key: &str) -> KeyClass {
        if self.textual.iter().any(|k| k == key) {
            KeyClass::Textual
        } else if self.collection.iter().any(|k| k == key) {
            KeyClass::Collection
        } else if self.skip.contains(key) {
            KeyClass::Skip
        } else {
            KeyClass::Fallback
        }
    }
}

impl Default for KeySets {
    fn default() -> Self {
        Self {
            textual: TEXTUAL_KEYS.iter().map(|k| k.to_string()).collect(),
            collection: COLLECTION_KEYS.iter().map(|k| k.to_string()).collect(),
            skip: SKIP_KEYS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TextAggregator {
    keys: KeySets,
}

impl TextAggregator {
    pub fn new(keys: KeySets) -> Self {
        Self { keys }
    }

    /// Returns the unique, trimmed fragments joined by a blank line, or `None`
    /// when the document holds no text.
    pub fn extract_text(&self, document: &Value) -> Option<String> {
        let unique = self.unique_fragments(document);
        if unique.is_empty() {
            return None;
        }
        Some(unique.join(FRAGMENT_SEPARATOR))
    }

    /// Trimmed, non-empty fragments in traversal order, first occurrence only.
    pub fn unique_fragments<'a>(&self, document: &'a Value) -> Vec<&'a str> {
        let mut fragments = Vec::new();
        self.gather(document, &mut fragments);
        tracing::debug!("Collected {} raw OCR text fragments", fragments.len());

        let mut seen = HashSet::new();
        fragments
            .into_iter()
            .map(trim_ascii_and_nul)
            .filter(|fragment| !fragment.is_empty())
            .filter(|fragment| seen.insert(*fragment))
            .collect()
    }

    fn gather<'a>(&self, node: &'a Value, out: &mut Vec<&'a str>) {
        match node {
            Value::String(text) => out.push(text),
            Value::Array(items) => {
                for item in items {
                    self.gather(item, out);
                }
            }
            Value::Object(map) => self.gather_object(map, out),
            Value::Null | Value::Bool(_) | Value::Number(_) => {}
        }
    }

    fn gather_object<'a>(&self, map: &'a Map<String, Value>, out: &mut Vec<&'a str>) {
        for key in self.keys.textual.iter().chain(&self.keys.collection) {
            if let Some(value) = map.get(key).filter(|value| is_present(value)) {
                self.gather(value, out);
            }
        }

        for (key, value) in map {
            if self.keys.classify(key) != KeyClass::Fallback {
                continue;
            }
            if value.is_object() || value.is_array() {
                self.gather(value, out);
            }
        }
    }
}

/// Strips ASCII whitespace and NUL only. Unicode spaces such as NBSP are text.
fn trim_ascii_and_nul(fragment: &str) -> &str {
    fragment.trim_matches(|c: char| matches!(c, ' ' | '\t' | '\n' | '\x0b' | '\x0c' | '\r' | '\0'))
}

fn is_present(value: &Value) -> bool {
    !matches!(value, Value::Null | Value::Bool(false))
}

/// Aggregates `document` with the default key sets.
pub fn extract_text(document: &Value) -> Option<String> {
    TextAggregator::default().extract_text(document)
}
