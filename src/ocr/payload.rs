//! Request bodies for the OCR endpoint.

use crate::attachment::{Attachment, AttachmentKind};
use crate::{Error, Result};
use serde_json::{json, Map, Value};

/// Builds `{model, document}` for `attachment` and deep-merges `extra_params`
/// on top of it.
pub fn build_payload(
    attachment: &Attachment,
    model_id: &str,
    extra_params: &Map<String, Value>,
) -> Result<Map<String, Value>> {
    let mut base = Map::new();
    base.insert("model".to_string(), Value::String(model_id.to_string()));
    base.insert("document".to_string(), document_payload(attachment)?);

    deep_merge(&mut base, extra_params.clone());
    Ok(base)
}

/// The `document` object for one attachment.
pub fn document_payload(attachment: &Attachment) -> Result<Value> {
    match attachment.kind() {
        AttachmentKind::Image => {
            let image_url = match attachment.url() {
                Some(url) => url.to_string(),
                None => attachment.inline_representation(),
            };
            Ok(json!({
                "type": "image_url",
                "image_url": image_url,
            }))
        }
        AttachmentKind::Pdf => Ok(json!({
            "type": "file",
            "file": {
                "filename": attachment.filename(),
                "file_data": attachment.inline_representation(),
            },
        })),
        kind => Err(Error::UnsupportedAttachment(kind)),
    }
}

/// Merges `overrides` into `base`. Objects present on both sides merge key by
/// key; any other override value replaces the base value outright.
pub fn deep_merge(base: &mut Map<String, Value>, overrides: Map<String, Value>) {
    for (key, value) in overrides {
        match (base.get_mut(&key), value) {
            (Some(Value::Object(existing)), Value::Object(nested)) => deep_merge(existing, nested),
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}
