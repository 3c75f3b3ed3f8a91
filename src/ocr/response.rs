use super::extract::TextAggregator;
use crate::models::{OcrMessage, Role};
use crate::Result;
use serde_json::Value;

/// Token counts reported by the provider, if any.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsageCounters {
    pub input_tokens: Option<u64>,
    pub output_tokens: Option<u64>,
}

impl UsageCounters {
    pub fn from_response(body: &Value) -> Self {
        Self {
            input_tokens: first_count(body, &["prompt_tokens", "input_tokens"]),
            output_tokens: first_count(body, &["completion_tokens", "output_tokens"]),
        }
    }
}

fn first_count(body: &Value, keys: &[&str]) -> Option<u64> {
    let usage = body.get("usage")?;
    keys.iter().find_map(|key| usage.get(*key).and_then(Value::as_u64))
}

/// Wraps an OCR response into an assistant message. When no text can be
/// aggregated the pretty-printed body becomes the content.
pub fn build_ocr_message(
    aggregator: &TextAggregator,
    body: Value,
    model_id: &str,
) -> Result<OcrMessage> {
    let content = match aggregator.extract_text(&body) {
        Some(text) => text,
        None => {
            tracing::warn!(
                "No text found in OCR response for {}, returning raw body",
                model_id
            );
            serde_json::to_string_pretty(&body)?
        }
    };
    let usage = UsageCounters::from_response(&body);

    Ok(OcrMessage {
        role: Role::Assistant,
        content,
        input_tokens: usage.input_tokens,
        output_tokens: usage.output_tokens,
        model_id: model_id.to_string(),
        raw: body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_usage_prefers_prompt_and_completion_tokens() {
        let body = json!({
            "usage": {
                "prompt_tokens": 10,
                "input_tokens": 99,
                "completion_tokens": 4,
                "output_tokens": 98
            }
        });

        assert_eq!(
            UsageCounters::from_response(&body),
            UsageCounters {
                input_tokens: Some(10),
                output_tokens: Some(4)
            }
        );
    }

    #[test]
    fn test_usage_falls_back_to_alternate_keys() {
        let body = json!({
            "usage": { "prompt_tokens": null, "input_tokens": 7, "output_tokens": 3 }
        });

        assert_eq!(
            UsageCounters::from_response(&body),
            UsageCounters {
                input_tokens: Some(7),
                output_tokens: Some(3)
            }
        );
    }

    #[test]
    fn test_usage_ignores_non_integer_counts() {
        let body = json!({
            "usage": { "prompt_tokens": 3.0, "input_tokens": 7, "completion_tokens": "12" }
        });

        assert_eq!(
            UsageCounters::from_response(&body),
            UsageCounters {
                input_tokens: Some(7),
                output_tokens: None
            }
        );
    }

    #[test]
    fn test_usage_absent() {
        assert_eq!(
            UsageCounters::from_response(&json!({ "pages": [] })),
            UsageCounters::default()
        );
    }

    #[test]
    fn test_message_from_end_to_end_scenario() {
        let body = json!({
            "results": [{
                "text": "Line One",
                "blocks": [{ "text": "Line One" }, { "text": "Line Two" }]
            }],
            "usage": { "prompt_tokens": 321, "completion_tokens": 42 }
        });

        let message =
            build_ocr_message(&TextAggregator::default(), body.clone(), "mistral-ocr-2505")
                .unwrap();

        assert_eq!(message.role, Role::Assistant);
        assert_eq!(message.content, "Line One\n\nLine Two");
        assert_eq!(message.input_tokens, Some(321));
        assert_eq!(message.output_tokens, Some(42));
        assert_eq!(message.model_id, "mistral-ocr-2505");
        assert_eq!(message.raw, body);
    }

    #[test]
    fn test_message_falls_back_to_pretty_body() {
        let body = json!({ "pages": [{ "image_url": "https://example.com/p.png" }] });

        let message = build_ocr_message(&TextAggregator::default(), body.clone(), "m").unwrap();

        assert_eq!(message.content, serde_json::to_string_pretty(&body).unwrap());
        assert_eq!(message.input_tokens, None);
    }
}
