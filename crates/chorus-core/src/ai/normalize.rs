//! Text extraction from vendor-shaped stream chunks
//!
//! Every provider streams JSON events with its own layout. Callers only
//! care about the text delta, so this module hides the differences.
//! Extraction never fails: anything unrecognized becomes an empty string
//! and the stream carries on.

use serde_json::Value;

/// Known chunk layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkShape {
    /// OpenAI chat completions: `{"choices":[{"delta":{"content":"..."}}]}`
    ChoicesDelta,
    /// Anthropic messages: `{"type":"content_block_delta","delta":{"text":"..."}}`
    DeltaText,
    /// Google Gemini: `{"candidates":[{"content":{"parts":[{"text":"..."}]}}]}`
    CandidateParts,
    /// Try every known layout in the order above
    Auto,
}

impl ChunkShape {
    const CONCRETE: [ChunkShape; 3] = [
        ChunkShape::ChoicesDelta,
        ChunkShape::DeltaText,
        ChunkShape::CandidateParts,
    ];

    /// First concrete shape that yields text for this chunk
    pub fn detect(chunk: &Value) -> Option<ChunkShape> {
        Self::CONCRETE
            .into_iter()
            .find(|shape| shape.extract(chunk).is_some())
    }

    fn extract(self, chunk: &Value) -> Option<String> {
        match self {
            ChunkShape::ChoicesDelta => chunk
                .get("choices")?
                .as_array()?
                .first()?
                .get("delta")?
                .get("content")?
                .as_str()
                .map(str::to_string),
            ChunkShape::DeltaText => chunk
                .get("delta")?
                .get("text")?
                .as_str()
                .map(str::to_string),
            ChunkShape::CandidateParts => {
                let parts = chunk
                    .get("candidates")?
                    .as_array()?
                    .first()?
                    .get("content")?
                    .get("parts")?
                    .as_array()?;
                let texts: Vec<&str> = parts
                    .iter()
                    // thought summaries are not part of the answer
                    .filter(|p| !p.get("thought").and_then(Value::as_bool).unwrap_or(false))
                    .filter_map(|p| p.get("text").and_then(Value::as_str))
                    .collect();
                (!texts.is_empty()).then(|| texts.concat())
            }
            ChunkShape::Auto => Self::CONCRETE.into_iter().find_map(|s| s.extract(chunk)),
        }
    }
}

/// Extract the plain text delta from a chunk, or `""` if it carries none
pub fn extract_delta(chunk: &Value, shape: ChunkShape) -> String {
    shape.extract(chunk).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_choices_delta() {
        let chunk = json!({"choices": [{"delta": {"content": "hi"}}]});
        assert_eq!(extract_delta(&chunk, ChunkShape::ChoicesDelta), "hi");
    }

    #[test]
    fn test_delta_text() {
        let chunk = json!({"delta": {"text": "yo"}});
        assert_eq!(extract_delta(&chunk, ChunkShape::DeltaText), "yo");
    }

    #[test]
    fn test_candidate_parts_concatenates() {
        let chunk = json!({
            "candidates": [{"content": {"parts": [{"text": "a"}, {"text": "b"}], "role": "model"}}]
        });
        assert_eq!(extract_delta(&chunk, ChunkShape::CandidateParts), "ab");
    }

    #[test]
    fn test_candidate_parts_skips_thoughts() {
        let chunk = json!({
            "candidates": [{"content": {"parts": [{"text": "pondering", "thought": true}, {"text": "answer"}]}}]
        });
        assert_eq!(extract_delta(&chunk, ChunkShape::CandidateParts), "answer");
    }

    #[test]
    fn test_empty_object_is_empty_text() {
        let chunk = json!({});
        for shape in [
            ChunkShape::ChoicesDelta,
            ChunkShape::DeltaText,
            ChunkShape::CandidateParts,
            ChunkShape::Auto,
        ] {
            assert_eq!(extract_delta(&chunk, shape), "");
        }
    }

    #[test]
    fn test_null_content_is_empty_text() {
        // OpenAI sends a null content on the role-only first chunk and the final chunk
        let chunk = json!({"choices": [{"delta": {"role": "assistant", "content": null}}]});
        assert_eq!(extract_delta(&chunk, ChunkShape::ChoicesDelta), "");
        let chunk = json!({"choices": [], "usage": {"total_tokens": 10}});
        assert_eq!(extract_delta(&chunk, ChunkShape::ChoicesDelta), "");
    }

    #[test]
    fn test_non_text_anthropic_events() {
        let ping = json!({"type": "ping"});
        let stop = json!({"type": "message_delta", "delta": {"stop_reason": "end_turn"}});
        let json_delta = json!({"type": "content_block_delta", "delta": {"type": "input_json_delta", "partial_json": "{"}});
        assert_eq!(extract_delta(&ping, ChunkShape::DeltaText), "");
        assert_eq!(extract_delta(&stop, ChunkShape::DeltaText), "");
        assert_eq!(extract_delta(&json_delta, ChunkShape::DeltaText), "");
    }

    #[test]
    fn test_mismatched_shape_is_empty() {
        let chunk = json!({"delta": {"text": "yo"}});
        assert_eq!(extract_delta(&chunk, ChunkShape::ChoicesDelta), "");
    }

    #[test]
    fn test_auto_recognizes_each_shape() {
        assert_eq!(
            extract_delta(&json!({"choices": [{"delta": {"content": "hi"}}]}), ChunkShape::Auto),
            "hi"
        );
        assert_eq!(extract_delta(&json!({"delta": {"text": "yo"}}), ChunkShape::Auto), "yo");
        assert_eq!(
            ChunkShape::detect(&json!({"delta": {"text": "yo"}})),
            Some(ChunkShape::DeltaText)
        );
        assert_eq!(ChunkShape::detect(&json!({"foo": 1})), None);
    }

    #[test]
    fn test_non_object_values() {
        assert_eq!(extract_delta(&json!("text"), ChunkShape::Auto), "");
        assert_eq!(extract_delta(&json!(null), ChunkShape::Auto), "");
        assert_eq!(extract_delta(&json!([1, 2]), ChunkShape::Auto), "");
    }
}
