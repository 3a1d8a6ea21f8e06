use crate::converters::gemini::{GeminiCandidate, GeminiPromptFeedback, GeminiUsage};
use crate::converters::helpers::strip_code_fence;
use crate::flow::ModelError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiResponse {
    // Missing entirely when the prompt itself was blocked
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
    #[serde(rename = "usageMetadata")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_metadata: Option<GeminiUsage>,
    #[serde(rename = "modelVersion")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
    #[serde(rename = "promptFeedback")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_feedback: Option<GeminiPromptFeedback>,
    #[serde(rename = "responseId")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_id: Option<String>,
}

impl GeminiResponse {
    /// Concatenated answer text of the first candidate, if it has any.
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text = content
            .parts
            .iter()
            .filter_map(|p| p.answer_text())
            .collect::<Vec<_>>()
            .join("");
        if text.trim().is_empty() { None } else { Some(text) }
    }

    /// The structured output of a JSON-mode request.
    ///
    /// `Ok(None)` when the model produced no text at all.
    pub fn output(&self) -> Result<Option<Value>, ModelError> {
        if let Some(reason) = self.prompt_feedback.as_ref().and_then(|f| f.block_reason.as_ref()) {
            return Err(ModelError::Blocked(reason.to_string()));
        }
        let Some(text) = self.text() else {
            return Ok(None);
        };
        serde_json::from_str::<Value>(strip_code_fence(&text))
            .map(Some)
            .map_err(|e| ModelError::MalformedOutput(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converters::gemini::GeminiFinishReason;
    use serde_json::json;

    fn parse(v: Value) -> GeminiResponse {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn test_structured_output() {
        let resp = parse(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "{\"description\": \"A dog.\"}"}]},
                "finishReason": "STOP",
                "index": 0
            }],
            "usageMetadata": {"promptTokenCount": 300, "candidatesTokenCount": 8, "totalTokenCount": 308},
            "modelVersion": "gemini-2.5-flash"
        }));
        assert_eq!(resp.candidates[0].finish_reason, Some(GeminiFinishReason::Stop));
        assert_eq!(resp.output().unwrap(), Some(json!({"description": "A dog."})));
    }

    #[test]
    fn test_thought_parts_skipped() {
        let resp = parse(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [
                    {"text": "thinking about dogs", "thought": true},
                    {"text": "{\"description\": "},
                    {"text": "\"A dog.\"}"}
                ]}
            }]
        }));
        assert_eq!(resp.output().unwrap(), Some(json!({"description": "A dog."})));
    }

    #[test]
    fn test_fenced_json() {
        let resp = parse(json!({
            "candidates": [{"content": {"parts": [{"text": "```json\n{\"description\": \"A dog.\"}\n```"}]}}]
        }));
        assert_eq!(resp.output().unwrap(), Some(json!({"description": "A dog."})));
    }

    #[test]
    fn test_no_candidates_is_no_output() {
        let resp = parse(json!({"usageMetadata": {"promptTokenCount": 3}}));
        assert_eq!(resp.output().unwrap(), None);
    }

    #[test]
    fn test_candidate_without_content_is_no_output() {
        let resp = parse(json!({"candidates": [{"finishReason": "SAFETY", "index": 0}]}));
        assert_eq!(resp.output().unwrap(), None);
    }

    #[test]
    fn test_unknown_finish_reason_tolerated() {
        let resp = parse(json!({"candidates": [{"finishReason": "SOMETHING_NEW"}]}));
        assert_eq!(resp.candidates[0].finish_reason, Some(GeminiFinishReason::Other));
    }

    #[test]
    fn test_blocked_prompt() {
        let resp = parse(json!({"promptFeedback": {"blockReason": "IMAGE_SAFETY"}}));
        let err = resp.output().unwrap_err();
        assert!(matches!(err, ModelError::Blocked(ref r) if r == "IMAGE_SAFETY"));
    }

    #[test]
    fn test_prose_is_malformed() {
        let resp = parse(json!({
            "candidates": [{"content": {"parts": [{"text": "This is a picture of a dog."}]}}]
        }));
        assert!(matches!(resp.output().unwrap_err(), ModelError::MalformedOutput(_)));
    }
}
