use crate::converters::gemini::GeminiInlineData;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GeminiPart {
    Text {
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        thought: Option<bool>,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: GeminiInlineData,
    },
    // Anything else the model may emit (function calls, code results, ...)
    Other(Value),
}

impl GeminiPart {
    pub fn text(text: impl Into<String>) -> Self {
        GeminiPart::Text { text: text.into(), thought: None }
    }

    /// Answer text, skipping thought summaries.
    pub fn answer_text(&self) -> Option<&str> {
        match self {
            GeminiPart::Text { text, thought } if *thought != Some(true) => Some(text.as_str()),
            _ => None,
        }
    }
}
