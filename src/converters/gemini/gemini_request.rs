use crate::config::ModelSettings;
use crate::converters::gemini::{GeminiContent, GeminiGenerationConfig, GeminiInlineData, GeminiPart};
use crate::converters::helpers::parse_data_url;
use crate::flow::{ModelError, Prompt, PromptPart};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiRequest {
    // Not sent to Gemini API; the model is part of the URL path
    #[serde(skip_serializing)]
    #[serde(default)]
    pub model: String,
    pub contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GeminiGenerationConfig>,
}

impl GeminiRequest {
    /// Builds a single-turn user request asking for JSON shaped like `output_schema`.
    pub fn from_prompt(
        prompt: &Prompt,
        output_schema: &Value,
        settings: &ModelSettings,
    ) -> Result<Self, ModelError> {
        let parts = prompt
            .parts
            .iter()
            .map(to_gemini_part)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(GeminiRequest {
            model: settings.model.clone(),
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts,
            }],
            generation_config: Some(GeminiGenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(output_schema.clone()),
                temperature: settings.temperature,
                max_output_tokens: settings.max_output_tokens,
            }),
        })
    }

    /// Minimal text-only request, used to check that the model answers at all.
    pub fn ping(settings: &ModelSettings) -> Self {
        GeminiRequest {
            model: settings.model.clone(),
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart::text("ping")],
            }],
            generation_config: Some(GeminiGenerationConfig {
                max_output_tokens: Some(1),
                temperature: Some(0.0),
                ..Default::default()
            }),
        }
    }
}

fn to_gemini_part(part: &PromptPart) -> Result<GeminiPart, ModelError> {
    match part {
        PromptPart::Text(text) => Ok(GeminiPart::text(text.clone())),
        PromptPart::Media { url } => {
            let (mime_type, data) = parse_data_url(url).ok_or_else(|| {
                let head: String = url.chars().take(32).collect();
                ModelError::InvalidMedia(format!("expected a base64 data URI, got '{}…'", head))
            })?;
            Ok(GeminiPart::InlineData {
                inline_data: GeminiInlineData { mime_type, data },
            })
        }
    }
}
