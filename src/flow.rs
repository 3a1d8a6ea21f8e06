use crate::schema::{AnalyzeImageInput, AnalyzeImageOutput, Schema, SchemaError};
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

pub const ANALYSIS_INSTRUCTION: &str = "You are an AI expert in image analysis. Your task is to provide a detailed descriptive text analysis of the content in the provided image.\n\nAnalyze the following image and generate a comprehensive description:";

#[derive(Debug, Clone, PartialEq)]
pub enum PromptPart {
    Text(String),
    /// Media referenced by URL; for uploads this is a base64 data URI.
    Media { url: String },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Prompt {
    pub parts: Vec<PromptPart>,
}

impl Prompt {
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.parts.push(PromptPart::Text(text.into()));
        self
    }

    pub fn media(mut self, url: impl Into<String>) -> Self {
        self.parts.push(PromptPart::Media { url: url.into() });
        self
    }
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to reach model: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("model API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("failed to decode model response: {0}")]
    Decode(String),

    #[error("prompt blocked by model: {0}")]
    Blocked(String),

    #[error("model output is not valid JSON: {0}")]
    MalformedOutput(String),

    #[error("unsupported media reference: {0}")]
    InvalidMedia(String),

    #[error("API key is not a valid header value")]
    InvalidApiKey,
}

impl From<reqwest::Error> for ModelError {
    // The URL can carry credentials; keep it out of logs
    fn from(e: reqwest::Error) -> Self {
        ModelError::Transport(e.without_url())
    }
}

/// A hosted model that turns a prompt into a value shaped like `output_schema`.
///
/// `Ok(None)` means the call went through but the model produced nothing
/// usable.
#[async_trait]
pub trait ModelCapability: Send + Sync {
    async fn infer(&self, prompt: &Prompt, output_schema: &Value) -> Result<Option<Value>, ModelError>;
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("model returned no output")]
    NoOutput,
}

pub fn analysis_prompt(input: &AnalyzeImageInput) -> Prompt {
    Prompt::default()
        .text(ANALYSIS_INSTRUCTION)
        .media(input.photo_data_uri.clone())
}

/// Describes an uploaded image with exactly one model call.
pub async fn analyze_uploaded_image(
    model: &dyn ModelCapability,
    input: &AnalyzeImageInput,
) -> Result<AnalyzeImageOutput, AnalysisError> {
    // Checked on the wire shape, the same way the output is
    let raw_input = serde_json::to_value(input).map_err(|e| ModelError::Decode(e.to_string()))?;
    let input = AnalyzeImageInput::validate(&raw_input)?;

    let prompt = analysis_prompt(&input);
    let output_schema = AnalyzeImageOutput::json_schema();

    info!("Requesting image analysis ({} bytes of image data)", input.photo_data_uri.len());
    let raw_output = model
        .infer(&prompt, &output_schema)
        .await?
        .ok_or(AnalysisError::NoOutput)?;
    debug!("raw model output: {}", raw_output);

    Ok(AnalyzeImageOutput::validate(&raw_output)?)
}
