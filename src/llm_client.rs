use crate::config::ModelSettings;
use crate::converters::gemini::{GeminiRequest, GeminiResponse};
use crate::converters::helpers::truncate;
use crate::flow::{ModelCapability, ModelError, Prompt};
use crate::request_id;
use reqwest::header::HeaderValue;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// `ModelCapability` backed by the Gemini `generateContent` REST API.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http_client: Arc<reqwest::Client>,
    // Swapped out when the config file changes
    settings: Arc<RwLock<ModelSettings>>,
}

impl GeminiClient {
    pub fn new(http_client: Arc<reqwest::Client>, settings: Arc<RwLock<ModelSettings>>) -> Self {
        Self { http_client, settings }
    }

    pub fn settings(&self) -> Arc<RwLock<ModelSettings>> {
        self.settings.clone()
    }

    fn build_target_url(settings: &ModelSettings) -> String {
        let api_base = &settings.api_base;
        let path = format!("models/{}:generateContent", settings.model);
        if api_base.ends_with('/') { format!("{}{}", api_base, path) } else { format!("{}/{}", api_base, path) }
    }

    pub async fn generate(
        &self,
        request: &GeminiRequest,
        settings: &ModelSettings,
    ) -> Result<GeminiResponse, ModelError> {
        let target_url = Self::build_target_url(settings);
        info!("Forwarding request to model: {}", settings.model);

        let mut target_request = self
            .http_client
            .post(&target_url)
            .header("Content-Type", "application/json");

        // Header rather than `?key=` so the key never shows up in URLs
        if !settings.api_key.is_empty() {
            let mut val = HeaderValue::from_str(&settings.api_key)
                .map_err(|_| ModelError::InvalidApiKey)?;
            val.set_sensitive(true);
            target_request = target_request.header(API_KEY_HEADER, val);
        }

        // Propagate request id upstream
        if let Some(id) = request_id::current() {
            if let Ok(val) = HeaderValue::from_str(&id.0) {
                target_request = target_request.header(request_id::REQUEST_ID_HEADER, val);
            }
        }

        let response = target_request.json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "<failed to read body>".to_string());
            warn!("Model request failed with status {}: {}", status, truncate(&body, 500));
            return Err(ModelError::Api { status: status.as_u16(), body });
        }

        let body = response.text().await?;
        debug!("raw response: {}", truncate(&body, 2000));
        serde_json::from_str::<GeminiResponse>(&body).map_err(|e| ModelError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ModelCapability for GeminiClient {
    async fn infer(&self, prompt: &Prompt, output_schema: &Value) -> Result<Option<Value>, ModelError> {
        // Snapshot so a reload mid-request can't mix settings
        let settings = self.settings.read().await.clone();
        let request = GeminiRequest::from_prompt(prompt, output_schema, &settings)?;
        let response = self.generate(&request, &settings).await?;
        if let Some(usage) = &response.usage_metadata {
            debug!(
                "token usage: prompt={:?} candidates={:?} total={:?}",
                usage.prompt_token_count, usage.candidates_token_count, usage.total_token_count
            );
        }
        response.output()
    }
}
