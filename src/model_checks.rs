use crate::converters::gemini::GeminiRequest;
use crate::converters::helpers::truncate;
use crate::flow::ModelError;
use crate::llm_client::GeminiClient;

/// Sends a one-token text request to the configured model and reports the outcome.
pub async fn perform_model_check(client: &GeminiClient) -> anyhow::Result<()> {
    let settings = client.settings().read().await.clone();
    println!("Checking model {} at {}:", settings.model, settings.api_base);
    if settings.api_key.is_empty() {
        println!("  warning: no API key configured");
    }

    let request = GeminiRequest::ping(&settings);
    match client.generate(&request, &settings).await {
        Ok(resp) => {
            println!(
                "[OK] {} ({})",
                settings.model,
                resp.model_version.as_deref().unwrap_or("unknown version")
            );
            Ok(())
        }
        Err(ModelError::Api { status, body }) => {
            println!("[FAIL] {} (status: {})\n  {}", settings.model, status, truncate(&body, 500));
            anyhow::bail!("model check failed with status {}", status)
        }
        Err(e) => {
            println!("[ERROR] {}: {}", settings.model, e);
            Err(e.into())
        }
    }
}
