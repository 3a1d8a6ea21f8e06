use crate::flow::{ModelCapability, analyze_uploaded_image};
use crate::schema::{AnalyzeImageInput, AnalyzeImageOutput, Schema};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use tracing::{error, info, warn};

pub const MISSING_IMAGE_MESSAGE: &str = "Image data is missing.";
pub const ANALYSIS_FAILED_MESSAGE: &str = "An error occurred during analysis. Please try again.";

/// Result handed back to the browser.
///
/// Serializes as `{"success": true, "data": ...}` or
/// `{"success": false, "error": "..."}`.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionResult<T> {
    Success(T),
    Failure(String),
}

impl<T> ActionResult<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, ActionResult::Success(_))
    }
}

impl<T: Serialize> Serialize for ActionResult<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        match self {
            ActionResult::Success(data) => {
                map.serialize_entry("success", &true)?;
                map.serialize_entry("data", data)?;
            }
            ActionResult::Failure(message) => {
                map.serialize_entry("success", &false)?;
                map.serialize_entry("error", message)?;
            }
        }
        map.end()
    }
}

fn has_image_data(request: &Value) -> bool {
    match request.get("photoDataUri") {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

/// Entry point for untrusted client input. Every failure is logged here and
/// replaced by a fixed message; nothing is returned as an error.
pub async fn get_image_analysis(
    model: &dyn ModelCapability,
    request: &Value,
) -> ActionResult<AnalyzeImageOutput> {
    if !has_image_data(request) {
        warn!("Analysis requested without image data");
        return ActionResult::Failure(MISSING_IMAGE_MESSAGE.to_string());
    }

    let result = match AnalyzeImageInput::validate(request) {
        Ok(input) => analyze_uploaded_image(model, &input).await,
        Err(e) => Err(e.into()),
    };

    match result {
        Ok(output) => {
            info!("Image analysis succeeded ({} chars)", output.description.len());
            ActionResult::Success(output)
        }
        Err(e) => {
            error!("Image analysis failed: {}", e);
            ActionResult::Failure(ANALYSIS_FAILED_MESSAGE.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::stub::{Behavior, StubModel};
    use serde_json::json;

    const PHOTO: &str = "data:image/jpeg;base64,/9j/4AAQSkZJRg==";

    #[tokio::test]
    async fn test_missing_field_skips_model() {
        let model = StubModel::replying(json!({"description": "unused"}));
        let result = get_image_analysis(&model, &json!({})).await;
        assert_eq!(result, ActionResult::Failure(MISSING_IMAGE_MESSAGE.to_string()));
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_or_null_field_skips_model() {
        let model = StubModel::replying(json!({"description": "unused"}));
        for request in [json!({"photoDataUri": ""}), json!({"photoDataUri": null}), Value::Null] {
            let result = get_image_analysis(&model, &request).await;
            assert_eq!(result, ActionResult::Failure(MISSING_IMAGE_MESSAGE.to_string()));
        }
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn test_success_shape() {
        let model = StubModel::replying(json!({"description": "X"}));
        let result = get_image_analysis(&model, &json!({"photoDataUri": PHOTO})).await;
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"success": true, "data": {"description": "X"}})
        );
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn test_no_output_becomes_generic_failure() {
        let model = StubModel::new(Behavior::Nothing);
        let result = get_image_analysis(&model, &json!({"photoDataUri": PHOTO})).await;
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"success": false, "error": ANALYSIS_FAILED_MESSAGE})
        );
    }

    #[tokio::test]
    async fn test_model_error_does_not_escape() {
        let model = StubModel::new(Behavior::Fail);
        let result = get_image_analysis(&model, &json!({"photoDataUri": PHOTO})).await;
        assert_eq!(result, ActionResult::Failure(ANALYSIS_FAILED_MESSAGE.to_string()));
        // upstream detail must not leak
        let body = serde_json::to_string(&result).unwrap();
        assert!(!body.contains("overloaded"));
        assert!(!body.contains("503"));
    }

    #[tokio::test]
    async fn test_mistyped_field_is_generic_failure() {
        let model = StubModel::replying(json!({"description": "unused"}));
        let result = get_image_analysis(&model, &json!({"photoDataUri": 12})).await;
        assert_eq!(result, ActionResult::Failure(ANALYSIS_FAILED_MESSAGE.to_string()));
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn test_repeated_calls_are_stable() {
        let model = StubModel::replying(json!({"description": "Same every time."}));
        let request = json!({"photoDataUri": PHOTO});
        let first = get_image_analysis(&model, &request).await;
        let second = get_image_analysis(&model, &request).await;
        assert_eq!(first, second);
        assert!(first.is_success());
        assert_eq!(model.calls(), 2);
    }
}
