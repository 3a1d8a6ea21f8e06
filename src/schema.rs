//! Shapes of the data crossing the model boundary.
//!
//! Both directions are checked structurally against a hand-written JSON
//! schema before being turned into typed values, so a missing or mistyped
//! field is reported as such instead of being defaulted.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    #[error("{schema}: expected a JSON object")]
    NotAnObject { schema: &'static str },

    #[error("{schema}: missing required field '{field}'")]
    MissingField {
        schema: &'static str,
        field: &'static str,
    },

    #[error("{schema}: field '{field}' must be of type {expected}")]
    WrongType {
        schema: &'static str,
        field: &'static str,
        expected: &'static str,
    },

    #[error("{schema}: field '{field}' must not be empty")]
    EmptyField {
        schema: &'static str,
        field: &'static str,
    },
}

/// A value with a declared JSON shape that can be checked before use.
pub trait Schema: Sized {
    const NAME: &'static str;

    /// JSON schema in the subset understood by Gemini's `responseSchema`.
    fn json_schema() -> Value;

    fn validate(value: &Value) -> Result<Self, SchemaError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeImageInput {
    /// A photo as a data URI: `data:<mimetype>;base64,<encoded_data>`.
    #[serde(rename = "photoDataUri")]
    pub photo_data_uri: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeImageOutput {
    pub description: String,
}

impl Schema for AnalyzeImageInput {
    const NAME: &'static str = "AnalyzeImageInput";

    fn json_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "photoDataUri": {
                    "type": "string",
                    "description": "A photo to analyze, as a data URI that must include a MIME type and use Base64 encoding. Expected format: 'data:<mimetype>;base64,<encoded_data>'."
                }
            },
            "required": ["photoDataUri"]
        })
    }

    fn validate(value: &Value) -> Result<Self, SchemaError> {
        let photo_data_uri = required_string(Self::NAME, value, "photoDataUri")?;
        Ok(Self {
            photo_data_uri: photo_data_uri.to_string(),
        })
    }
}

impl Schema for AnalyzeImageOutput {
    const NAME: &'static str = "AnalyzeImageOutput";

    fn json_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "description": {
                    "type": "string",
                    "description": "A descriptive text analysis of the image content."
                }
            },
            "required": ["description"]
        })
    }

    fn validate(value: &Value) -> Result<Self, SchemaError> {
        let description = required_string(Self::NAME, value, "description")?;
        if description.trim().is_empty() {
            return Err(SchemaError::EmptyField {
                schema: Self::NAME,
                field: "description",
            });
        }
        Ok(Self {
            description: description.to_string(),
        })
    }
}

fn required_string<'a>(
    schema: &'static str,
    value: &'a Value,
    field: &'static str,
) -> Result<&'a str, SchemaError> {
    let obj = value.as_object().ok_or(SchemaError::NotAnObject { schema })?;
    match obj.get(field) {
        None | Some(Value::Null) => Err(SchemaError::MissingField { schema, field }),
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(_) => Err(SchemaError::WrongType {
            schema,
            field,
            expected: "string",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_accepts_any_string() {
        let input = AnalyzeImageInput::validate(&json!({"photoDataUri": "not a data uri"})).unwrap();
        assert_eq!(input.photo_data_uri, "not a data uri");
    }

    #[test]
    fn test_input_missing_field() {
        let err = AnalyzeImageInput::validate(&json!({})).unwrap_err();
        assert_eq!(
            err,
            SchemaError::MissingField { schema: "AnalyzeImageInput", field: "photoDataUri" }
        );
    }

    #[test]
    fn test_input_wrong_type() {
        let err = AnalyzeImageInput::validate(&json!({"photoDataUri": 42})).unwrap_err();
        assert!(matches!(err, SchemaError::WrongType { field: "photoDataUri", .. }));
    }

    #[test]
    fn test_input_not_object() {
        let err = AnalyzeImageInput::validate(&json!("data:image/png;base64,AAAA")).unwrap_err();
        assert!(matches!(err, SchemaError::NotAnObject { .. }));
    }

    #[test]
    fn test_output_valid() {
        let out = AnalyzeImageOutput::validate(&json!({"description": "A cat on a mat."})).unwrap();
        assert_eq!(out.description, "A cat on a mat.");
    }

    #[test]
    fn test_output_missing_description_rejected() {
        let err = AnalyzeImageOutput::validate(&json!({"caption": "A cat"})).unwrap_err();
        assert_eq!(
            err,
            SchemaError::MissingField { schema: "AnalyzeImageOutput", field: "description" }
        );
    }

    #[test]
    fn test_output_null_description_rejected() {
        let err = AnalyzeImageOutput::validate(&json!({"description": null})).unwrap_err();
        assert!(matches!(err, SchemaError::MissingField { .. }));
    }

    #[test]
    fn test_output_empty_description_rejected() {
        let err = AnalyzeImageOutput::validate(&json!({"description": "  "})).unwrap_err();
        assert!(matches!(err, SchemaError::EmptyField { field: "description", .. }));
    }

    #[test]
    fn test_output_wrong_type_rejected() {
        let err = AnalyzeImageOutput::validate(&json!({"description": ["a", "b"]})).unwrap_err();
        assert!(matches!(err, SchemaError::WrongType { expected: "string", .. }));
    }

    #[test]
    fn test_output_schema_requires_description() {
        let schema = AnalyzeImageOutput::json_schema();
        assert_eq!(schema["required"], json!(["description"]));
        assert_eq!(schema["properties"]["description"]["type"], "string");
    }

    #[test]
    fn test_input_serializes_camel_case() {
        let input = AnalyzeImageInput { photo_data_uri: "data:image/png;base64,AA".to_string() };
        assert_eq!(serde_json::to_value(&input).unwrap(), json!({"photoDataUri": "data:image/png;base64,AA"}));
    }
}
