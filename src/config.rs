use serde::{Deserialize, Serialize};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

// Checked in order when the config file leaves api_key empty
const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "GOOGLE_API_KEY"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub model: ModelSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelSettings {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub max_output_tokens: Option<u32>,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_base: default_api_base(),
            api_key: String::new(),
            temperature: None,
            max_output_tokens: None,
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        let mut config: Config = serde_yaml::from_str(content)?;
        if config.model.model.trim().is_empty() {
            anyhow::bail!("model.model must not be empty");
        }
        if config.model.api_key.is_empty() {
            config.model.api_key = api_key_from_env().unwrap_or_default();
        }
        Ok(config)
    }
}

fn api_key_from_env() -> Option<String> {
    API_KEY_ENV_VARS
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_full_config() {
        let yaml = r#"
model:
  model: gemini-2.0-flash
  api_base: http://localhost:9999/v1beta
  api_key: secret
  temperature: 0.4
  max_output_tokens: 2048
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.model.model, "gemini-2.0-flash");
        assert_eq!(config.model.api_base, "http://localhost:9999/v1beta");
        assert_eq!(config.model.api_key, "secret");
        assert_eq!(config.model.temperature, Some(0.4));
        assert_eq!(config.model.max_output_tokens, Some(2048));
    }

    #[test]
    fn test_defaults_applied() {
        let yaml = "model:\n  api_key: k\n";
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.model.model, DEFAULT_MODEL);
        assert_eq!(config.model.api_base, DEFAULT_API_BASE);
        assert!(config.model.temperature.is_none());
        assert!(config.model.max_output_tokens.is_none());
    }

    #[test]
    fn test_blank_model_rejected() {
        let yaml = "model:\n  model: \"  \"\n  api_key: k\n";
        assert!(Config::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_missing_model_section_rejected() {
        assert!(Config::from_yaml("other: 1\n").is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "model:\n  model: gemini-2.5-pro\n  api_key: abc").unwrap();
        let config = Config::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.model.model, "gemini-2.5-pro");
        assert_eq!(config.model.api_key, "abc");
    }

    #[test]
    fn test_from_missing_file() {
        assert!(Config::from_file("/nonexistent/image-analyzer/config.yaml").is_err());
    }
}
