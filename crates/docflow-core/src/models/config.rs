//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for the docflow pipeline.
///
/// Built once at process start and handed by reference to whatever needs it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocflowConfig {
    /// Page assembly configuration.
    pub assembly: AssemblyConfig,

    /// Field/table extraction configuration.
    pub extraction: ExtractionConfig,

    /// Completion endpoint configuration.
    pub llm: LlmConfig,

    /// Local document store configuration.
    pub store: StoreConfig,
}

/// Page assembler behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblyConfig {
    /// Group chunks by their resolved page number.
    ///
    /// When disabled every chunk is its own block, labelled by position.
    pub group_by_page: bool,

    /// Produce the raw page -> text mapping instead of labelled text.
    pub strict: bool,

    /// Page assigned to chunks that carry no page number.
    pub default_page: u32,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            group_by_page: true,
            strict: false,
            default_page: 1,
        }
    }
}

/// How the model is asked for field and table values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMode {
    /// One prompt covering all fields and tables.
    #[default]
    Unified,
    /// One prompt per group of fields plus one per table.
    FieldGroups,
}

/// Field/table extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Calling convention used against the model.
    pub mode: ExtractionMode,

    /// Number of flat fields per prompt in `field_groups` mode.
    pub field_group_size: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            mode: ExtractionMode::Unified,
            field_group_size: 10,
        }
    }
}

/// OpenAI-compatible chat completion endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base endpoint, e.g. `https://myresource.openai.azure.com`.
    pub endpoint: String,

    /// Deployment (model) name.
    pub deployment: String,

    /// API version query parameter.
    pub api_version: String,

    /// Environment variable holding the API key.
    pub api_key_env: String,

    /// System message sent with every prompt.
    pub system_prompt: String,

    /// Completion token cap.
    pub max_tokens: u32,

    /// Sampling temperature.
    pub temperature: f32,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            deployment: String::new(),
            api_version: "2024-06-01".to_string(),
            api_key_env: "AZURE_API_KEY".to_string(),
            system_prompt: "You are an AI data extractor.".to_string(),
            max_tokens: 4096,
            temperature: 0.2,
            timeout_secs: 120,
        }
    }
}

/// Local document store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Root directory for stored documents.
    pub root: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("docflow-store"),
        }
    }
}

impl DocflowConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: DocflowConfig =
            serde_json::from_str(r#"{"extraction": {"mode": "field_groups"}}"#).unwrap();

        assert_eq!(config.extraction.mode, ExtractionMode::FieldGroups);
        assert_eq!(config.extraction.field_group_size, 10);
        assert!(config.assembly.group_by_page);
        assert_eq!(config.assembly.default_page, 1);
        assert_eq!(config.llm.api_key_env, "AZURE_API_KEY");
    }
}
