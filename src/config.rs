use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    pub llm: LlmConfig,
    pub tts: TtsConfig,
    pub storage: StorageConfig,

    #[serde(default)]
    pub story: StoryConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LlmConfig {
    pub provider: String, // "openai" or "azure"
    pub api_key: String,

    #[serde(default = "default_llm_model")]
    pub model: String,

    /// For "openai" an optional base URL override; for "azure" the resource
    /// endpoint (required).
    pub endpoint: Option<String>,

    #[serde(default = "default_api_version")]
    pub api_version: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TtsConfig {
    pub url: String,
    pub api_key: String,

    #[serde(default = "default_tts_model")]
    pub model: String,

    /// Preselected voice. When absent the CLI asks interactively.
    pub voice: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StorageConfig {
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
    pub bucket: String,
    pub key_prefix: String,
    pub cdn_base: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StoryConfig {
    #[serde(default = "default_output")]
    pub output_folder: String,

    #[serde(default = "default_temp")]
    pub temp_folder: String,

    #[serde(default = "default_template")]
    pub template_path: String,

    /// Overrides the built-in anchor persona used in narration prompts.
    pub character_sketch: Option<String>,
}

impl Default for StoryConfig {
    fn default() -> Self {
        Self {
            output_folder: default_output(),
            temp_folder: default_temp(),
            template_path: default_template(),
            character_sketch: None,
        }
    }
}

fn default_llm_model() -> String {
    "gpt-4".to_string()
}
fn default_api_version() -> String {
    "2024-02-01".to_string()
}
fn default_tts_model() -> String {
    "tts-1-hd".to_string()
}
fn default_output() -> String {
    "output".to_string()
}
fn default_temp() -> String {
    "temp".to_string()
}
fn default_template() -> String {
    "templates/story.html".to_string()
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Path::new("config.yml");
        if !path.exists() {
            anyhow::bail!("config.yml not found. Please create one.");
        }

        let content = fs::read_to_string(path).context("Failed to read config.yml")?;
        let config: Config =
            serde_yaml_ng::from_str(&content).context("Failed to parse config.yml")?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let content = serde_yaml_ng::to_string(self)?;
        fs::write("config.yml", content).context("Failed to write config.yml")?;
        Ok(())
    }

    pub fn ensure_directories(&self) -> Result<()> {
        fs::create_dir_all(&self.story.output_folder)?;
        fs::create_dir_all(&self.story.temp_folder)?;
        Ok(())
    }
}
