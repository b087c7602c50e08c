use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::error::{Result, SubtransError};

fn default_step_size() -> usize {
    15
}

fn default_max_retries() -> u32 {
    5
}

fn default_request_timeout_secs() -> u64 {
    300
}

fn default_max_width() -> usize {
    50
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub translate: TranslateConfig,
    #[serde(default)]
    pub split: SplitConfig,
    #[serde(default)]
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateConfig {
    /// Ollama endpoint URL
    pub endpoint: String,
    /// LLM model to use for translation
    pub model: String,
    /// Target language, either a code ("fr") or a name ("French")
    pub target_language: String,
    /// Number of entries committed per request
    #[serde(default = "default_step_size")]
    pub step_size: usize,
    /// Already committed entries re-sent at the head of a window as context
    #[serde(default)]
    pub backtrack: usize,
    /// Retries per window before the file is abandoned
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// HTTP timeout for a single backend call
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Instruction template with `{language}` and `{text}` placeholders
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_template: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitConfig {
    /// Single-line subtitles longer than this are reflowed into two lines
    #[serde(default = "default_max_width")]
    pub max_width: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Snapshot rewritten after every committed window
    pub checkpoint: PathBuf,
    /// Last rejected prompt/response pair
    pub error_log: PathBuf,
    /// Directory for rolling log files
    pub log_dir: PathBuf,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            max_width: default_max_width(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        let work_dir = PathBuf::from(".subtrans");
        Self {
            checkpoint: work_dir.join("tmp.srt"),
            error_log: work_dir.join("error.log"),
            log_dir: work_dir.join("log"),
        }
    }
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434".to_string(),
            model: "gemma2".to_string(),
            target_language: "fr".to_string(),
            step_size: default_step_size(),
            backtrack: 0,
            max_retries: default_max_retries(),
            request_timeout_secs: default_request_timeout_secs(),
            prompt_template: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            translate: TranslateConfig::default(),
            split: SplitConfig::default(),
            paths: PathsConfig::default(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SubtransError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)?;

        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SubtransError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| SubtransError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        let translate = &self.translate;
        if translate.step_size == 0 {
            return Err(SubtransError::Config("step_size must be at least 1".to_string()));
        }
        if translate.model.trim().is_empty() {
            return Err(SubtransError::Config("model must not be empty".to_string()));
        }
        if translate.target_language.trim().is_empty() {
            return Err(SubtransError::Config("target_language must not be empty".to_string()));
        }
        if let Some(template) = &translate.prompt_template {
            if !template.contains("{text}") {
                return Err(SubtransError::Config(
                    "prompt_template must contain a {text} placeholder".to_string(),
                ));
            }
        }
        if self.split.max_width == 0 {
            return Err(SubtransError::Config("max_width must be at least 1".to_string()));
        }
        Ok(())
    }
}
