use crate::errors::{Result, WalkError};
use crate::types::Strategy;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub strategy: Strategy,
    pub log: LogSettings,
    pub output: OutputSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Default filter directive; `RUST_LOG` takes precedence when set.
    pub level: String,
    pub ansi: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub pretty: bool,
    pub include_text: bool,
    pub max_text_length: usize,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            ansi: true,
        }
    }
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            pretty: false,
            include_text: true,
            max_text_length: 1000,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.log.level.trim().is_empty() {
            return Err(WalkError::Settings("log.level must not be empty".into()));
        }
        if self.output.include_text && self.output.max_text_length == 0 {
            return Err(WalkError::Settings(
                "output.max_text_length must be positive".into(),
            ));
        }
        Ok(())
    }
}
