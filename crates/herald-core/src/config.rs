use crate::error::{HeraldError, Result};
use crate::paths;
use crate::schedule::DispatchWindow;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// PoolsConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolsConfig {
    #[serde(default = "default_locations")]
    pub locations: PathBuf,
    #[serde(default = "default_subjects")]
    pub subjects: PathBuf,
}

fn default_locations() -> PathBuf {
    PathBuf::from(paths::DEFAULT_LOCATIONS_FILE)
}

fn default_subjects() -> PathBuf {
    PathBuf::from(paths::DEFAULT_SUBJECTS_FILE)
}

impl Default for PoolsConfig {
    fn default() -> Self {
        Self {
            locations: default_locations(),
            subjects: default_subjects(),
        }
    }
}

// ---------------------------------------------------------------------------
// GeneratorConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default = "default_generator_api_base")]
    pub api_base: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Prompt template; `{location}` and `{subject}` are substituted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

fn default_generator_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.9
}

fn default_max_tokens() -> u32 {
    500
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_base: default_generator_api_base(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            prompt: None,
        }
    }
}

// ---------------------------------------------------------------------------
// TelegramConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default = "default_telegram_api_base")]
    pub api_base: String,
    /// Answer `/start`, `/news` and `/stats` via long polling.
    #[serde(default = "default_poll_commands")]
    pub poll_commands: bool,
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,
}

fn default_telegram_api_base() -> String {
    "https://api.telegram.org".to_string()
}

fn default_poll_commands() -> bool {
    true
}

fn default_poll_timeout() -> u64 {
    30
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base: default_telegram_api_base(),
            poll_commands: default_poll_commands(),
            poll_timeout_secs: default_poll_timeout(),
        }
    }
}

// ---------------------------------------------------------------------------
// ControlConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ControlConfig {
    /// Port for the HTTP control API; disabled when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub pools: PoolsConfig,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub window: DispatchWindow,
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub control: ControlConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(paths::DEFAULT_DATA_DIR)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pools: PoolsConfig::default(),
            data_dir: default_data_dir(),
            window: DispatchWindow::default(),
            generator: GeneratorConfig::default(),
            telegram: TelegramConfig::default(),
            control: ControlConfig::default(),
        }
    }
}

impl Config {
    /// Load `herald.yaml` from `root`, falling back to defaults when the file
    /// is absent. A present file must parse and validate.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path).map_err(|e| {
            HeraldError::InvalidConfig(format!("cannot read {}: {e}", path.display()))
        })?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        self.window.validate()?;
        if !(0.0..=2.0).contains(&self.generator.temperature) {
            return Err(HeraldError::InvalidConfig(format!(
                "generator.temperature must be within 0.0..=2.0, got {}",
                self.generator.temperature
            )));
        }
        if self.generator.max_tokens == 0 {
            return Err(HeraldError::InvalidConfig(
                "generator.max_tokens must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn locations_path(&self, root: &Path) -> PathBuf {
        paths::resolve(root, &self.pools.locations)
    }

    pub fn subjects_path(&self, root: &Path) -> PathBuf {
        paths::resolve(root, &self.pools.subjects)
    }

    pub fn data_dir(&self, root: &Path) -> PathBuf {
        paths::resolve(root, &self.data_dir)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
