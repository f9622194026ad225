use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::backend::{DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TARGET_LANGUAGE, TranslationOptions};

pub const CURRENT_VERSION: u32 = 1;
const SETTINGS_FILENAME: &str = "config.yaml";
const APP_NAME: &str = "pdflingo";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_version")]
    pub version: u32,

    /// Base address of the extraction/translation backend
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Run translation automatically once extraction finishes
    #[serde(default = "default_true")]
    pub translate_after_extract: bool,

    /// Request the text overlay when rendering pages
    #[serde(default = "default_true")]
    pub text_overlay: bool,

    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_version() -> u32 {
    CURRENT_VERSION
}

fn default_backend_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_target_language() -> String {
    DEFAULT_TARGET_LANGUAGE.to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            backend_url: default_backend_url(),
            model: default_model(),
            target_language: default_target_language(),
            translate_after_extract: true,
            text_overlay: true,
            request_timeout_secs: default_timeout_secs(),
        }
    }
}

/// `$CONFIG_DIR/pdflingo/config.yaml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|config| config.join(APP_NAME).join(SETTINGS_FILENAME))
}

impl Settings {
    /// Load settings from `path`, writing defaults there if the file does
    /// not exist. Unreadable or malformed files fall back to defaults.
    pub fn load_or_create(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            warn!("Could not determine config directory, using default settings");
            return Self::default();
        };

        if !path.exists() {
            info!("Settings file not found, creating with defaults at {path:?}");
            let settings = Self::default();
            settings.save_to(path);
            return settings;
        }

        match Self::load_from(path) {
            Ok(mut settings) => {
                debug!("Loaded settings from {path:?}");
                if settings.version < CURRENT_VERSION {
                    migrate_settings(&mut settings);
                    settings.save_to(path);
                }
                settings
            }
            Err(e) => {
                error!("Failed to load settings file {path:?}: {e}");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    pub fn save_to(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                if let Err(e) = fs::create_dir_all(parent) {
                    error!("Failed to create config directory {parent:?}: {e}");
                    return;
                }
            }
        }

        let body = match serde_yaml::to_string(self) {
            Ok(body) => body,
            Err(e) => {
                error!("Failed to serialize settings: {e}");
                return;
            }
        };

        match fs::write(path, format!("{SETTINGS_HEADER}{body}")) {
            Ok(()) => debug!("Saved settings to {path:?}"),
            Err(e) => error!("Failed to save settings to {path:?}: {e}"),
        }
    }

    pub fn translation_options(&self) -> TranslationOptions {
        TranslationOptions {
            model: self.model.clone(),
            target_language: self.target_language.clone(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

fn migrate_settings(settings: &mut Settings) {
    info!(
        "Migrating settings from v{} to v{}",
        settings.version, CURRENT_VERSION
    );

    settings.version = CURRENT_VERSION;
}

const SETTINGS_HEADER: &str = r#"# pdflingo settings
#
# backend_url: server exposing POST /extract_text and POST /translate
# model / target_language: forwarded with every /translate request
# translate_after_extract: start translating as soon as text is extracted
# text_overlay: request line geometry with each rendered page (v / y keys)

"#;
