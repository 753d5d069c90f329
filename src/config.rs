/// Configuration module for Koine.
///
/// Handles loading, validating, and providing default configuration values.
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::parser::TagScheme;

// ── Default value functions ──────────────────────────────────────────

fn default_greek_dir() -> String {
    "./data/sblgnt".to_string()
}

fn default_greek_extension() -> String {
    "txt".to_string()
}

fn default_greek_label() -> String {
    "SBLGNT".to_string()
}

fn default_english_path() -> String {
    "./data/esv.xml".to_string()
}

fn default_english_label() -> String {
    "ESV".to_string()
}

fn default_user_translations_path() -> String {
    "./user_translations.json".to_string()
}

fn default_log_warning_limit() -> usize {
    20
}

// ── Config structs ───────────────────────────────────────────────────

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub greek: GreekConfig,

    #[serde(default)]
    pub english: EnglishConfig,

    /// Strong's Greek dictionary (`strongsgreek.xml`). Optional.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lexicon_path: Option<String>,

    #[serde(default = "default_user_translations_path")]
    pub user_translations_path: String,

    /// Individual load diagnostics logged per category before summarizing.
    #[serde(default = "default_log_warning_limit")]
    pub log_warning_limit: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GreekConfig {
    /// Directory of MorphGNT files, one per book.
    #[serde(default = "default_greek_dir")]
    pub dir: String,

    #[serde(default = "default_greek_extension")]
    pub extension: String,

    #[serde(default = "default_greek_label")]
    pub label: String,

    /// Accept books that start late or stop early (excerpts, test data).
    /// Holes inside the loaded span stay fatal either way.
    #[serde(default)]
    pub allow_partial_books: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EnglishConfig {
    #[serde(default = "default_english_path")]
    pub path: String,

    #[serde(default)]
    pub scheme: TagScheme,

    #[serde(default = "default_english_label")]
    pub label: String,
}

// ── Default impls ────────────────────────────────────────────────────

impl Default for Config {
    fn default() -> Self {
        Self {
            greek: GreekConfig::default(),
            english: EnglishConfig::default(),
            lexicon_path: None,
            user_translations_path: default_user_translations_path(),
            log_warning_limit: default_log_warning_limit(),
        }
    }
}

impl Default for GreekConfig {
    fn default() -> Self {
        Self {
            dir: default_greek_dir(),
            extension: default_greek_extension(),
            label: default_greek_label(),
            allow_partial_books: false,
        }
    }
}

impl Default for EnglishConfig {
    fn default() -> Self {
        Self {
            path: default_english_path(),
            scheme: TagScheme::default(),
            label: default_english_label(),
        }
    }
}

// ── Config implementation ────────────────────────────────────────────

impl Config {
    /// Load configuration from a JSON file.
    ///
    /// If `config_path` is empty, defaults to `"config.json"`.
    /// If the file does not exist, returns a default config and generates a
    /// template file for the default path.
    pub fn load(config_path: &str) -> Result<Self> {
        let path = if config_path.is_empty() {
            "config.json"
        } else {
            config_path
        };

        if !Path::new(path).exists() {
            info!("{path} not found, using defaults");
            let cfg = Self::default();

            // Generate template only for the default path
            if path == "config.json" {
                match cfg.save(path) {
                    Ok(()) => info!("Generated config template: {path}"),
                    Err(e) => warn!("Failed to generate config template: {e}"),
                }
            }

            return Ok(cfg);
        }

        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {path}"))?;

        let cfg: Config = match serde_json::from_str(&data) {
            Ok(c) => c,
            Err(e) => {
                warn!("Invalid JSON in {path}: {e}");
                warn!("Using default configuration");
                return Ok(Self::default());
            }
        };

        info!("Loaded configuration from {path}");
        Ok(cfg)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &str) -> Result<()> {
        let data = serde_json::to_string_pretty(self).context("failed to marshal config")?;
        std::fs::write(path, data).with_context(|| format!("failed to write config: {path}"))?;
        Ok(())
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(!self.greek.dir.trim().is_empty(), "greek.dir must be set");
        anyhow::ensure!(
            !self.greek.extension.trim().is_empty(),
            "greek.extension must be set"
        );
        anyhow::ensure!(!self.greek.label.trim().is_empty(), "greek.label must be set");
        anyhow::ensure!(!self.english.path.trim().is_empty(), "english.path must be set");
        anyhow::ensure!(
            !self.english.label.trim().is_empty(),
            "english.label must be set"
        );
        anyhow::ensure!(
            self.greek.label != self.english.label,
            "greek.label and english.label must differ"
        );
        anyhow::ensure!(
            !self.user_translations_path.trim().is_empty(),
            "user_translations_path must be set"
        );
        Ok(())
    }
}

// ── Tests ────────────────────────────────────────────────────────────
