use richblock_engine::{BlockType, Command, Dispatcher, Document, EngineError, Keymap, Keystroke};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_PLACEHOLDER: &str = "Please enter text";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid initial document in config file at {config_path}: {source}")]
    InvalidDocument {
        config_path: PathBuf,
        source: EngineError,
    },
}

/// A `[[bindings]]` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub keys: Keystroke,
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Top-level block whose start swallows backspace
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protected_block_index: Option<usize>,
    pub protect_leading_block: bool,
    /// Type of blocks created by Enter and restored by block toggles
    pub default_block_type: BlockType,
    pub placeholder: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
    /// Use only `bindings`, dropping the built-in ones
    pub replace_default_bindings: bool,
    pub bindings: Vec<Binding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_document: Option<Document>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            protected_block_index: Some(1),
            protect_leading_block: true,
            default_block_type: BlockType::Paragraph,
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            log_file: None,
            replace_default_bindings: false,
            bindings: Vec::new(),
            initial_document: None,
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        if let Some(document) = &config.initial_document {
            document
                .validate()
                .map_err(|source| ConfigError::InvalidDocument {
                    config_path: config_path.to_path_buf(),
                    source,
                })?;
        }

        // Expand shell variables and tilde in the log file path
        config.log_file = config
            .log_file
            .map(|path| Self::expand_path(&path).unwrap_or(path));

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/richblock");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }

    /// Where the binary writes its log, `~/.cache/richblock/richblock.log` unless configured
    pub fn log_path(&self) -> PathBuf {
        match &self.log_file {
            Some(path) => path.clone(),
            None => {
                let cache_dir = shellexpand::tilde("~/.cache/richblock");
                PathBuf::from(cache_dir.as_ref()).join("richblock.log")
            }
        }
    }

    /// `None` when backspace protection is switched off
    pub fn protected_block_index(&self) -> Option<usize> {
        if self.protect_leading_block {
            self.protected_block_index
        } else {
            None
        }
    }

    /// Built-in bindings overlaid with the configured ones, or only the
    /// configured ones when `replace_default_bindings` is set
    pub fn keymap(&self) -> Keymap {
        let mut keymap = if self.replace_default_bindings {
            Keymap::empty()
        } else {
            Keymap::default()
        };
        for binding in &self.bindings {
            keymap.bind(binding.keys, binding.command);
        }
        keymap
    }

    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(self.keymap())
            .with_protected_block_index(self.protected_block_index())
            .with_default_block_type(self.default_block_type)
    }

    /// The document to start editing, falling back to an empty heading and paragraph
    pub fn document(&self) -> Document {
        match &self.initial_document {
            Some(document) if document.block_count() > 0 => document.clone(),
            _ => Document::initial(),
        }
    }
}
