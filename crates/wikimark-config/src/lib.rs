use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

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
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub wiki_path: PathBuf,
    /// Directory holding images referenced as `![name]`. Defaults to
    /// `<wiki_path>/images`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images_path: Option<PathBuf>,
    #[serde(default)]
    pub render: RenderConfig,
}

/// Renderer settings, the `[render]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub empty_placeholder: String,
    pub toc_marker: String,
    pub toc_title: String,
    pub category_prefix: String,
    pub allow_raw_html: bool,
    /// Prefix put in front of percent-encoded page titles in link hrefs.
    pub link_prefix: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            empty_placeholder: "This page is empty.".to_string(),
            toc_marker: "[목차]".to_string(),
            toc_title: "목차".to_string(),
            category_prefix: "분류".to_string(),
            allow_raw_html: true,
            link_prefix: "#/page/".to_string(),
        }
    }
}

impl Config {
    pub fn new(wiki_path: PathBuf) -> Self {
        Self {
            wiki_path,
            images_path: None,
            render: RenderConfig::default(),
        }
    }

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

        // Expand shell variables and tilde in the loaded paths
        config.wiki_path = Self::expand_path(&config.wiki_path).unwrap_or(config.wiki_path);
        config.images_path = config
            .images_path
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
        let config_dir = shellexpand::tilde("~/.config/wikimark");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Image directory, falling back to `images/` inside the wiki.
    pub fn images_dir(&self) -> PathBuf {
        self.images_path
            .clone()
            .unwrap_or_else(|| self.wiki_path.join("images"))
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}
