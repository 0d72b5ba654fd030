use std::path::Path;

use serde::Deserialize;

#[derive(Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct Config {
    pub convert: ConvertOptions,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct ConvertOptions {
    /// Deepest snapshot-in-snapshot nesting accepted before the note fails.
    pub max_embed_depth: usize,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            max_embed_depth: 32,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to parse YAML config: {0}")]
    ParseYaml(#[from] serde_yaml::Error),
    #[error("Failed to parse TOML config: {0}")]
    ParseToml(#[from] toml::de::Error),
    #[error("Unsupported config file extension: {0}")]
    UnsupportedExtension(String),
}

impl Config {
    /// Parse a config file body, choosing the syntax from the file extension.
    pub fn parse(path: &Path, src: &str) -> Result<Self, Error> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml" | "yml") => Ok(serde_yaml::from_str(src)?),
            Some("toml") => Ok(toml::from_str(src)?),
            other => Err(Error::UnsupportedExtension(
                other.unwrap_or_default().to_owned(),
            )),
        }
    }
}
