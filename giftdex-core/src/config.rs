use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable pointing at an alternative config file
pub const CONFIG_ENV_VAR: &str = "GIFTDEX_CONFIG";

/// Settings for where the documents live and how they are rendered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory or `http(s)://` base URL holding the two documents
    pub source: String,
    /// Name of the term dictionary document
    pub terms_file: String,
    /// Name of the item catalog document
    pub data_file: String,
    /// Icon used for each heart of a rating
    pub heart_icon: String,
    /// Width of inline term icons, in pixels
    pub icon_width: u32,
    /// Width of heart icons, in pixels
    pub heart_width: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: ".".to_string(),
            terms_file: "terms.json".to_string(),
            data_file: "data.json".to_string(),
            heart_icon: "images/misc/Heart.webp".to_string(),
            icon_width: crate::substitute::DEFAULT_ICON_WIDTH,
            heart_width: 16,
        }
    }
}

impl Config {
    /// Loads the config from the provided path
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))
    }

    /// Resolves the config to use.
    ///
    /// An explicit path must exist. Otherwise the default location is used
    /// when present, and built-in defaults when not.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let path = get_config_path()?;
        if path.exists() {
            log::debug!("Using config file {:?}", path);
            Self::load(&path)
        } else {
            log::debug!("No config file at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Save the config to the specified path
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = self.to_yaml()?;

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write config to {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Writes a default config file if none exists yet.
    /// Returns true if a file was written.
    pub fn create_default<P: AsRef<Path>>(path: P) -> Result<bool> {
        if path.as_ref().exists() {
            return Ok(false);
        }
        Self::default().save(path)?;
        Ok(true)
    }
}

/// Gets the path to the config file
pub fn get_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        return Ok(PathBuf::from(path));
    }

    // Default to ~/.giftdex.yaml
    let home_dir = dirs::home_dir().context("Failed to determine home directory")?;

    Ok(home_dir.join(".giftdex.yaml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_partial_config_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("giftdex.yaml");
        fs::write(&path, "source: https://example.org/dex\nicon_width: 24\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.source, "https://example.org/dex");
        assert_eq!(config.icon_width, 24);
        assert_eq!(config.terms_file, "terms.json");
        assert_eq!(config.heart_width, 16);
    }

    #[test]
    fn test_create_default_and_reload() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested").join("giftdex.yaml");

        assert!(Config::create_default(&path)?);
        assert!(!Config::create_default(&path)?);

        let loaded = Config::resolve(Some(&path))?;
        assert_eq!(loaded, Config::default());
        Ok(())
    }

    #[test]
    fn test_explicit_missing_path_is_an_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.yaml");
        assert!(Config::resolve(Some(&missing)).is_err());
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        fs::write(&path, "icon_width: [not a number]\n").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
