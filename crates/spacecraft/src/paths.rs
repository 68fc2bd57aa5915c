use std::env;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use appconfig::AppConfig;
use directories_next::ProjectDirs;

pub const ENV_CONFIG_DIR: &str = "SPACECRAFT_CONFIG_DIR";
pub const ENV_ASSET_DIR: &str = "SPACECRAFT_ASSET_DIR";

const QUALIFIER: &str = "org";
const ORGANISATION: &str = "Spacecraft";
const APPLICATION: &str = "Spacecraft";
const CONFIG_FILE: &str = "config.toml";

/// Where the effective configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Passed with `--config`.
    Explicit(PathBuf),
    /// Found in the config directory.
    Discovered(PathBuf),
    /// No file; built-in values.
    Defaults,
}

impl ConfigSource {
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(path) | Self::Discovered(path) => Some(path),
            Self::Defaults => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppPaths {
    config_dir: PathBuf,
    bundled_assets: PathBuf,
    asset_override: Option<PathBuf>,
}

impl AppPaths {
    pub fn discover() -> Result<Self> {
        let config_dir = match env_override(ENV_CONFIG_DIR) {
            Some(dir) => dir,
            None => ProjectDirs::from(QUALIFIER, ORGANISATION, APPLICATION)
                .map(|dirs| dirs.config_dir().to_path_buf())
                .ok_or_else(|| anyhow!("failed to determine user config directory"))?,
        };

        Ok(Self {
            config_dir,
            bundled_assets: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets"),
            asset_override: env_override(ENV_ASSET_DIR),
        })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    pub fn bundled_assets(&self) -> &Path {
        &self.bundled_assets
    }

    /// `--config` wins; otherwise the config directory's file if present.
    pub fn config_source(&self, explicit: Option<&Path>) -> ConfigSource {
        if let Some(path) = explicit {
            return ConfigSource::Explicit(path.to_path_buf());
        }
        let discovered = self.config_file();
        if discovered.is_file() {
            ConfigSource::Discovered(discovered)
        } else {
            ConfigSource::Defaults
        }
    }

    /// Environment override, then `assets.dir`, then the bundled assets.
    pub fn asset_dir(&self, config: &AppConfig) -> PathBuf {
        self.asset_override
            .clone()
            .or_else(|| config.assets.dir.clone())
            .unwrap_or_else(|| self.bundled_assets.clone())
    }
}

#[cfg(test)]
impl AppPaths {
    pub fn from_raw(
        config_dir: PathBuf,
        bundled_assets: PathBuf,
        asset_override: Option<PathBuf>,
    ) -> Self {
        Self {
            config_dir,
            bundled_assets,
            asset_override,
        }
    }
}

fn env_override(name: &str) -> Option<PathBuf> {
    match env::var_os(name) {
        Some(value) if !value.is_empty() => Some(PathBuf::from(value)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn explicit_config_wins() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "version = 1\n").unwrap();
        let paths = AppPaths::from_raw(dir.path().to_path_buf(), PathBuf::from("assets"), None);

        let explicit = Path::new("/elsewhere/custom.toml");
        assert_eq!(
            paths.config_source(Some(explicit)),
            ConfigSource::Explicit(explicit.to_path_buf())
        );
    }

    #[test]
    fn discovers_config_file_only_when_present() {
        let dir = tempfile::tempdir().unwrap();
        let paths = AppPaths::from_raw(dir.path().to_path_buf(), PathBuf::from("assets"), None);
        assert_eq!(paths.config_source(None), ConfigSource::Defaults);
        assert_eq!(paths.config_source(None).path(), None);

        fs::write(dir.path().join(CONFIG_FILE), "version = 1\n").unwrap();
        assert_eq!(
            paths.config_source(None),
            ConfigSource::Discovered(dir.path().join(CONFIG_FILE))
        );
    }

    #[test]
    fn asset_dir_precedence() {
        let mut config = AppConfig::default();
        let bundled = PathBuf::from("/bundled/assets");

        let paths = AppPaths::from_raw(PathBuf::from("/cfg"), bundled.clone(), None);
        assert_eq!(paths.asset_dir(&config), bundled);

        config.assets.dir = Some(PathBuf::from("/from/config"));
        assert_eq!(paths.asset_dir(&config), PathBuf::from("/from/config"));

        let paths = AppPaths::from_raw(
            PathBuf::from("/cfg"),
            bundled,
            Some(PathBuf::from("/from/env")),
        );
        assert_eq!(paths.asset_dir(&config), PathBuf::from("/from/env"));
    }
}
