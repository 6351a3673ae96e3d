//! Persisted UI theme preference
//!
//! Process-wide state kept outside the prediction pipeline. Initialized once
//! from the theme file (or the default), mutated only through [`ThemeStore::toggle`].

use pkm2_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

/// On-disk format: `theme = "dark"`
#[derive(Debug, Serialize, Deserialize)]
struct ThemeFile {
    theme: Theme,
}

/// Shared theme preference backed by a small TOML file
#[derive(Clone)]
pub struct ThemeStore {
    path: PathBuf,
    current: Arc<RwLock<Theme>>,
}

impl ThemeStore {
    /// Load the persisted theme; a missing or unreadable file yields the default
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let theme = match read_theme(&path) {
            Ok(Some(theme)) => {
                info!("Theme '{:?}' loaded from {}", theme, path.display());
                theme
            }
            Ok(None) => Theme::default(),
            Err(e) => {
                warn!("Ignoring theme file {}: {}", path.display(), e);
                Theme::default()
            }
        };

        Self {
            path,
            current: Arc::new(RwLock::new(theme)),
        }
    }

    pub async fn current(&self) -> Theme {
        *self.current.read().await
    }

    /// Flip the theme and persist it.
    ///
    /// A failed write is logged; the in-memory value changes regardless.
    pub async fn toggle(&self) -> Theme {
        let mut current = self.current.write().await;
        *current = current.toggled();

        if let Err(e) = write_theme(&self.path, *current) {
            warn!("Theme write to {} failed: {}", self.path.display(), e);
        }
        *current
    }
}

fn read_theme(path: &Path) -> Result<Option<Theme>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)?;
    let file: ThemeFile =
        toml::from_str(&content).map_err(|e| Error::Config(format!("Parse theme failed: {}", e)))?;
    Ok(Some(file.theme))
}

/// Write via a temp file + rename
fn write_theme(path: &Path, theme: Theme) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string(&ThemeFile { theme })
        .map_err(|e| Error::Internal(format!("Serialize theme failed: {}", e)))?;

    let tmp_path = path.with_extension("toml.tmp");
    std::fs::write(&tmp_path, content)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_defaults_to_dark() {
        let dir = TempDir::new().unwrap();
        let store = ThemeStore::load(dir.path().join("theme.toml"));
        assert_eq!(store.current().await, Theme::Dark);
    }

    #[tokio::test]
    async fn test_toggle_persists_across_loads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("theme.toml");

        let store = ThemeStore::load(&path);
        assert_eq!(store.toggle().await, Theme::Light);
        assert!(path.exists());

        let reloaded = ThemeStore::load(&path);
        assert_eq!(reloaded.current().await, Theme::Light);

        assert_eq!(reloaded.toggle().await, Theme::Dark);
        assert_eq!(ThemeStore::load(&path).current().await, Theme::Dark);
    }

    #[tokio::test]
    async fn test_corrupt_file_falls_back_to_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("theme.toml");
        std::fs::write(&path, "theme = \"purple\"").unwrap();

        let store = ThemeStore::load(&path);
        assert_eq!(store.current().await, Theme::Dark);
    }

    #[test]
    fn test_theme_file_format() {
        let content = toml::to_string(&ThemeFile { theme: Theme::Light }).unwrap();
        assert_eq!(content.trim(), "theme = \"light\"");
    }
}
