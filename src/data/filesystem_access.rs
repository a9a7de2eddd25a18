//! Represents various directories on the system, including Home, Cache, Config, and current directory.

use std::path::PathBuf;

pub(crate) const APP_DIR: &str = "bayam";

#[derive(Debug)]
pub enum FsAccess {
    Home,
    Cache,
    Config,
    Current,
}

impl FsAccess {
    /// Retrieves the base path for the specified directory type, optionally appending the `bayam` subdirectory.
    ///
    /// # Arguments
    /// * `raw` - If `true`, returns the base path without adding the `bayam` subdirectory.
    fn get_path(&self, raw: bool) -> anyhow::Result<PathBuf> {
        let base_path = match self {
            FsAccess::Home => dirs::home_dir(),
            FsAccess::Cache => dirs::cache_dir(),
            FsAccess::Config => dirs::config_dir(),
            FsAccess::Current => std::env::current_dir().ok(),
        };

        let mut path = base_path.ok_or_else(|| {
            anyhow::anyhow!("Unsupported operating system. Supported OS: Linux, MacOS, Windows.")
        })?;

        if !raw {
            if let FsAccess::Home = self {
                path.push(format!(".{APP_DIR}"));
            } else {
                path.push(APP_DIR);
            }
        }
        Ok(path)
    }

    /// Returns the raw path for the directory without adding the `bayam` subdirectory.
    pub fn raw_path(&self) -> anyhow::Result<PathBuf> {
        self.get_path(true)
    }

    /// Path of `file` inside the `bayam` directory, e.g. `~/.config/bayam/models.json`.
    ///
    /// Nothing is created on disk.
    pub fn file(&self, file: &str) -> anyhow::Result<PathBuf> {
        let mut path = self.get_path(false)?;
        path.push(file);
        Ok(path)
    }
}
