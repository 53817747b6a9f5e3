//! Path resolution for local researchflow files

use std::path::PathBuf;

/// Environment variable that relocates the researchflow home directory
pub const HOME_ENV: &str = "RESEARCHFLOW_HOME";

/// Resolves standard paths for local state
#[derive(Debug, Clone)]
pub struct Paths {
    pub home: PathBuf,
}

impl Paths {
    /// Resolve the home directory from `RESEARCHFLOW_HOME` or `~/.researchflow`
    pub fn new() -> std::io::Result<Self> {
        if let Some(dir) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::at(PathBuf::from(dir)));
        }

        let home = dirs::home_dir().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "home directory not found")
        })?;

        Ok(Self::at(home.join(".researchflow")))
    }

    /// Use an explicit home directory
    pub fn at(home: PathBuf) -> Self {
        Self { home }
    }

    /// Key-value store file (the local equivalent of browser storage)
    pub fn store_file(&self) -> PathBuf {
        self.home.join("store.json")
    }

    /// User configuration file
    pub fn config_file(&self) -> PathBuf {
        self.home.join("config.json")
    }

    /// Default directory for formatted documents
    pub fn downloads_dir(&self) -> PathBuf {
        self.home.join("downloads")
    }
}
