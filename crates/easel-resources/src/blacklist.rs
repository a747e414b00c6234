use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlacklistError {
    #[error("failed to read blacklist: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse blacklist: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct BlacklistData {
    urls: BTreeSet<String>,
}

/// Urls or file names the loading pipeline must not load.
#[derive(Debug)]
pub struct Blacklist {
    path: Option<PathBuf>,
    data: Mutex<BlacklistData>,
}

impl Blacklist {
    /// Opens the blacklist stored at `path`. A missing file is an empty list.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, BlacklistError> {
        let path = path.into();
        let data = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            serde_json::from_str(&raw)?
        } else {
            BlacklistData::default()
        };
        Ok(Self {
            path: Some(path),
            data: Mutex::new(data),
        })
    }

    /// A blacklist that is never written to disk.
    pub fn in_memory<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: None,
            data: Mutex::new(BlacklistData {
                urls: urls.into_iter().map(Into::into).collect(),
            }),
        }
    }

    pub fn default_path() -> Result<PathBuf, BlacklistError> {
        let mut config_dir = dirs::config_dir().ok_or_else(|| {
            BlacklistError::Read(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no config directory",
            ))
        })?;
        config_dir.push("EaselStudio");
        fs::create_dir_all(&config_dir)?;
        config_dir.push("blacklist.json");
        Ok(config_dir)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Matches either the full url or its final path segment.
    pub fn contains(&self, url: &str) -> bool {
        let data = self.data.lock();
        if data.urls.contains(url) {
            return true;
        }
        let file_name = url.rsplit('/').next().unwrap_or(url);
        data.urls.contains(file_name)
    }

    pub fn insert(&self, url: impl Into<String>) -> Result<bool, BlacklistError> {
        let mut data = self.data.lock();
        let inserted = data.urls.insert(url.into());
        if inserted {
            self.persist_locked(&data)?;
        }
        Ok(inserted)
    }

    pub fn remove(&self, url: &str) -> Result<bool, BlacklistError> {
        let mut data = self.data.lock();
        let removed = data.urls.remove(url);
        if removed {
            self.persist_locked(&data)?;
        }
        Ok(removed)
    }

    pub fn urls(&self) -> Vec<String> {
        self.data.lock().urls.iter().cloned().collect()
    }

    fn persist_locked(&self, data: &BlacklistData) -> Result<(), BlacklistError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(data)?;
        fs::write(path, json)?;
        Ok(())
    }
}
