use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::{CodecError, Configuration};

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("failed to access configuration fixture: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to decode configuration fixture: {0}")]
    Codec(#[from] CodecError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum FixtureOutcome {
    /// The fixture did not exist and was written from the default.
    Created(Configuration),
    Loaded(Configuration),
}

impl FixtureOutcome {
    pub fn configuration(&self) -> &Configuration {
        match self {
            FixtureOutcome::Created(config) | FixtureOutcome::Loaded(config) => config,
        }
    }

    pub fn into_configuration(self) -> Configuration {
        match self {
            FixtureOutcome::Created(config) | FixtureOutcome::Loaded(config) => config,
        }
    }

    pub fn was_created(&self) -> bool {
        matches!(self, FixtureOutcome::Created(_))
    }
}

/// Reads a stored configuration, seeding it from `default` when absent.
///
/// Only a missing file falls back to the default. A fixture that exists but
/// does not decode is an error.
pub fn load_or_init(path: &Path, default: &Configuration) -> Result<FixtureOutcome, FixtureError> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(FixtureOutcome::Loaded(Configuration::from_text(&text)?)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            log::debug!("creating configuration fixture {}", path.display());
            fs::write(path, default.to_text())?;
            Ok(FixtureOutcome::Created(default.clone()))
        }
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn absent_fixture_is_seeded_then_reloaded() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("filters/blur.cfg");
        let default = Configuration::new().with("halfWidth", 5).with("halfHeight", 5);

        let first = load_or_init(&path, &default).unwrap();
        assert!(first.was_created());
        assert!(path.exists());

        let tweaked = Configuration::new().with("halfWidth", 9);
        let second = load_or_init(&path, &tweaked).unwrap();
        assert_eq!(second, FixtureOutcome::Loaded(default));
    }

    #[test]
    fn corrupt_fixture_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("blur.cfg");
        fs::write(&path, "<params/>").unwrap();
        let err = load_or_init(&path, &Configuration::new()).unwrap_err();
        assert!(matches!(err, FixtureError::Codec(CodecError::Malformed(_))));
    }
}
