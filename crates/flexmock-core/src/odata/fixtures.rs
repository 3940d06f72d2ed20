//! Fixture loading: the `$metadata` document and the people dataset.

use crate::config::MockConfig;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;
use thiserror::Error;

/// A single entry of the `People` entity set.
pub type Person = Map<String, Value>;

/// Fixture loading error. Fatal for start and reset.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("'{path}': resource not found")]
    NotFound {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("'{path}': invalid people document: {source}")]
    InvalidPeople {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Deserialize)]
struct PeopleDocument {
    value: Vec<Person>,
}

/// In-memory copy of the fixture files.
#[derive(Debug, Clone, PartialEq)]
pub struct Fixtures {
    pub metadata: String,
    pub people: Vec<Person>,
}

impl Fixtures {
    /// Read both fixture files synchronously.
    pub fn load(config: &MockConfig) -> Result<Self, FixtureError> {
        let metadata = read(&config.metadata_path)?;
        let people = read(&config.people_path)?;
        Self::from_sources(metadata, &people, &config.people_path)
    }

    /// Read both fixture files through the tokio filesystem API.
    pub async fn load_async(config: &MockConfig) -> Result<Self, FixtureError> {
        let metadata = read_async(&config.metadata_path).await?;
        let people = read_async(&config.people_path).await?;
        Self::from_sources(metadata, &people, &config.people_path)
    }

    fn from_sources(
        metadata: String,
        people_json: &str,
        people_path: &Path,
    ) -> Result<Self, FixtureError> {
        let document: PeopleDocument =
            serde_json::from_str(people_json).map_err(|source| FixtureError::InvalidPeople {
                path: people_path.display().to_string(),
                source,
            })?;
        tracing::debug!(
            "Loaded {} people and {} bytes of metadata",
            document.value.len(),
            metadata.len()
        );
        Ok(Self {
            metadata,
            people: document.value,
        })
    }
}

fn read(path: &Path) -> Result<String, FixtureError> {
    std::fs::read_to_string(path).map_err(|source| FixtureError::NotFound {
        path: path.display().to_string(),
        source,
    })
}

async fn read_async(path: &Path) -> Result<String, FixtureError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| FixtureError::NotFound {
            path: path.display().to_string(),
            source,
        })
}
