//! Mock engine configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Base URL of the TripPin RESTier service the tutorial app talks to.
pub const DEFAULT_BASE_URL: &str =
    "http://services.odata.org/TripPinRESTierService/(S(euc2jaq2ryeoswu4hs4unp33))/";

/// Where the mock engine intercepts requests and which fixtures it serves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MockConfig {
    /// Requests whose URL contains this prefix are intercepted
    pub base_url: String,
    /// Path to the `$metadata` XML document
    pub metadata_path: PathBuf,
    /// Path to the JSON document holding the `value` array of people
    pub people_path: PathBuf,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            metadata_path: PathBuf::from("localService/metadata.xml"),
            people_path: PathBuf::from("localService/mockdata/people.json"),
        }
    }
}

impl MockConfig {
    /// Build a config serving fixtures from `dir/metadata.xml` and `dir/people.json`.
    pub fn with_fixture_dir(base_url: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            base_url: base_url.into(),
            metadata_path: dir.join("metadata.xml"),
            people_path: dir.join("people.json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_default_points_at_trippin() {
        let config = MockConfig::default();
        assert!(config.base_url.starts_with("http://services.odata.org/TripPinRESTierService/"));
        assert!(config.people_path.ends_with("people.json"));
    }

    #[rstest]
    fn test_partial_config_keeps_defaults() {
        let config: MockConfig =
            serde_json::from_str(r#"{"metadataPath": "meta.xml"}"#).expect("Should deserialize");
        assert_eq!(config.metadata_path, PathBuf::from("meta.xml"));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[rstest]
    fn test_with_fixture_dir() {
        let config = MockConfig::with_fixture_dir("http://localhost/", "/tmp/fixtures");
        assert_eq!(config.metadata_path, PathBuf::from("/tmp/fixtures/metadata.xml"));
        assert_eq!(config.people_path, PathBuf::from("/tmp/fixtures/people.json"));
    }
}
