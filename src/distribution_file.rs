//! # Distribution Manifest
//!
//! Parsing, serialization and update operations for the distribution
//! manifest (`distribution.yaml` shape). Each repository entry nests a `doc`
//! and a `source` sub-record, both carrying a version reference for the same
//! repository:
//!
//! ```yaml
//! repositories:
//!   rclcpp:
//!     doc:
//!       type: git
//!       url: https://github.com/ros2/rclcpp.git
//!       version: master
//!     source:
//!       type: git
//!       url: https://github.com/ros2/rclcpp.git
//!       version: master
//! type: distribution
//! version: 2
//! ```
//!
//! The schema is owned externally, so every field this module does not model
//! is preserved verbatim through `#[serde(flatten)]` maps, at the document
//! level, the entry level and the sub-record level.
//!
//! [`set_version`] is the one mutation: it updates `doc.version` and
//! `source.version` together as a single logical update and returns a new
//! document, leaving the input untouched. An entry missing one of the two
//! sub-records is malformed input (a schema error), which is distinct from
//! the entry being absent altogether (`RepoNotFound`).

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A `doc` or `source` sub-record: a version plus whatever else the schema
/// carries (`type`, `url`, ...), preserved as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionedSection {
    pub version: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// One repository entry in the distribution manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionRepo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<VersionedSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<VersionedSection>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// The distribution manifest, keyed by repository name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    pub repositories: BTreeMap<String, DistributionRepo>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// Load the distribution manifest from `path`.
pub fn load(path: &Path) -> Result<Distribution> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&contents)?)
}

/// Look up a repository entry by name. Absence is `None`, never an error.
pub fn get<'a>(distribution: &'a Distribution, name: &str) -> Option<&'a DistributionRepo> {
    distribution.repositories.get(name)
}

/// Set both `doc.version` and `source.version` for the named repository,
/// returning a new document.
///
/// Fails with [`Error::RepoNotFound`] if the repository is absent and with
/// [`Error::Schema`] if its entry lacks a `doc` or `source` sub-record. Every
/// other repository and field is structurally unchanged, and the input
/// document is never mutated.
pub fn set_version(distribution: &Distribution, name: &str, version: &str) -> Result<Distribution> {
    let entry = distribution
        .repositories
        .get(name)
        .ok_or_else(|| Error::RepoNotFound {
            repo: name.to_string(),
            manifest: "distribution file".to_string(),
        })?;

    let mut updated = entry.clone();
    match (updated.doc.as_mut(), updated.source.as_mut()) {
        (Some(doc), Some(source)) => {
            doc.version = version.to_string();
            source.version = version.to_string();
        }
        _ => {
            return Err(Error::Schema {
                message: format!(
                    "repository '{}' in the distribution file is missing its doc or source section",
                    name
                ),
            })
        }
    }

    let mut next = distribution.clone();
    next.repositories.insert(name.to_string(), updated);
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const DISTRIBUTION_YAML: &str = "\
repositories:
  rclcpp:
    doc:
      type: git
      url: https://github.com/ros2/rclcpp.git
      version: master
    source:
      type: git
      url: https://github.com/ros2/rclcpp.git
      version: master
  rclpy:
    doc:
      type: git
      url: https://github.com/ros2/rclpy.git
      version: master
    source:
      type: git
      url: https://github.com/ros2/rclpy.git
      version: master
release_platforms:
  ubuntu:
  - focal
type: distribution
version: 2
";

    fn load_distribution() -> Distribution {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(DISTRIBUTION_YAML.as_bytes()).unwrap();
        load(file.path()).unwrap()
    }

    #[test]
    fn test_load_preserves_unknown_fields() {
        let dist = load_distribution();
        assert!(dist.extra.contains_key("release_platforms"));
        assert!(dist.extra.contains_key("type"));
        let emitted = serde_yaml::to_string(&dist).unwrap();
        assert!(emitted.contains("release_platforms"));
        assert!(emitted.contains("focal"));
    }

    #[test]
    fn test_get_repo_if_it_exists() {
        let dist = load_distribution();
        let rclcpp = get(&dist, "rclcpp").unwrap();
        assert_eq!(rclcpp.doc.as_ref().unwrap().version, "master");
        assert_eq!(rclcpp.source.as_ref().unwrap().version, "master");
        assert!(get(&dist, "not-a-repo").is_none());
    }

    #[test]
    fn test_set_version_updates_doc_and_source_atomically() {
        let dist = load_distribution();
        let new_dist = set_version(&dist, "rclcpp", "ultra-ros").unwrap();

        // Old document untouched
        let old = get(&dist, "rclcpp").unwrap();
        assert_eq!(old.doc.as_ref().unwrap().version, "master");
        assert_eq!(old.source.as_ref().unwrap().version, "master");

        // Both sub-records updated in the new document
        let new = get(&new_dist, "rclcpp").unwrap();
        assert_eq!(new.doc.as_ref().unwrap().version, "ultra-ros");
        assert_eq!(new.source.as_ref().unwrap().version, "ultra-ros");

        // No other repository differs
        assert_eq!(get(&new_dist, "rclpy"), get(&dist, "rclpy"));
        // Sub-record fields other than version are preserved
        assert_eq!(
            new.doc.as_ref().unwrap().extra,
            old.doc.as_ref().unwrap().extra
        );
    }

    #[test]
    fn test_set_version_unknown_repo_fails() {
        let dist = load_distribution();
        let err = set_version(&dist, "not-a-repo", "humble").unwrap_err();
        assert!(matches!(err, Error::RepoNotFound { .. }));
    }

    #[test]
    fn test_set_version_missing_section_is_schema_error() {
        let yaml = "\
repositories:
  broken:
    doc:
      version: master
";
        let dist: Distribution = serde_yaml::from_str(yaml).unwrap();
        // Malformed is distinguishable from absent: the lookup still works.
        assert!(get(&dist, "broken").is_some());
        let err = set_version(&dist, "broken", "humble").unwrap_err();
        assert!(matches!(err, Error::Schema { .. }));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = load(Path::new("/nonexistent/distribution.yaml")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
