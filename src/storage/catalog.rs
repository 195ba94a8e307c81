//! Catalog documents: the on-disk form of a [`Registry`].
//!
//! A catalog is an ordered list of categories, each with an ordered list of
//! test cases. Documents may be YAML, TOML or JSON and carry a `_version`
//! tag:
//!
//! ```yaml
//! _version: "1"
//! categories:
//!   - key: protection
//!     name: Protection Tests
//!     tests:
//!       - id: PR-001
//!         name: DC Over-Voltage Protection
//!         requirements: REQ_0301
//!         priority: Critical
//!         duration: 2h
//!         criteria: Trip @ 1050V, response < 10ms
//! ```
//!
//! `requirements` takes a single identifier or a list. A missing `status`
//! loads as `pending`.

use std::{
    fs,
    path::{Path, PathBuf},
};

use nonempty::NonEmpty;
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use crate::domain::{
    Category, CategoryKey, ConfigError, Registry, Requirement, Status, TestCase, TestId,
};

/// Errors that can occur when loading a catalog.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error("failed to read catalog {path}: {source}")]
    Io {
        /// The catalog path.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },
    /// The file extension names no supported format.
    #[error("unsupported catalog format '{0}' (expected .yaml, .yml, .toml or .json)")]
    UnsupportedFormat(PathBuf),
    /// The document is not valid YAML for a catalog.
    #[error("failed to parse YAML catalog: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// The document is not valid TOML for a catalog.
    #[error("failed to parse TOML catalog: {0}")]
    Toml(#[from] toml::de::Error),
    /// The document is not valid JSON for a catalog.
    #[error("failed to parse JSON catalog: {0}")]
    Json(#[from] serde_json::Error),
    /// The document parsed but its content is inconsistent.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Supported catalog encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// YAML document.
    Yaml,
    /// TOML document.
    Toml,
    /// JSON document.
    Json,
}

impl Format {
    /// Infers the format from a file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Some(Self::Yaml),
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Loads and validates a catalog file.
///
/// # Errors
///
/// Returns a [`LoadError`] if the file cannot be read or parsed, or if its
/// content breaks a registry invariant.
#[instrument(level = "debug")]
pub fn load(path: &Path) -> Result<Registry, LoadError> {
    let format =
        Format::from_path(path).ok_or_else(|| LoadError::UnsupportedFormat(path.to_path_buf()))?;
    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let registry = parse(&content, format)?;
    tracing::info!(
        categories = registry.len(),
        tests = registry.count_total(),
        "loaded catalog"
    );
    Ok(registry)
}

/// Parses and validates a catalog document.
///
/// # Errors
///
/// Returns a [`LoadError`] if the document cannot be parsed or breaks a
/// registry invariant.
pub fn parse(content: &str, format: Format) -> Result<Registry, LoadError> {
    let versions: Versions = match format {
        Format::Yaml => serde_yaml::from_str(content)?,
        Format::Toml => toml::from_str(content)?,
        Format::Json => serde_json::from_str(content)?,
    };
    Ok(versions.try_into()?)
}

/// The serialized versions of the catalog.
#[derive(Debug, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default)]
        categories: Vec<CategoryV1>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CategoryV1 {
    key: String,
    name: String,
    #[serde(default)]
    tests: Vec<TestCaseV1>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TestCaseV1 {
    id: String,
    name: String,
    requirements: OneOrMany,
    priority: String,
    #[serde(default)]
    duration: String,
    status: Option<String>,
    #[serde(default)]
    criteria: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl From<OneOrMany> for Vec<String> {
    fn from(value: OneOrMany) -> Self {
        match value {
            OneOrMany::One(one) => vec![one],
            OneOrMany::Many(many) => many,
        }
    }
}

impl TryFrom<Versions> for Registry {
    type Error = ConfigError;

    fn try_from(versions: Versions) -> Result<Self, Self::Error> {
        match versions {
            Versions::V1 { categories } => {
                let categories = categories
                    .into_iter()
                    .map(CategoryV1::into_domain)
                    .collect::<Result<Vec<_>, _>>()?;
                Self::new(categories)
            }
        }
    }
}

impl CategoryV1 {
    fn into_domain(self) -> Result<(CategoryKey, Category), ConfigError> {
        let key = CategoryKey::new(self.key)?;
        let tests = self
            .tests
            .into_iter()
            .map(TestCaseV1::into_domain)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((key, Category::new(self.name, tests)))
    }
}

impl TestCaseV1 {
    fn into_domain(self) -> Result<TestCase, ConfigError> {
        let id = TestId::new(self.id)?;

        let priority = self
            .priority
            .parse()
            .map_err(|_| ConfigError::UnknownPriority {
                id: id.to_string(),
                value: self.priority.clone(),
            })?;

        // Missing status means the test has not been run yet.
        let status = match self.status {
            None => Status::Pending,
            Some(raw) => raw.parse().map_err(|_| ConfigError::UnknownStatus {
                id: id.to_string(),
                value: raw.clone(),
            })?,
        };

        let requirements = Vec::<String>::from(self.requirements)
            .into_iter()
            .map(Requirement::new)
            .collect::<Result<Vec<_>, _>>()?;
        let requirements = NonEmpty::from_vec(requirements)
            .ok_or_else(|| ConfigError::NoRequirements(id.to_string()))?;

        Ok(TestCase::new(
            id,
            self.name,
            requirements,
            priority,
            self.duration,
            status,
            self.criteria,
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::domain::Priority;

    const YAML: &str = r#"
_version: "1"
categories:
  - key: functional
    name: Functional Tests
    tests:
      - id: FT-001
        name: Bidirectional Power Flow
        requirements: [REQ_0003A, REQ_0003B]
        priority: Critical
        duration: 4h
        criteria: P_out >= 120 kW
      - id: FT-002
        name: DC Voltage Range Operation
        requirements: REQ_0101
        priority: High
        duration: 2h
        status: pass
        criteria: Stable operation 700-1000 VDC
  - key: emc
    name: EMC Tests
    tests:
      - id: EMC-001
        name: Conducted Emissions
        requirements: REQ_0551
        priority: high
"#;

    fn yaml_with_test(test: &str) -> String {
        format!(
            "_version: \"1\"\ncategories:\n  - key: a\n    name: A\n    tests:\n      - {test}\n"
        )
    }

    #[test]
    fn parses_yaml_in_order() {
        let registry = parse(YAML, Format::Yaml).unwrap();

        let keys: Vec<_> = registry.keys().map(CategoryKey::as_str).collect();
        assert_eq!(keys, ["functional", "emc"]);
        let ids: Vec<_> = registry.tests().map(|t| t.id().as_str()).collect();
        assert_eq!(ids, ["FT-001", "FT-002", "EMC-001"]);

        let first = registry.test("FT-001").unwrap();
        assert_eq!(first.requirements().iter().count(), 2);
        assert_eq!(first.status(), Status::Pending);
        assert_eq!(registry.test("FT-002").unwrap().status(), Status::Pass);
        assert_eq!(registry.test("EMC-001").unwrap().priority(), Priority::High);
    }

    #[test]
    fn parses_toml() {
        let toml = r#"
_version = "1"

[[categories]]
key = "grid"
name = "Grid Compliance Tests"

[[categories.tests]]
id = "GC-001"
name = "IEEE 1547 LVRT"
requirements = "IEEE 1547"
priority = "Critical"
duration = "4h"
criteria = "Per Category II curve"
"#;
        let registry = parse(toml, Format::Toml).unwrap();
        assert_eq!(registry.count_by_priority(Priority::Critical), 1);
    }

    #[test]
    fn parses_json() {
        let json = r#"{"_version": "1", "categories": [{"key": "c", "name": "C", "tests": [
            {"id": "C-1", "name": "one", "requirements": ["R1"], "priority": "Low"}
        ]}]}"#;
        let registry = parse(json, Format::Json).unwrap();
        assert_eq!(registry.count_total(), 1);
    }

    #[test]
    fn unknown_priority_is_a_config_error() {
        let yaml = yaml_with_test("{id: T-1, name: t, requirements: R, priority: Urgent}");
        let error = parse(&yaml, Format::Yaml).unwrap_err();
        assert!(matches!(
            error,
            LoadError::Config(ConfigError::UnknownPriority { ref id, ref value })
                if id == "T-1" && value == "Urgent"
        ));
    }

    #[test]
    fn unknown_status_is_a_config_error() {
        let yaml =
            yaml_with_test("{id: T-1, name: t, requirements: R, priority: Low, status: skipped}");
        let error = parse(&yaml, Format::Yaml).unwrap_err();
        assert!(matches!(
            error,
            LoadError::Config(ConfigError::UnknownStatus { .. })
        ));
    }

    #[test]
    fn empty_requirement_list_is_a_config_error() {
        let yaml = yaml_with_test("{id: T-1, name: t, requirements: [], priority: Low}");
        let error = parse(&yaml, Format::Yaml).unwrap_err();
        assert!(matches!(
            error,
            LoadError::Config(ConfigError::NoRequirements(ref id)) if id == "T-1"
        ));
    }

    #[test]
    fn duplicate_ids_are_a_config_error() {
        let yaml = "_version: \"1\"\ncategories:\n  - key: a\n    name: A\n    tests:\n      - {id: T-1, name: t, requirements: R, priority: Low}\n  - key: b\n    name: B\n    tests:\n      - {id: T-1, name: u, requirements: R, priority: Low}\n";
        let error = parse(yaml, Format::Yaml).unwrap_err();
        assert!(matches!(
            error,
            LoadError::Config(ConfigError::DuplicateTestId(_))
        ));
    }

    #[test]
    fn unknown_version_is_rejected() {
        let error = parse("_version: \"9\"\ncategories: []\n", Format::Yaml).unwrap_err();
        assert!(matches!(error, LoadError::Yaml(_)));
    }

    #[test]
    fn empty_catalog_is_empty_registry() {
        let registry = parse("_version: \"1\"\n", Format::Yaml).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn load_picks_format_from_extension() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(YAML.as_bytes()).unwrap();

        let registry = load(file.path()).unwrap();
        assert_eq!(registry.count_total(), 3);
    }

    #[test]
    fn load_rejects_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        assert!(matches!(
            load(file.path()),
            Err(LoadError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn load_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(matches!(
            load(&tmp.path().join("missing.yaml")),
            Err(LoadError::Io { .. })
        ));
    }
}
