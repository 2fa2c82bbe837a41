//! `project.json` manifest parsing and schema.
//!
//! The manifest is the per-project metadata document: identity triple plus a
//! `java` section holding the ordered direct-dependency list. Everything the
//! tool does not understand is carried through a rewrite untouched, so a
//! manifest only ever changes in the field the tool actually edits.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::core::signature::ProjectSignature;

/// Conventional manifest file name.
pub const MANIFEST_FILE_NAME: &str = "project.json";

/// Error loading a manifest file.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("no manifest found at {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read manifest {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse manifest {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// The parsed `project.json` manifest.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProjectManifest {
    /// Publisher the project is published under
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,

    /// Project name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,

    /// Project's own version token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Java-specific section; absent for non-Java projects
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub java: Option<JavaSection>,

    /// Fields the tool does not interpret, preserved verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The `java` section of a manifest.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JavaSection {
    /// Ordered direct dependencies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<Vec<ProjectSignature>>,

    /// Fields the tool does not interpret, preserved verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProjectManifest {
    /// Load a manifest from a file.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ManifestError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ManifestError::Io {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;

        serde_json::from_str(&contents).map_err(|e| ManifestError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Serialize to the pretty JSON form used for rewrites.
    pub fn to_json_string(&self) -> String {
        // A struct of plain fields and maps cannot fail to serialize.
        serde_json::to_string_pretty(self).expect("manifest serialization")
    }

    /// The declared direct dependencies, empty when the list (or the whole
    /// java section) is absent.
    pub fn dependencies(&self) -> &[ProjectSignature] {
        self.java
            .as_ref()
            .and_then(|java| java.dependencies.as_deref())
            .unwrap_or(&[])
    }

    /// Replace the dependency list wholesale.
    ///
    /// Creates the `java` section if the manifest lacks one.
    pub fn set_dependencies(&mut self, dependencies: Vec<ProjectSignature>) {
        self.java
            .get_or_insert_with(JavaSection::default)
            .dependencies = Some(dependencies);
    }
}
