//! Project identification - WHO published WHAT at WHICH version.
//!
//! A `ProjectSignature` is the identity triple used everywhere a dependency
//! is named: in manifests, in store paths, and in IntelliJ library URLs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The identity triple of a published project: publisher, project, version.
///
/// Two signatures refer to the same dependency when publisher and project
/// match; full equality additionally requires a matching version token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectSignature {
    /// Publisher the project was published under
    pub publisher: String,

    /// Project name
    pub project: String,

    /// Version token (opaque; see `core::version` for ordering)
    pub version: String,
}

impl ProjectSignature {
    /// Create a new signature.
    pub fn new(
        publisher: impl Into<String>,
        project: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        ProjectSignature {
            publisher: publisher.into(),
            project: project.into(),
            version: version.into(),
        }
    }

    /// Whether `other` names the same dependency, ignoring the version.
    pub fn same_project(&self, other: &ProjectSignature) -> bool {
        self.publisher == other.publisher && self.project == other.project
    }

    /// Return a copy of this signature pointing at a different version.
    pub fn with_version(&self, version: impl Into<String>) -> Self {
        ProjectSignature {
            publisher: self.publisher.clone(),
            project: self.project.clone(),
            version: version.into(),
        }
    }
}

impl fmt::Display for ProjectSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@{}", self.publisher, self.project, self.version)
    }
}

/// Error parsing a `publisher/project@version` string.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid project signature `{input}`; expected publisher/project@version")]
pub struct ParseSignatureError {
    input: String,
}

impl FromStr for ProjectSignature {
    type Err = ParseSignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseSignatureError {
            input: s.to_string(),
        };

        let (publisher, rest) = s.split_once('/').ok_or_else(err)?;
        let (project, version) = rest.split_once('@').ok_or_else(err)?;

        if publisher.is_empty() || project.is_empty() || version.is_empty() {
            return Err(err());
        }

        Ok(ProjectSignature::new(publisher, project, version))
    }
}
