//! High-level operations.
//!
//! This module contains the implementation of the wharf commands. Each
//! operation writes its user-facing report to a caller-supplied writer so
//! tests can capture console output verbatim; fatal conditions surface as
//! errors and become the process exit code at the binary layer.

pub mod list;
pub mod update;

use std::path::Path;

use anyhow::{bail, Result};

use crate::core::manifest::{ManifestError, ProjectManifest};

pub use list::list;
pub use update::{update, UpdateOptions};

/// `N dependency` / `N dependencies`.
pub(crate) fn count_phrase(count: usize) -> String {
    format!(
        "{} {}",
        count,
        if count == 1 { "dependency" } else { "dependencies" }
    )
}

/// Load the root manifest, mapping the recoverable-per-dependency failures
/// into the fatal messages they carry at root scope.
pub(crate) fn load_root_manifest(path: &Path) -> Result<ProjectManifest> {
    match ProjectManifest::load(path) {
        Ok(manifest) => Ok(manifest),
        Err(ManifestError::NotFound { .. }) => {
            bail!("no project.json file found at {}", path.display())
        }
        Err(e) => Err(e.into()),
    }
}

/// Fail with the root-scope message when the manifest lacks a java section.
pub(crate) fn require_java(manifest: &ProjectManifest, path: &Path) -> Result<()> {
    if manifest.java.is_none() {
        bail!("no \"java\" property found in {}", path.display());
    }
    Ok(())
}
