//! The wharf package store.
//!
//! A store is a local directory tree indexed by publisher/project/version,
//! holding a manifest and the build artifacts for every published version.
//! The tool only ever reads from it.
//!
//! Two on-disk layouts exist for version directories:
//! - canonical: `<root>/<publisher>/<project>/<version>/`
//! - legacy:    `<root>/<publisher>/<project>/versions/<version>/`
//!
//! Lookups accept both; synthesized paths always use the canonical layout.

use std::path::{Component, Path, PathBuf};

use thiserror::Error;

use crate::core::manifest::{ManifestError, ProjectManifest, MANIFEST_FILE_NAME};
use crate::core::signature::ProjectSignature;
use crate::core::version::select_latest;

/// Environment variable naming the store root.
pub const STORE_HOME_VAR: &str = "WHARF_HOME";

/// Name of the legacy per-project version subdirectory.
const LEGACY_VERSIONS_DIR: &str = "versions";

/// Error resolving the store root from the environment.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreRootError {
    #[error("the {STORE_HOME_VAR} environment variable is not set")]
    NotSet,

    #[error("the {STORE_HOME_VAR} environment variable is not an absolute path: {path}")]
    NotAbsolute { path: String },
}

/// The raw store-root setting, captured before validation.
///
/// Operations validate lazily: the manifest-level failures come first in
/// their console contract, so the command layer captures the environment
/// here and the operation resolves it only once it actually needs the
/// store. This is also the only place the tool touches the environment;
/// everything downstream takes the store as an explicit parameter.
#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    raw: Option<String>,
}

impl StoreConfig {
    /// Capture the store root from `WHARF_HOME`.
    pub fn from_env() -> Self {
        StoreConfig {
            raw: std::env::var(STORE_HOME_VAR)
                .ok()
                .filter(|value| !value.is_empty()),
        }
    }

    /// Use an explicit store root instead of the environment.
    pub fn explicit(root: impl Into<String>) -> Self {
        StoreConfig {
            raw: Some(root.into()),
        }
    }

    /// Validate the captured setting: present, non-empty, absolute.
    pub fn resolve(&self) -> Result<PackageStore, StoreRootError> {
        let raw = self.raw.as_deref().ok_or(StoreRootError::NotSet)?;

        let root = PathBuf::from(raw);
        if !root.is_absolute() {
            return Err(StoreRootError::NotAbsolute {
                path: raw.to_string(),
            });
        }

        Ok(PackageStore::new(root))
    }
}

/// Read-only accessor over the store's directory layout.
#[derive(Debug, Clone)]
pub struct PackageStore {
    root: PathBuf,
}

impl PackageStore {
    /// Create a store over an already-validated root directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        PackageStore { root: root.into() }
    }

    /// The store root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether a path points inside the store.
    pub fn contains(&self, path: &Path) -> bool {
        path.starts_with(&self.root)
    }

    /// Directory holding every version of a (publisher, project) pair.
    pub fn project_dir(&self, publisher: &str, project: &str) -> PathBuf {
        self.root.join(publisher).join(project)
    }

    /// Canonical directory for one published version.
    pub fn version_dir(&self, signature: &ProjectSignature) -> PathBuf {
        self.project_dir(&signature.publisher, &signature.project)
            .join(&signature.version)
    }

    fn legacy_version_dir(&self, signature: &ProjectSignature) -> PathBuf {
        self.project_dir(&signature.publisher, &signature.project)
            .join(LEGACY_VERSIONS_DIR)
            .join(&signature.version)
    }

    /// Canonical path of a version's compiled artifact.
    pub fn compiled_artifact_path(&self, signature: &ProjectSignature) -> PathBuf {
        self.version_dir(signature)
            .join(format!("{}.jar", signature.project))
    }

    /// Canonical path of a version's sources artifact.
    pub fn sources_artifact_path(&self, signature: &ProjectSignature) -> PathBuf {
        self.version_dir(signature)
            .join(format!("{}.sources.jar", signature.project))
    }

    /// Enumerate the version tokens published for a (publisher, project).
    ///
    /// When the legacy `versions/` subdirectory exists it is authoritative;
    /// otherwise every child directory of the project directory counts.
    /// Missing directories and unreadable entries yield an empty / shortened
    /// list, never an error.
    pub fn versions(&self, publisher: &str, project: &str) -> Vec<String> {
        let project_dir = self.project_dir(publisher, project);
        let legacy_dir = project_dir.join(LEGACY_VERSIONS_DIR);
        let enumerated = if legacy_dir.is_dir() {
            legacy_dir
        } else {
            project_dir
        };

        let entries = match std::fs::read_dir(&enumerated) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!(
                    "no versions under {}: {}",
                    enumerated.display(),
                    e
                );
                return Vec::new();
            }
        };

        let mut versions: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect();
        versions.sort();
        versions
    }

    /// The newest published version token, per the sibling ordering policy.
    pub fn latest_version(&self, publisher: &str, project: &str) -> Option<String> {
        let versions = self.versions(publisher, project);
        select_latest(versions.iter().map(String::as_str)).map(str::to_string)
    }

    /// Load the manifest for one published version.
    ///
    /// Tries the canonical layout first, then the legacy layout. Any failure
    /// (absent file, unreadable file, malformed JSON) is treated as "not
    /// published" and reported as `None`; dependency lookups never abort a
    /// traversal.
    pub fn load_manifest(&self, signature: &ProjectSignature) -> Option<ProjectManifest> {
        let candidates = [
            self.version_dir(signature).join(MANIFEST_FILE_NAME),
            self.legacy_version_dir(signature).join(MANIFEST_FILE_NAME),
        ];

        for path in &candidates {
            match ProjectManifest::load(path) {
                Ok(manifest) => return Some(manifest),
                Err(ManifestError::NotFound { .. }) => {}
                Err(e) => {
                    tracing::debug!("skipping unreadable manifest {}: {}", path.display(), e);
                }
            }
        }

        None
    }

    /// Decode a store-relative artifact path back into a signature.
    ///
    /// Accepts both the canonical `publisher/project/version/...` layout and
    /// the legacy `publisher/project/versions/version/...` layout. Returns
    /// `None` for paths outside the store or with too few segments.
    pub fn decode_artifact_path(&self, path: &Path) -> Option<ProjectSignature> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let mut segments = relative.components().filter_map(|c| match c {
            Component::Normal(s) => s.to_str(),
            _ => None,
        });

        let publisher = segments.next()?;
        let project = segments.next()?;
        let mut version = segments.next()?;
        if version == LEGACY_VERSIONS_DIR {
            version = segments.next()?;
        }

        Some(ProjectSignature::new(publisher, project, version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn publish(root: &Path, sig: &ProjectSignature, legacy: bool) {
        let dir = if legacy {
            root.join(&sig.publisher)
                .join(&sig.project)
                .join("versions")
                .join(&sig.version)
        } else {
            root.join(&sig.publisher)
                .join(&sig.project)
                .join(&sig.version)
        };
        std::fs::create_dir_all(&dir).unwrap();
        let manifest = format!(
            r#"{{ "publisher": "{}", "project": "{}", "version": "{}", "java": {{}} }}"#,
            sig.publisher, sig.project, sig.version
        );
        std::fs::write(dir.join("project.json"), manifest).unwrap();
    }

    #[test]
    fn test_store_config_resolve() {
        assert_eq!(
            StoreConfig::default().resolve().unwrap_err(),
            StoreRootError::NotSet
        );
        assert_eq!(
            StoreConfig::explicit("packages").resolve().unwrap_err(),
            StoreRootError::NotAbsolute {
                path: "packages".to_string()
            }
        );

        let store = StoreConfig::explicit("/depot").resolve().unwrap();
        assert_eq!(store.root(), Path::new("/depot"));
    }

    #[test]
    fn test_store_root_error_messages() {
        assert_eq!(
            StoreRootError::NotSet.to_string(),
            "the WHARF_HOME environment variable is not set"
        );
        assert_eq!(
            StoreRootError::NotAbsolute {
                path: "packages".to_string()
            }
            .to_string(),
            "the WHARF_HOME environment variable is not an absolute path: packages"
        );
    }

    #[test]
    fn test_versions_canonical_layout() {
        let tmp = TempDir::new().unwrap();
        let store = PackageStore::new(tmp.path());
        publish(tmp.path(), &ProjectSignature::new("a", "b", "1"), false);
        publish(tmp.path(), &ProjectSignature::new("a", "b", "2"), false);

        assert_eq!(store.versions("a", "b"), ["1", "2"]);
        assert_eq!(store.latest_version("a", "b").as_deref(), Some("2"));
    }

    #[test]
    fn test_versions_legacy_layout() {
        let tmp = TempDir::new().unwrap();
        let store = PackageStore::new(tmp.path());
        publish(tmp.path(), &ProjectSignature::new("a", "b", "9"), true);
        publish(tmp.path(), &ProjectSignature::new("a", "b", "10"), true);

        assert_eq!(store.versions("a", "b"), ["10", "9"]);
        // Numeric comparison: 10 beats 9.
        assert_eq!(store.latest_version("a", "b").as_deref(), Some("10"));
    }

    #[test]
    fn test_versions_missing_project() {
        let tmp = TempDir::new().unwrap();
        let store = PackageStore::new(tmp.path());

        assert!(store.versions("a", "b").is_empty());
        assert_eq!(store.latest_version("a", "b"), None);
    }

    #[test]
    fn test_load_manifest_both_layouts() {
        let tmp = TempDir::new().unwrap();
        let store = PackageStore::new(tmp.path());
        let canonical = ProjectSignature::new("a", "b", "1");
        let legacy = ProjectSignature::new("c", "d", "2");
        publish(tmp.path(), &canonical, false);
        publish(tmp.path(), &legacy, true);

        assert!(store.load_manifest(&canonical).is_some());
        assert!(store.load_manifest(&legacy).is_some());
        assert!(store
            .load_manifest(&ProjectSignature::new("x", "y", "1"))
            .is_none());
    }

    #[test]
    fn test_load_manifest_malformed_is_none() {
        let tmp = TempDir::new().unwrap();
        let store = PackageStore::new(tmp.path());
        let sig = ProjectSignature::new("a", "b", "1");
        let dir = store.version_dir(&sig);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("project.json"), "not json").unwrap();

        assert!(store.load_manifest(&sig).is_none());
    }

    #[test]
    fn test_artifact_paths() {
        let store = PackageStore::new("/depot");
        let sig = ProjectSignature::new("me", "proj", "3");

        assert_eq!(
            store.compiled_artifact_path(&sig),
            PathBuf::from("/depot/me/proj/3/proj.jar")
        );
        assert_eq!(
            store.sources_artifact_path(&sig),
            PathBuf::from("/depot/me/proj/3/proj.sources.jar")
        );
    }

    #[test]
    fn test_decode_artifact_path() {
        let store = PackageStore::new("/depot");

        assert_eq!(
            store.decode_artifact_path(Path::new("/depot/a/b/1/b.jar")),
            Some(ProjectSignature::new("a", "b", "1"))
        );
        assert_eq!(
            store.decode_artifact_path(Path::new("/depot/a/b/versions/2/b.jar")),
            Some(ProjectSignature::new("a", "b", "2"))
        );
        assert_eq!(store.decode_artifact_path(Path::new("/elsewhere/a/b/1/b.jar")), None);
        assert_eq!(store.decode_artifact_path(Path::new("/depot/a/b")), None);
    }
}
