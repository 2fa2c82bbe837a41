//! Test fixtures for wharf unit tests.
//!
//! This module is only compiled for tests. It builds throwaway package
//! stores and project directories on disk so resolver and sync tests can run
//! against the real filesystem code paths.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::core::signature::ProjectSignature;
use crate::store::PackageStore;

/// A temporary package store populated by tests.
pub struct StoreFixture {
    dir: TempDir,
}

impl StoreFixture {
    pub fn new() -> Self {
        StoreFixture {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn store(&self) -> PackageStore {
        PackageStore::new(self.dir.path())
    }

    /// Publish a version with the given direct dependencies, canonical layout.
    pub fn publish(&self, sig: &ProjectSignature, deps: &[ProjectSignature]) {
        self.publish_in(self.version_dir(sig), sig, Some(deps));
    }

    /// Publish a version whose manifest has no `java` section.
    pub fn publish_without_java(&self, sig: &ProjectSignature) {
        self.publish_in(self.version_dir(sig), sig, None);
    }

    /// Publish a version under the legacy `versions/` layout.
    pub fn publish_legacy(&self, sig: &ProjectSignature, deps: &[ProjectSignature]) {
        let dir = self
            .dir
            .path()
            .join(&sig.publisher)
            .join(&sig.project)
            .join("versions")
            .join(&sig.version);
        self.publish_in(dir, sig, Some(deps));
    }

    fn version_dir(&self, sig: &ProjectSignature) -> PathBuf {
        self.dir
            .path()
            .join(&sig.publisher)
            .join(&sig.project)
            .join(&sig.version)
    }

    fn publish_in(&self, dir: PathBuf, sig: &ProjectSignature, deps: Option<&[ProjectSignature]>) {
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("project.json"), manifest_json(sig, deps)).unwrap();
    }
}

/// Render a minimal `project.json` document.
pub fn manifest_json(sig: &ProjectSignature, deps: Option<&[ProjectSignature]>) -> String {
    let mut doc = serde_json::json!({
        "publisher": sig.publisher,
        "project": sig.project,
        "version": sig.version,
    });
    if let Some(deps) = deps {
        doc["java"] = serde_json::json!({ "dependencies": deps });
    }
    serde_json::to_string_pretty(&doc).unwrap()
}

/// A temporary project directory with a root manifest.
pub struct ProjectFixture {
    dir: TempDir,
}

impl ProjectFixture {
    /// Create a project declaring the given direct dependencies.
    pub fn new(project: &str, deps: &[ProjectSignature]) -> Self {
        let fixture = ProjectFixture {
            dir: TempDir::new().unwrap(),
        };
        let manifest = manifest_json(
            &ProjectSignature::new("me", project, "1"),
            Some(deps),
        );
        std::fs::write(fixture.dir.path().join("project.json"), manifest).unwrap();
        fixture
    }

    /// Create a project directory with arbitrary manifest contents.
    pub fn with_manifest(contents: &str) -> Self {
        let fixture = ProjectFixture {
            dir: TempDir::new().unwrap(),
        };
        std::fs::write(fixture.dir.path().join("project.json"), contents).unwrap();
        fixture
    }

    /// Create a project directory with no manifest.
    pub fn bare() -> Self {
        ProjectFixture {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file relative to the project root, creating parents.
    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, contents).unwrap();
        path
    }

    pub fn read(&self, relative: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(relative)).unwrap()
    }
}
