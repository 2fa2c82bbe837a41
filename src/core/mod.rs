//! Core data structures for wharf.
//!
//! This module contains the foundational types used throughout the tool:
//! - Project signatures (publisher/project@version identity)
//! - Version token ordering
//! - The `project.json` manifest codec

pub mod manifest;
pub mod signature;
pub mod version;

pub use manifest::{JavaSection, ManifestError, ProjectManifest, MANIFEST_FILE_NAME};
pub use signature::ProjectSignature;
