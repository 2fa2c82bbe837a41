//! IntelliJ project-file reconciliation.
//!
//! Generated IDE files are the one thing the tool mutates besides the
//! manifest: `*.iml` module descriptors carry the library classpath, and
//! `.idea/workspace.xml` carries per-test run configurations. Both are
//! element-tree documents; the sync engines snapshot the relevant entry
//! list, rebuild it against the resolved dependency set, and leave every
//! unrelated element untouched.

pub mod module;
pub mod module_sync;
pub mod workspace;
pub mod workspace_sync;

use std::path::PathBuf;

use thiserror::Error;

pub use module::{IntellijModule, ModuleLibrary};
pub use module_sync::ModuleSyncEngine;
pub use workspace::{IntellijWorkspace, RunConfigurationSettings};
pub use workspace_sync::WorkspaceSyncEngine;

/// Error reading a descriptor document.
///
/// Both variants are recoverable at the per-file scope: the file is
/// reported and left untouched, and the run continues.
#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("failed to read descriptor {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid descriptor {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: xmltree::ParseError,
    },
}
