//! Implementation of `wharf list`.

use std::io::Write;
use std::path::Path;

use anyhow::Result;

use crate::core::MANIFEST_FILE_NAME;
use crate::ops::{count_phrase, load_root_manifest, require_java};
use crate::resolver::DependencyTreePrinter;
use crate::store::StoreConfig;

/// Render the transitive dependency tree declared by a project's manifest.
///
/// Read-only: the manifest, the store, and the IDE files are never written.
pub fn list(config: &StoreConfig, project_dir: &Path, out: &mut dyn Write) -> Result<()> {
    writeln!(out, "Getting dependencies for {}...", project_dir.display())?;

    let manifest_path = project_dir.join(MANIFEST_FILE_NAME);
    let manifest = load_root_manifest(&manifest_path)?;
    require_java(&manifest, &manifest_path)?;

    let dependencies = manifest.dependencies();
    if dependencies.is_empty() {
        writeln!(out, "No dependencies found in {}.", manifest_path.display())?;
        return Ok(());
    }

    let store = config.resolve()?;

    writeln!(out, "Found {}:", count_phrase(dependencies.len()))?;
    let printer = DependencyTreePrinter::new(&store);
    let mut lines = Vec::new();
    for dependency in dependencies {
        printer.render(dependency, &mut lines);
    }
    for line in lines {
        writeln!(out, "{line}")?;
    }

    Ok(())
}
