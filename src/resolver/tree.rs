//! Dependency tree rendering for `wharf list`.

use crate::core::signature::ProjectSignature;
use crate::store::PackageStore;

/// Renders one dependency and its descendants as indented lines.
///
/// Rendering is a pure function of the store: an explicit depth parameter
/// drives indentation and output accumulates into a caller-owned line
/// buffer. Nothing here touches a shared output cursor.
pub struct DependencyTreePrinter<'a> {
    store: &'a PackageStore,
}

impl<'a> DependencyTreePrinter<'a> {
    pub fn new(store: &'a PackageStore) -> Self {
        DependencyTreePrinter { store }
    }

    /// Render a direct dependency (depth 1) and everything below it.
    pub fn render(&self, dependency: &ProjectSignature, lines: &mut Vec<String>) {
        let mut path = Vec::new();
        self.render_node(dependency, 1, &mut path, lines);
    }

    fn render_node(
        &self,
        dependency: &ProjectSignature,
        depth: usize,
        path: &mut Vec<ProjectSignature>,
        lines: &mut Vec<String>,
    ) {
        let indent = "  ".repeat(depth);

        // The store is externally writable, so a manifest cycle must not
        // recurse forever. Diamonds still print at every occurrence; only
        // re-entry along the current path stops descent.
        if path.iter().any(|seen| seen.same_project(dependency)) {
            lines.push(format!("{indent}{dependency}"));
            return;
        }

        match self.store.load_manifest(dependency) {
            None => {
                lines.push(format!("{indent}{dependency} - Not Found"));
            }
            Some(manifest) if manifest.java.is_none() => {
                lines.push(format!("{indent}{dependency} - No Java Property"));
            }
            Some(manifest) => {
                lines.push(format!("{indent}{dependency}"));
                path.push(dependency.clone());
                for child in manifest.dependencies() {
                    self.render_node(child, depth + 1, path, lines);
                }
                path.pop();
            }
        }
    }
}
