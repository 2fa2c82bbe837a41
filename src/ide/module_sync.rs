//! Reconciles a module descriptor's libraries with resolved dependencies.

use std::path::PathBuf;

use crate::core::signature::ProjectSignature;
use crate::ide::module::{IntellijModule, ModuleLibrary};
use crate::resolver::ResolvedDependencySet;
use crate::store::PackageStore;

const JAR_URL_PREFIX: &str = "jar://";
const JAR_URL_SUFFIX: &str = "!/";

/// Rebuilds one module's library-reference list against a resolved set.
pub struct ModuleSyncEngine<'a> {
    store: &'a PackageStore,
}

impl<'a> ModuleSyncEngine<'a> {
    pub fn new(store: &'a PackageStore) -> Self {
        ModuleSyncEngine { store }
    }

    /// Reconcile `module` against the "still needed" `pool`.
    ///
    /// The pool starts as a clone of the resolved transitive closure and is
    /// drained as original references match it; whatever survives the pass
    /// is newly required. Returns the per-reference status lines, in
    /// processing order. The caller owns indentation and persistence.
    pub fn sync(
        &self,
        module: &mut IntellijModule,
        pool: &mut ResolvedDependencySet,
    ) -> Vec<String> {
        let originals = module.module_libraries();
        module.clear_module_libraries();

        let mut report = Vec::new();

        for library in originals {
            let Some(current) = self.classify(&library) else {
                // Foreign reference: preserved verbatim, no decision line.
                module.add_module_library(library);
                continue;
            };

            match pool.take_matching(&current) {
                None => {
                    report.push(format!("{current} - Removed"));
                }
                Some(resolved) if resolved.version == current.version => {
                    report.push(format!("{current} - No updates"));
                    module.add_module_library(library);
                }
                Some(resolved) => {
                    report.push(format!("{current} - Updated to {resolved}"));
                    module.add_module_library(self.synthesize(&resolved));
                }
            }
        }

        for added in pool.iter() {
            report.push(format!("{added} - Added"));
            module.add_module_library(self.synthesize(added));
        }

        report
    }

    /// Decode a store-managed reference, or `None` for a foreign one.
    ///
    /// Foreign means: no classes URL, a non-`jar://` scheme, a path outside
    /// the store root, or store-relative segments too short to name a
    /// version. Foreign references are never rewritten or dropped.
    fn classify(&self, library: &ModuleLibrary) -> Option<ProjectSignature> {
        let url = library.first_classes_url()?;
        let path = url.strip_prefix(JAR_URL_PREFIX)?;
        let path = path.strip_suffix(JAR_URL_SUFFIX).unwrap_or(path);
        let path = PathBuf::from(path);

        if !self.store.contains(&path) {
            return None;
        }

        self.store.decode_artifact_path(&path)
    }

    fn synthesize(&self, signature: &ProjectSignature) -> ModuleLibrary {
        let classes = format!(
            "{JAR_URL_PREFIX}{}{JAR_URL_SUFFIX}",
            self.store.compiled_artifact_path(signature).display()
        );
        let sources = format!(
            "{JAR_URL_PREFIX}{}{JAR_URL_SUFFIX}",
            self.store.sources_artifact_path(signature).display()
        );
        ModuleLibrary::from_artifact_urls(&classes, &sources)
    }
}
