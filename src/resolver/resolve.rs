//! Dependency resolution against the package store.
//!
//! Two jobs live here: the per-dependency update decision (`check_update`)
//! and the flattened transitive closure (`transitive_closure`). Both treat
//! every per-dependency store failure as "not published" and keep going;
//! only the caller's own manifest I/O is allowed to abort an operation.

use crate::core::signature::ProjectSignature;
use crate::store::PackageStore;

/// Outcome of checking one declared dependency against the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateDecision {
    /// No versions published for (publisher, project)
    NotFound,

    /// The declared version token is already the newest
    Current,

    /// A newer version exists; the manifest entry becomes `to`
    Updated { to: ProjectSignature },
}

/// The flattened transitive closure of a manifest's dependencies.
///
/// Entries are unique by (publisher, project) in first-encounter order.
/// When the same project is reached along several paths the last-resolved
/// version wins; there is no conflict reporting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedDependencySet {
    entries: Vec<ProjectSignature>,
}

impl ResolvedDependencySet {
    pub fn new() -> Self {
        ResolvedDependencySet::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProjectSignature> {
        self.entries.iter()
    }

    fn position(&self, signature: &ProjectSignature) -> Option<usize> {
        self.entries.iter().position(|e| e.same_project(signature))
    }

    /// Whether the set already holds this (publisher, project).
    pub fn contains_project(&self, signature: &ProjectSignature) -> bool {
        self.position(signature).is_some()
    }

    /// Insert a new entry, or overwrite the held version when the project is
    /// already present (last-resolved wins, position unchanged).
    pub fn resolve(&mut self, signature: &ProjectSignature) {
        match self.position(signature) {
            Some(index) => self.entries[index].version = signature.version.clone(),
            None => self.entries.push(signature.clone()),
        }
    }

    /// Remove and return the entry matching (publisher, project), if any.
    ///
    /// This is the "still needed" pool operation the sync engines drain.
    pub fn take_matching(&mut self, signature: &ProjectSignature) -> Option<ProjectSignature> {
        self.position(signature).map(|index| self.entries.remove(index))
    }

    /// Remove any entry for this (publisher, project) and append `signature`.
    pub fn override_with(&mut self, signature: &ProjectSignature) {
        self.take_matching(signature);
        self.entries.push(signature.clone());
    }
}

impl IntoIterator for ResolvedDependencySet {
    type Item = ProjectSignature;
    type IntoIter = std::vec::IntoIter<ProjectSignature>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResolvedDependencySet {
    type Item = &'a ProjectSignature;
    type IntoIter = std::slice::Iter<'a, ProjectSignature>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Computes update decisions and transitive closures over one store.
pub struct DependencyResolver<'a> {
    store: &'a PackageStore,
}

impl<'a> DependencyResolver<'a> {
    pub fn new(store: &'a PackageStore) -> Self {
        DependencyResolver { store }
    }

    /// Decide whether a declared dependency is current, updatable, or gone.
    ///
    /// "Current" means exact token equality with the newest published
    /// version; there is no semantic version comparison.
    pub fn check_update(&self, dependency: &ProjectSignature) -> UpdateDecision {
        match self
            .store
            .latest_version(&dependency.publisher, &dependency.project)
        {
            None => UpdateDecision::NotFound,
            Some(latest) if latest == dependency.version => UpdateDecision::Current,
            Some(latest) => UpdateDecision::Updated {
                to: dependency.with_version(latest),
            },
        }
    }

    /// Flatten the transitive closure of a direct-dependency list.
    ///
    /// Depth-first in declaration order. A dependency with no store manifest
    /// or no `java` section is skipped silently: not added, not recursed
    /// into. The set itself doubles as the visited guard, so cycles and
    /// diamonds terminate; a re-encountered project only has its version
    /// overwritten.
    pub fn transitive_closure(&self, direct: &[ProjectSignature]) -> ResolvedDependencySet {
        let mut set = ResolvedDependencySet::new();
        self.expand(direct, &mut set);
        set
    }

    fn expand(&self, dependencies: &[ProjectSignature], set: &mut ResolvedDependencySet) {
        for dependency in dependencies {
            if set.contains_project(dependency) {
                set.resolve(dependency);
                continue;
            }

            let Some(manifest) = self.store.load_manifest(dependency) else {
                tracing::debug!("{} not in store, skipping", dependency);
                continue;
            };
            if manifest.java.is_none() {
                tracing::debug!("{} has no java section, skipping", dependency);
                continue;
            }

            set.resolve(dependency);
            self.expand(manifest.dependencies(), set);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StoreFixture;

    fn sig(publisher: &str, project: &str, version: &str) -> ProjectSignature {
        ProjectSignature::new(publisher, project, version)
    }

    #[test]
    fn test_check_update_not_found() {
        let fixture = StoreFixture::new();
        let store = fixture.store();
        let resolver = DependencyResolver::new(&store);

        assert_eq!(
            resolver.check_update(&sig("a", "b", "1")),
            UpdateDecision::NotFound
        );
    }

    #[test]
    fn test_check_update_current() {
        let fixture = StoreFixture::new();
        fixture.publish(&sig("a", "b", "1"), &[]);
        fixture.publish(&sig("a", "b", "2"), &[]);
        let store = fixture.store();
        let resolver = DependencyResolver::new(&store);

        assert_eq!(
            resolver.check_update(&sig("a", "b", "2")),
            UpdateDecision::Current
        );
    }

    #[test]
    fn test_check_update_newer_available() {
        let fixture = StoreFixture::new();
        fixture.publish(&sig("a", "b", "1"), &[]);
        fixture.publish(&sig("a", "b", "2"), &[]);
        let store = fixture.store();
        let resolver = DependencyResolver::new(&store);

        assert_eq!(
            resolver.check_update(&sig("a", "b", "1")),
            UpdateDecision::Updated {
                to: sig("a", "b", "2")
            }
        );
    }

    #[test]
    fn test_check_update_exact_token_not_semantic() {
        // "Current" is token equality; a declared version absent from the
        // sibling set still updates to the published maximum.
        let fixture = StoreFixture::new();
        fixture.publish(&sig("a", "b", "3"), &[]);
        let store = fixture.store();
        let resolver = DependencyResolver::new(&store);

        assert_eq!(
            resolver.check_update(&sig("a", "b", "5")),
            UpdateDecision::Updated {
                to: sig("a", "b", "3")
            }
        );
    }

    #[test]
    fn test_closure_depth_first_declaration_order() {
        let fixture = StoreFixture::new();
        fixture.publish(&sig("a", "b", "1"), &[sig("c", "d", "1")]);
        fixture.publish(&sig("c", "d", "1"), &[]);
        fixture.publish(&sig("e", "f", "1"), &[]);
        let store = fixture.store();
        let resolver = DependencyResolver::new(&store);

        let closure =
            resolver.transitive_closure(&[sig("a", "b", "1"), sig("e", "f", "1")]);
        let entries: Vec<String> = closure.iter().map(|s| s.to_string()).collect();
        assert_eq!(entries, ["a/b@1", "c/d@1", "e/f@1"]);
    }

    #[test]
    fn test_closure_skips_unpublished_and_non_java() {
        let fixture = StoreFixture::new();
        fixture.publish(&sig("a", "b", "1"), &[sig("x", "y", "1")]);
        fixture.publish_without_java(&sig("n", "j", "1"));
        let store = fixture.store();
        let resolver = DependencyResolver::new(&store);

        // x/y is not published at all, n/j has no java section; neither
        // appears and neither is recursed into.
        let closure = resolver.transitive_closure(&[
            sig("a", "b", "1"),
            sig("n", "j", "1"),
            sig("m", "q", "9"),
        ]);
        let entries: Vec<String> = closure.iter().map(|s| s.to_string()).collect();
        assert_eq!(entries, ["a/b@1"]);
    }

    #[test]
    fn test_closure_reads_legacy_layout_manifests() {
        let fixture = StoreFixture::new();
        fixture.publish_legacy(&sig("a", "b", "1"), &[sig("c", "d", "1")]);
        fixture.publish(&sig("c", "d", "1"), &[]);
        let store = fixture.store();
        let resolver = DependencyResolver::new(&store);

        let closure = resolver.transitive_closure(&[sig("a", "b", "1")]);
        let entries: Vec<String> = closure.iter().map(|s| s.to_string()).collect();
        assert_eq!(entries, ["a/b@1", "c/d@1"]);
    }

    #[test]
    fn test_closure_survives_cycle() {
        let fixture = StoreFixture::new();
        fixture.publish(&sig("a", "b", "1"), &[sig("c", "d", "1")]);
        fixture.publish(&sig("c", "d", "1"), &[sig("a", "b", "1")]);
        let store = fixture.store();
        let resolver = DependencyResolver::new(&store);

        let closure = resolver.transitive_closure(&[sig("a", "b", "1")]);
        let entries: Vec<String> = closure.iter().map(|s| s.to_string()).collect();
        assert_eq!(entries, ["a/b@1", "c/d@1"]);
    }

    #[test]
    fn test_closure_last_resolved_version_wins() {
        // a/b depends on c/d@1, e/f depends on c/d@2. First-encounter
        // position is kept, the later version overwrites.
        let fixture = StoreFixture::new();
        fixture.publish(&sig("a", "b", "1"), &[sig("c", "d", "1")]);
        fixture.publish(&sig("e", "f", "1"), &[sig("c", "d", "2")]);
        fixture.publish(&sig("c", "d", "1"), &[]);
        fixture.publish(&sig("c", "d", "2"), &[]);
        let store = fixture.store();
        let resolver = DependencyResolver::new(&store);

        let closure =
            resolver.transitive_closure(&[sig("a", "b", "1"), sig("e", "f", "1")]);
        let entries: Vec<String> = closure.iter().map(|s| s.to_string()).collect();
        assert_eq!(entries, ["a/b@1", "c/d@2", "e/f@1"]);
    }

    #[test]
    fn test_take_matching_drains_pool() {
        let mut set = ResolvedDependencySet::new();
        set.resolve(&sig("a", "b", "1"));
        set.resolve(&sig("c", "d", "2"));

        assert_eq!(set.take_matching(&sig("a", "b", "999")), Some(sig("a", "b", "1")));
        assert_eq!(set.take_matching(&sig("a", "b", "1")), None);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_override_with_moves_to_end() {
        let mut set = ResolvedDependencySet::new();
        set.resolve(&sig("a", "b", "1"));
        set.resolve(&sig("c", "d", "1"));

        set.override_with(&sig("a", "b", "2"));
        let entries: Vec<String> = set.iter().map(|s| s.to_string()).collect();
        assert_eq!(entries, ["c/d@1", "a/b@2"]);
    }
}
