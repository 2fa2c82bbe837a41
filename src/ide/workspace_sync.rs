//! Reconciles workspace run configurations with discovered test classes.

use std::path::Path;

use walkdir::WalkDir;

use crate::core::signature::ProjectSignature;
use crate::ide::workspace::{IntellijWorkspace, RunConfigurationSettings};
use crate::resolver::{DependencyResolver, ResolvedDependencySet};
use crate::store::PackageStore;

/// Publisher of the test-runner tooling project.
pub const TEST_RUNNER_PUBLISHER: &str = "wharf";

/// Project name of the test-runner tooling project.
pub const TEST_RUNNER_PROJECT: &str = "test-java";

const TEST_RUNNER_MAIN_CLASS: &str = "wharf.ConsoleTestRunner";
const TESTS_DIR: &str = "tests";
const TEST_FILE_EXTENSION: &str = "java";

const APPLICATION_TYPE: &str = "Application";
const OUTPUT_FOLDER_PARAMETER: &str = "--output-folder=$PROJECT_DIR$/outputs";
const TEST_JSON_PARAMETER: &str = "--testjson=false";
const CLASSPATH_PREFIX: &str = "-classpath $PROJECT_DIR$/outputs";

fn classpath_separator() -> char {
    if cfg!(windows) {
        ';'
    } else {
        ':'
    }
}

/// Rebuilds a workspace's run-configuration list, one entry per test class.
pub struct WorkspaceSyncEngine<'a> {
    store: &'a PackageStore,
}

impl<'a> WorkspaceSyncEngine<'a> {
    pub fn new(store: &'a PackageStore) -> Self {
        WorkspaceSyncEngine { store }
    }

    /// Reconcile `workspace` against the tests discovered under
    /// `project_dir` and the resolved closure of the root manifest.
    pub fn sync(
        &self,
        workspace: &mut IntellijWorkspace,
        project_dir: &Path,
        module_name: &str,
        closure: &ResolvedDependencySet,
    ) {
        let test_classes = discover_test_classes(&project_dir.join(TESTS_DIR));
        let vm_parameters = self.classpath_string(closure);

        let existing = workspace.run_configuration_names();
        workspace.retain_run_configurations(|name| test_classes.iter().any(|c| c == name));

        let mut to_add = test_classes.clone();
        for name in &existing {
            if test_classes.iter().any(|c| c == name) {
                workspace.update_run_configuration(
                    name,
                    &self.settings_for(name, module_name, &vm_parameters),
                );
                to_add.retain(|c| c != name);
            } else {
                tracing::debug!("removed run configuration {name}");
            }
        }

        for name in &to_add {
            tracing::debug!("added run configuration {name}");
            workspace.add_run_configuration(
                name,
                &self.settings_for(name, module_name, &vm_parameters),
            );
        }
    }

    fn settings_for(
        &self,
        test_class: &str,
        module_name: &str,
        vm_parameters: &str,
    ) -> RunConfigurationSettings {
        RunConfigurationSettings {
            configuration_type: APPLICATION_TYPE.to_string(),
            factory_name: APPLICATION_TYPE.to_string(),
            main_class: TEST_RUNNER_MAIN_CLASS.to_string(),
            module_name: module_name.to_string(),
            program_parameters: format!(
                "{OUTPUT_FOLDER_PARAMETER} {TEST_JSON_PARAMETER} {test_class}"
            ),
            vm_parameters: vm_parameters.to_string(),
        }
    }

    /// The classpath handed to every run configuration: the fixed output
    /// folder, then the compiled artifact of each run dependency.
    fn classpath_string(&self, closure: &ResolvedDependencySet) -> String {
        let separator = classpath_separator();
        let mut classpath = String::from(CLASSPATH_PREFIX);
        for dependency in &self.run_dependencies(closure) {
            classpath.push(separator);
            classpath.push_str(
                &self
                    .store
                    .compiled_artifact_path(dependency)
                    .display()
                    .to_string(),
            );
        }
        classpath
    }

    /// The run-dependency pool: the test-runner tooling project at its
    /// latest store version plus that project's own transitive closure,
    /// with every root-closure entry overriding a pool entry sharing its
    /// (publisher, project). Degrades to the root closure alone when the
    /// tooling project is not published.
    fn run_dependencies(&self, closure: &ResolvedDependencySet) -> ResolvedDependencySet {
        let mut pool = ResolvedDependencySet::new();

        if let Some(version) = self
            .store
            .latest_version(TEST_RUNNER_PUBLISHER, TEST_RUNNER_PROJECT)
        {
            let tooling =
                ProjectSignature::new(TEST_RUNNER_PUBLISHER, TEST_RUNNER_PROJECT, version);
            pool.resolve(&tooling);

            if let Some(manifest) = self.store.load_manifest(&tooling) {
                let resolver = DependencyResolver::new(self.store);
                for dependency in &resolver.transitive_closure(manifest.dependencies()) {
                    pool.resolve(dependency);
                }
            }
        } else {
            tracing::debug!(
                "{TEST_RUNNER_PUBLISHER}/{TEST_RUNNER_PROJECT} not in store, \
                 classpath limited to project dependencies"
            );
        }

        for entry in closure {
            pool.override_with(entry);
        }

        pool
    }
}

/// Walk the tests folder and turn each `*.java` file into a fully-qualified
/// class name: path relative to the folder, extension stripped, separators
/// replaced by dots. A missing folder yields no classes.
fn discover_test_classes(tests_dir: &Path) -> Vec<String> {
    let mut classes = Vec::new();

    for entry in WalkDir::new(tests_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(TEST_FILE_EXTENSION) {
            continue;
        }
        let Ok(relative) = path.strip_prefix(tests_dir) else {
            continue;
        };

        let stripped = relative.with_extension("");
        let class: Vec<&str> = stripped
            .components()
            .filter_map(|c| match c {
                std::path::Component::Normal(s) => s.to_str(),
                _ => None,
            })
            .collect();
        classes.push(class.join("."));
    }

    classes
}
