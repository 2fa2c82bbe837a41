//! Implementation of `wharf update`.
//!
//! Rewrites the manifest's direct dependencies to the newest store versions,
//! then (unless IntelliJ sync is disabled) reconciles every `*.iml` module
//! descriptor and the `.idea/workspace.xml` file against the resolved
//! transitive closure. Each file is rewritten at most once, and only when
//! its content actually changed.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use walkdir::WalkDir;

use crate::core::MANIFEST_FILE_NAME;
use crate::ide::{IntellijModule, IntellijWorkspace, ModuleSyncEngine, WorkspaceSyncEngine};
use crate::ops::{count_phrase, load_root_manifest, require_java};
use crate::resolver::{DependencyResolver, ResolvedDependencySet, UpdateDecision};
use crate::store::{PackageStore, StoreConfig};
use crate::util::fs::write_string;

const MODULE_FILE_EXTENSION: &str = "iml";
const WORKSPACE_FILE: &str = "workspace.xml";

/// Options for the update operation.
#[derive(Debug, Clone)]
pub struct UpdateOptions {
    /// Whether to reconcile IntelliJ project files after the manifest.
    pub sync_intellij: bool,
}

impl Default for UpdateOptions {
    fn default() -> Self {
        UpdateOptions {
            sync_intellij: true,
        }
    }
}

/// Update a project's direct dependencies and reconcile its IDE files.
pub fn update(
    config: &StoreConfig,
    project_dir: &Path,
    opts: &UpdateOptions,
    out: &mut dyn Write,
) -> Result<()> {
    writeln!(out, "Updating dependencies for {}...", project_dir.display())?;

    let manifest_path = project_dir.join(MANIFEST_FILE_NAME);
    let mut manifest = load_root_manifest(&manifest_path)?;
    require_java(&manifest, &manifest_path)?;

    let store = config.resolve()?;

    let dependencies = manifest.dependencies().to_vec();
    let count = dependencies.len();
    writeln!(
        out,
        "Found {}{}",
        count_phrase(count),
        if count == 0 { "." } else { ":" }
    )?;

    let resolver = DependencyResolver::new(&store);
    let mut updated = Vec::with_capacity(count);
    let mut changed = false;

    for dependency in &dependencies {
        match resolver.check_update(dependency) {
            UpdateDecision::NotFound => {
                writeln!(out, "  {dependency} - Not Found")?;
                updated.push(dependency.clone());
            }
            UpdateDecision::Current => {
                writeln!(out, "  {dependency} - No updates")?;
                updated.push(dependency.clone());
            }
            UpdateDecision::Updated { to } => {
                writeln!(out, "  {dependency} - Updated to {to}")?;
                updated.push(to);
                changed = true;
            }
        }
    }

    if changed {
        manifest.set_dependencies(updated.clone());
        write_string(&manifest_path, &manifest.to_json_string())?;
    }

    if opts.sync_intellij {
        let closure = resolver.transitive_closure(&updated);
        sync_module_files(&store, project_dir, &closure, out)?;
        sync_workspace_file(
            &store,
            project_dir,
            manifest.project.as_deref().unwrap_or_default(),
            &closure,
            out,
        )?;
    }

    Ok(())
}

/// Reconcile every module descriptor under the project directory.
///
/// An unreadable or unparseable descriptor is reported and skipped; a
/// failed write aborts the run.
fn sync_module_files(
    store: &PackageStore,
    project_dir: &Path,
    closure: &ResolvedDependencySet,
    out: &mut dyn Write,
) -> Result<()> {
    let module_files = find_module_files(project_dir);
    if module_files.is_empty() {
        return Ok(());
    }

    writeln!(out, "Updating IntelliJ module files...")?;
    let engine = ModuleSyncEngine::new(store);

    for path in module_files {
        let mut module = match IntellijModule::load(&path) {
            Ok(module) => module,
            Err(e) => {
                tracing::debug!("{e}");
                writeln!(out, "  Invalid IntelliJ module file: {}", path.display())?;
                continue;
            }
        };

        let pristine = module.clone();
        let mut pool = closure.clone();
        for line in engine.sync(&mut module, &mut pool) {
            writeln!(out, "  {line}")?;
        }

        if module != pristine {
            write_string(&path, &module.to_xml_string())?;
        }
    }

    Ok(())
}

fn find_module_files(project_dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(project_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry.path().extension().and_then(|e| e.to_str()) == Some(MODULE_FILE_EXTENSION)
        })
        .map(|entry| entry.into_path())
        .collect()
}

/// Reconcile the workspace descriptor, when the project has one.
fn sync_workspace_file(
    store: &PackageStore,
    project_dir: &Path,
    module_name: &str,
    closure: &ResolvedDependencySet,
    out: &mut dyn Write,
) -> Result<()> {
    let workspace_path = project_dir.join(".idea").join(WORKSPACE_FILE);
    if !workspace_path.exists() {
        return Ok(());
    }

    writeln!(out, "Updating IntelliJ workspace file...")?;

    let mut workspace = match IntellijWorkspace::load(&workspace_path) {
        Ok(workspace) => workspace,
        Err(e) => {
            tracing::debug!("{e}");
            writeln!(
                out,
                "  Invalid IntelliJ workspace file: {}",
                workspace_path.display()
            )?;
            return Ok(());
        }
    };

    let pristine = workspace.clone();
    WorkspaceSyncEngine::new(store).sync(&mut workspace, project_dir, module_name, closure);

    if workspace != pristine {
        write_string(&workspace_path, &workspace.to_xml_string())?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ProjectManifest, ProjectSignature};
    use crate::test_support::{ProjectFixture, StoreFixture};

    fn sig(publisher: &str, project: &str, version: &str) -> ProjectSignature {
        ProjectSignature::new(publisher, project, version)
    }

    fn run_update(fixture: &StoreFixture, project: &ProjectFixture) -> (Result<()>, Vec<String>) {
        run_update_with(fixture, project, &UpdateOptions::default())
    }

    fn run_update_with(
        fixture: &StoreFixture,
        project: &ProjectFixture,
        opts: &UpdateOptions,
    ) -> (Result<()>, Vec<String>) {
        let config = StoreConfig::explicit(fixture.root().to_string_lossy().to_string());
        let mut out = Vec::new();
        let result = update(&config, project.path(), opts, &mut out);
        let lines = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect();
        (result, lines)
    }

    fn parsed_dependencies(project: &ProjectFixture) -> Vec<ProjectSignature> {
        let manifest: ProjectManifest =
            serde_json::from_str(&project.read("project.json")).unwrap();
        manifest.dependencies().to_vec()
    }

    #[test]
    fn test_zero_dependencies_no_writes() {
        let fixture = StoreFixture::new();
        let project = ProjectFixture::new("p", &[]);
        let before = project.read("project.json");

        let (result, lines) = run_update(&fixture, &project);

        result.unwrap();
        assert_eq!(lines[1], "Found 0 dependencies.");
        assert_eq!(project.read("project.json"), before);
    }

    #[test]
    fn test_store_root_checked_before_count() {
        let project = ProjectFixture::new("p", &[]);
        let mut out = Vec::new();

        let err = update(
            &StoreConfig::default(),
            project.path(),
            &UpdateOptions::default(),
            &mut out,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "the WHARF_HOME environment variable is not set"
        );
    }

    #[test]
    fn test_updatable_dependency_rewrites_manifest() {
        let fixture = StoreFixture::new();
        fixture.publish(&sig("a", "b", "1"), &[]);
        fixture.publish(&sig("a", "b", "2"), &[]);
        let project = ProjectFixture::new("p", &[sig("a", "b", "1")]);

        let (result, lines) = run_update(&fixture, &project);

        result.unwrap();
        assert_eq!(
            lines[1..],
            ["Found 1 dependency:", "  a/b@1 - Updated to a/b@2"]
        );
        assert_eq!(parsed_dependencies(&project), [sig("a", "b", "2")]);
    }

    #[test]
    fn test_not_found_dependency_retained() {
        let fixture = StoreFixture::new();
        let project = ProjectFixture::new("p", &[sig("a", "b", "1")]);
        let before = project.read("project.json");

        let (result, lines) = run_update(&fixture, &project);

        result.unwrap();
        assert_eq!(lines[1..], ["Found 1 dependency:", "  a/b@1 - Not Found"]);
        assert_eq!(project.read("project.json"), before);
    }

    #[test]
    fn test_mixed_decisions_in_declared_order() {
        let fixture = StoreFixture::new();
        fixture.publish(&sig("a", "b", "1"), &[]);
        fixture.publish(&sig("a", "b", "2"), &[]);
        fixture.publish(&sig("d", "e", "3"), &[]);
        let project = ProjectFixture::new(
            "p",
            &[sig("a", "b", "1"), sig("d", "e", "3"), sig("g", "h", "4")],
        );

        let (result, lines) = run_update(&fixture, &project);

        result.unwrap();
        assert_eq!(
            lines[1..],
            [
                "Found 3 dependencies:",
                "  a/b@1 - Updated to a/b@2",
                "  d/e@3 - No updates",
                "  g/h@4 - Not Found",
            ]
        );
        assert_eq!(
            parsed_dependencies(&project),
            [sig("a", "b", "2"), sig("d", "e", "3"), sig("g", "h", "4")]
        );
    }

    #[test]
    fn test_rewrite_preserves_unrelated_manifest_fields() {
        let fixture = StoreFixture::new();
        fixture.publish(&sig("a", "b", "2"), &[]);
        let project = ProjectFixture::with_manifest(
            r#"{
  "publisher": "me",
  "project": "p",
  "version": "4",
  "java": {
    "mainClass": "me.Main",
    "dependencies": [ { "publisher": "a", "project": "b", "version": "1" } ]
  }
}"#,
        );

        let (result, _) = run_update(&fixture, &project);
        result.unwrap();

        let rewritten: ProjectManifest =
            serde_json::from_str(&project.read("project.json")).unwrap();
        assert_eq!(rewritten.publisher.as_deref(), Some("me"));
        assert_eq!(rewritten.version.as_deref(), Some("4"));
        assert_eq!(
            rewritten.java.as_ref().unwrap().extra.get("mainClass"),
            Some(&serde_json::Value::String("me.Main".to_string()))
        );
        assert_eq!(rewritten.dependencies(), [sig("a", "b", "2")]);
    }

    #[test]
    fn test_update_is_idempotent() {
        let fixture = StoreFixture::new();
        fixture.publish(&sig("a", "b", "1"), &[]);
        fixture.publish(&sig("a", "b", "2"), &[]);
        let project = ProjectFixture::new("p", &[sig("a", "b", "1")]);
        project.write(
            "p.iml",
            r#"<module type="JAVA_MODULE" version="4"><component name="NewModuleRootManager"/></module>"#,
        );

        let (first, _) = run_update(&fixture, &project);
        first.unwrap();

        let after_first_manifest = project.read("project.json");
        let after_first_module = project.read("p.iml");
        let (second, second_lines) = run_update(&fixture, &project);
        second.unwrap();

        let (third, third_lines) = run_update(&fixture, &project);
        third.unwrap();

        assert_eq!(second_lines, third_lines);
        assert!(second_lines.contains(&"  a/b@2 - No updates".to_string()));
        assert_eq!(project.read("project.json"), after_first_manifest);
        assert_eq!(project.read("p.iml"), after_first_module);
    }

    #[test]
    fn test_module_file_synced() {
        let fixture = StoreFixture::new();
        fixture.publish(&sig("a", "b", "1"), &[]);
        fixture.publish(&sig("a", "b", "2"), &[]);
        let project = ProjectFixture::new("p", &[sig("a", "b", "1")]);

        let store_root = fixture.root().display().to_string();
        project.write(
            "p.iml",
            &format!(
                r#"<module type="JAVA_MODULE" version="4">
  <component name="NewModuleRootManager">
    <orderEntry type="inheritedJdk"/>
    <orderEntry type="module-library">
      <library>
        <CLASSES><root url="jar://{store_root}/a/b/1/b.jar!/"/></CLASSES>
        <JAVADOC/>
        <SOURCES><root url="jar://{store_root}/a/b/1/b.sources.jar!/"/></SOURCES>
      </library>
    </orderEntry>
    <orderEntry type="module-library">
      <library>
        <CLASSES><root url="jar:///opt/jdk/tools.jar!/"/></CLASSES>
        <JAVADOC/>
        <SOURCES/>
      </library>
    </orderEntry>
  </component>
</module>"#
            ),
        );

        let (result, lines) = run_update(&fixture, &project);
        result.unwrap();

        assert!(lines.contains(&"Updating IntelliJ module files...".to_string()));
        assert!(lines.contains(&"  a/b@1 - Updated to a/b@2".to_string()));

        let rewritten = project.read("p.iml");
        assert!(rewritten.contains("/a/b/2/b.jar!/"));
        assert!(rewritten.contains("/a/b/2/b.sources.jar!/"));
        assert!(!rewritten.contains("/a/b/1/b.jar!/"));
        // Foreign reference and unrelated entries survive untouched.
        assert!(rewritten.contains("jar:///opt/jdk/tools.jar!/"));
        assert!(rewritten.contains("inheritedJdk"));
    }

    #[test]
    fn test_invalid_module_file_reported_and_untouched() {
        let fixture = StoreFixture::new();
        fixture.publish(&sig("a", "b", "1"), &[]);
        let project = ProjectFixture::new("p", &[sig("a", "b", "1")]);
        project.write("p.iml", "<module><broken></module>");

        let (result, lines) = run_update(&fixture, &project);
        result.unwrap();

        let reported = lines
            .iter()
            .any(|l| l.starts_with("  Invalid IntelliJ module file: "));
        assert!(reported);
        assert_eq!(project.read("p.iml"), "<module><broken></module>");
    }

    #[test]
    fn test_workspace_file_synced() {
        let fixture = StoreFixture::new();
        fixture.publish(&sig("a", "b", "1"), &[]);
        let project = ProjectFixture::new("p", &[sig("a", "b", "1")]);
        project.write("tests/me/ATests.java", "class ATests {}");
        project.write(
            ".idea/workspace.xml",
            r#"<project version="4"><component name="RunManager">
  <configuration name="me.Gone" type="Application" factoryName="Application"/>
</component></project>"#,
        );

        let (result, lines) = run_update(&fixture, &project);
        result.unwrap();

        assert!(lines.contains(&"Updating IntelliJ workspace file...".to_string()));
        let rewritten = project.read(".idea/workspace.xml");
        assert!(rewritten.contains("me.ATests"));
        assert!(!rewritten.contains("me.Gone"));
        assert!(rewritten.contains("wharf.ConsoleTestRunner"));
        assert!(rewritten.contains(r#"module name="p""#));
    }

    #[test]
    fn test_missing_workspace_file_is_not_an_error() {
        let fixture = StoreFixture::new();
        fixture.publish(&sig("a", "b", "1"), &[]);
        let project = ProjectFixture::new("p", &[sig("a", "b", "1")]);

        let (result, lines) = run_update(&fixture, &project);
        result.unwrap();
        assert!(!lines.contains(&"Updating IntelliJ workspace file...".to_string()));
    }

    #[test]
    fn test_intellij_sync_disabled() {
        let fixture = StoreFixture::new();
        fixture.publish(&sig("a", "b", "1"), &[]);
        let project = ProjectFixture::new("p", &[sig("a", "b", "1")]);
        let module = r#"<module type="JAVA_MODULE" version="4"><component name="NewModuleRootManager"/></module>"#;
        project.write("p.iml", module);

        let opts = UpdateOptions {
            sync_intellij: false,
        };
        let (result, lines) = run_update_with(&fixture, &project, &opts);
        result.unwrap();

        assert!(!lines.contains(&"Updating IntelliJ module files...".to_string()));
        assert_eq!(project.read("p.iml"), module);
    }
}
