//! IntelliJ workspace descriptor (`.idea/workspace.xml`) document model.
//!
//! The only part of the workspace the tool owns is the `RunManager`
//! component's `configuration` list: one entry per discovered test class.
//! Configurations are keyed by their `name` attribute; everything else in
//! the document is preserved as parsed.

use std::path::Path;

use xmltree::{Element, XMLNode};

use crate::ide::module::{component, component_mut, emit_pretty};
use crate::ide::DescriptorError;

const RUN_MANAGER_COMPONENT: &str = "RunManager";
const CONFIGURATION: &str = "configuration";

const MAIN_CLASS_OPTION: &str = "MAIN_CLASS_NAME";
const PROGRAM_PARAMETERS_OPTION: &str = "PROGRAM_PARAMETERS";
const VM_PARAMETERS_OPTION: &str = "VM_PARAMETERS";

/// The standardized metadata stamped onto every managed configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfigurationSettings {
    pub configuration_type: String,
    pub factory_name: String,
    pub main_class: String,
    pub module_name: String,
    pub program_parameters: String,
    pub vm_parameters: String,
}

/// A parsed `workspace.xml` document.
#[derive(Debug, Clone, PartialEq)]
pub struct IntellijWorkspace {
    root: Element,
}

impl IntellijWorkspace {
    /// Parse a descriptor from its file contents.
    pub fn parse(contents: &str) -> Result<Self, xmltree::ParseError> {
        Ok(IntellijWorkspace {
            root: Element::parse(contents.as_bytes())?,
        })
    }

    /// Read and parse a descriptor file.
    pub fn load(path: &Path) -> Result<Self, DescriptorError> {
        let contents = std::fs::read_to_string(path).map_err(|e| DescriptorError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&contents).map_err(|e| DescriptorError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Serialize back to the pretty XML form used for rewrites.
    pub fn to_xml_string(&self) -> String {
        emit_pretty(&self.root)
    }

    /// Names of the existing run configurations, in document order.
    pub fn run_configuration_names(&self) -> Vec<String> {
        let Some(manager) = component(&self.root, RUN_MANAGER_COMPONENT) else {
            return Vec::new();
        };

        manager
            .children
            .iter()
            .filter_map(|node| match node {
                XMLNode::Element(e) if e.name == CONFIGURATION => {
                    e.attributes.get("name").cloned()
                }
                _ => None,
            })
            .collect()
    }

    /// Drop every configuration whose name fails the predicate.
    pub fn retain_run_configurations(&mut self, keep: impl Fn(&str) -> bool) {
        if let Some(manager) = component_mut(&mut self.root, RUN_MANAGER_COMPONENT) {
            manager.children.retain(|node| match node {
                XMLNode::Element(e) if e.name == CONFIGURATION => e
                    .attributes
                    .get("name")
                    .map(|name| keep(name))
                    .unwrap_or(true),
                _ => true,
            });
        }
    }

    /// Overwrite the managed fields of an existing configuration in place.
    ///
    /// Children the tool does not own (logs, before-run tasks) stay put.
    pub fn update_run_configuration(&mut self, name: &str, settings: &RunConfigurationSettings) {
        let Some(manager) = component_mut(&mut self.root, RUN_MANAGER_COMPONENT) else {
            return;
        };

        for node in &mut manager.children {
            let XMLNode::Element(config) = node else {
                continue;
            };
            if config.name != CONFIGURATION
                || config.attributes.get("name").map(String::as_str) != Some(name)
            {
                continue;
            }

            apply_settings(config, settings);
        }
    }

    /// Append a new configuration carrying the standardized metadata.
    pub fn add_run_configuration(&mut self, name: &str, settings: &RunConfigurationSettings) {
        let mut config = Element::new(CONFIGURATION);
        config
            .attributes
            .insert("name".to_string(), name.to_string());
        apply_settings(&mut config, settings);

        self.run_manager_mut()
            .children
            .push(XMLNode::Element(config));
    }

    fn run_manager_mut(&mut self) -> &mut Element {
        if component(&self.root, RUN_MANAGER_COMPONENT).is_none() {
            let mut manager = Element::new("component");
            manager
                .attributes
                .insert("name".to_string(), RUN_MANAGER_COMPONENT.to_string());
            self.root.children.push(XMLNode::Element(manager));
        }
        component_mut(&mut self.root, RUN_MANAGER_COMPONENT).expect("component just ensured")
    }
}

fn apply_settings(config: &mut Element, settings: &RunConfigurationSettings) {
    config
        .attributes
        .insert("type".to_string(), settings.configuration_type.clone());
    config
        .attributes
        .insert("factoryName".to_string(), settings.factory_name.clone());

    set_option(config, MAIN_CLASS_OPTION, &settings.main_class);
    set_module(config, &settings.module_name);
    set_option(config, PROGRAM_PARAMETERS_OPTION, &settings.program_parameters);
    set_option(config, VM_PARAMETERS_OPTION, &settings.vm_parameters);
}

fn set_option(config: &mut Element, option: &str, value: &str) {
    for node in &mut config.children {
        if let XMLNode::Element(e) = node {
            if e.name == "option" && e.attributes.get("name").map(String::as_str) == Some(option) {
                e.attributes
                    .insert("value".to_string(), value.to_string());
                return;
            }
        }
    }

    let mut element = Element::new("option");
    element
        .attributes
        .insert("name".to_string(), option.to_string());
    element
        .attributes
        .insert("value".to_string(), value.to_string());
    config.children.push(XMLNode::Element(element));
}

fn set_module(config: &mut Element, module_name: &str) {
    for node in &mut config.children {
        if let XMLNode::Element(e) = node {
            if e.name == "module" {
                e.attributes
                    .insert("name".to_string(), module_name.to_string());
                return;
            }
        }
    }

    let mut element = Element::new("module");
    element
        .attributes
        .insert("name".to_string(), module_name.to_string());
    config.children.push(XMLNode::Element(element));
}
