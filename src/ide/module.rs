//! IntelliJ module descriptor (`*.iml`) document model.
//!
//! A module descriptor is an XML document whose `NewModuleRootManager`
//! component holds `orderEntry` elements. The subset with
//! `type="module-library"` carries nested classes/sources root URLs; those
//! are the entries the sync engine rebuilds. Everything else in the
//! document rides along unmodified.

use std::path::Path;

use xmltree::{Element, EmitterConfig, XMLNode};

use crate::ide::DescriptorError;

const ROOT_MANAGER_COMPONENT: &str = "NewModuleRootManager";
const ORDER_ENTRY: &str = "orderEntry";
const MODULE_LIBRARY_TYPE: &str = "module-library";

/// One `orderEntry type="module-library"` element.
///
/// The original element is kept whole so a reference the tool decides to
/// retain goes back into the document byte-for-byte identical in structure,
/// including attributes and children it does not interpret.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleLibrary {
    element: Element,
}

impl ModuleLibrary {
    /// Synthesize a fresh library entry from artifact URLs.
    pub fn from_artifact_urls(classes_url: &str, sources_url: &str) -> Self {
        let mut classes = Element::new("CLASSES");
        classes
            .children
            .push(XMLNode::Element(root_url_element(classes_url)));

        let javadoc = Element::new("JAVADOC");

        let mut sources = Element::new("SOURCES");
        sources
            .children
            .push(XMLNode::Element(root_url_element(sources_url)));

        let mut library = Element::new("library");
        library.children.push(XMLNode::Element(classes));
        library.children.push(XMLNode::Element(javadoc));
        library.children.push(XMLNode::Element(sources));

        let mut element = Element::new(ORDER_ENTRY);
        element
            .attributes
            .insert("type".to_string(), MODULE_LIBRARY_TYPE.to_string());
        element.children.push(XMLNode::Element(library));

        ModuleLibrary { element }
    }

    fn from_element(element: Element) -> Self {
        ModuleLibrary { element }
    }

    fn is_module_library(element: &Element) -> bool {
        element.name == ORDER_ENTRY
            && element.attributes.get("type").map(String::as_str) == Some(MODULE_LIBRARY_TYPE)
    }

    /// The first classes-root URL, used to classify the reference.
    pub fn first_classes_url(&self) -> Option<&str> {
        self.urls_under("CLASSES").into_iter().next()
    }

    /// All sources-root URLs.
    pub fn sources_urls(&self) -> Vec<&str> {
        self.urls_under("SOURCES")
    }

    fn urls_under(&self, section: &str) -> Vec<&str> {
        let Some(library) = self.element.get_child("library") else {
            return Vec::new();
        };
        let Some(section) = library.get_child(section) else {
            return Vec::new();
        };

        section
            .children
            .iter()
            .filter_map(|node| match node {
                XMLNode::Element(e) if e.name == "root" => {
                    e.attributes.get("url").map(String::as_str)
                }
                _ => None,
            })
            .collect()
    }

    fn into_element(self) -> Element {
        self.element
    }
}

fn root_url_element(url: &str) -> Element {
    let mut root = Element::new("root");
    root.attributes.insert("url".to_string(), url.to_string());
    root
}

/// A parsed `*.iml` document.
#[derive(Debug, Clone, PartialEq)]
pub struct IntellijModule {
    root: Element,
}

impl IntellijModule {
    /// Parse a descriptor from its file contents.
    pub fn parse(contents: &str) -> Result<Self, xmltree::ParseError> {
        Ok(IntellijModule {
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

    fn root_manager(&self) -> Option<&Element> {
        component(&self.root, ROOT_MANAGER_COMPONENT)
    }

    fn root_manager_mut(&mut self) -> Option<&mut Element> {
        component_mut(&mut self.root, ROOT_MANAGER_COMPONENT)
    }

    /// Snapshot the module-library entries, in document order.
    pub fn module_libraries(&self) -> Vec<ModuleLibrary> {
        let Some(manager) = self.root_manager() else {
            return Vec::new();
        };

        manager
            .children
            .iter()
            .filter_map(|node| match node {
                XMLNode::Element(e) if ModuleLibrary::is_module_library(e) => {
                    Some(ModuleLibrary::from_element(e.clone()))
                }
                _ => None,
            })
            .collect()
    }

    /// Drop every module-library entry, leaving other order entries alone.
    pub fn clear_module_libraries(&mut self) {
        if let Some(manager) = self.root_manager_mut() {
            manager.children.retain(|node| match node {
                XMLNode::Element(e) => !ModuleLibrary::is_module_library(e),
                _ => true,
            });
        }
    }

    /// Append a module-library entry at the end of the component.
    pub fn add_module_library(&mut self, library: ModuleLibrary) {
        if let Some(manager) = self.root_manager_mut() {
            manager
                .children
                .push(XMLNode::Element(library.into_element()));
        }
    }
}

/// Find a `component` child by its `name` attribute.
pub(crate) fn component<'a>(root: &'a Element, name: &str) -> Option<&'a Element> {
    root.children.iter().find_map(|node| match node {
        XMLNode::Element(e)
            if e.name == "component"
                && e.attributes.get("name").map(String::as_str) == Some(name) =>
        {
            Some(e)
        }
        _ => None,
    })
}

pub(crate) fn component_mut<'a>(root: &'a mut Element, name: &str) -> Option<&'a mut Element> {
    root.children.iter_mut().find_map(|node| match node {
        XMLNode::Element(e)
            if e.name == "component"
                && e.attributes.get("name").map(String::as_str) == Some(name) =>
        {
            Some(e)
        }
        _ => None,
    })
}

pub(crate) fn emit_pretty(root: &Element) -> String {
    let mut buffer = Vec::new();
    let config = EmitterConfig::new().perform_indent(true);
    // Writing into a Vec cannot hit I/O failure.
    root.write_with_config(&mut buffer, config)
        .expect("descriptor serialization");
    String::from_utf8(buffer).expect("descriptor serialization is utf-8")
}
