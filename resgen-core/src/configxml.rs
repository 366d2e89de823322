//! Typed access to the project's `config.xml`.
//!
//! The document is a `<widget>` root holding `<platform name="…">` sections, each of which
//! holds lists of resource nodes (`<icon>`, `<splash>`) addressed by their `src` attribute.
//! A single top-level `<icon src="…"/>` is the default application icon.

use std::path::{Path, PathBuf};
use xmltree::{Element, EmitterConfig, XMLNode};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("error reading config file {}", .0.display())]
    Read(PathBuf, #[source] std::io::Error),
    #[error("error parsing config file")]
    Parse(#[source] xmltree::ParseError),
    #[error("config file root element is <{0}>, expected <widget>")]
    UnexpectedRoot(String),
    #[error("error serializing config file")]
    Serialize(#[source] xmltree::Error),
    #[error("error writing config file {}", .0.display())]
    Write(PathBuf, #[source] std::io::Error),
}

const ROOT: &str = "widget";
const PLATFORM: &str = "platform";
const DEFAULT_ICON: &str = "icon";

#[derive(Debug, Clone)]
pub struct ConfigDocument {
    root: Element,
}

impl ConfigDocument {
    pub fn parse(data: &[u8]) -> Result<ConfigDocument, Error> {
        let root = Element::parse(data).map_err(Error::Parse)?;
        if root.name != ROOT {
            return Err(Error::UnexpectedRoot(root.name));
        }
        Ok(ConfigDocument { root })
    }

    pub async fn read(path: &Path) -> Result<ConfigDocument, Error> {
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| Error::Read(path.to_owned(), e))?;
        Self::parse(&data)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        let mut out = Vec::new();
        self.root
            .write_with_config(
                &mut out,
                EmitterConfig::new()
                    .perform_indent(true)
                    .indent_string("    "),
            )
            .map_err(Error::Serialize)?;
        out.push(b'\n');
        Ok(out)
    }

    pub async fn write(&self, path: &Path) -> Result<(), Error> {
        let data = self.to_bytes()?;
        tokio::fs::write(path, data)
            .await
            .map_err(|e| Error::Write(path.to_owned(), e))
    }

    pub fn platform(&self, name: &str) -> Option<&Element> {
        find_child(&self.root, PLATFORM, "name", name)
            .and_then(|idx| self.root.children[idx].as_element())
    }

    /// Returns the `<platform name="…">` section, appending it to the root if it doesn't exist.
    pub fn ensure_platform(&mut self, name: &str) -> &mut Element {
        let idx = match find_child(&self.root, PLATFORM, "name", name) {
            Some(idx) => idx,
            None => {
                let mut platform = new_child(&self.root, PLATFORM);
                platform
                    .attributes
                    .insert("name".to_owned(), name.to_owned());
                self.root.children.push(XMLNode::Element(platform));
                self.root.children.len() - 1
            }
        };
        element_at(&mut self.root, idx)
    }

    /// All `<node_name>` elements of a platform section, in document order.
    pub fn resource_nodes(&self, platform: &str, node_name: &str) -> Vec<&Element> {
        self.platform(platform)
            .map(|p| {
                p.children
                    .iter()
                    .filter_map(XMLNode::as_element)
                    .filter(|e| e.name == node_name)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Removes every `<node_name>` element of a platform section and returns the position the
    /// first of them had, if there were any.
    pub fn clear_resource_nodes(&mut self, platform: &str, node_name: &str) -> Option<usize> {
        let idx = find_child(&self.root, PLATFORM, "name", platform)?;
        let platform = element_at(&mut self.root, idx);
        let first = platform
            .children
            .iter()
            .position(|node| matches!(node, XMLNode::Element(e) if e.name == node_name))?;
        platform
            .children
            .retain(|node| !matches!(node, XMLNode::Element(e) if e.name == node_name));
        Some(first)
    }

    /// Finds the resource node addressed by `(platform, node_name, src)`, creating the platform
    /// section and the node as needed. New nodes are appended to the section.
    pub fn ensure_resource_node(&mut self, platform: &str, node_name: &str, src: &str) -> &mut Element {
        self.find_or_insert_node(platform, node_name, src, None)
    }

    /// Like [`ensure_resource_node`](Self::ensure_resource_node), but a new node is inserted at
    /// `*position` and `position` then moves past it.
    pub fn ensure_resource_node_at(
        &mut self,
        platform: &str,
        node_name: &str,
        src: &str,
        position: &mut usize,
    ) -> &mut Element {
        self.find_or_insert_node(platform, node_name, src, Some(position))
    }

    fn find_or_insert_node(
        &mut self,
        platform: &str,
        node_name: &str,
        src: &str,
        position: Option<&mut usize>,
    ) -> &mut Element {
        let platform = self.ensure_platform(platform);
        let idx = match find_child(platform, node_name, "src", src) {
            Some(idx) => idx,
            None => {
                let mut node = new_child(platform, node_name);
                node.attributes.insert("src".to_owned(), src.to_owned());
                match position {
                    Some(position) => {
                        let idx = (*position).min(platform.children.len());
                        platform.children.insert(idx, XMLNode::Element(node));
                        *position = idx + 1;
                        idx
                    }
                    None => {
                        platform.children.push(XMLNode::Element(node));
                        platform.children.len() - 1
                    }
                }
            }
        };
        element_at(platform, idx)
    }

    pub fn default_icon(&self) -> Option<&str> {
        self.root
            .children
            .iter()
            .filter_map(XMLNode::as_element)
            .find(|e| e.name == DEFAULT_ICON)
            .and_then(|e| e.attributes.get("src"))
            .map(String::as_str)
    }

    /// Replaces all top-level `<icon>` elements with a single one pointing at `src`.
    pub fn set_default_icon(&mut self, src: &str) {
        let position = self
            .root
            .children
            .iter()
            .position(|node| matches!(node, XMLNode::Element(e) if e.name == DEFAULT_ICON));
        self.root
            .children
            .retain(|node| !matches!(node, XMLNode::Element(e) if e.name == DEFAULT_ICON));
        let mut icon = new_child(&self.root, DEFAULT_ICON);
        icon.attributes.insert("src".to_owned(), src.to_owned());
        let position = position.unwrap_or(self.root.children.len());
        self.root.children.insert(position, XMLNode::Element(icon));
    }

    /// Structural equality: element names, namespaces, attribute sets and child order.
    /// Namespace declarations and attribute order are not compared.
    pub fn is_equivalent(&self, other: &ConfigDocument) -> bool {
        same_element(&self.root, &other.root)
    }
}

fn find_child(parent: &Element, name: &str, attribute: &str, value: &str) -> Option<usize> {
    parent.children.iter().position(|node| {
        matches!(node, XMLNode::Element(e)
            if e.name == name && e.attributes.get(attribute).map(String::as_str) == Some(value))
    })
}

fn element_at(parent: &mut Element, idx: usize) -> &mut Element {
    match &mut parent.children[idx] {
        XMLNode::Element(e) => e,
        _ => unreachable!("child index always refers to an element"),
    }
}

fn new_child(parent: &Element, name: &str) -> Element {
    let mut child = Element::new(name);
    child.namespace = parent.namespace.clone();
    child
}

fn sorted_attributes(e: &Element) -> Vec<(&String, &String)> {
    let mut attributes = e.attributes.iter().collect::<Vec<_>>();
    attributes.sort();
    attributes
}

fn same_element(a: &Element, b: &Element) -> bool {
    a.name == b.name
        && a.namespace == b.namespace
        && sorted_attributes(a) == sorted_attributes(b)
        && a.children.len() == b.children.len()
        && a.children
            .iter()
            .zip(&b.children)
            .all(|(a, b)| match (a, b) {
                (XMLNode::Element(a), XMLNode::Element(b)) => same_element(a, b),
                (a, b) => a == b,
            })
}
