//! Document model the widgets are written against.
//!
//! A small arena DOM: element and text nodes linked by parent/children ids,
//! plus the form-control state the widgets read and write (value, checked,
//! selected, hidden, meter value) and the scroll geometry used to keep the
//! active suggestion visible.

use std::borrow::Cow;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use thiserror::Error;

/// The document as shared between a page and its widgets.
///
/// Everything runs on one thread, like a browser UI thread.
pub type SharedDocument = Rc<RefCell<Document>>;

pub type Result<T> = std::result::Result<T, DomError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    #[error("Unknown node: {0:?}")]
    UnknownNode(NodeId),
    #[error("Node is not an element: {0:?}")]
    NotAnElement(NodeId),
    #[error("Node is not attached to a parent: {0:?}")]
    Detached(NodeId),
    #[error("Cannot insert {child:?} into its own subtree")]
    Cycle { child: NodeId },
}

/// Layout numbers of an element, in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Geometry {
    pub offset_top: i32,
    pub offset_height: i32,
    pub scroll_top: i32,
    pub client_height: i32,
}

#[derive(Debug, Clone, Default)]
pub struct Element {
    pub tag_name: String,
    pub attrs: HashMap<String, String>,
    pub styles: HashMap<String, String>,
    pub value: String,
    pub checked: bool,
    pub selected: bool,
    pub hidden: bool,
    pub meter_value: f64,
    pub geometry: Geometry,
}

impl Element {
    fn new(tag_name: &str) -> Self {
        Self {
            tag_name: tag_name.to_ascii_lowercase(),
            ..Default::default()
        }
    }

    pub fn has_class(&self, class_name: &str) -> bool {
        self.attrs
            .get("class")
            .map(|classes| classes.split_whitespace().any(|c| c == class_name))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone)]
enum NodeKind {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let root = Node {
            parent: None,
            children: Vec::new(),
            kind: NodeKind::Document,
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
        }
    }

    /// Wraps the document for sharing with widgets.
    pub fn into_shared(self) -> SharedDocument {
        Rc::new(RefCell::new(self))
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id.0).ok_or(DomError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes.get_mut(id.0).ok_or(DomError::UnknownNode(id))
    }

    fn push_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            kind,
        });
        id
    }

    /// Creates a detached element.
    pub fn create_element(&mut self, tag_name: &str) -> NodeId {
        self.push_node(NodeKind::Element(Element::new(tag_name)))
    }

    /// Creates a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push_node(NodeKind::Text(text.to_string()))
    }

    /// Creates an element with attributes and appends it to `parent`.
    pub fn append_element(
        &mut self,
        parent: NodeId,
        tag_name: &str,
        attrs: &[(&str, &str)],
    ) -> Result<NodeId> {
        let id = self.create_element(tag_name);
        for (name, value) in attrs {
            self.set_attribute(id, name, value)?;
        }
        self.append_child(parent, id)?;
        Ok(id)
    }

    pub fn element(&self, id: NodeId) -> Result<&Element> {
        match &self.node(id)?.kind {
            NodeKind::Element(element) => Ok(element),
            _ => Err(DomError::NotAnElement(id)),
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Result<&mut Element> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Element(element) => Ok(element),
            _ => Err(DomError::NotAnElement(id)),
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|node| node.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.0)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    /// Child nodes that are elements.
    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|child| self.element(*child).is_ok())
            .collect()
    }

    pub fn is_descendant_of(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut cursor = self.parent(id);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    fn detach(&mut self, id: NodeId) -> Result<()> {
        if let Some(parent) = self.node(id)?.parent {
            self.node_mut(parent)?.children.retain(|child| *child != id);
            self.node_mut(id)?.parent = None;
        }
        Ok(())
    }

    fn check_insertable(&self, parent: NodeId, child: NodeId) -> Result<()> {
        self.node(child)?;
        if parent == child || self.is_descendant_of(parent, child) {
            return Err(DomError::Cycle { child });
        }
        Ok(())
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.node(parent)?;
        self.check_insertable(parent, child)?;
        self.detach(child)?;
        self.node_mut(parent)?.children.push(child);
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Inserts `node` as the next sibling of `reference`.
    pub fn insert_after(&mut self, reference: NodeId, node: NodeId) -> Result<()> {
        let parent = self.parent(reference).ok_or(DomError::Detached(reference))?;
        self.check_insertable(parent, node)?;
        self.detach(node)?;
        let siblings = &mut self.node_mut(parent)?.children;
        let position = siblings
            .iter()
            .position(|sibling| *sibling == reference)
            .ok_or(DomError::Detached(reference))?;
        siblings.insert(position + 1, node);
        self.node_mut(node)?.parent = Some(parent);
        Ok(())
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let position = siblings.iter().position(|sibling| *sibling == id)?;
        siblings.get(position + 1).copied()
    }

    pub fn clear_children(&mut self, id: NodeId) -> Result<()> {
        let old = std::mem::take(&mut self.node_mut(id)?.children);
        for child in old {
            self.node_mut(child)?.parent = None;
        }
        Ok(())
    }

    /// Descendants of `scope` in document order, `scope` excluded.
    pub fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(scope).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// First element in the document carrying `id`.
    pub fn by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.root).into_iter().find(|node| {
            self.element(*node)
                .map(|element| element.attrs.get("id").map(String::as_str) == Some(id))
                .unwrap_or(false)
        })
    }

    /// Element descendants of `scope` carrying `class_name`, in document order.
    pub fn query_class(&self, scope: NodeId, class_name: &str) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|node| {
                self.element(*node)
                    .map(|element| element.has_class(class_name))
                    .unwrap_or(false)
            })
            .collect()
    }

    pub fn first_by_class(&self, scope: NodeId, class_name: &str) -> Option<NodeId> {
        self.query_class(scope, class_name).into_iter().next()
    }

    /// Element descendants of `scope` with the given tag name.
    pub fn query_tag(&self, scope: NodeId, tag_name: &str) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|node| {
                self.element(*node)
                    .map(|element| element.tag_name.eq_ignore_ascii_case(tag_name))
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Nearest inclusive ancestor carrying `class_name`.
    pub fn closest_class(&self, id: NodeId, class_name: &str) -> Option<NodeId> {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if let Ok(element) = self.element(current) {
                if element.has_class(class_name) {
                    return Some(current);
                }
            }
            cursor = self.parent(current);
        }
        None
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)
            .ok()
            .and_then(|element| element.attrs.get(name))
            .map(String::as_str)
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<()> {
        let element = self.element_mut(id)?;
        match name {
            "value" => element.value = value.to_string(),
            "checked" => element.checked = true,
            "selected" => element.selected = true,
            "hidden" => element.hidden = true,
            _ => {}
        }
        element.attrs.insert(name.to_string(), value.to_string());
        Ok(())
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Result<()> {
        let element = self.element_mut(id)?;
        if name == "hidden" {
            element.hidden = false;
        }
        element.attrs.remove(name);
        Ok(())
    }

    /// Reads a `data-*` attribute, `key` given without the prefix.
    pub fn dataset(&self, id: NodeId, key: &str) -> Option<&str> {
        self.attribute(id, &format!("data-{key}"))
    }

    pub fn set_dataset(&mut self, id: NodeId, key: &str, value: &str) -> Result<()> {
        self.set_attribute(id, &format!("data-{key}"), value)
    }

    /// Current value of a form control.
    ///
    /// An `option` without a `value` attribute reads as its text, whitespace
    /// collapsed.
    pub fn value(&self, id: NodeId) -> Result<Cow<'_, str>> {
        let element = self.element(id)?;
        if element.tag_name == "option"
            && element.value.is_empty()
            && !element.attrs.contains_key("value")
        {
            let text = self.text_content(id);
            return Ok(Cow::Owned(text.split_whitespace().collect::<Vec<_>>().join(" ")));
        }
        Ok(Cow::Borrowed(&element.value))
    }

    pub fn set_value(&mut self, id: NodeId, value: &str) -> Result<()> {
        self.element_mut(id)?.value = value.to_string();
        Ok(())
    }

    pub fn checked(&self, id: NodeId) -> Result<bool> {
        Ok(self.element(id)?.checked)
    }

    pub fn set_checked(&mut self, id: NodeId, checked: bool) -> Result<()> {
        self.element_mut(id)?.checked = checked;
        Ok(())
    }

    pub fn selected(&self, id: NodeId) -> Result<bool> {
        Ok(self.element(id)?.selected)
    }

    pub fn set_selected(&mut self, id: NodeId, selected: bool) -> Result<()> {
        self.element_mut(id)?.selected = selected;
        Ok(())
    }

    pub fn hidden(&self, id: NodeId) -> Result<bool> {
        Ok(self.element(id)?.hidden)
    }

    pub fn set_hidden(&mut self, id: NodeId, hidden: bool) -> Result<()> {
        self.element_mut(id)?.hidden = hidden;
        Ok(())
    }

    pub fn style(&self, id: NodeId, property: &str) -> Option<&str> {
        self.element(id)
            .ok()
            .and_then(|element| element.styles.get(property))
            .map(String::as_str)
    }

    pub fn set_style(&mut self, id: NodeId, property: &str, value: &str) -> Result<()> {
        self.element_mut(id)?
            .styles
            .insert(property.to_string(), value.to_string());
        Ok(())
    }

    pub fn meter_value(&self, id: NodeId) -> Result<f64> {
        Ok(self.element(id)?.meter_value)
    }

    pub fn set_meter_value(&mut self, id: NodeId, value: f64) -> Result<()> {
        self.element_mut(id)?.meter_value = value;
        Ok(())
    }

    pub fn geometry(&self, id: NodeId) -> Result<Geometry> {
        Ok(self.element(id)?.geometry)
    }

    pub fn set_geometry(&mut self, id: NodeId, geometry: Geometry) -> Result<()> {
        self.element_mut(id)?.geometry = geometry;
        Ok(())
    }

    pub fn text_content(&self, id: NodeId) -> String {
        match self.nodes.get(id.0).map(|node| &node.kind) {
            Some(NodeKind::Text(text)) => text.clone(),
            Some(_) => self
                .children(id)
                .iter()
                .map(|child| self.text_content(*child))
                .collect(),
            None => String::new(),
        }
    }

    pub fn set_text_content(&mut self, id: NodeId, text: &str) -> Result<()> {
        self.element(id)?;
        self.clear_children(id)?;
        if !text.is_empty() {
            let node = self.create_text(text);
            self.append_child(id, node)?;
        }
        Ok(())
    }

    /// Adjusts the scroll offset of `container` so that `child` is fully visible.
    pub fn scroll_into_view(&mut self, container: NodeId, child: NodeId) -> Result<()> {
        let item = self.geometry(child)?;
        let mut panel = self.geometry(container)?;
        let top = item.offset_top;
        let bottom = top + item.offset_height;
        if top < panel.scroll_top {
            panel.scroll_top = top;
        } else if bottom > panel.scroll_top + panel.client_height {
            panel.scroll_top = bottom - panel.client_height;
        }
        self.set_geometry(container, panel)
    }

    /// Serializes the children of `id`, escaping text and attribute values.
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for child in self.children(id) {
            self.write_html(*child, &mut out);
        }
        out
    }

    fn write_html(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.nodes.get(id.0) else {
            return;
        };
        match &node.kind {
            NodeKind::Text(text) => out.push_str(&escape_html(text)),
            NodeKind::Document => out.push_str(&self.inner_html(id)),
            NodeKind::Element(element) => {
                out.push('<');
                out.push_str(&element.tag_name);
                let mut names: Vec<&String> = element.attrs.keys().collect();
                names.sort();
                for name in names {
                    out.push_str(&format!(" {}=\"{}\"", name, escape_html(&element.attrs[name])));
                }
                out.push('>');
                out.push_str(&self.inner_html(id));
                out.push_str(&format!("</{}>", element.tag_name));
            }
        }
    }
}

/// Escapes the five HTML-significant characters.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}
