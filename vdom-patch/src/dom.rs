//! The live tree that reconciliation mutates.
//!
//! [`Document`] is an arena of [`LiveNode`]s standing in for a browser DOM.
//! Elements hold live properties and serialized attributes separately:
//! assigning a property goes through [`Document::set_property`], which also
//! reflects the value into the matching attribute, the way a host element's
//! setters do.

use crate::retained::RetainedDescriptions;
use crate::{PatchError, PropValue, Props, VNode};
use indextree::{Arena, NodeId};
use std::collections::BTreeMap;
use std::fmt;

/// Handle to a node in a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LiveNodeId(NodeId);

impl fmt::Display for LiveNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Element state: tag, live properties and attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementData {
    /// Element type name
    pub tag: String,
    /// Live properties, as assigned through [`Document::set_property`]
    pub properties: Props,
    /// Serialized attributes
    pub attributes: BTreeMap<String, String>,
}

/// A rendered node.
#[derive(Debug, Clone, PartialEq)]
pub enum LiveNode {
    /// A text node
    Text(String),
    /// An element node
    Element(ElementData),
}

/// Attribute a property reflects into.
fn reflected_attribute(property: &str) -> &str {
    match property {
        "className" => "class",
        "htmlFor" => "for",
        other => other,
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// An arena-backed live tree.
#[derive(Debug, Default)]
pub struct Document {
    arena: Arena<LiveNode>,
    retained: RetainedDescriptions,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> LiveNodeId {
        LiveNodeId(self.arena.new_node(LiveNode::Text(text.into())))
    }

    /// Create a detached element with no properties and no children.
    pub fn create_element(&mut self, tag: impl Into<String>) -> LiveNodeId {
        LiveNodeId(self.arena.new_node(LiveNode::Element(ElementData {
            tag: tag.into(),
            properties: Props::new(),
            attributes: BTreeMap::new(),
        })))
    }

    /// Whether the node has not been freed.
    pub fn is_alive(&self, id: LiveNodeId) -> bool {
        !id.0.is_removed(&self.arena)
    }

    fn check(&self, id: LiveNodeId) -> Result<(), PatchError> {
        if self.is_alive(id) {
            Ok(())
        } else {
            Err(PatchError::StaleNode { node: id })
        }
    }

    /// Borrow a node.
    pub fn node(&self, id: LiveNodeId) -> Result<&LiveNode, PatchError> {
        self.check(id)?;
        Ok(self.arena[id.0].get())
    }

    fn node_mut(&mut self, id: LiveNodeId) -> Result<&mut LiveNode, PatchError> {
        self.check(id)?;
        Ok(self.arena[id.0].get_mut())
    }

    fn element_mut(&mut self, id: LiveNodeId) -> Result<&mut ElementData, PatchError> {
        match self.node_mut(id)? {
            LiveNode::Element(data) => Ok(data),
            LiveNode::Text(_) => Err(PatchError::mismatch(id, "expected an element, found text")),
        }
    }

    /// Whether the node is a text node.
    pub fn is_text(&self, id: LiveNodeId) -> Result<bool, PatchError> {
        Ok(matches!(self.node(id)?, LiveNode::Text(_)))
    }

    /// The tag of an element, `None` for text or freed nodes.
    pub fn tag(&self, id: LiveNodeId) -> Option<&str> {
        match self.node(id).ok()? {
            LiveNode::Element(data) => Some(&data.tag),
            LiveNode::Text(_) => None,
        }
    }

    /// The parent, if the node is attached.
    pub fn parent(&self, id: LiveNodeId) -> Option<LiveNodeId> {
        if !self.is_alive(id) {
            return None;
        }
        self.arena[id.0].parent().map(LiveNodeId)
    }

    /// Snapshot of the node's children, in order.
    pub fn child_nodes(&self, id: LiveNodeId) -> Vec<LiveNodeId> {
        if !self.is_alive(id) {
            return Vec::new();
        }
        id.0.children(&self.arena).map(LiveNodeId).collect()
    }

    /// Append `child` as the last child of `parent`, detaching it first.
    pub fn append_child(&mut self, parent: LiveNodeId, child: LiveNodeId) -> Result<(), PatchError> {
        self.element_mut(parent)?;
        self.check(child)?;
        child.0.detach(&mut self.arena);
        parent
            .0
            .checked_append(child.0, &mut self.arena)
            .map_err(|e| PatchError::mismatch(parent, format!("cannot append {child}: {e}")))
    }

    /// Detach a node from its parent.
    ///
    /// The node stays alive and keeps its subtree and retained description;
    /// it can be appended again or released with [`Document::free`].
    /// Detaching a node that has no parent does nothing.
    pub fn remove(&mut self, id: LiveNodeId) -> Result<(), PatchError> {
        self.check(id)?;
        id.0.detach(&mut self.arena);
        Ok(())
    }

    /// Detach and drop a node with its whole subtree, including retained
    /// descriptions. Freeing an already freed node does nothing.
    pub fn free(&mut self, id: LiveNodeId) {
        if !self.is_alive(id) {
            return;
        }
        let subtree: Vec<NodeId> = id.0.descendants(&self.arena).collect();
        self.retained.forget(subtree);
        id.0.remove_subtree(&mut self.arena);
    }

    /// Put `new` where `old` is and free `old`.
    ///
    /// If `old` has no parent there is nothing to splice into; `old` is freed
    /// and `new` stays detached.
    pub fn replace_with(&mut self, old: LiveNodeId, new: LiveNodeId) -> Result<(), PatchError> {
        self.check(old)?;
        self.check(new)?;
        if old == new {
            return Ok(());
        }
        new.0.detach(&mut self.arena);
        if self.parent(old).is_some() {
            old.0
                .checked_insert_before(new.0, &mut self.arena)
                .map_err(|e| PatchError::mismatch(old, format!("cannot splice {new}: {e}")))?;
        }
        self.free(old);
        Ok(())
    }

    /// Replace the text of a text node, or all children of an element.
    ///
    /// For elements, an empty string leaves no children at all.
    pub fn set_text_content(&mut self, id: LiveNodeId, text: &str) -> Result<(), PatchError> {
        if let LiveNode::Text(s) = self.node_mut(id)? {
            *s = text.to_string();
            return Ok(());
        }
        for child in self.child_nodes(id) {
            self.free(child);
        }
        if !text.is_empty() {
            let node = self.create_text(text);
            self.append_child(id, node)?;
        }
        Ok(())
    }

    /// Concatenated text of the node and all its descendants.
    pub fn text_content(&self, id: LiveNodeId) -> String {
        if !self.is_alive(id) {
            return String::new();
        }
        id.0.descendants(&self.arena)
            .filter_map(|n| match self.arena[n].get() {
                LiveNode::Text(s) => Some(s.as_str()),
                LiveNode::Element(_) => None,
            })
            .collect()
    }

    /// Assign a live property and reflect it into the matching attribute.
    ///
    /// `className` reflects to `class` and `htmlFor` to `for`. `true` reflects
    /// as an empty attribute, `false` removes it.
    pub fn set_property(
        &mut self,
        id: LiveNodeId,
        name: &str,
        value: PropValue,
    ) -> Result<(), PatchError> {
        let data = self.element_mut(id)?;
        let attr = reflected_attribute(name).to_string();
        match &value {
            PropValue::Bool(false) => {
                data.attributes.remove(&attr);
            }
            PropValue::Bool(true) => {
                data.attributes.insert(attr, String::new());
            }
            other => {
                data.attributes.insert(attr, other.to_string());
            }
        }
        data.properties.insert(name.to_string(), value);
        Ok(())
    }

    /// Delete a live property together with its reflected attribute.
    pub fn delete_property(&mut self, id: LiveNodeId, name: &str) -> Result<(), PatchError> {
        let data = self.element_mut(id)?;
        if data.properties.remove(name).is_some() {
            data.attributes.remove(reflected_attribute(name));
        }
        Ok(())
    }

    /// Remove an attribute by its literal name.
    pub fn remove_attribute(&mut self, id: LiveNodeId, name: &str) -> Result<(), PatchError> {
        self.element_mut(id)?.attributes.remove(name);
        Ok(())
    }

    /// A live property of an element.
    pub fn property(&self, id: LiveNodeId, name: &str) -> Option<&PropValue> {
        self.properties(id)?.get(name)
    }

    /// All live properties of an element.
    pub fn properties(&self, id: LiveNodeId) -> Option<&Props> {
        match self.node(id).ok()? {
            LiveNode::Element(data) => Some(&data.properties),
            LiveNode::Text(_) => None,
        }
    }

    /// An attribute of an element.
    pub fn attribute(&self, id: LiveNodeId, name: &str) -> Option<&str> {
        match self.node(id).ok()? {
            LiveNode::Element(data) => data.attributes.get(name).map(String::as_str),
            LiveNode::Text(_) => None,
        }
    }

    /// The description this node was last rendered from, if any.
    pub fn retained(&self, id: LiveNodeId) -> Option<&VNode> {
        self.retained.get(id.0)
    }

    /// Remember `vnode` as the description this node was rendered from.
    pub fn retain(&mut self, id: LiveNodeId, vnode: VNode) {
        if self.is_alive(id) {
            self.retained.insert(id.0, vnode);
        }
    }

    /// Number of nodes that carry a retained description.
    pub fn retained_count(&self) -> usize {
        self.retained.len()
    }

    /// Serialize a subtree as HTML, attributes sorted by name.
    pub fn to_html(&self, id: LiveNodeId) -> String {
        let mut out = String::new();
        if self.is_alive(id) {
            self.write_html(id.0, &mut out);
        }
        out
    }

    fn write_html(&self, id: NodeId, out: &mut String) {
        match self.arena[id].get() {
            LiveNode::Text(s) => out.push_str(&html_escape(s)),
            LiveNode::Element(data) => {
                out.push('<');
                out.push_str(&data.tag);
                for (k, v) in &data.attributes {
                    out.push(' ');
                    out.push_str(k);
                    out.push_str("=\"");
                    out.push_str(&html_escape(v));
                    out.push('"');
                }
                out.push('>');
                for child in id.children(&self.arena) {
                    self.write_html(child, out);
                }
                out.push_str("</");
                out.push_str(&data.tag);
                out.push('>');
            }
        }
    }
}
