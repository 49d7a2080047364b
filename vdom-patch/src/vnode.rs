//! Virtual nodes: in-memory descriptions of what the live tree should hold.
//!
//! A [`VNode`] never refers to a live node. It is either plain text or a
//! [`VElement`] carrying a tag, optional props, optional children, an optional
//! identity key and a [`VFlags`] hint describing the shape of its children.

use std::collections::BTreeMap;
use std::fmt;

/// Property mapping of an element, keyed by property name.
pub type Props = BTreeMap<String, PropValue>;

/// A property value as assigned onto a live element.
#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    /// A string value
    Str(String),
    /// A numeric value
    Num(f64),
    /// A boolean value
    Bool(bool),
}

impl PropValue {
    /// Whether the value counts as set.
    ///
    /// The empty string, `0`, `NaN` and `false` are falsy. The property
    /// reconciler removes a property whose new value is falsy instead of
    /// assigning it.
    pub fn is_truthy(&self) -> bool {
        match self {
            PropValue::Str(s) => !s.is_empty(),
            PropValue::Num(n) => *n != 0.0 && !n.is_nan(),
            PropValue::Bool(b) => *b,
        }
    }
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Str(s) => f.write_str(s),
            PropValue::Num(n) => write!(f, "{n}"),
            PropValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for PropValue {
    fn from(s: &str) -> Self {
        PropValue::Str(s.to_string())
    }
}

impl From<String> for PropValue {
    fn from(s: String) -> Self {
        PropValue::Str(s)
    }
}

impl From<bool> for PropValue {
    fn from(b: bool) -> Self {
        PropValue::Bool(b)
    }
}

impl From<f64> for PropValue {
    fn from(n: f64) -> Self {
        PropValue::Num(n)
    }
}

impl From<i32> for PropValue {
    fn from(n: i32) -> Self {
        PropValue::Num(f64::from(n))
    }
}

/// Shape hint for an element's children.
///
/// Lets the reconciler skip structural diffing when the children are known to
/// be empty or text-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VFlags {
    /// Children need full structural diffing.
    #[default]
    Normal,
    /// The element has no children.
    NoChildren,
    /// Every child is text; they are joined into a single text content.
    OnlyTextChildren,
}

/// An element-shaped virtual node.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VElement {
    /// Element type name, e.g. `div`
    pub tag: String,
    /// Properties; `None` is treated as empty
    pub props: Option<Props>,
    /// Ordered children; `None` means no children at all
    pub children: Option<Vec<VNode>>,
    /// Identity token compared instead of position
    pub key: Option<String>,
    /// Shape hint for `children`
    pub flag: VFlags,
}

impl VElement {
    /// An element with the given tag and nothing else.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Set a property, creating the props mapping if needed.
    pub fn prop(mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.props
            .get_or_insert_with(Props::new)
            .insert(name.into(), value.into());
        self
    }

    /// Append one child, creating the children list if needed.
    pub fn child(mut self, child: impl Into<VNode>) -> Self {
        self.children
            .get_or_insert_with(Vec::new)
            .push(child.into());
        self
    }

    /// Replace the children list.
    pub fn children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<VNode>,
    {
        self.children = Some(children.into_iter().map(Into::into).collect());
        self
    }

    /// Set the identity key.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Set the children shape hint.
    pub fn flag(mut self, flag: VFlags) -> Self {
        self.flag = flag;
        self
    }

    /// The key, if it is set and non-empty.
    pub(crate) fn effective_key(&self) -> Option<&str> {
        self.key.as_deref().filter(|k| !k.is_empty())
    }
}

/// A virtual node: plain text or an element.
#[derive(Debug, Clone, PartialEq)]
pub enum VNode {
    /// Plain text
    Text(String),
    /// An element
    Element(VElement),
}

impl VNode {
    /// Build a text node.
    pub fn text(s: impl Into<String>) -> Self {
        VNode::Text(s.into())
    }

    /// The text, if this is a text node.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            VNode::Text(s) => Some(s),
            VNode::Element(_) => None,
        }
    }

    /// The element, if this is an element node.
    pub fn as_element(&self) -> Option<&VElement> {
        match self {
            VNode::Text(_) => None,
            VNode::Element(el) => Some(el),
        }
    }
}

impl From<&str> for VNode {
    fn from(s: &str) -> Self {
        VNode::Text(s.to_string())
    }
}

impl From<String> for VNode {
    fn from(s: String) -> Self {
        VNode::Text(s)
    }
}

impl From<VElement> for VNode {
    fn from(el: VElement) -> Self {
        VNode::Element(el)
    }
}

/// Hyperscript-style constructor.
///
/// A `key` entry in `props` is lifted out into [`VElement::key`] and does not
/// end up as a property. An empty props mapping is kept as `Some`, so the
/// element still counts as having props. The flag defaults to
/// [`VFlags::Normal`]; use [`VElement::flag`] to change it.
pub fn h(tag: impl Into<String>, props: Option<Props>, children: Option<Vec<VNode>>) -> VElement {
    let mut props = props;
    let key = props
        .as_mut()
        .and_then(|p| p.remove("key"))
        .map(|k| k.to_string());
    VElement {
        tag: tag.into(),
        props,
        children,
        key,
        flag: VFlags::Normal,
    }
}

/// Join the enabled class names with single spaces.
///
/// ```
/// use vdom_patch::class_name;
/// assert_eq!(class_name(&[("btn", true), ("active", false), ("big", true)]), "btn big");
/// ```
pub fn class_name(classes: &[(&str, bool)]) -> String {
    classes
        .iter()
        .filter(|(_, enabled)| *enabled)
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render `property:value` pairs as an inline style string.
///
/// ```
/// use vdom_patch::style;
/// assert_eq!(style(&[("color", "red"), ("margin", "0")]), "color:red;margin:0");
/// ```
pub fn style(rules: &[(&str, &str)]) -> String {
    rules
        .iter()
        .map(|(prop, value)| format!("{prop}:{value}"))
        .collect::<Vec<_>>()
        .join(";")
}
