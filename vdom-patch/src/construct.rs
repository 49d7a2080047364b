//! Building live subtrees from scratch.

use crate::tracing_macros::trace;
use crate::{Document, LiveNodeId, PatchConfig, PatchError, VElement, VFlags, VNode};

/// Build a new, detached live subtree for `vnode`.
///
/// Children are built recursively and appended in order. Only the root gets a
/// retained description, and only if `attach_retained` is set: interior nodes
/// created here are patched through their parent, never on their own.
pub fn construct(
    doc: &mut Document,
    vnode: &VNode,
    attach_retained: bool,
) -> Result<LiveNodeId, PatchError> {
    construct_with_config(doc, vnode, attach_retained, &PatchConfig::default())
}

/// Like [`construct`], with explicit settings.
pub fn construct_with_config(
    doc: &mut Document,
    vnode: &VNode,
    attach_retained: bool,
    config: &PatchConfig,
) -> Result<LiveNodeId, PatchError> {
    let id = match vnode {
        VNode::Text(text) => doc.create_text(text.as_str()),
        VNode::Element(velement) => {
            let id = doc.create_element(velement.tag.as_str());
            if let Err(e) = fill_element(doc, id, velement, config) {
                doc.free(id);
                return Err(e);
            }
            id
        }
    };
    trace!(%id, attach_retained, "constructed");
    if attach_retained {
        doc.retain(id, vnode.clone());
    }
    Ok(id)
}

/// Build a top-level subtree: [`construct`] with a retained description.
pub fn render(doc: &mut Document, vnode: &VNode) -> Result<LiveNodeId, PatchError> {
    construct(doc, vnode, true)
}

fn fill_element(
    doc: &mut Document,
    id: LiveNodeId,
    velement: &VElement,
    config: &PatchConfig,
) -> Result<(), PatchError> {
    if let Some(props) = &velement.props {
        for (name, value) in props {
            doc.set_property(id, name, value.clone())?;
        }
    }

    let Some(children) = &velement.children else {
        return Ok(());
    };
    match velement.flag {
        VFlags::NoChildren => {}
        VFlags::OnlyTextChildren => {
            let text = join_text_children(children, config)?;
            doc.set_text_content(id, &text)?;
        }
        VFlags::Normal => {
            for child in children {
                let node = construct_with_config(doc, child, false, config)?;
                doc.append_child(id, node)?;
            }
        }
    }
    Ok(())
}

/// Concatenate text children with no separator.
///
/// An element child is a malformed description; lenient settings leave it out.
pub(crate) fn join_text_children(
    children: &[VNode],
    config: &PatchConfig,
) -> Result<String, PatchError> {
    let mut out = String::new();
    for (index, child) in children.iter().enumerate() {
        match child {
            VNode::Text(s) => out.push_str(s),
            VNode::Element(el) if config.strict => {
                return Err(PatchError::malformed(format!(
                    "child {index} is a <{}> element under OnlyTextChildren",
                    el.tag
                )));
            }
            VNode::Element(_) => {
                trace!(index, "skipping element child under OnlyTextChildren");
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VElement;
    use vdom_patch_testhelpers::test;

    #[test]
    fn builds_nested_tree() {
        let mut doc = Document::new();
        let vnode: VNode = VElement::new("ul")
            .prop("className", "list")
            .child(VElement::new("li").child("one"))
            .child(VElement::new("li").child("two"))
            .into();
        let root = render(&mut doc, &vnode).unwrap();
        assert_eq!(
            doc.to_html(root),
            "<ul class=\"list\"><li>one</li><li>two</li></ul>"
        );
        assert_eq!(doc.retained(root), Some(&vnode));
        // only the root carries a retained description
        assert_eq!(doc.retained_count(), 1);
    }

    #[test]
    fn without_attach_nothing_is_retained() {
        let mut doc = Document::new();
        let id = construct(&mut doc, &VNode::text("hi"), false).unwrap();
        assert_eq!(doc.text_content(id), "hi");
        assert_eq!(doc.retained(id), None);
    }

    #[test]
    fn only_text_children_join_into_one_text_node() {
        let mut doc = Document::new();
        let vnode: VNode = VElement::new("p")
            .children(["a", "b", "c"])
            .flag(VFlags::OnlyTextChildren)
            .into();
        let p = render(&mut doc, &vnode).unwrap();
        assert_eq!(doc.child_nodes(p).len(), 1);
        assert_eq!(doc.to_html(p), "<p>abc</p>");
    }

    #[test]
    fn no_children_flag_wins_over_present_children() {
        let mut doc = Document::new();
        let vnode: VNode = VElement::new("div")
            .child("ignored")
            .flag(VFlags::NoChildren)
            .into();
        let div = render(&mut doc, &vnode).unwrap();
        assert!(doc.child_nodes(div).is_empty());
    }

    #[test]
    fn element_under_only_text_children() {
        let vnode: VNode = VElement::new("p")
            .child("a")
            .child(VElement::new("b"))
            .child("c")
            .flag(VFlags::OnlyTextChildren)
            .into();

        let mut doc = Document::new();
        let err = render(&mut doc, &vnode).unwrap_err();
        assert!(matches!(err, PatchError::MalformedDescription { .. }));

        let mut doc = Document::new();
        let p = construct_with_config(&mut doc, &vnode, true, &PatchConfig::lenient()).unwrap();
        assert_eq!(doc.to_html(p), "<p>ac</p>");
    }
}
