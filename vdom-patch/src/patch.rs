//! Reconciliation: move a live subtree from one description to the next.
//!
//! [`patch`] decides per node whether to remove it, replace it or mutate it
//! in place. In-place mutation goes through [`patch_props`] and
//! [`patch_children`]; the latter calls back into [`patch`] for every child
//! pair, so recursion depth equals description depth.

use crate::construct::{construct_with_config, join_text_children};
use crate::tracing_macros::{debug, trace};
use crate::{Document, LiveNodeId, PatchConfig, PatchError, Props, VElement, VFlags, VNode};
use std::collections::HashSet;

/// Patch `el` so it represents `new`, returning the node that now does.
///
/// `prev` is the description `el` was rendered from. When it is `None` the
/// call is top-level: the node's retained description is used as the prior
/// one, and `new` is retained afterwards. Passing `None` for `new` detaches
/// `el` from its parent and returns it.
///
/// The returned id differs from `el` when the node had to be rebuilt; `el` is
/// freed in that case.
pub fn patch(
    doc: &mut Document,
    el: LiveNodeId,
    new: Option<&VNode>,
    prev: Option<&VNode>,
) -> Result<LiveNodeId, PatchError> {
    patch_with_config(doc, el, new, prev, &PatchConfig::default())
}

/// Like [`patch`], with explicit settings.
pub fn patch_with_config(
    doc: &mut Document,
    el: LiveNodeId,
    new: Option<&VNode>,
    prev: Option<&VNode>,
    config: &PatchConfig,
) -> Result<LiveNodeId, PatchError> {
    doc.node(el)?;

    let Some(new) = new else {
        debug!(%el, "removing node");
        doc.remove(el)?;
        return Ok(el);
    };

    let top_level = prev.is_none();
    let retained = if top_level {
        doc.retained(el).cloned()
    } else {
        None
    };
    let old = prev.or(retained.as_ref());

    let result = reconcile(doc, el, new, old, config)?;

    if top_level {
        doc.retain(result, new.clone());
    }
    Ok(result)
}

fn reconcile(
    doc: &mut Document,
    el: LiveNodeId,
    new: &VNode,
    old: Option<&VNode>,
    config: &PatchConfig,
) -> Result<LiveNodeId, PatchError> {
    let new_el = match (old, new) {
        (Some(VNode::Text(_)), _) | (_, VNode::Text(_)) => {
            if old == Some(new) {
                trace!(%el, "text unchanged");
                return Ok(el);
            }
            return replace_with_vnode(doc, el, new, config);
        }
        (_, VNode::Element(new_el)) => new_el,
    };
    let old_el = old.and_then(VNode::as_element);

    if !keys_allow_diff(old_el, new_el) {
        trace!(%el, key = ?new_el.key, "equal keys, leaving node as is");
        return Ok(el);
    }

    let same_tag = old_el.is_some_and(|o| o.tag == new_el.tag);
    if !same_tag && new_el.props.is_none() && new_el.children.is_none() {
        // An empty element is cheaper to build than to clear.
        trace!(%el, tag = %new_el.tag, "tag changed to a bare element");
        return replace_with_vnode(doc, el, new, config);
    }

    let Some(old_el) = old_el else {
        trace!(%el, "no prior description, nothing to diff against");
        return Ok(el);
    };

    if doc.is_text(el)? {
        if config.strict {
            return Err(PatchError::mismatch(
                el,
                format!("described as <{}> but is a text node", old_el.tag),
            ));
        }
        debug!(%el, "text node described as an element, skipping");
        return Ok(el);
    }

    // Joined up front so a malformed child list fails before any mutation.
    let joined_text = match new_el.flag {
        VFlags::OnlyTextChildren => Some(join_text_children(
            new_el.children.as_deref().unwrap_or_default(),
            config,
        )?),
        VFlags::Normal | VFlags::NoChildren => None,
    };

    let empty = Props::new();
    patch_props(
        doc,
        el,
        old_el.props.as_ref().unwrap_or(&empty),
        new_el.props.as_ref().unwrap_or(&empty),
    )?;

    match new_el.flag {
        VFlags::NoChildren => doc.set_text_content(el, "")?,
        VFlags::OnlyTextChildren => {
            doc.set_text_content(el, joined_text.as_deref().unwrap_or_default())?
        }
        VFlags::Normal => match &new_el.children {
            Some(children) => {
                patch_children_with_config(doc, el, old_el.children.as_deref(), children, config)?
            }
            None => doc.set_text_content(el, "")?,
        },
    }

    Ok(el)
}

/// Whether an element pair goes down the diff path.
///
/// True when neither side has a key, or when the keys differ. Two equal keys
/// leave the live node alone.
fn keys_allow_diff(old: Option<&VElement>, new: &VElement) -> bool {
    let keyless = old.and_then(VElement::effective_key).is_none() && new.effective_key().is_none();
    keyless || old.and_then(|o| o.key.as_deref()) != new.key.as_deref()
}

/// Text is assigned in place; an element is built fresh and spliced in.
fn replace_with_vnode(
    doc: &mut Document,
    el: LiveNodeId,
    new: &VNode,
    config: &PatchConfig,
) -> Result<LiveNodeId, PatchError> {
    match new {
        VNode::Text(text) => {
            trace!(%el, "assigning text");
            doc.set_text_content(el, text)?;
            Ok(el)
        }
        VNode::Element(_) => {
            let replacement = construct_with_config(doc, new, false, config)?;
            debug!(%el, %replacement, "replacing node");
            doc.replace_with(el, replacement)?;
            Ok(replacement)
        }
    }
}

/// Move `el`'s properties from `old` to `new`.
///
/// A name in `old` is reassigned when `new` holds a truthy value for it and
/// removed (attribute and property) otherwise, so a falsy new value deletes
/// rather than sets. Names only in `new` are assigned as they are.
pub fn patch_props(
    doc: &mut Document,
    el: LiveNodeId,
    old: &Props,
    new: &Props,
) -> Result<(), PatchError> {
    let mut handled = HashSet::new();

    for name in old.keys() {
        match new.get(name) {
            Some(value) if value.is_truthy() => {
                doc.set_property(el, name, value.clone())?;
            }
            _ => {
                trace!(%el, name, "removing property");
                doc.remove_attribute(el, name)?;
                doc.delete_property(el, name)?;
            }
        }
        handled.insert(name.as_str());
    }

    for (name, value) in new {
        if !handled.contains(name.as_str()) {
            doc.set_property(el, name, value.clone())?;
        }
    }
    Ok(())
}

/// Reconcile `el`'s children against `new`.
///
/// Children are paired by position with `old` and patched; a position with
/// no new child is removed by [`patch`] and then freed, since nothing holds
/// its id any more. New children past the end of `old` are built and
/// appended. `old: None` counts as no prior children.
///
/// Pairing stops at the first described child with no live counterpart.
/// That happens when an equal-key patch left a subtree as it was while its
/// retained description moved on; the append step still runs.
pub fn patch_children(
    doc: &mut Document,
    el: LiveNodeId,
    old: Option<&[VNode]>,
    new: &[VNode],
) -> Result<(), PatchError> {
    patch_children_with_config(doc, el, old, new, &PatchConfig::default())
}

/// Like [`patch_children`], with explicit settings.
pub fn patch_children_with_config(
    doc: &mut Document,
    el: LiveNodeId,
    old: Option<&[VNode]>,
    new: &[VNode],
    config: &PatchConfig,
) -> Result<(), PatchError> {
    let live = doc.child_nodes(el);
    let old = old.unwrap_or_default();
    trace!(%el, old = old.len(), new = new.len(), live = live.len(), "patch_children");

    for (i, old_child) in old.iter().enumerate() {
        let Some(&child) = live.get(i) else {
            debug!(%el, index = i, "described child missing from live tree, stopping");
            break;
        };
        let new_child = new.get(i);
        patch_with_config(doc, child, new_child, Some(old_child), config)?;
        if new_child.is_none() {
            doc.free(child);
        }
    }

    for new_child in new.iter().skip(old.len()) {
        let node = construct_with_config(doc, new_child, false, config)?;
        doc.append_child(el, node)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PropValue, construct, render};
    use vdom_patch_testhelpers::test;

    fn props(pairs: &[(&str, PropValue)]) -> Props {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn key_gate() {
        let plain = VElement::new("div");
        let one = VElement::new("div").key("1");
        let two = VElement::new("div").key("2");

        assert!(keys_allow_diff(None, &plain));
        assert!(keys_allow_diff(Some(&plain), &plain));
        assert!(keys_allow_diff(Some(&one), &two));
        assert!(keys_allow_diff(Some(&plain), &one));
        assert!(keys_allow_diff(Some(&one), &plain));
        assert!(!keys_allow_diff(Some(&one), &one.clone()));
        // empty keys count as no key
        let empty = VElement::new("div").key("");
        assert!(keys_allow_diff(Some(&empty), &empty.clone()));
    }

    #[test]
    fn props_reassign_remove_and_add() {
        let mut doc = Document::new();
        let el = doc.create_element("div");
        let old = props(&[("id", "a".into()), ("title", "t".into()), ("tabIndex", 1.into())]);
        let new = props(&[("id", "b".into()), ("tabIndex", 0.into()), ("lang", "en".into())]);
        for (k, v) in &old {
            doc.set_property(el, k, v.clone()).unwrap();
        }

        patch_props(&mut doc, el, &old, &new).unwrap();

        assert_eq!(doc.property(el, "id"), Some(&PropValue::from("b")));
        assert_eq!(doc.property(el, "title"), None);
        assert_eq!(doc.attribute(el, "title"), None);
        // falsy value for a name that was present: removed, not set to 0
        assert_eq!(doc.property(el, "tabIndex"), None);
        assert_eq!(doc.attribute(el, "tabIndex"), None);
        assert_eq!(doc.property(el, "lang"), Some(&PropValue::from("en")));
    }

    #[test]
    fn falsy_new_only_prop_is_assigned() {
        let mut doc = Document::new();
        let el = doc.create_element("input");
        let new = props(&[("checked", false.into())]);
        patch_props(&mut doc, el, &Props::new(), &new).unwrap();
        assert_eq!(doc.property(el, "checked"), Some(&PropValue::Bool(false)));
    }

    #[test]
    fn no_prior_description_only_retains() {
        let mut doc = Document::new();
        let el = doc.create_element("div");
        let new: VNode = VElement::new("div").prop("id", "x").child("hi").into();

        let out = patch(&mut doc, el, Some(&new), None).unwrap();

        assert_eq!(out, el);
        assert_eq!(doc.to_html(el), "<div></div>");
        assert_eq!(doc.retained(el), Some(&new));
    }

    #[test]
    fn explicit_prev_skips_retaining() {
        let mut doc = Document::new();
        let old: VNode = VElement::new("div").prop("id", "a").into();
        let el = construct(&mut doc, &old, false).unwrap();
        let new: VNode = VElement::new("div").prop("id", "b").into();

        patch(&mut doc, el, Some(&new), Some(&old)).unwrap();

        assert_eq!(doc.attribute(el, "id"), Some("b"));
        assert_eq!(doc.retained(el), None);
    }

    #[test]
    fn normal_flag_without_children_clears() {
        let mut doc = Document::new();
        let old: VNode = VElement::new("div").prop("id", "a").child("x").into();
        let el = render(&mut doc, &old).unwrap();
        let new: VNode = VElement::new("div").prop("id", "a").into();

        patch(&mut doc, el, Some(&new), None).unwrap();

        assert_eq!(doc.to_html(el), "<div id=\"a\"></div>");
    }

    #[test]
    fn text_live_node_under_element_description() {
        let old: VNode = VElement::new("b").child("x").into();
        let new: VNode = VElement::new("b").child("y").into();

        let mut doc = Document::new();
        let t = doc.create_text("x");
        let err = patch(&mut doc, t, Some(&new), Some(&old)).unwrap_err();
        assert!(matches!(err, PatchError::LiveTreeMismatch { node, .. } if node == t));

        let mut doc = Document::new();
        let t = doc.create_text("x");
        let out = patch_with_config(&mut doc, t, Some(&new), Some(&old), &PatchConfig::lenient())
            .unwrap();
        assert_eq!(out, t);
        assert_eq!(doc.text_content(t), "x");
    }

    #[test]
    fn missing_live_children_stop_pairing() {
        let old = vec![VNode::text("a"), VNode::text("b")];
        let new = vec![VNode::text("A"), VNode::text("B"), VNode::text("C")];

        for config in [PatchConfig::default(), PatchConfig::lenient()] {
            let mut doc = Document::new();
            let ul = doc.create_element("ul");
            let a = doc.create_text("a");
            doc.append_child(ul, a).unwrap();
            patch_children_with_config(&mut doc, ul, Some(&old), &new, &config).unwrap();
            assert_eq!(doc.to_html(ul), "<ul>AC</ul>");
        }
    }

    #[test]
    fn dropped_children_are_freed() {
        let old = vec![VNode::text("a"), VNode::text("b")];
        let new = vec![VNode::text("a")];

        let mut doc = Document::new();
        let ul = doc.create_element("ul");
        let a = doc.create_text("a");
        let b = doc.create_text("b");
        doc.append_child(ul, a).unwrap();
        doc.append_child(ul, b).unwrap();

        patch_children(&mut doc, ul, Some(&old), &new).unwrap();

        assert_eq!(doc.child_nodes(ul), vec![a]);
        assert!(!doc.is_alive(b));
    }

    #[test]
    fn malformed_text_children_leave_props_alone() {
        let mut doc = Document::new();
        let old: VNode = VElement::new("p").prop("title", "a").child("x").into();
        let p = render(&mut doc, &old).unwrap();
        let bad: VNode = VElement::new("p")
            .prop("title", "b")
            .child(VElement::new("br"))
            .flag(VFlags::OnlyTextChildren)
            .into();

        let err = patch(&mut doc, p, Some(&bad), None).unwrap_err();

        assert!(matches!(err, PatchError::MalformedDescription { .. }));
        assert_eq!(doc.attribute(p, "title"), Some("a"));
        assert_eq!(doc.to_html(p), "<p title=\"a\">x</p>");
        assert_eq!(doc.retained(p), Some(&old));
    }

    #[test]
    fn stale_node_is_rejected() {
        let mut doc = Document::new();
        let el = doc.create_element("div");
        doc.free(el);
        let err = patch(&mut doc, el, Some(&VNode::text("x")), None).unwrap_err();
        assert_eq!(err, PatchError::StaleNode { node: el });
    }
}
