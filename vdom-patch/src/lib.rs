//! Virtual DOM reconciliation.
//!
//! Given the description a live tree was rendered from and a new description,
//! [`patch`] applies the mutations needed to bring the live tree in line with
//! the new one, keeping every node it can instead of rebuilding it.
//!
//! - [`VNode`] / [`VElement`] describe what should exist.
//! - [`Document`] holds the live nodes being mutated.
//! - [`construct`] builds a subtree from scratch, [`patch`] reconciles one.
//!
//! ```
//! use vdom_patch::{Document, VElement, VNode, patch, render};
//!
//! let mut doc = Document::new();
//! let v1: VNode = VElement::new("p").prop("id", "greeting").child("hello").into();
//! let el = render(&mut doc, &v1)?;
//!
//! let v2: VNode = VElement::new("p").prop("id", "greeting").child("world").into();
//! let el = patch(&mut doc, el, Some(&v2), None)?;
//! assert_eq!(doc.to_html(el), "<p id=\"greeting\">world</p>");
//! # Ok::<(), vdom_patch::PatchError>(())
//! ```
//!
//! Enable the `tracing` feature to get a `trace`-level event for every
//! reconciliation decision.

#![deny(missing_docs, rustdoc::broken_intra_doc_links)]

mod config;
mod construct;
mod dom;
mod error;
mod patch;
mod retained;
mod tracing_macros;
mod vnode;

pub use config::PatchConfig;
pub use construct::{construct, construct_with_config, render};
pub use dom::{Document, ElementData, LiveNode, LiveNodeId};
pub use error::PatchError;
pub use patch::{
    patch, patch_children, patch_children_with_config, patch_props, patch_with_config,
};
pub use vnode::{PropValue, Props, VElement, VFlags, VNode, class_name, h, style};
