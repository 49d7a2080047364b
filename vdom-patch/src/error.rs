//! Error types for reconciliation.

use crate::dom::LiveNodeId;
use std::fmt;

/// Error returned when a patch or construction cannot proceed.
///
/// Every variant is a precondition violation: the description or the live
/// tree is not what the reconciler was told to expect. None of them is
/// recovered from internally.
#[derive(Debug, Clone, PartialEq)]
pub enum PatchError {
    /// The virtual node is internally inconsistent.
    MalformedDescription {
        /// What is wrong with it.
        reason: String,
    },

    /// The live tree diverged from the description it was supposedly rendered from.
    LiveTreeMismatch {
        /// The live node where the divergence was found.
        node: LiveNodeId,
        /// What was expected there.
        reason: String,
    },

    /// The node id refers to a node that has been freed.
    StaleNode {
        /// The freed node.
        node: LiveNodeId,
    },
}

impl PatchError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedDescription {
            reason: reason.into(),
        }
    }

    pub(crate) fn mismatch(node: LiveNodeId, reason: impl Into<String>) -> Self {
        Self::LiveTreeMismatch {
            node,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for PatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedDescription { reason } => write!(f, "malformed description: {reason}"),
            Self::LiveTreeMismatch { node, reason } => {
                write!(f, "live tree mismatch at {node}: {reason}")
            }
            Self::StaleNode { node } => write!(f, "stale node: {node} has been freed"),
        }
    }
}

impl std::error::Error for PatchError {}
