//! Reconciliation settings.

/// Settings for [`patch_with_config`](crate::patch_with_config) and
/// [`construct_with_config`](crate::construct_with_config).
#[derive(Debug, Clone)]
pub struct PatchConfig {
    /// Fail on precondition violations instead of skipping past them.
    ///
    /// When `false`, a non-text child under
    /// [`VFlags::OnlyTextChildren`](crate::VFlags::OnlyTextChildren) is left
    /// out of the joined text, and a live node that does not match its prior
    /// description is left untouched.
    pub strict: bool,
}

impl Default for PatchConfig {
    fn default() -> Self {
        Self { strict: true }
    }
}

impl PatchConfig {
    /// Settings that skip past precondition violations.
    pub fn lenient() -> Self {
        Self { strict: false }
    }
}
