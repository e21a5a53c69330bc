pub(crate) const MAX_DEPTH: usize = 64;

pub(crate) const MAX_RESOLVE_PASSES: usize = 64;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct ConfigOptions {
    /// Nesting limit applied while resolving and freezing.
    pub max_depth: usize,
    /// Upper bound on fixed-point resolution passes. Resolution also stops
    /// as soon as a pass makes no progress.
    pub max_resolve_passes: usize,
}

impl ConfigOptions {
    pub fn new(max_depth: usize, max_resolve_passes: usize) -> Self {
        Self {
            max_depth,
            max_resolve_passes,
        }
    }
}

impl Default for ConfigOptions {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
            max_resolve_passes: MAX_RESOLVE_PASSES,
        }
    }
}
