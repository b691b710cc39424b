//! Compiler configuration.

/// Options controlling how trees are lowered into closures.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CompileOptions {
    /// Evaluate constant-only binary subtrees once, at compile time.
    ///
    /// A fold that would fail (e.g. `1 / 0`) is left in place, so the error
    /// still surfaces from `invoke`.
    pub fold_constants: bool,
}

impl CompileOptions {
    pub const fn new() -> Self {
        CompileOptions {
            fold_constants: true,
        }
    }

    #[must_use]
    pub const fn with_constant_folding(mut self, enabled: bool) -> Self {
        self.fold_constants = enabled;
        self
    }
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self::new()
    }
}
