//! Stack safety for recursive interpreter building and interpretation.
//!
//! Resolving a composite type recurses once per level of type nesting, and
//! interpreting an input recurses once per nested capture group. Both paths
//! wrap their recursive step in [`ensure_sufficient_stack`] so that deeply
//! nested declarations or long list inputs never overflow the native stack.
//!
//! # Platform Support
//!
//! - **Native targets**: the `stacker` crate grows the stack on demand.
//! - **WASM targets**: passthrough (WASM manages its own stack).
//!
//! # Usage
//!
//! ```text
//! fn interpret(&self, input: &str) -> Result<Value, InterpretationError> {
//!     ensure_sufficient_stack(|| self.interpret_inner(input))
//! }
//! ```

/// Minimum stack space to keep available (100KB red zone).
const RED_ZONE: usize = 100 * 1024;

/// Stack space to allocate when growing (1MB).
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Ensure sufficient stack space is available before executing `f`.
///
/// If the remaining stack is below the red zone, a fresh segment is
/// allocated before `f` runs.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM version - just call directly.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
