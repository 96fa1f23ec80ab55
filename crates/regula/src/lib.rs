//! Regula - interpret strings into typed values through regular expressions.
//!
//! Types declare, through [`Interpretable::describe`], the patterns that
//! produce them: capture groups map left to right onto constructor
//! parameters, and every parameter is itself interpreted recursively. A
//! [`Context`] builds (and caches) one [`Interpreter`] per type from those
//! declarations.
//!
//! # Architecture
//!
//! - `descriptor`: `Interpretable`, `TypeDescriptor` and erased type keys
//! - `binding`: constructors and pattern bindings
//! - `resolve`: descriptor to ordered candidate list, recursing into
//!   parameter types through the context
//! - `compile`: anchored regex plus arity check per candidate
//! - `interpreter`: ordered first-match-wins trial of candidates
//! - `context`: interpreter cache and terminal converters
//! - `interpretation`: one-shot convenience functions
//!
//! Failures are split by phase: [`InterpreterBuildingError`] only from
//! building an interpreter, [`InterpretationError`] only from running one.

mod arguments;
mod binding;
mod compile;
mod context;
mod descriptor;
pub mod errors;
mod interpretation;
mod interpreter;
mod resolve;
mod scalars;

use std::sync::Once;

pub use arguments::Arguments;
pub use binding::{Binding, Constructor};
pub use context::{Context, ContextBuilder};
pub use descriptor::{Interpretable, TypeDescriptor, TypeKey, Value, DEFAULT_SEPARATOR};
pub use errors::{
    BuildErrorKind, ConstructionFailure, Error, InterpretationError, InterpreterBuildingError,
    Rejection, RejectionReason,
};
pub use interpretation::{
    in_context, in_new_context, interpret, interpret_all, interpret_each, interpret_with_pattern,
    interpreter, interpreter_with_pattern,
};
pub use interpreter::{Interpretations, Interpreter};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debugging interpreter builds and rejections.
///
/// Safe to call multiple times. Enable with `RUST_LOG=regula=debug` (builds,
/// cache, converters) or `RUST_LOG=regula=trace` (candidate rejections).
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
