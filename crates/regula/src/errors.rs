//! Error types for the two failure phases.
//!
//! Building an interpreter and running one fail in disjoint ways:
//!
//! - [`InterpreterBuildingError`] is raised by `Context::make_interpreter`
//!   when the declarations themselves cannot work (no binding, arity
//!   mismatch, invalid regex, cycles). It carries the chain of types that
//!   was being resolved, outermost first.
//! - [`InterpretationError`] is raised by `Interpreter::interpret` when a
//!   particular input is not accepted by any candidate. It lists the
//!   candidates that matched the input but were rejected downstream.
//!
//! [`ConstructionFailure`] is the typed failure of a single construction
//! step; it never escapes on its own but is recorded as a rejection.

use std::fmt;

use thiserror::Error;

/// Failure of a construction step invoked with already-interpreted arguments.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConstructionFailure {
    #[error("expected {expected} arguments, got {actual}")]
    Arity { expected: usize, actual: usize },
    #[error("argument {index} is missing")]
    MissingArgument { index: usize },
    #[error("argument {index} is not a `{expected}`")]
    ArgumentType {
        index: usize,
        expected: &'static str,
    },
    /// Raised by user construction closures that refuse their arguments.
    #[error("{0}")]
    Rejected(String),
}

impl ConstructionFailure {
    /// Reject the arguments with a message.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }
}

/// Typed category of a build-time failure.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BuildErrorKind {
    #[error(
        "no pattern binding or converter for `{type_name}`: declare a pattern, \
         an alternate builder or variants, or register a converter"
    )]
    NoBinding { type_name: &'static str },

    #[error("no variant of sum type `{type_name}` declares a pattern binding")]
    EmptySumType { type_name: &'static str },

    #[error("`{type_name}` has no constructor to bind a pattern to")]
    NoConstructor { type_name: &'static str },

    #[error(
        "pattern `{pattern}` has {actual} capture groups, \
         but its constructor takes {expected} parameters"
    )]
    ArityMismatch {
        pattern: String,
        expected: usize,
        actual: usize,
    },

    #[error("invalid pattern `{pattern}`: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("invalid separator `{separator}`: {message}")]
    InvalidSeparator { separator: String, message: String },

    #[error("separator `{separator}` given for `{type_name}`, which is not a list type")]
    UnexpectedSeparator {
        type_name: &'static str,
        separator: String,
    },

    #[error("parameter option names index {index}, but the constructor takes {arity} parameters")]
    UnknownParameter { index: usize, arity: usize },

    #[error("`{type_name}` is reachable from itself")]
    CyclicType { type_name: &'static str },
}

/// Build-time failure, raised only by interpreter construction.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("cannot build interpreter for {}: {kind}", TypeChain(.chain))]
pub struct InterpreterBuildingError {
    chain: Vec<&'static str>,
    kind: BuildErrorKind,
}

impl InterpreterBuildingError {
    /// Create an error raised while building `type_name`.
    pub fn new(type_name: &'static str, kind: BuildErrorKind) -> Self {
        Self {
            chain: vec![type_name],
            kind,
        }
    }

    /// Record that the failure happened while resolving a part of `outer`.
    #[must_use]
    pub fn within(mut self, outer: &'static str) -> Self {
        self.chain.insert(0, outer);
        self
    }

    /// Types being resolved when the failure happened, outermost first.
    pub fn chain(&self) -> &[&'static str] {
        &self.chain
    }

    /// The type whose interpreter was requested.
    pub fn target(&self) -> &'static str {
        self.chain.first().copied().unwrap_or_default()
    }

    pub fn kind(&self) -> &BuildErrorKind {
        &self.kind
    }
}

struct TypeChain<'a>(&'a [&'static str]);

impl fmt::Display for TypeChain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, name) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "`{name}`")?;
        }
        Ok(())
    }
}

/// Why a candidate that matched the input still failed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RejectionReason {
    #[error("parameter {index} rejected: {error}")]
    Parameter {
        index: usize,
        error: Box<InterpretationError>,
    },
    #[error("capture group {index} did not participate in the match")]
    UnmatchedGroup { index: usize },
    #[error("construction failed: {0}")]
    Construction(ConstructionFailure),
    #[error("converter declined the input")]
    ConverterDeclined,
    #[error("item {index} rejected: {error}")]
    Item {
        index: usize,
        error: Box<InterpretationError>,
    },
    #[error("interpreted value is not a `{expected}`")]
    TypeConfusion { expected: &'static str },
}

/// One rejected candidate, named by its pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rejection {
    pub candidate: String,
    pub reason: RejectionReason,
}

impl Rejection {
    pub fn new(candidate: impl Into<String>, reason: RejectionReason) -> Self {
        Self {
            candidate: candidate.into(),
            reason,
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.candidate, self.reason)
    }
}

/// Parse-time failure, raised only by interpretation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unable to interpret {input:?} as `{target}`{}", Rejections(.rejections))]
pub struct InterpretationError {
    target: &'static str,
    input: String,
    rejections: Vec<Rejection>,
}

impl InterpretationError {
    pub fn new(target: &'static str, input: impl Into<String>, rejections: Vec<Rejection>) -> Self {
        Self {
            target,
            input: input.into(),
            rejections,
        }
    }

    pub fn target(&self) -> &'static str {
        self.target
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Candidates that matched the input but failed downstream, in trial order.
    ///
    /// Empty when no candidate pattern matched at all.
    pub fn rejections(&self) -> &[Rejection] {
        &self.rejections
    }
}

struct Rejections<'a>(&'a [Rejection]);

impl fmt::Display for Rejections<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str(": no candidate matched");
        }
        f.write_str(": ")?;
        for (i, rejection) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{rejection}")?;
        }
        Ok(())
    }
}

/// Either phase's failure, for the one-shot convenience functions.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Build(#[from] InterpreterBuildingError),
    #[error(transparent)]
    Interpretation(#[from] InterpretationError),
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
