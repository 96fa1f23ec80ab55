//! Candidate compiler: binding pattern to anchored matcher.

use std::fmt;
use std::sync::Arc;

use regex::Regex;
use regex_syntax::hir::{Hir, Look};

use crate::binding::Construct;
use crate::descriptor::Value;
use crate::errors::{BuildErrorKind, RejectionReason};
use crate::interpreter::RawInterpreter;

/// Compile `pattern` so it only matches an entire input, and check that it
/// has exactly `arity` capture groups.
///
/// Anchors are applied to the parsed pattern, never to its source text: a
/// source with unbalanced groups cannot be "repaired" by the wrapper, and a
/// verbose-mode comment cannot swallow the closing anchor.
pub(crate) fn compile(pattern: &str, arity: usize) -> Result<Regex, BuildErrorKind> {
    let invalid = |message: String| BuildErrorKind::InvalidPattern {
        pattern: pattern.to_owned(),
        message,
    };

    let bare = Regex::new(pattern).map_err(|err| invalid(err.to_string()))?;
    let actual = bare.captures_len().saturating_sub(1);
    if actual != arity {
        return Err(BuildErrorKind::ArityMismatch {
            pattern: pattern.to_owned(),
            expected: arity,
            actual,
        });
    }

    let parsed = regex_syntax::parse(pattern).map_err(|err| invalid(err.to_string()))?;
    let anchored = Hir::concat(vec![Hir::look(Look::Start), parsed, Hir::look(Look::End)]);
    Regex::new(&anchored.to_string()).map_err(|err| invalid(err.to_string()))
}

/// Outcome of trying one candidate against one input.
pub(crate) enum Attempt {
    /// The pattern did not match; not an error.
    NoMatch,
    Rejected(RejectionReason),
    Built(Value),
}

/// A compiled binding: anchored matcher, one interpreter per capture group,
/// and the construction step.
pub(crate) struct CompiledCandidate {
    pattern: String,
    matcher: Regex,
    parameters: Vec<Arc<RawInterpreter>>,
    construct: Construct,
}

impl CompiledCandidate {
    pub fn new(
        pattern: &str,
        matcher: Regex,
        parameters: Vec<Arc<RawInterpreter>>,
        construct: Construct,
    ) -> Self {
        debug_assert_eq!(matcher.captures_len().saturating_sub(1), parameters.len());
        CompiledCandidate {
            pattern: pattern.to_owned(),
            matcher,
            parameters,
            construct,
        }
    }

    /// The pattern as declared (without anchoring).
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Match, interpret every capture, then construct. Any failure after a
    /// match abandons the whole candidate; nothing partial is kept.
    pub fn attempt(&self, input: &str) -> Attempt {
        let Some(captures) = self.matcher.captures(input) else {
            return Attempt::NoMatch;
        };

        let mut values = Vec::with_capacity(self.parameters.len());
        for (index, (parameter, group)) in self
            .parameters
            .iter()
            .zip(captures.iter().skip(1))
            .enumerate()
        {
            let Some(group) = group else {
                return Attempt::Rejected(RejectionReason::UnmatchedGroup { index });
            };
            match parameter.interpret(group.as_str()) {
                Ok(value) => values.push(value),
                Err(error) => {
                    return Attempt::Rejected(RejectionReason::Parameter {
                        index,
                        error: Box::new(error),
                    })
                }
            }
        }

        match (self.construct)(values) {
            Ok(value) => Attempt::Built(value),
            Err(failure) => Attempt::Rejected(RejectionReason::Construction(failure)),
        }
    }
}

impl fmt::Debug for CompiledCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledCandidate")
            .field("pattern", &self.pattern)
            .field("parameters", &self.parameters.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
