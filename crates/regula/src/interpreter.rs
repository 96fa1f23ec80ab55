//! Interpreters: immutable, ordered candidate lists for one target type.
//!
//! # Trial order
//!
//! Candidates are tried exactly in declaration order: own binding, then
//! variants in declaration order, then alternate builders in declaration
//! order. The first candidate that matches *and* fully resolves wins, even
//! when a later candidate would also accept the input. Reordering
//! declarations therefore changes which variant or builder is chosen for
//! ambiguous inputs.

use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use regex::Regex;
use regula_stack::ensure_sufficient_stack;

use crate::binding::Construct;
use crate::compile::{Attempt, CompiledCandidate};
use crate::descriptor::Value;
use crate::errors::{InterpretationError, Rejection, RejectionReason};

/// Erased terminal converter; `None` means "not a valid value".
pub(crate) type Converter = Arc<dyn Fn(&str) -> Option<Value> + Send + Sync>;

const CONVERTER_LABEL: &str = "<converter>";
const RESULT_LABEL: &str = "<result>";

pub(crate) enum Body {
    Candidates(Vec<CompiledCandidate>),
    Terminal(Converter),
    Sequence(SequenceInterpreter),
}

pub(crate) struct SequenceInterpreter {
    separator: Regex,
    item: Arc<RawInterpreter>,
    collect: Construct,
}

/// Type-erased interpreter shared through the context cache.
pub(crate) struct RawInterpreter {
    target: &'static str,
    body: Body,
}

impl RawInterpreter {
    pub fn candidates(target: &'static str, candidates: Vec<CompiledCandidate>) -> Self {
        RawInterpreter {
            target,
            body: Body::Candidates(candidates),
        }
    }

    pub fn terminal(target: &'static str, converter: Converter) -> Self {
        RawInterpreter {
            target,
            body: Body::Terminal(converter),
        }
    }

    pub fn sequence(
        target: &'static str,
        separator: Regex,
        item: Arc<RawInterpreter>,
        collect: Construct,
    ) -> Self {
        RawInterpreter {
            target,
            body: Body::Sequence(SequenceInterpreter {
                separator,
                item,
                collect,
            }),
        }
    }

    pub fn target(&self) -> &'static str {
        self.target
    }

    /// Candidate patterns in trial order; empty for converters and lists.
    pub fn patterns(&self) -> Vec<&str> {
        match &self.body {
            Body::Candidates(candidates) => {
                candidates.iter().map(CompiledCandidate::pattern).collect()
            }
            Body::Terminal(_) | Body::Sequence(_) => Vec::new(),
        }
    }

    pub fn interpret(&self, input: &str) -> Result<Value, InterpretationError> {
        ensure_sufficient_stack(|| match &self.body {
            Body::Candidates(candidates) => self.first_success(candidates, input),
            Body::Terminal(converter) => converter(input).ok_or_else(|| {
                self.failure(
                    input,
                    vec![Rejection::new(
                        CONVERTER_LABEL,
                        RejectionReason::ConverterDeclined,
                    )],
                )
            }),
            Body::Sequence(sequence) => self.collect_items(sequence, input),
        })
    }

    fn first_success(
        &self,
        candidates: &[CompiledCandidate],
        input: &str,
    ) -> Result<Value, InterpretationError> {
        let mut rejections = Vec::new();
        for candidate in candidates {
            match candidate.attempt(input) {
                Attempt::Built(value) => return Ok(value),
                Attempt::NoMatch => {}
                Attempt::Rejected(reason) => {
                    tracing::trace!(
                        ty = self.target,
                        pattern = candidate.pattern(),
                        %reason,
                        "candidate rejected"
                    );
                    rejections.push(Rejection::new(candidate.pattern(), reason));
                }
            }
        }
        Err(self.failure(input, rejections))
    }

    fn collect_items(
        &self,
        sequence: &SequenceInterpreter,
        input: &str,
    ) -> Result<Value, InterpretationError> {
        let label = || format!("items separated by `{}`", sequence.separator.as_str());

        let mut items = Vec::new();
        for (index, piece) in sequence.separator.split(input).enumerate() {
            match sequence.item.interpret(piece) {
                Ok(item) => items.push(item),
                Err(error) => {
                    let reason = RejectionReason::Item {
                        index,
                        error: Box::new(error),
                    };
                    return Err(self.failure(input, vec![Rejection::new(label(), reason)]));
                }
            }
        }

        (sequence.collect)(items).map_err(|failure| {
            self.failure(
                input,
                vec![Rejection::new(
                    label(),
                    RejectionReason::Construction(failure),
                )],
            )
        })
    }

    fn failure(&self, input: &str, rejections: Vec<Rejection>) -> InterpretationError {
        InterpretationError::new(self.target, input, rejections)
    }
}

impl fmt::Debug for RawInterpreter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body = match &self.body {
            Body::Candidates(candidates) => format!("{} candidates", candidates.len()),
            Body::Terminal(_) => "converter".to_string(),
            Body::Sequence(sequence) => format!("list of {}", sequence.item.target),
        };
        write!(f, "Interpreter({}: {body})", self.target)
    }
}

/// Interprets strings into `T`.
///
/// Cheap to clone; clones share the compiled candidates.
pub struct Interpreter<T> {
    raw: Arc<RawInterpreter>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Interpreter<T> {
    fn clone(&self) -> Self {
        Interpreter {
            raw: Arc::clone(&self.raw),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Interpreter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.raw.fmt(f)
    }
}

impl<T: 'static> Interpreter<T> {
    pub(crate) fn from_raw(raw: Arc<RawInterpreter>) -> Self {
        Interpreter {
            raw,
            _marker: PhantomData,
        }
    }

    /// Interpret the whole of `input`, or fail without any partial result.
    pub fn interpret(&self, input: &str) -> Result<T, InterpretationError> {
        let value = self.raw.interpret(input)?;
        value.downcast::<T>().map(|value| *value).map_err(|_| {
            self.raw.failure(
                input,
                vec![Rejection::new(
                    RESULT_LABEL,
                    RejectionReason::TypeConfusion {
                        expected: type_name::<T>(),
                    },
                )],
            )
        })
    }

    /// Interpret `input`, discarding the failure details.
    pub fn try_interpret(&self, input: &str) -> Option<T> {
        self.interpret(input).ok()
    }

    /// Interpret every input eagerly; the first failure aborts.
    pub fn interpret_all<I>(&self, inputs: I) -> Result<Vec<T>, InterpretationError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        inputs
            .into_iter()
            .map(|input| self.interpret(input.as_ref()))
            .collect()
    }

    /// Interpret inputs lazily, one per item pulled from the result.
    pub fn interpret_each<I>(&self, inputs: I) -> Interpretations<I::IntoIter, T>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        Interpretations {
            inputs: inputs.into_iter(),
            interpreter: self.clone(),
        }
    }

    /// Name of the target type.
    pub fn target(&self) -> &'static str {
        self.raw.target()
    }

    /// Candidate patterns in the order they are tried.
    pub fn patterns(&self) -> Vec<&str> {
        self.raw.patterns()
    }

    #[cfg(test)]
    pub(crate) fn shares_build_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.raw, &other.raw)
    }
}

/// Lazy interpretation of a sequence of strings.
///
/// Re-iterable (via `Clone`) whenever the underlying input iterator is.
pub struct Interpretations<I, T> {
    inputs: I,
    interpreter: Interpreter<T>,
}

impl<I: Clone, T> Clone for Interpretations<I, T> {
    fn clone(&self) -> Self {
        Interpretations {
            inputs: self.inputs.clone(),
            interpreter: self.interpreter.clone(),
        }
    }
}

impl<I, T> Iterator for Interpretations<I, T>
where
    I: Iterator,
    I::Item: AsRef<str>,
    T: 'static,
{
    type Item = Result<T, InterpretationError>;

    fn next(&mut self) -> Option<Self::Item> {
        let input = self.inputs.next()?;
        Some(self.interpreter.interpret(input.as_ref()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inputs.size_hint()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
