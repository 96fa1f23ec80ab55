//! One-shot convenience functions.
//!
//! The free functions use [`Context::global`]; the methods of the same
//! names on [`Context`] use that context instead. Each call fetches the
//! cached interpreter (building it on first use) and applies it.

use crate::context::Context;
use crate::descriptor::Interpretable;
use crate::errors::{Error, InterpreterBuildingError};
use crate::interpreter::{Interpretations, Interpreter};

impl Context {
    /// Interpret `input` as a `T`.
    pub fn interpret<T: Interpretable>(&self, input: &str) -> Result<T, Error> {
        Ok(self.make_interpreter::<T>()?.interpret(input)?)
    }

    /// Interpret `input` through `pattern` bound to `T`'s primary constructor.
    pub fn interpret_with_pattern<T: Interpretable>(
        &self,
        input: &str,
        pattern: &str,
    ) -> Result<T, Error> {
        Ok(self
            .make_interpreter_with_pattern::<T>(pattern)?
            .interpret(input)?)
    }

    /// Interpret every input eagerly; the first failure aborts.
    pub fn interpret_all<T, I>(&self, inputs: I) -> Result<Vec<T>, Error>
    where
        T: Interpretable,
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        Ok(self.make_interpreter::<T>()?.interpret_all(inputs)?)
    }

    /// Interpret inputs lazily. Building the interpreter happens up front,
    /// so a build failure is reported before any input is consumed.
    pub fn interpret_each<T, I>(
        &self,
        inputs: I,
    ) -> Result<Interpretations<I::IntoIter, T>, InterpreterBuildingError>
    where
        T: Interpretable,
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        Ok(self.make_interpreter::<T>()?.interpret_each(inputs))
    }
}

/// Interpreter for `T` from the global context.
pub fn interpreter<T: Interpretable>() -> Result<Interpreter<T>, InterpreterBuildingError> {
    Context::global().make_interpreter()
}

pub fn interpreter_with_pattern<T: Interpretable>(
    pattern: &str,
) -> Result<Interpreter<T>, InterpreterBuildingError> {
    Context::global().make_interpreter_with_pattern(pattern)
}

/// Interpret `input` as a `T` using the global context.
///
/// ```
/// let answer: u32 = regula::interpret("42").unwrap();
/// assert_eq!(answer, 42);
/// assert!(regula::interpret::<u32>("forty-two").is_err());
/// ```
pub fn interpret<T: Interpretable>(input: &str) -> Result<T, Error> {
    Context::global().interpret(input)
}

pub fn interpret_with_pattern<T: Interpretable>(input: &str, pattern: &str) -> Result<T, Error> {
    Context::global().interpret_with_pattern(input, pattern)
}

pub fn interpret_all<T, I>(inputs: I) -> Result<Vec<T>, Error>
where
    T: Interpretable,
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    Context::global().interpret_all(inputs)
}

pub fn interpret_each<T, I>(
    inputs: I,
) -> Result<Interpretations<I::IntoIter, T>, InterpreterBuildingError>
where
    T: Interpretable,
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    Context::global().interpret_each(inputs)
}

/// Run `body` against `context`.
pub fn in_context<R>(context: &Context, body: impl FnOnce(&Context) -> R) -> R {
    body(context)
}

/// Run `body` against a fresh context seeded only with the scalar
/// converters.
///
/// Registrations made inside `body` are dropped with the context.
pub fn in_new_context<R>(body: impl FnOnce(&Context) -> R) -> R {
    body(&Context::new())
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
