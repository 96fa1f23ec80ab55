//! Constructors and pattern bindings.
//!
//! A [`Constructor`] is an ordered parameter list plus a construction
//! closure. A [`Binding`] pairs a constructor with the regular expression
//! whose capture groups feed it, left to right.
//!
//! Both are typed at declaration time and erased into [`RawConstructor`] /
//! [`RawBinding`] for the engine, which only ever sees [`Value`]s.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::arguments::Arguments;
use crate::descriptor::{TypeKey, Value};
use crate::errors::{BuildErrorKind, ConstructionFailure};

/// Erased construction step: resolved arguments in, constructed value out.
pub(crate) type Construct =
    Arc<dyn Fn(Vec<Value>) -> Result<Value, ConstructionFailure> + Send + Sync>;

/// Erased conversion of a variant's value into its sum type.
pub(crate) type Wrap = Arc<dyn Fn(Value) -> Result<Value, ConstructionFailure> + Send + Sync>;

/// Post-process `construct` with `wrap`, if any.
pub(crate) fn wrap_construct(construct: &Construct, wrap: Option<&Wrap>) -> Construct {
    let Some(wrap) = wrap else {
        return Arc::clone(construct);
    };
    let construct = Arc::clone(construct);
    let wrap = Arc::clone(wrap);
    Arc::new(move |values| construct(values).and_then(|value| wrap(value)))
}

/// Apply `inner` first, then `outer` (if any).
pub(crate) fn chain_wraps(inner: &Wrap, outer: Option<&Wrap>) -> Wrap {
    let Some(outer) = outer else {
        return Arc::clone(inner);
    };
    let inner = Arc::clone(inner);
    let outer = Arc::clone(outer);
    Arc::new(move |value| inner(value).and_then(|value| outer(value)))
}

/// One constructor parameter and its resolution options.
#[derive(Clone, Debug)]
pub(crate) struct Param {
    pub key: TypeKey,
    /// Explicit pattern for this parameter's interpreter (items, for lists).
    pub pattern: Option<String>,
    /// Separator override for list parameters.
    pub separator: Option<String>,
}

impl Param {
    fn new(key: TypeKey) -> Self {
        Param {
            key,
            pattern: None,
            separator: None,
        }
    }
}

#[derive(Clone)]
pub(crate) struct RawConstructor {
    pub params: Vec<Param>,
    pub construct: Construct,
    /// Option indices that named no parameter; reported at build time.
    pub unknown_params: Vec<usize>,
}

impl RawConstructor {
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Reject parameter options that pointed past the parameter list.
    pub fn check_options(&self) -> Result<(), BuildErrorKind> {
        match self.unknown_params.first() {
            Some(&index) => Err(BuildErrorKind::UnknownParameter {
                index,
                arity: self.arity(),
            }),
            None => Ok(()),
        }
    }

    fn param_mut(&mut self, index: usize) -> Option<&mut Param> {
        let param = self.params.get_mut(index);
        if param.is_none() {
            self.unknown_params.push(index);
        }
        param
    }
}

#[derive(Clone)]
pub(crate) struct RawBinding {
    pub pattern: String,
    pub constructor: RawConstructor,
}

/// Ordered parameter types plus a construction closure producing `T`.
///
/// Parameter types are taken from the closure's argument tuple:
///
/// ```
/// # use regula::Constructor;
/// struct Point { x: i64, y: i64 }
/// let ctor = Constructor::new(|(x, y): (i64, i64)| Point { x, y });
/// assert_eq!(ctor.arity(), 2);
/// ```
pub struct Constructor<T> {
    raw: RawConstructor,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + 'static> Constructor<T> {
    /// Constructor that always succeeds once its arguments are interpreted.
    pub fn new<A, F>(construct: F) -> Self
    where
        A: Arguments,
        F: Fn(A) -> T + Send + Sync + 'static,
    {
        Self::fallible(move |args: A| Ok(construct(args)))
    }

    /// Constructor that may refuse its interpreted arguments.
    ///
    /// A refusal abandons the candidate; the next one is tried.
    pub fn fallible<A, F>(construct: F) -> Self
    where
        A: Arguments,
        F: Fn(A) -> Result<T, ConstructionFailure> + Send + Sync + 'static,
    {
        let construct: Construct = Arc::new(move |values| {
            let args = A::take(values)?;
            construct(args).map(|value| Box::new(value) as Value)
        });
        Constructor {
            raw: RawConstructor {
                params: A::keys().into_iter().map(Param::new).collect(),
                construct,
                unknown_params: Vec::new(),
            },
            _marker: PhantomData,
        }
    }

    /// Pin parameter `index` to an explicit pattern instead of its type's
    /// declared bindings. For a list parameter the pattern applies to items.
    #[must_use]
    pub fn param_pattern(mut self, index: usize, pattern: impl Into<String>) -> Self {
        if let Some(param) = self.raw.param_mut(index) {
            param.pattern = Some(pattern.into());
        }
        self
    }

    /// Split list parameter `index` on `separator` instead of `,\s*`.
    #[must_use]
    pub fn param_separator(mut self, index: usize, separator: impl Into<String>) -> Self {
        if let Some(param) = self.raw.param_mut(index) {
            param.separator = Some(separator.into());
        }
        self
    }

    pub fn arity(&self) -> usize {
        self.raw.arity()
    }

    pub(crate) fn into_raw(self) -> RawConstructor {
        self.raw
    }
}

/// A pattern whose capture groups feed a constructor, left to right.
pub struct Binding<T> {
    pattern: String,
    constructor: Constructor<T>,
}

impl<T: Send + 'static> Binding<T> {
    pub fn new<A, F>(pattern: impl Into<String>, construct: F) -> Self
    where
        A: Arguments,
        F: Fn(A) -> T + Send + Sync + 'static,
    {
        Self::from_constructor(pattern, Constructor::new(construct))
    }

    pub fn from_constructor(pattern: impl Into<String>, constructor: Constructor<T>) -> Self {
        Binding {
            pattern: pattern.into(),
            constructor,
        }
    }

    /// See [`Constructor::param_pattern`].
    #[must_use]
    pub fn param_pattern(mut self, index: usize, pattern: impl Into<String>) -> Self {
        self.constructor = self.constructor.param_pattern(index, pattern);
        self
    }

    /// See [`Constructor::param_separator`].
    #[must_use]
    pub fn param_separator(mut self, index: usize, separator: impl Into<String>) -> Self {
        self.constructor = self.constructor.param_separator(index, separator);
        self
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub(crate) fn into_raw(self) -> RawBinding {
        RawBinding {
            pattern: self.pattern,
            constructor: self.constructor.into_raw(),
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
