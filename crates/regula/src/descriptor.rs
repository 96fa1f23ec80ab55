//! Type descriptors: what a type declares about how it can be interpreted.
//!
//! A type opts in by implementing [`Interpretable`] and returning a
//! [`TypeDescriptor`] that lists, in declaration order:
//!
//! 1. its own binding (a pattern plus its primary constructor),
//! 2. its variants, if it is a closed sum type,
//! 3. any alternate builder bindings.
//!
//! The engine only ever queries descriptors; it never looks inside the
//! described type.
//!
//! # Example
//!
//! ```
//! use regula::{Context, Interpretable, TypeDescriptor};
//!
//! #[derive(Debug, PartialEq)]
//! struct Point {
//!     x: i64,
//!     y: i64,
//! }
//!
//! impl Interpretable for Point {
//!     fn describe() -> TypeDescriptor<Self> {
//!         TypeDescriptor::new()
//!             .constructor(|(x, y): (i64, i64)| Point { x, y })
//!             .pattern(r"x=(-?\d+),y=(-?\d+)")
//!     }
//! }
//!
//! let point = Context::new().interpret::<Point>("x=-5,y=23").unwrap();
//! assert_eq!(point, Point { x: -5, y: 23 });
//! ```

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

use regex::RegexSet;

use crate::arguments::Arguments;
use crate::binding::{Binding, Construct, Constructor, RawBinding, RawConstructor, Wrap};
use crate::errors::ConstructionFailure;

/// A type-erased interpreted value.
pub type Value = Box<dyn Any + Send>;

/// Separator used for list parameters without an explicit one.
pub const DEFAULT_SEPARATOR: &str = r",\s*";

/// A type that exposes its pattern bindings.
///
/// The default descriptor is opaque: the type can then only be interpreted
/// through a converter registered on the `Context`.
pub trait Interpretable: Sized + Send + 'static {
    fn describe() -> TypeDescriptor<Self> {
        TypeDescriptor::opaque()
    }
}

/// Identity of an interpretable type, plus the way to reach its descriptor.
///
/// Equality and hashing use the `TypeId` only.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
    describe: fn() -> RawDescriptor,
}

impl TypeKey {
    pub fn of<T: Interpretable>() -> Self {
        TypeKey {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            describe: raw_descriptor::<T>,
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn describe(&self) -> RawDescriptor {
        (self.describe)()
    }
}

fn raw_descriptor<T: Interpretable>() -> RawDescriptor {
    T::describe().into_raw()
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.name)
    }
}

/// A variant of a sum type: the variant's own type and how to lift its
/// values into the sum type.
#[derive(Clone)]
pub(crate) struct RawVariant {
    pub key: TypeKey,
    pub wrap: Wrap,
}

/// How a list type is split and collected.
#[derive(Clone)]
pub(crate) struct SequenceShape {
    pub item: TypeKey,
    pub collect: Construct,
}

/// Erased descriptor, as consumed by the resolver.
#[derive(Clone)]
pub(crate) struct RawDescriptor {
    pub name: &'static str,
    pub pattern: Option<String>,
    pub constructor: Option<RawConstructor>,
    pub variants: Vec<RawVariant>,
    pub alternates: Vec<RawBinding>,
    pub sequence: Option<SequenceShape>,
}

impl RawDescriptor {
    /// Own binding: the declared pattern over the primary constructor.
    pub fn own_binding(&self) -> Option<(&str, &RawConstructor)> {
        Some((self.pattern.as_deref()?, self.constructor.as_ref()?))
    }

    pub fn is_sum_type(&self) -> bool {
        !self.variants.is_empty()
    }
}

/// Declarative description of how to interpret a `T`.
pub struct TypeDescriptor<T> {
    raw: RawDescriptor,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + 'static> TypeDescriptor<T> {
    /// A descriptor with nothing declared yet.
    pub fn new() -> Self {
        TypeDescriptor {
            raw: RawDescriptor {
                name: type_name::<T>(),
                pattern: None,
                constructor: None,
                variants: Vec::new(),
                alternates: Vec::new(),
                sequence: None,
            },
            _marker: PhantomData,
        }
    }

    /// A descriptor declaring no bindings: only converters can produce a `T`.
    pub fn opaque() -> Self {
        Self::new()
    }

    /// Set the primary constructor.
    #[must_use]
    pub fn constructor<A, F>(self, construct: F) -> Self
    where
        A: Arguments,
        F: Fn(A) -> T + Send + Sync + 'static,
    {
        self.constructor_from(Constructor::new(construct))
    }

    /// Set a primary constructor that may refuse its arguments.
    #[must_use]
    pub fn fallible_constructor<A, F>(self, construct: F) -> Self
    where
        A: Arguments,
        F: Fn(A) -> Result<T, ConstructionFailure> + Send + Sync + 'static,
    {
        self.constructor_from(Constructor::fallible(construct))
    }

    /// Set the primary constructor, with per-parameter options.
    #[must_use]
    pub fn constructor_from(mut self, constructor: Constructor<T>) -> Self {
        self.raw.constructor = Some(constructor.into_raw());
        self
    }

    /// Bind `pattern` to the primary constructor (the type's own binding).
    #[must_use]
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.raw.pattern = Some(pattern.into());
        self
    }

    /// Append a variant of this sum type.
    ///
    /// `V`'s candidates are tried after the own binding and after all
    /// variants added earlier.
    #[must_use]
    pub fn variant<V, F>(mut self, into: F) -> Self
    where
        V: Interpretable,
        F: Fn(V) -> T + Send + Sync + 'static,
    {
        let wrap: Wrap = Arc::new(move |value: Value| {
            value
                .downcast::<V>()
                .map(|variant| Box::new(into(*variant)) as Value)
                .map_err(|_| ConstructionFailure::ArgumentType {
                    index: 0,
                    expected: type_name::<V>(),
                })
        });
        self.raw.variants.push(RawVariant {
            key: TypeKey::of::<V>(),
            wrap,
        });
        self
    }

    /// Append an alternate builder binding.
    #[must_use]
    pub fn alternate<A, F>(self, pattern: impl Into<String>, construct: F) -> Self
    where
        A: Arguments,
        F: Fn(A) -> T + Send + Sync + 'static,
    {
        self.alternate_binding(Binding::new(pattern, construct))
    }

    /// Append an alternate builder binding, with per-parameter options.
    #[must_use]
    pub fn alternate_binding(mut self, binding: Binding<T>) -> Self {
        self.raw.alternates.push(binding.into_raw());
        self
    }

    /// Describe a keyword type: the input is matched case-insensitively
    /// against `words` and the paired value is returned.
    ///
    /// The generated pattern can be replaced with [`TypeDescriptor::pattern`];
    /// it must keep exactly one capture group.
    pub fn keywords<W, I>(words: I) -> Self
    where
        W: Into<String>,
        I: IntoIterator<Item = (W, T)>,
        T: Clone + Sync,
    {
        let (alternatives, values): (Vec<String>, Vec<T>) = words
            .into_iter()
            .map(|(word, value)| {
                let word: String = word.into();
                (regex::escape(&word), value)
            })
            .unzip();
        let pattern = format!("(?i)({})", alternatives.join("|"));
        // One whole-input matcher per word, so the constructor folds case
        // exactly as the pattern does.
        let matchers =
            RegexSet::new(alternatives.iter().map(|word| format!(r"(?i)\A(?:{word})\z")));

        Self::new()
            .fallible_constructor(move |(input,): (String,)| {
                let matchers = matchers
                    .as_ref()
                    .map_err(|err| ConstructionFailure::rejected(err.to_string()))?;
                matchers
                    .matches(&input)
                    .into_iter()
                    .next()
                    .and_then(|index| values.get(index))
                    .cloned()
                    .ok_or_else(|| {
                        ConstructionFailure::rejected(format!(
                            "`{input}` is not a keyword of `{}`",
                            type_name::<T>()
                        ))
                    })
            })
            .pattern(pattern)
    }

    /// Describe a list type whose items are `I`.
    ///
    /// The input is split on the separator (`,\s*` unless a parameter
    /// overrides it) and every piece must interpret as an `I`.
    pub fn sequence<I>() -> Self
    where
        I: Interpretable,
        T: FromIterator<I>,
    {
        let collect: Construct = Arc::new(|values: Vec<Value>| {
            values
                .into_iter()
                .enumerate()
                .map(|(index, value)| {
                    value.downcast::<I>().map(|item| *item).map_err(|_| {
                        ConstructionFailure::ArgumentType {
                            index,
                            expected: type_name::<I>(),
                        }
                    })
                })
                .collect::<Result<T, _>>()
                .map(|collected| Box::new(collected) as Value)
        });
        let mut descriptor = Self::new();
        descriptor.raw.sequence = Some(SequenceShape {
            item: TypeKey::of::<I>(),
            collect,
        });
        descriptor
    }

    /// True if nothing is declared: interpretation needs a converter.
    pub fn is_opaque(&self) -> bool {
        self.raw.pattern.is_none()
            && self.raw.variants.is_empty()
            && self.raw.alternates.is_empty()
            && self.raw.sequence.is_none()
    }

    pub fn own_pattern(&self) -> Option<&str> {
        self.raw.pattern.as_deref()
    }

    pub fn variant_count(&self) -> usize {
        self.raw.variants.len()
    }

    pub fn alternate_patterns(&self) -> impl Iterator<Item = &str> {
        self.raw
            .alternates
            .iter()
            .map(|binding| binding.pattern.as_str())
    }

    /// Parameter types of the primary constructor, in order.
    pub fn constructor_parameters(&self) -> Vec<TypeKey> {
        self.raw
            .constructor
            .iter()
            .flat_map(|constructor| constructor.params.iter().map(|param| param.key))
            .collect()
    }

    pub(crate) fn into_raw(self) -> RawDescriptor {
        self.raw
    }
}

impl<T: Send + 'static> Default for TypeDescriptor<T> {
    fn default() -> Self {
        Self::new()
    }
}

macro_rules! opaque_interpretable {
    ($($ty:ty),* $(,)?) => {
        $(impl Interpretable for $ty {})*
    };
}

opaque_interpretable!(
    String, bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
);

impl<I: Interpretable> Interpretable for Vec<I> {
    fn describe() -> TypeDescriptor<Self> {
        TypeDescriptor::sequence::<I>()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
