//! Interpretation contexts: interpreter cache plus terminal converters.
//!
//! A [`Context`] is the unit of registration isolation. Converters added to
//! one context are never visible from another, and every interpreter built
//! through a context (including the interpreters of nested parameter types)
//! is cached in that context only.

use std::any::TypeId;
use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::descriptor::{Interpretable, TypeKey, Value};
use crate::errors::InterpreterBuildingError;
use crate::interpreter::{Converter, Interpreter, RawInterpreter};
use crate::resolve::Resolver;
use crate::scalars;

/// Cache key: target type plus the options the interpreter was built with.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct InterpreterKey {
    type_id: TypeId,
    pattern: Option<String>,
    separator: Option<String>,
}

impl InterpreterKey {
    pub fn new(type_id: TypeId, pattern: Option<&str>, separator: Option<&str>) -> Self {
        InterpreterKey {
            type_id,
            pattern: pattern.map(str::to_owned),
            separator: separator.map(str::to_owned),
        }
    }

    fn plain(type_id: TypeId) -> Self {
        Self::new(type_id, None, None)
    }
}

static GLOBAL_CONTEXT: OnceLock<Context> = OnceLock::new();

/// Mutable registry of built interpreters and terminal converters.
///
/// Shared freely across threads; all mutation goes through interior locks
/// that are never held while an interpreter is being built.
pub struct Context {
    cache: RwLock<InterpreterCache>,
    converters: RwLock<FxHashMap<TypeId, Converter>>,
}

#[derive(Default)]
struct InterpreterCache {
    interpreters: FxHashMap<InterpreterKey, Arc<RawInterpreter>>,
    /// Bumped by every converter registration. Builds that started under an
    /// older generation are returned to their caller but never cached.
    generation: u64,
}

impl Context {
    /// A context seeded with converters for the scalar types.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// A context with no converters at all.
    pub fn empty() -> Self {
        Self::builder().scalars(false).build()
    }

    pub fn builder() -> ContextBuilder {
        ContextBuilder::new()
    }

    /// The process-wide default context, created on first use.
    pub fn global() -> &'static Context {
        GLOBAL_CONTEXT.get_or_init(Context::new)
    }

    /// Register (or replace) the terminal converter for `T`.
    ///
    /// Interpreters for `T` requested afterwards delegate to the converter.
    /// Composite interpreters that already resolved `T` as a parameter keep
    /// what they resolved.
    pub fn add_interpreter<T, F>(&self, converter: F) -> &Self
    where
        T: Interpretable,
        F: Fn(&str) -> Option<T> + Send + Sync + 'static,
    {
        let key = TypeKey::of::<T>();
        self.converters
            .write()
            .insert(key.id(), erase_converter(converter));
        let mut cache = self.cache.write();
        cache.generation += 1;
        cache.interpreters.remove(&InterpreterKey::plain(key.id()));
        drop(cache);
        tracing::debug!(ty = key.name(), "registered converter");
        self
    }

    /// True if a terminal converter is registered for `T`.
    pub fn has_converter<T: Interpretable>(&self) -> bool {
        self.converters.read().contains_key(&TypeId::of::<T>())
    }

    /// Fetch the cached interpreter for `T`, building it on first request.
    pub fn make_interpreter<T: Interpretable>(
        &self,
    ) -> Result<Interpreter<T>, InterpreterBuildingError> {
        Resolver::new(self)
            .interpreter(TypeKey::of::<T>(), None, None)
            .map(Interpreter::from_raw)
    }

    /// Fetch or build a single-candidate interpreter binding `pattern` to
    /// `T`'s primary constructor, ignoring `T`'s declared bindings.
    ///
    /// For list types the pattern applies to each item.
    pub fn make_interpreter_with_pattern<T: Interpretable>(
        &self,
        pattern: &str,
    ) -> Result<Interpreter<T>, InterpreterBuildingError> {
        Resolver::new(self)
            .interpreter(TypeKey::of::<T>(), Some(pattern), None)
            .map(Interpreter::from_raw)
    }

    /// Number of interpreters currently cached, nested ones included.
    pub fn cached_interpreters(&self) -> usize {
        self.cache.read().interpreters.len()
    }

    pub(crate) fn generation(&self) -> u64 {
        self.cache.read().generation
    }

    pub(crate) fn cached(&self, key: &InterpreterKey) -> Option<Arc<RawInterpreter>> {
        self.cache.read().interpreters.get(key).cloned()
    }

    pub(crate) fn converter(&self, type_id: TypeId) -> Option<Converter> {
        self.converters.read().get(&type_id).cloned()
    }

    /// Cache `built` under `key`, unless another build got there first or a
    /// converter was registered since `generation`. Returns the interpreter
    /// callers should use.
    pub(crate) fn insert(
        &self,
        key: InterpreterKey,
        built: RawInterpreter,
        generation: u64,
    ) -> Arc<RawInterpreter> {
        let target = built.target();
        let mut cache = self.cache.write();
        if cache.generation != generation {
            tracing::debug!(ty = target, "registrations changed during build, not caching");
            return Arc::new(built);
        }
        let cached = Arc::clone(
            cache
                .interpreters
                .entry(key)
                .or_insert_with(|| Arc::new(built)),
        );
        drop(cache);
        tracing::debug!(ty = target, "cached interpreter");
        cached
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("cached", &self.cache.read().interpreters.len())
            .field("converters", &self.converters.read().len())
            .finish()
    }
}

fn erase_converter<T, F>(converter: F) -> Converter
where
    T: Send + 'static,
    F: Fn(&str) -> Option<T> + Send + Sync + 'static,
{
    Arc::new(move |input: &str| converter(input).map(|value| Box::new(value) as Value))
}

/// Builder for [`Context`].
///
/// ```
/// use regula::Context;
///
/// let context = Context::builder()
///     .scalars(false)
///     .converter::<u16, _>(|input| u16::from_str_radix(input, 16).ok())
///     .build();
/// assert_eq!(context.interpret::<u16>("ff").unwrap(), 255);
/// assert!(!context.has_converter::<String>());
/// ```
#[must_use]
pub struct ContextBuilder {
    scalars: bool,
    converters: Vec<(TypeId, Converter)>,
}

impl ContextBuilder {
    pub fn new() -> Self {
        ContextBuilder {
            scalars: true,
            converters: Vec::new(),
        }
    }

    /// Seed the scalar converters (on by default).
    pub fn scalars(mut self, enabled: bool) -> Self {
        self.scalars = enabled;
        self
    }

    /// Pre-register a converter; later registrations for the same type win,
    /// including over the scalar seeds.
    pub fn converter<T, F>(mut self, converter: F) -> Self
    where
        T: Interpretable,
        F: Fn(&str) -> Option<T> + Send + Sync + 'static,
    {
        self.converters
            .push((TypeId::of::<T>(), erase_converter(converter)));
        self
    }

    pub fn build(self) -> Context {
        let mut converters = FxHashMap::default();
        if self.scalars {
            scalars::seed(&mut converters);
        }
        converters.extend(self.converters);
        Context {
            cache: RwLock::new(InterpreterCache::default()),
            converters: RwLock::new(converters),
        }
    }
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
