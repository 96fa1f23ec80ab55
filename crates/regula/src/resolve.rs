//! Binding resolution: from a type's descriptor to its ordered candidates.
//!
//! Candidate order is own binding, then every variant's candidates (in
//! variant declaration order, recursing into nested sum types), then
//! alternate builders. Parameter interpreters are fetched through the
//! owning `Context`, so they are built once and shared.

use std::any::TypeId;
use std::sync::Arc;

use regex::Regex;
use regula_stack::ensure_sufficient_stack;

use crate::binding::{chain_wraps, wrap_construct, RawConstructor, Wrap};
use crate::compile::{compile, CompiledCandidate};
use crate::context::{Context, InterpreterKey};
use crate::descriptor::{RawDescriptor, SequenceShape, TypeKey, DEFAULT_SEPARATOR};
use crate::errors::{BuildErrorKind, InterpreterBuildingError};
use crate::interpreter::RawInterpreter;

/// One interpreter request, including everything it builds on the way.
pub(crate) struct Resolver<'ctx> {
    context: &'ctx Context,
    /// Registration generation observed before anything was built.
    generation: u64,
    /// Interpreters currently being built, outermost first.
    in_progress: Vec<InterpreterKey>,
    /// Sum types whose variants are currently being expanded.
    expanding: Vec<TypeId>,
}

impl<'ctx> Resolver<'ctx> {
    pub fn new(context: &'ctx Context) -> Self {
        Resolver {
            context,
            generation: context.generation(),
            in_progress: Vec::new(),
            expanding: Vec::new(),
        }
    }

    /// Fetch or build the interpreter for `key` under the given options.
    pub fn interpreter(
        &mut self,
        key: TypeKey,
        pattern: Option<&str>,
        separator: Option<&str>,
    ) -> Result<Arc<RawInterpreter>, InterpreterBuildingError> {
        let cache_key = InterpreterKey::new(key.id(), pattern, separator);
        if let Some(cached) = self.context.cached(&cache_key) {
            return Ok(cached);
        }
        if self.in_progress.contains(&cache_key) {
            return Err(InterpreterBuildingError::new(
                key.name(),
                BuildErrorKind::CyclicType {
                    type_name: key.name(),
                },
            ));
        }

        self.in_progress.push(cache_key.clone());
        let built = ensure_sufficient_stack(|| self.build(key, pattern, separator));
        self.in_progress.pop();

        Ok(self.context.insert(cache_key, built?, self.generation))
    }

    #[tracing::instrument(level = "debug", skip_all, fields(ty = key.name()))]
    fn build(
        &mut self,
        key: TypeKey,
        pattern: Option<&str>,
        separator: Option<&str>,
    ) -> Result<RawInterpreter, InterpreterBuildingError> {
        let name = key.name();

        if pattern.is_none() && separator.is_none() {
            if let Some(converter) = self.context.converter(key.id()) {
                tracing::debug!("using registered converter");
                return Ok(RawInterpreter::terminal(name, converter));
            }
        }

        let descriptor = key.describe();
        if let Some(shape) = &descriptor.sequence {
            return self.sequence(name, shape, pattern, separator);
        }
        if let Some(separator) = separator {
            return Err(InterpreterBuildingError::new(
                name,
                BuildErrorKind::UnexpectedSeparator {
                    type_name: name,
                    separator: separator.to_owned(),
                },
            ));
        }
        if let Some(pattern) = pattern {
            return self.explicit(&descriptor, pattern);
        }

        let mut candidates = Vec::new();
        self.collect(key, &descriptor, None, &mut candidates)?;
        if candidates.is_empty() {
            let kind = if descriptor.is_sum_type() {
                BuildErrorKind::EmptySumType { type_name: name }
            } else {
                BuildErrorKind::NoBinding { type_name: name }
            };
            return Err(InterpreterBuildingError::new(name, kind));
        }

        tracing::debug!(candidates = candidates.len(), "resolved candidates");
        Ok(RawInterpreter::candidates(name, candidates))
    }

    /// A single candidate: `pattern` over the type's primary constructor.
    fn explicit(
        &mut self,
        descriptor: &RawDescriptor,
        pattern: &str,
    ) -> Result<RawInterpreter, InterpreterBuildingError> {
        let name = descriptor.name;
        let constructor = descriptor.constructor.as_ref().ok_or_else(|| {
            InterpreterBuildingError::new(name, BuildErrorKind::NoConstructor { type_name: name })
        })?;
        let candidate = self.compile_binding(name, pattern, constructor, None)?;
        Ok(RawInterpreter::candidates(name, vec![candidate]))
    }

    fn sequence(
        &mut self,
        name: &'static str,
        shape: &SequenceShape,
        pattern: Option<&str>,
        separator: Option<&str>,
    ) -> Result<RawInterpreter, InterpreterBuildingError> {
        let source = separator.unwrap_or(DEFAULT_SEPARATOR);
        let splitter = Regex::new(source).map_err(|err| {
            InterpreterBuildingError::new(
                name,
                BuildErrorKind::InvalidSeparator {
                    separator: source.to_owned(),
                    message: err.to_string(),
                },
            )
        })?;
        let item = self
            .interpreter(shape.item, pattern, None)
            .map_err(|err| err.within(name))?;
        Ok(RawInterpreter::sequence(
            name,
            splitter,
            item,
            Arc::clone(&shape.collect),
        ))
    }

    /// Append `descriptor`'s candidates to `out`, each post-processed by
    /// `wrap` when it is reached through a variant.
    fn collect(
        &mut self,
        key: TypeKey,
        descriptor: &RawDescriptor,
        wrap: Option<&Wrap>,
        out: &mut Vec<CompiledCandidate>,
    ) -> Result<(), InterpreterBuildingError> {
        let name = descriptor.name;
        if self.expanding.contains(&key.id()) {
            return Err(InterpreterBuildingError::new(
                name,
                BuildErrorKind::CyclicType { type_name: name },
            ));
        }

        if let Some((pattern, constructor)) = descriptor.own_binding() {
            out.push(self.compile_binding(name, pattern, constructor, wrap)?);
        } else if descriptor.pattern.is_some() {
            return Err(InterpreterBuildingError::new(
                name,
                BuildErrorKind::NoConstructor { type_name: name },
            ));
        }

        self.expanding.push(key.id());
        let expanded = self.collect_variants(descriptor, wrap, out);
        self.expanding.pop();
        expanded?;

        for alternate in &descriptor.alternates {
            let candidate =
                self.compile_binding(name, &alternate.pattern, &alternate.constructor, wrap)?;
            out.push(candidate);
        }
        Ok(())
    }

    fn collect_variants(
        &mut self,
        descriptor: &RawDescriptor,
        wrap: Option<&Wrap>,
        out: &mut Vec<CompiledCandidate>,
    ) -> Result<(), InterpreterBuildingError> {
        for variant in &descriptor.variants {
            let lift = chain_wraps(&variant.wrap, wrap);
            let variant_descriptor = variant.key.describe();
            ensure_sufficient_stack(|| {
                self.collect(variant.key, &variant_descriptor, Some(&lift), out)
            })
            .map_err(|err| err.within(descriptor.name))?;
        }
        Ok(())
    }

    fn compile_binding(
        &mut self,
        name: &'static str,
        pattern: &str,
        constructor: &RawConstructor,
        wrap: Option<&Wrap>,
    ) -> Result<CompiledCandidate, InterpreterBuildingError> {
        let fail = |kind| InterpreterBuildingError::new(name, kind);
        constructor.check_options().map_err(fail)?;
        let matcher = compile(pattern, constructor.arity()).map_err(fail)?;

        let parameters = constructor
            .params
            .iter()
            .map(|param| {
                self.interpreter(param.key, param.pattern.as_deref(), param.separator.as_deref())
                    .map_err(|err| err.within(name))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CompiledCandidate::new(
            pattern,
            matcher,
            parameters,
            wrap_construct(&constructor.construct, wrap),
        ))
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
