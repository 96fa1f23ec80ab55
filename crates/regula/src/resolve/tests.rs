use super::*;
use crate::descriptor::{Interpretable, TypeDescriptor};
use crate::errors::InterpreterBuildingError;
use crate::interpreter::Interpreter;
use pretty_assertions::assert_eq;
use std::any::type_name;

fn build<T: Interpretable>(context: &Context) -> Result<Interpreter<T>, InterpreterBuildingError> {
    context.make_interpreter::<T>()
}

#[derive(Debug, PartialEq)]
struct Cat(String);

impl Interpretable for Cat {
    fn describe() -> TypeDescriptor<Self> {
        TypeDescriptor::new()
            .constructor(|(name,): (String,)| Cat(name))
            .pattern(r"cat (\w+)")
    }
}

#[derive(Debug, PartialEq)]
struct Lion(String);

impl Interpretable for Lion {
    fn describe() -> TypeDescriptor<Self> {
        TypeDescriptor::new()
            .constructor(|(name,): (String,)| Lion(name))
            .pattern(r"lion (\w+)")
            .alternate(r"(\w+) the lion", |(name,): (String,)| Lion(name))
    }
}

#[derive(Debug, PartialEq)]
enum Feline {
    Cat(Cat),
    Lion(Lion),
}

impl Interpretable for Feline {
    fn describe() -> TypeDescriptor<Self> {
        TypeDescriptor::new()
            .variant(Feline::Cat)
            .variant(Feline::Lion)
            .alternate(r"big cat (\w+)", |(name,): (String,)| {
                Feline::Lion(Lion(name))
            })
    }
}

#[derive(Debug, PartialEq)]
enum Animal {
    Feline(Feline),
    Other(String),
}

impl Interpretable for Animal {
    fn describe() -> TypeDescriptor<Self> {
        TypeDescriptor::new()
            .variant(Animal::Feline)
            .alternate(r"(.+)", |(name,): (String,)| Animal::Other(name))
    }
}

#[test]
fn candidates_follow_declaration_order() {
    let interpreter = build::<Feline>(&Context::new()).unwrap();
    assert_eq!(
        interpreter.patterns(),
        vec![r"cat (\w+)", r"lion (\w+)", r"(\w+) the lion", r"big cat (\w+)"]
    );
}

#[test]
fn nested_variants_are_lifted_through_every_level() {
    let interpreter = build::<Animal>(&Context::new()).unwrap();
    assert_eq!(
        interpreter.interpret("Leo the lion").unwrap(),
        Animal::Feline(Feline::Lion(Lion("Leo".into())))
    );
    assert_eq!(
        interpreter.interpret("big cat Tom").unwrap(),
        Animal::Feline(Feline::Lion(Lion("Tom".into())))
    );
    assert_eq!(
        interpreter.interpret("a goldfish").unwrap(),
        Animal::Other("a goldfish".into())
    );
}

#[derive(Debug)]
struct Opaque;

impl Interpretable for Opaque {}

#[derive(Debug)]
#[allow(dead_code, reason = "fixture fields are constructed, never read")]
struct Holder(Opaque);

impl Interpretable for Holder {
    fn describe() -> TypeDescriptor<Self> {
        TypeDescriptor::new()
            .constructor(|(inner,): (Opaque,)| Holder(inner))
            .pattern(r"holding (.*)")
    }
}

#[derive(Debug)]
#[allow(dead_code, reason = "fixture fields are constructed, never read")]
enum Outer {
    Holder(Holder),
}

impl Interpretable for Outer {
    fn describe() -> TypeDescriptor<Self> {
        TypeDescriptor::new().variant(Outer::Holder)
    }
}

#[test]
fn nested_failure_carries_the_type_chain() {
    let err = build::<Outer>(&Context::new()).unwrap_err();
    assert_eq!(
        err.chain(),
        &[
            type_name::<Outer>(),
            type_name::<Holder>(),
            type_name::<Opaque>()
        ]
    );
    assert_eq!(
        err.kind(),
        &BuildErrorKind::NoBinding {
            type_name: type_name::<Opaque>()
        }
    );
}

#[test]
fn failed_builds_are_not_cached() {
    let context = Context::new();
    assert!(build::<Holder>(&context).is_err());
    assert_eq!(context.cached_interpreters(), 0);

    context.add_interpreter::<Opaque, _>(|_| Some(Opaque));
    assert!(build::<Holder>(&context).is_ok());
}

#[derive(Debug)]
#[allow(dead_code, reason = "fixture fields are constructed, never read")]
struct Chain(Box<Chain>);

impl Interpretable for Chain {
    fn describe() -> TypeDescriptor<Self> {
        TypeDescriptor::new()
            .constructor(|(next,): (Chain,)| Chain(Box::new(next)))
            .pattern(r"<(.*)>")
    }
}

#[test]
fn self_referencing_parameter_is_a_cycle() {
    let err = build::<Chain>(&Context::new()).unwrap_err();
    assert_eq!(
        err.kind(),
        &BuildErrorKind::CyclicType {
            type_name: type_name::<Chain>()
        }
    );
    assert_eq!(err.chain(), &[type_name::<Chain>(), type_name::<Chain>()]);
}

#[derive(Debug)]
#[allow(dead_code, reason = "fixture fields are constructed, never read")]
enum Ouroboros {
    Again(Box<Ouroboros>),
}

impl Interpretable for Ouroboros {
    fn describe() -> TypeDescriptor<Self> {
        TypeDescriptor::new().variant(|inner: Ouroboros| Ouroboros::Again(Box::new(inner)))
    }
}

#[test]
fn self_referencing_variant_is_a_cycle() {
    let err = build::<Ouroboros>(&Context::new()).unwrap_err();
    assert!(matches!(err.kind(), BuildErrorKind::CyclicType { .. }));
}

#[derive(Debug)]
#[allow(dead_code, reason = "fixture fields are constructed, never read")]
enum Nothing {
    Opaque(Opaque),
}

impl Interpretable for Nothing {
    fn describe() -> TypeDescriptor<Self> {
        TypeDescriptor::new().variant(Nothing::Opaque)
    }
}

#[test]
fn sum_type_without_any_binding() {
    let err = build::<Nothing>(&Context::new()).unwrap_err();
    assert_eq!(
        err.kind(),
        &BuildErrorKind::EmptySumType {
            type_name: type_name::<Nothing>()
        }
    );
}

#[derive(Debug)]
struct Loose;

impl Interpretable for Loose {
    fn describe() -> TypeDescriptor<Self> {
        TypeDescriptor::new().pattern("loose")
    }
}

#[test]
fn pattern_without_constructor() {
    let err = build::<Loose>(&Context::new()).unwrap_err();
    assert!(matches!(err.kind(), BuildErrorKind::NoConstructor { .. }));

    let err = Context::new()
        .make_interpreter_with_pattern::<Feline>("(.*)")
        .unwrap_err();
    assert!(matches!(err.kind(), BuildErrorKind::NoConstructor { .. }));
}

#[test]
fn explicit_pattern_replaces_declared_bindings() {
    let context = Context::new();
    let interpreter = context
        .make_interpreter_with_pattern::<Cat>(r"(\w+) the cat")
        .unwrap();
    assert_eq!(interpreter.patterns(), vec![r"(\w+) the cat"]);
    assert_eq!(interpreter.interpret("Tom the cat").unwrap(), Cat("Tom".into()));
    assert!(interpreter.interpret("cat Tom").is_err());

    let err = context
        .make_interpreter_with_pattern::<Cat>(r"(\w+) and (\w+)")
        .unwrap_err();
    assert!(matches!(
        err.kind(),
        BuildErrorKind::ArityMismatch {
            expected: 1,
            actual: 2,
            ..
        }
    ));
}

#[derive(Debug, PartialEq)]
struct Pride(Vec<Cat>);

impl Interpretable for Pride {
    fn describe() -> TypeDescriptor<Self> {
        TypeDescriptor::new()
            .constructor_from(
                crate::Constructor::new(|(cats,): (Vec<Cat>,)| Pride(cats))
                    .param_pattern(0, r"(\w+)")
                    .param_separator(0, r"\s+and\s+"),
            )
            .pattern("pride: (.*)")
    }
}

#[test]
fn list_parameter_options_reach_the_items() {
    let pride = Context::new()
        .interpret::<Pride>("pride: Tom and Felix and Leo")
        .unwrap();
    assert_eq!(
        pride,
        Pride(vec![Cat("Tom".into()), Cat("Felix".into()), Cat("Leo".into())])
    );
}

#[derive(Debug)]
#[allow(dead_code, reason = "fixture fields are constructed, never read")]
struct Misplaced(u8);

impl Interpretable for Misplaced {
    fn describe() -> TypeDescriptor<Self> {
        TypeDescriptor::new()
            .constructor_from(
                crate::Constructor::new(|(n,): (u8,)| Misplaced(n)).param_separator(0, ";"),
            )
            .pattern(r"(\d+)")
    }
}

#[derive(Debug)]
#[allow(dead_code, reason = "fixture fields are constructed, never read")]
struct BadSeparator(Vec<u8>);

impl Interpretable for BadSeparator {
    fn describe() -> TypeDescriptor<Self> {
        TypeDescriptor::new()
            .constructor_from(
                crate::Constructor::new(|(n,): (Vec<u8>,)| BadSeparator(n))
                    .param_separator(0, "(["),
            )
            .pattern(r"(.*)")
    }
}

#[test]
fn separator_misuse_is_a_build_failure() {
    let err = build::<Misplaced>(&Context::new()).unwrap_err();
    assert_eq!(
        err.kind(),
        &BuildErrorKind::UnexpectedSeparator {
            type_name: "u8",
            separator: ";".into()
        }
    );

    let err = build::<BadSeparator>(&Context::new()).unwrap_err();
    assert!(matches!(err.kind(), BuildErrorKind::InvalidSeparator { .. }));
}

#[test]
fn converter_takes_precedence_over_declared_bindings() {
    let context = Context::new();
    context.add_interpreter::<Cat, _>(|input| Some(Cat(input.to_uppercase())));
    let cat = context.interpret::<Cat>("cat tom").unwrap();
    assert_eq!(cat, Cat("CAT TOM".into()));
}

#[test]
fn explicit_pattern_ignores_registered_converter() {
    let context = Context::new();
    context.add_interpreter::<Cat, _>(|input| Some(Cat(input.to_uppercase())));

    let interpreter = context
        .make_interpreter_with_pattern::<Cat>(r"(\w+) the cat")
        .unwrap();
    assert_eq!(interpreter.patterns(), vec![r"(\w+) the cat"]);
    assert_eq!(interpreter.interpret("Tom the cat").unwrap(), Cat("Tom".into()));
    assert!(interpreter.interpret("cat tom").is_err());

    // The plain interpreter still goes through the converter.
    assert_eq!(context.interpret::<Cat>("cat tom").unwrap(), Cat("CAT TOM".into()));
}
