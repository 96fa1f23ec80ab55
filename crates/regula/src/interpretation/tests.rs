use super::*;
use crate::descriptor::TypeDescriptor;
use pretty_assertions::assert_eq;

#[derive(Debug, PartialEq)]
struct Range {
    low: i32,
    high: i32,
}

impl Interpretable for Range {
    fn describe() -> TypeDescriptor<Self> {
        TypeDescriptor::new()
            .constructor(|(low, high): (i32, i32)| Range { low, high })
            .pattern(r"(-?\d+)\.\.(-?\d+)")
    }
}

#[derive(Debug, PartialEq)]
struct Serial(u64);

impl Interpretable for Serial {}

#[test]
fn global_functions_interpret_declared_types() {
    assert_eq!(interpret::<Range>("1..5").unwrap(), Range { low: 1, high: 5 });
    assert_eq!(
        interpret_with_pattern::<Range>("from 2 to 3", r"from (\d+) to (\d+)").unwrap(),
        Range { low: 2, high: 3 }
    );
    assert_eq!(interpreter::<Range>().unwrap().patterns(), vec![r"(-?\d+)\.\.(-?\d+)"]);
    assert!(interpreter_with_pattern::<Range>(r"(\d+)").is_err());
}

#[test]
fn errors_keep_their_phase() {
    let context = Context::new();
    assert!(matches!(
        context.interpret::<Serial>("1"),
        Err(Error::Build(_))
    ));
    assert!(matches!(
        context.interpret::<Range>("1..x"),
        Err(Error::Interpretation(_))
    ));
}

#[test]
fn sequences_of_inputs() {
    let ranges = interpret_all::<Range, _>(["0..1", "-1..0"]).unwrap();
    assert_eq!(ranges, vec![Range { low: 0, high: 1 }, Range { low: -1, high: 0 }]);

    let results: Vec<_> = interpret_each::<Range, _>(vec!["0..1", "nope"])
        .unwrap()
        .map(|result| result.is_ok())
        .collect();
    assert_eq!(results, vec![true, false]);

    assert!(Context::new().interpret_each::<Serial, _>(["1"]).is_err());
}

#[test]
fn new_context_scopes_registrations() {
    let serial = in_new_context(|context| {
        context.add_interpreter::<Serial, _>(|input| {
            input.strip_prefix('#')?.parse().ok().map(Serial)
        });
        context.interpret::<Serial>("#77").unwrap()
    });
    assert_eq!(serial, Serial(77));

    in_new_context(|context| {
        assert!(context.interpret::<Serial>("#77").is_err());
        assert_eq!(context.interpret::<u8>("7").unwrap(), 7);
    });
}

#[test]
fn in_context_uses_the_given_context() {
    let context = Context::empty();
    context.add_interpreter::<Serial, _>(|input| input.parse().ok().map(Serial));
    let serials = in_context(&context, |context| {
        context.interpret_all::<Serial, _>(["1", "2"]).unwrap()
    });
    assert_eq!(serials, vec![Serial(1), Serial(2)]);
}
