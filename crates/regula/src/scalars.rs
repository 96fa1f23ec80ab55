//! Converters seeded into new contexts for the scalar types.

use std::any::TypeId;
use std::str::FromStr;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::descriptor::Value;
use crate::interpreter::Converter;

pub(crate) fn seed(converters: &mut FxHashMap<TypeId, Converter>) {
    converters.insert(
        TypeId::of::<String>(),
        Arc::new(|input: &str| Some(Box::new(input.to_owned()) as Value)),
    );
    converters.insert(TypeId::of::<bool>(), converter(parse_bool));
    converters.insert(TypeId::of::<char>(), converter(parse_char));

    macro_rules! parsed {
        ($($ty:ty),* $(,)?) => {
            $(converters.insert(TypeId::of::<$ty>(), converter(parsed::<$ty>));)*
        };
    }
    parsed!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);
}

fn converter<T: Send + 'static>(parse: fn(&str) -> Option<T>) -> Converter {
    Arc::new(move |input: &str| parse(input).map(|value| Box::new(value) as Value))
}

fn parsed<T: FromStr>(input: &str) -> Option<T> {
    input.parse().ok()
}

/// `true` or `false`, in any letter case.
pub(crate) fn parse_bool(input: &str) -> Option<bool> {
    if input.eq_ignore_ascii_case("true") {
        Some(true)
    } else if input.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Exactly one character.
pub(crate) fn parse_char(input: &str) -> Option<char> {
    let mut chars = input.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}
