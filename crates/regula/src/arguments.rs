//! Typed argument tuples for construction closures.

use std::any::type_name;

use crate::descriptor::{Interpretable, TypeKey, Value};
use crate::errors::ConstructionFailure;

/// An ordered tuple of interpretable parameter types.
///
/// Implemented for `()` and tuples of up to eight [`Interpretable`] types.
/// `keys` describes the parameters to the resolver; `take` rebuilds the
/// typed tuple from interpreted values, failing (never panicking) on a
/// count or type mismatch.
pub trait Arguments: Sized + 'static {
    fn keys() -> Vec<TypeKey>;

    fn take(values: Vec<Value>) -> Result<Self, ConstructionFailure>;
}

impl Arguments for () {
    fn keys() -> Vec<TypeKey> {
        Vec::new()
    }

    fn take(values: Vec<Value>) -> Result<Self, ConstructionFailure> {
        if values.is_empty() {
            Ok(())
        } else {
            Err(ConstructionFailure::Arity {
                expected: 0,
                actual: values.len(),
            })
        }
    }
}

fn downcast<A: 'static>(value: Option<Value>, index: usize) -> Result<A, ConstructionFailure> {
    let Some(value) = value else {
        return Err(ConstructionFailure::MissingArgument { index });
    };
    value
        .downcast::<A>()
        .map(|boxed| *boxed)
        .map_err(|_| ConstructionFailure::ArgumentType {
            index,
            expected: type_name::<A>(),
        })
}

macro_rules! impl_arguments {
    ($len:literal; $($name:ident: $index:literal),+) => {
        impl<$($name: Interpretable),+> Arguments for ($($name,)+) {
            fn keys() -> Vec<TypeKey> {
                vec![$(TypeKey::of::<$name>()),+]
            }

            fn take(values: Vec<Value>) -> Result<Self, ConstructionFailure> {
                if values.len() != $len {
                    return Err(ConstructionFailure::Arity {
                        expected: $len,
                        actual: values.len(),
                    });
                }
                let mut values = values.into_iter();
                Ok(($(downcast::<$name>(values.next(), $index)?,)+))
            }
        }
    };
}

impl_arguments!(1; A: 0);
impl_arguments!(2; A: 0, B: 1);
impl_arguments!(3; A: 0, B: 1, C: 2);
impl_arguments!(4; A: 0, B: 1, C: 2, D: 3);
impl_arguments!(5; A: 0, B: 1, C: 2, D: 3, E: 4);
impl_arguments!(6; A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);
impl_arguments!(7; A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6);
impl_arguments!(8; A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7);

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn boxed<T: Send + 'static>(value: T) -> Value {
        Box::new(value)
    }

    #[test]
    fn keys_follow_tuple_order() {
        let keys = <(u8, String, bool)>::keys();
        let names: Vec<_> = keys.iter().map(TypeKey::name).collect();
        assert_eq!(names, vec!["u8", "alloc::string::String", "bool"]);
    }

    #[test]
    fn take_rebuilds_the_tuple() {
        let args = <(i64, char)>::take(vec![boxed(-4_i64), boxed('z')]);
        assert_eq!(args, Ok((-4, 'z')));
    }

    #[test]
    fn take_rejects_wrong_count() {
        let args = <(i64, char)>::take(vec![boxed(1_i64)]);
        assert_eq!(
            args,
            Err(ConstructionFailure::Arity {
                expected: 2,
                actual: 1
            })
        );
        assert_eq!(
            <()>::take(vec![boxed(1_u8)]),
            Err(ConstructionFailure::Arity {
                expected: 0,
                actual: 1
            })
        );
    }

    #[test]
    fn take_rejects_wrong_type() {
        let args = <(i64, char)>::take(vec![boxed(1_i64), boxed("z".to_string())]);
        assert_eq!(
            args,
            Err(ConstructionFailure::ArgumentType {
                index: 1,
                expected: "char"
            })
        );
    }
}
