//! Writable fields of a bind target.

use std::any::{Any, TypeId};
use std::str::FromStr;
use std::sync::Arc;

use crate::strategy::{CellValue, ParseStrategy};

pub(crate) type Apply<T> = Arc<dyn Fn(&mut T, &str) -> bool + Send + Sync>;
pub(crate) type ApplyAny<T> = Arc<dyn Fn(&mut T, Box<dyn Any + Send>) -> bool + Send + Sync>;

pub(crate) enum FieldKind<T> {
    Direct {
        strategy: ParseStrategy,
        apply: Apply<T>,
    },
    Converted {
        type_id: TypeId,
        type_name: &'static str,
        apply: ApplyAny<T>,
    },
}

/// One writable field: its name and how a cell reaches it.
pub struct Field<T> {
    pub(crate) name: &'static str,
    pub(crate) kind: FieldKind<T>,
}

impl<T: 'static> Field<T> {
    /// A field whose type carries its own strategy.
    pub fn new<U: CellValue>(name: &'static str, setter: fn(&mut T, U)) -> Self {
        let apply: Apply<T> = Arc::new(move |target: &mut T, raw: &str| match U::parse_cell(raw) {
            Some(v) => {
                setter(target, v);
                true
            }
            None => false,
        });
        Self {
            name,
            kind: FieldKind::Direct {
                strategy: U::STRATEGY,
                apply,
            },
        }
    }

    /// A field of any `FromStr` type.
    pub fn parsed<U: FromStr + 'static>(name: &'static str, setter: fn(&mut T, U)) -> Self {
        let apply: Apply<T> = Arc::new(move |target: &mut T, raw: &str| match raw.trim().parse::<U>() {
            Ok(v) => {
                setter(target, v);
                true
            }
            Err(_) => false,
        });
        Self {
            name,
            kind: FieldKind::Direct {
                strategy: ParseStrategy::TryParse,
                apply,
            },
        }
    }

    /// A field parsed by a converter registered for `U`.
    pub fn converted<U: Any + Send>(name: &'static str, setter: fn(&mut T, U)) -> Self {
        let apply: ApplyAny<T> = Arc::new(move |target: &mut T, boxed: Box<dyn Any + Send>| match boxed.downcast::<U>() {
            Ok(v) => {
                setter(target, *v);
                true
            }
            Err(_) => false,
        });
        Self {
            name,
            kind: FieldKind::Converted {
                type_id: TypeId::of::<U>(),
                type_name: std::any::type_name::<U>(),
                apply,
            },
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn strategy(&self) -> ParseStrategy {
        match &self.kind {
            FieldKind::Direct { strategy, .. } => *strategy,
            FieldKind::Converted { .. } => ParseStrategy::Converter,
        }
    }
}

/// A type rows can be bound into.
///
/// Record types list their writable fields. Bare value types list none and
/// instead provide [`Bindable::parse_single`], used when a table has exactly
/// one column.
pub trait Bindable: Default + 'static {
    fn fields() -> Vec<Field<Self>>;

    /// Strategy for binding a whole single-column row; `None` for record types.
    fn single_strategy() -> Option<ParseStrategy> {
        None
    }

    fn parse_single(_raw: &str) -> Option<Self> {
        None
    }
}

macro_rules! bare_value {
    ($($t:ty),* $(,)?) => {
        $(
            impl Bindable for $t {
                fn fields() -> Vec<Field<Self>> {
                    Vec::new()
                }

                fn single_strategy() -> Option<ParseStrategy> {
                    Some(<$t as CellValue>::STRATEGY)
                }

                fn parse_single(raw: &str) -> Option<Self> {
                    <$t as CellValue>::parse_cell(raw)
                }
            }
        )*
    };
}

bare_value!(
    String, f64, f32, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, bool, char
);

/// Implement [`Bindable`] for a struct by listing its fields.
///
/// ```rust
/// use tabula_bind::bindable;
///
/// #[derive(Default)]
/// struct Person {
///     name: String,
///     age: i32,
///     favorite_fruit: String,
/// }
///
/// bindable!(Person { name: String, age: i32, favorite_fruit: String });
/// ```
#[macro_export]
macro_rules! bindable {
    ($ty:ty { $($field:ident : $fty:ty),* $(,)? }) => {
        impl $crate::Bindable for $ty {
            fn fields() -> ::std::vec::Vec<$crate::Field<Self>> {
                ::std::vec![
                    $(
                        $crate::Field::new::<$fty>(
                            ::std::stringify!($field),
                            |target: &mut $ty, value: $fty| target.$field = value,
                        )
                    ),*
                ]
            }
        }
    };
}
