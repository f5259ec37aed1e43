//! Per-type parse strategies, fixed when a binder is built.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStrategy {
    /// The cell text as-is.
    Text,
    /// Float parse with a `%` suffix meaning "divide by 100"; failures are NaN.
    Numeric,
    /// `FromStr` on the trimmed cell; failures keep the default.
    TryParse,
    /// A converter looked up in a [`ConverterRegistry`].
    Converter,
}

/// A type a single cell can be parsed into.
pub trait CellValue: Sized + 'static {
    const STRATEGY: ParseStrategy;

    /// `None` means "keep the default".
    fn parse_cell(raw: &str) -> Option<Self>;
}

impl CellValue for String {
    const STRATEGY: ParseStrategy = ParseStrategy::Text;

    fn parse_cell(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }
}

impl CellValue for f64 {
    const STRATEGY: ParseStrategy = ParseStrategy::Numeric;

    fn parse_cell(raw: &str) -> Option<Self> {
        Some(parse_numeric(raw))
    }
}

impl CellValue for f32 {
    const STRATEGY: ParseStrategy = ParseStrategy::Numeric;

    fn parse_cell(raw: &str) -> Option<Self> {
        Some(parse_numeric(raw) as f32)
    }
}

macro_rules! try_parse_cell {
    ($($t:ty),* $(,)?) => {
        $(
            impl CellValue for $t {
                const STRATEGY: ParseStrategy = ParseStrategy::TryParse;

                fn parse_cell(raw: &str) -> Option<Self> {
                    raw.trim().parse().ok()
                }
            }
        )*
    };
}

try_parse_cell!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, bool, char);

/// Blank cells become `None`; anything else goes through `T`'s strategy.
impl<T: CellValue> CellValue for Option<T> {
    const STRATEGY: ParseStrategy = T::STRATEGY;

    fn parse_cell(raw: &str) -> Option<Self> {
        if raw.trim().is_empty() {
            return Some(None);
        }
        T::parse_cell(raw).map(Some)
    }
}

/// `"32%"` -> `0.32`, `"1.5"` -> `1.5`, anything unparseable -> NaN.
pub fn parse_numeric(raw: &str) -> f64 {
    let s = raw.trim();
    let (digits, scale) = match s.strip_suffix('%') {
        Some(rest) => (rest.trim_end(), 100.0),
        None => (s, 1.0),
    };
    digits.parse::<f64>().map(|v| v / scale).unwrap_or(f64::NAN)
}

type ConvertFn = Arc<dyn Fn(&str) -> Option<Box<dyn Any + Send>> + Send + Sync>;

#[derive(Clone)]
pub(crate) struct Converter {
    pub(crate) type_name: &'static str,
    pub(crate) convert: ConvertFn,
}

/// Fallback parsers for types that have no built-in strategy.
#[derive(Clone, Default)]
pub struct ConverterRegistry {
    converters: HashMap<TypeId, Converter>,
}

impl ConverterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the converter for `U`.
    pub fn register<U, F>(&mut self, convert: F) -> &mut Self
    where
        U: Any + Send,
        F: Fn(&str) -> Option<U> + Send + Sync + 'static,
    {
        let convert: ConvertFn =
            Arc::new(move |raw: &str| convert(raw).map(|v| Box::new(v) as Box<dyn Any + Send>));
        self.converters.insert(
            TypeId::of::<U>(),
            Converter {
                type_name: std::any::type_name::<U>(),
                convert,
            },
        );
        self
    }

    pub fn contains<U: Any>(&self) -> bool {
        self.converters.contains_key(&TypeId::of::<U>())
    }

    pub(crate) fn get(&self, type_id: TypeId) -> Option<&Converter> {
        self.converters.get(&type_id)
    }
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.converters.values().map(|c| c.type_name))
            .finish()
    }
}
