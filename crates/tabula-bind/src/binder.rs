//! Compile-once row projection.
//!
//! `Binder::build` matches the target's fields against a header once and
//! records, per matched field, `(column index, setter, strategy)`. Binding a
//! row then walks that list with no further name lookups or type checks.

use std::fmt;
use std::sync::Arc;

use tabula_core::error::{Error, Result};
use tabula_core::names::{normalize, same_name};
use tabula_core::row::Row;
use tabula_table::DataTable;

use crate::field::{Apply, Bindable, FieldKind};
use crate::strategy::{ConverterRegistry, ParseStrategy};

struct Slot<T> {
    field: &'static str,
    column: usize,
    strategy: ParseStrategy,
    apply: Apply<T>,
}

impl<T> Clone for Slot<T> {
    fn clone(&self) -> Self {
        Self {
            field: self.field,
            column: self.column,
            strategy: self.strategy,
            apply: Arc::clone(&self.apply),
        }
    }
}

enum Plan<T> {
    Record(Vec<Slot<T>>),
    Single(ParseStrategy),
}

impl<T> Clone for Plan<T> {
    fn clone(&self) -> Self {
        match self {
            Plan::Record(slots) => Plan::Record(slots.clone()),
            Plan::Single(s) => Plan::Single(*s),
        }
    }
}

/// A reusable `Row -> T` function for one header layout.
///
/// Binders are immutable once built and can be shared across threads.
pub struct Binder<T> {
    columns: Vec<String>,
    plan: Plan<T>,
    unmatched: Vec<&'static str>,
}

impl<T> Clone for Binder<T> {
    fn clone(&self) -> Self {
        Self {
            columns: self.columns.clone(),
            plan: self.plan.clone(),
            unmatched: self.unmatched.clone(),
        }
    }
}

impl<T> fmt::Debug for Binder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binder")
            .field("target", &std::any::type_name::<T>())
            .field("bindings", &self.bindings())
            .field("unmatched", &self.unmatched)
            .finish()
    }
}

impl<T: Bindable> Binder<T> {
    pub fn build<S: AsRef<str>>(column_names: &[S]) -> Result<Self> {
        Self::build_with(column_names, &ConverterRegistry::default())
    }

    pub fn for_table<D: DataTable>(table: &D) -> Result<Self> {
        Self::build(&table.column_names())
    }

    /// Build, resolving converter-backed fields through `registry`.
    pub fn build_with<S: AsRef<str>>(column_names: &[S], registry: &ConverterRegistry) -> Result<Self> {
        let columns: Vec<String> = column_names.iter().map(|c| c.as_ref().to_string()).collect();
        let fields = T::fields();
        let type_name = std::any::type_name::<T>();

        if fields.is_empty() {
            let Some(strategy) = T::single_strategy() else {
                return Err(Error::Schema(format!("type {type_name} has no writable fields")));
            };
            if columns.len() != 1 {
                return Err(Error::Schema(format!(
                    "cannot bind bare value type {type_name} to {} columns; exactly one is required",
                    columns.len()
                )));
            }
            return Ok(Self {
                columns,
                plan: Plan::Single(strategy),
                unmatched: Vec::new(),
            });
        }

        let normalized: Vec<String> = columns.iter().map(|c| normalize(c)).collect();
        let mut slots = Vec::with_capacity(fields.len());
        let mut unmatched = Vec::new();
        for field in fields {
            // converters are resolved before matching so a missing one fails regardless of the header
            let (strategy, apply) = match field.kind {
                FieldKind::Direct { strategy, apply } => (strategy, apply),
                FieldKind::Converted {
                    type_id,
                    type_name: field_type,
                    apply,
                } => {
                    let converter = registry.get(type_id).ok_or_else(|| {
                        Error::Schema(format!(
                            "unsupported type {field_type} for field '{}': no converter registered",
                            field.name
                        ))
                    })?;
                    let convert = Arc::clone(&converter.convert);
                    let apply: Apply<T> = Arc::new(move |target: &mut T, raw: &str| match convert(raw) {
                        Some(v) => apply(target, v),
                        None => false,
                    });
                    (ParseStrategy::Converter, apply)
                }
            };
            let key = normalize(field.name);
            let Some(column) = normalized.iter().position(|n| !n.is_empty() && *n == key) else {
                unmatched.push(field.name);
                continue;
            };
            slots.push(Slot {
                field: field.name,
                column,
                strategy,
                apply,
            });
        }

        if !unmatched.is_empty() {
            tracing::debug!(target_type = type_name, ?unmatched, "fields without a matching column keep defaults");
        }
        Ok(Self {
            columns,
            plan: Plan::Record(slots),
            unmatched,
        })
    }

    /// Project one row laid out like the header this binder was built for.
    /// Cells that fail to parse leave the field at its default.
    pub fn bind<R: Row + ?Sized>(&self, row: &R) -> T {
        match &self.plan {
            Plan::Single(_) => row
                .value(0)
                .and_then(T::parse_single)
                .unwrap_or_default(),
            Plan::Record(slots) => {
                let mut target = T::default();
                for slot in slots {
                    if let Some(raw) = row.value(slot.column) {
                        (slot.apply)(&mut target, raw);
                    }
                }
                target
            }
        }
    }

    /// Lazily bind every row of `table`.
    pub fn bind_rows<'a, D: DataTable>(
        &'a self,
        table: &'a D,
    ) -> tabula_io::error::Result<impl Iterator<Item = tabula_io::error::Result<T>> + 'a> {
        self.check_layout(&table.column_names())?;
        let rows = table.rows()?;
        Ok(rows.map(move |row| row.map(|row| self.bind(&row))))
    }

    fn check_layout(&self, names: &[String]) -> Result<()> {
        let same = names.len() == self.columns.len()
            && names.iter().zip(&self.columns).all(|(a, b)| same_name(a, b));
        if same {
            Ok(())
        } else {
            Err(Error::Schema(format!(
                "binder was built for columns {:?}, table has {:?}",
                self.columns, names
            )))
        }
    }
}

impl<T> Binder<T> {
    /// `(field, column, strategy)` for every matched field, in field order.
    pub fn bindings(&self) -> Vec<(&'static str, &str, ParseStrategy)> {
        match &self.plan {
            Plan::Single(strategy) => self
                .columns
                .first()
                .map(|c| vec![("", c.as_str(), *strategy)])
                .unwrap_or_default(),
            Plan::Record(slots) => slots
                .iter()
                .map(|s| (s.field, self.columns[s.column].as_str(), s.strategy))
                .collect(),
        }
    }

    /// Fields that matched no column.
    pub fn unmatched_fields(&self) -> &[&'static str] {
        &self.unmatched
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}
