//! `TupleDesc`: an ordered schema of `(Type, optional name)` pairs.
//!
//! Grounded on `examples/small-db-small-db/src/row.rs`'s `RowScheme`
//! (element-wise `PartialEq`, `merge`), rebuilt against the unified
//! `Type`/`Field` pair in `field.rs`.

use std::fmt;

use crate::field::Type;

#[derive(Debug, Clone)]
pub struct TupleDescItem {
    pub field_type: Type,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TupleDesc {
    items: Vec<TupleDescItem>,
}

impl TupleDesc {
    pub fn new(types: Vec<Type>, names: Vec<Option<String>>) -> Self {
        let items = types
            .into_iter()
            .zip(names.into_iter().chain(std::iter::repeat(None)))
            .map(|(field_type, name)| TupleDescItem { field_type, name })
            .collect();
        TupleDesc { items }
    }

    /// A `TupleDesc` with no field names, the common case for operator output.
    pub fn unnamed(types: Vec<Type>) -> Self {
        let items = types
            .into_iter()
            .map(|field_type| TupleDescItem {
                field_type,
                name: None,
            })
            .collect();
        TupleDesc { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn field_type(&self, i: usize) -> Type {
        self.items[i].field_type
    }

    pub fn name(&self, i: usize) -> Option<&str> {
        self.items[i].name.as_deref()
    }

    pub fn items(&self) -> &[TupleDescItem] {
        &self.items
    }

    /// Sum of per-field on-disk widths; the slot width in the heap-page
    /// format (spec.md §6).
    pub fn width(&self) -> usize {
        self.items.iter().map(|i| i.field_type.width()).sum()
    }

    /// Equality is element-wise type match only; names are advisory.
    pub fn type_matches(&self, other: &TupleDesc) -> bool {
        self.items.len() == other.items.len()
            && self
                .items
                .iter()
                .zip(other.items.iter())
                .all(|(a, b)| a.field_type == b.field_type)
    }

    pub fn merge(a: &TupleDesc, b: &TupleDesc) -> TupleDesc {
        let mut items = a.items.clone();
        items.extend(b.items.clone());
        TupleDesc { items }
    }

    /// Index of the first field named `name`, if any table-alias-qualified
    /// or bare name matches.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.items.iter().position(|i| i.name.as_deref() == Some(name))
    }
}

impl fmt::Display for TupleDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .items
            .iter()
            .map(|i| match &i.name {
                Some(n) => format!("{}({})", n, i.field_type),
                None => format!("{}", i.field_type),
            })
            .collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_sums_field_widths() {
        let td = TupleDesc::unnamed(vec![Type::Int, Type::Str(10), Type::Int]);
        assert_eq!(td.width(), 4 + (4 + 10) + 4);
    }

    #[test]
    fn type_matches_ignores_names() {
        let a = TupleDesc::new(
            vec![Type::Int, Type::Str(4)],
            vec![Some("id".into()), Some("name".into())],
        );
        let b = TupleDesc::unnamed(vec![Type::Int, Type::Str(4)]);
        assert!(a.type_matches(&b));

        let c = TupleDesc::unnamed(vec![Type::Str(4), Type::Int]);
        assert!(!a.type_matches(&c));
    }

    #[test]
    fn merge_concatenates_fields_in_order() {
        let a = TupleDesc::unnamed(vec![Type::Int]);
        let b = TupleDesc::unnamed(vec![Type::Str(4)]);
        let merged = TupleDesc::merge(&a, &b);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.field_type(0), Type::Int);
        assert_eq!(merged.field_type(1), Type::Str(4));
    }

    #[test]
    fn index_of_finds_named_field() {
        let td = TupleDesc::new(vec![Type::Int], vec![Some("id".into())]);
        assert_eq!(td.index_of("id"), Some(0));
        assert_eq!(td.index_of("missing"), None);
    }
}
