//! COUNT-only group aggregator over a STRING grouping column.
//!
//! Built in the bucket-accumulator style of
//! `examples/irving-peng-NU-CS339-Lab3/handin/aggregate.rs`'s `Aggregator`
//! (a map from group key to running accumulator, with a `NO_GROUPING`
//! sentinel collapsing to one bucket), restricted to `COUNT` per spec.md
//! §4.6 — every other aggregate operator returns `UnsupportedAggregate`
//! rather than being silently accepted.

use std::collections::BTreeMap;

use crate::error::{DbError, DbResult};
use crate::field::Field;
use crate::tuple::Tuple;
use crate::tuple_desc::TupleDesc;

/// The full set of aggregate operators a caller might request. Only `Count`
/// is implemented for a string grouping/aggregate column, per spec.md §4.6;
/// the rest exist so `UnsupportedAggregate` has something real to reject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateOp {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

/// A group-by key, or `NoGrouping` when the whole input is a single group.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum GroupKey {
    NoGrouping,
    Group(String),
}

pub struct StringAggregator {
    group_field_index: Option<usize>,
    group_field_type: crate::field::Type,
    aggregate_field_index: usize,
    op: AggregateOp,
    counts: BTreeMap<GroupKey, u64>,
}

impl StringAggregator {
    /// `group_field_index = None` is spec.md §4.6's `NO_GROUPING`.
    /// `group_field_type` only matters when grouping and is used solely to
    /// reconstruct an accurate output `TupleDesc`.
    pub fn new(
        group_field_index: Option<usize>,
        group_field_type: crate::field::Type,
        aggregate_field_index: usize,
        op: AggregateOp,
    ) -> DbResult<Self> {
        match op {
            AggregateOp::Count => Ok(StringAggregator {
                group_field_index,
                group_field_type,
                aggregate_field_index,
                op,
                counts: BTreeMap::new(),
            }),
            AggregateOp::Sum | AggregateOp::Avg | AggregateOp::Min | AggregateOp::Max => {
                Err(DbError::UnsupportedAggregate)
            }
        }
    }

    pub fn merge_tuple_into_group(&mut self, t: &Tuple) -> DbResult<()> {
        let _ = t.field(self.aggregate_field_index);
        let key = match self.group_field_index {
            None => GroupKey::NoGrouping,
            Some(i) => match t.field(i) {
                Field::Str(s) => GroupKey::Group(s.clone()),
                Field::Int(_) => return Err(DbError::TupleDescMismatch),
            },
        };
        *self.counts.entry(key).or_insert(0) += 1;
        Ok(())
    }

    /// Output tuples: `(group_value, count)` per group, or just `(count,)`
    /// under `NO_GROUPING`.
    pub fn iterator(&self) -> Vec<Tuple> {
        self.counts
            .iter()
            .map(|(key, count)| match key {
                GroupKey::NoGrouping => Tuple::new(vec![Field::Int(*count as i32)]),
                GroupKey::Group(s) => {
                    Tuple::new(vec![Field::Str(s.clone()), Field::Int(*count as i32)])
                }
            })
            .collect()
    }

    pub fn tuple_desc(&self) -> TupleDesc {
        use crate::field::Type;
        let items = match self.group_field_index {
            None => vec![Type::Int],
            Some(_) => vec![self.group_field_type, Type::Int],
        };
        TupleDesc::unnamed(items)
    }

    pub fn op(&self) -> AggregateOp {
        self.op
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Type;

    fn row(group: &str, _val: &str) -> Tuple {
        Tuple::new(vec![Field::Str(group.into()), Field::Str("x".into())])
    }

    #[test]
    fn groups_by_string_field() {
        let mut agg =
            StringAggregator::new(Some(0), Type::Str(16), 1, AggregateOp::Count).unwrap();
        agg.merge_tuple_into_group(&row("a", "x")).unwrap();
        agg.merge_tuple_into_group(&row("a", "y")).unwrap();
        agg.merge_tuple_into_group(&row("b", "z")).unwrap();

        let mut out: Vec<(String, i32)> = agg
            .iterator()
            .into_iter()
            .map(|t| match (t.field(0), t.field(1)) {
                (Field::Str(s), Field::Int(c)) => (s.clone(), *c),
                _ => panic!("unexpected output shape"),
            })
            .collect();
        out.sort();
        assert_eq!(out, vec![("a".to_string(), 2), ("b".to_string(), 1)]);
    }

    #[test]
    fn no_grouping_collapses_to_single_count() {
        let mut agg =
            StringAggregator::new(None, Type::Str(16), 0, AggregateOp::Count).unwrap();
        for _ in 0..5 {
            agg.merge_tuple_into_group(&row("ignored", "x")).unwrap();
        }
        let out = agg.iterator();
        assert_eq!(out.len(), 1);
        assert_eq!(*out[0].field(0), Field::Int(5));
        assert_eq!(agg.tuple_desc().len(), 1);
    }

    #[test]
    fn unsupported_operator_is_rejected() {
        let err = StringAggregator::new(None, Type::Str(16), 0, AggregateOp::Sum);
        assert!(matches!(err, Err(DbError::UnsupportedAggregate)));
    }
}
