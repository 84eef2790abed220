//! Predicate operators and a single-field predicate.
//!
//! Grounded on `examples/small-db-small-db/src/predicate.rs` and
//! `examples/small-db-small-db/src/operator.rs` (two overlapping sketches in
//! the teacher repo — `Op`/`Predicate` pulled into one consistent pair),
//! extended with `Like` restricted to strings per spec.md §3.

use std::fmt;

use crate::field::Field;
use crate::tuple::Tuple;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Equals,
    NotEquals,
    LessThan,
    LessThanOrEq,
    GreaterThan,
    GreaterThanOrEq,
    Like,
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Op::Equals => "=",
            Op::NotEquals => "<>",
            Op::LessThan => "<",
            Op::LessThanOrEq => "<=",
            Op::GreaterThan => ">",
            Op::GreaterThanOrEq => ">=",
            Op::Like => "LIKE",
        };
        write!(f, "{}", s)
    }
}

/// `field[field_index] <op> value`, evaluated against a `Tuple`.
#[derive(Debug, Clone)]
pub struct Predicate {
    pub field_index: usize,
    pub op: Op,
    pub value: Field,
}

impl Predicate {
    pub fn new(field_index: usize, op: Op, value: Field) -> Self {
        Predicate {
            field_index,
            op,
            value,
        }
    }

    pub fn matches(&self, tuple: &Tuple) -> bool {
        tuple.field(self.field_index).compare(self.op, &self.value)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field[{}] {} {}", self.field_index, self.op, self.value)
    }
}
