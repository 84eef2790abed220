//! `Tuple` and `RecordId`.
//!
//! Grounded on `examples/small-db-small-db/src/row.rs`'s `Row` (a `Vec` of
//! boxed, dynamically-dispatched cells — this design uses the closed
//! `Field` enum from `field.rs` instead, since spec.md §3 fixes the type
//! system to exactly `{INT, STRING}` and a trait-object cell buys nothing a
//! plain enum doesn't already give).

use std::fmt;

use crate::page_id::PageId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordId {
    pub page_id: PageId,
    pub slot: usize,
}

impl RecordId {
    pub fn new(page_id: PageId, slot: usize) -> Self {
        RecordId { page_id, slot }
    }
}

use crate::field::Field;

#[derive(Debug, Clone, PartialEq)]
pub struct Tuple {
    fields: Vec<Field>,
    record_id: Option<RecordId>,
}

impl Tuple {
    pub fn new(fields: Vec<Field>) -> Self {
        Tuple {
            fields,
            record_id: None,
        }
    }

    pub fn field(&self, i: usize) -> &Field {
        &self.fields[i]
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn record_id(&self) -> Option<RecordId> {
        self.record_id
    }

    pub fn set_record_id(&mut self, rid: RecordId) {
        self.record_id = Some(rid);
    }

    pub fn clear_record_id(&mut self) {
        self.record_id = None;
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.fields.iter().map(|v| v.to_string()).collect();
        write!(f, "({})", parts.join(", "))
    }
}
