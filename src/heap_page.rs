//! The slotted heap page: occupancy bitmap + fixed-width tuple slots.
//!
//! Grounded on `examples/small-db-small-db/src/page.rs` (`HeapPage::new`
//! parsing a bitmap header followed by fixed-width rows) and the bitmap
//! construction in `examples/small-db-small-db/src/table.rs`'s
//! `create_random_heap_table` (`BitVec`, header-byte rounding, zero padding)
//! — generalized here into a page that also supports insert/delete and
//! tracks the before-image state spec.md §4.1 and §4.4 need for
//! transactional flush/discard.

use bit_vec::BitVec;

use crate::error::{DbError, DbResult};
use crate::page_id::PageId;
use crate::transaction_id::TransactionId;
use crate::tuple::{RecordId, Tuple};
use crate::tuple_desc::TupleDesc;

#[derive(Clone)]
pub struct HeapPage {
    page_id: PageId,
    tuple_desc: TupleDesc,
    page_size: usize,
    slot_count: usize,
    slots: Vec<Option<Tuple>>,
    dirtied_by: Option<TransactionId>,
    before_image: Option<Vec<u8>>,
}

impl HeapPage {
    /// `N = floor(page_size * 8 / (tuple_width * 8 + 1))`, per spec.md §6.
    pub fn slot_count_for(tuple_desc: &TupleDesc, page_size: usize) -> usize {
        let tuple_width = tuple_desc.width();
        (page_size * 8) / (tuple_width * 8 + 1)
    }

    fn header_size(slot_count: usize) -> usize {
        (slot_count + 7) / 8
    }

    /// Parses a page image read straight off disk.
    pub fn from_bytes(
        page_id: PageId,
        tuple_desc: TupleDesc,
        page_size: usize,
        bytes: &[u8],
    ) -> DbResult<Self> {
        let slot_count = Self::slot_count_for(&tuple_desc, page_size);
        let header_size = Self::header_size(slot_count);
        let header = BitVec::from_bytes(&bytes[..header_size]);
        let tuple_width = tuple_desc.width();

        let mut slots = Vec::with_capacity(slot_count);
        let mut offset = header_size;
        for slot in 0..slot_count {
            let slot_bytes = &bytes[offset..offset + tuple_width];
            if header.get(slot).unwrap_or(false) {
                let mut t = decode_tuple(&tuple_desc, slot_bytes)?;
                t.set_record_id(RecordId::new(page_id, slot));
                slots.push(Some(t));
            } else {
                slots.push(None);
            }
            offset += tuple_width;
        }

        Ok(HeapPage {
            page_id,
            tuple_desc,
            page_size,
            slot_count,
            slots,
            dirtied_by: None,
            before_image: None,
        })
    }

    /// A freshly-allocated, all-empty page (used when a heap file grows).
    pub fn empty(page_id: PageId, tuple_desc: TupleDesc, page_size: usize) -> Self {
        let slot_count = Self::slot_count_for(&tuple_desc, page_size);
        HeapPage {
            page_id,
            tuple_desc,
            page_size,
            slot_count,
            slots: vec![None; slot_count],
            dirtied_by: None,
            before_image: None,
        }
    }

    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    pub fn num_empty_slots(&self) -> usize {
        self.slots.iter().filter(|s| s.is_none()).count()
    }

    /// Inserts into the lowest-index free slot, stamping `t`'s `RecordId`.
    pub fn insert_tuple(&mut self, t: &mut Tuple) -> DbResult<()> {
        let free_slot = self
            .slots
            .iter()
            .position(|s| s.is_none())
            .ok_or(DbError::CapacityFull)?;
        let rid = RecordId::new(self.page_id, free_slot);
        t.set_record_id(rid);
        self.slots[free_slot] = Some(t.clone());
        Ok(())
    }

    /// Clears the slot the tuple's `RecordId` names. The slot bytes are not
    /// zeroed; they are simply no longer considered occupied.
    pub fn delete_tuple(&mut self, t: &Tuple) -> DbResult<()> {
        let rid = t.record_id().ok_or(DbError::NotOnThisPage)?;
        if rid.page_id != self.page_id {
            return Err(DbError::NotOnThisPage);
        }
        match self.slots.get_mut(rid.slot) {
            Some(slot @ Some(_)) => {
                *slot = None;
                Ok(())
            }
            _ => Err(DbError::NotOnThisPage),
        }
    }

    /// Occupied tuples in ascending slot order.
    pub fn iter(&self) -> impl Iterator<Item = Tuple> + '_ {
        self.slots.iter().filter_map(|s| s.clone())
    }

    pub fn tuple_desc(&self) -> &TupleDesc {
        &self.tuple_desc
    }

    /// The canonical on-disk byte image: bitmap header, then `N` fixed-width
    /// slots, then zero padding out to `page_size`.
    pub fn get_page_data(&self) -> Vec<u8> {
        let header_size = Self::header_size(self.slot_count);
        let mut header = BitVec::from_elem(header_size * 8, false);
        for (i, slot) in self.slots.iter().enumerate() {
            if slot.is_some() {
                header.set(i, true);
            }
        }

        let mut buf = header.to_bytes();
        let tuple_width = self.tuple_desc.width();
        for slot in &self.slots {
            match slot {
                Some(t) => {
                    let mut field_bytes = Vec::with_capacity(tuple_width);
                    for (i, item) in self.tuple_desc.items().iter().enumerate() {
                        t.field(i)
                            .serialize(item.field_type, &mut field_bytes)
                            .expect("tuple matches page's tuple_desc");
                    }
                    buf.extend_from_slice(&field_bytes);
                }
                None => buf.extend(std::iter::repeat(0u8).take(tuple_width)),
            }
        }

        buf.resize(self.page_size, 0);
        buf
    }

    pub fn is_dirty(&self) -> bool {
        self.dirtied_by.is_some()
    }

    pub fn dirtied_by(&self) -> Option<TransactionId> {
        self.dirtied_by
    }

    /// Marks the page dirty under `tid`. The first mark-dirty since the last
    /// commit snapshots the current bytes as the before-image.
    pub fn mark_dirty(&mut self, tid: TransactionId) {
        if self.before_image.is_none() {
            self.before_image = Some(self.get_page_data());
        }
        self.dirtied_by = Some(tid);
    }

    pub fn clear_dirty(&mut self) {
        self.dirtied_by = None;
    }

    /// A commit resets the before-image to the post-commit bytes.
    pub fn set_before_image(&mut self) {
        self.before_image = Some(self.get_page_data());
    }

    /// Reconstructs the page as of the moment it was last marked dirty.
    /// Falls back to the current bytes if it was never dirtied (a no-op
    /// restore).
    pub fn before_image(&self) -> DbResult<HeapPage> {
        let bytes = self
            .before_image
            .clone()
            .unwrap_or_else(|| self.get_page_data());
        HeapPage::from_bytes(self.page_id, self.tuple_desc.clone(), self.page_size, &bytes)
    }
}

fn decode_tuple(tuple_desc: &TupleDesc, bytes: &[u8]) -> DbResult<Tuple> {
    let mut fields = Vec::with_capacity(tuple_desc.len());
    let mut offset = 0;
    for item in tuple_desc.items() {
        let width = item.field_type.width();
        let field = crate::field::Field::deserialize(item.field_type, &bytes[offset..offset + width])?;
        fields.push(field);
        offset += width;
    }
    Ok(Tuple::new(fields))
}
