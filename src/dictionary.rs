//! Reference dictionary: maps on-the-wire `(class, instance)` ids to live
//! objects during read, and assigns fresh instance ids during write.
//!
//! Grounded on `framecpp/Common/Dictionary.hh`. The four maps the header
//! describes collapse to three here since `object_by_ref` and `ref_by_id`
//! are one lookup once the arena holds the decoded object directly (no
//! separate "raw streamref" needed once the object exists):
//!
//! - `declared`: `(class, instance) -> ObjIndex` (`ref_by_id` + `object_by_ref` combined)
//! - `ref_by_object`: `ObjIndex -> (class, instance)` (the inverse, used on write for dedup)
//! - `instance_counter`: `class -> next instance id` (write path only)
//! - `next_of`: linked-list helper, `ObjIndex -> WireRef`. Stores the raw wire
//!   reference an object's trailing "next" field named on read (or that the
//!   writer assigned on write), resolved lazily by
//!   [`crate::resolver::Resolver::resolve_list`] rather than eagerly —
//!   the target may not have its own `ObjIndex` yet at the point its
//!   predecessor in the chain is declared.

use std::collections::HashMap;

use crate::arena::ObjIndex;
use crate::error::{Error, Result};
use crate::kind::KindId;

pub type WireRef = (u16, u32);

pub const NULL_REF: WireRef = (0, 0);

#[derive(Debug, Default)]
pub struct Dictionary {
    declared: HashMap<WireRef, ObjIndex>,
    ref_by_object: HashMap<ObjIndex, WireRef>,
    instance_counter: HashMap<u16, u32>,
    next_of: HashMap<ObjIndex, WireRef>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a just-decoded object's wire reference (invariant I1:
    /// dictionary uniqueness within file scope).
    pub fn declare(&mut self, wire_ref: WireRef, kind_id: KindId, idx: ObjIndex) -> Result<()> {
        if wire_ref != NULL_REF && self.declared.contains_key(&wire_ref) {
            return Err(Error::DuplicateDeclaration { class: kind_id, instance: wire_ref.1 });
        }
        self.declared.insert(wire_ref, idx);
        self.ref_by_object.insert(idx, wire_ref);
        Ok(())
    }

    pub fn lookup(&self, wire_ref: WireRef) -> Option<ObjIndex> {
        if wire_ref == NULL_REF {
            return None;
        }
        self.declared.get(&wire_ref).copied()
    }

    pub fn wire_ref_of(&self, idx: ObjIndex) -> Option<WireRef> {
        self.ref_by_object.get(&idx).copied()
    }

    /// Assign the next instance id for `class`, starting at 0 and
    /// incrementing with no gaps (P7).
    pub fn next_instance(&mut self, class: u16) -> u32 {
        let counter = self.instance_counter.entry(class).or_insert(0);
        let assigned = *counter;
        *counter += 1;
        assigned
    }

    /// Reset every per-class counter to zero, at the start of each logical
    /// file and after `EndOfFile`.
    pub fn reset_instance_counts(&mut self) {
        self.instance_counter.clear();
    }

    /// Record the raw wire reference named by `obj`'s own trailing "next"
    /// field. Stored as a [`WireRef`] rather than resolved to an `ObjIndex`
    /// immediately: the target may not have been declared yet when its
    /// predecessor in the chain is.
    pub fn set_next(&mut self, obj: ObjIndex, next: WireRef) {
        if next != NULL_REF {
            self.next_of.insert(obj, next);
        }
    }

    pub fn next(&self, obj: ObjIndex) -> Option<WireRef> {
        self.next_of.get(&obj).copied()
    }

    pub fn clear(&mut self) {
        self.declared.clear();
        self.ref_by_object.clear();
        self.instance_counter.clear();
        self.next_of.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.declared.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_declaration_is_rejected() {
        let mut dict = Dictionary::new();
        dict.declare((5, 1), KindId::FrAdcData, ObjIndex(0)).unwrap();
        let err = dict.declare((5, 1), KindId::FrAdcData, ObjIndex(1)).unwrap_err();
        assert!(matches!(err, Error::DuplicateDeclaration { class: KindId::FrAdcData, instance: 1 }));
    }

    #[test]
    fn null_reference_is_never_declared_or_looked_up() {
        let dict = Dictionary::new();
        assert_eq!(dict.lookup(NULL_REF), None);
    }

    #[test]
    fn instance_counter_is_gapless_and_monotonic() {
        let mut dict = Dictionary::new();
        assert_eq!(dict.next_instance(5), 0);
        assert_eq!(dict.next_instance(5), 1);
        assert_eq!(dict.next_instance(5), 2);
        assert_eq!(dict.next_instance(6), 0);
    }

    #[test]
    fn reset_after_eof_clears_counters_but_not_wire_refs() {
        let mut dict = Dictionary::new();
        dict.declare((5, 1), KindId::FrAdcData, ObjIndex(0)).unwrap();
        dict.next_instance(5);
        dict.reset_instance_counts();
        assert_eq!(dict.next_instance(5), 0);
        assert_eq!(dict.lookup((5, 1)), Some(ObjIndex(0)));
    }
}
