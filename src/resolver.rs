//! Deferred reference resolver.
//!
//! While a record's body is being decoded, any pointer field it contains
//! cannot be dereferenced inline — the target may not have been read yet.
//! Instead the decoder registers a [`Patch`] describing where the pointer
//! ultimately needs to land; the queue is drained once the reader reaches a
//! drain point (end-of-frame or end-of-file, per the Frame version in
//! effect).
//!
//! Per DESIGN NOTES ("allocate-all-then-patch"), the patch itself is a
//! plain closure over the arena and the resolved index/indices rather than
//! a hand-rolled enum naming every possible field — this is the idiomatic
//! Rust rendering of "a mutable slot to fill in later" without unsafe
//! aliasing: patches apply strictly after every object for the current
//! drain scope has been allocated into the arena.

use crate::arena::{Arena, ObjIndex};
use crate::dictionary::{Dictionary, WireRef, NULL_REF};
use crate::error::{Error, Result};
use crate::kind::KindId;

/// Where a resolved pointer (or resolved linked-list) should be written
/// once its target(s) are known.
pub enum Patch {
    /// A single pointer field, e.g. `FrameH.raw_data`.
    Slot {
        target: WireRef,
        target_kind: KindId,
        apply: Box<dyn FnOnce(&mut Arena, ObjIndex)>,
    },
    /// The head of a `next`-terminated linked list; resolves to an ordered
    /// `Vec<ObjIndex>` that replaces the wire's chain with the in-memory
    /// model's owning container (scenario 6: linked-list merge).
    ListHead {
        head: WireRef,
        element_kind: KindId,
        apply: Box<dyn FnOnce(&mut Arena, Vec<ObjIndex>)>,
    },
}

impl std::fmt::Debug for Patch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Patch::Slot { target, target_kind, .. } => {
                f.debug_struct("Patch::Slot").field("target", target).field("target_kind", target_kind).finish()
            }
            Patch::ListHead { head, element_kind, .. } => f
                .debug_struct("Patch::ListHead")
                .field("head", head)
                .field("element_kind", element_kind)
                .finish(),
        }
    }
}

impl Patch {
    pub fn slot(
        target: WireRef,
        target_kind: KindId,
        apply: impl FnOnce(&mut Arena, ObjIndex) + 'static,
    ) -> Patch {
        Patch::Slot { target, target_kind, apply: Box::new(apply) }
    }

    pub fn list_head(
        head: WireRef,
        element_kind: KindId,
        apply: impl FnOnce(&mut Arena, Vec<ObjIndex>) + 'static,
    ) -> Patch {
        Patch::ListHead { head, element_kind, apply: Box::new(apply) }
    }

    fn target(&self) -> WireRef {
        match self {
            Patch::Slot { target, .. } => *target,
            Patch::ListHead { head, .. } => *head,
        }
    }
}

#[derive(Default, Debug)]
pub struct Resolver {
    queue: Vec<Patch>,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// A resolver whose target is the null reference is discarded
    /// immediately rather than queued.
    pub fn push(&mut self, patch: Patch) {
        if patch.target() != NULL_REF {
            self.queue.push(patch);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Drain the queue in insertion order. A target absent from the
    /// dictionary at drain time is `DanglingReference` (P6, invariant I2).
    pub fn drain(&mut self, dict: &Dictionary, arena: &mut Arena) -> Result<()> {
        for patch in self.queue.drain(..) {
            match patch {
                Patch::Slot { target, target_kind, apply } => {
                    let idx = dict
                        .lookup(target)
                        .ok_or(Error::DanglingReference { class: target_kind, instance: target.1 })?;
                    apply(arena, idx);
                }
                Patch::ListHead { head, element_kind, apply } => {
                    let list = Self::resolve_list(dict, element_kind, head)?;
                    apply(arena, list);
                }
            }
        }
        Ok(())
    }

    /// Walk a `next`-terminated linked list rooted at `head`, in wire
    /// order.
    pub fn resolve_list(dict: &Dictionary, element_kind: KindId, head: WireRef) -> Result<Vec<ObjIndex>> {
        let mut out = Vec::new();
        let mut cursor = head;
        while cursor != NULL_REF {
            let idx = dict
                .lookup(cursor)
                .ok_or(Error::DanglingReference { class: element_kind, instance: cursor.1 })?;
            out.push(idx);
            cursor = dict.next(idx).unwrap_or(NULL_REF);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FrDetector, Kind};

    fn push_detector(arena: &mut Arena, dict: &mut Dictionary, wire: WireRef, name: &str) -> ObjIndex {
        let idx = arena.push(Kind::FrDetector(FrDetector { name: name.into(), ..Default::default() }));
        dict.declare(wire, KindId::FrDetector, idx).unwrap();
        idx
    }

    #[test]
    fn drain_patches_in_order_and_reports_dangling() {
        let mut arena = Arena::new();
        let dict = Dictionary::new();
        let mut resolver = Resolver::new();

        let owner = arena.push(Kind::FrDetector(FrDetector::default()));
        resolver.push(Patch::slot((9, 1), KindId::FrDetector, move |arena, idx| {
            if let Kind::FrDetector(d) = arena.get_mut(owner) {
                d.prefix = format!("resolved:{}", idx.0);
            }
        }));

        // Target never declared -> dangling.
        let err = resolver.drain(&dict, &mut arena).unwrap_err();
        assert!(matches!(err, Error::DanglingReference { class: KindId::FrDetector, instance: 1 }));

        // Now declare and retry with a fresh resolver.
        let mut dict = dict;
        let target = push_detector(&mut arena, &mut dict, (9, 1), "H1");
        let mut resolver = Resolver::new();
        resolver.push(Patch::slot((9, 1), KindId::FrDetector, move |arena, idx| {
            if let Kind::FrDetector(d) = arena.get_mut(owner) {
                d.prefix = format!("resolved:{}", idx.0);
            }
        }));
        resolver.drain(&dict, &mut arena).unwrap();
        if let Kind::FrDetector(d) = arena.get(owner) {
            assert_eq!(d.prefix, format!("resolved:{}", target.0));
        } else {
            panic!("expected FrDetector");
        }
    }

    #[test]
    fn null_target_is_discarded_not_queued() {
        let mut resolver = Resolver::new();
        resolver.push(Patch::slot(NULL_REF, KindId::FrDetector, |_, _| {}));
        assert!(resolver.is_empty());
    }

    #[test]
    fn resolve_list_walks_next_chain_in_wire_order() {
        let mut arena = Arena::new();
        let mut dict = Dictionary::new();
        let a = push_detector(&mut arena, &mut dict, (9, 1), "A");
        let b = push_detector(&mut arena, &mut dict, (9, 2), "B");
        dict.set_next(a, (9, 2));

        let chain = Resolver::resolve_list(&dict, KindId::FrDetector, (9, 1)).unwrap();
        assert_eq!(chain, vec![a, b]);
    }

    #[test]
    fn resolve_list_on_empty_head_is_empty() {
        let dict = Dictionary::new();
        let chain = Resolver::resolve_list(&dict, KindId::FrDetector, NULL_REF).unwrap();
        assert!(chain.is_empty());
    }

    #[test]
    fn list_head_patch_applies_resolved_vec_via_drain() {
        let mut arena = Arena::new();
        let mut dict = Dictionary::new();
        let a = push_detector(&mut arena, &mut dict, (9, 1), "A");
        let b = push_detector(&mut arena, &mut dict, (9, 2), "B");
        dict.set_next(a, (9, 2));

        let owner = arena.push(Kind::FrDetector(FrDetector::default()));
        let mut resolver = Resolver::new();
        resolver.push(Patch::list_head((9, 1), KindId::FrDetector, move |arena, list| {
            if let Kind::FrDetector(d) = arena.get_mut(owner) {
                d.aux_data = list;
            }
        }));
        resolver.drain(&dict, &mut arena).unwrap();
        if let Kind::FrDetector(d) = arena.get(owner) {
            assert_eq!(d.aux_data, vec![a, b]);
        } else {
            panic!("expected FrDetector");
        }
    }
}
