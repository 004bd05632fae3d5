//! `FrVect` — a typed, optionally compressed numeric array with dimension
//! metadata.
//!
//! Numeric compression codecs themselves are out of scope (spec.md §1: "the
//! compression algorithms themselves are a black-box codec"). This crate
//! only needs to detect whether a vector's payload is compressed and, if
//! asked, hand it to an external expander — it never implements a codec.

/// One axis of a (possibly multi-dimensional) vector.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dimension {
    pub nx: u64,
    pub dx: f64,
    pub start_x: f64,
    // `unitX` is a short string in the wire format; stored on `FrVect`
    // itself as `unit_x` per-dimension would duplicate it needlessly since
    // every dimension of one `FrVect` shares a unit in practice. Elaborated
    // leaf kinds like this one keep the shape needed for containment and
    // TOC bookkeeping rather than full field fidelity (spec.md §1 Non-goal:
    // "field semantics beyond what is needed to serialize/verify them").
}

/// Numeric element type, mirroring the standard Frame `FrVect` type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Complex64,
    Complex128,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
}

/// A vector's payload, as this crate is able to observe it: either still
/// compressed (opaque bytes plus the scheme id it was tagged with) or
/// expanded to raw little/native bytes by an external codec the caller
/// supplied.
#[derive(Debug, Clone)]
pub enum Payload {
    Compressed { scheme: u16, raw: Vec<u8> },
    Expanded(Vec<u8>),
}

#[derive(Debug, Clone)]
pub struct FrVect {
    pub name: String,
    pub data_type: DataType,
    pub n_bytes: u64,
    pub dimensions: Vec<Dimension>,
    pub unit_y: String,
    pub payload: Payload,
}

impl FrVect {
    pub fn is_compressed(&self) -> bool {
        matches!(self.payload, Payload::Compressed { .. })
    }

    /// Replace a compressed payload with caller-expanded bytes. Used by
    /// `check-expandability` in the verifier and by callers that need raw
    /// samples. Does nothing (returns `false`) if the payload is already
    /// expanded.
    pub fn expand_with(&mut self, expander: impl FnOnce(u16, &[u8]) -> Vec<u8>) -> bool {
        if let Payload::Compressed { scheme, raw } = &self.payload {
            let expanded = expander(*scheme, raw);
            self.payload = Payload::Expanded(expanded);
            true
        } else {
            false
        }
    }
}
