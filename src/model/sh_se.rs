//! `FrSH` / `FrSE` — schema header and schema element records.
//!
//! Self-describing schema announcements: the first time a kind appears in a
//! file, the writer emits one `FrSH` naming it, followed by one `FrSE` per
//! field. Ids 1 and 2 are reserved for these on every wire version
//! (spec.md §3). The in-memory object model never needs to *read* these
//! back into anything beyond validation — they describe the wire's kind
//! table, not application data — but the writer still emits them and the
//! reader can cross-check a compiled-in kind against what the file claims.

#[derive(Debug, Clone, Default)]
pub struct FrSH {
    pub name: String,
    pub class: u32,
    pub comment: String,
}

#[derive(Debug, Clone, Default)]
pub struct FrSE {
    pub name: String,
    pub comment: String,
    /// Field type, stored as the schema's own type name string (e.g.
    /// `"INT_4U"`, `"STRING"`) rather than re-deriving a closed enum the
    /// rest of the crate never consults.
    pub field_type: String,
}
