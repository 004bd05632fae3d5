//! `FrHistory` — one entry of processing provenance attached to a frame.

#[derive(Debug, Clone, Default)]
pub struct FrHistory {
    pub name: String,
    pub time: u32,
    pub comment: String,
}
