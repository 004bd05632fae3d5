//! `FrAdcData` — one analog-to-digital channel's samples plus acquisition
//! metadata, in-memory (version 8) shape.

use crate::arena::ObjIndex;

#[derive(Debug, Clone, Default)]
pub struct FrAdcData {
    pub name: String,
    pub comment: String,
    pub channel_group: u32,
    pub channel_number: u32,
    pub n_bits: u32,
    pub bias: f32,
    pub slope: f32,
    pub units: String,
    pub sample_rate: f64,
    /// Collapsed from v3-v7's separate `timeOffsetS`/`timeOffsetN` fields
    /// during promotion; see [`crate::version`].
    pub time_offset: f64,
    pub f_shift: f64,
    pub phase: f32,
    /// Renamed from v3-v7's `overRange` during promotion.
    pub data_valid: u32,

    pub data: Vec<ObjIndex>,
    pub aux: Vec<ObjIndex>,
}

/// Fields as they exist on the wire for versions 3, 4 and 6 — kept
/// alongside the in-memory shape so the promotion/demotion adapters in
/// [`crate::version`] have a concrete source/target type instead of raw
/// field soup.
#[derive(Debug, Clone, Default)]
pub struct FrAdcDataLegacy {
    pub name: String,
    pub comment: String,
    pub crate_num: u16,
    pub channel: u16,
    pub n_bits: u32,
    pub bias: f32,
    pub slope: f32,
    pub units: String,
    pub sample_rate: f64,
    pub time_offset_s: u32,
    pub time_offset_n: u32,
    pub f_shift: f64,
    pub over_range: u32,

    pub data: Vec<ObjIndex>,
    pub aux: Vec<ObjIndex>,
}
