//! `FrSimData` — simulated channel data, shaped like `FrAdcData` but
//! without acquisition metadata.

use crate::arena::ObjIndex;

#[derive(Debug, Clone, Default)]
pub struct FrSimData {
    pub name: String,
    pub comment: String,
    pub sample_rate: f64,
    pub time_offset: f64,
    pub f_shift: f64,
    pub phase: f32,
    pub data: Vec<ObjIndex>,
    pub input: Vec<ObjIndex>,
}
