//! `FrProcData` — one processed (derived) time series plus its provenance.

use crate::arena::ObjIndex;
use crate::model::frame_h::GpsTime;

#[derive(Debug, Clone, Default)]
pub struct FrProcData {
    pub name: String,
    pub comment: String,
    pub sample_rate: f64,
    pub time_offset: GpsTime,
    pub f_shift: f64,

    pub data: Vec<ObjIndex>,
    /// Optional table of decoration (`None` if absent).
    pub aux_table: Option<ObjIndex>,
    pub aux: Vec<ObjIndex>,
}
