//! `FrDetector` — static per-detector metadata, indexed by name in the TOC.

use crate::arena::ObjIndex;

#[derive(Debug, Clone, Default)]
pub struct FrDetector {
    pub name: String,
    pub prefix: String,
    pub longitude: f64,
    pub latitude: f64,
    pub elevation: f32,
    pub arm_x_azimuth: f32,
    pub arm_y_azimuth: f32,
    pub aux_data: Vec<ObjIndex>,
    pub aux_table: Vec<ObjIndex>,
}
