//! `FrEvent` and `FrSimEvent` — trigger records, real and simulated.

use crate::arena::ObjIndex;
use crate::model::frame_h::GpsTime;

#[derive(Debug, Clone, Default)]
pub struct FrEvent {
    pub name: String,
    pub comment: String,
    pub inputs: String,
    pub gtime: GpsTime,
    pub time_before: f32,
    pub time_after: f32,
    pub amplitude: f64,
    pub probability: f32,
    pub statistics: String,
    pub param: Vec<(String, f64)>,
    pub data: Vec<ObjIndex>,
}

#[derive(Debug, Clone, Default)]
pub struct FrSimEvent {
    pub name: String,
    pub comment: String,
    pub inputs: String,
    pub gtime: GpsTime,
    pub time_before: f32,
    pub time_after: f32,
    pub amplitude: f64,
    pub param: Vec<(String, f64)>,
    pub data: Vec<ObjIndex>,
}
