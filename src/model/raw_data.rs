//! `FrRawData` — container linking all raw-channel records for a frame.

use crate::arena::ObjIndex;

#[derive(Debug, Clone, Default)]
pub struct FrRawData {
    pub name: String,
    pub first_ser: Vec<ObjIndex>,
    pub first_adc: Vec<ObjIndex>,
    pub first_table: Vec<ObjIndex>,
    pub first_msg: Vec<ObjIndex>,
    pub first_misc: Vec<ObjIndex>,
}
