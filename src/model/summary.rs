//! `FrSummaryData` — derived summary statistics attached to a frame.

use crate::arena::ObjIndex;

#[derive(Debug, Clone, Default)]
pub struct FrSummaryData {
    pub name: String,
    pub comment: String,
    pub test: String,
    pub moments: Vec<ObjIndex>,
}
