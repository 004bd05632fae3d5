//! `FrameH` — one time-segment record; a file contains one or more frames.

use crate::arena::ObjIndex;

/// GPS time: seconds then nanoseconds, per the wire shape in the external
/// interfaces section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GpsTime {
    pub seconds: u32,
    pub nanoseconds: u32,
}

#[derive(Debug, Clone, Default)]
pub struct FrameH {
    pub name: String,
    pub run: i32,
    pub frame: u32,
    pub data_quality: u32,
    pub gtime: GpsTime,
    pub uleaps: i32,
    pub dt: f64,

    /// Owning containers of children, in declaration order (the wire's
    /// `next`-terminated chains collapse to these on read; the writer
    /// serializes them back out as chains).
    pub types: Vec<ObjIndex>,
    pub user: Vec<ObjIndex>,
    pub detect_sim: Vec<ObjIndex>,
    pub detect_proc: Vec<ObjIndex>,
    pub history: Vec<ObjIndex>,
    pub proc_data: Vec<ObjIndex>,
    pub sim_data: Vec<ObjIndex>,
    pub event: Vec<ObjIndex>,
    pub sim_event: Vec<ObjIndex>,
    pub summary_data: Vec<ObjIndex>,
    pub aux_data: Vec<ObjIndex>,
    pub aux_table: Vec<ObjIndex>,

    /// Shared-ownership pointer to `FrRawData` — `None` is the null
    /// reference.
    pub raw_data: Option<ObjIndex>,
}

impl FrameH {
    /// Leap-second coherence (invariant I8): this is a plausibility check
    /// only (the crate does not carry a leap-second table); it verifies
    /// that `uleaps` is in the historically sane range for the stored GPS
    /// time rather than recomputing it from a table, since the leap-second
    /// schedule is external state this crate does not own.
    pub fn leap_seconds_plausible(&self) -> bool {
        // TAI-UTC has only ever been between 10 (1972) and the high 30s.
        (10..60).contains(&self.uleaps)
    }
}
