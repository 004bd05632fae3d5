//! The object model: every concrete record type the registry knows how to
//! serialize/deserialize/promote/demote/verify, collapsed into one closed
//! tagged union per DESIGN NOTES ("replace polymorphism with a closed
//! tagged union keyed by kind id").

pub mod adc_data;
pub mod detector;
pub mod event;
pub mod eof;
pub mod frame_h;
pub mod history;
pub mod msg;
pub mod proc_data;
pub mod raw_data;
pub mod sh_se;
pub mod sim_data;
pub mod summary;
pub mod table;
pub mod vect;

pub use adc_data::{FrAdcData, FrAdcDataLegacy};
pub use detector::FrDetector;
pub use event::{FrEvent, FrSimEvent};
pub use eof::FrEndOfFile;
pub use frame_h::{FrameH, GpsTime};
pub use history::FrHistory;
pub use msg::FrMsg;
pub use proc_data::FrProcData;
pub use raw_data::FrRawData;
pub use sh_se::{FrSE, FrSH};
pub use sim_data::FrSimData;
pub use summary::FrSummaryData;
pub use table::FrTable;
pub use vect::{DataType, Dimension, FrVect, Payload};

use crate::kind::KindId;
use crate::toc::Toc;

/// Every object a Frame file can contain, as one closed union. Every
/// per-kind operation in [`crate::registry`] is a `match` arm over this
/// type rather than a virtual call.
#[derive(Debug, Clone)]
pub enum Kind {
    FrSH(FrSH),
    FrSE(FrSE),
    FrameH(FrameH),
    FrRawData(FrRawData),
    FrAdcData(FrAdcData),
    FrProcData(FrProcData),
    FrVect(FrVect),
    FrDetector(FrDetector),
    FrHistory(FrHistory),
    FrEvent(FrEvent),
    FrSimEvent(FrSimEvent),
    FrSimData(FrSimData),
    FrSummary(FrSummaryData),
    FrTable(FrTable),
    FrMsg(FrMsg),
    FrEndOfFile(FrEndOfFile),
    FrTOC(Toc),
}

impl Kind {
    pub fn kind_id(&self) -> KindId {
        match self {
            Kind::FrSH(_) => KindId::FrSH,
            Kind::FrSE(_) => KindId::FrSE,
            Kind::FrameH(_) => KindId::FrameH,
            Kind::FrRawData(_) => KindId::FrRawData,
            Kind::FrAdcData(_) => KindId::FrAdcData,
            Kind::FrProcData(_) => KindId::FrProcData,
            Kind::FrVect(_) => KindId::FrVect,
            Kind::FrDetector(_) => KindId::FrDetector,
            Kind::FrHistory(_) => KindId::FrHistory,
            Kind::FrEvent(_) => KindId::FrEvent,
            Kind::FrSimEvent(_) => KindId::FrSimEvent,
            Kind::FrSimData(_) => KindId::FrSimData,
            Kind::FrSummary(_) => KindId::FrSummary,
            Kind::FrTable(_) => KindId::FrTable,
            Kind::FrMsg(_) => KindId::FrMsg,
            Kind::FrEndOfFile(_) => KindId::FrEndOfFile,
            Kind::FrTOC(_) => KindId::FrTOC,
        }
    }

    pub fn as_frame_h(&self) -> Option<&FrameH> {
        match self {
            Kind::FrameH(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_frame_h_mut(&mut self) -> Option<&mut FrameH> {
        match self {
            Kind::FrameH(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_adc_data(&self) -> Option<&FrAdcData> {
        match self {
            Kind::FrAdcData(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_proc_data(&self) -> Option<&FrProcData> {
        match self {
            Kind::FrProcData(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_raw_data(&self) -> Option<&FrRawData> {
        match self {
            Kind::FrRawData(r) => Some(r),
            _ => None,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Kind::FrameH(f) => Some(&f.name),
            Kind::FrRawData(r) => Some(&r.name),
            Kind::FrAdcData(a) => Some(&a.name),
            Kind::FrProcData(p) => Some(&p.name),
            Kind::FrVect(v) => Some(&v.name),
            Kind::FrDetector(d) => Some(&d.name),
            Kind::FrHistory(h) => Some(&h.name),
            Kind::FrEvent(e) => Some(&e.name),
            Kind::FrSimEvent(e) => Some(&e.name),
            Kind::FrSimData(s) => Some(&s.name),
            Kind::FrSummary(s) => Some(&s.name),
            Kind::FrTable(t) => Some(&t.name),
            Kind::FrSH(s) => Some(&s.name),
            Kind::FrSE(s) => Some(&s.name),
            Kind::FrMsg(_) | Kind::FrEndOfFile(_) | Kind::FrTOC(_) => None,
        }
    }
}
