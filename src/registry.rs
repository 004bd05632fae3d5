//! Per-version object registry: maps a kind's on-the-wire numeric id/name
//! to the function pointers that read, write, size and verify it.
//!
//! Grounded on the DESIGN NOTES guidance to replace the original's
//! `FrameSpec::Info` virtual-dispatch table with a `match`-driven closed
//! union (`crate::model::Kind`) plus one small `static` descriptor table per
//! supported wire version, built once per process rather than re-derived on
//! every file open.

use crate::codec::{ByteOrder, PrimRead, PrimWrite};
use crate::codecs::{self, PendingSlot};
use crate::dictionary::Dictionary;
use crate::error::{Error, Result};
use crate::kind::{KindId, Version};
use crate::model::Kind;
use crate::verify::{Finding, VerifyConfig};

pub type ReadFn = fn(&mut dyn PrimRead, ByteOrder, Version) -> Result<(Kind, Vec<PendingSlot>)>;
pub type WriteFn = fn(&Kind, &mut dyn PrimWrite, ByteOrder, &Dictionary) -> Result<()>;
pub type SizeFn = fn(&Kind) -> u64;
pub type VerifyFn = fn(&Kind, &VerifyConfig) -> Vec<Finding>;

#[derive(Clone, Copy)]
pub struct KindDescriptor {
    pub id: KindId,
    /// Numeric class id this kind is assigned on the wire, for this
    /// [`FrameSpec`]'s version.
    pub wire_class: u16,
    pub read: ReadFn,
    pub write: WriteFn,
    pub size_of: SizeFn,
    pub verify: VerifyFn,
}

fn no_findings(_k: &Kind, _cfg: &VerifyConfig) -> Vec<Finding> {
    Vec::new()
}

/// `WriteFn`'s signature has no room for a target `Version`, so each legacy
/// target gets its own non-capturing wrapper around
/// [`codecs::write_adc_data_legacy`] rather than widening the function
/// pointer type for one kind.
fn write_adc_data_v3(k: &Kind, w: &mut dyn PrimWrite, order: ByteOrder, dict: &Dictionary) -> Result<()> {
    codecs::write_adc_data_legacy(k, w, order, dict, Version::V3)
}

fn write_adc_data_v4(k: &Kind, w: &mut dyn PrimWrite, order: ByteOrder, dict: &Dictionary) -> Result<()> {
    codecs::write_adc_data_legacy(k, w, order, dict, Version::V4)
}

fn write_adc_data_v6(k: &Kind, w: &mut dyn PrimWrite, order: ByteOrder, dict: &Dictionary) -> Result<()> {
    codecs::write_adc_data_legacy(k, w, order, dict, Version::V6)
}

fn write_adc_data_v7(k: &Kind, w: &mut dyn PrimWrite, order: ByteOrder, dict: &Dictionary) -> Result<()> {
    codecs::write_adc_data_legacy(k, w, order, dict, Version::V7)
}

/// The full set of [`KindDescriptor`]s in effect for one wire version.
/// `FrAdcData`'s `read`/`write` function pointers are the only ones that
/// vary by version (everything else has no documented version skew in
/// scope here; see DESIGN.md).
pub struct FrameSpec {
    pub version: Version,
    descriptors: Vec<KindDescriptor>,
}

impl FrameSpec {
    pub fn for_version(version: Version) -> &'static FrameSpec {
        static V3: std::sync::OnceLock<FrameSpec> = std::sync::OnceLock::new();
        static V4: std::sync::OnceLock<FrameSpec> = std::sync::OnceLock::new();
        static V6: std::sync::OnceLock<FrameSpec> = std::sync::OnceLock::new();
        static V7: std::sync::OnceLock<FrameSpec> = std::sync::OnceLock::new();
        static V8: std::sync::OnceLock<FrameSpec> = std::sync::OnceLock::new();

        match version.0 {
            3 => V3.get_or_init(|| FrameSpec::build(Version::V3)),
            4 => V4.get_or_init(|| FrameSpec::build(Version::V4)),
            6 => V6.get_or_init(|| FrameSpec::build(Version::V6)),
            7 => V7.get_or_init(|| FrameSpec::build(Version::V7)),
            _ => V8.get_or_init(|| FrameSpec::build(Version::V8)),
        }
    }

    fn build(version: Version) -> FrameSpec {
        let adc_read: ReadFn =
            if version == Version::CURRENT { codecs::read_adc_data_v8 } else { codecs::read_adc_data_legacy };
        // `write_adc_data` always serializes the current (v8) in-memory
        // shape; demoting to an older target version goes through
        // `codecs::write_adc_data_legacy` via one small per-version wrapper
        // below, since a bare `fn` pointer can't also carry the target
        // `Version`.
        let adc_write: WriteFn = match version.0 {
            3 => write_adc_data_v3,
            4 => write_adc_data_v4,
            6 => write_adc_data_v6,
            7 => write_adc_data_v7,
            _ => codecs::write_adc_data,
        };

        let descriptors = vec![
            KindDescriptor {
                id: KindId::FrSH,
                wire_class: 1,
                read: codecs::read_fr_sh,
                write: codecs::write_fr_sh,
                size_of: codecs::size_fr_sh,
                verify: no_findings,
            },
            KindDescriptor {
                id: KindId::FrSE,
                wire_class: 2,
                read: codecs::read_fr_se,
                write: codecs::write_fr_se,
                size_of: codecs::size_fr_se,
                verify: no_findings,
            },
            KindDescriptor {
                id: KindId::FrameH,
                wire_class: 3,
                read: codecs::read_frame_h,
                write: codecs::write_frame_h,
                size_of: codecs::size_frame_h,
                verify: no_findings,
            },
            KindDescriptor {
                id: KindId::FrRawData,
                wire_class: 4,
                read: codecs::read_raw_data,
                write: codecs::write_raw_data,
                size_of: codecs::size_raw_data,
                verify: no_findings,
            },
            KindDescriptor {
                id: KindId::FrAdcData,
                wire_class: 5,
                read: adc_read,
                write: adc_write,
                size_of: codecs::size_adc_data,
                verify: no_findings,
            },
            KindDescriptor {
                id: KindId::FrProcData,
                wire_class: 6,
                read: codecs::read_proc_data,
                write: codecs::write_proc_data,
                size_of: codecs::size_proc_data,
                verify: no_findings,
            },
            KindDescriptor {
                id: KindId::FrVect,
                wire_class: 7,
                read: codecs::read_vect,
                write: codecs::write_vect,
                size_of: codecs::size_vect,
                verify: no_findings,
            },
            KindDescriptor {
                id: KindId::FrDetector,
                wire_class: 8,
                read: codecs::read_detector,
                write: codecs::write_detector,
                size_of: codecs::size_detector,
                verify: no_findings,
            },
            KindDescriptor {
                id: KindId::FrHistory,
                wire_class: 9,
                read: codecs::read_history,
                write: codecs::write_history,
                size_of: codecs::size_history,
                verify: no_findings,
            },
            KindDescriptor {
                id: KindId::FrEvent,
                wire_class: 10,
                read: codecs::read_event,
                write: codecs::write_event,
                size_of: codecs::size_event,
                verify: no_findings,
            },
            KindDescriptor {
                id: KindId::FrSimEvent,
                wire_class: 11,
                read: codecs::read_sim_event,
                write: codecs::write_sim_event,
                size_of: codecs::size_sim_event,
                verify: no_findings,
            },
            KindDescriptor {
                id: KindId::FrSimData,
                wire_class: 12,
                read: codecs::read_sim_data,
                write: codecs::write_sim_data,
                size_of: codecs::size_sim_data,
                verify: no_findings,
            },
            KindDescriptor {
                id: KindId::FrSummary,
                wire_class: 13,
                read: codecs::read_summary,
                write: codecs::write_summary,
                size_of: codecs::size_summary,
                verify: no_findings,
            },
            KindDescriptor {
                id: KindId::FrTable,
                wire_class: 14,
                read: codecs::read_table,
                write: codecs::write_table,
                size_of: codecs::size_table,
                verify: no_findings,
            },
            KindDescriptor {
                id: KindId::FrMsg,
                wire_class: 15,
                read: codecs::read_msg,
                write: codecs::write_msg,
                size_of: codecs::size_msg,
                verify: no_findings,
            },
            KindDescriptor {
                id: KindId::FrEndOfFile,
                wire_class: 16,
                read: codecs::read_eof,
                write: codecs::write_eof,
                size_of: codecs::size_eof,
                verify: no_findings,
            },
        ];

        FrameSpec { version, descriptors }
    }

    pub fn by_id(&self, id: KindId) -> Option<&KindDescriptor> {
        self.descriptors.iter().find(|d| d.id == id)
    }

    pub fn by_wire_class(&self, wire_class: u16) -> Option<&KindDescriptor> {
        self.descriptors.iter().find(|d| d.wire_class == wire_class)
    }

    pub fn wire_class_of(&self, id: KindId) -> Result<u16> {
        self.by_id(id).map(|d| d.wire_class).ok_or(Error::UnsupportedVersion(self.version.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_version_resolves_every_kind_id() {
        let spec = FrameSpec::for_version(Version::CURRENT);
        for id in crate::kind::ALL {
            if *id == KindId::FrTOC {
                continue; // TOC is synthesized, not registry-dispatched
            }
            assert!(spec.by_id(*id).is_some(), "{id:?} missing from registry");
        }
    }

    #[test]
    fn legacy_version_dispatches_adc_data_through_the_promotion_path() {
        let spec = FrameSpec::for_version(Version::V3);
        let desc = spec.by_id(KindId::FrAdcData).unwrap();
        assert_eq!(desc.read as usize, codecs::read_adc_data_legacy as usize);

        let current = FrameSpec::for_version(Version::CURRENT);
        let desc = current.by_id(KindId::FrAdcData).unwrap();
        assert_eq!(desc.read as usize, codecs::read_adc_data_v8 as usize);
    }

    #[test]
    fn legacy_version_dispatches_adc_data_write_through_demotion() {
        let spec = FrameSpec::for_version(Version::V4);
        let desc = spec.by_id(KindId::FrAdcData).unwrap();
        assert_eq!(desc.write as usize, write_adc_data_v4 as usize);
        assert_ne!(desc.write as usize, codecs::write_adc_data as usize);

        let current = FrameSpec::for_version(Version::CURRENT);
        let desc = current.by_id(KindId::FrAdcData).unwrap();
        assert_eq!(desc.write as usize, codecs::write_adc_data as usize);
    }
}
