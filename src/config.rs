//! Runtime stream preferences: checksum policy, TOC emission, strict mode
//! and the target write version.

use crate::checksum::ChecksumKind;
use crate::kind::Version;

/// Checksum policy applied on write, and expected (but not enforced until
/// [`VerifyConfig`](crate::verify::VerifyConfig) says so) on read.
///
/// Per-structure CRC (§4.6's `chkType`/`structCRC` fields on each record)
/// is modeled on the wire but never computed or verified by this crate —
/// only the whole-file checksum reported in `FrEndOfFile` is. There is no
/// variant for structure-only checksums; see DESIGN.md.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumPolicy {
    /// Never compute or write a checksum.
    None,
    /// Whole-file checksum, reported in `FrEndOfFile`.
    File(ChecksumKind),
}

impl Default for ChecksumPolicy {
    fn default() -> Self {
        ChecksumPolicy::File(ChecksumKind::Ldas)
    }
}

/// Stream-wide preferences, analogous to the teacher's block-size/level
/// preferences but governing Frame structural choices instead.
#[derive(Debug, Clone, Copy)]
pub struct StreamConfig {
    pub write_version: Version,
    pub checksum_policy: ChecksumPolicy,
    /// Reject on first structural problem instead of collecting findings
    /// (mirrors [`crate::verify::VerifyConfig::fail_fast`] but governs the
    /// read path's own internal checks, not a separate verify pass).
    pub strict: bool,
    /// Emit a TOC record at close. Required for random access; disabling it
    /// is only sensible for short-lived streaming writers.
    pub write_toc: bool,
    /// Reject frames whose `FrAdcData`/`FrSimData` carry `dataValid != 0`
    /// under `strict`, per spec.md §4's data-validity edge case.
    pub reject_invalid_data: bool,
}

impl Default for StreamConfig {
    fn default() -> Self {
        StreamConfig {
            write_version: Version::CURRENT,
            checksum_policy: ChecksumPolicy::default(),
            strict: false,
            write_toc: true,
            reject_invalid_data: false,
        }
    }
}

impl StreamConfig {
    pub fn strict() -> Self {
        StreamConfig { strict: true, reject_invalid_data: true, ..Default::default() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_targets_current_version_with_a_file_checksum() {
        let cfg = StreamConfig::default();
        assert_eq!(cfg.write_version, Version::CURRENT);
        assert!(matches!(cfg.checksum_policy, ChecksumPolicy::File(_)));
        assert!(!cfg.strict);
    }

    #[test]
    fn strict_preset_rejects_invalid_data() {
        let cfg = StreamConfig::strict();
        assert!(cfg.strict);
        assert!(cfg.reject_invalid_data);
    }
}
