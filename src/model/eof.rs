//! `FrEndOfFile` — closing record of a Frame file.

use crate::checksum::ChecksumKind;

#[derive(Debug, Clone, Default)]
pub struct FrEndOfFile {
    pub nframe: u32,
    pub toc_offset: u64,
    pub chk_type: Option<ChecksumKind>,
    /// Total byte count of the file up to the start of this record.
    pub nbytes: u64,
    /// File-scope checksum; `0` is legal and means "not computed" (§4.6).
    pub chk_sum: u32,
}
