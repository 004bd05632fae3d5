//! Crate-wide error taxonomy.
//!
//! One variant per failure named in the Frame format's error taxonomy.
//! Structural/referential/checksum failures carry the fields needed to
//! point a caller (or the verifier's report) at the offending record.

use thiserror::Error;

use crate::checksum::ChecksumKind;
use crate::kind::KindId;

/// Which scope a checksum mismatch was detected in. Per-structure CRC is
/// modeled on the wire (`RecordHeader.chk_type`) but never computed or
/// verified, so it has no scope variant here; see DESIGN.md.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumScope {
    File,
    Frame,
}

impl std::fmt::Display for ChecksumScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChecksumScope::File => write!(f, "file"),
            ChecksumScope::Frame => write!(f, "frame"),
        }
    }
}

/// Single crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("not a Frame file: magic number never matched, even after byte-swap")]
    NotAFrameFile,

    #[error("unsupported Frame version {0}")]
    UnsupportedVersion(u8),

    #[error("unexpected end of stream")]
    UnexpectedEof,

    #[error("operation invalid in current stream state: {0}")]
    ProtocolMisuse(&'static str),

    #[error("{scope} checksum mismatch ({kind:?}): expected {expected:#x}, got {actual:#x}")]
    ChecksumMismatch {
        kind: ChecksumKind,
        expected: u32,
        actual: u32,
        scope: ChecksumScope,
    },

    #[error("strict mode requires a checksum but none was recorded")]
    NoChecksum,

    #[error("dangling reference: class={class:?} instance={instance}")]
    DanglingReference { class: KindId, instance: u32 },

    #[error("duplicate declaration: class={class:?} instance={instance}")]
    DuplicateDeclaration { class: KindId, instance: u32 },

    #[error("duplicate channel name in kind {kind:?}: {name}")]
    DuplicateChannelName { kind: KindId, name: String },

    #[error("string length prefix exceeds the field's maximum length")]
    StringTooLong,

    #[error("metadata invalid: {0}")]
    MetadataInvalid(String),

    #[error("metadata mismatch between filename and frame header: {0}")]
    MetadataMismatch(String),

    #[error("data marked invalid under strict data-valid policy: {0}")]
    DataInvalid(String),

    #[error("value has no representation in the older version: {0}")]
    LossyDemote(String),

    #[error("version adapter not implemented: {0}")]
    Unimplemented(&'static str),

    #[error("invalid frame structure: {0}")]
    InvalidFrameStructure(String),

    #[error("truncated file: EOF record absent or offset past end of buffer")]
    Truncation,

    #[error("dynamic buffer needs {needed} more bytes than the {available} supplied")]
    NeedMoreData { needed: usize, available: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
