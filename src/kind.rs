//! The closed set of object kinds a Frame file can contain.
//!
//! `KindId` is a logical, version-independent tag. The *numeric* id a given
//! kind is assigned on the wire varies by Frame version (see
//! [`crate::registry::FrameSpec`]); `KindId` is what the rest of the crate
//! matches on so that promotion/demotion and the dictionary never have to
//! care which version's numbering is in effect.
//!
//! Ids 0 ([`KindId::Null`]), 1 ([`KindId::FrSH`]) and 2 ([`KindId::FrSE`])
//! are reserved on every wire version.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KindId {
    /// Null chain terminator, `(class=0, instance=0)`. Never declared.
    Null,
    /// Schema header — announces a kind's `(name, class, comment)`.
    FrSH,
    /// Schema element — announces one field of a schema.
    FrSE,
    FrameH,
    FrRawData,
    FrAdcData,
    FrProcData,
    FrVect,
    FrDetector,
    FrHistory,
    FrEvent,
    FrSimEvent,
    FrSimData,
    FrSummary,
    FrTable,
    FrMsg,
    FrEndOfFile,
    FrTOC,
}

impl KindId {
    /// Stable name used for case-insensitive name lookups in the registry
    /// and for `FrSH` schema announcements.
    pub fn name(self) -> &'static str {
        match self {
            KindId::Null => "",
            KindId::FrSH => "FrSH",
            KindId::FrSE => "FrSE",
            KindId::FrameH => "FrameH",
            KindId::FrRawData => "FrRawData",
            KindId::FrAdcData => "FrAdcData",
            KindId::FrProcData => "FrProcData",
            KindId::FrVect => "FrVect",
            KindId::FrDetector => "FrDetector",
            KindId::FrHistory => "FrHistory",
            KindId::FrEvent => "FrEvent",
            KindId::FrSimEvent => "FrSimEvent",
            KindId::FrSimData => "FrSimData",
            KindId::FrSummary => "FrSummaryData",
            KindId::FrTable => "FrTable",
            KindId::FrMsg => "FrMsg",
            KindId::FrEndOfFile => "FrEndOfFile",
            KindId::FrTOC => "FrTOC",
        }
    }

    pub fn from_name(name: &str) -> Option<KindId> {
        ALL.iter().copied().find(|k| k.name().eq_ignore_ascii_case(name))
    }
}

/// Every kind the library knows about, in a stable order used for
/// deterministic schema (`FrSH`/`FrSE`) emission on write.
pub const ALL: &[KindId] = &[
    KindId::FrSH,
    KindId::FrSE,
    KindId::FrameH,
    KindId::FrRawData,
    KindId::FrAdcData,
    KindId::FrProcData,
    KindId::FrVect,
    KindId::FrDetector,
    KindId::FrHistory,
    KindId::FrEvent,
    KindId::FrSimEvent,
    KindId::FrSimData,
    KindId::FrSummary,
    KindId::FrTable,
    KindId::FrMsg,
    KindId::FrEndOfFile,
    KindId::FrTOC,
];

/// The Frame wire version, distinct values supported for reading; writing
/// always targets [`Version::CURRENT`] unless the caller asks for a
/// specific demoted version via [`crate::stream::output::FrameWriter::open_write`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version(pub u8);

impl Version {
    pub const V3: Version = Version(3);
    pub const V4: Version = Version(4);
    pub const V6: Version = Version(6);
    pub const V7: Version = Version(7);
    pub const V8: Version = Version(8);

    /// The in-memory object model's version. Every promote/demote chain
    /// walks toward or away from this value.
    pub const CURRENT: Version = Version::V8;

    /// Whether this version uses the long-form `PTR_STRUCT` (8-byte length,
    /// 2-byte checksum type) and a trailing per-structure CRC.
    pub fn uses_long_ptr_struct(self) -> bool {
        self.0 >= 8
    }

    pub fn is_supported(self) -> bool {
        matches!(self.0, 3 | 4 | 6 | 7 | 8)
    }

    /// The next version up the promotion ladder, or `None` at `CURRENT`.
    pub fn next(self) -> Option<Version> {
        match self.0 {
            3 => Some(Version::V4),
            4 => Some(Version::V6),
            6 => Some(Version::V7),
            7 => Some(Version::V8),
            _ => None,
        }
    }

    /// The previous version down the demotion ladder, or `None` at the
    /// oldest supported version.
    pub fn prev(self) -> Option<Version> {
        match self.0 {
            4 => Some(Version::V3),
            6 => Some(Version::V4),
            7 => Some(Version::V6),
            8 => Some(Version::V7),
            _ => None,
        }
    }
}
