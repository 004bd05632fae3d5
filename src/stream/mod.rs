//! Stream façade: ties the codec, checksum filters, dictionary, resolver
//! and registry together into the public read/write API.

pub mod input;
pub mod output;
pub mod state;

pub use input::FrameReader;
pub use output::FrameWriter;

use crate::checksum::FilterChain;
use crate::codec::{ByteOrder, PrimRead, PrimWrite};
use crate::error::Result;
use crate::kind::Version;

/// Adapts an underlying [`std::io::Read`] to [`PrimRead`], feeding every
/// byte through the currently attached checksum filters (§4.6: "every byte
/// is visited by every attached filter, regardless of which higher-level
/// field it belongs to").
pub struct TrackedReader<'a, R: std::io::Read> {
    pub inner: &'a mut R,
    pub filters: &'a mut FilterChain,
}

impl<'a, R: std::io::Read> PrimRead for TrackedReader<'a, R> {
    fn read_exact_tracked(&mut self, buf: &mut [u8]) -> Result<()> {
        self.inner.read_exact(buf).map_err(|e| match e.kind() {
            std::io::ErrorKind::UnexpectedEof => crate::error::Error::UnexpectedEof,
            _ => crate::error::Error::Io(e),
        })?;
        self.filters.feed(buf);
        Ok(())
    }
}

pub struct TrackedWriter<'a, W: std::io::Write> {
    pub inner: &'a mut W,
    pub filters: &'a mut FilterChain,
}

impl<'a, W: std::io::Write> PrimWrite for TrackedWriter<'a, W> {
    fn write_tracked(&mut self, buf: &[u8]) -> Result<()> {
        self.inner.write_all(buf).map_err(crate::error::Error::Io)?;
        self.filters.feed(buf);
        Ok(())
    }
}

/// Record header preceding every record's body. §6's "short" (`v<=7`) and
/// "long" (`v>=8`) `PTR_STRUCT` forms differ in the width of the length
/// field and in whether a `chkType` field precedes the class/instance pair:
/// short form is `[length:u32][class:u16][instance:u32]`, long form is
/// `[length:u64][chkType:u16][class:u16][instance:u32]`. `length` is the
/// total byte count of the record, header included, through to the end of
/// the trailing `WireRef` (and, at `v>=8`, the per-structure checksum that
/// follows it) — never just the body (see `output::write_subgraph`).
///
/// Every record's body is itself followed by one more `WireRef` — the
/// object's own `next` pointer into whatever container it belongs to,
/// NULL for anything that isn't a list member — and, at `v>=8`, a trailing
/// 4-byte per-structure checksum (`0` means "not computed", §4.6; this
/// crate never computes or verifies it, see DESIGN.md). `RecordHeader`
/// doesn't carry either field since they come after the body, not before
/// it; see `input::read_one_record` / `output::write_subgraph`.
#[derive(Debug, Clone, Copy)]
pub struct RecordHeader {
    pub length: u64,
    pub chk_type: u16,
    pub wire_class: u16,
    pub instance: u32,
}

/// Byte width of a record header at `version`, long form (`v>=8`) vs short
/// form (`v<=7`). Mirrors `buffer::dynamic`'s `LONG_RECORD_HEADER_SIZE` /
/// `SHORT_RECORD_HEADER_SIZE` constants.
pub fn header_size(version: Version) -> u64 {
    if version.uses_long_ptr_struct() {
        8 + 2 + 2 + 4
    } else {
        4 + 2 + 4
    }
}

pub fn read_record_header(r: &mut dyn PrimRead, order: ByteOrder, version: Version) -> Result<RecordHeader> {
    if version.uses_long_ptr_struct() {
        let length = r.read_u64(order)?;
        let chk_type = r.read_u16(order)?;
        let wire_class = r.read_u16(order)?;
        let instance = r.read_u32(order)?;
        Ok(RecordHeader { length, chk_type, wire_class, instance })
    } else {
        let length = r.read_u32(order)? as u64;
        let wire_class = r.read_u16(order)?;
        let instance = r.read_u32(order)?;
        Ok(RecordHeader { length, chk_type: 0, wire_class, instance })
    }
}

pub fn write_record_header(w: &mut dyn PrimWrite, order: ByteOrder, version: Version, header: RecordHeader) -> Result<()> {
    if version.uses_long_ptr_struct() {
        w.write_u64(order, header.length)?;
        w.write_u16(order, header.chk_type)?;
        w.write_u16(order, header.wire_class)?;
        w.write_u32(order, header.instance)
    } else {
        w.write_u32(order, header.length as u32)?;
        w.write_u16(order, header.wire_class)?;
        w.write_u32(order, header.instance)
    }
}
