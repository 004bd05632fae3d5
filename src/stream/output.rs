//! Write-path façade: assigns dictionary instance ids to a caller-built
//! object graph and serializes it out as a standard Frame stream.
//!
//! The caller builds the object graph directly in the writer's arena
//! (`push`, then wire up `Option<ObjIndex>`/`Vec<ObjIndex>` fields by hand)
//! rather than through a builder API — this mirrors the read path's own
//! arena-of-stable-indices model and avoids a second, parallel builder
//! surface for the same shapes.

use std::collections::HashSet;
use std::io::{Seek, Write};

use crate::arena::{Arena, ObjIndex};
use crate::buffer::FrameBuffer;
use crate::checksum::{FilterChain, FilterScope, LdasFilter};
use crate::codec::ByteOrder;
use crate::codecs::write_wire_ref;
use crate::config::StreamConfig;
use crate::dictionary::{Dictionary, NULL_REF};
use crate::error::{Error, Result};
use crate::model::Kind;
use crate::registry::FrameSpec;
use crate::toc::Toc;

use super::state::{WriterOp, WriterState};
use super::{header_size, write_record_header, RecordHeader, TrackedWriter};

const FILE_MAGIC_TAG: &[u8; 5] = b"IGWD ";

/// Width in bytes of the per-structure checksum that trails a record's body
/// at `v>=8`, ahead of the trailing `WireRef` (§4.6; this crate always
/// writes `0`, "not computed", and never verifies it on read).
const STRUCT_CRC_SIZE: u64 = 4;

/// Width in bytes of the trailing `WireRef` every record carries after its
/// body and, at `v>=8`, its per-structure checksum.
const WIRE_REF_SIZE: u64 = 6;

pub struct FrameWriter<B: FrameBuffer> {
    buf: B,
    order: ByteOrder,
    config: StreamConfig,
    state: WriterState,
    filters: FilterChain,
    dict: Dictionary,
    arena: Arena,
    nframe: u32,
    toc: Toc,
    current_frame_index: Option<usize>,
}

impl<B: FrameBuffer> FrameWriter<B> {
    pub fn open_write(mut buf: B, config: StreamConfig) -> Result<FrameWriter<B>> {
        let order = ByteOrder::host();
        buf.write_all(FILE_MAGIC_TAG).map_err(Error::Io)?;
        buf.write_all(&[config.write_version.0, 0]).map_err(Error::Io)?;
        let magic = match order {
            ByteOrder::Little => crate::codec::MAGIC_U64.to_le_bytes(),
            ByteOrder::Big => crate::codec::MAGIC_U64.to_be_bytes(),
        };
        buf.write_all(&magic).map_err(Error::Io)?;

        let mut filters = FilterChain::new();
        if !matches!(config.checksum_policy, crate::config::ChecksumPolicy::None) {
            filters.attach(FilterScope::File, Box::new(LdasFilter::default()));
        }

        let state = WriterState::Closed.transition(WriterOp::OpenWrite)?;
        tracing::debug!(?order, target_version = config.write_version.0, "opened Frame stream for writing");
        Ok(FrameWriter {
            buf,
            order,
            config,
            state,
            filters,
            dict: Dictionary::new(),
            arena: Arena::new(),
            nframe: 0,
            toc: Toc::new(),
            current_frame_index: None,
        })
    }

    /// Add an object to the writer's arena. Returns the index to wire into
    /// parent containers.
    pub fn push(&mut self, kind: Kind) -> ObjIndex {
        self.arena.push(kind)
    }

    pub fn arena_mut(&mut self) -> &mut Arena {
        &mut self.arena
    }

    /// Writers normally emit a TOC on close; disabling this is only sane
    /// for short streaming writers that never seek back.
    pub fn disable_toc(&mut self) {
        self.config.write_toc = false;
    }

    /// Serialize a static (file-scope, not per-frame) object such as a
    /// `FrDetector` ahead of the first `FrameH`, assigning it a dictionary
    /// instance id as it goes.
    pub fn write_static_data(&mut self, idx: ObjIndex) -> Result<()> {
        if self.config.write_toc {
            if let Kind::FrDetector(d) = self.arena.get(idx).clone() {
                let offset = self.buf.stream_position().map_err(Error::Io)?;
                self.toc.register_detector(&d.name, offset);
            }
        }
        self.write_subgraph(idx)
    }

    pub fn write_frame(&mut self, frame: ObjIndex) -> Result<()> {
        self.state = self.state.transition(WriterOp::WriteFrame)?;
        if self.config.write_toc {
            let offset = self.buf.stream_position().map_err(Error::Io)?;
            if let Kind::FrameH(f) = self.arena.get(frame).clone() {
                let index = self.toc.register_frame(offset, f.gtime.seconds, f.gtime.nanoseconds, f.dt);
                self.current_frame_index = Some(index);
            }
        }
        self.write_subgraph(frame)?;
        self.current_frame_index = None;
        self.nframe += 1;
        Ok(())
    }

    fn write_subgraph(&mut self, root: ObjIndex) -> Result<()> {
        let mut order_list = Vec::new();
        let mut seen = HashSet::new();
        collect_reachable(&self.arena, root, &mut order_list, &mut seen);

        let spec = FrameSpec::for_version(self.config.write_version);
        for &idx in &order_list {
            let kind_id = self.arena.get(idx).kind_id();
            let wire_class = spec.wire_class_of(kind_id)?;
            if self.dict.wire_ref_of(idx).is_none() {
                let instance = self.dict.next_instance(wire_class);
                self.dict.declare((wire_class, instance), kind_id, idx)?;
            }
        }

        // A container field (e.g. `FrRawData.first_adc`) only ever names its
        // head on the wire; every other element is recovered by following
        // each object's own trailing "next" reference, so siblings within
        // the same list field must be chained here before any bodies are
        // written.
        let mut next_map: std::collections::HashMap<ObjIndex, ObjIndex> = std::collections::HashMap::new();
        for &idx in &order_list {
            for list in list_fields_of(self.arena.get(idx)) {
                for pair in list.windows(2) {
                    next_map.insert(pair[0], pair[1]);
                }
            }
        }

        for &idx in &order_list {
            let kind_id = self.arena.get(idx).kind_id();
            let descriptor = spec
                .by_id(kind_id)
                .ok_or_else(|| Error::UnsupportedVersion(self.config.write_version.0))?;
            let wire_ref = self.dict.wire_ref_of(idx).expect("instance id assigned above");
            let body = {
                let mut body_buf: Vec<u8> = Vec::new();
                let mut plain_filters = FilterChain::new();
                let mut tracked = TrackedWriter { inner: &mut body_buf, filters: &mut plain_filters };
                (descriptor.write)(self.arena.get(idx), &mut tracked, self.order, &self.dict)?;
                body_buf
            };
            let version = self.config.write_version;
            let trailer_len = if version.uses_long_ptr_struct() { STRUCT_CRC_SIZE } else { 0 } + WIRE_REF_SIZE;
            let length = header_size(version) + body.len() as u64 + trailer_len;
            let header = RecordHeader { length, chk_type: 0, wire_class: wire_ref.0, instance: wire_ref.1 };
            let next_ref = next_map.get(&idx).and_then(|&n| self.dict.wire_ref_of(n)).unwrap_or(NULL_REF);
            if self.config.write_toc {
                if let Some(frame_index) = self.current_frame_index {
                    let offset = self.buf.stream_position().map_err(Error::Io)?;
                    match self.arena.get(idx) {
                        Kind::FrAdcData(a) => self.toc.register_adc(frame_index, &a.name, offset),
                        Kind::FrProcData(p) => self.toc.register_proc(frame_index, &p.name, offset),
                        _ => {}
                    }
                }
            }
            let mut tracked = TrackedWriter { inner: &mut self.buf, filters: &mut self.filters };
            write_record_header(&mut tracked, self.order, version, header)?;
            crate::codec::PrimWrite::write_tracked(&mut tracked, &body)?;
            if version.uses_long_ptr_struct() {
                crate::codec::PrimWrite::write_u32(&mut tracked, self.order, 0)?;
            }
            write_wire_ref(&mut tracked, self.order, next_ref)?;
        }
        Ok(())
    }

    pub fn close(mut self) -> Result<B> {
        self.state = self.state.transition(WriterOp::WriteEof)?;
        tracing::debug!(nframe = self.nframe, "closing Frame stream, writing EOF record");
        let spec = FrameSpec::for_version(self.config.write_version);
        let eof_class = spec.wire_class_of(crate::kind::KindId::FrEndOfFile)?;

        let version = self.config.write_version;
        let trailer_len = if version.uses_long_ptr_struct() { STRUCT_CRC_SIZE } else { 0 } + WIRE_REF_SIZE;
        let toc_offset = if self.config.write_toc {
            let offset = self.buf.stream_position().map_err(Error::Io)?;
            let body = {
                let mut body_buf: Vec<u8> = Vec::new();
                let mut plain_filters = FilterChain::new();
                let mut tracked = TrackedWriter { inner: &mut body_buf, filters: &mut plain_filters };
                crate::toc::write_toc(&self.toc, &mut tracked, self.order)?;
                body_buf
            };
            let length = header_size(version) + body.len() as u64 + trailer_len;
            let header = RecordHeader {
                length,
                chk_type: 0,
                wire_class: crate::toc::FR_TOC_WIRE_CLASS,
                instance: 0,
            };
            let mut tracked = TrackedWriter { inner: &mut self.buf, filters: &mut self.filters };
            write_record_header(&mut tracked, self.order, version, header)?;
            crate::codec::PrimWrite::write_tracked(&mut tracked, &body)?;
            if version.uses_long_ptr_struct() {
                crate::codec::PrimWrite::write_u32(&mut tracked, self.order, 0)?;
            }
            write_wire_ref(&mut tracked, self.order, NULL_REF)?;
            offset
        } else {
            0u64
        };

        let nbytes = self.buf.stream_position().map_err(Error::Io)?;
        let (chk_type, chk_sum) = if matches!(self.config.checksum_policy, crate::config::ChecksumPolicy::None) {
            (None, 0u32)
        } else {
            (Some(crate::checksum::ChecksumKind::Ldas), self.filters.value(FilterScope::File).unwrap_or(0))
        };
        let eof = crate::model::FrEndOfFile { nframe: self.nframe, toc_offset, chk_type, nbytes, chk_sum };
        let body = {
            let mut body_buf: Vec<u8> = Vec::new();
            let mut plain_filters = FilterChain::new();
            let mut tracked = TrackedWriter { inner: &mut body_buf, filters: &mut plain_filters };
            crate::codecs::write_eof(&Kind::FrEndOfFile(eof), &mut tracked, self.order, &self.dict)?;
            body_buf
        };
        let length = header_size(version) + body.len() as u64 + trailer_len;
        let header = RecordHeader { length, chk_type: 0, wire_class: eof_class, instance: 0 };
        {
            let mut tracked = TrackedWriter { inner: &mut self.buf, filters: &mut self.filters };
            write_record_header(&mut tracked, self.order, version, header)?;
            crate::codec::PrimWrite::write_tracked(&mut tracked, &body)?;
            if version.uses_long_ptr_struct() {
                crate::codec::PrimWrite::write_u32(&mut tracked, self.order, 0)?;
            }
            // EndOfFile is never itself a list member, but every record
            // carries the same trailing "next" reference (see DESIGN.md).
            write_wire_ref(&mut tracked, self.order, NULL_REF)?;
        }
        self.state = self.state.transition(WriterOp::Close)?;
        Ok(self.buf)
    }
}

fn collect_reachable(arena: &Arena, root: ObjIndex, out: &mut Vec<ObjIndex>, seen: &mut HashSet<ObjIndex>) {
    if !seen.insert(root) {
        return;
    }
    out.push(root);
    for child in children_of(arena.get(root)) {
        collect_reachable(arena, child, out, seen);
    }
}

fn children_of(kind: &Kind) -> Vec<ObjIndex> {
    match kind {
        Kind::FrameH(f) => {
            let mut c = Vec::new();
            c.extend(f.raw_data);
            c.extend(f.types.iter().copied());
            c.extend(f.user.iter().copied());
            c.extend(f.detect_sim.iter().copied());
            c.extend(f.detect_proc.iter().copied());
            c.extend(f.history.iter().copied());
            c.extend(f.proc_data.iter().copied());
            c.extend(f.sim_data.iter().copied());
            c.extend(f.event.iter().copied());
            c.extend(f.sim_event.iter().copied());
            c.extend(f.summary_data.iter().copied());
            c.extend(f.aux_data.iter().copied());
            c.extend(f.aux_table.iter().copied());
            c
        }
        Kind::FrRawData(r) => {
            let mut c = Vec::new();
            c.extend(r.first_ser.iter().copied());
            c.extend(r.first_adc.iter().copied());
            c.extend(r.first_table.iter().copied());
            c.extend(r.first_msg.iter().copied());
            c.extend(r.first_misc.iter().copied());
            c
        }
        Kind::FrAdcData(a) => a.data.iter().chain(a.aux.iter()).copied().collect(),
        Kind::FrProcData(p) => {
            let mut c: Vec<ObjIndex> = p.data.iter().copied().collect();
            c.extend(p.aux_table);
            c.extend(p.aux.iter().copied());
            c
        }
        Kind::FrDetector(d) => d.aux_data.iter().chain(d.aux_table.iter()).copied().collect(),
        Kind::FrEvent(e) => e.data.clone(),
        Kind::FrSimEvent(e) => e.data.clone(),
        Kind::FrSimData(s) => s.data.iter().chain(s.input.iter()).copied().collect(),
        Kind::FrSummary(s) => s.moments.clone(),
        Kind::FrVect(_)
        | Kind::FrHistory(_)
        | Kind::FrTable(_)
        | Kind::FrMsg(_)
        | Kind::FrSH(_)
        | Kind::FrSE(_)
        | Kind::FrEndOfFile(_)
        | Kind::FrTOC(_) => Vec::new(),
    }
}

/// The subset of [`children_of`] that are genuine `Vec<ObjIndex>` container
/// fields (as opposed to a single optional pointer such as
/// `FrameH.raw_data` or `FrProcData.aux_table`) — each returned slice is one
/// wire-level `next`-chain that [`FrameWriter::write_subgraph`] must link.
fn list_fields_of(kind: &Kind) -> Vec<&[ObjIndex]> {
    match kind {
        Kind::FrameH(f) => vec![
            &f.types[..],
            &f.user[..],
            &f.detect_sim[..],
            &f.detect_proc[..],
            &f.history[..],
            &f.proc_data[..],
            &f.sim_data[..],
            &f.event[..],
            &f.sim_event[..],
            &f.summary_data[..],
            &f.aux_data[..],
            &f.aux_table[..],
        ],
        Kind::FrRawData(r) => {
            vec![&r.first_ser[..], &r.first_adc[..], &r.first_table[..], &r.first_msg[..], &r.first_misc[..]]
        }
        Kind::FrAdcData(a) => vec![&a.data[..], &a.aux[..]],
        Kind::FrProcData(p) => vec![&p.data[..], &p.aux[..]],
        Kind::FrDetector(d) => vec![&d.aux_data[..], &d.aux_table[..]],
        Kind::FrEvent(e) => vec![&e.data[..]],
        Kind::FrSimEvent(e) => vec![&e.data[..]],
        Kind::FrSimData(s) => vec![&s.data[..], &s.input[..]],
        Kind::FrSummary(s) => vec![&s.moments[..]],
        Kind::FrVect(_)
        | Kind::FrHistory(_)
        | Kind::FrTable(_)
        | Kind::FrMsg(_)
        | Kind::FrSH(_)
        | Kind::FrSE(_)
        | Kind::FrEndOfFile(_)
        | Kind::FrTOC(_) => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::MemoryBuffer;
    use crate::codec::PlainReader;
    use crate::model::FrameH;

    /// Comment 5's literal ask: `RecordHeader.length` must span everything
    /// from the header's own first byte through the end of the trailing
    /// `WireRef` (and, at `v>=8`, the per-structure checksum) — not just the
    /// body — so that walking `start + length` always lands exactly on the
    /// next record's header.
    #[test]
    fn record_length_spans_header_body_and_trailer() {
        let mut writer = FrameWriter::open_write(MemoryBuffer::new(), StreamConfig::default()).unwrap();
        writer.disable_toc();
        let idx = writer.push(Kind::FrameH(FrameH { name: "H-R-0-1".into(), ..Default::default() }));
        writer.write_frame(idx).unwrap();
        let buf = writer.close().unwrap();
        let bytes = buf.into_inner();

        let file_header_len: u64 = 5 + 2 + 8; // originator + major/minor + magic
        let mut cursor = std::io::Cursor::new(bytes);
        cursor.set_position(file_header_len);
        let order = ByteOrder::host();
        let version = crate::kind::Version::CURRENT;

        let start = cursor.position();
        let header = {
            let mut plain = PlainReader(&mut cursor);
            read_record_header(&mut plain, order, version).unwrap()
        };

        cursor.set_position(start + header.length);
        let next_header = {
            let mut plain = PlainReader(&mut cursor);
            read_record_header(&mut plain, order, version).unwrap()
        };
        let eof_class = FrameSpec::for_version(version).wire_class_of(crate::kind::KindId::FrEndOfFile).unwrap();
        assert_eq!(next_header.wire_class, eof_class, "length must land exactly on the next record's header");
    }
}
