//! Read-path façade: opens a Frame stream, decodes frames one at a time,
//! and exposes channel-lookup convenience methods over the decoded graph.

use std::io::{Read, Seek, SeekFrom};

use crate::arena::{Arena, ObjIndex};
use crate::buffer::FrameBuffer;
use crate::checksum::{FilterChain, FilterScope, LdasFilter, Md5Filter};
use crate::codec::{detect_byte_order, ByteOrder, PlainReader};
use crate::codecs::{read_wire_ref, PendingSlot};
use crate::dictionary::Dictionary;
use crate::error::{Error, Result};
use crate::kind::{KindId, Version};
use crate::model::{FrAdcData, FrDetector, FrEvent, FrProcData, Kind};
use crate::registry::FrameSpec;
use crate::resolver::{Patch, Resolver};
use crate::toc::Toc;

use super::state::{ReaderOp, ReaderState};
use super::{read_record_header, RecordHeader, TrackedReader};

const FILE_MAGIC_TAG: &[u8; 5] = b"IGWD ";
const FILE_MAGIC_TAG_ALT: &[u8; 5] = b"LIGO ";

pub struct FrameReader<B: FrameBuffer> {
    buf: B,
    order: ByteOrder,
    version: Version,
    state: ReaderState,
    filters: FilterChain,
    dict: Dictionary,
    arena: Arena,
    resolver: Resolver,
    toc: Option<Toc>,
    frames: Vec<ObjIndex>,
    md5: Option<Md5Filter>,
    last_file_checksum: Option<crate::verify::ChecksumObservation>,
}

impl<B: FrameBuffer> FrameReader<B> {
    /// Consume the file header and detect byte order (invariant I3: fixed
    /// once, for the rest of the stream).
    pub fn open_read(mut buf: B) -> Result<FrameReader<B>> {
        let mut originator = [0u8; 5];
        buf.read_exact(&mut originator).map_err(|_| Error::NotAFrameFile)?;
        if &originator != FILE_MAGIC_TAG && &originator != FILE_MAGIC_TAG_ALT && !originator.is_ascii() {
            return Err(Error::NotAFrameFile);
        }
        let mut version_bytes = [0u8; 2];
        buf.read_exact(&mut version_bytes).map_err(|_| Error::NotAFrameFile)?;
        let version = Version(version_bytes[0]);
        if !version.is_supported() {
            return Err(Error::UnsupportedVersion(version.0));
        }
        let mut magic = [0u8; 8];
        buf.read_exact(&mut magic).map_err(|_| Error::NotAFrameFile)?;
        let order = detect_byte_order(magic)?;
        tracing::debug!(?order, version = version.0, "opened Frame stream for reading");

        let mut filters = FilterChain::new();
        filters.attach(FilterScope::File, Box::new(LdasFilter::default()));

        let state = ReaderState::Closed.transition(ReaderOp::OpenRead)?;

        Ok(FrameReader {
            buf,
            order,
            version,
            state,
            filters,
            dict: Dictionary::new(),
            arena: Arena::new(),
            resolver: Resolver::new(),
            toc: None,
            frames: Vec::new(),
            md5: None,
            last_file_checksum: None,
        })
    }

    /// The whole-file checksum [`FrameReader::finish`] compared against
    /// `FrEndOfFile`, if the file carried one. Feed this to
    /// [`crate::verify::Verifier::with_file_checksum`] to make
    /// `check_checksums`/`require_checksums` mean something, since the
    /// verifier works purely off the decoded graph and never reads bytes
    /// itself.
    pub fn last_file_checksum(&self) -> Option<crate::verify::ChecksumObservation> {
        self.last_file_checksum
    }

    /// Attach an MD5 filter over the whole file, for callers that want the
    /// file-scope digest in addition to (or instead of) the structural
    /// checksum (§4.6).
    pub fn set_md5_sum(&mut self, enabled: bool) {
        if enabled && self.md5.is_none() {
            self.md5 = Some(Md5Filter::default());
        } else if !enabled {
            self.md5 = None;
        }
    }

    /// Number of frames decoded so far. Until the TOC (if any) is consulted
    /// this only reflects frames already walked via [`FrameReader::read_frame`].
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn toc(&self) -> Option<&Toc> {
        self.toc.as_ref()
    }

    fn peek_record_header(&mut self) -> Result<Option<RecordHeader>> {
        let start = self.buf.stream_position().map_err(Error::Io)?;
        let mut plain = PlainReader(&mut self.buf);
        let header = match read_record_header(&mut plain, self.order, self.version) {
            Ok(h) => h,
            Err(Error::UnexpectedEof) => {
                self.buf.seek(SeekFrom::Start(start)).map_err(Error::Io)?;
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        self.buf.seek(SeekFrom::Start(start)).map_err(Error::Io)?;
        Ok(Some(header))
    }

    /// Read one record (header already consumed by the caller via
    /// [`FrameReader::peek_record_header`] then re-read here through the
    /// tracked reader so checksum filters see it exactly once), push it
    /// into the arena, declare it, and queue its pending pointer fields.
    fn read_one_record(&mut self) -> Result<ObjIndex> {
        let spec = FrameSpec::for_version(self.version);
        let mut tracked = TrackedReader { inner: &mut self.buf, filters: &mut self.filters };
        let header = read_record_header(&mut tracked, self.order, self.version)?;
        let descriptor = spec
            .by_wire_class(header.wire_class)
            .ok_or_else(|| Error::InvalidFrameStructure(format!("unknown wire class {}", header.wire_class)))?;
        let (kind, slots) = (descriptor.read)(&mut tracked, self.order, self.version)?;
        if self.version.uses_long_ptr_struct() {
            // Per-structure checksum, `0` meaning "not computed" (§4.6);
            // never verified here (see DESIGN.md).
            crate::codec::PrimRead::read_u32(&mut tracked, self.order)?;
        }
        // Every record carries a trailing "next" reference, uniformly,
        // regardless of whether its kind is ever chained into a container
        // (see DESIGN.md) — this is what lets a container hold more than
        // one same-kind child (scenario 6: linked-list merge).
        let next_ref = read_wire_ref(&mut tracked, self.order)?;
        let kind_id = descriptor.id;
        let idx = self.arena.push(kind);
        self.dict.declare((header.wire_class, header.instance), kind_id, idx)?;
        self.dict.set_next(idx, next_ref);
        queue_slots(&mut self.resolver, idx, slots);
        Ok(idx)
    }

    /// Decode the next frame (`FrameH` plus every record that belongs to it,
    /// up to — but not including — the next `FrameH` or `FrEndOfFile`
    /// record), draining the resolver once the frame closes.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn read_frame(&mut self) -> Result<Option<ObjIndex>> {
        self.state = self.state.transition(ReaderOp::ReadFirstFrame)?;

        let spec = FrameSpec::for_version(self.version);
        let frame_h_class = spec.wire_class_of(KindId::FrameH)?;
        let eof_class = spec.wire_class_of(KindId::FrEndOfFile)?;

        let mut current_frame: Option<ObjIndex> = None;
        loop {
            let header = match self.peek_record_header()? {
                Some(h) => h,
                None => break,
            };

            if header.wire_class == eof_class {
                break;
            }
            if header.wire_class == frame_h_class {
                if current_frame.is_some() {
                    break; // next frame's header; leave it for the next call
                }
                let idx = self.read_one_record()?;
                current_frame = Some(idx);
                self.frames.push(idx);
                continue;
            }

            self.read_one_record()?;
        }

        self.resolver.drain(&self.dict, &mut self.arena)?;
        tracing::trace!(frame_index = self.frames.len(), "drained resolver at end of frame");
        Ok(current_frame)
    }

    /// Read only the named channels out of the next frame, leaving every
    /// other child reference present but unpopulated. This filters the
    /// already-decoded frame's containers rather than skipping undecoded
    /// bytes — a later optimization could avoid materializing unwanted
    /// `FrVect` payloads, but isn't implemented here.
    pub fn read_frame_subset(&mut self, adc_channels: &[&str]) -> Result<Option<ObjIndex>> {
        let idx = match self.read_frame()? {
            Some(idx) => idx,
            None => return Ok(None),
        };
        if let Kind::FrameH(frame) = self.arena.get(idx).clone() {
            if let Some(raw_idx) = frame.raw_data {
                if let Kind::FrRawData(raw) = self.arena.get(raw_idx).clone() {
                    let kept: Vec<ObjIndex> = raw
                        .first_adc
                        .iter()
                        .copied()
                        .filter(|&adc_idx| match self.arena.get(adc_idx) {
                            Kind::FrAdcData(a) => adc_channels.contains(&a.name.as_str()),
                            _ => false,
                        })
                        .collect();
                    if let Kind::FrRawData(raw) = self.arena.get_mut(raw_idx) {
                        raw.first_adc = kept;
                    }
                }
            }
        }
        Ok(Some(idx))
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dict
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.order
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// Consume the terminal `FrEndOfFile` record that [`FrameReader::read_frame`]'s
    /// loop only peeks at (so repeated calls can tell "no more frames" from
    /// "malformed stream"), check its file-scope checksum against what was
    /// actually read, and load the TOC back if one was written. Mirrors
    /// `FrameStream::finish` in `original_source/FrameStream.hh`.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn finish(&mut self) -> Result<()> {
        self.state = self.state.transition(ReaderOp::ReadEof)?;

        // Snapshot before the EOF record's own bytes are fed to the filter:
        // the writer computed `chk_sum` at the same point, right before
        // writing the record that reports it (see `FrameWriter::close`).
        let checksum_before_eof = self.filters.value(FilterScope::File);

        let idx = self.read_one_record()?;
        self.resolver.drain(&self.dict, &mut self.arena)?;

        let eof = match self.arena.get(idx).clone() {
            Kind::FrEndOfFile(eof) => eof,
            other => {
                return Err(Error::InvalidFrameStructure(format!(
                    "expected FrEndOfFile at stream end, found {other:?}"
                )))
            }
        };

        if let Some(actual) = checksum_before_eof {
            self.last_file_checksum = Some(crate::verify::ChecksumObservation {
                scope: crate::error::ChecksumScope::File,
                kind: eof.chk_type,
                expected: eof.chk_sum,
                actual,
            });
        }

        if let (Some(kind), Some(actual)) = (eof.chk_type, checksum_before_eof) {
            if actual != eof.chk_sum {
                return Err(Error::ChecksumMismatch {
                    kind,
                    expected: eof.chk_sum,
                    actual,
                    scope: crate::error::ChecksumScope::File,
                });
            }
        }

        if eof.toc_offset != 0 {
            let resume = self.buf.stream_position().map_err(Error::Io)?;
            self.buf.seek(SeekFrom::Start(eof.toc_offset)).map_err(Error::Io)?;
            let mut plain = PlainReader(&mut self.buf);
            let header = read_record_header(&mut plain, self.order, self.version)?;
            if header.wire_class != crate::toc::FR_TOC_WIRE_CLASS {
                return Err(Error::InvalidFrameStructure("toc_offset did not point at a TOC record".into()));
            }
            self.toc = Some(crate::toc::read_toc(&mut plain, self.order)?);
            self.buf.seek(SeekFrom::Start(resume)).map_err(Error::Io)?;
        }

        tracing::debug!(toc_loaded = self.toc.is_some(), "finished Frame stream");
        Ok(())
    }

    pub fn read_adc_data(&self, frame: ObjIndex, channel: &str) -> Option<&FrAdcData> {
        let frame = self.arena.get(frame).as_frame_h()?;
        let raw = self.arena.get(frame.raw_data?).as_raw_data()?;
        raw.first_adc.iter().find_map(|&idx| match self.arena.get(idx) {
            Kind::FrAdcData(a) if a.name == channel => Some(a),
            _ => None,
        })
    }

    pub fn read_proc_data(&self, frame: ObjIndex, channel: &str) -> Option<&FrProcData> {
        let frame = self.arena.get(frame).as_frame_h()?;
        frame.proc_data.iter().find_map(|&idx| match self.arena.get(idx) {
            Kind::FrProcData(p) if p.name == channel => Some(p),
            _ => None,
        })
    }

    pub fn read_event(&self, frame: ObjIndex, name: &str) -> Option<&FrEvent> {
        let frame = self.arena.get(frame).as_frame_h()?;
        frame.event.iter().find_map(|&idx| match self.arena.get(idx) {
            Kind::FrEvent(e) if e.name == name => Some(e),
            _ => None,
        })
    }

    pub fn read_detector(&self, frame: ObjIndex, name: &str) -> Option<&FrDetector> {
        let frame = self.arena.get(frame).as_frame_h()?;
        frame
            .detect_sim
            .iter()
            .chain(frame.detect_proc.iter())
            .find_map(|&idx| match self.arena.get(idx) {
                Kind::FrDetector(d) if d.name == name => Some(d),
                _ => None,
            })
    }
}

fn queue_slots(resolver: &mut Resolver, owner: ObjIndex, slots: Vec<PendingSlot>) {
    for slot in slots {
        match slot {
            PendingSlot::Single { target, target_kind, set } => {
                resolver.push(Patch::slot(target, target_kind, move |arena, idx| {
                    set(arena.get_mut(owner), idx);
                }));
            }
            PendingSlot::List { head, element_kind, set } => {
                resolver.push(Patch::list_head(head, element_kind, move |arena, list| {
                    set(arena.get_mut(owner), list);
                }));
            }
        }
    }
}
