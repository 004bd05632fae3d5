//! Dynamic memory buffer fed in chunks from an external source.
//!
//! Unlike [`super::MemoryBuffer`] and [`super::SliceBuffer`], this shape
//! never blocks on bytes: it tells the caller how many bytes it wants next
//! via [`DynamicBuffer::next_block_size`] and the caller supplies exactly
//! that many (or fewer, see [`DynamicBuffer::next_block`]) via
//! `next_block`. Internally it runs a micro state machine that consumes the
//! file header, then each record's length-prefix, then the record body,
//! setting `ready` once a complete logical frame file is present.

use crate::error::{Error, Result};
use crate::kind::Version;

/// Size of the fixed file-header probe: 5-byte originator tag, 1-byte major
/// version, 1-byte minor version, followed by the short-form `PTR_STRUCT`
/// header (4 bytes: length+class+instance, 1 byte each for class/instance
/// in the minimal probe) and the 8-byte magic number body. Kept as one
/// fixed-size probe so the very first `next_block_size()` call has an
/// answer before any version-dependent framing is known.
const HEADER_PROBE_SIZE: usize = 5 + 1 + 1 + 4 + 8;

/// Long-form `PTR_STRUCT` record header size (length:u64, chkType:u16,
/// class:u16, instance:u32) used once the stream is known to be version 8.
const LONG_RECORD_HEADER_SIZE: u64 = 8 + 2 + 2 + 4;
/// Short-form record header size (length:u32, class:u16, instance:u32) used
/// for versions <= 7.
const SHORT_RECORD_HEADER_SIZE: u64 = 4 + 2 + 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Header,
    RecordHeader,
    RecordBody { remaining: u64 },
    Ready,
}

/// Chunk-fed byte scanner. Does not implement `Read`/`Write`/`Seek`: see the
/// module doc for why.
#[derive(Debug)]
pub struct DynamicBuffer {
    state: ScanState,
    accumulated: Vec<u8>,
    version: Option<Version>,
    frame_number: u32,
    duration: f64,
    /// Length of the record currently being scanned (needed to know how
    /// much body remains once the header has been parsed).
    pending_body_len: u64,
}

impl Default for DynamicBuffer {
    fn default() -> Self {
        DynamicBuffer {
            state: ScanState::Header,
            accumulated: Vec::new(),
            version: None,
            frame_number: 0,
            duration: 0.0,
            pending_body_len: 0,
        }
    }
}

impl DynamicBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, ScanState::Ready)
    }

    pub fn detected_version(&self) -> Option<Version> {
        self.version
    }

    pub fn frame_number(&self) -> u32 {
        self.frame_number
    }

    pub fn accumulated_duration(&self) -> f64 {
        self.duration
    }

    /// How many bytes the scanner wants to see next.
    pub fn next_block_size(&self) -> usize {
        match self.state {
            ScanState::Header => HEADER_PROBE_SIZE,
            ScanState::RecordHeader => match self.version {
                Some(v) if v.uses_long_ptr_struct() => LONG_RECORD_HEADER_SIZE as usize,
                _ => SHORT_RECORD_HEADER_SIZE as usize,
            },
            ScanState::RecordBody { remaining } => remaining as usize,
            ScanState::Ready => 0,
        }
    }

    /// Deliver the next chunk of bytes. `bytes.len()` must be `<=
    /// next_block_size()`; fewer bytes are accepted and simply leave the
    /// scanner waiting for the remainder on the next call plus whatever was
    /// still outstanding, mirroring a caller that reads short from a
    /// socket.
    pub fn next_block(&mut self, bytes: &[u8]) -> Result<()> {
        let wanted = self.next_block_size();
        if bytes.len() > wanted {
            return Err(Error::NeedMoreData { needed: wanted, available: bytes.len() });
        }
        self.accumulated.extend_from_slice(bytes);

        if bytes.len() < wanted {
            // Not enough yet; reduce the remaining count for body scans so
            // the next call asks for only what is still missing.
            if let ScanState::RecordBody { remaining } = &mut self.state {
                *remaining -= bytes.len() as u64;
            }
            return Ok(());
        }

        match self.state {
            ScanState::Header => {
                self.parse_header(bytes)?;
                self.state = ScanState::RecordHeader;
            }
            ScanState::RecordHeader => {
                self.pending_body_len = self.parse_record_header(bytes)?;
                if self.pending_body_len == 0 {
                    self.state = ScanState::RecordHeader; // null/EOF-terminated header with no body
                } else {
                    self.state = ScanState::RecordBody { remaining: self.pending_body_len };
                }
            }
            ScanState::RecordBody { .. } => {
                // Body fully delivered; a real implementation would hand
                // these bytes to the registry to decode a `Kind`. The
                // scanner itself only tracks framing, so it returns to
                // waiting for the next record header.
                self.state = ScanState::RecordHeader;
            }
            ScanState::Ready => {}
        }
        Ok(())
    }

    /// Explicit signal from the caller that no more records follow (the
    /// EOF record's body has been delivered and decoded upstream).
    pub fn mark_ready(&mut self) {
        self.state = ScanState::Ready;
    }

    fn parse_header(&mut self, bytes: &[u8]) -> Result<()> {
        if &bytes[0..5] != b"IGWD " && &bytes[0..5] != b"LIGO " {
            // Originator tag is not semantically validated beyond
            // length/ASCII; still require it to be plausible ASCII.
            if !bytes[0..5].iter().all(u8::is_ascii) {
                return Err(Error::NotAFrameFile);
            }
        }
        let major = bytes[5];
        if !Version(major).is_supported() {
            return Err(Error::UnsupportedVersion(major));
        }
        self.version = Some(Version(major));
        Ok(())
    }

    fn parse_record_header(&self, bytes: &[u8]) -> Result<u64> {
        let long_form = matches!(self.version, Some(v) if v.uses_long_ptr_struct());
        let length = if long_form {
            u64::from_le_bytes(bytes[0..8].try_into().unwrap())
        } else {
            u32::from_le_bytes(bytes[0..4].try_into().unwrap()) as u64
        };
        let header_len = if long_form { LONG_RECORD_HEADER_SIZE } else { SHORT_RECORD_HEADER_SIZE };
        Ok(length.saturating_sub(header_len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_in_header_state_wanting_the_probe() {
        let buf = DynamicBuffer::new();
        assert_eq!(buf.next_block_size(), HEADER_PROBE_SIZE);
        assert!(!buf.is_ready());
    }

    #[test]
    fn short_delivery_reduces_remaining_instead_of_erroring() {
        let mut buf = DynamicBuffer::new();
        let chunk = vec![0u8; HEADER_PROBE_SIZE - 2];
        buf.next_block(&chunk).unwrap();
        assert_eq!(buf.next_block_size(), HEADER_PROBE_SIZE);
    }

    #[test]
    fn over_delivery_is_rejected() {
        let mut buf = DynamicBuffer::new();
        let chunk = vec![0u8; HEADER_PROBE_SIZE + 1];
        assert!(matches!(buf.next_block(&chunk), Err(Error::NeedMoreData { .. })));
    }

    #[test]
    fn header_with_unsupported_version_errors() {
        let mut buf = DynamicBuffer::new();
        let mut chunk = vec![b'L', b'I', b'G', b'O', b' ', 200, 0];
        chunk.extend_from_slice(&[0u8; 4]);
        chunk.extend_from_slice(&[0u8; 8]);
        assert!(matches!(buf.next_block(&chunk), Err(Error::UnsupportedVersion(200))));
    }

    #[test]
    fn header_then_record_header_transition() {
        let mut buf = DynamicBuffer::new();
        let mut chunk = vec![b'L', b'I', b'G', b'O', b' ', 8, 0];
        chunk.extend_from_slice(&[0u8; 4]);
        chunk.extend_from_slice(&[0u8; 8]);
        buf.next_block(&chunk).unwrap();
        assert_eq!(buf.detected_version(), Some(Version::V8));
        assert_eq!(buf.next_block_size(), LONG_RECORD_HEADER_SIZE as usize);
    }
}
