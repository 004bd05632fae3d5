//! Stream-filter chain: side-channel consumers visited on every byte
//! transferred, attached/detached around file/frame/object scopes.

pub mod crc;
pub mod md5;

use crc::{CksumCrc, LdasCrc};
use md5::Md5;

/// Which checksum algorithm a filter (or a `chkType` field on the wire)
/// names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChecksumKind {
    None,
    Cksum,
    Ldas,
    Md5,
}

impl ChecksumKind {
    pub fn from_wire(v: u16) -> Self {
        match v {
            0 => ChecksumKind::None,
            1 => ChecksumKind::Cksum,
            2 => ChecksumKind::Ldas,
            3 => ChecksumKind::Md5,
            _ => ChecksumKind::None,
        }
    }

    pub fn to_wire(self) -> u16 {
        match self {
            ChecksumKind::None => 0,
            ChecksumKind::Cksum => 1,
            ChecksumKind::Ldas => 2,
            ChecksumKind::Md5 => 3,
        }
    }
}

/// A side-channel consumer of every byte transferred through a stream.
pub trait Filter: std::fmt::Debug {
    fn update(&mut self, bytes: &[u8]);
    /// 32-bit digest. MD5's 128-bit digest is truncated to its first four
    /// bytes here for uniformity; callers that need the full digest use
    /// [`Filter::md5_digest`] directly on the concrete type instead.
    fn value(&mut self) -> u32;
    fn reset(&mut self);
}

#[derive(Debug, Default)]
pub struct CksumFilter(CksumCrc);

impl Filter for CksumFilter {
    fn update(&mut self, bytes: &[u8]) {
        self.0.update(bytes);
    }
    fn value(&mut self) -> u32 {
        self.0.finish()
    }
    fn reset(&mut self) {
        self.0.reset();
    }
}

#[derive(Debug, Default)]
pub struct LdasFilter(LdasCrc);

impl Filter for LdasFilter {
    fn update(&mut self, bytes: &[u8]) {
        self.0.update(bytes);
    }
    fn value(&mut self) -> u32 {
        self.0.finish()
    }
    fn reset(&mut self) {
        self.0.reset();
    }
}

#[derive(Debug, Default)]
pub struct Md5Filter(Md5);

impl Md5Filter {
    pub fn digest(&self) -> [u8; 16] {
        self.0.finish()
    }
}

impl Filter for Md5Filter {
    fn update(&mut self, bytes: &[u8]) {
        self.0.update(bytes);
    }
    fn value(&mut self) -> u32 {
        let d = self.0.finish();
        u32::from_be_bytes([d[0], d[1], d[2], d[3]])
    }
    fn reset(&mut self) {
        self.0 = Md5::new();
    }
}

/// The scope a filter is attached for. Scope is a property of the
/// attach/detach discipline, not of the filter itself — the same
/// `CksumFilter` type backs file-, frame-, and object-scope checksums.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterScope {
    File,
    Frame,
    Object,
}

/// Ordered list of filters currently attached to a stream. `feed` is called
/// once per byte-transferring primitive read/write, regardless of which
/// higher-level operation is in progress.
#[derive(Debug, Default)]
pub struct FilterChain {
    filters: Vec<(FilterScope, Box<dyn Filter>)>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, scope: FilterScope, filter: Box<dyn Filter>) {
        self.filters.push((scope, filter));
    }

    /// Detach and return the first filter attached at `scope`, in
    /// attach order (oldest first), matching a LIFO-agnostic "this scope's
    /// filter" lookup since scopes never overlap within themselves.
    pub fn detach(&mut self, scope: FilterScope) -> Option<Box<dyn Filter>> {
        let idx = self.filters.iter().position(|(s, _)| *s == scope)?;
        Some(self.filters.remove(idx).1)
    }

    pub fn feed(&mut self, bytes: &[u8]) {
        for (_, filter) in self.filters.iter_mut() {
            filter.update(bytes);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Current digest of the first filter attached at `scope`, without
    /// detaching it — used to read a running file-scope checksum just
    /// before writing the trailing record that reports it (§4.6).
    pub fn value(&mut self, scope: FilterScope) -> Option<u32> {
        self.filters.iter_mut().find(|(s, _)| *s == scope).map(|(_, f)| f.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attaching_mid_stream_only_sees_bytes_after_attach() {
        let mut chain = FilterChain::new();
        chain.feed(b"not seen");
        chain.attach(FilterScope::Object, Box::new(CksumFilter::default()));
        chain.feed(b"seen");

        let mut direct = CksumCrc::new();
        direct.update(b"seen");

        let mut filter = chain.detach(FilterScope::Object).unwrap();
        assert_eq!(filter.value(), direct.finish());
    }

    #[test]
    fn multiple_scopes_update_together() {
        let mut chain = FilterChain::new();
        chain.attach(FilterScope::File, Box::new(LdasFilter::default()));
        chain.attach(FilterScope::Frame, Box::new(LdasFilter::default()));
        chain.feed(b"xyz");
        let mut file_filter = chain.detach(FilterScope::File).unwrap();
        let mut frame_filter = chain.detach(FilterScope::Frame).unwrap();
        assert_eq!(file_filter.value(), frame_filter.value());
    }
}
