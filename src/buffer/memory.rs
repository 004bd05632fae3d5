//! Memory buffer backed by an owning byte vector.

use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};

#[derive(Debug, Default)]
pub struct MemoryBuffer(Cursor<Vec<u8>>);

impl MemoryBuffer {
    pub fn new() -> Self {
        MemoryBuffer(Cursor::new(Vec::new()))
    }

    pub fn from_vec(bytes: Vec<u8>) -> Self {
        MemoryBuffer(Cursor::new(bytes))
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.0.into_inner()
    }

    pub fn as_slice(&self) -> &[u8] {
        self.0.get_ref()
    }
}

impl Read for MemoryBuffer {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}

impl Write for MemoryBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }
    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

impl Seek for MemoryBuffer {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.0.seek(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_then_reads_from_start() {
        let mut buf = MemoryBuffer::new();
        buf.write_all(b"hello").unwrap();
        buf.seek(SeekFrom::Start(0)).unwrap();
        let mut out = [0u8; 5];
        buf.read_exact(&mut out).unwrap();
        assert_eq!(&out, b"hello");
    }
}
