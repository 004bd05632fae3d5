//! Read-only memory buffer backed by a caller-owned byte span with
//! explicit bounds. Writes fail with [`io::ErrorKind::Unsupported`].

use std::io::{self, Read, Seek, SeekFrom};

#[derive(Debug)]
pub struct SliceBuffer<'a> {
    data: &'a [u8],
    pos: u64,
}

impl<'a> SliceBuffer<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        SliceBuffer { data, pos: 0 }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<'a> Read for SliceBuffer<'a> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let start = self.pos as usize;
        if start >= self.data.len() {
            return Ok(0);
        }
        let n = buf.len().min(self.data.len() - start);
        buf[..n].copy_from_slice(&self.data[start..start + n]);
        self.pos += n as u64;
        Ok(n)
    }
}

impl<'a> io::Write for SliceBuffer<'a> {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::Unsupported, "SliceBuffer is read-only"))
    }
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> Seek for SliceBuffer<'a> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let new_pos: i64 = match pos {
            SeekFrom::Start(p) => p as i64,
            SeekFrom::End(p) => self.data.len() as i64 + p,
            SeekFrom::Current(p) => self.pos as i64 + p,
        };
        if new_pos < 0 {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "seek before start"));
        }
        self.pos = new_pos as u64;
        Ok(self.pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_respects_explicit_bounds() {
        let data = [1u8, 2, 3, 4, 5];
        let mut buf = SliceBuffer::new(&data);
        let mut out = [0u8; 3];
        buf.read_exact(&mut out).unwrap();
        assert_eq!(out, [1, 2, 3]);
        assert_eq!(buf.read(&mut out).unwrap(), 2);
    }

    #[test]
    fn write_is_unsupported() {
        let data = [0u8; 4];
        let mut buf = SliceBuffer::new(&data);
        assert!(io::Write::write(&mut buf, b"x").is_err());
    }
}
