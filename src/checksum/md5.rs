//! MD5, hand-ported for the same reason the CRC variants are: the teacher
//! repo never reaches for a crate to reimplement an algorithm it can port
//! directly (see `frame/header.rs`'s byte-swap helpers, `hc/*` for the LZ4
//! match finder). File-scope only, always optional, computed in parallel to
//! (never instead of) CRC — per the checksum wiring rules.

const S: [u32; 64] = [
    7, 12, 17, 22, 7, 12, 17, 22, 7, 12, 17, 22, 7, 12, 17, 22, 5, 9, 14, 20, 5, 9, 14, 20, 5, 9,
    14, 20, 5, 9, 14, 20, 4, 11, 16, 23, 4, 11, 16, 23, 4, 11, 16, 23, 4, 11, 16, 23, 6, 10, 15,
    21, 6, 10, 15, 21, 6, 10, 15, 21, 6, 10, 15, 21,
];

const K: [u32; 64] = [
    0xd76aa478, 0xe8c7b756, 0x242070db, 0xc1bdceee, 0xf57c0faf, 0x4787c62a, 0xa8304613, 0xfd469501,
    0x698098d8, 0x8b44f7af, 0xffff5bb1, 0x895cd7be, 0x6b901122, 0xfd987193, 0xa679438e, 0x49b40821,
    0xf61e2562, 0xc040b340, 0x265e5a51, 0xe9b6c7aa, 0xd62f105d, 0x02441453, 0xd8a1e681, 0xe7d3fbc8,
    0x21e1cde6, 0xc33707d6, 0xf4d50d87, 0x455a14ed, 0xa9e3e905, 0xfcefa3f8, 0x676f02d9, 0x8d2a4c8a,
    0xfffa3942, 0x8771f681, 0x6d9d6122, 0xfde5380c, 0xa4beea44, 0x4bdecfa9, 0xf6bb4b60, 0xbebfbc70,
    0x289b7ec6, 0xeaa127fa, 0xd4ef3085, 0x04881d05, 0xd9d4d039, 0xe6db99e5, 0x1fa27cf8, 0xc4ac5665,
    0xf4292244, 0x432aff97, 0xab9423a7, 0xfc93a039, 0x655b59c3, 0x8f0ccc92, 0xffeff47d, 0x85845dd1,
    0x6fa87e4f, 0xfe2ce6e0, 0xa3014314, 0x4e0811a1, 0xf7537e82, 0xbd3af235, 0x2ad7d2bb, 0xeb86d391,
];

/// Streaming MD5 accumulator. Mirrors the usual "buffer up to 64 bytes,
/// compress whenever a full block is available, pad on finalize" shape.
#[derive(Debug, Clone)]
pub struct Md5 {
    state: [u32; 4],
    buffer: Vec<u8>,
    total_len: u64,
}

impl Default for Md5 {
    fn default() -> Self {
        Md5 {
            state: [0x67452301, 0xefcdab89, 0x98badcfe, 0x10325476],
            buffer: Vec::with_capacity(64),
            total_len: 0,
        }
    }
}

impl Md5 {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, bytes: &[u8]) {
        self.total_len += bytes.len() as u64;
        self.buffer.extend_from_slice(bytes);
        let mut offset = 0;
        while self.buffer.len() - offset >= 64 {
            let block: [u8; 64] = self.buffer[offset..offset + 64].try_into().unwrap();
            self.compress(&block);
            offset += 64;
        }
        self.buffer.drain(..offset);
    }

    pub fn finish(&self) -> [u8; 16] {
        let mut this = self.clone();
        let bit_len = this.total_len * 8;
        this.buffer.push(0x80);
        while this.buffer.len() % 64 != 56 {
            this.buffer.push(0);
        }
        this.buffer.extend_from_slice(&bit_len.to_le_bytes());
        let mut offset = 0;
        while offset < this.buffer.len() {
            let block: [u8; 64] = this.buffer[offset..offset + 64].try_into().unwrap();
            this.compress(&block);
            offset += 64;
        }
        let mut out = [0u8; 16];
        for (i, word) in this.state.iter().enumerate() {
            out[i * 4..i * 4 + 4].copy_from_slice(&word.to_le_bytes());
        }
        out
    }

    fn compress(&mut self, block: &[u8; 64]) {
        let mut m = [0u32; 16];
        for i in 0..16 {
            m[i] = u32::from_le_bytes(block[i * 4..i * 4 + 4].try_into().unwrap());
        }

        let (mut a, mut b, mut c, mut d) = (self.state[0], self.state[1], self.state[2], self.state[3]);

        for i in 0..64 {
            let (f, g) = match i {
                0..=15 => ((b & c) | (!b & d), i),
                16..=31 => ((d & b) | (!d & c), (5 * i + 1) % 16),
                32..=47 => (b ^ c ^ d, (3 * i + 5) % 16),
                _ => (c ^ (b | !d), (7 * i) % 16),
            };
            let f = f.wrapping_add(a).wrapping_add(K[i]).wrapping_add(m[g]);
            a = d;
            d = c;
            c = b;
            b = b.wrapping_add(f.rotate_left(S[i]));
        }

        self.state[0] = self.state[0].wrapping_add(a);
        self.state[1] = self.state[1].wrapping_add(b);
        self.state[2] = self.state[2].wrapping_add(c);
        self.state[3] = self.state[3].wrapping_add(d);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    #[test]
    fn md5_empty_string() {
        let md5 = Md5::new();
        assert_eq!(hex(&md5.finish()), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn md5_abc() {
        let mut md5 = Md5::new();
        md5.update(b"abc");
        assert_eq!(hex(&md5.finish()), "900150983cd24fb0d6963f7d28e17f72");
    }

    #[test]
    fn md5_streamed_equals_oneshot() {
        let mut streamed = Md5::new();
        streamed.update(b"the quick ");
        streamed.update(b"brown fox");
        let mut oneshot = Md5::new();
        oneshot.update(b"the quick brown fox");
        assert_eq!(streamed.finish(), oneshot.finish());
    }
}
