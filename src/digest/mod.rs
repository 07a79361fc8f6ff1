//! Streaming 128-bit content digest (MD5, RFC 1321).
//!
//! `Md5::finalize` consumes the hasher, so appending to a finished digest
//! cannot be expressed.
//!
//! The block decoder is written against an explicit host byte order. Message
//! words and the emitted digest are little-endian four-byte groups; a
//! big-endian host loads each group in its native order and must swap it.
//! `Endian::NATIVE` is what production code uses; tests drive both orders.

use std::fmt;
use std::io::{self, Read};

/// Digest length in bytes.
pub const DIGEST_BYTES: usize = 16;

const BLOCK_LEN: usize = 64;

/// Length-field offset inside the final padded block.
const LENGTH_OFFSET: usize = 56;

/// Read size used when hashing a stream.
const READ_CHUNK: usize = 64 * 1024;

const INIT_STATE: [u32; 4] = [0x6745_2301, 0xefcd_ab89, 0x98ba_dcfe, 0x1032_5476];

/// Per-step left-rotate amounts, four rounds of sixteen.
const SHIFTS: [u32; 64] = [
    7, 12, 17, 22, 7, 12, 17, 22, 7, 12, 17, 22, 7, 12, 17, 22, //
    5, 9, 14, 20, 5, 9, 14, 20, 5, 9, 14, 20, 5, 9, 14, 20, //
    4, 11, 16, 23, 4, 11, 16, 23, 4, 11, 16, 23, 4, 11, 16, 23, //
    6, 10, 15, 21, 6, 10, 15, 21, 6, 10, 15, 21, 6, 10, 15, 21,
];

/// Per-step additive constants, `floor(abs(sin(i + 1)) * 2^32)`.
const CONSTANTS: [u32; 64] = [
    0xd76a_a478, 0xe8c7_b756, 0x2420_70db, 0xc1bd_ceee, 0xf57c_0faf, 0x4787_c62a, 0xa830_4613,
    0xfd46_9501, 0x6980_98d8, 0x8b44_f7af, 0xffff_5bb1, 0x895c_d7be, 0x6b90_1122, 0xfd98_7193,
    0xa679_438e, 0x49b4_0821, 0xf61e_2562, 0xc040_b340, 0x265e_5a51, 0xe9b6_c7aa, 0xd62f_105d,
    0x0244_1453, 0xd8a1_e681, 0xe7d3_fbc8, 0x21e1_cde6, 0xc337_07d6, 0xf4d5_0d87, 0x455a_14ed,
    0xa9e3_e905, 0xfcef_a3f8, 0x676f_02d9, 0x8d2a_4c8a, 0xfffa_3942, 0x8771_f681, 0x6d9d_6122,
    0xfde5_380c, 0xa4be_ea44, 0x4bde_cfa9, 0xf6bb_4b60, 0xbebf_bc70, 0x289b_7ec6, 0xeaa1_27fa,
    0xd4ef_3085, 0x0488_1d05, 0xd9d4_d039, 0xe6db_99e5, 0x1fa2_7cf8, 0xc4ac_5665, 0xf429_2244,
    0x432a_ff97, 0xab94_23a7, 0xfc93_a039, 0x655b_59c3, 0x8f0c_cc92, 0xffef_f47d, 0x8584_5dd1,
    0x6fa8_7e4f, 0xfe2c_e6e0, 0xa301_4314, 0x4e08_11a1, 0xf753_7e82, 0xbd3a_f235, 0x2ad7_d2bb,
    0xeb86_d391,
];

/// Host byte order the block decoder is written against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

impl Endian {
    #[cfg(target_endian = "big")]
    pub const NATIVE: Endian = Endian::Big;
    #[cfg(not(target_endian = "big"))]
    pub const NATIVE: Endian = Endian::Little;

    /// Interpret four bytes the way a host of this order sees them in memory.
    fn load_native(self, bytes: [u8; 4]) -> u32 {
        match self {
            Endian::Little => u32::from_le_bytes(bytes),
            Endian::Big => u32::from_be_bytes(bytes),
        }
    }

    fn store_native(self, word: u32) -> [u8; 4] {
        match self {
            Endian::Little => word.to_le_bytes(),
            Endian::Big => word.to_be_bytes(),
        }
    }

    /// Load a little-endian message word.
    fn load_word(self, bytes: [u8; 4]) -> u32 {
        let raw = self.load_native(bytes);
        match self {
            Endian::Little => raw,
            Endian::Big => raw.swap_bytes(),
        }
    }

    /// Emit a state word as a little-endian group.
    fn store_word(self, word: u32) -> [u8; 4] {
        let raw = match self {
            Endian::Little => word,
            Endian::Big => word.swap_bytes(),
        };
        self.store_native(raw)
    }
}

/// A finished 128-bit digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Digest([u8; DIGEST_BYTES]);

impl Digest {
    pub fn as_bytes(&self) -> &[u8; DIGEST_BYTES] {
        &self.0
    }

    /// 32 lowercase hex characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl From<[u8; DIGEST_BYTES]> for Digest {
    fn from(bytes: [u8; DIGEST_BYTES]) -> Self {
        Digest(bytes)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Incremental MD5 state.
#[derive(Clone)]
pub struct Md5 {
    state: [u32; 4],
    buffer: [u8; BLOCK_LEN],
    buffered: usize,
    /// Total message length in bytes.
    length: u64,
    host: Endian,
}

impl Default for Md5 {
    fn default() -> Self {
        Self::new()
    }
}

impl Md5 {
    pub fn new() -> Self {
        Self::with_host_order(Endian::NATIVE)
    }

    /// Hasher whose block decoder behaves as on a host of the given order.
    pub fn with_host_order(host: Endian) -> Self {
        Md5 {
            state: INIT_STATE,
            buffer: [0; BLOCK_LEN],
            buffered: 0,
            length: 0,
            host,
        }
    }

    /// One-shot digest of a byte slice.
    pub fn digest(data: &[u8]) -> Digest {
        let mut hasher = Md5::new();
        hasher.update(data);
        hasher.finalize()
    }

    pub fn update(&mut self, mut data: &[u8]) {
        self.length = self.length.wrapping_add(data.len() as u64);

        if self.buffered > 0 {
            let take = (BLOCK_LEN - self.buffered).min(data.len());
            self.buffer[self.buffered..self.buffered + take].copy_from_slice(&data[..take]);
            self.buffered += take;
            data = &data[take..];
            if self.buffered < BLOCK_LEN {
                return;
            }
            compress(&mut self.state, &self.buffer, self.host);
            self.buffered = 0;
        }

        let mut blocks = data.chunks_exact(BLOCK_LEN);
        for block in &mut blocks {
            compress(&mut self.state, block, self.host);
        }
        let rest = blocks.remainder();
        self.buffer[..rest.len()].copy_from_slice(rest);
        self.buffered = rest.len();
    }

    pub fn finalize(mut self) -> Digest {
        let bit_length = self.length.wrapping_mul(8);

        let mut padding = [0u8; BLOCK_LEN];
        padding[0] = 0x80;
        let pad_len = if self.buffered < LENGTH_OFFSET {
            LENGTH_OFFSET - self.buffered
        } else {
            BLOCK_LEN + LENGTH_OFFSET - self.buffered
        };
        self.update(&padding[..pad_len]);
        self.update(&bit_length.to_le_bytes());
        debug_assert_eq!(self.buffered, 0);

        let mut out = [0u8; DIGEST_BYTES];
        for (chunk, word) in out.chunks_exact_mut(4).zip(self.state) {
            chunk.copy_from_slice(&self.host.store_word(word));
        }
        Digest(out)
    }
}

impl io::Write for Md5 {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn compress(state: &mut [u32; 4], block: &[u8], host: Endian) {
    let mut words = [0u32; 16];
    for (word, bytes) in words.iter_mut().zip(block.chunks_exact(4)) {
        *word = host.load_word([bytes[0], bytes[1], bytes[2], bytes[3]]);
    }

    let [mut a, mut b, mut c, mut d] = *state;
    for step in 0..64 {
        let (mixed, index) = match step / 16 {
            0 => ((b & c) | (!b & d), step),
            1 => ((d & b) | (!d & c), (5 * step + 1) % 16),
            2 => (b ^ c ^ d, (3 * step + 5) % 16),
            _ => (c ^ (b | !d), (7 * step) % 16),
        };
        let rotated = a
            .wrapping_add(mixed)
            .wrapping_add(CONSTANTS[step])
            .wrapping_add(words[index])
            .rotate_left(SHIFTS[step]);
        a = d;
        d = c;
        c = b;
        b = b.wrapping_add(rotated);
    }

    state[0] = state[0].wrapping_add(a);
    state[1] = state[1].wrapping_add(b);
    state[2] = state[2].wrapping_add(c);
    state[3] = state[3].wrapping_add(d);
}

/// Result of hashing a stream that may fail part way.
#[derive(Debug)]
pub struct StreamDigest {
    /// Digest over every byte read before the stream ended or failed.
    pub digest: Digest,
    pub bytes_read: u64,
    pub error: Option<io::Error>,
}

/// Hash a reader to its end. A read error stops hashing; the partial digest
/// is returned alongside the error so the caller decides what to keep.
pub fn digest_reader<R: Read>(mut reader: R) -> StreamDigest {
    let mut hasher = Md5::new();
    let mut buf = vec![0u8; READ_CHUNK];
    let mut bytes_read = 0u64;
    loop {
        match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => {
                hasher.update(&buf[..n]);
                bytes_read += n as u64;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                return StreamDigest {
                    digest: hasher.finalize(),
                    bytes_read,
                    error: Some(e),
                }
            }
        }
    }
    StreamDigest {
        digest: hasher.finalize(),
        bytes_read,
        error: None,
    }
}
