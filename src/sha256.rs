use crate::*;
use zeroize::Zeroize;

pub const BLOCK_SIZE: usize = 64;
pub const DIGEST_LENGTH: usize = 32;

// first 32 bits of the fractional parts of the square roots of the first 8 primes 2..19
// double-checked in tests.rs
pub const IV: [u32; 8] =
    [   0x6A09E667, 0xBB67AE85, 0x3C6EF372, 0xA54FF53A,
        0x510E527F, 0x9B05688C, 0x1F83D9AB, 0x5BE0CD19 ];

// first 32 bits of the fractional parts of the cube roots of the first 64 primes 2..311
pub const K: [u32; 64] =
    [   0x428A2F98, 0x71374491, 0xB5C0FBCF, 0xE9B5DBA5,
        0x3956C25B, 0x59F111F1, 0x923F82A4, 0xAB1C5ED5,
        0xD807AA98, 0x12835B01, 0x243185BE, 0x550C7DC3,
        0x72BE5D74, 0x80DEB1FE, 0x9BDC06A7, 0xC19BF174,
        0xE49B69C1, 0xEFBE4786, 0x0FC19DC6, 0x240CA1CC,
        0x2DE92C6F, 0x4A7484AA, 0x5CB0A9DC, 0x76F988DA,
        0x983E5152, 0xA831C66D, 0xB00327C8, 0xBF597FC7,
        0xC6E00BF3, 0xD5A79147, 0x06CA6351, 0x14292967,
        0x27B70A85, 0x2E1B2138, 0x4D2C6DFC, 0x53380D13,
        0x650A7354, 0x766A0ABB, 0x81C2C92E, 0x92722C85,
        0xA2BFE8A1, 0xA81A664B, 0xC24B8B70, 0xC76C51A3,
        0xD192E819, 0xD6990624, 0xF40E3585, 0x106AA070,
        0x19A4C116, 0x1E376C08, 0x2748774C, 0x34B0BCB5,
        0x391C0CB3, 0x4ED8AA4A, 0x5B9CCA4F, 0x682E6FF3,
        0x748F82EE, 0x78A5636F, 0x84C87814, 0x8CC70208,
        0x90BEFFFA, 0xA4506CEB, 0xBEF9A3F7, 0xC67178F2 ];

// data holds datalen bytes of a not yet compressed block.
// bitlen counts compressed bits as [low, high] 32 bit halves.
#[derive(Clone)]
pub struct Sha256 {
    state: [u32; 8],
    bitlen: [u32; 2],
    data: [u8; BLOCK_SIZE],
    datalen: usize,
}

// ----------------------------------------------------------------------------
pub fn new_sha256() -> Sha256 {
    Sha256 { state: IV, bitlen: [0, 0], data: [0; BLOCK_SIZE], datalen: 0 }
}

/// One-shot digest of `data`.
pub fn sha256(data: &[u8]) -> Digest {
    let mut h = new_sha256();
    h.update(data);
    h.finalize()
}

// ----------------------------------------------------------------------------
#[inline(always)]
fn add_bits(bitlen: &mut [u32; 2], n: u32) {
    let (low, carry) = bitlen[0].overflowing_add(n);
    bitlen[0] = low;
    if carry {
        bitlen[1] = bitlen[1].wrapping_add(1);
    }
}

// `block` is exactly BLOCK_SIZE bytes.
fn compress(state: &mut [u32; 8], block: &[u8]) {
    let mut m = [0u32; 64];
    for (w, chunk) in m.iter_mut().zip(block.chunks_exact(4)) {
        *w = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    for i in 16..64 {
        let s0 = m[i - 15].rotate_right(7) ^ m[i - 15].rotate_right(18) ^ (m[i - 15] >> 3);
        let s1 = m[i - 2].rotate_right(17) ^ m[i - 2].rotate_right(19) ^ (m[i - 2] >> 10);
        m[i] = s1.wrapping_add(m[i - 7]).wrapping_add(s0).wrapping_add(m[i - 16]);
    }

    let mut v = *state;
    for i in 0..64 {
        let [a, b, c, d, e, f, g, h] = v;
        let ep1 = e.rotate_right(6) ^ e.rotate_right(11) ^ e.rotate_right(25);
        let ch = (e & f) ^ (!e & g);
        let t1 = h.wrapping_add(ep1).wrapping_add(ch).wrapping_add(K[i]).wrapping_add(m[i]);
        let ep0 = a.rotate_right(2) ^ a.rotate_right(13) ^ a.rotate_right(22);
        let maj = (a & b) ^ (a & c) ^ (b & c);
        let t2 = ep0.wrapping_add(maj);
        v = [t1.wrapping_add(t2), a, b, c, d.wrapping_add(t1), e, f, g];
    }

    for (s, x) in state.iter_mut().zip(v.iter()) {
        *s = s.wrapping_add(*x);
    }
    m.zeroize();
    v.zeroize();
}

// ----------------------------------------------------------------------------
impl Sha256 {
    pub fn init(&mut self) {
        self.state = IV;
        self.bitlen = [0, 0];
        self.data.zeroize();
        self.datalen = 0;
    }

    pub fn update(&mut self, data: &[u8]) {
        let mut data = data;
        if self.datalen > 0 {
            let take = core::cmp::min(BLOCK_SIZE - self.datalen, data.len());
            self.data[self.datalen..self.datalen + take].copy_from_slice(&data[..take]);
            self.datalen += take;
            data = &data[take..];
            if self.datalen < BLOCK_SIZE {
                return;
            }
            compress(&mut self.state, &self.data);
            add_bits(&mut self.bitlen, 512);
            self.datalen = 0;
        }

        let mut blocks = data.chunks_exact(BLOCK_SIZE);
        for block in &mut blocks {
            compress(&mut self.state, block);
            add_bits(&mut self.bitlen, 512);
        }
        let rest = blocks.remainder();
        self.data[..rest.len()].copy_from_slice(rest);
        self.datalen = rest.len();
    }

    /// Pads, appends the big-endian bit length and returns the digest.
    /// Consumes the context; its state is wiped on the way out.
    pub fn finalize(mut self) -> Digest {
        let n = self.datalen;
        self.data[n] = 0x80;
        if n < 56 {
            self.data[n + 1..56].fill(0);
        } else {
            // no room for the length: pad out this block and use one more
            self.data[n + 1..].fill(0);
            compress(&mut self.state, &self.data);
            self.data[..56].fill(0);
        }

        add_bits(&mut self.bitlen, (n * 8) as u32);
        self.data[56..60].copy_from_slice(&self.bitlen[1].to_be_bytes());
        self.data[60..64].copy_from_slice(&self.bitlen[0].to_be_bytes());
        compress(&mut self.state, &self.data);

        let mut digest = [0u8; DIGEST_LENGTH];
        for (chunk, w) in digest.chunks_exact_mut(4).zip(self.state.iter()) {
            chunk.copy_from_slice(&w.to_be_bytes());
        }
        digest
    }
}

impl Drop for Sha256 {
    fn drop(&mut self) {
        self.state.zeroize();
        self.bitlen.zeroize();
        self.data.zeroize();
        self.datalen = 0;
    }
}
