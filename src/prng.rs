use crate::*;
use sha256::sha256;
use zeroize::Zeroize;

// Deterministic byte stream: SHA-256 of a little-endian u128 counter,
// one 32 byte block per counter value. For reproducible test data and
// benchmarks, not for keys.
pub struct HashRng {
    c: u128,
    h: Digest,
    i: usize
}
// ----------------------------------------------------------------------------
pub fn new_fixed_hashrng(seed: u128) -> HashRng {
    let mut r = HashRng {
        c: seed, h: [0; sha256::DIGEST_LENGTH], i: 0
    };
    r.rehash();
    r
}
impl HashRng {
    fn rehash(&mut self) {
        self.h = sha256(&self.c.to_le_bytes());
    }
}
impl SeedRNG for HashRng {
    fn fill(&mut self, buf: &mut [u8]) {
        for b in buf {
            *b = self.h[self.i];
            self.i += 1;
            if self.i == sha256::DIGEST_LENGTH {
                self.c = self.c.wrapping_add(1);
                self.rehash();
                self.i = 0;
            }
        }
    }
}
impl Drop for HashRng {
    fn drop(&mut self) {
        self.h.zeroize();
        self.c.zeroize();
    }
}
