//! HMAC-SHA256 (RFC 2104).
//!
//! Keys longer than the 64 byte block are hashed first, as the RFC
//! requires; there is no upper key length.

use crate::*;
use crate::sha256::{new_sha256, sha256, Sha256, BLOCK_SIZE, DIGEST_LENGTH};
use zeroize::{Zeroize, Zeroizing};

const IPAD: u8 = 0x36;
const OPAD: u8 = 0x5C;

// Both halves are keyed up front: inner has absorbed key ^ ipad, outer
// key ^ opad. Cloning a keyed value skips the pad hashing for the next
// message under the same key.
#[derive(Clone)]
pub struct HmacSha256 {
    inner: Sha256,
    outer: Sha256,
}

// ----------------------------------------------------------------------------
pub fn new_hmac_sha256(key: &[u8]) -> HmacSha256 {
    let mut k = Zeroizing::new([0u8; BLOCK_SIZE]);
    if key.len() > BLOCK_SIZE {
        let mut hk = sha256(key);
        k[..DIGEST_LENGTH].copy_from_slice(&hk);
        hk.zeroize();
    } else {
        k[..key.len()].copy_from_slice(key);
    }

    let mut pad = Zeroizing::new([0u8; BLOCK_SIZE]);
    let mut inner = new_sha256();
    for (p, b) in pad.iter_mut().zip(k.iter()) {
        *p = b ^ IPAD;
    }
    inner.update(&pad[..]);

    let mut outer = new_sha256();
    for (p, b) in pad.iter_mut().zip(k.iter()) {
        *p = b ^ OPAD;
    }
    outer.update(&pad[..]);

    HmacSha256 { inner, outer }
}

/// One-shot HMAC-SHA256 of `message` under `key`.
pub fn hmac_sha256(key: &[u8], message: &[u8]) -> Digest {
    let mut mac = new_hmac_sha256(key);
    mac.update(message);
    mac.finalize()
}

// ----------------------------------------------------------------------------
impl HmacSha256 {
    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    pub fn finalize(self) -> Digest {
        let HmacSha256 { inner, mut outer } = self;
        let mut ih = inner.finalize();
        outer.update(&ih);
        ih.zeroize();
        outer.finalize()
    }
}
