//! PBKDF2 (RFC 8018) with HMAC-SHA256 as the pseudorandom function.

use crate::*;
use crate::hmac::new_hmac_sha256;
use crate::sha256::DIGEST_LENGTH;
use zeroize::Zeroizing;

/// Stretches `pass` with `salt` over `rounds` iterations, filling all of `out`.
///
/// Output block `i` (from 1) is `U1 ^ U2 ^ .. ^ U_rounds` with
/// `U1 = HMAC(pass, salt || BE32(i))` and `U_j = HMAC(pass, U_{j-1})`.
///
/// Fails with [`Error::InvalidParameters`] when `rounds` is 0, `salt` or
/// `out` is empty, or `out` needs more than 2^32 - 1 blocks; `out` is not
/// written then. Intermediate blocks are wiped before returning.
pub fn pbkdf2_hmac_sha256(pass: &[u8], salt: &[u8], out: &mut [u8], rounds: u32) -> Result<(), Error> {
    if rounds < 1 || out.is_empty() || salt.is_empty() {
        return Err(Error::InvalidParameters);
    }
    if out.len().div_ceil(DIGEST_LENGTH) as u64 > u32::MAX as u64 {
        return Err(Error::InvalidParameters);
    }

    let keyed = new_hmac_sha256(pass);
    let mut u = Zeroizing::new([0u8; DIGEST_LENGTH]);
    let mut t = Zeroizing::new([0u8; DIGEST_LENGTH]);

    for (i, chunk) in out.chunks_mut(DIGEST_LENGTH).enumerate() {
        // salt || BE32(count) is streamed into the mac, never concatenated
        let count = (i + 1) as u32;
        let mut mac = keyed.clone();
        mac.update(salt);
        mac.update(&count.to_be_bytes());
        *u = mac.finalize();
        *t = *u;

        for _ in 1..rounds {
            let mut mac = keyed.clone();
            mac.update(&u[..]);
            *u = mac.finalize();
            for (t, u) in t.iter_mut().zip(u.iter()) {
                *t ^= *u;
            }
        }

        chunk.copy_from_slice(&t[..chunk.len()]);
    }
    Ok(())
}
