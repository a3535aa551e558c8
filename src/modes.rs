//! ECB and CBC chaining over any [`BlockCipher`].
//!
//! Every function reads from `input` and writes an equal length `out`.
//! Lengths are checked before the first byte of `out` is touched, and no
//! padding is applied: `input` must be a whole number of blocks.

use crate::*;

// ----------------------------------------------------------------------------
fn check_lengths<C: BlockCipher>(input: &[u8], out: &[u8]) -> Result<(), Error> {
    if input.len() % C::BLOCK_SIZE != 0 || out.len() != input.len() {
        return Err(Error::InvalidLength);
    }
    Ok(())
}

fn check_iv<C: BlockCipher>(iv: &[u8]) -> Result<(), Error> {
    if iv.len() != C::BLOCK_SIZE {
        return Err(Error::InvalidLength);
    }
    Ok(())
}

fn check_decrypt<C: BlockCipher>(cipher: &C) -> Result<(), Error> {
    if !cipher.can_decrypt() {
        return Err(Error::InvalidParameters);
    }
    Ok(())
}

#[inline(always)]
fn xor_into(dst: &mut [u8], src: &[u8]) {
    for (d, s) in dst.iter_mut().zip(src.iter()) {
        *d ^= *s;
    }
}

// ----------------------------------------------------------------------------
pub fn ecb_encrypt<C: BlockCipher>(cipher: &C, input: &[u8], out: &mut [u8]) -> Result<(), Error> {
    check_lengths::<C>(input, out)?;
    out.copy_from_slice(input);
    for block in out.chunks_exact_mut(C::BLOCK_SIZE) {
        cipher.encrypt_block(block);
    }
    Ok(())
}

pub fn ecb_decrypt<C: BlockCipher>(cipher: &C, input: &[u8], out: &mut [u8]) -> Result<(), Error> {
    check_lengths::<C>(input, out)?;
    check_decrypt(cipher)?;
    out.copy_from_slice(input);
    for block in out.chunks_exact_mut(C::BLOCK_SIZE) {
        cipher.decrypt_block(block);
    }
    Ok(())
}

// ----------------------------------------------------------------------------
/// Each plaintext block is xored with the previous ciphertext block (the
/// first with `iv`) before encryption, so blocks are strictly sequential.
pub fn cbc_encrypt<C: BlockCipher>(cipher: &C, iv: &[u8], input: &[u8], out: &mut [u8]) -> Result<(), Error> {
    check_lengths::<C>(input, out)?;
    check_iv::<C>(iv)?;
    let bs = C::BLOCK_SIZE;
    out.copy_from_slice(input);
    for i in (0..out.len()).step_by(bs) {
        let (done, rest) = out.split_at_mut(i);
        let block = &mut rest[..bs];
        let prev = if i == 0 { iv } else { &done[i - bs..] };
        xor_into(block, prev);
        cipher.encrypt_block(block);
    }
    Ok(())
}

/// Output block i only needs ciphertext blocks i and i-1, so callers may
/// split a buffer on block boundaries and decrypt the parts independently,
/// passing the preceding ciphertext block as each part's `iv`.
pub fn cbc_decrypt<C: BlockCipher>(cipher: &C, iv: &[u8], input: &[u8], out: &mut [u8]) -> Result<(), Error> {
    check_lengths::<C>(input, out)?;
    check_iv::<C>(iv)?;
    check_decrypt(cipher)?;
    let bs = C::BLOCK_SIZE;
    out.copy_from_slice(input);
    for (i, block) in out.chunks_exact_mut(bs).enumerate() {
        cipher.decrypt_block(block);
        let prev = if i == 0 { iv } else { &input[(i - 1) * bs..i * bs] };
        xor_into(block, prev);
    }
    Ok(())
}
