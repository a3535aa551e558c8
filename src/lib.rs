#![no_std]

pub mod error;
pub use error::Error;

// In-place single block transforms. `block` must be exactly BLOCK_SIZE
// bytes; other lengths panic, as does decrypt_block when !can_decrypt().
pub trait BlockCipher {
    const BLOCK_SIZE: usize;
    fn encrypt_block(&self, block: &mut [u8]);
    fn decrypt_block(&self, block: &mut [u8]);
    // False for contexts built without a decryption schedule.
    fn can_decrypt(&self) -> bool { true }
}

pub mod blowfish; // 64-bit block Feistel cipher, 32..448 bit keys.
pub mod blowfish_consts;
pub type BlowfishBlock = [u8; 8];

pub mod rijndael; // 128-bit block SPN, 128/192/256 bit keys.
pub mod rijndael_consts;
pub type RijndaelBlock = [u8; 16];

pub mod modes; // ECB and CBC over any BlockCipher.

pub mod sha256;
pub mod hmac;
pub mod pbkdf2;
pub type Digest = [u8; sha256::DIGEST_LENGTH];

pub trait SeedRNG { fn fill(&mut self, buf: &mut [u8]); }
pub mod prng;

#[cfg(test)]
mod tests;
