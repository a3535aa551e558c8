use crate::*;
use crate::blowfish_consts::{P_INIT, S_INIT};
use zeroize::Zeroize;

pub const P_LENGTH: usize = 18;
pub const S_LENGTH: usize = 1024;
pub const BLOCK_SIZE: usize = 8;
pub const MIN_KEY_LENGTH: usize = 4;   // 32 bits
pub const MAX_KEY_LENGTH: usize = 56;  // 448 bits

const ROUNDS: usize = 16;

// p holds the 18 round keys, s the four 256 entry S-boxes back to back.
// Both are key dependent; the context is wiped on drop or end().
pub struct Blowfish {
    p: [u32; P_LENGTH],
    s: [u32; S_LENGTH],
}

// ----------------------------------------------------------------------------
/// Runs the Blowfish key schedule over `key` (4 to 56 bytes).
///
/// Fails with [`Error::InvalidLength`] for any other key length.
pub fn new_blowfish(key: &[u8]) -> Result<Blowfish, Error> {
    check_key(key)?;
    let mut r = Blowfish { p: P_INIT, s: S_INIT };
    r.schedule(key);
    Ok(r)
}

// ----------------------------------------------------------------------------
fn check_key(key: &[u8]) -> Result<(), Error> {
    if key.len() < MIN_KEY_LENGTH || key.len() > MAX_KEY_LENGTH {
        return Err(Error::InvalidLength);
    }
    Ok(())
}

// ----------------------------------------------------------------------------
#[inline(always)]
fn load(block: &[u8]) -> (u32, u32) {
    (u32::from_be_bytes([block[0], block[1], block[2], block[3]]),
     u32::from_be_bytes([block[4], block[5], block[6], block[7]]))
}

#[inline(always)]
fn store(block: &mut [u8], l: u32, r: u32) {
    block[..4].copy_from_slice(&l.to_be_bytes());
    block[4..8].copy_from_slice(&r.to_be_bytes());
}

// ----------------------------------------------------------------------------
impl Blowfish {
    /// Re-keys an existing context. On error the context is left as it was.
    pub fn init(&mut self, key: &[u8]) -> Result<(), Error> {
        check_key(key)?;
        self.p = P_INIT;
        self.s = S_INIT;
        self.schedule(key);
        Ok(())
    }

    fn schedule(&mut self, key: &[u8]) {
        let mut j = 0;
        for p in self.p.iter_mut() {
            let mut d = 0u32;
            for _ in 0..4 {
                d = (d << 8) | key[j] as u32;
                j = (j + 1) % key.len();
            }
            *p ^= d;
        }

        // The cipher is keyed with its own partially built state: each
        // encryption overwrites the next two words of P, then of S.
        let (mut l, mut r) = (0u32, 0u32);
        for i in (0..P_LENGTH).step_by(2) {
            self.encrypt_words(&mut l, &mut r);
            self.p[i] = l;
            self.p[i + 1] = r;
        }
        for i in (0..S_LENGTH).step_by(2) {
            self.encrypt_words(&mut l, &mut r);
            self.s[i] = l;
            self.s[i + 1] = r;
        }
        l.zeroize();
        r.zeroize();
    }

    #[inline(always)]
    fn f(&self, x: u32) -> u32 {
        let a = self.s[(x >> 24) as usize];
        let b = self.s[256 + ((x >> 16) & 0xff) as usize];
        let c = self.s[512 + ((x >> 8) & 0xff) as usize];
        let d = self.s[768 + (x & 0xff) as usize];
        (a.wrapping_add(b) ^ c).wrapping_add(d)
    }

    pub fn encrypt_words(&self, xl: &mut u32, xr: &mut u32) {
        let (mut l, mut r) = (*xl, *xr);
        for i in 0..ROUNDS {
            l ^= self.p[i];
            r ^= self.f(l);
            core::mem::swap(&mut l, &mut r);
        }
        // undo the last swap
        core::mem::swap(&mut l, &mut r);
        r ^= self.p[ROUNDS];
        l ^= self.p[ROUNDS + 1];
        *xl = l;
        *xr = r;
    }

    pub fn decrypt_words(&self, xl: &mut u32, xr: &mut u32) {
        let (mut l, mut r) = (*xl, *xr);
        for i in (2..ROUNDS + 2).rev() {
            l ^= self.p[i];
            r ^= self.f(l);
            core::mem::swap(&mut l, &mut r);
        }
        core::mem::swap(&mut l, &mut r);
        r ^= self.p[1];
        l ^= self.p[0];
        *xl = l;
        *xr = r;
    }

    pub fn encrypt_block_bytes(&self, block: &mut BlowfishBlock) {
        BlockCipher::encrypt_block(self, block);
    }

    pub fn decrypt_block_bytes(&self, block: &mut BlowfishBlock) {
        BlockCipher::decrypt_block(self, block);
    }

    /// CBC encryption of `pt` into `out`; see [`modes::cbc_encrypt`].
    pub fn encrypt(&self, iv: &[u8], pt: &[u8], out: &mut [u8]) -> Result<(), Error> {
        modes::cbc_encrypt(self, iv, pt, out)
    }

    /// CBC decryption of `ct` into `out`; see [`modes::cbc_decrypt`].
    pub fn decrypt(&self, iv: &[u8], ct: &[u8], out: &mut [u8]) -> Result<(), Error> {
        modes::cbc_decrypt(self, iv, ct, out)
    }

    pub fn encrypt_ecb(&self, pt: &[u8], out: &mut [u8]) -> Result<(), Error> {
        modes::ecb_encrypt(self, pt, out)
    }

    pub fn decrypt_ecb(&self, ct: &[u8], out: &mut [u8]) -> Result<(), Error> {
        modes::ecb_decrypt(self, ct, out)
    }

    /// Wipes the key schedule. Safe to call repeatedly; drop calls it again.
    pub fn end(&mut self) {
        self.p.zeroize();
        self.s.zeroize();
    }
}

impl BlockCipher for Blowfish {
    const BLOCK_SIZE: usize = BLOCK_SIZE;

    fn encrypt_block(&self, block: &mut [u8]) {
        assert_eq!(block.len(), BLOCK_SIZE);
        let (mut l, mut r) = load(block);
        self.encrypt_words(&mut l, &mut r);
        store(block, l, r);
    }

    fn decrypt_block(&self, block: &mut [u8]) {
        assert_eq!(block.len(), BLOCK_SIZE);
        let (mut l, mut r) = load(block);
        self.decrypt_words(&mut l, &mut r);
        store(block, l, r);
    }
}

impl Drop for Blowfish {
    fn drop(&mut self) {
        self.end();
    }
}
