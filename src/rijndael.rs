//! Rijndael (AES) with 128, 192 and 256 bit keys on single 16 byte blocks.
//!
//! Rounds are table driven: SubBytes, ShiftRows and MixColumns of one
//! column collapse into four lookups in `TE0..TE3` (`TD0..TD3` for the
//! inverse). The decryption schedule is the encryption schedule reversed
//! with InvMixColumns applied to the inner round keys, which lets
//! decryption reuse the same round shape.
//!
//! Chaining is left to [`modes`]; `Rijndael` implements [`BlockCipher`].

use crate::*;
use crate::rijndael_consts::*;
use zeroize::Zeroize;

pub const BLOCK_SIZE: usize = 16;
pub const MAX_ROUNDS: usize = 14;
pub const MAX_KEY_LENGTH: usize = 32;
pub const SCHEDULE_LENGTH: usize = 4 * (MAX_ROUNDS + 1);
pub type Schedule = [u32; SCHEDULE_LENGTH];

type State = [u32; 4];

// ek is always populated; dk only when enc_only is false.
pub struct Rijndael {
    enc_only: bool,
    rounds: usize,
    ek: Schedule,
    dk: Schedule,
}

// ----------------------------------------------------------------------------
/// Key context with both schedules. `key` must be 16, 24 or 32 bytes.
pub fn new_rijndael(key: &[u8]) -> Result<Rijndael, Error> {
    let mut r = empty();
    r.set_key(key)?;
    Ok(r)
}

/// Key context with the encryption schedule only; decryption fails.
pub fn new_rijndael_enc_only(key: &[u8]) -> Result<Rijndael, Error> {
    let mut r = empty();
    r.set_key_enc_only(key)?;
    Ok(r)
}

fn empty() -> Rijndael {
    Rijndael { enc_only: true, rounds: 0, ek: [0; SCHEDULE_LENGTH], dk: [0; SCHEDULE_LENGTH] }
}

fn key_bits(key: &[u8]) -> Result<usize, Error> {
    match key.len() {
        16 | 24 | 32 => Ok(key.len() * 8),
        _ => Err(Error::InvalidLength),
    }
}

// ----------------------------------------------------------------------------
#[inline(always)]
fn get_u32(b: &[u8]) -> u32 {
    u32::from_be_bytes([b[0], b[1], b[2], b[3]])
}

#[inline(always)]
fn load(block: &[u8]) -> State {
    [get_u32(&block[0..]), get_u32(&block[4..]), get_u32(&block[8..]), get_u32(&block[12..])]
}

#[inline(always)]
fn store(block: &mut [u8], s: &State) {
    for (chunk, w) in block.chunks_exact_mut(4).zip(s.iter()) {
        chunk.copy_from_slice(&w.to_be_bytes());
    }
}

// One output column of a full round.
#[inline(always)]
fn column(t: [&[u32; 256]; 4], a: u32, b: u32, c: u32, d: u32, k: u32) -> u32 {
    t[0][(a >> 24) as usize] ^
    t[1][((b >> 16) & 0xff) as usize] ^
    t[2][((c >> 8) & 0xff) as usize] ^
    t[3][(d & 0xff) as usize] ^
    k
}

// One output column of the last round: substitution only, no mixing.
#[inline(always)]
fn last_column(s: &[u8; 256], a: u32, b: u32, c: u32, d: u32, k: u32) -> u32 {
    ((s[(a >> 24) as usize] as u32) << 24) ^
    ((s[((b >> 16) & 0xff) as usize] as u32) << 16) ^
    ((s[((c >> 8) & 0xff) as usize] as u32) << 8) ^
    (s[(d & 0xff) as usize] as u32) ^
    k
}

#[inline(always)]
fn sub_word(w: u32) -> u32 {
    last_column(&SBOX, w, w, w, w, 0)
}

// ----------------------------------------------------------------------------
/// Expands `key` into the encryption schedule `rk`.
///
/// Returns the round count (10, 12 or 14), or 0 when `bits` is not
/// 128/192/256 or `key` is shorter than `bits / 8`; `rk` is untouched then.
pub fn key_setup_enc(rk: &mut Schedule, key: &[u8], bits: usize) -> usize {
    let nk = match bits {
        128 => 4,
        192 => 6,
        256 => 8,
        _ => return 0,
    };
    if key.len() < nk * 4 {
        return 0;
    }
    let rounds = nk + 6;

    for i in 0..nk {
        rk[i] = get_u32(&key[4 * i..]);
    }
    for i in nk..4 * (rounds + 1) {
        let mut temp = rk[i - 1];
        if i % nk == 0 {
            temp = sub_word(temp.rotate_left(8)) ^ RCON[i / nk - 1];
        } else if nk == 8 && i % nk == 4 {
            temp = sub_word(temp);
        }
        rk[i] = rk[i - nk] ^ temp;
    }
    rounds
}

/// Expands `key` into the decryption schedule `rk`: the encryption
/// schedule in reverse round order, with InvMixColumns applied to every
/// round key except the first and the last. Same return as
/// [`key_setup_enc`].
pub fn key_setup_dec(rk: &mut Schedule, key: &[u8], bits: usize) -> usize {
    let rounds = key_setup_enc(rk, key, bits);
    if rounds == 0 {
        return 0;
    }

    let (mut i, mut j) = (0, 4 * rounds);
    while i < j {
        for k in 0..4 {
            rk.swap(i + k, j + k);
        }
        i += 4;
        j -= 4;
    }

    // TD applied to SBOX[x] cancels the substitution, leaving InvMixColumns.
    for w in rk[4..4 * rounds].iter_mut() {
        *w = TD0[SBOX[(*w >> 24) as usize] as usize] ^
             TD1[SBOX[((*w >> 16) & 0xff) as usize] as usize] ^
             TD2[SBOX[((*w >> 8) & 0xff) as usize] as usize] ^
             TD3[SBOX[(*w & 0xff) as usize] as usize];
    }
    rounds
}

// ----------------------------------------------------------------------------
fn encrypt_state(rk: &[u32], rounds: usize, input: &State) -> State {
    const TE: [&[u32; 256]; 4] = [&TE0, &TE1, &TE2, &TE3];
    let mut s = [input[0] ^ rk[0], input[1] ^ rk[1], input[2] ^ rk[2], input[3] ^ rk[3]];
    let mut k = 4;
    for _ in 1..rounds {
        s = [
            column(TE, s[0], s[1], s[2], s[3], rk[k]),
            column(TE, s[1], s[2], s[3], s[0], rk[k + 1]),
            column(TE, s[2], s[3], s[0], s[1], rk[k + 2]),
            column(TE, s[3], s[0], s[1], s[2], rk[k + 3]),
        ];
        k += 4;
    }
    [
        last_column(&SBOX, s[0], s[1], s[2], s[3], rk[k]),
        last_column(&SBOX, s[1], s[2], s[3], s[0], rk[k + 1]),
        last_column(&SBOX, s[2], s[3], s[0], s[1], rk[k + 2]),
        last_column(&SBOX, s[3], s[0], s[1], s[2], rk[k + 3]),
    ]
}

// Rows rotate the other way: column i takes bytes from s[i], s[i-1], s[i-2], s[i-3].
fn decrypt_state(rk: &[u32], rounds: usize, input: &State) -> State {
    const TD: [&[u32; 256]; 4] = [&TD0, &TD1, &TD2, &TD3];
    let mut s = [input[0] ^ rk[0], input[1] ^ rk[1], input[2] ^ rk[2], input[3] ^ rk[3]];
    let mut k = 4;
    for _ in 1..rounds {
        s = [
            column(TD, s[0], s[3], s[2], s[1], rk[k]),
            column(TD, s[1], s[0], s[3], s[2], rk[k + 1]),
            column(TD, s[2], s[1], s[0], s[3], rk[k + 2]),
            column(TD, s[3], s[2], s[1], s[0], rk[k + 3]),
        ];
        k += 4;
    }
    [
        last_column(&INV_SBOX, s[0], s[3], s[2], s[1], rk[k]),
        last_column(&INV_SBOX, s[1], s[0], s[3], s[2], rk[k + 1]),
        last_column(&INV_SBOX, s[2], s[1], s[0], s[3], rk[k + 2]),
        last_column(&INV_SBOX, s[3], s[2], s[1], s[0], rk[k + 3]),
    ]
}

// ----------------------------------------------------------------------------
impl Rijndael {
    /// Builds both schedules. On error the context is left as it was.
    pub fn set_key(&mut self, key: &[u8]) -> Result<(), Error> {
        let bits = key_bits(key)?;
        let rounds = key_setup_enc(&mut self.ek, key, bits);
        if key_setup_dec(&mut self.dk, key, bits) != rounds {
            return Err(Error::InvalidLength);
        }
        self.rounds = rounds;
        self.enc_only = false;
        Ok(())
    }

    /// Builds the encryption schedule and wipes any decryption schedule.
    pub fn set_key_enc_only(&mut self, key: &[u8]) -> Result<(), Error> {
        let bits = key_bits(key)?;
        self.rounds = key_setup_enc(&mut self.ek, key, bits);
        self.dk.zeroize();
        self.enc_only = true;
        Ok(())
    }

    pub fn rounds(&self) -> usize { self.rounds }
    pub fn is_enc_only(&self) -> bool { self.enc_only }

    pub fn encrypt(&self, src: &RijndaelBlock, dst: &mut RijndaelBlock) {
        let s = encrypt_state(&self.ek, self.rounds, &load(src));
        store(dst, &s);
    }

    /// Fails with [`Error::InvalidParameters`] on an encrypt-only context,
    /// leaving `dst` untouched.
    pub fn decrypt(&self, src: &RijndaelBlock, dst: &mut RijndaelBlock) -> Result<(), Error> {
        if self.enc_only {
            return Err(Error::InvalidParameters);
        }
        let s = decrypt_state(&self.dk, self.rounds, &load(src));
        store(dst, &s);
        Ok(())
    }

    /// Wipes both schedules. Safe to call repeatedly; drop calls it again.
    pub fn end(&mut self) {
        self.ek.zeroize();
        self.dk.zeroize();
        self.rounds = 0;
        self.enc_only = true;
    }
}

impl BlockCipher for Rijndael {
    const BLOCK_SIZE: usize = BLOCK_SIZE;

    fn encrypt_block(&self, block: &mut [u8]) {
        assert_eq!(block.len(), BLOCK_SIZE);
        let s = encrypt_state(&self.ek, self.rounds, &load(block));
        store(block, &s);
    }

    // Panics on an encrypt-only context; `decrypt` and `modes` report it instead.
    fn decrypt_block(&self, block: &mut [u8]) {
        assert!(!self.enc_only, "rijndael context has no decryption schedule");
        assert_eq!(block.len(), BLOCK_SIZE);
        let s = decrypt_state(&self.dk, self.rounds, &load(block));
        store(block, &s);
    }

    fn can_decrypt(&self) -> bool {
        !self.enc_only
    }
}

impl Drop for Rijndael {
    fn drop(&mut self) {
        self.end();
    }
}
