use crate::*;
use crate::blowfish::new_blowfish;
use crate::rijndael::{new_rijndael, new_rijndael_enc_only, key_setup_dec, key_setup_enc};
use crate::sha256::{new_sha256, sha256};
use crate::hmac::{hmac_sha256, new_hmac_sha256};
use crate::pbkdf2::pbkdf2_hmac_sha256;
use crate::error::{code_of, NO_ERROR};
use rug::{float::Constant, Float, Integer};

extern crate std;
use std::format;
use std::vec;
use std::vec::Vec;

fn h(s: &str) -> Vec<u8> {
    hex::decode(s).unwrap()
}

fn primes(n: usize) -> Vec<u32> {
    let mut r = Vec::new();
    let mut c = 2u32;
    while r.len() < n {
        if r.iter().all(|p| c % p != 0) {
            r.push(c);
        }
        c += 1;
    }
    r
}

fn sqrt_frac_32(n: u32) -> u32 {
    (Integer::from(n) << 64u32).sqrt().to_u32_wrapping()
}

fn cbrt_frac_32(n: u32) -> u32 {
    (Integer::from(n) << 96u32).root(3).to_u32_wrapping()
}

// first `n` 32 bit words of the fractional part of pi
fn pi_frac_words(n: usize) -> Vec<u32> {
    let bits = 32 * n as u32;
    let pi = Float::with_val(bits + 128, Constant::Pi);
    let frac = ((pi - 3u32) << bits).floor();
    let int = frac.to_integer().unwrap();
    (0..n).map(|i| (int.clone() >> (32 * (n - 1 - i)) as u32).to_u32_wrapping()).collect()
}

// GF(2^8) multiply, reduction polynomial x^8 + x^4 + x^3 + x + 1
fn gmul(mut a: u8, mut b: u8) -> u8 {
    let mut r = 0u8;
    while b != 0 {
        if b & 1 != 0 { r ^= a; }
        let hi = a & 0x80;
        a <<= 1;
        if hi != 0 { a ^= 0x1b; }
        b >>= 1;
    }
    r
}

#[test]
fn check_csts() {
    let p = primes(64);
    for i in 0..8 {
        assert_eq!(sqrt_frac_32(p[i]), sha256::IV[i]);
    }
    for i in 0..64 {
        assert_eq!(cbrt_frac_32(p[i]), sha256::K[i]);
    }

    let pi = pi_frac_words(blowfish::P_LENGTH + blowfish::S_LENGTH);
    assert_eq!(pi[..blowfish::P_LENGTH], blowfish_consts::P_INIT);
    assert_eq!(pi[blowfish::P_LENGTH..], blowfish_consts::S_INIT);
}

#[test]
fn check_rijndael_tables() {
    use crate::rijndael_consts::*;
    for x in 0..256 {
        let s = SBOX[x];
        assert_eq!(INV_SBOX[s as usize] as usize, x);
        let te = u32::from_be_bytes([gmul(s, 2), s, s, gmul(s, 3)]);
        assert_eq!(TE0[x], te);
        assert_eq!(TE1[x], te.rotate_right(8));
        assert_eq!(TE3[x], te.rotate_right(24));
        let i = INV_SBOX[x];
        let td = u32::from_be_bytes([gmul(i, 14), gmul(i, 9), gmul(i, 13), gmul(i, 11)]);
        assert_eq!(TD0[x], td);
        assert_eq!(TD2[x], td.rotate_right(16));
    }
    let mut r = 1u8;
    for c in RCON {
        assert_eq!(c, (r as u32) << 24);
        r = gmul(r, 2);
    }
}

// ----------------------------------------------------------------------------
#[test]
fn check_blowfish_ecb() {
    let vectors = [
        ("0000000000000000", "0000000000000000", "4EF997456198DD78"),
        ("FFFFFFFFFFFFFFFF", "FFFFFFFFFFFFFFFF", "51866FD5B85ECB8A"),
        ("FEDCBA9876543210", "0123456789ABCDEF", "0ACEAB0FC6A0A28D"),
        ("0123456789ABCDEF", "1111111111111111", "61F9C3802281B096"),
        ("F0E1D2C3", "FEDCBA9876543210", "BE1E639408640F05"),
        ("F0E1D2C3B4A5968778695A4B3C2D1E0F0011223344556677", "FEDCBA9876543210", "05044B62FA52D080"),
    ];
    for (key, pt, ct) in vectors {
        let bf = new_blowfish(&h(key)).unwrap();
        let mut out = [0u8; 8];
        bf.encrypt_ecb(&h(pt), &mut out).unwrap();
        assert_eq!(out[..], h(ct)[..]);
        let mut back = [0u8; 8];
        bf.decrypt_ecb(&out, &mut back).unwrap();
        assert_eq!(back[..], h(pt)[..]);
    }

    let key: Vec<u8> = (0..56).collect();
    let bf = new_blowfish(&key).unwrap();
    let mut block = [0u8; 8];
    bf.encrypt_block_bytes(&mut block);
    assert_eq!(block[..], h("5DF23F8894102401")[..]);
    bf.decrypt_block_bytes(&mut block);
    assert_eq!(block, [0u8; 8]);
}

#[test]
fn check_blowfish_cbc() {
    let key = h("0123456789ABCDEFF0E1D2C3B4A59687");
    let iv = h("FEDCBA9876543210");
    let mut pt = [0u8; 32];
    pt[..28].copy_from_slice(b"7654321 Now is the time for ");

    let bf = new_blowfish(&key).unwrap();
    let mut ct = [0u8; 32];
    bf.encrypt(&iv, &pt, &mut ct).unwrap();
    assert_eq!(ct[..], h("6B77B4D63006DEE605B156E27403979358DEB9E7154616D959F1652BD5FF92CC")[..]);
    drop(bf);

    // fresh context from the same key
    let bf = new_blowfish(&key).unwrap();
    let mut back = [0u8; 32];
    bf.decrypt(&iv, &ct, &mut back).unwrap();
    assert_eq!(back, pt);

    // each half decrypts on its own given the preceding ciphertext block
    let mut split = [0u8; 32];
    let (lo, hi) = split.split_at_mut(16);
    bf.decrypt(&ct[8..16], &ct[16..], hi).unwrap();
    bf.decrypt(&iv, &ct[..16], lo).unwrap();
    assert_eq!(split, pt);
}

#[test]
fn check_blowfish_errors() {
    assert_eq!(new_blowfish(&[0u8; 3]).err(), Some(Error::InvalidLength));
    assert_eq!(new_blowfish(&[0u8; 57]).err(), Some(Error::InvalidLength));
    assert!(new_blowfish(&[0u8; 4]).is_ok());
    assert!(new_blowfish(&[0u8; 56]).is_ok());

    let mut bf = new_blowfish(b"key bytes").unwrap();
    let iv = [0u8; 8];
    let mut out = [0xAAu8; 12];
    assert_eq!(bf.encrypt_ecb(&[1u8; 12], &mut out), Err(Error::InvalidLength));
    assert_eq!(bf.decrypt_ecb(&[1u8; 12], &mut out), Err(Error::InvalidLength));
    assert_eq!(bf.encrypt(&iv, &[1u8; 12], &mut out), Err(Error::InvalidLength));
    assert_eq!(bf.decrypt(&iv, &[1u8; 12], &mut out), Err(Error::InvalidLength));
    assert_eq!(out, [0xAAu8; 12]);

    let mut out = [0xAAu8; 16];
    assert_eq!(bf.encrypt(&[0u8; 7], &[1u8; 16], &mut out), Err(Error::InvalidLength));
    assert_eq!(bf.encrypt(&[0u8; 16], &[1u8; 16], &mut out), Err(Error::InvalidLength));
    assert_eq!(bf.encrypt_ecb(&[1u8; 8], &mut out), Err(Error::InvalidLength));
    assert_eq!(out, [0xAAu8; 16]);

    // empty input is a whole number of blocks
    assert_eq!(bf.encrypt(&iv, &[], &mut []), Ok(()));

    // failed re-key keeps the old schedule
    let mut before = [0u8; 8];
    bf.encrypt_block_bytes(&mut before);
    assert_eq!(bf.init(&[0u8; 60]), Err(Error::InvalidLength));
    let mut after = [0u8; 8];
    bf.encrypt_block_bytes(&mut after);
    assert_eq!(before, after);

    bf.end();
    bf.end();
}

#[test]
fn check_blowfish_round_trip() {
    let mut rng = prng::new_fixed_hashrng(7);
    for klen in [4, 8, 16, 33, 56] {
        let mut key = vec![0u8; klen];
        rng.fill(&mut key);
        let mut iv = [0u8; 8];
        rng.fill(&mut iv);
        let mut pt = vec![0u8; 8 * (klen + 1)];
        rng.fill(&mut pt);

        let bf = new_blowfish(&key).unwrap();
        let mut ct = vec![0u8; pt.len()];
        let mut back = vec![0u8; pt.len()];
        bf.encrypt(&iv, &pt, &mut ct).unwrap();
        assert_ne!(ct, pt);
        bf.decrypt(&iv, &ct, &mut back).unwrap();
        assert_eq!(back, pt);

        bf.encrypt_ecb(&pt, &mut ct).unwrap();
        bf.decrypt_ecb(&ct, &mut back).unwrap();
        assert_eq!(back, pt);
    }
}

// ----------------------------------------------------------------------------
#[test]
fn check_rijndael_fips197() {
    let pt = h("00112233445566778899aabbccddeeff");
    let vectors = [
        ("000102030405060708090a0b0c0d0e0f", 10, "69c4e0d86a7b0430d8cdb78070b4c55a"),
        ("000102030405060708090a0b0c0d0e0f1011121314151617", 12, "dda97ca4864cdfe06eaf70a0ec0d7191"),
        ("000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f", 14, "8ea2b7ca516745bfeafc49904b496089"),
    ];
    for (key, rounds, ct) in vectors {
        let rj = new_rijndael(&h(key)).unwrap();
        assert_eq!(rj.rounds(), rounds);
        assert!(!rj.is_enc_only());

        let mut src = [0u8; 16];
        src.copy_from_slice(&pt);
        let mut dst = [0u8; 16];
        rj.encrypt(&src, &mut dst);
        assert_eq!(dst[..], h(ct)[..]);

        let mut back = [0u8; 16];
        rj.decrypt(&dst, &mut back).unwrap();
        assert_eq!(back[..], pt[..]);
    }
}

#[test]
fn check_rijndael_key_setup() {
    let key = [0u8; 32];
    let mut rk = [0u32; rijndael::SCHEDULE_LENGTH];
    assert_eq!(key_setup_enc(&mut rk, &key, 128), 10);
    assert_eq!(key_setup_enc(&mut rk, &key, 192), 12);
    assert_eq!(key_setup_enc(&mut rk, &key, 256), 14);
    assert_eq!(key_setup_enc(&mut rk, &key, 160), 0);
    assert_eq!(key_setup_enc(&mut rk, &key[..16], 256), 0);
    assert_eq!(key_setup_dec(&mut rk, &key, 64), 0);

    // last round key of AES-128 with key 2b7e1516...
    let key = h("2b7e151628aed2a6abf7158809cf4f3c");
    let mut ek = [0u32; rijndael::SCHEDULE_LENGTH];
    assert_eq!(key_setup_enc(&mut ek, &key, 128), 10);
    assert_eq!(ek[40..44], [0xd014f9a8, 0xc9ee2589, 0xe13f0cc8, 0xb6630ca6]);

    // decryption schedule starts with the last encryption round key and
    // ends with the first, untransformed
    let mut dk = [0u32; rijndael::SCHEDULE_LENGTH];
    assert_eq!(key_setup_dec(&mut dk, &key, 128), 10);
    assert_eq!(dk[..4], ek[40..44]);
    assert_eq!(dk[40..44], ek[..4]);

    for bad in [0usize, 8, 15, 17, 20, 31, 33, 64] {
        assert_eq!(new_rijndael(&vec![0u8; bad]).err(), Some(Error::InvalidLength));
        assert_eq!(new_rijndael_enc_only(&vec![0u8; bad]).err(), Some(Error::InvalidLength));
    }
}

#[test]
fn check_rijndael_modes() {
    let key = h("2b7e151628aed2a6abf7158809cf4f3c");
    let iv = h("000102030405060708090a0b0c0d0e0f");
    let pt = h("6bc1bee22e409f96e93d7e117393172aae2d8a571e03ac9c9eb76fac45af8e51");
    let rj = new_rijndael(&key).unwrap();

    let mut ct = vec![0u8; 32];
    modes::ecb_encrypt(&rj, &pt, &mut ct).unwrap();
    assert_eq!(ct[..16], h("3ad77bb40d7a3660a89ecaf32466ef97")[..]);

    modes::cbc_encrypt(&rj, &iv, &pt, &mut ct).unwrap();
    assert_eq!(ct, h("7649abac8119b246cee98e9b12e9197d5086cb9b507219ee95db113a917678b2"));
    let mut back = vec![0u8; 32];
    modes::cbc_decrypt(&rj, &iv, &ct, &mut back).unwrap();
    assert_eq!(back, pt);

    let mut out = [0xAAu8; 24];
    assert_eq!(modes::ecb_encrypt(&rj, &[0u8; 24], &mut out), Err(Error::InvalidLength));
    assert_eq!(modes::cbc_encrypt(&rj, &iv[..8], &[0u8; 16], &mut out[..16]), Err(Error::InvalidLength));
    assert_eq!(out, [0xAAu8; 24]);
}

#[test]
fn check_rijndael_round_trip() {
    let mut rng = prng::new_fixed_hashrng(11);
    for klen in [16, 24, 32] {
        let mut key = vec![0u8; klen];
        rng.fill(&mut key);
        let rj = new_rijndael(&key).unwrap();
        assert_eq!(rj.rounds(), klen / 4 + 6);

        for blocks in [1, 2, 5, 16] {
            let mut iv = [0u8; 16];
            rng.fill(&mut iv);
            let mut pt = vec![0u8; 16 * blocks];
            rng.fill(&mut pt);
            let mut ct = vec![0u8; pt.len()];
            let mut back = vec![0u8; pt.len()];

            modes::ecb_encrypt(&rj, &pt, &mut ct).unwrap();
            assert_ne!(ct, pt);
            modes::ecb_decrypt(&rj, &ct, &mut back).unwrap();
            assert_eq!(back, pt);

            let mut block = [0u8; 16];
            block.copy_from_slice(&pt[..16]);
            rj.encrypt_block(&mut block);
            assert_eq!(block[..], ct[..16]);
            rj.decrypt_block(&mut block);
            assert_eq!(block[..], pt[..16]);

            modes::cbc_encrypt(&rj, &iv, &pt, &mut ct).unwrap();
            back.fill(0);
            modes::cbc_decrypt(&rj, &iv, &ct, &mut back).unwrap();
            assert_eq!(back, pt);
        }
    }
}

#[test]
#[should_panic(expected = "no decryption schedule")]
fn check_enc_only_decrypt_block_panics() {
    let rj = new_rijndael_enc_only(&[7u8; 16]).unwrap();
    let mut block = [0u8; 16];
    rj.encrypt_block(&mut block);
    rj.decrypt_block(&mut block);
}

#[test]
#[should_panic]
fn check_block_length_rijndael() {
    let rj = new_rijndael(&[7u8; 16]).unwrap();
    let mut block = [0u8; 17];
    rj.encrypt_block(&mut block);
}

#[test]
#[should_panic]
fn check_block_length_blowfish() {
    let bf = new_blowfish(&[7u8; 16]).unwrap();
    let mut block = [0u8; 12];
    bf.decrypt_block(&mut block);
}

#[test]
fn check_rijndael_enc_only() {
    let key = h("000102030405060708090a0b0c0d0e0f");
    let mut rj = new_rijndael_enc_only(&key).unwrap();
    assert!(rj.is_enc_only());
    assert_eq!(rj.rounds(), 10);

    let mut src = [0u8; 16];
    src.copy_from_slice(&h("00112233445566778899aabbccddeeff"));
    let mut dst = [0u8; 16];
    rj.encrypt(&src, &mut dst);
    assert_eq!(dst[..], h("69c4e0d86a7b0430d8cdb78070b4c55a")[..]);

    let mut back = [0x55u8; 16];
    assert_eq!(rj.decrypt(&dst, &mut back), Err(Error::InvalidParameters));
    assert_eq!(back, [0x55u8; 16]);
    let mut out = [0x55u8; 16];
    assert_eq!(modes::ecb_decrypt(&rj, &dst, &mut out), Err(Error::InvalidParameters));
    assert_eq!(out, [0x55u8; 16]);

    // upgrading to a full context enables decryption
    rj.set_key(&key).unwrap();
    rj.decrypt(&dst, &mut back).unwrap();
    assert_eq!(back, src);

    // a rejected key leaves the context usable
    assert_eq!(rj.set_key(&[0u8; 20]), Err(Error::InvalidLength));
    let mut again = [0u8; 16];
    rj.encrypt(&src, &mut again);
    assert_eq!(again, dst);

    rj.end();
    rj.end();
    assert_eq!(rj.rounds(), 0);
}

// ----------------------------------------------------------------------------
#[test]
fn check_sha256() {
    let vectors: [(&[u8], &str); 6] = [
        (b"", "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"),
        (b"abc", "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"),
        (b"abcdbcdecdefdefgefghfghighijhijkijkljklmklmnlmnomnopnopq",
            "248d6a61d20638b8e5c026930c3e6039a33ce45964ff2167f6ecedd419db06c1"),
        (&[b'a'; 55], "9f4390f8d30c2dd92ec9f095b65e2b9ae9b0a925a5258e241c9f1e910f734318"),
        (&[b'a'; 56], "b35439a4ac6f0948b6d6f9e3c6af0f5f590ce20f1bde7090ef7970686ec6738a"),
        (&[b'a'; 64], "ffe054fe7ae0cb6dc65c3af9b61d5209f439851db43d0ba5997337df154668eb"),
    ];
    for (msg, digest) in vectors {
        let d = sha256(msg);
        assert_eq!(d.len(), sha256::DIGEST_LENGTH);
        assert_eq!(d[..], h(digest)[..]);
    }

    let mut ctx = new_sha256();
    let chunk = [b'a'; 1000];
    for _ in 0..1000 {
        ctx.update(&chunk);
    }
    assert_eq!(ctx.finalize()[..], h("cdc76e5c9914fb9281a1c7e284d73e67f1809a48a497200e046d39ccc7112cd0")[..]);
}

#[test]
fn check_sha256_streaming() {
    let mut rng = prng::new_fixed_hashrng(3);
    let mut msg = [0u8; 150];
    rng.fill(&mut msg);
    let whole = sha256(&msg);
    for split in 0..=msg.len() {
        let mut ctx = new_sha256();
        ctx.update(&msg[..split]);
        ctx.update(&[]);
        ctx.update(&msg[split..]);
        assert_eq!(ctx.finalize(), whole);
    }

    let mut ctx = new_sha256();
    for b in msg.iter() {
        ctx.update(&[*b]);
    }
    assert_eq!(ctx.finalize(), whole);

    // init() discards everything absorbed so far
    let mut ctx = new_sha256();
    ctx.update(b"discarded");
    ctx.init();
    ctx.update(&msg);
    assert_eq!(ctx.finalize(), whole);
}

#[test]
fn check_hmac_sha256() {
    let vectors = [
        (h("0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b"), b"Hi There".to_vec(),
            "b0344c61d8db38535ca8afceaf0bf12b881dc200c9833da726e9376c2e32cff7"),
        (b"Jefe".to_vec(), b"what do ya want for nothing?".to_vec(),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"),
        // keys over the block size are hashed, including over 128 bytes
        (vec![0xAAu8; 131], b"Test Using Larger Than Block-Size Key - Hash Key First".to_vec(),
            "60e431591ee0b67f0d8a26aacbf5b77f8e0bc6213728c5140546040f0ee37f54"),
        (vec![0xAAu8; 100], b"x".to_vec(),
            "6229c9e2c7d9863a0cfd7e8e03268a67e6e4bb0c3e0810b50eefc7bfd63a93d8"),
    ];
    for (key, msg, mac) in vectors {
        assert_eq!(hmac_sha256(&key, &msg)[..], h(mac)[..]);

        let keyed = new_hmac_sha256(&key);
        let mut m = keyed.clone();
        let (a, b) = msg.split_at(msg.len() / 2);
        m.update(a);
        m.update(b);
        assert_eq!(m.finalize()[..], h(mac)[..]);
        // the keyed state is reusable
        let mut m = keyed.clone();
        m.update(&msg);
        assert_eq!(m.finalize()[..], h(mac)[..]);
    }
}

#[test]
fn check_pbkdf2() {
    let vectors: [(&[u8], &[u8], u32, &str); 5] = [
        (b"password", b"salt", 1, "120fb6cffcf8b32c43e7225256c4f837a86548c92ccc35480805987cb70be17b"),
        (b"password", b"salt", 2, "ae4d0c95af6b46d32d0adff928f06dd02a303f8ef3c251dfd6e2d85a95474c43"),
        (b"password", b"salt", 4096, "c5e478d59288c841aa530db6845c4c8d962893a001ce4e11a4963873aa98134a"),
        (b"passwordPASSWORDpassword", b"saltSALTsaltSALTsaltSALTsaltSALTsalt", 4096,
            "348c89dbcbd32b2f32d814b8116e84cf2b17347ebc1800181c4e2a1fb8dd53e1c635518c7dac47e9"),
        (b"pass\0word", b"sa\0lt", 4096, "89b69d0516f829893c696226650a8687"),
    ];
    for (pass, salt, rounds, dk) in vectors {
        let expected = h(dk);
        let mut out = vec![0u8; expected.len()];
        pbkdf2_hmac_sha256(pass, salt, &mut out, rounds).unwrap();
        assert_eq!(out, expected);
    }

    // shorter outputs are prefixes of longer ones
    let mut short = [0u8; 5];
    pbkdf2_hmac_sha256(b"password", b"salt", &mut short, 2).unwrap();
    assert_eq!(short[..], h("ae4d0c95af")[..]);
}

#[test]
fn check_pbkdf2_errors() {
    let mut out = [0x77u8; 32];
    assert_eq!(pbkdf2_hmac_sha256(b"password", b"salt", &mut out, 0), Err(Error::InvalidParameters));
    assert_eq!(pbkdf2_hmac_sha256(b"password", b"", &mut out, 1), Err(Error::InvalidParameters));
    assert_eq!(pbkdf2_hmac_sha256(b"password", b"salt", &mut [], 1), Err(Error::InvalidParameters));
    assert_eq!(out, [0x77u8; 32]);

    // an empty password is allowed
    assert_eq!(pbkdf2_hmac_sha256(b"", b"salt", &mut out, 1), Ok(()));
    assert_ne!(out, [0x77u8; 32]);
}

// ----------------------------------------------------------------------------
#[test]
fn check_error_codes() {
    assert_eq!(NO_ERROR, 0);
    assert_eq!(Error::Untested.code(), 1);
    assert_eq!(Error::InvalidLength.code(), 2);
    assert_eq!(Error::NullPointer.code(), 3);
    assert_eq!(Error::InvalidParameters.code(), 4);
    for code in 1..=4 {
        assert_eq!(Error::from_code(code).map(|e| e.code()), Some(code));
    }
    assert_eq!(Error::from_code(NO_ERROR), None);
    assert_eq!(Error::from_code(5), None);

    let mut out = [0u8; 8];
    assert_eq!(code_of(&pbkdf2_hmac_sha256(b"p", b"s", &mut out, 1)), NO_ERROR);
    assert_eq!(code_of(&new_blowfish(&[])), 2);
    assert_eq!(format!("{}", Error::InvalidLength), "Invalid key, IV or buffer length");
}

#[test]
fn check_hashrng() {
    let mut a = prng::new_fixed_hashrng(42);
    let mut b = prng::new_fixed_hashrng(42);
    let mut c = prng::new_fixed_hashrng(43);
    let mut x = [0u8; 100];
    let mut y = [0u8; 100];
    let mut z = [0u8; 100];
    a.fill(&mut x[..33]);
    a.fill(&mut x[33..]);
    b.fill(&mut y);
    c.fill(&mut z);
    assert_eq!(x, y);
    assert_ne!(x, z);
    assert_eq!(x[..32], sha256(&42u128.to_le_bytes())[..]);
    assert_eq!(x[32..64], sha256(&43u128.to_le_bytes())[..]);
}
