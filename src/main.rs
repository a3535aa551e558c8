// Run using: cargo run --bin bfcrypt --features="cli"

use bfcrypt::*;
use bfcrypt::blowfish::{new_blowfish, Blowfish};
use bfcrypt::hmac::hmac_sha256;
use bfcrypt::pbkdf2::pbkdf2_hmac_sha256;

use std::fs::File;
use std::io::prelude::*;
use std::time::Instant;
use memmap::Mmap;
use zeroize::Zeroizing;

// Container layout, integers little-endian:
//   magic[4] rounds:u32 plain_len:u64 salt[16] iv[8] ciphertext tag[32]
// ciphertext is Blowfish-CBC of the plaintext zero padded to 8 bytes,
// tag is HMAC-SHA256 over everything before it.
const MAGIC: &[u8; 4] = b"BFC1";
const SALT_SIZE: usize = 16;
const IV_SIZE: usize = blowfish::BLOCK_SIZE;
const HEADER_SIZE: usize = 4 + 4 + 8 + SALT_SIZE + IV_SIZE;
const TAG_SIZE: usize = sha256::DIGEST_LENGTH;
const CIPHER_KEY_SIZE: usize = blowfish::MAX_KEY_LENGTH;
const DEFAULT_ROUNDS: u32 = 4096;

struct RandomSource {}
impl SeedRNG for RandomSource {
    fn fill(&mut self, buf: &mut [u8]) {
        if let Err(e) = getrandom::getrandom(buf) {
            println!("no system randomness: {}", e);
            std::process::exit(1);
        }
    }
}

struct Header {
    rounds: u32,
    plain_len: u64,
    salt: [u8; SALT_SIZE],
    iv: BlowfishBlock,
}

fn padded_len(n: u64) -> Option<u64> {
    n.checked_add(IV_SIZE as u64 - 1).map(|v| v / IV_SIZE as u64 * IV_SIZE as u64)
}

// Padded length as an in-memory size; fails where it does not fit a usize.
fn body_size(plain_len: u64) -> Result<usize, String> {
    padded_len(plain_len)
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| "input too large".to_string())
}

impl Header {
    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&self.rounds.to_le_bytes());
        out.extend_from_slice(&self.plain_len.to_le_bytes());
        out.extend_from_slice(&self.salt);
        out.extend_from_slice(&self.iv);
    }

    // Checks everything that can be checked without the passphrase.
    fn parse(data: &[u8]) -> Result<Header, String> {
        if data.len() < HEADER_SIZE + TAG_SIZE {
            return Err(format!("too short for a container: {} bytes", data.len()));
        }
        if &data[..4] != MAGIC {
            return Err("bad magic".to_string());
        }
        let mut word = [0u8; 4];
        word.copy_from_slice(&data[4..8]);
        let rounds = u32::from_le_bytes(word);
        if rounds == 0 {
            return Err("zero pbkdf2 rounds".to_string());
        }
        let mut dword = [0u8; 8];
        dword.copy_from_slice(&data[8..16]);
        let plain_len = u64::from_le_bytes(dword);

        let expected = padded_len(plain_len)
            .and_then(|p| p.checked_add((HEADER_SIZE + TAG_SIZE) as u64));
        if expected != Some(data.len() as u64) {
            return Err(format!("size {} does not match plaintext length {}", data.len(), plain_len));
        }

        let mut salt = [0u8; SALT_SIZE];
        salt.copy_from_slice(&data[16..16 + SALT_SIZE]);
        let mut iv = [0u8; IV_SIZE];
        iv.copy_from_slice(&data[16 + SALT_SIZE..HEADER_SIZE]);
        Ok(Header { rounds, plain_len, salt, iv })
    }
}

// ----------------------------------------------------------------------------
// pbkdf2 output: Blowfish key (56 bytes) then tag key (32 bytes).
fn derive_keys(pass: &[u8], salt: &[u8], rounds: u32) -> Result<(Blowfish, Zeroizing<[u8; TAG_SIZE]>), Error> {
    let mut material = Zeroizing::new([0u8; CIPHER_KEY_SIZE + TAG_SIZE]);
    pbkdf2_hmac_sha256(pass, salt, &mut material[..], rounds)?;
    let bf = new_blowfish(&material[..CIPHER_KEY_SIZE])?;
    let mut mac_key = Zeroizing::new([0u8; TAG_SIZE]);
    mac_key.copy_from_slice(&material[CIPHER_KEY_SIZE..]);
    Ok((bf, mac_key))
}

fn tags_equal(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn seal(pass: &[u8], rounds: u32, salt: [u8; SALT_SIZE], iv: BlowfishBlock, plain: &[u8]) -> Result<Vec<u8>, String> {
    let (bf, mac_key) = derive_keys(pass, &salt, rounds)
        .map_err(|e| format!("key derivation failed: {}", e))?;

    let header = Header { rounds, plain_len: plain.len() as u64, salt, iv };
    let body_len = body_size(header.plain_len)?;
    let mut padded = Zeroizing::new(vec![0u8; body_len]);
    padded[..plain.len()].copy_from_slice(plain);

    let mut out = Vec::with_capacity(HEADER_SIZE + body_len + TAG_SIZE);
    header.write_to(&mut out);
    out.resize(HEADER_SIZE + body_len, 0);
    bf.encrypt(&iv, &padded, &mut out[HEADER_SIZE..])
        .map_err(|e| format!("encryption failed: {}", e))?;

    let tag = hmac_sha256(&mac_key[..], &out);
    out.extend_from_slice(&tag);
    Ok(out)
}

fn open(pass: &[u8], data: &[u8]) -> Result<Zeroizing<Vec<u8>>, String> {
    let header = Header::parse(data)?;
    let body_end = data.len() - TAG_SIZE;
    let (bf, mac_key) = derive_keys(pass, &header.salt, header.rounds)
        .map_err(|e| format!("key derivation failed: {}", e))?;

    let tag = hmac_sha256(&mac_key[..], &data[..body_end]);
    if !tags_equal(&tag, &data[body_end..]) {
        return Err("validation failed".to_string());
    }

    let ct = &data[HEADER_SIZE..body_end];
    let mut plain = Zeroizing::new(vec![0u8; ct.len()]);
    bf.decrypt(&header.iv, ct, &mut plain[..])
        .map_err(|e| format!("decryption failed: {}", e))?;
    plain.truncate(header.plain_len as usize);
    Ok(plain)
}

// ----------------------------------------------------------------------------
fn print_usage_and_exit() {
    println!("Usage: bfcrypt [verb] [params]\n");
    println!("       bfcrypt encrypt passphrase in_file out_file    (-e)");
    println!("       bfcrypt decrypt passphrase in_file out_file    (-d)");
    println!("       bfcrypt verify in_file                         (-i)");
    println!("       bfcrypt benchmark                              (-b)\n");
    println!("       BFCRYPT_ROUNDS overrides the pbkdf2 rounds used by encrypt ({}).", DEFAULT_ROUNDS);
    std::process::exit(1);
}

fn fail(msg: &str) -> ! {
    println!("{}", msg);
    std::process::exit(1);
}

fn open_input(path: &str) -> File {
    match File::open(path) {
        Ok(f) => f,
        Err(e) => fail(&format!("cannot open \"{}\": {}", path, e)),
    }
}

// memmap refuses zero length files, those map to None.
fn map_input(file: &File) -> Option<Mmap> {
    let len = match file.metadata() {
        Ok(m) => m.len(),
        Err(e) => fail(&format!("cannot stat input: {}", e)),
    };
    if len == 0 {
        return None;
    }
    match unsafe { Mmap::map(file) } {
        Ok(m) => Some(m),
        Err(e) => fail(&format!("failed to memory map the input file: {}", e)),
    }
}

fn safe_write(path: &str, buf: &[u8]) {
    let mut out_file = match std::fs::OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(f) => f,
        Err(e) => fail(&format!("cannot create \"{}\": {}", path, e)),
    };
    if let Err(e) = out_file.write_all(buf) {
        fail(&format!("outfile i/o error while writing {}", e));
    }
}

fn rounds_from_env() -> u32 {
    match std::env::var("BFCRYPT_ROUNDS") {
        Ok(v) => match v.parse::<u32>() {
            Ok(r) if r >= 1 => r,
            _ => fail(&format!("BFCRYPT_ROUNDS must be an integer >= 1, got \"{}\"", v)),
        },
        Err(_e) => DEFAULT_ROUNDS,
    }
}

// ----------------------------------------------------------------------------
fn report(name: &str, bytes: usize, start: Instant) {
    let secs = start.elapsed().as_secs_f64();
    println!("{:<22} {:>10.2} MB/s", name, bytes as f64 / secs / 1e6);
}

fn benchmark() {
    const SIZE: usize = 1 << 20;
    let mut rng = prng::new_fixed_hashrng(0xB10F);
    let mut data = vec![0u8; SIZE];
    rng.fill(&mut data);
    let mut out = vec![0u8; SIZE];
    let mut key = [0u8; 32];
    rng.fill(&mut key);
    let iv = [0u8; 16];

    let start = Instant::now();
    let bf = match new_blowfish(&key[..16]) {
        Ok(bf) => bf,
        Err(e) => fail(&format!("blowfish init failed: {}", e)),
    };
    let keying = start.elapsed();
    println!("{:<22} {:>10.3} ms", "blowfish key schedule", keying.as_secs_f64() * 1e3);

    let start = Instant::now();
    if bf.encrypt(&iv[..8], &data, &mut out).is_ok() {
        report("blowfish cbc encrypt", SIZE, start);
    }
    let start = Instant::now();
    if bf.decrypt(&iv[..8], &out, &mut data).is_ok() {
        report("blowfish cbc decrypt", SIZE, start);
    }

    for klen in [16, 32] {
        let rj = match rijndael::new_rijndael(&key[..klen]) {
            Ok(rj) => rj,
            Err(e) => fail(&format!("rijndael init failed: {}", e)),
        };
        let start = Instant::now();
        if modes::ecb_encrypt(&rj, &data, &mut out).is_ok() {
            report(&format!("rijndael-{} ecb", klen * 8), SIZE, start);
        }
        let start = Instant::now();
        if modes::cbc_decrypt(&rj, &iv, &out, &mut data).is_ok() {
            report(&format!("rijndael-{} cbc decrypt", klen * 8), SIZE, start);
        }
    }

    let start = Instant::now();
    let digest = sha256::sha256(&data);
    report("sha256", SIZE, start);
    println!("  digest {:02x?}", &digest[..8]);

    let mut dk = [0u8; 32];
    let start = Instant::now();
    if pbkdf2_hmac_sha256(b"password", b"salt", &mut dk, DEFAULT_ROUNDS).is_ok() {
        println!("{:<22} {:>10.3} ms ({} rounds)", "pbkdf2-hmac-sha256",
            start.elapsed().as_secs_f64() * 1e3, DEFAULT_ROUNDS);
    }
}

// ----------------------------------------------------------------------------
fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage_and_exit();
    }

    match args[1].as_str() {

        "encrypt" | "-e" => {
            if args.len() != 5 {
                println!("Usage: bfcrypt encrypt passphrase in_file out_file");
                std::process::exit(1);
            }
            let rounds = rounds_from_env();
            let in_file = open_input(&args[3]);
            let mmap = map_input(&in_file);
            let plain: &[u8] = match &mmap { Some(m) => &m[..], None => &[] };
            println!("encrypting \"{}\" to \"{}\" with {} pbkdf2 rounds", &args[3], &args[4], rounds);

            let mut rng = RandomSource{};
            let mut salt = [0u8; SALT_SIZE];
            rng.fill(&mut salt);
            let mut iv = [0u8; IV_SIZE];
            rng.fill(&mut iv);

            let pass = Zeroizing::new(args[2].clone().into_bytes());
            match seal(&pass, rounds, salt, iv, plain) {
                Ok(sealed) => {
                    safe_write(&args[4], &sealed);
                    println!("encrypted {} bytes", plain.len());
                    std::process::exit(0);
                },
                Err(e) => fail(&e),
            }
        },

        "decrypt" | "-d" => {
            if args.len() != 5 {
                println!("Usage: bfcrypt decrypt passphrase in_file out_file");
                std::process::exit(1);
            }
            let in_file = open_input(&args[3]);
            let mmap = map_input(&in_file);
            let data: &[u8] = match &mmap { Some(m) => &m[..], None => &[] };
            println!("decrypting \"{}\" to \"{}\"", &args[3], &args[4]);

            let pass = Zeroizing::new(args[2].clone().into_bytes());
            match open(&pass, data) {
                Ok(plain) => {
                    safe_write(&args[4], &plain);
                    println!("decrypted {} bytes", plain.len());
                    println!("validation succeeded");
                    std::process::exit(0);
                },
                Err(e) => fail(&e),
            }
        },

        "verify" | "-i" => {
            if args.len() != 3 {
                println!("Usage: bfcrypt verify in_file");
                std::process::exit(1);
            }
            let in_file = open_input(&args[2]);
            let mmap = map_input(&in_file);
            let data: &[u8] = match &mmap { Some(m) => &m[..], None => &[] };
            match Header::parse(data) {
                Ok(header) => {
                    println!("valid container: {} bytes of plaintext, {} pbkdf2 rounds",
                        header.plain_len, header.rounds);
                    std::process::exit(0);
                },
                Err(e) => fail(&format!("invalid container: {}", e)),
            }
        },

        "benchmark" | "-b" => {
            benchmark();
            std::process::exit(0);
        },

        _ => {
            println!("Bad command: {}", args[1]);
            print_usage_and_exit();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SALT: [u8; SALT_SIZE] = [9; SALT_SIZE];
    const IV: BlowfishBlock = [3; IV_SIZE];

    #[test]
    fn seal_then_open() {
        for len in [0usize, 1, 7, 8, 9, 100] {
            let plain: Vec<u8> = (0..len as u8).collect();
            let sealed = seal(b"hunter2", 2, SALT, IV, &plain).unwrap();
            assert_eq!(sealed.len() as u64, HEADER_SIZE as u64 + padded_len(len as u64).unwrap() + TAG_SIZE as u64);
            let header = Header::parse(&sealed).unwrap();
            assert_eq!(header.plain_len, len as u64);
            assert_eq!(header.rounds, 2);
            assert_eq!(open(b"hunter2", &sealed).unwrap()[..], plain[..]);
        }
    }

    #[test]
    fn open_rejects_tampering() {
        let sealed = seal(b"hunter2", 1, SALT, IV, b"attack at dawn").unwrap();
        assert!(open(b"hunter3", &sealed).is_err());

        let mut flipped = sealed.clone();
        flipped[HEADER_SIZE] ^= 1;
        assert_eq!(open(b"hunter2", &flipped).err(), Some("validation failed".to_string()));

        assert!(Header::parse(&sealed[..sealed.len() - 1]).is_err());
        let mut bad_magic = sealed.clone();
        bad_magic[0] = b'X';
        assert!(Header::parse(&bad_magic).is_err());
        let mut zero_rounds = sealed;
        zero_rounds[4..8].copy_from_slice(&0u32.to_le_bytes());
        assert!(Header::parse(&zero_rounds).is_err());
    }

    #[test]
    fn body_size_limits() {
        assert_eq!(body_size(0), Ok(0));
        assert_eq!(body_size(9), Ok(16));
        assert_eq!(body_size(u64::MAX), Err("input too large".to_string()));
        assert_eq!(body_size(u64::MAX - 7), Err("input too large".to_string()));
    }

    #[test]
    fn derived_keys_depend_on_salt() {
        let a = seal(b"pw", 1, [1; SALT_SIZE], IV, b"same text").unwrap();
        let b = seal(b"pw", 1, [2; SALT_SIZE], IV, b"same text").unwrap();
        assert_ne!(a[HEADER_SIZE..], b[HEADER_SIZE..]);
    }
}
