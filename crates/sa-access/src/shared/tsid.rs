//! TSID Generator
//!
//! Time-sorted identifiers rendered as 13-character Crockford Base32.
//! Layout: 42 bits of milliseconds, 10 random bits, 12 bits of counter.

use std::sync::atomic::{AtomicU16, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Crockford Base32 alphabet (excludes I, L, O, U)
const ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

const ENCODED_LEN: usize = 13;

static COUNTER: AtomicU16 = AtomicU16::new(0);

pub struct TsidGenerator;

impl TsidGenerator {
    /// Generate a new id, e.g. `"0HZXEQ5Y8JY5Z"`
    pub fn generate() -> String {
        let nanos = now_nanos();
        let millis = (nanos / 1_000_000) as u64;

        let counter = COUNTER.fetch_add(1, Ordering::SeqCst) as u64;
        let random = mix(nanos as u64, counter) & 0x3FF;

        let tsid = ((millis & 0x3FF_FFFF_FFFF) << 22) | (random << 12) | (counter & 0xFFF);
        encode(tsid)
    }

    /// Whether a string has the shape of a generated id
    pub fn is_valid(s: &str) -> bool {
        decode(s).is_some()
    }
}

fn now_nanos() -> u128 {
    // A clock before the epoch yields zero; ids stay unique through the counter.
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default()
}

fn mix(seed: u64, counter: u64) -> u64 {
    seed ^ counter.wrapping_mul(0x5851_F42D_4C95_7F2D)
}

fn encode(mut value: u64) -> String {
    let mut out = [b'0'; ENCODED_LEN];
    for slot in out.iter_mut().rev() {
        *slot = ALPHABET[(value & 0x1F) as usize];
        value >>= 5;
    }
    out.iter().map(|b| *b as char).collect()
}

fn decode(s: &str) -> Option<u64> {
    if s.len() != ENCODED_LEN {
        return None;
    }
    s.chars().try_fold(0u64, |acc, c| {
        let c = c.to_ascii_uppercase();
        let digit = ALPHABET.iter().position(|a| *a as char == c)? as u64;
        Some((acc << 5) | digit)
    })
}
