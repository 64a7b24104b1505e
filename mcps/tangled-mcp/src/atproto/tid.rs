//! Timestamp identifiers used as record keys
//!
//! A TID is 13 characters of sortable base32 over a 64-bit integer: the top
//! bit is zero, then 53 bits of microseconds since the Unix epoch, then a
//! 10-bit clock id. Keys sort lexicographically in creation order.

use std::sync::atomic::{AtomicU64, Ordering};

const ALPHABET: &[u8; 32] = b"234567abcdefghijklmnopqrstuvwxyz";
const TID_LEN: usize = 13;

static LAST_MICROS: AtomicU64 = AtomicU64::new(0);

/// Mint a new record key. Strictly increasing within the process.
pub fn next_tid() -> String {
    let now = chrono::Utc::now().timestamp_micros().max(0) as u64;
    let mut last = LAST_MICROS.load(Ordering::Relaxed);
    let micros = loop {
        let candidate = now.max(last + 1);
        match LAST_MICROS.compare_exchange_weak(
            last,
            candidate,
            Ordering::SeqCst,
            Ordering::Relaxed,
        ) {
            Ok(_) => break candidate,
            Err(actual) => last = actual,
        }
    };
    encode(micros, clock_id())
}

fn clock_id() -> u64 {
    u64::from(std::process::id()) & 0x3ff
}

fn encode(micros: u64, clock_id: u64) -> String {
    let mut value = ((micros & ((1 << 53) - 1)) << 10) | (clock_id & 0x3ff);
    let mut out = [0u8; TID_LEN];
    for slot in out.iter_mut().rev() {
        *slot = ALPHABET[(value & 31) as usize];
        value >>= 5;
    }
    out.iter().map(|&b| b as char).collect()
}
