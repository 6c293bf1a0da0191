//! CUID v1 construction.
//!
//! Layout (25 chars, lowercase base36):
//!
//! ```text
//! c | timestamp (8) | counter (4) | fingerprint (4) | random (8)
//! ```
//!
//! The timestamp is milliseconds since the Unix epoch, the counter is a
//! process-wide sequence wrapping at 36^4, and the fingerprint is derived
//! from the process id and a digest of the host name.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::LazyLock;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::error::CorrelationError;

const BASE: u64 = 36;
const BLOCK_SIZE: usize = 4;
const TIMESTAMP_SIZE: usize = 8;
const DISCRETE_VALUES: u64 = BASE * BASE * BASE * BASE;
const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

static COUNTER: AtomicU64 = AtomicU64::new(0);
static FINGERPRINT: LazyLock<String> = LazyLock::new(fingerprint);

pub(super) fn generate<R: RngCore>(rng: &mut R) -> Result<String, CorrelationError> {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|_| CorrelationError::Clock)?
        .as_millis();
    let mut bytes = [0u8; 8];
    rng.try_fill_bytes(&mut bytes)?;
    let random = u64::from_be_bytes(bytes);
    Ok(assemble(
        u64::try_from(millis).unwrap_or(u64::MAX),
        random >> 32,
        random & 0xffff_ffff,
    ))
}

/// Same layout with caller-supplied randomness and a zero timestamp if the clock is unusable.
pub(super) fn degraded(seed: u64) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX));
    assemble(millis, seed >> 32, seed & 0xffff_ffff)
}

fn assemble(millis: u64, r1: u64, r2: u64) -> String {
    let count = COUNTER.fetch_add(1, Ordering::Relaxed) % DISCRETE_VALUES;

    let mut id = String::with_capacity(1 + TIMESTAMP_SIZE + 4 * BLOCK_SIZE);
    id.push('c');
    push_base36(&mut id, millis, TIMESTAMP_SIZE);
    push_base36(&mut id, count, BLOCK_SIZE);
    id.push_str(&FINGERPRINT);
    push_base36(&mut id, r1 % DISCRETE_VALUES, BLOCK_SIZE);
    push_base36(&mut id, r2 % DISCRETE_VALUES, BLOCK_SIZE);
    id
}

/// Append exactly `width` base36 digits: zero-padded, keeping the low-order digits.
fn push_base36(out: &mut String, mut value: u64, width: usize) {
    let mut buf = [b'0'; 13];
    let mut pos = buf.len();
    while value > 0 {
        pos -= 1;
        buf[pos] = DIGITS[(value % BASE) as usize];
        value /= BASE;
    }
    for &digit in &buf[buf.len() - width..] {
        out.push(char::from(digit));
    }
}

fn fingerprint() -> String {
    let host = std::env::var("HOSTNAME")
        .or_else(|_| std::env::var("COMPUTERNAME"))
        .unwrap_or_else(|_| "localhost".to_string());
    fingerprint_for(std::process::id(), &host)
}

/// Two base36 chars of the pid, then two of SHA-256(host).
fn fingerprint_for(pid: u32, host: &str) -> String {
    let digest = Sha256::digest(host.as_bytes());
    let host_block = u64::from(u16::from_be_bytes([digest[0], digest[1]]));

    let mut out = String::with_capacity(BLOCK_SIZE);
    push_base36(&mut out, u64::from(pid) % (BASE * BASE), 2);
    push_base36(&mut out, host_block % (BASE * BASE), 2);
    out
}
