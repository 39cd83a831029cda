//! Content hashing for stored results

use seahash::hash;

/// Compute a 64-bit hash of the given bytes
pub fn compute_hash(data: &[u8]) -> u64 {
    hash(data)
}

/// Hash rendered as 16 lowercase hex digits
pub fn content_id(data: &[u8]) -> String {
    format!("{:016x}", compute_hash(data))
}
