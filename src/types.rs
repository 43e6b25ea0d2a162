//! Core identifier types for the Keel object model.

/// Content digest: 32-byte blake3 hash of an object's bytes.
///
/// Used as the storage key for both blobs and commits. The hex form is
/// what users see (`log`, `checkout <id> -- <path>`, ...).
pub type Digest = [u8; 32];

/// Render a digest as lowercase hex.
pub fn to_hex(digest: &Digest) -> String {
    hex::encode(digest)
}

/// Abbreviated hex form used in merge lines and status output.
pub fn short_hex(digest: &Digest) -> String {
    hex::encode(digest)[..7].to_string()
}

/// Parse a full 64-character hex digest.
///
/// Returns `None` for anything that is not exactly 32 bytes of hex.
pub fn from_hex(s: &str) -> Option<Digest> {
    let bytes = hex::decode(s).ok()?;
    bytes.try_into().ok()
}
