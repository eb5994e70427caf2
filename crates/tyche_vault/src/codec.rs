//! # Stored-State Codec
//!
//! Reversible keyed transform between a plaintext payload and the opaque
//! string written to storage.
//!
//! ## What this is NOT
//!
//! Not encryption. Each plaintext byte is XORed against a repeating
//! keystream whose key ships inside this binary, and the result is
//! base64-framed so it survives any string-valued store. Anyone with the
//! source can reverse it; the point is to deter casual save editing, not
//! adversarial forgery. Authenticity is layered on separately by
//! [`crate::checksum`], and real authority lives server-side.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::error::{VaultError, VaultResult};

/// Fixed shared secret the keystream repeats over.
///
/// Rotating this key invalidates every existing save (decode still
/// succeeds structurally but the checksum layer rejects the garbage
/// plaintext), which is an accepted cost of a client rebuild.
const KEYSTREAM: &[u8] = b"TYCHE_CLIENT_STATE_K1_9f2c47d1";

/// XORs `bytes` in place against the repeating keystream.
///
/// Involution: applying it twice returns the original bytes.
fn xor_keystream(bytes: &mut [u8]) {
    for (byte, key) in bytes.iter_mut().zip(KEYSTREAM.iter().cycle()) {
        *byte ^= key;
    }
}

/// Encodes a plaintext payload into the opaque stored form.
#[must_use]
pub fn encode(plaintext: &str) -> String {
    let mut bytes = plaintext.as_bytes().to_vec();
    xor_keystream(&mut bytes);
    STANDARD.encode(bytes)
}

/// Decodes an opaque stored string back to the plaintext payload.
///
/// # Errors
///
/// Returns [`VaultError::Decode`] when the input is not valid base64 or
/// the unmasked bytes are not UTF-8. Never returns garbage silently.
pub fn decode(opaque: &str) -> VaultResult<String> {
    let mut bytes = STANDARD
        .decode(opaque)
        .map_err(|e| VaultError::Decode(format!("invalid base64 framing: {e}")))?;
    xor_keystream(&mut bytes);
    String::from_utf8(bytes)
        .map_err(|e| VaultError::Decode(format!("unmasked bytes are not utf-8: {e}")))
}
