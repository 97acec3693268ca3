//! Entry token codec.
//!
//! Mints and decodes the opaque string embedded in a ticket's QR artifact.
//! The payload triple (order id, ticket unit id, issuance timestamp) is
//! rendered as ASCII, right-padded with spaces to a fixed block, encrypted
//! with AES-256-GCM under a process-wide key derived from the configured
//! secret, and transport-encoded as URL-safe base64 of
//! `nonce ‖ ciphertext ‖ tag`.
//!
//! The GCM tag is the integrity marker: a token that was not minted under
//! this process's key, or that was altered in transit, fails authentication
//! during decryption. Decode failures stay distinct internally (transport,
//! integrity, payload shape) for logging; callers at the API boundary
//! collapse all of them into one generic rejection.

use crate::types::{OrderId, TicketUnitId};
use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Fixed plaintext block size. `"{order}|{unit}|{ts}"` for three `i64`
/// fields is at most 59 bytes; the block is padded with spaces to this
/// length so every token has the same size on the wire.
const BLOCK_LEN: usize = 64;

/// AES-GCM nonce length (96 bits).
const NONCE_LEN: usize = 12;

/// AES-GCM authentication tag length.
const TAG_LEN: usize = 16;

/// Field separator inside the plaintext block.
const FIELD_SEPARATOR: char = '|';

/// Why a token could not be minted or decoded.
///
/// The three decode variants map to the internal failure modes the
/// redemption endpoint must keep distinct for logging while presenting a
/// single generic rejection externally.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// Transport decoding failed: the input is not valid base64, or is
    /// too short to carry a nonce and tag.
    #[error("malformed token: not a valid transport encoding")]
    Malformed,

    /// The integrity check embedded in the payload does not match the
    /// key-derived expectation: the token was altered or minted under a
    /// different key.
    #[error("tampered token: integrity check failed")]
    Tampered,

    /// Decryption succeeded structurally but the payload does not parse
    /// into the expected three-field shape.
    #[error("corrupt token: payload does not parse")]
    Corrupt,

    /// Mint-side failure: a field was negative or the rendered payload
    /// exceeds the fixed block.
    #[error("token fields are not encodable")]
    Unencodable,
}

/// Mints redemption tokens.
///
/// Object-safe seam so the store can mint inside its confirmation
/// transaction without depending on the concrete codec.
pub trait TokenMinter: Send + Sync {
    /// Mint the opaque token for one ticket unit.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Unencodable`] if any field is negative.
    fn mint(
        &self,
        order_id: OrderId,
        ticket_unit_id: TicketUnitId,
        issued_at: i64,
    ) -> Result<String, TokenError>;
}

/// Encodes and decodes entry tokens under a process-wide secret key.
///
/// Constructed once at startup from [`crate::config::TicketConfig`] and
/// shared by reference; components never read ambient environment state.
#[derive(Clone)]
pub struct TokenCodec {
    cipher: Aes256Gcm,
}

impl TokenCodec {
    /// Create a codec from the configured secret.
    ///
    /// The AES-256 key is the SHA-256 digest of the secret, so any secret
    /// string yields a full-strength key.
    #[must_use]
    pub fn new(secret: &str) -> Self {
        let digest = Sha256::digest(secret.as_bytes());
        let mut key = [0u8; 32];
        key.copy_from_slice(digest.as_slice());
        Self {
            cipher: Aes256Gcm::new(&key.into()),
        }
    }

    /// Encode and encrypt the `(order, unit, issued_at)` triple.
    ///
    /// Deterministic field encoding; the ciphertext differs per call only
    /// by the random nonce.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Unencodable`] if any field is negative or the
    /// rendered payload exceeds the fixed block (unreachable for `i64`).
    pub fn mint(
        &self,
        order_id: i64,
        ticket_unit_id: i64,
        issued_at: i64,
    ) -> Result<String, TokenError> {
        if order_id < 0 || ticket_unit_id < 0 || issued_at < 0 {
            return Err(TokenError::Unencodable);
        }

        let payload = format!("{order_id}{FIELD_SEPARATOR}{ticket_unit_id}{FIELD_SEPARATOR}{issued_at}");
        if payload.len() > BLOCK_LEN {
            return Err(TokenError::Unencodable);
        }

        let mut block = [b' '; BLOCK_LEN];
        block[..payload.len()].copy_from_slice(payload.as_bytes());

        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, block.as_slice())
            .map_err(|_| TokenError::Unencodable)?;

        let mut envelope = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        envelope.extend_from_slice(&nonce);
        envelope.extend_from_slice(&ciphertext);

        Ok(URL_SAFE_NO_PAD.encode(envelope))
    }

    /// Decrypt and parse a token back into its `(order, unit, issued_at)`
    /// triple.
    ///
    /// # Errors
    ///
    /// - [`TokenError::Malformed`] when transport decoding fails;
    /// - [`TokenError::Tampered`] when GCM authentication fails;
    /// - [`TokenError::Corrupt`] when the decrypted block does not strip
    ///   and parse into three non-negative integers.
    pub fn decode(&self, token: &str) -> Result<(i64, i64, i64), TokenError> {
        let envelope = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|_| TokenError::Malformed)?;
        if envelope.len() < NONCE_LEN + TAG_LEN {
            return Err(TokenError::Malformed);
        }

        let (nonce, ciphertext) = envelope.split_at(NONCE_LEN);
        let block = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| TokenError::Tampered)?;

        Self::parse_block(&block)
    }

    /// Strip the fixed padding and parse the three fields.
    fn parse_block(block: &[u8]) -> Result<(i64, i64, i64), TokenError> {
        if block.len() != BLOCK_LEN {
            return Err(TokenError::Corrupt);
        }
        let text = std::str::from_utf8(block).map_err(|_| TokenError::Corrupt)?;
        let payload = text.trim_end_matches(' ');

        let mut fields = payload.split(FIELD_SEPARATOR);
        let order_id = Self::parse_field(fields.next())?;
        let ticket_unit_id = Self::parse_field(fields.next())?;
        let issued_at = Self::parse_field(fields.next())?;
        if fields.next().is_some() {
            return Err(TokenError::Corrupt);
        }

        Ok((order_id, ticket_unit_id, issued_at))
    }

    fn parse_field(field: Option<&str>) -> Result<i64, TokenError> {
        let value: i64 = field
            .and_then(|f| f.parse().ok())
            .ok_or(TokenError::Corrupt)?;
        if value < 0 {
            return Err(TokenError::Corrupt);
        }
        Ok(value)
    }
}

impl TokenMinter for TokenCodec {
    fn mint(
        &self,
        order_id: OrderId,
        ticket_unit_id: TicketUnitId,
        issued_at: i64,
    ) -> Result<String, TokenError> {
        Self::mint(self, order_id.get(), ticket_unit_id.get(), issued_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::new("unit-test-secret")
    }

    #[test]
    fn round_trips_the_triple() {
        let codec = codec();
        let token = codec.mint(42, 1007, 1_700_000_000).unwrap();
        assert_eq!(codec.decode(&token).unwrap(), (42, 1007, 1_700_000_000));
    }

    #[test]
    fn tokens_are_fixed_size() {
        let codec = codec();
        let short = codec.mint(1, 2, 3).unwrap();
        let long = codec.mint(i64::MAX, i64::MAX, i64::MAX).unwrap();
        assert_eq!(short.len(), long.len());
    }

    #[test]
    fn rejects_negative_fields() {
        let codec = codec();
        assert_eq!(codec.mint(-1, 2, 3), Err(TokenError::Unencodable));
        assert_eq!(codec.mint(1, -2, 3), Err(TokenError::Unencodable));
        assert_eq!(codec.mint(1, 2, -3), Err(TokenError::Unencodable));
    }

    #[test]
    fn garbage_transport_is_malformed() {
        let codec = codec();
        assert_eq!(codec.decode("not-base64!!"), Err(TokenError::Malformed));
        assert_eq!(codec.decode(""), Err(TokenError::Malformed));
        // Valid base64 but far too short to carry nonce + tag.
        assert_eq!(codec.decode("AAAA"), Err(TokenError::Malformed));
    }

    #[test]
    fn flipped_byte_is_tampered() {
        let codec = codec();
        let token = codec.mint(42, 1007, 1_700_000_000).unwrap();
        let mut envelope = URL_SAFE_NO_PAD.decode(&token).unwrap();
        // Flip a byte in the ciphertext body, past the nonce.
        envelope[NONCE_LEN + 3] ^= 0x01;
        let altered = URL_SAFE_NO_PAD.encode(envelope);
        assert_eq!(codec.decode(&altered), Err(TokenError::Tampered));
    }

    #[test]
    fn foreign_key_is_tampered() {
        let token = codec().mint(1, 2, 3).unwrap();
        let other = TokenCodec::new("a-different-secret");
        assert_eq!(other.decode(&token), Err(TokenError::Tampered));
    }

    #[test]
    fn authentic_but_unparseable_payload_is_corrupt() {
        let codec = codec();
        // Encrypt a block that authenticates fine but has the wrong shape.
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let block = [b'x'; BLOCK_LEN];
        let ciphertext = codec.cipher.encrypt(&nonce, block.as_slice()).unwrap();
        let mut envelope = Vec::new();
        envelope.extend_from_slice(&nonce);
        envelope.extend_from_slice(&ciphertext);
        let token = URL_SAFE_NO_PAD.encode(envelope);
        assert_eq!(codec.decode(&token), Err(TokenError::Corrupt));
    }

    #[test]
    fn too_many_fields_is_corrupt() {
        let codec = codec();
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let mut block = [b' '; BLOCK_LEN];
        block[..7].copy_from_slice(b"1|2|3|4");
        let ciphertext = codec.cipher.encrypt(&nonce, block.as_slice()).unwrap();
        let mut envelope = Vec::new();
        envelope.extend_from_slice(&nonce);
        envelope.extend_from_slice(&ciphertext);
        let token = URL_SAFE_NO_PAD.encode(envelope);
        assert_eq!(codec.decode(&token), Err(TokenError::Corrupt));
    }
}
