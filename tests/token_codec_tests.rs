//! Property tests for the entry token codec.
//!
//! - Round-trip: every non-negative triple survives mint → decode.
//! - Tamper evidence: flipping any single bit of the transport encoding
//!   yields a decode failure, never a silently different triple.

use proptest::prelude::*;
use turnstile::token::TokenCodec;

proptest! {
    #[test]
    fn round_trips_any_non_negative_triple(
        order in 0i64..=i64::MAX,
        unit in 0i64..=i64::MAX,
        issued_at in 0i64..=i64::MAX,
    ) {
        let codec = TokenCodec::new("property-secret");
        let token = codec.mint(order, unit, issued_at).unwrap();
        prop_assert_eq!(codec.decode(&token).unwrap(), (order, unit, issued_at));
    }

    #[test]
    fn any_single_bit_flip_fails_decode(
        order in 0i64..1_000_000_000,
        unit in 0i64..1_000_000_000,
        issued_at in 0i64..2_000_000_000,
        position in 0usize..120,
        bit in 0u32..7,
    ) {
        let codec = TokenCodec::new("property-secret");
        let token = codec.mint(order, unit, issued_at).unwrap();
        let mut bytes = token.into_bytes();
        prop_assume!(position < bytes.len());
        bytes[position] ^= 1 << bit;
        // Stays ASCII because only low bits are flipped.
        let altered = String::from_utf8(bytes).unwrap();
        prop_assert!(codec.decode(&altered).is_err());
    }
}

#[test]
fn every_byte_position_is_tamper_evident() {
    let codec = TokenCodec::new("exhaustive-secret");
    let token = codec.mint(42, 1007, 1_700_000_000).unwrap();

    for position in 0..token.len() {
        let mut bytes = token.clone().into_bytes();
        bytes[position] ^= 0x01;
        let altered = String::from_utf8(bytes).unwrap();
        assert!(
            codec.decode(&altered).is_err(),
            "flip at byte {position} was not detected"
        );
    }
}

#[test]
fn distinct_units_get_distinct_tokens() {
    let codec = TokenCodec::new("uniqueness-secret");
    let a = codec.mint(1, 1, 1_700_000_000).unwrap();
    let b = codec.mint(1, 2, 1_700_000_000).unwrap();
    assert_ne!(a, b);
    assert_ne!(codec.decode(&a).unwrap(), codec.decode(&b).unwrap());
}
