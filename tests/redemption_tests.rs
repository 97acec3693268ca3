//! Redemption validator tests.
//!
//! The exactly-once property is the correctness-critical invariant of the
//! whole system: one physical ticket must never admit two people, however
//! many scanners race on it.

use std::sync::Arc;
use turnstile::mocks::MemoryTicketStore;
use turnstile::providers::store::{ConfirmClaim, TicketStore};
use turnstile::redemption::{RedemptionOutcome, RedemptionValidator, RejectReason};
use turnstile::token::TokenCodec;
use turnstile::types::{BuyerContact, NewOrder, TicketUnit};

fn buyer() -> BuyerContact {
    BuyerContact {
        name: "Asha".to_string(),
        mobile: "+919900112233".to_string(),
        email: "asha@example.com".to_string(),
    }
}

/// Seed an event, create an order for `count` seats and confirm it,
/// returning the committed units with their tokens.
async fn issued_units(store: &MemoryTicketStore, codec: &TokenCodec, count: i32) -> Vec<TicketUnit> {
    let event_id = store.seed_event("Test Event", 2500, 1);
    let order_id = store
        .create_order(NewOrder {
            event_id,
            buyer: buyer(),
            ticket_count: count,
            total_minor: 2500 * i64::from(count),
        })
        .await
        .unwrap();
    match store
        .confirm_and_create_units(order_id, "pay_test_0001", codec)
        .await
        .unwrap()
    {
        ConfirmClaim::Claimed { units, .. } => units,
        other => panic!("expected Claimed, got {other:?}"),
    }
}

fn validator(store: &MemoryTicketStore, codec: &Arc<TokenCodec>) -> RedemptionValidator {
    RedemptionValidator::new(Arc::new(store.clone()), codec.clone())
}

#[tokio::test]
async fn first_scan_allowed_second_already_used() {
    let store = MemoryTicketStore::new();
    let codec = Arc::new(TokenCodec::new("redeem-secret"));
    let units = issued_units(&store, &codec, 1).await;
    let validator = validator(&store, &codec);

    let first = validator.redeem(&units[0].token).await.unwrap();
    let RedemptionOutcome::Allowed {
        order_id,
        ticket_unit_id,
    } = first
    else {
        panic!("expected Allowed, got {first:?}");
    };
    assert_eq!(order_id, units[0].order_id);
    assert_eq!(ticket_unit_id, units[0].ticket_unit_id);

    let second = validator.redeem(&units[0].token).await.unwrap();
    assert_eq!(second, RedemptionOutcome::AlreadyUsed);

    // The transition is recorded and monotonic.
    let stored = store.find_unit(ticket_unit_id).await.unwrap().unwrap();
    assert!(stored.entered);
    assert!(stored.entered_at.is_some());
}

#[tokio::test]
async fn exactly_one_of_concurrent_scans_wins() {
    let store = MemoryTicketStore::new();
    let codec = Arc::new(TokenCodec::new("redeem-secret"));
    let units = issued_units(&store, &codec, 1).await;
    let validator = validator(&store, &codec);
    let token = &units[0].token;

    let (a, b, c, d, e, f, g, h) = tokio::join!(
        validator.redeem(token),
        validator.redeem(token),
        validator.redeem(token),
        validator.redeem(token),
        validator.redeem(token),
        validator.redeem(token),
        validator.redeem(token),
        validator.redeem(token),
    );

    let outcomes = [a, b, c, d, e, f, g, h].map(|r| r.unwrap());
    let allowed = outcomes
        .iter()
        .filter(|o| matches!(o, RedemptionOutcome::Allowed { .. }))
        .count();
    let already_used = outcomes
        .iter()
        .filter(|o| matches!(o, RedemptionOutcome::AlreadyUsed))
        .count();

    assert_eq!(allowed, 1, "exactly one concurrent scan must win");
    assert_eq!(already_used, outcomes.len() - 1);
}

#[tokio::test]
async fn tickets_in_one_order_redeem_independently() {
    let store = MemoryTicketStore::new();
    let codec = Arc::new(TokenCodec::new("redeem-secret"));
    let units = issued_units(&store, &codec, 3).await;
    let validator = validator(&store, &codec);

    for unit in &units {
        assert!(matches!(
            validator.redeem(&unit.token).await.unwrap(),
            RedemptionOutcome::Allowed { .. }
        ));
    }
    for unit in &units {
        assert_eq!(
            validator.redeem(&unit.token).await.unwrap(),
            RedemptionOutcome::AlreadyUsed
        );
    }
}

#[tokio::test]
async fn empty_and_whitespace_input_is_rejected() {
    let store = MemoryTicketStore::new();
    let codec = Arc::new(TokenCodec::new("redeem-secret"));
    let validator = validator(&store, &codec);

    assert_eq!(
        validator.redeem("").await.unwrap(),
        RedemptionOutcome::Rejected(RejectReason::EmptyToken)
    );
    assert_eq!(
        validator.redeem("   \t ").await.unwrap(),
        RedemptionOutcome::Rejected(RejectReason::EmptyToken)
    );
}

#[tokio::test]
async fn garbage_input_is_rejected_as_invalid() {
    let store = MemoryTicketStore::new();
    let codec = Arc::new(TokenCodec::new("redeem-secret"));
    let validator = validator(&store, &codec);

    assert_eq!(
        validator.redeem("not-base64!!").await.unwrap(),
        RedemptionOutcome::Rejected(RejectReason::InvalidToken)
    );
}

#[tokio::test]
async fn tampered_token_is_rejected_as_invalid() {
    let store = MemoryTicketStore::new();
    let codec = Arc::new(TokenCodec::new("redeem-secret"));
    let units = issued_units(&store, &codec, 1).await;
    let validator = validator(&store, &codec);

    let mut bytes = units[0].token.clone().into_bytes();
    let last = bytes.len() - 1;
    bytes[last] ^= 0x02;
    let tampered = String::from_utf8(bytes).unwrap();

    assert_eq!(
        validator.redeem(&tampered).await.unwrap(),
        RedemptionOutcome::Rejected(RejectReason::InvalidToken)
    );
    // The real token still works: tampering one copy burns nothing.
    assert!(matches!(
        validator.redeem(&units[0].token).await.unwrap(),
        RedemptionOutcome::Allowed { .. }
    ));
}

#[tokio::test]
async fn valid_token_for_unknown_unit_is_rejected() {
    let store = MemoryTicketStore::new();
    let codec = Arc::new(TokenCodec::new("redeem-secret"));
    let validator = validator(&store, &codec);

    // Authentic encoding, but no such ticket unit exists.
    let phantom = codec.mint(1, 999_999, 1_700_000_000).unwrap();
    assert_eq!(
        validator.redeem(&phantom).await.unwrap(),
        RedemptionOutcome::Rejected(RejectReason::UnknownTicket)
    );
}

#[tokio::test]
async fn store_failure_is_an_error_not_a_verdict() {
    let store = MemoryTicketStore::new();
    let codec = Arc::new(TokenCodec::new("redeem-secret"));
    let units = issued_units(&store, &codec, 1).await;
    let validator = validator(&store, &codec);

    store.fail_next("connection reset");
    assert!(validator.redeem(&units[0].token).await.is_err());

    // The ticket is untouched and redeemable once the store recovers.
    assert!(matches!(
        validator.redeem(&units[0].token).await.unwrap(),
        RedemptionOutcome::Allowed { .. }
    ));
}
