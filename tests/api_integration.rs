//! HTTP surface tests against the real router with mock collaborators.
//!
//! Exercises the endpoint contracts end to end: request shapes, status
//! codes, the redeem endpoint's tri-state body, and the property that
//! every rejected scan looks identical to the caller.

use axum::http::StatusCode;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::mpsc::Receiver;
use turnstile::confirmation::PaymentConfirmationGate;
use turnstile::issuance::IssuanceOrchestrator;
use turnstile::mocks::{MemoryTicketStore, MockArtifactRenderer, MockPaymentGateway};
use turnstile::notifications::{NotificationJob, NotificationQueue};
use turnstile::providers::store::TicketStore;
use turnstile::redemption::RedemptionValidator;
use turnstile::router::build_router;
use turnstile::state::AppState;
use turnstile::token::TokenCodec;
use turnstile::types::{EventId, OrderId};

struct TestApp {
    server: axum_test::TestServer,
    store: MemoryTicketStore,
    codec: Arc<TokenCodec>,
    event_id: EventId,
    jobs: Receiver<NotificationJob>,
}

fn test_app() -> TestApp {
    let store = MemoryTicketStore::new();
    let event_id = store.seed_event("Harbor Lights", 7500, 2);
    let codec = Arc::new(TokenCodec::new("api-secret"));
    let renderer = MockArtifactRenderer::new();
    let (queue, jobs) = NotificationQueue::new(16);

    let shared: Arc<dyn TicketStore> = Arc::new(store.clone());
    let gate = Arc::new(PaymentConfirmationGate::new(
        shared.clone(),
        codec.clone(),
        IssuanceOrchestrator::new(Arc::new(renderer)),
        queue.clone(),
    ));
    let validator = Arc::new(RedemptionValidator::new(shared.clone(), codec.clone()));
    let state = AppState::new(
        shared,
        Arc::new(MockPaymentGateway::new()),
        gate,
        validator,
        queue,
    );

    let router = build_router(state, &["http://localhost:3000".to_string()]);
    TestApp {
        server: axum_test::TestServer::new(router).unwrap(),
        store,
        codec,
        event_id,
        jobs,
    }
}

/// Create an order for `count` seats through the API, returning its id.
async fn create_order(app: &TestApp, count: i32) -> i64 {
    let response = app
        .server
        .post("/ticket/issue")
        .json(&json!({
            "event_id": app.event_id.get(),
            "name": "Meera",
            "mobile": "+918800112233",
            "email": "meera@example.com",
            "ticket_count": count,
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["order_id"].as_i64().unwrap()
}

#[tokio::test]
async fn health_reports_up() {
    let app = test_app();
    let response = app.server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "UP");
}

#[tokio::test]
async fn issue_creates_a_priced_order_with_gateway_checkout() {
    let app = test_app();
    let response = app
        .server
        .post("/ticket/issue")
        .json(&json!({
            "event_id": app.event_id.get(),
            "name": "Meera",
            "mobile": "+918800112233",
            "email": "meera@example.com",
            "ticket_count": 3,
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body = response.json::<Value>();
    assert_eq!(body["total_minor"], 3 * 7500);
    assert_eq!(body["gateway_order_id"], "order_mock_1");
    assert_eq!(body["currency"], "INR");
    assert_eq!(app.store.order_count(), 1);
    // Order creation alone issues no tickets.
    assert_eq!(app.store.unit_count(), 0);
}

#[tokio::test]
async fn issue_rejects_unknown_event_and_bad_counts() {
    let app = test_app();

    let unknown = app
        .server
        .post("/ticket/issue")
        .json(&json!({
            "event_id": 9999,
            "name": "M",
            "mobile": "+91",
            "email": "m@example.com",
            "ticket_count": 2,
        }))
        .await;
    unknown.assert_status(StatusCode::NOT_FOUND);

    // Below the seeded minimum of 2.
    let below_minimum = app
        .server
        .post("/ticket/issue")
        .json(&json!({
            "event_id": app.event_id.get(),
            "name": "M",
            "mobile": "+91",
            "email": "m@example.com",
            "ticket_count": 1,
        }))
        .await;
    below_minimum.assert_status(StatusCode::BAD_REQUEST);

    let zero = app
        .server
        .post("/ticket/issue")
        .json(&json!({
            "event_id": app.event_id.get(),
            "name": "M",
            "mobile": "+91",
            "email": "m@example.com",
            "ticket_count": 0,
        }))
        .await;
    zero.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn confirm_issues_once_then_reports_already_confirmed() {
    let app = test_app();
    let order_id = create_order(&app, 2).await;

    let first = app
        .server
        .post("/ticket/confirmPayment")
        .json(&json!({ "order_id": order_id, "payment_reference": "pay_api_1" }))
        .await;
    first.assert_status_ok();
    let body = first.json::<Value>();
    assert_eq!(body["status"], "issued");
    assert_eq!(body["ticket_count"], 2);
    assert_eq!(app.store.unit_count(), 2);

    let replay = app
        .server
        .post("/ticket/confirmPayment")
        .json(&json!({ "order_id": order_id, "payment_reference": "pay_api_2" }))
        .await;
    replay.assert_status_ok();
    assert_eq!(replay.json::<Value>()["status"], "already_confirmed");
    assert_eq!(app.store.unit_count(), 2);
}

#[tokio::test]
async fn confirm_unknown_order_is_404_and_bad_reference_is_400() {
    let app = test_app();

    let missing = app
        .server
        .post("/ticket/confirmPayment")
        .json(&json!({ "order_id": 777, "payment_reference": "pay_x" }))
        .await;
    missing.assert_status(StatusCode::NOT_FOUND);

    let order_id = create_order(&app, 2).await;
    let malformed = app
        .server
        .post("/ticket/confirmPayment")
        .json(&json!({ "order_id": order_id, "payment_reference": "tx_123" }))
        .await;
    malformed.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(app.store.unit_count(), 0);
}

#[tokio::test]
async fn redeem_walks_the_tri_state_contract() {
    let app = test_app();
    let order_id = create_order(&app, 2).await;
    app.server
        .post("/ticket/confirmPayment")
        .json(&json!({ "order_id": order_id, "payment_reference": "pay_scan" }))
        .await
        .assert_status_ok();

    let units = app
        .store
        .units_for_order(OrderId::new(order_id))
        .await
        .unwrap();

    let allowed = app
        .server
        .post("/ticket/redeem")
        .json(&json!({ "token": units[0].token }))
        .await;
    allowed.assert_status_ok();
    let body = allowed.json::<Value>();
    assert_eq!(body["status"], 0);
    assert_eq!(body["order_id"], order_id);
    assert_eq!(body["ticket_unit_id"], units[0].ticket_unit_id.get());

    let again = app
        .server
        .post("/ticket/redeem")
        .json(&json!({ "token": units[0].token }))
        .await;
    again.assert_status_ok();
    let body = again.json::<Value>();
    assert_eq!(body["status"], 1);
    assert!(body.get("order_id").is_none());
}

#[tokio::test]
async fn every_rejection_looks_identical_to_the_caller() {
    let app = test_app();
    // An authentic encoding pointing at a unit that does not exist.
    let phantom = app.codec.mint(1, 424_242, 1_700_000_000).unwrap();

    let mut bodies = Vec::new();
    for token in ["", "not-base64!!", phantom.as_str()] {
        let response = app
            .server
            .post("/ticket/redeem")
            .json(&json!({ "token": token }))
            .await;
        // Rejections are still HTTP 200; the verdict is in the body.
        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["status"], 2);
        assert!(body.get("order_id").is_none());
        bodies.push(body["message"].clone());
    }

    // Empty, garbage and unknown-ticket scans: one identical message.
    assert_eq!(bodies[0], bodies[1]);
    assert_eq!(bodies[1], bodies[2]);
}

#[tokio::test]
async fn enquiry_is_recorded_and_priced() {
    let mut app = test_app();
    let response = app
        .server
        .post("/ticket/enquiry")
        .json(&json!({
            "event_id": app.event_id.get(),
            "name": "Dev",
            "mobile": "+917700112233",
            "email": "dev@example.com",
            "ticket_count": 4,
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body = response.json::<Value>();
    assert_eq!(body["total_minor"], 4 * 7500);
    assert_eq!(app.store.enquiry_count(), 1);

    // The acknowledgement goes through the deferred queue.
    assert!(matches!(
        app.jobs.try_recv().unwrap(),
        NotificationJob::EnquiryReceived { .. }
    ));
}

#[tokio::test]
async fn quote_prices_against_the_base_rate() {
    let app = test_app();
    let response = app
        .server
        .get(&format!("/ticket/quote/{}", app.event_id.get()))
        .add_query_param("count", 5)
        .await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["total_minor"], 5 * 7500);
    assert_eq!(body["minimum_tickets"], 2);

    // No count: quoted at the rate's minimum.
    let default = app
        .server
        .get(&format!("/ticket/quote/{}", app.event_id.get()))
        .await;
    default.assert_status_ok();
    assert_eq!(default.json::<Value>()["ticket_count"], 2);

    let below = app
        .server
        .get(&format!("/ticket/quote/{}", app.event_id.get()))
        .add_query_param("count", 1)
        .await;
    below.assert_status(StatusCode::BAD_REQUEST);
}
