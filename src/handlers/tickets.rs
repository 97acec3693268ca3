//! Ticket lifecycle endpoints.
//!
//! - `POST /ticket/issue` - create a priced purchase order (no
//!   confirmation, no ticket units yet)
//! - `POST /ticket/confirmPayment` - accept one confirmation per order
//! - `POST /ticket/redeem` - validate a scan, exactly once per ticket
//! - `POST /ticket/enquiry` - record a priced enquiry
//! - `GET /ticket/quote/:event_id` - price quote for an event

use super::error::ApiError;
use crate::confirmation::ConfirmationOutcome;
use crate::error::Error;
use crate::notifications::NotificationJob;
use crate::redemption::RedemptionOutcome;
use crate::state::AppState;
use crate::types::{BuyerContact, EventId, NewEnquiry, NewOrder, OrderId, TicketRate};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The one message every rejected scan gets, regardless of the internal
/// reason. Deliberate: no oracle for callers probing token validity.
pub const REJECTED_MESSAGE: &str = "Invalid ticket";

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request to create a purchase order.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateOrderRequest {
    /// Event to buy seats for.
    pub event_id: i64,
    /// Buyer display name.
    pub name: String,
    /// Buyer mobile number.
    pub mobile: String,
    /// Buyer email address.
    pub email: String,
    /// Requested seat count.
    pub ticket_count: i32,
}

/// Response after creating a purchase order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderResponse {
    /// Created order id, to be echoed in the confirmation call.
    pub order_id: i64,
    /// Gateway-side order id for the frontend checkout.
    pub gateway_order_id: String,
    /// Computed total in minor currency units.
    pub total_minor: i64,
    /// ISO currency code.
    pub currency: String,
}

/// Request to confirm an order's payment.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConfirmPaymentRequest {
    /// Order to confirm.
    pub order_id: i64,
    /// External payment reference reported by the gateway.
    pub payment_reference: String,
}

/// Response after a confirmation attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmPaymentResponse {
    /// `"issued"` or `"already_confirmed"`.
    pub status: String,
    /// Confirmed order id.
    pub order_id: i64,
    /// Number of tickets held by the order.
    pub ticket_count: i32,
    /// Human-readable summary.
    pub message: String,
}

/// Request carrying one scanned token.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScanRequest {
    /// Raw QR payload.
    pub token: String,
}

/// Tri-state scan response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResponse {
    /// `0` allowed, `1` already used, `2` rejected.
    pub status: u8,
    /// Operator-facing message.
    pub message: String,
    /// Present on allowed entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<i64>,
    /// Present on allowed entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_unit_id: Option<i64>,
}

/// Request to record an enquiry.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EnquiryRequest {
    /// Event the enquiry is about.
    pub event_id: i64,
    /// Enquirer display name.
    pub name: String,
    /// Enquirer mobile number.
    pub mobile: String,
    /// Enquirer email address.
    pub email: String,
    /// Requested seat count.
    pub ticket_count: i32,
}

/// Response after recording an enquiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnquiryResponse {
    /// Created enquiry id.
    pub enquiry_id: i64,
    /// Requested seat count.
    pub ticket_count: i32,
    /// Per-seat rate in minor currency units.
    pub rate_minor: i64,
    /// Quoted total in minor currency units.
    pub total_minor: i64,
    /// Confirmation message.
    pub message: String,
}

/// Query parameters for a price quote.
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteParams {
    /// Seat count to quote; defaults to the rate's minimum.
    pub count: Option<i32>,
}

/// Price quote for an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteResponse {
    /// Quoted event.
    pub event_id: i64,
    /// Event display name.
    pub event_name: String,
    /// Rate label.
    pub ticket_type: String,
    /// Per-seat rate in minor currency units.
    pub rate_minor: i64,
    /// Minimum seats per order.
    pub minimum_tickets: i32,
    /// Quoted seat count.
    pub ticket_count: i32,
    /// Quoted total in minor currency units.
    pub total_minor: i64,
    /// ISO currency code.
    pub currency: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// Price a seat count against an event's base rate, enforcing the
/// minimum-ticket rule.
async fn priced(
    state: &AppState,
    event_id: EventId,
    ticket_count: i32,
) -> Result<(crate::types::Event, TicketRate, i64), Error> {
    if ticket_count < 1 {
        return Err(Error::InvalidRequest("Invalid ticket count".to_string()));
    }

    let event = state
        .store
        .find_event(event_id)
        .await?
        .ok_or(Error::NotFound { what: "Event" })?;
    let rate = state
        .store
        .find_rate(event_id)
        .await?
        .ok_or(Error::NotFound {
            what: "Ticket rate",
        })?;

    if ticket_count < rate.minimum_tickets {
        return Err(Error::InvalidRequest(format!(
            "Minimum {} tickets required",
            rate.minimum_tickets
        )));
    }

    let total_minor = rate.rate_minor * i64::from(ticket_count);
    Ok((event, rate, total_minor))
}

/// Create a purchase order and its gateway-side checkout order.
///
/// The order starts with an empty payment reference; no ticket units
/// exist until the payment is confirmed.
pub async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<CreateOrderResponse>), ApiError> {
    let event_id = EventId::new(request.event_id);
    let (event, _rate, total_minor) = priced(&state, event_id, request.ticket_count).await?;

    let receipt = format!("TICKET_{}", request.mobile);
    let gateway_order = state
        .gateway
        .create_order(total_minor, &event.currency, &receipt)
        .await?;

    let order_id = state
        .store
        .create_order(NewOrder {
            event_id,
            buyer: BuyerContact {
                name: request.name,
                mobile: request.mobile,
                email: request.email,
            },
            ticket_count: request.ticket_count,
            total_minor,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateOrderResponse {
            order_id: order_id.get(),
            gateway_order_id: gateway_order.gateway_order_id,
            total_minor,
            currency: event.currency,
        }),
    ))
}

/// Accept one payment confirmation per order.
///
/// A replayed confirmation returns `already_confirmed` with 200: the
/// caller's payment is safe and nothing new was created.
pub async fn confirm_payment(
    State(state): State<AppState>,
    Json(request): Json<ConfirmPaymentRequest>,
) -> Result<(StatusCode, Json<ConfirmPaymentResponse>), ApiError> {
    let order_id = OrderId::new(request.order_id);
    match state.gate.confirm(order_id, &request.payment_reference).await? {
        ConfirmationOutcome::Issued { order, tickets } => Ok((
            StatusCode::OK,
            Json(ConfirmPaymentResponse {
                status: "issued".to_string(),
                order_id: order.order_id.get(),
                ticket_count: i32::try_from(tickets.len()).unwrap_or(order.ticket_count),
                message: "Payment confirmed and tickets issued".to_string(),
            }),
        )),
        ConfirmationOutcome::AlreadyConfirmed => Ok((
            StatusCode::OK,
            Json(ConfirmPaymentResponse {
                status: "already_confirmed".to_string(),
                order_id: request.order_id,
                ticket_count: 0,
                message: "Payment already processed".to_string(),
            }),
        )),
        ConfirmationOutcome::OrderNotFound => {
            Err(ApiError::not_found("Order", request.order_id))
        }
    }
}

/// Validate one scanned token.
///
/// Always 200 with a tri-state `status`; every rejection carries the same
/// generic message whatever the internal reason.
pub async fn redeem(
    State(state): State<AppState>,
    Json(request): Json<ScanRequest>,
) -> Result<Json<ScanResponse>, ApiError> {
    let response = match state.validator.redeem(&request.token).await? {
        RedemptionOutcome::Allowed {
            order_id,
            ticket_unit_id,
        } => ScanResponse {
            status: 0,
            message: "Entry allowed".to_string(),
            order_id: Some(order_id.get()),
            ticket_unit_id: Some(ticket_unit_id.get()),
        },
        RedemptionOutcome::AlreadyUsed => ScanResponse {
            status: 1,
            message: "Ticket already used".to_string(),
            order_id: None,
            ticket_unit_id: None,
        },
        RedemptionOutcome::Rejected(reason) => {
            debug!(?reason, "scan rejected");
            ScanResponse {
                status: 2,
                message: REJECTED_MESSAGE.to_string(),
                order_id: None,
                ticket_unit_id: None,
            }
        }
    };
    Ok(Json(response))
}

/// Record a priced enquiry and queue an acknowledgement.
pub async fn create_enquiry(
    State(state): State<AppState>,
    Json(request): Json<EnquiryRequest>,
) -> Result<(StatusCode, Json<EnquiryResponse>), ApiError> {
    let event_id = EventId::new(request.event_id);
    let (event, rate, total_minor) = priced(&state, event_id, request.ticket_count).await?;

    let buyer = BuyerContact {
        name: request.name,
        mobile: request.mobile,
        email: request.email,
    };
    let enquiry_id = state
        .store
        .create_enquiry(NewEnquiry {
            event_id,
            buyer: buyer.clone(),
            ticket_count: request.ticket_count,
            total_minor,
        })
        .await?;

    state.notifications.enqueue(NotificationJob::EnquiryReceived {
        buyer,
        event_name: event.name,
        ticket_count: request.ticket_count,
        total_minor,
        currency: event.currency,
    });

    Ok((
        StatusCode::CREATED,
        Json(EnquiryResponse {
            enquiry_id: enquiry_id.get(),
            ticket_count: request.ticket_count,
            rate_minor: rate.rate_minor,
            total_minor,
            message: "Ticket enquiry saved successfully".to_string(),
        }),
    ))
}

/// Quote a seat count against an event's base rate.
pub async fn quote(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
    Query(params): Query<QuoteParams>,
) -> Result<Json<QuoteResponse>, ApiError> {
    let event_id = EventId::new(event_id);
    let minimum = state
        .store
        .find_rate(event_id)
        .await?
        .map(|r| r.minimum_tickets);
    let count = params.count.or(minimum).unwrap_or(1);

    let (event, rate, total_minor) = priced(&state, event_id, count).await?;
    Ok(Json(QuoteResponse {
        event_id: event.event_id.get(),
        event_name: event.name,
        ticket_type: rate.ticket_type,
        rate_minor: rate.rate_minor,
        minimum_tickets: rate.minimum_tickets,
        ticket_count: count,
        total_minor,
        currency: event.currency,
    }))
}
