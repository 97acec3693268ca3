//! PostgreSQL ticket store implementation.
//!
//! Queries are bound at runtime so the crate builds without a live
//! database. Two operations carry the system's consistency contract:
//!
//! - [`PostgresTicketStore::confirm_and_create_units`] runs the payment
//!   claim and the whole ticket-unit batch inside one transaction, with
//!   the order row locked (`FOR UPDATE`) so racing confirmations
//!   serialize and exactly one wins;
//! - [`PostgresTicketStore::mark_entered`] is a single conditional
//!   `UPDATE … WHERE entered = FALSE`, so two concurrent scans of one
//!   ticket cannot both observe the transition.

use crate::error::{Error, Result};
use crate::providers::store::{ConfirmClaim, TicketStore};
use crate::token::TokenMinter;
use crate::types::{
    BuyerContact, EnquiryId, Event, EventId, NewEnquiry, NewOrder, OrderId, PurchaseOrder,
    TicketRate, TicketUnit, TicketUnitId,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

/// PostgreSQL-backed [`TicketStore`].
#[derive(Clone)]
pub struct PostgresTicketStore {
    /// Connection pool.
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct EventRow {
    event_id: i64,
    name: String,
    venue: String,
    starts_at: DateTime<Utc>,
    currency: String,
}

#[derive(sqlx::FromRow)]
struct RateRow {
    rate_id: i64,
    event_id: i64,
    ticket_type: String,
    rate_minor: i64,
    minimum_tickets: i32,
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    order_id: i64,
    event_id: i64,
    name: String,
    mobile: String,
    email: String,
    ticket_count: i32,
    total_minor: i64,
    payment_reference: String,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct UnitRow {
    ticket_unit_id: i64,
    order_id: i64,
    seq: i32,
    token: String,
    entered: bool,
    entered_at: Option<DateTime<Utc>>,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Self {
            event_id: EventId::new(row.event_id),
            name: row.name,
            venue: row.venue,
            starts_at: row.starts_at,
            currency: row.currency,
        }
    }
}

impl From<RateRow> for TicketRate {
    fn from(row: RateRow) -> Self {
        Self {
            rate_id: row.rate_id,
            event_id: EventId::new(row.event_id),
            ticket_type: row.ticket_type,
            rate_minor: row.rate_minor,
            minimum_tickets: row.minimum_tickets,
        }
    }
}

impl From<OrderRow> for PurchaseOrder {
    fn from(row: OrderRow) -> Self {
        Self {
            order_id: OrderId::new(row.order_id),
            event_id: EventId::new(row.event_id),
            buyer: BuyerContact {
                name: row.name,
                mobile: row.mobile,
                email: row.email,
            },
            ticket_count: row.ticket_count,
            total_minor: row.total_minor,
            payment_reference: row.payment_reference,
            created_at: row.created_at,
        }
    }
}

impl From<UnitRow> for TicketUnit {
    fn from(row: UnitRow) -> Self {
        Self {
            ticket_unit_id: TicketUnitId::new(row.ticket_unit_id),
            order_id: OrderId::new(row.order_id),
            seq: row.seq,
            token: row.token,
            entered: row.entered,
            entered_at: row.entered_at,
        }
    }
}

impl PostgresTicketStore {
    /// Create a store over an existing connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run database migrations.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if migrations fail.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Store(format!("migration failed: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl TicketStore for PostgresTicketStore {
    async fn find_event(&self, event_id: EventId) -> Result<Option<Event>> {
        let row: Option<EventRow> = sqlx::query_as(
            "SELECT event_id, name, venue, starts_at, currency
             FROM events WHERE event_id = $1",
        )
        .bind(event_id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::Store(format!("failed to get event: {e}")))?;
        Ok(row.map(Event::from))
    }

    async fn find_rate(&self, event_id: EventId) -> Result<Option<TicketRate>> {
        let row: Option<RateRow> = sqlx::query_as(
            "SELECT rate_id, event_id, ticket_type, rate_minor, minimum_tickets
             FROM ticket_rates WHERE event_id = $1
             ORDER BY rate_id LIMIT 1",
        )
        .bind(event_id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::Store(format!("failed to get rate: {e}")))?;
        Ok(row.map(TicketRate::from))
    }

    async fn create_enquiry(&self, enquiry: NewEnquiry) -> Result<EnquiryId> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO enquiries (event_id, name, mobile, email, ticket_count, total_minor)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING enquiry_id",
        )
        .bind(enquiry.event_id.get())
        .bind(&enquiry.buyer.name)
        .bind(&enquiry.buyer.mobile)
        .bind(&enquiry.buyer.email)
        .bind(enquiry.ticket_count)
        .bind(enquiry.total_minor)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Error::Store(format!("failed to create enquiry: {e}")))?;
        Ok(EnquiryId::new(id))
    }

    async fn create_order(&self, order: NewOrder) -> Result<OrderId> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO purchase_orders (event_id, name, mobile, email, ticket_count, total_minor)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING order_id",
        )
        .bind(order.event_id.get())
        .bind(&order.buyer.name)
        .bind(&order.buyer.mobile)
        .bind(&order.buyer.email)
        .bind(order.ticket_count)
        .bind(order.total_minor)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Error::Store(format!("failed to create order: {e}")))?;
        Ok(OrderId::new(id))
    }

    async fn find_order(&self, order_id: OrderId) -> Result<Option<PurchaseOrder>> {
        let row: Option<OrderRow> = sqlx::query_as(
            "SELECT order_id, event_id, name, mobile, email, ticket_count, total_minor,
                    payment_reference, created_at
             FROM purchase_orders WHERE order_id = $1",
        )
        .bind(order_id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::Store(format!("failed to get order: {e}")))?;
        Ok(row.map(PurchaseOrder::from))
    }

    async fn confirm_and_create_units(
        &self,
        order_id: OrderId,
        payment_reference: &str,
        minter: &dyn TokenMinter,
    ) -> Result<ConfirmClaim> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| Error::Store(format!("failed to open transaction: {e}")))?;

        // Lock the order row so racing confirmations serialize here.
        let row: Option<OrderRow> = sqlx::query_as(
            "SELECT order_id, event_id, name, mobile, email, ticket_count, total_minor,
                    payment_reference, created_at
             FROM purchase_orders WHERE order_id = $1
             FOR UPDATE",
        )
        .bind(order_id.get())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| Error::Store(format!("failed to lock order: {e}")))?;

        let Some(row) = row else {
            return Ok(ConfirmClaim::NotFound);
        };
        if !row.payment_reference.is_empty() {
            return Ok(ConfirmClaim::AlreadyConfirmed);
        }

        let claimed = sqlx::query(
            "UPDATE purchase_orders SET payment_reference = $2
             WHERE order_id = $1 AND payment_reference = ''",
        )
        .bind(order_id.get())
        .bind(payment_reference)
        .execute(&mut *tx)
        .await
        .map_err(|e| Error::Store(format!("failed to claim confirmation: {e}")))?;
        if claimed.rows_affected() == 0 {
            return Ok(ConfirmClaim::AlreadyConfirmed);
        }

        let now = Utc::now();
        let mut units = Vec::with_capacity(usize::try_from(row.ticket_count).unwrap_or(0));
        for seq in 1..=row.ticket_count {
            let unit_id: i64 = sqlx::query_scalar(
                "INSERT INTO ticket_units (order_id, seq)
                 VALUES ($1, $2)
                 RETURNING ticket_unit_id",
            )
            .bind(order_id.get())
            .bind(seq)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| Error::Store(format!("failed to create ticket unit: {e}")))?;

            let token = minter
                .mint(order_id, TicketUnitId::new(unit_id), now.timestamp())
                .map_err(|e| Error::Store(format!("token mint failed: {e}")))?;

            sqlx::query("UPDATE ticket_units SET token = $2 WHERE ticket_unit_id = $1")
                .bind(unit_id)
                .bind(&token)
                .execute(&mut *tx)
                .await
                .map_err(|e| Error::Store(format!("failed to persist token: {e}")))?;

            units.push(TicketUnit {
                ticket_unit_id: TicketUnitId::new(unit_id),
                order_id,
                seq,
                token,
                entered: false,
                entered_at: None,
            });
        }

        tx.commit()
            .await
            .map_err(|e| Error::Store(format!("failed to commit confirmation: {e}")))?;

        let mut order = PurchaseOrder::from(row);
        order.payment_reference = payment_reference.to_string();
        Ok(ConfirmClaim::Claimed { order, units })
    }

    async fn find_unit(&self, ticket_unit_id: TicketUnitId) -> Result<Option<TicketUnit>> {
        let row: Option<UnitRow> = sqlx::query_as(
            "SELECT ticket_unit_id, order_id, seq, token, entered, entered_at
             FROM ticket_units WHERE ticket_unit_id = $1",
        )
        .bind(ticket_unit_id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::Store(format!("failed to get ticket unit: {e}")))?;
        Ok(row.map(TicketUnit::from))
    }

    async fn units_for_order(&self, order_id: OrderId) -> Result<Vec<TicketUnit>> {
        let rows: Vec<UnitRow> = sqlx::query_as(
            "SELECT ticket_unit_id, order_id, seq, token, entered, entered_at
             FROM ticket_units WHERE order_id = $1
             ORDER BY seq",
        )
        .bind(order_id.get())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::Store(format!("failed to list ticket units: {e}")))?;
        Ok(rows.into_iter().map(TicketUnit::from).collect())
    }

    async fn mark_entered(&self, ticket_unit_id: TicketUnitId, at: DateTime<Utc>) -> Result<bool> {
        let updated = sqlx::query(
            "UPDATE ticket_units SET entered = TRUE, entered_at = $2
             WHERE ticket_unit_id = $1 AND entered = FALSE",
        )
        .bind(ticket_unit_id.get())
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Store(format!("failed to mark entry: {e}")))?;
        Ok(updated.rows_affected() == 1)
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Error::Store(format!("ping failed: {e}")))?;
        Ok(())
    }
}
