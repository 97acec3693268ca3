//! In-memory ticket store for testing.

use crate::error::{Error, Result};
use crate::providers::store::{ConfirmClaim, TicketStore};
use crate::token::TokenMinter;
use crate::types::{
    BuyerContact, EnquiryId, Event, EventId, NewEnquiry, NewOrder, OrderId, PurchaseOrder,
    TicketRate, TicketUnit, TicketUnitId,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Default)]
struct Inner {
    events: HashMap<i64, Event>,
    rates: HashMap<i64, TicketRate>,
    enquiries: BTreeMap<i64, NewEnquiry>,
    orders: BTreeMap<i64, PurchaseOrder>,
    units: BTreeMap<i64, TicketUnit>,
    next_event: i64,
    next_enquiry: i64,
    next_order: i64,
    next_unit: i64,
    fail_next: Option<String>,
}

/// In-memory [`TicketStore`].
///
/// All state lives behind one mutex, so the confirmation claim and the
/// conditional entry update are atomic exactly as the contract requires.
/// `fail_next` lets a test inject one store failure.
#[derive(Clone, Default)]
pub struct MemoryTicketStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryTicketStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| Error::Store("mutex poisoned".to_string()))
    }

    fn take_failure(inner: &mut Inner) -> Result<()> {
        match inner.fail_next.take() {
            Some(reason) => Err(Error::Store(reason)),
            None => Ok(()),
        }
    }

    /// Make the next store call fail with [`Error::Store`].
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned (test-only helper).
    #[allow(clippy::unwrap_used)]
    pub fn fail_next(&self, reason: &str) {
        self.inner.lock().unwrap().fail_next = Some(reason.to_string());
    }

    /// Seed one event with one base rate, returning the event id.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned (test-only helper).
    #[allow(clippy::unwrap_used)]
    pub fn seed_event(&self, name: &str, rate_minor: i64, minimum_tickets: i32) -> EventId {
        let mut inner = self.inner.lock().unwrap();
        inner.next_event += 1;
        let event_id = EventId::new(inner.next_event);
        inner.events.insert(
            event_id.get(),
            Event {
                event_id,
                name: name.to_string(),
                venue: "Test Hall".to_string(),
                starts_at: Utc::now(),
                currency: "INR".to_string(),
            },
        );
        inner.rates.insert(
            event_id.get(),
            TicketRate {
                rate_id: event_id.get(),
                event_id,
                ticket_type: "General".to_string(),
                rate_minor,
                minimum_tickets,
            },
        );
        event_id
    }

    /// Number of stored purchase orders.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned (test-only helper).
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn order_count(&self) -> usize {
        self.inner.lock().unwrap().orders.len()
    }

    /// Number of stored ticket units.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned (test-only helper).
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn unit_count(&self) -> usize {
        self.inner.lock().unwrap().units.len()
    }

    /// Number of stored enquiries.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned (test-only helper).
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn enquiry_count(&self) -> usize {
        self.inner.lock().unwrap().enquiries.len()
    }
}

#[async_trait]
impl TicketStore for MemoryTicketStore {
    async fn find_event(&self, event_id: EventId) -> Result<Option<Event>> {
        let mut inner = self.lock()?;
        Self::take_failure(&mut inner)?;
        Ok(inner.events.get(&event_id.get()).cloned())
    }

    async fn find_rate(&self, event_id: EventId) -> Result<Option<TicketRate>> {
        let mut inner = self.lock()?;
        Self::take_failure(&mut inner)?;
        Ok(inner.rates.get(&event_id.get()).cloned())
    }

    async fn create_enquiry(&self, enquiry: NewEnquiry) -> Result<EnquiryId> {
        let mut inner = self.lock()?;
        Self::take_failure(&mut inner)?;
        inner.next_enquiry += 1;
        let id = inner.next_enquiry;
        inner.enquiries.insert(id, enquiry);
        Ok(EnquiryId::new(id))
    }

    async fn create_order(&self, order: NewOrder) -> Result<OrderId> {
        let mut inner = self.lock()?;
        Self::take_failure(&mut inner)?;
        inner.next_order += 1;
        let order_id = OrderId::new(inner.next_order);
        inner.orders.insert(
            order_id.get(),
            PurchaseOrder {
                order_id,
                event_id: order.event_id,
                buyer: order.buyer,
                ticket_count: order.ticket_count,
                total_minor: order.total_minor,
                payment_reference: String::new(),
                created_at: Utc::now(),
            },
        );
        Ok(order_id)
    }

    async fn find_order(&self, order_id: OrderId) -> Result<Option<PurchaseOrder>> {
        let mut inner = self.lock()?;
        Self::take_failure(&mut inner)?;
        Ok(inner.orders.get(&order_id.get()).cloned())
    }

    async fn confirm_and_create_units(
        &self,
        order_id: OrderId,
        payment_reference: &str,
        minter: &dyn TokenMinter,
    ) -> Result<ConfirmClaim> {
        // One lock for the whole claim + batch: atomic like the Postgres
        // transaction.
        let mut inner = self.lock()?;
        Self::take_failure(&mut inner)?;

        let Some(order) = inner.orders.get(&order_id.get()).cloned() else {
            return Ok(ConfirmClaim::NotFound);
        };
        if !order.payment_reference.is_empty() {
            return Ok(ConfirmClaim::AlreadyConfirmed);
        }

        // Stage the batch; nothing is visible until every mint succeeds.
        let now = Utc::now();
        let mut units = Vec::with_capacity(usize::try_from(order.ticket_count).unwrap_or(0));
        for seq in 1..=order.ticket_count {
            let unit_id = TicketUnitId::new(inner.next_unit + i64::from(seq));
            let token = minter
                .mint(order_id, unit_id, now.timestamp())
                .map_err(|e| Error::Store(format!("token mint failed: {e}")))?;
            units.push(TicketUnit {
                ticket_unit_id: unit_id,
                order_id,
                seq,
                token,
                entered: false,
                entered_at: None,
            });
        }

        inner.next_unit += i64::from(order.ticket_count);
        for unit in &units {
            inner.units.insert(unit.ticket_unit_id.get(), unit.clone());
        }
        let mut order = order;
        order.payment_reference = payment_reference.to_string();
        inner.orders.insert(order_id.get(), order.clone());

        Ok(ConfirmClaim::Claimed { order, units })
    }

    async fn find_unit(&self, ticket_unit_id: TicketUnitId) -> Result<Option<TicketUnit>> {
        let mut inner = self.lock()?;
        Self::take_failure(&mut inner)?;
        Ok(inner.units.get(&ticket_unit_id.get()).cloned())
    }

    async fn units_for_order(&self, order_id: OrderId) -> Result<Vec<TicketUnit>> {
        let mut inner = self.lock()?;
        Self::take_failure(&mut inner)?;
        let mut units: Vec<TicketUnit> = inner
            .units
            .values()
            .filter(|u| u.order_id == order_id)
            .cloned()
            .collect();
        units.sort_by_key(|u| u.seq);
        Ok(units)
    }

    async fn mark_entered(&self, ticket_unit_id: TicketUnitId, at: DateTime<Utc>) -> Result<bool> {
        let mut inner = self.lock()?;
        Self::take_failure(&mut inner)?;
        match inner.units.get_mut(&ticket_unit_id.get()) {
            Some(unit) if !unit.entered => {
                unit.entered = true;
                unit.entered_at = Some(at);
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Ok(false),
        }
    }

    async fn ping(&self) -> Result<()> {
        let mut inner = self.lock()?;
        Self::take_failure(&mut inner)?;
        Ok(())
    }
}
