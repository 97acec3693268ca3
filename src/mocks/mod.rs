//! Mock provider implementations for testing.
//!
//! In-memory implementations of all provider traits. The memory store
//! honors the same consistency contract as the Postgres store (atomic
//! confirmation claim, conditional entry update), so the core's
//! correctness properties can be exercised at memory speed.

pub mod gateway;
pub mod notifier;
pub mod renderer;
pub mod store;

pub use gateway::MockPaymentGateway;
pub use notifier::MockNotifier;
pub use renderer::MockArtifactRenderer;
pub use store::MemoryTicketStore;
