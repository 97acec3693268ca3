//! External collaborators of the ticketing core.
//!
//! This module defines traits for everything the core coordinates but does
//! not own: the relational store, the payment gateway, the artifact
//! rendering service, and the notification channels. The traits enable
//! dependency injection and make the issuance/redemption logic testable.
//!
//! Production implementations live next to their traits; in-memory test
//! doubles live in [`crate::mocks`].

pub mod gateway;
pub mod notifier;
pub mod renderer;
pub mod store;

pub mod http_renderer;
pub mod razorpay;
pub mod smtp_notifier;
pub mod whatsapp_notifier;

pub use gateway::{GatewayOrder, PaymentGateway};
pub use http_renderer::HttpArtifactRenderer;
pub use notifier::Notifier;
pub use razorpay::RazorpayGateway;
pub use renderer::{ArtifactHandle, ArtifactRenderer, RenderRequest};
pub use smtp_notifier::SmtpNotifier;
pub use store::{ConfirmClaim, TicketStore};
pub use whatsapp_notifier::WhatsappNotifier;
