//! CATalist event bus and outbound notifications.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`DomainEvent`]: the event envelope published by API handlers.
//! - [`delivery`]: SMTP email delivery.
//! - [`Notifier`]: background consumer that turns events into emails.

pub mod bus;
pub mod delivery;
pub mod notifier;

pub use bus::{DomainEvent, EventBus};
pub use delivery::email::{EmailConfig, EmailDelivery, OutboundEmail};
pub use notifier::Notifier;
