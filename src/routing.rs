//! Message routing and subscription management module
//!
//! Keeps one route per exact topic, forwards inbound messages to the
//! handler registered for it and tracks transport acknowledgements.

/// One-shot transport acknowledgements
pub mod ack;
pub(crate) mod delivery;
/// Routing and delivery error types
pub mod error;
pub(crate) mod subscription_manager;


pub use ack::{AckCompleter, AckResult, PendingAck, pending_ack};
pub use error::{MessageError, SubscriptionError};
pub use subscription_manager::SubscriptionId;

pub(crate) use delivery::{DeliverySink, Inbound};
pub(crate) use subscription_manager::{
	SubscriptionManagerActor, SubscriptionManagerController,
	SubscriptionManagerHandler,
};
