//! Per-subscription delivery tasks.
//!
//! Each route owns one task that feeds its inbound queue to the caller's
//! handler. Handlers therefore never run on the subscription manager task and
//! never under a lock, and messages on one topic keep transport order.

use arcstr::ArcStr;
use bytes::Bytes;
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::debug;

use super::subscription_manager::SubscriptionId;
use crate::transport::TransportError;

/// Item queued for a subscription's handler
#[derive(Debug)]
pub(crate) enum Inbound {
	/// Raw payload received on the route's topic
	Message(Bytes),
	/// Delivery for the route could not be re-established
	Failure(TransportError),
}

/// Type-erased handler invoked for every inbound item of one topic.
pub(crate) type DeliverySink = Box<dyn FnMut(&ArcStr, Inbound) + Send + 'static>;

/// Spawns the delivery task for a route and returns its queue.
///
/// The task ends once the returned sender is dropped and the queue drained,
/// so messages accepted before an unsubscribe or handler replacement are
/// still delivered.
pub(crate) fn spawn_delivery(
	topic: ArcStr,
	id: SubscriptionId,
	mut sink: DeliverySink,
) -> UnboundedSender<Inbound> {
	let (sender, mut receiver) = mpsc::unbounded_channel();
	tokio::spawn(async move {
		while let Some(inbound) = receiver.recv().await {
			sink(&topic, inbound);
		}
		debug!(topic = %topic, subscription_id = %id, "Delivery task finished");
	});
	sender
}
