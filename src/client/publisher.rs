use arcstr::ArcStr;
use bytes::Bytes;
use rumqttc::QoS;
use tracing::debug;

use super::error::IotClientError;
use crate::codec::MessageSerializer;
use crate::routing::{PendingAck, SubscriptionManagerHandler};
use crate::topic::validation;

/// Encodes typed values and hands them to the transport.
///
/// Each call encodes once and publishes once; nothing is retried. The
/// returned [`PendingAck`] resolves when the transport has accepted the
/// message locally, which says nothing about how the service answers.
#[derive(Clone, Debug)]
pub struct Publisher<F> {
	manager: SubscriptionManagerHandler,
	serializer: F,
}

impl<F> Publisher<F> {
	pub(crate) fn new(manager: SubscriptionManagerHandler, serializer: F) -> Self {
		Self {
			manager,
			serializer,
		}
	}

	/// Encode `data` and publish it to `topic`.
	///
	/// `topic` must be concrete; wildcards are rejected.
	pub fn publish<T>(
		&self,
		topic: impl Into<ArcStr>,
		data: &T,
		qos: QoS,
	) -> Result<PendingAck, IotClientError>
	where
		F: MessageSerializer<T>,
	{
		let topic = topic.into();
		validation::validate_topic(&topic)?;
		let payload = self
			.serializer
			.serialize(data)
			.map_err(|e| IotClientError::Serialization(e.to_string()))?;
		debug!(topic = %topic, payload_size = payload.len(), "Publishing message");
		Ok(self.manager.publish(topic, Bytes::from(payload), qos)?)
	}
}
