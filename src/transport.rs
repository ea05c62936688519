//! Transport seam between the subscription manager and an MQTT client.
//!
//! A [`Transport`] only has to hand requests to the wire and report local
//! acceptance. Success means the request left this client, not that the
//! broker or the service processed it. Inbound messages are fed back through
//! a [`MessageDispatcher`](crate::connection::MessageDispatcher).

use async_trait::async_trait;
use bytes::Bytes;
use rumqttc::{AsyncClient, ClientError, QoS};
use thiserror::Error;

/// Local failure to hand a request to the transport
#[derive(Debug, Error)]
pub enum TransportError {
	/// The rumqttc client refused the request
	#[error("client operation failed: {0}")]
	Client(#[from] ClientError),

	/// The connection or subscription manager is gone
	#[error("connection closed before the request reached the transport")]
	ConnectionClosed,

	/// A transport-specific failure
	#[error("transport rejected the request: {reason}")]
	Rejected {
		/// Description supplied by the transport
		reason: String,
	},
}

impl TransportError {
	/// Creates a new Rejected error
	pub fn rejected(reason: impl Into<String>) -> Self {
		Self::Rejected {
			reason: reason.into(),
		}
	}
}

/// Fire-and-forget MQTT operations used by the subscription manager.
///
/// Calls are issued one at a time, in the order the client requested them.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
	/// Requests a subscription to `topic`.
	async fn subscribe(&self, topic: &str, qos: QoS) -> Result<(), TransportError>;

	/// Publishes `payload` to `topic`.
	async fn publish(
		&self,
		topic: &str,
		payload: Bytes,
		qos: QoS,
	) -> Result<(), TransportError>;

	/// Removes the subscription to `topic`.
	async fn unsubscribe(&self, topic: &str) -> Result<(), TransportError>;
}

#[async_trait]
impl Transport for AsyncClient {
	async fn subscribe(&self, topic: &str, qos: QoS) -> Result<(), TransportError> {
		AsyncClient::subscribe(self, topic, qos)
			.await
			.map_err(TransportError::from)
	}

	async fn publish(
		&self,
		topic: &str,
		payload: Bytes,
		qos: QoS,
	) -> Result<(), TransportError> {
		AsyncClient::publish_bytes(self, topic, qos, false, payload)
			.await
			.map_err(TransportError::from)
	}

	async fn unsubscribe(&self, topic: &str) -> Result<(), TransportError> {
		AsyncClient::unsubscribe(self, topic)
			.await
			.map_err(TransportError::from)
	}
}
