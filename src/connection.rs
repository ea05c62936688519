//! Connection lifecycle management
//!
//! Separates starting and stopping the transport from the client handles
//! used to issue operations.

use bytes::Bytes;
use rumqttc::AsyncClient;
use tracing::{error, info, warn};

use crate::client::IotClientError;
use crate::routing::{
	SubscriptionError, SubscriptionManagerController,
	SubscriptionManagerHandler,
};

/// Entry point for inbound traffic from a transport.
///
/// The rumqttc event loop uses it internally. Custom [`Transport`]
/// implementations feed it from their own receive path.
///
/// [`Transport`]: crate::transport::Transport
#[derive(Clone, Debug)]
pub struct MessageDispatcher {
	manager: SubscriptionManagerHandler,
}

impl MessageDispatcher {
	pub(crate) fn new(manager: SubscriptionManagerHandler) -> Self {
		Self { manager }
	}

	/// Route a message received on `topic` to its handler.
	///
	/// Messages on one topic are delivered in the order they are dispatched.
	/// Messages for topics without a handler are dropped.
	pub fn dispatch(
		&self,
		topic: impl Into<String>,
		payload: impl Into<Bytes>,
	) -> Result<(), SubscriptionError> {
		self.manager
			.dispatch_incoming_message(topic.into(), payload.into())
	}

	/// Report that the transport (re)connected.
	///
	/// Without a preserved session every active topic is subscribed again.
	pub fn session_restored(
		&self,
		session_present: bool,
	) -> Result<(), SubscriptionError> {
		if session_present {
			info!("Session preserved, subscriptions maintained by broker");
			return Ok(());
		}
		info!("Session lost, resubscribing to all topics");
		self.manager.resubscribe_all()
	}
}

/// Owns the subscription manager for one transport.
///
/// Call [`TransportSession::shutdown`] before dropping it.
pub struct TransportSession {
	controller: Option<SubscriptionManagerController>,
	dispatcher: MessageDispatcher,
}

impl TransportSession {
	pub(crate) fn new(
		controller: SubscriptionManagerController,
		dispatcher: MessageDispatcher,
	) -> Self {
		Self {
			controller: Some(controller),
			dispatcher,
		}
	}

	/// Dispatcher for inbound messages of this session.
	pub fn dispatcher(&self) -> MessageDispatcher {
		self.dispatcher.clone()
	}

	/// Stop the subscription manager.
	///
	/// Active topics are unsubscribed and queued transport requests are
	/// flushed. Acknowledgements that never reach the transport resolve with
	/// `ConnectionClosed`.
	pub async fn shutdown(mut self) -> Result<(), IotClientError> {
		if let Some(controller) = self.controller.take() {
			if let Err(e) = controller.shutdown().await {
				warn!(error = %e, "Failed to shutdown subscription manager");
			}
		} else {
			warn!("No subscription manager controller available for shutdown");
		}
		Ok(())
	}
}

impl Drop for TransportSession {
	fn drop(&mut self) {
		if self.controller.is_some() {
			error!(
				"TransportSession dropped without calling shutdown(). Please \
				 call shutdown() and await its completion before dropping."
			);
		}
	}
}

/// MQTT connection handle for lifecycle management
///
/// This type manages the connection lifecycle and provides graceful shutdown.
/// It should be kept alive for the duration of the MQTT session.
pub struct MqttConnection {
	client: AsyncClient,
	session: Option<TransportSession>,
	event_loop_handle: Option<tokio::task::JoinHandle<()>>,
}

impl MqttConnection {
	pub(crate) fn new(
		client: AsyncClient,
		session: TransportSession,
		event_loop_handle: tokio::task::JoinHandle<()>,
	) -> Self {
		Self {
			client,
			session: Some(session),
			event_loop_handle: Some(event_loop_handle),
		}
	}

	/// Gracefully shutdown the MQTT connection by:
	/// 1. Shutting down subscription manager (unsubscribes all active topics)
	/// 2. Sending MQTT Disconnect packet (triggers event loop termination)
	/// 3. Waiting for event loop to finish processing
	pub async fn shutdown(mut self) -> Result<(), IotClientError> {
		if let Some(session) = self.session.take() {
			session.shutdown().await?;
		}

		if let Err(e) = self.client.disconnect().await {
			warn!(error = %e, "Failed to disconnect MQTT client");
		}

		if let Some(handle) = self.event_loop_handle.take() {
			if let Err(e) = handle.await {
				warn!(error = %e, "Event loop task failed");
			}
		} else {
			warn!("No event loop handle available to await");
		}

		Ok(())
	}
}

impl Drop for MqttConnection {
	fn drop(&mut self) {
		if self.event_loop_handle.is_some() {
			error!(
				"MqttConnection dropped without calling shutdown(). Please \
				 call shutdown() and await its completion before dropping."
			);
		}
	}
}
