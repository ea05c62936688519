use std::sync::Arc;
use std::time::Duration;

use rumqttc::Packet::{self, Disconnect, Publish, SubAck};
use rumqttc::{AsyncClient, ConnAck, ConnectReturnCode, EventLoop};
use rumqttc::{Event::Incoming, Event::Outgoing, SubscribeReasonCode};
use tokio::time;
use tracing::{debug, error, info, warn};

use super::config::IotClientConfig;
use super::error::{ConnectionEstablishmentError, IotClientError};
use super::operation::OperationClient;
use crate::codec::JsonSerializer;
use crate::connection::{MessageDispatcher, MqttConnection, TransportSession};
use crate::jobs::IotJobsClient;
use crate::routing::{SubscriptionManagerActor, SubscriptionManagerHandler};
use crate::shadow::IotShadowClient;
use crate::transport::Transport;

const INITIAL_RETRY_DELAY: Duration = Duration::from_millis(100);
const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Shared context for every service client on one connection.
///
/// Holds no per-call state. Clone it freely; all clones talk to the same
/// subscription manager. Connection lifecycle is managed separately via
/// [`MqttConnection`] or [`TransportSession`].
#[derive(Clone, Debug)]
pub struct IotClient {
	manager: SubscriptionManagerHandler,
}

impl IotClient {
	/// Connect with default settings.
	///
	/// Returns both client and connection handle. Keep the connection alive
	/// for the session duration, call `connection.shutdown()` when done.
	pub async fn connect(
		url: &str,
	) -> Result<(Self, MqttConnection), IotClientError> {
		let config = IotClientConfig::from_url(url)?;
		Self::connect_with_config(config).await
	}

	/// Connect with custom configuration.
	pub async fn connect_with_config(
		config: IotClientConfig,
	) -> Result<(Self, MqttConnection), IotClientError> {
		config.settings.validate()?;
		let (client, new_event_loop) = AsyncClient::new(
			config.connection,
			config.settings.event_loop_capacity,
		);

		let timeout_millis = config.settings.connection_timeout_millis;
		let connection_timeout = Duration::from_millis(timeout_millis);
		let connected_event_loop = tokio::time::timeout(
			connection_timeout,
			Self::establish_connection(new_event_loop),
		)
		.await
		.map_err(|_| ConnectionEstablishmentError::Timeout { timeout_millis })??;

		let (fresh_client, session) =
			Self::with_transport(Arc::new(client.clone()));

		// The event loop terminates when it sees a Disconnect packet
		let dispatcher = session.dispatcher();
		let max_errors = config.settings.max_consecutive_errors;
		let event_loop_handle = tokio::spawn(async move {
			Self::run(connected_event_loop, dispatcher, max_errors).await;
		});
		let connection = MqttConnection::new(client, session, event_loop_handle);
		Ok((fresh_client, connection))
	}

	/// Build a client over any [`Transport`].
	///
	/// Inbound messages must be fed through the session's
	/// [`MessageDispatcher`](TransportSession::dispatcher).
	pub fn with_transport(
		transport: Arc<dyn Transport>,
	) -> (Self, TransportSession) {
		let (controller, handler) = SubscriptionManagerActor::spawn(transport);
		let dispatcher = MessageDispatcher::new(handler.clone());
		let session = TransportSession::new(controller, dispatcher);
		(Self { manager: handler }, session)
	}

	async fn establish_connection(
		mut event_loop: EventLoop,
	) -> Result<EventLoop, ConnectionEstablishmentError> {
		loop {
			match event_loop.poll().await {
				| Ok(Incoming(Packet::ConnAck(ConnAck { code, .. }))) => {
					if code == ConnectReturnCode::Success {
						debug!("MQTT connection established successfully");
						return Ok(event_loop);
					}
					debug!(code = ?code, "MQTT connection rejected by broker");
					return Err(ConnectionEstablishmentError::BrokerRejected {
						code,
					});
				}
				| Ok(notification) => {
					debug!(notification = ?notification, "Bootstrap phase notification");
				}
				| Err(connection_err) => {
					debug!(error = %connection_err, "MQTT connection error during bootstrap phase");
					return Err(ConnectionEstablishmentError::Network(
						connection_err,
					));
				}
			}
		}
	}

	/// Processes MQTT events until a Disconnect packet is seen in either
	/// direction or too many consecutive errors occur.
	async fn run(
		mut event_loop: EventLoop,
		dispatcher: MessageDispatcher,
		max_consecutive_errors: u32,
	) {
		let mut error_count: u32 = 0;

		loop {
			match event_loop.poll().await {
				| Ok(Incoming(Packet::ConnAck(ConnAck {
					session_present,
					code: ConnectReturnCode::Success,
				}))) => {
					error_count = 0;
					let _ = dispatcher
						.session_restored(session_present)
						.inspect_err(|err| {
							error!(error = ?err, "Failed to resubscribe to topics");
						});
				}
				| Ok(Incoming(Publish(p))) => {
					error_count = 0;
					debug!(topic = %p.topic, payload_size = p.payload.len(), "Received MQTT message");
					if let Err(err) = dispatcher.dispatch(p.topic, p.payload) {
						error!(error = ?err, "Failed to send data to subscription manager");
					}
				}
				| Ok(Incoming(SubAck(ack))) => {
					error_count = 0;
					let refused = ack
						.return_codes
						.iter()
						.filter(|code| matches!(code, SubscribeReasonCode::Failure))
						.count();
					if refused > 0 {
						warn!(pkid = ack.pkid, refused, "Broker refused subscription");
					} else {
						debug!(pkid = ack.pkid, "Subscription acknowledged by broker");
					}
				}
				| Ok(Incoming(Disconnect)) => {
					info!("Received MQTT Disconnect packet from server");
					break;
				}
				| Ok(Outgoing(rumqttc::Outgoing::Disconnect)) => {
					info!("Sent MQTT Disconnect packet to server");
					break;
				}
				| Ok(notification) => {
					error_count = 0;
					debug!(notification = ?notification, "Received MQTT notification");
				}
				| Err(err) => {
					error_count += 1;
					error!(error_count = error_count, error = %err, "MQTT event loop error");

					if error_count >= max_consecutive_errors {
						error!(
							error_count = error_count,
							max_errors = max_consecutive_errors,
							"Too many consecutive errors, terminating event \
							 loop"
						);
						break;
					}

					let delay = retry_delay(error_count);
					warn!(delay = ?delay, error_count = error_count, "Retrying MQTT connection");
					time::sleep(delay).await;
				}
			}
		}
		info!("MQTT event loop terminated");
	}

	/// Generic operation client using the JSON wire format.
	pub fn operations(&self) -> OperationClient<JsonSerializer> {
		self.operations_with(JsonSerializer)
	}

	/// Generic operation client using a custom serializer.
	pub fn operations_with<F: Clone>(&self, serializer: F) -> OperationClient<F> {
		OperationClient::new(self.manager.clone(), serializer)
	}

	/// AWS IoT Jobs client on this connection.
	pub fn jobs(&self) -> IotJobsClient {
		IotJobsClient::new(self.operations())
	}

	/// AWS IoT Device Shadow client on this connection.
	pub fn shadow(&self) -> IotShadowClient {
		IotShadowClient::new(self.operations())
	}
}

/// Exponential backoff for consecutive event loop errors.
fn retry_delay(error_count: u32) -> Duration {
	let exponent = error_count.saturating_sub(1).min(10);
	(INITIAL_RETRY_DELAY * 2_u32.pow(exponent)).min(MAX_RETRY_DELAY)
}
