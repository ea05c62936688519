use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use arcstr::ArcStr;
use bytes::Bytes;
use rumqttc::QoS;
use tokio::sync::mpsc::{
	self, UnboundedReceiver, UnboundedSender, WeakUnboundedSender,
};
use tokio::sync::oneshot;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, error, info, warn};

use super::ack::{AckCompleter, PendingAck, pending_ack};
use super::delivery::{DeliverySink, Inbound, spawn_delivery};
use super::error::SubscriptionError;
use crate::transport::Transport;

/// Upper bound for flushing queued transport requests during shutdown.
const TRANSPORT_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// A subscription identifier.
///
/// Distinguishes successive handlers registered for the same topic.
#[derive(Debug, Eq, PartialEq, Hash, Copy, Clone)]
pub struct SubscriptionId(usize);

impl Display for SubscriptionId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "SubscriptionId({})", self.0)
	}
}

pub(crate) enum Command {
	Subscribe {
		topic: ArcStr,
		qos: QoS,
		sink: DeliverySink,
		ack: AckCompleter,
	},
	Unsubscribe {
		topic: ArcStr,
		ack: AckCompleter,
	},
	Publish {
		topic: ArcStr,
		payload: Bytes,
		qos: QoS,
		ack: AckCompleter,
	},
	Dispatch {
		topic: String,
		payload: Bytes,
	},
	Resubscribe,
	SubscribeFailed {
		topic: ArcStr,
		id: SubscriptionId,
	},
}

enum TransportOp {
	Subscribe {
		topic: ArcStr,
		qos: QoS,
		ack: AckCompleter,
		// Set for fresh subscriptions; the route is dropped if the transport refuses.
		route: Option<SubscriptionId>,
	},
	Unsubscribe {
		topic: ArcStr,
		ack: Option<AckCompleter>,
	},
	Publish {
		topic: ArcStr,
		payload: Bytes,
		qos: QoS,
		ack: AckCompleter,
	},
}

struct Route {
	id: SubscriptionId,
	qos: QoS,
	sender: UnboundedSender<Inbound>,
}

/// Owns the topic table and serialises every subscription change.
///
/// Registration and inbound dispatch go through one command queue, so a
/// handler is always in place before any message that follows its subscribe
/// request is routed. Transport calls run on a separate worker that keeps
/// their order but never stalls routing.
pub(crate) struct SubscriptionManagerActor {
	routes: HashMap<ArcStr, Route>,
	next_id: usize,
	command_rx: UnboundedReceiver<Command>,
	transport_tx: UnboundedSender<TransportOp>,
	shutdown_rx: oneshot::Receiver<()>,
}

impl SubscriptionManagerActor {
	pub fn spawn(
		transport: Arc<dyn Transport>,
	) -> (SubscriptionManagerController, SubscriptionManagerHandler) {
		let (command_tx, command_rx) = mpsc::unbounded_channel();
		let (transport_tx, transport_rx) = mpsc::unbounded_channel();
		let (shutdown_tx, shutdown_rx) = oneshot::channel();

		let worker_handle = tokio::spawn(run_transport_worker(
			transport,
			transport_rx,
			command_tx.downgrade(),
		));
		let actor = Self {
			routes: HashMap::new(),
			next_id: 0,
			command_rx,
			transport_tx,
			shutdown_rx,
		};
		let actor_handle = tokio::spawn(async move { actor.run().await });

		let controller = SubscriptionManagerController {
			shutdown_tx,
			actor_handle,
			worker_handle,
		};
		let handler = SubscriptionManagerHandler { command_tx };
		(controller, handler)
	}

	async fn run(mut self) {
		info!("Subscription manager started");
		loop {
			tokio::select! {
				_ = &mut self.shutdown_rx => {
					info!("Subscription manager: shutdown signal received");
					break;
				}
				command = self.command_rx.recv() => match command {
					| Some(command) => self.handle_command(command),
					| None => {
						info!("Subscription manager: command channel closed, exiting");
						break;
					}
				}
			}
		}

		// Flush requests accepted before shutdown, then release every route.
		self.command_rx.close();
		while let Ok(command) = self.command_rx.try_recv() {
			self.handle_command(command);
		}
		self.cleanup_active_subscriptions();
		info!("Subscription manager stopped");
	}

	fn handle_command(&mut self, command: Command) {
		match command {
			| Command::Subscribe {
				topic,
				qos,
				sink,
				ack,
			} => self.handle_subscribe(topic, qos, sink, ack),
			| Command::Unsubscribe { topic, ack } => {
				self.handle_unsubscribe(topic, ack)
			}
			| Command::Publish {
				topic,
				payload,
				qos,
				ack,
			} => self.send_to_transport(TransportOp::Publish {
				topic,
				payload,
				qos,
				ack,
			}),
			| Command::Dispatch { topic, payload } => {
				self.handle_dispatch(topic, payload)
			}
			| Command::Resubscribe => self.handle_resubscribe(),
			| Command::SubscribeFailed { topic, id } => {
				self.handle_subscribe_failed(topic, id)
			}
		}
	}

	fn next_subscription_id(&mut self) -> SubscriptionId {
		let id = SubscriptionId(self.next_id);
		self.next_id = self.next_id.wrapping_add(1);
		id
	}

	fn handle_subscribe(
		&mut self,
		topic: ArcStr,
		qos: QoS,
		sink: DeliverySink,
		ack: AckCompleter,
	) {
		let id = self.next_subscription_id();
		let sender = spawn_delivery(topic.clone(), id, sink);
		let route = Route { id, qos, sender };
		match self.routes.insert(topic.clone(), route) {
			| Some(previous) => debug!(
				topic = %topic,
				previous = %previous.id,
				subscription_id = %id,
				"Replacing message handler"
			),
			| None => debug!(topic = %topic, subscription_id = %id, "Route registered"),
		}
		self.send_to_transport(TransportOp::Subscribe {
			topic,
			qos,
			ack,
			route: Some(id),
		});
	}

	fn handle_subscribe_failed(&mut self, topic: ArcStr, id: SubscriptionId) {
		// A newer subscribe may have replaced the route meanwhile.
		if self.routes.get(&topic).is_some_and(|route| route.id == id) {
			self.routes.remove(&topic);
			warn!(topic = %topic, subscription_id = %id, "Removed route after failed subscribe");
		}
	}

	fn handle_unsubscribe(&mut self, topic: ArcStr, ack: AckCompleter) {
		match self.routes.remove(&topic) {
			| Some(route) => {
				debug!(topic = %topic, subscription_id = %route.id, "Route removed")
			}
			| None => debug!(topic = %topic, "Unsubscribe for a topic without route"),
		}
		self.send_to_transport(TransportOp::Unsubscribe {
			topic,
			ack: Some(ack),
		});
	}

	fn handle_dispatch(&mut self, topic: String, payload: Bytes) {
		let Some(route) = self.routes.get(topic.as_str()) else {
			debug!(topic = %topic, payload_size = payload.len(), "No route for inbound message, dropping");
			return;
		};
		if route.sender.send(Inbound::Message(payload)).is_err() {
			let id = route.id;
			let topic = ArcStr::from(topic);
			self.routes.remove(&topic);
			error!(
				subscription_id = %id,
				topic = %topic,
				"Delivery task is gone, unsubscribing"
			);
			self.send_to_transport(TransportOp::Unsubscribe { topic, ack: None });
		}
	}

	fn handle_resubscribe(&self) {
		info!(routes = self.routes.len(), "Re-subscribing active topics");
		for (topic, route) in &self.routes {
			let (ack, pending) = pending_ack(topic.clone());
			let sender = route.sender.clone();
			pending.on_complete(move |result| {
				if let Err(source) = result {
					let _ = sender.send(Inbound::Failure(source));
				}
			});
			self.send_to_transport(TransportOp::Subscribe {
				topic: topic.clone(),
				qos: route.qos,
				ack,
				route: None,
			});
		}
	}

	fn send_to_transport(&self, op: TransportOp) {
		// A dropped op resolves its acknowledgement as ConnectionClosed.
		if self.transport_tx.send(op).is_err() {
			error!("Transport worker stopped, request dropped");
		}
	}

	/// Unsubscribes every active topic and closes all delivery queues.
	fn cleanup_active_subscriptions(&mut self) {
		let topics: Vec<ArcStr> =
			self.routes.drain().map(|(topic, _)| topic).collect();
		for topic in topics {
			debug!(topic = %topic, "Unsubscribing during shutdown");
			self.send_to_transport(TransportOp::Unsubscribe { topic, ack: None });
		}
	}
}

async fn run_transport_worker(
	transport: Arc<dyn Transport>,
	mut ops: UnboundedReceiver<TransportOp>,
	commands: WeakUnboundedSender<Command>,
) {
	while let Some(op) = ops.recv().await {
		match op {
			| TransportOp::Subscribe {
				topic,
				qos,
				ack,
				route,
			} => {
				let result = transport.subscribe(&topic, qos).await;
				match &result {
					| Ok(()) => debug!(topic = %topic, qos = ?qos, "Subscribe accepted by transport"),
					| Err(err) => {
						error!(topic = %topic, error = %err, "Failed to subscribe to MQTT topic");
						if let (Some(id), Some(commands)) = (route, commands.upgrade()) {
							let _ = commands.send(Command::SubscribeFailed {
								topic: topic.clone(),
								id,
							});
						}
					}
				}
				ack.complete(result);
			}
			| TransportOp::Unsubscribe { topic, ack } => {
				let result = transport.unsubscribe(&topic).await;
				if let Err(err) = &result {
					error!(topic = %topic, error = %err, "Failed to unsubscribe from MQTT topic");
				}
				if let Some(ack) = ack {
					ack.complete(result);
				}
			}
			| TransportOp::Publish {
				topic,
				payload,
				qos,
				ack,
			} => {
				let payload_size = payload.len();
				let result = transport.publish(&topic, payload, qos).await;
				match &result {
					| Ok(()) => debug!(topic = %topic, payload_size, "Publish accepted by transport"),
					| Err(err) => error!(topic = %topic, error = %err, "Failed to publish MQTT message"),
				}
				ack.complete(result);
			}
		}
	}
	debug!("Transport worker finished");
}

/// Stops the subscription manager and its transport worker.
pub(crate) struct SubscriptionManagerController {
	shutdown_tx: oneshot::Sender<()>,
	actor_handle: JoinHandle<()>,
	worker_handle: JoinHandle<()>,
}

impl SubscriptionManagerController {
	pub async fn shutdown(self) -> Result<(), JoinError> {
		let _ = self.shutdown_tx.send(()).inspect_err(|_| {
			warn!("SubscriptionManagerController: manager already stopped");
		});
		self.actor_handle.await.inspect_err(|e| {
			warn!(error = ?e, "SubscriptionManagerController: actor run failed");
		})?;

		let mut worker_handle = self.worker_handle;
		match tokio::time::timeout(TRANSPORT_DRAIN_TIMEOUT, &mut worker_handle)
			.await
		{
			| Ok(joined) => joined.inspect_err(|e| {
				warn!(error = ?e, "SubscriptionManagerController: transport worker failed");
			}),
			| Err(_) => {
				warn!(
					timeout_ms = TRANSPORT_DRAIN_TIMEOUT.as_millis() as u64,
					"Transport worker did not drain in time, aborting"
				);
				worker_handle.abort();
				Ok(())
			}
		}
	}
}

/// Cloneable, non-blocking entry point into the subscription manager.
///
/// Every method only enqueues a command, so it is safe to call from message
/// handlers and acknowledgement callbacks.
#[derive(Clone, Debug)]
pub(crate) struct SubscriptionManagerHandler {
	command_tx: UnboundedSender<Command>,
}

impl SubscriptionManagerHandler {
	pub fn subscribe(
		&self,
		topic: ArcStr,
		qos: QoS,
		sink: DeliverySink,
	) -> Result<PendingAck, SubscriptionError> {
		let (ack, pending) = pending_ack(topic.clone());
		self.send(Command::Subscribe {
			topic,
			qos,
			sink,
			ack,
		})?;
		Ok(pending)
	}

	pub fn unsubscribe(
		&self,
		topic: ArcStr,
	) -> Result<PendingAck, SubscriptionError> {
		let (ack, pending) = pending_ack(topic.clone());
		self.send(Command::Unsubscribe { topic, ack })?;
		Ok(pending)
	}

	pub fn publish(
		&self,
		topic: ArcStr,
		payload: Bytes,
		qos: QoS,
	) -> Result<PendingAck, SubscriptionError> {
		let (ack, pending) = pending_ack(topic.clone());
		self.send(Command::Publish {
			topic,
			payload,
			qos,
			ack,
		})?;
		Ok(pending)
	}

	pub fn dispatch_incoming_message(
		&self,
		topic: String,
		payload: Bytes,
	) -> Result<(), SubscriptionError> {
		self.send(Command::Dispatch { topic, payload })
	}

	pub fn resubscribe_all(&self) -> Result<(), SubscriptionError> {
		self.send(Command::Resubscribe)
	}

	fn send(&self, command: Command) -> Result<(), SubscriptionError> {
		self.command_tx
			.send(command)
			.map_err(|_| SubscriptionError::ChannelClosed)
	}
}
