//! Typed operations and the stateless client that drives them.

use std::fmt;
use std::marker::PhantomData;

use arcstr::ArcStr;
use rumqttc::QoS;
use tracing::debug;

use super::error::IotClientError;
use super::publisher::Publisher;
use super::subscriber::typed_sink;
use crate::codec::MessageSerializer;
use crate::routing::{MessageError, PendingAck, SubscriptionManagerHandler};
use crate::topic::{OperationDescriptor, TopicBinding, TopicRole, validation};

/// Request/response operation with its request, accepted and rejected types.
pub struct Operation<Req, Acc, Rej> {
	descriptor: OperationDescriptor,
	_types: PhantomData<fn() -> (Req, Acc, Rej)>,
}

impl<Req, Acc, Rej> Operation<Req, Acc, Rej> {
	/// Declares an operation whose base topic is `template`.
	pub const fn new(
		service: &'static str,
		name: &'static str,
		template: &'static str,
	) -> Self {
		Self {
			descriptor: OperationDescriptor::request_response(
				service, name, template,
			),
			_types: PhantomData,
		}
	}

	/// Untyped description of the operation.
	pub fn descriptor(&self) -> &OperationDescriptor {
		&self.descriptor
	}

	/// Builds the topic for `role` from `binding`.
	pub fn topic(
		&self,
		role: TopicRole,
		binding: &impl TopicBinding,
	) -> Result<ArcStr, IotClientError> {
		Ok(self.descriptor.topic(role, &binding.topic_params())?)
	}
}

impl<Req, Acc, Rej> Clone for Operation<Req, Acc, Rej> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<Req, Acc, Rej> Copy for Operation<Req, Acc, Rej> {}

impl<Req, Acc, Rej> fmt::Debug for Operation<Req, Acc, Rej> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Operation").field(&self.descriptor).finish()
	}
}

/// Service-originated event stream carrying values of type `E`.
pub struct EventStream<E> {
	descriptor: OperationDescriptor,
	_type: PhantomData<fn() -> E>,
}

impl<E> EventStream<E> {
	/// Declares an event stream published on `template`.
	pub const fn new(
		service: &'static str,
		name: &'static str,
		template: &'static str,
	) -> Self {
		Self {
			descriptor: OperationDescriptor::event(service, name, template),
			_type: PhantomData,
		}
	}

	/// Untyped description of the stream.
	pub fn descriptor(&self) -> &OperationDescriptor {
		&self.descriptor
	}

	/// Builds the event topic from `binding`.
	pub fn topic(
		&self,
		binding: &impl TopicBinding,
	) -> Result<ArcStr, IotClientError> {
		Ok(self
			.descriptor
			.topic(TopicRole::Event, &binding.topic_params())?)
	}
}

impl<E> Clone for EventStream<E> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<E> Copy for EventStream<E> {}

impl<E> fmt::Debug for EventStream<E> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("EventStream").field(&self.descriptor).finish()
	}
}

/// Stateless façade combining topic building, encoding, subscriptions and
/// publishing.
///
/// Calls never wait for the service: the typed answer surfaces later through
/// the handler registered on the `accepted` or `rejected` topic. Cloning is
/// cheap and every clone shares the same connection.
#[derive(Clone, Debug)]
pub struct OperationClient<F> {
	manager: SubscriptionManagerHandler,
	publisher: Publisher<F>,
	serializer: F,
}

impl<F> OperationClient<F>
where F: Clone
{
	pub(crate) fn new(manager: SubscriptionManagerHandler, serializer: F) -> Self {
		Self {
			publisher: Publisher::new(manager.clone(), serializer.clone()),
			manager,
			serializer,
		}
	}

	/// Publisher sharing this client's connection and serializer.
	pub fn publisher(&self) -> &Publisher<F> {
		&self.publisher
	}

	/// Subscribe to the operation's `accepted` topic.
	pub fn subscribe_accepted<Req, Acc, Rej, H>(
		&self,
		operation: &Operation<Req, Acc, Rej>,
		binding: &impl TopicBinding,
		qos: QoS,
		handler: H,
	) -> Result<PendingAck, IotClientError>
	where
		F: MessageSerializer<Acc>,
		H: FnMut(Result<Acc, MessageError>) + Send + 'static,
	{
		let topic = operation.topic(TopicRole::Accepted, binding)?;
		self.subscribe(topic, qos, handler)
	}

	/// Subscribe to the operation's `rejected` topic.
	///
	/// A well-formed rejection arrives as `Ok(Rej)`; it is the service's
	/// answer, not a delivery failure.
	pub fn subscribe_rejected<Req, Acc, Rej, H>(
		&self,
		operation: &Operation<Req, Acc, Rej>,
		binding: &impl TopicBinding,
		qos: QoS,
		handler: H,
	) -> Result<PendingAck, IotClientError>
	where
		F: MessageSerializer<Rej>,
		H: FnMut(Result<Rej, MessageError>) + Send + 'static,
	{
		let topic = operation.topic(TopicRole::Rejected, binding)?;
		self.subscribe(topic, qos, handler)
	}

	/// Subscribe to a service-originated event stream.
	pub fn subscribe_event<E, H>(
		&self,
		stream: &EventStream<E>,
		binding: &impl TopicBinding,
		qos: QoS,
		handler: H,
	) -> Result<PendingAck, IotClientError>
	where
		F: MessageSerializer<E>,
		H: FnMut(Result<E, MessageError>) + Send + 'static,
	{
		let topic = stream.topic(binding)?;
		self.subscribe(topic, qos, handler)
	}

	/// Encode `request` and publish it to the operation's request topic.
	///
	/// The topic parameters are taken from the request itself.
	pub fn publish_request<Req, Acc, Rej>(
		&self,
		operation: &Operation<Req, Acc, Rej>,
		request: &Req,
		qos: QoS,
	) -> Result<PendingAck, IotClientError>
	where
		Req: TopicBinding,
		F: MessageSerializer<Req>,
	{
		let topic = operation.topic(TopicRole::Request, request)?;
		self.publisher.publish(topic, request, qos)
	}

	/// Register `handler` for messages on an exact `topic`.
	///
	/// Replaces any handler already registered for the topic. Wildcard
	/// filters are rejected because routing matches topics exactly.
	pub fn subscribe<T, H>(
		&self,
		topic: impl Into<ArcStr>,
		qos: QoS,
		handler: H,
	) -> Result<PendingAck, IotClientError>
	where
		F: MessageSerializer<T>,
		H: FnMut(Result<T, MessageError>) + Send + 'static,
	{
		let topic = topic.into();
		validation::validate_topic(&topic)?;
		debug!(topic = %topic, qos = ?qos, "Subscribing");
		let sink = typed_sink(self.serializer.clone(), handler);
		Ok(self.manager.subscribe(topic, qos, sink)?)
	}

	/// Remove the handler for `topic` and unsubscribe on the transport.
	///
	/// Messages already queued for the handler are still delivered.
	pub fn unsubscribe(
		&self,
		topic: impl Into<ArcStr>,
	) -> Result<PendingAck, IotClientError> {
		let topic = topic.into();
		debug!(topic = %topic, "Unsubscribing");
		Ok(self.manager.unsubscribe(topic)?)
	}
}
