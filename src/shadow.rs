//! AWS IoT Device Shadow client
//!
//! Works with the classic shadow of a thing and with named shadows. Every
//! request and subscription request picks the topic family from its
//! `shadow_name`.

pub mod model;

pub use model::*;
use rumqttc::QoS;

use crate::client::{EventStream, IotClientError, Operation, OperationClient};
use crate::codec::JsonSerializer;
use crate::routing::{MessageError, PendingAck};

const SERVICE: &str = "shadow";

pub(crate) const THING_NAME: &str = "thingName";
pub(crate) const SHADOW_NAME: &str = "shadowName";

/// Operation pair for the classic and the named variant of a shadow call.
#[derive(Debug, Clone, Copy)]
pub struct ShadowOperation<Req, Acc, Rej> {
	/// `$aws/things/{thingName}/shadow/...`
	pub classic: Operation<Req, Acc, Rej>,
	/// `$aws/things/{thingName}/shadow/name/{shadowName}/...`
	pub named: Operation<Req, Acc, Rej>,
}

impl<Req, Acc, Rej> ShadowOperation<Req, Acc, Rej> {
	/// Variant addressing `address`.
	pub fn select(&self, address: &impl ShadowAddress) -> &Operation<Req, Acc, Rej> {
		match address.shadow_name() {
			| Some(_) => &self.named,
			| None => &self.classic,
		}
	}
}

/// Event stream pair for the classic and the named shadow.
#[derive(Debug, Clone, Copy)]
pub struct ShadowEventStream<E> {
	/// Classic shadow stream
	pub classic: EventStream<E>,
	/// Named shadow stream
	pub named: EventStream<E>,
}

impl<E> ShadowEventStream<E> {
	/// Variant addressing `address`.
	pub fn select(&self, address: &impl ShadowAddress) -> &EventStream<E> {
		match address.shadow_name() {
			| Some(_) => &self.named,
			| None => &self.classic,
		}
	}
}

/// Read the current shadow document.
pub const GET_SHADOW: ShadowOperation<
	GetShadowRequest,
	GetShadowResponse,
	ErrorResponse,
> = ShadowOperation {
	classic: Operation::new(SERVICE, "GetShadow", "$aws/things/{thingName}/shadow/get"),
	named: Operation::new(
		SERVICE,
		"GetNamedShadow",
		"$aws/things/{thingName}/shadow/name/{shadowName}/get",
	),
};

/// Merge a partial state into the shadow document.
pub const UPDATE_SHADOW: ShadowOperation<
	UpdateShadowRequest,
	UpdateShadowResponse,
	ErrorResponse,
> = ShadowOperation {
	classic: Operation::new(
		SERVICE,
		"UpdateShadow",
		"$aws/things/{thingName}/shadow/update",
	),
	named: Operation::new(
		SERVICE,
		"UpdateNamedShadow",
		"$aws/things/{thingName}/shadow/name/{shadowName}/update",
	),
};

/// Remove the shadow document.
pub const DELETE_SHADOW: ShadowOperation<
	DeleteShadowRequest,
	DeleteShadowResponse,
	ErrorResponse,
> = ShadowOperation {
	classic: Operation::new(
		SERVICE,
		"DeleteShadow",
		"$aws/things/{thingName}/shadow/delete",
	),
	named: Operation::new(
		SERVICE,
		"DeleteNamedShadow",
		"$aws/things/{thingName}/shadow/name/{shadowName}/delete",
	),
};

/// Desired and reported state diverged.
pub const SHADOW_DELTA_UPDATED: ShadowEventStream<ShadowDeltaUpdatedEvent> =
	ShadowEventStream {
		classic: EventStream::new(
			SERVICE,
			"ShadowDeltaUpdated",
			"$aws/things/{thingName}/shadow/update/delta",
		),
		named: EventStream::new(
			SERVICE,
			"NamedShadowDeltaUpdated",
			"$aws/things/{thingName}/shadow/name/{shadowName}/update/delta",
		),
	};

/// Full document snapshots around each accepted update.
pub const SHADOW_UPDATED: ShadowEventStream<ShadowUpdatedEvent> =
	ShadowEventStream {
		classic: EventStream::new(
			SERVICE,
			"ShadowUpdated",
			"$aws/things/{thingName}/shadow/update/documents",
		),
		named: EventStream::new(
			SERVICE,
			"NamedShadowUpdated",
			"$aws/things/{thingName}/shadow/name/{shadowName}/update/documents",
		),
	};

/// Device Shadow operations over a shared connection.
#[derive(Clone, Debug)]
pub struct IotShadowClient {
	operations: OperationClient<JsonSerializer>,
}

impl IotShadowClient {
	pub(crate) fn new(operations: OperationClient<JsonSerializer>) -> Self {
		Self { operations }
	}

	/// Underlying generic operation client.
	pub fn operations(&self) -> &OperationClient<JsonSerializer> {
		&self.operations
	}

	/// Responses to [`publish_get_shadow`](Self::publish_get_shadow).
	pub fn subscribe_to_get_shadow_accepted<H>(
		&self,
		request: &ShadowSubscriptionRequest,
		qos: QoS,
		handler: H,
	) -> Result<PendingAck, IotClientError>
	where H: FnMut(Result<GetShadowResponse, MessageError>) + Send + 'static {
		self.operations.subscribe_accepted(
			GET_SHADOW.select(request),
			request,
			qos,
			handler,
		)
	}

	/// Rejected get requests, e.g. 404 when no shadow exists.
	pub fn subscribe_to_get_shadow_rejected<H>(
		&self,
		request: &ShadowSubscriptionRequest,
		qos: QoS,
		handler: H,
	) -> Result<PendingAck, IotClientError>
	where H: FnMut(Result<ErrorResponse, MessageError>) + Send + 'static {
		self.operations.subscribe_rejected(
			GET_SHADOW.select(request),
			request,
			qos,
			handler,
		)
	}

	/// Ask the service for the current document.
	pub fn publish_get_shadow(
		&self,
		request: &GetShadowRequest,
		qos: QoS,
	) -> Result<PendingAck, IotClientError> {
		self.operations
			.publish_request(GET_SHADOW.select(request), request, qos)
	}

	/// Accepted updates, carrying the merged sections and the new version.
	pub fn subscribe_to_update_shadow_accepted<H>(
		&self,
		request: &ShadowSubscriptionRequest,
		qos: QoS,
		handler: H,
	) -> Result<PendingAck, IotClientError>
	where H: FnMut(Result<UpdateShadowResponse, MessageError>) + Send + 'static {
		self.operations.subscribe_accepted(
			UPDATE_SHADOW.select(request),
			request,
			qos,
			handler,
		)
	}

	/// Rejected updates, e.g. 409 on a version conflict.
	pub fn subscribe_to_update_shadow_rejected<H>(
		&self,
		request: &ShadowSubscriptionRequest,
		qos: QoS,
		handler: H,
	) -> Result<PendingAck, IotClientError>
	where H: FnMut(Result<ErrorResponse, MessageError>) + Send + 'static {
		self.operations.subscribe_rejected(
			UPDATE_SHADOW.select(request),
			request,
			qos,
			handler,
		)
	}

	/// Send a state update. Absent sections are left untouched, `null` clears them.
	pub fn publish_update_shadow(
		&self,
		request: &UpdateShadowRequest,
		qos: QoS,
	) -> Result<PendingAck, IotClientError> {
		self.operations
			.publish_request(UPDATE_SHADOW.select(request), request, qos)
	}

	/// Confirmed deletions.
	pub fn subscribe_to_delete_shadow_accepted<H>(
		&self,
		request: &ShadowSubscriptionRequest,
		qos: QoS,
		handler: H,
	) -> Result<PendingAck, IotClientError>
	where H: FnMut(Result<DeleteShadowResponse, MessageError>) + Send + 'static {
		self.operations.subscribe_accepted(
			DELETE_SHADOW.select(request),
			request,
			qos,
			handler,
		)
	}

	/// Rejected deletions.
	pub fn subscribe_to_delete_shadow_rejected<H>(
		&self,
		request: &ShadowSubscriptionRequest,
		qos: QoS,
		handler: H,
	) -> Result<PendingAck, IotClientError>
	where H: FnMut(Result<ErrorResponse, MessageError>) + Send + 'static {
		self.operations.subscribe_rejected(
			DELETE_SHADOW.select(request),
			request,
			qos,
			handler,
		)
	}

	/// Request deletion of the shadow.
	pub fn publish_delete_shadow(
		&self,
		request: &DeleteShadowRequest,
		qos: QoS,
	) -> Result<PendingAck, IotClientError> {
		self.operations
			.publish_request(DELETE_SHADOW.select(request), request, qos)
	}

	/// Events carrying the difference between desired and reported state.
	pub fn subscribe_to_shadow_delta_updated_events<H>(
		&self,
		request: &ShadowSubscriptionRequest,
		qos: QoS,
		handler: H,
	) -> Result<PendingAck, IotClientError>
	where
		H: FnMut(Result<ShadowDeltaUpdatedEvent, MessageError>)
			+ Send
			+ 'static,
	{
		self.operations.subscribe_event(
			SHADOW_DELTA_UPDATED.select(request),
			request,
			qos,
			handler,
		)
	}

	/// Events carrying the full document before and after each update.
	pub fn subscribe_to_shadow_updated_events<H>(
		&self,
		request: &ShadowSubscriptionRequest,
		qos: QoS,
		handler: H,
	) -> Result<PendingAck, IotClientError>
	where H: FnMut(Result<ShadowUpdatedEvent, MessageError>) + Send + 'static {
		self.operations.subscribe_event(
			SHADOW_UPDATED.select(request),
			request,
			qos,
			handler,
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::topic::{TopicError, TopicRole};

	#[test]
	fn classic_shadow_topics() {
		let request = ShadowSubscriptionRequest::new("T1");
		assert_eq!(
			GET_SHADOW
				.select(&request)
				.topic(TopicRole::Accepted, &request)
				.unwrap(),
			"$aws/things/T1/shadow/get/accepted"
		);
		assert_eq!(
			SHADOW_DELTA_UPDATED
				.select(&request)
				.topic(&request)
				.unwrap(),
			"$aws/things/T1/shadow/update/delta"
		);
	}

	#[test]
	fn named_shadow_topics() {
		let request = ShadowSubscriptionRequest::named("T1", "config");
		assert_eq!(
			UPDATE_SHADOW
				.select(&request)
				.topic(TopicRole::Rejected, &request)
				.unwrap(),
			"$aws/things/T1/shadow/name/config/update/rejected"
		);
		assert_eq!(
			SHADOW_UPDATED.select(&request).topic(&request).unwrap(),
			"$aws/things/T1/shadow/name/config/update/documents"
		);
		let delete = DeleteShadowRequest {
			shadow_name: Some("config".into()),
			..DeleteShadowRequest::new("T1")
		};
		assert_eq!(
			DELETE_SHADOW
				.select(&delete)
				.topic(TopicRole::Request, &delete)
				.unwrap(),
			"$aws/things/T1/shadow/name/config/delete"
		);
	}

	#[test]
	fn shadow_name_cannot_escape_its_segment() {
		let request = ShadowSubscriptionRequest::named("T1", "a/../../T2");
		let err = GET_SHADOW
			.select(&request)
			.topic(TopicRole::Accepted, &request)
			.unwrap_err();
		assert!(matches!(
			err,
			IotClientError::Topic(TopicError::InvalidParameter {
				parameter: "shadowName",
				..
			})
		));
	}
}
