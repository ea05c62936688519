//! # IoT MQTT Services
//!
//! Typed clients for the AWS IoT Jobs and Device Shadow MQTT APIs, built on
//! a generic request/response correlation layer over publish/subscribe.
//!
//! ## Features
//!
//! - **Typed operations**: every service call has typed request, accepted and
//!   rejected types
//! - **Exact topic routing**: one handler per topic, registered before the
//!   transport subscribe so no early message is lost
//! - **Local acknowledgements**: each subscribe, unsubscribe and publish
//!   returns a [`PendingAck`] that resolves exactly once
//! - **Graceful shutdown**: subscriptions are released and queued requests
//!   flushed before disconnecting
//! - **Pluggable transport**: rumqttc out of the box, any [`Transport`] for
//!   tests or other stacks
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use iot_mqtt_services::prelude::*;
//! use iot_mqtt_services::jobs::{
//!     DescribeJobExecutionRequest, JobExecutionSubscriptionRequest,
//! };
//!
//! #[tokio::main]
//! async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//!     let (client, connection) = IotClient::connect(
//!         "mqtt://localhost:1883?client_id=thermostat-01",
//!     )
//!     .await?;
//!     let jobs = client.jobs();
//!
//!     let topics = JobExecutionSubscriptionRequest::new("thermostat-01", "job-42");
//!     jobs.subscribe_to_describe_job_execution_accepted(
//!         &topics,
//!         QoS::AtLeastOnce,
//!         |response| match response {
//!             Ok(response) => println!("execution: {:?}", response.execution),
//!             Err(e) => eprintln!("undecodable response: {e}"),
//!         },
//!     )?
//!     .await?;
//!
//!     let mut request = DescribeJobExecutionRequest::new("thermostat-01", "job-42");
//!     request.client_token = Some(new_client_token());
//!     jobs.publish_describe_job_execution(&request, QoS::AtLeastOnce)?
//!         .await?;
//!
//!     connection.shutdown().await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

pub mod client;
pub mod codec;
pub mod connection;
pub mod jobs;
pub mod routing;
pub mod shadow;
pub mod token;
pub mod topic;
pub mod transport;

// === Core Public API ===
pub use client::{
	ClientSettings, IotClient, IotClientConfig, IotClientError,
	OperationClient,
};
pub use codec::{JsonSerializer, MessageSerializer};
pub use connection::{MessageDispatcher, MqttConnection, TransportSession};
pub use jobs::IotJobsClient;
pub use routing::{MessageError, PendingAck};
pub use shadow::IotShadowClient;
pub use token::new_client_token;
pub use transport::{Transport, TransportError};

// Essential external types
pub use rumqttc::QoS;

/// Result type alias for operations that may fail with IotClientError
pub type Result<T> = std::result::Result<T, IotClientError>;

/// Prelude module for convenient imports
///
/// ```rust
/// use iot_mqtt_services::prelude::*;
/// ```
pub mod prelude {
	//! Essential types for most applications

	pub use crate::{
		IotClient, IotClientConfig, IotClientError, IotJobsClient,
		IotShadowClient, MessageError, MqttConnection, PendingAck, QoS,
		Result, new_client_token,
	};
}

/// Advanced types for custom operations and transports
pub mod advanced {
	//! Building blocks below the service clients

	pub use crate::client::{EventStream, Operation, Publisher};
	pub use crate::codec::{Document, Timestamp, decode_document, encode_document};
	pub use crate::routing::{AckCompleter, AckResult, SubscriptionId, pending_ack};
	pub use crate::topic::{
		OperationDescriptor, OperationKind, TopicBinding, TopicParams,
		TopicRole, build_topic, limits, validation,
	};
	pub use crate::{MessageDispatcher, Transport, TransportSession};
}

/// Error types used throughout the library
pub mod errors {
	//! All error types used in the library

	pub use crate::client::{ConnectionEstablishmentError, IotClientError};
	pub use crate::codec::CodecError;
	pub use crate::routing::{MessageError, SubscriptionError};
	pub use crate::topic::TopicError;
	pub use crate::transport::TransportError;
}
