use rumqttc::OptionError;

use crate::routing::SubscriptionError;
use crate::topic::TopicError;

/// Failure to bring up the initial MQTT connection
#[derive(Debug, thiserror::Error)]
pub enum ConnectionEstablishmentError {
	/// Network or protocol failure before CONNACK
	#[error("Network connection failed: {0}")]
	Network(#[from] rumqttc::ConnectionError),

	/// Broker answered CONNACK with a failure code
	#[error("Broker rejected connection: {code:?}")]
	BrokerRejected {
		/// Return code sent by the broker
		code: rumqttc::ConnectReturnCode,
	},

	/// No CONNACK within the configured timeout
	#[error("Connection establishment timed out after {timeout_millis}ms")]
	Timeout {
		/// Configured timeout
		timeout_millis: u64,
	},
}

/// Errors that can occur in IoT client operations
#[derive(Debug, thiserror::Error)]
pub enum IotClientError {
	/// Configuration errors when parsing MQTT options
	#[error("Configuration error: {0}")]
	Configuration(#[from] OptionError),

	/// Invalid configuration parameter values
	#[error("Invalid configuration value: {0}")]
	ConfigurationValue(String),

	/// Serialization errors when converting a request to bytes
	#[error("Serialization error: {0}")]
	Serialization(String),

	/// Subscription management errors
	#[error("Subscription error: {0}")]
	Subscription(#[from] SubscriptionError),

	/// Topic could not be built from the request parameters
	#[error("Topic error: {0}")]
	Topic(#[from] TopicError),

	/// Connection establishment failed
	#[error("Failed to establish connection: {0}")]
	ConnectionEstablishment(#[from] ConnectionEstablishmentError),
}
