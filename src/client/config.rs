//! Configuration for IoT client initialization

use rumqttc::{MqttOptions, OptionError, TlsConfiguration, Transport};

use super::error::IotClientError;

/// ALPN protocol that lets AWS IoT Core accept MQTT over port 443.
const AWS_IOT_ALPN: &[u8] = b"x-amzn-mqtt-ca";

/// Client-level performance and behavior settings
#[derive(Debug, Clone)]
pub struct ClientSettings {
	/// Capacity of the event loop channel
	pub event_loop_capacity: usize,
	/// Time allowed for the broker to acknowledge the initial connection
	pub connection_timeout_millis: u64,
	/// Consecutive event loop errors tolerated before the loop gives up
	pub max_consecutive_errors: u32,
}

impl Default for ClientSettings {
	fn default() -> Self {
		Self {
			event_loop_capacity: 10,
			connection_timeout_millis: 5000,
			max_consecutive_errors: 10,
		}
	}
}

impl ClientSettings {
	pub(crate) fn validate(&self) -> Result<(), IotClientError> {
		if self.event_loop_capacity == 0 {
			return Err(IotClientError::ConfigurationValue(
				"event_loop_capacity must be greater than 0".to_string(),
			));
		}
		if self.connection_timeout_millis == 0 {
			return Err(IotClientError::ConfigurationValue(
				"connection_timeout_millis must be greater than 0".to_string(),
			));
		}
		if self.max_consecutive_errors == 0 {
			return Err(IotClientError::ConfigurationValue(
				"max_consecutive_errors must be greater than 0".to_string(),
			));
		}
		Ok(())
	}
}

/// Configuration for IoT client creation
#[derive(Debug, Clone)]
pub struct IotClientConfig {
	/// Underlying MQTT connection options (from rumqttc)
	pub connection: MqttOptions,
	/// Client-level performance and behavior settings
	pub settings: ClientSettings,
}

impl IotClientConfig {
	/// Create config with default settings
	///
	/// # Example
	/// ```rust
	/// use iot_mqtt_services::IotClientConfig;
	///
	/// let config = IotClientConfig::new("thermostat-01", "example-ats.iot.eu-west-1.amazonaws.com", 8883);
	/// ```
	pub fn new(client_id: &str, host: &str, port: u16) -> Self {
		Self {
			connection: MqttOptions::new(client_id, host, port),
			settings: ClientSettings::default(),
		}
	}

	/// Parse configuration from MQTT URL
	///
	/// Supports: tcp://, mqtt://, ssl://, mqtts://, ws://, wss://
	pub fn from_url(url: &str) -> Result<Self, OptionError> {
		Ok(Self {
			connection: MqttOptions::parse_url(url)?,
			settings: ClientSettings::default(),
		})
	}

	/// Create config for localhost:1883
	pub fn localhost(client_id: &str) -> Self {
		Self::new(client_id, "localhost", 1883)
	}

	/// Configure X.509 mutual TLS as required by AWS IoT Core.
	///
	/// All arguments are PEM encoded. When the broker port is 443 the
	/// `x-amzn-mqtt-ca` ALPN protocol is negotiated as well.
	pub fn with_mutual_tls(
		mut self,
		ca: Vec<u8>,
		client_cert: Vec<u8>,
		client_key: Vec<u8>,
	) -> Self {
		let (_, port) = self.connection.broker_address();
		let alpn = (port == 443).then(|| vec![AWS_IOT_ALPN.to_vec()]);
		self.connection
			.set_transport(Transport::tls_with_config(TlsConfiguration::Simple {
				ca,
				alpn,
				client_auth: Some((client_cert, client_key)),
			}));
		self
	}

	/// Replace client-level settings
	pub fn with_settings(mut self, settings: ClientSettings) -> Self {
		self.settings = settings;
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_are_valid() {
		assert!(ClientSettings::default().validate().is_ok());
	}

	#[test]
	fn zero_values_are_rejected() {
		let settings = ClientSettings {
			event_loop_capacity: 0,
			..ClientSettings::default()
		};
		assert!(matches!(
			settings.validate(),
			Err(IotClientError::ConfigurationValue(_))
		));

		let settings = ClientSettings {
			max_consecutive_errors: 0,
			..ClientSettings::default()
		};
		assert!(settings.validate().is_err());
	}

	#[test]
	fn from_url_reads_client_id() {
		let config =
			IotClientConfig::from_url("mqtt://localhost:1883?client_id=device-7")
				.unwrap();
		assert_eq!(config.connection.client_id(), "device-7");
		assert_eq!(config.connection.broker_address().1, 1883);
	}

	#[test]
	fn localhost_uses_default_port() {
		let config = IotClientConfig::localhost("dev");
		assert_eq!(
			config.connection.broker_address(),
			("localhost".to_string(), 1883)
		);
	}

	#[test]
	fn mutual_tls_switches_transport() {
		let config = IotClientConfig::new("dev", "iot.example.com", 8883)
			.with_mutual_tls(b"ca".to_vec(), b"cert".to_vec(), b"key".to_vec());
		assert!(matches!(config.connection.transport(), Transport::Tls(_)));
	}
}
