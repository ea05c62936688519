#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use iot_mqtt_services::{QoS, Transport, TransportError};
use serde_json::Value;
use tokio::sync::Semaphore;
use tracing_subscriber::EnvFilter;

pub const WAIT: Duration = Duration::from_secs(2);

pub fn init_tracing() {
	let _ = tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::from_default_env())
		.with_test_writer()
		.try_init();
}

#[derive(Debug, Clone, PartialEq)]
pub enum Recorded {
	Subscribe(String, QoS),
	Unsubscribe(String),
	Publish(String, Bytes, QoS),
}

/// Transport double that records requests instead of talking to a broker.
#[derive(Default)]
pub struct RecordingTransport {
	ops: Mutex<Vec<Recorded>>,
	failing: Mutex<HashSet<String>>,
	subscribe_gate: Option<Arc<Semaphore>>,
}

impl RecordingTransport {
	pub fn new() -> Arc<Self> {
		Arc::new(Self::default())
	}

	/// Subscribe calls block until [`release_subscribes`] lets them through.
	pub fn gated() -> Arc<Self> {
		Arc::new(Self {
			subscribe_gate: Some(Arc::new(Semaphore::new(0))),
			..Self::default()
		})
	}

	pub fn release_subscribes(&self, count: usize) {
		if let Some(gate) = &self.subscribe_gate {
			gate.add_permits(count);
		}
	}

	pub fn fail_on(&self, topic: &str) {
		self.failing.lock().unwrap().insert(topic.to_string());
	}

	pub fn ops(&self) -> Vec<Recorded> {
		self.ops.lock().unwrap().clone()
	}

	pub fn subscribed_topics(&self) -> Vec<String> {
		self.ops()
			.into_iter()
			.filter_map(|op| match op {
				| Recorded::Subscribe(topic, _) => Some(topic),
				| _ => None,
			})
			.collect()
	}

	pub fn unsubscribed_topics(&self) -> Vec<String> {
		self.ops()
			.into_iter()
			.filter_map(|op| match op {
				| Recorded::Unsubscribe(topic) => Some(topic),
				| _ => None,
			})
			.collect()
	}

	/// Published messages with their payloads parsed as JSON.
	pub fn published(&self) -> Vec<(String, Value)> {
		self.ops()
			.into_iter()
			.filter_map(|op| match op {
				| Recorded::Publish(topic, payload, _) => Some((
					topic,
					serde_json::from_slice(&payload).unwrap(),
				)),
				| _ => None,
			})
			.collect()
	}

	fn outcome(&self, topic: &str) -> Result<(), TransportError> {
		if self.failing.lock().unwrap().contains(topic) {
			Err(TransportError::rejected(format!("{topic} refused")))
		} else {
			Ok(())
		}
	}
}

#[async_trait]
impl Transport for RecordingTransport {
	async fn subscribe(&self, topic: &str, qos: QoS) -> Result<(), TransportError> {
		self.ops
			.lock()
			.unwrap()
			.push(Recorded::Subscribe(topic.to_string(), qos));
		if let Some(gate) = &self.subscribe_gate {
			gate.acquire()
				.await
				.map_err(|_| TransportError::ConnectionClosed)?
				.forget();
		}
		self.outcome(topic)
	}

	async fn publish(
		&self,
		topic: &str,
		payload: Bytes,
		qos: QoS,
	) -> Result<(), TransportError> {
		self.ops
			.lock()
			.unwrap()
			.push(Recorded::Publish(topic.to_string(), payload, qos));
		self.outcome(topic)
	}

	async fn unsubscribe(&self, topic: &str) -> Result<(), TransportError> {
		self.ops
			.lock()
			.unwrap()
			.push(Recorded::Unsubscribe(topic.to_string()));
		Ok(())
	}
}
