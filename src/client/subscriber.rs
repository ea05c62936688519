use arcstr::ArcStr;
use tracing::warn;

use crate::codec::MessageSerializer;
use crate::routing::{DeliverySink, Inbound, MessageError};

/// Wraps a typed handler into the erased sink owned by a route.
///
/// Every inbound item reaches the handler exactly once: decoded values as
/// `Ok`, undecodable payloads and re-subscribe failures as `Err`.
pub(crate) fn typed_sink<T, F, H>(serializer: F, mut handler: H) -> DeliverySink
where
	F: MessageSerializer<T>,
	H: FnMut(Result<T, MessageError>) + Send + 'static,
{
	Box::new(move |topic: &ArcStr, inbound: Inbound| {
		let outcome = match inbound {
			| Inbound::Message(payload) => {
				serializer.deserialize(&payload).map_err(|err| {
					warn!(
						topic = %topic,
						payload_size = payload.len(),
						error = %err,
						"Failed to decode MQTT message payload"
					);
					MessageError::Decode {
						topic: topic.clone(),
						payload_size: payload.len(),
						reason: err.to_string(),
					}
				})
			}
			| Inbound::Failure(source) => Err(MessageError::Transport {
				topic: topic.clone(),
				source,
			}),
		};
		handler(outcome);
	})
}

#[cfg(test)]
mod tests {
	use arcstr::literal;
	use bytes::Bytes;
	use serde::{Deserialize, Serialize};

	use super::*;
	use crate::codec::JsonSerializer;
	use crate::transport::TransportError;

	#[derive(Debug, Serialize, Deserialize, PartialEq)]
	struct Reading {
		value: Option<i64>,
	}

	fn collect(
		items: Vec<Inbound>,
	) -> Vec<Result<Reading, MessageError>> {
		let (tx, rx) = std::sync::mpsc::channel();
		let mut sink = typed_sink::<Reading, _, _>(JsonSerializer, move |r| {
			tx.send(r).unwrap();
		});
		let topic = literal!("sensors/a");
		for item in items {
			sink(&topic, item);
		}
		drop(sink);
		rx.into_iter().collect()
	}

	#[test]
	fn decodes_well_formed_payloads() {
		let results = collect(vec![Inbound::Message(Bytes::from_static(
			br#"{"value":3}"#,
		))]);
		assert_eq!(results.len(), 1);
		assert_eq!(results[0].as_ref().unwrap(), &Reading { value: Some(3) });
	}

	#[test]
	fn malformed_payload_becomes_decode_error() {
		let results = collect(vec![
			Inbound::Message(Bytes::from_static(b"{not json")),
			Inbound::Message(Bytes::new()),
		]);
		assert_eq!(results.len(), 2);
		for result in results {
			let err = result.unwrap_err();
			assert!(err.is_decode());
			assert_eq!(err.topic().as_str(), "sensors/a");
		}
	}

	#[test]
	fn failures_are_reported_as_transport_errors() {
		let results = collect(vec![Inbound::Failure(TransportError::rejected(
			"not authorized",
		))]);
		assert!(matches!(
			results[0],
			Err(MessageError::Transport { .. })
		));
	}
}
