use arcstr::ArcStr;
use thiserror::Error;

use crate::transport::TransportError;

/// Errors during subscription manager operations
#[derive(Debug, Error)]
pub enum SubscriptionError {
	/// The subscription manager is no longer running
	#[error("Subscription manager command channel closed")]
	ChannelClosed,
}

/// Failure delivered to a message handler instead of a typed value.
///
/// A well-formed message on a `rejected` topic is not a `MessageError`: it
/// decodes into the operation's typed error and arrives as `Ok`.
#[derive(Debug, Error)]
pub enum MessageError {
	/// A message arrived but its payload could not be decoded
	#[error("payload on '{topic}' failed to decode: {reason}")]
	Decode {
		/// Topic the message arrived on
		topic: ArcStr,
		/// Size of the offending payload in bytes
		payload_size: usize,
		/// Decoder's description of the failure
		reason: String,
	},

	/// The transport could not (re-)establish delivery for the subscription
	#[error("subscription to '{topic}' failed: {source}")]
	Transport {
		/// Topic of the affected subscription
		topic: ArcStr,
		/// Underlying transport failure
		#[source]
		source: TransportError,
	},
}

impl MessageError {
	/// Topic the failure concerns.
	pub fn topic(&self) -> &ArcStr {
		match self {
			| MessageError::Decode { topic, .. } => topic,
			| MessageError::Transport { topic, .. } => topic,
		}
	}

	/// Whether the payload arrived but could not be decoded.
	pub fn is_decode(&self) -> bool {
		matches!(self, MessageError::Decode { .. })
	}
}
