//! Error types and limits for topic construction

use thiserror::Error;

use super::operation::TopicRole;

/// Errors raised while building a topic for an operation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopicError {
	/// A parameter required by the topic template was not supplied
	#[error("operation {operation} requires parameter '{parameter}'")]
	MissingParameter {
		/// Operation whose topic was being built
		operation: &'static str,
		/// Template parameter that had no value
		parameter: &'static str,
	},

	/// A parameter value cannot be placed in a topic segment
	#[error("invalid value '{value}' for parameter '{parameter}': {reason}")]
	InvalidParameter {
		/// Template parameter being substituted
		parameter: &'static str,
		/// Offending value
		value: String,
		/// Why the value was refused
		reason: &'static str,
	},

	/// The operation has no topic for the requested role
	#[error("operation {operation} has no {role} topic")]
	RoleNotSupported {
		/// Operation whose topic was being built
		operation: &'static str,
		/// Requested role
		role: TopicRole,
	},

	/// Template contains an unbalanced or empty placeholder
	#[error("malformed topic template '{template}'")]
	MalformedTemplate {
		/// The broken template
		template: &'static str,
	},

	/// A caller-supplied topic cannot be used for exact routing
	#[error("invalid topic '{topic}': {reason}")]
	InvalidTopic {
		/// Offending topic
		topic: String,
		/// Why the topic was refused
		reason: &'static str,
	},

	/// Resulting topic exceeds the broker limit
	#[error("topic is {length} bytes long, limit is {max}")]
	TooLong {
		/// Length of the built topic
		length: usize,
		/// Maximum allowed length
		max: usize,
	},
}

impl TopicError {
	/// Creates a new MissingParameter error
	pub fn missing_parameter(
		operation: &'static str,
		parameter: &'static str,
	) -> Self {
		Self::MissingParameter {
			operation,
			parameter,
		}
	}

	/// Creates a new InvalidParameter error
	pub fn invalid_parameter(
		parameter: &'static str,
		value: impl Into<String>,
		reason: &'static str,
	) -> Self {
		Self::InvalidParameter {
			parameter,
			value: value.into(),
			reason,
		}
	}
}

/// Convenient Result type for topic operations
pub type TopicResult<T> = Result<T, TopicError>;

/// Topic processing limits and constants
pub mod limits {
	/// Maximum length of a single substituted parameter value
	pub const MAX_PARAMETER_LENGTH: usize = 128;

	/// Maximum total topic length accepted by the broker
	pub const MAX_TOPIC_LENGTH: usize = 256;
}

/// Validation utilities for topic parameters
pub mod validation {
	use super::TopicError;
	use super::limits::*;

	/// Validates a value substituted into a single topic segment.
	///
	/// Values must not be able to introduce extra levels or wildcards, so two
	/// distinct values always yield two distinct topics.
	pub fn validate_parameter(
		parameter: &'static str,
		value: &str,
	) -> Result<(), TopicError> {
		if value.is_empty() {
			return Err(TopicError::invalid_parameter(
				parameter,
				value,
				"value is empty",
			));
		}

		if value.len() > MAX_PARAMETER_LENGTH {
			return Err(TopicError::invalid_parameter(
				parameter,
				value,
				"value is too long",
			));
		}

		if value.contains('/') {
			return Err(TopicError::invalid_parameter(
				parameter,
				value,
				"value contains the topic level separator '/'",
			));
		}

		if value.contains(['+', '#']) {
			return Err(TopicError::invalid_parameter(
				parameter,
				value,
				"value contains an MQTT wildcard ('+' or '#')",
			));
		}

		if value.chars().any(char::is_control) {
			return Err(TopicError::invalid_parameter(
				parameter,
				value,
				"value contains control characters",
			));
		}

		Ok(())
	}

	/// Validates a concrete topic given by the caller.
	///
	/// Messages are routed by exact topic, so wildcard filters would be
	/// subscribed on the broker but never matched.
	pub fn validate_topic(topic: &str) -> Result<(), TopicError> {
		let reason = if topic.is_empty() {
			Some("topic is empty")
		} else if topic.contains(['+', '#']) {
			Some("wildcard filters are not supported, subscribe to a concrete topic")
		} else if topic.contains('\0') {
			Some("topic contains a NUL character")
		} else {
			None
		};
		if let Some(reason) = reason {
			return Err(TopicError::InvalidTopic {
				topic: topic.to_string(),
				reason,
			});
		}
		validate_topic_length(topic)
	}

	/// Validates the length of a fully built topic
	pub fn validate_topic_length(topic: &str) -> Result<(), TopicError> {
		if topic.len() > MAX_TOPIC_LENGTH {
			return Err(TopicError::TooLong {
				length: topic.len(),
				max: MAX_TOPIC_LENGTH,
			});
		}
		Ok(())
	}
}
