//! Payload codec: typed values to and from JSON documents.
//!
//! Every service payload is a JSON object whose keys are the operation's
//! field names. Models derive `serde` traits with all fields optional, so a
//! missing key decodes to `None` and unknown keys are ignored. Absent fields
//! are never encoded (no `null` placeholders).

use std::fmt::{Debug, Display};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::de::{self, DeserializeOwned, Unexpected, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Generic tree-structured document exchanged with the services.
pub type Document = serde_json::Value;

/// Errors produced while encoding or decoding payloads
#[derive(Debug, Error)]
pub enum CodecError {
	/// Payload bytes are not JSON
	#[error("payload is not valid JSON: {0}")]
	Syntax(#[source] serde_json::Error),

	/// Payload is JSON but not an object
	#[error("expected a JSON object, found {found}")]
	NotAnObject {
		/// Kind of JSON value that was found instead
		found: &'static str,
	},

	/// Document is an object but a field has the wrong type
	#[error("document does not match the expected shape: {0}")]
	Shape(#[source] serde_json::Error),

	/// Value could not be turned into a document
	#[error("failed to encode document: {0}")]
	Encode(#[source] serde_json::Error),
}

/// Trait for serializing and deserializing MQTT message payloads.
///
/// Implement this trait to plug in a different wire encoding. The services
/// themselves only speak JSON, see [`JsonSerializer`].
pub trait MessageSerializer<T>:
	Default + Clone + Send + Sync + 'static
{
	/// Error type for serialization failures
	type SerializeError: Debug + Display + Send + Sync + 'static;
	/// Error type for deserialization failures
	type DeserializeError: Debug + Display + Send + Sync + 'static;

	/// Convert data to bytes for MQTT transmission
	fn serialize(&self, data: &T) -> Result<Vec<u8>, Self::SerializeError>;
	/// Convert bytes from MQTT into typed data
	fn deserialize(&self, bytes: &[u8]) -> Result<T, Self::DeserializeError>;
}

/// JSON serializer used for all service payloads.
///
/// Decoding goes through a [`Document`] first so that anything other than a
/// JSON object (arrays, scalars, empty payloads) is rejected as malformed
/// instead of being coerced into a struct.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonSerializer;

impl<T> MessageSerializer<T> for JsonSerializer
where T: Serialize + DeserializeOwned + 'static
{
	type SerializeError = CodecError;
	type DeserializeError = CodecError;

	fn serialize(&self, data: &T) -> Result<Vec<u8>, Self::SerializeError> {
		serde_json::to_vec(data).map_err(CodecError::Encode)
	}

	fn deserialize(&self, bytes: &[u8]) -> Result<T, Self::DeserializeError> {
		let document: Document =
			serde_json::from_slice(bytes).map_err(CodecError::Syntax)?;
		decode_document(document)
	}
}

/// Encode a typed value into a document.
pub fn encode_document<T: Serialize>(value: &T) -> Result<Document, CodecError> {
	serde_json::to_value(value).map_err(CodecError::Encode)
}

/// Decode a typed value from a document.
///
/// The document must be an object. Missing keys decode as absent values.
pub fn decode_document<T: DeserializeOwned>(
	document: Document,
) -> Result<T, CodecError> {
	if !document.is_object() {
		return Err(CodecError::NotAnObject {
			found: document_kind(&document),
		});
	}
	serde_json::from_value(document).map_err(CodecError::Shape)
}

fn document_kind(document: &Document) -> &'static str {
	match document {
		| Document::Null => "null",
		| Document::Bool(_) => "boolean",
		| Document::Number(_) => "number",
		| Document::String(_) => "string",
		| Document::Array(_) => "array",
		| Document::Object(_) => "object",
	}
}

/// Keeps an explicit JSON `null` as `Some(Document::Null)`.
///
/// Plain `Option<Document>` folds `null` into `None`; shadow state sections
/// need the distinction because `null` clears state in the service. Use
/// together with `#[serde(default)]` so a missing key is still `None`.
pub(crate) fn present_or_null<'de, D>(
	deserializer: D,
) -> Result<Option<Document>, D::Error>
where D: Deserializer<'de> {
	Document::deserialize(deserializer).map(Some)
}

/// Point in time as whole seconds since the Unix epoch.
///
/// Encoded as a bare JSON integer. Any JSON number decodes; fractional
/// seconds are truncated toward zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl<'de> Deserialize<'de> for Timestamp {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where D: Deserializer<'de> {
		deserializer.deserialize_any(EpochSecondsVisitor)
	}
}

struct EpochSecondsVisitor;

impl<'de> Visitor<'de> for EpochSecondsVisitor {
	type Value = Timestamp;

	fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str("seconds since the Unix epoch as a number")
	}

	fn visit_i64<E: de::Error>(self, value: i64) -> Result<Timestamp, E> {
		Ok(Timestamp(value))
	}

	fn visit_u64<E: de::Error>(self, value: u64) -> Result<Timestamp, E> {
		i64::try_from(value)
			.map(Timestamp)
			.map_err(|_| E::invalid_value(Unexpected::Unsigned(value), &self))
	}

	fn visit_f64<E: de::Error>(self, value: f64) -> Result<Timestamp, E> {
		// i64::MAX as f64 rounds up to 2^63, hence the strict upper bound.
		if value.is_finite() && value >= i64::MIN as f64 && value < i64::MAX as f64 {
			Ok(Timestamp(value.trunc() as i64))
		} else {
			Err(E::invalid_value(Unexpected::Float(value), &self))
		}
	}
}

impl Timestamp {
	/// Creates a timestamp from epoch seconds.
	pub const fn from_epoch_seconds(seconds: i64) -> Self {
		Self(seconds)
	}

	/// Seconds since the Unix epoch.
	pub const fn epoch_seconds(self) -> i64 {
		self.0
	}

	/// Current wall-clock time, truncated to whole seconds.
	pub fn now() -> Self {
		Self::from(SystemTime::now())
	}

	/// Converts to a [`SystemTime`].
	pub fn to_system_time(self) -> SystemTime {
		let offset = Duration::from_secs(self.0.unsigned_abs());
		if self.0 >= 0 {
			UNIX_EPOCH + offset
		} else {
			UNIX_EPOCH - offset
		}
	}
}

impl From<SystemTime> for Timestamp {
	fn from(time: SystemTime) -> Self {
		match time.duration_since(UNIX_EPOCH) {
			| Ok(after) => Self(after.as_secs() as i64),
			| Err(before) => Self(-(before.duration().as_secs() as i64)),
		}
	}
}

impl Display for Timestamp {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}
