//! Wire types of the AWS IoT Device Shadow MQTT API.

use serde::{Deserialize, Serialize};

use super::{SHADOW_NAME, THING_NAME};
use crate::codec::{Document, Timestamp, present_or_null};
use crate::topic::{TopicBinding, TopicParams};

/// Desired and reported sections of a shadow document.
///
/// `None` means the section is absent; `Some(Document::Null)` is an explicit
/// `null`, which deletes the section in the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShadowState {
	/// State the device should converge to
	#[serde(
		default,
		deserialize_with = "present_or_null",
		skip_serializing_if = "Option::is_none"
	)]
	pub desired: Option<Document>,
	/// State reported by the device
	#[serde(
		default,
		deserialize_with = "present_or_null",
		skip_serializing_if = "Option::is_none"
	)]
	pub reported: Option<Document>,
}

impl ShadowState {
	/// State with only a reported section.
	pub fn reported(reported: Document) -> Self {
		Self {
			desired: None,
			reported: Some(reported),
		}
	}

	/// State with only a desired section.
	pub fn desired(desired: Document) -> Self {
		Self {
			desired: Some(desired),
			reported: None,
		}
	}
}

/// Shadow state as returned by GetShadow, including the computed delta.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShadowStateWithDelta {
	/// State the device should converge to
	#[serde(
		default,
		deserialize_with = "present_or_null",
		skip_serializing_if = "Option::is_none"
	)]
	pub desired: Option<Document>,
	/// State reported by the device
	#[serde(
		default,
		deserialize_with = "present_or_null",
		skip_serializing_if = "Option::is_none"
	)]
	pub reported: Option<Document>,
	/// Difference between desired and reported
	#[serde(
		default,
		deserialize_with = "present_or_null",
		skip_serializing_if = "Option::is_none"
	)]
	pub delta: Option<Document>,
}

/// Per-attribute update timestamps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShadowMetadata {
	/// Timestamps of the desired attributes
	#[serde(
		default,
		deserialize_with = "present_or_null",
		skip_serializing_if = "Option::is_none"
	)]
	pub desired: Option<Document>,
	/// Timestamps of the reported attributes
	#[serde(
		default,
		deserialize_with = "present_or_null",
		skip_serializing_if = "Option::is_none"
	)]
	pub reported: Option<Document>,
}

/// Typed error delivered on every Shadow `rejected` topic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
	/// Token of the rejected request
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub client_token: Option<String>,
	/// HTTP-style status code, e.g. 404 or 409
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub code: Option<i32>,
	/// Human readable description
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub message: Option<String>,
	/// When the error occurred
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub timestamp: Option<Timestamp>,
}

/// Topic parameters for shadow subscriptions.
///
/// Without a shadow name the classic (unnamed) shadow is addressed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShadowSubscriptionRequest {
	/// Thing owning the shadow
	pub thing_name: Option<String>,
	/// Named shadow; classic shadow when absent
	pub shadow_name: Option<String>,
}

impl ShadowSubscriptionRequest {
	/// Classic shadow of `thing_name`.
	pub fn new(thing_name: impl Into<String>) -> Self {
		Self {
			thing_name: Some(thing_name.into()),
			shadow_name: None,
		}
	}

	/// Named shadow `shadow_name` of `thing_name`.
	pub fn named(
		thing_name: impl Into<String>,
		shadow_name: impl Into<String>,
	) -> Self {
		Self {
			thing_name: Some(thing_name.into()),
			shadow_name: Some(shadow_name.into()),
		}
	}
}

/// Shadow address carried by requests and subscription requests.
pub trait ShadowAddress: TopicBinding {
	/// Name of the addressed shadow; `None` for the classic shadow.
	fn shadow_name(&self) -> Option<&str>;
}

macro_rules! shadow_address {
	($($ty:ty),+ $(,)?) => {
		$(
			impl TopicBinding for $ty {
				fn topic_params(&self) -> TopicParams<'_> {
					TopicParams::new()
						.with(THING_NAME, self.thing_name.as_deref())
						.with(SHADOW_NAME, self.shadow_name.as_deref())
				}
			}

			impl ShadowAddress for $ty {
				fn shadow_name(&self) -> Option<&str> {
					self.shadow_name.as_deref()
				}
			}
		)+
	};
}

shadow_address!(
	ShadowSubscriptionRequest,
	GetShadowRequest,
	UpdateShadowRequest,
	DeleteShadowRequest,
);

/// Request for the current shadow document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetShadowRequest {
	/// Thing owning the shadow (topic parameter)
	#[serde(skip)]
	pub thing_name: Option<String>,
	/// Named shadow; classic shadow when absent (topic parameter)
	#[serde(skip)]
	pub shadow_name: Option<String>,
	/// Correlation token echoed in the response
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub client_token: Option<String>,
}

impl GetShadowRequest {
	/// Request for the classic shadow of `thing_name`.
	pub fn new(thing_name: impl Into<String>) -> Self {
		Self {
			thing_name: Some(thing_name.into()),
			..Self::default()
		}
	}
}

/// Accepted response to [`GetShadowRequest`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetShadowResponse {
	/// Token of the originating request
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub client_token: Option<String>,
	/// Current state with the computed delta
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub state: Option<ShadowStateWithDelta>,
	/// Update time of every attribute
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub metadata: Option<ShadowMetadata>,
	/// Current document version
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub version: Option<i64>,
	/// When the response was sent
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub timestamp: Option<Timestamp>,
}

/// Request to change the shadow document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateShadowRequest {
	/// Thing owning the shadow (topic parameter)
	#[serde(skip)]
	pub thing_name: Option<String>,
	/// Named shadow; classic shadow when absent (topic parameter)
	#[serde(skip)]
	pub shadow_name: Option<String>,
	/// Correlation token echoed in the response
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub client_token: Option<String>,
	/// Sections to merge into the shadow
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub state: Option<ShadowState>,
	/// Expected current version; the update is rejected on mismatch
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub version: Option<i64>,
}

impl UpdateShadowRequest {
	/// Update of the classic shadow of `thing_name`.
	pub fn new(thing_name: impl Into<String>, state: ShadowState) -> Self {
		Self {
			thing_name: Some(thing_name.into()),
			state: Some(state),
			..Self::default()
		}
	}
}

/// Accepted response to [`UpdateShadowRequest`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateShadowResponse {
	/// Token of the originating request
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub client_token: Option<String>,
	/// Sections as accepted by the service
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub state: Option<ShadowState>,
	/// Update time of the changed attributes
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub metadata: Option<ShadowMetadata>,
	/// Version after the update
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub version: Option<i64>,
	/// When the response was sent
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub timestamp: Option<Timestamp>,
}

/// Request to delete the shadow document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteShadowRequest {
	/// Thing owning the shadow (topic parameter)
	#[serde(skip)]
	pub thing_name: Option<String>,
	/// Named shadow; classic shadow when absent (topic parameter)
	#[serde(skip)]
	pub shadow_name: Option<String>,
	/// Correlation token echoed in the response
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub client_token: Option<String>,
	/// Expected current version; the deletion is rejected on mismatch
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub version: Option<i64>,
}

impl DeleteShadowRequest {
	/// Deletion of the classic shadow of `thing_name`.
	pub fn new(thing_name: impl Into<String>) -> Self {
		Self {
			thing_name: Some(thing_name.into()),
			..Self::default()
		}
	}
}

/// Accepted response to [`DeleteShadowRequest`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteShadowResponse {
	/// Token of the originating request
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub client_token: Option<String>,
	/// Version of the deleted document
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub version: Option<i64>,
	/// When the response was sent
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub timestamp: Option<Timestamp>,
}

/// Published on `update/delta` when desired and reported differ.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShadowDeltaUpdatedEvent {
	/// Attributes whose desired value differs from the reported one
	#[serde(
		default,
		deserialize_with = "present_or_null",
		skip_serializing_if = "Option::is_none"
	)]
	pub state: Option<Document>,
	/// Update time of the attributes in `state`
	#[serde(
		default,
		deserialize_with = "present_or_null",
		skip_serializing_if = "Option::is_none"
	)]
	pub metadata: Option<Document>,
	/// Document version
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub version: Option<i64>,
	/// When the event was sent
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub timestamp: Option<Timestamp>,
	/// Token of the update that caused the event
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub client_token: Option<String>,
}

/// Shadow document before or after an update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShadowUpdatedSnapshot {
	/// Desired and reported sections
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub state: Option<ShadowState>,
	/// Update time of every attribute
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub metadata: Option<ShadowMetadata>,
	/// Document version
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub version: Option<i64>,
}

/// Published on `update/documents` after every accepted update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShadowUpdatedEvent {
	/// Document before the update
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub previous: Option<ShadowUpdatedSnapshot>,
	/// Document after the update
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub current: Option<ShadowUpdatedSnapshot>,
	/// When the event was sent
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub timestamp: Option<Timestamp>,
	/// Token of the update that caused the event
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub client_token: Option<String>,
}

#[cfg(test)]
mod tests {
	use std::fmt::Debug;

	use serde::de::DeserializeOwned;
	use serde_json::json;

	use super::*;
	use crate::codec::{decode_document, encode_document};

	fn assert_round_trip<T>(value: T)
	where T: Serialize + DeserializeOwned + PartialEq + Debug {
		let document = encode_document(&value).unwrap();
		let decoded: T = decode_document(document).unwrap();
		assert_eq!(decoded, value);
	}

	fn assert_empty_round_trip<T>()
	where T: Serialize + DeserializeOwned + PartialEq + Debug + Default {
		let document = encode_document(&T::default()).unwrap();
		assert_eq!(document, json!({}));
		let decoded: T = decode_document(document).unwrap();
		assert_eq!(decoded, T::default());
	}

	fn at(seconds: i64) -> Option<Timestamp> {
		Some(Timestamp::from_epoch_seconds(seconds))
	}

	fn state() -> ShadowState {
		ShadowState {
			desired: Some(json!({ "color": "green" })),
			reported: Some(json!({ "color": "red" })),
		}
	}

	fn metadata() -> ShadowMetadata {
		ShadowMetadata {
			desired: Some(json!({ "color": { "timestamp": 1_700_000_000 } })),
			reported: Some(json!({ "color": { "timestamp": 1_699_999_000 } })),
		}
	}

	fn snapshot(version: i64) -> ShadowUpdatedSnapshot {
		ShadowUpdatedSnapshot {
			state: Some(state()),
			metadata: Some(metadata()),
			version: Some(version),
		}
	}

	#[test]
	fn every_type_round_trips_when_empty() {
		assert_empty_round_trip::<ShadowState>();
		assert_empty_round_trip::<ShadowStateWithDelta>();
		assert_empty_round_trip::<ShadowMetadata>();
		assert_empty_round_trip::<ErrorResponse>();
		assert_empty_round_trip::<GetShadowRequest>();
		assert_empty_round_trip::<GetShadowResponse>();
		assert_empty_round_trip::<UpdateShadowRequest>();
		assert_empty_round_trip::<UpdateShadowResponse>();
		assert_empty_round_trip::<DeleteShadowRequest>();
		assert_empty_round_trip::<DeleteShadowResponse>();
		assert_empty_round_trip::<ShadowDeltaUpdatedEvent>();
		assert_empty_round_trip::<ShadowUpdatedSnapshot>();
		assert_empty_round_trip::<ShadowUpdatedEvent>();
	}

	// Topic parameters are not part of the payload, so they stay unset here.
	#[test]
	fn every_type_round_trips_fully_populated() {
		assert_round_trip(state());
		assert_round_trip(metadata());
		assert_round_trip(ShadowStateWithDelta {
			desired: Some(json!({ "color": "green" })),
			reported: Some(json!({ "color": "red" })),
			delta: Some(json!({ "color": "green" })),
		});
		assert_round_trip(ErrorResponse {
			client_token: Some("tok".into()),
			code: Some(409),
			message: Some("Version conflict".into()),
			timestamp: at(1_700_000_000),
		});
		assert_round_trip(GetShadowRequest {
			client_token: Some("tok".into()),
			..Default::default()
		});
		assert_round_trip(GetShadowResponse {
			client_token: Some("tok".into()),
			state: Some(ShadowStateWithDelta {
				desired: Some(json!({ "on": true })),
				reported: Some(json!({ "on": false })),
				delta: Some(json!({ "on": true })),
			}),
			metadata: Some(metadata()),
			version: Some(12),
			timestamp: at(1_700_000_005),
		});
		assert_round_trip(UpdateShadowRequest {
			client_token: Some("tok".into()),
			state: Some(state()),
			version: Some(11),
			..Default::default()
		});
		assert_round_trip(UpdateShadowResponse {
			client_token: Some("tok".into()),
			state: Some(state()),
			metadata: Some(metadata()),
			version: Some(12),
			timestamp: at(1_700_000_005),
		});
		assert_round_trip(DeleteShadowRequest {
			client_token: Some("tok".into()),
			version: Some(12),
			..Default::default()
		});
		assert_round_trip(DeleteShadowResponse {
			client_token: Some("tok".into()),
			version: Some(12),
			timestamp: at(1_700_000_006),
		});
		assert_round_trip(ShadowDeltaUpdatedEvent {
			state: Some(json!({ "color": "green" })),
			metadata: Some(json!({ "color": { "timestamp": 1_700_000_000 } })),
			version: Some(12),
			timestamp: at(1_700_000_005),
			client_token: Some("tok".into()),
		});
		assert_round_trip(snapshot(3));
		assert_round_trip(ShadowUpdatedEvent {
			previous: Some(snapshot(2)),
			current: Some(snapshot(3)),
			timestamp: at(1_700_000_005),
			client_token: Some("tok".into()),
		});
	}

	#[test]
	fn explicit_nulls_are_kept_in_every_document_field() {
		assert_round_trip(ShadowStateWithDelta {
			desired: Some(Document::Null),
			reported: Some(Document::Null),
			delta: Some(Document::Null),
		});
		assert_round_trip(ShadowMetadata {
			desired: Some(Document::Null),
			reported: Some(Document::Null),
		});
		assert_round_trip(ShadowDeltaUpdatedEvent {
			state: Some(Document::Null),
			metadata: Some(Document::Null),
			..Default::default()
		});
		let event: ShadowDeltaUpdatedEvent =
			decode_document(json!({ "state": null, "version": 4 })).unwrap();
		assert_eq!(event.state, Some(Document::Null));
		assert_eq!(event.metadata, None);
	}

	#[test]
	fn explicit_null_survives_a_round_trip() {
		let request = UpdateShadowRequest {
			thing_name: Some("T1".into()),
			client_token: Some("tok".into()),
			state: Some(ShadowState {
				desired: Some(Document::Null),
				reported: Some(json!({ "color": "red" })),
			}),
			..Default::default()
		};
		let document = encode_document(&request).unwrap();
		assert_eq!(
			document,
			json!({
				"clientToken": "tok",
				"state": { "desired": null, "reported": { "color": "red" } }
			})
		);
		let decoded: UpdateShadowRequest = decode_document(document).unwrap();
		assert_eq!(decoded.state, request.state);
		assert_eq!(decoded.thing_name, None);
	}

	#[test]
	fn absent_sections_stay_absent() {
		let state: ShadowState =
			decode_document(json!({ "reported": { "on": true } })).unwrap();
		assert_eq!(state.desired, None);
		assert_eq!(encode_document(&state).unwrap(), json!({ "reported": { "on": true } }));
	}

	#[test]
	fn get_response_with_delta() {
		let response: GetShadowResponse = decode_document(json!({
			"state": {
				"desired": { "color": "green" },
				"reported": { "color": "red" },
				"delta": { "color": "green" }
			},
			"metadata": { "desired": { "color": { "timestamp": 1_700_000_000 } } },
			"version": 12,
			"timestamp": 1_700_000_005
		}))
		.unwrap();
		let state = response.state.unwrap();
		assert_eq!(state.delta, Some(json!({ "color": "green" })));
		assert_eq!(response.version, Some(12));
		assert_eq!(response.client_token, None);
		assert_eq!(
			response.timestamp,
			Some(Timestamp::from_epoch_seconds(1_700_000_005))
		);
	}

	#[test]
	fn documents_event_carries_both_snapshots() {
		let event: ShadowUpdatedEvent = decode_document(json!({
			"previous": { "state": { "reported": { "v": 1 } }, "version": 1 },
			"current": { "state": { "reported": { "v": 2 } }, "version": 2 },
			"timestamp": 1_700_000_000
		}))
		.unwrap();
		assert_eq!(event.previous.and_then(|s| s.version), Some(1));
		assert_eq!(
			event.current.and_then(|s| s.state).and_then(|s| s.reported),
			Some(json!({ "v": 2 }))
		);
	}

	#[test]
	fn error_response_fields() {
		let error: ErrorResponse = decode_document(json!({
			"code": 404,
			"message": "No shadow exists with name: 'T1'",
			"clientToken": "abc"
		}))
		.unwrap();
		assert_eq!(error.code, Some(404));
		assert_eq!(error.client_token.as_deref(), Some("abc"));
		assert_eq!(error.timestamp, None);
	}
}
