//! Wire types of the AWS IoT Jobs MQTT API.
//!
//! Every field is optional. Topic parameters (thing name, job id) are bound
//! into the topic and never appear in the payload.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{JOB_ID, THING_NAME};
use crate::codec::{Document, Timestamp, present_or_null};
use crate::topic::{TopicBinding, TopicParams};

/// Status of a job execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
	/// Waiting to be picked up by the device
	Queued,
	/// Being processed by the device
	InProgress,
	/// Step timeout expired before the device reported a terminal status
	TimedOut,
	/// Device reported failure
	Failed,
	/// Device reported success
	#[serde(alias = "SUCCESS")]
	Succeeded,
	/// Job was canceled
	Canceled,
	/// Device rejected the job
	Rejected,
	/// Execution was removed
	Removed,
	/// A status this client does not know about
	#[serde(other)]
	Unknown,
}

impl JobStatus {
	/// Wire spelling of the status.
	pub fn as_str(self) -> &'static str {
		match self {
			| JobStatus::Queued => "QUEUED",
			| JobStatus::InProgress => "IN_PROGRESS",
			| JobStatus::TimedOut => "TIMED_OUT",
			| JobStatus::Failed => "FAILED",
			| JobStatus::Succeeded => "SUCCEEDED",
			| JobStatus::Canceled => "CANCELED",
			| JobStatus::Rejected => "REJECTED",
			| JobStatus::Removed => "REMOVED",
			| JobStatus::Unknown => "UNKNOWN",
		}
	}

	/// Whether no further status updates are possible.
	pub fn is_terminal(self) -> bool {
		matches!(
			self,
			JobStatus::TimedOut
				| JobStatus::Failed
				| JobStatus::Succeeded
				| JobStatus::Canceled
				| JobStatus::Rejected
				| JobStatus::Removed
		)
	}
}

impl fmt::Display for JobStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Error codes reported on `rejected` topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectedErrorCode {
	/// Request was sent to a topic in the Jobs namespace that does not map to any API
	InvalidTopic,
	/// Payload could not be parsed as JSON
	InvalidJson,
	/// Payload was valid JSON but not a valid request
	InvalidRequest,
	/// Update attempted an illegal status transition
	InvalidStateTransition,
	/// Job or execution does not exist
	ResourceNotFound,
	/// Expected version does not match the execution's version
	VersionMismatch,
	/// Service failed to process the request
	InternalError,
	/// Request was throttled
	RequestThrottled,
	/// Execution is already in a terminal state
	TerminalStateReached,
	/// A code this client does not know about
	#[serde(other)]
	Unknown,
}

/// Status details reported by the device as free-form key/value pairs.
pub type StatusDetails = HashMap<String, String>;

/// Full description of a job execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobExecutionData {
	/// Unique job identifier
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub job_id: Option<String>,
	/// Thing the job runs on
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub thing_name: Option<String>,
	/// Job document
	#[serde(
		default,
		deserialize_with = "present_or_null",
		skip_serializing_if = "Option::is_none"
	)]
	pub job_document: Option<Document>,
	/// Current status
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub status: Option<JobStatus>,
	/// Status details set by the device
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub status_details: Option<StatusDetails>,
	/// When the execution was queued
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub queued_at: Option<Timestamp>,
	/// When the execution started
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub started_at: Option<Timestamp>,
	/// When the execution was last updated
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub last_updated_at: Option<Timestamp>,
	/// Version, incremented on every update
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub version_number: Option<i32>,
	/// Execution number of the job on this thing
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub execution_number: Option<i64>,
}

/// Status part of a job execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobExecutionState {
	/// Current status
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub status: Option<JobStatus>,
	/// Status details set by the device
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub status_details: Option<StatusDetails>,
	/// Version, incremented on every update
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub version_number: Option<i32>,
}

/// Short description of a pending job execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobExecutionSummary {
	/// Unique job identifier
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub job_id: Option<String>,
	/// Execution number of the job on this thing
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub execution_number: Option<i64>,
	/// Version, incremented on every update
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub version_number: Option<i32>,
	/// When the execution was last updated
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub last_updated_at: Option<Timestamp>,
	/// When the execution was queued
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub queued_at: Option<Timestamp>,
	/// When the execution started
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub started_at: Option<Timestamp>,
}

/// Typed error delivered on every Jobs `rejected` topic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedError {
	/// Token of the rejected request
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub client_token: Option<String>,
	/// Reason for the rejection
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub code: Option<RejectedErrorCode>,
	/// Human readable description
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub message: Option<String>,
	/// When the error occurred
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub timestamp: Option<Timestamp>,
	/// Current state of the execution, for version mismatches
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub execution_state: Option<JobExecutionState>,
}

/// Topic parameters for subscriptions scoped to one job execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobExecutionSubscriptionRequest {
	/// Thing the job runs on
	pub thing_name: Option<String>,
	/// Job identifier
	pub job_id: Option<String>,
}

impl JobExecutionSubscriptionRequest {
	/// Subscription request for `job_id` on `thing_name`.
	pub fn new(thing_name: impl Into<String>, job_id: impl Into<String>) -> Self {
		Self {
			thing_name: Some(thing_name.into()),
			job_id: Some(job_id.into()),
		}
	}
}

impl TopicBinding for JobExecutionSubscriptionRequest {
	fn topic_params(&self) -> TopicParams<'_> {
		TopicParams::new()
			.with(THING_NAME, self.thing_name.as_deref())
			.with(JOB_ID, self.job_id.as_deref())
	}
}

/// Topic parameters for subscriptions scoped to a thing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThingSubscriptionRequest {
	/// Thing whose topics to subscribe to
	pub thing_name: Option<String>,
}

impl ThingSubscriptionRequest {
	/// Subscription request for `thing_name`.
	pub fn new(thing_name: impl Into<String>) -> Self {
		Self {
			thing_name: Some(thing_name.into()),
		}
	}
}

impl TopicBinding for ThingSubscriptionRequest {
	fn topic_params(&self) -> TopicParams<'_> {
		TopicParams::new().with(THING_NAME, self.thing_name.as_deref())
	}
}

/// Request for the details of one job execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribeJobExecutionRequest {
	/// Thing the job runs on (topic parameter)
	#[serde(skip)]
	pub thing_name: Option<String>,
	/// Job identifier, or `$next` (topic parameter)
	#[serde(skip)]
	pub job_id: Option<String>,
	/// Correlation token echoed in the response
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub client_token: Option<String>,
	/// Specific execution to describe; latest when absent
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub execution_number: Option<i64>,
	/// Whether to include the job document
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub include_job_document: Option<bool>,
}

impl DescribeJobExecutionRequest {
	/// Request for `job_id` on `thing_name`.
	pub fn new(thing_name: impl Into<String>, job_id: impl Into<String>) -> Self {
		Self {
			thing_name: Some(thing_name.into()),
			job_id: Some(job_id.into()),
			..Self::default()
		}
	}
}

impl TopicBinding for DescribeJobExecutionRequest {
	fn topic_params(&self) -> TopicParams<'_> {
		TopicParams::new()
			.with(THING_NAME, self.thing_name.as_deref())
			.with(JOB_ID, self.job_id.as_deref())
	}
}

/// Accepted response to [`DescribeJobExecutionRequest`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribeJobExecutionResponse {
	/// Token of the originating request
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub client_token: Option<String>,
	/// Described execution
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub execution: Option<JobExecutionData>,
	/// When the response was sent
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub timestamp: Option<Timestamp>,
}

/// Request to report progress on a job execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJobExecutionRequest {
	/// Thing the job runs on (topic parameter)
	#[serde(skip)]
	pub thing_name: Option<String>,
	/// Job identifier (topic parameter)
	#[serde(skip)]
	pub job_id: Option<String>,
	/// Correlation token echoed in the response
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub client_token: Option<String>,
	/// New status
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub status: Option<JobStatus>,
	/// Status details to merge
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub status_details: Option<StatusDetails>,
	/// Version the device believes is current
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub expected_version: Option<i32>,
	/// Execution to update; latest when absent
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub execution_number: Option<i64>,
	/// Whether the response should carry the execution state
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub include_job_execution_state: Option<bool>,
	/// Whether the response should carry the job document
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub include_job_document: Option<bool>,
	/// New step timeout for an in-progress execution
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub step_timeout_in_minutes: Option<i64>,
}

impl UpdateJobExecutionRequest {
	/// Request moving `job_id` on `thing_name` to `status`.
	pub fn new(
		thing_name: impl Into<String>,
		job_id: impl Into<String>,
		status: JobStatus,
	) -> Self {
		Self {
			thing_name: Some(thing_name.into()),
			job_id: Some(job_id.into()),
			status: Some(status),
			..Self::default()
		}
	}
}

impl TopicBinding for UpdateJobExecutionRequest {
	fn topic_params(&self) -> TopicParams<'_> {
		TopicParams::new()
			.with(THING_NAME, self.thing_name.as_deref())
			.with(JOB_ID, self.job_id.as_deref())
	}
}

/// Accepted response to [`UpdateJobExecutionRequest`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJobExecutionResponse {
	/// Token of the originating request
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub client_token: Option<String>,
	/// Execution state, when requested
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub execution_state: Option<JobExecutionState>,
	/// Job document, when requested
	#[serde(
		default,
		deserialize_with = "present_or_null",
		skip_serializing_if = "Option::is_none"
	)]
	pub job_document: Option<Document>,
	/// When the response was sent
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub timestamp: Option<Timestamp>,
}

/// Request for the list of unfinished executions of a thing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetPendingJobExecutionsRequest {
	/// Thing to query (topic parameter)
	#[serde(skip)]
	pub thing_name: Option<String>,
	/// Correlation token echoed in the response
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub client_token: Option<String>,
}

impl GetPendingJobExecutionsRequest {
	/// Request for `thing_name`.
	pub fn new(thing_name: impl Into<String>) -> Self {
		Self {
			thing_name: Some(thing_name.into()),
			..Self::default()
		}
	}
}

impl TopicBinding for GetPendingJobExecutionsRequest {
	fn topic_params(&self) -> TopicParams<'_> {
		TopicParams::new().with(THING_NAME, self.thing_name.as_deref())
	}
}

/// Accepted response to [`GetPendingJobExecutionsRequest`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetPendingJobExecutionsResponse {
	/// Token of the originating request
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub client_token: Option<String>,
	/// Executions currently in progress
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub in_progress_jobs: Option<Vec<JobExecutionSummary>>,
	/// Executions waiting to start
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub queued_jobs: Option<Vec<JobExecutionSummary>>,
	/// When the response was sent
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub timestamp: Option<Timestamp>,
}

/// Request to start the next pending execution of a thing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartNextPendingJobExecutionRequest {
	/// Thing to start a job on (topic parameter)
	#[serde(skip)]
	pub thing_name: Option<String>,
	/// Correlation token echoed in the response
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub client_token: Option<String>,
	/// Initial status details
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub status_details: Option<StatusDetails>,
	/// Step timeout for the started execution
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub step_timeout_in_minutes: Option<i64>,
}

impl StartNextPendingJobExecutionRequest {
	/// Request for `thing_name`.
	pub fn new(thing_name: impl Into<String>) -> Self {
		Self {
			thing_name: Some(thing_name.into()),
			..Self::default()
		}
	}
}

impl TopicBinding for StartNextPendingJobExecutionRequest {
	fn topic_params(&self) -> TopicParams<'_> {
		TopicParams::new().with(THING_NAME, self.thing_name.as_deref())
	}
}

/// Accepted response to [`StartNextPendingJobExecutionRequest`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartNextJobExecutionResponse {
	/// Token of the originating request
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub client_token: Option<String>,
	/// Started execution; absent when nothing was pending
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub execution: Option<JobExecutionData>,
	/// When the response was sent
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub timestamp: Option<Timestamp>,
}

/// Sent whenever the list of pending executions of a thing changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobExecutionsChangedEvent {
	/// Pending executions keyed by status name
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub jobs: Option<HashMap<String, Vec<JobExecutionSummary>>>,
	/// When the event was sent
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub timestamp: Option<Timestamp>,
}

impl JobExecutionsChangedEvent {
	/// Executions listed under `status`.
	pub fn jobs_with_status(&self, status: JobStatus) -> &[JobExecutionSummary] {
		self.jobs
			.as_ref()
			.and_then(|jobs| jobs.get(status.as_str()))
			.map(Vec::as_slice)
			.unwrap_or_default()
	}
}

/// Sent whenever the next execution to run on a thing changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextJobExecutionChangedEvent {
	/// Next execution; absent when nothing is pending
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub execution: Option<JobExecutionData>,
	/// When the event was sent
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub timestamp: Option<Timestamp>,
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

	fn details() -> Option<StatusDetails> {
		Some(StatusDetails::from([("step".to_string(), "2".to_string())]))
	}

	fn execution_data() -> JobExecutionData {
		JobExecutionData {
			job_id: Some("job-1".into()),
			thing_name: Some("T1".into()),
			job_document: Some(json!({ "operation": "reboot" })),
			status: Some(JobStatus::InProgress),
			status_details: details(),
			queued_at: at(1_700_000_000),
			started_at: at(1_700_000_010),
			last_updated_at: at(1_700_000_020),
			version_number: Some(3),
			execution_number: Some(1),
		}
	}

	fn execution_state() -> JobExecutionState {
		JobExecutionState {
			status: Some(JobStatus::Failed),
			status_details: details(),
			version_number: Some(5),
		}
	}

	fn summary(job_id: &str) -> JobExecutionSummary {
		JobExecutionSummary {
			job_id: Some(job_id.into()),
			execution_number: Some(2),
			version_number: Some(1),
			last_updated_at: at(1_700_000_020),
			queued_at: at(1_700_000_000),
			started_at: at(1_700_000_010),
		}
	}

	#[test]
	fn every_type_round_trips_when_empty() {
		assert_empty_round_trip::<JobExecutionData>();
		assert_empty_round_trip::<JobExecutionState>();
		assert_empty_round_trip::<JobExecutionSummary>();
		assert_empty_round_trip::<RejectedError>();
		assert_empty_round_trip::<DescribeJobExecutionRequest>();
		assert_empty_round_trip::<DescribeJobExecutionResponse>();
		assert_empty_round_trip::<UpdateJobExecutionRequest>();
		assert_empty_round_trip::<UpdateJobExecutionResponse>();
		assert_empty_round_trip::<GetPendingJobExecutionsRequest>();
		assert_empty_round_trip::<GetPendingJobExecutionsResponse>();
		assert_empty_round_trip::<StartNextPendingJobExecutionRequest>();
		assert_empty_round_trip::<StartNextJobExecutionResponse>();
		assert_empty_round_trip::<JobExecutionsChangedEvent>();
		assert_empty_round_trip::<NextJobExecutionChangedEvent>();
	}

	#[test]
	fn shared_types_round_trip_fully_populated() {
		assert_round_trip(execution_data());
		assert_round_trip(execution_state());
		assert_round_trip(summary("job-1"));
		assert_round_trip(RejectedError {
			client_token: Some("tok".into()),
			code: Some(RejectedErrorCode::VersionMismatch),
			message: Some("stale".into()),
			timestamp: at(1_700_000_030),
			execution_state: Some(execution_state()),
		});
	}

	// Topic parameters are not part of the payload, so they stay unset here.
	#[test]
	fn requests_round_trip_fully_populated() {
		assert_round_trip(DescribeJobExecutionRequest {
			client_token: Some("tok".into()),
			execution_number: Some(4),
			include_job_document: Some(true),
			..Default::default()
		});
		assert_round_trip(UpdateJobExecutionRequest {
			client_token: Some("tok".into()),
			status: Some(JobStatus::Succeeded),
			status_details: details(),
			expected_version: Some(3),
			execution_number: Some(4),
			include_job_execution_state: Some(true),
			include_job_document: Some(false),
			step_timeout_in_minutes: Some(15),
			..Default::default()
		});
		assert_round_trip(GetPendingJobExecutionsRequest {
			client_token: Some("tok".into()),
			..Default::default()
		});
		assert_round_trip(StartNextPendingJobExecutionRequest {
			client_token: Some("tok".into()),
			status_details: details(),
			step_timeout_in_minutes: Some(30),
			..Default::default()
		});
	}

	#[test]
	fn responses_round_trip_fully_populated() {
		assert_round_trip(DescribeJobExecutionResponse {
			client_token: Some("tok".into()),
			execution: Some(execution_data()),
			timestamp: at(1_700_000_040),
		});
		assert_round_trip(UpdateJobExecutionResponse {
			client_token: Some("tok".into()),
			execution_state: Some(execution_state()),
			job_document: Some(json!({ "steps": [1, 2, 3] })),
			timestamp: at(1_700_000_040),
		});
		assert_round_trip(GetPendingJobExecutionsResponse {
			client_token: Some("tok".into()),
			in_progress_jobs: Some(vec![summary("a")]),
			queued_jobs: Some(vec![summary("b"), summary("c")]),
			timestamp: at(1_700_000_040),
		});
		assert_round_trip(StartNextJobExecutionResponse {
			client_token: Some("tok".into()),
			execution: Some(execution_data()),
			timestamp: at(1_700_000_040),
		});
	}

	#[test]
	fn events_round_trip_fully_populated() {
		assert_round_trip(JobExecutionsChangedEvent {
			jobs: Some(HashMap::from([
				("QUEUED".to_string(), vec![summary("a"), summary("b")]),
				("IN_PROGRESS".to_string(), vec![summary("c")]),
			])),
			timestamp: at(1_700_000_050),
		});
		assert_round_trip(NextJobExecutionChangedEvent {
			execution: Some(execution_data()),
			timestamp: at(1_700_000_050),
		});
	}

	#[test]
	fn null_job_document_is_kept() {
		assert_round_trip(JobExecutionData {
			job_document: Some(Document::Null),
			..Default::default()
		});
		assert_round_trip(UpdateJobExecutionResponse {
			job_document: Some(Document::Null),
			..Default::default()
		});
		let decoded: JobExecutionData =
			decode_document(json!({ "jobDocument": null })).unwrap();
		assert_eq!(decoded.job_document, Some(Document::Null));
	}

	#[test]
	fn fractional_timestamps_do_not_fail_the_message() {
		let decoded: JobExecutionData = decode_document(json!({
			"status": "QUEUED",
			"queuedAt": 1_700_000_000.5
		}))
		.unwrap();
		assert_eq!(decoded.status, Some(JobStatus::Queued));
		assert_eq!(decoded.queued_at, at(1_700_000_000));
	}

	#[test]
	fn update_accepted_with_token_and_queued_state() {
		let decoded: UpdateJobExecutionResponse = decode_document(json!({
			"clientToken": "abc",
			"executionState": { "status": "QUEUED" }
		}))
		.unwrap();
		assert_eq!(decoded.client_token.as_deref(), Some("abc"));
		assert_eq!(decoded.execution_state, Some(JobExecutionState {
			status: Some(JobStatus::Queued),
			..Default::default()
		}));
		assert_eq!(decoded.job_document, None);
	}

	#[test]
	fn accepted_message_with_only_status_and_token() {
		let decoded: JobExecutionState = decode_document(json!({
			"clientToken": "abc",
			"status": "QUEUED"
		}))
		.unwrap();
		assert_eq!(decoded.status, Some(JobStatus::Queued));
		assert_eq!(decoded.status_details, None);
		assert_eq!(decoded.version_number, None);
	}

	#[test]
	fn status_accepts_legacy_and_unknown_spellings() {
		let legacy: JobStatus = serde_json::from_value(json!("SUCCESS")).unwrap();
		assert_eq!(legacy, JobStatus::Succeeded);
		let current: JobStatus =
			serde_json::from_value(json!("SUCCEEDED")).unwrap();
		assert_eq!(current, JobStatus::Succeeded);
		let unknown: JobStatus =
			serde_json::from_value(json!("PAUSED")).unwrap();
		assert_eq!(unknown, JobStatus::Unknown);
		assert_eq!(
			serde_json::to_value(JobStatus::InProgress).unwrap(),
			json!("IN_PROGRESS")
		);
	}

	#[test]
	fn terminal_statuses() {
		assert!(!JobStatus::Queued.is_terminal());
		assert!(!JobStatus::InProgress.is_terminal());
		assert!(JobStatus::Succeeded.is_terminal());
		assert!(JobStatus::Removed.is_terminal());
	}

	#[test]
	fn topic_parameters_stay_out_of_the_payload() {
		let mut request = UpdateJobExecutionRequest::new(
			"T1",
			"job-1",
			JobStatus::InProgress,
		);
		request.expected_version = Some(2);
		let document = encode_document(&request).unwrap();
		assert_eq!(
			document,
			json!({ "status": "IN_PROGRESS", "expectedVersion": 2 })
		);
	}

	#[test]
	fn rejected_error_decodes_known_and_unknown_codes() {
		let known: RejectedError = decode_document(json!({
			"code": "VersionMismatch",
			"message": "stale",
			"executionState": { "status": "IN_PROGRESS", "versionNumber": 4 }
		}))
		.unwrap();
		assert_eq!(known.code, Some(RejectedErrorCode::VersionMismatch));
		assert_eq!(
			known.execution_state.and_then(|s| s.version_number),
			Some(4)
		);

		let unknown: RejectedError =
			decode_document(json!({ "code": "SomethingNew" })).unwrap();
		assert_eq!(unknown.code, Some(RejectedErrorCode::Unknown));
	}

	#[test]
	fn executions_changed_groups_by_status() {
		let event: JobExecutionsChangedEvent = decode_document(json!({
			"jobs": {
				"QUEUED": [{ "jobId": "a" }, { "jobId": "b" }],
				"IN_PROGRESS": [{ "jobId": "c" }]
			},
			"timestamp": 1_700_000_000
		}))
		.unwrap();
		assert_eq!(event.jobs_with_status(JobStatus::Queued).len(), 2);
		assert_eq!(event.jobs_with_status(JobStatus::InProgress).len(), 1);
		assert!(event.jobs_with_status(JobStatus::Failed).is_empty());
	}
}
