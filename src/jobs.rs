//! AWS IoT Jobs client
//!
//! Devices use these operations to discover, start and report on the jobs
//! assigned to them.

pub mod model;

pub use model::*;
use rumqttc::QoS;

use crate::client::{EventStream, IotClientError, Operation, OperationClient};
use crate::codec::JsonSerializer;
use crate::routing::{MessageError, PendingAck};

const SERVICE: &str = "jobs";

pub(crate) const THING_NAME: &str = "thingName";
pub(crate) const JOB_ID: &str = "jobId";

/// `$aws/things/{thingName}/jobs/{jobId}/get`
pub const DESCRIBE_JOB_EXECUTION: Operation<
	DescribeJobExecutionRequest,
	DescribeJobExecutionResponse,
	RejectedError,
> = Operation::new(
	SERVICE,
	"DescribeJobExecution",
	"$aws/things/{thingName}/jobs/{jobId}/get",
);

/// `$aws/things/{thingName}/jobs/{jobId}/update`
pub const UPDATE_JOB_EXECUTION: Operation<
	UpdateJobExecutionRequest,
	UpdateJobExecutionResponse,
	RejectedError,
> = Operation::new(
	SERVICE,
	"UpdateJobExecution",
	"$aws/things/{thingName}/jobs/{jobId}/update",
);

/// `$aws/things/{thingName}/jobs/get`
pub const GET_PENDING_JOB_EXECUTIONS: Operation<
	GetPendingJobExecutionsRequest,
	GetPendingJobExecutionsResponse,
	RejectedError,
> = Operation::new(
	SERVICE,
	"GetPendingJobExecutions",
	"$aws/things/{thingName}/jobs/get",
);

/// `$aws/things/{thingName}/jobs/start-next`
pub const START_NEXT_PENDING_JOB_EXECUTION: Operation<
	StartNextPendingJobExecutionRequest,
	StartNextJobExecutionResponse,
	RejectedError,
> = Operation::new(
	SERVICE,
	"StartNextPendingJobExecution",
	"$aws/things/{thingName}/jobs/start-next",
);

/// `$aws/things/{thingName}/jobs/notify`
pub const JOB_EXECUTIONS_CHANGED: EventStream<JobExecutionsChangedEvent> =
	EventStream::new(
		SERVICE,
		"JobExecutionsChanged",
		"$aws/things/{thingName}/jobs/notify",
	);

/// `$aws/things/{thingName}/jobs/notify-next`
pub const NEXT_JOB_EXECUTION_CHANGED: EventStream<
	NextJobExecutionChangedEvent,
> = EventStream::new(
	SERVICE,
	"NextJobExecutionChanged",
	"$aws/things/{thingName}/jobs/notify-next",
);

/// Jobs operations over a shared connection.
///
/// Subscribe to the `accepted` and `rejected` topics first, then publish the
/// request. Answers are matched to requests by topic and, optionally, by
/// client token.
#[derive(Clone, Debug)]
pub struct IotJobsClient {
	operations: OperationClient<JsonSerializer>,
}

impl IotJobsClient {
	pub(crate) fn new(operations: OperationClient<JsonSerializer>) -> Self {
		Self { operations }
	}

	/// Underlying generic operation client.
	pub fn operations(&self) -> &OperationClient<JsonSerializer> {
		&self.operations
	}

	/// Responses to [`publish_describe_job_execution`](Self::publish_describe_job_execution).
	pub fn subscribe_to_describe_job_execution_accepted<H>(
		&self,
		request: &JobExecutionSubscriptionRequest,
		qos: QoS,
		handler: H,
	) -> Result<PendingAck, IotClientError>
	where
		H: FnMut(Result<DescribeJobExecutionResponse, MessageError>)
			+ Send
			+ 'static,
	{
		self.operations.subscribe_accepted(
			&DESCRIBE_JOB_EXECUTION,
			request,
			qos,
			handler,
		)
	}

	/// Rejections of describe requests for one execution.
	pub fn subscribe_to_describe_job_execution_rejected<H>(
		&self,
		request: &JobExecutionSubscriptionRequest,
		qos: QoS,
		handler: H,
	) -> Result<PendingAck, IotClientError>
	where H: FnMut(Result<RejectedError, MessageError>) + Send + 'static {
		self.operations.subscribe_rejected(
			&DESCRIBE_JOB_EXECUTION,
			request,
			qos,
			handler,
		)
	}

	/// Ask for the state of one execution.
	pub fn publish_describe_job_execution(
		&self,
		request: &DescribeJobExecutionRequest,
		qos: QoS,
	) -> Result<PendingAck, IotClientError> {
		self.operations
			.publish_request(&DESCRIBE_JOB_EXECUTION, request, qos)
	}

	/// Responses to [`publish_update_job_execution`](Self::publish_update_job_execution).
	pub fn subscribe_to_update_job_execution_accepted<H>(
		&self,
		request: &JobExecutionSubscriptionRequest,
		qos: QoS,
		handler: H,
	) -> Result<PendingAck, IotClientError>
	where
		H: FnMut(Result<UpdateJobExecutionResponse, MessageError>)
			+ Send
			+ 'static,
	{
		self.operations.subscribe_accepted(
			&UPDATE_JOB_EXECUTION,
			request,
			qos,
			handler,
		)
	}

	/// Rejections carry a [`RejectedError`] with the current execution state.
	pub fn subscribe_to_update_job_execution_rejected<H>(
		&self,
		request: &JobExecutionSubscriptionRequest,
		qos: QoS,
		handler: H,
	) -> Result<PendingAck, IotClientError>
	where H: FnMut(Result<RejectedError, MessageError>) + Send + 'static {
		self.operations.subscribe_rejected(
			&UPDATE_JOB_EXECUTION,
			request,
			qos,
			handler,
		)
	}

	/// Report progress or a final status for an execution.
	pub fn publish_update_job_execution(
		&self,
		request: &UpdateJobExecutionRequest,
		qos: QoS,
	) -> Result<PendingAck, IotClientError> {
		self.operations
			.publish_request(&UPDATE_JOB_EXECUTION, request, qos)
	}

	/// Pending execution lists for a thing.
	pub fn subscribe_to_get_pending_job_executions_accepted<H>(
		&self,
		request: &ThingSubscriptionRequest,
		qos: QoS,
		handler: H,
	) -> Result<PendingAck, IotClientError>
	where
		H: FnMut(Result<GetPendingJobExecutionsResponse, MessageError>)
			+ Send
			+ 'static,
	{
		self.operations.subscribe_accepted(
			&GET_PENDING_JOB_EXECUTIONS,
			request,
			qos,
			handler,
		)
	}

	/// Rejections of pending execution queries.
	pub fn subscribe_to_get_pending_job_executions_rejected<H>(
		&self,
		request: &ThingSubscriptionRequest,
		qos: QoS,
		handler: H,
	) -> Result<PendingAck, IotClientError>
	where H: FnMut(Result<RejectedError, MessageError>) + Send + 'static {
		self.operations.subscribe_rejected(
			&GET_PENDING_JOB_EXECUTIONS,
			request,
			qos,
			handler,
		)
	}

	/// List executions that are queued or in progress.
	pub fn publish_get_pending_job_executions(
		&self,
		request: &GetPendingJobExecutionsRequest,
		qos: QoS,
	) -> Result<PendingAck, IotClientError> {
		self.operations
			.publish_request(&GET_PENDING_JOB_EXECUTIONS, request, qos)
	}

	/// Executions started by [`publish_start_next_pending_job_execution`](Self::publish_start_next_pending_job_execution).
	pub fn subscribe_to_start_next_pending_job_execution_accepted<H>(
		&self,
		request: &ThingSubscriptionRequest,
		qos: QoS,
		handler: H,
	) -> Result<PendingAck, IotClientError>
	where
		H: FnMut(Result<StartNextJobExecutionResponse, MessageError>)
			+ Send
			+ 'static,
	{
		self.operations.subscribe_accepted(
			&START_NEXT_PENDING_JOB_EXECUTION,
			request,
			qos,
			handler,
		)
	}

	/// Rejections of start-next requests.
	pub fn subscribe_to_start_next_pending_job_execution_rejected<H>(
		&self,
		request: &ThingSubscriptionRequest,
		qos: QoS,
		handler: H,
	) -> Result<PendingAck, IotClientError>
	where H: FnMut(Result<RejectedError, MessageError>) + Send + 'static {
		self.operations.subscribe_rejected(
			&START_NEXT_PENDING_JOB_EXECUTION,
			request,
			qos,
			handler,
		)
	}

	/// Move the next queued execution to `IN_PROGRESS`.
	pub fn publish_start_next_pending_job_execution(
		&self,
		request: &StartNextPendingJobExecutionRequest,
		qos: QoS,
	) -> Result<PendingAck, IotClientError> {
		self.operations.publish_request(
			&START_NEXT_PENDING_JOB_EXECUTION,
			request,
			qos,
		)
	}

	/// Events listing the pending executions whenever they change.
	pub fn subscribe_to_job_executions_changed_events<H>(
		&self,
		request: &ThingSubscriptionRequest,
		qos: QoS,
		handler: H,
	) -> Result<PendingAck, IotClientError>
	where
		H: FnMut(Result<JobExecutionsChangedEvent, MessageError>)
			+ Send
			+ 'static,
	{
		self.operations.subscribe_event(
			&JOB_EXECUTIONS_CHANGED,
			request,
			qos,
			handler,
		)
	}

	/// Events announcing the next execution to run.
	pub fn subscribe_to_next_job_execution_changed_events<H>(
		&self,
		request: &ThingSubscriptionRequest,
		qos: QoS,
		handler: H,
	) -> Result<PendingAck, IotClientError>
	where
		H: FnMut(Result<NextJobExecutionChangedEvent, MessageError>)
			+ Send
			+ 'static,
	{
		self.operations.subscribe_event(
			&NEXT_JOB_EXECUTION_CHANGED,
			request,
			qos,
			handler,
		)
	}
}
