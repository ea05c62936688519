//! Operation descriptors and topic roles

use std::fmt;

use arcstr::ArcStr;

use super::error::TopicError;
use super::topic_builder::{TopicParams, build_topic};

/// Shape of the interaction an operation describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
	/// Request topic plus `accepted` and `rejected` response topics
	RequestResponse,
	/// A single service-originated event topic
	Event,
}

/// Which of an operation's topics to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopicRole {
	/// Topic the request is published to
	Request,
	/// Topic on which the service reports success
	Accepted,
	/// Topic on which the service reports failure
	Rejected,
	/// Topic of a service-originated event
	Event,
}

impl TopicRole {
	/// Suffix appended to the operation's base topic, if any.
	pub fn suffix(self) -> Option<&'static str> {
		match self {
			| TopicRole::Accepted => Some("accepted"),
			| TopicRole::Rejected => Some("rejected"),
			| TopicRole::Request | TopicRole::Event => None,
		}
	}
}

impl fmt::Display for TopicRole {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			| TopicRole::Request => "request",
			| TopicRole::Accepted => "accepted",
			| TopicRole::Rejected => "rejected",
			| TopicRole::Event => "event",
		};
		f.write_str(name)
	}
}

/// Immutable description of one service interaction.
///
/// The template is the base topic with `{name}` placeholders for identifying
/// parameters, e.g. `$aws/things/{thingName}/jobs/{jobId}/get`. Response
/// topics append `/accepted` or `/rejected` to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OperationDescriptor {
	service: &'static str,
	name: &'static str,
	template: &'static str,
	kind: OperationKind,
}

impl OperationDescriptor {
	/// Describes a request with accepted/rejected responses.
	pub const fn request_response(
		service: &'static str,
		name: &'static str,
		template: &'static str,
	) -> Self {
		Self {
			service,
			name,
			template,
			kind: OperationKind::RequestResponse,
		}
	}

	/// Describes a service-originated event stream.
	pub const fn event(
		service: &'static str,
		name: &'static str,
		template: &'static str,
	) -> Self {
		Self {
			service,
			name,
			template,
			kind: OperationKind::Event,
		}
	}

	/// Service the operation belongs to.
	pub fn service(&self) -> &'static str {
		self.service
	}

	/// Operation name, used in errors and logs.
	pub fn name(&self) -> &'static str {
		self.name
	}

	/// Base topic template.
	pub fn template(&self) -> &'static str {
		self.template
	}

	/// Kind of interaction.
	pub fn kind(&self) -> OperationKind {
		self.kind
	}

	/// Whether a topic exists for `role`.
	pub fn supports(&self, role: TopicRole) -> bool {
		match self.kind {
			| OperationKind::RequestResponse => role != TopicRole::Event,
			| OperationKind::Event => role == TopicRole::Event,
		}
	}

	/// Names of the parameters the template requires, in order.
	pub fn parameter_names(&self) -> impl Iterator<Item = &'static str> {
		let template: &'static str = self.template;
		template.split('/').filter_map(|segment| {
			segment.strip_prefix('{').and_then(|s| s.strip_suffix('}'))
		})
	}

	/// Builds the topic for `role` from `params`.
	pub fn topic(
		&self,
		role: TopicRole,
		params: &TopicParams<'_>,
	) -> Result<ArcStr, TopicError> {
		build_topic(self, role, params)
	}
}

impl fmt::Display for OperationDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}::{}", self.service, self.name)
	}
}
