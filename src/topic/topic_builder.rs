//! Deterministic topic construction from descriptors and parameters

use arcstr::ArcStr;
use smallvec::SmallVec;

use super::error::{TopicError, TopicResult};
use super::operation::{OperationDescriptor, TopicRole};
use super::validation;

/// Named parameter values for a topic template.
///
/// Values are optional so request structs can bind their fields directly; an
/// absent value for a parameter the template needs fails the build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicParams<'a> {
	values: SmallVec<[(&'static str, Option<&'a str>); 3]>,
}

impl<'a> TopicParams<'a> {
	/// Creates an empty parameter set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Binds `name` to `value`, replacing any earlier binding.
	pub fn with(mut self, name: &'static str, value: Option<&'a str>) -> Self {
		if let Some(pos) = self.values.iter().position(|(n, _)| *n == name) {
			self.values[pos].1 = value;
		} else {
			self.values.push((name, value));
		}
		self
	}

	/// Value bound to `name`, if present.
	pub fn get(&self, name: &str) -> Option<&'a str> {
		self.values
			.iter()
			.find(|(n, _)| *n == name)
			.and_then(|(_, value)| *value)
	}
}

/// Types that carry the identifying parameters of a topic.
///
/// Implemented by request and subscription-request structs.
pub trait TopicBinding {
	/// Parameters used to fill the operation's topic template.
	fn topic_params(&self) -> TopicParams<'_>;
}

impl TopicBinding for TopicParams<'_> {
	fn topic_params(&self) -> TopicParams<'_> {
		TopicParams {
			values: self.values.iter().map(|&(name, value)| (name, value)).collect(),
		}
	}
}

/// Builds the topic string for `role` of `descriptor`.
///
/// Pure and deterministic. Every placeholder must be bound to a valid value;
/// values can never contain `/`, `+` or `#`, so distinct parameter sets give
/// distinct topics.
pub fn build_topic(
	descriptor: &OperationDescriptor,
	role: TopicRole,
	params: &TopicParams<'_>,
) -> TopicResult<ArcStr> {
	if !descriptor.supports(role) {
		return Err(TopicError::RoleNotSupported {
			operation: descriptor.name(),
			role,
		});
	}

	let template = descriptor.template();
	let mut topic = String::with_capacity(template.len() + 48);

	for (index, segment) in template.split('/').enumerate() {
		if index > 0 {
			topic.push('/');
		}
		match placeholder(template, segment)? {
			| Some(name) => {
				let value = params.get(name).ok_or_else(|| {
					TopicError::missing_parameter(descriptor.name(), name)
				})?;
				validation::validate_parameter(name, value)?;
				topic.push_str(value);
			}
			| None => topic.push_str(segment),
		}
	}

	if let Some(suffix) = role.suffix() {
		topic.push('/');
		topic.push_str(suffix);
	}

	validation::validate_topic_length(&topic)?;
	Ok(ArcStr::from(topic))
}

fn placeholder(
	template: &'static str,
	segment: &'static str,
) -> TopicResult<Option<&'static str>> {
	match segment.strip_prefix('{') {
		| Some(rest) => match rest.strip_suffix('}') {
			| Some(name) if !name.is_empty() && !name.contains(['{', '}']) => {
				Ok(Some(name))
			}
			| _ => Err(TopicError::MalformedTemplate { template }),
		},
		| None if segment.contains(['{', '}']) => {
			Err(TopicError::MalformedTemplate { template })
		}
		| None => Ok(None),
	}
}
