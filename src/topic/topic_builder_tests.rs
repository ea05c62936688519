//! Tests for topic construction

use std::collections::HashSet;

use super::{OperationDescriptor, TopicError, TopicParams, TopicRole, build_topic};

const DESCRIBE: OperationDescriptor = OperationDescriptor::request_response(
	"jobs",
	"DescribeJobExecution",
	"$aws/things/{thingName}/jobs/{jobId}/get",
);

const DELTA: OperationDescriptor = OperationDescriptor::event(
	"shadow",
	"ShadowDeltaUpdated",
	"$aws/things/{thingName}/shadow/update/delta",
);

fn params<'a>(thing: &'a str, job: &'a str) -> TopicParams<'a> {
	TopicParams::new()
		.with("thingName", Some(thing))
		.with("jobId", Some(job))
}

mod building {
	use super::*;

	#[test]
	fn request_topic_substitutes_parameters() {
		let topic =
			build_topic(&DESCRIBE, TopicRole::Request, &params("T1", "job-7"))
				.unwrap();
		assert_eq!(topic, "$aws/things/T1/jobs/job-7/get");
	}

	#[test]
	fn response_topics_append_role_suffix() {
		let p = params("T1", "job-7");
		assert_eq!(
			build_topic(&DESCRIBE, TopicRole::Accepted, &p).unwrap(),
			"$aws/things/T1/jobs/job-7/get/accepted"
		);
		assert_eq!(
			build_topic(&DESCRIBE, TopicRole::Rejected, &p).unwrap(),
			"$aws/things/T1/jobs/job-7/get/rejected"
		);
	}

	#[test]
	fn event_topic_has_no_suffix() {
		let p = TopicParams::new().with("thingName", Some("lamp"));
		assert_eq!(
			build_topic(&DELTA, TopicRole::Event, &p).unwrap(),
			"$aws/things/lamp/shadow/update/delta"
		);
	}

	#[test]
	fn building_is_deterministic() {
		let p = params("T1", "job-7");
		let first = build_topic(&DESCRIBE, TopicRole::Accepted, &p).unwrap();
		let second = build_topic(&DESCRIBE, TopicRole::Accepted, &p).unwrap();
		assert_eq!(first, second);
	}

	#[test]
	fn later_binding_replaces_earlier_one() {
		let p = params("T1", "job-7").with("thingName", Some("T2"));
		assert_eq!(
			build_topic(&DESCRIBE, TopicRole::Request, &p).unwrap(),
			"$aws/things/T2/jobs/job-7/get"
		);
	}

	#[test]
	fn parameter_names_follow_template_order() {
		let names: Vec<_> = DESCRIBE.parameter_names().collect();
		assert_eq!(names, ["thingName", "jobId"]);
		assert_eq!(DELTA.parameter_names().count(), 1);
	}
}

mod uniqueness {
	use super::*;

	#[test]
	fn distinct_parameters_never_collide() {
		let things = ["T1", "T2", "T1-", "t1", "T10", "T1.b", "T1:x"];
		let jobs = ["a", "b", "ab", "a-b"];
		let mut seen = HashSet::new();
		for thing in things {
			for job in jobs {
				for role in [TopicRole::Request, TopicRole::Accepted] {
					let topic =
						build_topic(&DESCRIBE, role, &params(thing, job)).unwrap();
					assert!(seen.insert(topic.clone()), "collision on {topic}");
				}
			}
		}
		assert_eq!(seen.len(), things.len() * jobs.len() * 2);
	}

	#[test]
	fn separator_injection_is_rejected() {
		// Without validation "T1/jobs/x" + "get" would alias another thing's topic.
		for bad in ["T1/jobs/x", "T1/", "/T1"] {
			let err = build_topic(&DESCRIBE, TopicRole::Request, &params(bad, "x"))
				.unwrap_err();
			assert!(
				matches!(
					err,
					TopicError::InvalidParameter {
						parameter: "thingName",
						..
					}
				),
				"{bad} accepted"
			);
		}
	}

	#[test]
	fn wildcards_and_control_characters_are_rejected() {
		for bad in ["+", "#", "T+1", "T1#", "T1\0", "T1\n"] {
			assert!(
				build_topic(&DESCRIBE, TopicRole::Accepted, &params(bad, "x"))
					.is_err(),
				"{bad:?} accepted"
			);
		}
	}

	#[test]
	fn empty_and_oversized_values_are_rejected() {
		assert!(
			build_topic(&DESCRIBE, TopicRole::Request, &params("", "x")).is_err()
		);
		let long = "x".repeat(crate::topic::limits::MAX_PARAMETER_LENGTH + 1);
		assert!(
			build_topic(&DESCRIBE, TopicRole::Request, &params(&long, "x"))
				.is_err()
		);
	}
}

mod failures {
	use super::*;

	#[test]
	fn missing_parameter_is_reported() {
		let p = TopicParams::new().with("thingName", Some("T1"));
		assert_eq!(
			build_topic(&DESCRIBE, TopicRole::Request, &p),
			Err(TopicError::missing_parameter("DescribeJobExecution", "jobId"))
		);

		let unset = TopicParams::new()
			.with("thingName", None)
			.with("jobId", Some("x"));
		assert_eq!(
			build_topic(&DESCRIBE, TopicRole::Request, &unset),
			Err(TopicError::missing_parameter(
				"DescribeJobExecution",
				"thingName"
			))
		);
	}

	#[test]
	fn roles_are_checked_against_operation_kind() {
		let p = TopicParams::new().with("thingName", Some("T1"));
		assert_eq!(
			build_topic(&DELTA, TopicRole::Accepted, &p),
			Err(TopicError::RoleNotSupported {
				operation: "ShadowDeltaUpdated",
				role: TopicRole::Accepted,
			})
		);
		assert!(
			build_topic(&DESCRIBE, TopicRole::Event, &params("T1", "j"))
				.is_err()
		);
	}

	#[test]
	fn malformed_template_is_reported() {
		const BROKEN: OperationDescriptor = OperationDescriptor::event(
			"test",
			"Broken",
			"things/{thingName/events",
		);
		let p = TopicParams::new().with("thingName", Some("T1"));
		assert!(matches!(
			build_topic(&BROKEN, TopicRole::Event, &p),
			Err(TopicError::MalformedTemplate { .. })
		));
	}

	#[test]
	fn overlong_topic_is_reported() {
		const DEEP: OperationDescriptor = OperationDescriptor::event(
			"test",
			"Deep",
			"{a}/{b}/{c}",
		);
		let value = "v".repeat(crate::topic::limits::MAX_PARAMETER_LENGTH);
		let p = TopicParams::new()
			.with("a", Some(value.as_str()))
			.with("b", Some(value.as_str()))
			.with("c", Some(value.as_str()));
		assert!(matches!(
			build_topic(&DEEP, TopicRole::Event, &p),
			Err(TopicError::TooLong { .. })
		));
	}
}

mod raw_topics {
	use crate::topic::validation::validate_topic;

	use super::*;

	#[test]
	fn concrete_topics_are_accepted() {
		assert!(validate_topic("$aws/things/T1/shadow/update/delta").is_ok());
		assert!(validate_topic("sensors/lamp").is_ok());
	}

	#[test]
	fn wildcard_filters_are_rejected() {
		for topic in ["$aws/things/+/shadow/update/delta", "sensors/#", "#"] {
			assert!(
				matches!(
					validate_topic(topic),
					Err(TopicError::InvalidTopic { .. })
				),
				"{topic} should be rejected"
			);
		}
	}

	#[test]
	fn empty_and_overlong_topics_are_rejected() {
		assert!(matches!(
			validate_topic(""),
			Err(TopicError::InvalidTopic { .. })
		));
		let long = "t".repeat(crate::topic::limits::MAX_TOPIC_LENGTH + 1);
		assert!(matches!(
			validate_topic(&long),
			Err(TopicError::TooLong { .. })
		));
	}
}
