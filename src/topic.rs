//! Topic handling module
//!
//! Maps operation descriptors and identifying parameters (thing name, job id,
//! shadow name) onto concrete MQTT topic strings.

pub mod error;
pub mod operation;
pub mod topic_builder;

#[cfg(test)]
mod topic_builder_tests;

pub use error::{TopicError, TopicResult};
pub use error::{limits, validation};
pub use operation::{OperationDescriptor, OperationKind, TopicRole};
pub use topic_builder::{TopicBinding, TopicParams, build_topic};
