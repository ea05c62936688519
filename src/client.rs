//! IoT client module
//!
//! Provides the shared client context, configuration, the publisher and the
//! generic operation client the service clients are built on.

/// Shared client context and MQTT event loop
pub mod async_client;
/// Connection and client-level settings
pub mod config;
/// Client error types
pub mod error;
/// Typed operations and the operation client
pub mod operation;
/// Typed publishing
pub mod publisher;
mod subscriber;

pub use async_client::IotClient;
pub use config::{ClientSettings, IotClientConfig};
pub use error::{ConnectionEstablishmentError, IotClientError};
pub use operation::{EventStream, Operation, OperationClient};
pub use publisher::Publisher;
