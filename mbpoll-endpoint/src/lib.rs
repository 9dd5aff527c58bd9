//! Management endpoint support for mbpoll.
//!
//! This crate provides:
//! - `ObjectName` parsing, canonical ordering and pattern matching
//! - `SampledValue`, the closed set of attribute value shapes
//! - `ManagementEndpoint` trait (with a mock implementation for testing)
//! - `JolokiaEndpoint`, the HTTP/JSON adapter

pub mod endpoint;
pub mod jolokia;
pub mod object_name;
pub mod value;

pub use endpoint::{EndpointError, ManagementEndpoint, MockEndpoint, MockFailure};
pub use jolokia::{EndpointConfig, JolokiaEndpoint, DEFAULT_CONTEXT_PATH, DEFAULT_TIMEOUT_SECS};
pub use object_name::{ObjectName, ObjectNameError};
pub use value::{SampledValue, Scalar};
