//! Management endpoint abstraction.
//!
//! This module provides:
//! - `ManagementEndpoint` trait with the two operations the poller needs
//! - `EndpointError` covering connection and resolution failures
//! - `MockEndpoint` for testing

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use thiserror::Error;

use crate::object_name::{ObjectName, ObjectNameError};
use crate::value::SampledValue;

/// Boxed underlying cause.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors from endpoint operations.
#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("cannot connect to management endpoint [{target}]")]
    Connection {
        target: String,
        #[source]
        source: BoxError,
    },

    #[error("request to management endpoint failed")]
    Transport(#[source] BoxError),

    #[error("cannot find object name [{0}]")]
    ObjectNotFound(String),

    #[error("cannot find attribute [{attribute}] on [{object}]")]
    AttributeNotFound { object: String, attribute: String },

    #[error("access denied to [{0}]")]
    AccessDenied(String),

    #[error(transparent)]
    MalformedName(#[from] ObjectNameError),

    #[error("unexpected response from management endpoint: {0}")]
    Protocol(String),

    #[error("management endpoint reported {error_type}: {message}")]
    Remote { error_type: String, message: String },
}

impl EndpointError {
    /// True for failures to establish the connection, as opposed to failures
    /// resolving a particular object or attribute.
    pub fn is_connection(&self) -> bool {
        matches!(self, EndpointError::Connection { .. })
    }
}

/// Trait for talking to a remote managed-object server.
pub trait ManagementEndpoint: Send + Sync {
    /// List object names, optionally restricted to those matching `pattern`.
    /// Order is unspecified.
    fn query_names(&self, pattern: Option<&ObjectName>) -> Result<Vec<ObjectName>, EndpointError>;

    /// Fetch the current value of one attribute.
    fn get_attribute(&self, name: &ObjectName, attribute: &str)
        -> Result<SampledValue, EndpointError>;
}

/// Failure kinds a `MockEndpoint` can be scripted to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    ObjectNotFound,
    AttributeNotFound,
    AccessDenied,
    Transport,
}

#[derive(Debug, Clone)]
enum MockResponse {
    Value(SampledValue),
    Fail(MockFailure),
}

/// Mock endpoint for testing.
///
/// Each (object, attribute) pair holds a queue of responses; every call
/// consumes the front of the queue except the last entry, which repeats.
#[derive(Debug, Default)]
pub struct MockEndpoint {
    names: Vec<ObjectName>,
    responses: Mutex<HashMap<(String, String), VecDeque<MockResponse>>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl MockEndpoint {
    /// Create a new empty mock endpoint.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an object name for listing without any attributes.
    pub fn with_name(mut self, name: &str) -> Self {
        self.register(name);
        self
    }

    /// Register an attribute value. Repeated calls for the same pair queue
    /// further values for later cycles.
    pub fn with_attribute(
        self,
        name: &str,
        attribute: &str,
        value: impl Into<SampledValue>,
    ) -> Self {
        self.push(name, attribute, MockResponse::Value(value.into()))
    }

    /// Queue a failure for an attribute.
    pub fn with_failure(self, name: &str, attribute: &str, failure: MockFailure) -> Self {
        self.push(name, attribute, MockResponse::Fail(failure))
    }

    /// All `(object, attribute)` pairs requested so far, in call order.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    fn push(mut self, name: &str, attribute: &str, response: MockResponse) -> Self {
        let key = self.register(name);
        self.responses
            .get_mut()
            .unwrap()
            .entry((key, attribute.to_string()))
            .or_default()
            .push_back(response);
        self
    }

    fn register(&mut self, name: &str) -> String {
        let parsed = ObjectName::parse(name).expect("mock object names must be valid");
        let key = parsed.canonical_name().to_string();
        if !self.names.contains(&parsed) {
            self.names.push(parsed);
        }
        key
    }
}

impl ManagementEndpoint for MockEndpoint {
    fn query_names(&self, pattern: Option<&ObjectName>) -> Result<Vec<ObjectName>, EndpointError> {
        Ok(self
            .names
            .iter()
            .filter(|n| pattern.map_or(true, |p| n.matches(p)))
            .cloned()
            .collect())
    }

    fn get_attribute(
        &self,
        name: &ObjectName,
        attribute: &str,
    ) -> Result<SampledValue, EndpointError> {
        self.calls
            .lock()
            .unwrap()
            .push((name.to_string(), attribute.to_string()));

        if !self.names.contains(name) {
            return Err(EndpointError::ObjectNotFound(name.to_string()));
        }

        let mut responses = self.responses.lock().unwrap();
        let queue = responses
            .get_mut(&(name.canonical_name().to_string(), attribute.to_string()))
            .ok_or_else(|| EndpointError::AttributeNotFound {
                object: name.to_string(),
                attribute: attribute.to_string(),
            })?;

        let response = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };

        match response {
            Some(MockResponse::Value(v)) => Ok(v),
            Some(MockResponse::Fail(failure)) => Err(match failure {
                MockFailure::ObjectNotFound => EndpointError::ObjectNotFound(name.to_string()),
                MockFailure::AttributeNotFound => EndpointError::AttributeNotFound {
                    object: name.to_string(),
                    attribute: attribute.to_string(),
                },
                MockFailure::AccessDenied => EndpointError::AccessDenied(name.to_string()),
                MockFailure::Transport => EndpointError::Transport("simulated failure".into()),
            }),
            None => Err(EndpointError::Protocol("empty mock response queue".to_string())),
        }
    }
}
