//! Jolokia HTTP/JSON adapter.
//!
//! Every operation is a single POST of a JSON request object to the agent
//! URL. The agent wraps results as `{"status": 200, "value": ...}` and
//! failures as `{"status": 404, "error_type": "...", "error": "..."}`.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::endpoint::{BoxError, EndpointError, ManagementEndpoint};
use crate::object_name::ObjectName;
use crate::value::{SampledValue, Scalar};

/// Default agent path appended to `host:port` addresses.
pub const DEFAULT_CONTEXT_PATH: &str = "/jolokia";

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for a Jolokia agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    /// `host:port`, or a full `http://`/`https://` URL used verbatim.
    pub address: String,
    /// Path appended to `host:port` addresses.
    pub context_path: String,
    pub user: Option<String>,
    pub password: Option<String>,
    pub timeout: Duration,
}

impl EndpointConfig {
    /// Settings with default context path and timeout, no credentials.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            context_path: DEFAULT_CONTEXT_PATH.to_string(),
            user: None,
            password: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Agent URL requests are posted to.
    pub fn url(&self) -> String {
        let address = self.address.trim().trim_end_matches('/');
        if address.starts_with("http://") || address.starts_with("https://") {
            return address.to_string();
        }
        let path = self.context_path.trim_matches('/');
        if path.is_empty() {
            format!("http://{}/", address)
        } else {
            format!("http://{}/{}", address, path)
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Request<'a> {
    Version,
    Search { mbean: &'a str },
    Read { mbean: &'a str, attribute: &'a str },
}

#[derive(Debug, Deserialize)]
struct Response {
    status: u16,
    #[serde(default)]
    value: Value,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_type: Option<String>,
}

/// Open connection to a Jolokia agent.
///
/// The HTTP client is held for the lifetime of the value; dropping it
/// releases pooled connections.
pub struct JolokiaEndpoint {
    client: Client,
    url: String,
    credentials: Option<(String, Option<String>)>,
}

impl JolokiaEndpoint {
    /// Build the client and verify the agent answers a `version` request.
    pub fn connect(config: &EndpointConfig) -> Result<Self, EndpointError> {
        let url = config.url();
        let connection_error = |source: BoxError| EndpointError::Connection {
            target: url.clone(),
            source,
        };

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| connection_error(Box::new(e)))?;

        let endpoint = Self {
            client,
            url: url.clone(),
            credentials: config
                .user
                .clone()
                .map(|user| (user, config.password.clone())),
        };

        let response = endpoint
            .send(&Request::Version)
            .and_then(|r| check_status(r, &url, None))
            .map_err(|e| match e {
                EndpointError::Transport(source) => connection_error(source),
                other => connection_error(Box::new(other)),
            })?;

        let agent = response
            .get("agent")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        log::info!("connected to {} (agent {})", endpoint.url, agent);

        Ok(endpoint)
    }

    fn send(&self, request: &Request<'_>) -> Result<Response, EndpointError> {
        log::debug!("POST {} {:?}", self.url, request);

        let mut builder = self.client.post(&self.url).json(request);
        if let Some((user, password)) = &self.credentials {
            builder = builder.basic_auth(user, password.as_deref());
        }

        let http = builder
            .send()
            .map_err(|e| EndpointError::Transport(Box::new(e)))?;

        match http.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(EndpointError::AccessDenied(self.url.clone()))
            }
            status if !status.is_success() => {
                return Err(EndpointError::Protocol(format!("HTTP status {}", status)))
            }
            _ => {}
        }

        http.json::<Response>()
            .map_err(|e| EndpointError::Protocol(format!("invalid response body: {}", e)))
    }
}

impl Drop for JolokiaEndpoint {
    fn drop(&mut self) {
        log::debug!("releasing connection to {}", self.url);
    }
}

impl ManagementEndpoint for JolokiaEndpoint {
    fn query_names(
        &self,
        pattern: Option<&ObjectName>,
    ) -> Result<Vec<ObjectName>, EndpointError> {
        let all = ObjectName::wildcard();
        let mbean = pattern.unwrap_or(&all).as_str();
        let response = self.send(&Request::Search { mbean })?;
        let value = check_status(response, mbean, None)?;
        parse_names(value)
    }

    fn get_attribute(
        &self,
        name: &ObjectName,
        attribute: &str,
    ) -> Result<SampledValue, EndpointError> {
        let mbean = name.as_str();
        let response = self.send(&Request::Read { mbean, attribute })?;
        let value = check_status(response, mbean, Some(attribute))?;
        Ok(to_sampled(value))
    }
}

/// Turn a non-200 agent status into the matching error.
fn check_status(
    response: Response,
    mbean: &str,
    attribute: Option<&str>,
) -> Result<Value, EndpointError> {
    if response.status == 200 {
        return Ok(response.value);
    }

    let error_type = response.error_type.unwrap_or_default();
    let short_type = error_type.rsplit('.').next().unwrap_or_default().to_string();

    Err(match (short_type.as_str(), attribute) {
        ("InstanceNotFoundException", _) => EndpointError::ObjectNotFound(mbean.to_string()),
        ("AttributeNotFoundException", Some(attribute)) => EndpointError::AttributeNotFound {
            object: mbean.to_string(),
            attribute: attribute.to_string(),
        },
        ("SecurityException", _) => EndpointError::AccessDenied(mbean.to_string()),
        _ if response.status == 403 || response.status == 401 => {
            EndpointError::AccessDenied(mbean.to_string())
        }
        _ => EndpointError::Remote {
            message: response
                .error
                .unwrap_or_else(|| format!("status {}", response.status)),
            error_type: if error_type.is_empty() {
                "error".to_string()
            } else {
                error_type
            },
        },
    })
}

fn parse_names(value: Value) -> Result<Vec<ObjectName>, EndpointError> {
    let Value::Array(items) = value else {
        return Err(EndpointError::Protocol(
            "search result is not an array".to_string(),
        ));
    };

    items
        .iter()
        .map(|item| {
            let raw = item.as_str().ok_or_else(|| {
                EndpointError::Protocol(format!("search result entry is not a string: {}", item))
            })?;
            ObjectName::parse(raw).map_err(EndpointError::from)
        })
        .collect()
}

/// Convert a JSON value into the closed value shape.
///
/// Objects become composites in document order; the flattener sorts them.
fn to_sampled(value: Value) -> SampledValue {
    match value {
        Value::Null => SampledValue::null(),
        Value::Bool(b) => b.into(),
        // as_f64 also succeeds for u64, so large unsigned values stay as digits
        Value::Number(n) => match (n.as_i64(), n.as_u64(), n.as_f64()) {
            (Some(i), _, _) => Scalar::Integer(i).into(),
            (None, None, Some(x)) => Scalar::Float(x).into(),
            _ => Scalar::Text(n.to_string()).into(),
        },
        Value::String(s) => s.into(),
        Value::Array(items) => SampledValue::Array(items.into_iter().map(to_sampled).collect()),
        Value::Object(map) => {
            SampledValue::Composite(map.into_iter().map(|(k, v)| (k, to_sampled(v))).collect())
        }
    }
}
