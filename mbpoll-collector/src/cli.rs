//! CLI argument parsing for mbpoll.
//!
//! Operands are positional and order-significant:
//!
//! ```text
//! mbpoll <ENDPOINT>                                    list object names
//! mbpoll <ENDPOINT> <OBJECT> <ATTR[,ATTR...]> [INTERVAL] poll attributes
//! mbpoll --file <BATCH> <ENDPOINT> [INTERVAL]          poll batch targets
//! ```
//!
//! An interval of 0, or none at all, samples once and exits.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser};
use mbpoll_endpoint::{
    EndpointConfig, ObjectName, ObjectNameError, DEFAULT_CONTEXT_PATH, DEFAULT_TIMEOUT_SECS,
};
use thiserror::Error;

use crate::target::ObjectAttributeRef;

/// Largest accepted per-request timeout (one day).
pub const MAX_TIMEOUT_SECS: u64 = 86_400;

/// Separator between attribute names in the attribute operand.
pub const ATTRIBUTE_SEPARATOR: char = ',';

/// Errors from CLI argument validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CliError {
    #[error("endpoint must not be blank")]
    BlankEndpoint,

    #[error("timeout-sec must be between 1 and {max}, got {0}", max = MAX_TIMEOUT_SECS)]
    InvalidTimeout(u64),

    #[error("poll interval must be a non-negative whole number of seconds, got {0:?}")]
    InvalidInterval(String),

    #[error("object name [{0}] given without attribute names")]
    MissingAttributes(String),

    #[error("empty attribute name in {0:?}")]
    EmptyAttributeName(String),

    #[error(
        "a batch file takes only the endpoint and an optional interval, \
         got {0} extra operand(s)"
    )]
    BatchConflict(usize),

    #[error("batch file contains no targets")]
    EmptyBatch,

    #[error("--pattern applies only when listing object names")]
    PatternWithoutListing,

    #[error("invalid --pattern {pattern:?}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: ObjectNameError,
    },
}

/// Poll managed-object attributes through a Jolokia agent and print them as CSV rows.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "mbpoll")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Agent address: host:port, or a full http:// or https:// URL.
    pub endpoint: String,

    /// OBJECT ATTRIBUTES [INTERVAL], or only [INTERVAL] with --file.
    /// ATTRIBUTES is a comma-separated list; INTERVAL is in seconds.
    #[arg(value_name = "OPERANDS", num_args = 0..=3)]
    pub operands: Vec<String>,

    /// Batch file of `object<TAB>attribute` lines.
    #[arg(short, long, env = "MBPOLL_FILE")]
    pub file: Option<PathBuf>,

    /// Write the header line to this file instead of standard error.
    /// Standard error also carries log output (-v), so this file is the
    /// clean header channel.
    #[arg(long)]
    pub header_file: Option<PathBuf>,

    /// Only list object names matching this pattern (e.g. `java.lang:type=*`).
    #[arg(long)]
    pub pattern: Option<String>,

    /// Prefix every row with an RFC 3339 UTC timestamp column.
    #[arg(long)]
    pub timestamp: bool,

    /// Agent path appended to host:port endpoints.
    #[arg(long, default_value = DEFAULT_CONTEXT_PATH)]
    pub context_path: String,

    /// User for HTTP basic authentication.
    #[arg(short, long, env = "MBPOLL_USER")]
    pub user: Option<String>,

    /// Password for HTTP basic authentication.
    #[arg(long, env = "MBPOLL_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_sec: u64,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// What a run does once connected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Print object names, sorted, one per line.
    ListNames { pattern: Option<ObjectName> },
    /// Sample targets every `interval_sec` seconds; 0 means once.
    Poll {
        targets: Vec<ObjectAttributeRef>,
        interval_sec: u64,
    },
}

/// Fully validated invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    pub endpoint: EndpointConfig,
    pub mode: Mode,
    pub header_file: Option<PathBuf>,
    pub timestamp: bool,
}

impl RunPlan {
    /// True when the run keeps polling until interrupted.
    pub fn is_continuous(&self) -> bool {
        matches!(self.mode, Mode::Poll { interval_sec, .. } if interval_sec > 0)
    }
}

impl Cli {
    /// Validate everything that does not need the batch file contents.
    pub fn validate(&self) -> Result<(), CliError> {
        if self.endpoint.trim().is_empty() {
            return Err(CliError::BlankEndpoint);
        }
        if !(1..=MAX_TIMEOUT_SECS).contains(&self.timeout_sec) {
            return Err(CliError::InvalidTimeout(self.timeout_sec));
        }
        if self.file.is_some() && self.operands.len() > 1 {
            return Err(CliError::BatchConflict(self.operands.len() - 1));
        }
        if self.pattern.is_some() && !self.is_listing() {
            return Err(CliError::PatternWithoutListing);
        }
        Ok(())
    }

    /// True when only the endpoint was given.
    pub fn is_listing(&self) -> bool {
        self.file.is_none() && self.operands.is_empty()
    }

    /// Endpoint connection settings.
    pub fn endpoint_config(&self) -> EndpointConfig {
        EndpointConfig {
            address: self.endpoint.trim().to_string(),
            context_path: self.context_path.clone(),
            user: self.user.clone(),
            password: self.password.clone(),
            timeout: Duration::from_secs(self.timeout_sec),
        }
    }

    /// Build the run plan. `batch` holds the targets loaded from `--file`.
    pub fn resolve(&self, batch: Option<Vec<ObjectAttributeRef>>) -> Result<RunPlan, CliError> {
        self.validate()?;

        let mode = match batch {
            Some(targets) => {
                if targets.is_empty() {
                    return Err(CliError::EmptyBatch);
                }
                let interval_sec = parse_interval(self.operands.first().map(String::as_str))?;
                Mode::Poll {
                    targets,
                    interval_sec,
                }
            }
            None => match self.operands.as_slice() {
                [] => Mode::ListNames {
                    pattern: self.pattern.as_deref().map(parse_pattern).transpose()?,
                },
                [object] => return Err(CliError::MissingAttributes(object.clone())),
                [object, attributes, rest @ ..] => Mode::Poll {
                    targets: split_attributes(object, attributes)?,
                    interval_sec: parse_interval(rest.first().map(String::as_str))?,
                },
            },
        };

        Ok(RunPlan {
            endpoint: self.endpoint_config(),
            mode,
            header_file: self.header_file.clone(),
            timestamp: self.timestamp,
        })
    }
}

/// Parse the interval operand. Absent or blank means single-shot.
pub fn parse_interval(value: Option<&str>) -> Result<u64, CliError> {
    match value.map(str::trim) {
        None | Some("") => Ok(0),
        Some(v) => v
            .parse::<u64>()
            .map_err(|_| CliError::InvalidInterval(v.to_string())),
    }
}

/// One target per comma-separated attribute name, in the order given.
pub fn split_attributes(
    object: &str,
    attributes: &str,
) -> Result<Vec<ObjectAttributeRef>, CliError> {
    attributes
        .split(ATTRIBUTE_SEPARATOR)
        .map(str::trim)
        .map(|attribute| {
            if attribute.is_empty() {
                Err(CliError::EmptyAttributeName(attributes.to_string()))
            } else {
                Ok(ObjectAttributeRef::new(object, attribute))
            }
        })
        .collect()
}

fn parse_pattern(pattern: &str) -> Result<ObjectName, CliError> {
    ObjectName::parse(pattern).map_err(|source| CliError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Parse CLI arguments from an iterator of strings.
/// Useful for testing.
pub fn parse_from<I, T>(iter: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(iter)
}
