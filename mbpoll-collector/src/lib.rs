//! mbpoll collector.
//!
//! Polls managed-object attributes through a management endpoint and prints
//! them as comma-separated rows with a header learned from the first cycle.
//! This crate holds argument handling, flattening, the poll loop and the
//! output sinks; the `mbpoll` binary wires them to real collaborators.

pub mod cli;
pub mod collector;
pub mod commands;
pub mod exit;
pub mod flatten;
pub mod header;
pub mod io;
pub mod logger;
pub mod sampler;
pub mod signal;
pub mod sleeper;
pub mod target;

pub use cli::{parse_from, Cli, CliError, Mode, RunPlan};
pub use collector::{collect_row, Row, TIMESTAMP_LABEL};
pub use commands::{
    build_plan, execute, CommandError, CommandResult, PollError, PollOutcome, RunOutcome,
    StopReason,
};
pub use flatten::{flatten, Cell};
pub use header::HeaderTracker;
pub use sampler::{sample, SampleError};
pub use signal::{ShutdownCheck, ShutdownFlag};
pub use sleeper::{RealSleeper, Sleeper};
pub use target::ObjectAttributeRef;
