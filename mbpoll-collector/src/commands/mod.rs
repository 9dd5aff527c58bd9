//! Command orchestration.
//!
//! Provides:
//! - `build_plan` - validate arguments and load the batch file
//! - `execute` - run the listing or the poll loop for a plan

pub mod list;
pub mod poll;

pub use list::{execute_list, list_names};
pub use poll::{run_poll_loop, PollError, PollOutcome, StopReason};

use mbpoll_clock::Clock;
use mbpoll_endpoint::{EndpointError, ManagementEndpoint};
use mbpoll_fs::Filesystem;
use thiserror::Error;

use crate::cli::{Cli, CliError, Mode, RunPlan};
use crate::io::{load_batch, BatchLoadError, OutputSink, SinkError};
use crate::signal::ShutdownCheck;
use crate::sleeper::Sleeper;

/// Errors from command execution.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("invalid argument")]
    InvalidArgument(#[from] CliError),

    #[error("invalid batch file")]
    Batch(#[from] BatchLoadError),

    #[error(transparent)]
    Endpoint(#[from] EndpointError),

    #[error(transparent)]
    Poll(#[from] PollError),

    #[error(transparent)]
    Output(#[from] SinkError),
}

/// Result of command execution.
pub type CommandResult<T> = Result<T, CommandError>;

/// What a completed run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Listed(usize),
    Polled(PollOutcome),
}

impl RunOutcome {
    /// True when the run ended because shutdown was requested.
    pub fn was_cancelled(&self) -> bool {
        matches!(
            self,
            RunOutcome::Polled(PollOutcome {
                stop: StopReason::Cancelled,
                ..
            })
        )
    }
}

/// Validate arguments and load the batch file. Nothing here touches the
/// network, so every configuration error surfaces before connecting.
pub fn build_plan<F: Filesystem + ?Sized>(cli: &Cli, fs: &F) -> CommandResult<RunPlan> {
    cli.validate()?;
    let batch = match &cli.file {
        Some(path) => Some(load_batch(fs, path)?),
        None => None,
    };
    Ok(cli.resolve(batch)?)
}

/// Execute a plan against a connected endpoint.
pub fn execute<E, O, S, H>(
    plan: &RunPlan,
    endpoint: &E,
    sink: &mut O,
    sleeper: &S,
    shutdown: &H,
    clock: &dyn Clock,
) -> CommandResult<RunOutcome>
where
    E: ManagementEndpoint + ?Sized,
    O: OutputSink + ?Sized,
    S: Sleeper + ?Sized,
    H: ShutdownCheck + ?Sized,
{
    match &plan.mode {
        Mode::ListNames { pattern } => {
            let count = execute_list(endpoint, pattern.as_ref(), sink)?;
            Ok(RunOutcome::Listed(count))
        }
        Mode::Poll {
            targets,
            interval_sec,
        } => {
            let clock = plan.timestamp.then_some(clock);
            let outcome = run_poll_loop(
                targets,
                *interval_sec,
                endpoint,
                sink,
                sleeper,
                shutdown,
                clock,
            )?;
            Ok(RunOutcome::Polled(outcome))
        }
    }
}
