//! Poll command.
//!
//! Runs collection cycles until the single shot completes, a cycle fails,
//! or shutdown is requested. The first cycle's row is written before the
//! header it taught, and the header is written exactly once.

use mbpoll_clock::Clock;
use mbpoll_endpoint::ManagementEndpoint;
use thiserror::Error;

use crate::collector::collect_row;
use crate::header::HeaderTracker;
use crate::io::{OutputSink, SinkError};
use crate::sampler::SampleError;
use crate::signal::ShutdownCheck;
use crate::sleeper::Sleeper;
use crate::target::ObjectAttributeRef;

/// Seconds slept between shutdown checks while waiting for the next cycle.
pub const SLEEP_STEP_SEC: u64 = 1;

/// Errors that end a poll run.
#[derive(Debug, Error)]
pub enum PollError {
    #[error("poll cycle {cycle} failed")]
    Sample {
        cycle: u64,
        #[source]
        source: SampleError,
    },

    #[error(transparent)]
    Output(#[from] SinkError),
}

/// Why the loop stopped without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Interval was 0: one cycle, then done.
    SingleShot,
    /// Shutdown was requested.
    Cancelled,
}

/// Result of a poll run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOutcome {
    /// Number of rows written.
    pub cycles: u64,
    pub stop: StopReason,
}

/// Run the poll loop.
///
/// `interval_sec == 0` samples exactly once. Otherwise cycles repeat every
/// `interval_sec` seconds, checking `shutdown` before each cycle and after
/// every second of waiting.
pub fn run_poll_loop<E, O, S, H>(
    targets: &[ObjectAttributeRef],
    interval_sec: u64,
    endpoint: &E,
    sink: &mut O,
    sleeper: &S,
    shutdown: &H,
    clock: Option<&dyn Clock>,
) -> Result<PollOutcome, PollError>
where
    E: ManagementEndpoint + ?Sized,
    O: OutputSink + ?Sized,
    S: Sleeper + ?Sized,
    H: ShutdownCheck + ?Sized,
{
    let mut header = HeaderTracker::new();
    let mut cycles: u64 = 0;

    log::info!(
        "polling {} target(s), interval {}s",
        targets.len(),
        interval_sec
    );

    loop {
        if shutdown.should_stop() {
            return Ok(cancelled(cycles));
        }

        let row = collect_row(targets, endpoint, &mut header, clock).map_err(|source| {
            PollError::Sample {
                cycle: cycles + 1,
                source,
            }
        })?;
        cycles += 1;

        if !header.is_learning() && row.len() != header.current_header().len() {
            log::warn!(
                "cycle {} produced {} cells but the header has {} columns",
                cycles,
                row.len(),
                header.current_header().len()
            );
        }

        sink.write_row(&row.to_string())?;

        if header.freeze() {
            log::debug!("header frozen with {} columns", header.current_header().len());
            sink.write_header(&header.header_line())?;
        }

        if interval_sec == 0 {
            return Ok(PollOutcome {
                cycles,
                stop: StopReason::SingleShot,
            });
        }

        let mut waited = 0;
        while waited < interval_sec {
            if shutdown.should_stop() {
                return Ok(cancelled(cycles));
            }
            let step = SLEEP_STEP_SEC.min(interval_sec - waited);
            sleeper.sleep_sec(step);
            waited += step;
        }
    }
}

fn cancelled(cycles: u64) -> PollOutcome {
    log::info!("shutdown requested after {} cycle(s)", cycles);
    PollOutcome {
        cycles,
        stop: StopReason::Cancelled,
    }
}
