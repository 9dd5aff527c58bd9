//! IO helpers for the CLI.
//!
//! Provides:
//! - Loading batch files of targets
//! - Writing rows and the header to their sinks

pub mod batch_loader;
pub mod sink;

pub use batch_loader::{load_batch, parse_batch, BatchLoadError};
pub use sink::{MockSink, OutputSink, SinkError, SinkLine, StreamSink};
