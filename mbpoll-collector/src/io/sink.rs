//! Output sinks.
//!
//! Rows and listings go to the primary stream. The header goes to the
//! secondary stream, or to a header file when one is configured, so the
//! two can be redirected independently.

use std::io::{self, Write};
use std::path::PathBuf;

use mbpoll_fs::{Filesystem, FsError};
use thiserror::Error;

/// Errors from writing output.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to write row to standard output")]
    Primary(#[source] io::Error),

    #[error("failed to write header to standard error")]
    Secondary(#[source] io::Error),

    #[error("failed to write header file {}", path.display())]
    HeaderFile {
        path: PathBuf,
        #[source]
        source: FsError,
    },
}

/// Destination for rows and the header line.
pub trait OutputSink {
    /// Write one data row or listing line.
    fn write_row(&mut self, line: &str) -> Result<(), SinkError>;

    /// Write the header line. Called at most once per run.
    fn write_header(&mut self, line: &str) -> Result<(), SinkError>;
}

/// Sink over two byte streams plus an optional header file.
pub struct StreamSink<O, E, F> {
    primary: O,
    secondary: E,
    fs: F,
    header_file: Option<PathBuf>,
}

impl<F: Filesystem> StreamSink<io::Stdout, io::Stderr, F> {
    /// Rows to stdout, header to stderr or `header_file`.
    pub fn stdio(fs: F, header_file: Option<PathBuf>) -> Self {
        Self::new(io::stdout(), io::stderr(), fs, header_file)
    }
}

impl<O: Write, E: Write, F: Filesystem> StreamSink<O, E, F> {
    pub fn new(primary: O, secondary: E, fs: F, header_file: Option<PathBuf>) -> Self {
        Self {
            primary,
            secondary,
            fs,
            header_file,
        }
    }

    #[cfg(test)]
    fn into_streams(self) -> (O, E) {
        (self.primary, self.secondary)
    }
}

impl<O: Write, E: Write, F: Filesystem> OutputSink for StreamSink<O, E, F> {
    fn write_row(&mut self, line: &str) -> Result<(), SinkError> {
        writeln!(self.primary, "{}", line).map_err(SinkError::Primary)?;
        // one flush per row
        self.primary.flush().map_err(SinkError::Primary)
    }

    fn write_header(&mut self, line: &str) -> Result<(), SinkError> {
        match &self.header_file {
            Some(path) => {
                let data = format!("{}\n", line);
                self.fs
                    .write_atomic(path, data.as_bytes())
                    .map_err(|source| SinkError::HeaderFile {
                        path: path.clone(),
                        source,
                    })?;
                log::info!("header written to {}", path.display());
                Ok(())
            }
            None => {
                writeln!(self.secondary, "{}", line).map_err(SinkError::Secondary)?;
                self.secondary.flush().map_err(SinkError::Secondary)
            }
        }
    }
}

/// One line captured by `MockSink`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkLine {
    Row(String),
    Header(String),
}

/// Mock sink for testing that records every line in write order.
#[derive(Debug, Default)]
pub struct MockSink {
    lines: Vec<SinkLine>,
    fail_rows: bool,
}

impl MockSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose row writes always fail, like a closed pipe.
    pub fn failing() -> Self {
        Self {
            lines: Vec::new(),
            fail_rows: true,
        }
    }

    pub fn lines(&self) -> &[SinkLine] {
        &self.lines
    }

    pub fn rows(&self) -> Vec<&str> {
        self.lines
            .iter()
            .filter_map(|l| match l {
                SinkLine::Row(r) => Some(r.as_str()),
                SinkLine::Header(_) => None,
            })
            .collect()
    }

    pub fn headers(&self) -> Vec<&str> {
        self.lines
            .iter()
            .filter_map(|l| match l {
                SinkLine::Header(h) => Some(h.as_str()),
                SinkLine::Row(_) => None,
            })
            .collect()
    }
}

impl OutputSink for MockSink {
    fn write_row(&mut self, line: &str) -> Result<(), SinkError> {
        if self.fail_rows {
            return Err(SinkError::Primary(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "simulated broken pipe",
            )));
        }
        self.lines.push(SinkLine::Row(line.to_string()));
        Ok(())
    }

    fn write_header(&mut self, line: &str) -> Result<(), SinkError> {
        self.lines.push(SinkLine::Header(line.to_string()));
        Ok(())
    }
}
