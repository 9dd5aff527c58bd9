//! Exit codes for the mbpoll CLI.

use std::error::Error;

use crate::commands::CommandError;

/// Exit code constants.
pub mod codes {
    /// Successful execution.
    pub const SUCCESS: i32 = 0;
    /// Invalid arguments or batch file; nothing was contacted.
    pub const INVALID_ARGS: i32 = 1;
    /// Connection, resolution or output failure.
    pub const RUNTIME_ERROR: i32 = 2;
    /// Interrupted by signal (128 + signal number).
    pub const SIGINT: i32 = 130;
}

/// Map a CommandError to an exit code.
pub fn exit_code(error: &CommandError) -> i32 {
    match error {
        CommandError::InvalidArgument(_) | CommandError::Batch(_) => codes::INVALID_ARGS,
        CommandError::Endpoint(_) | CommandError::Poll(_) | CommandError::Output(_) => {
            codes::RUNTIME_ERROR
        }
    }
}

/// Render an error and its source chain, one `caused by:` line per link.
pub fn format_error_chain(error: &dyn Error) -> String {
    let mut message = format!("error: {}", error);
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(&format!("\ncaused by: {}", cause));
        source = cause.source();
    }
    message
}
