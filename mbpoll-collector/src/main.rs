//! mbpoll binary.
//!
//! Entry point for the `mbpoll` command-line tool.

use std::process::ExitCode;

use clap::Parser;
use mbpoll_clock::SystemClock;
use mbpoll_collector::exit::{codes, exit_code, format_error_chain};
use mbpoll_collector::io::StreamSink;
use mbpoll_collector::logger::{self, Verbosity};
use mbpoll_collector::{
    build_plan, execute, Cli, CommandError, RealSleeper, RunOutcome, ShutdownFlag,
};
use mbpoll_endpoint::JolokiaEndpoint;
use mbpoll_fs::RealFilesystem;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version are not errors
            let code = if e.use_stderr() {
                codes::INVALID_ARGS
            } else {
                codes::SUCCESS
            };
            let _ = e.print();
            return ExitCode::from(code as u8);
        }
    };

    logger::init(Verbosity::from_count(cli.verbose));

    match run(&cli) {
        Ok(outcome) if outcome.was_cancelled() => ExitCode::from(codes::SIGINT as u8),
        Ok(_) => ExitCode::from(codes::SUCCESS as u8),
        Err(e) => {
            eprintln!("{}", format_error_chain(&e));
            ExitCode::from(exit_code(&e) as u8)
        }
    }
}

fn run(cli: &Cli) -> Result<RunOutcome, CommandError> {
    let fs = RealFilesystem;
    let plan = build_plan(cli, &fs)?;

    // Only an endless poll needs Ctrl+C handling; single runs keep the
    // default behaviour of terminating immediately.
    let shutdown = if plan.is_continuous() {
        ShutdownFlag::install()
    } else {
        ShutdownFlag::manual()
    };

    let endpoint = JolokiaEndpoint::connect(&plan.endpoint)?;

    let mut sink = StreamSink::stdio(fs, plan.header_file.clone());
    execute(
        &plan,
        &endpoint,
        &mut sink,
        &RealSleeper::new(),
        &shutdown,
        &SystemClock,
    )
}
