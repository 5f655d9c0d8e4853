//! # quill CLI
//!
//! Writes content to a file, creating parent directories, and records every
//! attempt in an append-only log store.

use std::ffi::OsString;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{ArgAction, Parser};
use quill_config::logging::{init_logging, LogLevel};
use quill_config::Config;
use quill_config::{log_cli_debug, log_cli_warn};
use quill_core::FileAuditLog;

mod app;

use app::Invocation;

/// Quill - write content to a file and keep an audit trail
///
/// Options are only recognised before FILE_PATH; everything from FILE_PATH on
/// is taken literally, so content such as `-v` or `--strict` is written as is.
#[derive(Parser, Debug, Default)]
#[command(name = "quill")]
#[command(version, about, long_about = None)]
#[command(override_usage = "quill [OPTIONS] <FILE_PATH> <CONTENT>")]
struct Cli {
    /// Destination file (missing parent directories are created), then the
    /// content to write verbatim; further arguments are ignored
    #[arg(
        value_name = "ARGS",
        num_args = 0..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    args: Vec<OsString>,

    /// Log store path (default: terminal_log.log in the working directory)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Exit with status 1 when the write fails
    #[arg(long)]
    strict: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    show_config: bool,

    /// Increase diagnostic output on stderr (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    #[cfg(unix)]
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }

    let (cli, rejected) = match Cli::try_parse() {
        Ok(cli) => (cli, None),
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        // Anything clap rejects is a usage error, reported like missing arguments
        Err(err) => (Cli::default(), Some(err)),
    };
    init_logging(LogLevel::from_verbosity(cli.verbose));
    if let Some(err) = rejected {
        log_cli_warn!(
            "Rejected command line",
            error = tracing::field::debug(err.kind()),
        );
    }

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let mut config = Config::load_from(&cwd).context("Failed to load configuration")?;
    if let Some(log_file) = cli.log_file {
        config.audit.log_file = log_file;
    }
    if cli.strict {
        config.write.strict = true;
    }

    if cli.show_config {
        print!("{}", config.to_toml()?);
        return Ok(ExitCode::SUCCESS);
    }

    let audit = FileAuditLog::new(config.log_file_in(&cwd));
    log_cli_debug!(
        "Resolved log store",
        store = tracing::field::display(audit.path().display()),
        strict = config.write.strict,
    );

    let invocation = Invocation::from_args(cli.args);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let outcome = app::run(invocation, &audit, &mut out).context("Failed to write to stdout")?;
    out.flush().context("Failed to write to stdout")?;

    Ok(ExitCode::from(outcome.exit_code(config.write.strict)))
}
