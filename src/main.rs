use srccheck::checksum::HashAlgorithm;
use srccheck::cli::{Cli, Command};
use srccheck::source_check::SourceCheck;
use std::fmt as stdfmt;
use std::io::{IsTerminal, stderr};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Event, Level, Subscriber, error, info};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt as tracing_fmt;
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::fmt::format::{FormatEvent, FormatFields, Writer};
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;

struct CheckExitCode;

impl CheckExitCode {
    /// Exit code used when verification finds mismatched checksums.
    fn mismatch() -> ExitCode {
        ExitCode::from(1)
    }

    /// Exit code used for other errors (I/O errors, invalid arguments, etc.).
    fn any_error() -> ExitCode {
        ExitCode::from(255)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let result: anyhow::Result<ExitCode> = match cli.command {
        Command::Generate {
            files,
            encrypt,
            algorithm,
            out_dir,
        } => handle_generate(files, encrypt, algorithm, out_dir),
        Command::Check {
            ref_file,
            key_file,
            algorithm,
        } => handle_check(ref_file, key_file, algorithm),
    };

    match result {
        Ok(exit_code) => exit_code,
        Err(err) => {
            error!("{err}");
            CheckExitCode::any_error()
        }
    }
}

fn handle_generate(
    files: Vec<PathBuf>,
    encrypt: bool,
    algorithm: HashAlgorithm,
    out_dir: Option<PathBuf>,
) -> anyhow::Result<ExitCode> {
    let mut checker = SourceCheck::new(algorithm);
    if let Some(dir) = out_dir {
        checker = checker.with_output_dir(dir);
    }

    checker.generate(&files, encrypt)?;

    Ok(ExitCode::SUCCESS)
}

fn handle_check(
    ref_file: PathBuf,
    key_file: Option<PathBuf>,
    algorithm: HashAlgorithm,
) -> anyhow::Result<ExitCode> {
    let mut checker = SourceCheck::new(algorithm);

    if checker.check(&ref_file, key_file.as_deref())? {
        info!("Verification successful: all checksums match");
        Ok(ExitCode::SUCCESS)
    } else {
        error!("Verification failed: checksum mismatches detected");
        Ok(CheckExitCode::mismatch())
    }
}

fn init_tracing(verbose: u8) {
    let stderr_is_terminal = stderr().is_terminal();
    let formatter = EmojiFormatter { stderr_is_terminal };

    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let fmt_layer = tracing_fmt::layer()
        .event_format(formatter)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

struct EmojiFormatter {
    stderr_is_terminal: bool,
}

impl<S, N> FormatEvent<S, N> for EmojiFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> stdfmt::Result {
        if self.stderr_is_terminal {
            match *event.metadata().level() {
                Level::DEBUG => write!(writer, "🔍 ")?,
                Level::INFO => write!(writer, "ℹ️ ")?,
                Level::WARN => write!(writer, "⚠️  ")?,
                Level::ERROR => write!(writer, "❌️ ")?,
                _ => {}
            }
        } else {
            match *event.metadata().level() {
                Level::DEBUG => writer.write_str("DEBUG: ")?,
                Level::INFO => writer.write_str("INFO: ")?,
                Level::WARN => writer.write_str("WARN: ")?,
                Level::ERROR => writer.write_str("ERROR: ")?,
                _ => {}
            }
        }

        ctx.format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
