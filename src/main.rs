use anyhow::Context;
use clap::Parser;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use testit::{demo, reporter_for, OutputFormat, ReportOptions, Status, Suite};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "testit")]
#[command(about = "Runs the testit walkthrough suite and reports the result tree")]
#[command(version)]
struct Cli {
    /// Output format
    #[arg(long = "output-format", value_enum, default_value = "text")]
    output_format: OutputFormat,

    /// Expand passing tests and groups in text output
    #[arg(long, short)]
    verbose: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Write the report to a file instead of stdout
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Write logs to a file instead of stderr
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

/// Logs go to stderr unless a log file is given. `RUST_LOG` overrides the
/// default `warn` level.
fn init_logging(log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let registry = tracing_subscriber::registry().with(filter);

    match log_file {
        Some(path) => {
            let name = path
                .file_name()
                .with_context(|| format!("log file path has no file name: {}", path.display()))?;
            let dir = path
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let appender = tracing_appender::rolling::never(dir, name);
            registry
                .with(
                    fmt::layer()
                        .with_writer(appender)
                        .with_ansi(false)
                        .with_target(true)
                        .with_line_number(true),
                )
                .init();
        }
        None => registry.with(fmt::layer().with_writer(io::stderr)).init(),
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;

    let out: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(
            File::create(path)
                .with_context(|| format!("failed to create report file {}", path.display()))?,
        ),
        None => Box::new(io::stdout()),
    };
    let options = ReportOptions {
        output_format: cli.output_format,
        verbose: cli.verbose,
        color: !cli.no_color && cli.output.is_none(),
    };

    let mut suite = Suite::with_boxed_reporter(reporter_for(options, out));
    demo::walkthrough(&mut suite);
    suite.done()?;

    let passed = suite.root().status == Status::Pass;
    std::process::exit(if passed { 0 } else { 1 });
}
