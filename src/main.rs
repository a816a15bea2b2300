// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, debug, info, warn};
use std::io::Write;
use std::path::PathBuf;

use ttml2srt::app_config::{self, Config};
use ttml2srt::errors::AppError;
use ttml2srt::{ConversionOutcome, Controller};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completions for ttml2srt
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// ttml2srt - convert TTML subtitles to SubRip
#[derive(Parser, Debug)]
#[command(name = "ttml2srt")]
#[command(version)]
#[command(about = "Convert TTML (Timed Text Markup Language) subtitles to SRT")]
#[command(long_about = "ttml2srt renders TTML subtitle documents into SRT cues, keeping colors and italics.

EXAMPLES:
    ttml2srt -i movie.ttml -o movie.srt          # Convert one file
    ttml2srt -i movie.ttml --std-out             # Print the SRT to stdout
    ttml2srt -g 'subs/*.xml'                     # Convert a batch to ./<name>.srt
    ttml2srt -g 'subs/**/*.ttml' -f '{dir}/{filename}.srt'
    ttml2srt completions bash > ttml2srt.bash    # Generate bash completions

OUTPUT FORMAT PLACEHOLDERS:
    {filename}  input basename without extension
    {ext}       input extension, including the dot
    {dir}       absolute directory of the input
    {file}      input basename with extension")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// The TTML file to convert
    #[arg(short, long, value_name = "INPUT")]
    input: Option<PathBuf>,

    /// The file to store the output in
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Print output to stdout
    #[arg(long)]
    std_out: bool,

    /// Convert every file matching a glob pattern
    #[arg(short, long, value_name = "PATTERN", conflicts_with_all = ["input", "output"])]
    glob: Option<String>,

    /// Output filename template (default: {filename}.srt)
    #[arg(short, long)]
    format: Option<String>,

    /// Keep existing output files instead of replacing them
    #[arg(long)]
    no_overwrite: bool,

    /// Configuration file path
    #[arg(short, long)]
    config_path: Option<PathBuf>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and tag for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "ERROR"),
            Level::Warn => ("1;33", "WARN "),
            Level::Info => ("1;32", "INFO "),
            Level::Debug => ("1;36", "DEBUG"),
            Level::Trace => ("1;35", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        // The max level is adjusted after the config is loaded; the logger only filters
        // what was enabled at init time
        metadata.level() <= self.level && metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, tag) = Self::style_for_level(record.level());
            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {} {}\x1B[0m",
                color, now, tag, record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() -> Result<()> {
    // Everything is allowed through the logger; log::set_max_level decides what is shown
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Some(Commands::Completions { shell }) = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "ttml2srt", &mut std::io::stdout());
        return Ok(());
    }

    if let Some(level) = &cli.log_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let config = load_config(&cli)?;

    // If log level was not set via command line, use the config value
    if cli.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    let controller = Controller::with_config(config)?;
    debug!("Output format: {}", controller.config().output.format);

    match (&cli.input, &cli.glob) {
        (_, Some(pattern)) => {
            let summary = controller.run_glob(pattern)?;
            if summary.failed > 0 {
                return Err(AppError::Batch {
                    failed: summary.failed,
                    total: summary.total,
                }
                .into());
            }
        }
        (Some(input), None) => {
            match controller.run(input, cli.output.as_deref())? {
                ConversionOutcome::Written(path) => info!("Success: {}", path.display()),
                ConversionOutcome::Skipped(path) => {
                    warn!("Output already exists: {}. Omit --no-overwrite to replace it.", path.display())
                }
                ConversionOutcome::Printed | ConversionOutcome::Empty => {}
            }
        }
        (None, None) => {
            return Err(anyhow!("Either --input or --glob is required (see --help)"));
        }
    }

    info!("Done");
    Ok(())
}

// Load or create configuration, then apply command line overrides
fn load_config(cli: &CommandLineOptions) -> Result<Config> {
    let mut config = match &cli.config_path {
        Some(path) if path.exists() => Config::from_file(path)
            .with_context(|| format!("Failed to load config file: {}", path.display()))?,
        Some(path) => {
            warn!("Config file not found at '{}', creating default config.", path.display());
            let config = Config::default();
            config
                .save(path)
                .with_context(|| format!("Failed to write default config to file: {}", path.display()))?;
            config
        }
        None => Config::default(),
    };

    if let Some(format) = &cli.format {
        config.output.format = format.clone();
    }
    if cli.std_out {
        config.output.std_out = true;
    }
    if cli.no_overwrite {
        config.output.force_overwrite = false;
    }
    if let Some(log_level) = &cli.log_level {
        config.log_level = log_level.clone().into();
    }

    Ok(config)
}
