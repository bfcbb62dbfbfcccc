// crates/twincheck-cli/src/main.rs
// ============================================================================
// Module: Twincheck CLI Entry Point
// Description: Command dispatcher for suite runs, contract listing, and config.
// Purpose: Run the contract suite against live endpoints from the shell.
// Dependencies: clap, serde_jcs, thiserror, tracing, tracing-subscriber
// ============================================================================

//! ## Overview
//! `twincheck run` loads configuration, opens a validator session, runs the
//! contract suite, optionally persists report artifacts, and exits non-zero
//! when any case fails. `twincheck contracts` prints the endpoint catalogue,
//! including each response JSON Schema, as canonical JSON; `twincheck config`
//! validates or shows the resolved configuration with secrets redacted. Diagnostics go to stderr through
//! `tracing`, filtered by `TWINCHECK_LOG`.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;
use twincheck_config::ValidatorConfig;
use twincheck_contract::endpoint_contracts;
use twincheck_validator::ContractSuite;
use twincheck_validator::ServiceSelection;
use twincheck_validator::SuiteReport;
use twincheck_validator::with_session;
use twincheck_validator::write_transcript;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable holding the log filter directive.
const LOG_ENV: &str = "TWINCHECK_LOG";
/// Log filter used when [`LOG_ENV`] is unset or invalid.
const DEFAULT_LOG_FILTER: &str = "warn";

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "twincheck", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the contract suite against the configured endpoints.
    Run(RunCommand),
    /// Print the endpoint contract catalogue as JSON.
    Contracts,
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Arguments for the `run` command.
#[derive(Args, Debug)]
struct RunCommand {
    /// Path to the configuration file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Services to validate.
    #[arg(long, value_enum, default_value_t = ServiceArg::All)]
    service: ServiceArg,
    /// Directory receiving `report.json`, `report.md`, and `transcript.json`.
    #[arg(long, value_name = "DIR")]
    report_dir: Option<PathBuf>,
}

/// Service selection accepted on the command line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ServiceArg {
    /// Datacenter twin API only.
    Datacenter,
    /// Forecast API only.
    Forecast,
    /// Both services.
    All,
}

impl From<ServiceArg> for ServiceSelection {
    fn from(value: ServiceArg) -> Self {
        match value {
            ServiceArg::Datacenter => Self::Datacenter,
            ServiceArg::Forecast => Self::Forecast,
            ServiceArg::All => Self::All,
        }
    }
}

/// Configuration subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate the resolved configuration.
    Validate(ConfigArgs),
    /// Print the resolved configuration with tokens redacted.
    Show(ConfigArgs),
}

/// Shared configuration arguments.
#[derive(Args, Debug)]
struct ConfigArgs {
    /// Path to the configuration file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper carrying a user-facing message.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    init_tracing();
    match run(Cli::parse()) {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Installs the stderr log subscriber.
fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Executes the CLI command dispatcher.
fn run(cli: Cli) -> CliResult<ExitCode> {
    if cli.show_version {
        write_stdout_line(&format!("twincheck {}", env!("CARGO_PKG_VERSION")))?;
        return Ok(ExitCode::SUCCESS);
    }
    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };
    match command {
        Commands::Run(command) => command_run(&command),
        Commands::Contracts => command_contracts(),
        Commands::Config {
            command,
        } => command_config(command),
    }
}

/// Emits the top-level help message.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("")
}

// ============================================================================
// SECTION: Run Command
// ============================================================================

/// Executes the `run` command.
fn command_run(command: &RunCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_deref())?;
    let suite = ContractSuite::from_config(&config, command.service.into());
    info!(
        selection = suite.selection().as_str(),
        cases = suite.cases().len(),
        "running contract suite"
    );
    let (report, transcript) = with_session(&config, |session| suite.run(session))
        .map_err(|err| CliError::new(format!("failed to open session: {err}")))?;
    if let Some(dir) = &command.report_dir {
        report
            .write_to(dir)
            .map_err(|err| CliError::new(format!("failed to write report: {err}")))?;
        write_transcript(dir, &transcript)
            .map_err(|err| CliError::new(format!("failed to write transcript: {err}")))?;
    }
    write_stdout_line(&render_summary(&report))?;
    Ok(if report.is_success() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Renders the terminal summary of a suite report.
fn render_summary(report: &SuiteReport) -> String {
    let mut lines = vec![format!(
        "{}/{} cases passed ({})",
        report.passed,
        report.total,
        report.selection.as_str()
    )];
    for outcome in report.failures() {
        lines.push(format!("FAIL {}: {}", outcome.name, outcome.message));
    }
    lines.join("\n")
}

// ============================================================================
// SECTION: Contracts Command
// ============================================================================

/// Prints the endpoint contract catalogue as canonical JSON.
fn command_contracts() -> CliResult<ExitCode> {
    let mut bytes = serde_jcs::to_vec(&endpoint_contracts())
        .map_err(|err| CliError::new(format!("failed to serialize contracts: {err}")))?;
    bytes.push(b'\n');
    write_stdout_bytes(&bytes)?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(command: ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate(args) => command_config_validate(&args),
        ConfigCommand::Show(args) => command_config_show(&args),
    }
}

/// Executes the config validation command.
fn command_config_validate(args: &ConfigArgs) -> CliResult<ExitCode> {
    let config = load_config(args.config.as_deref())?;
    write_stdout_line(&format!(
        "config ok: datacenter={} forecast={}",
        config.datacenter.base_url, config.forecast.base_url
    ))?;
    Ok(ExitCode::SUCCESS)
}

/// Prints the resolved configuration with tokens redacted.
fn command_config_show(args: &ConfigArgs) -> CliResult<ExitCode> {
    let config = load_config(args.config.as_deref())?;
    let rendered = config
        .redacted()
        .to_toml_string()
        .map_err(|err| CliError::new(format!("failed to render config: {err}")))?;
    write_stdout_bytes(rendered.as_bytes())?;
    Ok(ExitCode::SUCCESS)
}

/// Loads configuration from file, environment, and defaults.
fn load_config(path: Option<&Path>) -> CliResult<ValidatorConfig> {
    ValidatorConfig::load(path)
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> CliResult<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}").map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes raw bytes to stdout.
fn write_stdout_bytes(bytes: &[u8]) -> CliResult<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(bytes).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
