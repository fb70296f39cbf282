use std::collections::BTreeMap;
use std::env;
use std::ffi::OsString;
use std::io::{self, IsTerminal};
#[cfg(unix)]
use std::os::unix::process::CommandExt;
use std::path::PathBuf;
use std::process::{Command, ExitCode};

use clap::{ArgAction, Args, Parser, Subcommand};
use dotenv_lines::{EnvLoader, Error, Repository, SubstitutionMode, TargetEnv};
use tracing::Level;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILE: &str = ".env";

/// Run commands with variables loaded from dotenv files.
#[derive(Debug, Parser)]
#[command(name = "dotenv", version, about, long_about = None)]
struct Cli {
    /// Print loader diagnostics to stderr (-v debug, -vv trace).
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Load dotenv files and execute a command.
    Run(RunArgs),
    /// Parse dotenv files, print their entries and check required names.
    Check(CheckArgs),
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
struct FileArgs {
    /// Dotenv file path(s). Repeat or pass comma-separated paths.
    #[arg(short = 'f', long = "file", value_delimiter = ',', default_value = DEFAULT_FILE)]
    files: Vec<PathBuf>,

    /// Ignore missing dotenv files.
    #[arg(short = 'i', long = "ignore", visible_alias = "ignore-missing")]
    ignore_missing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
struct RunArgs {
    #[command(flatten)]
    files: FileArgs,

    /// Override existing environment variables.
    #[arg(short = 'o', long = "override", visible_alias = "overload")]
    override_existing: bool,

    /// Expand `${VAR}` placeholders in values.
    #[arg(long)]
    expand: bool,

    /// Command to run, followed by its arguments.
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<OsString>,
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
struct CheckArgs {
    #[command(flatten)]
    files: FileArgs,

    /// Names that must be defined. Repeat or pass comma-separated names.
    #[arg(short = 'r', long = "required", value_delimiter = ',')]
    required: Vec<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        CliCommand::Run(args) => execute_run(args),
        CliCommand::Check(args) => execute_check(args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("dotenv: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();
}

fn file_loader(files: &FileArgs) -> Result<EnvLoader, String> {
    if !files.ignore_missing
        && let Some(missing) = files.files.iter().find(|path| !path.is_file())
    {
        return Err(format!("dotenv file not found: {}", missing.display()));
    }

    Ok(EnvLoader::new().files(&files.files).short_circuit(false))
}

fn load(loader: &mut EnvLoader, files: &FileArgs) -> Result<(), String> {
    let result = if files.ignore_missing {
        loader.safe_load()
    } else {
        loader.load()
    };
    let report = result.map_err(|err| err.to_string())?;
    tracing::debug!(
        files_read = report.files_read,
        loaded = report.loaded,
        skipped = report.skipped_existing,
        "loaded dotenv files"
    );
    Ok(())
}

fn execute_run(args: RunArgs) -> Result<u8, String> {
    let repository = Repository::builder()
        .with_adapter(TargetEnv::from_memory(snapshot_process_env()))
        .build();
    let substitution_mode = if args.expand {
        SubstitutionMode::Expand
    } else {
        SubstitutionMode::Disabled
    };
    let mut loader = file_loader(&args.files)?
        .repository(repository)
        .override_existing(args.override_existing)
        .substitution_mode(substitution_mode);
    load(&mut loader, &args.files)?;

    let Some((program, program_args)) = args.command.split_first() else {
        return Err("missing command after `run`".to_owned());
    };

    let repository = loader.into_repository();
    let mut command = Command::new(program);
    command.args(program_args);
    for name in repository.loaded_names() {
        if let Some(value) = repository.get(name) {
            command.env(name, value);
        }
    }

    execute_command(command, program)
}

fn execute_check(args: CheckArgs) -> Result<u8, String> {
    let mut loader = file_loader(&args.files)?;
    let entries = match loader.parse_only() {
        Ok(entries) => entries,
        Err(Error::InvalidPath { .. }) if args.files.ignore_missing => Vec::new(),
        Err(err) => return Err(err.to_string()),
    };

    for entry in &entries {
        println!("{}={:?}", entry.name, entry.value);
    }

    load(&mut loader, &args.files)?;
    loader
        .required(args.required.iter().map(String::as_str))
        .map_err(|err| err.to_string())?;
    Ok(0)
}

fn snapshot_process_env() -> BTreeMap<String, String> {
    env::vars_os()
        .map(|(key, value)| {
            (
                key.to_string_lossy().into_owned(),
                value.to_string_lossy().into_owned(),
            )
        })
        .collect()
}

#[cfg(unix)]
fn execute_command(mut command: Command, program: &OsString) -> Result<u8, String> {
    let err = command.exec();
    Err(format!(
        "failed to execute `{}`: {err}",
        program.to_string_lossy()
    ))
}

#[cfg(not(unix))]
fn execute_command(mut command: Command, program: &OsString) -> Result<u8, String> {
    let status = command
        .status()
        .map_err(|err| format!("failed to execute `{}`: {err}", program.to_string_lossy()))?;
    Ok(status.code().unwrap_or(1) as u8)
}
