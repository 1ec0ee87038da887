use anyhow::{Context, Result};
use chrono::Local;
use clap::error::ErrorKind;
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use log::{debug, info, warn};
use media_renamer_core::{
    app_paths, load_config, load_config_from, run_batch, save_config, select_files, AppConfig,
    MetadataBackend, MetadataProbe, NameGenerator, NoMetadata, Planner, RunOptions, RunReport,
    SelectOptions,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

const EXIT_SUCCESS: u8 = 0;
const EXIT_FAILURE: u8 = 1;
const EXIT_INTERRUPTED: u8 = 130;

#[derive(Debug, Parser)]
#[command(name = "media-renamer", version)]
#[command(about = "Rename photos, videos and audio files to their capture time")]
#[command(long_about = "Rename media files to YYYY-MM-DD_HHMMSS.<ext> using the capture \
timestamp found in their metadata. Files without a usable timestamp get \
YYYY-MM-DD_<uuid>.<ext> with today's date. Existing files are never overwritten: \
clashing names get a -1, -2, ... suffix. Files that already follow either scheme are left alone.")]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
    #[command(flatten)]
    rename: RenameArgs,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Inspect or create the configuration file
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
struct ConfigArgs {
    #[command(subcommand)]
    action: ConfigAction,
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write the default configuration if none exists
    Init,
}

#[derive(Debug, Args)]
struct RenameArgs {
    /// Rename files with this extension in --dir (repeatable)
    #[arg(short = 'e', long = "ext", value_name = "EXT")]
    extensions: Vec<String>,
    /// Rename this file (repeatable)
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    files: Vec<PathBuf>,
    /// Directory scanned for --ext
    #[arg(short = 'd', long = "dir", value_name = "DIR", default_value = ".")]
    dir: PathBuf,
    /// Show what would be renamed without touching any file
    #[arg(short = 'n', long, default_value_t = false)]
    dry_run: bool,
    /// Trace every metadata field lookup
    #[arg(short = 'v', long, default_value_t = false)]
    verbose: bool,
    /// Rename for real (the default once a target is given)
    #[arg(long, default_value_t = false, conflicts_with = "dry_run")]
    run: bool,
    /// Descend into subdirectories of --dir
    #[arg(short = 'r', long, default_value_t = false)]
    recursive: bool,
    /// Include dot files when scanning --dir
    #[arg(long, default_value_t = false)]
    include_hidden: bool,
    /// Skip metadata lookups and always use date + unique id names
    #[arg(long, default_value_t = false)]
    no_metadata: bool,
    /// Read configuration from this file instead of the default location
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn main() -> ExitCode {
    if std::env::args_os().len() <= 1 {
        if let Err(err) = Cli::command().print_help() {
            eprintln!("could not print help: {err}");
            return ExitCode::from(EXIT_FAILURE);
        }
        println!();
        return ExitCode::SUCCESS;
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            if let Err(io_err) = err.print() {
                eprintln!("could not print usage: {io_err}");
            }
            return ExitCode::from(parse_error_code(err.kind()));
        }
    };

    setup_logging(cli.rename.verbose);

    let result = match cli.command {
        Some(Commands::Config(config)) => match config.action {
            ConfigAction::Show => cmd_config_show(),
            ConfigAction::Init => cmd_config_init(),
        },
        None => cmd_rename(cli.rename),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            log::error!("{err:#}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .format_target(false)
        .init();
}

/// Help and version requests are successes; any other parse failure is a
/// usage error.
fn parse_error_code(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => EXIT_SUCCESS,
        _ => EXIT_FAILURE,
    }
}

fn require_selection(args: &RenameArgs) -> Result<()> {
    if args.extensions.is_empty() && args.files.is_empty() {
        anyhow::bail!("nothing to do: pass at least one --ext or --file");
    }
    Ok(())
}

/// An interrupt wins over file errors.
fn report_exit_code(report: &RunReport) -> u8 {
    if report.interrupted {
        EXIT_INTERRUPTED
    } else if report.has_errors() {
        EXIT_FAILURE
    } else {
        EXIT_SUCCESS
    }
}

fn cmd_rename(args: RenameArgs) -> Result<ExitCode> {
    require_selection(&args)?;

    let config = match &args.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };

    let cancel = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&cancel);
    ctrlc::set_handler(move || handler_flag.store(true, Ordering::SeqCst))
        .context("could not install the interrupt handler")?;

    let probe = build_probe(&config, args.no_metadata);
    let generator = NameGenerator::new(Local::now().date_naive())
        .with_probe(probe)
        .with_unique_id_retries(config.unique_id_retries);
    let mut planner = Planner::new(generator).with_collision_limit(config.collision_limit);

    let (files, stats) = select_files(&SelectOptions {
        root: args.dir,
        extensions: args.extensions,
        files: args.files,
        recursive: args.recursive || config.recursive_default,
        include_hidden: args.include_hidden || config.include_hidden_default,
    })?;
    info!(
        "{} files to process ({} matched by extension, {} named explicitly)",
        files.len(),
        stats.matched_files,
        stats.explicit_files
    );
    if args.dry_run {
        info!("dry run: no file will be renamed");
    } else if args.run {
        debug!("explicit --run");
    }

    let report = run_batch(
        &files,
        &mut planner,
        RunOptions {
            dry_run: args.dry_run,
        },
        &cancel,
    );

    print_report(&report, args.output)?;

    if report.interrupted {
        warn!(
            "interrupted: stopped after {} of {} files",
            report.outcomes.len(),
            files.len()
        );
    }
    Ok(ExitCode::from(report_exit_code(&report)))
}

fn build_probe(config: &AppConfig, no_metadata: bool) -> Box<dyn MetadataProbe> {
    if no_metadata || config.metadata_backend == MetadataBackend::None {
        return Box::new(NoMetadata);
    }

    let probe = config.build_probe();
    debug!("metadata backend: {}", probe.name());
    if !probe.is_available() {
        warn!(
            "{} is not available; every file gets a date + unique id name",
            config.exiftool_command
        );
    }
    probe
}

fn print_report(report: &RunReport, output: OutputFormat) -> Result<()> {
    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Table => println!("{report}"),
    }
    Ok(())
}

fn cmd_config_show() -> Result<ExitCode> {
    let config = load_config()?;
    let paths = app_paths()?;
    println!("config file: {}", paths.config_path.display());
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(ExitCode::SUCCESS)
}

fn cmd_config_init() -> Result<ExitCode> {
    let paths = app_paths()?;
    if paths.config_path.exists() {
        println!("config file already exists: {}", paths.config_path.display());
        return Ok(ExitCode::SUCCESS);
    }
    save_config(&AppConfig::default())?;
    println!("wrote {}", paths.config_path.display());
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::{
        parse_error_code, report_exit_code, require_selection, Cli, Commands, ConfigAction,
        OutputFormat, EXIT_FAILURE, EXIT_INTERRUPTED, EXIT_SUCCESS,
    };
    use clap::error::ErrorKind;
    use clap::{CommandFactory, Parser};
    use media_renamer_core::{RunCounters, RunReport};
    use std::path::PathBuf;
    use std::time::Duration;

    fn report(errored: usize, interrupted: bool) -> RunReport {
        RunReport {
            dry_run: false,
            interrupted,
            counters: RunCounters {
                succeeded: 2,
                errored,
                ..RunCounters::default()
            },
            elapsed: Duration::from_millis(5),
            outcomes: Vec::new(),
        }
    }

    #[test]
    fn repeatable_selection_flags() {
        let cli = Cli::try_parse_from([
            "media-renamer",
            "-e",
            "mp4",
            "--ext",
            "jpg",
            "-f",
            "a.mov",
            "--file",
            "b.mov",
            "-n",
        ])
        .expect("parse");
        assert!(cli.command.is_none());
        assert_eq!(cli.rename.extensions, ["mp4", "jpg"]);
        assert_eq!(
            cli.rename.files,
            [PathBuf::from("a.mov"), PathBuf::from("b.mov")]
        );
        assert!(cli.rename.dry_run);
        assert_eq!(cli.rename.dir, PathBuf::from("."));
        assert_eq!(cli.rename.output, OutputFormat::Table);
    }

    #[test]
    fn run_conflicts_with_dry_run() {
        let err = Cli::try_parse_from(["media-renamer", "-e", "mp4", "--run", "--dry-run"])
            .expect_err("conflict");
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn unknown_flag_is_rejected() {
        let err = Cli::try_parse_from(["media-renamer", "--frobnicate"]).expect_err("unknown");
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn config_subcommand_parses() {
        let cli = Cli::try_parse_from(["media-renamer", "config", "show"]).expect("parse");
        assert!(matches!(
            cli.command,
            Some(Commands::Config(ref args)) if matches!(args.action, ConfigAction::Show)
        ));
    }

    #[test]
    fn json_output_and_flags() {
        let cli = Cli::try_parse_from([
            "media-renamer",
            "--ext",
            "mp3",
            "--run",
            "-v",
            "-r",
            "--no-metadata",
            "--output",
            "json",
        ])
        .expect("parse");
        assert!(cli.rename.run);
        assert!(cli.rename.verbose);
        assert!(cli.rename.recursive);
        assert!(cli.rename.no_metadata);
        assert_eq!(cli.rename.output, OutputFormat::Json);
    }

    #[test]
    fn clean_run_exits_zero() {
        assert_eq!(report_exit_code(&report(0, false)), EXIT_SUCCESS);
    }

    #[test]
    fn any_errored_file_exits_one() {
        assert_eq!(report_exit_code(&report(1, false)), EXIT_FAILURE);
    }

    #[test]
    fn interrupt_exits_130_even_with_errors() {
        assert_eq!(report_exit_code(&report(0, true)), EXIT_INTERRUPTED);
        assert_eq!(report_exit_code(&report(3, true)), EXIT_INTERRUPTED);
    }

    #[test]
    fn missing_ext_and_file_is_a_usage_error() {
        let cli = Cli::try_parse_from(["media-renamer", "-n"]).expect("parse");
        let err = require_selection(&cli.rename).expect_err("nothing selected");
        assert!(err.to_string().contains("--ext or --file"));

        let cli = Cli::try_parse_from(["media-renamer", "-f", "a.mov"]).expect("parse");
        assert!(require_selection(&cli.rename).is_ok());
    }

    #[test]
    fn help_and_version_exit_zero_other_parse_errors_exit_one() {
        let help = Cli::try_parse_from(["media-renamer", "--help"]).expect_err("help");
        assert_eq!(parse_error_code(help.kind()), EXIT_SUCCESS);

        let version = Cli::try_parse_from(["media-renamer", "--version"]).expect_err("version");
        assert_eq!(parse_error_code(version.kind()), EXIT_SUCCESS);

        let unknown = Cli::try_parse_from(["media-renamer", "--frobnicate"]).expect_err("unknown");
        assert_eq!(parse_error_code(unknown.kind()), EXIT_FAILURE);
    }

    #[test]
    fn no_arguments_parse_cleanly_for_the_help_path() {
        let cli = Cli::try_parse_from(["media-renamer"]).expect("parse");
        assert!(cli.command.is_none());
        assert!(require_selection(&cli.rename).is_err());
        assert!(Cli::command().render_help().to_string().contains("--ext"));
    }
}
