use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use minimap::MapMode;
use minimap::config::OutputFormat;

/// Parse map mode from string
fn parse_map_mode(s: &str) -> Result<MapMode, String> {
    s.parse::<MapMode>()
}

/// Parse output format from string
fn parse_output_format(s: &str) -> Result<OutputFormat, String> {
    s.parse::<OutputFormat>()
}

#[derive(Parser)]
#[command(name = "minimap")]
#[command(
    version,
    about = "Read-only structure maps for Python, PHP, Kotlin and Java sources"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a structure map for a source file
    Map {
        #[arg(help = "Source file, or '-' for stdin (default: stdin)")]
        file: Option<PathBuf>,
        #[arg(long, short, value_parser = parse_map_mode, help = "Mode: auto, python-ast, php-lite, kotlin-lite, java-lite")]
        mode: Option<MapMode>,
        #[arg(long = "no-redact", help = "Keep emails, phone numbers, IDs and secrets")]
        no_redact: bool,
        #[arg(long = "no-todo", help = "Skip the TODO/FIXME/HACK/TEMP block")]
        no_todo: bool,
        #[arg(long, short, help = "Copy the output to the clipboard")]
        copy: bool,
        #[arg(short = 'f', long, value_parser = parse_output_format, help = "Output format: text, json")]
        format: Option<OutputFormat>,
        #[arg(long, short, help = "File name for sniffing and the File: line")]
        name: Option<String>,
        #[arg(long = "entry-first", help = "List main/run_*/entry_*/cli_* Python functions first")]
        entry_first: bool,
    },

    /// Show which lite scanner a source would fall back to
    Sniff {
        #[arg(help = "Source file, or '-' for stdin (default: stdin)")]
        file: Option<PathBuf>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(
            short = 'f',
            long,
            default_value = "toml",
            help = "Output format: toml, json"
        )]
        format: String,
    },
    /// Show configuration file paths
    Path,
    /// Initialize configuration
    Init {
        #[arg(long, short, help = "Initialize global config")]
        global: bool,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mminimap encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // Call default hook for backtrace (if RUST_BACKTRACE=1)
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    // stdout carries the map, so logs go to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Map {
            file,
            mode,
            no_redact,
            no_todo,
            copy,
            format,
            name,
            entry_first,
        } => {
            use minimap::cli::commands::map::{MapRunOptions, run};

            run(MapRunOptions {
                path: file,
                mode,
                no_redact,
                no_todo,
                copy,
                format,
                name,
                entry_first,
            })?;
        }
        Commands::Sniff { file } => {
            minimap::cli::commands::sniff::run(file.as_deref())?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => {
                minimap::cli::commands::config::show(&format)?;
            }
            ConfigAction::Path => {
                minimap::cli::commands::config::path()?;
            }
            ConfigAction::Init { global, force } => {
                minimap::cli::commands::config::init(global, force)?;
            }
        },
    }

    Ok(())
}
