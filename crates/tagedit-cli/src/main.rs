#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{Parser, Subcommand};
use output::OutputMode;
use std::env;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "tagedit: tag edit dialog scenario runner",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Output format (overrides `FORMAT` and TTY detection).
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Project root holding `.tagedit/config.toml`.
    #[arg(short = 'C', long, global = true, default_value = ".")]
    project_root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        output::resolve_output_mode(self.format, self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Run a scenario",
        long_about = "Drive one tag edit dialog through the steps of a scenario file and print the transcript.",
        after_help = "EXAMPLES:\n    # Run a rename scenario\n    tagedit run rename.yaml\n\n    # Emit machine-readable output\n    tagedit run rename.yaml --json"
    )]
    Run(cmd::run::RunArgs),

    #[command(
        about = "Validate a scenario",
        long_about = "Parse a scenario file and run its static checks without executing any step.",
        after_help = "EXAMPLES:\n    # Check a scenario\n    tagedit check rename.yaml"
    )]
    Check(cmd::check::CheckArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("TAGEDIT_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "tagedit=debug,tagedit_core=debug,info"
        } else {
            "tagedit=info,tagedit_core=info,warn"
        })
    });

    let format = env::var("TAGEDIT_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let output = cli.output_mode();

    match cli.command {
        Commands::Run(ref args) => cmd::run::run_run(args, output, &cli.project_root),
        Commands::Check(ref args) => cmd::check::run_check(args, output),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn readme_lists_every_subcommand() {
        let readme = include_str!("../README.md");
        for sub in Cli::command().get_subcommands() {
            assert!(
                readme.contains(&format!("tagedit {}", sub.get_name())),
                "README misses {}",
                sub.get_name()
            );
        }
    }

    #[test]
    fn json_flag_parses_after_subcommand() {
        let cli = Cli::parse_from(["tagedit", "run", "s.yaml", "--json"]);
        assert!(cli.json);
        assert!(cli.output_mode().is_json());
    }

    #[test]
    fn format_flag_overrides_json() {
        let cli = Cli::parse_from(["tagedit", "--json", "--format", "text", "check", "s.yaml"]);
        assert_eq!(cli.output_mode(), OutputMode::Text);
    }

    #[test]
    fn project_root_defaults_to_cwd() {
        let cli = Cli::parse_from(["tagedit", "check", "s.yaml"]);
        assert_eq!(cli.project_root, PathBuf::from("."));
        assert!(matches!(cli.command, Commands::Check(_)));
    }
}
