mod commands;
mod config;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// pricerule rule engine toolchain.
#[derive(Parser)]
#[command(name = "pricerule", version, about = "pricerule rule engine toolchain")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Log engine decisions at debug level to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply rule settings to a record and print the verdict and the mutated record
    Eval {
        /// Path to the rule settings JSON file
        #[arg(long)]
        rules: PathBuf,
        /// Path to the target record JSON file
        #[arg(long)]
        record: PathBuf,
        /// Evaluate only the settings of this rule id (fetched through the rule supply)
        #[arg(long)]
        rule_id: Option<String>,
        /// First sequence to evaluate when --rule-id is given
        #[arg(long, default_value = "0")]
        start: i64,
        /// Path to a pricerule.toml configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Decode a rule settings file and check sequence order per rule id
    Validate {
        /// Path to the rule settings JSON file
        #[arg(long)]
        rules: PathBuf,
    },

    /// Print the reference epoch second for a weekday name
    Weekday {
        /// English weekday name, e.g. "monday"
        name: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Eval {
            rules,
            record,
            rule_id,
            start,
            config,
        } => {
            commands::eval::cmd_eval(
                commands::eval::EvalOptions {
                    rules: &rules,
                    record: &record,
                    rule_id: rule_id.as_deref(),
                    start,
                    config: config.as_deref(),
                },
                cli.output,
                cli.quiet,
            );
        }
        Commands::Validate { rules } => {
            commands::validate::cmd_validate(&rules, cli.output, cli.quiet);
        }
        Commands::Weekday { name } => {
            commands::weekday::cmd_weekday(&name, cli.output, cli.quiet);
        }
    }
}

/// Install the stderr subscriber. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}

/// Report `msg` and exit with status 1.
pub(crate) fn fail(msg: &str, output: OutputFormat, quiet: bool) -> ! {
    report_error(msg, output, quiet);
    process::exit(1);
}
