//! royalty-split CLI
//!
//! Terminal front end for the exact-sum allocation engine:
//! - Compute a split from a total and a list of payees
//! - Export results as a table, CSV, tab-delimited text, JSON or YAML
//! - Save split inputs locally and recompute them later

use clap::{Args, Parser, Subcommand, ValueEnum};
use royalty_split_core::{
    parse_weight, Entry, SplitMode, SplitSettings, SplitStore, DEFAULT_SPLIT_KEY,
};
use std::ffi::OsString;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod config;
pub mod error;
pub mod output;

use config::CliConfig;
pub use error::{CliError, CliResult};
use output::{print_success, print_warning, render_report, render_saved, OutputFormat};

/// royalty-split application
#[derive(Parser)]
#[command(name = "royalty-split")]
#[command(about = "Split a royalty total between collaborators, exactly to the cent", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(long, global = true, env = "ROYALTY_SPLIT_CONFIG")]
    config: Option<PathBuf>,

    /// Saved-splits file
    #[arg(long, global = true, env = "ROYALTY_SPLIT_STORE")]
    store: Option<PathBuf>,

    /// Output format (table, json, yaml, csv, text)
    #[arg(short, long, global = true, default_value = "table")]
    output: OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Compute a split
    Calc(CalcArgs),

    /// Recompute a saved split
    Load {
        /// Saved split key
        #[arg(default_value = DEFAULT_SPLIT_KEY)]
        key: String,
    },

    /// List saved splits
    List,

    /// Delete a saved split
    Remove {
        /// Saved split key
        key: String,
    },

    /// Show configuration
    Config,
}

#[derive(Args)]
struct CalcArgs {
    /// Amount to distribute, e.g. 1250.00
    #[arg(allow_hyphen_values = true)]
    total: String,

    /// Weighting mode
    #[arg(short, long, value_enum, env = "ROYALTY_SPLIT_MODE")]
    mode: Option<ModeArg>,

    /// Decimal digits of the currency (0-8)
    #[arg(short, long, env = "ROYALTY_SPLIT_PRECISION")]
    precision: Option<u32>,

    /// Currency code shown next to amounts
    #[arg(long, env = "ROYALTY_SPLIT_CURRENCY")]
    currency: Option<String>,

    /// Project title
    #[arg(short, long)]
    title: Option<String>,

    /// Payee as NAME or NAME=WEIGHT; repeat for each collaborator
    #[arg(long = "payee", value_name = "NAME[=WEIGHT]")]
    payees: Vec<PayeeArg>,

    /// Save the inputs under this key
    #[arg(long, value_name = "KEY", num_args = 0..=1, default_missing_value = DEFAULT_SPLIT_KEY)]
    save: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    /// Weights are parts of 100
    #[value(alias = "percent")]
    Percentage,
    /// Weights are relative proportions
    Shares,
    /// Weights are ignored
    Equal,
}

impl From<ModeArg> for SplitMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Percentage => SplitMode::Percentage,
            ModeArg::Shares => SplitMode::Shares,
            ModeArg::Equal => SplitMode::Equal,
        }
    }
}

/// `NAME` or `NAME=WEIGHT`. A blank or non-numeric weight is left undefined.
#[derive(Debug, Clone, PartialEq)]
pub struct PayeeArg {
    pub name: String,
    pub weight: Option<f64>,
}

impl FromStr for PayeeArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, weight) = match s.rsplit_once('=') {
            Some((name, weight)) => (name, parse_weight(weight)),
            None => (s, None),
        };
        Ok(Self {
            name: name.trim().to_string(),
            weight,
        })
    }
}

impl From<PayeeArg> for Entry {
    fn from(payee: PayeeArg) -> Self {
        Entry::new(payee.name, payee.weight)
    }
}

/// Run using the current process arguments.
pub fn run() -> CliResult<()> {
    run_with_args(std::env::args_os())
}

/// Run using the provided argument iterator.
pub fn run_with_args<I, T>(args: I) -> CliResult<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    // Load config
    let config = CliConfig::load(cli.config.as_deref())?;
    let store_path = config.store_path(cli.store.as_deref());
    debug!(store = %store_path.display(), "configuration resolved");

    // Execute command
    match cli.command {
        Commands::Calc(args) => {
            let settings = build_settings(&args, &config);
            let report = settings.report()?;
            if let Some(key) = args.save.as_deref() {
                let mut store = SplitStore::load(&store_path)?;
                store.save(key, &settings)?;
                print_success(&format!(
                    "Saved split '{}' to {}",
                    key,
                    store.path().display()
                ));
            }
            for warning in output::report_warnings(&report) {
                print_warning(&warning);
            }
            println!("{}", render_report(&report, cli.output)?);
            Ok(())
        }
        Commands::Load { key } => {
            let store = SplitStore::load(&store_path)?;
            let report = store.get(&key)?.settings.report()?;
            for warning in output::report_warnings(&report) {
                print_warning(&warning);
            }
            println!("{}", render_report(&report, cli.output)?);
            Ok(())
        }
        Commands::List => {
            let store = SplitStore::load(&store_path)?;
            println!("{}", render_saved(&store.list(), cli.output)?);
            Ok(())
        }
        Commands::Remove { key } => {
            let mut store = SplitStore::load(&store_path)?;
            match store.remove(&key)? {
                Some(_) => print_success(&format!("Removed split '{}'", key)),
                None => print_warning(&format!("No saved split named '{}'", key)),
            }
            Ok(())
        }
        Commands::Config => {
            println!("Store: {}", store_path.display());
            println!("Mode: {}", config.mode(None));
            println!("Precision: {}", config.precision(None));
            println!("Currency: {}", config.currency(None));
            Ok(())
        }
    }
}

fn build_settings(args: &CalcArgs, config: &CliConfig) -> SplitSettings {
    SplitSettings {
        project_title: args.title.clone(),
        total: args.total.clone(),
        mode: config.mode(args.mode.map(SplitMode::from)),
        precision: config.precision(args.precision),
        currency: config.currency(args.currency.as_deref()),
        entries: args.payees.iter().cloned().map(Entry::from).collect(),
    }
}
