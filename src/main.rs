use mnist_arena::config::SourceConfig;
use mnist_arena::dataset::LoadOptions;
use mnist_arena::filter::LabelSet;
use mnist_arena::mnist::{MnistSplit, DEFAULT_ARENA_CAPACITY, DEFAULT_DATA_DIR};
use mnist_arena::{inspect, preview};

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Log arena allocations and header decoding
    #[arg(long, short, global = true)]
    verbose: bool,
    /// Only log errors
    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Args)]
struct SourceArgs {
    #[arg(long, default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,
    #[arg(long, default_value = "train")]
    split: MnistSplit,
    #[arg(long, default_value_t = DEFAULT_ARENA_CAPACITY)]
    arena_capacity: usize,
    /// Keep only examples with these labels, e.g. `--labels 0,1`
    #[arg(long, value_delimiter = ',')]
    labels: Option<Vec<u8>>,
    /// Reject files whose magic number is not the IDX constant
    #[arg(long)]
    strict_magic: bool,
    /// Accept image and label files with different item counts
    #[arg(long)]
    no_count_check: bool,
}

impl From<SourceArgs> for SourceConfig {
    fn from(args: SourceArgs) -> Self {
        SourceConfig {
            data_dir: args.data_dir,
            split: args.split,
            arena_capacity: args.arena_capacity,
            options: LoadOptions {
                validate_magic: args.strict_magic,
                check_counts: !args.no_count_check,
            },
            labels: args.labels.map(LabelSet::from_iter),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Load a split and print its shape and label distribution
    Inspect {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long)]
        json: bool,
    },
    /// Print examples as ASCII art
    Preview {
        #[command(flatten)]
        source: SourceArgs,
        /// First example to show (random if omitted)
        #[arg(long)]
        index: Option<usize>,
        #[arg(long, default_value_t = 1)]
        count: usize,
    },
}

fn setup_logging(verbose: bool, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else if verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Inspect { source, json } => inspect::inspect(&SourceConfig::from(source), json),
        Commands::Preview {
            source,
            index,
            count,
        } => preview::preview(&SourceConfig::from(source), index, count),
    };

    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(1);
    }
}
