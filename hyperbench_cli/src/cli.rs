use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use hyperbench_core::bench::DEFAULT_BATCH_SIZE;
use hyperbench_core::generate::DEFAULT_RECORD_COUNT;
use hyperbench_core::Schema;

// Defaults reproduce the fixed constants the original drivers were built
// around; every one of them can be overridden per invocation.
pub const DEFAULT_CONNINFO: &str = "host=localhost user=postgres password=postgres dbname=postgres";
pub const DEFAULT_CSV: &str = "generated.csv";
pub const DEFAULT_LATEST_LIMIT: i64 = 5;

#[derive(Parser)]
#[command(version, about, long_about = None)]
pub struct EntryArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, ValueEnum)]
pub enum Dataset {
    /// Hex-counter key plus 31 truncated SHA-256 columns.
    Block,
    /// Wallet transfers: timestamp, source, destination, satoshi.
    Bitcoin,
}

impl Dataset {
    pub fn schema(&self) -> Schema {
        match self {
            Self::Block => Schema::block(),
            Self::Bitcoin => Schema::bitcoin_transactions(),
        }
    }
}

#[derive(Args)]
pub struct StoreArgs {
    /// libpq-style connection string for the target store.
    #[arg(short, long, default_value = DEFAULT_CONNINFO)]
    pub conninfo: String,

    /// Built-in dataset schema to operate on.
    #[arg(short, long, value_enum, default_value_t = Dataset::Block)]
    pub dataset: Dataset,
}

#[derive(Subcommand)]
pub enum Command {
    /// Write a deterministic SHA-256-derived CSV dataset.
    Generate {
        #[arg(short, long, default_value = DEFAULT_CSV)]
        output: PathBuf,

        #[arg(short, long, default_value_t = DEFAULT_RECORD_COUNT)]
        records: u64,
    },
    /// Create the target table (and hypertable) if absent.
    Setup {
        #[command(flatten)]
        store: StoreArgs,
    },
    /// Bulk-insert a CSV file, untimed; malformed rows are skipped.
    Load {
        #[command(flatten)]
        store: StoreArgs,

        #[arg(long, default_value = DEFAULT_CSV)]
        csv: PathBuf,

        #[arg(short, long, default_value_t = DEFAULT_BATCH_SIZE)]
        batch_size: usize,
    },
    /// Timed sequential, latest, and random reads against an existing table.
    Read {
        #[command(flatten)]
        store: StoreArgs,

        #[arg(short, long, default_value_t = DEFAULT_LATEST_LIMIT)]
        limit: i64,
    },
    /// Full pipeline: ensure schema, timed inserts, timed reads, summary.
    Run {
        #[command(flatten)]
        store: StoreArgs,

        #[arg(long, default_value = DEFAULT_CSV)]
        csv: PathBuf,

        #[arg(short, long, default_value_t = DEFAULT_BATCH_SIZE)]
        batch_size: usize,

        #[arg(short, long, default_value_t = DEFAULT_LATEST_LIMIT)]
        limit: i64,

        /// Also emit the latency summaries as JSON on stdout.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}
