use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "recommender",
    about = "Recommend stocks with the lowest analyst price target dispersion"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a portfolio recommendation
    Generate {
        /// Ticker file name (object name in the data bucket, or file in --local-dir)
        #[arg(long)]
        ticker_file: String,
        /// Read the ticker file from this directory instead of the data bucket
        #[arg(long)]
        local_dir: Option<String>,
        /// Target environment (test, production)
        #[arg(long, default_value = "test")]
        env: String,
        /// Date current prices are evaluated at (YYYY/MM/DD or YYYY-MM-DD). Defaults to today
        #[arg(long)]
        price_date: Option<String>,
        /// Analysis year. Defaults to the month before the price date
        #[arg(long, requires = "month")]
        year: Option<i32>,
        /// Analysis month (1-12)
        #[arg(long, requires = "year")]
        month: Option<u32>,
        #[arg(long, default_value = "3")]
        portfolio_size: usize,
        /// Print the full ranking to stderr
        #[arg(long)]
        show_ranking: bool,
    },
    /// Print the ticker universe
    Universe {
        #[arg(long)]
        ticker_file: String,
        #[arg(long)]
        local_dir: Option<String>,
        #[arg(long, default_value = "test")]
        env: String,
    },
    /// Print the exports of the configured stacks
    Exports,
}
