use chrono::{NaiveDate, Utc};
use clap::Parser;
use recommender::application::ranking::RankedRow;
use recommender::application::recommendation::{
    compute_analysis_period, validate_commandline_parameters, validate_environment,
    validate_price_date,
};
use recommender::cli::commands::{Cli, Commands};
use recommender::config::AppConfig;
use recommender::{GenerateRequest, Recommender, UniverseSource};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let recommender = match Recommender::new(AppConfig::from_env()) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error initializing recommender: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run_command(recommender, cli.command).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run_command(recommender: Recommender, cmd: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        Commands::Generate {
            ticker_file,
            local_dir,
            env,
            price_date,
            year,
            month,
            portfolio_size,
            show_ranking,
        } => {
            let environment = validate_environment(&env)?;
            let price_date = match price_date {
                Some(s) => validate_price_date(&s)?,
                None => Utc::now().date_naive(),
            };
            let period = match (year, month) {
                (Some(y), Some(m)) => validate_commandline_parameters(y, m, price_date)?,
                _ => compute_analysis_period(price_date)?,
            };

            let request = GenerateRequest {
                ticker_file,
                source: universe_source(local_dir),
                environment,
                period,
                today: today_for(price_date),
                portfolio_size,
            };

            let outcome = recommender.generate(&request).await?;
            if show_ranking {
                print_ranking(&outcome.ranking);
            }
            println!("{}", serde_json::to_string_pretty(&outcome.portfolio)?);
        }
        Commands::Universe {
            ticker_file,
            local_dir,
            env,
        } => {
            let environment = validate_environment(&env)?;
            let universe =
                recommender.load_universe(&ticker_file, &universe_source(local_dir), environment)?;
            for ticker in universe.tickers() {
                println!("{ticker}");
            }
        }
        Commands::Exports => {
            let exports = recommender.list_exports()?;
            println!("{}", serde_json::to_string_pretty(&exports)?);
        }
    }
    Ok(())
}

fn universe_source(local_dir: Option<String>) -> UniverseSource {
    match local_dir {
        Some(dir) => UniverseSource::Local(dir.into()),
        None => UniverseSource::Remote,
    }
}

/// Wall clock for today's date, midnight UTC for a past price date.
fn today_for(price_date: NaiveDate) -> Option<chrono::DateTime<Utc>> {
    let now = Utc::now();
    if price_date >= now.date_naive() {
        None
    } else {
        Some(price_date.and_time(chrono::NaiveTime::MIN).and_utc())
    }
}

fn print_ranking(ranking: &[RankedRow]) {
    eprintln!(
        "{:<8} {:>6} {:>12} {:>12} {:>10} {:>10} {:>10}",
        "ticker", "decile", "analysis", "target avg", "stdev %", "expected", "actual"
    );
    for r in ranking {
        eprintln!(
            "{:<8} {:>6} {:>12.2} {:>12.2} {:>10.2} {:>9.1}% {:>9.1}%",
            r.row.ticker,
            r.decile,
            r.row.analysis_price,
            r.row.target_price_avg,
            r.row.target_price_stdev_pct,
            r.row.analyst_expected_return * 100.0,
            r.row.actual_return * 100.0,
        );
    }
}
