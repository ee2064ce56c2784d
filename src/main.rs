use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trendlens::anomaly::annotate;
use trendlens::config::{Config, DateRange};
use trendlens::llm::Explainer;
use trendlens::models::ChangeDirection;
use trendlens::report;
use trendlens::trends::TrendsFetcher;

#[derive(Parser)]
#[command(
    name = "trendlens",
    version,
    about = "Keyword search-interest explorer with week-over-week anomaly detection",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); defaults to the configured format
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// Path to a config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a keyword's weekly series and report anomalies
    Analyze {
        /// Keyword or phrase to explore
        keyword: String,

        /// Anomaly threshold as a fraction (e.g. 0.30 for ±30%)
        #[arg(short, long)]
        threshold: Option<f64>,

        /// Two-letter region code
        #[arg(short, long)]
        region: Option<String>,

        /// Calendar year to query
        #[arg(long)]
        year: Option<i32>,

        /// Request an explanation for each flagged week
        #[arg(long, default_value = "false")]
        explain: bool,

        /// API token override for the hosted explanation backend
        #[arg(long)]
        api_key: Option<String>,
    },

    /// Request a one-off explanation for a flagged week
    Explain {
        /// Keyword or phrase the anomaly belongs to
        keyword: String,

        /// Week date (YYYY-MM-DD)
        date: NaiveDate,

        /// Change direction (spiked, dropped)
        direction: String,

        /// API token override for the hosted explanation backend
        #[arg(long)]
        api_key: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Pick up a persisted local .env before reading any environment.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;

    let log_format = cli.log_format.as_deref().unwrap_or(&config.logging.format);
    setup_tracing(log_format, cli.verbose || config.logging.verbose)?;

    tracing::info!(title = %config.app.title, "trendlens starting");

    match cli.command {
        Commands::Analyze {
            keyword,
            threshold,
            region,
            year,
            explain,
            api_key,
        } => {
            tracing::info!(
                keyword = %keyword,
                threshold = ?threshold,
                region = ?region,
                year = ?year,
                explain = %explain,
                "Starting analyze command"
            );
            analyze(config, keyword, threshold, region, year, explain, api_key).await?;
        }

        Commands::Explain {
            keyword,
            date,
            direction,
            api_key,
        } => {
            tracing::info!(
                keyword = %keyword,
                date = %date,
                direction = %direction,
                "Starting explain command"
            );
            explain_one(config, keyword, date, direction, api_key).await?;
        }
    }

    Ok(())
}

fn setup_tracing(format: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("trendlens=debug,info")
    } else {
        tracing_subscriber::EnvFilter::new("trendlens=info,warn")
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn analyze(
    mut config: Config,
    keyword: String,
    threshold: Option<f64>,
    region: Option<String>,
    year: Option<i32>,
    explain: bool,
    api_key: Option<String>,
) -> Result<()> {
    if let Some(t) = threshold {
        config.anomaly.change_threshold = t;
    }
    if let Some(r) = region {
        config.trends.region = r.to_uppercase();
    }
    if let Some(y) = year {
        config.trends.timeframe = DateRange::calendar_year(y);
    }
    config.validate()?;

    let fetcher = TrendsFetcher::new(config.trends.clone())?;

    println!("Fetching trends data for '{keyword}'...");
    let outcome = fetcher.fetch(&keyword).await;

    if let Some(message) = outcome.status.user_message() {
        println!("{message}");
    }
    if outcome.series.is_empty() {
        return Ok(());
    }

    let annotated = annotate(&outcome.series, config.anomaly.change_threshold);

    println!();
    print!("{}", report::render_table(&annotated));
    println!();
    println!("{}", report::render_caption(&config));
    println!();

    if !explain {
        print!("{}", report::render_anomaly_summary(&annotated, config.anomaly.change_threshold));
        return Ok(());
    }

    let token = config.llm.resolve_token(api_key.as_deref());
    let explainer = Explainer::new(config.llm.clone(), config.trends.region.clone(), token);

    println!("Anomalies");
    let anomalies = trendlens::anomaly::anomalies(&annotated);
    if anomalies.is_empty() {
        println!(
            "No anomalies detected (±{:.0}% WoW).",
            config.anomaly.change_threshold * 100.0
        );
        return Ok(());
    }

    for point in anomalies {
        println!("  {}", report::anomaly_heading(point));
        let explanation = explainer.explain(&keyword, point.date, point.direction).await;
        println!("    {}", explanation.text);
    }

    Ok(())
}

async fn explain_one(
    config: Config,
    keyword: String,
    date: NaiveDate,
    direction: String,
    api_key: Option<String>,
) -> Result<()> {
    let direction = ChangeDirection::parse(&direction)
        .ok_or_else(|| anyhow::anyhow!("direction must be 'spiked' or 'dropped'"))?;

    let token = config.llm.resolve_token(api_key.as_deref());
    let explainer = Explainer::new(config.llm.clone(), config.trends.region.clone(), token);

    let explanation = explainer.explain(&keyword, date, direction).await;
    println!("{}", explanation.text);

    Ok(())
}
