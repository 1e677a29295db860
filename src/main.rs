use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use m3u_aggregator::{
    config::{ChannelList, Config, SourceList, StopCondition},
    ingestor::Aggregator,
    proxy::PlaylistGenerator,
    report::AggregationReport,
    sources::HttpPlaylistFetcher,
};

#[derive(Parser)]
#[command(name = "m3u-aggregator")]
#[command(version)]
#[command(about = "Collects wanted channels from multiple M3U sources into one playlist")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Channel list JSON (overrides config file)
    #[arg(long, value_name = "FILE")]
    channels: Option<PathBuf>,

    /// Source list JSON (overrides config file)
    #[arg(long, value_name = "FILE")]
    sources: Option<PathBuf>,

    /// Output playlist path (overrides config file)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Stop visiting sources once every channel has a URL
    #[arg(long)]
    stop_when_all_found: bool,

    /// Pause between sources, e.g. "500ms" (overrides config file)
    #[arg(long, value_name = "DURATION", value_parser = humantime::parse_duration)]
    pacing_delay: Option<Duration>,

    /// Print the report as JSON instead of text
    #[arg(long)]
    json_report: bool,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = format!("m3u_aggregator={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting M3U Aggregator v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load_from_file(&cli.config)?;
    info!("Configuration loaded from: {}", cli.config.display());

    // Override config with CLI arguments
    if let Some(channels) = cli.channels {
        config.inputs.channels_file = channels;
    }
    if let Some(sources) = cli.sources {
        config.inputs.sources_file = sources;
    }
    if let Some(output) = cli.output {
        config.output.path = output;
    }
    if let Some(delay) = cli.pacing_delay {
        config.fetch.pacing_delay = delay;
    }
    if cli.stop_when_all_found {
        config.aggregation.stop_condition = StopCondition::AllFound;
    }

    // Both lists must load before anything is fetched
    let channels = ChannelList::load(&config.inputs.channels_file)?;
    if !channels.conflicts().is_empty() {
        warn!(
            "{} channels are listed under more than one group, first assignment kept",
            channels.conflicts().len()
        );
    }
    let sources = SourceList::load(&config.inputs.sources_file)?;

    let fetcher = HttpPlaylistFetcher::new(&config.fetch)?;
    let outcome = Aggregator::new(fetcher)
        .with_pacing_delay(config.fetch.pacing_delay)
        .with_stop_condition(config.aggregation.stop_condition)
        .aggregate(&sources, &channels)
        .await?;

    PlaylistGenerator::new(&channels)
        .write_to(&outcome, &config.output.path)
        .await?;

    let report = AggregationReport::from_outcome(&outcome);
    if report.all_found() {
        info!("All {} channels found", report.requested);
    } else {
        warn!(
            "{} of {} channels not found in any source",
            report.missing.len(),
            report.requested
        );
    }
    if cli.json_report {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }

    Ok(())
}
