use clap::Parser;
use log::{error, info};

use departure_beacon::{
    actuator::{Blink1Tool, Blink1ToolConfig},
    error::Result,
    feed::{FeedClient, FeedClientConfig, FeedRepository, JourneyDirection},
    select::{DepartureSelector, SelectorConfig},
    signal::{BeaconConfig, BeaconEngine},
};

/// Show real-time train departure times for one station on a blink(1)
/// light.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// trafiklab.se API key
    #[arg(long, env = "TRAFIKLAB_API_KEY")]
    api_key: String,

    /// Station to watch (default: Flemingsberg, commuter trains)
    #[arg(long, default_value = "9526")]
    station_id: String,

    /// Feed endpoint base url override
    #[arg(long)]
    base_url: Option<String>,

    /// Relevant travel direction
    #[arg(long, default_value = "inbound")]
    direction: JourneyDirection,

    /// Only consider departures of this line
    #[arg(long)]
    line: Option<String>,

    /// Seconds between feed polls
    #[arg(long, default_value_t = 10)]
    poll_interval_secs: u64,

    /// Path to the blink1-tool executable
    #[arg(long, default_value = "blink1-tool")]
    blink1_tool: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let mut feed_config = FeedClientConfig::new(cli.api_key, &cli.station_id);
    if let Some(base_url) = cli.base_url {
        feed_config = feed_config.with_base_url(base_url);
    }
    let repository = FeedRepository::new(Box::new(FeedClient::new(feed_config)?));

    let mut selector_config = SelectorConfig::new(cli.direction);
    if let Some(line) = &cli.line {
        selector_config = selector_config.with_line(line);
    }
    let selector = DepartureSelector::new(selector_config);

    // No light, no point: an unreachable actuator is fatal here, while
    // later command failures are retried by the refresh loop.
    let actuator_config = Blink1ToolConfig::default().with_program(cli.blink1_tool);
    let actuator = Blink1Tool::acquire(actuator_config).await?;

    let config = BeaconConfig::default().with_poll_interval(cli.poll_interval_secs);
    let controller = BeaconEngine::new(config, repository, selector, Box::new(actuator)).start();

    info!(
        "watching station {} ({}) every {}s",
        cli.station_id, cli.direction, cli.poll_interval_secs
    );

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("interrupt received, shutting down");
            controller.shutdown().await?;
        }
        status = controller.until_stopped() => {
            error!("beacon stopped: {status}");
        }
    }

    Ok(())
}
