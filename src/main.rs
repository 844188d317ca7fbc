//! Sic bo outcome prediction service

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use sicbo_oracle::{
    config::Config,
    engine::PredictionManager,
    feed::{run_feed, FeedClient},
    server::{router, AppState},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "sicbo-oracle")]
#[command(about = "Sic bo outcome prediction service")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the results feed and serve predictions over HTTP
    Run,
    /// Fetch the history once, calibrate, and print the prediction
    Fetch,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    match cli.command {
        Commands::Run => run(config).await,
        Commands::Fetch => fetch_once(config).await,
    }
}

async fn run(config: Config) -> anyhow::Result<()> {
    tracing::info!("starting sic bo prediction service");

    let state = Arc::new(AppState::new(&config.ensemble));
    let client = FeedClient::new(&config.feed);
    let poll_interval = Duration::from_secs(config.feed.poll_interval_secs);

    tokio::spawn(run_feed(client, poll_interval, state.clone()));
    tracing::info!(
        url = %config.feed.url,
        interval_secs = config.feed.poll_interval_secs,
        "feed poller started"
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("listening on http://{addr}");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn fetch_once(config: Config) -> anyhow::Result<()> {
    let client = FeedClient::new(&config.feed);
    let batch = client.fetch_latest().await?;
    anyhow::ensure!(!batch.is_empty(), "feed returned no history");

    let next_session = batch.last().map(|r| r.session + 1);
    let mut manager = PredictionManager::new(&config.ensemble);
    manager.load_initial(batch);

    let prediction = manager
        .current_prediction()
        .ok_or_else(|| anyhow::anyhow!("no prediction available"))?;

    println!("\n🔮 Next round prediction\n");
    if let Some(session) = next_session {
        println!("Session:    {session}");
    }
    println!("Call:       {}", prediction.side.label());
    println!("Confidence: {:.0}%", prediction.confidence * 100.0);
    println!(
        "Totals:     {}",
        prediction.magnitude.map(|t| t.to_string()).join("-")
    );

    println!("\nPredictor weights:");
    for (id, weight) in manager.weight_table() {
        println!("  {id:<20} {weight:.4}");
    }

    Ok(())
}
