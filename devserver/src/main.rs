use anyhow::Context;
use api_bridge::ApiBridge;
use chrono::Utc;
use clap::Parser;
use config::ServerConfig;
use dataset::Dataset;
use generator::{generate, FixtureConfig, FIXTURE_USERS};
use log::info;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;

mod api_bridge;
mod config;
mod dataset;
mod generator;

#[derive(Parser)]
#[command(author, version, about = "Local fixture API for the 아주한끼 client")]
struct Args {
    /// Load the server config from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    port: Option<u16>,
    #[arg(long)]
    seed: Option<u64>,
    /// Number of generated restaurants
    #[arg(long)]
    count: Option<usize>,
    /// Fixed delay added to every response
    #[arg(long)]
    latency_ms: Option<u64>,
    /// Extra random delay on top of `latency_ms`, to shuffle response order
    #[arg(long)]
    latency_jitter_ms: Option<u64>,
    /// Print a summary of the generated data set and exit
    #[arg(long, default_value_t = false)]
    offline: bool,
    /// Append the offline summary to this file as well
    #[arg(long)]
    report: Option<PathBuf>,
}

impl Args {
    fn server_config(&self) -> anyhow::Result<ServerConfig> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::load(path)?,
            None => ServerConfig::default(),
        };
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(count) = self.count {
            config.count = count;
        }
        if let Some(latency) = self.latency_ms {
            config.latency_ms = latency;
        }
        if let Some(jitter) = self.latency_jitter_ms {
            config.latency_jitter_ms = jitter;
        }
        Ok(config)
    }
}

fn fixture_config(config: &ServerConfig) -> FixtureConfig {
    FixtureConfig {
        seed: config.seed,
        count: config.count,
        center: config.center,
        spread_deg: config.spread_deg,
        ..Default::default()
    }
}

fn summary(data: &Dataset) -> String {
    let categories: Vec<String> = data
        .category_counts()
        .into_iter()
        .map(|(category, count)| format!("{category}={count}"))
        .collect();
    format!(
        "restaurants={} reviews={} visits={} users={} categories=[{}]\n",
        data.restaurant_count(),
        data.review_count(),
        data.visit_count(),
        data.users().count(),
        categories.join(", ")
    )
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = args.server_config()?;
    let data = generate(&fixture_config(&config), Utc::now());

    if args.offline {
        let report = summary(&data);
        print!("Offline fixture -> {report}");
        if let Some(path) = &args.report {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening report {}", path.display()))?;
            file.write_all(report.as_bytes())?;
        }
        return Ok(());
    }

    info!(
        "fixture: {} restaurants around ({}, {}), latency {}ms +{}ms",
        data.restaurant_count(),
        config.center.lat,
        config.center.lng,
        config.latency_ms,
        config.latency_jitter_ms
    );
    let bridge = ApiBridge::new(data, config.latency());
    for (login_id, name) in FIXTURE_USERS {
        if let Some(token) = bridge.open_session(login_id) {
            info!("fixture user {name}: cookie session={token}");
        }
    }

    let runtime = TokioBuilder::new_multi_thread()
        .enable_all()
        .build()
        .context("creating server runtime")?;
    runtime.block_on(async {
        let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
        let (bound, server) = bridge.bind(addr, async {
            if let Err(err) = signal::ctrl_c().await {
                log::error!("awaiting Ctrl+C failed: {err}");
            }
        })?;
        println!("Fixture API listening on http://{bound} (Ctrl+C to stop)");
        server.await;
        Ok::<(), anyhow::Error>(())
    })
}
