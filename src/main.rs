mod app;

use std::time::Duration;

use anyhow::{Context, anyhow};
use clap::Parser;
use pension_graph::config::{DEFAULT_API_URL, Settings};
use pension_graph::layout::{DEFAULT_SEED, LayoutConfig};
use tracing::info;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Base URL of the graph search service.
    #[arg(long, env = "KG_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Start against the live service instead of the built-in mock data.
    #[arg(long)]
    live: bool,

    /// Seed for the layout's scatter force.
    #[arg(long, default_value_t = DEFAULT_SEED)]
    layout_seed: u64,

    #[arg(long, default_value_t = 300)]
    debounce_ms: u64,

    #[arg(long, default_value_t = 30)]
    request_timeout_secs: u64,

    #[arg(long, default_value_t = tracing::Level::INFO)]
    log_level: tracing::Level,
}

impl Args {
    fn settings(&self) -> anyhow::Result<Settings> {
        Settings {
            api_url: self.api_url.clone(),
            live: self.live,
            debounce: Duration::from_millis(self.debounce_ms),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            layout: LayoutConfig::default().with_seed(self.layout_seed),
        }
        .validate()
        .context("invalid command line settings")
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .init();

    let settings = args.settings()?;
    let source = settings
        .initial_source()
        .context("failed to set up the graph source")?;
    info!(source = source.label(), api_url = %settings.api_url, "starting pension graph explorer");

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Pension Plan Knowledge Graph",
        options,
        Box::new(move |cc| Ok(Box::new(app::PensionGraphApp::new(cc, settings, source)))),
    )
    .map_err(|error| anyhow!("viewer exited with an error: {error}"))
}
