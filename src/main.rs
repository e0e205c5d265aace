mod app;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use kg_canvas::EngineConfig;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Graph payload (JSON). A bundled sample graph is shown when omitted.
    #[arg(long)]
    graph: Option<PathBuf>,

    /// Engine configuration (JSON). Missing fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for the initial layout, for reproducible runs.
    #[arg(long)]
    seed: Option<u64>,
}

fn load_config(args: &Args) -> anyhow::Result<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            EngineConfig::from_json_str(&raw)
                .with_context(|| format!("failed to parse config {}", path.display()))?
        }
        None => EngineConfig::default(),
    };

    if args.seed.is_some() {
        config.layout.seed = args.seed;
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    let graph = args.graph.clone();
    eframe::run_native(
        "kg-canvas",
        options,
        Box::new(move |cc| Ok(Box::new(app::KgCanvasApp::new(cc, graph, config)))),
    )
    .map_err(|error| anyhow::anyhow!("viewer exited with an error: {error}"))
}
