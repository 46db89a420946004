mod backend_bridge;
mod controller;
mod ui;

use anyhow::{anyhow, Result};
use clap::Parser;
use client_core::{load_settings, OcrClient};
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::ui::{RecuRapidApp, StartupConfig};

#[derive(Parser, Debug)]
#[command(name = "recurapide_gui")]
struct Args {
    /// OCR endpoint; defaults to recurapide.toml / OCR_ENDPOINT.
    #[arg(long)]
    endpoint: Option<String>,
    /// Client-side request timeout in seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(endpoint) = args.endpoint {
        settings.endpoint = endpoint;
    }
    if let Some(timeout_secs) = args.timeout_secs {
        settings.request_timeout_secs = Some(timeout_secs);
    }
    let client = OcrClient::from_settings(&settings)?;
    let startup = StartupConfig {
        endpoint: client.endpoint().to_string(),
    };

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(16);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(64);
    backend_bridge::runtime::launch(cmd_rx, ui_tx, client);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Reçu Rapid")
            .with_inner_size([720.0, 760.0])
            .with_min_inner_size([480.0, 520.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Reçu Rapid",
        options,
        Box::new(move |_cc| Ok(Box::new(RecuRapidApp::new(cmd_tx, ui_rx, startup)))),
    )
    .map_err(|err| anyhow!("failed to run window: {err}"))
}
