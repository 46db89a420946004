use std::{path::PathBuf, process::ExitCode};

use anyhow::Result;
use clap::{Parser, Subcommand};
use client_core::{load_settings, FormController, OcrClient, SelectedFile};
use shared::protocol::ExtractionResponse;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "recurapide", about = "Send a receipt image or transaction text to the OCR service")]
struct Args {
    /// Overrides the endpoint from recurapide.toml / OCR_ENDPOINT.
    #[arg(long, global = true)]
    endpoint: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit an image or unformatted text. The image wins if both are given.
    Submit {
        #[arg(long)]
        image: Option<PathBuf>,
        #[arg(long)]
        text: Option<String>,
        /// Print only `formatted_data` from the reply when it has one.
        #[arg(long)]
        formatted_only: bool,
    },
    /// Ask the service whether it is running.
    Health,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(endpoint) = args.endpoint {
        settings.endpoint = endpoint;
    }
    tracing::debug!(endpoint = %settings.endpoint, timeout = ?settings.request_timeout(), "resolved settings");
    let client = OcrClient::from_settings(&settings)?;

    match args.command {
        Command::Submit {
            image,
            text,
            formatted_only,
        } => {
            let mut form = FormController::new();
            if let Some(text) = text {
                form.edit_text(text);
            }
            if let Some(path) = image {
                form.select_file(Some(SelectedFile::load(&path)?));
            }

            form.submit(&client).await;

            if let Some(error) = form.error() {
                eprintln!("Error: {error}");
                return Ok(ExitCode::FAILURE);
            }
            if let Some(response) = form.response() {
                let output = if formatted_only {
                    formatted_data_only(response)
                } else {
                    response.to_string()
                };
                println!("{output}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Health => match client.health().await {
            Ok(health) => {
                println!("{} is {}", client.health_url(), health.status);
                Ok(ExitCode::SUCCESS)
            }
            Err(err) => {
                eprintln!("Error: {err:#}");
                Ok(ExitCode::FAILURE)
            }
        },
    }
}

/// Narrows a rendered reply to its `formatted_data`, or returns it unchanged.
fn formatted_data_only(response: &str) -> String {
    serde_json::from_str::<ExtractionResponse>(response)
        .ok()
        .and_then(|reply| reply.formatted_data)
        .and_then(|data| serde_json::to_string_pretty(&data).ok())
        .unwrap_or_else(|| response.to_string())
}
