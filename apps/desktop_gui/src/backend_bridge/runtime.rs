//! Runtime bridge between the UI command queue and the OCR client.

use std::thread;

use client_core::{OcrClient, OcrService};
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;

pub fn launch(
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
    client: OcrClient,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                tracing::error!("failed to build backend runtime: {err}");
                let _ = ui_tx.try_send(UiEvent::WorkerFailed(format!(
                    "Backend worker startup failure: {err}"
                )));
                return;
            }
        };

        let _ = ui_tx.try_send(UiEvent::Info(format!(
            "Ready; submitting to {}",
            client.endpoint()
        )));

        runtime.block_on(async move {
            while let Ok(cmd) = cmd_rx.recv() {
                let event = match cmd {
                    BackendCommand::Submit { submission } => {
                        UiEvent::SubmitFinished(client.submit(submission).await)
                    }
                    BackendCommand::CheckHealth => UiEvent::HealthChecked(
                        client
                            .health()
                            .await
                            .map(|health| health.status)
                            .map_err(|err| format!("{err:#}")),
                    ),
                };
                if ui_tx.send(event).is_err() {
                    tracing::debug!("ui event channel closed; stopping backend worker");
                    break;
                }
            }
            tracing::info!("backend worker stopped");
        });
    })
}
