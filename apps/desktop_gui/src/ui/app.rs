use std::path::PathBuf;

use client_core::{FormController, SelectedFile};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::controller::orchestration::dispatch_backend_command;
use crate::controller::reducer::apply_ui_event;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp", "tif", "tiff"];

#[derive(Debug, Clone)]
pub struct StartupConfig {
    pub endpoint: String,
}

pub struct RecuRapidApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,

    endpoint: String,
    form: FormController,
    // egui edits a plain String; mirrored into the form on change.
    text_draft: String,
    status: String,
}

impl RecuRapidApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        startup: StartupConfig,
    ) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            endpoint: startup.endpoint,
            form: FormController::new(),
            text_draft: String::new(),
            status: "Backend worker starting...".to_string(),
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            apply_ui_event(&mut self.form, &mut self.status, event);
        }
    }

    fn pick_image(&mut self) {
        let mut dialog = rfd::FileDialog::new().add_filter("Images", IMAGE_EXTENSIONS);
        if let Some(dir) = default_upload_dir() {
            dialog = dialog.set_directory(dir);
        }
        let Some(path) = dialog.pick_file() else {
            return;
        };

        match SelectedFile::load(&path) {
            Ok(file) => {
                self.status = format!("Selected {}", file.filename);
                self.form.select_file(Some(file));
            }
            Err(err) => {
                tracing::warn!("rejected image selection: {err:#}");
                self.status = format!("Could not use {}: {err:#}", path.display());
            }
        }
    }

    fn submit(&mut self) {
        let Some(submission) = self.form.begin_submit() else {
            return;
        };
        self.status = "Submitting...".to_string();
        if !dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::Submit { submission },
            &mut self.status,
        ) {
            self.form.cancel_submit();
        }
    }

    fn check_health(&mut self) {
        if dispatch_backend_command(&self.cmd_tx, BackendCommand::CheckHealth, &mut self.status) {
            self.status = "Checking OCR service...".to_string();
        }
    }

    fn show_form(&mut self, ui: &mut egui::Ui) {
        egui::Frame::group(ui.style())
            .inner_margin(egui::Margin::same(12))
            .show(ui, |ui| {
                ui.heading("Reçu Rapid");
                ui.add_space(8.0);

                ui.label("Upload Image");
                ui.horizontal(|ui| {
                    let picked = self
                        .form
                        .selected_file()
                        .map(|file| format!("{} ({} bytes)", file.filename, file.size_bytes()))
                        .unwrap_or_else(|| "No file chosen".to_string());
                    if ui.button("Choose image...").clicked() {
                        self.pick_image();
                    }
                    ui.label(picked);
                    if self.form.has_file()
                        && ui
                            .add(egui::Button::new("Discard").fill(egui::Color32::from_rgb(
                                0xdc, 0x35, 0x45,
                            )))
                            .clicked()
                    {
                        self.form.discard_file();
                        self.status = "Image discarded".to_string();
                    }
                });
                ui.add_space(8.0);

                if !self.form.has_file() {
                    ui.label("Or Enter Unformatted Payment Records");
                }
                let text_edit = egui::TextEdit::multiline(&mut self.text_draft)
                    .hint_text(self.form.placeholder())
                    .desired_rows(5)
                    .desired_width(f32::INFINITY);
                if ui.add(text_edit).changed() {
                    self.form.edit_text(self.text_draft.clone());
                }
                ui.add_space(8.0);

                ui.horizontal(|ui| {
                    let submitting = self.form.is_submitting();
                    if ui
                        .add_enabled(!submitting, egui::Button::new("Submit"))
                        .clicked()
                    {
                        self.submit();
                    }
                    if submitting {
                        ui.spinner();
                    }
                    if ui.button("Check service").clicked() {
                        self.check_health();
                    }
                });
            });
    }

    fn show_result(&self, ui: &mut egui::Ui) {
        if let Some(response) = self.form.response() {
            egui::Frame::new()
                .fill(egui::Color32::from_rgb(0xd1, 0xe7, 0xdd))
                .inner_margin(egui::Margin::same(10))
                .corner_radius(egui::CornerRadius::same(4))
                .show(ui, |ui| {
                    ui.label(
                        egui::RichText::new("Your Transactions")
                            .strong()
                            .color(egui::Color32::from_rgb(0x0f, 0x51, 0x32)),
                    );
                    egui::ScrollArea::vertical()
                        .max_height(360.0)
                        .show(ui, |ui| {
                            ui.label(
                                egui::RichText::new(response)
                                    .monospace()
                                    .color(egui::Color32::BLACK),
                            );
                        });
                });
        }

        if let Some(error) = self.form.error() {
            egui::Frame::new()
                .fill(egui::Color32::from_rgb(0xf8, 0xd7, 0xda))
                .inner_margin(egui::Margin::same(10))
                .corner_radius(egui::CornerRadius::same(4))
                .show(ui, |ui| {
                    ui.label(
                        egui::RichText::new("Error")
                            .strong()
                            .color(egui::Color32::from_rgb(0x84, 0x20, 0x29)),
                    );
                    ui.label(egui::RichText::new(error).color(egui::Color32::BLACK));
                });
        }
    }
}

fn default_upload_dir() -> Option<PathBuf> {
    dirs::picture_dir()
        .or_else(dirs::download_dir)
        .or_else(dirs::document_dir)
        .or_else(dirs::home_dir)
}

impl eframe::App for RecuRapidApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.small(self.status.as_str());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.small(self.endpoint.as_str());
                });
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                self.show_form(ui);
                ui.add_space(12.0);
                self.show_result(ui);
            });
        });

        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }
}
