//! Launcher window
//!
//! One floating "open" button that brings up the native file dialog, plus the
//! recent files list. Nothing in the window reports failures; those only go to
//! the log.

use citra_launcher::log_filter::FRONTEND;
use citra_launcher::picker::DialogPicker;
use citra_launcher::{
    CanonicalResolver, LauncherConfig, LauncherShim, NativeCore, ResourceHandle, ResultStatus,
    SelectionOutcome,
};
use egui::{Align2, RichText, Vec2};
use std::path::PathBuf;

pub struct LauncherApp {
    shim: LauncherShim<CanonicalResolver, NativeCore>,
    config: LauncherConfig,
    /// Path of the last game handed to the core
    last_loaded: Option<String>,
}

impl LauncherApp {
    pub fn new(shim: LauncherShim<CanonicalResolver, NativeCore>, config: LauncherConfig) -> Self {
        Self {
            shim,
            config,
            last_loaded: None,
        }
    }

    fn open_document(&mut self) {
        self.shim.request_mut().start_dir = self.config.last_directory.clone();

        // The dialog blocks, so the answer is already waiting once this returns
        if let Err(e) = self.shim.request_file_selection(&mut DialogPicker) {
            log::error!(target: FRONTEND, "Could not open file dialog: {}", e);
        }
    }

    fn launch_recent(&mut self, path: PathBuf) {
        let handle = match ResourceHandle::from_path(&path) {
            Ok(handle) => handle,
            Err(e) => {
                log::warn!(target: FRONTEND, "Ignoring recent entry: {}", e);
                return;
            }
        };
        let outcome = self.shim.on_selection_complete(ResultStatus::Ok, Some(handle));
        self.record(outcome);
    }

    fn record(&mut self, outcome: SelectionOutcome) {
        if let SelectionOutcome::Loaded(resource) = outcome {
            self.config.add_recent(PathBuf::from(&resource.path));
            self.last_loaded = Some(resource.path);
            if let Err(e) = self.config.save() {
                log::error!(target: FRONTEND, "Failed to save configuration: {}", e);
            }
        }
    }

    fn render_recent(&mut self, ui: &mut egui::Ui) {
        if self.config.recent_files.is_empty() {
            ui.label(RichText::new("No recent games").weak());
            return;
        }

        let mut to_launch = None;
        egui::ScrollArea::vertical().show(ui, |ui| {
            for path in &self.config.recent_files {
                let name = path
                    .file_name()
                    .and_then(|s| s.to_str())
                    .unwrap_or("Unknown");
                if ui
                    .button(name)
                    .on_hover_text(path.display().to_string())
                    .clicked()
                {
                    to_launch = Some(path.clone());
                }
            }
        });

        if let Some(path) = to_launch {
            self.launch_recent(path);
        }
    }
}

impl eframe::App for LauncherApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Some(outcome) = self.shim.poll() {
            self.record(outcome);
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Recent");
            ui.separator();
            self.render_recent(ui);

            if let Some(ref path) = self.last_loaded {
                ui.separator();
                ui.label(format!("Started: {}", path));
            }
        });

        egui::Area::new(egui::Id::new("open_game"))
            .anchor(Align2::RIGHT_BOTTOM, Vec2::new(-16.0, -16.0))
            .show(ctx, |ui| {
                let button = egui::Button::new(RichText::new("+").size(28.0))
                    .min_size(Vec2::splat(56.0));
                if ui.add(button).on_hover_text("Open game").clicked() {
                    self.open_document();
                }
            });
    }
}
