//! Desktop launcher UI built on egui/eframe

mod app;

pub use app::LauncherApp;
