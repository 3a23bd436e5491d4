pub mod app;
pub mod canvas;
pub mod settings_ui;

pub use app::SketchApp;
