pub mod app;
pub mod canvas;

// Re-export commonly used types for convenience
pub use app::AppConfig;
pub use canvas::CanvasConfig;
