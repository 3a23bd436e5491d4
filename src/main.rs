mod config;
mod gui;
mod midi;
mod notify;
mod render;
mod session;

use clap::Parser;
use config::AppConfig;
use eframe::egui;
use gui::SketchApp;
use midi::MidiAccess;
use std::error::Error;
use std::path::PathBuf;

/// Draw with two MIDI knobs.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Path to the JSON config file
    #[arg(long, default_value = AppConfig::CONFIG_FILE_NAME)]
    config: PathBuf,

    /// Open MIDI at startup and select the first input whose name contains this
    #[arg(long)]
    input: Option<String>,

    /// Print available MIDI inputs and exit
    #[arg(long)]
    list_inputs: bool,

    /// Write the effective config to --config and exit
    #[arg(long)]
    write_config: bool,
}

fn list_inputs(config: &AppConfig) -> Result<(), Box<dyn Error>> {
    let access = MidiAccess::request(&config.client_name)?;
    if access.inputs().is_empty() {
        println!("No MIDI inputs found");
    }
    for (i, input) in access.inputs().iter().enumerate() {
        println!("{}: {} ({})", i, input.display_name, input.id);
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = AppConfig::load_from_file(&cli.config);

    if cli.write_config {
        return config.save_to_file(&cli.config);
    }
    if cli.list_inputs {
        return list_inputs(&config);
    }

    let side = config.canvas.size;
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("knobsketch")
            .with_inner_size([side + 40.0, side + 160.0]),
        ..Default::default()
    };

    let app = SketchApp::new(config, cli.input);
    eframe::run_native(
        "knobsketch",
        options,
        Box::new(|cc| {
            let mut app = app;
            if app.wants_midi_at_startup() {
                app.request_access(&cc.egui_ctx);
            }
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| e.to_string())?;

    Ok(())
}
