use super::app::{MidiStatus, SketchApp};
use crate::session::{Axis, Event, Phase};
use eframe::egui;

pub fn render_settings(app: &mut SketchApp, ui: &mut egui::Ui, ctx: &egui::Context) {
    match &app.midi {
        MidiStatus::NotRequested => {
            if ui.button("Setup MIDI").clicked() {
                app.request_access(ctx);
            }
        }
        MidiStatus::Denied(reason) => {
            ui.colored_label(egui::Color32::RED, reason.as_str());
        }
        MidiStatus::Granted(_) => {
            let forced = app.settings_open.take();
            egui::CollapsingHeader::new("MIDI Settings")
                .default_open(true)
                .open(forced)
                .show(ui, |ui| render_midi_settings(app, ui, ctx));
        }
    }

    render_notifications(app, ui);
}

fn render_midi_settings(app: &mut SketchApp, ui: &mut egui::Ui, ctx: &egui::Context) {
    let MidiStatus::Granted(access) = &app.midi else {
        return;
    };
    let inputs = access.inputs().to_vec();
    let selected = app.session.selected_input().cloned();

    ui.label(format!("Inputs: {}", inputs.len()));

    let mut chosen = None;
    ui.horizontal(|ui| {
        let selected_text = selected
            .as_ref()
            .and_then(|id| inputs.iter().find(|input| &input.id == id))
            .map(|input| input.display_name.clone())
            .unwrap_or_else(|| "(none)".to_owned());

        egui::ComboBox::from_label("Input")
            .selected_text(selected_text)
            .show_ui(ui, |ui| {
                for input in &inputs {
                    let is_selected = selected.as_ref() == Some(&input.id);
                    if ui.selectable_label(is_selected, input.display_name.as_str()).clicked() {
                        chosen = Some(input.id.clone());
                    }
                }
            });

        let can_assign = app.session.can_assign();
        for axis in [Axis::X, Axis::Y] {
            let armed = app.session.assigning() == Some(axis);
            let button = egui::Button::new(format!("Select {} Control", axis)).selected(armed);
            if ui.add_enabled(can_assign, button).clicked() {
                app.apply(Event::Assign(axis));
            }
        }
    });

    if let Some(id) = chosen {
        app.select_input(id, ctx);
    }

    ui.monospace(app.session.status_line());
    ui.monospace(app.session.state_line());
    ui.label(format!(
        "X: {}  Y: {}",
        control_label(app.session.assignment(Axis::X)),
        control_label(app.session.assignment(Axis::Y)),
    ));
    if app.session.phase() == Phase::Running {
        ui.label("Drawing. Press any key to clear the canvas.");
    }
}

fn control_label(control: Option<u8>) -> String {
    control.map_or_else(|| "unassigned".to_string(), |c| format!("CC {}", c))
}

fn render_notifications(app: &SketchApp, ui: &mut egui::Ui) {
    if app.notifications.is_empty() {
        return;
    }

    ui.separator();
    egui::ScrollArea::vertical()
        .max_height(80.0)
        .stick_to_bottom(true)
        .show(ui, |ui| {
            for notification in app.notifications.iter() {
                let color = if notification.is_error() {
                    egui::Color32::RED
                } else {
                    ui.visuals().text_color()
                };
                ui.colored_label(color, notification.text.as_str());
            }
        });
}
