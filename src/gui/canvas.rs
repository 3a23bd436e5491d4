use super::app::SketchApp;
use eframe::egui;

pub fn render_canvas(app: &mut SketchApp, ui: &mut egui::Ui) {
    let Some(renderer) = app.renderer.as_mut() else {
        ui.centered_and_justified(|ui| {
            match app.notifications.latest().filter(|n| n.is_error()) {
                Some(error) => ui.colored_label(egui::Color32::RED, error.text.as_str()),
                None => ui.label("Pick an input and assign the X and Y controls to start drawing."),
            };
        });
        return;
    };

    // Re-upload only when the surface changed since the last upload.
    if renderer.take_dirty() || app.texture.is_none() {
        let surface = renderer.surface();
        let image = egui::ColorImage::from_rgb([surface.side(), surface.side()], surface.rgb());
        if let Some(texture) = app.texture.as_mut() {
            texture.set(image, egui::TextureOptions::LINEAR);
        } else {
            let texture = ui.ctx().load_texture("sketch", image, egui::TextureOptions::LINEAR);
            app.texture = Some(texture);
        }
    }
    let Some(texture) = app.texture.as_ref() else {
        return;
    };

    let available = ui.available_size();
    let side = available.x.min(available.y).max(1.0);
    let (response, painter) = ui.allocate_painter(egui::vec2(side, side), egui::Sense::hover());
    let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
    painter.image(texture.id(), response.rect, uv, egui::Color32::WHITE);
}
