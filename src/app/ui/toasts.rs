use eframe::egui::{self, Align2, Color32, Context, Frame, RichText, vec2};
use pension_graph::controller::NotificationLevel;

use super::super::Toast;

fn accent(level: NotificationLevel) -> Color32 {
    match level {
        NotificationLevel::Info => Color32::from_rgb(103, 196, 255),
        NotificationLevel::Success => Color32::from_rgb(120, 200, 130),
        NotificationLevel::Error => Color32::from_rgb(235, 110, 100),
    }
}

/// Newest toast at the bottom-right corner, older ones stacked above it.
pub(in crate::app) fn draw_toasts(ctx: &Context, toasts: &[Toast]) {
    if toasts.is_empty() {
        return;
    }

    egui::Area::new(egui::Id::new("toasts"))
        .anchor(Align2::RIGHT_BOTTOM, vec2(-16.0, -16.0))
        .interactable(false)
        .show(ctx, |ui| {
            ui.set_max_width(340.0);
            for toast in toasts {
                let color = accent(toast.notification.level);
                Frame::popup(ui.style()).stroke(egui::Stroke::new(1.0, color)).show(ui, |ui| {
                    ui.label(RichText::new(&toast.notification.title).strong().color(color));
                    ui.label(toast.notification.message.as_str());
                });
                ui.add_space(6.0);
            }
        });
}
