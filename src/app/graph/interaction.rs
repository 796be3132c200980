use eframe::egui::{self, Pos2, Rect, Ui, Vec2};

use super::super::ViewModel;

const MIN_ZOOM: f32 = 0.2;
const MAX_ZOOM: f32 = 8.0;

impl ViewModel {
    /// Wheel zoom that keeps the point under the cursor fixed.
    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let anchor: Vec2 = pointer - rect.center() - self.pan;

        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        let zoom = (self.zoom * zoom_factor).clamp(MIN_ZOOM, MAX_ZOOM);
        let applied = zoom / self.zoom;
        self.zoom = zoom;
        self.pan = pointer - rect.center() - anchor * applied;
    }

    pub(in crate::app) fn handle_graph_pan(&mut self, response: &egui::Response) {
        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
            || response.dragged_by(egui::PointerButton::Primary)
        {
            self.pan += response.drag_delta();
        }
    }
}

/// Closest node whose disc contains the pointer.
pub(super) fn hovered_index(
    ui: &Ui,
    visible_indices: &[usize],
    screen_positions: &[Pos2],
    screen_radii: &[f32],
) -> Option<usize> {
    let pointer = ui.input(|input| input.pointer.hover_pos())?;
    visible_indices
        .iter()
        .filter_map(|&index| {
            let distance = screen_positions[index].distance(pointer);
            (distance <= screen_radii[index]).then_some((index, distance))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(index, _)| index)
}
