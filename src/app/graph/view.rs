use std::collections::HashMap;

use eframe::egui::{self, Align2, Color32, FontId, Pos2, Sense, Stroke, Ui, vec2};
use pension_graph::controller::QueryController;

use super::super::render_utils::{
    Viewport, blend_color, circle_visible, community_color, draw_background, node_radius,
};
use super::super::{UiAction, ViewModel};
use super::interaction::hovered_index;

pub(in crate::app) fn draw_graph(
    ui: &mut Ui,
    controller: &QueryController,
    view: &mut ViewModel,
    actions: &mut Vec<UiAction>,
) {
    let Some(snapshot) = controller.rendered() else {
        return;
    };

    let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
    let painter = ui.painter_at(rect);

    view.handle_graph_zoom(ui, rect, &response);
    view.handle_graph_pan(&response);
    if response.double_clicked() {
        actions.push(UiAction::ResetView);
    }

    let viewport = Viewport::new(rect, view.pan, view.zoom, controller.layout_config());
    draw_background(&painter, rect, view.pan, viewport.scale());

    let screen_positions = snapshot
        .nodes
        .iter()
        .map(|node| viewport.to_screen(node.position.unwrap_or_default()))
        .collect::<Vec<Pos2>>();
    let screen_radii = snapshot
        .nodes
        .iter()
        .map(|node| node_radius(node.size, viewport.scale()))
        .collect::<Vec<f32>>();
    let index_by_id = snapshot
        .nodes
        .iter()
        .enumerate()
        .map(|(index, node)| (node.id.as_str(), index))
        .collect::<HashMap<_, _>>();
    let visible_indices = (0..snapshot.nodes.len())
        .filter(|&index| circle_visible(rect, screen_positions[index], screen_radii[index]))
        .collect::<Vec<_>>();

    let hovered = hovered_index(ui, &visible_indices, &screen_positions, &screen_radii);
    if hovered.is_some() {
        ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
    }

    let edge_width = (1.4 * viewport.scale().sqrt()).clamp(0.6, 3.4);
    for edge in &snapshot.edges {
        let (Some(&source), Some(&target)) = (
            index_by_id.get(edge.source.as_str()),
            index_by_id.get(edge.target.as_str()),
        ) else {
            continue;
        };
        let start = screen_positions[source];
        let end = screen_positions[target];
        let touches_hovered = hovered == Some(source) || hovered == Some(target);
        let color = if touches_hovered {
            Color32::from_rgb(241, 146, 94)
        } else {
            Color32::from_rgba_unmultiplied(120, 128, 140, 170)
        };
        painter.line_segment([start, end], Stroke::new(edge_width * edge.weight.clamp(0.5, 2.0), color));

        if view.show_edge_labels && !edge.label.is_empty() {
            painter.text(
                start + (end - start) * 0.5,
                Align2::CENTER_CENTER,
                &edge.label,
                FontId::proportional(11.0),
                Color32::from_gray(190),
            );
        }
    }

    // Larger nodes last so small ones underneath stay hoverable at their edges.
    let mut draw_order = visible_indices.clone();
    draw_order.sort_by(|a, b| snapshot.nodes[*a].size.total_cmp(&snapshot.nodes[*b].size));

    for index in draw_order {
        let node = &snapshot.nodes[index];
        let position = screen_positions[index];
        let radius = screen_radii[index];
        let is_hovered = hovered == Some(index);

        let base_color = community_color(node.community);
        let color = if is_hovered {
            blend_color(base_color, Color32::WHITE, 0.35)
        } else {
            base_color
        };

        painter.circle_filled(position, radius, color);
        let stroke = match node.match_score {
            Some(score) => Stroke::new(1.0 + score * 2.0, Color32::from_rgb(245, 206, 93)),
            None => Stroke::new(1.0, Color32::from_rgba_unmultiplied(15, 15, 15, 190)),
        };
        painter.circle_stroke(position, radius, stroke);

        if is_hovered || radius > 14.0 || view.zoom > 1.35 {
            painter.text(
                position + vec2(radius + 5.0, 0.0),
                Align2::LEFT_CENTER,
                &node.label,
                FontId::proportional(12.0),
                Color32::from_gray(238),
            );
        }
    }

    if let Some(index) = hovered {
        let node = &snapshot.nodes[index];
        let mut details = format!(
            "{}  |  {}  |  community {}  |  degree {}",
            node.label, node.node_type, node.community, node.degree
        );
        if let Some(score) = node.match_score {
            details.push_str(&format!("  |  match {score:.2}"));
        }
        painter.text(
            rect.left_top() + vec2(10.0, 10.0),
            Align2::LEFT_TOP,
            details,
            FontId::proportional(13.0),
            Color32::from_gray(240),
        );
    }

    if controller.is_loading() {
        painter.text(
            rect.right_top() + vec2(-10.0, 10.0),
            Align2::RIGHT_TOP,
            "Updating...",
            FontId::proportional(13.0),
            Color32::from_gray(200),
        );
    }

    if response.dragged() {
        ui.ctx().request_repaint();
    }
}
