use eframe::egui::{self, Align, Key, Layout, RichText, Ui};
use pension_graph::controller::{QueryController, QueryState};

use super::super::render_utils::community_color;
use super::super::{SidebarTab, UiAction, ViewModel};

pub(in crate::app) fn draw_top_bar(
    ui: &mut Ui,
    controller: &QueryController,
    view: &mut ViewModel,
    actions: &mut Vec<UiAction>,
) {
    ui.horizontal(|ui| {
        ui.heading("Pension Plan Knowledge Graph");
        ui.separator();

        if let Some(snapshot) = controller.rendered() {
            ui.label(format!("nodes: {}", snapshot.metadata.total_nodes));
            ui.label(format!("edges: {}", snapshot.metadata.total_edges));
        }
        let store = controller.store().metadata();
        ui.label(format!("communities: {}", store.community_count));
        ui.label(format!("source: {}", controller.source().label()));

        let refresh = ui.add_enabled(!controller.is_loading(), egui::Button::new("Refresh"));
        if refresh.clicked() {
            actions.push(UiAction::Refresh);
        }

        let mut live = view.live;
        if ui.checkbox(&mut live, "Live backend").changed() {
            actions.push(UiAction::SetLive(live));
        }

        ui.with_layout(Layout::right_to_left(Align::Center), |ui| match controller.state() {
            QueryState::Loading => {
                ui.spinner();
            }
            QueryState::Error(error) => {
                ui.colored_label(egui::Color32::from_rgb(235, 110, 100), error.as_str());
            }
            QueryState::Idle | QueryState::Ready => {}
        });
    });
}

pub(in crate::app) fn draw_search_panel(
    ui: &mut Ui,
    controller: &QueryController,
    view: &mut ViewModel,
    actions: &mut Vec<UiAction>,
) {
    ui.heading("Search");
    ui.add_space(4.0);

    ui.horizontal(|ui| {
        let response = ui.add(
            egui::TextEdit::singleline(&mut view.search)
                .hint_text("e.g. contribution, industry, vesting")
                .desired_width(ui.available_width() - 60.0),
        );
        if response.changed() {
            actions.push(UiAction::QueryEdited);
        }
        if response.lost_focus() && ui.input(|input| input.key_pressed(Key::Enter)) {
            actions.push(UiAction::Submit);
        }
        if ui
            .add_enabled(!view.search.is_empty(), egui::Button::new("Clear"))
            .clicked()
        {
            actions.push(UiAction::ClearQuery);
        }
    });

    ui.add_space(8.0);
    ui.horizontal(|ui| {
        ui.selectable_value(&mut view.tab, SidebarTab::Filters, "Filters");
        let results_label = format!("Results ({})", controller.results().len());
        ui.selectable_value(&mut view.tab, SidebarTab::Results, results_label);
    });
    ui.separator();

    match view.tab {
        SidebarTab::Filters => draw_filters(ui, controller, view, actions),
        SidebarTab::Results => draw_results(ui, controller),
    }
}

fn draw_filters(
    ui: &mut Ui,
    controller: &QueryController,
    view: &mut ViewModel,
    actions: &mut Vec<UiAction>,
) {
    ui.checkbox(&mut view.show_edge_labels, "Show edge labels");
    ui.add_space(8.0);

    ui.label(RichText::new("Communities").strong());
    let mut selected = controller.community();
    ui.horizontal_wrapped(|ui| {
        ui.selectable_value(&mut selected, None, "All");
        for community in controller.communities() {
            let label = RichText::new(format!("Community {community}"))
                .color(community_color(community));
            ui.selectable_value(&mut selected, Some(community), label);
        }
    });
    if selected != controller.community() {
        actions.push(UiAction::SelectCommunity(selected));
    }

    ui.add_space(12.0);
    let reorganize = ui.add_enabled(
        controller.rendered().is_some_and(|snapshot| !snapshot.is_empty()),
        egui::Button::new("Reorganize layout"),
    );
    if reorganize.clicked() {
        actions.push(UiAction::Reorganize);
    }
    if ui.button("Reset view").clicked() {
        actions.push(UiAction::ResetView);
    }
}

fn draw_results(ui: &mut Ui, controller: &QueryController) {
    if controller.results().is_empty() {
        let hint = if controller.settled_query().trim().is_empty() {
            "Type a query to see matching node groups."
        } else {
            "No results for this query."
        };
        ui.label(hint);
        return;
    }

    egui::ScrollArea::vertical().show(ui, |ui| {
        for result in controller.results() {
            ui.horizontal(|ui| {
                ui.label(result.text.as_str());
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    ui.label(format!("{:.0}%", result.score * 100.0));
                });
            });
        }
    });
}
