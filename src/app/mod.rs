use std::time::{Duration, Instant};

use eframe::egui::{self, Context, Vec2};
use pension_graph::config::Settings;
use pension_graph::controller::{ControllerOptions, Notification, QueryController, QueryState};
use pension_graph::source::GraphSource;
use tracing::warn;

mod graph;
mod render_utils;
mod ui;

const TOAST_LIFETIME_SECS: f64 = 4.0;
const LOADING_REPAINT: Duration = Duration::from_millis(50);

pub struct PensionGraphApp {
    settings: Settings,
    controller: QueryController,
    view: ViewModel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SidebarTab {
    Filters,
    Results,
}

struct Toast {
    notification: Notification,
    expires_at: f64,
}

/// Presentation-only state. Everything that affects graph content lives in the controller.
struct ViewModel {
    search: String,
    tab: SidebarTab,
    live: bool,
    show_edge_labels: bool,
    pan: Vec2,
    zoom: f32,
    toasts: Vec<Toast>,
}

/// Requests raised while drawing, applied once the frame's widgets are done.
#[derive(Clone, Debug, PartialEq)]
enum UiAction {
    QueryEdited,
    Submit,
    ClearQuery,
    Refresh,
    SetLive(bool),
    SelectCommunity(Option<u32>),
    Reorganize,
    ResetView,
}

impl ViewModel {
    fn new(live: bool) -> Self {
        Self {
            search: String::new(),
            tab: SidebarTab::Filters,
            live,
            show_edge_labels: false,
            pan: Vec2::ZERO,
            zoom: 1.0,
            toasts: Vec::new(),
        }
    }
}

impl PensionGraphApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, settings: Settings, source: GraphSource) -> Self {
        let live = source.is_remote();
        let mut controller = QueryController::new(source, ControllerOptions::from(&settings));
        controller.start();
        Self {
            settings,
            controller,
            view: ViewModel::new(live),
        }
    }

    fn apply(&mut self, action: UiAction, now: Instant) {
        match action {
            UiAction::QueryEdited => self.controller.set_query(self.view.search.clone(), now),
            UiAction::Submit => self.controller.submit(),
            UiAction::ClearQuery => {
                self.view.search.clear();
                self.controller.clear_query();
            }
            UiAction::Refresh => self.controller.refresh(),
            UiAction::SetLive(live) => match self.settings.source(live) {
                Ok(source) => {
                    self.view.live = live;
                    self.controller.set_source(source);
                }
                Err(error) => warn!(%error, "cannot switch graph source"),
            },
            UiAction::SelectCommunity(community) => self.controller.select_community(community),
            UiAction::Reorganize => self.controller.reorganize(),
            UiAction::ResetView => {
                self.view.pan = Vec2::ZERO;
                self.view.zoom = 1.0;
            }
        }
    }

    fn collect_notifications(&mut self, ctx: &Context) {
        let now = ctx.input(|input| input.time);
        self.view.toasts.retain(|toast| toast.expires_at > now);
        for notification in self.controller.take_notifications() {
            self.view.toasts.push(Toast {
                notification,
                expires_at: now + TOAST_LIFETIME_SECS,
            });
        }
    }

    fn schedule_repaint(&self, ctx: &Context, now: Instant) {
        if self.controller.is_loading() {
            ctx.request_repaint_after(LOADING_REPAINT);
        }
        if let Some(deadline) = self.controller.next_deadline() {
            ctx.request_repaint_after(deadline.saturating_duration_since(now));
        }
        if let Some(next_expiry) = self
            .view
            .toasts
            .iter()
            .map(|toast| toast.expires_at)
            .min_by(f64::total_cmp)
        {
            let remaining = (next_expiry - ctx.input(|input| input.time)).max(0.0);
            ctx.request_repaint_after(Duration::from_secs_f64(remaining));
        }
    }
}

impl eframe::App for PensionGraphApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        self.controller.tick(now);
        self.controller.poll();
        self.collect_notifications(ctx);

        let mut actions = Vec::new();

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui::draw_top_bar(ui, &self.controller, &mut self.view, &mut actions);
            });

        egui::SidePanel::left("search")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| {
                ui::draw_search_panel(ui, &self.controller, &mut self.view, &mut actions);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            let has_snapshot = self.controller.rendered().is_some();
            match (self.controller.state(), has_snapshot) {
                (QueryState::Error(error), false) => {
                    ui.heading("Failed to load the pension graph");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        actions.push(UiAction::Refresh);
                    }
                }
                (_, false) => {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading pension graph...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                }
                (_, true) if self.controller.is_empty_result() => {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("No nodes match this query");
                        ui.add_space(8.0);
                        if ui.button("Show full graph").clicked() {
                            actions.push(UiAction::ClearQuery);
                        }
                    });
                }
                (_, true) => {
                    graph::draw_graph(ui, &self.controller, &mut self.view, &mut actions);
                }
            }
        });

        ui::draw_toasts(ctx, &self.view.toasts);

        for action in actions {
            self.apply(action, now);
        }
        self.schedule_repaint(ctx, now);
    }
}
