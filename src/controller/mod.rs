//! Query intake and pipeline orchestration for the graph view.
//!
//! The controller is driven from a single UI loop. Keystrokes go through a
//! debouncer, settled queries become jobs, and jobs report back over a
//! channel tagged with the generation that started them. Only the newest
//! generation is ever applied, so a slow response for an old query or an old
//! source can never overwrite a newer view.

mod debounce;
mod job;

use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::config::{DEFAULT_DEBOUNCE, Settings};
use crate::graph::{GraphSnapshot, GraphStore, communities};
use crate::layout::{LayoutConfig, layout_snapshot};
use crate::search::SearchResult;
use crate::source::GraphSource;

use debounce::Debouncer;
use job::{Completion, Job, Outcome, Request};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueryState {
    Idle,
    Loading,
    Ready,
    /// The last request failed; the previous snapshot stays on screen.
    Error(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub message: String,
}

impl Notification {
    fn new(level: NotificationLevel, title: &str, message: impl Into<String>) -> Self {
        Self {
            level,
            title: title.to_owned(),
            message: message.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControllerOptions {
    pub debounce: Duration,
    pub layout: LayoutConfig,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            layout: LayoutConfig::default(),
        }
    }
}

impl From<&Settings> for ControllerOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            debounce: settings.debounce,
            layout: settings.layout,
        }
    }
}

pub struct QueryController {
    source: GraphSource,
    options: ControllerOptions,
    store: GraphStore,
    state: QueryState,
    input: String,
    settled: String,
    debouncer: Debouncer,
    generation: u64,
    completion_tx: Sender<Completion>,
    completion_rx: Receiver<Completion>,
    snapshot: Option<GraphSnapshot>,
    rendered: Option<GraphSnapshot>,
    community: Option<u32>,
    results: Vec<SearchResult>,
    notifications: VecDeque<Notification>,
}

impl QueryController {
    pub fn new(source: GraphSource, options: ControllerOptions) -> Self {
        let (completion_tx, completion_rx) = mpsc::channel();
        Self {
            source,
            options,
            store: GraphStore::new(),
            state: QueryState::Idle,
            input: String::new(),
            settled: String::new(),
            debouncer: Debouncer::new(options.debounce),
            generation: 0,
            completion_tx,
            completion_rx,
            snapshot: None,
            rendered: None,
            community: None,
            results: Vec::new(),
            notifications: VecDeque::new(),
        }
    }

    /// Loads the full graph from the current source.
    pub fn start(&mut self) {
        self.dispatch(String::new(), false);
    }

    /// Records a keystroke; the query fires once the text has been quiet long enough.
    pub fn set_query(&mut self, text: impl Into<String>, now: Instant) {
        self.input = text.into();
        self.debouncer.push(self.input.clone(), now);
    }

    /// Runs the current text immediately, skipping the quiet period.
    pub fn submit(&mut self) {
        self.debouncer.cancel();
        self.dispatch(self.input.clone(), false);
    }

    pub fn clear_query(&mut self) {
        self.input.clear();
        self.debouncer.cancel();
        self.results.clear();
        self.dispatch(String::new(), false);
    }

    /// Fires a settled query if its quiet period is over. Returns whether a
    /// request was started.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(query) = self.debouncer.settle(now) else {
            return false;
        };
        if query == self.settled {
            return false;
        }
        self.dispatch(query, false);
        true
    }

    /// Re-runs the pipeline for the settled query; also the retry after an error.
    pub fn refresh(&mut self) {
        self.dispatch(self.settled.clone(), false);
    }

    /// Switches data source and re-ingests its full graph, then re-runs the
    /// settled query against it. Work started for the previous source is superseded.
    pub fn set_source(&mut self, source: GraphSource) {
        info!(source = source.label(), "switching graph source");
        self.source = source;
        self.store.clear();
        self.dispatch(self.settled.clone(), true);
    }

    /// Narrows the rendered view to one community without fetching. The
    /// request state is left alone.
    pub fn select_community(&mut self, community: Option<u32>) {
        self.community = community;
        self.rendered = self
            .snapshot
            .as_ref()
            .map(|snapshot| snapshot.restrict_to_community(community));
    }

    /// Re-runs the layout from the current positions without fetching or
    /// scoring. The request state is left alone.
    pub fn reorganize(&mut self) {
        let Some(snapshot) = &self.snapshot else {
            return;
        };
        let placed = layout_snapshot(snapshot, &self.options.layout);
        self.install(placed);
    }

    /// Applies finished jobs. Returns whether anything visible changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        while let Ok(completion) = self.completion_rx.try_recv() {
            changed |= self.apply(completion);
        }
        changed
    }

    /// When the host should call [`QueryController::tick`] next.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == QueryState::Loading
    }

    pub fn query_text(&self) -> &str {
        &self.input
    }

    pub fn settled_query(&self) -> &str {
        &self.settled
    }

    pub fn layout_config(&self) -> &LayoutConfig {
        &self.options.layout
    }

    pub fn source(&self) -> &GraphSource {
        &self.source
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn snapshot(&self) -> Option<&GraphSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn rendered(&self) -> Option<&GraphSnapshot> {
        self.rendered.as_ref()
    }

    /// A successful request that matched nothing.
    pub fn is_empty_result(&self) -> bool {
        self.state == QueryState::Ready && self.snapshot.as_ref().is_some_and(GraphSnapshot::is_empty)
    }

    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    pub fn community(&self) -> Option<u32> {
        self.community
    }

    /// Community ids offered as filters, taken from the unfiltered snapshot.
    pub fn communities(&self) -> Vec<u32> {
        self.snapshot
            .as_ref()
            .map(|snapshot| communities(&snapshot.nodes))
            .unwrap_or_default()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain(..).collect()
    }

    fn dispatch(&mut self, query: String, reingest: bool) {
        self.generation += 1;
        self.state = QueryState::Loading;

        let trimmed = query.trim();
        let request = if trimmed.is_empty() {
            Request::FullGraph
        } else if reingest {
            Request::IngestThenQuery(trimmed.to_owned())
        } else {
            Request::Query(trimmed.to_owned())
        };
        debug!(generation = self.generation, ?request, source = self.source.label(), "dispatching");
        self.settled = query;

        let job = Job {
            generation: self.generation,
            request,
            source: self.source.clone(),
            prior: self
                .snapshot
                .as_ref()
                .map(GraphSnapshot::positions)
                .unwrap_or_default(),
            layout: self.options.layout,
        };

        if self.source.is_remote() {
            let tx = self.completion_tx.clone();
            thread::spawn(move || {
                let _ = tx.send(job.run());
            });
        } else {
            let _ = self.completion_tx.send(job.run());
            self.poll();
        }
    }

    fn apply(&mut self, completion: Completion) -> bool {
        if completion.generation != self.generation {
            debug!(
                stale = completion.generation,
                current = self.generation,
                "discarding superseded completion"
            );
            return false;
        }

        match completion.outcome {
            Ok(Outcome {
                store,
                snapshot,
                results,
                answer,
                source_label,
            }) => {
                debug!(nodes = snapshot.nodes.len(), edges = snapshot.edges.len(), "pipeline finished");
                self.results = results;
                self.install(snapshot);
                self.state = QueryState::Ready;
                if let Some(store) = store {
                    info!(
                        nodes = store.metadata().total_nodes,
                        edges = store.metadata().total_edges,
                        source = source_label,
                        "graph ingested"
                    );
                    self.store = store;
                    self.notify(
                        NotificationLevel::Success,
                        "Graph loaded",
                        format!("Graph data loaded from {source_label}"),
                    );
                }
                if let Some(answer) = answer {
                    self.notify(NotificationLevel::Info, "Query complete", answer);
                }
            }
            Err(error) => {
                warn!(%error, "graph request failed");
                let message = error.to_string();
                self.state = QueryState::Error(message.clone());
                self.notify(NotificationLevel::Error, "Request failed", message);
            }
        }
        true
    }

    // Snapshot and filtered view always change together.
    fn install(&mut self, snapshot: GraphSnapshot) {
        self.rendered = Some(snapshot.restrict_to_community(self.community));
        self.snapshot = Some(snapshot);
    }

    fn notify(&mut self, level: NotificationLevel, title: &str, message: impl Into<String>) {
        self.notifications.push_back(Notification::new(level, title, message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GraphError;
    use crate::graph::{Edge, Node};
    use crate::source::StaticGraph;

    fn three_node_source() -> GraphSource {
        let nodes = vec![
            Node::new("1", "Pension Plans", "plan_type", 25.0).with_community(0),
            Node::new("2", "Manufacturing", "industry", 15.0).with_community(1),
            Node::new("3", "Vesting", "feature", 10.0).with_community(1),
        ];
        let edges = vec![
            Edge::new("e0", "1", "2", "common in"),
            Edge::new("e1", "2", "3", "requires"),
        ];
        GraphSource::Static(StaticGraph::new(nodes, edges))
    }

    fn started() -> QueryController {
        let mut controller = QueryController::new(three_node_source(), ControllerOptions::default());
        controller.start();
        controller
    }

    fn rendered_ids(controller: &QueryController) -> Vec<String> {
        controller
            .rendered()
            .map(|snapshot| snapshot.nodes.iter().map(|n| n.id.clone()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn start_loads_full_graph() {
        let mut controller = started();

        assert_eq!(controller.state(), &QueryState::Ready);
        assert_eq!(rendered_ids(&controller), ["1", "2", "3"]);
        assert_eq!(controller.rendered().map(|s| s.edges.len()), Some(2));
        assert_eq!(controller.store().nodes().len(), 3);
        let notes = controller.take_notifications();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].level, NotificationLevel::Success);
    }

    #[test]
    fn keystrokes_are_debounced() {
        let mut controller = started();
        let t0 = Instant::now();
        let before = controller.generation();

        controller.set_query("v", t0);
        controller.set_query("ve", t0 + Duration::from_millis(120));
        controller.set_query("vest", t0 + Duration::from_millis(240));

        assert!(!controller.tick(t0 + Duration::from_millis(400)));
        assert_eq!(controller.generation(), before);
        assert_eq!(controller.next_deadline(), Some(t0 + Duration::from_millis(540)));

        assert!(controller.tick(t0 + Duration::from_millis(540)));
        assert_eq!(controller.generation(), before + 1);
        assert_eq!(controller.settled_query(), "vest");
        assert_eq!(rendered_ids(&controller), ["3"]);
        assert_eq!(controller.results()[0].text, "feature (1)");
    }

    #[test]
    fn settling_on_the_same_text_does_not_refetch() {
        let mut controller = started();
        let t0 = Instant::now();
        controller.set_query("vest", t0);
        assert!(controller.tick(t0 + Duration::from_millis(300)));
        let generation = controller.generation();

        controller.set_query("vesti", t0 + Duration::from_millis(400));
        controller.set_query("vest", t0 + Duration::from_millis(500));
        assert!(!controller.tick(t0 + Duration::from_millis(800)));
        assert_eq!(controller.generation(), generation);
    }

    #[test]
    fn clearing_the_query_restores_full_graph() {
        let mut controller = started();
        controller.set_query("pension", Instant::now());
        controller.submit();
        assert_eq!(rendered_ids(&controller), ["1"]);
        assert!(!controller.results().is_empty());

        controller.clear_query();
        assert_eq!(rendered_ids(&controller), ["1", "2", "3"]);
        assert!(controller.results().is_empty());
        assert_eq!(controller.query_text(), "");
    }

    #[test]
    fn whitespace_query_counts_as_empty() {
        let mut controller = started();
        controller.set_query("   ", Instant::now());
        controller.submit();
        assert_eq!(rendered_ids(&controller), ["1", "2", "3"]);
    }

    #[test]
    fn no_matches_is_ready_and_empty() {
        let mut controller = started();
        controller.set_query("annuity", Instant::now());
        controller.submit();

        assert_eq!(controller.state(), &QueryState::Ready);
        assert!(controller.is_empty_result());
        assert!(rendered_ids(&controller).is_empty());
    }

    #[test]
    fn stale_completions_are_discarded() {
        let mut controller = started();
        let shown = controller.rendered().cloned();
        let stale_generation = controller.generation() - 1;

        controller
            .completion_tx
            .send(Completion {
                generation: stale_generation,
                outcome: Ok(Outcome {
                    answer: Some("late".to_owned()),
                    ..Outcome::default()
                }),
            })
            .unwrap();

        assert!(!controller.poll());
        assert_eq!(controller.rendered().cloned(), shown);
        assert_eq!(controller.state(), &QueryState::Ready);
    }

    #[test]
    fn only_the_newest_generation_applies_whatever_the_arrival_order() {
        let mut controller = started();
        controller.generation += 2;
        let newest = controller.generation;
        controller.state = QueryState::Loading;

        let answer = |generation: u64, text: &str| Completion {
            generation,
            outcome: Ok(Outcome {
                snapshot: GraphSnapshot::new(vec![Node::new(text, text, "feature", 1.0)], Vec::new()),
                ..Outcome::default()
            }),
        };
        controller.completion_tx.send(answer(newest, "new")).unwrap();
        controller.completion_tx.send(answer(newest - 1, "old")).unwrap();

        assert!(controller.poll());
        assert_eq!(rendered_ids(&controller), ["new"]);
        assert_eq!(controller.state(), &QueryState::Ready);
    }

    fn fail_current_request(controller: &mut QueryController) {
        controller.generation += 1;
        controller.state = QueryState::Loading;
        controller
            .completion_tx
            .send(Completion {
                generation: controller.generation,
                outcome: Err(GraphError::Status {
                    url: "http://localhost:8000/graph/".to_owned(),
                    status: 502,
                }),
            })
            .unwrap();
        assert!(controller.poll());
    }

    #[test]
    fn failure_keeps_previous_snapshot_and_can_be_retried() {
        let mut controller = started();
        controller.take_notifications();
        let shown = controller.rendered().cloned();

        fail_current_request(&mut controller);
        assert!(matches!(controller.state(), QueryState::Error(message) if message.contains("502")));
        assert_eq!(controller.rendered().cloned(), shown);
        let notes = controller.take_notifications();
        assert_eq!(notes[0].level, NotificationLevel::Error);

        controller.refresh();
        assert_eq!(controller.state(), &QueryState::Ready);
    }

    #[test]
    fn local_view_changes_keep_the_error_visible() {
        let mut controller = started();
        fail_current_request(&mut controller);

        controller.reorganize();
        assert!(matches!(controller.state(), QueryState::Error(_)));
        controller.select_community(Some(1));
        assert!(matches!(controller.state(), QueryState::Error(_)));
        assert_eq!(rendered_ids(&controller), ["2", "3"]);
    }

    #[test]
    fn community_selection_filters_without_fetching() {
        let mut controller = started();
        let generation = controller.generation();

        controller.select_community(Some(1));
        assert_eq!(controller.generation(), generation);
        assert_eq!(rendered_ids(&controller), ["2", "3"]);
        assert_eq!(controller.rendered().map(|s| s.edges.len()), Some(1));
        assert_eq!(controller.communities(), vec![0, 1]);

        controller.select_community(None);
        assert_eq!(rendered_ids(&controller), ["1", "2", "3"]);
    }

    #[test]
    fn community_selection_survives_new_queries() {
        let mut controller = started();
        controller.select_community(Some(1));
        controller.set_query("i", Instant::now());
        controller.submit();

        // "Manufacturing" and "Vesting" are in community 1; "Pension Plans" is not.
        assert_eq!(rendered_ids(&controller), ["2", "3"]);
        assert_eq!(controller.snapshot().map(|s| s.nodes.len()), Some(3));
    }

    #[test]
    fn reorganize_relayouts_without_fetching() {
        let mut controller = started();
        let generation = controller.generation();
        let before = controller.snapshot().cloned().unwrap();

        controller.reorganize();
        let after = controller.snapshot().cloned().unwrap();

        assert_eq!(controller.generation(), generation);
        assert_eq!(after.edges, before.edges);
        assert_eq!(
            after.nodes.iter().map(|n| &n.id).collect::<Vec<_>>(),
            before.nodes.iter().map(|n| &n.id).collect::<Vec<_>>()
        );
        assert!(after.nodes.iter().all(|n| n.position.is_some()));
    }

    #[test]
    fn source_switch_reingests() {
        let mut controller = started();
        let generation = controller.generation();

        controller.set_source(GraphSource::fixture());
        assert_eq!(controller.generation(), generation + 1);
        assert_eq!(controller.store().nodes().len(), 9);
        assert_eq!(controller.rendered().map(|s| s.nodes.len()), Some(9));
        assert_eq!(controller.store().metadata().community_count, 3);
    }

    #[test]
    fn source_switch_with_active_query_reingests_then_requeries() {
        let mut controller = started();
        controller.set_query("pension", Instant::now());
        controller.submit();
        controller.take_notifications();

        controller.set_source(GraphSource::fixture());

        assert_eq!(controller.state(), &QueryState::Ready);
        assert_eq!(controller.store().nodes().len(), 9);
        assert_eq!(controller.store().metadata().community_count, 3);
        assert_eq!(rendered_ids(&controller), ["1"]);
        assert_eq!(controller.results()[0].text, "plan_type (1)");
        let levels = controller
            .take_notifications()
            .into_iter()
            .map(|note| note.level)
            .collect::<Vec<_>>();
        assert_eq!(levels, [NotificationLevel::Success]);
    }
}
