use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::config::ChartConfig;
use crate::ir::{DataTable, SelectionKey};
use crate::layout::{ChartLayout, compute_layout};
use crate::selection::{HostNotifier, SelectionHost, SelectionRequest};
use crate::source::{NumberLocale, normalize_rows};
use crate::tree::OrgTree;
use crate::viewport::{Transform, TransformTransition, Viewport, WheelMode};
use crate::visibility::CollapseState;

/// Everything the host hands over on a data/format update.
#[derive(Debug, Clone, Copy)]
pub struct ChartUpdate<'a> {
    pub table: &'a DataTable,
    pub config: &'a ChartConfig,
    pub viewport: (f32, f32),
    pub highlighted: &'a [SelectionKey],
}

#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    Rendered {
        nodes: usize,
        transition: Option<TransformTransition>,
    },
    NoChart {
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Enter,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartEvent {
    NodeClicked { id: String, multi_select: bool },
    ToggleClicked { id: String },
    CanvasClicked,
    ExpandAll,
    CollapseAll,
    FitToViewport,
    ResetView,
    FocusNode { id: String },
    OpenSearch,
    Search { query: String },
    KeyDown { key: Key },
    CloseOverlay,
    Wheel {
        delta_y: f32,
        mode: WheelMode,
        pointer: (f32, f32),
    },
    Drag { dx: f32, dy: f32 },
    Resize { width: f32, height: f32 },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventOutcome {
    /// The visible tree was re-projected and laid out again.
    pub relayout: bool,
    pub transform_changed: bool,
    pub transition: Option<TransformTransition>,
}

impl EventOutcome {
    fn transformed(transition: Option<TransformTransition>) -> Self {
        Self {
            relayout: false,
            transform_changed: transition.is_some(),
            transition,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Overlay {
    Search {
        query: String,
        matches: Vec<String>,
        cursor: usize,
    },
}

/// Keeps freshly entering nodes hidden until two frames have been painted.
#[derive(Debug, Default)]
struct RevealGate {
    pending: HashSet<String>,
    frames: u8,
}

impl RevealGate {
    fn stage(&mut self, entering: impl IntoIterator<Item = String>) {
        let before = self.pending.len();
        self.pending.extend(entering);
        if self.pending.len() != before {
            self.frames = 0;
        }
    }

    fn retain(&mut self, layout: &ChartLayout) {
        self.pending.retain(|id| layout.node(id).is_some());
    }

    fn on_frame(&mut self) -> Vec<String> {
        if self.pending.is_empty() {
            return Vec::new();
        }
        self.frames += 1;
        if self.frames < 2 {
            return Vec::new();
        }
        self.frames = 0;
        self.pending.drain().collect()
    }

    fn clear(&mut self) {
        self.pending.clear();
        self.frames = 0;
    }
}

pub struct OrgChart {
    config: ChartConfig,
    tree: Option<OrgTree>,
    collapse: CollapseState,
    layout: Option<ChartLayout>,
    viewport: Viewport,
    selected: Vec<SelectionKey>,
    notifier: HostNotifier,
    reveal: RevealGate,
    overlay: Option<Overlay>,
    no_chart: Option<String>,
    fitted: bool,
}

impl OrgChart {
    /// An invalid `config` falls back to the defaults; `update` reports errors.
    pub fn new(config: ChartConfig, width: f32, height: f32) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(error) => {
                warn!(%error, "invalid chart config, using defaults");
                ChartConfig::default()
            }
        };
        let viewport = Viewport::new(width, height, &config.zoom);
        Self {
            config,
            tree: None,
            collapse: CollapseState::new(),
            layout: None,
            viewport,
            selected: Vec::new(),
            notifier: HostNotifier::default(),
            reveal: RevealGate::default(),
            overlay: None,
            no_chart: None,
            fitted: false,
        }
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    pub fn tree(&self) -> Option<&OrgTree> {
        self.tree.as_ref()
    }

    pub fn layout(&self) -> Option<&ChartLayout> {
        self.layout.as_ref()
    }

    pub fn collapse_state(&self) -> &CollapseState {
        &self.collapse
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn transform(&self) -> Transform {
        self.viewport.transform()
    }

    pub fn selected(&self) -> &[SelectionKey] {
        &self.selected
    }

    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlay.as_ref()
    }

    pub fn no_chart_reason(&self) -> Option<&str> {
        self.no_chart.as_deref()
    }

    pub fn is_revealed(&self, id: &str) -> bool {
        !self.reveal.pending.contains(id)
    }

    pub fn update(&mut self, update: ChartUpdate<'_>) -> UpdateOutcome {
        if let Err(err) = update.config.validate() {
            return self.fail(err.to_string());
        }
        self.config = update.config.clone();
        self.viewport.configure(&self.config.zoom);
        self.viewport.resize(update.viewport.0, update.viewport.1);

        let locale = NumberLocale::from_tag(&self.config.number_locale);
        let records = match normalize_rows(update.table, &locale) {
            Ok(records) => records,
            Err(err) => return self.fail(err.to_string()),
        };

        let tree = OrgTree::build(records);
        self.collapse.prune(&tree);
        self.collapse
            .apply_default_levels(&tree, self.config.layout.initial_expanded_levels);
        self.selected = update.highlighted.to_vec();
        for key in &self.selected {
            if let Some(record) = tree.data_nodes().find_map(|n| {
                n.record.as_ref().filter(|r| &r.selection_key == key)
            }) {
                let id = record.id.clone();
                self.collapse.ensure_visible(&tree, &id);
            }
        }
        self.tree = Some(tree);
        self.no_chart = None;
        self.apply_highlights();
        self.relayout();

        let transition = if self.fitted {
            None
        } else {
            self.fitted = true;
            self.fit(0)
        };
        let nodes = self.layout.as_ref().map(|l| l.nodes.len()).unwrap_or(0);
        info!(nodes, "chart updated");
        UpdateOutcome::Rendered { nodes, transition }
    }

    fn fail(&mut self, reason: String) -> UpdateOutcome {
        info!(reason = %reason, "no chart");
        self.tree = None;
        self.layout = None;
        self.overlay = None;
        self.reveal.clear();
        self.collapse.reset_defaults();
        self.fitted = false;
        self.no_chart = Some(reason.clone());
        UpdateOutcome::NoChart { reason }
    }

    fn relayout(&mut self) {
        let Some(tree) = self.tree.as_ref() else {
            self.layout = None;
            return;
        };
        let visible = self.collapse.build_visible_tree(tree);
        let layout = compute_layout(tree, &visible, &self.config);
        let entering: Vec<String> = match self.layout.as_ref() {
            Some(previous) => layout
                .nodes
                .iter()
                .filter(|node| previous.node(&node.id).is_none())
                .map(|node| node.id.clone())
                .collect(),
            None => layout.nodes.iter().map(|node| node.id.clone()).collect(),
        };
        self.reveal.retain(&layout);
        self.reveal.stage(entering);
        self.layout = Some(layout);
    }

    fn apply_highlights(&mut self) {
        let selected: HashSet<&SelectionKey> = self.selected.iter().collect();
        if let Some(tree) = self.tree.as_mut() {
            for record in tree.records_mut() {
                record.highlighted = selected.contains(&record.selection_key);
            }
        }
    }

    fn fit(&mut self, duration_ms: u32) -> Option<TransformTransition> {
        let bounds = self.layout.as_ref()?.bounds;
        self.viewport.fit_to_viewport(&bounds, duration_ms)
    }

    pub fn handle(&mut self, event: ChartEvent) -> EventOutcome {
        if self.tree.is_none() {
            if let ChartEvent::Resize { width, height } = event {
                self.viewport.resize(width, height);
            }
            return EventOutcome::default();
        }
        match event {
            ChartEvent::NodeClicked { id, multi_select } => {
                self.overlay = None;
                self.click_node(&id, multi_select)
            }
            ChartEvent::ToggleClicked { id } => self.toggle_anchored(&id),
            ChartEvent::CanvasClicked => {
                if self.overlay.take().is_some() {
                    return EventOutcome::default();
                }
                self.selected.clear();
                self.notifier.queue(SelectionRequest::Clear);
                self.apply_highlights();
                self.relayout();
                EventOutcome {
                    relayout: true,
                    ..Default::default()
                }
            }
            ChartEvent::ExpandAll => {
                self.collapse.expand_all();
                self.relayout_and_fit()
            }
            ChartEvent::CollapseAll => {
                if let Some(tree) = self.tree.as_ref() {
                    self.collapse.collapse_all(tree);
                }
                self.relayout_and_fit()
            }
            ChartEvent::FitToViewport => {
                EventOutcome::transformed(self.fit(self.config.zoom.fit_duration_ms))
            }
            ChartEvent::ResetView => {
                let duration = self.config.zoom.fit_duration_ms;
                let transition = self
                    .layout
                    .as_ref()
                    .map(|layout| layout.bounds)
                    .and_then(|bounds| self.viewport.reset(&bounds, duration));
                EventOutcome::transformed(transition)
            }
            ChartEvent::FocusNode { id } => self.reveal_and_focus(&id),
            ChartEvent::OpenSearch => {
                self.overlay = Some(Overlay::Search {
                    query: String::new(),
                    matches: Vec::new(),
                    cursor: 0,
                });
                EventOutcome::default()
            }
            ChartEvent::Search { query } => {
                let matches = self.search(&query);
                let first = matches.first().cloned();
                self.overlay = Some(Overlay::Search {
                    query,
                    matches,
                    cursor: 0,
                });
                match first {
                    Some(id) => self.reveal_and_focus(&id),
                    None => EventOutcome::default(),
                }
            }
            ChartEvent::KeyDown { key: Key::Escape } | ChartEvent::CloseOverlay => {
                self.overlay = None;
                EventOutcome::default()
            }
            ChartEvent::KeyDown { key: Key::Enter } => self.next_search_match(),
            ChartEvent::Wheel {
                delta_y,
                mode,
                pointer,
            } => EventOutcome {
                transform_changed: self.viewport.wheel(delta_y, mode, pointer),
                ..Default::default()
            },
            ChartEvent::Drag { dx, dy } => EventOutcome {
                transform_changed: self.viewport.pan_by(dx, dy),
                ..Default::default()
            },
            ChartEvent::Resize { width, height } => {
                self.viewport.resize(width, height);
                EventOutcome::default()
            }
        }
    }

    fn click_node(&mut self, id: &str, multi_select: bool) -> EventOutcome {
        let Some(key) = self
            .tree
            .as_ref()
            .and_then(|tree| tree.record(id))
            .map(|record| record.selection_key.clone())
        else {
            return EventOutcome::default();
        };
        if multi_select {
            match self.selected.iter().position(|k| k == &key) {
                Some(pos) => {
                    self.selected.remove(pos);
                }
                None => self.selected.push(key.clone()),
            }
        } else if self.selected.len() == 1 && self.selected[0] == key {
            self.selected.clear();
        } else {
            self.selected = vec![key.clone()];
        }
        // Local feedback first; the host hears about it on the next flush.
        self.notifier.queue(SelectionRequest::Select { key, multi_select });
        self.apply_highlights();
        self.relayout();
        EventOutcome {
            relayout: true,
            ..Default::default()
        }
    }

    fn toggle_anchored(&mut self, id: &str) -> EventOutcome {
        let anchor = self
            .layout
            .as_ref()
            .and_then(|layout| layout.node(id))
            .map(|node| self.viewport.capture_anchor(node.absolute_center));
        let Some(tree) = self.tree.as_ref() else {
            return EventOutcome::default();
        };
        let Some(collapsed) = self.collapse.toggle(tree, id) else {
            return EventOutcome::default();
        };
        debug!(id, collapsed, "toggled node");
        self.relayout();

        let before = self.viewport.transform();
        match (anchor, self.layout.as_ref().and_then(|layout| layout.node(id))) {
            (Some(anchor), Some(node)) => {
                let center = node.absolute_center;
                self.viewport.restore_anchor(anchor, center);
            }
            _ => debug!(id, "toggled node not laid out, skipping anchor"),
        }
        EventOutcome {
            relayout: true,
            transform_changed: self.viewport.transform() != before,
            transition: None,
        }
    }

    fn relayout_and_fit(&mut self) -> EventOutcome {
        self.relayout();
        let transition = self.fit(self.config.zoom.fit_duration_ms);
        EventOutcome {
            relayout: true,
            transform_changed: transition.is_some(),
            transition,
        }
    }

    fn reveal_and_focus(&mut self, id: &str) -> EventOutcome {
        let Some(tree) = self.tree.as_ref() else {
            return EventOutcome::default();
        };
        if !self.collapse.ensure_visible(tree, id) {
            return EventOutcome::default();
        }
        self.relayout();
        let transition = self
            .layout
            .as_ref()
            .and_then(|layout| layout.node(id))
            .map(|node| node.absolute_center)
            .and_then(|center| {
                self.viewport.focus_on_node(
                    center,
                    self.config.zoom.focus_scale,
                    self.config.zoom.focus_duration_ms,
                )
            });
        EventOutcome {
            relayout: true,
            transform_changed: transition.is_some(),
            transition,
        }
    }

    fn next_search_match(&mut self) -> EventOutcome {
        let Some(Overlay::Search {
            matches, cursor, ..
        }) = self.overlay.as_mut()
        else {
            return EventOutcome::default();
        };
        if matches.is_empty() {
            return EventOutcome::default();
        }
        *cursor = (*cursor + 1) % matches.len();
        let id = matches[*cursor].clone();
        self.reveal_and_focus(&id)
    }

    /// Ids whose name, id, title or division contains `query`
    /// (case-insensitive), in chart order.
    pub fn search(&self, query: &str) -> Vec<String> {
        let needle = query.trim().to_lowercase();
        let Some(tree) = self.tree.as_ref() else {
            return Vec::new();
        };
        if needle.is_empty() {
            return Vec::new();
        }
        tree.preorder()
            .into_iter()
            .filter_map(|node| node.record.as_ref())
            .filter(|record| {
                [
                    Some(record.display_name.as_str()),
                    Some(record.id.as_str()),
                    record.title.as_deref(),
                    record.division.as_deref(),
                ]
                .into_iter()
                .flatten()
                .any(|field| field.to_lowercase().contains(&needle))
            })
            .map(|record| record.id.clone())
            .collect()
    }

    /// Paint checkpoint. Returns the ids revealed on this frame.
    pub fn on_frame(&mut self) -> Vec<String> {
        self.reveal.on_frame()
    }

    pub fn settle(&mut self) {
        while !self.reveal.pending.is_empty() {
            self.reveal.on_frame();
        }
    }

    pub fn pending_host_calls(&self) -> usize {
        self.notifier.pending()
    }

    /// Deliver queued selection requests after the synchronous handler.
    pub fn flush_host_calls(&mut self, host: &mut dyn SelectionHost) -> usize {
        self.notifier.flush(host)
    }

    pub fn take_host_calls(&mut self) -> Vec<SelectionRequest> {
        self.notifier.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{CellValue, Column, ColumnRole};
    use crate::selection::{HostError, RecordingHost};

    fn table(rows: &[(&str, Option<&str>, &str)]) -> DataTable {
        let mut table = DataTable::new(vec![
            Column::new("Id", &[ColumnRole::EmployeeId]),
            Column::new("Manager", &[ColumnRole::ManagerId]),
            Column::new("Name", &[ColumnRole::DisplayName]),
        ]);
        for (id, manager, name) in rows {
            table.push_row(vec![
                CellValue::from(*id),
                manager.map(CellValue::from).unwrap_or_default(),
                CellValue::from(*name),
            ]);
        }
        table
    }

    fn example() -> DataTable {
        table(&[
            ("A", None, "Alice"),
            ("B", Some("A"), "Bob"),
            ("C", Some("B"), "Carol"),
            ("D", Some("Z"), "Dan"),
        ])
    }

    #[test]
    fn inverted_zoom_range_falls_back_to_defaults() {
        let mut config = ChartConfig::default();
        config.zoom.min_scale = 4.0;
        config.zoom.max_scale = 0.5;
        let mut chart = OrgChart::new(config, 1000.0, 700.0);
        assert_eq!(chart.config().zoom.min_scale, ChartConfig::default().zoom.min_scale);
        chart.handle(ChartEvent::Wheel {
            delta_y: -100.0,
            mode: WheelMode::Pixel,
            pointer: (10.0, 10.0),
        });
        assert!(chart.transform().k <= ChartConfig::default().zoom.max_scale);
    }

    fn chart_with(data: &DataTable, config: &ChartConfig) -> OrgChart {
        let mut chart = OrgChart::new(config.clone(), 1000.0, 700.0);
        let outcome = chart.update(ChartUpdate {
            table: data,
            config,
            viewport: (1000.0, 700.0),
            highlighted: &[],
        });
        assert!(matches!(outcome, UpdateOutcome::Rendered { .. }));
        chart
    }

    fn visible_ids(chart: &OrgChart) -> Vec<String> {
        let mut ids: Vec<String> = chart
            .layout()
            .unwrap()
            .nodes
            .iter()
            .map(|n| n.id.clone())
            .collect();
        ids.sort();
        ids
    }

    #[test]
    fn missing_manager_role_reports_no_chart() {
        let mut data = example();
        data.columns[1].roles.clear();
        let config = ChartConfig::default();
        let mut chart = OrgChart::new(config.clone(), 800.0, 600.0);
        let outcome = chart.update(ChartUpdate {
            table: &data,
            config: &config,
            viewport: (800.0, 600.0),
            highlighted: &[],
        });
        assert!(matches!(outcome, UpdateOutcome::NoChart { ref reason } if reason.contains("Manager")));
        assert!(chart.layout().is_none());
        assert_eq!(chart.handle(ChartEvent::ExpandAll), EventOutcome::default());
    }

    #[test]
    fn default_levels_apply_once() {
        let mut config = ChartConfig::default();
        config.layout.initial_expanded_levels = 1;
        let data = example();
        let mut chart = chart_with(&data, &config);
        assert_eq!(visible_ids(&chart), vec!["A", "B", "D"]);

        chart.handle(ChartEvent::ExpandAll);
        chart.update(ChartUpdate {
            table: &data,
            config: &config,
            viewport: (1000.0, 700.0),
            highlighted: &[],
        });
        assert_eq!(visible_ids(&chart), vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn first_update_fits_content() {
        let config = ChartConfig::default();
        let data = example();
        let mut chart = OrgChart::new(config.clone(), 1000.0, 700.0);
        let outcome = chart.update(ChartUpdate {
            table: &data,
            config: &config,
            viewport: (1000.0, 700.0),
            highlighted: &[],
        });
        let UpdateOutcome::Rendered { transition, .. } = outcome else {
            panic!("expected a chart");
        };
        assert!(transition.is_some());
        let second = chart.update(ChartUpdate {
            table: &data,
            config: &config,
            viewport: (1000.0, 700.0),
            highlighted: &[],
        });
        assert!(matches!(second, UpdateOutcome::Rendered { transition: None, .. }));
    }

    #[test]
    fn anchored_toggle_preserves_screen_position() {
        let config = ChartConfig::default();
        let data = table(&[
            ("root", None, "Root"),
            ("a", Some("root"), "A"),
            ("b", Some("root"), "B"),
            ("a1", Some("a"), "A1"),
            ("a2", Some("a"), "A2"),
            ("a3", Some("a"), "A3"),
            ("b1", Some("b"), "B1"),
        ]);
        let mut chart = chart_with(&data, &config);
        let center = chart.layout().unwrap().node("a").unwrap().absolute_center;
        let screen = chart.transform().apply(center);

        chart.handle(ChartEvent::ToggleClicked { id: "a".into() });
        let moved = chart.layout().unwrap().node("a").unwrap().absolute_center;
        let screen_after = chart.transform().apply(moved);
        assert!((screen.0 - screen_after.0).abs() < 1e-2);
        assert!((screen.1 - screen_after.1).abs() < 1e-2);
    }

    #[test]
    fn expanding_reveals_one_level_collapsed() {
        let config = ChartConfig {
            layout: crate::config::LayoutConfig {
                initial_expanded_levels: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut chart = chart_with(&example(), &config);
        chart.handle(ChartEvent::ToggleClicked { id: "A".into() });
        assert_eq!(visible_ids(&chart), vec!["A", "D"]);
        chart.handle(ChartEvent::ToggleClicked { id: "A".into() });
        assert_eq!(visible_ids(&chart), vec!["A", "B", "D"]);
        assert!(chart.layout().unwrap().node("B").unwrap().is_collapsed);
    }

    #[test]
    fn click_selects_locally_and_defers_host_call() {
        let config = ChartConfig::default();
        let mut chart = chart_with(&example(), &config);
        chart.handle(ChartEvent::NodeClicked {
            id: "B".into(),
            multi_select: false,
        });
        assert!(chart.layout().unwrap().node("B").unwrap().record.highlighted);
        assert_eq!(chart.pending_host_calls(), 1);

        let mut host = RecordingHost::default();
        assert_eq!(chart.flush_host_calls(&mut host), 1);
        assert!(matches!(
            host.received[0],
            SelectionRequest::Select { multi_select: false, .. }
        ));

        chart.handle(ChartEvent::CanvasClicked);
        assert!(chart.selected().is_empty());
        assert_eq!(chart.take_host_calls(), vec![SelectionRequest::Clear]);
    }

    #[test]
    fn host_failure_does_not_roll_back() {
        struct Down;
        impl SelectionHost for Down {
            fn request(&mut self, _: &SelectionRequest) -> Result<(), HostError> {
                Err(HostError::Unavailable)
            }
        }
        let config = ChartConfig::default();
        let mut chart = chart_with(&example(), &config);
        chart.handle(ChartEvent::NodeClicked {
            id: "A".into(),
            multi_select: true,
        });
        chart.flush_host_calls(&mut Down);
        assert_eq!(chart.selected().len(), 1);
        assert!(chart.layout().unwrap().node("A").unwrap().record.highlighted);
    }

    #[test]
    fn host_highlight_reveals_ancestors() {
        let mut config = ChartConfig::default();
        config.layout.initial_expanded_levels = 1;
        let data = example();
        let mut chart = OrgChart::new(config.clone(), 1000.0, 700.0);
        // Row 2 is "C", two levels below the default cut.
        let key = SelectionKey::for_row(2, "C");
        chart.update(ChartUpdate {
            table: &data,
            config: &config,
            viewport: (1000.0, 700.0),
            highlighted: std::slice::from_ref(&key),
        });
        assert!(visible_ids(&chart).contains(&"C".to_string()));
        assert!(chart.layout().unwrap().node("C").unwrap().record.highlighted);
    }

    #[test]
    fn search_reveals_and_focuses_match() {
        let mut config = ChartConfig::default();
        config.layout.initial_expanded_levels = 1;
        let mut chart = chart_with(&example(), &config);
        let outcome = chart.handle(ChartEvent::Search {
            query: "caro".into(),
        });
        assert!(outcome.relayout);
        let center = chart.layout().unwrap().node("C").unwrap().absolute_center;
        let screen = chart.transform().apply(center);
        assert!((screen.0 - 500.0).abs() < 1e-2);
        assert!((screen.1 - 350.0).abs() < 1e-2);
        assert!(matches!(chart.overlay(), Some(Overlay::Search { .. })));

        // Clicking the canvas closes the overlay without clearing selection.
        chart.handle(ChartEvent::CanvasClicked);
        assert!(chart.overlay().is_none());
        assert_eq!(chart.pending_host_calls(), 0);
    }

    #[test]
    fn entering_nodes_reveal_after_two_frames() {
        let mut config = ChartConfig::default();
        config.layout.initial_expanded_levels = 1;
        let mut chart = chart_with(&example(), &config);
        chart.settle();
        chart.handle(ChartEvent::ToggleClicked { id: "B".into() });
        assert!(!chart.is_revealed("C"));
        assert!(chart.on_frame().is_empty());
        assert_eq!(chart.on_frame(), vec!["C".to_string()]);
        assert!(chart.is_revealed("C"));
    }

    #[test]
    fn disabled_zoom_ignores_gestures() {
        let mut config = ChartConfig::default();
        config.zoom.enabled = false;
        let mut chart = chart_with(&example(), &config);
        let outcome = chart.handle(ChartEvent::Drag { dx: 40.0, dy: 0.0 });
        assert!(!outcome.transform_changed);
        assert_eq!(chart.transform(), Transform::IDENTITY);
    }
}
