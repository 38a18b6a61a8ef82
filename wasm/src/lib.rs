use orgchart_renderer::chart::{ChartEvent, ChartUpdate, Key, OrgChart, UpdateOutcome};
use orgchart_renderer::config::{Config, parse_config};
use orgchart_renderer::ir::{DataTable, SelectionKey};
use orgchart_renderer::render::render_svg;
use orgchart_renderer::scene_dump::SceneDump;
use orgchart_renderer::viewport::WheelMode;
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PanelOptions {
    /// Same shape as the CLI config file.
    config: Option<serde_json::Value>,
    width: Option<f32>,
    height: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum PanelEvent {
    #[serde(rename_all = "camelCase")]
    NodeClick { id: String, multi_select: bool },
    ToggleClick { id: String },
    CanvasClick,
    ExpandAll,
    CollapseAll,
    Fit,
    Reset,
    Focus { id: String },
    OpenSearch,
    Search { query: String },
    Escape,
    Enter,
    CloseOverlay,
    #[serde(rename_all = "camelCase")]
    Wheel { delta_y: f32, delta_mode: u32, x: f32, y: f32 },
    Drag { dx: f32, dy: f32 },
    Resize { width: f32, height: f32 },
}

impl From<PanelEvent> for ChartEvent {
    fn from(event: PanelEvent) -> Self {
        match event {
            PanelEvent::NodeClick { id, multi_select } => ChartEvent::NodeClicked { id, multi_select },
            PanelEvent::ToggleClick { id } => ChartEvent::ToggleClicked { id },
            PanelEvent::CanvasClick => ChartEvent::CanvasClicked,
            PanelEvent::ExpandAll => ChartEvent::ExpandAll,
            PanelEvent::CollapseAll => ChartEvent::CollapseAll,
            PanelEvent::Fit => ChartEvent::FitToViewport,
            PanelEvent::Reset => ChartEvent::ResetView,
            PanelEvent::Focus { id } => ChartEvent::FocusNode { id },
            PanelEvent::OpenSearch => ChartEvent::OpenSearch,
            PanelEvent::Search { query } => ChartEvent::Search { query },
            PanelEvent::Escape => ChartEvent::KeyDown { key: Key::Escape },
            PanelEvent::Enter => ChartEvent::KeyDown { key: Key::Enter },
            PanelEvent::CloseOverlay => ChartEvent::CloseOverlay,
            PanelEvent::Wheel {
                delta_y,
                delta_mode,
                x,
                y,
            } => ChartEvent::Wheel {
                delta_y,
                // DOM WheelEvent.deltaMode
                mode: match delta_mode {
                    1 => WheelMode::Line,
                    2 => WheelMode::Page,
                    _ => WheelMode::Pixel,
                },
                pointer: (x, y),
            },
            PanelEvent::Drag { dx, dy } => ChartEvent::Drag { dx, dy },
            PanelEvent::Resize { width, height } => ChartEvent::Resize { width, height },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
enum UpdateReply {
    Rendered { nodes: usize },
    NoChart { reason: String },
}

fn parse_options(options_json: Option<&str>) -> Result<(Config, f32, f32), String> {
    let options = match options_json {
        Some(raw) => serde_json::from_str::<PanelOptions>(raw).map_err(|error| error.to_string())?,
        None => PanelOptions::default(),
    };
    let config = match options.config {
        Some(value) => parse_config(&value.to_string()).map_err(|error| error.to_string())?,
        None => Config::default(),
    };
    let width = options.width.unwrap_or(config.render.width);
    let height = options.height.unwrap_or(config.render.height);
    Ok((config, width, height))
}

/// One chart instance per visualization panel.
#[wasm_bindgen]
pub struct OrgChartPanel {
    chart: OrgChart,
    config: Config,
    size: (f32, f32),
}

impl OrgChartPanel {
    fn create(options_json: Option<&str>) -> Result<Self, String> {
        let (config, width, height) = parse_options(options_json)?;
        Ok(Self {
            chart: OrgChart::new(config.chart.clone(), width, height),
            config,
            size: (width, height),
        })
    }

    fn apply_update(&mut self, table_json: &str, highlighted_json: Option<&str>) -> Result<String, String> {
        let table: DataTable = serde_json::from_str(table_json).map_err(|error| error.to_string())?;
        let highlighted: Vec<SelectionKey> = match highlighted_json {
            Some(raw) => serde_json::from_str(raw).map_err(|error| error.to_string())?,
            None => Vec::new(),
        };
        let reply = match self.chart.update(ChartUpdate {
            table: &table,
            config: &self.config.chart,
            viewport: self.size,
            highlighted: &highlighted,
        }) {
            UpdateOutcome::Rendered { nodes, .. } => UpdateReply::Rendered { nodes },
            UpdateOutcome::NoChart { reason } => UpdateReply::NoChart { reason },
        };
        serde_json::to_string(&reply).map_err(|error| error.to_string())
    }

    fn apply_event(&mut self, event_json: &str) -> Result<bool, String> {
        let event: PanelEvent = serde_json::from_str(event_json).map_err(|error| error.to_string())?;
        let event = ChartEvent::from(event);
        if let ChartEvent::Resize { width, height } = event {
            self.size = (width, height);
        }
        let outcome = self.chart.handle(event);
        Ok(outcome.relayout || outcome.transform_changed)
    }
}

#[wasm_bindgen]
impl OrgChartPanel {
    #[wasm_bindgen(constructor)]
    pub fn new(options_json: Option<String>) -> Result<OrgChartPanel, JsValue> {
        Self::create(options_json.as_deref()).map_err(|error| JsValue::from_str(&error))
    }

    /// Rebind host data. Returns `{"kind":"rendered"|"noChart", ...}`.
    pub fn update(&mut self, table_json: &str, highlighted_json: Option<String>) -> Result<String, JsValue> {
        self.apply_update(table_json, highlighted_json.as_deref())
            .map_err(|error| JsValue::from_str(&error))
    }

    /// Returns whether the scene needs repainting.
    pub fn dispatch(&mut self, event_json: &str) -> Result<bool, JsValue> {
        self.apply_event(event_json).map_err(|error| JsValue::from_str(&error))
    }

    /// Call once per animation frame; returns the ids revealed on it.
    pub fn frame(&mut self) -> Vec<String> {
        self.chart.on_frame()
    }

    pub fn svg(&self) -> String {
        render_svg(&self.chart, &self.config.theme)
    }

    pub fn scene(&self) -> Result<String, JsValue> {
        serde_json::to_string(&SceneDump::from_chart(&self.chart))
            .map_err(|error| JsValue::from_str(&error.to_string()))
    }

    /// Selection requests queued since the last call, as a JSON array.
    pub fn take_selection_requests(&mut self) -> String {
        serde_json::to_string(&self.chart.take_host_calls()).unwrap_or_else(|_| "[]".to_string())
    }
}
