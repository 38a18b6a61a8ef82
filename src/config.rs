use crate::ir::Orientation;
use crate::theme::Theme;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::warn;

static COLOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(#([0-9a-fA-F]{3,4}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})|(rgb|rgba|hsl|hsla)\([0-9.,%\s]+\)|[a-zA-Z]+)$",
    )
    .unwrap()
});

pub fn is_valid_color(value: &str) -> bool {
    COLOR_RE.is_match(value.trim())
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("zoom range must be positive with min < max (got {min}..{max})")]
    InvalidZoomRange { min: f32, max: f32 },
    #[error("{field} must be positive (got {value})")]
    NonPositive { field: &'static str, value: f32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub node_width: f32,
    pub node_height: f32,
    pub horizontal_spacing: f32,
    pub vertical_spacing: f32,
    pub orientation: Orientation,
    pub padding: f32,
    /// Separation, in node pitches, between neighbours with different parents.
    pub cousin_separation: f32,
    pub initial_expanded_levels: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 250.0,
            node_height: 120.0,
            horizontal_spacing: 40.0,
            vertical_spacing: 70.0,
            orientation: Orientation::Vertical,
            padding: 60.0,
            cousin_separation: 1.3,
            initial_expanded_levels: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoomConfig {
    pub enabled: bool,
    pub min_scale: f32,
    pub max_scale: f32,
    pub focus_scale: f32,
    pub fit_duration_ms: u32,
    pub focus_duration_ms: u32,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_scale: 0.1,
            max_scale: 3.0,
            focus_scale: 1.0,
            fit_duration_ms: 500,
            focus_duration_ms: 750,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardConfig {
    pub border_width: f32,
    pub corner_radius: f32,
    pub shadow: bool,
    pub show_avatar: bool,
    pub avatar_size: f32,
    pub align: TextAlign,
    pub padding: f32,
    pub highlight_width: f32,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            border_width: 1.0,
            corner_radius: 8.0,
            shadow: true,
            show_avatar: true,
            avatar_size: 44.0,
            align: TextAlign::Left,
            padding: 12.0,
            highlight_width: 3.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextConfig {
    pub name_size: f32,
    pub title_size: f32,
    pub detail_size: f32,
    pub line_height: f32,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            name_size: 15.0,
            title_size: 12.0,
            detail_size: 11.0,
            line_height: 1.35,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkConfig {
    pub width: f32,
    pub opacity: f32,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            width: 1.5,
            opacity: 0.8,
        }
    }
}

/// Formatting options, read-only per update cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    pub layout: LayoutConfig,
    pub zoom: ZoomConfig,
    pub card: CardConfig,
    pub text: TextConfig,
    pub link: LinkConfig,
    pub number_locale: String,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            zoom: ZoomConfig::default(),
            card: CardConfig::default(),
            text: TextConfig::default(),
            link: LinkConfig::default(),
            number_locale: "en-US".to_string(),
        }
    }
}

impl ChartConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let zoom = &self.zoom;
        if !(zoom.min_scale > 0.0 && zoom.min_scale < zoom.max_scale) {
            return Err(ConfigError::InvalidZoomRange {
                min: zoom.min_scale,
                max: zoom.max_scale,
            });
        }
        let sizes = [
            ("node width", self.layout.node_width),
            ("node height", self.layout.node_height),
            ("focus scale", zoom.focus_scale),
        ];
        for (field, value) in sizes {
            if !(value > 0.0) {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            background: "#FFFFFF".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub chart: ChartConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::classic();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            chart: ChartConfig::default(),
            render,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    background: Option<String>,
    card_fill: Option<String>,
    card_border: Option<String>,
    name_color: Option<String>,
    title_color: Option<String>,
    division_color: Option<String>,
    detail_color: Option<String>,
    link_color: Option<String>,
    highlight_color: Option<String>,
    toggle_fill: Option<String>,
    toggle_text: Option<String>,
    avatar_fill: Option<String>,
    avatar_text: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ChartConfigFile {
    node_width: Option<f32>,
    node_height: Option<f32>,
    horizontal_spacing: Option<f32>,
    vertical_spacing: Option<f32>,
    orientation: Option<String>,
    padding: Option<f32>,
    cousin_separation: Option<f32>,
    initial_expanded_levels: Option<u32>,
    zoom_enabled: Option<bool>,
    min_zoom: Option<f32>,
    max_zoom: Option<f32>,
    focus_zoom: Option<f32>,
    fit_duration_ms: Option<u32>,
    focus_duration_ms: Option<u32>,
    card_border_width: Option<f32>,
    card_corner_radius: Option<f32>,
    card_shadow: Option<bool>,
    show_avatar: Option<bool>,
    avatar_size: Option<f32>,
    text_align: Option<TextAlign>,
    name_size: Option<f32>,
    title_size: Option<f32>,
    detail_size: Option<f32>,
    link_width: Option<f32>,
    link_opacity: Option<f32>,
    number_locale: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    chart: Option<ChartConfigFile>,
    width: Option<f32>,
    height: Option<f32>,
}

fn set_color(target: &mut String, value: Option<String>, name: &str) {
    let Some(value) = value else {
        return;
    };
    if is_valid_color(&value) {
        *target = value;
    } else {
        warn!(variable = name, value = %value, "ignoring invalid colour");
    }
}

fn apply_theme_variables(theme: &mut Theme, vars: ThemeVariables) {
    if let Some(v) = vars.font_family {
        theme.font_family = v;
    }
    set_color(&mut theme.background, vars.background, "background");
    set_color(&mut theme.card_fill, vars.card_fill, "cardFill");
    set_color(&mut theme.card_border, vars.card_border, "cardBorder");
    set_color(&mut theme.name_color, vars.name_color, "nameColor");
    set_color(&mut theme.title_color, vars.title_color, "titleColor");
    set_color(&mut theme.division_color, vars.division_color, "divisionColor");
    set_color(&mut theme.detail_color, vars.detail_color, "detailColor");
    set_color(&mut theme.link_color, vars.link_color, "linkColor");
    set_color(&mut theme.highlight_color, vars.highlight_color, "highlightColor");
    set_color(&mut theme.toggle_fill, vars.toggle_fill, "toggleFill");
    set_color(&mut theme.toggle_text, vars.toggle_text, "toggleText");
    set_color(&mut theme.avatar_fill, vars.avatar_fill, "avatarFill");
    set_color(&mut theme.avatar_text, vars.avatar_text, "avatarText");
}

fn apply_chart_file(chart: &mut ChartConfig, file: ChartConfigFile) {
    let layout = &mut chart.layout;
    if let Some(v) = file.node_width {
        layout.node_width = v;
    }
    if let Some(v) = file.node_height {
        layout.node_height = v;
    }
    if let Some(v) = file.horizontal_spacing {
        layout.horizontal_spacing = v.max(0.0);
    }
    if let Some(v) = file.vertical_spacing {
        layout.vertical_spacing = v.max(0.0);
    }
    if let Some(v) = file.orientation {
        match Orientation::from_token(&v) {
            Some(orientation) => layout.orientation = orientation,
            None => warn!(value = %v, "ignoring unknown orientation"),
        }
    }
    if let Some(v) = file.padding {
        layout.padding = v.max(0.0);
    }
    if let Some(v) = file.cousin_separation {
        layout.cousin_separation = v.max(1.0);
    }
    if let Some(v) = file.initial_expanded_levels {
        layout.initial_expanded_levels = v;
    }

    let zoom = &mut chart.zoom;
    if let Some(v) = file.zoom_enabled {
        zoom.enabled = v;
    }
    if let Some(v) = file.min_zoom {
        zoom.min_scale = v;
    }
    if let Some(v) = file.max_zoom {
        zoom.max_scale = v;
    }
    if let Some(v) = file.focus_zoom {
        zoom.focus_scale = v;
    }
    if let Some(v) = file.fit_duration_ms {
        zoom.fit_duration_ms = v;
    }
    if let Some(v) = file.focus_duration_ms {
        zoom.focus_duration_ms = v;
    }

    let card = &mut chart.card;
    if let Some(v) = file.card_border_width {
        card.border_width = v.max(0.0);
    }
    if let Some(v) = file.card_corner_radius {
        card.corner_radius = v.max(0.0);
    }
    if let Some(v) = file.card_shadow {
        card.shadow = v;
    }
    if let Some(v) = file.show_avatar {
        card.show_avatar = v;
    }
    if let Some(v) = file.avatar_size {
        card.avatar_size = v.max(0.0);
    }
    if let Some(v) = file.text_align {
        card.align = v;
    }

    if let Some(v) = file.name_size {
        chart.text.name_size = v;
    }
    if let Some(v) = file.title_size {
        chart.text.title_size = v;
    }
    if let Some(v) = file.detail_size {
        chart.text.detail_size = v;
    }
    if let Some(v) = file.link_width {
        chart.link.width = v.max(0.0);
    }
    if let Some(v) = file.link_opacity {
        chart.link.opacity = v.clamp(0.0, 1.0);
    }
    if let Some(v) = file.number_locale {
        chart.number_locale = v;
    }
}

/// Parse a configuration document. Plain JSON is tried first, then JSON5.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = match serde_json::from_str(contents) {
        Ok(parsed) => parsed,
        Err(_) => json5::from_str(contents)?,
    };

    let mut config = Config::default();
    if let Some(theme_name) = parsed.theme.as_deref() {
        match Theme::by_name(theme_name) {
            Some(theme) => config.theme = theme,
            None => warn!(theme = theme_name, "unknown theme, keeping classic"),
        }
    }
    if let Some(vars) = parsed.theme_variables {
        apply_theme_variables(&mut config.theme, vars);
    }
    config.render.background = config.theme.background.clone();
    if let Some(chart) = parsed.chart {
        apply_chart_file(&mut config.chart, chart);
    }
    if let Some(width) = parsed.width {
        config.render.width = width;
    }
    if let Some(height) = parsed.height {
        config.render.height = height;
    }
    config.chart.validate()?;
    Ok(config)
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(ChartConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_inverted_zoom_range() {
        let mut chart = ChartConfig::default();
        chart.zoom.min_scale = 2.0;
        chart.zoom.max_scale = 1.0;
        assert_eq!(
            chart.validate(),
            Err(ConfigError::InvalidZoomRange { min: 2.0, max: 1.0 })
        );
        chart.zoom.min_scale = 0.0;
        assert!(chart.validate().is_err());
    }

    #[test]
    fn parses_json_overrides() {
        let config = parse_config(
            r##"{
                "theme": "modern",
                "themeVariables": {"linkColor": "#123456", "cardFill": "not a colour!"},
                "chart": {"nodeWidth": 180, "orientation": "horizontal", "initialExpandedLevels": 0}
            }"##,
        )
        .unwrap();
        assert_eq!(config.theme.link_color, "#123456");
        assert_eq!(config.theme.card_fill, Theme::modern().card_fill);
        assert_eq!(config.chart.layout.node_width, 180.0);
        assert_eq!(config.chart.layout.orientation, Orientation::Horizontal);
        assert_eq!(config.chart.layout.initial_expanded_levels, 0);
    }

    #[test]
    fn accepts_json5_with_comments() {
        let config = parse_config(
            r#"{
                // tighter cards
                chart: { nodeHeight: 90, zoomEnabled: false, },
            }"#,
        )
        .unwrap();
        assert_eq!(config.chart.layout.node_height, 90.0);
        assert!(!config.chart.zoom.enabled);
    }

    #[test]
    fn invalid_zoom_in_file_is_an_error() {
        let result = parse_config(r#"{"chart": {"minZoom": 4, "maxZoom": 2}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn colour_validation() {
        assert!(is_valid_color("#fff"));
        assert!(is_valid_color("#A1B2C3"));
        assert!(is_valid_color("rgba(0, 0, 0, 0.5)"));
        assert!(is_valid_color("steelblue"));
        assert!(!is_valid_color("#12"));
        assert!(!is_valid_color("url(javascript:1)"));
    }
}
