use crate::chart::{ChartEvent, ChartUpdate, OrgChart, UpdateOutcome};
use crate::config::{Config, load_config};
use crate::ir::{DataTable, Orientation, SelectionKey};
use crate::render::{render_svg, write_output_svg};
use crate::scene_dump::write_scene_dump;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "orgc", version, about = "Organization chart renderer")]
pub struct Args {
    /// Input data table (.json) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file (svg/png/json). Defaults to stdout for SVG and JSON.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file (theme, themeVariables, chart options)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,

    /// Levels expanded on first load (0 expands everything)
    #[arg(long = "levels")]
    pub levels: Option<u32>,

    #[arg(long = "orientation", value_enum)]
    pub orientation: Option<OrientationArg>,

    /// Selection keys highlighted by the host
    #[arg(long = "highlight")]
    pub highlight: Vec<String>,

    #[arg(long = "expand-all", conflicts_with = "collapse_all")]
    pub expand_all: bool,

    #[arg(long = "collapse-all")]
    pub collapse_all: bool,

    /// Reveal and center an employee id
    #[arg(long = "focus")]
    pub focus: Option<String>,

    /// Reveal and center the first employee matching a query
    #[arg(long = "search")]
    pub search: Option<String>,

    /// Increase log verbosity (-v, -vv)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
    Json,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OrientationArg {
    Vertical,
    Horizontal,
}

impl From<OrientationArg> for Orientation {
    fn from(value: OrientationArg) -> Self {
        match value {
            OrientationArg::Vertical => Orientation::Vertical,
            OrientationArg::Horizontal => Orientation::Horizontal,
        }
    }
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut config = load_config(args.config.as_deref())?;
    apply_args(&mut config, &args);
    config.chart.validate()?;

    let input = read_input(args.input.as_deref())?;
    let table: DataTable = serde_json::from_str(&input).context("invalid data table JSON")?;

    let chart = drive_chart(&config, &table, &args)?;

    match args.output_format {
        OutputFormat::Svg => {
            let svg = render_svg(&chart, &config.theme);
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Json => {
            write_scene_dump(args.output.as_deref(), &chart)?;
        }
        OutputFormat::Png => write_png(&chart, &config, args.output.as_deref())?,
    }
    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.as_str()));
    // A second init (tests, embedding) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn apply_args(config: &mut Config, args: &Args) {
    if let Some(width) = args.width {
        config.render.width = width;
    }
    if let Some(height) = args.height {
        config.render.height = height;
    }
    if let Some(levels) = args.levels {
        config.chart.layout.initial_expanded_levels = levels;
    }
    if let Some(orientation) = args.orientation {
        config.chart.layout.orientation = orientation.into();
    }
}

fn drive_chart(config: &Config, table: &DataTable, args: &Args) -> Result<OrgChart> {
    let size = (config.render.width, config.render.height);
    let highlighted: Vec<SelectionKey> = args
        .highlight
        .iter()
        .map(|key| SelectionKey::from(key.as_str()))
        .collect();
    let mut chart = OrgChart::new(config.chart.clone(), size.0, size.1);
    let outcome = chart.update(ChartUpdate {
        table,
        config: &config.chart,
        viewport: size,
        highlighted: &highlighted,
    });
    match outcome {
        UpdateOutcome::Rendered { nodes, .. } => info!(nodes, "chart ready"),
        UpdateOutcome::NoChart { reason } => {
            warn!(reason = %reason, "rendering placeholder");
            return Ok(chart);
        }
    }

    if args.expand_all {
        chart.handle(ChartEvent::ExpandAll);
    } else if args.collapse_all {
        chart.handle(ChartEvent::CollapseAll);
    }
    if let Some(query) = &args.search {
        if chart.search(query).is_empty() {
            warn!(query = %query, "search matched nothing");
        }
        chart.handle(ChartEvent::Search {
            query: query.clone(),
        });
        chart.handle(ChartEvent::CloseOverlay);
    }
    if let Some(id) = &args.focus {
        let outcome = chart.handle(ChartEvent::FocusNode { id: id.clone() });
        if !outcome.relayout {
            warn!(id = %id, "unknown employee id, nothing to focus");
        }
    }
    // A still image shows the settled scene.
    chart.settle();
    Ok(chart)
}

#[cfg(feature = "png")]
fn write_png(chart: &OrgChart, config: &Config, output: Option<&Path>) -> Result<()> {
    let output = ensure_output(output, "png")?;
    let svg = render_svg(chart, &config.theme);
    crate::render::write_output_png(&svg, &output, &config.render, &config.theme)
}

#[cfg(not(feature = "png"))]
fn write_png(_chart: &OrgChart, _config: &Config, _output: Option<&Path>) -> Result<()> {
    Err(anyhow::anyhow!(
        "PNG output requires the `png` feature"
    ))
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path
        && path != Path::new("-")
    {
        return std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()));
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

#[cfg_attr(not(feature = "png"), allow(dead_code))]
fn ensure_output(output: Option<&Path>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.to_path_buf());
    }
    Err(anyhow::anyhow!(
        "Output path required for {} output",
        ext
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["orgc"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn flags_override_config() {
        let mut config = Config::default();
        let args = args(&["--levels", "0", "--orientation", "horizontal", "-w", "640"]);
        apply_args(&mut config, &args);
        assert_eq!(config.chart.layout.initial_expanded_levels, 0);
        assert_eq!(config.chart.layout.orientation, Orientation::Horizontal);
        assert_eq!(config.render.width, 640.0);
        assert_eq!(config.render.height, Config::default().render.height);
    }

    #[test]
    fn drive_chart_applies_focus() {
        let table: DataTable = serde_json::from_str(
            r#"{"columns":[{"name":"id","roles":["employeeId"]},{"name":"mgr","roles":["managerId"]}],
                "rows":[["1",null],["2","1"],["3","2"]]}"#,
        )
        .unwrap();
        let mut config = Config::default();
        config.chart.layout.initial_expanded_levels = 1;
        let chart = drive_chart(&config, &table, &args(&["--focus", "3"])).unwrap();
        assert!(chart.layout().unwrap().node("3").is_some());
        assert!(chart.is_revealed("3"));
    }

    #[test]
    fn png_requires_output_path() {
        assert!(ensure_output(None, "png").is_err());
    }
}
