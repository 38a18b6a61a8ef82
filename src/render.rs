use crate::chart::OrgChart;
use crate::config::{ChartConfig, TextAlign};
use crate::ir::Orientation;
use crate::layout::text::values_origin;
use crate::layout::{ChartLayout, PositionedNode};
use crate::theme::Theme;
use crate::viewport::Transform;
use anyhow::Result;
use std::path::Path;

const TOGGLE_RADIUS: f32 = 11.0;

/// Paint the chart's current scene: layout under the viewport transform, or
/// the placeholder message when there is no chart.
pub fn render_svg(chart: &OrgChart, theme: &Theme) -> String {
    let (width, height) = chart.viewport().size();
    let width = width.max(200.0);
    let height = height.max(200.0);
    let config = chart.config();

    let Some(layout) = chart.layout().filter(|layout| !layout.is_empty()) else {
        let message = chart
            .no_chart_reason()
            .unwrap_or("No employees to display");
        return render_placeholder(message, width, height, theme);
    };

    // Without zoom the content scales to the frame through the viewBox.
    let (view_box, transform) = if chart.viewport().is_enabled() {
        (format!("0 0 {width} {height}"), Some(chart.transform()))
    } else {
        (
            format!("0 0 {:.2} {:.2}", layout.width(), layout.height()),
            None,
        )
    };

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" width=\"{width}\" height=\"{height}\" viewBox=\"{view_box}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));
    if config.card.shadow {
        svg.push_str("<defs><filter id=\"card-shadow\" x=\"-10%\" y=\"-10%\" width=\"120%\" height=\"130%\"><feDropShadow dx=\"0\" dy=\"1.5\" stdDeviation=\"2\" flood-color=\"#000000\" flood-opacity=\"0.18\"/></filter></defs>");
    }
    svg.push_str(&scene_group(layout, transform, |id| chart.is_revealed(id), config, theme));
    svg.push_str("</svg>");
    svg
}

fn scene_group(
    layout: &ChartLayout,
    transform: Option<Transform>,
    revealed: impl Fn(&str) -> bool,
    config: &ChartConfig,
    theme: &Theme,
) -> String {
    let mut out = String::new();
    match transform {
        Some(transform) => out.push_str(&format!(
            "<g class=\"viewport\" transform=\"{}\">",
            transform.to_svg()
        )),
        None => out.push_str("<g class=\"viewport\">"),
    }

    out.push_str("<g class=\"links\">");
    for link in &layout.links {
        let hidden = !revealed(&link.target_id);
        out.push_str(&format!(
            "<path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\" stroke-opacity=\"{}\"{}/>",
            link.path(),
            theme.link_color,
            config.link.width,
            config.link.opacity,
            if hidden { " opacity=\"0\"" } else { "" }
        ));
    }
    out.push_str("</g>");

    out.push_str("<g class=\"nodes\">");
    for (index, node) in layout.nodes.iter().enumerate() {
        out.push_str(&card_svg(
            index,
            node,
            layout.orientation,
            revealed(&node.id),
            config,
            theme,
        ));
    }
    out.push_str("</g></g>");
    out
}

fn card_svg(
    index: usize,
    node: &PositionedNode,
    orientation: Orientation,
    revealed: bool,
    config: &ChartConfig,
    theme: &Theme,
) -> String {
    let card = &config.card;
    let text_cfg = &config.text;
    let (x, y) = node.absolute_top_left;
    let (w, h) = node.size;
    let mut out = String::new();

    out.push_str(&format!(
        "<g class=\"card\" data-id=\"{}\"{}>",
        escape_xml(&node.id),
        if revealed { "" } else { " opacity=\"0\"" }
    ));
    out.push_str(&format!("<title>{}</title>", escape_xml(&tooltip(node))));

    let (stroke, stroke_width) = if node.record.highlighted {
        (theme.highlight_color.as_str(), card.highlight_width)
    } else {
        (theme.card_border.as_str(), card.border_width)
    };
    out.push_str(&format!(
        "<rect x=\"{x:.2}\" y=\"{y:.2}\" width=\"{w:.2}\" height=\"{h:.2}\" rx=\"{r}\" ry=\"{r}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{}\"{}/>",
        theme.card_fill,
        stroke,
        stroke_width,
        if card.shadow { " filter=\"url(#card-shadow)\"" } else { "" },
        r = card.corner_radius,
    ));

    let mut text_left = x + card.padding;
    if card.show_avatar {
        let size = card.avatar_size;
        let cx = x + card.padding + size / 2.0;
        let cy = y + card.padding + size / 2.0;
        let radius = size / 2.0;
        match node.record.avatar_url.as_deref() {
            Some(url) => {
                let clip = format!("avatar-{index}");
                out.push_str(&format!(
                    "<clipPath id=\"{clip}\"><circle cx=\"{cx:.2}\" cy=\"{cy:.2}\" r=\"{radius:.2}\"/></clipPath>"
                ));
                out.push_str(&format!(
                    "<image href=\"{}\" x=\"{:.2}\" y=\"{:.2}\" width=\"{size:.2}\" height=\"{size:.2}\" preserveAspectRatio=\"xMidYMid slice\" clip-path=\"url(#{clip})\"/>",
                    escape_xml(url),
                    cx - radius,
                    cy - radius,
                ));
            }
            None => {
                out.push_str(&format!(
                    "<circle cx=\"{cx:.2}\" cy=\"{cy:.2}\" r=\"{radius:.2}\" fill=\"{}\"/>",
                    theme.avatar_fill
                ));
                out.push_str(&format!(
                    "<text x=\"{cx:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{:.2}\" font-weight=\"600\" fill=\"{}\">{}</text>",
                    cy + size * 0.14,
                    escape_xml(&theme.font_family),
                    size * 0.4,
                    theme.avatar_text,
                    escape_xml(&node.record.initials())
                ));
            }
        }
        text_left += size + card.padding;
    }

    let (text_x, anchor) = match card.align {
        TextAlign::Left => (text_left, "start"),
        TextAlign::Center => ((text_left + x + w - card.padding) / 2.0, "middle"),
    };
    let mut baseline = y + card.padding + text_cfg.name_size;
    out.push_str(&text_line(
        text_x,
        baseline,
        anchor,
        &node.text.name,
        text_cfg.name_size,
        "600",
        &theme.name_color,
        theme,
    ));
    let header = [
        (node.text.title.as_deref(), theme.title_color.as_str()),
        (node.text.division.as_deref(), theme.division_color.as_str()),
    ];
    for (line, color) in header {
        if let Some(line) = line {
            baseline += text_cfg.title_size * text_cfg.line_height;
            out.push_str(&text_line(
                text_x,
                baseline,
                anchor,
                line,
                text_cfg.title_size,
                "normal",
                color,
                theme,
            ));
        }
    }

    // Values span the full card width, under the avatar.
    let values_x = match card.align {
        TextAlign::Left => x + card.padding,
        TextAlign::Center => x + w / 2.0,
    };
    let header_lines = node.text.title.is_some() as usize + node.text.division.is_some() as usize;
    baseline = y + values_origin(header_lines, config);
    for value in &node.text.values {
        baseline += text_cfg.detail_size * text_cfg.line_height;
        out.push_str(&text_line(
            values_x,
            baseline,
            anchor,
            value,
            text_cfg.detail_size,
            "normal",
            &theme.detail_color,
            theme,
        ));
    }

    if node.has_children {
        out.push_str(&toggle_svg(node, orientation, theme));
    }
    out.push_str("</g>");
    out
}

#[allow(clippy::too_many_arguments)]
fn text_line(
    x: f32,
    y: f32,
    anchor: &str,
    text: &str,
    size: f32,
    weight: &str,
    color: &str,
    theme: &Theme,
) -> String {
    format!(
        "<text x=\"{x:.2}\" y=\"{y:.2}\" text-anchor=\"{anchor}\" font-family=\"{}\" font-size=\"{size}\" font-weight=\"{weight}\" fill=\"{color}\">{}</text>",
        escape_xml(&theme.font_family),
        escape_xml(text)
    )
}

fn toggle_svg(node: &PositionedNode, orientation: Orientation, theme: &Theme) -> String {
    let (x, y) = node.absolute_top_left;
    let (w, h) = node.size;
    let (cx, cy) = match orientation {
        Orientation::Vertical => (x + w / 2.0, y + h),
        Orientation::Horizontal => (x + w, y + h / 2.0),
    };
    let label = if node.is_collapsed {
        node.direct_child_count.to_string()
    } else {
        "\u{2212}".to_string()
    };
    format!(
        "<g class=\"toggle\" data-id=\"{}\"><circle cx=\"{cx:.2}\" cy=\"{cy:.2}\" r=\"{TOGGLE_RADIUS}\" fill=\"{}\"/><text x=\"{cx:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"11\" font-weight=\"600\" fill=\"{}\">{label}</text></g>",
        escape_xml(&node.id),
        theme.toggle_fill,
        cy + 4.0,
        escape_xml(&theme.font_family),
        theme.toggle_text,
    )
}

fn tooltip(node: &PositionedNode) -> String {
    let record = &node.record;
    let mut lines = vec![record.display_name.clone()];
    lines.extend(record.title.iter().cloned());
    lines.extend(
        record
            .tooltips
            .iter()
            .map(|entry| format!("{}: {}", entry.label, entry.value)),
    );
    lines.join("\n")
}

fn render_placeholder(message: &str, width: f32, height: f32, theme: &Theme) -> String {
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\"><rect width=\"100%\" height=\"100%\" fill=\"{}\"/><text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"14\" fill=\"{}\">{}</text></svg>",
        theme.background,
        width / 2.0,
        height / 2.0,
        escape_xml(&theme.font_family),
        theme.placeholder_text,
        escape_xml(message)
    )
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(
    svg: &str,
    output: &Path,
    render_cfg: &crate::config::RenderConfig,
    theme: &Theme,
) -> Result<()> {
    let mut opt = usvg::Options::default();
    if let Some(family) = theme.font_family.split(',').next() {
        opt.font_family = family.trim().trim_matches('"').to_string();
    }
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .ok_or_else(|| anyhow::anyhow!("invalid output size {}x{}", render_cfg.width, render_cfg.height))?;
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{ChartEvent, ChartUpdate};
    use crate::ir::{CellValue, Column, ColumnRole, DataTable};

    fn table() -> DataTable {
        let mut table = DataTable::new(vec![
            Column::new("Id", &[ColumnRole::EmployeeId]),
            Column::new("Reports to", &[ColumnRole::ManagerId]),
            Column::new("Name", &[ColumnRole::DisplayName]),
        ]);
        for (id, manager, name) in [("1", "", "Ada <CEO>"), ("2", "1", "Grace"), ("3", "1", "Linus")] {
            table.push_row(vec![id.into(), manager.into(), name.into()]);
        }
        table
    }

    fn chart(config: &ChartConfig) -> OrgChart {
        let mut chart = OrgChart::new(config.clone(), 900.0, 600.0);
        chart.update(ChartUpdate {
            table: &table(),
            config,
            viewport: (900.0, 600.0),
            highlighted: &[],
        });
        chart.settle();
        chart
    }

    #[test]
    fn render_svg_basic() {
        let chart = chart(&ChartConfig::default());
        let svg = render_svg(&chart, &Theme::classic());
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Ada &lt;CEO&gt;"));
        assert!(svg.contains("class=\"viewport\" transform=\"translate("));
        assert_eq!(svg.matches("class=\"card\"").count(), 3);
        assert_eq!(svg.matches("<path").count(), 2);
        assert!(!svg.contains("opacity=\"0\""));
    }

    #[test]
    fn highlighted_card_uses_highlight_stroke() {
        let mut chart = chart(&ChartConfig::default());
        chart.handle(ChartEvent::NodeClicked {
            id: "2".into(),
            multi_select: false,
        });
        let theme = Theme::classic();
        let svg = render_svg(&chart, &theme);
        assert!(svg.contains(&format!("stroke=\"{}\"", theme.highlight_color)));
    }

    #[test]
    fn disabled_zoom_sizes_content_through_view_box() {
        let mut config = ChartConfig::default();
        config.zoom.enabled = false;
        let chart = chart(&config);
        let svg = render_svg(&chart, &Theme::classic());
        let layout = chart.layout().unwrap();
        assert!(svg.contains(&format!(
            "viewBox=\"0 0 {:.2} {:.2}\"",
            layout.width(),
            layout.height()
        )));
        assert!(!svg.contains("transform=\"translate("));
    }

    #[test]
    fn no_chart_renders_placeholder() {
        let config = ChartConfig::default();
        let mut table = table();
        table.columns[0].roles.clear();
        let mut chart = OrgChart::new(config.clone(), 900.0, 600.0);
        chart.update(ChartUpdate {
            table: &table,
            config: &config,
            viewport: (900.0, 600.0),
            highlighted: &[],
        });
        let svg = render_svg(&chart, &Theme::classic());
        assert!(svg.contains("Add a field to Employee ID"));
        assert!(!svg.contains("class=\"card\""));
    }

    #[test]
    fn collapsed_toggle_shows_child_count() {
        let mut chart = chart(&ChartConfig::default());
        chart.handle(ChartEvent::ToggleClicked { id: "1".into() });
        let svg = render_svg(&chart, &Theme::classic());
        assert!(svg.contains("class=\"toggle\" data-id=\"1\""));
        assert!(svg.contains(">2</text></g>"));
    }

    #[test]
    fn avatar_clips_are_unique_per_card() {
        let config = ChartConfig::default();
        let mut table = DataTable::new(vec![
            Column::new("Id", &[ColumnRole::EmployeeId]),
            Column::new("Reports to", &[ColumnRole::ManagerId]),
            Column::new("Photo", &[ColumnRole::ImageUrl]),
        ]);
        for (id, manager) in [("a.b", ""), ("a_b", "a.b")] {
            table.push_row(vec![id.into(), manager.into(), "https://example.com/p.png".into()]);
        }
        let mut chart = OrgChart::new(config.clone(), 900.0, 600.0);
        chart.update(ChartUpdate {
            table: &table,
            config: &config,
            viewport: (900.0, 600.0),
            highlighted: &[],
        });
        let svg = render_svg(&chart, &Theme::classic());
        assert!(svg.contains("<clipPath id=\"avatar-0\">"));
        assert!(svg.contains("<clipPath id=\"avatar-1\">"));
        assert_eq!(svg.matches("url(#avatar-0)").count(), 1);
    }

    #[test]
    fn values_never_run_past_the_card_bottom() {
        let config = ChartConfig::default();
        let mut table = DataTable::new(vec![
            Column::new("Id", &[ColumnRole::EmployeeId]),
            Column::new("Reports to", &[ColumnRole::ManagerId]),
        ]);
        let mut row: Vec<CellValue> = vec!["1".into(), "".into()];
        for i in 0..6 {
            table.columns.push(Column::new(&format!("m{i}"), &[ColumnRole::Metric]));
            row.push(CellValue::Number(i as f64));
        }
        table.push_row(row);
        let mut chart = OrgChart::new(config.clone(), 900.0, 600.0);
        chart.update(ChartUpdate {
            table: &table,
            config: &config,
            viewport: (900.0, 600.0),
            highlighted: &[],
        });
        let node = &chart.layout().unwrap().nodes[0];
        let bottom = node.absolute_top_left.1 + node.size.1;
        let svg = render_svg(&chart, &Theme::classic());
        let lowest = svg
            .split("<text ")
            .skip(1)
            .filter_map(|tag| tag.split("y=\"").nth(1))
            .filter_map(|rest| rest.split('"').next())
            .filter_map(|y| y.parse::<f32>().ok())
            .fold(f32::MIN, f32::max);
        assert!(lowest <= bottom, "baseline {lowest} below card bottom {bottom}");
    }
}
