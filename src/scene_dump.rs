use crate::chart::OrgChart;
use crate::ir::Orientation;
use crate::viewport::Transform;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDump {
    pub orientation: Orientation,
    pub width: f32,
    pub height: f32,
    pub transform: Transform,
    pub no_chart: Option<String>,
    pub collapsed: Vec<String>,
    pub selected: Vec<String>,
    pub nodes: Vec<NodeDump>,
    pub links: Vec<LinkDump>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDump {
    pub id: String,
    pub parent_id: Option<String>,
    pub depth: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub has_children: bool,
    pub collapsed: bool,
    pub direct_child_count: usize,
    pub highlighted: bool,
    pub lines: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkDump {
    pub from: String,
    pub to: String,
    pub path: String,
}

impl SceneDump {
    pub fn from_chart(chart: &OrgChart) -> Self {
        let orientation = chart.config().layout.orientation;
        let mut collapsed: Vec<String> = chart
            .collapse_state()
            .collapsed_ids()
            .iter()
            .cloned()
            .collect();
        collapsed.sort();
        let selected = chart
            .selected()
            .iter()
            .map(|key| key.as_str().to_string())
            .collect();

        let Some(layout) = chart.layout() else {
            return SceneDump {
                orientation,
                width: 0.0,
                height: 0.0,
                transform: chart.transform(),
                no_chart: chart.no_chart_reason().map(str::to_string),
                collapsed,
                selected,
                nodes: Vec::new(),
                links: Vec::new(),
            };
        };

        let tree = chart.tree();
        let nodes = layout
            .nodes
            .iter()
            .map(|node| {
                let parent_id = tree
                    .and_then(|tree| tree.path_to_root(&node.id).into_iter().next());
                let mut lines = vec![node.text.name.clone()];
                lines.extend(node.text.title.iter().cloned());
                lines.extend(node.text.division.iter().cloned());
                lines.extend(node.text.values.iter().cloned());
                NodeDump {
                    id: node.id.clone(),
                    parent_id,
                    depth: node.depth,
                    x: node.absolute_top_left.0,
                    y: node.absolute_top_left.1,
                    width: node.size.0,
                    height: node.size.1,
                    has_children: node.has_children,
                    collapsed: node.is_collapsed,
                    direct_child_count: node.direct_child_count,
                    highlighted: node.record.highlighted,
                    lines,
                }
            })
            .collect();

        let links = layout
            .links
            .iter()
            .map(|link| LinkDump {
                from: link.source_id.clone(),
                to: link.target_id.clone(),
                path: link.path(),
            })
            .collect();

        SceneDump {
            orientation: layout.orientation,
            width: layout.width(),
            height: layout.height(),
            transform: chart.transform(),
            no_chart: None,
            collapsed,
            selected,
            nodes,
            links,
        }
    }
}

pub fn write_scene_dump(path: Option<&Path>, chart: &OrgChart) -> anyhow::Result<()> {
    let dump = SceneDump::from_chart(chart);
    match path {
        Some(path) => {
            let file = File::create(path)?;
            let writer = BufWriter::new(file);
            serde_json::to_writer_pretty(writer, &dump)?;
        }
        None => println!("{}", serde_json::to_string_pretty(&dump)?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ChartUpdate;
    use crate::config::ChartConfig;
    use crate::ir::{Column, ColumnRole, DataTable};

    #[test]
    fn dump_lists_visible_nodes_with_parents() {
        let mut table = DataTable::new(vec![
            Column::new("id", &[ColumnRole::EmployeeId]),
            Column::new("boss", &[ColumnRole::ManagerId]),
        ]);
        table.push_row(vec!["a".into(), "".into()]);
        table.push_row(vec!["b".into(), "a".into()]);
        let config = ChartConfig::default();
        let mut chart = OrgChart::new(config.clone(), 800.0, 600.0);
        chart.update(ChartUpdate {
            table: &table,
            config: &config,
            viewport: (800.0, 600.0),
            highlighted: &[],
        });
        let dump = SceneDump::from_chart(&chart);
        assert_eq!(dump.nodes.len(), 2);
        let b = dump.nodes.iter().find(|n| n.id == "b").unwrap();
        assert_eq!(b.parent_id.as_deref(), Some("a"));
        let a = dump.nodes.iter().find(|n| n.id == "a").unwrap();
        assert_eq!(a.parent_id, None);
        assert_eq!(dump.links.len(), 1);

        let json = serde_json::to_value(&dump).unwrap();
        assert_eq!(json["orientation"], "vertical");
        assert!(json["nodes"][0].get("directChildCount").is_some());
    }
}
