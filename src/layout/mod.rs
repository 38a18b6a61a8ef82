pub mod text;
mod tidy;
pub(crate) mod types;
pub use types::*;

use tidy::tidy_layout;

use crate::config::ChartConfig;
use crate::ir::Orientation;
use crate::tree::{OrgTree, ROOT};
use crate::visibility::{VisibleNode, VisibleTree};
use std::collections::HashMap;

/// Position the visible tree.
///
/// The synthetic root takes part in placement so that top-level nodes are
/// spaced like siblings, but it is not emitted and has no links.
pub fn compute_layout(tree: &OrgTree, visible: &VisibleTree, config: &ChartConfig) -> ChartLayout {
    let layout_cfg = &config.layout;
    let orientation = layout_cfg.orientation;
    if visible.is_empty() {
        return ChartLayout::empty(orientation, layout_cfg.padding);
    }

    let size = (layout_cfg.node_width, layout_cfg.node_height);
    let pitch = (
        layout_cfg.node_width + layout_cfg.horizontal_spacing,
        layout_cfg.node_height + layout_cfg.vertical_spacing,
    );
    let placements = tidy_layout(&visible.root, layout_cfg.cousin_separation);

    let flags: HashMap<usize, (bool, bool)> = visible
        .nodes()
        .into_iter()
        .map(|node| (node.slot, (node.has_children, node.is_collapsed)))
        .collect();

    let mut nodes = Vec::with_capacity(placements.len());
    for placement in placements {
        if placement.slot == ROOT {
            continue;
        }
        let tree_node = tree.node(placement.slot);
        let Some(record) = tree_node.record.clone() else {
            continue;
        };
        let top_left = match orientation {
            Orientation::Vertical => (
                placement.x * pitch.0 - size.0 / 2.0,
                placement.depth as f32 * pitch.1,
            ),
            Orientation::Horizontal => (
                placement.depth as f32 * pitch.0,
                placement.x * pitch.1 - size.1 / 2.0,
            ),
        };
        let center = (top_left.0 + size.0 / 2.0, top_left.1 + size.1 / 2.0);
        let (has_children, is_collapsed) = flags
            .get(&placement.slot)
            .copied()
            .unwrap_or((false, false));
        let text = text::fit_card_text(&record, config);
        nodes.push(PositionedNode {
            id: tree_node.id.clone(),
            record,
            depth: tree_node.depth,
            has_children,
            is_collapsed,
            direct_child_count: tree_node.direct_child_count,
            top_left,
            center,
            size,
            absolute_top_left: top_left,
            absolute_center: center,
            text,
        });
    }

    let bounds = content_bounds(&nodes, layout_cfg.padding);
    for node in &mut nodes {
        node.absolute_top_left = bounds.to_absolute(node.top_left);
        node.absolute_center = bounds.to_absolute(node.center);
    }

    let index: HashMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(idx, node)| (node.id.as_str(), idx))
        .collect();
    let links = collect_links(&visible.root, &nodes, &index, orientation);

    ChartLayout::new(orientation, nodes, links, bounds)
}

fn content_bounds(nodes: &[PositionedNode], padding: f32) -> ContentBounds {
    let mut min_x = f32::MAX;
    let mut min_y = f32::MAX;
    let mut max_x = f32::MIN;
    let mut max_y = f32::MIN;
    for node in nodes {
        min_x = min_x.min(node.top_left.0);
        min_y = min_y.min(node.top_left.1);
        max_x = max_x.max(node.top_left.0 + node.size.0);
        max_y = max_y.max(node.top_left.1 + node.size.1);
    }
    if min_x == f32::MAX {
        return ContentBounds::empty(padding);
    }
    ContentBounds {
        min_x,
        min_y,
        max_x,
        max_y,
        padding,
        translate: (padding - min_x, padding - min_y),
    }
}

/// Parent-to-child links in pre-order of the child.
fn collect_links(
    root: &VisibleNode,
    nodes: &[PositionedNode],
    index: &HashMap<&str, usize>,
    orientation: Orientation,
) -> Vec<LinkLayout> {
    let mut links = Vec::new();
    let mut stack: Vec<(&VisibleNode, Option<&PositionedNode>)> = vec![(root, None)];
    while let Some((node, parent)) = stack.pop() {
        let positioned = (!node.is_root())
            .then(|| index.get(node.id.as_str()))
            .flatten()
            .map(|&idx| &nodes[idx]);
        if let Some(parent) = parent
            && let Some(child) = positioned
        {
            links.push(connector(parent, child, orientation));
        }
        for child in node.children.iter().rev() {
            stack.push((child, positioned));
        }
    }
    links
}

/// Cubic S-curve from the parent's exit edge to the child's entry edge.
pub fn connector(
    parent: &PositionedNode,
    child: &PositionedNode,
    orientation: Orientation,
) -> LinkLayout {
    let (px, py) = parent.absolute_top_left;
    let (cx, cy) = child.absolute_top_left;
    match orientation {
        Orientation::Vertical => {
            let source = (parent.absolute_center.0, py + parent.size.1);
            let target = (child.absolute_center.0, cy);
            let mid_y = (source.1 + target.1) / 2.0;
            LinkLayout {
                source_id: parent.id.clone(),
                target_id: child.id.clone(),
                source,
                target,
                control_1: (source.0, mid_y),
                control_2: (target.0, mid_y),
            }
        }
        Orientation::Horizontal => {
            let source = (px + parent.size.0, parent.absolute_center.1);
            let target = (cx, child.absolute_center.1);
            let mid_x = (source.0 + target.0) / 2.0;
            LinkLayout {
                source_id: parent.id.clone(),
                target_id: child.id.clone(),
                source,
                target,
                control_1: (mid_x, source.1),
                control_2: (mid_x, target.1),
            }
        }
    }
}
