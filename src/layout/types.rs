use std::collections::HashMap;

use crate::ir::{EmployeeRecord, Orientation};

/// Card text after fitting to the card's inner width.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardText {
    pub name: String,
    pub title: Option<String>,
    pub division: Option<String>,
    pub values: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct PositionedNode {
    pub id: String,
    pub record: EmployeeRecord,
    pub depth: usize,
    pub has_children: bool,
    pub is_collapsed: bool,
    pub direct_child_count: usize,
    /// Layout-local coordinates, before the content translation.
    pub top_left: (f32, f32),
    pub center: (f32, f32),
    pub size: (f32, f32),
    pub absolute_top_left: (f32, f32),
    pub absolute_center: (f32, f32),
    pub text: CardText,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkLayout {
    pub source_id: String,
    pub target_id: String,
    pub source: (f32, f32),
    pub target: (f32, f32),
    pub control_1: (f32, f32),
    pub control_2: (f32, f32),
}

impl LinkLayout {
    pub fn path(&self) -> String {
        format!(
            "M{:.2},{:.2} C{:.2},{:.2} {:.2},{:.2} {:.2},{:.2}",
            self.source.0,
            self.source.1,
            self.control_1.0,
            self.control_1.1,
            self.control_2.0,
            self.control_2.1,
            self.target.0,
            self.target.1
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContentBounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
    pub padding: f32,
    /// Offset taking layout-local coordinates to absolute ones.
    pub translate: (f32, f32),
}

impl ContentBounds {
    pub fn empty(padding: f32) -> Self {
        Self {
            min_x: 0.0,
            min_y: 0.0,
            max_x: 0.0,
            max_y: 0.0,
            padding,
            translate: (padding, padding),
        }
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x + self.padding * 2.0
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y + self.padding * 2.0
    }

    pub fn to_absolute(&self, point: (f32, f32)) -> (f32, f32) {
        (point.0 + self.translate.0, point.1 + self.translate.1)
    }
}

#[derive(Debug, Clone)]
pub struct ChartLayout {
    pub orientation: Orientation,
    pub nodes: Vec<PositionedNode>,
    pub links: Vec<LinkLayout>,
    pub bounds: ContentBounds,
    index: HashMap<String, usize>,
}

impl ChartLayout {
    pub(super) fn new(
        orientation: Orientation,
        nodes: Vec<PositionedNode>,
        links: Vec<LinkLayout>,
        bounds: ContentBounds,
    ) -> Self {
        let index = nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (node.id.clone(), idx))
            .collect();
        Self {
            orientation,
            nodes,
            links,
            bounds,
            index,
        }
    }

    pub fn empty(orientation: Orientation, padding: f32) -> Self {
        Self::new(orientation, Vec::new(), Vec::new(), ContentBounds::empty(padding))
    }

    pub fn node(&self, id: &str) -> Option<&PositionedNode> {
        self.index.get(id).map(|&idx| &self.nodes[idx])
    }

    pub fn width(&self) -> f32 {
        self.bounds.width()
    }

    pub fn height(&self) -> f32 {
        self.bounds.height()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
