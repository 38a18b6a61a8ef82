use std::collections::HashSet;

use tracing::debug;

use crate::tree::{OrgTree, ROOT, ROOT_ID};

/// One node of the visible projection. Collapsed nodes carry no children.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleNode {
    pub id: String,
    pub slot: usize,
    pub depth: usize,
    pub has_children: bool,
    pub is_collapsed: bool,
    pub children: Vec<VisibleNode>,
}

impl VisibleNode {
    pub fn is_root(&self) -> bool {
        self.slot == ROOT
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VisibleTree {
    pub root: VisibleNode,
}

// Unlinks nodes one level at a time so long chains drop without recursing.
impl Drop for VisibleTree {
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.root.children);
        while let Some(mut node) = stack.pop() {
            stack.append(&mut node.children);
        }
    }
}

impl VisibleTree {
    pub fn nodes(&self) -> Vec<&VisibleNode> {
        let mut out = Vec::new();
        let mut stack: Vec<&VisibleNode> = self.root.children.iter().rev().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(node.children.iter().rev());
        }
        out
    }

    pub fn len(&self) -> usize {
        self.nodes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&VisibleNode> {
        self.nodes().into_iter().find(|node| node.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct CollapseState {
    collapsed: HashSet<String>,
    defaults_applied: bool,
    applied_levels: Option<u32>,
}

impl CollapseState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_collapsed(&self, id: &str) -> bool {
        self.collapsed.contains(id)
    }

    pub fn collapsed_ids(&self) -> &HashSet<String> {
        &self.collapsed
    }

    pub fn defaults_applied(&self) -> bool {
        self.defaults_applied
    }

    /// Forget the default-levels guard so the next bind re-applies it.
    pub fn reset_defaults(&mut self) {
        self.defaults_applied = false;
    }

    /// Remove ids that no longer exist; returns how many were dropped.
    pub fn prune(&mut self, tree: &OrgTree) -> usize {
        let before = self.collapsed.len();
        self.collapsed.retain(|id| tree.contains(id));
        let dropped = before - self.collapsed.len();
        if dropped > 0 {
            debug!(dropped, "pruned stale collapsed ids");
            if self.collapsed.is_empty() {
                self.defaults_applied = false;
            }
        }
        dropped
    }

    /// Collapse every node at depth `levels + 1` once per data bind.
    ///
    /// `levels == 0` leaves the tree fully expanded. Returns whether the
    /// default was applied on this call.
    pub fn apply_default_levels(&mut self, tree: &OrgTree, levels: u32) -> bool {
        if self.applied_levels != Some(levels) {
            self.defaults_applied = false;
        }
        if self.defaults_applied {
            return false;
        }
        self.defaults_applied = true;
        self.applied_levels = Some(levels);
        if levels == 0 {
            self.collapsed.clear();
            return true;
        }
        let depth = levels as usize + 1;
        self.collapsed = tree
            .ids_at_depth(depth)
            .into_iter()
            .filter(|id| tree.get(id).is_some_and(|node| !node.children.is_empty()))
            .collect();
        debug!(levels, collapsed = self.collapsed.len(), "applied default expand levels");
        true
    }

    pub fn collapse(&mut self, id: &str) {
        self.collapsed.insert(id.to_string());
    }

    pub fn expand_one_level(&mut self, tree: &OrgTree, id: &str) {
        self.collapsed.remove(id);
        for child in tree.children(id) {
            self.collapsed.insert(child.id.clone());
        }
    }

    /// Flip a node between expanded and collapsed. Leaves are ignored.
    /// Returns the new collapsed state, or `None` when nothing changed.
    pub fn toggle(&mut self, tree: &OrgTree, id: &str) -> Option<bool> {
        let node = tree.get(id)?;
        if node.children.is_empty() {
            return None;
        }
        if self.collapsed.contains(id) {
            self.expand_one_level(tree, id);
            Some(false)
        } else {
            self.collapse(id);
            Some(true)
        }
    }

    pub fn expand_all(&mut self) {
        self.collapsed.clear();
    }

    pub fn collapse_all(&mut self, tree: &OrgTree) {
        self.collapsed = tree
            .data_nodes()
            .filter(|node| !node.children.is_empty())
            .map(|node| node.id.clone())
            .collect();
    }

    pub fn ensure_visible(&mut self, tree: &OrgTree, id: &str) -> bool {
        if !tree.contains(id) {
            return false;
        }
        for ancestor in tree.path_to_root(id) {
            self.collapsed.remove(&ancestor);
        }
        true
    }

    pub fn build_visible_tree(&self, tree: &OrgTree) -> VisibleTree {
        // Pre-order over visible slots; walked backwards, children are
        // always finished before their parent.
        let mut order = Vec::with_capacity(tree.len() + 1);
        let mut stack = vec![ROOT];
        while let Some(slot) = stack.pop() {
            order.push(slot);
            if !self.hides_children(tree, slot) {
                stack.extend(tree.node(slot).children.iter().rev());
            }
        }

        let mut built: Vec<Option<VisibleNode>> = vec![None; tree.len() + 1];
        for &slot in order.iter().rev() {
            let mut node = self.visible_node(tree, slot);
            if !node.is_collapsed {
                node.children = tree
                    .node(slot)
                    .children
                    .iter()
                    .filter_map(|&child| built[child].take())
                    .collect();
            }
            built[slot] = Some(node);
        }
        let root = built[ROOT]
            .take()
            .unwrap_or_else(|| self.visible_node(tree, ROOT));
        VisibleTree { root }
    }

    fn hides_children(&self, tree: &OrgTree, slot: usize) -> bool {
        slot != ROOT && self.collapsed.contains(&tree.node(slot).id)
    }

    fn visible_node(&self, tree: &OrgTree, slot: usize) -> VisibleNode {
        let node = tree.node(slot);
        VisibleNode {
            id: if slot == ROOT {
                ROOT_ID.to_string()
            } else {
                node.id.clone()
            },
            slot,
            depth: node.depth,
            has_children: !node.children.is_empty(),
            is_collapsed: self.hides_children(tree, slot),
            children: Vec::new(),
        }
    }
}
