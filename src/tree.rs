use std::collections::{HashMap, HashSet, VecDeque};

use tracing::{debug, info};

use crate::ir::EmployeeRecord;

pub const ROOT_ID: &str = "__root__";
pub const ROOT: usize = 0;

#[derive(Debug, Clone)]
pub struct TreeNode {
    pub id: String,
    pub record: Option<EmployeeRecord>,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub direct_child_count: usize,
    pub descendant_count: usize,
    pub depth: usize,
}

impl TreeNode {
    fn new(id: String, record: Option<EmployeeRecord>) -> Self {
        Self {
            id,
            record,
            parent: None,
            children: Vec::new(),
            direct_child_count: 0,
            descendant_count: 0,
            depth: 0,
        }
    }

    pub fn is_root(&self) -> bool {
        self.record.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct OrgTree {
    nodes: Vec<TreeNode>,
    index: HashMap<String, usize>,
    broken_cycles: usize,
}

impl OrgTree {
    /// Build the hierarchy from normalized records.
    pub fn build(records: Vec<EmployeeRecord>) -> Self {
        let mut nodes = Vec::with_capacity(records.len() + 1);
        nodes.push(TreeNode::new(ROOT_ID.to_string(), None));
        let mut index = HashMap::with_capacity(records.len());

        for record in records {
            let slot = nodes.len();
            if let Some(previous) = index.insert(record.id.clone(), slot) {
                // Callers normally dedupe; keep last-row-wins here too.
                debug!(id = %record.id, "replacing duplicate node");
                nodes[previous].record = Some(record);
                index.insert(nodes[previous].id.clone(), previous);
                continue;
            }
            nodes.push(TreeNode::new(record.id.clone(), Some(record)));
        }

        let mut parents: Vec<Option<usize>> = vec![None; nodes.len()];
        for (slot, node) in nodes.iter().enumerate().skip(1) {
            let Some(record) = node.record.as_ref() else {
                continue;
            };
            parents[slot] = match record.parent_id.as_deref() {
                Some(parent_id) if parent_id != record.id => index.get(parent_id).copied(),
                _ => None,
            };
        }

        let broken_cycles = break_cycles(&nodes, &mut parents);

        for slot in 1..nodes.len() {
            let parent = parents[slot].unwrap_or(ROOT);
            nodes[slot].parent = Some(parent);
            nodes[parent].children.push(slot);
        }

        let mut tree = Self {
            nodes,
            index,
            broken_cycles,
        };
        tree.recompute_metadata();
        info!(
            nodes = tree.len(),
            roots = tree.nodes[ROOT].children.len(),
            broken_cycles,
            "built organization tree"
        );
        tree
    }

    fn recompute_metadata(&mut self) {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut queue = VecDeque::from([ROOT]);
        self.nodes[ROOT].depth = 0;
        while let Some(slot) = queue.pop_front() {
            order.push(slot);
            let depth = self.nodes[slot].depth;
            let children = self.nodes[slot].children.clone();
            for child in children {
                self.nodes[child].depth = depth + 1;
                queue.push_back(child);
            }
        }
        for &slot in order.iter().rev() {
            let node = &self.nodes[slot];
            let descendants: usize = node
                .children
                .iter()
                .map(|&child| self.nodes[child].descendant_count + 1)
                .sum();
            let count = node.children.len();
            let node = &mut self.nodes[slot];
            node.direct_child_count = count;
            node.descendant_count = descendants;
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn broken_cycles(&self) -> usize {
        self.broken_cycles
    }

    pub fn root(&self) -> &TreeNode {
        &self.nodes[ROOT]
    }

    pub fn node(&self, slot: usize) -> &TreeNode {
        &self.nodes[slot]
    }

    pub fn slot_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn get(&self, id: &str) -> Option<&TreeNode> {
        self.slot_of(id).map(|slot| &self.nodes[slot])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Depth below the synthetic root (top-level records are at 1).
    pub fn depth(&self, id: &str) -> Option<usize> {
        self.get(id).map(|node| node.depth)
    }

    pub fn record(&self, id: &str) -> Option<&EmployeeRecord> {
        self.get(id).and_then(|node| node.record.as_ref())
    }

    pub fn record_mut(&mut self, id: &str) -> Option<&mut EmployeeRecord> {
        let slot = self.slot_of(id)?;
        self.nodes[slot].record.as_mut()
    }

    pub fn children<'a>(&'a self, id: &str) -> impl Iterator<Item = &'a TreeNode> + use<'a> {
        self.get(id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
            .iter()
            .map(|&child| &self.nodes[child])
    }

    /// Ancestor ids of `id`, nearest first, excluding the synthetic root.
    pub fn path_to_root(&self, id: &str) -> Vec<String> {
        let mut path = Vec::new();
        let Some(mut slot) = self.slot_of(id) else {
            return path;
        };
        let mut visited = HashSet::from([slot]);
        while let Some(parent) = self.nodes[slot].parent {
            if parent == ROOT || !visited.insert(parent) {
                break;
            }
            path.push(self.nodes[parent].id.clone());
            slot = parent;
        }
        path
    }

    pub fn ids_at_depth(&self, depth: usize) -> Vec<String> {
        self.data_nodes()
            .filter(|node| node.depth == depth)
            .map(|node| node.id.clone())
            .collect()
    }

    /// Data nodes in pre-order (row order among siblings).
    pub fn preorder(&self) -> Vec<&TreeNode> {
        let mut out = Vec::with_capacity(self.len());
        let mut stack: Vec<usize> = self.nodes[ROOT].children.iter().rev().copied().collect();
        while let Some(slot) = stack.pop() {
            let node = &self.nodes[slot];
            out.push(node);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    pub fn data_nodes(&self) -> impl Iterator<Item = &TreeNode> {
        self.nodes.iter().skip(1)
    }

    pub fn records_mut(&mut self) -> impl Iterator<Item = &mut EmployeeRecord> {
        self.nodes
            .iter_mut()
            .skip(1)
            .filter_map(|node| node.record.as_mut())
    }
}

/// Detach one member of every parent cycle; returns how many were broken.
fn break_cycles(nodes: &[TreeNode], parents: &mut [Option<usize>]) -> usize {
    // 0 = unvisited, 1 = on the current walk, 2 = known to reach the root
    let mut state = vec![0u8; parents.len()];
    let mut broken = 0;
    for start in 1..parents.len() {
        if state[start] == 2 {
            continue;
        }
        let mut path: Vec<usize> = Vec::new();
        let mut cursor = Some(start);
        while let Some(slot) = cursor {
            match state[slot] {
                2 => break,
                1 => {
                    let entry = path.iter().position(|&p| p == slot).unwrap_or(0);
                    let breaker = path[entry..]
                        .iter()
                        .copied()
                        .min_by_key(|&member| {
                            nodes[member]
                                .record
                                .as_ref()
                                .map(|r| r.row_index)
                                .unwrap_or(member)
                        })
                        .unwrap_or(slot);
                    debug!(id = %nodes[breaker].id, "breaking manager cycle");
                    parents[breaker] = None;
                    broken += 1;
                    break;
                }
                _ => {
                    state[slot] = 1;
                    path.push(slot);
                    cursor = parents[slot];
                }
            }
        }
        for slot in path {
            state[slot] = 2;
        }
    }
    broken
}
