use crate::visibility::VisibleNode;

const VIRTUAL: usize = 0;

#[derive(Debug)]
struct TidyNode {
    parent: usize,
    children: Vec<usize>,
    /// Position among siblings.
    number: usize,
    prelim: f32,
    modifier: f32,
    change: f32,
    shift: f32,
    thread: Option<usize>,
    ancestor: usize,
    default_ancestor: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub(super) struct Placement {
    pub slot: usize,
    pub depth: usize,
    pub x: f32,
}

struct Tidy {
    nodes: Vec<TidyNode>,
    cousin_separation: f32,
}

/// Walker placement with the Buchheim-Junger-Leipert linear-time fixes.
/// Returns every node of `root` (including `root` itself), in pre-order, with
/// x in units of node pitch.
pub(super) fn tidy_layout(root: &VisibleNode, cousin_separation: f32) -> Vec<Placement> {
    // The virtual node only exists to give the real root a parent.
    let mut nodes = vec![TidyNode::new(VIRTUAL, VIRTUAL, 0)];
    let mut visible: Vec<&VisibleNode> = Vec::new();
    let mut stack: Vec<(&VisibleNode, usize, usize)> = vec![(root, VIRTUAL, 0)];
    while let Some((node, parent, number)) = stack.pop() {
        let idx = nodes.len();
        nodes.push(TidyNode::new(idx, parent, number));
        nodes[parent].children.push(idx);
        visible.push(node);
        for (child_number, child) in node.children.iter().enumerate().rev() {
            stack.push((child, idx, child_number));
        }
    }

    let mut tidy = Tidy {
        nodes,
        cousin_separation,
    };
    for v in tidy.postorder() {
        tidy.first_walk(v);
    }
    let root_idx = 1;
    tidy.nodes[VIRTUAL].modifier = -tidy.nodes[root_idx].prelim;

    let mut xs = vec![0.0f32; tidy.nodes.len()];
    let mut depths = vec![0usize; tidy.nodes.len()];
    // Pre-order: parents always precede their children in arena order.
    for v in 1..tidy.nodes.len() {
        let parent = tidy.nodes[v].parent;
        let parent_modifier = tidy.nodes[parent].modifier;
        xs[v] = tidy.nodes[v].prelim + parent_modifier;
        tidy.nodes[v].modifier += parent_modifier;
        if parent != VIRTUAL {
            depths[v] = depths[parent] + 1;
        }
    }

    visible
        .iter()
        .enumerate()
        .map(|(offset, node)| Placement {
            slot: node.slot,
            depth: depths[offset + 1],
            x: xs[offset + 1],
        })
        .collect()
}

impl TidyNode {
    fn new(idx: usize, parent: usize, number: usize) -> Self {
        Self {
            parent,
            children: Vec::new(),
            number,
            prelim: 0.0,
            modifier: 0.0,
            change: 0.0,
            shift: 0.0,
            thread: None,
            ancestor: idx,
            default_ancestor: None,
        }
    }
}

impl Tidy {
    fn postorder(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![(1usize, false)];
        while let Some((v, expanded)) = stack.pop() {
            if expanded {
                order.push(v);
                continue;
            }
            stack.push((v, true));
            for &child in self.nodes[v].children.iter().rev() {
                stack.push((child, false));
            }
        }
        order
    }

    fn separation(&self, a: usize, b: usize) -> f32 {
        if self.nodes[a].parent == self.nodes[b].parent {
            1.0
        } else {
            self.cousin_separation
        }
    }

    fn next_left(&self, v: usize) -> Option<usize> {
        self.nodes[v].children.first().copied().or(self.nodes[v].thread)
    }

    fn next_right(&self, v: usize) -> Option<usize> {
        self.nodes[v].children.last().copied().or(self.nodes[v].thread)
    }

    fn first_walk(&mut self, v: usize) {
        let parent = self.nodes[v].parent;
        let number = self.nodes[v].number;
        let left_sibling = (number > 0).then(|| self.nodes[parent].children[number - 1]);

        if let (Some(&first), Some(&last)) =
            (self.nodes[v].children.first(), self.nodes[v].children.last())
        {
            self.execute_shifts(v);
            let midpoint = (self.nodes[first].prelim + self.nodes[last].prelim) / 2.0;
            match left_sibling {
                Some(w) => {
                    self.nodes[v].prelim = self.nodes[w].prelim + self.separation(v, w);
                    self.nodes[v].modifier = self.nodes[v].prelim - midpoint;
                }
                None => self.nodes[v].prelim = midpoint,
            }
        } else if let Some(w) = left_sibling {
            self.nodes[v].prelim = self.nodes[w].prelim + self.separation(v, w);
        }

        let default = self.nodes[parent]
            .default_ancestor
            .unwrap_or(self.nodes[parent].children[0]);
        let next = self.apportion(v, left_sibling, default);
        self.nodes[parent].default_ancestor = Some(next);
    }

    fn apportion(&mut self, v: usize, left_sibling: Option<usize>, ancestor: usize) -> usize {
        let Some(w) = left_sibling else {
            return ancestor;
        };
        let mut ancestor = ancestor;
        let parent = self.nodes[v].parent;

        let mut inner_right = v;
        let mut outer_right = v;
        let mut inner_left = w;
        let mut outer_left = self.nodes[parent].children[0];
        let mut sum_inner_right = self.nodes[inner_right].modifier;
        let mut sum_outer_right = self.nodes[outer_right].modifier;
        let mut sum_inner_left = self.nodes[inner_left].modifier;
        let mut sum_outer_left = self.nodes[outer_left].modifier;

        let mut next_inner_left = self.next_right(inner_left);
        let mut next_inner_right = self.next_left(inner_right);
        while let (Some(il), Some(ir)) = (next_inner_left, next_inner_right) {
            inner_left = il;
            inner_right = ir;
            outer_left = self.next_left(outer_left).unwrap_or(outer_left);
            outer_right = self.next_right(outer_right).unwrap_or(outer_right);
            self.nodes[outer_right].ancestor = v;

            let shift = self.nodes[inner_left].prelim + sum_inner_left
                - self.nodes[inner_right].prelim
                - sum_inner_right
                + self.separation(inner_left, inner_right);
            if shift > 0.0 {
                let from = self.next_ancestor(inner_left, v, ancestor);
                self.move_subtree(from, v, shift);
                sum_inner_right += shift;
                sum_outer_right += shift;
            }
            sum_inner_left += self.nodes[inner_left].modifier;
            sum_inner_right += self.nodes[inner_right].modifier;
            sum_outer_left += self.nodes[outer_left].modifier;
            sum_outer_right += self.nodes[outer_right].modifier;

            next_inner_left = self.next_right(inner_left);
            next_inner_right = self.next_left(inner_right);
        }

        if let Some(il) = next_inner_left
            && self.next_right(outer_right).is_none()
        {
            self.nodes[outer_right].thread = Some(il);
            self.nodes[outer_right].modifier += sum_inner_left - sum_outer_right;
        }
        if let Some(ir) = next_inner_right
            && self.next_left(outer_left).is_none()
        {
            self.nodes[outer_left].thread = Some(ir);
            self.nodes[outer_left].modifier += sum_inner_right - sum_outer_left;
            ancestor = v;
        }
        ancestor
    }

    fn next_ancestor(&self, inner_left: usize, v: usize, ancestor: usize) -> usize {
        let candidate = self.nodes[inner_left].ancestor;
        if self.nodes[candidate].parent == self.nodes[v].parent {
            candidate
        } else {
            ancestor
        }
    }

    fn move_subtree(&mut self, from: usize, to: usize, shift: f32) {
        let span = self.nodes[to].number.saturating_sub(self.nodes[from].number).max(1);
        let change = shift / span as f32;
        self.nodes[to].change -= change;
        self.nodes[to].shift += shift;
        self.nodes[from].change += change;
        self.nodes[to].prelim += shift;
        self.nodes[to].modifier += shift;
    }

    fn execute_shifts(&mut self, v: usize) {
        let mut shift = 0.0;
        let mut change = 0.0;
        let children = self.nodes[v].children.clone();
        for &child in children.iter().rev() {
            let node = &mut self.nodes[child];
            node.prelim += shift;
            node.modifier += shift;
            change += node.change;
            shift += node.shift + change;
        }
    }
}
