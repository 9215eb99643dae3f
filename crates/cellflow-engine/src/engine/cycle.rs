//! Circular dependency detection for formula cells.
//!
//! Propagation orders cells topologically; whatever cannot be ordered is
//! either on a cycle or downstream of one. This module separates the two by
//! computing strongly connected components of that leftover subgraph
//! (Kosaraju, with explicit stacks so long chains cannot overflow).

use std::collections::{BTreeSet, HashMap, HashSet};

use super::CellRef;

/// Return every node of `nodes` that lies on a cycle.
///
/// Edges come from `successors` and are restricted to `nodes`. A node is on a
/// cycle when its component has more than one member or it references itself.
pub fn cycle_members<F, I>(nodes: &[CellRef], successors: F) -> BTreeSet<CellRef>
where
    F: Fn(&CellRef) -> I,
    I: IntoIterator<Item = CellRef>,
{
    let members: HashSet<CellRef> = nodes.iter().copied().collect();
    let mut forward: HashMap<CellRef, Vec<CellRef>> = HashMap::new();
    let mut backward: HashMap<CellRef, Vec<CellRef>> = HashMap::new();
    for node in nodes {
        for next in successors(node) {
            if members.contains(&next) {
                forward.entry(*node).or_default().push(next);
                backward.entry(next).or_default().push(*node);
            }
        }
    }

    let finish_order = finish_order(nodes, &forward);

    let mut assigned = HashSet::new();
    let mut cyclic = BTreeSet::new();
    for &root in finish_order.iter().rev() {
        if !assigned.insert(root) {
            continue;
        }

        let mut component = vec![root];
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            for &prev in edges(&backward, &node) {
                if assigned.insert(prev) {
                    component.push(prev);
                    stack.push(prev);
                }
            }
        }

        let self_loop = edges(&forward, &root).contains(&root);
        if component.len() > 1 || self_loop {
            cyclic.extend(component);
        }
    }

    cyclic
}

fn edges<'a>(graph: &'a HashMap<CellRef, Vec<CellRef>>, node: &CellRef) -> &'a [CellRef] {
    graph.get(node).map(Vec::as_slice).unwrap_or(&[])
}

/// Nodes in order of DFS completion over the forward graph.
fn finish_order(nodes: &[CellRef], forward: &HashMap<CellRef, Vec<CellRef>>) -> Vec<CellRef> {
    let mut visited = HashSet::new();
    let mut order = Vec::with_capacity(nodes.len());

    for &root in nodes {
        if !visited.insert(root) {
            continue;
        }
        let mut stack: Vec<(CellRef, usize)> = vec![(root, 0)];
        while let Some(top) = stack.last_mut() {
            let node = top.0;
            if let Some(&next) = edges(forward, &node).get(top.1) {
                top.1 += 1;
                if visited.insert(next) {
                    stack.push((next, 0));
                }
            } else {
                order.push(node);
                stack.pop();
            }
        }
    }

    order
}
