//! Circular import detection.
//!
//! Depth-first search from every unvisited node, tracking which nodes are on
//! the current path. Reaching a neighbor that is on the path closes a cycle:
//! the path from that neighbor's first occurrence to the current node is
//! reported, followed by the neighbor again (`[A, B, C, A]`).
//!
//! The search keeps an explicit frame stack instead of recursing, so deep
//! import chains cannot overflow the thread stack. Fully explored nodes are
//! never entered again. The same cycle may be reported more than once when
//! several back edges close it (duplicate import edges, for example); results
//! are not deduplicated.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::graph::{EdgeType, KnowledgeGraph};

/// One circular dependency chain, closed: the first id is repeated at the end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cycle {
    /// Node ids along the cycle, first id repeated last.
    pub nodes: Vec<String>,
}

impl Cycle {
    /// Number of distinct hops in the cycle.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    /// Whether the cycle is empty (never true for detected cycles).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `other` is the same cyclic sequence, possibly rotated.
    ///
    /// `other` may be given open (`[B, C, A]`) or closed (`[B, C, A, B]`).
    #[must_use]
    pub fn matches<S: AsRef<str>>(&self, other: &[S]) -> bool {
        let mine = &self.nodes[..self.len()];
        let theirs: Vec<&str> = other.iter().map(AsRef::as_ref).collect();
        let theirs = match theirs.as_slice() {
            [first, .., last] if first == last => &theirs[..theirs.len() - 1],
            _ => &theirs[..],
        };
        if mine.len() != theirs.len() {
            return false;
        }
        (0..mine.len()).any(|shift| {
            mine.iter()
                .cycle()
                .skip(shift)
                .zip(theirs)
                .all(|(a, b)| a == b)
        })
    }
}

struct Frame<'a> {
    node: &'a str,
    next_neighbor: usize,
}

/// Find import cycles in a list of `(from, to)` dependency pairs.
///
/// Roots are tried in order of first appearance in `dependencies`, and each
/// node's neighbors in the order their edges were given, so output order is
/// deterministic for a given input.
pub fn find_cycles<'a, I>(dependencies: I) -> Vec<Cycle>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut order: Vec<&str> = Vec::new();
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    for (from, to) in dependencies {
        for node in [from, to] {
            if !adjacency.contains_key(node) {
                adjacency.insert(node, Vec::new());
                order.push(node);
            }
        }
        adjacency.entry(from).or_default().push(to);
    }

    let mut cycles = Vec::new();
    let mut visited: HashSet<&str> = HashSet::new();
    let mut on_path: HashSet<&str> = HashSet::new();
    let mut path: Vec<&str> = Vec::new();
    let mut frames: Vec<Frame<'_>> = Vec::new();

    for &root in &order {
        if visited.contains(root) {
            continue;
        }
        visited.insert(root);
        on_path.insert(root);
        path.push(root);
        frames.push(Frame {
            node: root,
            next_neighbor: 0,
        });

        while let Some(frame) = frames.last_mut() {
            let neighbors = adjacency.get(frame.node).map_or(&[][..], Vec::as_slice);

            let Some(&neighbor) = neighbors.get(frame.next_neighbor) else {
                on_path.remove(frame.node);
                path.pop();
                frames.pop();
                continue;
            };
            frame.next_neighbor += 1;

            if on_path.contains(neighbor) {
                if let Some(start) = path.iter().position(|&n| n == neighbor) {
                    let mut nodes: Vec<String> =
                        path[start..].iter().map(|&n| n.to_string()).collect();
                    nodes.push(neighbor.to_string());
                    cycles.push(Cycle { nodes });
                }
            } else if visited.insert(neighbor) {
                on_path.insert(neighbor);
                path.push(neighbor);
                frames.push(Frame {
                    node: neighbor,
                    next_neighbor: 0,
                });
            }
        }
    }

    cycles
}

/// Cycles among the graph's `IMPORTS` edges.
#[must_use]
pub fn import_cycles(graph: &KnowledgeGraph) -> Vec<Cycle> {
    find_cycles(
        graph
            .edges()
            .iter()
            .filter(|edge| edge.edge_type == EdgeType::Imports)
            .map(|edge| (edge.from.as_str(), edge.to.as_str())),
    )
}
