//! Builds a forest of labeled nodes from a flat list and a parent index.
//!
//! Input nodes usually come from a table with a `parent_id` column. Group them
//! with [`parent_index`], then [`build_tree`] recursively attaches each node's
//! children. [`from_flat`] does both and picks the roots; [`flatten`] goes back
//! the other way.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::warn;

/// A labeled node. `children` is always present (empty for leaves).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
    #[serde(default)]
    pub children: Vec<Node>,
}

/// Parent id to its direct children, in input order.
pub type ParentIndex = HashMap<i64, Vec<Node>>;

impl Node {
    pub fn new(id: i64, name: impl Into<String>, parent_id: Option<i64>) -> Self {
        Self {
            id,
            name: name.into(),
            parent_id,
            children: Vec::new(),
        }
    }

    /// Total number of nodes in this subtree, including `self`.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Node::count).sum::<usize>()
    }

    /// Height of this subtree; a leaf has depth 1.
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(Node::depth).max().unwrap_or(0)
    }
}

/// Group `nodes` by `parent_id`. Nodes without a parent are not indexed.
pub fn parent_index(nodes: &[Node]) -> ParentIndex {
    let mut index = ParentIndex::new();
    for node in nodes {
        if let Some(parent) = node.parent_id {
            let mut child = node.clone();
            child.children.clear();
            index.entry(parent).or_default().push(child);
        }
    }
    index
}

/// Attach `index[node.id]` as the children of every node, recursively.
///
/// Children keep the order they have in the index. A node that would become
/// its own ancestor is left out and logged rather than recursed into.
pub fn build_tree(nodes: Vec<Node>, index: &ParentIndex) -> Vec<Node> {
    let mut path = Vec::new();
    attach(nodes, index, &mut path)
}

fn attach(nodes: Vec<Node>, index: &ParentIndex, path: &mut Vec<i64>) -> Vec<Node> {
    let mut out = Vec::with_capacity(nodes.len());
    for mut node in nodes {
        if path.contains(&node.id) {
            warn!(id = node.id, "cycle in parent index, skipping node");
            continue;
        }
        path.push(node.id);
        let children = index.get(&node.id).cloned().unwrap_or_default();
        node.children = attach(children, index, path);
        path.pop();
        out.push(node);
    }
    out
}

/// Build the forest for a flat node list.
///
/// Roots are the nodes with no `parent_id`, or whose parent is not in the
/// list. Root order follows input order. Nodes that only reach each other
/// through a parent cycle are promoted to roots after the regular ones, one
/// per cycle, and logged.
pub fn from_flat(nodes: Vec<Node>) -> Vec<Node> {
    let ids: HashSet<i64> = nodes.iter().map(|n| n.id).collect();
    let index = parent_index(&nodes);
    let (roots, rest): (Vec<Node>, Vec<Node>) = nodes
        .into_iter()
        .map(|mut n| {
            n.children.clear();
            n
        })
        .partition(|n| n.parent_id.map_or(true, |p| !ids.contains(&p)));

    let mut forest = build_tree(roots, &index);
    let mut placed = HashSet::new();
    collect_ids(&forest, &mut placed);

    for node in rest {
        if placed.contains(&node.id) {
            continue;
        }
        warn!(id = node.id, parent_id = ?node.parent_id, "node unreachable from any root, promoting to root");
        let promoted = build_tree(vec![node], &index);
        collect_ids(&promoted, &mut placed);
        forest.extend(promoted);
    }
    forest
}

fn collect_ids(nodes: &[Node], out: &mut HashSet<i64>) {
    for node in nodes {
        out.insert(node.id);
        collect_ids(&node.children, out);
    }
}

/// Depth-first, pre-order flattening into childless nodes.
pub fn flatten(roots: &[Node]) -> Vec<Node> {
    let mut out = Vec::new();
    let mut stack: Vec<&Node> = roots.iter().rev().collect();
    while let Some(node) = stack.pop() {
        out.push(Node::new(node.id, node.name.clone(), node.parent_id));
        stack.extend(node.children.iter().rev());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Node> {
        vec![
            Node::new(1, "engine", None),
            Node::new(2, "piston", Some(1)),
            Node::new(3, "ring", Some(2)),
            Node::new(4, "chassis", None),
            Node::new(5, "valve", Some(1)),
        ]
    }

    #[test]
    fn build_attaches_children_in_input_order() {
        let roots = from_flat(sample());
        assert_eq!(roots.len(), 2);
        assert_eq!(roots[0].id, 1);
        assert_eq!(roots[1].id, 4);

        let engine = &roots[0];
        let child_ids: Vec<i64> = engine.children.iter().map(|c| c.id).collect();
        assert_eq!(child_ids, vec![2, 5]);
        assert_eq!(engine.children[0].children[0].name, "ring");
        assert_eq!(engine.count(), 4);
        assert_eq!(engine.depth(), 3);
    }

    #[test]
    fn leaves_have_empty_children() {
        let roots = from_flat(sample());
        let chassis = &roots[1];
        assert!(chassis.children.is_empty());
        assert_eq!(chassis.depth(), 1);
    }

    #[test]
    fn build_tree_with_explicit_index() {
        let flat = sample();
        let index = parent_index(&flat);
        assert_eq!(index[&1].len(), 2);
        assert!(!index.contains_key(&4));

        let roots = build_tree(vec![Node::new(2, "piston", Some(1))], &index);
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].children.len(), 1);
        assert_eq!(roots[0].children[0].id, 3);
    }

    #[test]
    fn orphan_becomes_root() {
        let mut flat = sample();
        flat.push(Node::new(9, "stray", Some(42)));
        let roots = from_flat(flat);
        let ids: Vec<i64> = roots.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 4, 9]);
        assert_eq!(roots[2].parent_id, Some(42));
    }

    #[test]
    fn empty_input_gives_empty_forest() {
        assert!(from_flat(Vec::new()).is_empty());
        assert!(build_tree(Vec::new(), &ParentIndex::new()).is_empty());
    }

    #[test]
    fn self_parent_is_not_recursed() {
        let flat = vec![Node::new(1, "root", None), Node::new(1, "loop", Some(1))];
        let index = parent_index(&flat);
        let roots = build_tree(vec![Node::new(1, "root", None)], &index);
        assert_eq!(roots.len(), 1);
        assert!(roots[0].children.is_empty());
    }

    #[test]
    fn parent_cycle_is_promoted_not_lost() {
        let flat = vec![
            Node::new(1, "a", Some(2)),
            Node::new(2, "b", Some(1)),
            Node::new(3, "c", None),
        ];
        let roots = from_flat(flat);

        let root_ids: Vec<i64> = roots.iter().map(|r| r.id).collect();
        assert_eq!(root_ids, vec![3, 1]);
        assert_eq!(roots[1].children.len(), 1);
        assert_eq!(roots[1].children[0].id, 2);
        assert!(roots[1].children[0].children.is_empty());

        let mut ids: Vec<i64> = flatten(&roots).iter().map(|n| n.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn flatten_is_preorder() {
        let roots = from_flat(sample());
        let ids: Vec<i64> = flatten(&roots).iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 5, 4]);
        assert!(flatten(&roots).iter().all(|n| n.children.is_empty()));
    }
}
