//! Flattening a built forest must give back the original parent/child
//! relation, and the JSON shape must keep `children` on every node.

use std::collections::BTreeSet;

use jobpool_tree::{flatten, from_flat, Node};

fn relation(nodes: &[Node]) -> BTreeSet<(i64, Option<i64>, String)> {
    nodes
        .iter()
        .map(|n| (n.id, n.parent_id, n.name.clone()))
        .collect()
}

fn catalog() -> Vec<Node> {
    vec![
        Node::new(10, "vehicles", None),
        Node::new(11, "cars", Some(10)),
        Node::new(12, "trucks", Some(10)),
        Node::new(13, "sedans", Some(11)),
        Node::new(14, "coupes", Some(11)),
        Node::new(20, "parts", None),
        Node::new(21, "brakes", Some(20)),
        Node::new(30, "misc", Some(999)),
    ]
}

#[test]
fn flatten_reproduces_relation() {
    let flat = catalog();
    let forest = from_flat(flat.clone());
    assert_eq!(relation(&flatten(&forest)), relation(&flat));

    let total: usize = forest.iter().map(Node::count).sum();
    assert_eq!(total, flat.len());
}

#[test]
fn every_child_points_at_its_parent() {
    fn check(node: &Node) {
        for child in &node.children {
            assert_eq!(child.parent_id, Some(node.id));
            check(child);
        }
    }
    for root in from_flat(catalog()) {
        check(&root);
    }
}

#[test]
fn json_roundtrip_keeps_empty_children() {
    let forest = from_flat(catalog());
    let json = serde_json::to_value(&forest).unwrap();

    // Leaves carry an explicit empty array.
    let brakes = &json[1]["children"][0];
    assert_eq!(brakes["name"], "brakes");
    assert_eq!(brakes["children"], serde_json::json!([]));

    // Roots without a parent omit parent_id.
    assert!(json[0].get("parent_id").is_none());
}

#[test]
fn flat_json_input_parses_without_children() {
    let input = r#"[
        {"id": 1, "name": "a"},
        {"id": 2, "name": "b", "parent_id": 1}
    ]"#;
    let flat: Vec<Node> = serde_json::from_str(input).unwrap();
    let forest = from_flat(flat);
    assert_eq!(forest.len(), 1);
    assert_eq!(forest[0].children[0].name, "b");
}
