//! Tests for building trees from flat records: linkage, lookup and traversal

use std::collections::BTreeSet;

use rstest::{fixture, rstest};
use serde_json::{json, Value};

use flattree::util::testing;
use flattree::{JsonId, Tree, TreeBuilder, TreeOptions};

#[ctor::ctor]
fn init() {
    testing::init_test_setup();
}

fn id(s: &str) -> JsonId {
    JsonId::from(s)
}

/// (child, parent) pairs as seen through the arena links.
fn edges(tree: &Tree<Value>) -> BTreeSet<(String, Option<String>)> {
    let mut edges = BTreeSet::new();
    tree.visit(|node, parent| {
        let child = node.id.as_ref().map(JsonId::to_string).unwrap_or_default();
        let parent = parent.and_then(|p| p.id.as_ref()).map(JsonId::to_string);
        edges.insert((child, parent));
    });
    edges
}

#[fixture]
fn records() -> Vec<Value> {
    vec![
        json!({"id": "root"}),
        json!({"id": "a", "parentId": "root"}),
        json!({"id": "b", "parentId": "root"}),
        json!({"id": "a1", "parentId": "a"}),
        json!({"id": "a2", "parentId": "a"}),
        json!({"id": "b1", "parentId": "b"}),
        json!({"id": "lonely"}),
    ]
}

// ============================================================
// Order Independence Tests
// ============================================================

#[rstest]
#[case::parents_first(vec![0, 1, 2, 3, 4, 5, 6])]
#[case::children_first(vec![6, 5, 4, 3, 2, 1, 0])]
#[case::interleaved(vec![3, 0, 5, 1, 6, 4, 2])]
#[case::root_last(vec![1, 2, 3, 4, 5, 6, 0])]
fn given_any_input_order_when_building_then_edges_are_identical(
    records: Vec<Value>,
    #[case] order: Vec<usize>,
) {
    let reference: Tree<Value> = TreeBuilder::new().items(records.clone()).build();
    let permuted: Vec<Value> = order.iter().map(|&i| records[i].clone()).collect();
    let tree: Tree<Value> = TreeBuilder::new().items(permuted).build();

    assert_eq!(edges(&tree), edges(&reference));
    assert_eq!(tree.len(), 7);
    assert_eq!(tree.root_nodes().len(), 2);
}

#[rstest]
fn given_children_in_input_order_when_building_then_children_keep_that_order(
    records: Vec<Value>,
) {
    let tree: Tree<Value> = TreeBuilder::new().items(records).build();

    let a = tree.get_node_by_id(&id("a")).unwrap();
    let children: Vec<_> = a
        .children
        .iter()
        .filter_map(|&idx| tree.node(idx))
        .filter_map(|node| node.id.clone())
        .collect();
    assert_eq!(children, vec![id("a1"), id("a2")]);
}

// ============================================================
// Parent Link Tests
// ============================================================

#[rstest]
fn given_built_tree_when_checking_links_then_children_point_back_to_parent(records: Vec<Value>) {
    let tree: Tree<Value> = TreeBuilder::new().items(records).build();

    for (idx, node) in tree.iter() {
        for &child in &node.children {
            assert_eq!(tree.node(child).unwrap().parent, Some(idx));
        }
    }
    for &root in tree.root_nodes() {
        assert_eq!(tree.node(root).unwrap().parent, None);
    }
}

#[test]
fn given_unknown_or_missing_parent_when_building_then_records_become_roots() {
    let tree: Tree<Value> = TreeBuilder::new()
        .items(vec![
            json!({"id": 1, "parentId": 404}),
            json!({"id": 2}),
            json!({"id": 3, "parentId": null}),
            json!({"parentId": 1}),
        ])
        .build();

    // the id-less record still attaches to its parent
    assert_eq!(tree.root_nodes().len(), 3);
    assert_eq!(tree.get_node_by_id(&JsonId::from(1i64)).unwrap().children.len(), 1);
}

#[test]
fn given_numeric_and_string_ids_when_building_then_they_do_not_match() {
    let tree: Tree<Value> = TreeBuilder::new()
        .items(vec![json!({"id": 1}), json!({"id": "2", "parentId": "1"})])
        .build();

    assert_eq!(tree.root_nodes().len(), 2);
    assert_eq!(tree.depth(), 1);
}

#[test]
fn given_custom_keys_when_building_then_uses_configured_fields() {
    let options = TreeOptions::default()
        .with_id_key("key")
        .with_parent_id_key("owner");
    let tree: Tree<Value> = Tree::new(
        vec![
            json!({"key": "team", "id": "ignored"}),
            json!({"key": "dev", "owner": "team", "parentId": "nothing"}),
        ],
        None::<Value>,
        options,
    );

    assert_eq!(tree.root_nodes().len(), 1);
    assert_eq!(tree.depth(), 2);
    assert!(tree.get_node_by_id(&id("ignored")).is_none());
    assert!(tree.get_node_by_id(&id("dev")).is_some());
}

#[rstest]
#[case::child_between_duplicates(vec![
    json!({"id": "dup", "n": 1}),
    json!({"id": "child", "parentId": "dup"}),
    json!({"id": "dup", "n": 2}),
])]
#[case::child_after_duplicates(vec![
    json!({"id": "dup", "n": 1}),
    json!({"id": "dup", "n": 2}),
    json!({"id": "child", "parentId": "dup"}),
])]
fn given_duplicated_parent_id_when_building_then_child_hangs_under_indexed_node(
    #[case] items: Vec<Value>,
) {
    let tree: Tree<Value> = TreeBuilder::new().items(items).build();

    let indexed = tree.get_node_by_id(&id("dup")).unwrap();
    assert_eq!(indexed.data["n"], 2);
    assert_eq!(indexed.children, vec![tree.index_of(&id("child")).unwrap()]);

    assert_eq!(
        tree.get_root_items(),
        vec![
            json!({"id": "dup", "n": 1}),
            json!({"id": "dup", "n": 2, "children": [{"id": "child", "parentId": "dup"}]}),
        ]
    );
}

// ============================================================
// Extra Item (Virtual Root) Tests
// ============================================================

#[test]
fn given_extra_items_when_building_then_they_are_leading_roots() {
    let tree: Tree<Value> = Tree::new(
        vec![json!({"id": "a", "parentId": "X"}), json!({"id": "b"})],
        vec![json!({"id": "X"}), json!({"id": "Y"})],
        TreeOptions::default(),
    );

    let roots: Vec<_> = tree
        .root_nodes()
        .iter()
        .filter_map(|&idx| tree.node(idx))
        .filter_map(|node| node.id.clone())
        .collect();
    assert_eq!(roots, vec![id("X"), id("Y"), id("a"), id("b")]);

    // virtual roots never adopt children
    let x = tree.get_node_by_id(&id("X")).unwrap();
    assert!(x.is_leaf());
    assert_eq!(tree.get_node_by_id(&id("a")).unwrap().parent, None);
}

#[test]
fn given_single_extra_item_when_building_then_treated_as_one_element_list() {
    let tree: Tree<Value> = Tree::new(
        Vec::<Value>::new(),
        Some(json!({"id": "only"})),
        TreeOptions::default(),
    );

    assert_eq!(tree.root_nodes().len(), 1);
    assert!(tree.is_virtual_root(&id("only")));
    assert_eq!(tree.get_root_items(), vec![json!({"id": "only"})]);
}

// ============================================================
// Lookup Tests
// ============================================================

#[test]
fn given_items_and_extra_items_when_looking_up_then_resolves_both() {
    let tree: Tree<Value> = TreeBuilder::new()
        .items(vec![json!({"id": "item"})])
        .extra_item(json!({"id": "extra"}))
        .build();

    assert_eq!(
        tree.get_node_by_id(&id("item")).unwrap().data["id"],
        "item"
    );
    assert_eq!(
        tree.get_node_by_id(&id("extra")).unwrap().data["id"],
        "extra"
    );
    assert!(tree.get_node_by_id(&id("absent")).is_none());
}

#[test]
fn given_id_collision_when_looking_up_then_item_node_wins() {
    let tree: Tree<Value> = TreeBuilder::new()
        .items(vec![json!({"id": "same", "from": "items"})])
        .extra_item(json!({"id": "same", "from": "extra"}))
        .build();

    let node = tree.get_node_by_id(&id("same")).unwrap();
    assert_eq!(node.data["from"], "items");
    assert!(tree.is_virtual_root(&id("same")));
}

#[test]
fn given_empty_input_when_querying_then_everything_is_absent() {
    let tree: Tree<Value> = TreeBuilder::new().build();

    assert!(tree.is_empty());
    assert_eq!(tree.len(), 0);
    assert_eq!(tree.depth(), 0);
    assert!(tree.get_root_items().is_empty());
    assert!(tree.get_node_by_id(&id("anything")).is_none());
    assert!(tree.get_node_by_id(&JsonId::from(0i64)).is_none());
}

// ============================================================
// Traversal Tests
// ============================================================

#[rstest]
fn given_tree_when_visiting_then_preorder_with_parents(records: Vec<Value>) {
    let tree: Tree<Value> = TreeBuilder::new().items(records).build();

    let mut visited = Vec::new();
    tree.visit(|node, parent| {
        visited.push((
            node.id.as_ref().map(JsonId::to_string).unwrap(),
            parent.and_then(|p| p.id.as_ref()).map(JsonId::to_string),
        ));
    });

    let expected = [
        ("root", None),
        ("a", Some("root")),
        ("a1", Some("a")),
        ("a2", Some("a")),
        ("b", Some("root")),
        ("b1", Some("b")),
        ("lonely", None),
    ];
    let expected: Vec<(String, Option<String>)> = expected
        .iter()
        .map(|(c, p)| (c.to_string(), p.map(str::to_string)))
        .collect();
    assert_eq!(visited, expected);
}

#[rstest]
fn given_start_node_when_visiting_from_then_walks_only_that_subtree(records: Vec<Value>) {
    let tree: Tree<Value> = TreeBuilder::new().items(records).build();
    let start = tree.index_of(&id("a")).unwrap();

    let mut visited = Vec::new();
    let mut parents = Vec::new();
    tree.visit_from(start, |node, parent| {
        visited.push(node.id.clone().unwrap());
        parents.push(parent.and_then(|p| p.id.clone()));
    })
    .unwrap();

    assert_eq!(visited, vec![id("a"), id("a1"), id("a2")]);
    // the start node is visited without a parent, even though it has one
    assert_eq!(parents, vec![None, Some(id("a")), Some(id("a"))]);
}

#[rstest]
fn given_tree_when_collecting_leaves_then_returns_childless_nodes(records: Vec<Value>) {
    let tree: Tree<Value> = TreeBuilder::new().items(records).build();

    let leaves: Vec<_> = tree
        .leaf_nodes()
        .into_iter()
        .filter_map(|node| node.id.clone())
        .collect();
    assert_eq!(leaves, vec![id("a1"), id("a2"), id("b1"), id("lonely")]);
    assert_eq!(tree.depth(), 3);
}
