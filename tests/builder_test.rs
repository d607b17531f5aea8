//! Tests for TreeBuilder

use chrono::Utc;
use rstest::rstest;
use serde_json::json;

use treexpert::domain::error::Referrer;
use treexpert::domain::{Submission, Successor, TreeBuilder, ValidationError, Version};
use treexpert::util::testing;

fn version(major: u32, minor: u32) -> Version {
    Version {
        id: 1,
        kind_id: 1,
        major,
        minor,
        valid: false,
        deleted: false,
        created_at: Utc::now(),
    }
}

fn node(number: i64, true_number: i64, false_number: i64) -> serde_json::Value {
    json!({
        "number": number,
        "display_name": format!("node {number}"),
        "data_type": 1,
        "data_value": 100,
        "comparison": "GT",
        "true_number": true_number,
        "false_number": false_number,
    })
}

fn leaf(number: i64, result: bool) -> serde_json::Value {
    json!({"number": number, "display_name": format!("leaf {number}"), "result": result})
}

fn submission(
    root: i64,
    nodes: Vec<serde_json::Value>,
    leafs: Vec<serde_json::Value>,
) -> Submission {
    serde_json::from_value(json!({
        "created_by": "paula",
        "root": root,
        "nodes": nodes,
        "leafs": leafs,
    }))
    .expect("valid submission json")
}

#[test]
fn given_valid_submission_when_building_then_ids_carry_version() {
    testing::init_test_setup();
    // Arrange
    let v = version(0, 1);
    let sub = submission(4, vec![node(4, 2, 1)], vec![leaf(1, false), leaf(2, true)]);

    // Act
    let blueprint = TreeBuilder::new(&v).build(&sub).unwrap();

    // Assert
    assert_eq!(blueprint.root.as_str(), "1_0.1_N.4");
    assert_eq!(blueprint.nodes.len(), 1);
    assert_eq!(blueprint.leafs.len(), 2);
    assert_eq!(
        blueprint.nodes[0].false_successor,
        Successor::Leaf(treexpert::domain::ElementId::new("1_0.1_L.1"))
    );
}

#[test]
fn given_dangling_successor_when_building_then_names_number() {
    testing::init_test_setup();
    let v = version(0, 1);
    let sub = submission(1, vec![node(1, 9, 2)], vec![leaf(2, true)]);

    let err = TreeBuilder::new(&v).build(&sub).unwrap_err();

    assert_eq!(
        err,
        ValidationError::UnresolvedSuccessor {
            number: 9,
            referrer: Referrer::Node(1)
        }
    );
    assert!(err.to_string().contains("number 9"));
}

#[test]
fn given_dangling_root_when_building_then_referrer_is_root() {
    let v = version(0, 1);
    let sub = submission(7, vec![node(1, 2, 2)], vec![leaf(2, true)]);

    let err = TreeBuilder::new(&v).build(&sub).unwrap_err();

    assert_eq!(
        err,
        ValidationError::UnresolvedSuccessor {
            number: 7,
            referrer: Referrer::Root
        }
    );
}

#[rstest]
#[case::node_and_leaf(
    vec![node(1, 2, 3), node(2, 3, 4)],
    vec![leaf(2, true), leaf(3, false), leaf(4, true)]
)]
#[case::two_leafs(vec![node(1, 2, 3)], vec![leaf(2, true), leaf(2, false), leaf(3, true)])]
#[case::two_nodes(
    vec![node(1, 2, 3), node(2, 3, 4), node(2, 4, 3)],
    vec![leaf(3, true), leaf(4, false)]
)]
fn given_duplicate_number_when_building_then_rejected(
    #[case] nodes: Vec<serde_json::Value>,
    #[case] leafs: Vec<serde_json::Value>,
) {
    let v = version(0, 1);
    let sub = submission(1, nodes, leafs);

    let err = TreeBuilder::new(&v).build(&sub).unwrap_err();

    assert_eq!(err, ValidationError::DuplicateNumber { number: 2 });
}

#[rstest]
#[case::self_loop(vec![node(1, 1, 2)])]
#[case::two_cycle(vec![node(1, 3, 2), node(3, 1, 2)])]
#[case::deep_cycle(vec![node(1, 3, 2), node(3, 5, 2), node(5, 2, 3)])]
fn given_cycle_when_building_then_recursion_error(#[case] nodes: Vec<serde_json::Value>) {
    let v = version(0, 1);
    let sub = submission(1, nodes, vec![leaf(2, true)]);

    let err = TreeBuilder::new(&v).build(&sub).unwrap_err();

    assert!(matches!(err, ValidationError::CyclicGraph { .. }));
    assert!(err.to_string().starts_with("recursion error"));
}

#[test]
fn given_no_nodes_when_building_then_empty_submission() {
    let v = version(0, 1);
    let sub = submission(1, vec![], vec![leaf(1, true)]);

    assert_eq!(
        TreeBuilder::new(&v).build(&sub).unwrap_err(),
        ValidationError::EmptySubmission
    );
}

#[test]
fn given_diamond_when_building_then_accepted() {
    let v = version(2, 0);
    let sub = submission(
        1,
        vec![node(1, 3, 5), node(3, 6, 7), node(5, 6, 7), node(6, 7, 8)],
        vec![leaf(7, true), leaf(8, false)],
    );

    let blueprint = TreeBuilder::new(&v).build(&sub).unwrap();

    assert_eq!(blueprint.element_count(), 6);
    assert!(blueprint
        .nodes
        .iter()
        .all(|n| n.id.as_str().starts_with("1_2.0_N.")));
}
