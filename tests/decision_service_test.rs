//! Tests for DecisionService

use std::sync::Arc;

use serde_json::json;

use treexpert::application::services::{DecisionService, EntityRequest, TreeService};
use treexpert::application::ApplicationError;
use treexpert::domain::{DataTypeId, DomainError, EvaluationError, Fact, Submission};
use treexpert::infrastructure::store::MemoryStore;
use treexpert::util::testing;

fn credit_submission() -> Submission {
    serde_json::from_value(json!({
        "created_by": "paula",
        "root": 1,
        "nodes": [
            {
                "number": 1, "display_name": "income", "description": "yearly income",
                "data_type": 1, "data_value": 40000, "comparison": "GT",
                "explanation": "income checked", "true_explanation": " and sufficient",
                "true_number": 2, "false_number": 10, "false_color": 2
            },
            {
                "number": 2, "display_name": "debt", "data_type": 2, "data_value": true,
                "comparison": "EQ", "true_number": 11, "false_number": 12, "true_color": 3
            }
        ],
        "leafs": [
            {"number": 10, "display_name": "rejected", "result": false},
            {"number": 11, "display_name": "too much debt", "result": false},
            {"number": 12, "display_name": "approved", "result": true, "color": 1}
        ]
    }))
    .expect("valid submission json")
}

fn services() -> DecisionService {
    testing::init_test_setup();
    let trees = Arc::new(TreeService::new(Arc::new(MemoryStore::new())));
    trees.add_kind("credit", "").unwrap();
    trees.submit("credit", &credit_submission()).unwrap();
    DecisionService::new(trees)
}

fn request(identifier: &str, data: Vec<Fact>) -> EntityRequest {
    EntityRequest {
        identifier: Some(identifier.to_string()),
        sec_identifier: None,
        data,
    }
}

#[test]
fn given_all_facts_when_deciding_then_definitive_result() {
    // Arrange
    let service = services();
    let entity = request("c-1", vec![Fact::new(1, 50000_i64), Fact::new(2, false)]);

    // Act
    let result = service.decide("credit", None, &entity).unwrap();

    // Assert
    let decision = &result.decision;
    assert!(!decision.is_preliminary);
    assert_eq!(decision.version, "credit: 0.1");
    assert_eq!(decision.description, "approved");
    assert_eq!(decision.result, Some(true));
    assert_eq!(decision.leaf_id.as_ref().unwrap().as_str(), "1_0.1_L.12");
    assert!(decision.missing_data.is_none());

    assert_eq!(result.criteria.len(), 2);
    assert_eq!(result.criteria[0].based_on, "1_0.1_N.2");
    assert_eq!(result.criteria[0].explanation, "income checked and sufficient");
    assert_eq!(result.criteria[1].based_on, "");
    assert_eq!(result.criteria[1].color, 0);
}

#[test]
fn given_missing_fact_when_deciding_then_preliminary() {
    let service = services();
    let entity = request("c-2", vec![Fact::new(1, 50000_i64)]);

    let result = service.decide("credit", None, &entity).unwrap();

    let decision = &result.decision;
    assert!(decision.is_preliminary);
    assert_eq!(decision.result, None);
    assert_eq!(decision.missing_data, Some(DataTypeId(2)));
    assert_eq!(decision.node_missing_sth.as_ref().unwrap().as_str(), "1_0.1_N.2");
    assert_eq!(
        decision.description,
        "missing data to evaluate tree: data type 2 at node with id: 1_0.1_N.2"
    );
    assert_eq!(result.criteria.len(), 1);
}

#[test]
fn given_batch_when_deciding_then_results_in_input_order() {
    let service = services();
    let entities = vec![
        request("a", vec![Fact::new(1, 30000_i64)]),
        request("b", vec![Fact::new(1, 50000_i64), Fact::new(2, true)]),
        request("c", vec![]),
    ];

    let results = service.decide_batch("credit", None, &entities).unwrap();

    let ids: Vec<_> = results
        .iter()
        .map(|r| r.decision.identifier.clone().unwrap())
        .collect();
    assert_eq!(ids, ["a", "b", "c"]);
    assert_eq!(results[0].decision.description, "rejected");
    assert_eq!(results[0].criteria[0].color, 2);
    assert_eq!(results[1].decision.description, "too much debt");
    assert!(results[2].decision.is_preliminary);
    assert!(results[2].criteria.is_empty());
}

#[test]
fn given_duplicate_fact_when_deciding_then_evaluation_error() {
    let service = services();
    let entity = request("d", vec![Fact::new(1, 5_i64), Fact::new(1, 6_i64)]);

    let err = service.decide("credit", None, &entity).unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::Evaluation(EvaluationError::DuplicateFact(
            DataTypeId(1)
        )))
    ));
}

#[test]
fn given_result_when_rendering_json_then_short_and_full_forms() {
    let service = services();
    let entity = request("e", vec![Fact::new(1, 50000_i64), Fact::new(2, false)]);
    let result = service.decide("credit", None, &entity).unwrap();

    let short = result.to_json(false);
    let full = result.to_json(true);

    assert_eq!(
        short["criteria"][0],
        json!({"id": "1_0.1_N.1", "input_value": 50000, "result": true, "based_on": "1_0.1_N.2"})
    );
    assert_eq!(full["criteria"][0]["comparison_method"], "GT");
    assert_eq!(full["criteria"][0]["comparison_value"], 40000);
    assert_eq!(full["criteria"][0]["description"], "yearly income");
    assert_eq!(full["decision"]["identifier"], "e");
    assert!(full["decision"].get("missing_data").is_none());
}

#[test]
fn given_facts_json_when_parsing_then_accepts_lists_and_aliases() {
    let entity: EntityRequest = serde_json::from_value(json!({
        "identifier": "f",
        "sec_identifier": "f-2",
        "data": [
            {"data_type": 1, "data_value": [50000, 60000]},
            {"data_type": 2, "value": false}
        ]
    }))
    .unwrap();
    let service = services();

    let result = service.decide("credit", None, &entity).unwrap();

    assert_eq!(result.decision.sec_identifier.as_deref(), Some("f-2"));
    assert_eq!(result.decision.result, Some(true));
}
