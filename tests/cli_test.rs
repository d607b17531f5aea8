//! Tests for command dispatch against in-memory services

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use serde_json::json;
use tempfile::TempDir;

use treexpert::cli::{execute_command, Cli};
use treexpert::config::Settings;
use treexpert::exitcode;
use treexpert::infrastructure::di::ServiceContainer;
use treexpert::infrastructure::store::MemoryStore;
use treexpert::infrastructure::traits::RealFileSystem;
use treexpert::util::testing;

fn container() -> ServiceContainer {
    testing::init_test_setup();
    ServiceContainer::with_deps(
        Settings::default(),
        Arc::new(RealFileSystem),
        Arc::new(MemoryStore::new()),
    )
}

fn run(container: &ServiceContainer, args: &[&str]) -> Result<(), i32> {
    let cli = Cli::try_parse_from(std::iter::once("treexpert").chain(args.iter().copied()))
        .expect("valid arguments");
    execute_command(&cli, container).map_err(|e| e.exit_code())
}

fn write_json(dir: &TempDir, name: &str, value: serde_json::Value) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, value.to_string()).expect("write json file");
    path
}

fn submission() -> serde_json::Value {
    json!({
        "created_by": "paula",
        "root": 1,
        "nodes": [{"number": 1, "display_name": "age", "data_type": 1, "data_value": 17,
                   "true_number": 2, "false_number": 3}],
        "leafs": [
            {"number": 2, "display_name": "adult", "result": true},
            {"number": 3, "display_name": "minor", "result": false}
        ]
    })
}

#[test]
fn given_kind_and_submission_when_deciding_then_succeeds() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let c = container();
    let tree = write_json(&temp, "tree.json", submission());
    let entity = write_json(
        &temp,
        "entity.json",
        json!({"data": [{"data_type": 1, "data_value": 30}]}),
    );
    let batch = write_json(&temp, "batch.json", json!([{"identifier": "x", "data": []}]));

    // Act / Assert
    assert_eq!(run(&c, &["kind", "add", "people"]), Ok(()));
    assert_eq!(run(&c, &["tree", "submit", tree.to_str().unwrap()]), Ok(()));
    assert_eq!(run(&c, &["tree", "show"]), Ok(()));
    assert_eq!(run(&c, &["tree", "show", "--json", "--tree-version", "0.1"]), Ok(()));
    assert_eq!(run(&c, &["tree", "versions"]), Ok(()));
    assert_eq!(run(&c, &["decide", entity.to_str().unwrap(), "--full"]), Ok(()));
    assert_eq!(run(&c, &["decide", batch.to_str().unwrap(), "--batch"]), Ok(()));
    assert_eq!(c.trees.versions("people").unwrap().len(), 1);
}

#[test]
fn given_invalid_submission_when_submitting_then_dataerr() {
    let temp = TempDir::new().unwrap();
    let c = container();
    let mut broken = submission();
    broken["nodes"][0]["true_number"] = json!(9);
    let tree = write_json(&temp, "tree.json", broken);

    run(&c, &["kind", "add", "people"]).unwrap();

    assert_eq!(
        run(&c, &["tree", "submit", tree.to_str().unwrap()]),
        Err(exitcode::DATAERR)
    );
}

#[test]
fn given_no_kinds_when_showing_then_noinput() {
    let c = container();

    assert_eq!(run(&c, &["tree", "show"]), Err(exitcode::NOINPUT));
}

#[test]
fn given_missing_file_when_submitting_then_ioerr() {
    let c = container();
    run(&c, &["kind", "add", "people"]).unwrap();

    assert_eq!(
        run(&c, &["tree", "submit", "/nonexistent/tree.json"]),
        Err(exitcode::IOERR)
    );
}

#[test]
fn given_bad_version_label_when_adding_version_then_usage() {
    let c = container();
    run(&c, &["kind", "add", "people"]).unwrap();

    assert_eq!(run(&c, &["tree", "add-version", "one"]), Err(exitcode::USAGE));
    assert_eq!(run(&c, &["tree", "add-version", "0.3"]), Ok(()));
    assert_eq!(run(&c, &["tree", "purge", "0.3"]), Ok(()));
}
