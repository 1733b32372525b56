use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{Value, json};
use tempfile::TempDir;

/// `docflow` with the user config dir pointed into `home`.
fn docflow(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("docflow").unwrap();
    cmd.env("XDG_CONFIG_HOME", home).env("HOME", home);
    cmd
}

fn write_json(dir: &Path, name: &str, value: &Value) -> std::path::PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    path
}

fn chunks() -> Value {
    json!({
        "output": {
            "chunks": [
                {"page_number": 2, "content": "Total due: 40"},
                {"segments": [{"content": "Invoice 7", "page_number": 1}]},
                {"page_number": 2, "content": "Total due: 40"}
            ]
        }
    })
}

#[test]
fn test_assemble_labels_pages_in_order() {
    let dir = TempDir::new().unwrap();
    let input = write_json(dir.path(), "chunks.json", &chunks());

    docflow(dir.path())
        .arg("assemble")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "===== CHUNKR PAGE NUMBER 1 =====\nInvoice 7\n\n===== CHUNKR PAGE NUMBER 2 =====\nTotal due: 40",
        ));
}

#[test]
fn test_assemble_strict_writes_page_map() {
    let dir = TempDir::new().unwrap();
    let input = write_json(dir.path(), "chunks.json", &chunks());
    let output = dir.path().join("pages.json");

    docflow(dir.path())
        .args(["assemble", "--strict", "-o"])
        .arg(&output)
        .arg(&input)
        .assert()
        .success();

    let pages: Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(pages, json!({"1": "Invoice 7", "2": "Total due: 40"}));
}

#[test]
fn test_assemble_rejects_empty_chunks() {
    let dir = TempDir::new().unwrap();
    let input = write_json(dir.path(), "chunks.json", &json!([{"content": "  "}]));

    docflow(dir.path())
        .arg("assemble")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No text could be assembled"));
}

#[test]
fn test_batch_summary() {
    let dir = TempDir::new().unwrap();
    write_json(dir.path(), "in/a.json", &chunks());
    write_json(dir.path(), "in/b.json", &json!([]));
    let out = dir.path().join("out");
    let pattern = format!("{}/in/*.json", dir.path().display());

    docflow(dir.path())
        .args(["batch", &pattern, "--summary", "--continue-on-error", "-o"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 successful, 1 failed"));

    assert!(out.join("a.txt").exists());
    let summary = fs::read_to_string(out.join("summary.csv")).unwrap();
    assert!(summary.starts_with("filename,status,page_count"));
    assert!(summary.contains("a.json,success,2,"));
    assert!(summary.contains("b.json,error"));
}

#[test]
fn test_schema_normalizes_tables() {
    let dir = TempDir::new().unwrap();
    let input = write_json(
        dir.path(),
        "fields.json",
        &json!([
            {"fieldName": "Insured", "fieldType": "FIELD"},
            {"fieldType": "table", "fieldName": "Vehicles", "tableData": [{"fieldName": "Make"}]},
            {"fieldType": "table", "fieldName": "Empty", "tableData": []}
        ]),
    );

    let output = docflow(dir.path()).arg("schema").arg(&input).output().unwrap();
    assert!(output.status.success());

    let targets: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(targets.as_array().unwrap().len(), 2);
    assert_eq!(targets[0]["fieldDatatype"], "String");
    assert_eq!(targets[1]["tableName"], "Vehicles");
    assert_eq!(targets[1]["fieldName"], "Make");
}

#[test]
fn test_merge_tables_backfills_columns() {
    let dir = TempDir::new().unwrap();
    let schema = write_json(
        dir.path(),
        "fields.json",
        &json!([
            {"fieldName": "Insured"},
            {"fieldType": "table", "fieldName": "Vehicles", "tableData": [
                {"fieldName": "Make"}, {"fieldName": "Year"}
            ]}
        ]),
    );
    let response = dir.path().join("Vehicles.txt");
    fs::write(&response, "```json\n{\"Vehicles\": [{\"Make\": \"Ford\"}]}\n```").unwrap();

    let output = docflow(dir.path())
        .args(["merge", "--mode", "tables", "--schema"])
        .arg(&schema)
        .arg(&response)
        .output()
        .unwrap();
    assert!(output.status.success());

    let record: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        record,
        json!({
            "Insured": null,
            "Vehicles": {"fieldType": "table", "items": [{"Make": "Ford", "Year": null}]}
        })
    );
}

#[test]
fn test_marks_csv() {
    let dir = TempDir::new().unwrap();
    let input = write_json(
        dir.path(),
        "tables.json",
        &json!({"tables": [[
            ["Q", "Ans", "Marks"],
            [1, "✓", 4],
            ["Total", null, "4"]
        ]]}),
    );

    docflow(dir.path())
        .args(["marks", "--format", "csv"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("A,1,4,true"))
        .stdout(predicate::str::contains("total,,4,"));
}

#[test]
fn test_run_without_endpoint_reclaims_credit() {
    let dir = TempDir::new().unwrap();
    let store = dir.path().join("store");
    let input = write_json(dir.path(), "chunks.json", &chunks());
    write_json(&store, "credits/cr1.json", &json!({"type": "issued"}));

    docflow(dir.path())
        .args([
            "run", "--user", "u1", "--cluster", "c1", "--file", "f1", "--credit", "cr1", "--job",
            "j1", "--chunks",
        ])
        .arg(&input)
        .arg("--store")
        .arg(&store)
        .assert()
        .failure()
        .stderr(predicate::str::contains("client not configured"));

    let file: Value =
        serde_json::from_str(&fs::read_to_string(store.join("files/f1.json")).unwrap()).unwrap();
    assert_eq!(file["processingStatus"], "Failed");
    assert!(!store.join("credits/cr1.json").exists());

    let job: Value =
        serde_json::from_str(&fs::read_to_string(store.join("jobs/j1.json")).unwrap()).unwrap();
    assert_eq!(job["status"], "error");
}

#[test]
fn test_run_with_unreachable_endpoint_reclaims_credit() {
    let dir = TempDir::new().unwrap();
    let store = dir.path().join("store");
    let input = write_json(dir.path(), "chunks.json", &chunks());
    write_json(
        &store,
        "clusters/c1.json",
        &json!({"userId": "u1", "requestedFields": [{"fieldName": "Invoice"}]}),
    );
    write_json(&store, "credits/cr1.json", &json!({"type": "issued"}));
    let config = write_json(
        dir.path(),
        "config.json",
        &json!({"llm": {"endpoint": "http://127.0.0.1:9", "deployment": "test", "timeout_secs": 5}}),
    );

    docflow(dir.path())
        .env("AZURE_API_KEY", "test-key")
        .arg("--config")
        .arg(&config)
        .args([
            "run", "--user", "u1", "--cluster", "c1", "--file", "f1", "--credit", "cr1", "--job",
            "j1", "--chunks",
        ])
        .arg(&input)
        .arg("--store")
        .arg(&store)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no field or table value extracted"));

    let file: Value =
        serde_json::from_str(&fs::read_to_string(store.join("files/f1.json")).unwrap()).unwrap();
    assert_eq!(file["processingStatus"], "Failed");
    assert!(file.get("extractedValues").is_none());
    assert!(!store.join("credits/cr1.json").exists());

    let job: Value =
        serde_json::from_str(&fs::read_to_string(store.join("jobs/j1.json")).unwrap()).unwrap();
    assert_eq!(job["status"], "error");
}

#[test]
fn test_config_init_and_check() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("docflow.json");
    let store = dir.path().join("store");

    docflow(dir.path())
        .args(["config", "init", "--mode", "field-groups", "-o"])
        .arg(&path)
        .assert()
        .success();
    assert!(path.exists());

    docflow(dir.path())
        .args(["config", "init", "-o"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    docflow(dir.path())
        .arg("--config")
        .arg(&path)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"field_groups\""));

    docflow(dir.path())
        .arg("--config")
        .arg(&path)
        .args(["config", "check"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("llm.endpoint is not set"));

    fs::create_dir_all(store.join("clusters")).unwrap();
    docflow(dir.path())
        .args([
            "config", "init", "--force", "--endpoint", "https://example.openai.azure.com",
            "--deployment", "gpt", "--store",
        ])
        .arg(&store)
        .arg("-o")
        .arg(&path)
        .assert()
        .success();

    docflow(dir.path())
        .env("AZURE_API_KEY", "test-key")
        .arg("--config")
        .arg(&path)
        .args(["config", "check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is ready"));
}
