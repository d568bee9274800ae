//! End-to-end tests: finding files on disk through build, query and snapshot.

use std::fs;
use std::path::Path;

use cartograph::{Cartograph, CartographConfig, CollaboratorKind, Error};
use serde_json::{Value, json};
use tempfile::TempDir;

/// Workspace with a small checkout flow:
///
/// ```text
/// app.ts ──► cart.ts ──► tax.ts
///   main ──► checkout ──► computeTotal ──► addTax
/// ```
fn workspace() -> TempDir {
    let dir = TempDir::new().expect("create temp dir");
    Cartograph::init(dir.path()).expect("init workspace");
    let findings = dir.path().join(".cartograph/findings");

    write_finding(
        &findings,
        "structure",
        json!({
            "folders": ["/ws/src"],
            "files": ["/ws/src/app.ts", "/ws/src/cart.ts", "/ws/src/tax.ts"],
        }),
    );
    write_finding(
        &findings,
        "extraction",
        json!({"functions": [
            {"id": "/ws/src/app.ts::main", "name": "main", "file": "/ws/src/app.ts", "startLine": 1, "calls": ["checkout"]},
            {"id": "/ws/src/cart.ts::checkout", "name": "checkout", "file": "/ws/src/cart.ts", "startLine": 4, "calls": ["computeTotal", "console.log"]},
            {"id": "/ws/src/cart.ts::computeTotal", "name": "computeTotal", "file": "/ws/src/cart.ts", "startLine": 12, "calls": ["addTax"]},
            {"id": "/ws/src/tax.ts::addTax", "name": "addTax", "file": "/ws/src/tax.ts", "startLine": 2, "calls": []},
        ]}),
    );
    write_finding(
        &findings,
        "dependencies",
        json!({"dependencies": [
            {"from": "/ws/src/app.ts", "to": "/ws/src/cart.ts"},
            {"from": "/ws/src/cart.ts", "to": "/ws/src/tax.ts"},
            {"from": "/ws/src/cart.ts", "to": "lodash"},
        ]}),
    );
    write_finding(
        &findings,
        "risks",
        json!({"risks": [
            {"file": "src/tax.ts", "category": "complexity", "severity": "medium", "message": "nested branches"},
            {"file": "src/tax.ts", "category": "secret", "severity": "critical", "message": "hard-coded key", "line": 3},
        ]}),
    );
    dir
}

fn write_finding(dir: &Path, kind: &str, data: Value) {
    let envelope = json!({"source": format!("{kind}-agent"), "timestamp": 1_700_000_000_000_i64, "data": data});
    fs::write(dir.join(format!("{kind}.json")), envelope.to_string()).expect("write finding");
}

#[test]
fn build_links_all_layers() {
    let dir = workspace();
    let cartograph = Cartograph::new(dir.path()).expect("open workspace");

    let context = cartograph.analyze().expect("analyze");
    let stats = context.graph.stats();

    assert_eq!(stats.files, 3);
    assert_eq!(stats.folders, 1);
    assert_eq!(stats.functions, 4);
    assert_eq!(stats.defines, 4);
    assert_eq!(stats.calls, 3);
    assert_eq!(stats.imports, 2);
    assert_eq!(context.report.calls_unresolved, 1);
    assert_eq!(context.report.imports_dropped, 1);
    assert_eq!(context.report.missing, [CollaboratorKind::History]);
}

#[test]
fn missing_structure_is_the_only_hard_failure() {
    let dir = workspace();
    fs::remove_file(dir.path().join(".cartograph/findings/structure.json")).expect("remove");

    let result = Cartograph::new(dir.path()).expect("open workspace").analyze();

    assert!(matches!(
        result,
        Err(Error::NoWorkspace(CollaboratorKind::Structure))
    ));
}

#[test]
fn malformed_finding_degrades_to_absent() {
    let dir = workspace();
    fs::write(
        dir.path().join(".cartograph/findings/extraction.json"),
        "not json at all",
    )
    .expect("overwrite");

    let context = Cartograph::new(dir.path())
        .expect("open workspace")
        .analyze()
        .expect("analyze");

    assert_eq!(context.graph.stats().functions, 0);
    assert_eq!(context.graph.stats().imports, 2);
}

#[test]
fn session_answers_questions_end_to_end() {
    let dir = workspace();
    let session = Cartograph::new(dir.path())
        .expect("open workspace")
        .session()
        .expect("session");

    let usage = session.run_query("who calls computeTotal?");
    assert_eq!(usage.intent, "USAGE");
    assert_eq!(usage.functions, ["/ws/src/cart.ts::checkout"]);

    let deps = session.run_query("dependencies of cart.ts");
    assert_eq!(deps.files, ["/ws/src/tax.ts"]);

    let risks = session.run_query("risks in tax.ts");
    assert_eq!(risks.metadata["riskCount"], 2);
    assert_eq!(risks.metadata["risks"][0]["severity"], "critical");

    let blast = session.run_query("what breaks if I change addTax");
    assert_eq!(blast.intent, "blast_radius");
    assert_eq!(
        blast.functions,
        [
            "/ws/src/cart.ts::computeTotal",
            "/ws/src/cart.ts::checkout",
            "/ws/src/app.ts::main"
        ]
    );
    assert_eq!(blast.metadata["depth"], 3);
}

#[test]
fn result_json_uses_camel_case() {
    let dir = workspace();
    let session = Cartograph::new(dir.path())
        .expect("open workspace")
        .session()
        .expect("session");

    let value = serde_json::to_value(session.run_query("history of ghost.ts")).expect("serialize");

    assert_eq!(value["intent"], "HISTORY");
    assert_eq!(value["files"], json!([]));
    assert_eq!(value["metadata"]["error"], "file not found: ghost.ts");
    assert!(value.get("contextPreview").is_none());
}

#[test]
fn snapshot_lands_in_configured_directory() {
    let dir = workspace();
    let cartograph = Cartograph::new(dir.path()).expect("open workspace");
    let context = cartograph.analyze().expect("analyze");

    let path = cartograph.write_snapshot(&context).expect("snapshot");

    assert!(path.starts_with(dir.path().join(".cartograph/snapshots")));
    let value: Value =
        serde_json::from_str(&fs::read_to_string(&path).expect("read snapshot")).expect("json");
    assert_eq!(value["nodes"].as_array().map(Vec::len), Some(8));
    assert_eq!(value["links"].as_array().map(Vec::len), Some(9));
}

#[test]
fn config_file_controls_truncation_and_findings_dir() {
    let dir = workspace();
    fs::rename(
        dir.path().join(".cartograph/findings"),
        dir.path().join("facts"),
    )
    .expect("move findings");
    fs::write(
        CartographConfig::path_in(dir.path()),
        "query:\n  max_results: 2\ncollaborators:\n  findings_dir: facts\n",
    )
    .expect("write config");

    let session = Cartograph::new(dir.path())
        .expect("open workspace")
        .session()
        .expect("session");
    let result = session.run_query("most called functions");

    assert_eq!(result.functions.len(), 2);
    assert_eq!(result.metadata["totalFunctions"], 4);
}

#[test]
fn init_keeps_existing_config() {
    let dir = TempDir::new().expect("create temp dir");
    let path = CartographConfig::path_in(dir.path());
    fs::create_dir_all(path.parent().expect("parent")).expect("create dir");
    fs::write(&path, "query:\n  max_results: 7\n").expect("write config");

    Cartograph::init(dir.path()).expect("init");

    let cartograph = Cartograph::new(dir.path()).expect("open workspace");
    assert_eq!(cartograph.config().query.max_results, 7);
    assert!(dir.path().join(".cartograph/findings").is_dir());
}
