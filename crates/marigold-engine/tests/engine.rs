//! End-to-end tests for marigold-engine against a filesystem object store.

use std::path::Path;
use std::sync::Arc;

use marigold_engine::{
  ArtifactValue, Artifacts, Capabilities, ChannelSink, Engine, EngineConfig, EngineError,
  ErrorClass, ErrorReport, FailureClass, FsObjectStore, Manifest, ObjectStore, ProjectDef, RunOutcome,
  StepMetadata, TriggerDef, WorkflowDef,
};
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

struct Harness {
  temp: tempfile::TempDir,
  engine: Engine,
  store: Arc<FsObjectStore>,
  reports: mpsc::UnboundedReceiver<ErrorReport>,
}

impl Harness {
  fn new() -> Self {
    let temp = tempfile::tempdir().expect("failed to create temp dir");
    let store = Arc::new(FsObjectStore::new(temp.path().join("store")));
    let (tx, reports) = mpsc::unbounded_channel();
    let capabilities = Capabilities::new(store.clone(), Arc::new(ChannelSink::new(tx)));

    Self {
      engine: Engine::new(capabilities, EngineConfig::default()),
      temp,
      store,
      reports,
    }
  }

  /// A source directory holding two files.
  fn source_dir(&self) -> String {
    let dir = self.temp.path().join("data");
    std::fs::create_dir_all(dir.join("logs")).unwrap();
    std::fs::write(dir.join("config.json"), "{}").unwrap();
    std::fs::write(dir.join("logs/app.txt"), "started").unwrap();
    dir.display().to_string()
  }

  fn path(&self, relative: &str) -> String {
    self.temp.path().join(relative).display().to_string()
  }
}

fn project(value: Value) -> ProjectDef {
  serde_json::from_value(value).unwrap()
}

fn workflow(value: Value) -> WorkflowDef {
  serde_json::from_value(value).unwrap()
}

fn trigger(value: Value) -> TriggerDef {
  serde_json::from_value(value).unwrap()
}

fn input(directory: &str) -> Artifacts {
  Artifacts::from([(
    "directory".to_string(),
    ArtifactValue::Text(directory.to_string()),
  )])
}

fn bucket(name: &str) -> Value {
  json!({ "type": "object-store:bucket", "properties": { "name": name, "region": "us-east-1" } })
}

/// read -> zip -> upload, with the archive uploaded to `bucket`.
fn backup_workflow(id: &str, archive: &str, bucket: &str) -> WorkflowDef {
  workflow(json!({
    "id": id,
    "name": "Nightly backup",
    "entry": "read",
    "variables": [{ "name": "directory", "type": "string" }],
    "steps": [
      { "id": "read", "type": "ReadFile", "next": "zip" },
      {
        "id": "zip", "type": "ZipFile", "next": "upload",
        "parameters": { "files": "{{ read }}", "archive": archive }
      },
      {
        "id": "upload", "type": "S3:PutObject",
        "parameters": { "bucket": bucket, "files": "{{ read }}", "region": "us-east-1" }
      }
    ]
  }))
}

#[tokio::test]
async fn test_register_project_overwrites() {
  let h = Harness::new();
  h.engine
    .register_project(project(json!({ "id": "P", "name": "first", "resources": [] })))
    .await
    .unwrap();
  h.engine
    .register_project(project(json!({ "id": "P", "name": "latest", "resources": [bucket("b")] })))
    .await
    .unwrap();

  let projects = h.engine.list_projects().await.unwrap();
  assert_eq!(projects.len(), 1);
  assert_eq!(projects[0].name, "latest");
  assert_eq!(projects[0].resources.len(), 1);
}

#[tokio::test]
async fn test_register_project_requires_name() {
  let h = Harness::new();
  let err = h
    .engine
    .register_project(project(json!({ "id": "P" })))
    .await
    .unwrap_err();

  assert_eq!(err.class(), ErrorClass::Unprocessable);
  assert_eq!(err.public_message(), "unprocessable input");
}

#[tokio::test]
async fn test_provision_skips_unknown_resource_types() {
  let h = Harness::new();
  h.engine
    .register_project(project(json!({
      "id": "P",
      "name": "backups",
      "resources": [
        { "type": "queue:fifo", "properties": { "name": "jobs" } },
        bucket("archive"),
      ]
    })))
    .await
    .unwrap();

  let provisioned = h.engine.provision_resources("P").await.unwrap();

  assert_eq!(provisioned.len(), 1);
  assert_eq!(provisioned[0].name, "archive");
  assert!(provisioned[0].created);
  assert!(h.store.bucket_exists("archive").await.unwrap());
}

#[tokio::test]
async fn test_provision_is_create_if_absent() {
  let h = Harness::new();
  h.engine
    .register_project(project(json!({
      "id": "P",
      "name": "legacy",
      "resources": [{ "type": "S3:Bucket", "properties": { "BucketName": "archive", "Region": "eu-west-1" } }]
    })))
    .await
    .unwrap();

  let first = h.engine.provision_resources("P").await.unwrap();
  let second = h.engine.provision_resources("P").await.unwrap();

  assert!(first[0].created);
  assert!(!second[0].created);
}

#[tokio::test]
async fn test_provision_failure_keeps_earlier_resources() {
  let h = Harness::new();
  h.engine
    .register_project(project(json!({
      "id": "P",
      "name": "partial",
      "resources": [
        bucket("first"),
        { "type": "object-store:bucket", "properties": { "name": "second" } },
        bucket("third"),
      ]
    })))
    .await
    .unwrap();

  let err = h.engine.provision_resources("P").await.unwrap_err();

  assert!(matches!(err, EngineError::Provisioning(_)));
  assert_eq!(err.class(), ErrorClass::RequestFailed);
  assert!(h.store.bucket_exists("first").await.unwrap());
  assert!(!h.store.bucket_exists("third").await.unwrap());
}

#[tokio::test]
async fn test_provision_unknown_project() {
  let h = Harness::new();
  let err = h.engine.provision_resources("missing").await.unwrap_err();
  assert!(matches!(err, EngineError::NotFound { kind: "project", .. }));
}

#[tokio::test]
async fn test_provision_then_run_backup() {
  let h = Harness::new();
  let source = h.source_dir();
  let archive = h.path("out/backup.tar.gz");
  h.engine
    .register_project(project(json!({ "id": "P", "name": "backups", "resources": [bucket("backups")] })))
    .await
    .unwrap();
  h.engine.provision_resources("P").await.unwrap();
  h.engine
    .register_workflow(backup_workflow("nightly", &archive, "backups"))
    .await
    .unwrap();

  let result = h
    .engine
    .run_workflow("nightly", input(&source), CancellationToken::new())
    .await
    .unwrap();

  assert_eq!(result.outcome, RunOutcome::Succeeded);
  assert_eq!(result.executed_steps, vec!["read", "zip", "upload"]);
  assert_eq!(
    result.artifacts.get("zip"),
    Some(&ArtifactValue::Text(archive.clone()))
  );
  assert!(Path::new(&archive).exists());

  let uploaded = Path::new(&source).join("config.json").display().to_string();
  let mut stream = h.store.get_object("backups", &uploaded).await.unwrap();
  let mut body = Vec::new();
  while let Some(chunk) = futures::StreamExt::next(&mut stream).await {
    body.extend_from_slice(&chunk.unwrap());
  }
  assert_eq!(body, b"{}");
}

#[tokio::test]
async fn test_failure_at_middle_step_keeps_partial_artifacts() {
  let h = Harness::new();
  let source = h.source_dir();
  h.engine
    .register_workflow(workflow(json!({
      "id": "abc",
      "name": "A then B then C",
      "entry": "A",
      "variables": [{ "name": "directory", "type": "string" }],
      "steps": [
        { "id": "A", "type": "read_directory", "next": "B" },
        {
          "id": "B", "type": "put_to_store", "next": "C",
          "parameters": { "bucket": "never-provisioned", "files": "{{ A }}" }
        },
        {
          "id": "C", "type": "archive_files",
          "parameters": { "files": "{{ A }}", "archive": h.path("c.tar.gz") }
        }
      ]
    })))
    .await
    .unwrap();

  let result = h
    .engine
    .run_workflow("abc", input(&source), CancellationToken::new())
    .await
    .unwrap();

  match &result.outcome {
    RunOutcome::Failed { step_id, cause } => {
      assert_eq!(step_id, "B");
      assert_eq!(cause.class, FailureClass::Business);
      assert!(cause.message.contains("never-provisioned"));
    }
    other => panic!("expected failure at B, got {:?}", other),
  }
  assert_eq!(result.last_step_id.as_deref(), Some("B"));
  let mut keys: Vec<&str> = result.artifacts.keys().map(String::as_str).collect();
  keys.sort();
  assert_eq!(keys, vec!["A", "directory"]);
}

#[tokio::test]
async fn test_self_cycle_rejected_at_registration() {
  let h = Harness::new();
  let err = h
    .engine
    .register_workflow(workflow(json!({
      "id": "loop",
      "name": "loop",
      "entry": "X",
      "steps": [{
        "id": "X", "type": "read_directory", "next": "X",
        "parameters": { "directory": "/tmp" }
      }]
    })))
    .await
    .unwrap_err();

  assert!(matches!(err, EngineError::Validation { .. }));
  assert!(err.to_string().contains("cycle"));
  assert!(h.engine.list_workflows().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_entry_and_unknown_type_are_rejected() {
  let h = Harness::new();
  let no_entry = h
    .engine
    .register_workflow(workflow(json!({
      "id": "w", "name": "w",
      "steps": [{ "id": "s", "type": "handle_error" }]
    })))
    .await
    .unwrap_err();
  assert!(matches!(no_entry, EngineError::Validation { .. }));

  let unknown = h
    .engine
    .register_workflow(workflow(json!({
      "id": "w", "name": "w", "entry": "s",
      "steps": [{ "id": "s", "type": "send_email" }]
    })))
    .await
    .unwrap_err();
  assert!(matches!(unknown, EngineError::Validation { .. }));
}

#[tokio::test]
async fn test_error_route_to_handler_succeeds() {
  let mut h = Harness::new();
  let config_file = format!("{}/config.json", h.source_dir());
  h.engine
    .register_workflow(workflow(json!({
      "id": "guarded",
      "name": "guarded upload",
      "entry": "A",
      "variables": [{ "name": "files", "type": "list", "default": [config_file] }],
      "steps": [
        {
          "id": "A", "type": "put_to_store", "on_error": "H",
          "parameters": { "bucket": "never-provisioned" }
        },
        { "id": "H", "type": "HandleError" }
      ]
    })))
    .await
    .unwrap();

  let result = h
    .engine
    .run_workflow("guarded", Artifacts::new(), CancellationToken::new())
    .await
    .unwrap();

  assert_eq!(result.outcome, RunOutcome::Succeeded);
  assert_eq!(result.last_step_id.as_deref(), Some("H"));
  assert_eq!(result.executed_steps, vec!["A", "H"]);

  let report = h.reports.try_recv().unwrap();
  assert_eq!(report.workflow_id, "guarded");
  assert_eq!(report.failed_step_id, "A");
  assert_eq!(report.execution_id, result.execution_id);
}

#[tokio::test]
async fn test_metadata_round_trips_through_list() {
  let h = Harness::new();
  let def = workflow(json!({
    "id": "ordered",
    "name": "declared out of order",
    "entry": "read",
    "variables": [{ "name": "directory", "type": "string" }],
    "steps": [
      { "id": "notify", "type": "handle_error" },
      {
        "id": "upload", "type": "put_to_store", "on_error": "notify",
        "parameters": { "bucket": "b", "files": "{{ read }}" }
      },
      { "id": "read", "type": "read_directory", "next": "upload" }
    ]
  }));

  let registered = h.engine.register_workflow(def.clone()).await.unwrap();
  let listed = h.engine.list_workflows().await.unwrap();
  assert_eq!(listed, vec![def.clone()]);

  assert_eq!(registered.len(), def.steps.len());
  for step in &listed[0].steps {
    let metadata: &StepMetadata = &registered[&step.id];
    assert_eq!(metadata.next, step.next);
    assert_eq!(metadata.on_error, step.on_error);
  }
  assert_eq!(
    serde_json::to_value(&registered["read"]).unwrap(),
    json!({ "type": "read_directory", "next": "upload" })
  );
}

#[tokio::test]
async fn test_inactive_workflow_is_not_run() {
  let h = Harness::new();
  let mut def = backup_workflow("paused", &h.path("a.tar.gz"), "backups");
  def.status = marigold_engine::Status::Inactive;
  h.engine.register_workflow(def).await.unwrap();

  let err = h
    .engine
    .run_workflow("paused", input("/tmp"), CancellationToken::new())
    .await
    .unwrap_err();
  assert!(matches!(err, EngineError::Validation { .. }));

  let err = h
    .engine
    .run_workflow("absent", input("/tmp"), CancellationToken::new())
    .await
    .unwrap_err();
  assert!(matches!(err, EngineError::NotFound { kind: "workflow", .. }));
}

#[tokio::test]
async fn test_fire_trigger_runs_with_trigger_input() {
  let h = Harness::new();
  let source = h.source_dir();
  h.store.create_bucket("backups", "us-east-1").await.unwrap();
  h.engine
    .register_trigger(trigger(json!({
      "id": "nightly-2am",
      "name": "nightly",
      "type": "scheduled",
      "config": { "cron": "0 2 * * *" },
      "workflow_id": "nightly",
      "input": { "directory": source }
    })))
    .await
    .unwrap();
  h.engine
    .register_workflow(backup_workflow("nightly", &h.path("out/b.tar.gz"), "backups"))
    .await
    .unwrap();

  let result = h
    .engine
    .fire_trigger("nightly-2am", CancellationToken::new())
    .await
    .unwrap();
  assert_eq!(result.outcome, RunOutcome::Succeeded);
  assert_eq!(result.workflow_id, "nightly");
  assert_eq!(h.engine.list_triggers().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_fire_trigger_errors() {
  let h = Harness::new();
  h.engine
    .register_trigger(trigger(json!({
      "id": "orphan", "name": "orphan", "type": "manual", "workflow_id": "not-declared"
    })))
    .await
    .unwrap();
  h.engine
    .register_trigger(trigger(json!({
      "id": "off", "name": "off", "type": "webhook", "workflow_id": "not-declared",
      "status": "deactive"
    })))
    .await
    .unwrap();

  let err = h
    .engine
    .fire_trigger("orphan", CancellationToken::new())
    .await
    .unwrap_err();
  assert!(matches!(err, EngineError::NotFound { kind: "workflow", .. }));

  let err = h
    .engine
    .fire_trigger("off", CancellationToken::new())
    .await
    .unwrap_err();
  assert!(matches!(err, EngineError::Validation { .. }));
}

#[tokio::test]
async fn test_concurrent_runs_are_independent() {
  let h = Harness::new();
  let source = h.source_dir();
  h.store.create_bucket("backups", "us-east-1").await.unwrap();
  h.engine
    .register_workflow(backup_workflow("one", &h.path("one.tar.gz"), "backups"))
    .await
    .unwrap();
  h.engine
    .register_workflow(backup_workflow("two", &h.path("two.tar.gz"), "missing"))
    .await
    .unwrap();

  let (one, two) = tokio::join!(
    h.engine
      .run_workflow("one", input(&source), CancellationToken::new()),
    h.engine
      .run_workflow("two", input(&source), CancellationToken::new()),
  );
  let (one, two) = (one.unwrap(), two.unwrap());

  assert_eq!(one.outcome, RunOutcome::Succeeded);
  assert!(matches!(two.outcome, RunOutcome::Failed { ref step_id, .. } if step_id == "upload"));
  assert_ne!(one.execution_id, two.execution_id);
}

#[tokio::test]
async fn test_bad_run_input_is_unprocessable() {
  let h = Harness::new();
  h.engine
    .register_workflow(backup_workflow("nightly", &h.path("a.tar.gz"), "backups"))
    .await
    .unwrap();

  let wrong_type = Artifacts::from([(
    "directory".to_string(),
    ArtifactValue::List(vec!["/tmp".to_string()]),
  )]);
  let err = h
    .engine
    .run_workflow("nightly", wrong_type, CancellationToken::new())
    .await
    .unwrap_err();
  assert_eq!(err.class(), ErrorClass::Unprocessable);
}

#[tokio::test]
async fn test_demo_manifest_registers() {
  let h = Harness::new();
  let manifest = Manifest::from_json(include_str!("../../../demos/backup.json")).unwrap();

  for project in manifest.projects {
    h.engine.register_project(project).await.unwrap();
  }
  for workflow in manifest.workflows {
    let metadata = h.engine.register_workflow(workflow).await.unwrap();
    assert_eq!(metadata["upload"].on_error.as_deref(), Some("report"));
  }
  for trigger in manifest.triggers {
    h.engine.register_trigger(trigger).await.unwrap();
  }

  let provisioned = h.engine.provision_resources("backups").await.unwrap();
  assert_eq!(provisioned.len(), 1);
  assert_eq!(h.engine.list_triggers().await.unwrap()[0].workflow_id, "nightly");
}
