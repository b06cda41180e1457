use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use marigold_engine::{
  Capabilities, Engine, EngineConfig, EngineError, FsObjectStore, Manifest, RunResult,
  TracingSink, artifacts_from_json,
};

/// Marigold - declare projects and workflows, provision the former, run the latter
#[derive(Parser)]
#[command(name = "marigold")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the data directory (default: ~/.marigold)
  #[arg(long, global = true)]
  data_dir: Option<PathBuf>,

  /// Deadline for each workflow step, in milliseconds
  #[arg(long, global = true, env = "MARIGOLD_STEP_TIMEOUT_MS")]
  step_timeout_ms: Option<u64>,

  /// Deadline for each resource provisioning call, in milliseconds
  #[arg(
    long,
    global = true,
    env = "MARIGOLD_PROVISION_TIMEOUT_MS",
    default_value_t = 30_000
  )]
  provision_timeout_ms: u64,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Register a manifest and print each workflow's step metadata
  Validate {
    /// Path to the manifest file (JSON)
    manifest: PathBuf,
  },

  /// Provision the resources of one project
  Provision {
    manifest: PathBuf,

    /// The project ID to provision
    #[arg(long)]
    project: String,
  },

  /// Run a workflow with the payload read from stdin
  Run {
    manifest: PathBuf,

    /// The workflow ID to run
    #[arg(long)]
    workflow: String,

    /// Provision every project in the manifest first
    #[arg(long)]
    provision_all: bool,
  },

  /// Run a trigger's workflow with the trigger's input
  Fire {
    manifest: PathBuf,

    /// The trigger ID to fire
    #[arg(long)]
    trigger: String,
  },
}

fn main() -> Result<ExitCode> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("marigold=info,warn")),
    )
    .with_target(false)
    .with_writer(io::stderr)
    .init();

  let cli = Cli::parse();

  let data_dir = match cli.data_dir {
    Some(dir) => dir,
    None => dirs::home_dir()
      .context("could not determine home directory")?
      .join(".marigold"),
  };

  let Some(command) = cli.command else {
    println!("marigold - use --help to see available commands");
    return Ok(ExitCode::SUCCESS);
  };

  let config = EngineConfig {
    step_timeout: cli.step_timeout_ms.map(Duration::from_millis),
    provision_timeout: Duration::from_millis(cli.provision_timeout_ms),
  };

  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async { dispatch(command, &data_dir, config).await })
}

async fn dispatch(command: Commands, data_dir: &Path, config: EngineConfig) -> Result<ExitCode> {
  let engine = build_engine(data_dir, config);

  match command {
    Commands::Validate { manifest } => {
      let metadata = register_manifest(&engine, load_manifest(&manifest).await?).await?;
      eprintln!("Validated {} workflow(s)", metadata.len());
      println!("{}", serde_json::to_string_pretty(&metadata)?);
      Ok(ExitCode::SUCCESS)
    }

    Commands::Provision { manifest, project } => {
      register_manifest(&engine, load_manifest(&manifest).await?).await?;
      let provisioned = engine.provision_resources(&project).await.map_err(public)?;
      println!("{}", serde_json::to_string_pretty(&provisioned)?);
      Ok(ExitCode::SUCCESS)
    }

    Commands::Run {
      manifest,
      workflow,
      provision_all,
    } => {
      let manifest = load_manifest(&manifest).await?;
      let project_ids: Vec<String> = manifest.projects.iter().map(|p| p.id.clone()).collect();
      register_manifest(&engine, manifest).await?;
      if provision_all {
        for project_id in &project_ids {
          engine.provision_resources(project_id).await.map_err(public)?;
        }
      }

      let payload = read_payload_from_stdin()?;
      let payload = payload
        .as_object()
        .context("payload must be a JSON object")?;
      let input = artifacts_from_json(payload).map_err(|e| public(e.into()))?;

      let result = engine
        .run_workflow(&workflow, input, cancel_on_ctrl_c())
        .await
        .map_err(public)?;
      report(&result)
    }

    Commands::Fire { manifest, trigger } => {
      register_manifest(&engine, load_manifest(&manifest).await?).await?;
      let result = engine
        .fire_trigger(&trigger, cancel_on_ctrl_c())
        .await
        .map_err(public)?;
      report(&result)
    }
  }
}

fn build_engine(data_dir: &Path, config: EngineConfig) -> Engine {
  let store = FsObjectStore::new(data_dir.join("store"));
  let capabilities = Capabilities::new(Arc::new(store), Arc::new(TracingSink));
  Engine::new(capabilities, config)
}

async fn load_manifest(path: &Path) -> Result<Manifest> {
  let content = tokio::fs::read_to_string(path)
    .await
    .with_context(|| format!("failed to read manifest file: {}", path.display()))?;

  Manifest::from_json(&content)
    .with_context(|| format!("failed to parse manifest file: {}", path.display()))
}

/// Register everything a manifest declares. Returns each workflow's step
/// metadata keyed by workflow id.
async fn register_manifest(
  engine: &Engine,
  manifest: Manifest,
) -> Result<serde_json::Map<String, serde_json::Value>> {
  for project in manifest.projects {
    engine.register_project(project).await.map_err(public)?;
  }

  let mut metadata = serde_json::Map::new();
  for workflow in manifest.workflows {
    let workflow_id = workflow.id.clone();
    let steps = engine.register_workflow(workflow).await.map_err(public)?;
    metadata.insert(workflow_id, serde_json::to_value(steps)?);
  }

  for trigger in manifest.triggers {
    engine.register_trigger(trigger).await.map_err(public)?;
  }
  Ok(metadata)
}

/// Print the run result; the exit code reflects the outcome.
fn report(result: &RunResult) -> Result<ExitCode> {
  println!("{}", serde_json::to_string_pretty(result)?);

  if result.outcome.is_success() {
    info!(execution_id = %result.execution_id, "run succeeded");
    Ok(ExitCode::SUCCESS)
  } else {
    eprintln!("Run {} did not succeed", result.execution_id);
    Ok(ExitCode::FAILURE)
  }
}

/// Log the internal cause and surface only the caller-facing message.
fn public(err: EngineError) -> anyhow::Error {
  error!(error = %err, retryable = err.is_retryable(), "request failed");
  anyhow!(err.public_message())
}

fn cancel_on_ctrl_c() -> CancellationToken {
  let cancel = CancellationToken::new();
  let token = cancel.clone();
  tokio::spawn(async move {
    if tokio::signal::ctrl_c().await.is_ok() {
      warn!("interrupt received, stopping after the current step");
      token.cancel();
    }
  });
  cancel
}

fn read_payload_from_stdin() -> Result<serde_json::Value> {
  use std::io::IsTerminal;

  if io::stdin().is_terminal() {
    // No stdin pipe, use empty object
    return Ok(serde_json::json!({}));
  }

  let mut input = String::new();
  io::stdin()
    .read_to_string(&mut input)
    .context("failed to read payload from stdin")?;

  if input.trim().is_empty() {
    Ok(serde_json::json!({}))
  } else {
    serde_json::from_str(&input).context("failed to parse payload JSON from stdin")
  }
}
