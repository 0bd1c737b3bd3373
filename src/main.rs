use anyhow::{Context, Result};
use netdiag::*;
use std::path::Path;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

use netdiag::models::{DiagnosisResultData, PingMeshData, Snapshot, TaskStatus};
use netdiag::poller::{PollPhase, TaskFileFetcher};
use netdiag::topology::ExpansionState;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

const USAGE: &str = "usage:
  netdiag topology [snapshot.json] [expanded-group-key ...]
  netdiag diagnosis <result.json>
  netdiag mesh <pingmesh.json>
  netdiag watch [tasks.json]";

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let app_config = config::AppConfig::load()?;
    tracing::debug!("{}", version::banner());

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (command, rest) = match args.split_first() {
        Some((c, rest)) => (c.as_str(), rest),
        None => anyhow::bail!("{USAGE}"),
    };

    match command {
        "topology" => {
            let (path, keys) = match rest.split_first() {
                Some((p, keys)) => (p.clone(), keys),
                None => (
                    app_config
                        .input
                        .snapshot_path
                        .clone()
                        .context("no snapshot path given and input.snapshot_path unset")?,
                    &[][..],
                ),
            };
            let snapshot: Snapshot = read_json(&path)?;
            let mut expansion = ExpansionState::new();
            for key in keys {
                expansion.expand(key, None);
            }
            let graph =
                topology::build_layout_graph(&snapshot, &expansion, &app_config.topology.options());
            let stats = graph.stats();
            tracing::info!(
                nodes = stats.nodes,
                edges = stats.edges,
                groups = stats.groups,
                namespaces = stats.namespaces,
                "topology built"
            );
            println!("{}", serde_json::to_string_pretty(&graph)?);
        }
        "diagnosis" => {
            let path = rest.first().context(USAGE)?;
            let data: DiagnosisResultData = read_json(path)?;
            let graph = severity::diagnosis_graph(&data);
            tracing::info!(
                nodes = graph.nodes.len(),
                edges = graph.edges.len(),
                severity = ?graph.cluster_severity,
                "diagnosis graph built"
            );
            println!("{}", serde_json::to_string_pretty(&graph)?);
        }
        "mesh" => {
            let path = rest.first().context(USAGE)?;
            let data: PingMeshData = read_json(path)?;
            let mesh = latency::latency_mesh(&data);
            println!("{}", serde_json::to_string_pretty(&mesh)?);
        }
        "watch" => {
            let path = match rest.first() {
                Some(p) => p.clone(),
                None => app_config
                    .input
                    .tasks_path
                    .clone()
                    .context("no tasks path given and input.tasks_path unset")?,
            };
            watch_tasks(&path, &app_config).await?;
        }
        other => anyhow::bail!("unknown command {other:?}\n{USAGE}"),
    }

    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let s = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&s).with_context(|| format!("decoding {}", path.display()))
}

/// Polls the task file until a fetch settles with nothing running, or fails.
async fn watch_tasks(path: &str, app_config: &config::AppConfig) -> Result<()> {
    let handle = poller::spawn(
        TaskFileFetcher::new(path),
        app_config.polling.poll_config(),
    );
    let mut rx = handle.subscribe();

    let outcome = loop {
        if rx.changed().await.is_err() {
            break Err(anyhow::anyhow!("poll controller stopped"));
        }
        let state = rx.borrow_and_update().clone();
        match state.phase {
            PollPhase::Settled => {
                let running = state
                    .items
                    .iter()
                    .filter(|t| t.status == TaskStatus::Running)
                    .count();
                tracing::info!(tasks = state.items.len(), running, "task list refreshed");
                if running == 0 {
                    println!("{}", serde_json::to_string_pretty(&state.items)?);
                    break Ok(());
                }
            }
            PollPhase::Errored => {
                let e = state
                    .error
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "unknown error".into());
                break Err(anyhow::anyhow!("fetching {path}: {e}"));
            }
            _ => {}
        }
    };

    handle.shutdown().await;
    outcome
}
