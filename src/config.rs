use std::time::Duration;

use serde::Deserialize;

use crate::poller::PollConfig;
use crate::topology::TopologyOptions;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub topology: TopologyConfig,
    #[serde(default)]
    pub input: InputConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollingConfig {
    /// Follow-up delay while any task is running.
    #[serde(default = "default_task_refresh_ms")]
    pub task_refresh_ms: u64,
    /// Follow-up delay while live mode is on.
    #[serde(default = "default_live_refresh_ms")]
    pub live_refresh_ms: u64,
}

fn default_task_refresh_ms() -> u64 {
    3000
}

fn default_live_refresh_ms() -> u64 {
    2000
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            task_refresh_ms: default_task_refresh_ms(),
            live_refresh_ms: default_live_refresh_ms(),
        }
    }
}

impl PollingConfig {
    pub fn poll_config(&self) -> PollConfig {
        PollConfig {
            refresh_delay: Duration::from_millis(self.task_refresh_ms),
            live_delay: Duration::from_millis(self.live_refresh_ms),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopologyConfig {
    /// Spread radius of expanded group members around the group anchor.
    #[serde(default = "default_expand_offset")]
    pub expand_offset: f64,
    #[serde(default = "default_drop_self_loops")]
    pub drop_self_loops: bool,
}

fn default_expand_offset() -> f64 {
    crate::topology::graph::DEFAULT_EXPAND_OFFSET
}

fn default_drop_self_loops() -> bool {
    true
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            expand_offset: default_expand_offset(),
            drop_self_loops: default_drop_self_loops(),
        }
    }
}

impl TopologyConfig {
    pub fn options(&self) -> TopologyOptions {
        TopologyOptions {
            expand_offset: self.expand_offset,
            drop_self_loops: self.drop_self_loops,
        }
    }
}

/// Default input files for the binary when no path is given on the command line.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InputConfig {
    pub snapshot_path: Option<String>,
    pub tasks_path: Option<String>,
}

impl AppConfig {
    /// Loads `CONFIG_FILE` (default `config.toml`); a missing default file yields defaults.
    pub fn load() -> anyhow::Result<Self> {
        let explicit = std::env::var("CONFIG_FILE").ok();
        let path = explicit.clone().unwrap_or_else(|| "config.toml".into());
        match std::fs::read_to_string(&path) {
            Ok(s) => Self::load_from_str(&s),
            Err(e) if explicit.is_none() && e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path, "no config file; using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(anyhow::anyhow!("config {}: {}", path, e)),
        }
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.polling.task_refresh_ms > 0,
            "polling.task_refresh_ms must be > 0, got {}",
            self.polling.task_refresh_ms
        );
        anyhow::ensure!(
            self.polling.live_refresh_ms > 0,
            "polling.live_refresh_ms must be > 0, got {}",
            self.polling.live_refresh_ms
        );
        anyhow::ensure!(
            self.topology.expand_offset.is_finite() && self.topology.expand_offset >= 0.0,
            "topology.expand_offset must be a finite value >= 0, got {}",
            self.topology.expand_offset
        );
        Ok(())
    }
}
