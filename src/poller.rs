// Poll controller: keeps one task/event list fresh.
// One actor task per list owns the in-flight fetch and the single follow-up timer;
// callers talk to it through a command channel and read state from a watch channel.

use std::path::PathBuf;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::models::{TaskResult, Tracked, parse_task_list};

/// Follow-up delay while any task in the list is running.
pub const TASK_REFRESH_DELAY: Duration = Duration::from_millis(3000);
/// Follow-up delay while live mode is on.
pub const LIVE_REFRESH_DELAY: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("backend request failed: {0}")]
    Backend(String),
    #[error("failed to decode response: {0}")]
    Decode(String),
}

#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("poll controller has shut down")]
    Closed,
}

/// Source of one list. The controller drops the fetch future as soon as `cancel`
/// fires; implementations that hand work to other tasks should stop it too.
pub trait Fetcher: Send + Sync + 'static {
    type Item: Tracked + Clone + Send + Sync + 'static;

    fn fetch(
        &self,
        cancel: CancellationToken,
    ) -> BoxFuture<'_, Result<Vec<Self::Item>, FetchError>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollPhase {
    Idle,
    Fetching,
    Settled,
    Cancelled,
    Errored,
}

/// What the list UI renders.
#[derive(Debug, Clone)]
pub struct ListState<T> {
    pub items: Vec<T>,
    pub phase: PollPhase,
    pub is_loading: bool,
    pub is_live: bool,
    /// Last fetch error; cleared by the next successful fetch.
    pub error: Option<FetchError>,
    /// Fetches issued so far.
    pub fetches: u64,
    /// Fetches whose result was applied.
    pub settled: u64,
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            phase: PollPhase::Idle,
            is_loading: false,
            is_live: false,
            error: None,
            fetches: 0,
            settled: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub refresh_delay: Duration,
    pub live_delay: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            refresh_delay: TASK_REFRESH_DELAY,
            live_delay: LIVE_REFRESH_DELAY,
        }
    }
}

#[derive(Debug)]
enum Command {
    Refresh,
    SetLive(bool),
}

/// Sent only by fetches that ran to completion; a cancelled fetch sends nothing.
struct Completion<T> {
    generation: u64,
    result: Result<Vec<T>, FetchError>,
}

struct InFlight {
    generation: u64,
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// Caller side of a running controller. Dropping it tears the controller down.
pub struct PollHandle<T> {
    cmd_tx: mpsc::UnboundedSender<Command>,
    state_rx: watch::Receiver<ListState<T>>,
    join: JoinHandle<()>,
}

impl<T: Clone> PollHandle<T> {
    /// Cancels any in-flight fetch and starts a new one; supersedes a pending
    /// automatic refresh.
    pub fn refresh(&self) -> Result<(), PollError> {
        self.cmd_tx
            .send(Command::Refresh)
            .map_err(|_| PollError::Closed)
    }

    /// Live mode refreshes every `live_delay` after each successful fetch.
    /// Turning it on refreshes immediately; turning it off clears the pending timer.
    pub fn set_live(&self, on: bool) -> Result<(), PollError> {
        self.cmd_tx
            .send(Command::SetLive(on))
            .map_err(|_| PollError::Closed)
    }

    pub fn state(&self) -> ListState<T> {
        self.state_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ListState<T>> {
        self.state_rx.clone()
    }

    /// Cancels the timer and the in-flight fetch, then waits for the controller to exit.
    pub async fn shutdown(self) {
        let Self { cmd_tx, join, .. } = self;
        drop(cmd_tx);
        if let Err(e) = join.await {
            tracing::warn!(error = %e, "poll controller task failed");
        }
    }
}

/// Spawns the controller for one list and issues the initial fetch.
pub fn spawn<F: Fetcher>(fetcher: F, config: PollConfig) -> PollHandle<F::Item> {
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (state_tx, state_rx) = watch::channel(ListState::default());
    let join = tokio::spawn(run(Arc::new(fetcher), config, cmd_rx, state_tx));
    PollHandle {
        cmd_tx,
        state_rx,
        join,
    }
}

struct Controller<F: Fetcher> {
    fetcher: Arc<F>,
    config: PollConfig,
    live: bool,
    generation: u64,
    in_flight: Option<InFlight>,
    done_tx: mpsc::UnboundedSender<Completion<F::Item>>,
    state_tx: watch::Sender<ListState<F::Item>>,
}

async fn run<F: Fetcher>(
    fetcher: Arc<F>,
    config: PollConfig,
    mut cmd_rx: mpsc::UnboundedReceiver<Command>,
    state_tx: watch::Sender<ListState<F::Item>>,
) {
    let (done_tx, mut done_rx) = mpsc::unbounded_channel();
    let mut ctl = Controller {
        fetcher,
        config,
        live: false,
        generation: 0,
        in_flight: None,
        done_tx,
        state_tx,
    };

    // Single follow-up timer; re-arming replaces the previous deadline.
    let timer = tokio::time::sleep(Duration::ZERO);
    tokio::pin!(timer);
    let mut armed = false;

    ctl.refresh();

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => match cmd {
                Some(Command::Refresh) => {
                    armed = false;
                    ctl.refresh();
                }
                Some(Command::SetLive(on)) => {
                    armed = false;
                    ctl.set_live(on);
                }
                None => break,
            },
            Some(done) = done_rx.recv() => {
                if let Some(delay) = ctl.settle(done) {
                    timer.as_mut().reset(Instant::now() + delay);
                    armed = true;
                }
            }
            () = &mut timer, if armed => {
                armed = false;
                tracing::debug!(operation = "poll", "follow-up refresh");
                ctl.refresh();
            }
        }
    }

    ctl.teardown();
    tracing::debug!("Poll controller shutting down");
}

impl<F: Fetcher> Controller<F> {
    fn refresh(&mut self) {
        self.cancel_in_flight();
        self.generation += 1;
        let generation = self.generation;
        let token = CancellationToken::new();
        let fetcher = self.fetcher.clone();
        let done_tx = self.done_tx.clone();
        let fetch_token = token.clone();

        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = fetch_token.cancelled() => {}
                result = fetcher.fetch(fetch_token.clone()) => {
                    let _ = done_tx.send(Completion { generation, result });
                }
            }
        });

        self.in_flight = Some(InFlight {
            generation,
            token,
            handle,
        });
        self.state_tx.send_modify(|s| {
            s.phase = PollPhase::Fetching;
            s.is_loading = true;
            s.fetches += 1;
        });
        tracing::debug!(operation = "poll", generation, "fetch issued");
    }

    fn set_live(&mut self, on: bool) {
        self.live = on;
        self.state_tx.send_modify(|s| s.is_live = on);
        if on {
            self.refresh();
        }
    }

    fn cancel_in_flight(&mut self) {
        if let Some(prev) = self.in_flight.take() {
            prev.token.cancel();
            tracing::debug!(
                operation = "poll",
                generation = prev.generation,
                "superseded in-flight fetch"
            );
        }
    }

    /// Applies a completed fetch; returns the follow-up delay, if any.
    fn settle(&mut self, done: Completion<F::Item>) -> Option<Duration> {
        if done.generation != self.generation {
            tracing::debug!(
                operation = "poll",
                generation = done.generation,
                "discarding superseded fetch result"
            );
            return None;
        }
        self.in_flight = None;

        match done.result {
            Ok(items) => {
                let running = items.iter().any(Tracked::is_running);
                let count = items.len();
                self.state_tx.send_modify(|s| {
                    s.items = items;
                    s.phase = PollPhase::Settled;
                    s.is_loading = false;
                    s.error = None;
                    s.settled += 1;
                });
                tracing::debug!(operation = "poll", items = count, running, "fetch settled");
                if self.live {
                    Some(self.config.live_delay)
                } else if running {
                    Some(self.config.refresh_delay)
                } else {
                    None
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, operation = "poll", "fetch failed");
                self.state_tx.send_modify(|s| {
                    s.phase = PollPhase::Errored;
                    s.is_loading = false;
                    s.error = Some(e);
                });
                None
            }
        }
    }

    fn teardown(&mut self) {
        if let Some(prev) = self.in_flight.take() {
            prev.token.cancel();
            prev.handle.abort();
            self.state_tx.send_modify(|s| {
                s.phase = PollPhase::Cancelled;
                s.is_loading = false;
            });
        }
    }
}

/// Reads a task listing from a JSON file on every fetch.
#[derive(Debug, Clone)]
pub struct TaskFileFetcher {
    path: PathBuf,
}

impl TaskFileFetcher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Fetcher for TaskFileFetcher {
    type Item = TaskResult;

    fn fetch(
        &self,
        _cancel: CancellationToken,
    ) -> BoxFuture<'_, Result<Vec<TaskResult>, FetchError>> {
        Box::pin(async move {
            let bytes = tokio::fs::read(&self.path)
                .await
                .map_err(|e| FetchError::Backend(format!("{}: {e}", self.path.display())))?;
            if bytes.iter().all(u8::is_ascii_whitespace) {
                return Ok(Vec::new());
            }
            let value: serde_json::Value =
                serde_json::from_slice(&bytes).map_err(|e| FetchError::Decode(e.to_string()))?;
            Ok(parse_task_list(&value))
        })
    }
}
