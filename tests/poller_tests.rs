// Poll controller tests: follow-up scheduling, supersede, errors, live mode, teardown

mod common;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures_util::future::BoxFuture;
use netdiag::models::{TaskResult, TaskStatus};
use netdiag::poller::{
    FetchError, Fetcher, ListState, PollConfig, PollPhase, TaskFileFetcher, spawn,
};
use tokio::sync::watch;
use tokio::time::{Duration, sleep};
use tokio_util::sync::CancellationToken;

type Response = Result<Vec<TaskResult>, FetchError>;

#[derive(Default)]
struct Counters {
    calls: AtomicUsize,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

/// Pops one scripted response per call (empty list once exhausted) after `delay`.
struct ScriptedFetcher {
    responses: Mutex<VecDeque<Response>>,
    delay: Duration,
    counters: Arc<Counters>,
}

impl ScriptedFetcher {
    fn new(responses: Vec<Response>, delay: Duration) -> (Self, Arc<Counters>) {
        let counters = Arc::new(Counters::default());
        (
            Self {
                responses: Mutex::new(responses.into()),
                delay,
                counters: counters.clone(),
            },
            counters,
        )
    }
}

struct ActiveGuard(Arc<Counters>);

impl ActiveGuard {
    fn enter(counters: Arc<Counters>) -> Self {
        let now = counters.active.fetch_add(1, Ordering::SeqCst) + 1;
        counters.max_active.fetch_max(now, Ordering::SeqCst);
        Self(counters)
    }
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.active.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Fetcher for ScriptedFetcher {
    type Item = TaskResult;

    fn fetch(&self, _cancel: CancellationToken) -> BoxFuture<'_, Response> {
        Box::pin(async move {
            let _guard = ActiveGuard::enter(self.counters.clone());
            self.counters.calls.fetch_add(1, Ordering::SeqCst);
            let response = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()));
            sleep(self.delay).await;
            response
        })
    }
}

fn running(id: &str) -> Response {
    Ok(vec![common::task(id, TaskStatus::Running)])
}

fn done(id: &str) -> Response {
    Ok(vec![common::task(id, TaskStatus::Success)])
}

fn calls(c: &Counters) -> usize {
    c.calls.load(Ordering::SeqCst)
}

async fn wait_settled(rx: &mut watch::Receiver<ListState<TaskResult>>, n: u64) {
    rx.wait_for(|s| s.settled >= n)
        .await
        .expect("controller alive");
}

#[tokio::test(start_paused = true)]
async fn running_task_schedules_one_follow_up() {
    let (fetcher, counters) = ScriptedFetcher::new(vec![running("t1"), done("t1")], Duration::ZERO);
    let handle = spawn(fetcher, PollConfig::default());
    let mut rx = handle.subscribe();

    wait_settled(&mut rx, 1).await;
    assert_eq!(calls(&counters), 1);
    assert_eq!(handle.state().items[0].status, TaskStatus::Running);

    sleep(Duration::from_millis(2999)).await;
    assert_eq!(calls(&counters), 1);

    sleep(Duration::from_millis(2)).await;
    wait_settled(&mut rx, 2).await;
    assert_eq!(calls(&counters), 2);
    assert_eq!(handle.state().items[0].status, TaskStatus::Success);

    // nothing running any more: no further automatic refresh
    sleep(Duration::from_secs(30)).await;
    assert_eq!(calls(&counters), 2);
    assert_eq!(counters.max_active.load(Ordering::SeqCst), 1);
    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn manual_refresh_supersedes_scheduled_refresh() {
    let (fetcher, counters) = ScriptedFetcher::new(
        vec![running("t1"), running("t1"), done("t1")],
        Duration::ZERO,
    );
    let handle = spawn(fetcher, PollConfig::default());
    let mut rx = handle.subscribe();
    wait_settled(&mut rx, 1).await;

    sleep(Duration::from_millis(1500)).await;
    handle.refresh().unwrap();
    wait_settled(&mut rx, 2).await;
    assert_eq!(calls(&counters), 2);

    // the timer armed by the first fetch (t=3000) must not fire
    sleep(Duration::from_millis(2500)).await;
    assert_eq!(calls(&counters), 2);

    // the one armed by the manual refresh (t=4500) does
    sleep(Duration::from_millis(600)).await;
    wait_settled(&mut rx, 3).await;
    assert_eq!(calls(&counters), 3);
    assert_eq!(counters.max_active.load(Ordering::SeqCst), 1);
    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn superseded_fetch_result_is_discarded() {
    let (fetcher, counters) = ScriptedFetcher::new(
        vec![running("stale"), done("fresh")],
        Duration::from_millis(1000),
    );
    let handle = spawn(fetcher, PollConfig::default());
    let mut rx = handle.subscribe();

    sleep(Duration::from_millis(100)).await;
    assert!(handle.state().is_loading);
    handle.refresh().unwrap();

    wait_settled(&mut rx, 1).await;
    let state = handle.state();
    assert_eq!(state.items[0].id, "fresh");
    assert_eq!(state.fetches, 2);
    assert!(!state.is_loading);

    // the stale response was running but scheduled nothing
    sleep(Duration::from_secs(30)).await;
    assert_eq!(calls(&counters), 2);
    assert_eq!(handle.state().settled, 1);
    assert_eq!(counters.max_active.load(Ordering::SeqCst), 1);
    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn error_is_surfaced_and_not_retried() {
    let (fetcher, counters) = ScriptedFetcher::new(
        vec![
            running("t1"),
            Err(FetchError::Backend("503".into())),
            done("t1"),
        ],
        Duration::ZERO,
    );
    let handle = spawn(fetcher, PollConfig::default());
    let mut rx = handle.subscribe();
    wait_settled(&mut rx, 1).await;

    // follow-up fetch at t=3000 fails
    rx.wait_for(|s| s.phase == PollPhase::Errored)
        .await
        .unwrap();
    let state = handle.state();
    assert_eq!(state.error, Some(FetchError::Backend("503".into())));
    assert!(!state.is_loading);
    assert_eq!(state.items.len(), 1, "previous items stay visible");

    sleep(Duration::from_secs(30)).await;
    assert_eq!(calls(&counters), 2);

    // a manual refresh still works and clears the error
    handle.refresh().unwrap();
    wait_settled(&mut rx, 2).await;
    let state = handle.state();
    assert_eq!(state.phase, PollPhase::Settled);
    assert_eq!(state.error, None);
    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn live_mode_refreshes_on_its_own_interval() {
    let (fetcher, counters) = ScriptedFetcher::new(vec![], Duration::ZERO);
    let handle = spawn(fetcher, PollConfig::default());
    let mut rx = handle.subscribe();
    wait_settled(&mut rx, 1).await;

    handle.set_live(true).unwrap();
    wait_settled(&mut rx, 2).await;
    assert!(handle.state().is_live);
    assert_eq!(calls(&counters), 2);

    sleep(Duration::from_millis(2001)).await;
    assert_eq!(calls(&counters), 3);
    sleep(Duration::from_millis(2000)).await;
    assert_eq!(calls(&counters), 4);

    handle.set_live(false).unwrap();
    sleep(Duration::from_secs(30)).await;
    assert_eq!(calls(&counters), 4);
    assert!(!handle.state().is_live);
    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn shutdown_cancels_in_flight_fetch() {
    let (fetcher, counters) = ScriptedFetcher::new(vec![running("t1")], Duration::from_secs(5));
    let handle = spawn(fetcher, PollConfig::default());
    let rx = handle.subscribe();

    sleep(Duration::from_millis(100)).await;
    assert_eq!(counters.active.load(Ordering::SeqCst), 1);
    handle.shutdown().await;
    sleep(Duration::from_millis(1)).await;

    assert_eq!(counters.active.load(Ordering::SeqCst), 0);
    let state = rx.borrow().clone();
    assert_eq!(state.phase, PollPhase::Cancelled);
    assert!(!state.is_loading);
    assert_eq!(state.settled, 0);

    sleep(Duration::from_secs(30)).await;
    assert_eq!(calls(&counters), 1);
}

#[tokio::test]
async fn file_fetcher_reads_and_isolates_bad_entries() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("tasks.json");
    std::fs::write(
        &path,
        r#"[{"task_id": 7, "status": "success", "message": "ok"}, {"oops": true}]"#,
    )
    .unwrap();

    let handle = spawn(TaskFileFetcher::new(&path), PollConfig::default());
    let mut rx = handle.subscribe();
    wait_settled(&mut rx, 1).await;
    let state = handle.state();
    assert_eq!(state.items.len(), 1);
    assert_eq!(state.items[0].id, "7");
    handle.shutdown().await;
}

#[tokio::test]
async fn file_fetcher_missing_file_errors() {
    let dir = tempfile::TempDir::new().unwrap();
    let handle = spawn(
        TaskFileFetcher::new(dir.path().join("missing.json")),
        PollConfig::default(),
    );
    let mut rx = handle.subscribe();
    rx.wait_for(|s| s.phase == PollPhase::Errored)
        .await
        .unwrap();
    assert!(matches!(handle.state().error, Some(FetchError::Backend(_))));
    handle.shutdown().await;
}

#[tokio::test]
async fn file_fetcher_empty_file_is_empty_list() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("tasks.json");
    std::fs::write(&path, "  \n").unwrap();
    let handle = spawn(TaskFileFetcher::new(&path), PollConfig::default());
    let mut rx = handle.subscribe();
    wait_settled(&mut rx, 1).await;
    assert!(handle.state().items.is_empty());
    handle.shutdown().await;
}

#[tokio::test]
async fn file_fetcher_never_reports_cancellation_as_empty_list() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("tasks.json");
    std::fs::write(&path, r#"[{"id": "t1", "status": "running"}]"#).unwrap();

    let token = CancellationToken::new();
    token.cancel();
    let tasks = TaskFileFetcher::new(&path).fetch(token).await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].status, TaskStatus::Running);
}

#[tokio::test(start_paused = true)]
async fn shutdown_after_settle_keeps_items() {
    let (fetcher, _counters) = ScriptedFetcher::new(vec![done("t1")], Duration::ZERO);
    let handle = spawn(fetcher, PollConfig::default());
    let mut rx = handle.subscribe();
    wait_settled(&mut rx, 1).await;
    handle.shutdown().await;

    let state = rx.borrow().clone();
    assert_eq!(state.phase, PollPhase::Settled);
    assert_eq!(state.items.len(), 1);
}
