//! Debounced map session.
//!
//! Camera-idle events arrive in bursts while the user drags and flings the
//! map. The session waits for a quiet period after the last event and only
//! then evaluates that last viewport:
//!
//! ```text
//! events:   v1 v2 v3 ........................ v4 .......
//! timer:    |--|--|--------- debounce -------|-|------ debounce ---|
//! evaluate:                                   v3                    v4
//! ```
//!
//! An event that arrives while an evaluation is in flight drops the
//! evaluation (its fetch result is discarded, nothing is drawn) and starts a
//! new quiet period.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use super::config::SessionConfig;
use super::fetcher::{FetchOutcome, FetcherStats, FetcherStatsSnapshot, ViewportFetcher};
use crate::coord::Viewport;
use crate::render::RenderSink;
use crate::stores::StoreSource;

/// Counters for the debounce loop.
#[derive(Debug, Default)]
pub struct SessionStats {
    /// Camera-idle events received.
    pub events_received: AtomicU64,
    /// Viewports handed to the fetcher.
    pub evaluations: AtomicU64,
    /// Events replaced by a newer one inside the quiet period.
    pub suppressed: AtomicU64,
    /// In-flight evaluations dropped for a newer event.
    pub aborted: AtomicU64,
}

impl SessionStats {
    pub fn snapshot(&self) -> SessionStatsSnapshot {
        SessionStatsSnapshot {
            events_received: self.events_received.load(Ordering::Relaxed),
            evaluations: self.evaluations.load(Ordering::Relaxed),
            suppressed: self.suppressed.load(Ordering::Relaxed),
            aborted: self.aborted.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of [`SessionStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStatsSnapshot {
    pub events_received: u64,
    pub evaluations: u64,
    pub suppressed: u64,
    pub aborted: u64,
}

/// Background task that debounces camera events into viewport evaluations.
pub struct MapSession<S: StoreSource, R: RenderSink> {
    fetcher: ViewportFetcher<S, R>,
    config: SessionConfig,
    events: mpsc::UnboundedReceiver<Viewport>,
    outcomes: Option<mpsc::UnboundedSender<FetchOutcome>>,
    token: CancellationToken,
    stats: Arc<SessionStats>,
}

impl<S, R> MapSession<S, R>
where
    S: StoreSource + 'static,
    R: RenderSink + 'static,
{
    /// Starts a session on the current tokio runtime.
    ///
    /// Cancelling `token` (or dropping the returned handle) stops the
    /// session; pending and in-flight evaluations are discarded.
    pub fn spawn(
        fetcher: ViewportFetcher<S, R>,
        config: SessionConfig,
        token: CancellationToken,
    ) -> MapSessionHandle {
        Self::spawn_inner(fetcher, config, token, None)
    }

    /// Like [`spawn`](Self::spawn), also sending every evaluation's outcome
    /// to `outcomes`.
    pub fn spawn_with_outcomes(
        fetcher: ViewportFetcher<S, R>,
        config: SessionConfig,
        token: CancellationToken,
        outcomes: mpsc::UnboundedSender<FetchOutcome>,
    ) -> MapSessionHandle {
        Self::spawn_inner(fetcher, config, token, Some(outcomes))
    }

    fn spawn_inner(
        fetcher: ViewportFetcher<S, R>,
        config: SessionConfig,
        token: CancellationToken,
        outcomes: Option<mpsc::UnboundedSender<FetchOutcome>>,
    ) -> MapSessionHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let token = token.child_token();
        let stats = Arc::new(SessionStats::default());
        let fetcher_stats = fetcher.stats();

        let session = MapSession {
            fetcher,
            config,
            events: rx,
            outcomes,
            token: token.clone(),
            stats: Arc::clone(&stats),
        };
        let task = tokio::spawn(session.run());

        MapSessionHandle {
            events: Some(tx),
            token,
            stats,
            fetcher_stats,
            task: Some(task),
        }
    }

    async fn run(mut self) {
        info!(
            debounce_ms = self.config.debounce.as_millis() as u64,
            min_fetch_zoom = self.fetcher.config().min_fetch_zoom,
            padding = self.fetcher.config().padding,
            "Map session started"
        );

        let mut pending: Option<Viewport> = None;

        'session: loop {
            let mut latest = match pending.take() {
                Some(viewport) => viewport,
                None => tokio::select! {
                    biased;

                    _ = self.token.cancelled() => break,

                    event = self.events.recv() => match event {
                        Some(viewport) => {
                            self.stats.events_received.fetch_add(1, Ordering::Relaxed);
                            viewport
                        }
                        None => break,
                    },
                },
            };

            // Quiet period, restarted by every new event
            let quiet = tokio::time::sleep(self.config.debounce);
            tokio::pin!(quiet);
            loop {
                tokio::select! {
                    biased;

                    _ = self.token.cancelled() => break 'session,

                    event = self.events.recv() => match event {
                        Some(viewport) => {
                            self.stats.events_received.fetch_add(1, Ordering::Relaxed);
                            self.stats.suppressed.fetch_add(1, Ordering::Relaxed);
                            trace!(zoom = viewport.zoom, "Camera event superseded");
                            latest = viewport;
                            quiet.as_mut().reset(Instant::now() + self.config.debounce);
                        }
                        // Sender gone: evaluate what we have
                        None => break,
                    },

                    _ = &mut quiet => break,
                }
            }

            self.stats.evaluations.fetch_add(1, Ordering::Relaxed);
            let outcome = {
                let evaluation = self.fetcher.on_viewport_changed(&latest);
                tokio::pin!(evaluation);

                tokio::select! {
                    biased;

                    _ = self.token.cancelled() => break 'session,

                    Some(viewport) = self.events.recv() => {
                        self.stats.events_received.fetch_add(1, Ordering::Relaxed);
                        self.stats.aborted.fetch_add(1, Ordering::Relaxed);
                        debug!("Evaluation dropped for newer camera event");
                        pending = Some(viewport);
                        None
                    }

                    outcome = &mut evaluation => Some(outcome),
                }
            };

            if let Some(outcome) = outcome {
                self.report(outcome);
            }
        }

        let stats = self.stats.snapshot();
        info!(
            events = stats.events_received,
            evaluations = stats.evaluations,
            suppressed = stats.suppressed,
            aborted = stats.aborted,
            "Map session stopped"
        );
    }

    fn report(&self, outcome: FetchOutcome) {
        debug!(outcome = outcome.kind(), "Viewport evaluated");
        if let Some(ref outcomes) = self.outcomes {
            // Receiver may have gone away; outcomes are informational
            let _ = outcomes.send(outcome);
        }
    }
}

/// Handle to a running [`MapSession`].
///
/// Dropping the handle cancels the session.
pub struct MapSessionHandle {
    events: Option<mpsc::UnboundedSender<Viewport>>,
    token: CancellationToken,
    stats: Arc<SessionStats>,
    fetcher_stats: Arc<FetcherStats>,
    task: Option<JoinHandle<()>>,
}

impl MapSessionHandle {
    /// Reports that the camera came to rest on `viewport`.
    ///
    /// Returns `false` if the session has stopped.
    pub fn camera_idle(&self, viewport: Viewport) -> bool {
        if self.token.is_cancelled() {
            return false;
        }
        self.events
            .as_ref()
            .is_some_and(|events| events.send(viewport).is_ok())
    }

    pub fn stats(&self) -> SessionStatsSnapshot {
        self.stats.snapshot()
    }

    pub fn fetcher_stats(&self) -> FetcherStatsSnapshot {
        self.fetcher_stats.snapshot()
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stops the session, discarding pending work, and waits for the task.
    pub async fn shutdown(mut self) {
        self.token.cancel();
        self.join().await;
    }

    /// Stops accepting events, lets the last one be evaluated without waiting
    /// for the quiet period, and waits for the task.
    pub async fn finish(mut self) {
        self.events = None;
        self.join().await;
    }

    async fn join(&mut self) {
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "Map session task failed");
            }
        }
    }
}

impl Drop for MapSessionHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::coord::TileRange;
    use crate::render::{MemoryRenderSink, STORE_LAYER};
    use crate::viewport::test_support::{block_viewport, MockStoreSource};

    type TestSession = (
        MapSessionHandle,
        Arc<MockStoreSource>,
        Arc<MemoryRenderSink>,
    );

    fn start(source: MockStoreSource) -> TestSession {
        let source = Arc::new(source);
        let sink = Arc::new(MemoryRenderSink::new());
        let fetcher = ViewportFetcher::new(Arc::clone(&source), Arc::clone(&sink));
        let handle = MapSession::spawn(fetcher, SessionConfig::default(), CancellationToken::new());
        (handle, source, sink)
    }

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_evaluates_only_last_viewport() {
        let (handle, source, sink) = start(MockStoreSource::new());

        for i in 0..10 {
            assert!(handle.camera_idle(block_viewport(16, 52192 + i, 52195 + i, 30794, 30796)));
            tokio::time::sleep(ms(5)).await;
        }
        tokio::time::sleep(ms(500)).await;

        let calls = source.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0],
            (
                16,
                TileRange {
                    zoom: 16,
                    min_x: 52200,
                    max_x: 52205,
                    min_y: 30793,
                    max_y: 30797,
                }
            )
        );
        assert_eq!(sink.render_count(), 1);

        let stats = handle.stats();
        assert_eq!(stats.events_received, 10);
        assert_eq!(stats.evaluations, 1);
        assert_eq!(stats.suppressed, 9);
    }

    #[tokio::test(start_paused = true)]
    async fn test_nothing_happens_before_quiet_period() {
        let (handle, source, _sink) = start(MockStoreSource::new());

        handle.camera_idle(block_viewport(16, 52192, 52195, 30794, 30796));
        tokio::time::sleep(ms(150)).await;
        assert!(source.calls().is_empty());

        tokio::time::sleep(ms(100)).await;
        assert_eq!(source.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_low_zoom_never_fetches() {
        let (handle, source, sink) = start(MockStoreSource::new());

        handle.camera_idle(block_viewport(13, 6524, 6526, 3849, 3850));
        tokio::time::sleep(ms(500)).await;

        assert!(source.calls().is_empty());
        assert_eq!(sink.render_count(), 0);
        assert_eq!(handle.stats().evaluations, 1);
        assert_eq!(handle.fetcher_stats().below_min_zoom, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_viewport_twice_fetches_once() {
        let (handle, source, _sink) = start(MockStoreSource::new());
        let viewport = block_viewport(16, 52192, 52195, 30794, 30796);

        handle.camera_idle(viewport);
        tokio::time::sleep(ms(500)).await;
        handle.camera_idle(viewport);
        tokio::time::sleep(ms(500)).await;

        assert_eq!(source.calls().len(), 1);
        assert_eq!(handle.stats().evaluations, 2);
        assert_eq!(handle.fetcher_stats().cache_hits, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_event_during_fetch_drops_evaluation() {
        let (handle, source, sink) = start(MockStoreSource::with_delay(ms(1000)));

        handle.camera_idle(block_viewport(16, 52192, 52195, 30794, 30796));
        // Quiet period over, fetch in flight
        tokio::time::sleep(ms(300)).await;
        assert_eq!(source.calls().len(), 1);

        handle.camera_idle(block_viewport(16, 52300, 52303, 30794, 30796));
        tokio::time::sleep(ms(2000)).await;

        let calls = source.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].1.min_x, 52299);

        // Only the second fetch was drawn
        assert_eq!(sink.render_count(), 1);
        let stats = handle.stats();
        assert_eq!(stats.evaluations, 2);
        assert_eq!(stats.aborted, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_discards_in_flight_fetch() {
        let (handle, source, sink) = start(MockStoreSource::with_delay(ms(1000)));

        handle.camera_idle(block_viewport(16, 52192, 52195, 30794, 30796));
        tokio::time::sleep(ms(300)).await;
        assert_eq!(source.calls().len(), 1);

        handle.shutdown().await;
        tokio::time::sleep(ms(2000)).await;

        assert_eq!(sink.render_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_parent_token_cancels_pending_event() {
        let source = Arc::new(MockStoreSource::new());
        let sink = Arc::new(MemoryRenderSink::new());
        let fetcher = ViewportFetcher::new(Arc::clone(&source), Arc::clone(&sink));
        let token = CancellationToken::new();
        let handle = MapSession::spawn(fetcher, SessionConfig::default(), token.clone());

        handle.camera_idle(block_viewport(16, 52192, 52195, 30794, 30796));
        tokio::time::sleep(ms(50)).await;
        token.cancel();
        tokio::time::sleep(ms(500)).await;

        assert!(source.calls().is_empty());
        assert!(!handle.is_running());
        assert!(!handle.camera_idle(block_viewport(16, 1, 2, 1, 2)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_stops_session() {
        let (handle, source, _sink) = start(MockStoreSource::new());

        handle.camera_idle(block_viewport(16, 52192, 52195, 30794, 30796));
        drop(handle);
        tokio::time::sleep(ms(500)).await;

        assert!(source.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_finish_flushes_last_event() {
        let source = Arc::new(MockStoreSource::new());
        let sink = Arc::new(MemoryRenderSink::new());
        let fetcher = ViewportFetcher::new(Arc::clone(&source), Arc::clone(&sink));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = MapSession::spawn_with_outcomes(
            fetcher,
            SessionConfig::default(),
            CancellationToken::new(),
            tx,
        );

        handle.camera_idle(block_viewport(16, 52192, 52195, 30794, 30796));
        handle.finish().await;

        assert!(matches!(rx.recv().await, Some(FetchOutcome::Fetched { .. })));
        assert!(sink.layer(STORE_LAYER).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_debounce() {
        let source = Arc::new(MockStoreSource::new());
        let sink = Arc::new(MemoryRenderSink::new());
        let fetcher = ViewportFetcher::new(Arc::clone(&source), Arc::clone(&sink));
        let handle = MapSession::spawn(
            fetcher,
            SessionConfig::with_debounce(ms(50)),
            CancellationToken::new(),
        );

        handle.camera_idle(block_viewport(16, 52192, 52195, 30794, 30796));
        tokio::time::sleep(ms(60)).await;

        assert_eq!(source.calls().len(), 1);
    }
}
