//! Live Recompute Controller
//!
//! Each input edit restarts a quiet-period timer; only when the timer runs
//! out on a fully valid input is a request issued. Responses are tagged with
//! the generation of the edit that scheduled them, and a response is shown
//! only if no newer generation has already landed, so a slow stale response
//! can never replace a fresh one.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::debug;

use super::GeoSubmitter;
use crate::error::{GatewayError, Result};
use crate::geo::{check_points, GeoResult, Point, PointSet, ValidationError};

/// Tuning for the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveSettings {
    /// Quiet period an edit must survive before a request is issued
    pub debounce: Duration,
    /// Fewest points worth computing live
    pub min_points: usize,
}

impl Default for LiveSettings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(400),
            min_points: 2,
        }
    }
}

/// What the controller currently has to show.
#[derive(Debug, Clone, PartialEq)]
pub enum LiveOutcome {
    /// No input yet
    Idle,
    /// Valid so far, but fewer points than `min_points`
    Incomplete { have: usize, need: usize },
    /// At least one point is malformed or out of range
    Invalid(ValidationError),
    Ready(GeoResult),
    Failed(GatewayError),
}

/// Snapshot published on every change.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveState {
    /// Generation of the most recent edit
    pub latest_input: u64,
    /// Generation that `outcome` belongs to
    pub landed: u64,
    pub outcome: LiveOutcome,
    /// A request for `latest_input` is scheduled or in flight
    pub pending: bool,
}

impl Default for LiveState {
    fn default() -> Self {
        Self {
            latest_input: 0,
            landed: 0,
            outcome: LiveOutcome::Idle,
            pending: false,
        }
    }
}

// == Live Recompute ==
pub struct LiveRecompute<S: GeoSubmitter> {
    submitter: Arc<S>,
    settings: LiveSettings,
    scheduled: Mutex<Option<JoinHandle<()>>>,
    state: Arc<watch::Sender<LiveState>>,
}

impl<S: GeoSubmitter> LiveRecompute<S> {
    pub fn new(submitter: Arc<S>, settings: LiveSettings) -> Self {
        let (state, _) = watch::channel(LiveState::default());
        Self {
            submitter,
            settings,
            scheduled: Mutex::new(None),
            state: Arc::new(state),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<LiveState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> LiveState {
        self.state.borrow().clone()
    }

    // == On Input ==
    /// Records an edit and, when the input is ready, schedules a recompute.
    ///
    /// Any schedule that has not fired yet is cancelled first. Requests that
    /// already went out are left to finish; their results are dropped if a
    /// newer generation lands before them.
    pub async fn on_input(&self, points: Vec<Point>) -> u64 {
        let mut scheduled = self.scheduled.lock().await;
        if let Some(handle) = scheduled.take() {
            handle.abort();
        }

        let readiness = match check_points(&points) {
            Err(e) if !points.is_empty() => LiveOutcome::Invalid(e),
            Ok(set) if set.len() >= self.settings.min_points => {
                let generation = self.bump(None);
                *scheduled = Some(self.schedule(generation, set));
                return generation;
            }
            _ => LiveOutcome::Incomplete {
                have: points.len(),
                need: self.settings.min_points,
            },
        };

        debug!(?readiness, "input not ready for recompute");
        self.bump(Some(readiness))
    }

    // == Compute Now ==
    /// Validates and submits immediately, bypassing the debounce window and
    /// the minimum point count. Cancels any pending schedule.
    pub async fn compute_now(&self, points: Vec<Point>) -> Result<GeoResult> {
        {
            let mut scheduled = self.scheduled.lock().await;
            if let Some(handle) = scheduled.take() {
                handle.abort();
            }
        }

        let set = match check_points(&points) {
            Ok(set) => set,
            Err(e) => {
                self.bump(Some(LiveOutcome::Invalid(e.clone())));
                return Err(e.into());
            }
        };

        let generation = self.bump(None);
        let outcome = self.submitter.submit(set).await;
        land(&self.state, generation, &outcome);
        outcome
    }

    /// Starts a new generation. With an outcome, it lands immediately;
    /// without one, a request is pending.
    fn bump(&self, outcome: Option<LiveOutcome>) -> u64 {
        let mut generation = 0;
        self.state.send_modify(|state| {
            state.latest_input += 1;
            generation = state.latest_input;
            match outcome {
                Some(outcome) => {
                    state.landed = generation;
                    state.outcome = outcome;
                    state.pending = false;
                }
                None => state.pending = true,
            }
        });
        generation
    }

    fn schedule(&self, generation: u64, set: PointSet) -> JoinHandle<()> {
        let submitter = Arc::clone(&self.submitter);
        let state = Arc::clone(&self.state);
        let debounce = self.settings.debounce;

        tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            if state.borrow().latest_input != generation {
                return;
            }

            debug!(generation, points = set.len(), "debounce elapsed, submitting");
            // Detached so that cancelling a later schedule never aborts this request.
            tokio::spawn(async move {
                let outcome = submitter.submit(set).await;
                land(&state, generation, &outcome);
            });
        })
    }
}

impl<S: GeoSubmitter> Drop for LiveRecompute<S> {
    fn drop(&mut self) {
        if let Some(handle) = self.scheduled.get_mut().take() {
            handle.abort();
        }
    }
}

/// Applies a response unless a newer generation has already landed.
fn land(state: &watch::Sender<LiveState>, generation: u64, outcome: &Result<GeoResult>) {
    state.send_if_modified(|current| {
        if generation <= current.landed {
            debug!(generation, landed = current.landed, "discarding stale result");
            return false;
        }
        current.landed = generation;
        current.outcome = match outcome {
            Ok(result) => LiveOutcome::Ready(*result),
            Err(e) => LiveOutcome::Failed(e.clone()),
        };
        if generation == current.latest_input {
            current.pending = false;
        }
        true
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::aggregate;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;

    /// Aggregates locally after a per-call delay and records what it was sent.
    struct ScriptedSubmitter {
        delays: Vec<Duration>,
        calls: AtomicUsize,
        seen: StdMutex<Vec<PointSet>>,
    }

    impl ScriptedSubmitter {
        fn new(delays: Vec<Duration>) -> Arc<Self> {
            Arc::new(Self {
                delays,
                calls: AtomicUsize::new(0),
                seen: StdMutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GeoSubmitter for ScriptedSubmitter {
        async fn submit(&self, points: PointSet) -> Result<GeoResult> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(points.clone());
            let delay = self.delays.get(n).copied().unwrap_or_default();
            tokio::time::sleep(delay).await;
            Ok(aggregate(&points).unwrap())
        }
    }

    fn settings() -> LiveSettings {
        LiveSettings {
            debounce: Duration::from_millis(50),
            min_points: 2,
        }
    }

    fn pts(raw: &[(f64, f64)]) -> Vec<Point> {
        raw.iter().map(|&(lat, lng)| Point::new(lat, lng)).collect()
    }

    fn expected(raw: &[(f64, f64)]) -> LiveOutcome {
        LiveOutcome::Ready(aggregate(&check_points(&pts(raw)).unwrap()).unwrap())
    }

    async fn sleep_ms(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[test]
    fn test_default_settings() {
        let s = LiveSettings::default();
        assert_eq!(s.debounce, Duration::from_millis(400));
        assert_eq!(s.min_points, 2);
    }

    #[tokio::test]
    async fn test_rapid_edits_issue_one_request() {
        let submitter = ScriptedSubmitter::new(vec![]);
        let live = LiveRecompute::new(submitter.clone(), settings());

        live.on_input(pts(&[(1.0, 1.0), (2.0, 2.0)])).await;
        sleep_ms(10).await;
        live.on_input(pts(&[(1.0, 1.0), (3.0, 3.0)])).await;
        sleep_ms(10).await;
        let last = live.on_input(pts(&[(1.0, 1.0), (4.0, 4.0)])).await;
        sleep_ms(200).await;

        assert_eq!(submitter.calls(), 1);
        assert_eq!(
            submitter.seen.lock().unwrap()[0].points(),
            pts(&[(1.0, 1.0), (4.0, 4.0)]).as_slice()
        );
        let state = live.state();
        assert_eq!(state.landed, last);
        assert_eq!(state.outcome, expected(&[(1.0, 1.0), (4.0, 4.0)]));
        assert!(!state.pending);
    }

    #[tokio::test]
    async fn test_too_few_points_does_not_submit() {
        let submitter = ScriptedSubmitter::new(vec![]);
        let live = LiveRecompute::new(submitter.clone(), settings());

        live.on_input(pts(&[(1.0, 1.0)])).await;
        sleep_ms(120).await;

        assert_eq!(submitter.calls(), 0);
        assert_eq!(
            live.state().outcome,
            LiveOutcome::Incomplete { have: 1, need: 2 }
        );
    }

    #[tokio::test]
    async fn test_invalid_input_does_not_submit() {
        let submitter = ScriptedSubmitter::new(vec![]);
        let live = LiveRecompute::new(submitter.clone(), settings());

        live.on_input(pts(&[(1.0, 1.0), (f64::NAN, 2.0), (95.0, 0.0)])).await;
        sleep_ms(120).await;

        assert_eq!(submitter.calls(), 0);
        match live.state().outcome {
            LiveOutcome::Invalid(e) => assert_eq!(e.invalid_indices(), vec![1, 2]),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_edit_to_invalid_cancels_pending_schedule() {
        let submitter = ScriptedSubmitter::new(vec![]);
        let live = LiveRecompute::new(submitter.clone(), settings());

        live.on_input(pts(&[(1.0, 1.0), (2.0, 2.0)])).await;
        sleep_ms(10).await;
        live.on_input(pts(&[(1.0, 1.0), (200.0, 2.0)])).await;
        sleep_ms(120).await;

        assert_eq!(submitter.calls(), 0);
        assert!(matches!(live.state().outcome, LiveOutcome::Invalid(_)));
    }

    #[tokio::test]
    async fn test_stale_slow_response_is_discarded() {
        // First request is slow, second is fast: the fast one must stick.
        let submitter = ScriptedSubmitter::new(vec![
            Duration::from_millis(250),
            Duration::ZERO,
        ]);
        let live = LiveRecompute::new(submitter.clone(), settings());
        let mut rx = live.subscribe();

        live.on_input(pts(&[(1.0, 1.0), (2.0, 2.0)])).await;
        sleep_ms(90).await;
        let second = live.on_input(pts(&[(5.0, 5.0), (6.0, 6.0)])).await;
        sleep_ms(450).await;

        assert_eq!(submitter.calls(), 2);
        let state = live.state();
        assert_eq!(state.landed, second);
        assert_eq!(state.outcome, expected(&[(5.0, 5.0), (6.0, 6.0)]));
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().landed, second);
    }

    #[tokio::test]
    async fn test_older_result_shows_while_newer_pending() {
        let submitter = ScriptedSubmitter::new(vec![
            Duration::ZERO,
            Duration::from_millis(300),
        ]);
        let live = LiveRecompute::new(submitter.clone(), settings());

        let first = live.on_input(pts(&[(1.0, 1.0), (2.0, 2.0)])).await;
        sleep_ms(90).await;
        let second = live.on_input(pts(&[(5.0, 5.0), (6.0, 6.0)])).await;
        sleep_ms(120).await;

        let state = live.state();
        assert_eq!(state.landed, first);
        assert_eq!(state.latest_input, second);
        assert!(state.pending);
        assert_eq!(state.outcome, expected(&[(1.0, 1.0), (2.0, 2.0)]));

        sleep_ms(400).await;
        let state = live.state();
        assert_eq!(state.landed, second);
        assert!(!state.pending);
    }

    #[tokio::test]
    async fn test_compute_now_skips_debounce() {
        let submitter = ScriptedSubmitter::new(vec![]);
        let live = LiveRecompute::new(submitter.clone(), settings());

        let result = live.compute_now(pts(&[(10.0, 20.0)])).await.unwrap();

        assert_eq!(result.centroid.lat, 10.0);
        assert_eq!(submitter.calls(), 1);
        assert_eq!(live.state().outcome, LiveOutcome::Ready(result));
    }

    #[tokio::test]
    async fn test_compute_now_rejects_invalid() {
        let submitter = ScriptedSubmitter::new(vec![]);
        let live = LiveRecompute::new(submitter.clone(), settings());

        let err = live.compute_now(pts(&[(0.0, 181.0)])).await.unwrap_err();

        assert!(matches!(err, GatewayError::Validation(_)));
        assert_eq!(submitter.calls(), 0);
    }
}
