use super::*;
use futures::executor::block_on;
use futures::task::noop_waker_ref;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::future::Future;
use std::pin::pin;
use std::task::{Context, Poll};

#[derive(Default)]
struct RecordingClock {
    sleeps: RefCell<Vec<Duration>>,
}

impl Clock for RecordingClock {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.borrow_mut().push(duration);
    }
}

impl RecordingClock {
    fn millis(&self) -> Vec<u128> {
        self.sleeps
            .borrow()
            .iter()
            .map(Duration::as_millis)
            .collect()
    }
}

struct NeverClock;

impl Clock for NeverClock {
    async fn sleep(&self, _duration: Duration) {
        futures::future::pending::<()>().await;
    }
}

/// Fails until `ready_on` (1-based), then succeeds.
struct ScriptedTarget {
    results: VecDeque<bool>,
    attempts: u32,
    on_attempt: Option<CancellationToken>,
}

impl ScriptedTarget {
    fn ready_on(attempt: u32) -> Self {
        let results = (1..=12).map(|n| n >= attempt).collect();
        Self {
            results,
            attempts: 0,
            on_attempt: None,
        }
    }

    fn never() -> Self {
        Self {
            results: VecDeque::new(),
            attempts: 0,
            on_attempt: None,
        }
    }
}

impl RenderTarget for ScriptedTarget {
    fn try_render(&mut self) -> bool {
        self.attempts += 1;
        if let Some(token) = &self.on_attempt {
            token.cancel();
        }
        self.results.pop_front().unwrap_or(false)
    }
}

#[derive(Default)]
struct FakeWatch {
    visible: bool,
    observed: u32,
    disconnected: u32,
    threshold: Option<f64>,
}

impl VisibilityWatch for FakeWatch {
    fn observe(&mut self, threshold: f64) {
        self.observed += 1;
        self.threshold = Some(threshold);
    }

    async fn intersected(&mut self) {
        if !self.visible {
            futures::future::pending::<()>().await;
        }
    }

    fn disconnect(&mut self) {
        self.disconnected += 1;
    }
}

#[test]
fn render_retry_backs_off_linearly_then_exhausts() {
    let mut retry = RenderRetry::new(RetryPolicy::default());
    let mut steps = Vec::new();
    for _ in 0..MAX_RENDER_ATTEMPTS {
        retry.begin_attempt();
        steps.push(retry.after_failure());
    }
    assert_eq!(
        steps,
        vec![
            RetryStep::Backoff(Duration::from_millis(300)),
            RetryStep::Backoff(Duration::from_millis(600)),
            RetryStep::Backoff(Duration::from_millis(900)),
            RetryStep::Backoff(Duration::from_millis(1200)),
            RetryStep::Backoff(Duration::from_millis(1500)),
            RetryStep::Exhausted,
        ]
    );
    assert_eq!(retry.attempts(), 6);
}

#[test]
fn sdk_ready_on_fourth_attempt_renders_without_fallback() {
    let clock = RecordingClock::default();
    let mut target = ScriptedTarget::ready_on(4);
    let mut watch = FakeWatch::default();
    let exhausted = Cell::new(false);

    let outcome = block_on(render_with_fallback(
        &mut target,
        &clock,
        &mut watch,
        &RetryPolicy::default(),
        &CancellationToken::new(),
        || exhausted.set(true),
    ));

    assert_eq!(
        outcome,
        RenderOutcome::Rendered {
            attempts: 4,
            via_visibility: false
        }
    );
    assert_eq!(target.attempts, 4);
    assert_eq!(clock.millis(), vec![300, 600, 900]);
    assert!(!exhausted.get());
    assert_eq!(watch.observed, 0);
}

#[test]
fn exhaustion_installs_observer_once_and_renders_on_intersection() {
    let clock = RecordingClock::default();
    let mut target = ScriptedTarget::ready_on(7);
    let mut watch = FakeWatch {
        visible: true,
        ..FakeWatch::default()
    };
    let exhausted = Cell::new(0);

    let outcome = block_on(render_with_fallback(
        &mut target,
        &clock,
        &mut watch,
        &RetryPolicy::default(),
        &CancellationToken::new(),
        || exhausted.set(exhausted.get() + 1),
    ));

    assert_eq!(
        outcome,
        RenderOutcome::Rendered {
            attempts: 7,
            via_visibility: true
        }
    );
    assert_eq!(exhausted.get(), 1);
    assert_eq!(watch.observed, 1);
    assert_eq!(watch.threshold, Some(VISIBILITY_THRESHOLD));
    assert_eq!(watch.disconnected, 1);
    assert_eq!(clock.millis(), vec![300, 600, 900, 1200, 1500]);
}

#[test]
fn exhaustion_without_intersection_disconnects_at_ceiling() {
    let clock = RecordingClock::default();
    let mut target = ScriptedTarget::never();
    let mut watch = FakeWatch::default();

    let outcome = block_on(render_with_fallback(
        &mut target,
        &clock,
        &mut watch,
        &RetryPolicy::default(),
        &CancellationToken::new(),
        || {},
    ));

    assert_eq!(outcome, RenderOutcome::NotRendered);
    assert_eq!(target.attempts, 6);
    assert_eq!(watch.observed, 1);
    assert_eq!(watch.disconnected, 1);
    assert_eq!(clock.millis(), vec![300, 600, 900, 1200, 1500, 30_000]);
}

#[test]
fn visible_but_still_unavailable_reports_render_failed() {
    let clock = RecordingClock::default();
    let mut target = ScriptedTarget::never();
    let mut watch = FakeWatch {
        visible: true,
        ..FakeWatch::default()
    };
    let policy = RetryPolicy::default();
    let cancel = CancellationToken::new();

    let outcome = block_on(render_when_visible(
        &mut target,
        &clock,
        &mut watch,
        &policy,
        &cancel,
    ));

    assert_eq!(outcome, VisibilityOutcome::RenderFailed);
    assert_eq!(target.attempts, 1);
    assert_eq!(watch.disconnected, 1);
}

#[test]
fn cancelled_before_start_makes_no_attempt() {
    let clock = RecordingClock::default();
    let mut target = ScriptedTarget::ready_on(1);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let outcome = block_on(retry_render(
        &mut target,
        &clock,
        &RetryPolicy::default(),
        &cancel,
    ));

    assert_eq!(outcome, RetryOutcome::Cancelled);
    assert_eq!(target.attempts, 0);
}

#[test]
fn cancellation_during_attempt_stops_further_backoff() {
    let clock = RecordingClock::default();
    let cancel = CancellationToken::new();
    let mut target = ScriptedTarget::never();
    target.on_attempt = Some(cancel.clone());

    let outcome = block_on(retry_render(
        &mut target,
        &clock,
        &RetryPolicy::default(),
        &cancel,
    ));

    assert_eq!(outcome, RetryOutcome::Cancelled);
    assert_eq!(target.attempts, 1);
    assert!(clock.millis().is_empty());
}

#[test]
fn cancellation_interrupts_a_pending_sleep() {
    let cancel = CancellationToken::new();
    let canceller = cancel.clone();

    let (slept, ()) = block_on(async {
        futures::join!(
            sleep_unless_cancelled(&NeverClock, Duration::from_secs(5), &cancel),
            async move { canceller.cancel() }
        )
    });

    assert!(!slept);
}

#[test]
fn repeatedly_polled_sleep_still_observes_cancel() {
    let cancel = CancellationToken::new();
    let mut cx = Context::from_waker(noop_waker_ref());
    let mut sleep = pin!(sleep_unless_cancelled(
        &NeverClock,
        Duration::from_secs(5),
        &cancel
    ));

    for _ in 0..1000 {
        assert_eq!(sleep.as_mut().poll(&mut cx), Poll::Pending);
    }
    cancel.cancel();

    assert_eq!(sleep.as_mut().poll(&mut cx), Poll::Ready(false));
}

#[test]
fn cancellation_disconnects_visibility_observer() {
    let cancel = CancellationToken::new();
    let canceller = cancel.clone();
    let mut target = ScriptedTarget::ready_on(1);
    let mut watch = FakeWatch::default();
    let policy = RetryPolicy::default();

    let (outcome, ()) = block_on(async {
        futures::join!(
            render_when_visible(&mut target, &NeverClock, &mut watch, &policy, &cancel),
            async move { canceller.cancel() }
        )
    });

    assert_eq!(outcome, VisibilityOutcome::Cancelled);
    assert_eq!(watch.observed, 1);
    assert_eq!(watch.disconnected, 1);
    assert_eq!(target.attempts, 0);
}
