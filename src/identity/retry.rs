//! Render retry state machine for the Google sign-in button.
//!
//! The SDK object and the container element can both show up late (script
//! still evaluating, container not laid out yet). Rendering is retried a fixed
//! number of times with linear backoff; after that the button is rendered the
//! first time the container scrolls into view, or never if that does not
//! happen within a ceiling.
//!
//! Timers and the DOM sit behind [`Clock`], [`RenderTarget`] and
//! [`VisibilityWatch`] so the schedule is testable without a browser. Every
//! wait also races a [`CancellationToken`], so nothing keeps running after the
//! owning component unmounts.

#![allow(async_fn_in_trait)]

#[cfg(test)]
#[path = "retry_test.rs"]
mod retry_test;

use std::time::Duration;

use futures::future::{Either, select};
use futures::pin_mut;
use tokio_util::sync::CancellationToken;

pub const MAX_RENDER_ATTEMPTS: u32 = 6;
pub const RENDER_BACKOFF_STEP: Duration = Duration::from_millis(300);
pub const VISIBILITY_THRESHOLD: f64 = 0.1;
pub const VISIBILITY_CEILING: Duration = Duration::from_secs(30);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Delay after the n-th failed attempt is `step * n`.
    pub step: Duration,
    pub visibility_threshold: f64,
    pub visibility_ceiling: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_RENDER_ATTEMPTS,
            step: RENDER_BACKOFF_STEP,
            visibility_threshold: VISIBILITY_THRESHOLD,
            visibility_ceiling: VISIBILITY_CEILING,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetryStep {
    Backoff(Duration),
    Exhausted,
}

/// Attempt counter for one mount.
#[derive(Clone, Debug)]
pub struct RenderRetry {
    policy: RetryPolicy,
    attempt: u32,
}

impl RenderRetry {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy, attempt: 0 }
    }

    /// Number of attempts started so far.
    pub fn attempts(&self) -> u32 {
        self.attempt
    }

    /// Start the next attempt; returns its 1-based index.
    pub fn begin_attempt(&mut self) -> u32 {
        self.attempt += 1;
        self.attempt
    }

    /// What to do after the current attempt failed.
    pub fn after_failure(&self) -> RetryStep {
        if self.attempt < self.policy.max_attempts {
            RetryStep::Backoff(self.policy.step * self.attempt)
        } else {
            RetryStep::Exhausted
        }
    }
}

pub trait Clock {
    async fn sleep(&self, duration: Duration);
}

/// One render of the sign-in button.
pub trait RenderTarget {
    /// Returns `false` when the SDK or the container is not available yet.
    fn try_render(&mut self) -> bool;
}

/// Viewport-intersection observer around the button container.
pub trait VisibilityWatch {
    fn observe(&mut self, threshold: f64);
    /// Resolves on the first intersection at or above the threshold.
    async fn intersected(&mut self);
    fn disconnect(&mut self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetryOutcome {
    Rendered { attempts: u32 },
    Exhausted,
    Cancelled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VisibilityOutcome {
    Rendered,
    /// Became visible but the render still failed.
    RenderFailed,
    TimedOut,
    Cancelled,
}

/// Sleep for `duration` unless cancelled first. Returns `false` if cancelled.
pub async fn sleep_unless_cancelled<C: Clock>(
    clock: &C,
    duration: Duration,
    cancel: &CancellationToken,
) -> bool {
    if cancel.is_cancelled() {
        return false;
    }
    let sleep = clock.sleep(duration);
    let cancelled = cancel.cancelled();
    pin_mut!(sleep, cancelled);
    matches!(select(sleep, cancelled).await, Either::Left(_))
}

/// Attempt to render up to `policy.max_attempts` times, sleeping
/// `step * n` after the n-th failure. Attempts run strictly one after another.
pub async fn retry_render<T, C>(
    target: &mut T,
    clock: &C,
    policy: &RetryPolicy,
    cancel: &CancellationToken,
) -> RetryOutcome
where
    T: RenderTarget,
    C: Clock,
{
    let mut retry = RenderRetry::new(*policy);
    loop {
        if cancel.is_cancelled() {
            return RetryOutcome::Cancelled;
        }
        let attempt = retry.begin_attempt();
        if target.try_render() {
            log::debug!("sign-in button rendered on attempt {attempt}");
            return RetryOutcome::Rendered { attempts: attempt };
        }
        match retry.after_failure() {
            RetryStep::Backoff(delay) => {
                log::debug!(
                    "sign-in button not ready (attempt {attempt}); retrying in {}ms",
                    delay.as_millis()
                );
                if !sleep_unless_cancelled(clock, delay, cancel).await {
                    return RetryOutcome::Cancelled;
                }
            }
            RetryStep::Exhausted => {
                log::debug!(
                    "sign-in button not ready after {attempt} attempts; waiting for visibility"
                );
                return RetryOutcome::Exhausted;
            }
        }
    }
}

/// Observe the container once and render when it becomes visible.
///
/// The observer is disconnected on intersection, at the ceiling, or on
/// cancellation, whichever comes first.
pub async fn render_when_visible<T, C, W>(
    target: &mut T,
    clock: &C,
    watch: &mut W,
    policy: &RetryPolicy,
    cancel: &CancellationToken,
) -> VisibilityOutcome
where
    T: RenderTarget,
    C: Clock,
    W: VisibilityWatch,
{
    if cancel.is_cancelled() {
        return VisibilityOutcome::Cancelled;
    }
    watch.observe(policy.visibility_threshold);
    let became_visible = {
        let visible = watch.intersected();
        let ceiling = clock.sleep(policy.visibility_ceiling);
        let cancelled = cancel.cancelled();
        pin_mut!(visible, ceiling, cancelled);
        matches!(
            select(visible, select(ceiling, cancelled)).await,
            Either::Left(_)
        )
    };
    watch.disconnect();

    if cancel.is_cancelled() {
        return VisibilityOutcome::Cancelled;
    }
    if !became_visible {
        log::debug!("sign-in container never became visible; giving up");
        return VisibilityOutcome::TimedOut;
    }
    if target.try_render() {
        VisibilityOutcome::Rendered
    } else {
        VisibilityOutcome::RenderFailed
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderOutcome {
    Rendered { attempts: u32, via_visibility: bool },
    NotRendered,
    Cancelled,
}

/// [`retry_render`], then [`render_when_visible`] if the budget runs out.
/// `on_exhausted` runs once, between the two phases.
pub async fn render_with_fallback<T, C, W>(
    target: &mut T,
    clock: &C,
    watch: &mut W,
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    on_exhausted: impl FnOnce(),
) -> RenderOutcome
where
    T: RenderTarget,
    C: Clock,
    W: VisibilityWatch,
{
    match retry_render(target, clock, policy, cancel).await {
        RetryOutcome::Rendered { attempts } => RenderOutcome::Rendered {
            attempts,
            via_visibility: false,
        },
        RetryOutcome::Cancelled => RenderOutcome::Cancelled,
        RetryOutcome::Exhausted => {
            on_exhausted();
            match render_when_visible(target, clock, watch, policy, cancel).await {
                VisibilityOutcome::Rendered => RenderOutcome::Rendered {
                    attempts: policy.max_attempts + 1,
                    via_visibility: true,
                },
                VisibilityOutcome::Cancelled => RenderOutcome::Cancelled,
                VisibilityOutcome::RenderFailed | VisibilityOutcome::TimedOut => {
                    RenderOutcome::NotRendered
                }
            }
        }
    }
}
