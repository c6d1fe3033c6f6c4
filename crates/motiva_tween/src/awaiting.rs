//! Callback → awaitable bridge
//!
//! Completion callbacks are bridged into futures through a one-shot
//! channel whose sender can be taken exactly once: whichever of
//! {natural completion, external kill, timeout, cancellation} fires
//! first resolves the awaitable, and every later signal is a no-op.
//!
//! Suspension is cooperative. The future resolves when a callback
//! invoked during a host tick sends the outcome — there is no
//! background thread, and awaiting from the tick thread itself without
//! ticking will simply never resolve.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use crate::context::AnimationId;
use crate::error::TweenError;
use crate::handle::TweenHandle;

/// How an awaited animation ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum AwaitOutcome {
    Completed,
    Killed,
    Cancelled,
}

/// Shared resolution slot; the sender leaves exactly once
#[derive(Clone)]
pub(crate) struct AwaitShared {
    sender: Arc<Mutex<Option<oneshot::Sender<AwaitOutcome>>>>,
}

impl AwaitShared {
    fn new(sender: oneshot::Sender<AwaitOutcome>) -> Self {
        Self {
            sender: Arc::new(Mutex::new(Some(sender))),
        }
    }

    /// First call sends; later calls are no-ops
    pub(crate) fn resolve(&self, outcome: AwaitOutcome) {
        if let Some(sender) = self.sender.lock().unwrap().take() {
            let _ = sender.send(outcome);
        }
    }

    pub(crate) fn is_resolved(&self) -> bool {
        self.sender.lock().unwrap().is_none()
    }
}

/// Cooperative cancellation signal for awaited completions
///
/// Cloneable; cancelling any clone cancels them all. Observed by the
/// context's watchdog pass on the next Update tick.
#[derive(Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// Watchdog raced against an awaited animation
///
/// Ticked on unscaled Update-channel time so host time dilation cannot
/// stall a timeout.
pub(crate) struct Watcher {
    target: AnimationId,
    deadline: Option<f32>,
    token: Option<CancelToken>,
    shared: AwaitShared,
}

impl Watcher {
    pub(crate) fn target(&self) -> AnimationId {
        self.target
    }

    pub(crate) fn is_resolved(&self) -> bool {
        self.shared.is_resolved()
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.token.as_ref().is_some_and(CancelToken::is_cancelled)
    }

    /// Count down; returns true when the deadline expires
    pub(crate) fn expire(&mut self, dt: f32) -> bool {
        match &mut self.deadline {
            Some(left) => {
                *left -= dt;
                *left <= 0.0
            }
            None => false,
        }
    }

    /// Resolve as cancelled so the follow-up kill's signal is a no-op
    pub(crate) fn resolve_cancelled(&self) {
        self.shared.resolve(AwaitOutcome::Cancelled);
    }
}

/// Future for a plain or timeout-raced completion
///
/// Resolves `true` when the animation reached its final values,
/// `false` when it was killed first (including by a timeout).
pub struct Completion {
    rx: oneshot::Receiver<AwaitOutcome>,
}

impl Future for Completion {
    type Output = bool;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(AwaitOutcome::Completed)) => Poll::Ready(true),
            Poll::Ready(_) => Poll::Ready(false),
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Future for a cancellation-raced completion
///
/// Resolves `Ok(true)`/`Ok(false)` like [`Completion`], or
/// `Err(TweenError::Cancelled)` when the supplied token fired first.
pub struct CancellableCompletion {
    rx: oneshot::Receiver<AwaitOutcome>,
}

impl Future for CancellableCompletion {
    type Output = Result<bool, TweenError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(AwaitOutcome::Completed)) => Poll::Ready(Ok(true)),
            Poll::Ready(Ok(AwaitOutcome::Cancelled)) => Poll::Ready(Err(TweenError::Cancelled)),
            Poll::Ready(_) => Poll::Ready(Ok(false)),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl TweenHandle {
    /// Await this animation's end
    ///
    /// Resolves `true` on completion (natural or forced), `false` if
    /// killed first. A dead handle resolves `false` immediately.
    pub fn completion(&self) -> Completion {
        Completion {
            rx: register(self, None, None),
        }
    }

    /// Await this animation's end, racing a timeout
    ///
    /// On expiry (measured in unscaled Update-channel seconds) the
    /// animation is force-killed and the future resolves `false` — a
    /// timed-out await never leaves a dangling animation behind.
    pub fn completion_with_timeout(&self, timeout_secs: f32) -> Completion {
        Completion {
            rx: register(self, Some(timeout_secs.max(0.0)), None),
        }
    }

    /// Await this animation's end, racing a cancellation token
    ///
    /// Cancellation kills the underlying animation and propagates
    /// outward as `Err(TweenError::Cancelled)`.
    pub fn completion_with_cancel(&self, token: CancelToken) -> CancellableCompletion {
        CancellableCompletion {
            rx: register(self, None, Some(token)),
        }
    }
}

fn register(
    handle: &TweenHandle,
    deadline: Option<f32>,
    token: Option<CancelToken>,
) -> oneshot::Receiver<AwaitOutcome> {
    let (tx, rx) = oneshot::channel();
    let shared = AwaitShared::new(tx);

    let registered = handle
        .ctx
        .with_entry(handle.id, |entry| {
            let s = shared.clone();
            entry
                .callbacks
                .on_complete
                .push(Box::new(move || s.resolve(AwaitOutcome::Completed)));
            let s = shared.clone();
            entry
                .callbacks
                .on_kill
                .push(Box::new(move || s.resolve(AwaitOutcome::Killed)));
        })
        .is_some();

    if !registered {
        // Dead handle: nothing will ever fire, resolve as killed now.
        shared.resolve(AwaitOutcome::Killed);
        return rx;
    }

    if deadline.is_some() || token.is_some() {
        handle.ctx.add_watcher(Watcher {
            target: handle.id,
            deadline,
            token,
            shared,
        });
    }
    rx
}
