//! Periodic background tickers that drive a running job's clock.
//!
//! A [`TickSource`] starts one [`Ticker`] per activated job. The ticker calls
//! its callback at a fixed interval until the callback reports
//! [`TickOutcome::Exhausted`] or someone calls [`Ticker::stop`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::debug;

/// What a tick callback wants to happen next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Keep firing.
    Continue,
    /// Nothing left to do; the ticker stops itself.
    Exhausted,
}

/// Callback invoked on every firing.
pub type TickCallback = Box<dyn FnMut() -> TickOutcome + Send + 'static>;

/// Handle to a running periodic callback.
pub trait Ticker: Send + Sync {
    /// Halt future firings. Safe to call any number of times.
    fn stop(&self);

    /// Whether firing has ceased, via `stop()` or natural exhaustion.
    fn is_stopped(&self) -> bool;
}

/// Starts tickers.
pub trait TickSource: Send + Sync {
    fn start(&self, interval: Duration, callback: TickCallback) -> Arc<dyn Ticker>;
}

// ── Tokio ───────────────────────────────────────────────────────────

/// Runs each ticker as a task on a tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioTickSource {
    handle: Handle,
}

impl TokioTickSource {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Use the runtime of the calling context, if any.
    pub fn current() -> Option<Self> {
        Handle::try_current().ok().map(Self::new)
    }
}

struct TokioTicker {
    stopped: Arc<AtomicBool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Ticker for TokioTicker {
    fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
        let task = self.task.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(task) = task {
            task.abort();
        }
    }

    fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }
}

impl TickSource for TokioTickSource {
    fn start(&self, interval: Duration, mut callback: TickCallback) -> Arc<dyn Ticker> {
        let period = interval.max(Duration::from_millis(1));
        let stopped = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stopped);

        let task = self.handle.spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // Skip the immediate first tick
            ticker.tick().await;

            loop {
                ticker.tick().await;
                if flag.load(Ordering::Acquire) {
                    break;
                }
                if callback() == TickOutcome::Exhausted {
                    flag.store(true, Ordering::Release);
                    debug!("ticker exhausted");
                    break;
                }
            }
        });

        Arc::new(TokioTicker {
            stopped,
            task: Mutex::new(Some(task)),
        })
    }
}

// ── Manual ──────────────────────────────────────────────────────────

/// Deterministic tick source: nothing fires until [`ManualTickSource::advance`].
///
/// The requested interval is recorded but ignored; each `advance` step fires
/// every live ticker exactly once.
#[derive(Default)]
pub struct ManualTickSource {
    tickers: Mutex<Vec<Arc<ManualTicker>>>,
}

pub struct ManualTicker {
    stopped: AtomicBool,
    interval: Duration,
    callback: Mutex<TickCallback>,
}

impl ManualTicker {
    pub fn interval(&self) -> Duration {
        self.interval
    }

    fn fire(&self) {
        if self.is_stopped() {
            return;
        }
        let outcome = {
            let mut callback = self.callback.lock().unwrap_or_else(PoisonError::into_inner);
            callback()
        };
        if outcome == TickOutcome::Exhausted {
            self.stopped.store(true, Ordering::Release);
        }
    }
}

impl Ticker for ManualTicker {
    fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }
}

impl ManualTickSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire every live ticker `fires` times.
    pub fn advance(&self, fires: usize) {
        for _ in 0..fires {
            // Snapshot so callbacks never run under the registry lock.
            let live: Vec<Arc<ManualTicker>> = {
                let mut tickers = self.tickers.lock().unwrap_or_else(PoisonError::into_inner);
                tickers.retain(|t| !t.is_stopped());
                tickers.clone()
            };
            for ticker in live {
                ticker.fire();
            }
        }
    }

    /// Number of tickers that have not stopped yet.
    pub fn live_count(&self) -> usize {
        self.tickers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|t| !t.is_stopped())
            .count()
    }
}

impl TickSource for ManualTickSource {
    fn start(&self, interval: Duration, callback: TickCallback) -> Arc<dyn Ticker> {
        let ticker = Arc::new(ManualTicker {
            stopped: AtomicBool::new(false),
            interval,
            callback: Mutex::new(callback),
        });
        self.tickers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::clone(&ticker));
        ticker
    }
}
