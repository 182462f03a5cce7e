//! Periodic refresh task.
//!
//! A single worker thread runs a refresh cycle immediately, then on a fixed
//! wall-clock cadence of one cycle per interval, and additionally whenever
//! a refresh is requested (for example when the dashboard becomes visible
//! again). Requested cycles do not move the timed ones. Cycles never
//! overlap: a tick that falls due while a cycle is running starts as soon
//! as that cycle ends, and ticks missed entirely are skipped. The returned
//! handle stops and joins the worker, either explicitly or on drop.

use crate::dashboard::DisplayBoard;
use crate::ingest::{FieldSource, TelemetryClient};
use crate::logging::{self, DataSource};
use crate::refresh;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Whether the hosting view is currently on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Wake {
    Cancelled,
    Refresh,
    Elapsed,
}

#[derive(Debug, Default)]
struct SignalState {
    cancelled: bool,
    refresh_requested: bool,
}

/// Cancellation plus refresh requests, waited on with a timeout.
#[derive(Debug, Default)]
struct Signal {
    state: Mutex<SignalState>,
    cv: Condvar,
}

impl Signal {
    fn cancel(&self) {
        let mut g = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        g.cancelled = true;
        self.cv.notify_all();
    }

    fn request_refresh(&self) {
        let mut g = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        g.refresh_requested = true;
        self.cv.notify_all();
    }

    /// Wait until `deadline` passes, the signal is cancelled, or a refresh
    /// is requested. Cancellation wins over a pending refresh.
    fn wait_until(&self, deadline: Instant) -> Wake {
        let g = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let remaining = deadline.saturating_duration_since(Instant::now());
        let (mut g, _) = self
            .cv
            .wait_timeout_while(g, remaining, |s| !s.cancelled && !s.refresh_requested)
            .unwrap_or_else(PoisonError::into_inner);

        if g.cancelled {
            Wake::Cancelled
        } else if g.refresh_requested {
            g.refresh_requested = false;
            Wake::Refresh
        } else {
            Wake::Elapsed
        }
    }
}

pub struct Poller;

impl Poller {
    /// Starts the worker. The first cycle runs right away.
    pub fn spawn<S, B>(
        client: Arc<TelemetryClient<S>>,
        district_ids: Vec<String>,
        board: Arc<Mutex<B>>,
        interval: Duration,
    ) -> std::io::Result<PollerHandle>
    where
        S: FieldSource + 'static,
        B: DisplayBoard + Send + 'static,
    {
        let signal = Arc::new(Signal::default());
        let worker = {
            let signal = Arc::clone(&signal);
            thread::Builder::new()
                .name("refresh-poller".to_string())
                .spawn(move || run(&client, &district_ids, &board, interval, &signal))?
        };

        logging::info(
            DataSource::System,
            None,
            &format!("polling every {}s", interval.as_secs_f64()),
        );

        Ok(PollerHandle {
            signal,
            worker: Some(worker),
            visibility: Visibility::Visible,
        })
    }
}

fn run<S, B>(
    client: &TelemetryClient<S>,
    district_ids: &[String],
    board: &Mutex<B>,
    interval: Duration,
    signal: &Signal,
) where
    S: FieldSource,
    B: DisplayBoard,
{
    let mut next_tick = Instant::now() + interval;
    loop {
        let caught = panic::catch_unwind(AssertUnwindSafe(|| poll_once(client, district_ids, board)));
        if let Err(e) = caught {
            logging::error(
                DataSource::System,
                None,
                &format!("refresh cycle panicked: {}", panic_message(&*e)),
            );
        }

        match signal.wait_until(next_tick) {
            Wake::Cancelled => break,
            Wake::Refresh => logging::debug(DataSource::System, None, "refresh requested"),
            Wake::Elapsed => next_tick = advance_tick(next_tick, interval, Instant::now()),
        }
    }
    logging::info(DataSource::System, None, "poller stopped");
}

/// Fetches without holding the board, then applies under the lock.
fn poll_once<S, B>(client: &TelemetryClient<S>, district_ids: &[String], board: &Mutex<B>)
where
    S: FieldSource,
    B: DisplayBoard,
{
    let readings = refresh::fetch_all(client, district_ids);
    let mut board = board.lock().unwrap_or_else(PoisonError::into_inner);
    refresh::complete_cycle(district_ids.len(), &readings, &mut *board);
}

/// The tick after `tick`. If the worker woke so late that it is already
/// due, the missed ticks are dropped and the cadence restarts from `now`.
fn advance_tick(tick: Instant, interval: Duration, now: Instant) -> Instant {
    let next = tick + interval;
    if next <= now { now + interval } else { next }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Control handle for a running poller.
pub struct PollerHandle {
    signal: Arc<Signal>,
    worker: Option<JoinHandle<()>>,
    visibility: Visibility,
}

impl PollerHandle {
    /// Runs an extra cycle as soon as the current one (if any) finishes.
    /// Requests made while one is already pending collapse into one.
    pub fn refresh_now(&self) {
        self.signal.request_refresh();
    }

    /// Records a visibility change. Becoming visible after being hidden
    /// triggers an immediate refresh; returns whether it did.
    pub fn set_visibility(&mut self, visibility: Visibility) -> bool {
        let became_visible =
            self.visibility == Visibility::Hidden && visibility == Visibility::Visible;
        self.visibility = visibility;
        if became_visible {
            self.refresh_now();
        }
        became_visible
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Cancels the worker and waits for the in-flight cycle to finish.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.signal.cancel();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                logging::error(DataSource::System, None, "poller thread panicked");
            }
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
