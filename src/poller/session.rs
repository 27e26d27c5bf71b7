//! Poll sessions
//!
//! A session owns the recurring timer for one trigger. Each tick spawns an
//! independent fetch so a slow request never holds back the next tick;
//! readings are applied in the order their requests resolve. The session
//! ends on the first complete reading, the first failure, a timeout, or
//! cancellation.

use crate::client::ProgressSource;
use crate::config::PollerConfig;
use crate::error::{PollerError, Result};
use crate::progress::{ProgressDisplay, ProgressReading};
use futures::future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Why a session was asked to stop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StopSignal {
    Running,
    /// Stop and hide the display
    Cancel,
    /// Stop without touching the display; a newer session owns it
    Supersede,
}

/// How a session ended
#[derive(Debug)]
pub enum SessionEnd {
    /// A reading reached 100%
    Completed {
        /// Raw value of the completing reading
        progress: f64,
    },
    /// A poll failed
    Failed(PollerError),
    /// The attempt budget or deadline ran out
    TimedOut(PollerError),
    /// Cancelled through [`PollSession::cancel`]
    Cancelled,
    /// Replaced by a newer session
    Superseded,
}

/// Result of a finished session
#[derive(Debug)]
pub struct SessionOutcome {
    /// Session id
    pub session: u64,
    /// Requests issued
    pub polls: u64,
    /// Time from trigger to end, hide delay included
    pub elapsed: Duration,
    /// How the session ended
    pub end: SessionEnd,
}

impl SessionOutcome {
    /// Whether the download was observed to complete
    pub fn is_success(&self) -> bool {
        matches!(self.end, SessionEnd::Completed { .. })
    }

    /// The error that ended the session, if any
    pub fn error(&self) -> Option<&PollerError> {
        match &self.end {
            SessionEnd::Failed(e) | SessionEnd::TimedOut(e) => Some(e),
            _ => None,
        }
    }

    /// Convert into a `Result`, keeping the completing progress value
    pub fn into_result(self) -> Result<f64> {
        match self.end {
            SessionEnd::Completed { progress } => Ok(progress),
            SessionEnd::Failed(e) | SessionEnd::TimedOut(e) => Err(e),
            SessionEnd::Cancelled | SessionEnd::Superseded => Err(PollerError::Cancelled),
        }
    }
}

/// Shared handle used to stop a session from outside its task
#[derive(Debug, Clone)]
pub(crate) struct SessionControl {
    id: u64,
    stop: Arc<watch::Sender<StopSignal>>,
    finished: Arc<AtomicBool>,
}

impl SessionControl {
    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }

    /// Send a stop signal; the first one wins
    pub(crate) fn stop(&self, signal: StopSignal) {
        self.stop.send_if_modified(|current| {
            if *current == StopSignal::Running {
                *current = signal;
                true
            } else {
                false
            }
        });
    }
}

/// Id of the session currently allowed to write to the shared display.
///
/// Display writes go through the lock, so a session that lost ownership
/// can never hide or overwrite a newer session's display, whether or not
/// it has seen its stop signal yet.
#[derive(Debug, Clone, Default)]
pub(crate) struct DisplayOwner(Arc<Mutex<u64>>);

impl DisplayOwner {
    /// Make `id` the owner and run `f` before anyone else can write
    pub(crate) fn claim(&self, id: u64, f: impl FnOnce()) {
        let mut owner = self.0.lock().unwrap_or_else(|p| p.into_inner());
        *owner = id;
        f();
    }

    /// Run `f` only while `id` still owns the display
    pub(crate) fn if_owner(&self, id: u64, f: impl FnOnce()) -> bool {
        let owner = self.0.lock().unwrap_or_else(|p| p.into_inner());
        if *owner == id {
            f();
            true
        } else {
            false
        }
    }

    /// Current owner id (0 before any claim)
    #[cfg(test)]
    pub(crate) fn current(&self) -> u64 {
        *self.0.lock().unwrap_or_else(|p| p.into_inner())
    }
}

/// Handle to a running poll session
pub struct PollSession {
    control: SessionControl,
    handle: JoinHandle<SessionOutcome>,
}

impl PollSession {
    /// Show the display and start polling on the current tokio runtime
    pub(crate) fn start(
        id: u64,
        config: Arc<PollerConfig>,
        source: Arc<dyn ProgressSource>,
        display: Arc<dyn ProgressDisplay>,
        owner: DisplayOwner,
    ) -> Self {
        owner.claim(id, || {
            display.show();
            display.set_text("0%");
            display.set_bar_width("0%");
        });

        let (stop_tx, stop_rx) = watch::channel(StopSignal::Running);
        let control = SessionControl {
            id,
            stop: Arc::new(stop_tx),
            finished: Arc::new(AtomicBool::new(false)),
        };

        info!(session = id, source = %source.describe(), interval = ?config.interval(), "Poll session started");

        let driver = SessionDriver {
            id,
            config,
            source,
            display,
            owner,
            stop: stop_rx,
            started: Instant::now(),
            polls: 0,
        };
        let finished = Arc::clone(&control.finished);
        let handle = tokio::spawn(async move {
            let outcome = driver.run().await;
            finished.store(true, Ordering::SeqCst);
            outcome
        });

        Self { control, handle }
    }

    /// Session id
    pub fn id(&self) -> u64 {
        self.control.id
    }

    /// Stop polling and hide the display immediately
    pub fn cancel(&self) {
        self.control.stop(StopSignal::Cancel);
    }

    /// Whether the session has ended
    pub fn is_finished(&self) -> bool {
        self.control.is_finished()
    }

    pub(crate) fn control(&self) -> SessionControl {
        self.control.clone()
    }

    /// Wait for the session to end
    pub async fn wait(self) -> SessionOutcome {
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(_) => SessionOutcome {
                session: self.control.id,
                polls: 0,
                elapsed: Duration::ZERO,
                end: SessionEnd::Cancelled,
            },
        }
    }
}

/// What the polling loop observed before stopping
enum LoopExit {
    Complete(ProgressReading),
    Failed(PollerError),
    TimedOut,
    Stopped(StopSignal),
}

struct SessionDriver {
    id: u64,
    config: Arc<PollerConfig>,
    source: Arc<dyn ProgressSource>,
    display: Arc<dyn ProgressDisplay>,
    owner: DisplayOwner,
    stop: watch::Receiver<StopSignal>,
    started: Instant,
    polls: u64,
}

impl SessionDriver {
    async fn run(mut self) -> SessionOutcome {
        let exit = self.poll_until_done().await;

        let end = match exit {
            LoopExit::Complete(reading) => {
                info!(session = self.id, polls = self.polls, progress = reading.progress, "Download complete");
                if self.wait_hide_delay().await != StopSignal::Supersede {
                    self.hide();
                }
                SessionEnd::Completed {
                    progress: reading.progress,
                }
            }
            LoopExit::Failed(e) => {
                warn!(session = self.id, polls = self.polls, error = %e, "Poll failed, stopping");
                self.hide();
                SessionEnd::Failed(e)
            }
            LoopExit::TimedOut => {
                let err = PollerError::PollTimeout {
                    polls: self.polls,
                    elapsed: self.started.elapsed(),
                };
                warn!(session = self.id, error = %err, "Giving up");
                self.hide();
                SessionEnd::TimedOut(err)
            }
            LoopExit::Stopped(StopSignal::Supersede) => {
                debug!(session = self.id, "Superseded by a newer session");
                SessionEnd::Superseded
            }
            LoopExit::Stopped(_) => {
                debug!(session = self.id, "Cancelled");
                self.hide();
                SessionEnd::Cancelled
            }
        };

        SessionOutcome {
            session: self.id,
            polls: self.polls,
            elapsed: self.started.elapsed(),
            end,
        }
    }

    /// Tick, fetch and apply readings until something ends the loop.
    /// Dropping the timer and the in-flight set on return stops all polling.
    async fn poll_until_done(&mut self) -> LoopExit {
        let period = self.config.interval();
        let mut ticker = time::interval_at(self.started + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let deadline = self.config.deadline().map(|d| self.started + d);
        let mut in_flight: JoinSet<Result<ProgressReading>> = JoinSet::new();
        let mut stop_open = true;

        loop {
            let deadline_sleep = async {
                match deadline {
                    Some(at) => time::sleep_until(at).await,
                    None => future::pending().await,
                }
            };

            tokio::select! {
                biased;

                changed = self.stop.changed(), if stop_open => {
                    match changed {
                        Ok(()) => {
                            let signal = *self.stop.borrow_and_update();
                            if signal != StopSignal::Running {
                                return LoopExit::Stopped(signal);
                            }
                        }
                        // Every control handle is gone; nobody can stop us any more
                        Err(_) => stop_open = false,
                    }
                }

                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    let result = joined.unwrap_or_else(|e| {
                        Err(PollerError::request(self.source.describe(), format!("poll task failed: {}", e)))
                    });
                    match result {
                        Ok(reading) => {
                            if !self.apply(&reading) {
                                return LoopExit::Stopped(StopSignal::Supersede);
                            }
                            if reading.is_complete() {
                                return LoopExit::Complete(reading);
                            }
                        }
                        Err(e) => return LoopExit::Failed(e),
                    }
                }

                _ = deadline_sleep => return LoopExit::TimedOut,

                _ = ticker.tick() => {
                    if let Some(max) = self.config.max_polls {
                        if self.polls >= max {
                            return LoopExit::TimedOut;
                        }
                    }
                    self.polls += 1;
                    debug!(session = self.id, poll = self.polls, "Polling");
                    let source = Arc::clone(&self.source);
                    in_flight.spawn(async move { source.fetch().await });
                }
            }
        }
    }

    /// Show a reading; false if a newer session owns the display
    fn apply(&self, reading: &ProgressReading) -> bool {
        self.owner.if_owner(self.id, || {
            self.display.set_text(&reading.text());
            self.display.set_bar_width(&reading.bar_width(self.config.width_mode));
        })
    }

    fn hide(&self) {
        if !self.owner.if_owner(self.id, || self.display.hide()) {
            debug!(session = self.id, "Display owned by a newer session, not hiding");
        }
    }

    /// Sleep out the hide delay; a stop signal cuts it short
    async fn wait_hide_delay(&mut self) -> StopSignal {
        let delay = time::sleep(self.config.hide_delay());
        tokio::pin!(delay);

        loop {
            tokio::select! {
                _ = &mut delay => return StopSignal::Running,
                changed = self.stop.changed() => {
                    if changed.is_err() {
                        delay.as_mut().await;
                        return StopSignal::Running;
                    }
                    let signal = *self.stop.borrow_and_update();
                    if signal != StopSignal::Running {
                        return signal;
                    }
                }
            }
        }
    }
}
