//! Progress poller
//!
//! [`ProgressPoller`] turns a trigger into a [`PollSession`]: it shows the
//! display, resets it to `0%`, and polls the source on a fixed period
//! until the download completes or a poll fails.
//!
//! ```no_run
//! use pollbar::config::PollerConfig;
//! use pollbar::poller::ProgressPoller;
//! use pollbar::progress::TerminalDisplay;
//! use std::sync::Arc;
//!
//! # async fn demo() -> pollbar::Result<()> {
//! let config = PollerConfig::for_url("http://localhost:5000");
//! let poller = ProgressPoller::from_config(config, Arc::new(TerminalDisplay::new()))?;
//!
//! let outcome = poller.trigger()?.wait().await;
//! println!("finished after {} polls", outcome.polls);
//! # Ok(())
//! # }
//! ```

mod session;

#[cfg(test)]
mod testing;

pub use session::{PollSession, SessionEnd, SessionOutcome};

use crate::client::{HttpProgressSource, ProgressSource};
use crate::config::{OverlapPolicy, PollerConfig};
use crate::error::{PollerError, Result};
use crate::progress::ProgressDisplay;
use session::{DisplayOwner, SessionControl, StopSignal};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Starts poll sessions against one source and one display
pub struct ProgressPoller {
    config: Arc<PollerConfig>,
    source: Arc<dyn ProgressSource>,
    display: Arc<dyn ProgressDisplay>,
    /// Most recently started session
    active: Mutex<Option<SessionControl>>,
    /// Session allowed to write to the display
    owner: DisplayOwner,
    next_id: AtomicU64,
}

impl ProgressPoller {
    /// Create a poller over an arbitrary source
    pub fn new(
        config: PollerConfig,
        source: Arc<dyn ProgressSource>,
        display: Arc<dyn ProgressDisplay>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            source,
            display,
            active: Mutex::new(None),
            owner: DisplayOwner::default(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Create a poller that fetches readings over HTTP
    pub fn from_config(config: PollerConfig, display: Arc<dyn ProgressDisplay>) -> Result<Self> {
        config.validate()?;
        let source = HttpProgressSource::new(&config)?;
        Ok(Self::new(config, Arc::new(source), display))
    }

    /// Poller configuration
    pub fn config(&self) -> &PollerConfig {
        &self.config
    }

    /// Start a new session.
    ///
    /// Must be called from within a tokio runtime. With
    /// [`OverlapPolicy::Replace`] a running session is stopped first and
    /// leaves the display to the new one; with [`OverlapPolicy::Reject`]
    /// this returns [`PollerError::SessionActive`] instead.
    pub fn trigger(&self) -> Result<PollSession> {
        let mut active = self.active.lock().unwrap_or_else(|p| p.into_inner());

        if let Some(current) = active.as_ref().filter(|c| !c.is_finished()) {
            match self.config.overlap {
                OverlapPolicy::Reject => return Err(PollerError::SessionActive),
                OverlapPolicy::Replace => {
                    debug!(session = current.id(), "Replacing active session");
                    current.stop(StopSignal::Supersede);
                }
            }
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let session = PollSession::start(
            id,
            Arc::clone(&self.config),
            Arc::clone(&self.source),
            Arc::clone(&self.display),
            self.owner.clone(),
        );
        *active = Some(session.control());
        Ok(session)
    }

    /// Cancel the running session, hiding the display. Returns false if none was running.
    pub fn cancel_active(&self) -> bool {
        let active = self.active.lock().unwrap_or_else(|p| p.into_inner());
        match active.as_ref().filter(|c| !c.is_finished()) {
            Some(current) => {
                current.stop(StopSignal::Cancel);
                true
            }
            None => false,
        }
    }

    /// Whether a session is still running
    pub fn is_active(&self) -> bool {
        let active = self.active.lock().unwrap_or_else(|p| p.into_inner());
        active.as_ref().is_some_and(|c| !c.is_finished())
    }
}
