//! # Pollbar - Download Progress Poller
//!
//! Pollbar watches a server-side download through a progress endpoint.
//! On trigger it shows a progress display reset to `0%`, polls
//! `GET /progress` every 500ms, and renders each `{"progress": <number>}`
//! reading until the download reaches 100% or a poll fails.
//!
//! ## Features
//!
//! - **Fixed-period polling**: Each tick fetches independently, so a slow
//!   request never delays the next one
//! - **Clamped text**: `42.3%` style text capped at `100.0%`
//! - **Terminal rendering**: indicatif progress bar, or any custom display
//! - **Explicit sessions**: Cancel, replace or reject overlapping sessions
//! - **Bounded polling**: Optional attempt budget and deadline
//!
//! ## Quick Start
//!
//! ```no_run
//! use pollbar::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn demo() -> pollbar::Result<()> {
//! let config = PollerConfig {
//!     max_polls: Some(600),
//!     ..PollerConfig::for_url("http://localhost:5000")
//! };
//!
//! let poller = ProgressPoller::from_config(config, Arc::new(TerminalDisplay::new()))?;
//! let outcome = poller.trigger()?.wait().await;
//!
//! if outcome.is_success() {
//!     println!("Download finished after {} polls", outcome.polls);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Custom Displays
//!
//! ```no_run
//! use pollbar::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn demo() -> pollbar::Result<()> {
//! let display = Arc::new(RecordingDisplay::new());
//! let poller = ProgressPoller::from_config(
//!     PollerConfig::for_url("http://localhost:5000"),
//!     display.clone(),
//! )?;
//!
//! poller.trigger()?.wait().await;
//! println!("Texts shown: {:?}", display.texts());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod config;
pub mod error;
pub mod poller;
pub mod progress;

// Re-export commonly used types
pub use config::{OverlapPolicy, PollerConfig, WidthMode};
pub use error::{PollerError, Result};
pub use poller::{PollSession, ProgressPoller, SessionEnd, SessionOutcome};
pub use progress::{ProgressDisplay, ProgressReading};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    //! Convenient re-exports for common usage
    //!
    //! ```no_run
    //! use pollbar::prelude::*;
    //! ```

    pub use crate::client::{HttpProgressSource, ProgressSource};
    pub use crate::config::{OverlapPolicy, PollerConfig, WidthMode};
    pub use crate::error::{PollerError, Result};
    pub use crate::poller::{PollSession, ProgressPoller, SessionEnd, SessionOutcome};
    pub use crate::progress::{ProgressDisplay, ProgressReading, RecordingDisplay, TerminalDisplay};
}
