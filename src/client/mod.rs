//! Progress sources
//!
//! A [`ProgressSource`] yields one [`ProgressReading`] per call. The poller
//! only talks to this trait; [`HttpProgressSource`] is the production
//! implementation against `GET /progress`.

mod http;

pub use http::*;

use crate::error::Result;
use crate::progress::ProgressReading;
use async_trait::async_trait;

/// Anything that can be asked for the current download progress
#[async_trait]
pub trait ProgressSource: Send + Sync {
    /// Fetch one reading. Any error ends the poll session.
    async fn fetch(&self) -> Result<ProgressReading>;

    /// Human-readable location, used in logs
    fn describe(&self) -> String;
}
