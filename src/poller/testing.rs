//! Scripted progress source for session tests

use crate::client::ProgressSource;
use crate::error::{PollerError, Result};
use crate::progress::ProgressReading;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// One scripted response
#[derive(Debug, Clone)]
pub(crate) enum Step {
    Reading(f64),
    /// Respond with a reading after a delay
    Delayed(Duration, f64),
    /// Transport failure
    Fail,
    /// Transport failure after a delay
    DelayedFail(Duration),
    /// Body that is not a progress reading
    Malformed,
}

/// Plays back a script of responses; the last step repeats once the script runs out
pub(crate) struct ScriptedSource {
    script: Mutex<VecDeque<Step>>,
    last: Mutex<Option<Step>>,
    calls: AtomicU64,
}

impl ScriptedSource {
    pub(crate) fn new(steps: Vec<Step>) -> Self {
        Self {
            script: Mutex::new(steps.into()),
            last: Mutex::new(None),
            calls: AtomicU64::new(0),
        }
    }

    /// Number of fetches started
    pub(crate) fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_step(&self) -> Step {
        let mut last = self.last.lock().unwrap();
        if let Some(step) = self.script.lock().unwrap().pop_front() {
            *last = Some(step);
        }
        last.clone().unwrap_or(Step::Fail)
    }
}

#[async_trait]
impl ProgressSource for ScriptedSource {
    async fn fetch(&self) -> Result<ProgressReading> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.next_step() {
            Step::Reading(p) => Ok(ProgressReading::new(p)),
            Step::Delayed(delay, p) => {
                tokio::time::sleep(delay).await;
                Ok(ProgressReading::new(p))
            }
            Step::Fail => Err(PollerError::request("scripted", "connection refused")),
            Step::DelayedFail(delay) => {
                tokio::time::sleep(delay).await;
                Err(PollerError::request("scripted", "connection reset"))
            }
            Step::Malformed => Err(serde_json::from_str::<ProgressReading>("{}")
                .map(|_| ())
                .unwrap_err()
                .into()),
        }
    }

    fn describe(&self) -> String {
        "scripted".to_string()
    }
}
