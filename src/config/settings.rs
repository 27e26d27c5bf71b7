//! Configuration settings for Pollbar
//!
//! Defines all configuration options, CLI arguments, and defaults
//! for a poll session.

use crate::error::{IoResultExt, PollerError, Result};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Pollbar - watch a server-side download through its progress endpoint
#[derive(Parser, Debug, Clone)]
#[command(name = "pollbar")]
#[command(author = "Pollbar Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Poll a progress endpoint and render it as a progress bar")]
#[command(long_about = r#"
Pollbar polls a server's progress endpoint and renders the reported
percentage as a terminal progress bar until the download completes.

The endpoint must answer GET requests with {"progress": <number>}.
Polling stops at 100% (the bar is cleared one second later) or at the
first failed request (the bar is cleared immediately).

Examples:
  pollbar http://localhost:5000                     # Poll /progress every 500ms
  pollbar http://host:5000 --interval 1s            # Slower polling
  pollbar http://host:5000 --deadline 10m           # Give up after ten minutes
  pollbar --config pollbar.json                     # Settings from a file
"#)]
pub struct CliArgs {
    /// Base URL of the server exposing the progress endpoint
    #[arg(value_name = "URL", env = "POLLBAR_URL")]
    pub url: Option<String>,

    /// Path of the progress endpoint
    #[arg(long, value_name = "PATH")]
    pub path: Option<String>,

    /// Polling period (e.g. 500ms, 1s)
    #[arg(short = 'i', long, value_name = "DURATION")]
    pub interval: Option<String>,

    /// Delay before clearing the bar after completion
    #[arg(long, value_name = "DURATION")]
    pub hide_delay: Option<String>,

    /// Give up after this many requests
    #[arg(long, value_name = "NUM")]
    pub max_polls: Option<u64>,

    /// Give up after this long (e.g. 30s, 10m)
    #[arg(long, value_name = "DURATION")]
    pub deadline: Option<String>,

    /// Per-request timeout
    #[arg(long, value_name = "DURATION")]
    pub request_timeout: Option<String>,

    /// Cap the bar width at 100% like the text
    #[arg(long)]
    pub clamp_width: bool,

    /// JSON configuration file
    #[arg(short = 'c', long, value_name = "PATH", env = "POLLBAR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (no progress bar, no summary)
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,
}

/// How the bar width relates to the reported value
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WidthMode {
    /// Width follows the raw reading, even above 100
    #[default]
    Raw,
    /// Width is capped at 100 like the text
    Clamped,
}

/// What a new trigger does while a session is still running
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OverlapPolicy {
    /// Cancel the running session and start a new one
    #[default]
    Replace,
    /// Refuse the new trigger
    Reject,
}

/// Runtime configuration for a poller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollerConfig {
    /// Base URL of the server
    pub base_url: String,
    /// Progress endpoint path
    pub path: String,
    /// Polling period in milliseconds
    pub interval_ms: u64,
    /// Delay before hiding after completion, in milliseconds
    pub hide_delay_ms: u64,
    /// Maximum number of requests per session
    pub max_polls: Option<u64>,
    /// Session deadline in milliseconds
    pub deadline_ms: Option<u64>,
    /// Per-request timeout in milliseconds
    pub request_timeout_ms: Option<u64>,
    /// Bar width mode
    pub width_mode: WidthMode,
    /// Overlapping trigger policy
    pub overlap: OverlapPolicy,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            path: "/progress".to_string(),
            interval_ms: 500,
            hide_delay_ms: 1000,
            max_polls: None,
            deadline_ms: None,
            request_timeout_ms: None,
            width_mode: WidthMode::Raw,
            overlap: OverlapPolicy::Replace,
        }
    }
}

impl PollerConfig {
    /// Config targeting `base_url` with all other settings at their defaults
    pub fn for_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Polling period
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Delay before hiding after completion
    pub fn hide_delay(&self) -> Duration {
        Duration::from_millis(self.hide_delay_ms)
    }

    /// Session deadline, if any
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_ms.map(Duration::from_millis)
    }

    /// Per-request timeout, if any
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    /// Full URL of the progress endpoint
    pub fn endpoint(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        if self.path.starts_with('/') {
            format!("{}{}", base, self.path)
        } else {
            format!("{}/{}", base, self.path)
        }
    }

    /// Load a config from a JSON file; missing fields take defaults
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).with_path(path)?;
        serde_json::from_str(&content)
            .map_err(|e| PollerError::config(format!("Invalid config file {:?}: {}", path, e)))
    }

    /// Check the settings a session depends on
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(PollerError::config("Server URL required"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(PollerError::config(format!(
                "Server URL must start with http:// or https://: {}",
                self.base_url
            )));
        }
        if self.interval_ms == 0 {
            return Err(PollerError::config("Polling interval must be greater than zero"));
        }
        if self.max_polls == Some(0) {
            return Err(PollerError::config("max_polls must be greater than zero"));
        }
        Ok(())
    }

    /// Create config from CLI arguments, layered over the config file if one is given
    pub fn from_cli(args: &CliArgs) -> std::result::Result<Self, String> {
        let mut config = match &args.config {
            Some(path) => Self::load(path).map_err(|e| e.to_string())?,
            None => Self::default(),
        };

        if let Some(url) = &args.url {
            config.base_url = url.clone();
        }
        if let Some(path) = &args.path {
            config.path = path.clone();
        }
        if let Some(interval) = &args.interval {
            config.interval_ms = parse_millis(interval).map_err(|e| format!("Invalid interval: {}", e))?;
        }
        if let Some(delay) = &args.hide_delay {
            config.hide_delay_ms = parse_millis(delay).map_err(|e| format!("Invalid hide delay: {}", e))?;
        }
        if args.max_polls.is_some() {
            config.max_polls = args.max_polls;
        }
        if let Some(deadline) = &args.deadline {
            config.deadline_ms = Some(parse_millis(deadline).map_err(|e| format!("Invalid deadline: {}", e))?);
        }
        if let Some(timeout) = &args.request_timeout {
            config.request_timeout_ms =
                Some(parse_millis(timeout).map_err(|e| format!("Invalid request timeout: {}", e))?);
        }
        if args.clamp_width {
            config.width_mode = WidthMode::Clamped;
        }

        config.validate().map_err(|e| e.to_string())?;
        Ok(config)
    }
}

/// Parse a human-readable duration ("500ms", "2s", "1m 30s") into milliseconds
pub fn parse_millis(input: &str) -> std::result::Result<u64, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("Empty duration string".to_string());
    }
    // Bare numbers are milliseconds
    if let Ok(ms) = input.parse::<u64>() {
        return Ok(ms);
    }
    humantime::parse_duration(input)
        .map(|d| d.as_millis() as u64)
        .map_err(|e| format!("{}: {}", input, e))
}
