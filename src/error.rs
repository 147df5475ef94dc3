// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt;

/// Errors detected while building a [`Router`](crate::Router) from channel
/// configuration. Any of these aborts startup; the router is never built with
/// a partially valid channel table.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("channel {0:?} is defined more than once")]
    DuplicateChannel(String),
    #[error("stack {stack:?} references unknown channel {member:?}")]
    UnknownMember { stack: String, member: String },
    #[error("cyclic stack definition: {}", cycle.join(" -> "))]
    CyclicChannel { cycle: Vec<String> },
    #[cfg(feature = "webhook")]
    #[error("failed to initialize webhook client for channel {channel:?}: {source}")]
    WebhookInit {
        channel: String,
        source: reqwest::Error,
    },
}

/// An error from a single sink write. Per-sink errors are recoverable: the
/// router keeps dispatching to the remaining sinks and reports them in
/// aggregate as a [`PartialDispatch`].
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "webhook")]
    #[error("webhook request failed: {0}")]
    Remote(#[from] reqwest::Error),
    #[cfg(feature = "webhook")]
    #[error("webhook endpoint returned status {0}")]
    RemoteStatus(u16),
    #[error("dispatch deadline exceeded before this sink was attempted")]
    DeadlineExceeded,
}

/// One failed (channel, sink) pair within a dispatch.
#[derive(Debug)]
pub struct SinkFailure {
    /// The resolved channel the sink belongs to.
    pub channel: String,
    /// A human-readable description of the sink target.
    pub sink: String,
    pub error: SinkError,
}

impl fmt::Display for SinkFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}: {}", self.channel, self.sink, self.error)
    }
}

/// The aggregate failure detail of a dispatch in which at least one sink
/// failed. `succeeded == 0` means total failure; the caller can distinguish
/// full success, partial success, and total failure.
#[derive(Debug)]
pub struct PartialDispatch {
    /// Sinks that were attempted or should have been attempted before the
    /// deadline, excluding those skipped by level filtering.
    pub attempted: usize,
    pub succeeded: usize,
    pub failures: Vec<SinkFailure>,
}

impl PartialDispatch {
    /// Returns whether no sink write succeeded at all.
    pub fn is_total_failure(&self) -> bool {
        self.succeeded == 0
    }
}

impl fmt::Display for PartialDispatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} sink writes failed:",
            self.failures.len(),
            self.attempted
        )?;
        for failure in &self.failures {
            write!(f, " [{failure}]")?;
        }
        Ok(())
    }
}

impl std::error::Error for PartialDispatch {}

/// The error side of a dispatch result.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The caller referenced a channel that does not exist. This is a
    /// programming error and fails the whole dispatch before any write.
    #[error("unknown channel: {0:?}")]
    UnknownChannel(String),
    #[error(transparent)]
    Partial(#[from] PartialDispatch),
}

/// A count of what a successful dispatch did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Sinks that received a write.
    pub written: usize,
    /// Sinks skipped because the record's level was below their minimum.
    pub skipped: usize,
}

/// The structured outcome of a dispatch.
pub type DispatchResult = Result<DispatchSummary, DispatchError>;

/// The error returned when an analysis target file cannot be read.
///
/// Unlike dispatch, the analysis read path has no partial-result semantics:
/// a missing file is a hard error.
#[derive(Debug, thiserror::Error)]
#[error("failed to read log file {path:?}: {source}")]
pub struct AnalysisError {
    pub path: std::path::PathBuf,
    #[source]
    pub source: std::io::Error,
}
