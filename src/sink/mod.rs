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

//! Various sinks that durably persist rendered log lines.

use std::fmt;

use crate::SinkError;

mod daily;
mod file;
#[cfg(feature = "non-blocking")]
mod non_blocking;
mod null;
#[cfg(feature = "webhook")]
mod webhook;

pub use daily::DailyFileSink;
pub use file::FileSink;
#[cfg(feature = "non-blocking")]
pub use non_blocking::NonBlocking;
#[cfg(feature = "non-blocking")]
pub use non_blocking::NonBlockingBuilder;
#[cfg(feature = "non-blocking")]
pub use non_blocking::WorkerGuard;
pub use null::NullSink;
#[cfg(feature = "webhook")]
pub use webhook::WebhookSink;

/// A trait representing a destination that persists rendered log lines.
///
/// Implementations must serialize concurrent writes to a shared resource
/// internally (one lock per sink instance) so that lines from concurrent
/// callers never interleave.
pub trait Sink: fmt::Debug + Send + Sync + 'static {
    /// Persists one rendered line.
    fn write(&self, formatted: &str) -> Result<(), SinkError>;

    /// Flushes any buffered lines.
    fn flush(&self) {}
}
