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

//! Logroute is a channel-based log routing and formatting engine: named
//! channels map records to one or more sinks, stacks fan a record out to
//! member channels, and each channel applies its own minimum level and
//! formatter.
//!
//! # Overview
//!
//! A [`Router`] is built once from an ordered sequence of channel
//! configurations and is immutable afterwards. Dispatching resolves the
//! requested channel names to their sinks, filters per sink by severity,
//! renders with the channel's layout, and writes. Per-sink failures never
//! abort the dispatch; they are collected and reported in aggregate, so the
//! caller can distinguish full success, partial success, and total failure.
//!
//! # Examples
//!
//! Simple setup with a discarding channel:
//!
//! ```
//! use logroute::ContextMap;
//! use logroute::Router;
//! use logroute::Severity;
//! use logroute::config::ChannelConfig;
//!
//! let router = Router::builder()
//!     .channel(ChannelConfig::null("audit"))
//!     .build()
//!     .unwrap();
//!
//! let summary = router
//!     .log(&["audit"], Severity::Info, "user signed in", ContextMap::new())
//!     .unwrap();
//! assert_eq!(summary.written, 1);
//! ```
//!
//! Advanced setup with files, a daily-rotating channel, and a stack:
//!
//! ```no_run
//! use logroute::ContextMap;
//! use logroute::Router;
//! use logroute::Severity;
//! use logroute::config::ChannelConfig;
//!
//! let router = Router::builder()
//!     .channel(ChannelConfig::single("single", "logs/app.log"))
//!     .channel(
//!         ChannelConfig::daily("errors", "logs/errors.log", Some(30))
//!             .min_level(Severity::Error),
//!     )
//!     .channel(ChannelConfig::stack("stack", ["single", "errors"]))
//!     .build()
//!     .unwrap();
//!
//! let context = ContextMap::new().with("attempts", 3);
//! router
//!     .log(&["stack"], Severity::Error, "Failed Login", context)
//!     .unwrap();
//! ```

pub mod analysis;
mod clock;
pub mod config;
mod error;
pub mod layout;
mod record;
mod router;
mod severity;
pub mod sink;

pub use clock::Clock;
pub use error::AnalysisError;
pub use error::ConfigError;
pub use error::DispatchError;
pub use error::DispatchResult;
pub use error::DispatchSummary;
pub use error::PartialDispatch;
pub use error::SinkError;
pub use error::SinkFailure;
pub use layout::Layout;
pub use record::ContextMap;
pub use record::Record;
pub use record::Value;
pub use router::CustomChannel;
pub use router::Router;
pub use router::RouterBuilder;
pub use severity::Severity;
pub use severity::UnknownSeverity;
pub use sink::Sink;
