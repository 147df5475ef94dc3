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

//! Channel configuration consumed at router build time.
//!
//! Configuration is an ordered sequence of [`ChannelConfig`] entries plus
//! [`Defaults`]. It is immutable once the router is built; sink and formatter
//! composition is fixed at resolution time and never mutated afterwards.

use std::path::PathBuf;

use serde::Deserialize;

use crate::Layout;
use crate::Severity;
use crate::layout::LineLayout;
use crate::layout::PerformanceLayout;

/// Global defaults applied to channels that leave a knob unset.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Defaults {
    /// The channel dispatched to when the caller names none. Not required
    /// to be declared; dispatching with an empty channel list when it is
    /// not reports [`DispatchError::UnknownChannel`](crate::DispatchError).
    pub channel: String,
    /// Minimum level for channels without an explicit one.
    pub min_level: Severity,
    /// Bounded timeout for webhook pushes, in milliseconds.
    pub webhook_timeout_ms: u64,
    /// Retention window for daily channels without an explicit one, in days.
    pub retention_days: u16,
}

impl Default for Defaults {
    fn default() -> Defaults {
        Defaults {
            channel: "stack".to_string(),
            min_level: Severity::Debug,
            webhook_timeout_ms: 5000,
            retention_days: 14,
        }
    }
}

/// The driver of a channel: what sink(s) it resolves to.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "driver", rename_all = "lowercase")]
pub enum ChannelKind {
    /// Appends to a single fixed file.
    Single { path: PathBuf },
    /// Appends to a dated file, rotated daily, pruned after `days`.
    Daily {
        path: PathBuf,
        #[serde(default)]
        days: Option<u16>,
    },
    /// Fans out to the named member channels, in declared order.
    Stack { channels: Vec<String> },
    /// Pushes to a webhook endpoint.
    #[cfg(feature = "webhook")]
    Webhook { url: String },
    /// Discards everything.
    Null,
}

/// Identifies a formatter in channel configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatterKind {
    Line,
    Performance,
}

impl FormatterKind {
    pub(crate) fn layout(self) -> Layout {
        match self {
            FormatterKind::Line => Layout::Line(LineLayout),
            FormatterKind::Performance => Layout::Performance(PerformanceLayout),
        }
    }
}

/// A named, configured route for log records.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelConfig {
    pub name: String,
    #[serde(flatten)]
    pub kind: ChannelKind,
    /// Minimum level for this channel; falls back to [`Defaults::min_level`].
    /// For a stack, this acts as a floor over the member thresholds.
    #[serde(default)]
    pub min_level: Option<Severity>,
    /// Formatter override; the line formatter is the default.
    #[serde(default)]
    pub formatter: Option<FormatterKind>,
}

impl ChannelConfig {
    pub fn single(name: impl Into<String>, path: impl Into<PathBuf>) -> ChannelConfig {
        ChannelConfig {
            name: name.into(),
            kind: ChannelKind::Single { path: path.into() },
            min_level: None,
            formatter: None,
        }
    }

    /// A daily-rotating channel. `days` of `None` falls back to
    /// [`Defaults::retention_days`].
    pub fn daily(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        days: Option<u16>,
    ) -> ChannelConfig {
        ChannelConfig {
            name: name.into(),
            kind: ChannelKind::Daily {
                path: path.into(),
                days,
            },
            min_level: None,
            formatter: None,
        }
    }

    pub fn stack<I, S>(name: impl Into<String>, channels: I) -> ChannelConfig
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ChannelConfig {
            name: name.into(),
            kind: ChannelKind::Stack {
                channels: channels.into_iter().map(Into::into).collect(),
            },
            min_level: None,
            formatter: None,
        }
    }

    #[cfg(feature = "webhook")]
    pub fn webhook(name: impl Into<String>, url: impl Into<String>) -> ChannelConfig {
        ChannelConfig {
            name: name.into(),
            kind: ChannelKind::Webhook { url: url.into() },
            min_level: None,
            formatter: None,
        }
    }

    pub fn null(name: impl Into<String>) -> ChannelConfig {
        ChannelConfig {
            name: name.into(),
            kind: ChannelKind::Null,
            min_level: None,
            formatter: None,
        }
    }

    /// Sets the minimum level of this channel.
    #[must_use]
    pub fn min_level(mut self, min_level: Severity) -> ChannelConfig {
        self.min_level = Some(min_level);
        self
    }

    /// Sets the formatter override of this channel.
    #[must_use]
    pub fn formatter(mut self, formatter: FormatterKind) -> ChannelConfig {
        self.formatter = Some(formatter);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_channel_sequence() {
        let configs: Vec<ChannelConfig> = serde_json::from_str(
            r#"[
                {"name": "single", "driver": "single", "path": "logs/app.log"},
                {"name": "errors", "driver": "daily", "path": "logs/errors.log",
                 "days": 30, "min_level": "error"},
                {"name": "performance", "driver": "single", "path": "logs/performance.log",
                 "formatter": "performance"},
                {"name": "stack", "driver": "stack", "channels": ["single", "errors"]},
                {"name": "deprecations", "driver": "null"}
            ]"#,
        )
        .unwrap();

        assert_eq!(configs.len(), 5);
        assert!(matches!(configs[0].kind, ChannelKind::Single { .. }));
        assert!(matches!(
            configs[1].kind,
            ChannelKind::Daily { days: Some(30), .. }
        ));
        assert_eq!(configs[1].min_level, Some(Severity::Error));
        assert_eq!(configs[2].formatter, Some(FormatterKind::Performance));
        assert!(matches!(configs[4].kind, ChannelKind::Null));
    }

    #[test]
    fn test_defaults_deserialize_partially() {
        let defaults: Defaults =
            serde_json::from_str(r#"{"channel": "single", "min_level": "info"}"#).unwrap();
        assert_eq!(defaults.channel, "single");
        assert_eq!(defaults.min_level, Severity::Info);
        assert_eq!(defaults.webhook_timeout_ms, 5000);
        assert_eq!(defaults.retention_days, 14);
    }
}
