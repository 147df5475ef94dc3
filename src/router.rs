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

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use crate::Clock;
use crate::ContextMap;
use crate::Layout;
use crate::Record;
use crate::Severity;
use crate::config::ChannelConfig;
use crate::config::ChannelKind;
use crate::config::Defaults;
use crate::error::ConfigError;
use crate::error::DispatchError;
use crate::error::DispatchResult;
use crate::error::DispatchSummary;
use crate::error::PartialDispatch;
use crate::error::SinkError;
use crate::error::SinkFailure;
use crate::sink::DailyFileSink;
use crate::sink::FileSink;
use crate::sink::NullSink;
use crate::sink::Sink;
#[cfg(feature = "webhook")]
use crate::sink::WebhookSink;

/// One resolved dispatch target: a sink, the minimum level guarding it, and
/// the layout that renders records for it.
#[derive(Debug, Clone)]
struct Triple {
    channel: String,
    target: String,
    sink: Arc<dyn Sink>,
    min_level: Severity,
    layout: Layout,
}

/// A programmatically registered channel backed by a caller-supplied sink.
///
/// Custom channels participate in resolution like configured ones: they can
/// be dispatched to directly and referenced as stack members. This is the
/// seam for wrapping a sink in [`NonBlocking`](crate::sink::NonBlocking) or
/// plugging in a sink the configuration format does not know about.
#[derive(Debug)]
pub struct CustomChannel {
    name: String,
    sink: Arc<dyn Sink>,
    min_level: Option<Severity>,
    layout: Option<Layout>,
}

impl CustomChannel {
    pub fn new(name: impl Into<String>, sink: impl Sink) -> CustomChannel {
        CustomChannel {
            name: name.into(),
            sink: Arc::new(sink),
            min_level: None,
            layout: None,
        }
    }

    /// Sets the minimum level of this channel.
    #[must_use]
    pub fn min_level(mut self, min_level: Severity) -> CustomChannel {
        self.min_level = Some(min_level);
        self
    }

    /// Sets the layout of this channel.
    #[must_use]
    pub fn layout(mut self, layout: impl Into<Layout>) -> CustomChannel {
        self.layout = Some(layout.into());
        self
    }
}

/// A builder for configuring a [`Router`].
#[derive(Debug, Default)]
pub struct RouterBuilder {
    channels: Vec<ChannelConfig>,
    custom: Vec<CustomChannel>,
    defaults: Defaults,
    clock: Clock,
}

impl RouterBuilder {
    /// Adds a channel. Declaration order is the fan-out order for stacks.
    #[must_use = "call `build` to construct the router"]
    pub fn channel(mut self, config: ChannelConfig) -> Self {
        self.channels.push(config);
        self
    }

    /// Adds a sequence of channels, preserving their order.
    #[must_use = "call `build` to construct the router"]
    pub fn channels(mut self, configs: impl IntoIterator<Item = ChannelConfig>) -> Self {
        self.channels.extend(configs);
        self
    }

    /// Adds a programmatic channel backed by a caller-supplied sink.
    #[must_use = "call `build` to construct the router"]
    pub fn custom(mut self, channel: CustomChannel) -> Self {
        self.custom.push(channel);
        self
    }

    /// Sets the global defaults.
    #[must_use = "call `build` to construct the router"]
    pub fn defaults(mut self, defaults: Defaults) -> Self {
        self.defaults = defaults;
        self
    }

    #[cfg(test)]
    fn clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Resolves every channel to its flat triple sequence and builds the
    /// router.
    ///
    /// # Errors
    ///
    /// Any configuration error aborts the build; the router is never
    /// constructed with a partially valid channel table. Cyclic stack
    /// membership is detected here, by a depth-first walk with a visiting
    /// set, and reported as [`ConfigError::CyclicChannel`] naming the cycle.
    pub fn build(self) -> Result<Router, ConfigError> {
        let mut configs: HashMap<&str, &ChannelConfig> = HashMap::new();
        for config in &self.channels {
            if configs.insert(config.name.as_str(), config).is_some() {
                return Err(ConfigError::DuplicateChannel(config.name.clone()));
            }
        }
        let mut customs: HashMap<&str, &CustomChannel> = HashMap::new();
        for channel in &self.custom {
            if configs.contains_key(channel.name.as_str())
                || customs.insert(channel.name.as_str(), channel).is_some()
            {
                return Err(ConfigError::DuplicateChannel(channel.name.clone()));
            }
        }

        let mut resolver = Resolver {
            configs: &configs,
            customs: &customs,
            defaults: &self.defaults,
            resolved: HashMap::new(),
            visiting: Vec::new(),
        };
        for channel in &self.custom {
            resolver.resolve(&channel.name)?;
        }
        for config in &self.channels {
            resolver.resolve(&config.name)?;
        }

        Ok(Router {
            table: resolver.resolved,
            default_channel: self.defaults.channel.clone(),
            clock: self.clock,
        })
    }
}

struct Resolver<'a> {
    configs: &'a HashMap<&'a str, &'a ChannelConfig>,
    customs: &'a HashMap<&'a str, &'a CustomChannel>,
    defaults: &'a Defaults,
    resolved: HashMap<String, Vec<Triple>>,
    visiting: Vec<String>,
}

impl Resolver<'_> {
    fn resolve(&mut self, name: &str) -> Result<Vec<Triple>, ConfigError> {
        if let Some(triples) = self.resolved.get(name) {
            return Ok(triples.clone());
        }
        if let Some(pos) = self.visiting.iter().position(|n| n == name) {
            let mut cycle = self.visiting[pos..].to_vec();
            cycle.push(name.to_string());
            return Err(ConfigError::CyclicChannel { cycle });
        }

        if let Some(channel) = self.customs.get(name) {
            let triples = vec![Triple {
                channel: name.to_string(),
                target: format!("custom:{name}"),
                sink: channel.sink.clone(),
                min_level: channel.min_level.unwrap_or(self.defaults.min_level),
                layout: channel.layout.clone().unwrap_or_default(),
            }];
            self.resolved.insert(name.to_string(), triples.clone());
            return Ok(triples);
        }

        let config = match self.configs.get(name) {
            Some(config) => *config,
            None => {
                // Only reachable through a stack member; top-level names come
                // straight from the declared channel list.
                let stack = self.visiting.last().cloned().unwrap_or_default();
                return Err(ConfigError::UnknownMember {
                    stack,
                    member: name.to_string(),
                });
            }
        };

        let min_level = config.min_level.unwrap_or(self.defaults.min_level);
        let layout = config
            .formatter
            .map(|kind| kind.layout())
            .unwrap_or_default();

        let triples = match &config.kind {
            ChannelKind::Stack { channels } => {
                self.visiting.push(name.to_string());
                let mut triples = Vec::new();
                for member in channels {
                    triples.extend(self.resolve(member)?);
                }
                self.visiting.pop();
                // The stack's own minimum level is a floor over its members.
                if let Some(floor) = config.min_level {
                    for triple in &mut triples {
                        triple.min_level = triple.min_level.max(floor);
                    }
                }
                triples
            }
            ChannelKind::Single { path } => {
                vec![Triple {
                    channel: name.to_string(),
                    target: format!("file:{}", path.display()),
                    sink: Arc::new(FileSink::new(path)),
                    min_level,
                    layout,
                }]
            }
            ChannelKind::Daily { path, days } => {
                let days = days.unwrap_or(self.defaults.retention_days);
                vec![Triple {
                    channel: name.to_string(),
                    target: format!("daily:{}", path.display()),
                    sink: Arc::new(DailyFileSink::new(path, days)),
                    min_level,
                    layout,
                }]
            }
            #[cfg(feature = "webhook")]
            ChannelKind::Webhook { url } => {
                let timeout = std::time::Duration::from_millis(self.defaults.webhook_timeout_ms);
                let sink = WebhookSink::new(url, timeout).map_err(|source| {
                    ConfigError::WebhookInit {
                        channel: name.to_string(),
                        source,
                    }
                })?;
                vec![Triple {
                    channel: name.to_string(),
                    target: format!("webhook:{url}"),
                    sink: Arc::new(sink),
                    min_level,
                    layout,
                }]
            }
            ChannelKind::Null => {
                vec![Triple {
                    channel: name.to_string(),
                    target: "null".to_string(),
                    sink: Arc::new(NullSink),
                    min_level,
                    layout,
                }]
            }
        };

        self.resolved.insert(name.to_string(), triples.clone());
        Ok(triples)
    }
}

/// The dispatch core: resolves channel names to sinks and routes records.
///
/// The channel table is built once by [`RouterBuilder::build`] and is
/// read-only afterwards; no lock is taken for resolution. The one mandatory
/// lock lives inside each sink, serializing writes to its shared handle.
#[derive(Debug)]
pub struct Router {
    table: HashMap<String, Vec<Triple>>,
    default_channel: String,
    clock: Clock,
}

impl Router {
    /// Creates a new [`RouterBuilder`].
    #[must_use]
    pub fn builder() -> RouterBuilder {
        RouterBuilder::default()
    }

    /// The channel used when a dispatch names none.
    pub fn default_channel(&self) -> &str {
        &self.default_channel
    }

    /// Builds a record from this router's clock and dispatches it to the
    /// given channels. An empty channel list routes to the default channel.
    pub fn log(
        &self,
        channels: &[&str],
        level: Severity,
        message: impl Into<String>,
        context: ContextMap,
    ) -> DispatchResult {
        let default = [self.default_channel.as_str()];
        let channels: &[&str] = if channels.is_empty() { &default } else { channels };
        let record = Record::new(channels[0], level, message, context, &self.clock);
        self.dispatch_to(channels, &record)
    }

    /// Dispatches a record to the channel it names.
    pub fn dispatch(&self, record: &Record) -> DispatchResult {
        self.dispatch_to(&[record.channel()], record)
    }

    /// Dispatches a record to an explicit ordered list of channels, the
    /// ad-hoc stack case.
    pub fn dispatch_to(&self, channels: &[&str], record: &Record) -> DispatchResult {
        self.dispatch_with_deadline(channels, record, None)
    }

    /// Dispatches with a caller-supplied deadline. Once the deadline passes,
    /// no further sink is attempted; every unattempted sink is reported as
    /// failed with [`SinkError::DeadlineExceeded`].
    ///
    /// The resolved triples of all requested channels are concatenated in
    /// request order, preserving duplicates: a sink reachable through two
    /// requested channels is written twice. Per-sink failures are collected,
    /// not raised; the dispatch continues through the remaining sinks and
    /// reports an aggregate [`PartialDispatch`] if any failed.
    pub fn dispatch_with_deadline(
        &self,
        channels: &[&str],
        record: &Record,
        deadline: Option<Instant>,
    ) -> DispatchResult {
        // Resolve every name up front: an unknown channel is a programming
        // error and fails the whole dispatch before any write.
        let mut triples: Vec<&Triple> = Vec::new();
        for name in channels {
            match self.table.get(*name) {
                Some(resolved) => triples.extend(resolved.iter()),
                None => return Err(DispatchError::UnknownChannel((*name).to_string())),
            }
        }

        let mut written = 0;
        let mut skipped = 0;
        let mut failures = Vec::new();

        for triple in triples {
            if !record.level().meets_threshold(triple.min_level) {
                skipped += 1;
                continue;
            }
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                failures.push(SinkFailure {
                    channel: triple.channel.clone(),
                    sink: triple.target.clone(),
                    error: SinkError::DeadlineExceeded,
                });
                continue;
            }
            let line = triple.layout.format(record);
            match triple.sink.write(&line) {
                Ok(()) => written += 1,
                Err(error) => failures.push(SinkFailure {
                    channel: triple.channel.clone(),
                    sink: triple.target.clone(),
                    error,
                }),
            }
        }

        if failures.is_empty() {
            Ok(DispatchSummary { written, skipped })
        } else {
            Err(DispatchError::Partial(PartialDispatch {
                attempted: written + failures.len(),
                succeeded: written,
                failures,
            }))
        }
    }

    /// Flushes every sink in the channel table.
    pub fn flush(&self) {
        for triples in self.table.values() {
            for triple in triples {
                triple.sink.flush();
            }
        }
    }

    #[cfg(test)]
    fn triples(&self, name: &str) -> &[Triple] {
        self.table.get(name).map(Vec::as_slice).unwrap_or(&[])
    }
}
