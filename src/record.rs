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

use jiff::Zoned;

use crate::Clock;
use crate::Severity;

/// A context value attached to a log record.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Map(ContextMap),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Str(v) => f.write_str(v),
            Value::Map(v) => write!(f, "{{{v}}}"),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<ContextMap> for Value {
    fn from(v: ContextMap) -> Self {
        Value::Map(v)
    }
}

/// An insertion-ordered mapping of context keys to values.
///
/// Inserting a key that is already present silently replaces its value; the
/// last value wins. This is documented behavior, not an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextMap {
    entries: Vec<(String, Value)>,
}

impl ContextMap {
    pub fn new() -> ContextMap {
        ContextMap::default()
    }

    /// Inserts a key-value pair, replacing the value of an existing key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Inserts a key-value pair and returns the map, for chained construction.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> ContextMap {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ContextMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> ContextMap {
        let mut map = ContextMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl fmt::Display for ContextMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{key}={value}")?;
        }
        Ok(())
    }
}

/// An immutable structured log entry.
///
/// The timestamp is captured once, at construction, from the supplied [`Clock`].
#[derive(Debug, Clone)]
pub struct Record {
    channel: String,
    level: Severity,
    message: String,
    context: ContextMap,
    timestamp: Zoned,
}

impl Record {
    pub fn new(
        channel: impl Into<String>,
        level: Severity,
        message: impl Into<String>,
        context: ContextMap,
        clock: &Clock,
    ) -> Record {
        Record {
            channel: channel.into(),
            level,
            message: message.into(),
            context,
            timestamp: clock.now(),
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn level(&self) -> Severity {
        self.level
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn context(&self) -> &ContextMap {
        &self.context
    }

    pub fn timestamp(&self) -> &Zoned {
        &self.timestamp
    }
}
