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

use crate::Record;
use crate::layout::TIMESTAMP_FORMAT;

/// A layout for performance measurements.
///
/// Output format:
///
/// ```text
/// [2024-06-01 08:30:00] PERFORMANCE: database_query | Duration: 12.5ms | Memory: 8MB
/// ```
///
/// The `duration` and `memory_usage` keys are read from the record context.
/// A missing key renders as `n/a`; missing performance metadata never aborts
/// logging.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerformanceLayout;

/// Placeholder rendered when a metric key is absent from the context.
const MISSING: &str = "n/a";

impl PerformanceLayout {
    pub(crate) fn format(&self, record: &Record) -> String {
        let time = record.timestamp().strftime(TIMESTAMP_FORMAT);
        let message = record.message();
        let duration = metric(record, "duration");
        let memory = metric(record, "memory_usage");

        format!("[{time}] PERFORMANCE: {message} | Duration: {duration}ms | Memory: {memory}MB")
    }
}

fn metric(record: &Record, key: &str) -> String {
    match record.context().get(key) {
        Some(value) => value.to_string(),
        None => MISSING.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use jiff::Zoned;

    use super::*;
    use crate::Clock;
    use crate::ContextMap;
    use crate::Severity;
    use crate::clock::ManualClock;

    fn clock_at(ts: &str) -> Clock {
        Clock::ManualClock(ManualClock::new(Zoned::from_str(ts).unwrap()))
    }

    #[test]
    fn test_metrics_present() {
        let clock = clock_at("2024-06-01T08:30:00[UTC]");
        let context = ContextMap::new()
            .with("duration", 12.5)
            .with("memory_usage", 8);
        let record = Record::new(
            "performance",
            Severity::Debug,
            "database_query",
            context,
            &clock,
        );
        assert_eq!(
            PerformanceLayout.format(&record),
            "[2024-06-01 08:30:00] PERFORMANCE: database_query | Duration: 12.5ms | Memory: 8MB"
        );
    }

    #[test]
    fn test_missing_metrics_render_placeholder() {
        let clock = clock_at("2024-06-01T08:30:00[UTC]");
        let record = Record::new(
            "performance",
            Severity::Debug,
            "cache_warmup",
            ContextMap::new(),
            &clock,
        );
        assert_eq!(
            PerformanceLayout.format(&record),
            "[2024-06-01 08:30:00] PERFORMANCE: cache_warmup | Duration: n/ams | Memory: n/aMB"
        );
    }
}
