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

/// The default layout.
///
/// Output format:
///
/// ```text
/// [2024-06-01 08:30:00] security.WARNING: Failed Login attempts=3 user=alice
/// ```
///
/// The `channel.LEVEL:` marker is what the analysis companion counts when
/// reporting level distribution over rendered log files.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineLayout;

impl LineLayout {
    pub(crate) fn format(&self, record: &Record) -> String {
        let time = record.timestamp().strftime(TIMESTAMP_FORMAT);
        let channel = record.channel();
        let level = record.level();
        let message = record.message();
        let context = record.context();

        if context.is_empty() {
            format!("[{time}] {channel}.{level}: {message}")
        } else {
            format!("[{time}] {channel}.{level}: {message} {context}")
        }
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
    fn test_line_with_context() {
        let clock = clock_at("2024-06-01T08:30:00[UTC]");
        let context = ContextMap::new().with("attempts", 3).with("user", "alice");
        let record = Record::new("security", Severity::Warning, "Failed Login", context, &clock);
        assert_eq!(
            LineLayout.format(&record),
            "[2024-06-01 08:30:00] security.WARNING: Failed Login attempts=3 user=alice"
        );
    }

    #[test]
    fn test_line_without_context() {
        let clock = clock_at("2024-06-01T08:30:00[UTC]");
        let record = Record::new(
            "user_activity",
            Severity::Info,
            "login",
            ContextMap::new(),
            &clock,
        );
        assert_eq!(
            LineLayout.format(&record),
            "[2024-06-01 08:30:00] user_activity.INFO: login"
        );
    }
}
