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
use std::str::FromStr;

use serde::Deserialize;

/// A log severity level.
///
/// The eight levels form a total order by rank, from [`Severity::Debug`] (lowest)
/// to [`Severity::Emergency`] (highest). A record passes a channel's filter when
/// its level's rank is greater than or equal to the channel's minimum level; see
/// [`Severity::meets_threshold`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Debug = 0,
    Info = 1,
    Notice = 2,
    Warning = 3,
    Error = 4,
    Critical = 5,
    Alert = 6,
    Emergency = 7,
}

impl Severity {
    /// All levels, ordered from lowest to highest rank.
    pub const ALL: [Severity; 8] = [
        Severity::Debug,
        Severity::Info,
        Severity::Notice,
        Severity::Warning,
        Severity::Error,
        Severity::Critical,
        Severity::Alert,
        Severity::Emergency,
    ];

    /// Returns the integer rank of this level.
    pub const fn rank(self) -> u8 {
        self as u8
    }

    /// Returns whether a record at this level passes a filter with the given
    /// minimum level.
    pub const fn meets_threshold(self, min_level: Severity) -> bool {
        self.rank() >= min_level.rank()
    }

    /// Returns the uppercase marker name of this level, as rendered in log lines.
    pub const fn name(self) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Notice => "NOTICE",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Critical => "CRITICAL",
            Severity::Alert => "ALERT",
            Severity::Emergency => "EMERGENCY",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The error returned when parsing a string that names no known severity level.
#[derive(Debug, thiserror::Error)]
#[error("unknown severity level: {0:?}")]
pub struct UnknownSeverity(pub String);

impl FromStr for Severity {
    type Err = UnknownSeverity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(Severity::Debug),
            "info" => Ok(Severity::Info),
            "notice" => Ok(Severity::Notice),
            "warning" => Ok(Severity::Warning),
            "error" => Ok(Severity::Error),
            "critical" => Ok(Severity::Critical),
            "alert" => Ok(Severity::Alert),
            "emergency" => Ok(Severity::Emergency),
            _ => Err(UnknownSeverity(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_matches_rank_ordering() {
        for level in Severity::ALL {
            for min_level in Severity::ALL {
                assert_eq!(
                    level.meets_threshold(min_level),
                    level.rank() >= min_level.rank(),
                    "level={level} min_level={min_level}"
                );
            }
        }
    }

    #[test]
    fn test_ranks_are_dense_and_ascending() {
        for (i, level) in Severity::ALL.iter().enumerate() {
            assert_eq!(level.rank() as usize, i);
        }
    }

    #[test]
    fn test_name_round_trip() {
        for level in Severity::ALL {
            assert_eq!(level.name().parse::<Severity>().unwrap(), level);
            assert_eq!(
                level.name().to_lowercase().parse::<Severity>().unwrap(),
                level
            );
        }
    }

    #[test]
    fn test_unknown_name_is_rejected() {
        assert!("verbose".parse::<Severity>().is_err());
        assert!("".parse::<Severity>().is_err());
    }
}
