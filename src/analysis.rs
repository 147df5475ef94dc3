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

//! Read-only statistics over rendered log files.
//!
//! This is a reporting utility over the router's output files, not part of
//! the dispatch core. It counts the `.LEVEL:` markers emitted by
//! [`LineLayout`](crate::layout::LineLayout) and the total line count.
//! Unlike dispatch, this read path has no partial-result semantics: a
//! missing file is a hard error.

use std::fmt;
use std::fs;
use std::path::Path;

use crate::Severity;
use crate::error::AnalysisError;

/// Per-level occurrence counts and total line count for one log file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogReport {
    total_lines: usize,
    counts: [usize; 8],
}

impl LogReport {
    /// Total number of lines, counting the empty segment after a trailing
    /// newline.
    pub fn total_lines(&self) -> usize {
        self.total_lines
    }

    /// Occurrences of the given level's marker.
    pub fn count(&self, level: Severity) -> usize {
        self.counts[level.rank() as usize]
    }

    /// Share of lines carrying the given level's marker, in percent.
    pub fn percentage(&self, level: Severity) -> f64 {
        if self.total_lines == 0 {
            return 0.0;
        }
        self.count(level) as f64 / self.total_lines as f64 * 100.0
    }
}

impl fmt::Display for LogReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total Lines: {}", self.total_lines)?;
        writeln!(f)?;
        writeln!(f, "Log Level Distribution:")?;
        for level in Severity::ALL.iter().rev() {
            let name = level.name();
            let title = format!("{}{}", &name[..1], name[1..].to_lowercase());
            writeln!(
                f,
                "{title:<10}: {count:5} ({percentage:5.2}%)",
                count = self.count(*level),
                percentage = self.percentage(*level),
            )?;
        }
        Ok(())
    }
}

/// Counts level markers and lines in rendered log content.
pub fn analyze(content: &str) -> LogReport {
    let total_lines = content.split('\n').count();
    let mut counts = [0; 8];
    for level in Severity::ALL {
        let marker = format!(".{}:", level.name());
        counts[level.rank() as usize] = content.matches(&marker).count();
    }
    LogReport {
        total_lines,
        counts,
    }
}

/// Reads and analyzes a rendered log file.
///
/// # Errors
///
/// Returns [`AnalysisError`] if the file cannot be read, including when it
/// does not exist.
pub fn analyze_file(path: impl AsRef<Path>) -> Result<LogReport, AnalysisError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| AnalysisError {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(analyze(&content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_level_markers() {
        let content = "\
[2024-06-01 08:00:00] app.INFO: started\n\
[2024-06-01 08:00:01] app.ERROR: boom\n\
[2024-06-01 08:00:02] app.ERROR: boom again\n\
[2024-06-01 08:00:03] security.WARNING: Failed Login attempts=3\n";
        let report = analyze(content);
        assert_eq!(report.count(Severity::Info), 1);
        assert_eq!(report.count(Severity::Error), 2);
        assert_eq!(report.count(Severity::Warning), 1);
        assert_eq!(report.count(Severity::Emergency), 0);
        // Four lines plus the empty segment after the trailing newline.
        assert_eq!(report.total_lines(), 5);
    }

    #[test]
    fn test_markers_in_message_text_are_counted_too() {
        // Marker counting is a plain substring scan over the whole content.
        let content = "[2024-06-01 08:00:00] app.INFO: saw app.ERROR: in payload\n";
        let report = analyze(content);
        assert_eq!(report.count(Severity::Error), 1);
    }

    #[test]
    fn test_empty_content() {
        let report = analyze("");
        assert_eq!(report.total_lines(), 1);
        for level in Severity::ALL {
            assert_eq!(report.count(level), 0);
        }
        assert_eq!(report.percentage(Severity::Error), 0.0);
    }

    #[test]
    fn test_missing_file_is_a_hard_error() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let err = analyze_file(temp_dir.path().join("nope.log")).unwrap_err();
        assert_eq!(err.source.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn test_display_lists_levels_highest_first() {
        let report = analyze("[t] app.DEBUG: x\n[t] app.ALERT: y\n");
        let rendered = report.to_string();
        assert!(rendered.starts_with("Total Lines: 3"));
        let alert = rendered.find("Alert").unwrap();
        let debug = rendered.find("Debug").unwrap();
        assert!(alert < debug);
    }
}
