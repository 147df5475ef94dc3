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

use std::fs;
use std::fs::File;
use std::io::Write;
use std::mem;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::PoisonError;

use jiff::Span;
use jiff::civil::Date;

use crate::Clock;
use crate::SinkError;
use crate::sink::Sink;
use crate::sink::file::open_append;

/// A sink that appends to a file whose name embeds the current date.
///
/// A base path of `logs/api-requests.log` produces daily files named
/// `logs/api-requests-2024-06-01.log`. On each write, if the clock's date
/// differs from the date of the open handle, the old handle is closed, a new
/// dated file is opened, and files older than the retention window are
/// pruned. Rotation and pruning are best-effort: a pruning failure is
/// reported through the `log` facade and does not fail the current write.
#[derive(Debug)]
pub struct DailyFileSink {
    dir: PathBuf,
    stem: String,
    extension: Option<String>,
    retention_days: u16,
    clock: Clock,
    state: Mutex<State>,
}

#[derive(Debug)]
enum State {
    Closed,
    OpenForDate { date: Date, file: File },
}

impl DailyFileSink {
    /// Creates a sink rotating around the given base path, keeping dated
    /// files for `retention_days` days.
    pub fn new(base: impl Into<PathBuf>, retention_days: u16) -> DailyFileSink {
        let base = base.into();
        let dir = match base.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let stem = base
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = base.extension().map(|s| s.to_string_lossy().into_owned());
        DailyFileSink {
            dir,
            stem,
            extension,
            retention_days,
            clock: Clock::default(),
            state: Mutex::new(State::Closed),
        }
    }

    #[cfg(test)]
    fn clock(mut self, clock: Clock) -> DailyFileSink {
        self.clock = clock;
        self
    }

    /// Returns the dated path for the given day.
    pub fn path_for(&self, date: Date) -> PathBuf {
        let filename = match &self.extension {
            Some(ext) => format!("{}-{date}.{ext}", self.stem),
            None => format!("{}-{date}", self.stem),
        };
        self.dir.join(filename)
    }

    /// Flushes and closes the current handle. The next write reopens it.
    pub fn shutdown(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let State::OpenForDate { file, .. } = &mut *state {
            if let Err(err) = file.flush() {
                log::warn!("failed to flush {} on shutdown: {err}", self.stem);
            }
        }
        *state = State::Closed;
    }

    fn open_for(&self, today: Date) -> Result<File, SinkError> {
        self.prune_old_files(today);
        Ok(open_append(&self.path_for(today))?)
    }

    fn prune_old_files(&self, today: Date) {
        let span = Span::new().days(i64::from(self.retention_days));
        let cutoff = match today.checked_sub(span) {
            Ok(cutoff) => cutoff,
            Err(err) => {
                log::warn!("failed to compute retention cutoff: {err}");
                return;
            }
        };

        let read_dir = match fs::read_dir(&self.dir) {
            Ok(read_dir) => read_dir,
            Err(err) => {
                log::warn!("failed to read log dir {}: {err}", self.dir.display());
                return;
            }
        };

        for entry in read_dir.flatten() {
            if !entry.file_type().is_ok_and(|t| t.is_file()) {
                continue;
            }
            let filename = entry.file_name();
            let Some(filename) = filename.to_str() else {
                continue;
            };
            let Some(date) = self.embedded_date(filename) else {
                continue;
            };
            if date < cutoff {
                if let Err(err) = fs::remove_file(entry.path()) {
                    log::warn!(
                        "failed to remove old log file {}: {err}",
                        entry.path().display()
                    );
                }
            }
        }
    }

    /// Extracts the date embedded in a rotated filename, if the name matches
    /// this sink's `<stem>-<YYYY-MM-DD>.<ext>` pattern.
    fn embedded_date(&self, filename: &str) -> Option<Date> {
        let rest = filename.strip_prefix(&self.stem)?.strip_prefix('-')?;
        let date = match &self.extension {
            Some(ext) => rest.strip_suffix(ext)?.strip_suffix('.')?,
            None => rest,
        };
        date.parse::<Date>().ok()
    }
}

impl Sink for DailyFileSink {
    fn write(&self, formatted: &str) -> Result<(), SinkError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let today = self.clock.now().date();

        let mut file = match mem::replace(&mut *state, State::Closed) {
            State::OpenForDate { date, file } if date == today => file,
            State::OpenForDate { mut file, .. } => {
                if let Err(err) = file.flush() {
                    log::warn!("failed to flush previous daily file: {err}");
                }
                drop(file);
                self.open_for(today)?
            }
            State::Closed => self.open_for(today)?,
        };

        let result = file
            .write_all(formatted.as_bytes())
            .and_then(|()| file.write_all(b"\n"))
            .and_then(|()| file.flush());
        *state = State::OpenForDate { date: today, file };
        result.map_err(SinkError::from)
    }

    fn flush(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let State::OpenForDate { file, .. } = &mut *state {
            if let Err(err) = file.flush() {
                log::warn!("failed to flush daily file: {err}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use jiff::Zoned;
    use rand::Rng;
    use rand::distr::Alphanumeric;
    use tempfile::TempDir;

    use super::*;
    use crate::clock::ManualClock;

    fn manual_clock(ts: &str) -> (Clock, ManualClock) {
        let inner = ManualClock::new(Zoned::from_str(ts).unwrap());
        (Clock::ManualClock(inner.clone()), inner)
    }

    fn generate_random_string() -> String {
        let mut rng = rand::rng();
        let len = rng.random_range(50..=100);
        (0..len).map(|_| char::from(rng.sample(Alphanumeric))).collect()
    }

    #[test]
    fn test_writes_to_dated_file() {
        let temp_dir = TempDir::new().unwrap();
        let (clock, _) = manual_clock("2024-06-01T08:00:00[UTC]");
        let sink = DailyFileSink::new(temp_dir.path().join("app.log"), 7).clock(clock);

        sink.write("hello").unwrap();

        let path = temp_dir.path().join("app-2024-06-01.log");
        assert_eq!(fs::read_to_string(path).unwrap(), "hello\n");
    }

    #[test]
    fn test_rotates_when_date_changes() {
        let temp_dir = TempDir::new().unwrap();
        let (clock, handle) = manual_clock("2024-06-01T23:59:00[UTC]");
        let sink = DailyFileSink::new(temp_dir.path().join("app.log"), 7).clock(clock);

        let day_one_line = generate_random_string();
        let day_two_line = generate_random_string();

        sink.write(&day_one_line).unwrap();
        handle.set_now(Zoned::from_str("2024-06-02T00:01:00[UTC]").unwrap());
        sink.write(&day_two_line).unwrap();

        let day_one = fs::read_to_string(temp_dir.path().join("app-2024-06-01.log")).unwrap();
        let day_two = fs::read_to_string(temp_dir.path().join("app-2024-06-02.log")).unwrap();
        assert_eq!(day_one, format!("{day_one_line}\n"));
        assert_eq!(day_two, format!("{day_two_line}\n"));
    }

    #[test]
    fn test_prunes_files_beyond_retention() {
        let temp_dir = TempDir::new().unwrap();
        let stale = temp_dir.path().join("app-2024-05-20.log");
        let recent = temp_dir.path().join("app-2024-05-30.log");
        fs::write(&stale, "stale\n").unwrap();
        fs::write(&recent, "recent\n").unwrap();

        let (clock, _) = manual_clock("2024-06-01T08:00:00[UTC]");
        let sink = DailyFileSink::new(temp_dir.path().join("app.log"), 7).clock(clock);
        sink.write("today").unwrap();

        assert!(!stale.exists(), "file beyond retention must be pruned");
        assert!(recent.exists(), "file within retention must be kept");
        assert!(temp_dir.path().join("app-2024-06-01.log").exists());
    }

    #[test]
    fn test_prune_ignores_unrelated_files() {
        let temp_dir = TempDir::new().unwrap();
        let other = temp_dir.path().join("other-2024-01-01.log");
        let undated = temp_dir.path().join("app.log");
        fs::write(&other, "other\n").unwrap();
        fs::write(&undated, "undated\n").unwrap();

        let (clock, _) = manual_clock("2024-06-01T08:00:00[UTC]");
        let sink = DailyFileSink::new(temp_dir.path().join("app.log"), 7).clock(clock);
        sink.write("today").unwrap();

        assert!(other.exists());
        assert!(undated.exists());
    }

    #[test]
    fn test_shutdown_closes_and_next_write_reopens() {
        let temp_dir = TempDir::new().unwrap();
        let (clock, _) = manual_clock("2024-06-01T08:00:00[UTC]");
        let sink = DailyFileSink::new(temp_dir.path().join("app.log"), 7).clock(clock);

        sink.write("before").unwrap();
        sink.shutdown();
        sink.write("after").unwrap();

        let content = fs::read_to_string(temp_dir.path().join("app-2024-06-01.log")).unwrap();
        assert_eq!(content, "before\nafter\n");
    }
}
