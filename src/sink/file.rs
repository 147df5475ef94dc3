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
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::PoisonError;

use crate::SinkError;
use crate::sink::Sink;

/// A sink that appends lines to a single fixed file.
///
/// The file is opened lazily on the first write and the handle is kept open
/// for the lifetime of the sink. Each write appends one line and flushes.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    file: Mutex<Option<File>>,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> FileSink {
        FileSink {
            path: path.into(),
            file: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

pub(crate) fn open_append(path: &Path) -> io::Result<File> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }
    OpenOptions::new().append(true).create(true).open(path)
}

impl Sink for FileSink {
    fn write(&self, formatted: &str) -> Result<(), SinkError> {
        let mut slot = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        let mut file = match slot.take() {
            Some(file) => file,
            None => open_append(&self.path)?,
        };
        let result = file
            .write_all(formatted.as_bytes())
            .and_then(|()| file.write_all(b"\n"))
            .and_then(|()| file.flush());
        *slot = Some(file);
        result.map_err(SinkError::from)
    }

    fn flush(&self) {
        let mut slot = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(file) = slot.as_mut() {
            if let Err(err) = file.flush() {
                log::warn!("failed to flush {}: {err}", self.path.display());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_appends_lines_across_writes() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("app.log");
        let sink = FileSink::new(&path);

        sink.write("first line").unwrap();
        sink.write("second line").unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "first line\nsecond line\n");
    }

    #[test]
    fn test_creates_missing_parent_directories() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/logs/app.log");
        let sink = FileSink::new(&path);

        sink.write("hello").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_open_is_lazy() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("lazy.log");
        let sink = FileSink::new(&path);
        assert_eq!(sink.path(), path);

        // Constructing the sink must not touch the filesystem.
        assert!(!path.exists());
        sink.write("now it exists").unwrap();
        assert!(path.exists());
    }
}
