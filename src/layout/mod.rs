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

//! Layouts for rendering log records into sink lines.
//!
//! A layout is a pure function from a [`Record`] to a line of text. Layouts
//! never perform I/O and never fail; missing context metadata is substituted,
//! not reported.

pub use line::LineLayout;
pub use performance::PerformanceLayout;

use crate::Record;

mod line;
mod performance;

/// Timestamp format shared by the built-in layouts.
pub(crate) const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Represents a layout for rendering log records.
#[derive(Debug, Clone)]
pub enum Layout {
    Line(LineLayout),
    Performance(PerformanceLayout),
}

impl Layout {
    pub fn format(&self, record: &Record) -> String {
        match self {
            Layout::Line(layout) => layout.format(record),
            Layout::Performance(layout) => layout.format(record),
        }
    }
}

impl Default for Layout {
    fn default() -> Self {
        Layout::Line(LineLayout::default())
    }
}

impl From<LineLayout> for Layout {
    fn from(layout: LineLayout) -> Self {
        Layout::Line(layout)
    }
}

impl From<PerformanceLayout> for Layout {
    fn from(layout: PerformanceLayout) -> Self {
        Layout::Performance(layout)
    }
}
