//! Append-only history of observed marker boxes
//!
//! One row per entry: `"(x1, y1)","(x2, y2)"`. Rows are parsed with a strict
//! integer-pair grammar; anything else is skipped on read.

use crate::error::{LocatorError, LocatorResult};
use crate::template_matching::{BoundingBox, Point};
use regex::Regex;
use std::fs::{self, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static ROW_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^\s*"?\(\s*(-?\d+)\s*,\s*(-?\d+)\s*\)"?\s*,\s*"?\(\s*(-?\d+)\s*,\s*(-?\d+)\s*\)"?\s*$"#,
    )
    .expect("row pattern is valid")
});

/// One persisted `(top_left, bottom_right)` observation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CoordinateLogEntry {
    pub top_left: Point,
    pub bottom_right: Point,
}

impl CoordinateLogEntry {
    pub fn new(top_left: Point, bottom_right: Point) -> Self {
        Self {
            top_left,
            bottom_right,
        }
    }

    /// Entry as a box, failing if the stored corners are inverted
    pub fn bounds(&self) -> LocatorResult<BoundingBox> {
        BoundingBox::new(self.top_left, self.bottom_right)
    }

    /// Render as a log row
    pub fn to_row(&self) -> String {
        format!("\"{}\",\"{}\"", self.top_left, self.bottom_right)
    }

    /// Parse a log row; `None` for anything that is not two integer pairs
    pub fn parse_row(row: &str) -> Option<Self> {
        let caps = ROW_PATTERN.captures(row)?;
        let mut values = [0i32; 4];
        for (i, value) in values.iter_mut().enumerate() {
            *value = caps.get(i + 1)?.as_str().parse().ok()?;
        }
        Some(Self::new(
            Point::new(values[0], values[1]),
            Point::new(values[2], values[3]),
        ))
    }
}

impl From<BoundingBox> for CoordinateLogEntry {
    fn from(bounds: BoundingBox) -> Self {
        Self::new(bounds.top_left(), bounds.bottom_right())
    }
}

/// Handle to the coordinate log file.
///
/// Construct once and pass by reference to whatever records or reads
/// observations. Only one process is expected to write the file.
#[derive(Clone, Debug)]
pub struct CoordinateLog {
    path: PathBuf,
}

impl CoordinateLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one row, creating the file (and its directory) on first write
    pub fn append(&self, entry: &CoordinateLogEntry) -> LocatorResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| LocatorError::io(parent, e))?;
        }

        let io_error = |e: std::io::Error| LocatorError::io(&self.path, e);
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(io_error)?;

        // A crash mid-write leaves the last row unterminated
        if file.metadata().map_err(io_error)?.len() > 0 {
            let mut last = [0u8; 1];
            file.seek(SeekFrom::End(-1)).map_err(io_error)?;
            file.read_exact(&mut last).map_err(io_error)?;
            if last[0] != b'\n' {
                log::warn!(
                    "⚠️ Unterminated last row in {}, starting a new line",
                    self.path.display()
                );
                file.write_all(b"\n").map_err(io_error)?;
            }
        }

        writeln!(file, "{}", entry.to_row()).map_err(io_error)?;

        log::debug!("📝 Logged {} to {}", entry.to_row(), self.path.display());
        Ok(())
    }

    /// Every well-formed entry in file (chronological) order.
    ///
    /// A missing file is an empty log. Malformed rows, such as a row cut short
    /// by a crash mid-write, are skipped.
    pub fn read_all(&self) -> LocatorResult<Vec<CoordinateLogEntry>> {
        let Some(content) = self.read_content()? else {
            return Ok(Vec::new());
        };

        let mut entries = Vec::new();
        for (line_no, row) in content.lines().enumerate() {
            if row.trim().is_empty() {
                continue;
            }
            match CoordinateLogEntry::parse_row(row) {
                Some(entry) => entries.push(entry),
                None => log::warn!(
                    "⚠️ Skipping malformed row {} in {}: {:?}",
                    line_no + 1,
                    self.path.display(),
                    row
                ),
            }
        }
        Ok(entries)
    }

    /// Keep only the most recent `max_entries` rows.
    ///
    /// Does nothing when the file does not exist or already fits. Returns the
    /// number of rows dropped.
    pub fn limit(&self, max_entries: usize) -> LocatorResult<usize> {
        let Some(content) = self.read_content()? else {
            return Ok(0);
        };

        let rows: Vec<&str> = content.lines().filter(|r| !r.trim().is_empty()).collect();
        if rows.len() <= max_entries {
            return Ok(0);
        }

        let dropped = rows.len() - max_entries;
        let mut kept = rows[dropped..].join("\n");
        if !kept.is_empty() {
            kept.push('\n');
        }
        fs::write(&self.path, kept).map_err(|e| LocatorError::io(&self.path, e))?;

        log::debug!(
            "✂️ Trimmed {} old rows from {}",
            dropped,
            self.path.display()
        );
        Ok(dropped)
    }

    fn read_content(&self) -> LocatorResult<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(LocatorError::io(&self.path, e)),
        }
    }
}
