//! The `points2D.txt` annotation log.
//!
//! # File Format
//!
//! ```text
//! img_name point_label x y
//! img1.png A 100.0 100.0
//! img1.png B 412.5 87.25
//! ```
//!
//! One space-separated record per click, in click order. The file is opened,
//! appended and closed for every record so an abrupt exit never leaves a
//! half-written session behind.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::constants::POINTS_FILE_HEADER;
use crate::error::{Error, Result};

/// A labeled point in original-image pixel coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedPoint {
    pub x: f64,
    pub y: f64,
    pub label: String,
}

impl AnnotatedPoint {
    /// Point at original-pixel `(x, y)` carrying `label`.
    pub fn new(x: f64, y: f64, label: impl Into<String>) -> Self {
        Self {
            x,
            y,
            label: label.into(),
        }
    }
}

/// One parsed line of a points log.
#[derive(Debug, Clone, PartialEq)]
pub struct PointRecord {
    /// 1-based line number in the log
    pub line: usize,
    pub img_name: String,
    pub point: AnnotatedPoint,
}

/// Format a record line (without newline).
///
/// Coordinates always carry a decimal point, e.g. `100.0`.
pub fn format_record(img_name: &str, point: &AnnotatedPoint) -> String {
    format!("{} {} {:?} {:?}", img_name, point.label, point.x, point.y)
}

/// Append-only writer for a points log.
#[derive(Debug, Clone)]
pub struct PointsLog {
    path: PathBuf,
}

impl PointsLog {
    /// Create a new log with its header line.
    ///
    /// Fails if the file already exists, so an earlier session is never
    /// clobbered, and if the path does not end in `.txt`.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if path.extension().and_then(|e| e.to_str()) != Some("txt") {
            return Err(Error::configuration(format!(
                "Output file {:?} is not a txt file",
                path
            )));
        }

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::AlreadyExists => Error::already_exists(&path),
                _ => Error::Io(e),
            })?;
        writeln!(file, "{}", POINTS_FILE_HEADER)?;

        log::debug!("Created points log {:?}", path);
        Ok(Self { path })
    }

    /// Location of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record.
    pub fn append(&self, img_name: &str, point: &AnnotatedPoint) -> Result<()> {
        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        writeln!(file, "{}", format_record(img_name, point))?;
        Ok(())
    }
}

/// Parse every record of a points log.
///
/// The first line is the header and is skipped, as are blank lines and lines
/// starting with `#`.
pub fn read_records(path: &Path) -> Result<Vec<PointRecord>> {
    let contents = std::fs::read_to_string(path)?;
    parse_records(&contents)
}

/// Parse records from the text of a points log.
pub fn parse_records(contents: &str) -> Result<Vec<PointRecord>> {
    let mut records = Vec::new();

    for (idx, line) in contents.lines().enumerate().skip(1) {
        let line_no = idx + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        let [img_name, label, x, y] = fields.as_slice() else {
            return Err(Error::malformed(
                line_no,
                format!("expected 4 fields, found {}", fields.len()),
            ));
        };

        let x: f64 = x
            .parse()
            .map_err(|_| Error::malformed(line_no, format!("x {:?} is not a number", x)))?;
        let y: f64 = y
            .parse()
            .map_err(|_| Error::malformed(line_no, format!("y {:?} is not a number", y)))?;

        records.push(PointRecord {
            line: line_no,
            img_name: (*img_name).to_string(),
            point: AnnotatedPoint::new(x, y, *label),
        });
    }

    Ok(records)
}
