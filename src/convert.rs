//! Conversion of a points log into per-camera keypoint files.
//!
//! Every distinct image in the log is one camera view. For each camera the
//! converter writes `<out_dir>/<cam>/000000.json`:
//!
//! ```json
//! {
//!     "keypoints3d": [[x, y, 0.0], ...],
//!     "keypoints2d": [[u, v, 1.0], ...]
//! }
//! ```
//!
//! where `(x, y)` is the planar target position of the point's label and
//! `(u, v)` the annotated pixel.
//!
//! Camera numbers follow the order in which images first appear in the log.
//! An image that never received a point is absent from the log, so it gets
//! no camera and every later camera moves down by one. The image-to-camera
//! mapping is logged for each file written.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::KEYPOINTS_FILE_NAME;
use crate::error::{Error, Result};
use crate::points_log::{PointRecord, parse_records};

/// Maps a point label to its position on the planar calibration target.
pub trait PlanarLayout {
    /// Target position in world units, or `None` for an unknown label.
    fn position(&self, label: &str) -> Option<(f64, f64)>;
}

/// Numbered corners of a checkerboard, row by row.
///
/// Label `i` (1-based) sits at column `-((i - 1) % columns)` and row
/// `(i - 1) / columns`, shifted so `origin_label` is at `(0, 0)` and scaled
/// by `tile_len`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub columns: u32,
    pub count: u32,
    pub origin_label: u32,
    pub tile_len: f64,
}

impl GridLayout {
    pub fn with_tile_len(mut self, tile_len: f64) -> Self {
        self.tile_len = tile_len;
        self
    }

    fn cell(&self, label: u32) -> (f64, f64) {
        let i = label - 1;
        (-f64::from(i % self.columns), f64::from(i / self.columns))
    }
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            columns: 5,
            count: 30,
            origin_label: 18,
            tile_len: 0.598,
        }
    }
}

impl PlanarLayout for GridLayout {
    fn position(&self, label: &str) -> Option<(f64, f64)> {
        let label: u32 = label.parse().ok()?;
        if label == 0 || label > self.count || self.columns == 0 || self.origin_label == 0 {
            return None;
        }
        let (x, y) = self.cell(label);
        let (ox, oy) = self.cell(self.origin_label);
        Some(((x - ox) * self.tile_len, (y - oy) * self.tile_len))
    }
}

/// Explicit label positions, loaded from `{"label": [x, y], ...}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelMap {
    positions: BTreeMap<String, [f64; 2]>,
}

impl LabelMap {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

impl PlanarLayout for LabelMap {
    fn position(&self, label: &str) -> Option<(f64, f64)> {
        self.positions.get(label).map(|p| (p[0], p[1]))
    }
}

/// Keypoints of one camera, in the layout the calibration pipeline reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraKeypoints {
    pub keypoints3d: Vec<[f64; 3]>,
    pub keypoints2d: Vec<[f64; 3]>,
}

/// One camera's output file.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraOutput {
    pub camera: usize,
    pub img_name: String,
    pub path: PathBuf,
    pub num_points: usize,
}

/// Group records into cameras, numbered from 1 in order of first appearance.
///
/// Fails on the first record whose label the layout does not know.
pub fn group_by_camera(
    contents: &str,
    layout: &dyn PlanarLayout,
) -> Result<Vec<(String, CameraKeypoints)>> {
    let mut cameras: Vec<(String, CameraKeypoints)> = Vec::new();

    for record in parse_records(contents)? {
        let PointRecord {
            line,
            img_name,
            point,
        } = record;
        let (wx, wy) = layout
            .position(&point.label)
            .ok_or_else(|| Error::malformed(line, format!("unknown point label {:?}", point.label)))?;

        let idx = match cameras.iter().position(|(name, _)| *name == img_name) {
            Some(idx) => idx,
            None => {
                cameras.push((img_name, CameraKeypoints::default()));
                cameras.len() - 1
            }
        };
        let keypoints = &mut cameras[idx].1;
        keypoints.keypoints3d.push([wx, wy, 0.0]);
        keypoints.keypoints2d.push([point.x, point.y, 1.0]);
    }

    Ok(cameras)
}

/// Serialize with 4-space indentation.
pub fn to_json_pretty(keypoints: &CameraKeypoints) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    keypoints.serialize(&mut ser)?;
    String::from_utf8(buf).map_err(|e| Error::configuration(e.to_string()))
}

/// Convert `points_file` into `<out_dir>/<cam>/000000.json` files.
///
/// `out_dir` must not exist yet. The whole log is checked before anything
/// is written.
pub fn convert_points(
    points_file: &Path,
    out_dir: &Path,
    layout: &dyn PlanarLayout,
) -> Result<Vec<CameraOutput>> {
    if out_dir.exists() {
        return Err(Error::already_exists(out_dir));
    }

    let contents = std::fs::read_to_string(points_file)?;
    let cameras = group_by_camera(&contents, layout)?;

    let mut outputs = Vec::with_capacity(cameras.len());
    for (i, (img_name, keypoints)) in cameras.into_iter().enumerate() {
        let camera = i + 1;
        let cam_dir = out_dir.join(camera.to_string());
        std::fs::create_dir_all(&cam_dir)?;

        let path = cam_dir.join(KEYPOINTS_FILE_NAME);
        std::fs::write(&path, to_json_pretty(&keypoints)?)?;
        log::info!(
            "Camera {} ({}): {} points -> {:?}",
            camera,
            img_name,
            keypoints.keypoints2d.len(),
            path
        );

        outputs.push(CameraOutput {
            camera,
            img_name,
            path,
            num_points: keypoints.keypoints2d.len(),
        });
    }

    Ok(outputs)
}
