//! pointmark - manual keypoint annotation for camera calibration
//!
//! Click labelled points on a directory of images, pan and zoom to place
//! them precisely, and get a `points2D.txt` log plus copies of the images
//! with the marks drawn in. `pointmark-convert` turns that log into the
//! per-camera keypoint files a calibration pipeline reads.
//!
//! The geometry ([`transform`], [`navigator`]) and the session logic
//! ([`annotator`], [`image_set`]) work without a window; [`app`] is the thin
//! winit shell on top.

pub mod annotator;
pub mod app;
pub mod config;
pub mod constants;
pub mod convert;
pub mod error;
pub mod image_set;
pub mod label_input;
pub mod marker;
pub mod navigator;
pub mod points_log;
pub mod transform;

pub use annotator::{Advance, Annotator};
pub use config::{AnnotatorConfig, LabelConfig, LogLevel, MarkerConfig, NavigatorConfig, ZoomAnchor};
pub use error::{Error, Result};
pub use image_set::{ImageRecord, ImageSet};
pub use label_input::LabelInput;
pub use navigator::{DragState, Navigator, ZoomDirection, ZoomOutcome};
pub use points_log::{AnnotatedPoint, PointRecord, PointsLog};
pub use transform::{Transform, to_original, to_screen};
