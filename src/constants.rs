//! Global constants for pointmark

/// Image extensions picked up from the source directory (case-sensitive).
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "png", "jpeg"];

/// Name of the points log inside the output directory
pub const POINTS_FILE_NAME: &str = "points2D.txt";

/// Header line of the points log
pub const POINTS_FILE_HEADER: &str = "img_name point_label x y";

/// Subdirectory of the output directory holding marker-annotated images
pub const ANNOTATED_IMAGES_DIR: &str = "annotated_imgs";

/// Default output directory when `--outdir` is not given
pub const DEFAULT_OUTDIR: &str = "./output";

/// File name of each per-camera keypoint file written by the converter
pub const KEYPOINTS_FILE_NAME: &str = "000000.json";

/// Window title prefix
pub const APP_NAME: &str = "pointmark";

/// Fallback window size when the first image is larger than this
pub const MAX_INITIAL_WINDOW: (u32, u32) = (1600, 1000);

/// Wheel pixels that count as one zoom notch for touchpads
pub const PIXELS_PER_WHEEL_NOTCH: f64 = 20.0;
