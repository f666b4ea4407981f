//! Full annotation sessions driven through the library, without a window.

use std::path::{Path, PathBuf};
use std::time::Duration;

use image::{Rgba, RgbaImage};
use pointmark::convert::{GridLayout, convert_points};
use pointmark::points_log::read_records;
use pointmark::{
    Advance, AnnotatedPoint, Annotator, AnnotatorConfig, Error, ZoomDirection, ZoomOutcome,
    to_original,
};
use tempfile::{TempDir, tempdir};
use web_time::Instant;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn image_dir(names: &[&str]) -> (TempDir, PathBuf) {
    let root = tempdir().unwrap();
    let imgs = root.path().join("imgs");
    std::fs::create_dir(&imgs).unwrap();
    for name in names {
        RgbaImage::from_pixel(320, 240, Rgba([40, 40, 40, 255]))
            .save(imgs.join(name))
            .unwrap();
    }
    (root, imgs)
}

fn log_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn two_image_session() {
    let (root, imgs) = image_dir(&["img2.png", "img1.png"]);
    let out = root.path().join("output");
    let mut annotator = Annotator::open(&imgs, &out, &AnnotatorConfig::default()).unwrap();
    let log_path = out.join("points2D.txt");

    // zoom 1.0, pan (0, 0)
    annotator.annotate(100.0, 100.0, "A").unwrap();
    assert_eq!(log_lines(&log_path)[1], "img1.png A 100.0 100.0");

    let cursor = (40.0, 60.0);
    let under_cursor = annotator.navigator().to_original(cursor.0, cursor.1);
    let outcome = annotator
        .navigator_mut()
        .zoom(ZoomDirection::In, cursor, Instant::now());
    assert_eq!(outcome, ZoomOutcome::Applied(1.5));

    // the pixel under the cursor did not move
    let after = annotator.navigator().to_original(cursor.0, cursor.1);
    assert!(approx_eq(after.0, under_cursor.0));
    assert!(approx_eq(after.1, under_cursor.1));

    let second = annotator.annotate(100.0, 100.0, "A").unwrap();
    assert!(!approx_eq(second.x, 100.0));
    let expected = to_original(100.0, 100.0, annotator.navigator().pan_offset(), 1.5);
    assert!(approx_eq(second.x, expected.0));
    assert!(approx_eq(second.y, expected.1));
    assert!(approx_eq(second.x, 80.0));

    let records = read_records(&log_path).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].img_name, "img1.png");
    assert!(approx_eq(records[1].point.x, second.x));
    assert!(approx_eq(records[1].point.y, second.y));

    assert_eq!(annotator.advance().unwrap(), Advance::Loaded(1));
    assert_eq!(annotator.current_name(), "img2.png");
    assert_eq!(annotator.navigator().zoom_level(), 1.0);

    let point = annotator.annotate(10.0, 20.0, "B").unwrap();
    assert_eq!(point, AnnotatedPoint::new(10.0, 20.0, "B"));
    assert_eq!(annotator.advance().unwrap(), Advance::Finished);

    let lines = log_lines(&log_path);
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "img_name point_label x y");
    assert_eq!(lines[3], "img2.png B 10.0 20.0");

    let annotated = out.join("annotated_imgs");
    let img1 = image::open(annotated.join("img1.png")).unwrap().to_rgba8();
    assert_eq!(*img1.get_pixel(100, 100), Rgba([255, 0, 0, 255]));
    assert!(annotated.join("img2.png").is_file());
}

#[test]
fn drag_then_mark() {
    let (root, imgs) = image_dir(&["a.png"]);
    let out = root.path().join("output");
    let mut annotator = Annotator::open(&imgs, &out, &AnnotatorConfig::default()).unwrap();

    let nav = annotator.navigator_mut();
    nav.press(10.0, 10.0);
    nav.motion(30.0, 15.0);
    nav.release(40.0, 20.0);
    nav.press(0.0, 0.0);
    nav.release(-5.0, 5.0);
    assert_eq!(nav.committed_pan(), (25.0, 15.0));

    let point = annotator.annotate(125.0, 115.0, "1").unwrap();
    assert_eq!((point.x, point.y), (100.0, 100.0));
}

#[test]
fn zoom_is_debounced_and_bounded() {
    let (root, imgs) = image_dir(&["a.png"]);
    let out = root.path().join("output");
    let mut annotator = Annotator::open(&imgs, &out, &AnnotatorConfig::default()).unwrap();
    let nav = annotator.navigator_mut();

    let start = Instant::now();
    assert_eq!(
        nav.zoom(ZoomDirection::In, (0.0, 0.0), start),
        ZoomOutcome::Applied(1.5)
    );
    assert_eq!(
        nav.zoom(ZoomDirection::In, (0.0, 0.0), start + Duration::from_millis(10)),
        ZoomOutcome::Debounced
    );

    let mut now = start;
    for _ in 0..20 {
        now += Duration::from_millis(150);
        nav.zoom(ZoomDirection::In, (0.0, 0.0), now);
        assert!(nav.zoom_level() <= 5.0);
    }
    assert_eq!(nav.zoom_level(), 5.0);
    now += Duration::from_millis(150);
    assert_eq!(
        nav.zoom(ZoomDirection::In, (0.0, 0.0), now),
        ZoomOutcome::AtBound
    );
}

#[test]
fn second_session_in_same_outdir_is_refused() {
    let (root, imgs) = image_dir(&["a.png"]);
    let out = root.path().join("output");
    let mut first = Annotator::open(&imgs, &out, &AnnotatorConfig::default()).unwrap();
    first.annotate(1.0, 1.0, "1").unwrap();

    let err = Annotator::open(&imgs, &out, &AnnotatorConfig::default()).unwrap_err();
    assert!(matches!(err, Error::AlreadyExists { .. }));
    assert_eq!(log_lines(&out.join("points2D.txt")).len(), 2);
}

#[test]
fn session_log_converts_to_keypoints() {
    let (root, imgs) = image_dir(&["cam1.png", "cam2.png"]);
    let out = root.path().join("output");
    let mut annotator = Annotator::open(&imgs, &out, &AnnotatorConfig::default()).unwrap();

    annotator.annotate(50.0, 60.0, "18").unwrap();
    annotator.annotate(70.0, 60.0, "17").unwrap();
    annotator.advance().unwrap();
    annotator.annotate(52.0, 61.0, "18").unwrap();
    annotator.advance().unwrap();

    let keypoints = root.path().join("keypoints");
    let outputs = convert_points(&out.join("points2D.txt"), &keypoints, &GridLayout::default())
        .unwrap();
    assert_eq!(outputs.len(), 2);
    assert_eq!(outputs[0].img_name, "cam1.png");
    assert_eq!(outputs[0].num_points, 2);

    let json = std::fs::read_to_string(keypoints.join("1").join("000000.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["keypoints2d"][0][0], 50.0);
    assert_eq!(value["keypoints2d"][0][2], 1.0);
    assert_eq!(value["keypoints3d"][0][2], 0.0);
}
