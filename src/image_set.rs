//! The set of images to annotate and the session's output files.
//!
//! An [`ImageSet`] lists the images of a directory, decodes them on demand,
//! keeps the points recorded on each one, and owns the output directory:
//! the `points2D.txt` log and the `annotated_imgs/` copies with markers.

use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbaImage};

use crate::constants::{ANNOTATED_IMAGES_DIR, IMAGE_EXTENSIONS, POINTS_FILE_NAME};
use crate::error::{Error, Result};
use crate::points_log::{AnnotatedPoint, PointsLog};

/// An image file and, while it is the loaded image, its pixels.
#[derive(Debug)]
pub struct ImageRecord {
    path: PathBuf,
    name: String,
    pixels: Option<RgbaImage>,
}

impl ImageRecord {
    fn new(path: PathBuf) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_string();
        Some(Self {
            path,
            name,
            pixels: None,
        })
    }

    /// Source file on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name, used as the image key in the log and for the annotated copy.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the pixels are currently decoded.
    pub fn is_loaded(&self) -> bool {
        self.pixels.is_some()
    }
}

/// Images to annotate plus the session's output.
#[derive(Debug)]
pub struct ImageSet {
    records: Vec<ImageRecord>,
    points: Vec<Vec<AnnotatedPoint>>,
    current: Option<usize>,
    log: PointsLog,
    annotated_dir: PathBuf,
}

impl ImageSet {
    /// List the images of `imgs_dir` and set up `outdir`.
    ///
    /// Images are files ending in `.jpg`, `.png` or `.jpeg`, sorted by file
    /// name. `outdir` is created if needed; an existing `points2D.txt` in it
    /// aborts before anything is written.
    pub fn open(imgs_dir: &Path, outdir: &Path) -> Result<Self> {
        let records = list_images(imgs_dir)?;
        if records.is_empty() {
            return Err(Error::EmptyInput {
                dir: imgs_dir.to_path_buf(),
            });
        }
        log::info!("Found {} image files in {:?}", records.len(), imgs_dir);

        let (width, height) = image::image_dimensions(records[0].path())?;
        log::info!("First image has resolution W: {}, H: {}", width, height);

        let (log, annotated_dir) = setup_output(outdir)?;
        let points = records.iter().map(|_| Vec::new()).collect();

        Ok(Self {
            records,
            points,
            current: None,
            log,
            annotated_dir,
        })
    }

    /// Number of images in the set.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always false for a successfully opened set.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ImageRecord] {
        &self.records
    }

    pub fn record(&self, index: usize) -> Result<&ImageRecord> {
        self.records.get(index).ok_or(Error::IndexOutOfRange {
            index,
            len: self.records.len(),
        })
    }

    /// Index of the loaded image, if any.
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn log_path(&self) -> &Path {
        self.log.path()
    }

    pub fn annotated_dir(&self) -> &Path {
        &self.annotated_dir
    }

    /// Decode image `index` and make it the current image.
    ///
    /// The previous image's pixels are released; loading the current image
    /// again keeps its buffer (and any markers drawn on it).
    pub fn load(&mut self, index: usize) -> Result<&RgbaImage> {
        self.record(index)?;

        for (i, record) in self.records.iter_mut().enumerate() {
            if i != index {
                record.pixels = None;
            }
        }

        let record = &mut self.records[index];
        if record.pixels.is_none() {
            log::debug!("Decoding {:?}", record.path);
            record.pixels = Some(image::open(&record.path)?.to_rgba8());
        }
        self.current = Some(index);

        record.pixels.as_ref().ok_or(Error::NothingLoaded)
    }

    /// Pixels of the current image.
    pub fn current_image(&self) -> Result<&RgbaImage> {
        let index = self.current.ok_or(Error::NothingLoaded)?;
        self.records[index].pixels.as_ref().ok_or(Error::NothingLoaded)
    }

    /// Mutable pixels of the current image, for drawing markers.
    pub fn current_image_mut(&mut self) -> Result<&mut RgbaImage> {
        let index = self.current.ok_or(Error::NothingLoaded)?;
        self.records[index].pixels.as_mut().ok_or(Error::NothingLoaded)
    }

    /// Record a point on the current image and append it to the log.
    pub fn save_point(&mut self, point: AnnotatedPoint) -> Result<()> {
        let index = self.current.ok_or(Error::NothingLoaded)?;
        self.log.append(&self.records[index].name, &point)?;
        self.points[index].push(point);
        Ok(())
    }

    /// Points recorded on image `index`, in click order.
    pub fn points(&self, index: usize) -> Result<&[AnnotatedPoint]> {
        self.record(index)?;
        Ok(&self.points[index])
    }

    /// Write image `index` (with its markers) to `annotated_imgs/<name>`.
    ///
    /// Overwrites an earlier copy. An image that is not loaded is written as
    /// decoded from disk.
    pub fn save_annotated_image(&self, index: usize) -> Result<PathBuf> {
        let record = self.record(index)?;
        let out_path = self.annotated_dir.join(&record.name);

        let decoded;
        let pixels = match &record.pixels {
            Some(pixels) => pixels,
            None => {
                decoded = image::open(&record.path)?.to_rgba8();
                &decoded
            }
        };

        // JPEG has no alpha channel
        match ImageFormat::from_path(&out_path) {
            Ok(ImageFormat::Jpeg) => image::DynamicImage::ImageRgba8(pixels.clone())
                .into_rgb8()
                .save(&out_path)?,
            _ => pixels.save(&out_path)?,
        }

        log::info!("Saved annotated image {:?}", out_path);
        Ok(out_path)
    }
}

fn list_images(imgs_dir: &Path) -> Result<Vec<ImageRecord>> {
    let mut records = Vec::new();
    for entry in std::fs::read_dir(imgs_dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let accepted = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext));
        if !accepted {
            continue;
        }
        if let Some(record) = ImageRecord::new(path) {
            records.push(record);
        }
    }
    records.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(records)
}

fn setup_output(outdir: &Path) -> Result<(PointsLog, PathBuf)> {
    if outdir.exists() {
        if !outdir.is_dir() {
            return Err(Error::configuration(format!(
                "Output path {:?} is not a directory",
                outdir
            )));
        }
    } else {
        std::fs::create_dir_all(outdir)?;
    }

    let log = PointsLog::create(outdir.join(POINTS_FILE_NAME))?;

    let annotated_dir = outdir.join(ANNOTATED_IMAGES_DIR);
    std::fs::create_dir_all(&annotated_dir)?;

    Ok((log, annotated_dir))
}
