//! Marking points on the current image.
//!
//! [`Annotator`] ties the image set to the navigator: it owns which image is
//! loaded, turns marking gestures into original-pixel points, and moves on to
//! the next image when asked.

use std::path::Path;

use image::RgbaImage;

use crate::config::{AnnotatorConfig, MarkerConfig};
use crate::error::Result;
use crate::image_set::ImageSet;
use crate::label_input::validate_label;
use crate::marker::draw_marker;
use crate::navigator::Navigator;
use crate::points_log::AnnotatedPoint;

/// Result of moving past the current image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// The image at this index is now loaded
    Loaded(usize),
    /// The last image was saved; there is nothing left to annotate
    Finished,
}

/// Annotation session over an [`ImageSet`].
#[derive(Debug)]
pub struct Annotator {
    images: ImageSet,
    navigator: Navigator,
    marker: MarkerConfig,
    current: usize,
}

impl Annotator {
    /// Start a session on the first image.
    pub fn new(mut images: ImageSet, mut navigator: Navigator, marker: MarkerConfig) -> Result<Self> {
        images.load(0)?;
        navigator.reset();
        Ok(Self {
            images,
            navigator,
            marker,
            current: 0,
        })
    }

    /// Open `imgs_dir`, set up `outdir` and start on the first image.
    pub fn open(imgs_dir: &Path, outdir: &Path, config: &AnnotatorConfig) -> Result<Self> {
        let images = ImageSet::open(imgs_dir, outdir)?;
        let navigator = Navigator::new(config.navigator)?;
        Self::new(images, navigator, config.marker)
    }

    pub fn images(&self) -> &ImageSet {
        &self.images
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn navigator_mut(&mut self) -> &mut Navigator {
        &mut self.navigator
    }

    /// Index of the image being annotated.
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// File name of the image being annotated.
    pub fn current_name(&self) -> &str {
        self.images.records()[self.current].name()
    }

    /// Pixels of the current image, including drawn markers.
    pub fn current_image(&self) -> Result<&RgbaImage> {
        self.images.current_image()
    }

    /// Points marked on the current image so far.
    pub fn current_points(&self) -> Result<&[AnnotatedPoint]> {
        self.images.points(self.current)
    }

    /// Mark the original pixel under a screen point with `label`.
    ///
    /// The point is logged, then drawn onto the image buffer. Points outside
    /// the image are still recorded.
    pub fn annotate(&mut self, screen_x: f64, screen_y: f64, label: &str) -> Result<AnnotatedPoint> {
        validate_label(label)?;

        let (x, y) = self.navigator.to_original(screen_x, screen_y);
        let point = AnnotatedPoint::new(x, y, label);

        let (width, height) = self.images.current_image()?.dimensions();
        if x < 0.0 || y < 0.0 || x >= f64::from(width) || y >= f64::from(height) {
            log::warn!(
                "Point {} at ({}, {}) lies outside the {}x{} image",
                label,
                x,
                y,
                width,
                height
            );
        }

        self.images.save_point(point.clone())?;
        draw_marker(self.images.current_image_mut()?, x, y, label, &self.marker);

        log::info!(
            "Marked {} at screen ({}, {}) -> original ({}, {})",
            label,
            screen_x,
            screen_y,
            x,
            y
        );
        Ok(point)
    }

    /// Save the current annotated image and load the next one.
    pub fn advance(&mut self) -> Result<Advance> {
        self.images.save_annotated_image(self.current)?;

        let next = self.current + 1;
        if next >= self.images.len() {
            log::info!("All {} images annotated", self.images.len());
            return Ok(Advance::Finished);
        }

        self.images.load(next)?;
        self.navigator.reset();
        self.current = next;
        log::info!(
            "Loaded image {}/{}: {}",
            next + 1,
            self.images.len(),
            self.current_name()
        );
        Ok(Advance::Loaded(next))
    }
}
