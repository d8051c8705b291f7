use std::fmt;
use std::path::Path;
use std::sync::Arc;

use image::{DynamicImage, GenericImageView, RgbaImage};

use crate::AsciiError;

/// Read-only access to a decoded raster.
pub trait SourceImage {
    fn dimensions(&self) -> (u32, u32);

    /// RGBA at `(x, y)`; callers stay within `dimensions()`.
    fn pixel(&self, x: u32, y: u32) -> [u8; 4];
}

impl SourceImage for RgbaImage {
    fn dimensions(&self) -> (u32, u32) {
        GenericImageView::dimensions(self)
    }

    #[inline]
    fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.get_pixel(x, y).0
    }
}

/// Shared handle to a decoded image.
///
/// Clones share pixels. Equality is handle identity: two handles are equal
/// only if they came from the same decode.
#[derive(Clone)]
pub struct ImageHandle {
    pixels: Arc<RgbaImage>,
}

impl ImageHandle {
    pub fn new(pixels: RgbaImage) -> Result<Self, AsciiError> {
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(AsciiError::EmptyImage);
        }
        Ok(Self { pixels: Arc::new(pixels) })
    }

    pub fn from_dynamic(image: DynamicImage) -> Result<Self, AsciiError> {
        Self::new(image.into_rgba8())
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, AsciiError> {
        let image = image::open(path)?;
        Self::from_dynamic(image)
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn same_image(&self, other: &ImageHandle) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels)
    }
}

impl SourceImage for ImageHandle {
    fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    #[inline]
    fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.pixels.get_pixel(x, y).0
    }
}

impl PartialEq for ImageHandle {
    fn eq(&self, other: &Self) -> bool {
        self.same_image(other)
    }
}

impl fmt::Debug for ImageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageHandle")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("ptr", &Arc::as_ptr(&self.pixels))
            .finish()
    }
}
