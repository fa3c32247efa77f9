use std::sync::Arc;

use image::{Rgba, RgbaImage};

use crate::global_constants::LOG_TAG_RAW_FRAME;

#[derive(Clone)]
pub struct PlaneBuffer {
    pub bytes: Vec<u8>,
    pub pixel_stride: usize,
    pub row_stride: usize,
}

impl std::fmt::Debug for PlaneBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaneBuffer")
            .field("len", &self.bytes.len())
            .field("pixel_stride", &self.pixel_stride)
            .field("row_stride", &self.row_stride)
            .finish()
    }
}

impl PlaneBuffer {
    pub fn new(bytes: Vec<u8>, pixel_stride: usize, row_stride: usize) -> Self {
        Self {
            bytes,
            pixel_stride,
            row_stride,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[derive(Clone)]
pub struct RawFrame {
    image: Arc<RgbaImage>,
}

impl std::fmt::Debug for RawFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawFrame")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

impl RawFrame {
    pub fn from_rgba_image(image: RgbaImage) -> Self {
        log::debug!(
            "{} building frame: {}x{}",
            LOG_TAG_RAW_FRAME,
            image.width(),
            image.height()
        );

        Self {
            image: Arc::new(image),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        Some(*self.image.get_pixel(x, y))
    }

    pub fn shares_pixels_with(&self, other: &RawFrame) -> bool {
        Arc::ptr_eq(&self.image, &other.image)
    }
}
