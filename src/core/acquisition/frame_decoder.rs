//! Row-stride correction for capture buffers.
//!
//! Readers hand over planes whose row pitch may be wider than the logical
//! frame (GPU alignment, vendor padding). Copying such a plane straight into
//! a `width x height` image shears every row after the first, so decoding
//! always goes through the row stride.

use image::{imageops, RgbaImage};

use crate::core::models::{PlaneBuffer, RawFrame};
use crate::core::ports::SinkPixelFormat;
use crate::global_constants::LOG_TAG_DECODER;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameDecodeError {
    #[error("Capture buffer is empty")]
    EmptyBuffer,

    #[error("Unsupported pixel stride {pixel_stride} for {format:?}")]
    UnsupportedPixelStride {
        pixel_stride: usize,
        format: SinkPixelFormat,
    },

    #[error("Row stride {row_stride} is shorter than a {width}px row")]
    RowStrideTooSmall { row_stride: usize, width: u32 },

    #[error("Buffer holds {actual} bytes but {expected} are needed for {width}x{height}")]
    BufferTooSmall {
        expected: usize,
        actual: usize,
        width: u32,
        height: u32,
    },
}

/// Decodes `plane` into a frame of exactly `width x height`.
///
/// When the padding is a whole number of pixels the plane is copied in bulk
/// into a working image `width + padding / pixel_stride` wide and cropped.
/// Any other padding, or a plane whose last row is not padded, is copied row
/// by row.
pub fn decode_plane(
    plane: &PlaneBuffer,
    width: u32,
    height: u32,
    format: SinkPixelFormat,
) -> Result<RawFrame, FrameDecodeError> {
    if plane.is_empty() || width == 0 || height == 0 {
        return Err(FrameDecodeError::EmptyBuffer);
    }
    if plane.pixel_stride != format.bytes_per_pixel() {
        return Err(FrameDecodeError::UnsupportedPixelStride {
            pixel_stride: plane.pixel_stride,
            format,
        });
    }

    let tight_row = width as usize * plane.pixel_stride;
    if plane.row_stride < tight_row {
        return Err(FrameDecodeError::RowStrideTooSmall {
            row_stride: plane.row_stride,
            width,
        });
    }

    let rows = height as usize;
    let required = plane.row_stride * (rows - 1) + tight_row;
    if plane.bytes.len() < required {
        return Err(FrameDecodeError::BufferTooSmall {
            expected: required,
            actual: plane.bytes.len(),
            width,
            height,
        });
    }

    let row_padding = plane.row_stride - tight_row;
    let full_plane = plane.row_stride * rows;

    log::debug!(
        "{} decoding {}x{} plane: row_stride={}, row_padding={}",
        LOG_TAG_DECODER,
        width,
        height,
        plane.row_stride,
        row_padding
    );

    let image = if row_padding % plane.pixel_stride == 0 && plane.bytes.len() >= full_plane {
        decode_through_working_image(plane, width, height, row_padding)
    } else {
        decode_row_by_row(plane, width, height)
    };

    image.map(RawFrame::from_rgba_image).ok_or(FrameDecodeError::BufferTooSmall {
        expected: required,
        actual: plane.bytes.len(),
        width,
        height,
    })
}

fn decode_through_working_image(
    plane: &PlaneBuffer,
    width: u32,
    height: u32,
    row_padding: usize,
) -> Option<RgbaImage> {
    let working_width = width + (row_padding / plane.pixel_stride) as u32;
    let full_plane = plane.row_stride * height as usize;
    let working = RgbaImage::from_raw(working_width, height, plane.bytes[..full_plane].to_vec())?;

    if working_width == width {
        return Some(working);
    }
    Some(imageops::crop_imm(&working, 0, 0, width, height).to_image())
}

fn decode_row_by_row(plane: &PlaneBuffer, width: u32, height: u32) -> Option<RgbaImage> {
    let tight_row = width as usize * plane.pixel_stride;
    let mut pixels = Vec::with_capacity(tight_row * height as usize);

    for row in 0..height as usize {
        let row_start = row * plane.row_stride;
        pixels.extend_from_slice(plane.bytes.get(row_start..row_start + tight_row)?);
    }

    RgbaImage::from_raw(width, height, pixels)
}
