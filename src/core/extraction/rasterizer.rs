//! Scanline polygon fill.
//!
//! A pixel belongs to the mask when its centre lies inside the closed path
//! under the chosen fill rule. Each row is sampled at `y + 0.5`; the edge
//! crossings on that line are sorted and the spans between them filled.

use image::{GrayImage, Luma};

use crate::core::models::{ClosedPath, FillRule};

pub const MASK_INSIDE: u8 = 255;

pub fn rasterize_mask(path: &ClosedPath, width: u32, height: u32, fill_rule: FillRule) -> GrayImage {
    let mut mask = GrayImage::new(width, height);
    if path.len() < 3 || width == 0 || height == 0 {
        return mask;
    }

    let mut crossings: Vec<(f32, i32)> = Vec::new();

    for row in 0..height {
        let sample_y = row as f32 + 0.5;
        crossings.clear();

        for (start, end) in path.edges() {
            let downward = start.y <= sample_y && sample_y < end.y;
            let upward = end.y <= sample_y && sample_y < start.y;
            if !downward && !upward {
                continue;
            }
            let t = (sample_y - start.y) / (end.y - start.y);
            let x = start.x + t * (end.x - start.x);
            crossings.push((x, if downward { 1 } else { -1 }));
        }

        if crossings.len() < 2 {
            continue;
        }
        crossings.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut winding = 0i32;
        for index in 0..crossings.len() - 1 {
            winding += crossings[index].1;
            let inside = match fill_rule {
                FillRule::EvenOdd => (index + 1) % 2 == 1,
                FillRule::NonZero => winding != 0,
            };
            if inside {
                fill_span(&mut mask, row, crossings[index].0, crossings[index + 1].0);
            }
        }
    }

    mask
}

/// Marks every pixel in `row` whose centre falls in `[span_start, span_end)`.
fn fill_span(mask: &mut GrayImage, row: u32, span_start: f32, span_end: f32) {
    let width = mask.width() as i64;
    let first = ((span_start - 0.5).ceil() as i64).max(0);
    let end = ((span_end - 0.5).ceil() as i64).min(width);

    for column in first..end {
        mask.put_pixel(column as u32, row, Luma([MASK_INSIDE]));
    }
}

pub fn is_inside(mask: &GrayImage, x: u32, y: u32) -> bool {
    mask.get_pixel_checked(x, y)
        .is_some_and(|pixel| pixel.0[0] == MASK_INSIDE)
}
