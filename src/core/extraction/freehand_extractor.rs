use image::RgbaImage;

use crate::core::extraction::geometry::{translate, ScaleFactors};
use crate::core::extraction::rasterizer::{rasterize_mask, MASK_INSIDE};
use crate::core::models::{
    ClosedPath, ExtractionOutcome, ExtractionResult, FillRule, NoOutputReason, RawFrame,
};
use crate::global_constants::{LOG_TAG_EXTRACTION, MIN_EXTRACTABLE_POINTS};

#[derive(Debug, Clone, Copy, Default)]
pub struct FreehandExtractor {
    fill_rule: FillRule,
}

impl FreehandExtractor {
    pub fn new(fill_rule: FillRule) -> Self {
        Self { fill_rule }
    }

    pub fn fill_rule(&self) -> FillRule {
        self.fill_rule
    }

    pub fn extract(
        &self,
        path: &ClosedPath,
        frame: &RawFrame,
        view_width: f32,
        view_height: f32,
    ) -> ExtractionOutcome {
        if path.len() < MIN_EXTRACTABLE_POINTS {
            log::debug!(
                "{} path has {} points, nothing to extract",
                LOG_TAG_EXTRACTION,
                path.len()
            );
            return ExtractionOutcome::NoOutput(NoOutputReason::DegenerateSelection);
        }

        let scale = ScaleFactors::between(frame.width(), frame.height(), view_width, view_height);
        if !scale.is_finite() {
            log::warn!(
                "{} invalid view size {}x{}",
                LOG_TAG_EXTRACTION,
                view_width,
                view_height
            );
            return ExtractionOutcome::NoOutput(NoOutputReason::DegenerateSelection);
        }

        let view_bounds = match path.bounding_box() {
            Some(bounds) => bounds.clamped_to(view_width, view_height),
            None => return ExtractionOutcome::NoOutput(NoOutputReason::DegenerateSelection),
        };
        if !view_bounds.has_positive_area() {
            log::debug!(
                "{} selection bounds {:?} have no area inside the view",
                LOG_TAG_EXTRACTION,
                view_bounds
            );
            return ExtractionOutcome::NoOutput(NoOutputReason::DegenerateSelection);
        }

        let source_path = scale.apply(path);
        let source_bounds = match source_path.bounding_box() {
            Some(bounds) => bounds.clamped_to(frame.width() as f32, frame.height() as f32),
            None => return ExtractionOutcome::NoOutput(NoOutputReason::DegenerateSelection),
        };

        let origin_x = source_bounds.left.round();
        let origin_y = source_bounds.top.round();
        let output_width = source_bounds.width().round();
        let output_height = source_bounds.height().round();
        if output_width < 1.0 || output_height < 1.0 {
            log::debug!(
                "{} selection rounds to {}x{} pixels",
                LOG_TAG_EXTRACTION,
                output_width,
                output_height
            );
            return ExtractionOutcome::NoOutput(NoOutputReason::DegenerateSelection);
        }
        let output_width = output_width as u32;
        let output_height = output_height as u32;

        // Output pixel (x, y) is source pixel (origin + x, origin + y).
        let local_path = translate(&source_path, -origin_x, -origin_y);
        let mask = rasterize_mask(&local_path, output_width, output_height, self.fill_rule);

        let origin_x = origin_x as i64;
        let origin_y = origin_y as i64;
        let mut output = RgbaImage::new(output_width, output_height);

        for (x, y, coverage) in mask.enumerate_pixels() {
            if coverage.0[0] != MASK_INSIDE {
                continue;
            }
            let source_x = origin_x + x as i64;
            let source_y = origin_y + y as i64;
            if source_x < 0 || source_y < 0 {
                continue;
            }
            if let Some(pixel) = frame.pixel(source_x as u32, source_y as u32) {
                output.put_pixel(x, y, pixel);
            }
        }

        log::info!(
            "{} extracted {}x{} region at ({}, {}) with scale {:.3}x{:.3}",
            LOG_TAG_EXTRACTION,
            output_width,
            output_height,
            origin_x,
            origin_y,
            scale.x,
            scale.y
        );

        ExtractionOutcome::Extracted(ExtractionResult {
            image: output,
            source_x: origin_x,
            source_y: origin_y,
        })
    }
}
