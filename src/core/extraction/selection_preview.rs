use image::imageops::{self, FilterType};
use image::{GrayImage, Luma, Pixel, Rgba, RgbaImage};

use crate::core::extraction::rasterizer::{is_inside, rasterize_mask, MASK_INSIDE};
use crate::core::models::{ClosedPath, FillRule, Point, PreviewStyle, RawFrame};

#[derive(Debug, Clone, Copy)]
pub enum PreviewShape<'a> {
    Empty,
    Open(&'a [Point]),
    Closed(&'a ClosedPath),
}

pub fn render_preview(
    frame: &RawFrame,
    view_width: u32,
    view_height: u32,
    shape: PreviewShape<'_>,
    style: &PreviewStyle,
    fill_rule: FillRule,
) -> RgbaImage {
    let clear = if frame.width() == view_width && frame.height() == view_height {
        frame.image().clone()
    } else {
        imageops::resize(frame.image(), view_width, view_height, FilterType::Triangle)
    };

    let mut canvas = clear.clone();
    let dim = Rgba(style.dim_rgba);
    for pixel in canvas.pixels_mut() {
        pixel.blend(&dim);
    }

    if let PreviewShape::Closed(path) = shape {
        let mask = rasterize_mask(path, view_width, view_height, fill_rule);
        let fill = Rgba(style.fill_rgba);
        for (x, y, pixel) in canvas.enumerate_pixels_mut() {
            if is_inside(&mask, x, y) {
                *pixel = *clear.get_pixel(x, y);
                pixel.blend(&fill);
            }
        }
    }

    let outline: Option<(&[Point], bool)> = match shape {
        PreviewShape::Empty => None,
        PreviewShape::Open(points) => Some((points, false)),
        PreviewShape::Closed(path) => Some((path.points(), true)),
    };
    if let Some((points, closed)) = outline {
        let stroke = stroke_mask(points, closed, view_width, view_height, style.stroke_width);
        let stroke_colour = Rgba(style.stroke_rgba);
        for (x, y, pixel) in canvas.enumerate_pixels_mut() {
            if is_inside(&stroke, x, y) {
                pixel.blend(&stroke_colour);
            }
        }
    }

    canvas
}

fn stroke_mask(points: &[Point], closed: bool, width: u32, height: u32, stroke_width: f32) -> GrayImage {
    let mut mask = GrayImage::new(width, height);
    let half_width = (stroke_width / 2.0).max(0.5);

    let mut segments: Vec<(Point, Point)> = points.windows(2).map(|pair| (pair[0], pair[1])).collect();
    match points {
        [] => return mask,
        [only] => segments.push((*only, *only)),
        [first, .., last] if closed => segments.push((*last, *first)),
        _ => {}
    }

    for (start, end) in segments {
        let left = (start.x.min(end.x) - half_width).floor().max(0.0) as u32;
        let top = (start.y.min(end.y) - half_width).floor().max(0.0) as u32;
        let right = ((start.x.max(end.x) + half_width).ceil().max(0.0) as u32).min(width);
        let bottom = ((start.y.max(end.y) + half_width).ceil().max(0.0) as u32).min(height);

        for y in top..bottom {
            for x in left..right {
                let centre = Point::new(x as f32 + 0.5, y as f32 + 0.5);
                if distance_to_segment(centre, start, end) <= half_width {
                    mask.put_pixel(x, y, Luma([MASK_INSIDE]));
                }
            }
        }
    }

    mask
}

fn distance_to_segment(point: Point, start: Point, end: Point) -> f32 {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let length_squared = dx * dx + dy * dy;
    if length_squared == 0.0 {
        return point.distance_to(start);
    }
    let t = (((point.x - start.x) * dx + (point.y - start.y) * dy) / length_squared).clamp(0.0, 1.0);
    point.distance_to(Point::new(start.x + t * dx, start.y + t * dy))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn white_frame(width: u32, height: u32) -> RawFrame {
        RawFrame::from_rgba_image(RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255])))
    }

    fn square(left: f32, top: f32, right: f32, bottom: f32) -> ClosedPath {
        ClosedPath::from_points(vec![
            Point::new(left, top),
            Point::new(right, top),
            Point::new(right, bottom),
            Point::new(left, bottom),
        ])
    }

    #[test]
    fn test_empty_preview_is_dimmed_everywhere() {
        let frame = white_frame(20, 20);

        let preview = render_preview(
            &frame,
            20,
            20,
            PreviewShape::Empty,
            &PreviewStyle::default(),
            FillRule::EvenOdd,
        );

        let pixel = preview.get_pixel(10, 10);
        assert!(pixel.0[0] < 255);
        assert_eq!(pixel.0[0], pixel.0[1]);
        assert_eq!(pixel.0[3], 255);
    }

    #[test]
    fn test_closed_selection_interior_is_brighter_than_outside() {
        let frame = white_frame(60, 60);
        let path = square(10.0, 10.0, 50.0, 50.0);

        let preview = render_preview(
            &frame,
            60,
            60,
            PreviewShape::Closed(&path),
            &PreviewStyle::default(),
            FillRule::EvenOdd,
        );

        let inside = preview.get_pixel(30, 30);
        let outside = preview.get_pixel(2, 2);
        assert!(inside.0[0] > outside.0[0]);
        assert!(inside.0[1] < inside.0[0], "interior carries the red tint");
    }

    #[test]
    fn test_outline_is_stroked_in_red() {
        let frame = white_frame(60, 60);
        let points = [Point::new(5.0, 30.5), Point::new(55.0, 30.5)];
        let style = PreviewStyle::default();

        let preview = render_preview(
            &frame,
            60,
            60,
            PreviewShape::Open(&points),
            &style,
            FillRule::EvenOdd,
        );

        assert_eq!(preview.get_pixel(30, 30).0, style.stroke_rgba);
        assert_ne!(preview.get_pixel(30, 10).0, style.stroke_rgba);
    }

    #[test]
    fn test_preview_is_scaled_to_view_and_source_untouched() {
        let frame = white_frame(100, 50);

        let preview = render_preview(
            &frame,
            50,
            25,
            PreviewShape::Empty,
            &PreviewStyle::default(),
            FillRule::EvenOdd,
        );

        assert_eq!(preview.dimensions(), (50, 25));
        assert_eq!(frame.pixel(0, 0).unwrap().0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_single_point_draws_a_dot() {
        let mask = stroke_mask(&[Point::new(10.0, 10.0)], false, 20, 20, 6.0);

        assert!(is_inside(&mask, 10, 10));
        assert!(!is_inside(&mask, 18, 18));
    }

    #[test]
    fn test_distance_to_segment_clamps_to_endpoints() {
        let start = Point::new(0.0, 0.0);
        let end = Point::new(10.0, 0.0);

        assert_eq!(distance_to_segment(Point::new(5.0, 3.0), start, end), 3.0);
        assert_eq!(distance_to_segment(Point::new(13.0, 4.0), start, end), 5.0);
    }
}
