use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl BoundingBox {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn enclosing(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let mut bounds = Self::new(first.x, first.y, first.x, first.y);

        for point in &points[1..] {
            bounds.left = bounds.left.min(point.x);
            bounds.top = bounds.top.min(point.y);
            bounds.right = bounds.right.max(point.x);
            bounds.bottom = bounds.bottom.max(point.y);
        }

        Some(bounds)
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn has_positive_area(&self) -> bool {
        self.width() > 0.0 && self.height() > 0.0
    }

    pub fn clamped_to(&self, max_width: f32, max_height: f32) -> Self {
        Self {
            left: self.left.max(0.0),
            top: self.top.max(0.0),
            right: self.right.min(max_width),
            bottom: self.bottom.min(max_height),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SelectionPath {
    points: Vec<Point>,
}

impl SelectionPath {
    pub fn starting_at(origin: Point) -> Self {
        Self {
            points: vec![origin],
        }
    }

    pub fn extend_to(&mut self, point: Point, min_spacing: f32) -> bool {
        if min_spacing > 0.0 {
            if let Some(last) = self.points.last() {
                if last.distance_to(point) < min_spacing {
                    return false;
                }
            }
        }
        self.points.push(point);
        true
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn seal(self) -> ClosedPath {
        ClosedPath {
            points: self.points,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClosedPath {
    points: Vec<Point>,
}

impl ClosedPath {
    pub fn from_points(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::enclosing(&self.points)
    }

    pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let count = self.points.len();
        (0..count).map(move |index| (self.points[index], self.points[(index + 1) % count]))
    }

    pub fn map_points(&self, transform: impl Fn(Point) -> Point) -> Self {
        Self {
            points: self.points.iter().copied().map(transform).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_box_encloses_all_points() {
        let points = vec![
            Point::new(100.0, 250.0),
            Point::new(300.0, 100.0),
            Point::new(180.0, 400.0),
        ];

        let bounds = BoundingBox::enclosing(&points).unwrap();

        assert_eq!(bounds, BoundingBox::new(100.0, 100.0, 300.0, 400.0));
        assert_eq!(bounds.width(), 200.0);
        assert_eq!(bounds.height(), 300.0);
    }

    #[test]
    fn test_bounding_box_of_no_points_is_none() {
        assert!(BoundingBox::enclosing(&[]).is_none());
    }

    #[test]
    fn test_clamping_removes_area_outside_view() {
        let bounds = BoundingBox::new(-20.0, -5.0, 120.0, 60.0);

        let clamped = bounds.clamped_to(100.0, 50.0);

        assert_eq!(clamped, BoundingBox::new(0.0, 0.0, 100.0, 50.0));
    }

    #[test]
    fn test_clamping_box_fully_outside_view_collapses_area() {
        let bounds = BoundingBox::new(150.0, 10.0, 200.0, 20.0);

        let clamped = bounds.clamped_to(100.0, 50.0);

        assert!(!clamped.has_positive_area());
    }

    #[test]
    fn test_extend_to_skips_points_closer_than_spacing() {
        let mut path = SelectionPath::starting_at(Point::new(0.0, 0.0));

        assert!(!path.extend_to(Point::new(0.5, 0.0), 1.0));
        assert!(path.extend_to(Point::new(2.0, 0.0), 1.0));
        assert_eq!(path.len(), 2);
    }

    #[test]
    fn test_extend_to_keeps_duplicates_when_spacing_disabled() {
        let mut path = SelectionPath::starting_at(Point::new(5.0, 5.0));

        assert!(path.extend_to(Point::new(5.0, 5.0), 0.0));
        assert_eq!(path.len(), 2);
    }

    #[test]
    fn test_closed_path_edges_include_closing_segment() {
        let path = ClosedPath::from_points(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
        ]);

        let edges: Vec<_> = path.edges().collect();

        assert_eq!(edges.len(), 3);
        assert_eq!(edges[2], (Point::new(10.0, 10.0), Point::new(0.0, 0.0)));
    }
}
