//! Pure geometry math for takeoff shapes
//!
//! All inputs are in drawing (pixel) space. Conversion to real-world units
//! happens in [`crate::calibration`].

/// A point in drawing pixel space
///
/// - Origin at the top-left of the rendered drawing
/// - X increases to the right, Y increases downward
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Linear interpolation towards `other` (t = 0 is self, t = 1 is other)
    pub fn lerp(&self, other: &Point, t: f64) -> Point {
        Point::new(
            self.x + t * (other.x - self.x),
            self.y + t * (other.y - self.y),
        )
    }
}

/// Sum of Euclidean distances between consecutive points
pub fn polyline_length(points: &[Point]) -> f64 {
    points.windows(2).map(|w| w[0].distance_to(&w[1])).sum()
}

/// Signed shoelace sum over the closed ring, divided by 2
///
/// Positive for counter-clockwise winding in a Y-up frame. The ring is closed
/// implicitly; the last point must not repeat the first.
pub fn signed_area(points: &[Point]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y;
        sum -= points[j].x * points[i].y;
    }
    sum / 2.0
}

/// Unsigned polygon area (independent of winding and start vertex)
pub fn polygon_area(points: &[Point]) -> f64 {
    signed_area(points).abs()
}

/// Axis-aligned bounds as (min_x, min_y, max_x, max_y)
pub fn bounding_box(points: &[Point]) -> Option<(f64, f64, f64, f64)> {
    let first = points.first()?;
    let mut bounds = (first.x, first.y, first.x, first.y);
    for p in &points[1..] {
        bounds.0 = bounds.0.min(p.x);
        bounds.1 = bounds.1.min(p.y);
        bounds.2 = bounds.2.max(p.x);
        bounds.3 = bounds.3.max(p.y);
    }
    Some(bounds)
}

/// Vertex centroid (mean of the points)
pub fn vertex_centroid(points: &[Point]) -> Option<Point> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let sum_x: f64 = points.iter().map(|p| p.x).sum();
    let sum_y: f64 = points.iter().map(|p| p.y).sum();
    Some(Point::new(sum_x / n, sum_y / n))
}

/// Point halfway along the path length
pub fn path_midpoint(points: &[Point]) -> Option<Point> {
    match points {
        [] => None,
        [only] => Some(*only),
        _ => {
            let half = polyline_length(points) / 2.0;
            let mut accumulated = 0.0;
            for w in points.windows(2) {
                let segment = w[0].distance_to(&w[1]);
                if segment > 0.0 && accumulated + segment >= half {
                    return Some(w[0].lerp(&w[1], (half - accumulated) / segment));
                }
                accumulated += segment;
            }
            points.last().copied()
        }
    }
}

/// Shortest distance from `point` to the segment `start`..`end`
pub fn distance_to_segment(point: &Point, start: &Point, end: &Point) -> f64 {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let length_sq = dx * dx + dy * dy;

    if length_sq < 1e-12 {
        // Degenerate segment
        return point.distance_to(start);
    }

    let t = ((point.x - start.x) * dx + (point.y - start.y) * dy) / length_sq;
    let closest = start.lerp(end, t.clamp(0.0, 1.0));
    point.distance_to(&closest)
}

/// True if `point` lies within `tolerance` of any segment of the path
pub fn point_near_polyline(point: &Point, points: &[Point], tolerance: f64) -> bool {
    match points {
        [] => false,
        [only] => point.distance_to(only) <= tolerance,
        _ => points
            .windows(2)
            .any(|w| distance_to_segment(point, &w[0], &w[1]) <= tolerance),
    }
}

/// Even-odd ray casting test against a closed ring
pub fn point_in_polygon(point: &Point, ring: &[Point]) -> bool {
    if ring.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (a, b) = (&ring[i], &ring[j]);
        if (a.y > point.y) != (b.y > point.y) {
            let x_cross = (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x;
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(side: f64) -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(side, 0.0),
            Point::new(side, side),
            Point::new(0.0, side),
        ]
    }

    #[test]
    fn test_polyline_length() {
        let path = vec![
            Point::new(0.0, 0.0),
            Point::new(3.0, 4.0),
            Point::new(3.0, 10.0),
        ];
        assert_eq!(polyline_length(&path), 11.0);
        assert_eq!(polyline_length(&path[..1]), 0.0);
    }

    #[test]
    fn test_polyline_length_reversal_invariant() {
        let path = vec![
            Point::new(1.5, -2.0),
            Point::new(7.25, 3.0),
            Point::new(-4.0, 9.5),
            Point::new(0.0, 0.0),
        ];
        let mut reversed = path.clone();
        reversed.reverse();
        assert!((polyline_length(&path) - polyline_length(&reversed)).abs() < 1e-9);
    }

    #[test]
    fn test_polygon_area_square() {
        assert_eq!(polygon_area(&square(100.0)), 10_000.0);
    }

    #[test]
    fn test_polygon_area_winding_and_rotation() {
        let ring = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(12.0, 7.0),
            Point::new(3.0, 9.0),
        ];
        let expected = polygon_area(&ring);

        let mut reversed = ring.clone();
        reversed.reverse();
        assert!((polygon_area(&reversed) - expected).abs() < 1e-9);
        assert!((signed_area(&reversed) + signed_area(&ring)).abs() < 1e-9);

        for shift in 1..ring.len() {
            let mut rotated = ring.clone();
            rotated.rotate_left(shift);
            assert!((polygon_area(&rotated) - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_degenerate_polygon_has_no_area() {
        assert_eq!(polygon_area(&[Point::new(0.0, 0.0), Point::new(5.0, 5.0)]), 0.0);
    }

    #[test]
    fn test_bounding_box() {
        let points = vec![Point::new(3.0, -1.0), Point::new(-2.0, 4.0), Point::new(1.0, 1.0)];
        assert_eq!(bounding_box(&points), Some((-2.0, -1.0, 3.0, 4.0)));
        assert_eq!(bounding_box(&[]), None);
    }

    #[test]
    fn test_path_midpoint() {
        let path = vec![
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 100.0),
        ];
        assert_eq!(path_midpoint(&path), Some(Point::new(100.0, 0.0)));

        let line = vec![Point::new(0.0, 0.0), Point::new(100.0, 50.0)];
        assert_eq!(path_midpoint(&line), Some(Point::new(50.0, 25.0)));
    }

    #[test]
    fn test_point_near_polyline() {
        let path = vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)];
        assert!(point_near_polyline(&Point::new(5.0, 1.0), &path, 1.5));
        assert!(!point_near_polyline(&Point::new(5.0, 3.0), &path, 1.5));
        assert!(point_near_polyline(&Point::new(11.0, 0.0), &path, 1.5));
    }

    #[test]
    fn test_point_in_polygon() {
        let ring = square(10.0);
        assert!(point_in_polygon(&Point::new(5.0, 5.0), &ring));
        assert!(!point_in_polygon(&Point::new(15.0, 5.0), &ring));
        assert!(!point_in_polygon(&Point::new(5.0, 5.0), &ring[..2]));
    }
}
