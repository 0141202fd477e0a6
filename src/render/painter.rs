use std::f32::consts::TAU;

use glam::Vec2;

use crate::simulation::Rgb;

/// Segments used to flatten one bezier curve
const CURVE_SEGMENTS: usize = 16;

/// Arc flattening bounds
const ARC_SEGMENTS_MIN: usize = 8;
const ARC_SEGMENTS_MAX: usize = 720;

/// Immediate-mode 2D drawing target with a scoped graphics-state stack.
///
/// Coordinates are logical pixels in the current transform. Every `save`
/// must be paired with a `restore` before the caller returns.
pub trait Painter {
    fn save(&mut self);
    fn restore(&mut self);

    fn translate(&mut self, offset: Vec2);
    fn rotate(&mut self, angle: f32);
    fn scale(&mut self, factor: f32);

    fn set_stroke(&mut self, color: Rgb, alpha: f32);
    fn set_fill(&mut self, color: Rgb, alpha: f32);
    fn set_line_width(&mut self, width: f32);
    /// Soft halo drawn under strokes, 0 disables it
    fn set_glow(&mut self, radius: f32);

    fn stroke(&mut self, path: &Path);
    fn fill_circle(&mut self, center: Vec2, radius: f32);
    fn fill_rect(&mut self, origin: Vec2, size: Vec2);

    /// Reset every pixel to black
    fn clear(&mut self);

    /// Drawable area in logical pixels
    fn size(&self) -> Vec2;
}

/// Polyline path built from lines, curves and arcs, flattened as it is built
#[derive(Clone, Debug, Default)]
pub struct Path {
    subpaths: Vec<Vec<Vec2>>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.subpaths.iter().all(|s| s.len() < 2)
    }

    pub fn subpaths(&self) -> impl Iterator<Item = &[Vec2]> {
        self.subpaths.iter().map(|s| s.as_slice())
    }

    fn current(&mut self) -> &mut Vec<Vec2> {
        if self.subpaths.is_empty() {
            self.subpaths.push(Vec::new());
        }
        let last = self.subpaths.len() - 1;
        &mut self.subpaths[last]
    }

    fn last_point(&self) -> Option<Vec2> {
        self.subpaths.last().and_then(|s| s.last().copied())
    }

    pub fn move_to(&mut self, p: Vec2) {
        self.subpaths.push(vec![p]);
    }

    pub fn line_to(&mut self, p: Vec2) {
        self.current().push(p);
    }

    pub fn quad_to(&mut self, control: Vec2, p: Vec2) {
        let start = self.last_point().unwrap_or(control);
        let points = self.current();
        for i in 1..=CURVE_SEGMENTS {
            let t = i as f32 / CURVE_SEGMENTS as f32;
            let mt = 1.0 - t;
            points.push(start * (mt * mt) + control * (2.0 * mt * t) + p * (t * t));
        }
    }

    pub fn cubic_to(&mut self, c1: Vec2, c2: Vec2, p: Vec2) {
        let start = self.last_point().unwrap_or(c1);
        let points = self.current();
        for i in 1..=CURVE_SEGMENTS {
            let t = i as f32 / CURVE_SEGMENTS as f32;
            let mt = 1.0 - t;
            points.push(
                start * (mt * mt * mt)
                    + c1 * (3.0 * mt * mt * t)
                    + c2 * (3.0 * mt * t * t)
                    + p * (t * t * t),
            );
        }
    }

    /// Arc from `start` to `end` (radians, clockwise on screen), continuing
    /// the current subpath
    pub fn arc(&mut self, center: Vec2, radius: f32, start: f32, end: f32) {
        let sweep = end - start;
        let segments = ((radius.abs() * sweep.abs() / 3.0).ceil() as usize)
            .clamp(ARC_SEGMENTS_MIN, ARC_SEGMENTS_MAX);
        let points = self.current();
        for i in 0..=segments {
            let a = start + sweep * i as f32 / segments as f32;
            points.push(center + Vec2::from_angle(a) * radius);
        }
    }

    /// Full circle as its own closed subpath
    pub fn circle(&mut self, center: Vec2, radius: f32) {
        self.subpaths.push(Vec::new());
        self.arc(center, radius, 0.0, TAU);
    }

    /// Closed polygon as its own subpath
    pub fn polygon(&mut self, points: &[Vec2]) {
        if let Some(&first) = points.first() {
            let mut sub = points.to_vec();
            sub.push(first);
            self.subpaths.push(sub);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_path() {
        let mut path = Path::new();
        path.move_to(Vec2::ZERO);
        path.line_to(Vec2::new(10.0, 0.0));
        let subs: Vec<&[Vec2]> = path.subpaths().collect();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0], &[Vec2::ZERO, Vec2::new(10.0, 0.0)]);
        assert!(!path.is_empty());
    }

    #[test]
    fn test_single_point_is_empty() {
        let mut path = Path::new();
        path.move_to(Vec2::ONE);
        assert!(path.is_empty());
    }

    #[test]
    fn test_circle_points_on_radius() {
        let mut path = Path::new();
        path.circle(Vec2::new(5.0, 5.0), 20.0);
        let sub = path.subpaths().next().expect("circle subpath");
        for p in sub {
            assert!((p.distance(Vec2::new(5.0, 5.0)) - 20.0).abs() < 1e-3);
        }
        assert!(sub.first().unwrap().distance(*sub.last().unwrap()) < 1e-3);
    }

    #[test]
    fn test_cubic_ends_on_target() {
        let mut path = Path::new();
        path.move_to(Vec2::ZERO);
        path.cubic_to(Vec2::new(0.0, 10.0), Vec2::new(10.0, 10.0), Vec2::new(10.0, 0.0));
        let sub = path.subpaths().next().unwrap();
        assert_eq!(sub.len(), CURVE_SEGMENTS + 1);
        assert!(sub.last().unwrap().distance(Vec2::new(10.0, 0.0)) < 1e-5);
    }

    #[test]
    fn test_polygon_is_closed() {
        let mut path = Path::new();
        path.polygon(&[Vec2::ZERO, Vec2::X, Vec2::Y]);
        let sub = path.subpaths().next().unwrap();
        assert_eq!(sub.len(), 4);
        assert_eq!(sub[0], sub[3]);
    }

    #[test]
    fn test_arc_segment_count_is_bounded() {
        let mut path = Path::new();
        path.arc(Vec2::ZERO, 1.0e6, 0.0, TAU);
        let sub = path.subpaths().next().unwrap();
        assert_eq!(sub.len(), ARC_SEGMENTS_MAX + 1);
    }
}
