//! The line-of-sight collision predicate Theta* delegates to (spec §4.5,
//! §6: `line_shape_intersection`).
//!
//! The roadmap layer's real collision geometry is out of scope (spec §1);
//! this realizes just enough of it — segment-vs-inflated-axis-aligned-box
//! intersection — for Theta*'s parent-smoothing check to have something
//! concrete to call.

use crate::geometry::Point;

/// An axis-aligned obstacle, inflated by a buffer radius at query time.
#[derive(Debug, Clone)]
pub struct Polygon {
    pub min: Point,
    pub max: Point,
}

impl Polygon {
    pub fn new(min: Point, max: Point) -> Self {
        Polygon { min, max }
    }

    fn inflated(&self, buffer: f64) -> (Point, Point) {
        (
            Point::new(self.min.x - buffer, self.min.y - buffer),
            Point::new(self.max.x + buffer, self.max.y + buffer),
        )
    }
}

/// Segment `a -> b` vs. `polygon` inflated by `buffer`, via the
/// slab method (Liang-Barsky clipping against an axis-aligned box).
fn segment_intersects_box(a: Point, b: Point, min: Point, max: Point) -> bool {
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
    let d = (b.x - a.x, b.y - a.y);

    let clip = |p: f64, q: f64, t0: &mut f64, t1: &mut f64| -> bool {
        if p == 0.0 {
            return q >= 0.0;
        }
        let r = q / p;
        if p < 0.0 {
            if r > *t1 {
                return false;
            }
            if r > *t0 {
                *t0 = r;
            }
        } else {
            if r < *t0 {
                return false;
            }
            if r < *t1 {
                *t1 = r;
            }
        }
        true
    };

    clip(-d.0, a.x - min.x, &mut t0, &mut t1)
        && clip(d.0, max.x - a.x, &mut t0, &mut t1)
        && clip(-d.1, a.y - min.y, &mut t0, &mut t1)
        && clip(d.1, max.y - a.y, &mut t0, &mut t1)
        && t0 <= t1
}

/// Whether the segment from `a` to `b` intersects `polygon` inflated by
/// `buffer`. Used only by Theta*'s line-of-sight parent-smoothing check.
pub fn line_shape_intersection(a: Point, b: Point, polygon: &Polygon, buffer: f64) -> bool {
    let (min, max) = polygon.inflated(buffer);
    segment_intersects_box(a, b, min, max)
}

/// Whether the segment `a -> b` has a clear line of sight, i.e. does not
/// intersect any obstacle in `obstacles` inflated by `buffer`.
pub fn has_line_of_sight(a: Point, b: Point, obstacles: &[Polygon], buffer: f64) -> bool {
    !obstacles
        .iter()
        .any(|poly| line_shape_intersection(a, b, poly, buffer))
}
