use glam::DVec2;

/// 2-D point / direction in map units (x east, y north).
pub type Vector = DVec2;

/// Unit vector for a heading in radians (0 = east, counter-clockwise).
#[inline]
pub fn heading_vector(angle: f64) -> Vector {
    Vector::from_angle(angle)
}

/// `(x, y) -> (y, -x)`; `DVec2::perp` is the counter-clockwise one.
#[inline]
pub fn perp_cw(v: Vector) -> Vector {
    Vector::new(v.y, -v.x)
}

/*------------------------------ lines -------------------------------*/

/// Directed segment `start → end`.  Derived values are recomputed on
/// every call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Line {
    pub start: Vector,
    pub end: Vector,
}

impl Line {
    pub const fn new(start: Vector, end: Vector) -> Self {
        Self { start, end }
    }

    #[inline]
    pub fn heading(&self) -> Vector {
        self.end - self.start
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.heading().length()
    }

    /// Zero vector for a degenerate line.
    #[inline]
    pub fn normalized_heading(&self) -> Vector {
        self.heading().normalize_or_zero()
    }

    /// `start + t·heading`; `t ∈ [0,1]` stays on the segment.
    #[inline]
    pub fn segment_point(&self, t: f64) -> Vector {
        self.start + self.heading() * t
    }

    /// Point `distance` map units from `start` along the line.
    #[inline]
    pub fn point(&self, distance: f64) -> Vector {
        self.start + self.normalized_heading() * distance
    }

    /// Parameter on `self` where `other` crosses it, only when the crossing
    /// lies within both segments.
    pub fn segment_intersection(&self, other: &Line) -> Option<f64> {
        line_intersection(self, other)
            .filter(|(t, u)| (0.0..=1.0).contains(t) && (0.0..=1.0).contains(u))
            .map(|(t, _)| t)
    }

    /// Crossing point within `self`'s segment.
    pub fn segment_intersection_point(&self, other: &Line) -> Option<Vector> {
        self.segment_intersection(other)
            .map(|t| self.segment_point(t))
    }
}

/// Intersection of the infinite extensions of two lines.
///
/// Returns `(t, u)` with the crossing at `a.segment_point(t)` ==
/// `b.segment_point(u)`, or `None` for parallel / coincident lines.
pub fn line_intersection(a: &Line, b: &Line) -> Option<(f64, f64)> {
    let d1 = a.start - a.end;
    let d2 = b.start - b.end;
    let denom = d1.x * d2.y - d1.y * d2.x;
    if denom == 0.0 {
        return None;
    }

    let s = a.start - b.start;
    let t = (s.x * d2.y - s.y * d2.x) / denom;
    let u = -(d1.x * s.y - d1.y * s.x) / denom;
    Some((t, u))
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
