use std::f64::consts::TAU;

use crate::{
    engine::raycast::cast_column,
    world::{Map, Vector, geometry::perp_cw, heading_vector},
};

/// Observer in map space.
///
/// * Only **yaw** (heading) is simulated; there is no pitch or eye height.
/// * Yaw is in radians, 0 = east, counter-clockwise positive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pos: Vector,
    yaw: f64,
}

impl Camera {
    pub fn new(pos: Vector, yaw: f64) -> Self {
        Self {
            pos,
            yaw: yaw.rem_euclid(TAU),
        }
    }

    /// Camera at the map's start spot.
    pub fn at_start<M: Map + ?Sized>(map: &M) -> Self {
        Self::new(Vector::new(map.start_x(), map.start_y()), map.start_dir())
    }

    #[inline]
    pub fn pos(&self) -> Vector {
        self.pos
    }

    #[inline]
    pub fn yaw(&self) -> f64 {
        self.yaw
    }

    /*──────────────────────── derived vectors ───────────────────────*/

    /// Unit vector pointing where the camera looks.
    #[inline(always)]
    pub fn forward(self) -> Vector {
        heading_vector(self.yaw)
    }

    /// Unit vector pointing to the camera's right.
    #[inline(always)]
    pub fn right(self) -> Vector {
        perp_cw(self.forward())
    }

    /*──────────────────────── movement helpers ──────────────────────*/

    /// Move by `forward` units and `side` (strafe, + right) ignoring walls.
    pub fn step(&mut self, forward: f64, side: f64) {
        self.pos += self.forward() * forward + self.right() * side;
    }

    /// Rotate (positive = turn left).
    pub fn turn(&mut self, delta_yaw: f64) {
        self.yaw = (self.yaw + delta_yaw).rem_euclid(TAU);
    }

    /// Collision-aware [`step`](Self::step).
    ///
    /// Probes a ray in the movement direction and refuses the move when the
    /// first wall, less `radius`, is closer than the move itself, or when
    /// the destination cell holds an obstacle.  Returns whether it moved.
    pub fn walk<M: Map + ?Sized>(&mut self, map: &M, forward: f64, side: f64, radius: f64) -> bool {
        let delta = self.forward() * forward + self.right() * side;
        let len = delta.length();
        if len == 0.0 {
            return false;
        }

        let probe = cast_column(self.pos, delta / len, map);
        if probe.hit && probe.distance() - radius < len {
            return false;
        }

        let dest = self.pos + delta;
        let (cx, cy) = (dest.x.floor() as i32, dest.y.floor() as i32);
        let (sx, sy) = (self.pos.x.floor() as i32, self.pos.y.floor() as i32);
        if (cx, cy) != (sx, sy) && map.obstacle_at(cx, cy) {
            return false;
        }

        self.pos = dest;
        true
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
