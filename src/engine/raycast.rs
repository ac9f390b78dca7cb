//! Grid DDA ray caster.
//!
//! ```text
//!            side_dist.y
//!   +-----+-----+-----+        A ray from `origin` advances one grid line
//!   |     |     |#####|        at a time along whichever axis is nearer
//!   |   o-+-----+->###|        (`side_dist`), stepping `delta` per cell,
//!   |     |     |#####|        until the entered cell is a wall.
//!   +-----+-----+-----+
//! ```
//!
//! Distances are in ray-parameter units: a hit at `origin + t·dir` reports
//! `t`.  With the camera-plane rays of [`cast_view`] that is the distance
//! projected on the view axis, which keeps walls free of fisheye.

use rayon::prelude::*;

use crate::world::{Cell, Map, Vector, heading_vector, perp_cw};

/// Half-width of the camera plane at unit distance (≈ 66° field of view).
pub const FOV_PLANE: f64 = 0.66;

/// Which axis the ray advanced on the final step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    /// Crossed a vertical grid line: the east or west face of a cell.
    X = 0,
    /// Crossed a horizontal grid line: the north or south face of a cell.
    Y = 1,
}

/// Result of one cast.
#[derive(Clone, Copy, Debug)]
pub struct IntersectionInfo<'a> {
    /// `false` when the ray left the map without meeting a wall; the other
    /// fields then describe the last cell visited.
    pub hit: bool,
    pub perpendicular_distance: f64,
    pub cell: Cell<'a>,
    pub side: Side,
    /// Where along the hit face the ray landed, in `[0, 1)`, read so that
    /// textures run left to right from every approach direction.
    pub wall_offset: f64,
    pub observer: Vector,
    pub point: Vector,
    /// `|cos|` of the angle between the ray and the hit face's normal.
    pub cos_angle: f64,
}

impl IntersectionInfo<'_> {
    /// Euclidean distance from the observer to the hit point.
    #[inline]
    pub fn distance(&self) -> f64 {
        (self.point - self.observer).length()
    }
}

/// Cast one ray from `origin` along `dir` (need not be normalised).
///
/// Terminates on the first cell for which `map.wall_at` holds.  A ray that
/// is outside the map and moving further away (or parallel to the border it
/// crossed) can never meet a wall again and is reported with
/// `hit == false`; closed maps never take that path.
pub fn cast_column<'m, M: Map + ?Sized>(
    origin: Vector,
    dir: Vector,
    map: &'m M,
) -> IntersectionInfo<'m> {
    let mut map_x = origin.x.floor() as i32;
    let mut map_y = origin.y.floor() as i32;

    // ray length between two grid lines on each axis
    let delta = |d: f64| if d != 0.0 { (1.0 / d).abs() } else { f64::INFINITY };
    let (delta_x, delta_y) = (delta(dir.x), delta(dir.y));

    let (step_x, mut side_x) = if dir.x < 0.0 {
        (-1, (origin.x - map_x as f64) * delta_x)
    } else if dir.x > 0.0 {
        (1, (map_x as f64 + 1.0 - origin.x) * delta_x)
    } else {
        (1, f64::INFINITY)
    };
    let (step_y, mut side_y) = if dir.y < 0.0 {
        (-1, (origin.y - map_y as f64) * delta_y)
    } else if dir.y > 0.0 {
        (1, (map_y as f64 + 1.0 - origin.y) * delta_y)
    } else {
        (1, f64::INFINITY)
    };

    let (w, h) = (map.width(), map.height());
    let escaping = |mx: i32, my: i32| {
        let out_x = (mx < 0 && dir.x <= 0.0) || (mx >= w && dir.x >= 0.0);
        let out_y = (my < 0 && dir.y <= 0.0) || (my >= h && dir.y >= 0.0);
        out_x || out_y
    };

    let mut side = Side::X;
    let hit = loop {
        if side_x < side_y {
            side_x += delta_x;
            map_x += step_x;
            side = Side::X;
        } else {
            side_y += delta_y;
            map_y += step_y;
            side = Side::Y;
        }

        if map.wall_at(map_x, map_y) {
            break true;
        }
        if escaping(map_x, map_y) {
            break false;
        }
    };

    let perpendicular_distance = match side {
        Side::X => side_x - delta_x,
        Side::Y => side_y - delta_y,
    };

    let mut wall_offset = match side {
        Side::X => {
            let o = origin.y + perpendicular_distance * dir.y;
            if dir.x > 0.0 { 1.0 - o } else { o }
        }
        Side::Y => {
            let o = origin.x + perpendicular_distance * dir.x;
            if dir.y < 0.0 { 1.0 - o } else { o }
        }
    };
    wall_offset -= wall_offset.floor();

    let (cx, cy) = (map_x as f64, map_y as f64);
    let point = match side {
        // west-bound ray meets the east face, east-bound the west face
        Side::X if dir.x <= 0.0 => Vector::new(cx + 1.0, cy + wall_offset),
        Side::X => Vector::new(cx, cy + 1.0 - wall_offset),
        // north-bound ray meets the south face, south-bound the north face
        Side::Y if dir.y >= 0.0 => Vector::new(cx + wall_offset, cy),
        Side::Y => Vector::new(cx + 1.0 - wall_offset, cy + 1.0),
    };

    let unit = dir.normalize_or_zero();
    let cos_angle = match side {
        Side::X => unit.x.abs(),
        Side::Y => unit.y.abs(),
    };

    IntersectionInfo {
        hit,
        perpendicular_distance,
        cell: map.cell(map_x, map_y),
        side,
        wall_offset,
        observer: origin,
        point,
        cos_angle,
    }
}

/// Direction of column `column` of `columns` for a camera facing `heading`.
///
/// Column 0 is the left edge of the screen.
#[inline]
pub fn column_direction(column: usize, columns: usize, heading: f64) -> Vector {
    let dir = heading_vector(heading);
    let plane = perp_cw(dir) * FOV_PLANE;
    let camera_x = 2.0 * column as f64 / columns as f64 - 1.0;
    dir + plane * camera_x
}

/// One cast per screen column, ordered left to right.
pub fn cast_view<'m, M: Map + ?Sized>(
    columns: usize,
    origin: Vector,
    heading: f64,
    map: &'m M,
) -> Vec<IntersectionInfo<'m>> {
    (0..columns)
        .map(|i| cast_column(origin, column_direction(i, columns, heading), map))
        .collect()
}

/// [`cast_view`] spread over the rayon pool; same output, same order.
pub fn cast_view_par<'m, M: Map + Sync + ?Sized>(
    columns: usize,
    origin: Vector,
    heading: f64,
    map: &'m M,
) -> Vec<IntersectionInfo<'m>> {
    (0..columns)
        .into_par_iter()
        .map(|i| cast_column(origin, column_direction(i, columns, heading), map))
        .collect()
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{Catalog, GridMap, Structure, StructureFlags, StructureId};
    use std::f64::consts::{FRAC_PI_2, PI};

    const EPS: f64 = 1e-9;

    fn catalog() -> (Catalog, StructureId) {
        let mut cat = Catalog::with_checker().unwrap();
        let wall = cat
            .add(
                Structure::new("wall")
                    .with_texture(0)
                    .with_flags(StructureFlags::WALL | StructureFlags::OBSTACLE),
            )
            .unwrap();
        (cat, wall)
    }

    fn walls(wall: StructureId) -> impl Fn(u16) -> StructureId {
        move |c| if c == 1 { wall } else { StructureId::NONE }
    }

    /// 10×1 corridor walled at columns 0 and 9.
    fn corridor(cat: &Catalog, wall: StructureId) -> GridMap<'_> {
        let codes = [1, 0, 0, 0, 0, 0, 0, 0, 0, 1];
        GridMap::new(cat, 10, &codes, walls(wall)).unwrap()
    }

    /// `n`×`n` room with a solid border.
    fn room(cat: &Catalog, wall: StructureId, n: usize) -> GridMap<'_> {
        let mut codes = vec![0u16; n * n];
        for i in 0..n {
            codes[i] = 1;
            codes[(n - 1) * n + i] = 1;
            codes[i * n] = 1;
            codes[i * n + n - 1] = 1;
        }
        GridMap::new(cat, n, &codes, walls(wall)).unwrap()
    }

    fn close(a: Vector, b: Vector) -> bool {
        (a - b).length() < EPS
    }

    #[test]
    fn east_ray_hits_west_face() {
        let (cat, wall) = catalog();
        let map = corridor(&cat, wall);
        let info = cast_column(Vector::new(4.5, 0.5), Vector::X, &map);

        assert!(info.hit);
        assert_eq!(info.side, Side::X);
        assert_eq!((info.cell.x, info.cell.y), (9, 0));
        assert!(close(info.point, Vector::new(9.0, 0.5)));
        assert!((info.perpendicular_distance - 4.5).abs() < EPS);
        assert!((info.wall_offset - 0.5).abs() < EPS);
        assert!((info.cos_angle - 1.0).abs() < EPS);
        assert!(std::ptr::eq(info.cell.structure, cat.get(wall)));
    }

    #[test]
    fn west_ray_hits_east_face() {
        let (cat, wall) = catalog();
        let map = corridor(&cat, wall);
        let info = cast_column(Vector::new(4.5, 0.5), Vector::NEG_X, &map);

        assert!(info.hit);
        assert_eq!(info.side, Side::X);
        assert_eq!((info.cell.x, info.cell.y), (0, 0));
        assert!(close(info.point, Vector::new(1.0, 0.5)));
        assert!((info.perpendicular_distance - 3.5).abs() < EPS);
        assert!((info.distance() - 3.5).abs() < EPS);
    }

    #[test]
    fn vertical_rays_hit_horizontal_faces() {
        let (cat, wall) = catalog();
        let map = room(&cat, wall, 8);
        let origin = Vector::new(3.25, 2.5);

        let north = cast_column(origin, Vector::Y, &map);
        assert!(north.hit);
        assert_eq!(north.side, Side::Y);
        assert_eq!((north.cell.x, north.cell.y), (3, 7));
        assert!(close(north.point, Vector::new(3.25, 7.0)));
        assert!((north.perpendicular_distance - 4.5).abs() < EPS);
        assert!((north.wall_offset - 0.25).abs() < EPS);

        let south = cast_column(origin, Vector::NEG_Y, &map);
        assert!(south.hit);
        assert_eq!(south.side, Side::Y);
        assert_eq!((south.cell.x, south.cell.y), (3, 0));
        assert!(close(south.point, Vector::new(3.25, 1.0)));
        assert!((south.perpendicular_distance - 1.5).abs() < EPS);
        assert!((south.wall_offset - 0.75).abs() < EPS);
    }

    #[test]
    fn diagonal_ray_offset_and_cosine() {
        let (cat, wall) = catalog();
        let map = room(&cat, wall, 8);
        let dir = Vector::new(1.0, 0.5);
        let info = cast_column(Vector::new(1.5, 1.5), dir, &map);

        assert!(info.hit);
        assert_eq!(info.side, Side::X);
        assert_eq!(info.cell.x, 7);
        // x = 7 reached after t = 5.5, y = 1.5 + 2.75
        assert!((info.perpendicular_distance - 5.5).abs() < EPS);
        assert!(close(info.point, Vector::new(7.0, 4.25)));
        assert!((info.wall_offset - 0.75).abs() < EPS);
        assert!((info.cos_angle - dir.normalize().x).abs() < EPS);
        assert!((0.0..1.0).contains(&info.wall_offset));
    }

    #[test]
    fn integral_origin_with_axis_ray() {
        let (cat, wall) = catalog();
        let map = room(&cat, wall, 6);
        // y lies exactly on a grid line while dir.y == 0
        let info = cast_column(Vector::new(2.5, 3.0), Vector::X, &map);
        assert!(info.hit);
        assert_eq!(info.side, Side::X);
        assert_eq!((info.cell.x, info.cell.y), (5, 3));
    }

    #[test]
    fn open_map_escapes() {
        let cat = Catalog::with_checker().unwrap();
        let map = GridMap::new(&cat, 3, &[0; 9], |_| StructureId::NONE).unwrap();

        for dir in [Vector::X, Vector::NEG_Y, Vector::new(-0.3, 0.8)] {
            let info = cast_column(Vector::new(1.5, 1.5), dir, &map);
            assert!(!info.hit);
            assert!(!map.contains(info.cell.x, info.cell.y));
        }
    }

    #[test]
    fn view_is_ordered_left_to_right() {
        let (cat, wall) = catalog();
        let map = room(&cat, wall, 9);
        let origin = Vector::new(4.5, 4.5);
        let view = cast_view(64, origin, FRAC_PI_2, &map);

        assert_eq!(view.len(), 64);
        assert!(view.iter().all(|i| i.hit));
        // facing north: left columns land west of the observer
        assert!(view[0].point.x < origin.x);
        assert!(view[63].point.x > origin.x);
        // centre column looks straight ahead
        let centre = &view[32];
        assert!((centre.point.x - 4.5).abs() < EPS);
        assert!((centre.perpendicular_distance - 3.5).abs() < EPS);
    }

    #[test]
    fn flat_wall_has_constant_perpendicular_distance() {
        let (cat, wall) = catalog();
        let map = room(&cat, wall, 40);
        let view = cast_view(32, Vector::new(20.5, 20.5), 0.0, &map);
        for info in &view {
            assert_eq!(info.cell.x, 39);
            assert!((info.perpendicular_distance - 18.5).abs() < 1e-6);
        }
    }

    #[test]
    fn parallel_view_matches_sequential() {
        let (cat, wall) = catalog();
        let map = room(&cat, wall, 12);
        let origin = Vector::new(3.3, 7.9);
        let seq = cast_view(200, origin, PI * 0.77, &map);
        let par = cast_view_par(200, origin, PI * 0.77, &map);

        assert_eq!(seq.len(), par.len());
        for (a, b) in seq.iter().zip(&par) {
            assert_eq!((a.cell.x, a.cell.y), (b.cell.x, b.cell.y));
            assert_eq!(a.side, b.side);
            assert_eq!(a.perpendicular_distance, b.perpendicular_distance);
            assert_eq!(a.wall_offset, b.wall_offset);
        }
    }

    #[test]
    fn column_directions_span_camera_plane() {
        let left = column_direction(0, 100, 0.0);
        assert!(close(left, Vector::new(1.0, FOV_PLANE)));
        let mid = column_direction(50, 100, 0.0);
        assert!(close(mid, Vector::X));
    }
}
