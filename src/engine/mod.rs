pub mod raycast;

pub use raycast::{
    FOV_PLANE, IntersectionInfo, Side, cast_column, cast_view, cast_view_par, column_direction,
};
