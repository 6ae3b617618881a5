//! Implementation details of the `closest_points` function.

pub use self::closest_points_primitive_primitive::{
    closest_points_primitive_primitive, closest_points_segment_triangle,
    closest_points_triangle_triangle, segment_triangle_crossing,
};
pub use self::closest_points_segment_segment::{
    closest_parameters_segment_segment, closest_points_segment_segment,
    closest_points_segment_segment_with_locations,
};

mod closest_points_primitive_primitive;
mod closest_points_segment_segment;
