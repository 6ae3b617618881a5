//! Implementation details of the `intersection_test` function.

pub use self::intersection_test_primitive_primitive::intersection_test_primitive_primitive;

mod intersection_test_primitive_primitive;
