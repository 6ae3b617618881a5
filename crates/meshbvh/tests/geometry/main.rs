#[macro_use]
extern crate approx;
extern crate nalgebra as na;

mod build_invariants;
mod bvhcast;
mod closest_point;
mod meshes;
mod multi_root;
mod raycast;
mod refit;
mod serialization;
