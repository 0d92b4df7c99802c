pub mod geometry;
pub mod kd_tree;
