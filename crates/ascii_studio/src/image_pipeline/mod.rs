pub mod adjust;
pub mod affine;
pub mod geometry;
pub mod sampler;
pub mod source;
