mod bitmatrix;
mod bounded_index;

pub use bitmatrix::*;
pub use bounded_index::*;
