//! World placement: the viewport mapping and the content fit nested inside it.

pub mod cache;
pub mod fit;
pub mod viewport;
