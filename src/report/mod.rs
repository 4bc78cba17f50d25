pub mod histogram;
pub mod narrative;
pub mod summary;
