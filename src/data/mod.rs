pub mod crsp;

pub use crsp::{load_panel, read_panel, DataError};
