pub mod era;
pub mod panel;
pub mod results;
