pub mod labels;
pub mod quiz;

pub use labels::*;
pub use quiz::*;
