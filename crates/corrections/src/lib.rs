pub mod builtin;
pub mod patch;
pub mod table;

pub use builtin::{CAPITAL_MARKER_OFFSET, referenced_alpha3_codes};
pub use patch::*;
pub use table::*;
