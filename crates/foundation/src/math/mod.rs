pub mod centroid;
pub mod projection;
pub mod vec;

pub use centroid::*;
pub use projection::*;
pub use vec::*;
