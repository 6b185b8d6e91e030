pub mod entity;
pub mod geometry;
pub mod markers;
pub mod world;

pub use entity::*;
pub use geometry::*;
pub use markers::*;
pub use world::*;
