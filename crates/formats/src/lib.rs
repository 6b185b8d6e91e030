pub mod attributes;
pub mod bundle;
pub mod capitals;
pub mod geojson;
pub mod regions;
pub mod topology;

pub use attributes::*;
pub use bundle::*;
pub use capitals::*;
pub use geojson::*;
pub use regions::*;
pub use topology::*;
