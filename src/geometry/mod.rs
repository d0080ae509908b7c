pub mod boolean;
pub mod face;
pub mod plane;
pub mod primitives;
pub mod solid;

pub use boolean::IntersectSolids;
pub use face::PlanarFace;
pub use plane::Plane;
pub use primitives::{MakeBox, MakeExtrusion, MakePipe};
pub use solid::Solid;
