//! Geometry and physics collaborators.
//!
//! - [`Shape`]: impact areas used for target lookup
//! - [`Force`]: forces applied to mobile entities
//! - [`PhysicsSink`]: the physics engine that receives them

pub mod shape;
pub mod force;

pub use shape::{angle_between, angle_of, project, Shape};
pub use force::{Force, ForceRef, PhysicsSink};
