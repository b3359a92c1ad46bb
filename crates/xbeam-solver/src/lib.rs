//! Explicit dynamics for 3D frames of two-node beam elements.
//!
//! The crate assembles global sparse stiffness, mass and inverse-mass
//! operators from beam elements and advances nodal displacements,
//! velocities and accelerations with a Newmark scheme.
//!
//! ```no_run
//! use nalgebra::{DVector, Vector3};
//! use xbeam_solver::{
//!     estimate_stable_timestep, BeamFormulation, BeamProps, BoundaryCondition, DynamicBeam,
//!     ExplicitOptions, ExplicitSystem, Mesh, Node, TimeFunction,
//! };
//!
//! # fn main() -> xbeam_solver::Result<()> {
//! let props = BeamProps::new(200e9, 80e9, 1e-3, 1e-7, 1e-7, 2e-7, 7800.0, Vector3::y());
//! let nodes = vec![Node::zeros(), Node::new(1.0, 0.0, 0.0)];
//! let elements = vec![DynamicBeam::new(BeamFormulation::Timoshenko, 0, 1, props)];
//! let mut bcs = BoundaryCondition::clamp_node(0);
//! bcs.push(BoundaryCondition::velocity(1, 0, TimeFunction::Constant(1e-3)));
//!
//! let dt = estimate_stable_timestep(&nodes, &elements).unwrap_or(1e-6);
//! let mesh = Mesh::new(nodes, elements, bcs)?;
//! let n = mesh.num_dofs();
//! let mut system = ExplicitSystem::new(
//!     mesh,
//!     vec![],
//!     DVector::zeros(n),
//!     DVector::zeros(n),
//!     0.0,
//!     ExplicitOptions::default(),
//! )?;
//! for _ in 0..100 {
//!     system.advance(dt)?;
//! }
//! println!("tip displacement: {}", system.displacements()[6]);
//! # Ok(())
//! # }
//! ```

pub mod boundary_conditions;
pub mod compare;
pub mod dof;
pub mod elements;
pub mod error;
pub mod explicit_system;
pub mod mesh;
pub mod sparse;
pub mod stability;
pub mod transform;

pub use boundary_conditions::{BcKind, BoundaryCondition, Force, PrescribedValue, TimeFunction};
pub use compare::{Comparable, ValueCompare};
pub use dof::{global_index, node_and_dof, Dof, NUM_DOFS};
pub use elements::{
    BeamElement, BeamFormulation, BeamProps, DynamicBeam, EulerBernoulliBeam, LocalMatrix, Node,
    TimoshenkoBeam,
};
pub use error::{Result, SolverError};
pub use explicit_system::{ExplicitOptions, ExplicitSystem};
pub use mesh::Mesh;
pub use stability::estimate_stable_timestep;
pub use transform::Rotation;
