//! Input and output for xbeam runs.
//!
//! This crate provides:
//! - **CSV tables** for nodes, connectivity, properties, boundary conditions
//!   and forces
//! - **JSON run configuration** with integrator and output options
//! - **Simulation manager** that builds an [`xbeam_solver::ExplicitSystem`]
//!   and steps it to the end time
//! - **State output**: numbered nodal columns and restartable JSON documents

pub mod config;
pub mod csv;
pub mod error;
pub mod manager;
pub mod setup;
pub mod writer;

pub use config::{RunConfig, RunOptions, load_document};
pub use error::{IoError, Result};
pub use manager::SimulationManager;
pub use writer::{format_significant, numbered_name, write_column, write_document};
