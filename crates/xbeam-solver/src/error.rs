//! Error types for xbeam-solver

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SolverError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("Dimension mismatch for {what}: expected {expected}, found {found}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Sparse matrix construction failed: {0}")]
    SparseFormat(String),

    #[error("Element {element} references node {node}, but the mesh has {num_nodes} nodes")]
    InvalidNodeIndex {
        element: usize,
        node: usize,
        num_nodes: usize,
    },

    #[error("Element {element} is degenerate: {reason}")]
    DegenerateElement { element: usize, reason: String },

    #[error("Local inverse mass matrix of element {element} is singular")]
    SingularLocalMass { element: usize },

    #[error("Prescribed value on node {node}, DOF {dof} is outside the {num_dofs} global DOFs")]
    PrescribedIndexOutOfRange {
        node: usize,
        dof: usize,
        num_dofs: usize,
    },

    #[error("Time step must be positive and finite, got {0}")]
    InvalidTimeStep(f64),

    #[error("Invalid integrator options: {0}")]
    InvalidOptions(String),

    #[error("Factorization of the effective system failed: {0}")]
    Factorization(String),
}
