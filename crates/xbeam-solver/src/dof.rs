//! Degree-of-freedom numbering.
//!
//! Every node carries six DOFs (three translations, three rotations). All
//! global vectors and matrices share the layout `6 * node + dof`.

use serde::{Deserialize, Serialize};

/// Number of DOFs per node.
pub const NUM_DOFS: usize = 6;

/// Local DOF at a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Dof {
    DisplacementX = 0,
    DisplacementY = 1,
    DisplacementZ = 2,
    RotationX = 3,
    RotationY = 4,
    RotationZ = 5,
}

impl Dof {
    pub const ALL: [Dof; NUM_DOFS] = [
        Dof::DisplacementX,
        Dof::DisplacementY,
        Dof::DisplacementZ,
        Dof::RotationX,
        Dof::RotationY,
        Dof::RotationZ,
    ];

    /// Local index in `0..6`.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// Global index of `dof` at `node`.
#[inline]
pub fn global_index(node: usize, dof: usize) -> usize {
    NUM_DOFS * node + dof
}

/// Inverse of [`global_index`]: `(node, dof)`.
#[inline]
pub fn node_and_dof(global: usize) -> (usize, usize) {
    (global / NUM_DOFS, global % NUM_DOFS)
}

/// Global index of local element index `local` (0..12) for an element
/// connecting `nodes[0]` and `nodes[1]`.
#[inline]
pub fn element_global_index(nodes: [usize; 2], local: usize) -> usize {
    if local < NUM_DOFS {
        global_index(nodes[0], local)
    } else {
        global_index(nodes[1], local - NUM_DOFS)
    }
}
