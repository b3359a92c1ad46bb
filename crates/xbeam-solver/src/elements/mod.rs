//! Two-node 3D beam elements.
//!
//! An element provides its 12x12 stiffness and inverse-mass matrices in
//! beam-local axes (x along the member, y along the section reference
//! direction). Rotation into the global frame is done by the assembler.

use nalgebra::{SMatrix, Vector3};

use crate::error::{Result, SolverError};

pub mod euler_bernoulli;
pub mod factory;
pub mod timoshenko;

pub use euler_bernoulli::EulerBernoulliBeam;
pub use factory::{BeamFormulation, DynamicBeam};
pub use timoshenko::TimoshenkoBeam;

/// Nodal coordinate.
pub type Node = Vector3<f64>;

/// Element matrix over the 12 DOFs of a two-node beam.
pub type LocalMatrix = SMatrix<f64, 12, 12>;

/// Material and section properties of a beam.
#[derive(Debug, Clone, PartialEq)]
pub struct BeamProps {
    pub youngs_modulus: f64,
    pub shear_modulus: f64,
    pub area: f64,
    /// Second moment of area for bending in the local x-y plane
    pub iz: f64,
    /// Second moment of area for bending in the local x-z plane
    pub iy: f64,
    /// Torsion constant
    pub j: f64,
    pub density: f64,
    /// Reference direction fixing the local y-axis
    pub normal: Vector3<f64>,
}

impl BeamProps {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        youngs_modulus: f64,
        shear_modulus: f64,
        area: f64,
        iz: f64,
        iy: f64,
        j: f64,
        density: f64,
        normal: Vector3<f64>,
    ) -> Self {
        Self {
            youngs_modulus,
            shear_modulus,
            area,
            iz,
            iy,
            j,
            density,
            normal,
        }
    }

    /// 1-D axial wave speed `sqrt(E / rho)`.
    pub fn wave_speed(&self) -> f64 {
        (self.youngs_modulus / self.density).sqrt()
    }

    /// Checks that the properties yield finite element matrices.
    pub fn validate(&self, element: usize) -> Result<()> {
        let positive = [
            ("Young's modulus", self.youngs_modulus),
            ("shear modulus", self.shear_modulus),
            ("area", self.area),
            ("density", self.density),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(SolverError::DegenerateElement {
                    element,
                    reason: format!("{name} must be positive, got {value}"),
                });
            }
        }
        for (name, value) in [("Iz", self.iz), ("Iy", self.iy), ("J", self.j)] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(SolverError::DegenerateElement {
                    element,
                    reason: format!("{name} must be non-negative, got {value}"),
                });
            }
        }
        Ok(())
    }
}

/// Capability set of a beam formulation.
pub trait BeamElement {
    /// Global node indices `[nn1, nn2]`.
    fn node_numbers(&self) -> [usize; 2];

    fn props(&self) -> &BeamProps;

    /// Stiffness matrix in beam-local axes.
    fn local_stiffness(&self, nodes: &[Node]) -> LocalMatrix;

    /// Inverse of the consistent mass matrix in beam-local axes.
    fn local_inverse_mass(&self, nodes: &[Node]) -> LocalMatrix;

    fn length(&self, nodes: &[Node]) -> f64 {
        let [nn1, nn2] = self.node_numbers();
        (nodes[nn2] - nodes[nn1]).norm()
    }
}

/// Builds a symmetric local matrix from its upper-triangle entries.
pub(crate) fn symmetric_from_upper(entries: &[(usize, usize, f64)]) -> LocalMatrix {
    let mut m = LocalMatrix::zeros();
    for &(i, j, value) in entries {
        m[(i, j)] = value;
        m[(j, i)] = value;
    }
    m
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn unit_props() -> BeamProps {
        BeamProps::new(10.0, 10.0, 1.0, 1.0, 1.0, 1.0, 1.0, Vector3::new(0.0, 1.0, 0.0))
    }

    pub fn steel_rod() -> BeamProps {
        let iy = 0.0000785398;
        BeamProps::new(
            200e9,
            80e9,
            0.0314159265358979,
            iy,
            iy,
            2.0 * iy,
            7800.0,
            Vector3::new(0.0, 1.0, 0.0),
        )
    }

    pub fn max_relative_error(a: &LocalMatrix, b: &LocalMatrix) -> f64 {
        let scale = a.amax().max(b.amax());
        (a - b).amax() / scale
    }
}
