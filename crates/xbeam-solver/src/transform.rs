//! Local-to-global rotation of beam element matrices.

use nalgebra::{Matrix3, Vector3};
use tracing::warn;

use crate::elements::{BeamElement, LocalMatrix, Node};
use crate::error::{Result, SolverError};

const GEOMETRY_TOLERANCE: f64 = 1e-12;

/// Direction cosines of a beam's local frame.
///
/// Row `i` of [`Rotation::block`] is local axis `i` expressed in global
/// coordinates, so `block * v_global` yields local components.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    block: Matrix3<f64>,
}

impl Rotation {
    /// Frame with x along `p2 - p1`, y along `reference` and `z = x × y`.
    pub fn from_geometry(
        element: usize,
        p1: &Vector3<f64>,
        p2: &Vector3<f64>,
        reference: &Vector3<f64>,
    ) -> Result<Self> {
        let axis = p2 - p1;
        let length = axis.norm();
        if !(length > GEOMETRY_TOLERANCE) {
            return Err(SolverError::DegenerateElement {
                element,
                reason: format!("element length {length} is zero or not finite"),
            });
        }
        let reference_norm = reference.norm();
        if !(reference_norm > GEOMETRY_TOLERANCE) {
            return Err(SolverError::DegenerateElement {
                element,
                reason: "reference direction has zero length".to_string(),
            });
        }

        let x = axis / length;
        let y = reference / reference_norm;
        let z = x.cross(&y);
        let z_norm = z.norm();
        if z_norm <= GEOMETRY_TOLERANCE {
            return Err(SolverError::DegenerateElement {
                element,
                reason: "reference direction is parallel to the element axis".to_string(),
            });
        }
        let cos = x.dot(&y);
        if cos.abs() > 1e-8 {
            warn!(
                element,
                cos, "reference direction is not perpendicular to the element axis"
            );
        }

        let z = z / z_norm;
        Ok(Self {
            block: Matrix3::from_rows(&[x.transpose(), y.transpose(), z.transpose()]),
        })
    }

    /// Rotation of `elem` at the coordinates in `nodes`.
    pub fn for_element<E: BeamElement + ?Sized>(
        element: usize,
        elem: &E,
        nodes: &[Node],
    ) -> Result<Self> {
        let [nn1, nn2] = elem.node_numbers();
        Self::from_geometry(element, &nodes[nn1], &nodes[nn2], &elem.props().normal)
    }

    pub fn block(&self) -> &Matrix3<f64> {
        &self.block
    }

    /// 12x12 operator with the 3x3 block repeated on the diagonal.
    pub fn expanded(&self) -> LocalMatrix {
        let mut r = LocalMatrix::zeros();
        for k in 0..4 {
            r.fixed_view_mut::<3, 3>(3 * k, 3 * k).copy_from(&self.block);
        }
        r
    }

    /// `Rᵗ · local · R`.
    pub fn to_global(&self, local: &LocalMatrix) -> LocalMatrix {
        let r = self.expanded();
        r.transpose() * local * r
    }
}
