//! Global operator assembly.
//!
//! [`Mesh::new`] validates the model, computes element matrices in parallel,
//! rotates them into the global frame and scatters them into sparse `K`, `M`
//! and `M⁻¹` of size `6N x 6N`. Boundary conditions are enforced on `M⁻¹`
//! only: each constrained row and column becomes a unit vector.

use nalgebra_sparse::CsrMatrix;
use rayon::prelude::*;
use tracing::debug;

use crate::boundary_conditions::BoundaryCondition;
use crate::dof::{element_global_index, NUM_DOFS};
use crate::elements::{BeamElement, DynamicBeam, LocalMatrix, Node};
use crate::error::{Result, SolverError};
use crate::sparse::{filter_entries, with_unit_diagonal, TripletBuilder, PRUNE_TOLERANCE};
use crate::stability::estimate_stable_timestep;
use crate::transform::Rotation;

/// Global-frame matrices of one element.
struct ElementMatrices {
    nodes: [usize; 2],
    stiffness: LocalMatrix,
    mass: LocalMatrix,
    inverse_mass: LocalMatrix,
}

fn element_matrices<E: BeamElement>(index: usize, elem: &E, nodes: &[Node]) -> Result<ElementMatrices> {
    let rotation = Rotation::for_element(index, elem, nodes)?;

    let inverse_mass = elem.local_inverse_mass(nodes);
    let mass = inverse_mass
        .try_inverse()
        .ok_or(SolverError::SingularLocalMass { element: index })?;
    let stiffness = elem.local_stiffness(nodes);

    Ok(ElementMatrices {
        nodes: elem.node_numbers(),
        stiffness: rotation.to_global(&stiffness),
        mass: rotation.to_global(&mass),
        inverse_mass: rotation.to_global(&inverse_mass),
    })
}

fn scatter(builder: &mut TripletBuilder, nodes: [usize; 2], local: &LocalMatrix) {
    for i in 0..12 {
        let row = element_global_index(nodes, i);
        for j in 0..12 {
            let value = local[(i, j)];
            if value != 0.0 {
                builder.add(row, element_global_index(nodes, j), value);
            }
        }
    }
}

/// Nodes, elements and boundary conditions with their assembled operators.
#[derive(Debug, Clone)]
pub struct Mesh<E = DynamicBeam> {
    nodes: Vec<Node>,
    elements: Vec<E>,
    bcs: Vec<BoundaryCondition>,
    stiffness: CsrMatrix<f64>,
    mass: CsrMatrix<f64>,
    inverse_mass: CsrMatrix<f64>,
}

impl<E: BeamElement + Sync> Mesh<E> {
    /// Validates the model and assembles `K`, `M` and `M⁻¹`.
    pub fn new(nodes: Vec<Node>, elements: Vec<E>, bcs: Vec<BoundaryCondition>) -> Result<Self> {
        let num_nodes = nodes.len();
        let num_dofs = NUM_DOFS * num_nodes;

        for (index, elem) in elements.iter().enumerate() {
            for node in elem.node_numbers() {
                if node >= num_nodes {
                    return Err(SolverError::InvalidNodeIndex {
                        element: index,
                        node,
                        num_nodes,
                    });
                }
            }
            elem.props().validate(index)?;
        }
        for bc in &bcs {
            bc.target.check_range(num_dofs)?;
        }

        let locals = elements
            .par_iter()
            .enumerate()
            .map(|(index, elem)| element_matrices(index, elem, &nodes))
            .collect::<Result<Vec<_>>>()?;

        let capacity = 144 * locals.len();
        let mut k = TripletBuilder::with_capacity(num_dofs, num_dofs, capacity);
        let mut m = TripletBuilder::with_capacity(num_dofs, num_dofs, capacity);
        let mut minv = TripletBuilder::with_capacity(num_dofs, num_dofs, capacity);
        for local in &locals {
            scatter(&mut k, local.nodes, &local.stiffness);
            scatter(&mut m, local.nodes, &local.mass);
            scatter(&mut minv, local.nodes, &local.inverse_mass);
        }

        let stiffness = k.build(PRUNE_TOLERANCE)?;
        let mass = m.build(PRUNE_TOLERANCE)?;
        let inverse_mass = constrain_inverse_mass(&minv.build(PRUNE_TOLERANCE)?, &bcs);

        debug!(
            num_nodes,
            num_elements = elements.len(),
            num_dofs,
            stiffness_nnz = stiffness.nnz(),
            mass_nnz = mass.nnz(),
            constrained = bcs.len(),
            "assembled global operators"
        );

        Ok(Self {
            nodes,
            elements,
            bcs,
            stiffness,
            mass,
            inverse_mass,
        })
    }

    /// Stable explicit time step of this mesh, `None` without elements.
    pub fn stable_timestep(&self) -> Option<f64> {
        estimate_stable_timestep(&self.nodes, &self.elements)
    }
}

impl<E> Mesh<E> {
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn elements(&self) -> &[E] {
        &self.elements
    }

    pub fn boundary_conditions(&self) -> &[BoundaryCondition] {
        &self.bcs
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_dofs(&self) -> usize {
        NUM_DOFS * self.nodes.len()
    }

    pub fn stiffness_matrix(&self) -> &CsrMatrix<f64> {
        &self.stiffness
    }

    pub fn mass_matrix(&self) -> &CsrMatrix<f64> {
        &self.mass
    }

    /// Inverse mass with constrained rows/columns replaced by unit vectors.
    pub fn inverse_mass_matrix(&self) -> &CsrMatrix<f64> {
        &self.inverse_mass
    }

    /// Sorted, deduplicated global indices referenced by boundary conditions.
    pub fn constrained_dofs(&self) -> Vec<usize> {
        let mut dofs: Vec<usize> = self.bcs.iter().map(|bc| bc.global_index()).collect();
        dofs.sort_unstable();
        dofs.dedup();
        dofs
    }
}

fn constrain_inverse_mass(inverse_mass: &CsrMatrix<f64>, bcs: &[BoundaryCondition]) -> CsrMatrix<f64> {
    if bcs.is_empty() {
        return inverse_mass.clone();
    }
    let mut constrained = vec![false; inverse_mass.nrows()];
    for bc in bcs {
        constrained[bc.global_index()] = true;
    }
    let pruned = filter_entries(inverse_mass, |row, col, _| !constrained[row] && !constrained[col]);
    let indices = constrained
        .iter()
        .enumerate()
        .filter_map(|(index, &set)| set.then_some(index));
    with_unit_diagonal(&pruned, indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary_conditions::TimeFunction;
    use crate::elements::{BeamFormulation, BeamProps};
    use nalgebra::{DMatrix, Vector3};

    fn props() -> BeamProps {
        BeamProps::new(10.0, 10.0, 1.0, 1.0, 1.0, 1.0, 1.0, Vector3::new(0.0, 1.0, 0.0))
    }

    fn two_element_line(bcs: Vec<BoundaryCondition>) -> Result<Mesh> {
        let nodes = vec![
            Node::new(0.0, 0.0, 0.0),
            Node::new(1.0, 0.0, 0.0),
            Node::new(2.0, 0.0, 0.0),
        ];
        let elements = vec![
            DynamicBeam::new(BeamFormulation::EulerBernoulli, 0, 1, props()),
            DynamicBeam::new(BeamFormulation::EulerBernoulli, 1, 2, props()),
        ];
        Mesh::new(nodes, elements, bcs)
    }

    #[test]
    fn shared_node_accumulates_contributions() {
        let mesh = two_element_line(vec![]).unwrap();
        assert_eq!(mesh.num_dofs(), 18);
        let k = DMatrix::from(mesh.stiffness_matrix());
        assert_eq!(k.nrows(), 18);
        assert_eq!(k[(0, 0)], 10.0);
        assert_eq!(k[(6, 6)], 20.0);
        assert_eq!(k[(12, 12)], 10.0);
        assert_eq!(k[(0, 12)], 0.0);
    }

    #[test]
    fn constrained_rows_become_unit_vectors() {
        let bcs = vec![
            BoundaryCondition::fixed(0, 0),
            BoundaryCondition::velocity(2, 1, TimeFunction::Constant(1.0)),
        ];
        let mesh = two_element_line(bcs).unwrap();
        let minv = DMatrix::from(mesh.inverse_mass_matrix());
        for g in mesh.constrained_dofs() {
            for i in 0..mesh.num_dofs() {
                let expected = if i == g { 1.0 } else { 0.0 };
                assert_eq!(minv[(g, i)], expected);
                assert_eq!(minv[(i, g)], expected);
            }
        }
        assert!(minv[(6, 6)] > 0.0);
        assert_eq!(mesh.constrained_dofs(), vec![0, 13]);
    }

    #[test]
    fn rejects_invalid_input() {
        let nodes = vec![Node::zeros(), Node::new(1.0, 0.0, 0.0)];
        let bad_node = vec![DynamicBeam::new(BeamFormulation::Timoshenko, 0, 2, props())];
        assert!(matches!(
            Mesh::new(nodes.clone(), bad_node, vec![]),
            Err(SolverError::InvalidNodeIndex {
                element: 0,
                node: 2,
                num_nodes: 2
            })
        ));

        let ok = vec![DynamicBeam::new(BeamFormulation::Timoshenko, 0, 1, props())];
        assert!(matches!(
            Mesh::new(nodes.clone(), ok.clone(), vec![BoundaryCondition::fixed(2, 0)]),
            Err(SolverError::PrescribedIndexOutOfRange { .. })
        ));
        let huge = BoundaryCondition::displacement(1e19 as usize, 0, TimeFunction::Constant(0.0));
        assert!(matches!(
            Mesh::new(nodes.clone(), ok.clone(), vec![huge]),
            Err(SolverError::PrescribedIndexOutOfRange { num_dofs: 12, .. })
        ));

        let collapsed = vec![DynamicBeam::new(BeamFormulation::Timoshenko, 0, 0, props())];
        assert!(matches!(
            Mesh::new(nodes, collapsed, vec![]),
            Err(SolverError::DegenerateElement { element: 0, .. })
        ));
    }

    #[test]
    fn empty_mesh_has_empty_operators() {
        let mesh: Mesh = Mesh::new(vec![Node::zeros()], vec![], vec![]).unwrap();
        assert_eq!(mesh.num_dofs(), 6);
        assert_eq!(mesh.stiffness_matrix().nnz(), 0);
        assert_eq!(mesh.stable_timestep(), None);
    }
}
