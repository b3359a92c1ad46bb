//! Builds solver inputs from the tables a run configuration points at.

use std::path::Path;

use nalgebra::{DVector, Vector3};
use xbeam_solver::{
    BcKind, BeamFormulation, BeamProps, BoundaryCondition, Dof, DynamicBeam, Force, Node,
    TimeFunction, NUM_DOFS,
};

use crate::csv::{self, read_fixed_width};
use crate::error::{IoError, Result};

/// Converts a table entry that must hold a non-negative integer.
fn to_index(value: f64, path: &Path, row: usize, what: &str) -> Result<usize> {
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value < usize::MAX as f64 {
        Ok(value as usize)
    } else {
        Err(IoError::Config(format!(
            "row {row} in {}: {what} must be a non-negative integer, got {value}",
            path.display()
        )))
    }
}

/// Converts a DOF column entry to one of the six nodal DOFs.
fn to_dof(value: f64, path: &Path, row: usize) -> Result<Dof> {
    let index = to_index(value, path, row, "DOF")?;
    Dof::from_index(index).ok_or_else(|| {
        IoError::Config(format!(
            "row {row} in {}: DOF must be in 0..{NUM_DOFS}, got {index}",
            path.display()
        ))
    })
}

pub fn read_nodes(path: impl AsRef<Path>) -> Result<Vec<Node>> {
    let rows = read_fixed_width(path, 3, "coordinates [x,y,z]")?;
    Ok(rows
        .into_iter()
        .map(|r| Node::new(r[0], r[1], r[2]))
        .collect())
}

/// Pairs connectivity rows with property rows.
///
/// Property rows are `[E, G, A, Iz, Iy, J, rho, nx, ny, nz]`.
pub fn read_elements(
    elems_path: impl AsRef<Path>,
    props_path: impl AsRef<Path>,
    formulation: BeamFormulation,
) -> Result<Vec<DynamicBeam>> {
    let elems_path = elems_path.as_ref();
    let connectivity = read_fixed_width(elems_path, 2, "nodal indices [nn1,nn2]")?;
    let props = read_fixed_width(
        props_path,
        10,
        "properties [youngs_modulus,shear_modulus,area,Iz,Iy,J,density,nx,ny,nz]",
    )?;
    if connectivity.len() != props.len() {
        return Err(IoError::Config(format!(
            "elems has {} rows but props has {}",
            connectivity.len(),
            props.len()
        )));
    }

    connectivity
        .iter()
        .zip(&props)
        .enumerate()
        .map(|(row, (nn, p))| {
            let nn1 = to_index(nn[0], elems_path, row, "first node")?;
            let nn2 = to_index(nn[1], elems_path, row, "second node")?;
            let props = BeamProps::new(
                p[0],
                p[1],
                p[2],
                p[3],
                p[4],
                p[5],
                p[6],
                Vector3::new(p[7], p[8], p[9]),
            );
            Ok(DynamicBeam::new(formulation, nn1, nn2, props))
        })
        .collect()
}

/// Constant boundary conditions from rows `[node, dof, value, type]`.
pub fn read_boundary_conditions(path: impl AsRef<Path>) -> Result<Vec<BoundaryCondition>> {
    let path = path.as_ref();
    let rows = read_fixed_width(path, 4, "entries [node number,DOF,value,type]")?;
    rows.iter()
        .enumerate()
        .map(|(row, r)| {
            let node = to_index(r[0], path, row, "node number")?;
            let dof = to_dof(r[1], path, row)?;
            let code = to_index(r[3], path, row, "type")?;
            let kind = BcKind::from_code(code as i64).ok_or_else(|| {
                IoError::Config(format!(
                    "row {row} in {}: unknown boundary condition type {code} \
                     (0 = displacement, 1 = velocity)",
                    path.display()
                ))
            })?;
            Ok(BoundaryCondition::new(
                node,
                dof.index(),
                kind,
                TimeFunction::Constant(r[2]),
            ))
        })
        .collect()
}

/// Constant nodal forces from rows `[node, dof, value]`.
pub fn read_forces(path: impl AsRef<Path>) -> Result<Vec<Force>> {
    let path = path.as_ref();
    let rows = read_fixed_width(path, 3, "entries [node number,DOF,value]")?;
    rows.iter()
        .enumerate()
        .map(|(row, r)| {
            let node = to_index(r[0], path, row, "node number")?;
            let dof = to_dof(r[1], path, row)?;
            Ok(Force::new(node, dof.index(), TimeFunction::Constant(r[2])))
        })
        .collect()
}

/// Reads one value per line; the file must hold exactly `size` values.
pub fn read_nodal_vector(path: impl AsRef<Path>, size: usize) -> Result<DVector<f64>> {
    let path = path.as_ref();
    let records = csv::read_file::<f64>(path)?;
    if records.len() != size {
        return Err(IoError::Config(format!(
            "{} does not have the required {size} values; {} entries were parsed",
            path.display(),
            records.len()
        )));
    }
    let mut values = Vec::with_capacity(size);
    for (row, record) in records.into_iter().enumerate() {
        match record.values.as_slice() {
            [value] => values.push(*value),
            other => {
                return Err(IoError::Csv {
                    path: path.to_path_buf(),
                    line: record.line,
                    message: format!(
                        "row {row} has {} values; expected one nodal value per line",
                        other.len()
                    ),
                })
            }
        }
    }
    Ok(DVector::from_vec(values))
}
