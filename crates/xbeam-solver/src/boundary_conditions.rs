//! Prescribed nodal values: boundary conditions and external forces.
//!
//! Both share the shape `{node, dof, f(t)}` and address the global vectors
//! through [`global_index`](crate::dof::global_index).

use serde::{Deserialize, Serialize};

use crate::dof::{global_index, Dof, NUM_DOFS};
use crate::error::{Result, SolverError};

/// Scalar function of time.
///
/// Serialized externally tagged, e.g. `{"constant": 0.001}` or
/// `{"table": [[0.0, 0.0], [1.0, 2.0]]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeFunction {
    Constant(f64),
    /// `initial + rate * t`
    Ramp { initial: f64, rate: f64 },
    /// `offset + amplitude * sin(angular_frequency * t + phase)`
    Sine {
        amplitude: f64,
        angular_frequency: f64,
        #[serde(default)]
        phase: f64,
        #[serde(default)]
        offset: f64,
    },
    /// Piecewise-linear through `[t, value]` points sorted by `t`, held
    /// constant outside the first and last points.
    Table(Vec<[f64; 2]>),
}

impl TimeFunction {
    pub fn value_at(&self, t: f64) -> f64 {
        match self {
            Self::Constant(v) => *v,
            Self::Ramp { initial, rate } => initial + rate * t,
            Self::Sine {
                amplitude,
                angular_frequency,
                phase,
                offset,
            } => offset + amplitude * (angular_frequency * t + phase).sin(),
            Self::Table(points) => interpolate(points, t),
        }
    }
}

impl Default for TimeFunction {
    fn default() -> Self {
        Self::Constant(0.0)
    }
}

fn interpolate(points: &[[f64; 2]], t: f64) -> f64 {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return 0.0;
    };
    if t <= first[0] {
        return first[1];
    }
    if t >= last[0] {
        return last[1];
    }
    // first index with time > t; 1 <= upper < len here
    let upper = points.partition_point(|p| p[0] <= t);
    let [t0, v0] = points[upper - 1];
    let [t1, v1] = points[upper];
    if t1 == t0 {
        return v1;
    }
    v0 + (v1 - v0) * (t - t0) / (t1 - t0)
}

/// A time-dependent value attached to one nodal DOF.
#[derive(Debug, Clone, PartialEq)]
pub struct PrescribedValue {
    pub node: usize,
    pub dof: usize,
    pub function: TimeFunction,
}

impl PrescribedValue {
    pub fn new(node: usize, dof: usize, function: TimeFunction) -> Self {
        Self { node, dof, function }
    }

    pub fn global_index(&self) -> usize {
        global_index(self.node, self.dof)
    }

    pub fn value_at(&self, t: f64) -> f64 {
        self.function.value_at(t)
    }

    /// Checks that the target lies inside a system of `num_dofs` DOFs.
    pub fn check_range(&self, num_dofs: usize) -> Result<()> {
        let global = self
            .node
            .checked_mul(NUM_DOFS)
            .and_then(|base| base.checked_add(self.dof));
        match global {
            Some(global) if self.dof < NUM_DOFS && global < num_dofs => Ok(()),
            _ => Err(SolverError::PrescribedIndexOutOfRange {
                node: self.node,
                dof: self.dof,
                num_dofs,
            }),
        }
    }
}

/// What a boundary condition holds fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BcKind {
    Displacement,
    Velocity,
}

impl BcKind {
    /// Numeric code used in tabular input: 0 displacement, 1 velocity.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Displacement),
            1 => Some(Self::Velocity),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryCondition {
    pub target: PrescribedValue,
    pub kind: BcKind,
}

impl BoundaryCondition {
    pub fn new(node: usize, dof: usize, kind: BcKind, function: TimeFunction) -> Self {
        Self {
            target: PrescribedValue::new(node, dof, function),
            kind,
        }
    }

    pub fn displacement(node: usize, dof: usize, function: TimeFunction) -> Self {
        Self::new(node, dof, BcKind::Displacement, function)
    }

    pub fn velocity(node: usize, dof: usize, function: TimeFunction) -> Self {
        Self::new(node, dof, BcKind::Velocity, function)
    }

    /// Zero displacement.
    pub fn fixed(node: usize, dof: usize) -> Self {
        Self::displacement(node, dof, TimeFunction::Constant(0.0))
    }

    /// Zero displacement on all six DOFs of `node`.
    pub fn clamp_node(node: usize) -> Vec<Self> {
        Dof::ALL
            .iter()
            .map(|dof| Self::fixed(node, dof.index()))
            .collect()
    }

    pub fn global_index(&self) -> usize {
        self.target.global_index()
    }

    pub fn value_at(&self, t: f64) -> f64 {
        self.target.value_at(t)
    }
}

/// External load added to the nodal force vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Force {
    pub target: PrescribedValue,
}

impl Force {
    pub fn new(node: usize, dof: usize, function: TimeFunction) -> Self {
        Self {
            target: PrescribedValue::new(node, dof, function),
        }
    }

    pub fn global_index(&self) -> usize {
        self.target.global_index()
    }

    pub fn value_at(&self, t: f64) -> f64 {
        self.target.value_at(t)
    }
}
