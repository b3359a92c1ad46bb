//! Runtime selection of the beam theory.

use serde::{Deserialize, Serialize};

use super::{BeamElement, BeamProps, EulerBernoulliBeam, LocalMatrix, Node, TimoshenkoBeam};

/// Beam theory used for every element of a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BeamFormulation {
    EulerBernoulli,
    #[default]
    Timoshenko,
}

impl std::str::FromStr for BeamFormulation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "euler_bernoulli" | "eulerbernoulli" => Ok(Self::EulerBernoulli),
            "timoshenko" => Ok(Self::Timoshenko),
            other => Err(format!("unknown beam formulation '{other}'")),
        }
    }
}

/// Element of either formulation, dispatched without boxing.
#[derive(Debug, Clone, PartialEq)]
pub enum DynamicBeam {
    EulerBernoulli(EulerBernoulliBeam),
    Timoshenko(TimoshenkoBeam),
}

impl DynamicBeam {
    pub fn new(formulation: BeamFormulation, nn1: usize, nn2: usize, props: BeamProps) -> Self {
        match formulation {
            BeamFormulation::EulerBernoulli => {
                Self::EulerBernoulli(EulerBernoulliBeam::new(nn1, nn2, props))
            }
            BeamFormulation::Timoshenko => Self::Timoshenko(TimoshenkoBeam::new(nn1, nn2, props)),
        }
    }

    pub fn formulation(&self) -> BeamFormulation {
        match self {
            Self::EulerBernoulli(_) => BeamFormulation::EulerBernoulli,
            Self::Timoshenko(_) => BeamFormulation::Timoshenko,
        }
    }
}

impl BeamElement for DynamicBeam {
    fn node_numbers(&self) -> [usize; 2] {
        match self {
            Self::EulerBernoulli(e) => e.node_numbers(),
            Self::Timoshenko(e) => e.node_numbers(),
        }
    }

    fn props(&self) -> &BeamProps {
        match self {
            Self::EulerBernoulli(e) => e.props(),
            Self::Timoshenko(e) => e.props(),
        }
    }

    fn local_stiffness(&self, nodes: &[Node]) -> LocalMatrix {
        match self {
            Self::EulerBernoulli(e) => e.local_stiffness(nodes),
            Self::Timoshenko(e) => e.local_stiffness(nodes),
        }
    }

    fn local_inverse_mass(&self, nodes: &[Node]) -> LocalMatrix {
        match self {
            Self::EulerBernoulli(e) => e.local_inverse_mass(nodes),
            Self::Timoshenko(e) => e.local_inverse_mass(nodes),
        }
    }
}
