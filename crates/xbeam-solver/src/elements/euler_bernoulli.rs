//! Euler-Bernoulli beam (no shear deformation).

use super::{symmetric_from_upper, BeamElement, BeamProps, LocalMatrix, Node};

/// Slender beam with cubic Hermite bending and linear axial/torsion fields.
#[derive(Debug, Clone, PartialEq)]
pub struct EulerBernoulliBeam {
    pub nodes: [usize; 2],
    pub props: BeamProps,
}

impl EulerBernoulliBeam {
    pub fn new(nn1: usize, nn2: usize, props: BeamProps) -> Self {
        Self {
            nodes: [nn1, nn2],
            props,
        }
    }
}

impl BeamElement for EulerBernoulliBeam {
    fn node_numbers(&self) -> [usize; 2] {
        self.nodes
    }

    fn props(&self) -> &BeamProps {
        &self.props
    }

    fn local_stiffness(&self, nodes: &[Node]) -> LocalMatrix {
        let p = &self.props;
        let l = self.length(nodes);
        let l2 = l * l;
        let l3 = l2 * l;

        let ea = p.youngs_modulus * p.area / l;
        let gj = p.shear_modulus * p.j / l;

        let eiz = p.youngs_modulus * p.iz;
        let k12z = 12.0 * eiz / l3;
        let k6z = 6.0 * eiz / l2;
        let k4z = 4.0 * eiz / l;
        let k2z = 2.0 * eiz / l;

        let eiy = p.youngs_modulus * p.iy;
        let k12y = 12.0 * eiy / l3;
        let k6y = 6.0 * eiy / l2;
        let k4y = 4.0 * eiy / l;
        let k2y = 2.0 * eiy / l;

        symmetric_from_upper(&[
            // axial
            (0, 0, ea),
            (0, 6, -ea),
            (6, 6, ea),
            // torsion
            (3, 3, gj),
            (3, 9, -gj),
            (9, 9, gj),
            // bending in x-y (v, theta_z)
            (1, 1, k12z),
            (1, 5, k6z),
            (1, 7, -k12z),
            (1, 11, k6z),
            (5, 5, k4z),
            (5, 7, -k6z),
            (5, 11, k2z),
            (7, 7, k12z),
            (7, 11, -k6z),
            (11, 11, k4z),
            // bending in x-z (w, theta_y)
            (2, 2, k12y),
            (2, 4, -k6y),
            (2, 8, -k12y),
            (2, 10, -k6y),
            (4, 4, k4y),
            (4, 8, k6y),
            (4, 10, k2y),
            (8, 8, k12y),
            (8, 10, k6y),
            (10, 10, k4y),
        ])
    }

    fn local_inverse_mass(&self, nodes: &[Node]) -> LocalMatrix {
        let p = &self.props;
        let l = self.length(nodes);
        let m = p.density * p.area * l;

        let m2 = 2.0 / m;
        let m4 = 4.0 / m;
        let m16 = 16.0 / m;
        let m60 = 60.0 / (m * l);
        let m120 = 120.0 / (m * l);
        let m840 = 840.0 / (m * l * l);
        let m1200 = 1200.0 / (m * l * l);

        symmetric_from_upper(&[
            (0, 0, m4),
            (0, 6, -m2),
            (6, 6, m4),
            (3, 3, m4),
            (3, 9, -m2),
            (9, 9, m4),
            // x-y plane
            (1, 1, m16),
            (1, 5, -m120),
            (1, 7, -m4),
            (1, 11, -m60),
            (5, 5, m1200),
            (5, 7, m60),
            (5, 11, m840),
            (7, 7, m16),
            (7, 11, m120),
            (11, 11, m1200),
            // x-z plane, rotation sign opposite to x-y
            (2, 2, m16),
            (2, 4, m120),
            (2, 8, -m4),
            (2, 10, m60),
            (4, 4, m1200),
            (4, 8, -m60),
            (4, 10, m840),
            (8, 8, m16),
            (8, 10, -m120),
            (10, 10, m1200),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::test_support::{max_relative_error, steel_rod, unit_props};

    fn consistent_mass(props: &BeamProps, l: f64) -> LocalMatrix {
        let m = props.density * props.area * l / 420.0;
        let mut entries = vec![
            (0, 0, 140.0),
            (0, 6, 70.0),
            (6, 6, 140.0),
            (3, 3, 140.0),
            (3, 9, 70.0),
            (9, 9, 140.0),
            (1, 1, 156.0),
            (1, 5, 22.0 * l),
            (1, 7, 54.0),
            (1, 11, -13.0 * l),
            (5, 5, 4.0 * l * l),
            (5, 7, 13.0 * l),
            (5, 11, -3.0 * l * l),
            (7, 7, 156.0),
            (7, 11, -22.0 * l),
            (11, 11, 4.0 * l * l),
            (2, 2, 156.0),
            (2, 4, -22.0 * l),
            (2, 8, 54.0),
            (2, 10, 13.0 * l),
            (4, 4, 4.0 * l * l),
            (4, 8, -13.0 * l),
            (4, 10, -3.0 * l * l),
            (8, 8, 156.0),
            (8, 10, 22.0 * l),
            (10, 10, 4.0 * l * l),
        ];
        for entry in &mut entries {
            entry.2 *= m;
        }
        symmetric_from_upper(&entries)
    }

    #[test]
    fn stiffness_entries_for_unit_beam() {
        let nodes = vec![Node::zeros(), Node::new(1.0, 0.0, 0.0)];
        let beam = EulerBernoulliBeam::new(0, 1, unit_props());
        let k = beam.local_stiffness(&nodes);

        assert_eq!(k[(0, 0)], 10.0);
        assert_eq!(k[(0, 6)], -10.0);
        assert_eq!(k[(1, 1)], 120.0);
        assert_eq!(k[(1, 5)], 60.0);
        assert_eq!(k[(2, 4)], -60.0);
        assert_eq!(k[(4, 4)], 40.0);
        assert_eq!(k[(4, 10)], 20.0);
        assert_eq!(k[(3, 9)], -10.0);
        assert_eq!(k, k.transpose());
    }

    #[test]
    fn inverse_mass_inverts_consistent_mass() {
        let nodes = vec![Node::new(1.0, 2.0, 3.0), Node::new(1.0, 2.0, 5.5)];
        let props = steel_rod();
        let beam = EulerBernoulliBeam::new(0, 1, props.clone());

        let product = beam.local_inverse_mass(&nodes) * consistent_mass(&props, 2.5);
        let err = max_relative_error(&product, &LocalMatrix::identity());
        assert!(err < 1e-10, "M^-1 * M deviates from identity by {err}");
    }

    #[test]
    fn rigid_translation_has_no_strain_energy() {
        let nodes = vec![Node::zeros(), Node::new(2.0, 0.0, 0.0)];
        let beam = EulerBernoulliBeam::new(0, 1, unit_props());
        let k = beam.local_stiffness(&nodes);

        for dof in 0..3 {
            let mut u = nalgebra::SVector::<f64, 12>::zeros();
            u[dof] = 1.0;
            u[dof + 6] = 1.0;
            assert!((k * u).amax() < 1e-12);
        }
    }
}
