//! Shear-deformable (Timoshenko) beam.
//!
//! Bending terms are corrected by `phi = 12 EI / (G A L^2)` for each plane.
//! As `phi -> 0` both matrices reduce to the Euler-Bernoulli ones.

use super::{symmetric_from_upper, BeamElement, BeamProps, LocalMatrix, Node};

#[derive(Debug, Clone, PartialEq)]
pub struct TimoshenkoBeam {
    pub nodes: [usize; 2],
    pub props: BeamProps,
}

/// Bending coefficients of one plane.
struct PlaneStiffness {
    k12: f64,
    k6: f64,
    k4: f64,
    k2: f64,
}

impl PlaneStiffness {
    fn new(ei: f64, phi: f64, l: f64) -> Self {
        let denom = 1.0 + phi;
        Self {
            k12: 12.0 * ei / (l * l * l * denom),
            k6: 6.0 * ei / (l * l * denom),
            k4: ei * (4.0 + phi) / (l * denom),
            k2: ei * (2.0 - phi) / (l * denom),
        }
    }
}

/// Inverse consistent mass coefficients of one bending plane, laid out for
/// `(v1, θ1, v2, θ2)` with the x-y sign convention.
struct PlaneInverseMass {
    tt: f64,
    tt_far: f64,
    tr: f64,
    tr_far: f64,
    rr: f64,
    rr_far: f64,
}

impl PlaneInverseMass {
    /// Inverts the shear-deformable consistent mass (translational inertia)
    /// through its node-symmetric and node-antisymmetric 2x2 blocks.
    fn new(mass: f64, phi: f64, l: f64) -> Self {
        let s = mass / ((1.0 + phi) * (1.0 + phi));
        let phi2 = phi * phi;
        let m11 = s * (13.0 / 35.0 + 7.0 * phi / 10.0 + phi2 / 3.0);
        let m12 = s * l * (11.0 / 210.0 + 11.0 * phi / 120.0 + phi2 / 24.0);
        let m13 = s * (9.0 / 70.0 + 3.0 * phi / 10.0 + phi2 / 6.0);
        let m23 = s * l * (13.0 / 420.0 + 3.0 * phi / 40.0 + phi2 / 24.0);
        let m22 = s * l * l * (1.0 / 105.0 + phi / 60.0 + phi2 / 120.0);
        let m24 = -s * l * l * (1.0 / 140.0 + phi / 60.0 + phi2 / 120.0);

        let (s11, s12, s22) = invert_2x2(m11 + m13, m12 + m23, m22 - m24);
        let (a11, a12, a22) = invert_2x2(m11 - m13, m12 - m23, m22 + m24);

        Self {
            tt: 0.5 * (s11 + a11),
            tt_far: 0.5 * (a11 - s11),
            tr: 0.5 * (s12 + a12),
            tr_far: 0.5 * (s12 - a12),
            rr: 0.5 * (s22 + a22),
            rr_far: 0.5 * (a22 - s22),
        }
    }
}

/// Inverse of the symmetric matrix `[[p, q], [q, r]]` as `(p', q', r')`.
fn invert_2x2(p: f64, q: f64, r: f64) -> (f64, f64, f64) {
    let det = p * r - q * q;
    (r / det, -q / det, p / det)
}

impl TimoshenkoBeam {
    pub fn new(nn1: usize, nn2: usize, props: BeamProps) -> Self {
        Self {
            nodes: [nn1, nn2],
            props,
        }
    }

    /// Shear parameters `(phi_y, phi_z)` for a member of length `l`.
    pub fn shear_parameters(&self, l: f64) -> (f64, f64) {
        let p = &self.props;
        let ga_l2 = p.shear_modulus * p.area * l * l;
        (
            12.0 * p.youngs_modulus * p.iy / ga_l2,
            12.0 * p.youngs_modulus * p.iz / ga_l2,
        )
    }
}

impl BeamElement for TimoshenkoBeam {
    fn node_numbers(&self) -> [usize; 2] {
        self.nodes
    }

    fn props(&self) -> &BeamProps {
        &self.props
    }

    fn local_stiffness(&self, nodes: &[Node]) -> LocalMatrix {
        let p = &self.props;
        let l = self.length(nodes);
        let (phi_y, phi_z) = self.shear_parameters(l);

        let ea = p.youngs_modulus * p.area / l;
        let gj = p.shear_modulus * p.j / l;
        let z = PlaneStiffness::new(p.youngs_modulus * p.iz, phi_z, l);
        let y = PlaneStiffness::new(p.youngs_modulus * p.iy, phi_y, l);

        symmetric_from_upper(&[
            (0, 0, ea),
            (0, 6, -ea),
            (6, 6, ea),
            (3, 3, gj),
            (3, 9, -gj),
            (9, 9, gj),
            (1, 1, z.k12),
            (1, 5, z.k6),
            (1, 7, -z.k12),
            (1, 11, z.k6),
            (5, 5, z.k4),
            (5, 7, -z.k6),
            (5, 11, z.k2),
            (7, 7, z.k12),
            (7, 11, -z.k6),
            (11, 11, z.k4),
            (2, 2, y.k12),
            (2, 4, -y.k6),
            (2, 8, -y.k12),
            (2, 10, -y.k6),
            (4, 4, y.k4),
            (4, 8, y.k6),
            (4, 10, y.k2),
            (8, 8, y.k12),
            (8, 10, y.k6),
            (10, 10, y.k4),
        ])
    }

    fn local_inverse_mass(&self, nodes: &[Node]) -> LocalMatrix {
        let p = &self.props;
        let l = self.length(nodes);
        let mass = p.density * p.area * l;
        let (phi_y, phi_z) = self.shear_parameters(l);

        let m2 = 2.0 / mass;
        let m4 = 4.0 / mass;
        let z = PlaneInverseMass::new(mass, phi_z, l);
        let y = PlaneInverseMass::new(mass, phi_y, l);

        symmetric_from_upper(&[
            (0, 0, m4),
            (0, 6, -m2),
            (6, 6, m4),
            (3, 3, m4),
            (3, 9, -m2),
            (9, 9, m4),
            (1, 1, z.tt),
            (1, 5, z.tr),
            (1, 7, -z.tt_far),
            (1, 11, -z.tr_far),
            (5, 5, z.rr),
            (5, 7, z.tr_far),
            (5, 11, z.rr_far),
            (7, 7, z.tt),
            (7, 11, -z.tr),
            (11, 11, z.rr),
            (2, 2, y.tt),
            (2, 4, -y.tr),
            (2, 8, -y.tt_far),
            (2, 10, y.tr_far),
            (4, 4, y.rr),
            (4, 8, -y.tr_far),
            (4, 10, y.rr_far),
            (8, 8, y.tt),
            (8, 10, y.tr),
            (10, 10, y.rr),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::test_support::{max_relative_error, steel_rod, unit_props};
    use crate::elements::EulerBernoulliBeam;

    #[test]
    fn reduces_to_euler_bernoulli_for_stiff_shear() {
        let nodes = vec![Node::zeros(), Node::new(0.0, 0.0, 3.0)];
        let mut props = unit_props();
        props.shear_modulus = 1e12;
        props.j = 1e-11;

        let timo = TimoshenkoBeam::new(0, 1, props.clone());
        let eb = EulerBernoulliBeam::new(0, 1, props);

        let ks = max_relative_error(&timo.local_stiffness(&nodes), &eb.local_stiffness(&nodes));
        assert!(ks < 1e-9, "stiffness mismatch {ks}");
        let ms = max_relative_error(
            &timo.local_inverse_mass(&nodes),
            &eb.local_inverse_mass(&nodes),
        );
        assert!(ms < 1e-9, "inverse mass mismatch {ms}");
    }

    #[test]
    fn shear_softens_bending() {
        let nodes = vec![Node::zeros(), Node::new(1.0, 0.0, 0.0)];
        let props = unit_props();
        let timo = TimoshenkoBeam::new(0, 1, props.clone()).local_stiffness(&nodes);
        let eb = EulerBernoulliBeam::new(0, 1, props).local_stiffness(&nodes);

        // phi = 12, so 12EI/L^3 is divided by 13
        assert!((timo[(1, 1)] - 120.0 / 13.0).abs() < 1e-12);
        assert!(timo[(1, 1)] < eb[(1, 1)]);
        assert_eq!(timo[(0, 0)], eb[(0, 0)]);
    }

    #[test]
    fn matrices_are_symmetric_positive_diagonal() {
        let nodes = vec![Node::zeros(), Node::new(1.0, 0.0, 0.0)];
        let beam = TimoshenkoBeam::new(0, 1, steel_rod());
        let k = beam.local_stiffness(&nodes);
        let minv = beam.local_inverse_mass(&nodes);

        assert_eq!(k, k.transpose());
        assert_eq!(minv, minv.transpose());
        for i in 0..12 {
            assert!(minv[(i, i)] > 0.0);
        }
        assert!(minv.try_inverse().is_some());
    }

    #[test]
    fn rigid_translation_carries_element_mass() {
        // phi = 12 in both planes
        let nodes = vec![Node::zeros(), Node::new(1.0, 0.0, 0.0)];
        let beam = TimoshenkoBeam::new(0, 1, unit_props());
        let mass = beam.local_inverse_mass(&nodes).try_inverse().unwrap();

        for dof in 0..3 {
            let mut u = nalgebra::SVector::<f64, 12>::zeros();
            u[dof] = 1.0;
            u[dof + 6] = 1.0;
            let m = u.dot(&(mass * u));
            assert!((m - 1.0).abs() < 1e-10, "dof {dof}: translational mass {m}");
        }
    }
}
