//! Stable time step estimate for explicit integration.

use crate::elements::{BeamElement, Node};

/// Divisor applied to the smallest element transit time.
pub const SAFETY_FACTOR: f64 = 10.0;

/// Smallest `L / sqrt(E / rho)` over all elements, divided by
/// [`SAFETY_FACTOR`]. Returns `None` when there are no elements.
///
/// Node indices of `elements` must be valid for `nodes`.
pub fn estimate_stable_timestep<E: BeamElement>(nodes: &[Node], elements: &[E]) -> Option<f64> {
    elements
        .iter()
        .map(|elem| elem.length(nodes) / elem.props().wave_speed())
        .min_by(|a, b| a.total_cmp(b))
        .map(|dt| dt / SAFETY_FACTOR)
}
