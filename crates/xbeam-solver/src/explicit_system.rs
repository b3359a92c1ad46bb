//! Newmark time stepping of the assembled beam model.
//!
//! Solves `M*ü + C*u̇ + K*u = F(t)` one step at a time for the accelerations:
//!
//! ```text
//! (M + γ·Δt·C + β·Δt²·K) a₁ = F(t₁) − C·(v₀ + (1−γ)·Δt·a₀)
//!                                    − K·(u₀ + Δt·v₀ + (½−β)·Δt²·a₀)
//! v₁ += (1−γ)·Δt·a₀ + γ·Δt·a₁
//! u₀ += Δt·v₀ + (½−β)·Δt²·a₀ + β·Δt²·a₁
//! ```
//!
//! `C = α·M + β_d·K` is Rayleigh damping. The effective matrix is factored
//! once and reused until the step size changes.

use nalgebra::DVector;
use nalgebra_sparse::factorization::CscCholesky;
use nalgebra_sparse::{CscMatrix, CsrMatrix};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::boundary_conditions::{BcKind, Force};
use crate::compare::ValueCompare;
use crate::elements::DynamicBeam;
use crate::error::{Result, SolverError};
use crate::mesh::Mesh;
use crate::sparse::{linear_combination, PRUNE_TOLERANCE};

/// Newmark parameters and Rayleigh damping coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplicitOptions {
    pub beta: f64,
    pub gamma: f64,
    /// Mass-proportional damping coefficient
    pub damping_alpha: f64,
    /// Stiffness-proportional damping coefficient
    pub damping_beta: f64,
}

impl Default for ExplicitOptions {
    fn default() -> Self {
        Self {
            beta: 0.25,
            gamma: 0.5,
            damping_alpha: 0.01,
            damping_beta: 0.01,
        }
    }
}

impl ExplicitOptions {
    /// γ = 1/2, β = 1/4
    pub fn average_acceleration() -> Self {
        Self::default()
    }

    /// γ = 1/2, β = 1/6
    pub fn linear_acceleration() -> Self {
        Self {
            beta: 1.0 / 6.0,
            ..Self::default()
        }
    }

    /// γ = 1/2, β = 1/12
    pub fn fox_goodwin() -> Self {
        Self {
            beta: 1.0 / 12.0,
            ..Self::default()
        }
    }

    /// γ = 1/2, β = 0
    pub fn central_difference() -> Self {
        Self {
            beta: 0.0,
            ..Self::default()
        }
    }

    pub fn with_rayleigh_damping(mut self, alpha: f64, beta: f64) -> Self {
        self.damping_alpha = alpha;
        self.damping_beta = beta;
        self
    }

    /// Rayleigh coefficients giving damping ratio `zeta1` at `freq1` and
    /// `zeta2` at `freq2` (Hz).
    pub fn from_modal_damping(mut self, freq1: f64, freq2: f64, zeta1: f64, zeta2: f64) -> Self {
        let omega1 = 2.0 * std::f64::consts::PI * freq1;
        let omega2 = 2.0 * std::f64::consts::PI * freq2;
        let denom = omega2 * omega2 - omega1 * omega1;

        self.damping_alpha = 2.0 * omega1 * omega2 * (zeta1 * omega2 - zeta2 * omega1) / denom;
        self.damping_beta = 2.0 * (zeta2 * omega2 - zeta1 * omega1) / denom;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("beta", self.beta),
            ("gamma", self.gamma),
            ("damping_alpha", self.damping_alpha),
            ("damping_beta", self.damping_beta),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(SolverError::InvalidOptions(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Beam model advancing in time.
pub struct ExplicitSystem<E = DynamicBeam> {
    mesh: Mesh<E>,
    external_forces: Vec<Force>,
    options: ExplicitOptions,
    damping: CsrMatrix<f64>,
    factor: Option<CscCholesky<f64>>,
    compare: ValueCompare<f64>,

    displacements: DVector<f64>,
    velocities: DVector<f64>,
    next_velocities: DVector<f64>,
    accelerations: DVector<f64>,
    next_accelerations: DVector<f64>,
    applied_forces: DVector<f64>,
    rhs: DVector<f64>,

    time: f64,
    last_dt: f64,
    factorizations: usize,
}

impl<E> ExplicitSystem<E> {
    /// Takes ownership of `mesh` and `external_forces`, builds the damping
    /// operator and applies the boundary conditions at `t0`.
    pub fn new(
        mesh: Mesh<E>,
        external_forces: Vec<Force>,
        initial_displacements: DVector<f64>,
        initial_velocities: DVector<f64>,
        t0: f64,
        options: ExplicitOptions,
    ) -> Result<Self> {
        options.validate()?;
        if options.gamma < 0.5 {
            warn!(gamma = options.gamma, "gamma below 0.5 introduces negative numerical damping");
        }

        let n = mesh.num_dofs();
        if initial_displacements.len() != initial_velocities.len() {
            return Err(SolverError::DimensionMismatch {
                what: "initial velocities",
                expected: initial_displacements.len(),
                found: initial_velocities.len(),
            });
        }
        if initial_displacements.len() != n {
            return Err(SolverError::DimensionMismatch {
                what: "initial displacements",
                expected: n,
                found: initial_displacements.len(),
            });
        }
        for force in &external_forces {
            force.target.check_range(n)?;
        }

        let damping = linear_combination(
            &[
                (options.damping_alpha, mesh.mass_matrix()),
                (options.damping_beta, mesh.stiffness_matrix()),
            ],
            PRUNE_TOLERANCE,
        )?;

        let mut system = Self {
            mesh,
            external_forces,
            options,
            damping,
            factor: None,
            compare: ValueCompare::default(),
            displacements: initial_displacements,
            velocities: initial_velocities,
            next_velocities: DVector::zeros(n),
            accelerations: DVector::zeros(n),
            next_accelerations: DVector::zeros(n),
            applied_forces: DVector::zeros(n),
            rhs: DVector::zeros(n),
            time: t0,
            last_dt: 0.0,
            factorizations: 0,
        };
        system.apply_bcs(t0);
        system.next_velocities.copy_from(&system.velocities);
        Ok(system)
    }

    /// Advances the state from `t` to `t + dt`.
    pub fn advance(&mut self, dt: f64) -> Result<()> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(SolverError::InvalidTimeStep(dt));
        }
        let t1 = self.time + dt;
        if self.factor.is_none() || !self.compare.equal(dt, self.last_dt) {
            self.factorize(dt)?;
        }

        let beta = self.options.beta;
        let gamma = self.options.gamma;

        self.apply_external_forces(t1);
        let damped = &self.velocities + &self.accelerations * ((1.0 - gamma) * dt);
        let predicted = &self.displacements
            + &self.velocities * dt
            + &self.accelerations * ((0.5 - beta) * dt * dt);
        self.rhs = &self.applied_forces
            - &self.damping * &damped
            - self.mesh.stiffness_matrix() * &predicted;
        self.apply_bcs(t1);

        let factor = self
            .factor
            .as_ref()
            .ok_or_else(|| SolverError::Factorization("effective system not factored".to_string()))?;
        let solution = factor.solve(&self.rhs).column(0).into_owned();
        if solution.iter().any(|v| !v.is_finite()) {
            return Err(SolverError::Factorization(format!(
                "non-finite accelerations at t = {t1}"
            )));
        }
        self.next_accelerations = solution;

        self.next_velocities +=
            &self.accelerations * ((1.0 - gamma) * dt) + &self.next_accelerations * (gamma * dt);
        self.displacements += &self.velocities * dt
            + &self.accelerations * (dt * dt * (0.5 - beta))
            + &self.next_accelerations * (dt * dt * beta);

        self.velocities.copy_from(&self.next_velocities);
        self.accelerations.copy_from(&self.next_accelerations);
        self.time = t1;
        self.last_dt = dt;
        Ok(())
    }

    /// `M + γ·dt·C + β·dt²·K`
    fn assemble_lhs(&self, dt: f64) -> Result<CsrMatrix<f64>> {
        linear_combination(
            &[
                (1.0, self.mesh.mass_matrix()),
                (self.options.gamma * dt, &self.damping),
                (self.options.beta * dt * dt, self.mesh.stiffness_matrix()),
            ],
            PRUNE_TOLERANCE,
        )
    }

    fn factorize(&mut self, dt: f64) -> Result<()> {
        let lhs = self.assemble_lhs(dt)?;
        let csc = CscMatrix::from(&lhs);
        let factor = CscCholesky::factor(&csc)
            .map_err(|e| SolverError::Factorization(format!("{e:?} (dt = {dt})")))?;
        self.factor = Some(factor);
        self.factorizations += 1;
        debug!(dt, nnz = lhs.nnz(), count = self.factorizations, "factored effective system");
        Ok(())
    }

    fn apply_bcs(&mut self, time: f64) {
        for bc in self.mesh.boundary_conditions() {
            let g = bc.global_index();
            self.rhs[g] = 0.0;
            match bc.kind {
                BcKind::Displacement => {
                    self.displacements[g] = bc.value_at(time);
                    self.velocities[g] = 0.0;
                }
                BcKind::Velocity => {
                    self.velocities[g] = bc.value_at(time);
                }
            }
        }
    }

    fn apply_external_forces(&mut self, time: f64) {
        self.applied_forces.fill(0.0);
        for force in &self.external_forces {
            self.applied_forces[force.global_index()] += force.value_at(time);
        }
    }

    pub fn displacements(&self) -> &DVector<f64> {
        &self.displacements
    }

    pub fn velocities(&self) -> &DVector<f64> {
        &self.velocities
    }

    pub fn accelerations(&self) -> &DVector<f64> {
        &self.accelerations
    }

    /// External loads evaluated at the end of the last step.
    pub fn applied_forces(&self) -> &DVector<f64> {
        &self.applied_forces
    }

    /// Nodal forces `K·u + M·a`, including reactions at constrained DOFs.
    pub fn forces(&self) -> DVector<f64> {
        self.mesh.stiffness_matrix() * &self.displacements
            + self.mesh.mass_matrix() * &self.accelerations
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    /// Step size of the last [`advance`](Self::advance), `0.0` before the first.
    pub fn last_time_step(&self) -> f64 {
        self.last_dt
    }

    /// Number of factorizations of the effective system so far.
    pub fn factorization_count(&self) -> usize {
        self.factorizations
    }

    pub fn mesh(&self) -> &Mesh<E> {
        &self.mesh
    }

    pub fn external_forces(&self) -> &[Force] {
        &self.external_forces
    }

    pub fn options(&self) -> &ExplicitOptions {
        &self.options
    }

    pub fn damping_matrix(&self) -> &CsrMatrix<f64> {
        &self.damping
    }

    pub fn num_dofs(&self) -> usize {
        self.displacements.len()
    }
}
