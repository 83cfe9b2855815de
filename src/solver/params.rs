use crate::error::{FluidError, Result};

/// Physical cell spacing used by diffusion, advection and projection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Spacing {
    /// `dx = 1/W`, `dy = 1/H`: the whole grid spans the unit square.
    Normalized,
    Explicit { dx: f64, dy: f64 },
}

impl Spacing {
    pub fn resolve(self, width: usize, height: usize) -> (f64, f64) {
        match self {
            Spacing::Normalized => (1.0 / width as f64, 1.0 / height as f64),
            Spacing::Explicit { dx, dy } => (dx, dy),
        }
    }

    /// Explicit spacing; both sides must be positive and finite.
    pub fn explicit(dx: f64, dy: f64) -> Result<Self> {
        Spacing::Explicit { dx, dy }.validate()
    }

    pub fn validate(self) -> Result<Self> {
        match self {
            Spacing::Explicit { dx, dy } if !(usable(dx) && usable(dy)) => Err(FluidError::InvalidSpacing { dx, dy }),
            _ => Ok(self),
        }
    }
}

fn usable(h: f64) -> bool {
    h > 0.0 && h.is_finite()
}

/// Solver parameters for the fluid simulation.
#[derive(Clone, Debug, PartialEq)]
pub struct SolverParams {
    pub diffuse_iter: usize,
    /// Upper bound on pressure sweeps.
    pub project_iter: usize,
    /// Stop pressure relaxation once no cell moves more than this. `None`
    /// always runs `project_iter` sweeps.
    pub project_tolerance: Option<f64>,
    /// Fraction of the stability limit used when the requested dt is too large.
    pub dt_clamp_factor: f64,
    /// Downward (+y) acceleration added to vy each step.
    pub gravity: f64,
    pub spacing: Spacing,
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            diffuse_iter: 20,
            project_iter: 100,
            project_tolerance: Some(1e-6),
            dt_clamp_factor: 0.9,
            gravity: 0.0,
            spacing: Spacing::Normalized,
        }
    }
}

impl SolverParams {
    /// Fixed sweep counts everywhere, no early exit, clamp straight to the limit.
    pub fn fixed_sweeps(iterations: usize) -> Self {
        Self {
            diffuse_iter: iterations,
            project_iter: iterations,
            project_tolerance: None,
            dt_clamp_factor: 1.0,
            ..Self::default()
        }
    }

    /// Reject settings the kernels cannot divide by.
    pub fn validate(&self) -> Result<()> {
        self.spacing.validate()?;
        Ok(())
    }

    /// Largest stable explicit-diffusion step: `min(dx,dy)^2 / (4 * viscosity)`.
    /// Inviscid fluids have no limit.
    pub fn max_stable_dt(viscosity: f64, dx: f64, dy: f64) -> Option<f64> {
        if viscosity > 0.0 {
            let h = dx.min(dy);
            Some(h * h / (4.0 * viscosity))
        } else {
            None
        }
    }

    /// The dt actually used for a step. Non-finite or negative requests
    /// become 0; requests above the limit drop to `dt_clamp_factor * limit`.
    pub fn effective_dt(&self, requested: f64, viscosity: f64, dx: f64, dy: f64) -> f64 {
        let requested = if requested.is_finite() { requested.max(0.0) } else { 0.0 };
        match Self::max_stable_dt(viscosity, dx, dy) {
            Some(max_dt) if requested > max_dt => self.dt_clamp_factor * max_dt,
            _ => requested,
        }
    }
}
