mod boundary;
mod core;
pub mod diagnostics;
mod obstacle;
mod params;

// Re-export public API
pub use boundary::{set_bnd, Domain, FieldType};
pub use self::core::{advect, apply_mask, diffuse, lin_solve, project, Stencil};
pub use params::{SolverParams, Spacing};

pub(crate) use obstacle::apply_inflow;

use crate::state::GridState;
use obstacle::apply_mask_fields;

impl Domain {
    pub fn of(state: &GridState) -> Self {
        let (dx, dy) = state.params.spacing.resolve(state.width, state.height);
        Self {
            width: state.width,
            height: state.height,
            environment: state.environment,
            dx,
            dy,
        }
    }
}

/// Full fluid simulation step.
///
/// Velocity: inflow, gravity, diffuse, project, mask, self-advect, project.
/// Density: diffuse, then advect through the projected velocity. Finally
/// every field is zeroed inside obstacles and the clock advances by the
/// (possibly clamped) dt, which is returned.
pub fn fluid_step(state: &mut GridState, requested_dt: f64) -> f64 {
    let domain = Domain::of(state);
    let params = state.params.clone();
    let dt = params.effective_dt(requested_dt, state.viscosity, domain.dx, domain.dy);
    if dt != requested_dt {
        log::debug!("dt {} clamped to {} (viscosity {})", requested_dt, dt, state.viscosity);
    }

    // 1. Inflow
    if let Some(u_in) = state.inflow {
        apply_inflow(state, u_in);
    }

    // 2. Gravity
    if params.gravity != 0.0 {
        let dv = params.gravity * dt;
        for v in state.vy.iter_mut() {
            *v += dv;
        }
    }

    let has_solid = state.has_obstacles();
    let solid = has_solid.then_some(&state.obstacle[..]);

    // 3. Diffuse velocity
    diffuse(FieldType::Vx, &mut state.vx0, &state.vx, state.viscosity, dt, params.diffuse_iter, &domain, &mut state.scratch);
    diffuse(FieldType::Vy, &mut state.vy0, &state.vy, state.viscosity, dt, params.diffuse_iter, &domain, &mut state.scratch);

    // 4. Project
    project(
        &mut state.vx0,
        &mut state.vy0,
        &mut state.pressure,
        &mut state.divergence,
        params.project_iter,
        params.project_tolerance,
        solid,
        &domain,
        &mut state.scratch,
    );

    // 5. Mask projected velocity before it carries anything
    if let Some(solid) = solid {
        apply_mask_fields(&mut state.vx0, &mut state.vy0, solid);
    }

    // 6. Advect velocity
    advect(FieldType::Vx, &mut state.vx, &state.vx0, &state.vx0, &state.vy0, dt, &domain);
    advect(FieldType::Vy, &mut state.vy, &state.vy0, &state.vx0, &state.vy0, dt, &domain);

    // 7. Project
    project(
        &mut state.vx,
        &mut state.vy,
        &mut state.pressure,
        &mut state.divergence,
        params.project_iter,
        params.project_tolerance,
        solid,
        &domain,
        &mut state.scratch,
    );

    // 8. Diffuse + advect density
    diffuse(FieldType::Scalar, &mut state.density0, &state.density, state.diffusion_rate, dt, params.diffuse_iter, &domain, &mut state.scratch);
    advect(FieldType::Scalar, &mut state.density, &state.density0, &state.vx, &state.vy, dt, &domain);

    // 9. No flux inside obstacles
    if has_solid {
        state.clear_solid_cells();
    }

    state.time += dt;
    state.step_count += 1;
    state.last_dt = dt;
    dt
}
