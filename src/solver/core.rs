use super::boundary::{set_bnd, Domain, FieldType};

/// Five-point stencil weights: `x = (x0 + ax*(E+W) + ay*(N+S)) / c`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stencil {
    pub ax: f64,
    pub ay: f64,
    pub c: f64,
}

/// Jacobi iterative linear solver.
///
/// Every sweep reads only the previous sweep's values (kept in `prev`), so
/// the result does not depend on cell visiting order. Boundaries are
/// re-imposed after each sweep and, when `solid` is given, solid cells are
/// zeroed. With a `tolerance`, relaxation stops after the first sweep whose
/// largest interior change falls below it. Returns the sweeps performed.
#[allow(clippy::too_many_arguments)]
pub fn lin_solve(
    field_type: FieldType,
    x: &mut [f64],
    x0: &[f64],
    stencil: Stencil,
    iter: usize,
    tolerance: Option<f64>,
    solid: Option<&[bool]>,
    domain: &Domain,
    prev: &mut [f64],
) -> usize {
    let (w, h) = (domain.width, domain.height);
    let Stencil { ax, ay, c } = stencil;
    let c_inv = 1.0 / c;

    for sweep in 1..=iter {
        prev.copy_from_slice(x);
        let mut max_delta = 0.0_f64;
        for j in 1..h - 1 {
            for i in 1..w - 1 {
                let ii = domain.idx(i, j);
                let value = (x0[ii] + ax * (prev[ii - 1] + prev[ii + 1]) + ay * (prev[ii - w] + prev[ii + w])) * c_inv;
                max_delta = max_delta.max((value - prev[ii]).abs());
                x[ii] = value;
            }
        }
        set_bnd(field_type, x, domain);
        if let Some(solid) = solid {
            apply_mask(x, solid);
        }
        if tolerance.is_some_and(|tol| max_delta < tol) {
            return sweep;
        }
    }
    iter
}

/// Zero `field` wherever `solid` is set.
pub fn apply_mask(field: &mut [f64], solid: &[bool]) {
    for (v, &s) in field.iter_mut().zip(solid) {
        if s {
            *v = 0.0;
        }
    }
}

/// Implicit diffusion step: spreads the field over time.
/// a = dt * rate / (dx * dy), c = 1 + 4a
#[allow(clippy::too_many_arguments)]
pub fn diffuse(
    field_type: FieldType,
    x: &mut [f64],
    x0: &[f64],
    rate: f64,
    dt: f64,
    iter: usize,
    domain: &Domain,
    prev: &mut [f64],
) {
    let a = dt * rate / (domain.dx * domain.dy);
    x.copy_from_slice(x0);
    let stencil = Stencil { ax: a, ay: a, c: 1.0 + 4.0 * a };
    lin_solve(field_type, x, x0, stencil, iter, None, None, domain, prev);
}

/// Semi-Lagrangian advection: traces particles backwards through velocity field.
/// Departure points are clamped to `[0.5, W-1.5] x [0.5, H-1.5]`.
pub fn advect(
    field_type: FieldType,
    d: &mut [f64],
    d0: &[f64],
    vx: &[f64],
    vy: &[f64],
    dt: f64,
    domain: &Domain,
) {
    let (w, h) = (domain.width, domain.height);
    let dtx = dt / domain.dx;
    let dty = dt / domain.dy;
    let x_max = w as f64 - 1.5;
    let y_max = h as f64 - 1.5;

    for j in 1..h - 1 {
        for i in 1..w - 1 {
            let ii = domain.idx(i, j);
            let x = (i as f64 - dtx * vx[ii]).clamp(0.5, x_max);
            let y = (j as f64 - dty * vy[ii]).clamp(0.5, y_max);

            let i0 = x.floor() as usize;
            let j0 = y.floor() as usize;
            let (i1, j1) = (i0 + 1, j0 + 1);
            let s1 = x - i0 as f64;
            let s0 = 1.0 - s1;
            let t1 = y - j0 as f64;
            let t0 = 1.0 - t1;

            d[ii] = s0 * (t0 * d0[domain.idx(i0, j0)] + t1 * d0[domain.idx(i0, j1)])
                + s1 * (t0 * d0[domain.idx(i1, j0)] + t1 * d0[domain.idx(i1, j1)]);
        }
    }
    set_bnd(field_type, d, domain);
}

/// Pressure projection: enforces incompressibility (divergence-free velocity field).
///
/// Solves the pressure Poisson equation by Jacobi relaxation and subtracts
/// the pressure gradient. Returns the relaxation sweeps performed.
#[allow(clippy::too_many_arguments)]
pub fn project(
    vx: &mut [f64],
    vy: &mut [f64],
    p: &mut [f64],
    div: &mut [f64],
    iter: usize,
    tolerance: Option<f64>,
    solid: Option<&[bool]>,
    domain: &Domain,
    prev: &mut [f64],
) -> usize {
    let (w, h) = (domain.width, domain.height);
    let (dx, dy) = (domain.dx, domain.dy);

    for j in 1..h - 1 {
        for i in 1..w - 1 {
            let ii = domain.idx(i, j);
            div[ii] = -0.5 * dx * dy * ((vx[ii + 1] - vx[ii - 1]) / dx + (vy[ii + w] - vy[ii - w]) / dy);
        }
    }
    p.fill(0.0);
    set_bnd(FieldType::Scalar, div, domain);
    set_bnd(FieldType::Scalar, p, domain);

    // Anisotropic weights; both are 1 on square cells.
    let wx = dy / dx;
    let wy = dx / dy;
    let stencil = Stencil { ax: wx, ay: wy, c: 2.0 * (wx + wy) };
    let sweeps = lin_solve(FieldType::Scalar, p, div, stencil, iter, tolerance, solid, domain, prev);
    log::trace!("pressure relaxation finished after {} sweeps", sweeps);

    for j in 1..h - 1 {
        for i in 1..w - 1 {
            let ii = domain.idx(i, j);
            vx[ii] -= 0.5 * (p[ii + 1] - p[ii - 1]) / dx;
            vy[ii] -= 0.5 * (p[ii + w] - p[ii - w]) / dy;
        }
    }
    set_bnd(FieldType::Vx, vx, domain);
    set_bnd(FieldType::Vy, vy, domain);
    sweeps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fluid::Environment;
    use crate::solver::diagnostics::mean_abs_divergence;
    use proptest::prelude::*;

    const W: usize = 24;

    fn domain(env: Environment) -> Domain {
        Domain { width: W, height: W, environment: env, dx: 1.0 / W as f64, dy: 1.0 / W as f64 }
    }

    fn gaussian_source(d: &Domain) -> (Vec<f64>, Vec<f64>) {
        let mut vx = vec![0.0; W * W];
        let mut vy = vec![0.0; W * W];
        let c = (W / 2) as f64;
        for j in 1..W - 1 {
            for i in 1..W - 1 {
                let (px, py) = (i as f64 - c, j as f64 - c);
                let g = (-(px * px + py * py) / 18.0).exp();
                vx[d.idx(i, j)] = 0.1 * px * g;
                vy[d.idx(i, j)] = 0.1 * py * g;
            }
        }
        (vx, vy)
    }

    #[test]
    fn test_lin_solve_converges() {
        let d = domain(Environment::Bounded);
        let mut x = vec![0.0; W * W];
        let mut x0 = vec![0.0; W * W];
        let mut prev = vec![0.0; W * W];
        let mid = d.idx(W / 2, W / 2);
        x0[mid] = 100.0;
        x.copy_from_slice(&x0);

        let stencil = Stencil { ax: 1.0, ay: 1.0, c: 5.0 };
        let sweeps = lin_solve(FieldType::Scalar, &mut x, &x0, stencil, 20, None, None, &d, &mut prev);

        assert_eq!(sweeps, 20, "No tolerance means every sweep runs");
        assert!(x[mid] > 0.0, "Center should still be positive");
        assert!(x[mid + 1] > 0.0, "Neighbors should get some value");
        assert!(x[mid] > x[mid + 1], "Center should be larger than neighbor");
    }

    #[test]
    fn test_lin_solve_order_independent() {
        // Jacobi: one sweep from zero gives exactly x0/c everywhere inside.
        let d = domain(Environment::Bounded);
        let x0: Vec<f64> = (0..W * W).map(|i| (i % 7) as f64).collect();
        let mut x = vec![0.0; W * W];
        let mut prev = vec![0.0; W * W];
        let stencil = Stencil { ax: 1.0, ay: 1.0, c: 4.0 };
        lin_solve(FieldType::Scalar, &mut x, &x0, stencil, 1, None, None, &d, &mut prev);
        for j in 1..W - 1 {
            for i in 1..W - 1 {
                let ii = d.idx(i, j);
                assert_eq!(x[ii], x0[ii] * 0.25, "Cell ({},{}) saw an updated neighbour", i, j);
            }
        }
    }

    #[test]
    fn test_lin_solve_early_exit() {
        let d = domain(Environment::Bounded);
        let x0 = vec![0.0; W * W];
        let mut x = vec![0.0; W * W];
        let mut prev = vec![0.0; W * W];
        let stencil = Stencil { ax: 1.0, ay: 1.0, c: 4.0 };
        let sweeps = lin_solve(FieldType::Scalar, &mut x, &x0, stencil, 100, Some(1e-6), None, &d, &mut prev);
        assert_eq!(sweeps, 1, "Zero source converges immediately");
    }

    #[test]
    fn test_lin_solve_zeroes_solid_cells() {
        let d = domain(Environment::Bounded);
        let mut x0 = vec![0.0; W * W];
        let mut x = vec![0.0; W * W];
        let mut prev = vec![0.0; W * W];
        let mut solid = vec![false; W * W];
        let mid = d.idx(W / 2, W / 2);
        x0[mid - 1] = 50.0;
        solid[mid] = true;
        let stencil = Stencil { ax: 1.0, ay: 1.0, c: 5.0 };
        lin_solve(FieldType::Scalar, &mut x, &x0, stencil, 10, None, Some(&solid), &d, &mut prev);
        assert_eq!(x[mid], 0.0, "Solid cell must stay zero");
        assert!(x[mid - 1] > 0.0);
    }

    #[test]
    fn test_diffuse_smooths() {
        let d = domain(Environment::Bounded);
        let mut x0 = vec![0.0; W * W];
        let mut x = vec![0.0; W * W];
        let mut prev = vec![0.0; W * W];
        let mid = d.idx(W / 2, W / 2);
        x0[mid] = 100.0;

        diffuse(FieldType::Scalar, &mut x, &x0, 0.001, 0.1, 20, &d, &mut prev);

        assert!(x[mid] < 100.0, "Center should be less than original spike");
        assert!(x[mid + 1] > 0.0, "Neighbors should gain some value");
        assert!(x[mid + W] > 0.0, "Neighbors should gain some value");
    }

    #[test]
    fn test_diffuse_zero_rate_copies() {
        let d = domain(Environment::Periodic);
        let x0: Vec<f64> = (0..W * W).map(|i| (i % 5) as f64).collect();
        let mut x = vec![0.0; W * W];
        let mut prev = vec![0.0; W * W];
        diffuse(FieldType::Scalar, &mut x, &x0, 0.0, 0.1, 20, &d, &mut prev);
        for j in 1..W - 1 {
            for i in 1..W - 1 {
                assert_eq!(x[d.idx(i, j)], x0[d.idx(i, j)]);
            }
        }
    }

    #[test]
    fn test_advect_zero_velocity_preserves() {
        let d = domain(Environment::Bounded);
        let mut d0 = vec![0.0; W * W];
        let mut out = vec![0.0; W * W];
        let v = vec![0.0; W * W];
        for j in 0..W {
            for i in 0..W {
                d0[d.idx(i, j)] = i as f64 / W as f64;
            }
        }

        advect(FieldType::Scalar, &mut out, &d0, &v, &v, 0.1, &d);

        for j in 1..W - 1 {
            for i in 1..W - 1 {
                let (orig, advected) = (d0[d.idx(i, j)], out[d.idx(i, j)]);
                assert!(
                    (orig - advected).abs() < 1e-12,
                    "Zero velocity should preserve field at ({}, {}): {} vs {}",
                    i, j, orig, advected
                );
            }
        }
    }

    #[test]
    fn test_advect_uniform_field_unchanged() {
        let d = domain(Environment::Bounded);
        let d0 = vec![5.0; W * W];
        let mut out = vec![0.0; W * W];
        let vx = vec![0.3; W * W];
        let vy = vec![-0.2; W * W];

        advect(FieldType::Scalar, &mut out, &d0, &vx, &vy, 0.1, &d);

        for (i, &val) in out.iter().enumerate() {
            assert!((val - 5.0).abs() < 1e-9, "Uniform field should stay uniform: got {} at {}", val, i);
        }
    }

    #[test]
    fn test_advect_shifts_by_one_cell() {
        // vx = dx / dt moves content exactly one cell to the right.
        let d = domain(Environment::Bounded);
        let mut d0 = vec![0.0; W * W];
        let mut out = vec![0.0; W * W];
        let dt = 0.1;
        let vx = vec![d.dx / dt; W * W];
        let vy = vec![0.0; W * W];
        d0[d.idx(10, 10)] = 1.0;

        advect(FieldType::Scalar, &mut out, &d0, &vx, &vy, dt, &d);

        assert!((out[d.idx(11, 10)] - 1.0).abs() < 1e-9, "got {}", out[d.idx(11, 10)]);
        assert!(out[d.idx(10, 10)].abs() < 1e-9);
    }

    #[test]
    fn test_advect_huge_velocity_stays_bounded() {
        let d = domain(Environment::Bounded);
        let d0 = vec![1.0; W * W];
        let mut out = vec![0.0; W * W];
        let vx = vec![1e6; W * W];
        let vy = vec![-1e6; W * W];

        advect(FieldType::Scalar, &mut out, &d0, &vx, &vy, 0.1, &d);

        for &val in &out {
            assert!((0.0..=1.0 + 1e-12).contains(&val), "Clamped backtrace must interpolate inside the grid: {}", val);
        }
    }

    #[test]
    fn test_project_reduces_divergence() {
        let d = domain(Environment::Bounded);
        let (mut vx, mut vy) = gaussian_source(&d);
        let mut p = vec![0.0; W * W];
        let mut div = vec![0.0; W * W];
        let mut prev = vec![0.0; W * W];

        let before = mean_abs_divergence(&vx, &vy, &d);
        assert!(before > 0.0, "Should have some initial divergence");

        project(&mut vx, &mut vy, &mut p, &mut div, 100, None, None, &d, &mut prev);

        let after = mean_abs_divergence(&vx, &vy, &d);
        assert!(after < before, "Divergence should be reduced: before={}, after={}", before, after);
    }

    #[test]
    fn test_project_divergence_free_field_untouched() {
        // Uniform flow in a periodic box has no divergence.
        let d = domain(Environment::Periodic);
        let mut vx = vec![0.2; W * W];
        let mut vy = vec![-0.1; W * W];
        let mut p = vec![0.0; W * W];
        let mut div = vec![0.0; W * W];
        let mut prev = vec![0.0; W * W];

        let sweeps = project(&mut vx, &mut vy, &mut p, &mut div, 100, Some(1e-6), None, &d, &mut prev);

        assert_eq!(sweeps, 1);
        assert!(vx.iter().all(|&v| (v - 0.2).abs() < 1e-15));
        assert!(vy.iter().all(|&v| (v + 0.1).abs() < 1e-15));
    }

    #[test]
    fn test_project_anisotropic_spacing() {
        let mut d = domain(Environment::Bounded);
        d.dy = 2.0 * d.dx;
        let (mut vx, mut vy) = gaussian_source(&d);
        let mut p = vec![0.0; W * W];
        let mut div = vec![0.0; W * W];
        let mut prev = vec![0.0; W * W];

        let before = mean_abs_divergence(&vx, &vy, &d);
        project(&mut vx, &mut vy, &mut p, &mut div, 100, None, None, &d, &mut prev);
        let after = mean_abs_divergence(&vx, &vy, &d);
        assert!(after < before, "before={}, after={}", before, after);
    }

    fn velocity_strategy() -> impl Strategy<Value = (usize, Vec<f64>, Vec<f64>)> {
        (6usize..16).prop_flat_map(|n| {
            (
                Just(n),
                prop::collection::vec(-1.0f64..1.0, n * n),
                prop::collection::vec(-1.0f64..1.0, n * n),
            )
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_project_reduces_random_divergence((n, vx, vy) in velocity_strategy(), periodic in any::<bool>()) {
            let env = if periodic { Environment::Periodic } else { Environment::Bounded };
            let d = Domain { width: n, height: n, environment: env, dx: 1.0 / n as f64, dy: 1.0 / n as f64 };
            let (mut vx, mut vy) = (vx, vy);
            let mut p = vec![0.0; n * n];
            let mut div = vec![0.0; n * n];
            let mut prev = vec![0.0; n * n];

            let before = mean_abs_divergence(&vx, &vy, &d);
            project(&mut vx, &mut vy, &mut p, &mut div, 100, Some(1e-6), None, &d, &mut prev);
            let after = mean_abs_divergence(&vx, &vy, &d);
            prop_assert!(after < before, "before={}, after={}", before, after);
        }
    }
}
