use serde::Serialize;

use super::boundary::Domain;
use crate::state::GridState;

/// Scalar summary of the grid after the latest step.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Statistics {
    pub time: f64,
    pub step_count: u64,
    /// dt actually used by the last step (after clamping).
    pub dt: f64,
    pub max_speed: f64,
    /// Mean speed over fluid (non-obstacle) cells.
    pub avg_speed: f64,
    pub max_pressure: f64,
    pub min_pressure: f64,
    pub total_density: f64,
    pub kinetic_energy: f64,
    pub mean_abs_divergence: f64,
}

pub fn compute_statistics(state: &GridState) -> Statistics {
    let (max_speed, avg_speed) = compute_speed_stats(&state.vx, &state.vy, &state.obstacle);
    let (min_pressure, max_pressure) = state
        .pressure
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &p| (lo.min(p), hi.max(p)));
    Statistics {
        time: state.time,
        step_count: state.step_count,
        dt: state.last_dt,
        max_speed,
        avg_speed,
        max_pressure,
        min_pressure,
        total_density: state.density.iter().sum(),
        kinetic_energy: compute_kinetic_energy(&state.vx, &state.vy, &state.obstacle),
        mean_abs_divergence: mean_abs_divergence(&state.vx, &state.vy, &Domain::of(state)),
    }
}

/// `(max, mean)` speed. The max runs over every cell, the mean over fluid cells only.
pub fn compute_speed_stats(vx: &[f64], vy: &[f64], obstacle: &[bool]) -> (f64, f64) {
    let mut max = 0.0_f64;
    let mut sum = 0.0;
    let mut count = 0usize;
    for i in 0..vx.len() {
        let speed = vx[i].hypot(vy[i]);
        max = max.max(speed);
        if !obstacle[i] {
            sum += speed;
            count += 1;
        }
    }
    let avg = if count > 0 { sum / count as f64 } else { 0.0 };
    (max, avg)
}

/// Compute kinetic energy averaged over fluid cells: KE = 0.5 * <vx² + vy²>.
pub fn compute_kinetic_energy(vx: &[f64], vy: &[f64], obstacle: &[bool]) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for i in 0..vx.len() {
        if !obstacle[i] {
            sum += vx[i] * vx[i] + vy[i] * vy[i];
            count += 1;
        }
    }
    if count > 0 { 0.5 * sum / count as f64 } else { 0.0 }
}

/// Mean |∇·v| over interior cells, central differences.
pub fn mean_abs_divergence(vx: &[f64], vy: &[f64], domain: &Domain) -> f64 {
    let (w, h) = (domain.width, domain.height);
    let mut sum = 0.0;
    for j in 1..h - 1 {
        for i in 1..w - 1 {
            let ii = domain.idx(i, j);
            let div = (vx[ii + 1] - vx[ii - 1]) / (2.0 * domain.dx) + (vy[ii + w] - vy[ii - w]) / (2.0 * domain.dy);
            sum += div.abs();
        }
    }
    sum / ((w - 2) * (h - 2)) as f64
}
