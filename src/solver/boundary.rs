use crate::fluid::Environment;
use crate::state::idx_inner;

/// Field type for boundary condition dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Scalar,
    Vx,
    Vy,
}

/// Grid geometry shared by every solver kernel: dimensions, edge policy
/// and physical cell spacing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Domain {
    pub width: usize,
    pub height: usize,
    pub environment: Environment,
    pub dx: f64,
    pub dy: f64,
}

impl Domain {
    /// Unit-spacing domain, handy for kernels exercised in isolation.
    pub fn unit(width: usize, height: usize, environment: Environment) -> Self {
        Self { width, height, environment, dx: 1.0, dy: 1.0 }
    }

    #[inline(always)]
    pub fn idx(&self, x: usize, y: usize) -> usize {
        idx_inner(x, y, self.width)
    }
}

/// Boundary condition handler.
/// Rewrites the outer ring of `x` from its neighbours; interior cells are untouched.
/// Applying it twice gives the same field as applying it once.
pub fn set_bnd(field_type: FieldType, x: &mut [f64], domain: &Domain) {
    match domain.environment {
        Environment::Bounded => set_bnd_walls(field_type, x, domain),
        Environment::Periodic => set_bnd_periodic(x, domain),
    }
}

/// Reflective walls.
///   - `FieldType::Scalar`: Neumann (copy neighbor) on all four edges
///   - `FieldType::Vx`: negate on left/right, copy on top/bottom
///   - `FieldType::Vy`: negate on top/bottom, copy on left/right
///
/// Corners become the mean of their two edge neighbours.
fn set_bnd_walls(field_type: FieldType, x: &mut [f64], d: &Domain) {
    let (w, h) = (d.width, d.height);
    let (sx, sy) = match field_type {
        FieldType::Vx => (-1.0, 1.0),
        FieldType::Vy => (1.0, -1.0),
        FieldType::Scalar => (1.0, 1.0),
    };

    for j in 1..h - 1 {
        x[d.idx(0, j)] = sx * x[d.idx(1, j)];
        x[d.idx(w - 1, j)] = sx * x[d.idx(w - 2, j)];
    }
    for i in 1..w - 1 {
        x[d.idx(i, 0)] = sy * x[d.idx(i, 1)];
        x[d.idx(i, h - 1)] = sy * x[d.idx(i, h - 2)];
    }

    x[d.idx(0, 0)] = 0.5 * (x[d.idx(1, 0)] + x[d.idx(0, 1)]);
    x[d.idx(w - 1, 0)] = 0.5 * (x[d.idx(w - 2, 0)] + x[d.idx(w - 1, 1)]);
    x[d.idx(0, h - 1)] = 0.5 * (x[d.idx(1, h - 1)] + x[d.idx(0, h - 2)]);
    x[d.idx(w - 1, h - 1)] = 0.5 * (x[d.idx(w - 2, h - 1)] + x[d.idx(w - 1, h - 2)]);
}

/// Toroidal wrap: row 0 mirrors row H-2, row H-1 mirrors row 1, then the
/// same for columns. Field type is irrelevant.
///
/// Corners are not averaged as the walled variant does. Each corner ends up
/// holding the diagonally opposite interior cell, so ghost rows and columns
/// stay exact copies and a second call changes nothing. Averaging would mix
/// two wrapped values and break that exact wrap.
fn set_bnd_periodic(x: &mut [f64], d: &Domain) {
    let (w, h) = (d.width, d.height);
    for i in 0..w {
        x[d.idx(i, 0)] = x[d.idx(i, h - 2)];
        x[d.idx(i, h - 1)] = x[d.idx(i, 1)];
    }
    for j in 0..h {
        x[d.idx(0, j)] = x[d.idx(w - 2, j)];
        x[d.idx(w - 1, j)] = x[d.idx(1, j)];
    }
}
