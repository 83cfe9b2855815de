use crate::error::{FluidError, Result};
use crate::fluid::{Edge, Environment, FluidProperties, FluidType};
use crate::shape::{flatten_mask, Shape, ShapeParams};
use crate::solver::{self, diagnostics, SolverParams};

/// Row-major index; caller guarantees `x < nx`.
#[inline(always)]
pub const fn idx_inner(x: usize, y: usize, nx: usize) -> usize {
    y * nx + x
}

/// Split a row-major field into rows, e.g. for nested-array transport.
pub fn to_rows<T: Copy>(field: &[T], width: usize) -> Vec<Vec<T>> {
    field.chunks(width).map(|row| row.to_vec()).collect()
}

/// Grid state: scalar/vector fields, obstacle mask and simulation clock.
///
/// Field shapes are fixed at construction. The obstacle mask only changes
/// through the obstacle methods; stepping never edits it.
#[derive(Clone, Debug)]
pub struct GridState {
    pub(crate) width: usize,
    pub(crate) height: usize,
    pub(crate) fluid: FluidType,
    pub(crate) environment: Environment,
    pub(crate) diffusion_rate: f64,
    pub(crate) viscosity: f64,
    pub(crate) params: SolverParams,
    pub(crate) density: Vec<f64>,
    /// Diffused density before advection.
    pub(crate) density0: Vec<f64>,
    pub(crate) vx: Vec<f64>,
    pub(crate) vy: Vec<f64>,
    pub(crate) vx0: Vec<f64>,
    pub(crate) vy0: Vec<f64>,
    pub(crate) pressure: Vec<f64>,
    pub(crate) divergence: Vec<f64>,
    /// Previous-sweep buffer for Jacobi relaxation.
    pub(crate) scratch: Vec<f64>,
    pub(crate) obstacle: Vec<bool>,
    /// Left-edge inlet velocity, if any.
    pub(crate) inflow: Option<f64>,
    pub(crate) time: f64,
    pub(crate) step_count: u64,
    pub(crate) last_dt: f64,
}

impl GridState {
    pub fn new(width: usize, height: usize, fluid: FluidType, environment: Environment) -> Result<Self> {
        if width < 3 || height < 3 {
            return Err(FluidError::InvalidDimensions { width, height });
        }
        let size = width * height;
        let FluidProperties { diffusion_rate, viscosity } = fluid.properties();
        Ok(Self {
            width,
            height,
            fluid,
            environment,
            diffusion_rate,
            viscosity,
            params: SolverParams::default(),
            density: vec![0.0; size],
            density0: vec![0.0; size],
            vx: vec![0.0; size],
            vy: vec![0.0; size],
            vx0: vec![0.0; size],
            vy0: vec![0.0; size],
            pressure: vec![0.0; size],
            divergence: vec![0.0; size],
            scratch: vec![0.0; size],
            obstacle: vec![false; size],
            inflow: None,
            time: 0.0,
            step_count: 0,
            last_dt: 0.0,
        })
    }

    /// Construct from preset and environment names, as they arrive from a request.
    pub fn from_names(width: usize, height: usize, fluid: &str, environment: &str) -> Result<Self> {
        let fluid: FluidType = fluid.parse()?;
        let environment: Environment = environment.parse()?;
        Self::new(width, height, fluid, environment)
    }

    /// Builder form of `set_params`.
    pub fn with_params(mut self, params: SolverParams) -> Result<Self> {
        self.set_params(params)?;
        Ok(self)
    }

    /// Replace the solver parameters; bad spacing leaves the old ones in place.
    pub fn set_params(&mut self, params: SolverParams) -> Result<()> {
        params.validate()?;
        self.params = params;
        Ok(())
    }

    pub fn params(&self) -> &SolverParams {
        &self.params
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn fluid(&self) -> FluidType {
        self.fluid
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn properties(&self) -> FluidProperties {
        FluidProperties {
            diffusion_rate: self.diffusion_rate,
            viscosity: self.viscosity,
        }
    }

    // --- Obstacles ---

    /// Replace the obstacle mask with `shape` and clear fluid inside it.
    pub fn set_obstacle(&mut self, shape: &Shape) -> Result<()> {
        let mask = shape.rasterize(self.width, self.height)?;
        self.obstacle = mask;
        log::debug!(
            "obstacle set to {} ({} solid cells)",
            shape.kind().name(),
            self.solid_count()
        );
        self.clear_solid_cells();
        Ok(())
    }

    pub fn set_obstacle_named(&mut self, name: &str, params: ShapeParams) -> Result<()> {
        let shape = Shape::from_name(name, params)?;
        self.set_obstacle(&shape)
    }

    /// Union `shape` into the existing obstacle mask.
    pub fn add_obstacle(&mut self, shape: &Shape) -> Result<()> {
        let mask = shape.rasterize(self.width, self.height)?;
        for (solid, add) in self.obstacle.iter_mut().zip(mask) {
            *solid |= add;
        }
        log::debug!("obstacle {} added ({} solid cells)", shape.kind().name(), self.solid_count());
        self.clear_solid_cells();
        Ok(())
    }

    pub fn clear_obstacles(&mut self) {
        self.obstacle.fill(false);
    }

    fn solid_count(&self) -> usize {
        self.obstacle.iter().filter(|&&s| s).count()
    }

    pub(crate) fn has_obstacles(&self) -> bool {
        self.obstacle.iter().any(|&s| s)
    }

    /// Zero every field inside solid cells.
    pub(crate) fn clear_solid_cells(&mut self) {
        for i in 0..self.obstacle.len() {
            if !self.obstacle[i] {
                continue;
            }
            self.density[i] = 0.0;
            self.density0[i] = 0.0;
            self.vx[i] = 0.0;
            self.vy[i] = 0.0;
            self.vx0[i] = 0.0;
            self.vy0[i] = 0.0;
            self.pressure[i] = 0.0;
            self.divergence[i] = 0.0;
        }
    }

    // --- Density seeding and sources ---

    /// Seed density with 1.0 inside `shape` and 0.0 elsewhere.
    pub fn init_shape(&mut self, shape: &Shape) -> Result<()> {
        let mask = shape.rasterize(self.width, self.height)?;
        self.seed_density(&mask);
        Ok(())
    }

    pub fn init_shape_named(&mut self, name: &str, params: ShapeParams) -> Result<()> {
        let shape = Shape::from_name(name, params)?;
        self.init_shape(&shape)
    }

    /// Seed density from caller-supplied rows; the rows must match the grid.
    pub fn init_custom(&mut self, rows: &[Vec<bool>]) -> Result<()> {
        let mask = flatten_mask(rows, self.width, self.height)?;
        self.seed_density(&mask);
        Ok(())
    }

    fn seed_density(&mut self, mask: &[bool]) {
        for (d, &inside) in self.density.iter_mut().zip(mask) {
            *d = if inside { 1.0 } else { 0.0 };
        }
        self.clear_solid_cells();
    }

    /// Add `amount` of density along `edge`, skipping solid cells.
    pub fn inject(&mut self, amount: f64, edge: Edge) {
        self.inject_flow(amount, edge, 0.0);
    }

    /// `inject` with the edge given by name; only `top` and `left` exist.
    pub fn inject_named(&mut self, amount: f64, edge: &str) -> Result<()> {
        let edge: Edge = edge.parse()?;
        self.inject(amount, edge);
        Ok(())
    }

    /// Add density plus an inward velocity `speed` along `edge`.
    /// Top pushes along +y (down the rows), left along +x.
    pub fn inject_flow(&mut self, amount: f64, edge: Edge, speed: f64) {
        let cells: Vec<usize> = match edge {
            Edge::Top => (0..self.width).map(|x| idx_inner(x, 0, self.width)).collect(),
            Edge::Left => (0..self.height).map(|y| idx_inner(0, y, self.width)).collect(),
        };
        for i in cells.into_iter().filter(|&i| !self.obstacle[i]) {
            self.density[i] += amount;
            match edge {
                Edge::Top => self.vy[i] += speed,
                Edge::Left => self.vx[i] += speed,
            }
        }
    }

    /// Configure (or remove) the left-edge inlet. Applied immediately and at
    /// the start of every step.
    pub fn set_inflow(&mut self, inflow: Option<f64>) {
        self.inflow = inflow;
        if let Some(u_in) = inflow {
            solver::apply_inflow(self, u_in);
        }
    }

    pub fn inflow(&self) -> Option<f64> {
        self.inflow
    }

    // --- Stepping ---

    /// Advance one tick. An unstable `dt` is clamped, never rejected.
    pub fn step(&mut self, dt: f64) {
        solver::fluid_step(self, dt);
    }

    /// Advance `steps` ticks with the same requested `dt`.
    pub fn advance(&mut self, dt: f64, steps: usize) {
        for _ in 0..steps {
            self.step(dt);
        }
    }

    /// Zero all fields and the clock. Obstacles, fluid and solver
    /// parameters are kept; a configured inflow is re-applied.
    pub fn reset(&mut self) {
        for field in [
            &mut self.density,
            &mut self.density0,
            &mut self.vx,
            &mut self.vy,
            &mut self.vx0,
            &mut self.vy0,
            &mut self.pressure,
            &mut self.divergence,
            &mut self.scratch,
        ] {
            field.fill(0.0);
        }
        self.time = 0.0;
        self.step_count = 0;
        self.last_dt = 0.0;
        if let Some(u_in) = self.inflow {
            solver::apply_inflow(self, u_in);
        }
        log::debug!("grid {}x{} reset", self.width, self.height);
    }

    // --- Read views ---

    pub fn density(&self) -> &[f64] {
        &self.density
    }

    /// `(vx, vy)`.
    pub fn velocity(&self) -> (&[f64], &[f64]) {
        (&self.vx, &self.vy)
    }

    pub fn pressure(&self) -> &[f64] {
        &self.pressure
    }

    pub fn obstacle(&self) -> &[bool] {
        &self.obstacle
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn statistics(&self) -> diagnostics::Statistics {
        diagnostics::compute_statistics(self)
    }
}
