use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::error::FluidError;
use crate::fluid::Edge;
use crate::shape::ShapeParams;
use crate::solver::{SolverParams, Spacing};
use crate::state::GridState;

pub const DEFAULT_PATH: &str = "fluidgrid.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub grid: GridConfig,
    pub solver: SolverConfig,
    pub scene: SceneConfig,
    pub run: RunConfig,
}

/// Names stay strings here so a bad name surfaces as a `FluidError` when
/// the grid is built, not as a parse failure that falls back to defaults.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub width: usize,
    pub height: usize,
    pub fluid: String,
    pub environment: String,
    pub inflow: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub dt: f64,
    pub diffuse_iter: usize,
    pub project_iter: usize,
    pub project_tolerance: Option<f64>,
    pub dt_clamp_factor: f64,
    pub gravity: f64,
    /// Explicit cell spacing; both must be set, otherwise `1/W`, `1/H`.
    pub dx: Option<f64>,
    pub dy: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub obstacle: Option<ShapeConfig>,
    pub initial: Option<ShapeConfig>,
    pub inject: Option<InjectConfig>,
}

/// `{ shape: circle, radius: 5.0 }` and friends.
#[derive(Debug, Deserialize)]
pub struct ShapeConfig {
    pub shape: String,
    #[serde(flatten)]
    pub params: ShapeParams,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct InjectConfig {
    pub amount: f64,
    pub edge: String,
    pub speed: f64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub steps: usize,
    /// Log statistics every N steps; 0 disables periodic logging.
    pub log_every: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 64,
            height: 64,
            fluid: "water".into(),
            environment: "bounded".into(),
            inflow: None,
        }
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        let params = SolverParams::default();
        Self {
            dt: 0.1,
            diffuse_iter: params.diffuse_iter,
            project_iter: params.project_iter,
            project_tolerance: params.project_tolerance,
            dt_clamp_factor: params.dt_clamp_factor,
            gravity: params.gravity,
            dx: None,
            dy: None,
        }
    }
}

impl Default for InjectConfig {
    fn default() -> Self {
        Self {
            amount: 1.0,
            edge: "top".into(),
            speed: 0.0,
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self { steps: 100, log_every: 10 }
    }
}

impl SolverConfig {
    /// Solver parameters; `dx` and `dy` must be given together and be usable.
    pub fn params(&self) -> Result<SolverParams, FluidError> {
        let spacing = match (self.dx, self.dy) {
            (Some(dx), Some(dy)) => Spacing::explicit(dx, dy)?,
            (None, None) => Spacing::Normalized,
            _ => return Err(FluidError::IncompleteSpacing),
        };
        Ok(SolverParams {
            diffuse_iter: self.diffuse_iter,
            project_iter: self.project_iter,
            project_tolerance: self.project_tolerance,
            dt_clamp_factor: self.dt_clamp_factor,
            gravity: self.gravity,
            spacing,
        })
    }
}

impl InjectConfig {
    pub fn edge(&self) -> Result<Edge, FluidError> {
        self.edge.parse()
    }
}

impl Config {
    /// Build a grid and apply the scene: obstacle, initial density, inflow.
    pub fn build_state(&self) -> Result<GridState, FluidError> {
        let grid = &self.grid;
        let mut state = GridState::from_names(grid.width, grid.height, &grid.fluid, &grid.environment)?
            .with_params(self.solver.params()?)?;
        if let Some(obstacle) = &self.scene.obstacle {
            state.set_obstacle_named(&obstacle.shape, obstacle.params.clone())?;
        }
        if let Some(initial) = &self.scene.initial {
            state.init_shape_named(&initial.shape, initial.params.clone())?;
        }
        if let Some(inject) = &self.scene.inject {
            inject.edge()?;
        }
        state.set_inflow(grid.inflow);
        Ok(state)
    }
}

pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}

/// Load `path`, falling back to defaults when it is missing or unreadable.
pub fn load(path: &Path) -> Config {
    if !path.exists() {
        log::debug!("{} not found; using defaults", path.display());
        return Config::default();
    }
    match load_from(path) {
        Ok(cfg) => cfg,
        Err(e) => {
            log::warn!("{e}; using defaults");
            Config::default()
        }
    }
}
