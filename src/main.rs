use std::path::PathBuf;

use fluidgrid::config::{self, Config};
use fluidgrid::{FluidError, Statistics};

fn run(cfg: &Config) -> Result<Statistics, FluidError> {
    let mut state = cfg.build_state()?;
    let inject = match &cfg.scene.inject {
        Some(inject) => Some((inject.amount, inject.edge()?, inject.speed)),
        None => None,
    };
    log::info!(
        "{}x{} {} grid ({}), {} steps at dt={}",
        state.width(),
        state.height(),
        state.fluid(),
        state.environment(),
        cfg.run.steps,
        cfg.solver.dt
    );

    for step in 1..=cfg.run.steps {
        if let Some((amount, edge, speed)) = inject {
            state.inject_flow(amount, edge, speed);
        }
        state.step(cfg.solver.dt);
        if cfg.run.log_every > 0 && step % cfg.run.log_every == 0 {
            let stats = state.statistics();
            log::info!(
                "step {:>5}  t={:.4}  max|v|={:.5}  p=[{:.5}, {:.5}]  mass={:.4}",
                stats.step_count,
                stats.time,
                stats.max_speed,
                stats.min_pressure,
                stats.max_pressure,
                stats.total_density
            );
        }
    }
    Ok(state.statistics())
}

fn main() {
    env_logger::init();

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(config::DEFAULT_PATH));
    let cfg = config::load(&path);

    let stats = match run(&cfg) {
        Ok(stats) => stats,
        Err(e) => {
            log::error!("{e}");
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };
    match serde_yaml::to_string(&stats) {
        Ok(yaml) => print!("{yaml}"),
        Err(e) => {
            eprintln!("error: failed to encode statistics: {e}");
            std::process::exit(1);
        }
    }
}
