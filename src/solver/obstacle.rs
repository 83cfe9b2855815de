use crate::state::{idx_inner, GridState};

/// Zero velocity inside solid cells.
/// Used on the intermediate `vx0`/`vy0` fields as well as the final ones.
pub fn apply_mask_fields(vx: &mut [f64], vy: &mut [f64], solid: &[bool]) {
    for i in 0..solid.len() {
        if solid[i] {
            vx[i] = 0.0;
            vy[i] = 0.0;
        }
    }
}

/// Drive the two leftmost columns at `u_in`, with no cross-flow.
/// Solid cells keep zero velocity.
pub fn apply_inflow(state: &mut GridState, u_in: f64) {
    let (w, h) = (state.width, state.height);
    for j in 0..h {
        for i in 0..2.min(w) {
            let ii = idx_inner(i, j, w);
            if !state.obstacle[ii] {
                state.vx[ii] = u_in;
                state.vy[ii] = 0.0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fluid::{Environment, FluidType};
    use crate::shape::Shape;

    fn state(w: usize, h: usize) -> GridState {
        GridState::new(w, h, FluidType::Water, Environment::Bounded).unwrap()
    }

    #[test]
    fn test_apply_inflow() {
        let mut state = state(10, 8);
        state.vy.fill(0.3);
        apply_inflow(&mut state, 0.1);
        for j in 0..8 {
            assert_eq!(state.vx[idx_inner(0, j, 10)], 0.1);
            assert_eq!(state.vx[idx_inner(1, j, 10)], 0.1);
            assert_eq!(state.vy[idx_inner(0, j, 10)], 0.0);
            assert_eq!(state.vx[idx_inner(2, j, 10)], 0.0, "Only two inlet columns");
        }
    }

    #[test]
    fn test_apply_inflow_skips_solid() {
        let mut state = state(10, 8);
        state.set_obstacle(&Shape::Rectangle { x1: 0, y1: 3, x2: 1, y2: 4 }).unwrap();
        apply_inflow(&mut state, 0.1);
        assert_eq!(state.vx[idx_inner(0, 3, 10)], 0.0);
        assert_eq!(state.vx[idx_inner(1, 4, 10)], 0.0);
        assert_eq!(state.vx[idx_inner(0, 5, 10)], 0.1);
    }

    #[test]
    fn test_apply_mask_fields() {
        let mut vx = vec![1.0; 4];
        let mut vy = vec![-1.0; 4];
        apply_mask_fields(&mut vx, &mut vy, &[false, true, true, false]);
        assert_eq!(vx, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(vy, [-1.0, 0.0, 0.0, -1.0]);
    }
}
