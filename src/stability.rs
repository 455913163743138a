//! Stability of the diffusion recurrence
//!
//! Away from the floor every pass computes
//! `v' = v + c * (l + r + down * d + u - up * v)` with `c = diffuse_rate * time_step`.
//! For a Fourier mode `exp(i (θx x + θy y))` one pass multiplies the amplitude by
//!
//! `A = 1 - c * up + c * (2 cos θx + (1 + down) cos θy) + i c (1 - down) sin θy`
//!
//! and the field stays bounded as long as `|A| <= 1` for every mode.
//! The absorbing floor only removes density, so it cannot make an unstable set stable.

use std::f32::consts::PI;
use crate::params::DiffusionParameters;

const MODES_PER_AXIS: usize = 64;
const TOLERANCE: f32 = 1e-4;

/// Magnitude of the amplification factor of one mode
pub fn amplification(params: &DiffusionParameters, theta_x: f32, theta_y: f32) -> f32 {
    let c = params.rate();
    let real = 1.0 - c * params.up_mult
        + c * (2.0 * theta_x.cos() + (1.0 + params.down_mult) * theta_y.cos());
    let imaginary = c * (1.0 - params.down_mult) * theta_y.sin();

    (real * real + imaginary * imaginary).sqrt()
}

/// Largest amplification over a grid of modes covering `[0, π] x [-π, π]`
pub fn max_amplification(params: &DiffusionParameters) -> f32 {
    let mut max = 0.0f32;
    for i in 0..=MODES_PER_AXIS {
        let theta_x = PI * i as f32 / MODES_PER_AXIS as f32;
        for j in 0..=2 * MODES_PER_AXIS {
            let theta_y = PI * (j as f32 / MODES_PER_AXIS as f32 - 1.0);
            max = max.max(amplification(params, theta_x, theta_y));
        }
    }

    max
}

pub fn is_stable(params: &DiffusionParameters) -> bool {
    max_amplification(params) <= 1.0 + TOLERANCE
}

/// Whether every pass is a weighted average of the old values
///
/// When the weight kept by a pixel (`1 - c * up`) is non-negative and all the
/// weights sum to at most one, no pixel can ever exceed the current maximum.
pub fn convex(params: &DiffusionParameters) -> bool {
    let c = params.rate();
    let own = 1.0 - c * params.up_mult;
    let total = own + c * (3.0 + params.down_mult);

    own >= 0.0 && total <= 1.0 + TOLERANCE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_neutrally_stable() {
        let params = DiffusionParameters::default();
        assert!((amplification(&params, 0.0, 0.0) - 1.0).abs() < 1e-5);
        assert!(is_stable(&params));
        assert!(convex(&params));
    }

    #[test]
    fn weak_self_weight_grows_the_flat_mode() {
        let params = DiffusionParameters { up_mult: 4.0, ..Default::default() };
        assert!(amplification(&params, 0.0, 0.0) > 1.2);
        assert!(!is_stable(&params));
        assert!(!convex(&params));
    }

    #[test]
    fn aggressive_rates_blow_up_the_checkerboard() {
        let params = DiffusionParameters {
            diffuse_rate: 12.0,
            time_step: 0.1,
            ..Default::default()
        };
        assert!(amplification(&params, PI, PI) > 10.0);
        assert!(!is_stable(&params));
    }

    #[test]
    fn disabled_diffusion_is_identity() {
        let params = DiffusionParameters { diffuse_rate: 0.0, ..Default::default() };
        assert!((max_amplification(&params) - 1.0).abs() < 1e-6);
        assert!(is_stable(&params));
    }

    #[test]
    fn stronger_self_weight_damps_everything() {
        let params = DiffusionParameters { up_mult: 7.0, ..Default::default() };
        assert!(amplification(&params, 0.0, 0.0) < 1.0);
        assert!(is_stable(&params));
    }
}
