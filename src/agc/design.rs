//! Derive per-stage temporal rates and spatial kernels from time constants and spreads.

use tracing::{debug, warn};

use super::{AgcCoeffs, AgcParams, AgcStageCoeffs, SpatialFir, MAX_SPATIAL_ITERATIONS};
use crate::error::DesignError;

/// Closed-form kernel `[left, mid, right]` whose single pass has the given
/// mean and variance (offsets in channels). 3 taps: `[a, 1-a-b, b]`;
/// 5 taps: `[a/2, 1-a-b, b/2]` with each outer weight on two neighbors.
pub fn spatial_fir_coeffs(n_taps: usize, mean: f32, variance: f32) -> Result<[f32; 3], DesignError> {
    let second = variance + mean * mean;
    match n_taps {
        3 => {
            let a = (second - mean) / 2.0;
            let b = (second + mean) / 2.0;
            Ok([a, 1.0 - a - b, b])
        }
        5 => {
            let a = (second * 2.0 / 5.0 - mean * 2.0 / 3.0) / 2.0;
            let b = (second * 2.0 / 5.0 + mean * 2.0 / 3.0) / 2.0;
            Ok([a / 2.0, 1.0 - a - b, b / 2.0])
        }
        n_taps => Err(DesignError::UnsupportedTapCount { n_taps }),
    }
}

/// Smallest kernel reproducing `delay` / `spread_sq` after `n_iterations` passes.
///
/// Tries 3 taps at one pass, then 5 taps at 1..=16 passes, splitting the
/// target moments evenly across passes. `None` when nothing qualifies.
pub fn design_spatial_fir(delay: f32, spread_sq: f32) -> Option<SpatialFir> {
    let candidates = std::iter::once((3usize, 1usize))
        .chain((1..=MAX_SPATIAL_ITERATIONS).map(|n| (5usize, n)));
    for (n_taps, n_iterations) in candidates {
        let n = n_iterations as f32;
        let coeffs = spatial_fir_coeffs(n_taps, delay / n, spread_sq / n).ok()?;
        let min_mid = if n_taps == 3 { 0.2 } else { 0.1 };
        if coeffs[1] >= min_mid {
            return Some(SpatialFir {
                n_taps,
                coeffs,
                n_iterations,
            });
        }
    }
    None
}

/// Design all AGC stages.
///
/// `ihc_saturation_level` is the IHC output at full saturation; the entry
/// scale is `params.detect_scale / (total_dc_gain * ihc_saturation_level)`.
pub fn design_agc(params: &AgcParams, fs: f32, ihc_saturation_level: f32) -> Result<AgcCoeffs, DesignError> {
    params.validate()?;
    if !fs.is_finite() || fs <= 0.0 {
        return Err(DesignError::InvalidSampleRate { fs });
    }

    let mut stages = Vec::with_capacity(params.n_stages());
    let mut decim = 1usize;
    let mut total_dc_gain = 0.0f32;

    for stage in 0..params.n_stages() {
        let tau = params.time_constants[stage];
        decim *= params.decimation[stage];
        let decim_f = decim as f32;

        let epsilon = 1.0 - (-decim_f / (tau * fs)).exp();
        let n_times = tau * fs / decim_f;
        let agc1 = params.agc1_scales[stage];
        let agc2 = params.agc2_scales[stage];
        let delay = (agc2 - agc1) / n_times;
        let spread_sq = (agc1 * agc1 + agc2 * agc2) / n_times;

        let u = 1.0 + 1.0 / spread_sq;
        let p = u - (u * u - 1.0).sqrt();
        let dp = delay * (1.0 - 2.0 * p + p * p) / 2.0;

        let spatial = design_spatial_fir(delay, spread_sq).ok_or(DesignError::AgcFirDesign { stage })?;

        total_dc_gain += params.agc_stage_gain.powi(stage as i32);
        let mix_coeff = if stage == 0 {
            0.0
        } else {
            params.agc_mix_coeff / n_times
        };

        let coeffs = AgcStageCoeffs {
            decimation: params.decimation[stage],
            epsilon,
            stage_gain: params.agc_stage_gain,
            pole_z1: p - dp,
            pole_z2: p + dp,
            spatial,
            mix_coeff,
            detect_scale: 1.0,
        };
        debug!(
            target: "carfac::agc",
            "stage={} decim={} epsilon={:.6} n_taps={} n_iterations={} double_exp={}",
            stage,
            decim,
            epsilon,
            spatial.n_taps,
            spatial.n_iterations,
            coeffs.uses_double_exponential()
        );
        if coeffs.uses_double_exponential() {
            warn!(
                target: "carfac::agc",
                "stage {stage}: spatial spread needs {} FIR passes, using double-exponential smoother",
                spatial.n_iterations
            );
        } else if spatial.n_iterations > 1 {
            warn!(
                target: "carfac::agc",
                "stage {stage}: spatial FIR needs {} passes per update",
                spatial.n_iterations
            );
        }
        stages.push(coeffs);
    }

    let detect_scale = params.detect_scale / (total_dc_gain * ihc_saturation_level);
    if !detect_scale.is_finite() || detect_scale <= 0.0 {
        return Err(DesignError::InvalidParam {
            name: "ihc_saturation_level",
            value: ihc_saturation_level,
        });
    }
    for s in &mut stages {
        s.detect_scale = detect_scale;
    }

    Ok(AgcCoeffs {
        stages,
        total_dc_gain,
    })
}
