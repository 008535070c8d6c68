//! Compiled per-stage AGC coefficients.

use super::DOUBLE_EXPONENTIAL_MIN_ITERATIONS;

/// Spatial FIR descriptor.
///
/// `coeffs` is `[left, mid, right]`. With 5 taps the outer weights apply to
/// both neighbors on their side: `left*(x[i-2] + x[i-1]) + mid*x[i] + right*(x[i+1] + x[i+2])`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialFir {
    pub n_taps: usize,
    pub coeffs: [f32; 3],
    pub n_iterations: usize,
}

impl SpatialFir {
    /// Offset-weighted (mean, variance) of one pass of the kernel, in channels.
    pub fn moments(&self) -> (f32, f32) {
        let [l, m, r] = self.coeffs;
        let five = [(-2.0, l), (-1.0, l), (0.0, m), (1.0, r), (2.0, r)];
        let three = [(-1.0, l), (0.0, m), (1.0, r)];
        let taps: &[(f32, f32)] = if self.n_taps == 5 { &five } else { &three };
        let mean: f32 = taps.iter().map(|&(k, w)| k * w).sum();
        let second: f32 = taps.iter().map(|&(k, w)| k * k * w).sum();
        (mean, second - mean * mean)
    }
}

/// One AGC stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgcStageCoeffs {
    /// Decimation relative to the previous stage (or the input for stage 0).
    pub decimation: usize,
    /// Temporal smoothing rate per stage tick.
    pub epsilon: f32,
    /// Gain applied to the next stage's memory when fed back into this one.
    pub stage_gain: f32,
    pub pole_z1: f32,
    pub pole_z2: f32,
    pub spatial: SpatialFir,
    /// Cross-ear mixing rate; 0 for stage 0.
    pub mix_coeff: f32,
    /// Input scale applied at AGC entry (read from the last stage).
    pub detect_scale: f32,
}

impl AgcStageCoeffs {
    #[inline]
    pub fn uses_double_exponential(&self) -> bool {
        self.spatial.n_iterations >= DOUBLE_EXPONENTIAL_MIN_ITERATIONS
    }
}

/// All stages, fast to slow.
#[derive(Debug, Clone, PartialEq)]
pub struct AgcCoeffs {
    pub stages: Vec<AgcStageCoeffs>,
    /// Sum of `stage_gain^stage` over the stages.
    pub total_dc_gain: f32,
}

impl AgcCoeffs {
    #[inline]
    pub fn n_stages(&self) -> usize {
        self.stages.len()
    }

    /// Input scale at AGC entry.
    #[inline]
    pub fn detect_scale(&self) -> f32 {
        self.stages.last().map_or(1.0, |s| s.detect_scale)
    }

    /// Decimation of stage 0, the loop-closure ramp length in samples.
    #[inline]
    pub fn first_decimation(&self) -> usize {
        self.stages.first().map_or(1, |s| s.decimation)
    }
}
