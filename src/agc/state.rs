//! Per-ear AGC state and the recursive multi-rate update.

use super::smooth::spatial_smooth;
use super::{AgcCoeffs, AgcStageCoeffs};

/// Memories of one stage.
#[derive(Debug, Clone, PartialEq)]
pub struct AgcStageState {
    /// Counts 0..decimation-1; the stage updates when it wraps to 0.
    pub decim_phase: usize,
    pub input_accum: Vec<f32>,
    pub agc_memory: Vec<f32>,
}

/// All stages of one ear plus smoothing scratch.
#[derive(Debug, Clone, PartialEq)]
pub struct AgcState {
    pub stages: Vec<AgcStageState>,
    scratch: Vec<f32>,
}

impl AgcState {
    pub fn new(coeffs: &AgcCoeffs, n_channels: usize) -> Self {
        let stages = (0..coeffs.n_stages())
            .map(|_| AgcStageState {
                decim_phase: 0,
                input_accum: vec![0.0; n_channels],
                agc_memory: vec![0.0; n_channels],
            })
            .collect();
        Self {
            stages,
            scratch: vec![0.0; n_channels],
        }
    }

    pub fn reset(&mut self) {
        for s in &mut self.stages {
            s.decim_phase = 0;
            s.input_accum.fill(0.0);
            s.agc_memory.fill(0.0);
        }
        self.scratch.fill(0.0);
    }

    /// Smoothed memory of `stage`.
    #[inline]
    pub fn memory(&self, stage: usize) -> &[f32] {
        &self.stages[stage].agc_memory
    }

    /// Feed one frame of IHC output. Returns true when stage 0 updated.
    pub fn step(&mut self, coeffs: &AgcCoeffs, ihc_out: &[f32]) -> bool {
        assert_eq!(ihc_out.len(), self.scratch.len(), "AGC input width mismatch");
        debug_assert_eq!(self.stages.len(), coeffs.n_stages());
        recurse(
            &mut self.stages,
            &coeffs.stages,
            ihc_out,
            coeffs.detect_scale(),
            &mut self.scratch,
        )
    }
}

/// Accumulate into the first stage of `stages`; on its tick, recurse into the
/// slower stages, mix back their memory, then smooth in time and space.
fn recurse(
    stages: &mut [AgcStageState],
    coeffs: &[AgcStageCoeffs],
    agc_in: &[f32],
    scale: f32,
    scratch: &mut [f32],
) -> bool {
    let (Some((state, slower)), Some(c)) = (stages.split_first_mut(), coeffs.first()) else {
        return false;
    };

    state.decim_phase = (state.decim_phase + 1) % c.decimation;
    for (acc, &x) in state.input_accum.iter_mut().zip(agc_in) {
        *acc += scale * x;
    }
    if state.decim_phase != 0 {
        return false;
    }

    // input_accum now holds this stage's decimated input until it is cleared below.
    let inv_decim = 1.0 / c.decimation as f32;
    state.input_accum.iter_mut().for_each(|v| *v *= inv_decim);

    if !slower.is_empty() {
        recurse(slower, &coeffs[1..], &state.input_accum, 1.0, scratch);
        for (v, &m) in state.input_accum.iter_mut().zip(&slower[0].agc_memory) {
            *v += c.stage_gain * m;
        }
    }

    for (m, acc) in state.agc_memory.iter_mut().zip(state.input_accum.iter_mut()) {
        *m += c.epsilon * (*acc - *m);
        *acc = 0.0;
    }
    spatial_smooth(c, &mut state.agc_memory, scratch);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agc::{design_agc, AgcParams};

    const FS: f32 = 22_050.0;

    fn coeffs() -> AgcCoeffs {
        design_agc(&AgcParams::default(), FS, 1.0).unwrap()
    }

    #[test]
    fn stage_zero_fires_once_per_decimation_period() {
        let c = coeffs();
        let mut s = AgcState::new(&c, 6);
        let input = [0.5f32; 6];
        let fired: Vec<bool> = (0..64).map(|_| s.step(&c, &input)).collect();
        for window in fired.windows(8) {
            assert_eq!(window.iter().filter(|&&f| f).count(), 1);
        }
        assert!(fired[7] && !fired[0]);
    }

    #[test]
    fn slower_stages_fire_at_cumulative_decimation() {
        let c = coeffs();
        let mut s = AgcState::new(&c, 6);
        let input = [0.5f32; 6];
        let mut changes = [0usize; 4];
        for _ in 0..256 {
            let before: Vec<Vec<f32>> = (0..4).map(|k| s.memory(k).to_vec()).collect();
            s.step(&c, &input);
            for (k, prev) in before.iter().enumerate() {
                if prev.as_slice() != s.memory(k) {
                    changes[k] += 1;
                }
            }
        }
        assert_eq!(changes, [32, 16, 8, 4]);
    }

    #[test]
    fn memory_stays_bounded_for_saturated_input() {
        let c = coeffs();
        let mut s = AgcState::new(&c, 10);
        // Saturated IHC output scaled by detect_scale drives the loop toward 1.
        let input = [1.0f32; 10];
        for _ in 0..(FS as usize) {
            s.step(&c, &input);
        }
        for k in 0..4 {
            assert!(s.memory(k).iter().all(|&v| v > 0.0 && v <= 1.0 + 1e-4), "stage {k}");
        }
    }

    #[test]
    fn tiny_channel_counts_step_safely() {
        let c = coeffs();
        for n in [1usize, 2] {
            let mut s = AgcState::new(&c, n);
            let input = vec![0.3f32; n];
            for _ in 0..512 {
                s.step(&c, &input);
            }
            assert!(s.memory(0).iter().all(|v| v.is_finite() && *v > 0.0));
        }
    }

    #[test]
    fn reset_clears_phase_and_memory() {
        let c = coeffs();
        let mut s = AgcState::new(&c, 4);
        for _ in 0..37 {
            s.step(&c, &[0.2; 4]);
        }
        s.reset();
        assert_eq!(s, AgcState::new(&c, 4));
    }
}
