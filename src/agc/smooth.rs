//! In-place spatial smoothing across channels. Edges clamp the neighbor index,
//! so boundary channels reuse their own value instead of reading out of range.

use super::AgcStageCoeffs;

/// 3-tap pass: `out[i] = l*x[i-1] + m*x[i] + r*x[i+1]`.
pub fn fir3(x: &mut [f32], [l, m, r]: [f32; 3], scratch: &mut [f32]) {
    let n = x.len();
    if n == 0 {
        return;
    }
    let scratch = &mut scratch[..n];
    scratch.copy_from_slice(x);
    let last = n - 1;
    for i in 0..n {
        x[i] = l * scratch[i.saturating_sub(1)] + m * scratch[i] + r * scratch[(i + 1).min(last)];
    }
}

/// 5-tap pass: `out[i] = l*(x[i-2] + x[i-1]) + m*x[i] + r*(x[i+1] + x[i+2])`.
pub fn fir5(x: &mut [f32], [l, m, r]: [f32; 3], scratch: &mut [f32]) {
    let n = x.len();
    if n == 0 {
        return;
    }
    let scratch = &mut scratch[..n];
    scratch.copy_from_slice(x);
    let last = n - 1;
    for i in 0..n {
        let left = scratch[i.saturating_sub(2)] + scratch[i.saturating_sub(1)];
        let right = scratch[(i + 1).min(last)] + scratch[(i + 2).min(last)];
        x[i] = l * left + m * scratch[i] + r * right;
    }
}

/// Forward/backward/forward one-pole sweep approximating a wide two-sided kernel.
/// The running state is warmed up on the last (up to) 11 channels.
pub fn double_exponential(x: &mut [f32], pole_z1: f32, pole_z2: f32) {
    let n = x.len();
    let k1 = 1.0 - pole_z1;
    let k2 = 1.0 - pole_z2;
    let mut state = 0.0f32;
    for &v in &x[n.saturating_sub(11)..] {
        state += k1 * (v - state);
    }
    for v in x.iter_mut().rev() {
        state += k2 * (*v - state);
        *v = state;
    }
    for v in x.iter_mut() {
        state += k1 * (*v - state);
        *v = state;
    }
}

/// Apply the stage's designed smoother to `memory`.
#[inline]
pub fn spatial_smooth(stage: &AgcStageCoeffs, memory: &mut [f32], scratch: &mut [f32]) {
    if stage.uses_double_exponential() {
        double_exponential(memory, stage.pole_z1, stage.pole_z2);
        return;
    }
    let fir = stage.spatial;
    for _ in 0..fir.n_iterations {
        if fir.n_taps == 5 {
            fir5(memory, fir.coeffs, scratch);
        } else {
            fir3(memory, fir.coeffs, scratch);
        }
    }
}
