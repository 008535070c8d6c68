//! Analytic stage / channel transfer functions of the cascade (design-time diagnostics).
//!
//! From the rotate-and-ripple equations with a fixed radius `r = r1 + zr*u`:
//! H(z) = g * (1 + h*r*c0*z^-1 / (1 - 2*r*a0*z^-1 + r^2*z^-2)), z = e^{jw}.
//! The OHC nonlinearity is treated as 1 (small-signal response).

use rustfft::num_complex::Complex32;
use std::f32::consts::PI;

use super::CarCoeffs;

/// Complex response of stage `ch` alone at `freq_hz`.
pub fn stage_transfer(
    coeffs: &CarCoeffs,
    ch: usize,
    relative_undamping: f32,
    freq_hz: f32,
    fs: f32,
) -> Complex32 {
    let r = coeffs.r1[ch] + coeffs.zr[ch] * relative_undamping;
    let g = coeffs.stage_g(ch, relative_undamping);
    let w = 2.0 * PI * freq_hz / fs;
    let zi = Complex32::from_polar(1.0, -w);
    let one = Complex32::new(1.0, 0.0);

    // 1 - 2r*a0*z^-1 + r^2*z^-2, regrouped to stay accurate when r and a0 approach 1.
    let pole = one - zi * r;
    let den = pole * pole + zi * (2.0 * r * (1.0 - coeffs.a0[ch]));
    let zero = zi * (coeffs.h[ch] * r * coeffs.c0[ch]) / den;
    (one + zero) * g
}

/// Response at the output tap of channel `ch`: product of stages `0..=ch`.
pub fn channel_transfer(
    coeffs: &CarCoeffs,
    ch: usize,
    relative_undamping: f32,
    freq_hz: f32,
    fs: f32,
) -> Complex32 {
    (0..=ch).fold(Complex32::new(1.0, 0.0), |acc, stage| {
        acc * stage_transfer(coeffs, stage, relative_undamping, freq_hz, fs)
    })
}

/// Channel gain magnitude in dB over `freqs_hz`.
pub fn channel_gain_db(
    coeffs: &CarCoeffs,
    ch: usize,
    relative_undamping: f32,
    freqs_hz: &[f32],
    fs: f32,
) -> Vec<f32> {
    freqs_hz
        .iter()
        .map(|&f| 20.0 * channel_transfer(coeffs, ch, relative_undamping, f, fs).norm().log10())
        .collect()
}
