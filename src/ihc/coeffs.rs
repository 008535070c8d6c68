//! Compiled IHC constants (per-sample rates, equilibrium points, output scaling).

/// Scalar constants shared by every channel of one ear.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IhcCoeffs {
    pub just_half_wave_rectify: bool,
    pub one_capacitor: bool,
    /// One-pole AC-coupling rate: 2*pi*ac_corner_hz/fs.
    pub ac_coeff: f32,
    /// Output LPF rate: 1 - exp(-1/(tau_lpf*fs)).
    pub lpf_coeff: f32,
    pub out1_rate: f32,
    pub in1_rate: f32,
    /// Two-capacitor model only; zero otherwise.
    pub out2_rate: f32,
    pub in2_rate: f32,
    pub output_gain: f32,
    /// Output at rest; subtracted so silence maps to zero.
    pub rest_output: f32,
    pub rest_cap1: f32,
    pub rest_cap2: f32,
    /// Unscaled transmitter release at full saturation.
    pub saturation_output: f32,
}

impl IhcCoeffs {
    /// Output level (after gain and rest offset) reached at full saturation.
    ///
    /// Used to normalize the AGC detect scale; 1 by construction.
    #[inline]
    pub fn saturation_level(&self) -> f32 {
        self.output_gain * self.saturation_output - self.rest_output
    }
}
