//! User-facing IHC parameters (sec, Hz).

use serde::{Deserialize, Serialize};

/// Transduction parameters. The `tau1_*`/`tau2_*` pair is only read when
/// `one_capacitor` is false; `tau_out`/`tau_in` only when it is true.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IhcParams {
    /// Collapse the model to an AC-coupled rectifier clipped to [0, 2].
    pub just_half_wave_rectify: bool,
    pub one_capacitor: bool,
    /// Output smoothing time constant.
    pub tau_lpf: f32,
    pub tau_out: f32,
    pub tau_in: f32,
    pub tau1_out: f32,
    pub tau1_in: f32,
    pub tau2_out: f32,
    pub tau2_in: f32,
    /// AC-coupling high-pass corner in Hz.
    pub ac_corner_hz: f32,
}

impl Default for IhcParams {
    fn default() -> Self {
        Self {
            just_half_wave_rectify: false,
            one_capacitor: true,
            tau_lpf: 80e-6,
            tau_out: 0.5e-3,
            tau_in: 10e-3,
            tau1_out: 10e-3,
            tau1_in: 20e-3,
            tau2_out: 2.5e-3,
            tau2_in: 5e-3,
            ac_corner_hz: 20.0,
        }
    }
}
