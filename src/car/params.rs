//! User-facing CAR parameters (Hz, radians, damping ratios).

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

use crate::core::erb::{GLASBERG_MOORE_Q, GREENWOOD_BREAK_HZ};

/// Cascade parameters; also drive the channel ladder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarParams {
    /// Scales basilar-membrane velocity into the OHC nonlinearity.
    pub velocity_scale: f32,
    /// Velocity offset; gives the nonlinearity its quadratic part.
    pub v_offset: f32,
    /// Minimum damping factor in mid-frequency channels.
    pub min_zeta: f32,
    /// Maximum damping factor in mid-frequency channels.
    pub max_zeta: f32,
    /// Top pole angle in radians (0..PI).
    pub first_pole_theta: f32,
    /// How far the zero sits above the pole.
    pub zero_ratio: f32,
    /// 0..1, compresses theta toward Nyquist.
    pub high_f_damping_compression: f32,
    /// Ladder spacing in ERB units.
    pub erb_per_step: f32,
    /// Ladder floor in Hz.
    pub min_pole_hz: f32,
    /// ERB break frequency in Hz (Greenwood map).
    pub erb_break_freq: f32,
    /// ERB high-cf Q.
    pub erb_q: f32,
}

impl Default for CarParams {
    fn default() -> Self {
        Self {
            velocity_scale: 0.1,
            v_offset: 0.04,
            min_zeta: 0.1,
            max_zeta: 0.35,
            first_pole_theta: 0.85 * PI,
            zero_ratio: std::f32::consts::SQRT_2,
            high_f_damping_compression: 0.5,
            erb_per_step: 0.5,
            min_pole_hz: 30.0,
            erb_break_freq: GREENWOOD_BREAK_HZ,
            erb_q: GLASBERG_MOORE_Q,
        }
    }
}
