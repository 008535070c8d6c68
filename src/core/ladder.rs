//! Channel-frequency ladder (pole frequencies in Hz).
//!
//! Starts at the top pole and steps down by `erb_per_step` ERBs until the
//! floor is reached. Index 0 is the base (highest frequency), the last index
//! the apex.

use std::f32::consts::PI;

use crate::car::CarParams;
use crate::core::erb::erb_hz;
use crate::error::DesignError;

/// Hard cap on ladder length; anything longer is a configuration mistake.
pub const MAX_CHANNELS: usize = 4096;

/// Strictly decreasing pole frequencies, one per cochlear channel.
#[derive(Clone, Debug, PartialEq)]
pub struct ChannelLadder {
    pub fs: f32,
    pub pole_freqs: Vec<f32>,
}

impl ChannelLadder {
    /// Build the ladder for `fs` from the CAR parameters.
    pub fn design(fs: f32, params: &CarParams) -> Result<Self, DesignError> {
        if !fs.is_finite() || fs <= 0.0 {
            return Err(DesignError::InvalidSampleRate { fs });
        }
        let step = params.erb_per_step;
        if !step.is_finite() || step <= 0.0 {
            return Err(DesignError::InvalidErbStep { erb_per_step: step });
        }
        let (brk, q) = (params.erb_break_freq, params.erb_q);
        // The recursion converges on -brk, so the floor must sit above it.
        if !q.is_finite() || q <= 0.0 || !brk.is_finite() || brk + params.min_pole_hz <= 0.0 {
            return Err(DesignError::InvalidErbParams {
                erb_break_freq: brk,
                erb_q: q,
            });
        }
        if !params.min_pole_hz.is_finite() {
            return Err(DesignError::InvalidParam {
                name: "min_pole_hz",
                value: params.min_pole_hz,
            });
        }

        let first_pole_hz = params.first_pole_theta * fs / (2.0 * PI);
        let mut pole_hz = first_pole_hz;
        let mut pole_freqs = Vec::new();
        while pole_hz > params.min_pole_hz {
            if pole_freqs.len() == MAX_CHANNELS {
                return Err(DesignError::TooManyChannels {
                    limit: MAX_CHANNELS,
                });
            }
            pole_freqs.push(pole_hz);
            pole_hz -= step * erb_hz(pole_hz, brk, q);
        }
        if pole_freqs.is_empty() {
            return Err(DesignError::EmptyLadder {
                first_pole_hz,
                min_pole_hz: params.min_pole_hz,
            });
        }
        Ok(Self { fs, pole_freqs })
    }

    /// Number of channels.
    #[inline]
    pub fn n_channels(&self) -> usize {
        self.pole_freqs.len()
    }

    #[inline]
    pub fn assert_scan_len<T>(&self, scan: &[T]) {
        debug_assert_eq!(scan.len(), self.n_channels());
    }

    /// `log(2) / log(f0 / f1)`; `None` with fewer than two channels.
    pub fn max_channels_per_octave(&self) -> Option<f32> {
        match self.pole_freqs.as_slice() {
            [f0, f1, ..] => Some(2f32.ln() / (f0 / f1).ln()),
            _ => None,
        }
    }

    /// Pole angle `2*pi*f/fs` of channel `ch`.
    #[inline]
    pub fn theta(&self, ch: usize) -> f32 {
        2.0 * PI * self.pole_freqs[ch] / self.fs
    }
}
