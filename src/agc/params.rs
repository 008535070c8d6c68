//! User-facing AGC parameters (sec, per-stage arrays ordered fast to slow).

use serde::{Deserialize, Serialize};

use crate::error::DesignError;

/// Per-stage arrays must all have the same length (the stage count).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgcParams {
    /// Temporal smoothing time constant per stage, in seconds.
    pub time_constants: Vec<f32>,
    /// Decimation of each stage relative to the previous one.
    pub decimation: Vec<usize>,
    /// Spatial spread toward the base per stage, in channels.
    pub agc1_scales: Vec<f32>,
    /// Spatial spread toward the apex per stage, in channels.
    pub agc2_scales: Vec<f32>,
    /// Feedback gain from each stage into the faster one.
    pub agc_stage_gain: f32,
    /// Cross-ear mixing strength (only used with two or more ears).
    pub agc_mix_coeff: f32,
    /// Entry gain on the IHC output, before DC-gain and saturation normalization.
    pub detect_scale: f32,
}

impl Default for AgcParams {
    fn default() -> Self {
        Self {
            time_constants: vec![0.002, 0.008, 0.032, 0.128],
            decimation: vec![8, 2, 2, 2],
            agc1_scales: vec![1.0, 1.4, 2.0, 2.8],
            agc2_scales: vec![1.6, 2.25, 3.2, 4.5],
            agc_stage_gain: 2.0,
            agc_mix_coeff: 0.5,
            detect_scale: 1.0,
        }
    }
}

impl AgcParams {
    #[inline]
    pub fn n_stages(&self) -> usize {
        self.time_constants.len()
    }

    /// Structural checks: stage count, array lengths, decimation and time constants.
    /// Time constants must grow strictly from stage to stage.
    pub fn validate(&self) -> Result<(), DesignError> {
        let n = self.n_stages();
        if n == 0 {
            return Err(DesignError::NoAgcStages);
        }
        for (field, got) in [
            ("decimation", self.decimation.len()),
            ("agc1_scales", self.agc1_scales.len()),
            ("agc2_scales", self.agc2_scales.len()),
        ] {
            if got != n {
                return Err(DesignError::AgcStageMismatch {
                    field,
                    expected: n,
                    got,
                });
            }
        }
        let mut prev_tau = 0.0f32;
        for (stage, (&tau, &decimation)) in self.time_constants.iter().zip(&self.decimation).enumerate() {
            if decimation == 0 {
                return Err(DesignError::InvalidDecimation { stage, decimation });
            }
            if !tau.is_finite() || tau <= prev_tau {
                return Err(DesignError::InvalidTimeConstant { stage, tau });
            }
            prev_tau = tau;
        }
        for (name, value) in [
            ("agc_stage_gain", self.agc_stage_gain),
            ("agc_mix_coeff", self.agc_mix_coeff),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(DesignError::InvalidParam { name, value });
            }
        }
        if !self.detect_scale.is_finite() || self.detect_scale <= 0.0 {
            return Err(DesignError::InvalidParam {
                name: "detect_scale",
                value: self.detect_scale,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(AgcParams::default().validate(), Ok(()));
        assert_eq!(AgcParams::default().n_stages(), 4);
    }

    #[test]
    fn empty_stage_list_is_rejected() {
        let p = AgcParams {
            time_constants: vec![],
            decimation: vec![],
            agc1_scales: vec![],
            agc2_scales: vec![],
            ..AgcParams::default()
        };
        assert_eq!(p.validate(), Err(DesignError::NoAgcStages));
    }

    #[test]
    fn length_mismatch_names_the_field() {
        let p = AgcParams {
            agc2_scales: vec![1.6, 2.25],
            ..AgcParams::default()
        };
        assert_eq!(
            p.validate(),
            Err(DesignError::AgcStageMismatch {
                field: "agc2_scales",
                expected: 4,
                got: 2
            })
        );
    }

    #[test]
    fn zero_decimation_and_bad_tau_are_rejected() {
        let p = AgcParams {
            decimation: vec![8, 0, 2, 2],
            ..AgcParams::default()
        };
        assert_eq!(
            p.validate(),
            Err(DesignError::InvalidDecimation {
                stage: 1,
                decimation: 0
            })
        );
        let p = AgcParams {
            time_constants: vec![0.002, 0.008, -1.0, 0.128],
            ..AgcParams::default()
        };
        assert_eq!(
            p.validate(),
            Err(DesignError::InvalidTimeConstant { stage: 2, tau: -1.0 })
        );
    }

    #[test]
    fn time_constants_must_grow_by_stage() {
        let p = AgcParams {
            time_constants: vec![0.002, 0.008, 0.008, 0.128],
            ..AgcParams::default()
        };
        assert_eq!(
            p.validate(),
            Err(DesignError::InvalidTimeConstant { stage: 2, tau: 0.008 })
        );
        let p = AgcParams {
            time_constants: vec![0.128, 0.032, 0.008, 0.002],
            ..AgcParams::default()
        };
        assert_eq!(
            p.validate(),
            Err(DesignError::InvalidTimeConstant { stage: 1, tau: 0.032 })
        );
    }

    #[test]
    fn detect_scale_must_be_positive() {
        for bad in [0.0f32, -0.25] {
            let p = AgcParams {
                detect_scale: bad,
                ..AgcParams::default()
            };
            assert_eq!(
                p.validate(),
                Err(DesignError::InvalidParam {
                    name: "detect_scale",
                    value: bad
                })
            );
        }
        let p = AgcParams {
            detect_scale: f32::NAN,
            ..AgcParams::default()
        };
        assert!(matches!(
            p.validate(),
            Err(DesignError::InvalidParam { name: "detect_scale", .. })
        ));
    }
}
