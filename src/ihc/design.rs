//! Solve IHC rates and rest equilibria from time constants.

use std::f32::consts::PI;

use super::{IhcCoeffs, IhcParams};
use crate::error::DesignError;

/// Detection nonlinearity: transmitter-release conductance for drive `x`.
///
/// `s = max(0, x + 0.175)`, `conductance = s^3 / (s^3 + s^2 + 0.1)`.
/// Zero for `x <= -0.175`, rising smoothly to 1 at large drive.
#[inline]
pub fn carfac_detect(x: f32) -> f32 {
    let s = (x + 0.175).max(0.0);
    let z = s * s * s;
    z / (z + s * s + 0.1)
}

/// Design IHC coefficients for sample rate `fs`.
pub fn design_ihc(params: &IhcParams, fs: f32) -> Result<IhcCoeffs, DesignError> {
    if !fs.is_finite() || fs <= 0.0 {
        return Err(DesignError::InvalidSampleRate { fs });
    }
    check_non_negative("ac_corner_hz", params.ac_corner_hz)?;
    let ac_coeff = 2.0 * PI * params.ac_corner_hz / fs;

    if params.just_half_wave_rectify {
        return Ok(IhcCoeffs {
            just_half_wave_rectify: true,
            one_capacitor: params.one_capacitor,
            ac_coeff,
            lpf_coeff: 0.0,
            out1_rate: 0.0,
            in1_rate: 0.0,
            out2_rate: 0.0,
            in2_rate: 0.0,
            output_gain: 1.0,
            rest_output: 0.0,
            rest_cap1: 0.0,
            rest_cap2: 0.0,
            saturation_output: 1.0,
        });
    }

    check_positive("tau_lpf", params.tau_lpf)?;
    let lpf_coeff = 1.0 - (-1.0 / (params.tau_lpf * fs)).exp();
    let ro = 1.0 / carfac_detect(10.0);
    let r0 = 1.0 / carfac_detect(0.0);

    let mut c = IhcCoeffs {
        just_half_wave_rectify: false,
        one_capacitor: params.one_capacitor,
        ac_coeff,
        lpf_coeff,
        out1_rate: 0.0,
        in1_rate: 0.0,
        out2_rate: 0.0,
        in2_rate: 0.0,
        output_gain: 0.0,
        rest_output: 0.0,
        rest_cap1: 0.0,
        rest_cap2: 0.0,
        saturation_output: 0.0,
    };

    let current = if params.one_capacitor {
        check_positive("tau_out", params.tau_out)?;
        check_positive("tau_in", params.tau_in)?;
        let cap = params.tau_out / ro;
        let ri = params.tau_in / cap;
        let current = 1.0 / (ri + r0);
        c.saturation_output = 1.0 / (2.0 * ro + ri);
        c.rest_cap1 = 1.0 - current * ri;
        c.out1_rate = ro / (params.tau_out * fs);
        c.in1_rate = 1.0 / (params.tau_in * fs);
        current
    } else {
        check_positive("tau1_out", params.tau1_out)?;
        check_positive("tau1_in", params.tau1_in)?;
        check_positive("tau2_out", params.tau2_out)?;
        check_positive("tau2_in", params.tau2_in)?;
        let c2 = params.tau2_out / ro;
        let r2 = params.tau2_in / c2;
        let c1 = params.tau1_out / r2;
        let r1 = params.tau1_in / c1;
        let current = 1.0 / (r1 + r2 + r0);
        c.saturation_output = 1.0 / (2.0 * ro + r2 + r1);
        c.rest_cap1 = 1.0 - current * r1;
        c.rest_cap2 = c.rest_cap1 - current * r2;
        c.out1_rate = 1.0 / (params.tau1_out * fs);
        c.in1_rate = 1.0 / (params.tau1_in * fs);
        c.out2_rate = ro / (params.tau2_out * fs);
        c.in2_rate = 1.0 / (params.tau2_in * fs);
        current
    };

    c.output_gain = 1.0 / (c.saturation_output - current);
    c.rest_output = current / (c.saturation_output - current);
    Ok(c)
}

fn check_positive(name: &'static str, value: f32) -> Result<(), DesignError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(DesignError::InvalidParam { name, value })
    }
}

fn check_non_negative(name: &'static str, value: f32) -> Result<(), DesignError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(DesignError::InvalidParam { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn detect_is_zero_below_offset_and_saturates() {
        assert_eq!(carfac_detect(-0.2), 0.0);
        assert_eq!(carfac_detect(-1.0), 0.0);
        assert!(carfac_detect(0.0) > 0.0);
        assert!(carfac_detect(10.0) > 0.9 && carfac_detect(10.0) < 1.0);
        assert!(carfac_detect(0.5) < carfac_detect(1.0));
    }

    #[test]
    fn one_capacitor_defaults() {
        let c = design_ihc(&IhcParams::default(), 22_050.0).unwrap();
        assert_relative_eq!(c.saturation_output, 0.04138, max_relative = 1e-3);
        assert_relative_eq!(c.output_gain, 49.36, max_relative = 1e-3);
        assert_relative_eq!(c.rest_output, 1.0426, max_relative = 1e-3);
        assert_relative_eq!(c.rest_cap1, 0.536, max_relative = 1e-3);
        assert_relative_eq!(c.saturation_level(), 1.0, max_relative = 1e-4);
    }

    #[test]
    fn two_capacitor_rest_caps_are_ordered() {
        let params = IhcParams {
            one_capacitor: false,
            ..IhcParams::default()
        };
        let c = design_ihc(&params, 22_050.0).unwrap();
        assert!(c.rest_cap1 > c.rest_cap2 && c.rest_cap2 > 0.0);
        assert!(c.out2_rate > 0.0 && c.in2_rate > 0.0);
        assert_relative_eq!(c.saturation_level(), 1.0, max_relative = 1e-4);
    }

    #[test]
    fn half_wave_mode_has_unit_scaling() {
        let params = IhcParams {
            just_half_wave_rectify: true,
            ..IhcParams::default()
        };
        let c = design_ihc(&params, 22_050.0).unwrap();
        assert_eq!(c.output_gain, 1.0);
        assert_eq!(c.rest_output, 0.0);
        assert_eq!(c.saturation_level(), 1.0);
    }

    #[test]
    fn rejects_non_positive_time_constant() {
        let params = IhcParams {
            tau_in: 0.0,
            ..IhcParams::default()
        };
        assert_eq!(
            design_ihc(&params, 22_050.0),
            Err(DesignError::InvalidParam {
                name: "tau_in",
                value: 0.0
            })
        );
    }

    #[test]
    fn rejects_bad_sample_rate() {
        for fs in [0.0f32, -8_000.0] {
            assert_eq!(
                design_ihc(&IhcParams::default(), fs),
                Err(DesignError::InvalidSampleRate { fs })
            );
        }
        assert!(matches!(
            design_ihc(&IhcParams::default(), f32::INFINITY),
            Err(DesignError::InvalidSampleRate { .. })
        ));
    }
}
