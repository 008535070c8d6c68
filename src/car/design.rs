//! Derive CAR pole/zero coefficients from the channel ladder.

use std::f32::consts::PI;

use super::{CarCoeffs, CarParams};
use crate::core::erb::erb_hz;
use crate::core::ChannelLadder;
use crate::error::DesignError;

/// Relative undamping at reset: AGC memory is zero, so `zb == zr`.
pub const REST_UNDAMPING: f32 = 1.0;

/// Design the cascade for `ladder`.
///
/// Per channel: theta = 2*pi*f/fs, a0 = cos(theta), c0 = sin(theta),
/// h = c0*(zero_ratio^2 - 1), r1 = 1 - zr_max*max_zeta and
/// zr = zr_max*(max_zeta - min_zeta_mod), where zr_max is the
/// high-frequency-compressed theta.
pub fn design_car(params: &CarParams, ladder: &ChannelLadder) -> Result<CarCoeffs, DesignError> {
    check_params(params)?;

    let n = ladder.n_channels();
    let f_ratio = params.zero_ratio * params.zero_ratio - 1.0;
    let ff = params.high_f_damping_compression;

    let mut coeffs = CarCoeffs {
        velocity_scale: params.velocity_scale,
        v_offset: params.v_offset,
        r1: Vec::with_capacity(n),
        a0: Vec::with_capacity(n),
        c0: Vec::with_capacity(n),
        h: Vec::with_capacity(n),
        g0: Vec::with_capacity(n),
        zr: Vec::with_capacity(n),
    };

    for (ch, &pole_hz) in ladder.pole_freqs.iter().enumerate() {
        let theta = ladder.theta(ch);
        let c0 = theta.sin();
        let a0 = theta.cos();

        let x = theta / PI;
        let zr_max = PI * (x - ff * x * x * x);
        let erb = erb_hz(pole_hz, params.erb_break_freq, params.erb_q);
        let min_zeta_mod = params.min_zeta + 0.25 * (erb / pole_hz - params.min_zeta);

        coeffs.r1.push(1.0 - zr_max * params.max_zeta);
        coeffs.zr.push(zr_max * (params.max_zeta - min_zeta_mod));
        coeffs.a0.push(a0);
        coeffs.c0.push(c0);
        coeffs.h.push(c0 * f_ratio);
    }

    for ch in 0..n {
        let g0 = coeffs.stage_g(ch, REST_UNDAMPING);
        coeffs.g0.push(g0);
    }
    ladder.assert_scan_len(&coeffs.g0);

    Ok(coeffs)
}

fn check_params(params: &CarParams) -> Result<(), DesignError> {
    let checks: [(&'static str, f32, bool); 6] = [
        (
            "velocity_scale",
            params.velocity_scale,
            params.velocity_scale.is_finite(),
        ),
        ("v_offset", params.v_offset, params.v_offset.is_finite()),
        (
            "min_zeta",
            params.min_zeta,
            params.min_zeta.is_finite() && params.min_zeta >= 0.0,
        ),
        (
            "max_zeta",
            params.max_zeta,
            params.max_zeta.is_finite() && params.max_zeta > 0.0 && params.max_zeta < 1.0,
        ),
        (
            "zero_ratio",
            params.zero_ratio,
            params.zero_ratio.is_finite() && params.zero_ratio >= 1.0,
        ),
        (
            "high_f_damping_compression",
            params.high_f_damping_compression,
            (0.0..=1.0).contains(&params.high_f_damping_compression),
        ),
    ];
    for (name, value, ok) in checks {
        if !ok {
            return Err(DesignError::InvalidParam { name, value });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_design() -> (ChannelLadder, CarCoeffs) {
        let params = CarParams::default();
        let ladder = ChannelLadder::design(22_050.0, &params).unwrap();
        let coeffs = design_car(&params, &ladder).unwrap();
        (ladder, coeffs)
    }

    #[test]
    fn all_arrays_have_one_entry_per_channel() {
        let (ladder, c) = default_design();
        let n = ladder.n_channels();
        for v in [&c.r1, &c.a0, &c.c0, &c.h, &c.g0, &c.zr] {
            assert_eq!(v.len(), n);
        }
        assert_eq!(c.n_channels(), n);
    }

    #[test]
    fn radius_stays_inside_unit_circle_over_undamping_range() {
        let (_, c) = default_design();
        for ch in 0..c.n_channels() {
            let lo = c.r1[ch];
            let hi = c.r1[ch] + c.zr[ch];
            assert!(lo > 0.0 && lo < 1.0, "ch {ch}: r1={lo}");
            assert!(hi > lo && hi < 1.0, "ch {ch}: r1+zr={hi}");
        }
    }

    #[test]
    fn g0_is_positive_and_gives_unity_dc_gain() {
        let (_, c) = default_design();
        for ch in 0..c.n_channels() {
            let g0 = c.g0[ch];
            assert!(g0 > 0.0 && g0 < 1.0, "ch {ch}: g0={g0}");
            // DC gain of one stage: g * (1 + h*r*c0 / (1 - 2r*a0 + r^2)).
            let r = c.r1[ch] + c.zr[ch];
            let den = (1.0 - r) * (1.0 - r) + 2.0 * r * (1.0 - c.a0[ch]);
            let dc = g0 * (1.0 + c.h[ch] * r * c.c0[ch] / den);
            assert!((dc - 1.0).abs() < 1e-4, "ch {ch}: dc={dc}");
        }
    }

    #[test]
    fn stage_g_rises_with_damping() {
        // More damping (smaller r) needs less DC correction from g.
        let (_, c) = default_design();
        let ch = c.n_channels() / 2;
        assert!(c.stage_g(ch, 0.0) > c.stage_g(ch, 1.0));
    }

    #[test]
    fn rejects_sub_unity_zero_ratio() {
        let params = CarParams {
            zero_ratio: 0.5,
            ..CarParams::default()
        };
        let ladder = ChannelLadder::design(22_050.0, &params).unwrap();
        assert_eq!(
            design_car(&params, &ladder),
            Err(DesignError::InvalidParam {
                name: "zero_ratio",
                value: 0.5
            })
        );
    }
}
