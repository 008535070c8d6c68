//! Per-ear CAR state and the per-sample cascade step.
//! Two-pole rotation per channel, then a base-to-apex ripple through the stage gains.

use super::CarCoeffs;
#[cfg(feature = "simd-wide")]
use wide::f32x8;

/// Mutable resonator memories (struct-of-arrays, base to apex).
#[derive(Debug, Clone, PartialEq)]
pub struct CarState {
    pub z1: Vec<f32>,
    pub z2: Vec<f32>,
    /// One-sample delay of z2, for the OHC velocity.
    pub za: Vec<f32>,
    /// Current undamping term; r = r1 + zb * nonlinearity.
    pub zb: Vec<f32>,
    pub dzb: Vec<f32>,
    /// Cascade output per channel after the last step.
    pub zy: Vec<f32>,
    /// Current stage gains.
    pub g: Vec<f32>,
    pub dg: Vec<f32>,
}

impl CarState {
    /// Fresh state for `coeffs`: zb = zr, g = g0, everything else zero.
    pub fn new(coeffs: &CarCoeffs) -> Self {
        let n = coeffs.n_channels();
        Self {
            z1: vec![0.0; n],
            z2: vec![0.0; n],
            za: vec![0.0; n],
            zb: coeffs.zr.clone(),
            dzb: vec![0.0; n],
            zy: vec![0.0; n],
            g: coeffs.g0.clone(),
            dg: vec![0.0; n],
        }
    }

    /// Reset in place without reallocating.
    pub fn reset(&mut self, coeffs: &CarCoeffs) {
        assert_eq!(self.z1.len(), coeffs.n_channels(), "CAR state/coeffs length mismatch");
        self.z1.fill(0.0);
        self.z2.fill(0.0);
        self.za.fill(0.0);
        self.zb.copy_from_slice(&coeffs.zr);
        self.dzb.fill(0.0);
        self.zy.fill(0.0);
        self.g.copy_from_slice(&coeffs.g0);
        self.dg.fill(0.0);
    }

    /// Advance one input sample. The result is left in `zy`.
    #[inline]
    pub fn step(&mut self, coeffs: &CarCoeffs, x: f32) {
        debug_assert_eq!(self.z1.len(), coeffs.n_channels());
        #[cfg(feature = "simd-wide")]
        self.rotate_simd_wide8(coeffs);
        #[cfg(not(feature = "simd-wide"))]
        self.rotate_scalar(coeffs, 0);
        self.ripple(x);
    }

    /// Elementwise part: ramp g/zb, OHC nonlinearity, rotate, zero term.
    /// Channels from `start` on; z1 is left without the ripple input.
    #[inline]
    fn rotate_scalar(&mut self, c: &CarCoeffs, start: usize) {
        let n = self.z1.len();
        for ch in start..n {
            self.g[ch] += self.dg[ch];
            self.zb[ch] += self.dzb[ch];

            let v = self.z2[ch] - self.za[ch];
            let nlf = ohc_nonlinearity(v, c.velocity_scale, c.v_offset);
            let r = c.r1[ch] + self.zb[ch] * nlf;
            self.za[ch] = self.z2[ch];

            let z1 = self.z1[ch];
            let z2 = self.z2[ch];
            let z1_new = r * (c.a0[ch] * z1 - c.c0[ch] * z2);
            let z2_new = r * (c.c0[ch] * z1 + c.a0[ch] * z2);
            self.z1[ch] = z1_new;
            self.z2[ch] = z2_new;
            self.zy[ch] = c.h[ch] * z2_new;
        }
    }

    #[cfg(feature = "simd-wide")]
    fn rotate_simd_wide8(&mut self, c: &CarCoeffs) {
        let n = self.z1.len();
        let n8 = n & !7;
        let one = f32x8::splat(1.0);
        let vs = f32x8::splat(c.velocity_scale);
        let vo = f32x8::splat(c.v_offset);

        for i in (0..n8).step_by(8) {
            let g = load8(&self.g, i) + load8(&self.dg, i);
            let zb = load8(&self.zb, i) + load8(&self.dzb, i);
            let z1 = load8(&self.z1, i);
            let z2 = load8(&self.z2, i);

            let u = (z2 - load8(&self.za, i)) * vs + vo;
            let nlf = one / (one + u * u);
            let r = load8(&c.r1, i) + zb * nlf;
            let a0 = load8(&c.a0, i);
            let c0 = load8(&c.c0, i);
            let z1_new = r * (a0 * z1 - c0 * z2);
            let z2_new = r * (c0 * z1 + a0 * z2);

            store8(&mut self.g, i, g);
            store8(&mut self.zb, i, zb);
            store8(&mut self.za, i, z2);
            store8(&mut self.z1, i, z1_new);
            store8(&mut self.z2, i, z2_new);
            store8(&mut self.zy, i, load8(&c.h, i) * z2_new);
        }

        self.rotate_scalar(c, n8);
    }

    /// Sequential base-to-apex ripple; cannot be split across channels.
    #[inline]
    fn ripple(&mut self, x: f32) {
        let mut in_out = x;
        for ((z1, zy), &g) in self.z1.iter_mut().zip(self.zy.iter_mut()).zip(&self.g) {
            *z1 += in_out;
            in_out = g * (in_out + *zy);
            *zy = in_out;
        }
    }
}

/// OHC nonlinearity: `1 / (1 + (v*scale + offset)^2)`, 1 at rest, toward 0 at high velocity.
#[inline]
pub fn ohc_nonlinearity(v: f32, velocity_scale: f32, v_offset: f32) -> f32 {
    let u = v * velocity_scale + v_offset;
    1.0 / (1.0 + u * u)
}

#[cfg(feature = "simd-wide")]
#[inline(always)]
fn load8(s: &[f32], i: usize) -> f32x8 {
    let mut a = [0.0f32; 8];
    a.copy_from_slice(&s[i..i + 8]);
    f32x8::from(a)
}

#[cfg(feature = "simd-wide")]
#[inline(always)]
fn store8(s: &mut [f32], i: usize, v: f32x8) {
    s[i..i + 8].copy_from_slice(&v.to_array());
}
