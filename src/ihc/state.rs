//! Per-ear IHC state and the per-sample transduction step.

use super::{carfac_detect, IhcCoeffs};

/// Per-channel IHC memories.
#[derive(Debug, Clone, PartialEq)]
pub struct IhcState {
    /// Neural activity output of the last step.
    pub ihc_out: Vec<f32>,
    pub ac_coupler: Vec<f32>,
    pub cap1: Vec<f32>,
    pub cap2: Vec<f32>,
    pub lpf1: Vec<f32>,
    pub lpf2: Vec<f32>,
    /// Running sum of `ihc_out`, for monitoring.
    pub ihc_accum: Vec<f32>,
}

impl IhcState {
    pub fn new(coeffs: &IhcCoeffs, n_channels: usize) -> Self {
        let mut s = Self {
            ihc_out: vec![0.0; n_channels],
            ac_coupler: vec![0.0; n_channels],
            cap1: vec![0.0; n_channels],
            cap2: vec![0.0; n_channels],
            lpf1: vec![0.0; n_channels],
            lpf2: vec![0.0; n_channels],
            ihc_accum: vec![0.0; n_channels],
        };
        s.reset(coeffs);
        s
    }

    /// Back to the rest equilibrium (all zero in half-wave mode).
    pub fn reset(&mut self, coeffs: &IhcCoeffs) {
        self.ihc_out.fill(0.0);
        self.ac_coupler.fill(0.0);
        self.cap1.fill(coeffs.rest_cap1);
        self.cap2.fill(coeffs.rest_cap2);
        self.lpf1.fill(coeffs.rest_output);
        self.lpf2.fill(coeffs.rest_output);
        self.ihc_accum.fill(0.0);
    }

    /// Transduce one frame of cascade output into `ihc_out`.
    #[inline]
    pub fn step(&mut self, c: &IhcCoeffs, car_out: &[f32]) {
        assert_eq!(car_out.len(), self.ihc_out.len(), "IHC input width mismatch");
        for ch in 0..car_out.len() {
            let diff = car_out[ch] - self.ac_coupler[ch];
            self.ac_coupler[ch] += c.ac_coeff * diff;

            let out = if c.just_half_wave_rectify {
                diff.clamp(0.0, 2.0)
            } else {
                let conductance = carfac_detect(diff);
                let mut out;
                if c.one_capacitor {
                    out = conductance * self.cap1[ch];
                    self.cap1[ch] += -out * c.out1_rate + (1.0 - self.cap1[ch]) * c.in1_rate;
                } else {
                    out = conductance * self.cap2[ch];
                    let cap1 = self.cap1[ch]
                        + (-(self.cap1[ch] - self.cap2[ch]) * c.out1_rate
                            + (1.0 - self.cap1[ch]) * c.in1_rate);
                    self.cap1[ch] = cap1;
                    self.cap2[ch] += -out * c.out2_rate + (cap1 - self.cap2[ch]) * c.in2_rate;
                }
                out *= c.output_gain;
                self.lpf1[ch] += c.lpf_coeff * (out - self.lpf1[ch]);
                self.lpf2[ch] += c.lpf_coeff * (self.lpf1[ch] - self.lpf2[ch]);
                self.lpf2[ch] - c.rest_output
            };

            self.ihc_out[ch] = out;
            self.ihc_accum[ch] += out;
        }
    }

    pub fn reset_accum(&mut self) {
        self.ihc_accum.fill(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ihc::{design_ihc, IhcParams};

    const FS: f32 = 22_050.0;

    fn run_silence(params: IhcParams) -> IhcState {
        let c = design_ihc(&params, FS).unwrap();
        let mut s = IhcState::new(&c, 4);
        let zeros = [0.0f32; 4];
        for _ in 0..2000 {
            s.step(&c, &zeros);
        }
        s
    }

    #[test]
    fn one_capacitor_silence_stays_at_rest() {
        let s = run_silence(IhcParams::default());
        assert!(s.ihc_out.iter().all(|v| v.abs() < 1e-4), "{:?}", s.ihc_out);
    }

    #[test]
    fn two_capacitor_silence_stays_at_rest() {
        let s = run_silence(IhcParams {
            one_capacitor: false,
            ..IhcParams::default()
        });
        assert!(s.ihc_out.iter().all(|v| v.abs() < 1e-4), "{:?}", s.ihc_out);
    }

    #[test]
    fn half_wave_output_is_clamped() {
        let c = design_ihc(
            &IhcParams {
                just_half_wave_rectify: true,
                ..IhcParams::default()
            },
            FS,
        )
        .unwrap();
        let mut s = IhcState::new(&c, 3);
        s.step(&c, &[-1.0, 0.5, 10.0]);
        assert_eq!(s.ihc_out[0], 0.0);
        assert_eq!(s.ihc_out[1], 0.5);
        assert_eq!(s.ihc_out[2], 2.0);
    }

    #[test]
    fn positive_drive_raises_output_and_accum() {
        let c = design_ihc(&IhcParams::default(), FS).unwrap();
        let mut s = IhcState::new(&c, 1);
        for _ in 0..20 {
            s.step(&c, &[0.5]);
        }
        assert!(s.ihc_out[0] > 0.0);
        assert!(s.ihc_accum[0] > 0.0);
        s.reset_accum();
        assert_eq!(s.ihc_accum[0], 0.0);
    }

    #[test]
    fn reset_is_idempotent() {
        let c = design_ihc(&IhcParams::default(), FS).unwrap();
        let mut s = IhcState::new(&c, 5);
        s.step(&c, &[0.3; 5]);
        s.reset(&c);
        let once = s.clone();
        s.reset(&c);
        assert_eq!(s, once);
        assert_eq!(s, IhcState::new(&c, 5));
    }
}
