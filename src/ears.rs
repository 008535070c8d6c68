//! Multi-ear container: one `Ear` per input channel, AGC cross-coupled between ears.

use std::sync::Arc;

use crate::agc::AgcParams;
use crate::car::CarParams;
use crate::ear::{design_ear, Ear, EarDesign};
use crate::error::DesignError;
use crate::ihc::IhcParams;
use crate::output::{CarfacOutput, OutputSelection};

/// Ears sharing one design. Only AGC memories interact, through `cross_couple`.
#[derive(Debug, Clone)]
pub struct Ears {
    ears: Vec<Ear>,
    mean: Vec<f32>,
}

impl Ears {
    pub fn new(
        n_ears: usize,
        fs: f32,
        car: &CarParams,
        ihc: &IhcParams,
        agc: &AgcParams,
    ) -> Result<Self, DesignError> {
        if n_ears == 0 {
            return Err(DesignError::NoEars);
        }
        Self::from_design(Arc::new(design_ear(fs, car, ihc, agc)?), n_ears)
    }

    pub fn from_design(design: Arc<EarDesign>, n_ears: usize) -> Result<Self, DesignError> {
        if n_ears == 0 {
            return Err(DesignError::NoEars);
        }
        let n_channels = design.n_channels();
        let ears = (0..n_ears).map(|_| Ear::new(Arc::clone(&design))).collect();
        Ok(Self {
            ears,
            mean: vec![0.0; n_channels],
        })
    }

    #[inline]
    pub fn n_ears(&self) -> usize {
        self.ears.len()
    }

    #[inline]
    pub fn n_channels(&self) -> usize {
        self.mean.len()
    }

    pub fn ear(&self, index: usize) -> &Ear {
        &self.ears[index]
    }

    pub fn ears(&self) -> &[Ear] {
        &self.ears
    }

    pub fn reset(&mut self) {
        self.ears.iter_mut().for_each(Ear::reset);
    }

    /// Advance every ear by one sample; `frame` holds one sample per ear.
    /// Returns true when the AGC updated this sample.
    pub fn step(&mut self, frame: &[f32]) -> bool {
        assert_eq!(frame.len(), self.ears.len(), "input frame width must equal ear count");
        let mut updated = false;
        for (ear, &x) in self.ears.iter_mut().zip(frame) {
            updated |= ear.step_open_loop(x);
        }
        if updated {
            if self.ears.len() > 1 {
                self.cross_couple();
            }
            self.ears.iter_mut().for_each(Ear::close_agc_loop);
        }
        updated
    }

    /// Pull every ear's AGC memory toward the across-ear mean, for the stages
    /// that just updated (those whose decimation phase is 0 in ear 0).
    fn cross_couple(&mut self) {
        let n_stages = self.ears[0].coeffs().agc.n_stages();
        let n_ears = self.ears.len() as f32;
        for stage in 0..n_stages {
            if self.ears[0].agc_decim_phase(stage) != 0 {
                break;
            }
            let mix = self.ears[0].coeffs().agc.stages[stage].mix_coeff;
            if mix <= 0.0 {
                continue;
            }
            self.mean.fill(0.0);
            for ear in &self.ears {
                for (m, &v) in self.mean.iter_mut().zip(ear.agc_memory(stage)) {
                    *m += v;
                }
            }
            self.mean.iter_mut().for_each(|m| *m /= n_ears);
            for ear in &mut self.ears {
                for (v, &m) in ear.agc_memory_mut(stage).iter_mut().zip(&self.mean) {
                    *v += mix * (m - *v);
                }
            }
        }
    }

    /// Run a block interleaved by ear (`input.len()` a multiple of `n_ears`)
    /// and record one frame per sample of the selected outputs.
    pub fn process_segment(&mut self, input: &[f32], selection: OutputSelection) -> CarfacOutput {
        let n_ears = self.ears.len();
        assert_eq!(input.len() % n_ears, 0, "input length must be a multiple of the ear count");
        let n_frames = input.len() / n_ears;
        let mut out = CarfacOutput::new(selection, n_ears, self.n_channels(), n_frames);
        for frame in input.chunks_exact(n_ears) {
            self.step(frame);
            out.record(&self.ears);
        }
        out
    }
}
