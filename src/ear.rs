//! One ear: CAR -> IHC -> AGC per sample, with the AGC loop closed back onto the CAR.

use std::sync::Arc;

use tracing::debug;

use crate::agc::{design_agc, AgcCoeffs, AgcParams, AgcState};
use crate::car::{design_car, CarCoeffs, CarParams, CarState};
use crate::core::ChannelLadder;
use crate::error::DesignError;
use crate::ihc::{design_ihc, IhcCoeffs, IhcParams, IhcState};

/// Immutable design of one ear; shared read-only between ears with equal parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct EarDesign {
    pub ladder: ChannelLadder,
    pub car: CarCoeffs,
    pub ihc: IhcCoeffs,
    pub agc: AgcCoeffs,
}

impl EarDesign {
    #[inline]
    pub fn n_channels(&self) -> usize {
        self.ladder.n_channels()
    }
}

/// Build the ladder and all three coefficient sets for sample rate `fs`.
pub fn design_ear(
    fs: f32,
    car: &CarParams,
    ihc: &IhcParams,
    agc: &AgcParams,
) -> Result<EarDesign, DesignError> {
    let ladder = ChannelLadder::design(fs, car)?;
    let car = design_car(car, &ladder)?;
    let ihc = design_ihc(ihc, fs)?;
    let agc = design_agc(agc, fs, ihc.saturation_level())?;

    debug!(
        target: "carfac::ear",
        "designed ear fs={} n_channels={} top={:.2}Hz bottom={:.2}Hz max_channels_per_octave={:?}",
        fs,
        ladder.n_channels(),
        ladder.pole_freqs.first().copied().unwrap_or_default(),
        ladder.pole_freqs.last().copied().unwrap_or_default(),
        ladder.max_channels_per_octave()
    );

    Ok(EarDesign {
        ladder,
        car,
        ihc,
        agc,
    })
}

/// Design plus per-ear run-time state.
#[derive(Debug, Clone)]
pub struct Ear {
    design: Arc<EarDesign>,
    car: CarState,
    ihc: IhcState,
    agc: AgcState,
}

impl Ear {
    /// Design a single ear and reset it.
    pub fn design(
        fs: f32,
        car: &CarParams,
        ihc: &IhcParams,
        agc: &AgcParams,
    ) -> Result<Self, DesignError> {
        Ok(Self::new(Arc::new(design_ear(fs, car, ihc, agc)?)))
    }

    /// Fresh state for an existing design.
    pub fn new(design: Arc<EarDesign>) -> Self {
        let n = design.n_channels();
        let car = CarState::new(&design.car);
        let ihc = IhcState::new(&design.ihc, n);
        let agc = AgcState::new(&design.agc, n);
        Self {
            design,
            car,
            ihc,
            agc,
        }
    }

    /// Back to the rest state without redesigning.
    pub fn reset(&mut self) {
        let d = &*self.design;
        self.car.reset(&d.car);
        self.ihc.reset(&d.ihc);
        self.agc.reset();
    }

    /// Process one input sample and return the neural activity pattern.
    #[inline]
    pub fn step(&mut self, x: f32) -> &[f32] {
        if self.step_open_loop(x) {
            self.close_agc_loop();
        }
        &self.ihc.ihc_out
    }

    /// CAR, IHC and AGC for one sample without touching the CAR ramps.
    /// Returns true when AGC stage 0 updated.
    #[inline]
    pub fn step_open_loop(&mut self, x: f32) -> bool {
        let d = &*self.design;
        self.car.step(&d.car, x);
        self.ihc.step(&d.ihc, &self.car.zy);
        self.agc.step(&d.agc, &self.ihc.ihc_out)
    }

    /// Point the zb/g ramps at the undamping implied by AGC stage 0,
    /// to be reached over the next stage-0 decimation period.
    pub fn close_agc_loop(&mut self) {
        let d = &*self.design;
        let inv_decim = 1.0 / d.agc.first_decimation() as f32;
        let memory = self.agc.memory(0);
        for ch in 0..d.n_channels() {
            let undamping = 1.0 - memory[ch];
            self.car.dzb[ch] = (d.car.zr[ch] * undamping - self.car.zb[ch]) * inv_decim;
            self.car.dg[ch] = (d.car.stage_g(ch, undamping) - self.car.g[ch]) * inv_decim;
        }
    }

    pub fn coeffs(&self) -> &EarDesign {
        &self.design
    }

    pub fn shared_design(&self) -> Arc<EarDesign> {
        Arc::clone(&self.design)
    }

    #[inline]
    pub fn n_channels(&self) -> usize {
        self.design.n_channels()
    }

    pub fn pole_freqs(&self) -> &[f32] {
        &self.design.ladder.pole_freqs
    }

    pub fn max_channels_per_octave(&self) -> Option<f32> {
        self.design.ladder.max_channels_per_octave()
    }

    /// IHC output of the last step.
    pub fn nap(&self) -> &[f32] {
        &self.ihc.ihc_out
    }

    /// Basilar-membrane output (cascade `zy`).
    pub fn bm(&self) -> &[f32] {
        &self.car.zy
    }

    /// OHC velocity memory (`za`).
    pub fn ohc(&self) -> &[f32] {
        &self.car.za
    }

    /// AGC-controlled undamping (`zb`).
    pub fn agc_zb(&self) -> &[f32] {
        &self.car.zb
    }

    pub fn car_state(&self) -> &CarState {
        &self.car
    }

    pub fn agc_memory(&self, stage: usize) -> &[f32] {
        self.agc.memory(stage)
    }

    pub(crate) fn agc_memory_mut(&mut self, stage: usize) -> &mut [f32] {
        &mut self.agc.stages[stage].agc_memory
    }

    pub fn agc_decim_phase(&self, stage: usize) -> usize {
        self.agc.stages[stage].decim_phase
    }

    /// Total DC gain of the AGC stage network.
    pub fn agc_gain(&self) -> f32 {
        self.design.agc.total_dc_gain
    }

    pub fn ihc_accum(&self) -> &[f32] {
        &self.ihc.ihc_accum
    }

    pub fn reset_ihc_accum(&mut self) {
        self.ihc.reset_accum();
    }
}
