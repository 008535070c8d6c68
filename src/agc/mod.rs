//! Multi-stage, decimated automatic gain control with spatial smoothing across channels.
//!
//! Stage 0 is the fastest and most local; each later stage runs at a further
//! decimated rate and feeds its memory back into the stage before it.

mod coeffs;
mod design;
mod params;
pub mod smooth;
mod state;

pub use coeffs::{AgcCoeffs, AgcStageCoeffs, SpatialFir};
pub use design::{design_agc, design_spatial_fir, spatial_fir_coeffs};
pub use params::AgcParams;
pub use state::{AgcStageState, AgcState};

/// Upper bound on FIR passes tried by the spatial design.
pub const MAX_SPATIAL_ITERATIONS: usize = 16;

/// From this many FIR passes on, the double-exponential smoother is used instead.
pub const DOUBLE_EXPONENTIAL_MIN_ITERATIONS: usize = 4;
