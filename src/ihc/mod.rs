//! Inner-hair-cell transduction (sec, Hz): AC coupling, detection, capacitor model, double LPF.

mod coeffs;
mod design;
mod params;
mod state;

pub use coeffs::IhcCoeffs;
pub use design::{carfac_detect, design_ihc};
pub use params::IhcParams;
pub use state::IhcState;
