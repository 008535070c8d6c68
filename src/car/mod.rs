//! Cascade of asymmetric resonators (Hz, sec, theta = 2*pi*pole_hz/fs).

mod coeffs;
mod design;
mod params;
mod state;
pub mod transfer;

pub use coeffs::CarCoeffs;
pub use design::{design_car, REST_UNDAMPING};
pub use params::CarParams;
pub use state::{ohc_nonlinearity, CarState};
