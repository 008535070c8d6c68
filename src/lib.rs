//! CARFAC cochlear model: a cascade of asymmetric resonators (CAR) driving
//! inner-hair-cell transduction (IHC), with a multi-stage automatic gain
//! control (AGC) feeding damping back into the cascade.
//!
//! Design is fallible and happens once (`Ear::design`, `Ears::new`,
//! `CarfacConfig::design_ears`); the per-sample `step` never fails and
//! never allocates.

pub mod agc;
pub mod car;
pub mod config;
pub mod core;
pub mod ear;
pub mod ears;
pub mod error;
pub mod ihc;
pub mod output;

pub use config::CarfacConfig;
pub use ear::{design_ear, Ear, EarDesign};
pub use ears::Ears;
pub use error::DesignError;
pub use output::{CarfacOutput, FrameBuffer, OutputSelection};
