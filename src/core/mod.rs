//! Design-time helpers shared by the CAR, IHC and AGC stages.

pub mod erb;
pub mod ladder;
pub mod util;

pub use ladder::ChannelLadder;
