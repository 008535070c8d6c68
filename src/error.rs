//! Design-time configuration errors. The per-sample step never fails.

/// Errors returned while designing an ear from parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DesignError {
    /// Sample rate is non-finite or not positive.
    InvalidSampleRate { fs: f32 },
    /// ERB step is non-finite or not positive, so the ladder would never terminate.
    InvalidErbStep { erb_per_step: f32 },
    /// ERB break frequency / Q cannot shrink the pole frequency below the floor.
    InvalidErbParams { erb_break_freq: f32, erb_q: f32 },
    /// First pole is already at or below the floor frequency.
    EmptyLadder { first_pole_hz: f32, min_pole_hz: f32 },
    /// Ladder did not reach the floor within the channel limit.
    TooManyChannels { limit: usize },
    /// A CAR or IHC parameter is out of its valid range.
    InvalidParam { name: &'static str, value: f32 },
    /// No AGC stages were requested.
    NoAgcStages,
    /// Per-stage AGC arrays disagree in length.
    AgcStageMismatch {
        field: &'static str,
        expected: usize,
        got: usize,
    },
    /// Stage decimation factor is zero.
    InvalidDecimation { stage: usize, decimation: usize },
    /// Stage time constant is non-finite, not positive, or not longer than the previous stage's.
    InvalidTimeConstant { stage: usize, tau: f32 },
    /// No spatial FIR satisfied the tap constraints within the iteration cap.
    AgcFirDesign { stage: usize },
    /// Spatial FIR design only knows 3 and 5 taps.
    UnsupportedTapCount { n_taps: usize },
    /// An `Ears` container needs at least one ear.
    NoEars,
}

impl std::fmt::Display for DesignError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            DesignError::InvalidSampleRate { fs } => write!(f, "invalid sample rate {fs} Hz"),
            DesignError::InvalidErbStep { erb_per_step } => {
                write!(f, "erb_per_step must be positive, got {erb_per_step}")
            }
            DesignError::InvalidErbParams {
                erb_break_freq,
                erb_q,
            } => write!(
                f,
                "ERB parameters (break {erb_break_freq} Hz, Q {erb_q}) do not give a terminating ladder"
            ),
            DesignError::EmptyLadder {
                first_pole_hz,
                min_pole_hz,
            } => write!(
                f,
                "first pole {first_pole_hz} Hz is not above min_pole_hz {min_pole_hz} Hz"
            ),
            DesignError::TooManyChannels { limit } => {
                write!(f, "channel ladder exceeded {limit} channels")
            }
            DesignError::InvalidParam { name, value } => {
                write!(f, "invalid parameter {name} = {value}")
            }
            DesignError::NoAgcStages => write!(f, "AGC needs at least one stage"),
            DesignError::AgcStageMismatch {
                field,
                expected,
                got,
            } => write!(f, "AGC {field} has {got} entries, expected {expected}"),
            DesignError::InvalidDecimation { stage, decimation } => {
                write!(f, "AGC stage {stage} decimation {decimation} must be >= 1")
            }
            DesignError::InvalidTimeConstant { stage, tau } => {
                write!(
                    f,
                    "AGC stage {stage} time constant {tau} s must be positive and exceed the previous stage's"
                )
            }
            DesignError::AgcFirDesign { stage } => write!(
                f,
                "AGC stage {stage}: no spatial FIR found within {} iterations",
                crate::agc::MAX_SPATIAL_ITERATIONS
            ),
            DesignError::UnsupportedTapCount { n_taps } => {
                write!(f, "spatial FIR with {n_taps} taps is not supported (3 or 5)")
            }
            DesignError::NoEars => write!(f, "at least one ear is required"),
        }
    }
}

impl std::error::Error for DesignError {}
