//! Compiled per-channel CAR coefficients (struct-of-arrays, base to apex).

/// Immutable coefficients consumed by `CarState::step`.
#[derive(Debug, Clone, PartialEq)]
pub struct CarCoeffs {
    /// OHC nonlinearity velocity scale.
    pub velocity_scale: f32,
    /// OHC nonlinearity velocity offset.
    pub v_offset: f32,
    /// Pole radius at maximum damping.
    pub r1: Vec<f32>,
    /// cos(theta), rotation.
    pub a0: Vec<f32>,
    /// sin(theta), rotation.
    pub c0: Vec<f32>,
    /// Zero coupling: c0 * (zero_ratio^2 - 1).
    pub h: Vec<f32>,
    /// Stage gain at rest (unity DC gain at relative undamping 1).
    pub g0: Vec<f32>,
    /// Undamping range: r = r1 + zr * undamping.
    pub zr: Vec<f32>,
}

impl CarCoeffs {
    /// Number of channels.
    #[inline]
    pub fn n_channels(&self) -> usize {
        self.r1.len()
    }

    /// DC-normalizing stage gain for channel `ch` at `relative_undamping`.
    ///
    /// `(1 - 2r*a0 + r^2) / (1 - 2r*a0 + h*r*c0 + r^2)` with `r = r1 + zr*u`.
    #[inline]
    pub fn stage_g(&self, ch: usize, relative_undamping: f32) -> f32 {
        let r = self.r1[ch] + self.zr[ch] * relative_undamping;
        // Same polynomial as 1 - 2r*a0 + r^2, without the cancellation near r, a0 -> 1.
        let num = (1.0 - r) * (1.0 - r) + 2.0 * r * (1.0 - self.a0[ch]);
        num / (num + self.h[ch] * r * self.c0[ch])
    }
}
