// core/erb.rs
// Equivalent Rectangular Bandwidth in the linear-break form.

/// Break frequency that turns the linear form into Glasberg & Moore (1990).
pub const GLASBERG_MOORE_BREAK_HZ: f32 = 1000.0 / 4.37;

/// High-cf Q of Glasberg & Moore (1990): ERB ~ f / Q well above the break.
pub const GLASBERG_MOORE_Q: f32 = 1000.0 / (24.7 * 4.37);

/// Greenwood map break frequency used by the default channel ladder.
pub const GREENWOOD_BREAK_HZ: f32 = 165.3;

/// ERB bandwidth in Hz: `(erb_break_freq + cf_hz) / erb_q`.
///
/// With `GLASBERG_MOORE_BREAK_HZ` / `GLASBERG_MOORE_Q` this equals
/// `24.7 * (1 + 4.37 * cf_hz / 1000)`. Negative `cf_hz` is the caller's problem.
#[inline]
pub fn erb_hz(cf_hz: f32, erb_break_freq: f32, erb_q: f32) -> f32 {
    (erb_break_freq + cf_hz) / erb_q
}

/// Elementwise `erb_hz` over a frequency scan.
pub fn erb_hz_scan(cf_hz: &[f32], erb_break_freq: f32, erb_q: f32, out: &mut [f32]) {
    debug_assert_eq!(cf_hz.len(), out.len());
    for (o, &f) in out.iter_mut().zip(cf_hz) {
        *o = erb_hz(f, erb_break_freq, erb_q);
    }
}
