//! Test-signal helpers shared by unit tests, integration tests and benches.

use rand::{Rng, SeedableRng};

/// Generate sine wave samples
pub fn sine(fs: f32, f: f32, n: usize) -> Vec<f32> {
    (0..n)
        .map(|i| (2.0 * std::f32::consts::PI * f * (i as f32) / fs).sin())
        .collect()
}

/// Unit impulse at sample 0 followed by silence.
pub fn impulse(n: usize) -> Vec<f32> {
    let mut x = vec![0.0; n];
    if let Some(first) = x.first_mut() {
        *first = 1.0;
    }
    x
}

/// Uniform white noise in [-amp, amp), reproducible from `seed`.
pub fn white_noise(n: usize, amp: f32, seed: u64) -> Vec<f32> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    (0..n).map(|_| amp * rng.random_range(-1.0f32..1.0)).collect()
}

/// Root mean square; 0 for an empty slice.
pub fn rms(x: &[f32]) -> f32 {
    if x.is_empty() {
        return 0.0;
    }
    (x.iter().map(|v| v * v).sum::<f32>() / x.len() as f32).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn white_noise_is_reproducible() {
        let a = white_noise(64, 0.5, 7);
        let b = white_noise(64, 0.5, 7);
        assert_eq!(a, b);
        assert!(a.iter().all(|v| v.abs() <= 0.5));
    }

    #[test]
    fn sine_rms_is_one_over_sqrt2() {
        let x = sine(16_000.0, 500.0, 16_000);
        assert!((rms(&x) - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-3);
    }
}
