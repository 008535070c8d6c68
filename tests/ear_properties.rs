use carfac::agc::AgcParams;
use carfac::car::CarParams;
use carfac::core::util::{impulse, sine, white_noise};
use carfac::ihc::IhcParams;
use carfac::Ear;

const FS: f32 = 22_050.0;

fn default_ear() -> Ear {
    Ear::design(
        FS,
        &CarParams::default(),
        &IhcParams::default(),
        &AgcParams::default(),
    )
    .unwrap()
}

#[test]
fn default_design_has_71_channels() {
    let ear = default_ear();
    assert_eq!(ear.n_channels(), 71);
    assert_eq!(ear.pole_freqs().len(), 71);
    assert!(ear.pole_freqs().windows(2).all(|w| w[0] > w[1]));
}

#[test]
fn processing_is_deterministic() {
    let input = white_noise(4_000, 0.2, 42);
    let run = || {
        let mut ear = default_ear();
        let mut out = Vec::with_capacity(input.len() * ear.n_channels());
        for &x in &input {
            out.extend_from_slice(ear.step(x));
        }
        out
    };
    assert_eq!(run(), run());
}

#[test]
fn constant_input_settles_to_unity_gain() {
    let mut ear = default_ear();
    let c = 0.01f32;
    for _ in 0..FS as usize {
        ear.step(c);
    }
    for (ch, &y) in ear.bm().iter().enumerate() {
        let ratio = y / c;
        assert!((ratio - 1.0).abs() < 0.01, "ch {ch}: ratio {ratio}");
    }
}

#[test]
fn impulse_response_decays_and_stays_stable() {
    let mut ear = default_ear();
    let settle = (2.0 * 0.128 * FS) as usize;
    let input = impulse(2 * settle);
    let r1 = ear.coeffs().car.r1.clone();
    let mut peak = 0.0f32;
    let mut late = 0.0f32;
    for (k, &x) in input.iter().enumerate() {
        ear.step(x);
        let m = ear.bm().iter().fold(0.0f32, |m, v| m.max(v.abs()));
        assert!(m.is_finite());
        peak = peak.max(m);
        if k > settle {
            late = late.max(m);
        }
        // nonlinearity is in (0, 1], so r lies between r1 and r1 + zb.
        for (ch, &zb) in ear.agc_zb().iter().enumerate() {
            let r_max = r1[ch] + zb;
            assert!(r1[ch] > 0.0 && r_max < 1.0 && zb >= 0.0, "ch {ch} at {k}");
        }
    }
    assert!(peak > 1.0, "peak {peak}");
    assert!(late < 1e-4 * peak, "late {late} vs peak {peak}");
}

#[test]
fn loud_tone_peaks_in_the_matching_channel() {
    let mut ear = default_ear();
    let input = sine(FS, 1_000.0, 2_205);
    let mut acc = vec![0.0f32; ear.n_channels()];
    for (k, &x) in input.iter().enumerate() {
        let nap = ear.step(x);
        if k >= input.len() / 2 {
            acc.iter_mut().zip(nap).for_each(|(a, &v)| *a += v);
        }
    }
    let best = acc
        .iter()
        .enumerate()
        .fold(0, |b, (i, &v)| if v > acc[b] { i } else { b });
    let f = ear.pole_freqs()[best];
    assert!((800.0..1_250.0).contains(&f), "best channel {best} at {f} Hz");
    // Strong drive pushes AGC stage 0 up without saturating it.
    let m0 = ear.agc_memory(0).iter().fold(0.0f32, |m, &v| m.max(v));
    assert!(m0 > 0.1 && m0 < 1.0, "stage 0 memory {m0}");
}

#[test]
fn reset_is_idempotent_and_reproduces_output() {
    let input = white_noise(2_000, 0.3, 9);
    let mut ear = default_ear();
    let first: Vec<f32> = input.iter().flat_map(|&x| ear.step(x).to_vec()).collect();
    ear.reset();
    let after_one = format!("{ear:?}");
    ear.reset();
    assert_eq!(after_one, format!("{ear:?}"));
    let second: Vec<f32> = input.iter().flat_map(|&x| ear.step(x).to_vec()).collect();
    assert_eq!(first, second);
}

#[test]
fn two_capacitor_and_half_wave_ears_run() {
    for ihc in [
        IhcParams {
            one_capacitor: false,
            ..IhcParams::default()
        },
        IhcParams {
            just_half_wave_rectify: true,
            ..IhcParams::default()
        },
    ] {
        let mut ear = Ear::design(FS, &CarParams::default(), &ihc, &AgcParams::default()).unwrap();
        for &x in &sine(FS, 500.0, 2_000) {
            ear.step(0.1 * x);
        }
        assert!(ear.nap().iter().all(|v| v.is_finite()));
        assert!(ear.nap().iter().any(|&v| v > 0.0));
    }
}
