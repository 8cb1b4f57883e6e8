mod common;
use common::{max_abs_diff, synthetic_raw};
use npx_lfp::reference::common_average_reference_inplace;
use npx_lfp::ShankMap;
use ndarray::{Array2, Axis};

#[test]
fn common_mode_is_removed_exactly() {
    // channel-specific part + shared drift
    let own = Array2::from_shape_fn((1000, 6), |(t, c)| ((t * (c + 1)) as f64 * 0.01).sin());
    let mut own_ref = own.clone();
    common_average_reference_inplace(&mut own_ref);

    let drift = Array2::from_shape_fn((1000, 6), |(t, _)| 500.0 * (t as f64 * 0.002).cos());
    let mut with_drift = &own + &drift;
    common_average_reference_inplace(&mut with_drift);

    let err = max_abs_diff(&with_drift, &own_ref);
    assert!(err < 1e-9, "max abs error {err:.2e}");
}

#[test]
fn per_sample_channel_mean_is_zero() {
    let raw = synthetic_raw(2000, 16, 2500.0);
    let map = ShankMap::neuropixels();
    for shank in 0..4 {
        let mut sig = raw.select(Axis(1), &map.shank_channels(shank, 16)).mapv(f64::from);
        common_average_reference_inplace(&mut sig);
        for (t, m) in sig.mean_axis(Axis(1)).unwrap().iter().enumerate() {
            assert!(m.abs() < 1e-9, "shank {shank} t={t}: mean {m:.2e}");
        }
    }
}

#[test]
fn reference_is_idempotent() {
    let mut once = Array2::from_shape_fn((64, 5), |(t, c)| (t as f64).sqrt() * c as f64 - 3.0);
    common_average_reference_inplace(&mut once);
    let mut twice = once.clone();
    common_average_reference_inplace(&mut twice);
    assert!(max_abs_diff(&once, &twice) < 1e-12);
}

#[test]
fn single_channel_becomes_zero() {
    let mut x = Array2::from_shape_fn((50, 1), |(t, _)| t as f64);
    common_average_reference_inplace(&mut x);
    assert!(x.iter().all(|&v| v == 0.0));
}
