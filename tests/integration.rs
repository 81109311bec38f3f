//! Integration tests for the synthseis pipeline.
//!
//! Exercises the full path from rocks through earth models, depth-to-time
//! conversion, reflectivity, wavelet banks and convolution, for layer
//! stacks, palette images, stored-rock descriptors and wedge models.

use std::sync::Arc;
use std::thread;

use approx::assert_abs_diff_eq;
use ndarray::Array2;
use synthseis::SeisError;
use synthseis::earth::{EarthModel, Layer, MemoryStore, ModelDescriptor, PaletteImage, Rgb};
use synthseis::reflectivity::{
    MonteCarloAvo, ReflectivityMethod, reflectivity, reflectivity_series, reflectivity_strict,
};
use synthseis::rock::RockProperties;
use synthseis::synth::{ForwardModel, SeismicParams};
use synthseis::types::{AngleAxis, Domain};
use synthseis::wavelet::WaveletShape;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn shale() -> RockProperties {
    RockProperties::new(2000.0, 1000.0, 2450.0).unwrap()
}

fn sand() -> RockProperties {
    RockProperties::new(2500.0, 1400.0, 2300.0).unwrap()
}

/// 100 m of shale over 100 m of sand, 1 m samples.
fn two_layer_model() -> EarthModel {
    EarthModel::from_layers(
        &[Layer::new(shale(), 100.0).unwrap(), Layer::new(sand(), 100.0).unwrap()],
        1.0,
    )
    .unwrap()
}

/// Shale with a sand wedge thickening by one 2 m sample per trace.
fn wedge_model(n_traces: usize) -> EarthModel {
    let classes = Array2::from_shape_fn((60, n_traces), |(row, trace)| {
        usize::from((20..20 + trace).contains(&row))
    });
    EarthModel::new(classes, vec![shale(), sand()], 2.0, 10.0, Domain::Depth).unwrap()
}

/// Default forward model with a 100 ms wavelet, shorter than every test trace.
fn forward() -> ForwardModel {
    ForwardModel::new().duration(0.1)
}

fn argmax_abs(values: &[f64]) -> usize {
    values
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.abs().total_cmp(&b.1.abs()))
        .map_or(0, |(i, _)| i)
}

// ---------------------------------------------------------------------------
// Layered pipeline
// ---------------------------------------------------------------------------

#[test]
fn layered_model_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    let volume = forward()
        .angles(AngleAxis::range(0.0, 30.0, 10.0))
        .run(&two_layer_model())?;

    // 100 m at 2000 m/s plus 100 m at 2500 m/s is 0.18 s two-way
    assert_eq!(volume.data().dim(), (180, 1, 4, 1));
    assert_eq!(volume.axes().domain, Domain::Time);
    assert_eq!(volume.axes().angles, vec![0.0, 10.0, 20.0, 30.0]);
    assert_eq!(volume.axes().frequencies, vec![25.0]);

    let r0 = (2500.0 * 2300.0 - 2000.0 * 2450.0) / (2500.0 * 2300.0 + 2000.0 * 2450.0);
    let trace = volume.trace(0, 0, 0).to_vec();
    let peak = argmax_abs(&trace);
    assert!((99..=100).contains(&peak), "peak at {peak}");
    assert_abs_diff_eq!(trace[peak], r0, epsilon = 1e-12);
    assert_abs_diff_eq!(volume.max_amplitude(), r0, epsilon = 1e-12);
    assert!(volume.min_amplitude() < 0.0);
    Ok(())
}

#[test]
fn amplitude_follows_reflectivity_with_angle() -> Result<(), Box<dyn std::error::Error>> {
    let angles = [0.0, 10.0, 20.0, 30.0];
    let volume = forward()
        .angles(AngleAxis::range(0.0, 30.0, 10.0))
        .run(&two_layer_model())?;
    let expected = reflectivity(&shale(), &sand(), &angles, ReflectivityMethod::Zoeppritz)?;

    let peak = argmax_abs(&volume.trace(0, 0, 0).to_vec());
    for (a, r) in expected.iter().enumerate() {
        assert_abs_diff_eq!(volume.trace(0, a, 0)[peak], *r, epsilon = 1e-12);
    }
    Ok(())
}

#[test]
fn depth_synthesis_keeps_depth_axis() -> Result<(), Box<dyn std::error::Error>> {
    let volume = forward()
        .time_domain(false)
        .run(&two_layer_model())?;
    assert_eq!(volume.data().dim(), (200, 1, 1, 1));
    assert_eq!(volume.axes().domain, Domain::Depth);
    assert_eq!(volume.axes().step, 1.0);
    Ok(())
}

#[test]
fn post_critical_policy() -> Result<(), Box<dyn std::error::Error>> {
    let upper = RockProperties::new(1500.0, 1200.0, 2000.0)?;
    let lower = RockProperties::new(1800.0, 1400.0, 2200.0)?;
    let r = reflectivity(&upper, &lower, &[20.0, 60.0], ReflectivityMethod::Zoeppritz)?;
    assert!(r[0] != 0.0);
    assert_eq!(r[1], 0.0);

    let strict = reflectivity_strict(&upper, &lower, &[20.0, 60.0], ReflectivityMethod::Zoeppritz);
    assert!(matches!(strict, Err(SeisError::NumericalError { .. })));
    Ok(())
}

#[test]
fn fluid_layer_rejected_by_approximations() {
    let water = RockProperties::new(1500.0, 0.0, 1000.0).unwrap();
    let r = reflectivity(&water, &sand(), &[10.0], ReflectivityMethod::Shuey2);
    assert!(matches!(r, Err(SeisError::InvalidInput { .. })));
    assert!(reflectivity(&water, &sand(), &[10.0], ReflectivityMethod::Zoeppritz).is_ok());
}

#[test]
fn series_broadcasts_single_rock() -> Result<(), Box<dyn std::error::Error>> {
    let lowers = [
        sand(),
        RockProperties::new(2200.0, 1200.0, 2350.0)?,
        RockProperties::new(3000.0, 1700.0, 2500.0)?,
    ];
    let theta = [0.0, 15.0, 30.0];
    let grid = reflectivity_series(&[shale()], &lowers, &theta, ReflectivityMethod::AkiRichards)?;
    assert_eq!(grid.dim(), (3, 3));
    for (i, lower) in lowers.iter().enumerate() {
        let row = reflectivity(&shale(), lower, &theta, ReflectivityMethod::AkiRichards)?;
        for (j, r) in row.iter().enumerate() {
            assert_eq!(grid[[i, j]], *r);
        }
    }

    let bad = reflectivity_series(&[shale(), sand()], &lowers, &theta, ReflectivityMethod::Zoeppritz);
    assert!(matches!(bad, Err(SeisError::ShapeMismatch { .. })));
    Ok(())
}

// ---------------------------------------------------------------------------
// 2-D models
// ---------------------------------------------------------------------------

#[test]
fn image_model_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    const RED: Rgb = Rgb::new(255, 0, 0);
    const BLUE: Rgb = Rgb::new(0, 0, 255);
    // trace 0 is all red; traces 1 and 2 turn blue halfway down
    let indices = Array2::from_shape_fn((40, 3), |(r, c)| usize::from(c > 0 && r >= 20));
    let image = PaletteImage::new(vec![RED, BLUE], indices)?;

    let mut mapping = std::collections::BTreeMap::new();
    mapping.insert(RED, shale());
    mapping.insert(BLUE, RockProperties::new(3000.0, 1500.0, 2400.0)?);
    let model = EarthModel::from_image(&image, &mapping, 200.0, 30.0, Domain::Depth)?;
    assert_eq!(model.dx(), 10.0);

    let volume = forward().run(&model)?;
    // the shortest column is 0.1 s of shale plus 0.0667 s of fast rock
    assert_eq!(volume.data().dim(), (166, 3, 1, 1));
    assert_eq!(volume.axes().dx, 10.0);
    assert!(volume.trace(0, 0, 0).iter().all(|&v| v == 0.0));
    assert!(volume.trace(1, 0, 0).iter().any(|&v| v > 0.1));
    assert_eq!(volume.trace(1, 0, 0), volume.trace(2, 0, 0));
    Ok(())
}

#[test]
fn stored_rock_descriptor_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    let mut store = MemoryStore::default();
    store.insert_rock("shale", shale());
    store.insert_rock("sand", sand());

    let descriptor: ModelDescriptor = serde_json::from_str(
        r#"{"type": "layers", "dz": 1.0, "layers": [
            {"rock": "shale", "thickness": 100.0},
            {"rock": "sand", "thickness": 100.0}
        ]}"#,
    )?;
    let model = descriptor.resolve(&store, None)?;
    let from_store = forward().run(&model)?;
    let direct = forward().run(&two_layer_model())?;
    assert_eq!(from_store, direct);
    Ok(())
}

#[test]
fn wedge_model_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    let volume = forward()
        .wavelet(WaveletShape::Ricker { frequency: 30.0 })
        .run(&wedge_model(20))?;
    assert_eq!(volume.data().dim().1, 20);
    // no sand in the first trace
    assert!(volume.trace(0, 0, 0).iter().all(|&v| v == 0.0));

    // the thickest wedge resolves a positive top and a negative base
    let thick = volume.trace(19, 0, 0);
    assert!(thick.iter().any(|&v| v > 0.05));
    assert!(thick.iter().any(|&v| v < -0.05));
    Ok(())
}

#[test]
fn frequency_gather() -> Result<(), Box<dyn std::error::Error>> {
    let params: SeismicParams = serde_json::from_str(
        r#"{
            "duration": 0.1,
            "frequencies": {"kind": "linear", "start": 10.0, "end": 40.0, "step": 10.0},
            "angles": {"range": {"min": 0.0, "max": 20.0, "step": 10.0}}
        }"#,
    )?;
    let volume = ForwardModel::from_params(params).run(&two_layer_model())?;
    assert_eq!(volume.data().dim(), (180, 1, 3, 4));
    assert_eq!(volume.axes().frequencies, vec![10.0, 20.0, 30.0, 40.0]);
    Ok(())
}

// ---------------------------------------------------------------------------
// Request parameters and randomness
// ---------------------------------------------------------------------------

#[test]
fn json_request_with_noise_is_reproducible() -> Result<(), Box<dyn std::error::Error>> {
    let params: SeismicParams = serde_json::from_str(
        r#"{
            "wavelet": {"kind": "ormsby", "f1": 5.0, "f2": 10.0, "f3": 40.0, "f4": 50.0},
            "duration": 0.15,
            "angles": {"range": {"min": 0.0, "max": 30.0, "step": 15.0}},
            "method": "akirichards",
            "snr_db": 10.0,
            "seed": 7
        }"#,
    )?;
    let model = two_layer_model();
    let a = ForwardModel::from_params(params).run(&model)?;
    let b = ForwardModel::from_params(params).run(&model)?;
    assert_eq!(a.data().dim(), (180, 1, 3, 1));
    assert_eq!(a, b);

    let clean = ForwardModel::from_params(SeismicParams {
        snr_db: None,
        ..params
    })
    .run(&model)?;
    assert_ne!(a, clean);
    Ok(())
}

#[test]
fn stochastic_model_is_seeded() -> Result<(), Box<dyn std::error::Error>> {
    let uncertain = EarthModel::from_layers(
        &[
            Layer::new(shale().with_uncertainty(50.0, 30.0, 20.0)?, 100.0)?,
            Layer::new(sand().with_uncertainty(50.0, 30.0, 20.0)?, 100.0)?,
        ],
        1.0,
    )?;
    let stochastic = forward().stochastic(true);
    let a = stochastic.clone().seed(3).run(&uncertain)?;
    let b = stochastic.clone().seed(3).run(&uncertain)?;
    let c = stochastic.seed(4).run(&uncertain)?;
    assert_eq!(a, b);
    assert_ne!(a, c);
    Ok(())
}

#[test]
fn monte_carlo_without_uncertainty_is_deterministic() -> Result<(), Box<dyn std::error::Error>> {
    let theta = [0.0, 10.0, 20.0, 30.0];
    let stats = MonteCarloAvo::new(50, 1)?.run(&shale(), &sand(), &theta)?;
    let exact = reflectivity(&shale(), &sand(), &theta, ReflectivityMethod::Zoeppritz)?;
    for i in 0..theta.len() {
        assert_abs_diff_eq!(stats.mean[i], exact[i], epsilon = 1e-12);
        assert!(stats.std[i] < 1e-12);
    }
    assert_eq!(stats.intercept_gradient.len(), 50);
    Ok(())
}

#[test]
fn monte_carlo_is_seeded() -> Result<(), Box<dyn std::error::Error>> {
    let upper = shale().with_uncertainty(40.0, 20.0, 15.0)?;
    let lower = sand().with_uncertainty(60.0, 30.0, 25.0)?;
    let theta = [0.0, 15.0, 30.0];
    let mc = MonteCarloAvo::new(300, 11)?.method(ReflectivityMethod::Shuey3);
    let a = mc.run(&upper, &lower, &theta)?;
    let b = mc.run(&upper, &lower, &theta)?;
    assert_eq!(a, b);
    assert!(a.std.iter().all(|&s| s > 0.0));

    let c = MonteCarloAvo::new(300, 12)?
        .method(ReflectivityMethod::Shuey3)
        .run(&upper, &lower, &theta)?;
    assert_ne!(a.mean, c.mean);
    Ok(())
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[test]
fn models_are_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<EarthModel>();
    assert_send_sync::<ForwardModel>();
    assert_send_sync::<synthseis::SeismicVolume>();
    assert_send_sync::<MemoryStore>();
}

#[test]
fn concurrent_forward_runs() -> Result<(), Box<dyn std::error::Error>> {
    let model = Arc::new(wedge_model(8));
    let reference = forward()
        .angles(AngleAxis::Single(15.0))
        .run(&model)?;

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let m = Arc::clone(&model);
            thread::spawn(move || {
                forward().angles(AngleAxis::Single(15.0)).run(&m)
            })
        })
        .collect();

    for h in handles {
        let volume = h.join().expect("thread panicked")?;
        assert_eq!(volume, reference);
    }
    Ok(())
}
