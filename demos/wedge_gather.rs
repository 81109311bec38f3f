//! Wedge model and tuning curve.
//!
//! Demonstrates the forward-modelling workflow on a 2-D model:
//!   1. Build a class grid with a sand wedge pinching out in shale
//!   2. Convert to two-way time and synthesize near and far angles
//!   3. Read the tuning curve (peak amplitude against wedge thickness)
//!
//! Run with: `cargo run --example wedge_gather`

use ndarray::Array2;
use synthseis::earth::EarthModel;
use synthseis::rock::RockProperties;
use synthseis::synth::ForwardModel;
use synthseis::types::{AngleAxis, Domain};
use synthseis::wavelet::WaveletShape;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ---------------------------------------------------------------
    // 1. Wedge: 0 to 40 m of gas sand, 1 m depth samples
    // ---------------------------------------------------------------

    let shale = RockProperties::new(2400.0, 1100.0, 2450.0)?;
    let gas_sand = RockProperties::new(2600.0, 1600.0, 2100.0)?;

    let n_traces = 41;
    let top = 100;
    let classes = Array2::from_shape_fn((250, n_traces), |(row, trace)| {
        usize::from((top..top + trace).contains(&row))
    });
    let model = EarthModel::new(classes, vec![shale, gas_sand], 1.0, 12.5, Domain::Depth)?;

    // ---------------------------------------------------------------
    // 2. Near (5°) and far (30°) stacks with a 30 Hz Ricker
    // ---------------------------------------------------------------

    let volume = ForwardModel::new()
        .wavelet(WaveletShape::Ricker { frequency: 30.0 })
        .duration(0.128)
        .angles(AngleAxis::range(5.0, 30.0, 25.0))
        .run(&model)?;

    let (n_samples, _, n_angles, _) = volume.data().dim();
    println!(
        "Synthetic: {n_samples} samples of {} ms, {n_traces} traces, {n_angles} angles",
        volume.axes().step * 1e3
    );
    println!(
        "Amplitude range: {:.4} to {:.4}\n",
        volume.min_amplitude(),
        volume.max_amplitude()
    );

    // ---------------------------------------------------------------
    // 3. Tuning curve
    // ---------------------------------------------------------------

    println!("{:>12} {:>10} {:>10}", "thickness m", "near", "far");
    println!("{}", "-".repeat(34));
    for trace in (0..n_traces).step_by(4) {
        let peak = |angle: usize| {
            volume
                .trace(trace, angle, 0)
                .iter()
                .fold(0.0_f64, |m, v| m.max(v.abs()))
        };
        println!("{trace:>12} {:>10.4} {:>10.4}", peak(0), peak(1));
    }

    Ok(())
}
