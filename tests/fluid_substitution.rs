//! Integration tests for Gassmann fluid substitution.
//!
//! Reservoir: 25 % porosity sand with 10 % clay, brine-saturated in situ,
//! between two shales. Pore fluids mix brine and gas end members by
//! Wood's rule.

use approx::assert_relative_eq;
use synthseis::fluidsub::{Elastic, FluidSubModel, Minerals, smith_substitution};
use synthseis::rock::Fluid;
use synthseis::synth::ForwardModel;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn brine() -> Fluid {
    Fluid::new(1090.0, 250.0, 2.8e9, 0.05e9, 1.0).unwrap()
}

fn gas() -> Fluid {
    Fluid::new(1090.0, 250.0, 2.8e9, 0.05e9, 0.1).unwrap()
}

const RESERVOIR_JSON: &str = r#"{
    "dz": 1.0,
    "layers": [
        {"rock": {"vp": 2400.0, "vs": 1100.0, "rho": 2450.0}, "thickness": 100.0},
        {
            "rock": {
                "vp": 3000.0, "vs": 1600.0, "rho": 2250.0,
                "porosity": 0.25, "vclay": 0.1,
                "fluid": {"rho_w": 1090.0, "rho_hc": 250.0, "k_w": 2.8e9, "k_hc": 0.05e9, "s_w": 1.0}
            },
            "thickness": 100.0,
            "subfluids": [
                {
                    "fluid": {"rho_w": 1090.0, "rho_hc": 250.0, "k_w": 2.8e9, "k_hc": 0.05e9, "s_w": 0.1},
                    "thickness": 50.0
                }
            ]
        },
        {"rock": {"vp": 2400.0, "vs": 1100.0, "rho": 2450.0}, "thickness": 100.0}
    ]
}"#;

fn argmax_abs(values: &[f64]) -> usize {
    values
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.abs().total_cmp(&b.1.abs()))
        .map_or(0, |(i, _)| i)
}

// ---------------------------------------------------------------------------
// Rock physics
// ---------------------------------------------------------------------------

#[test]
fn gas_lowers_impedance() {
    let sand = Elastic {
        vp: 3000.0,
        vs: 1600.0,
        rho: 2250.0,
    };
    let sub = smith_substitution(sand, 0.25, 0.1, &brine(), &gas(), &Minerals::default());
    assert!(sub.vp * sub.rho < sand.vp * sand.rho);
    // shear modulus is fluid-independent, so vs rises as density drops
    assert_relative_eq!(sub.vs * sub.vs * sub.rho, sand.vs * sand.vs * sand.rho, max_relative = 1e-12);
}

#[test]
fn substitution_round_trip() {
    let sand = Elastic {
        vp: 3000.0,
        vs: 1600.0,
        rho: 2250.0,
    };
    let minerals = Minerals::default();
    let gassy = smith_substitution(sand, 0.25, 0.1, &brine(), &gas(), &minerals);
    let back = smith_substitution(gassy, 0.25, 0.1, &gas(), &brine(), &minerals);
    assert_relative_eq!(back.vp, sand.vp, max_relative = 1e-9);
    assert_relative_eq!(back.vs, sand.vs, max_relative = 1e-9);
    assert_relative_eq!(back.rho, sand.rho, max_relative = 1e-9);
}

#[test]
fn stiffer_minerals_change_the_result() {
    let sand = Elastic {
        vp: 3000.0,
        vs: 1600.0,
        rho: 2250.0,
    };
    let soft = smith_substitution(sand, 0.25, 0.1, &brine(), &gas(), &Minerals::default());
    let stiff = smith_substitution(
        sand,
        0.25,
        0.1,
        &brine(),
        &gas(),
        &Minerals {
            k_clay: 25.0e9,
            k_quartz: 45.0e9,
        },
    );
    assert!(soft.vp != stiff.vp);
    assert_eq!(soft.rho, stiff.rho);
}

// ---------------------------------------------------------------------------
// Models
// ---------------------------------------------------------------------------

#[test]
fn json_model_substitutes_interval() -> Result<(), Box<dyn std::error::Error>> {
    let model: FluidSubModel = serde_json::from_str(RESERVOIR_JSON)?;
    assert_eq!(model.layers().len(), 3);
    assert_eq!(model.minerals(), &Minerals::default());

    let (original, substituted) = model.logs(None)?;
    assert_eq!(original.n_samples(), 300);
    // shale above and below, and the brine leg of the sand, are untouched
    for s in (0..100).chain(150..300) {
        assert_eq!(substituted.vp[[s, 0]], original.vp[[s, 0]], "sample {s}");
        assert_eq!(substituted.rho[[s, 0]], original.rho[[s, 0]], "sample {s}");
    }
    for s in 100..150 {
        assert_relative_eq!(substituted.vp[[s, 0]], 2595.110_825_363_084_6, max_relative = 1e-12);
        assert_relative_eq!(substituted.rho[[s, 0]], 2061.0, max_relative = 1e-12);
    }
    Ok(())
}

#[test]
fn gas_reverses_top_reservoir_polarity() -> Result<(), Box<dyn std::error::Error>> {
    let model: FluidSubModel = serde_json::from_str(RESERVOIR_JSON)?;
    let result = model.run(&ForwardModel::new().duration(0.1))?;
    assert_eq!(result.synthetic.data().dim(), result.synthetic_sub.data().dim());

    // top of reservoir at 100 m of 2400 m/s shale, about 83 ms two-way
    let window = 0..100;
    let brine_trace = result.synthetic.trace(0, 0, 0).to_vec();
    let gas_trace = result.synthetic_sub.trace(0, 0, 0).to_vec();
    let b = argmax_abs(&brine_trace[window.clone()]);
    let g = argmax_abs(&gas_trace[window]);
    assert!((82..=84).contains(&b), "brine top at {b}");
    assert_eq!(b, g);
    assert!(brine_trace[b] > 0.0);
    assert!(gas_trace[g] < 0.0);
    Ok(())
}

#[test]
fn stochastic_run_is_seeded() -> Result<(), Box<dyn std::error::Error>> {
    let json = RESERVOIR_JSON.replace(
        r#""vp": 3000.0, "vs": 1600.0, "rho": 2250.0,"#,
        r#""vp": 3000.0, "vs": 1600.0, "rho": 2250.0, "vp_std": 60.0, "vs_std": 40.0, "rho_std": 20.0,"#,
    );
    let model: FluidSubModel = serde_json::from_str(&json)?;
    let forward = ForwardModel::new().duration(0.1).stochastic(true);

    let a = model.run(&forward.clone().seed(9))?;
    let b = model.run(&forward.clone().seed(9))?;
    let c = model.run(&forward.seed(10))?;
    assert_eq!(a, b);
    assert_ne!(a.original, c.original);
    // the realization feeds both columns
    assert_ne!(a.original.vp[[120, 0]], 3000.0);
    assert!(a.substituted.vp[[120, 0]] < a.original.vp[[120, 0]]);
    Ok(())
}

#[test]
fn reservoir_data_required_for_subfluids() {
    let json = RESERVOIR_JSON.replace(r#""porosity": 0.25, "vclay": 0.1,"#, "");
    assert!(serde_json::from_str::<FluidSubModel>(&json).is_err());
}
