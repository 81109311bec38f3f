//! AVO curves for every reflectivity method, with Monte-Carlo spread.
//!
//! Demonstrates:
//!   1. Comparing the exact Zoeppritz solution with its linearizations
//!   2. The critical angle and the post-critical policy
//!   3. Mean and standard deviation of reflectivity under property uncertainty
//!
//! Run with: `cargo run --example avo_curves`

use synthseis::reflectivity::{MonteCarloAvo, ReflectivityMethod, critical_angle, reflectivity};
use synthseis::rock::RockProperties;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Shale over brine sand
    let shale = RockProperties::new(2400.0, 1100.0, 2450.0)?.with_uncertainty(60.0, 40.0, 25.0)?;
    let sand = RockProperties::new(3000.0, 1600.0, 2250.0)?.with_uncertainty(90.0, 50.0, 30.0)?;

    let theta: Vec<f64> = (0..=8).map(|i| 5.0 * f64::from(i)).collect();

    // ---------------------------------------------------------------
    // 1. Deterministic curves
    // ---------------------------------------------------------------

    print!("{:>12}", "method");
    for t in &theta {
        print!("{t:>8.0}");
    }
    println!();
    println!("{}", "-".repeat(12 + 8 * theta.len()));
    for method in ReflectivityMethod::ALL {
        let r = reflectivity(&shale, &sand, &theta, method)?;
        print!("{:>12}", method.name());
        for v in r {
            print!("{v:>8.4}");
        }
        println!();
    }

    // ---------------------------------------------------------------
    // 2. Critical angle
    // ---------------------------------------------------------------

    match critical_angle(&shale, &sand) {
        Some(c) => println!("\nCritical angle: {c:.2}° (coefficients beyond it are reported as 0)"),
        None => println!("\nNo critical angle: the lower medium is slower"),
    }

    // ---------------------------------------------------------------
    // 3. Monte-Carlo spread
    // ---------------------------------------------------------------

    let stats = MonteCarloAvo::new(2000, 7)?.run(&shale, &sand, &theta)?;
    println!("\n{:>8} {:>10} {:>10}", "angle", "mean", "std");
    println!("{}", "-".repeat(30));
    for ((t, m), s) in stats.theta.iter().zip(&stats.mean).zip(&stats.std) {
        println!("{t:>8.0} {m:>10.4} {s:>10.4}");
    }

    let n = stats.intercept_gradient.len() as f64;
    let (a, b) = stats
        .intercept_gradient
        .iter()
        .fold((0.0, 0.0), |(sa, sb), (a, b)| (sa + a / n, sb + b / n));
    println!("\nMean intercept {a:.4}, mean gradient {b:.4}");

    Ok(())
}
