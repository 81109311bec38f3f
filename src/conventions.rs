//! Rock-physics conventions shared across the crate.
//!
//! Units are SI throughout: velocities in m/s, densities in kg/m³, elastic
//! moduli in Pa, depths in metres and times in seconds. Travel times are
//! **two-way** times, the convention used by seismic sections.

/// Feet per metre, used by the Gardner relation (defined in ft/s).
const FEET_PER_METRE: f64 = 3.28084;

/// Acoustic impedance Z = vp · ρ.
pub fn acoustic_impedance(vp: f64, rho: f64) -> f64 {
    vp * rho
}

/// Shear modulus μ = ρ · vs².
pub fn shear_modulus(vs: f64, rho: f64) -> f64 {
    rho * vs * vs
}

/// Bulk modulus K = ρ · (vp² − 4/3 · vs²).
pub fn bulk_modulus(vp: f64, vs: f64, rho: f64) -> f64 {
    rho * (vp * vp - 4.0 / 3.0 * vs * vs)
}

/// Poisson's ratio ν = ((vp/vs)² − 2) / (2·((vp/vs)² − 1)).
pub fn poisson_ratio(vp: f64, vs: f64) -> f64 {
    let g = (vp / vs) * (vp / vs);
    (g - 2.0) / (2.0 * (g - 1.0))
}

/// Gardner density estimate ρ = 1000 · 0.23 · (vp in ft/s)^0.25, in kg/m³.
pub fn gardner_density(vp: f64) -> f64 {
    1000.0 * 0.23 * (vp * FEET_PER_METRE).powf(0.25)
}

/// Two-way travel time across a layer of thickness `dz` at velocity `vp`.
pub fn two_way_time(dz: f64, vp: f64) -> f64 {
    2.0 * dz / vp
}

/// Normal-incidence reflection coefficient (Z₂ − Z₁) / (Z₂ + Z₁).
pub fn normal_incidence(z_upper: f64, z_lower: f64) -> f64 {
    (z_lower - z_upper) / (z_lower + z_upper)
}
