//! Centroid of a synthetic rupture
//!
//! Generates a planar thrust rupture, collapses it into its centroid moment
//! tensor and writes the result to `out/centroid.json`.
//! Set `RUST_LOG=debug` to follow the centroid stages.

use std::fs::{self, File};
use std::io::Write;

use seismic_source::source::Located;
use seismic_source::synthetic::rms_difference;
use seismic_source::{generate_rupture, CentroidConfig, RuptureSimConfig, SourceConfig};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => SourceConfig::from_toml_file(path)?,
        None => SourceConfig::default(),
    };

    let sim = RuptureSimConfig {
        rigidity_pa: config.rupture.rigidity_pa,
        ..RuptureSimConfig::default()
    };
    println!("Configuration:");
    println!(
        "  Hypocenter: {:.3} deg, {:.3} deg, {:.0} m",
        sim.hypocenter_latitude, sim.hypocenter_longitude, sim.hypocenter_depth_m
    );
    println!("  Strike/dip/rake: {}/{}/{} deg", sim.strike, sim.dip, sim.rake);
    println!("  Grid: {} x {} subfaults", sim.n_along_strike, sim.n_down_dip);
    println!("  Rupture velocity: {} m/s", sim.rupture_velocity);
    println!();

    let mut finite = generate_rupture(&sim)?;
    println!("{finite}");

    let mut sequential = finite.clone();
    let cmt = finite.compute_centroid_with(&config.centroid)?.clone();
    let check = sequential
        .compute_centroid_with(&CentroidConfig {
            parallel: false,
            ..config.centroid.clone()
        })?
        .clone();

    let stf = cmt.sliprate().ok_or("centroid has no sliprate")?;
    let m = cmt.moment_tensor();
    println!("Centroid:");
    println!("  Latitude:  {:9.4} deg", cmt.latitude());
    println!("  Longitude: {:9.4} deg", cmt.longitude());
    println!("  Depth:     {:9.1} m", cmt.depth_in_m().unwrap_or(0.0));
    println!("  Mw:        {:9.2}", cmt.moment_magnitude());
    println!("  Mrr Mtt Mpp: {:10.3e} {:10.3e} {:10.3e}", m.m_rr, m.m_tt, m.m_pp);
    println!("  Mrt Mrp Mtp: {:10.3e} {:10.3e} {:10.3e}", m.m_rt, m.m_rp, m.m_tp);
    println!("  STF: {} samples at {} s, integral {:.4}", stf.len(), stf.dt(), stf.integral());

    let diff = rms_difference(
        stf.samples(),
        check.sliprate().map(|s| s.samples()).unwrap_or_default(),
    );
    println!("  RMS difference sequential vs parallel STF: {diff:.3e}");

    fs::create_dir_all("out")?;
    let mut file = File::create("out/centroid.json")?;
    file.write_all(serde_json::to_string_pretty(&cmt)?.as_bytes())?;
    println!("\nWrote out/centroid.json");

    Ok(())
}
