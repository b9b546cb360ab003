//! Synthetic finite ruptures
//!
//! Generates a planar fault discretised into a regular grid of subfaults,
//! with a circular rupture front spreading from the hypocenter at the fault
//! center. Useful for exercising the centroid computation without data files.

use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

use crate::finite::FiniteSource;
use crate::geodetic::{GeodeticPoint, EARTH_RADIUS_M};
use crate::source::Source;
use crate::{Result, SourceError};

/// Fault geometry and kinematics of a synthetic rupture
#[derive(Debug, Clone)]
pub struct RuptureSimConfig {
    pub hypocenter_latitude: f64,
    pub hypocenter_longitude: f64,
    pub hypocenter_depth_m: f64,
    /// Fault angles [deg]
    pub strike: f64,
    pub dip: f64,
    pub rake: f64,
    /// Fault extent along strike and down dip [m]
    pub length_m: f64,
    pub width_m: f64,
    pub n_along_strike: usize,
    pub n_down_dip: usize,
    /// [m/s]
    pub rupture_velocity: f64,
    /// Duration of the triangular sliprate of every subfault [s]
    pub rise_time: f64,
    pub dt: f64,
    pub mean_slip_m: f64,
    /// Standard deviation of the slip relative to `mean_slip_m`
    pub slip_jitter: f64,
    pub rigidity_pa: f64,
    pub seed: u64,
}

impl Default for RuptureSimConfig {
    fn default() -> Self {
        Self {
            hypocenter_latitude: 35.0,
            hypocenter_longitude: -120.0,
            hypocenter_depth_m: 12_000.0,
            strike: 30.0,
            dip: 60.0,
            rake: 90.0,
            length_m: 20_000.0,
            width_m: 10_000.0,
            n_along_strike: 8,
            n_down_dip: 4,
            rupture_velocity: 2_800.0,
            rise_time: 1.0,
            dt: 0.05,
            mean_slip_m: 1.0,
            slip_jitter: 0.2,
            rigidity_pa: 32e9,
            seed: 42,
        }
    }
}

impl RuptureSimConfig {
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("length_m", self.length_m),
            ("width_m", self.width_m),
            ("rupture_velocity", self.rupture_velocity),
            ("dt", self.dt),
            ("mean_slip_m", self.mean_slip_m),
            ("rigidity_pa", self.rigidity_pa),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(SourceError::InvalidConfig(format!(
                    "{name} must be positive and finite"
                )));
            }
        }

        if self.n_along_strike == 0 || self.n_down_dip == 0 {
            return Err(SourceError::InvalidConfig(
                "the subfault grid must not be empty".to_string(),
            ));
        }

        if !(self.rise_time >= 2.0 * self.dt) {
            return Err(SourceError::InvalidConfig(
                "rise_time must span at least two samples".to_string(),
            ));
        }

        if !(self.slip_jitter >= 0.0) {
            return Err(SourceError::InvalidConfig(
                "slip_jitter must not be negative".to_string(),
            ));
        }

        let top = self.hypocenter_depth_m - 0.5 * self.width_m * self.dip.to_radians().sin();
        if top < 0.0 {
            return Err(SourceError::InvalidConfig(
                "the fault reaches above the surface".to_string(),
            ));
        }

        Ok(())
    }

    fn subfault_area(&self) -> f64 {
        self.length_m * self.width_m / (self.n_along_strike * self.n_down_dip) as f64
    }
}

/// Triangle of unit peak lasting `rise_time`, sampled at `dt`
fn triangle(rise_time: f64, dt: f64) -> Vec<f64> {
    let nsamp = (rise_time / dt).round() as usize + 1;
    let half = 0.5 * rise_time;
    (0..nsamp)
        .map(|i| {
            let t = i as f64 * dt;
            if t <= half {
                t / half
            } else {
                ((rise_time - t) / half).max(0.0)
            }
        })
        .collect()
}

/// Build a finite source from `config`. Subfault slips are drawn from a
/// seeded normal distribution and clipped at zero.
pub fn generate_rupture(config: &RuptureSimConfig) -> Result<FiniteSource> {
    config.validate()?;

    let mut rng = rand::rngs::StdRng::seed_from_u64(config.seed);
    let slip_dist = Normal::new(1.0, config.slip_jitter)
        .map_err(|err| SourceError::InvalidConfig(format!("slip distribution: {err}")))?;

    let hypocenter = GeodeticPoint::new(
        config.hypocenter_latitude,
        config.hypocenter_longitude,
        Some(config.hypocenter_depth_m),
    )?;
    let (sin_strike, cos_strike) = config.strike.to_radians().sin_cos();
    let (sin_dip, cos_dip) = config.dip.to_radians().sin_cos();
    let cos_lat = hypocenter.latitude_rad().cos();
    let area = config.subfault_area();
    let sliprate = triangle(config.rise_time, config.dt);

    let dx = config.length_m / config.n_along_strike as f64;
    let dy = config.width_m / config.n_down_dip as f64;
    let mut sources = Vec::with_capacity(config.n_along_strike * config.n_down_dip);

    for j in 0..config.n_down_dip {
        // offset down dip from the hypocenter, measured in the fault plane
        let d = (j as f64 + 0.5) * dy - 0.5 * config.width_m;
        for i in 0..config.n_along_strike {
            let s = (i as f64 + 0.5) * dx - 0.5 * config.length_m;

            let north = s * cos_strike - d * sin_strike * cos_dip;
            let east = s * sin_strike + d * cos_strike * cos_dip;
            let down = d * sin_dip;

            let point = GeodeticPoint::new(
                config.hypocenter_latitude + (north / EARTH_RADIUS_M).to_degrees(),
                config.hypocenter_longitude + (east / (EARTH_RADIUS_M * cos_lat)).to_degrees(),
                Some(config.hypocenter_depth_m + down),
            )?;

            let slip = config.mean_slip_m * slip_dist.sample(&mut rng).max(0.0);
            let m0 = config.rigidity_pa * area * slip;
            let rupture_time = s.hypot(d) / config.rupture_velocity;

            let mut source =
                Source::from_strike_dip_rake(point, config.strike, config.dip, config.rake, m0);
            source.set_sliprate(sliprate.clone(), config.dt, Some(rupture_time), true)?;
            sources.push(source);
        }
    }

    tracing::debug!(
        npointsources = sources.len(),
        seed = config.seed,
        "generated synthetic rupture"
    );

    let mut finite = FiniteSource::new(sources);
    finite.set_hypocenter(hypocenter);
    Ok(finite)
}

/// Root mean square of the sample-wise difference over the common length
pub fn rms_difference(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    if n == 0 {
        return 0.0;
    }
    let sum_sq: f64 = a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum();
    (sum_sq / n as f64).sqrt()
}
