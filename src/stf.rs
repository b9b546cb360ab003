//! Source time functions
//!
//! A source time function (sliprate) is a uniformly sampled rate series
//! starting at t = 0. Normalized series integrate to one under the
//! trapezoidal rule so the physical moment lives entirely in the tensor.

use serde::{Deserialize, Serialize};

use crate::filter;
use crate::{Result, SourceError};

/// Uniformly sampled sliprate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceTimeFunction {
    samples: Vec<f64>,
    /// Sampling interval [s]
    dt: f64,
}

fn check_sampling(dt: f64, nsamp: usize) -> Result<()> {
    if !(dt > 0.0) || !dt.is_finite() {
        return Err(SourceError::Validation(format!(
            "sampling interval must be positive and finite, got {dt}"
        )));
    }
    if nsamp == 0 {
        return Err(SourceError::Validation(
            "a source time function needs at least one sample".to_string(),
        ));
    }
    Ok(())
}

/// Trapezoidal-rule integral of `samples` with spacing `dx`
pub fn trapezoid(samples: &[f64], dx: f64) -> f64 {
    samples
        .windows(2)
        .map(|pair| 0.5 * (pair[0] + pair[1]) * dx)
        .sum()
}

impl SourceTimeFunction {
    pub fn new(samples: Vec<f64>, dt: f64) -> Result<Self> {
        check_sampling(dt, samples.len())?;
        Ok(Self { samples, dt })
    }

    /// Unit impulse of height 1/dt at sample 0
    pub fn dirac(dt: f64, nsamp: usize) -> Result<Self> {
        check_sampling(dt, nsamp)?;
        let mut samples = vec![0.0; nsamp];
        samples[0] = 1.0 / dt;
        Ok(Self { samples, dt })
    }

    /// Dirac impulse passed through a Butterworth lowpass
    pub fn lowpassed_dirac(
        dt: f64,
        nsamp: usize,
        freq: f64,
        corners: usize,
        zerophase: bool,
    ) -> Result<Self> {
        let mut stf = Self::dirac(dt, nsamp)?;
        stf.lowpass(freq, corners, zerophase)?;
        Ok(stf)
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<f64> {
        self.samples
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Length of the sampled window, dt * n [s]
    pub fn duration(&self) -> f64 {
        self.dt * self.samples.len() as f64
    }

    /// Trapezoidal-rule time integral
    pub fn integral(&self) -> f64 {
        trapezoid(&self.samples, self.dt)
    }

    /// Scale the samples so that the time integral equals one
    pub fn normalize(&mut self) -> Result<()> {
        let integral = self.integral();
        if integral == 0.0 || !integral.is_finite() {
            return Err(SourceError::Validation(format!(
                "cannot normalize a sliprate with integral {integral}"
            )));
        }
        for sample in self.samples.iter_mut() {
            *sample /= integral;
        }
        Ok(())
    }

    /// Linear interpolation onto `nsamp` samples spaced `dt`, both axes
    /// starting at t = 0. Points outside the old axis take the nearest
    /// boundary value.
    pub fn resample(&mut self, dt: f64, nsamp: usize) -> Result<()> {
        check_sampling(dt, nsamp)?;
        check_sampling(self.dt, self.samples.len())?;

        let t_old: Vec<f64> = (0..self.samples.len())
            .map(|i| i as f64 * self.dt)
            .collect();
        let first = self.samples[0];
        let last = self.samples[self.samples.len() - 1];

        let resampled = (0..nsamp)
            .map(|j| {
                let t = j as f64 * dt;
                // index of the last old sample at or before t
                let upper = t_old.partition_point(|&x| x <= t);
                if upper == 0 {
                    first
                } else if upper >= t_old.len() {
                    last
                } else {
                    let lo = upper - 1;
                    let slope =
                        (self.samples[upper] - self.samples[lo]) / (t_old[upper] - t_old[lo]);
                    self.samples[lo] + slope * (t - t_old[lo])
                }
            })
            .collect();

        self.samples = resampled;
        self.dt = dt;
        Ok(())
    }

    /// Butterworth lowpass with a corner at `freq` [Hz]
    pub fn lowpass(&mut self, freq: f64, corners: usize, zerophase: bool) -> Result<()> {
        self.samples = filter::lowpass(&self.samples, freq, 1.0 / self.dt, corners, zerophase)?;
        Ok(())
    }
}
