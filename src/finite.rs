//! Finite sources
//!
//! A finite source is an ordered list of point moment-tensor sources, each
//! with its own time shift relative to the rupture start. It can be
//! collapsed into a centroid moment tensor (CMT): a single point source at
//! the moment-weighted mean position whose tensor is the sum of the rotated
//! sub-source tensors and whose sliprate is the moment-weighted sum of the
//! time-shifted sub-source sliprates.

use std::cmp::Ordering;
use std::fmt;
use std::ops::Index;

use nalgebra::Vector3;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::CentroidConfig;
use crate::geodetic::GeodeticPoint;
use crate::rotation::{
    rotate_symm_tensor_voigt_earth_to_src, rotate_symm_tensor_voigt_src_to_earth,
};
use crate::source::{Located, Source};
use crate::spectral::SpectralShifter;
use crate::stf::SourceTimeFunction;
use crate::tensor::{moment_magnitude, MomentTensor, VoigtTensor};
use crate::{Result, SourceError};

/// Finite rupture made of point sources
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FiniteSource {
    pointsources: Vec<Source>,
    hypocenter: Option<GeodeticPoint>,
    /// Result of the last centroid computation
    cmt: Option<Source>,
}

/// Per-sub-source terms of the centroid sums
struct Contribution {
    position: Vector3<f64>,
    tensor: [f64; 6],
    sliprate: Vec<f64>,
}

/// Unset time shifts count as zero
fn time_shift_of(source: &Source) -> f64 {
    source.time_shift().unwrap_or(0.0)
}

/// Unset depths count as the surface
fn depth_of(source: &Source) -> f64 {
    source.depth_in_m().unwrap_or(0.0)
}

/// First element holding the smallest (`Ordering::Less`) or largest
/// (`Ordering::Greater`) key
fn first_extreme<'a, F>(sources: &'a [Source], wanted: Ordering, key: F) -> Option<&'a Source>
where
    F: Fn(&Source) -> f64,
{
    let mut iter = sources.iter();
    let mut best = iter.next()?;
    let mut best_key = key(best);
    for source in iter {
        let candidate = key(source);
        if candidate.total_cmp(&best_key) == wanted {
            best = source;
            best_key = candidate;
        }
    }
    Some(best)
}

impl FiniteSource {
    pub fn new(pointsources: Vec<Source>) -> Self {
        Self {
            pointsources,
            hypocenter: None,
            cmt: None,
        }
    }

    pub fn len(&self) -> usize {
        self.pointsources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pointsources.is_empty()
    }

    pub fn npointsources(&self) -> usize {
        self.len()
    }

    /// Iterate the sub-sources in order. Every call starts from the first
    /// one, so iteration can be restarted or nested freely.
    pub fn iter(&self) -> std::slice::Iter<'_, Source> {
        self.pointsources.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Source> {
        self.pointsources.get(index)
    }

    pub fn pointsources(&self) -> &[Source] {
        &self.pointsources
    }

    pub fn into_pointsources(self) -> Vec<Source> {
        self.pointsources
    }

    /// Centroid from the last call to [`FiniteSource::compute_centroid`]
    pub fn cmt(&self) -> Option<&Source> {
        self.cmt.as_ref()
    }

    pub fn hypocenter(&self) -> Option<&GeodeticPoint> {
        self.hypocenter.as_ref()
    }

    pub fn set_hypocenter(&mut self, hypocenter: GeodeticPoint) {
        self.hypocenter = Some(hypocenter);
    }

    /// Place the hypocenter at the sub-source that ruptures first. Ties go
    /// to the earliest entry in the list.
    pub fn find_hypocenter(&mut self) -> Result<&GeodeticPoint> {
        let first = *self.nonempty()?.earliest()?.point();
        Ok(self.hypocenter.insert(first))
    }

    pub fn epicenter_latitude(&self) -> Option<f64> {
        self.hypocenter.map(|h| h.latitude())
    }

    pub fn epicenter_longitude(&self) -> Option<f64> {
        self.hypocenter.map(|h| h.longitude())
    }

    fn nonempty(&self) -> Result<&Self> {
        if self.pointsources.is_empty() {
            return Err(SourceError::State(
                "finite source has no point sources".to_string(),
            ));
        }
        Ok(self)
    }

    fn earliest(&self) -> Result<&Source> {
        self.extreme(Ordering::Less, time_shift_of)
    }

    fn extreme<F>(&self, wanted: Ordering, key: F) -> Result<&Source>
    where
        F: Fn(&Source) -> f64,
    {
        first_extreme(&self.pointsources, wanted, key).ok_or_else(|| {
            SourceError::State("finite source has no point sources".to_string())
        })
    }

    /// Total scalar moment M0 [N·m]
    pub fn m0(&self) -> Result<f64> {
        Ok(self.nonempty()?.iter().map(Source::m0).sum())
    }

    pub fn moment_magnitude(&self) -> Result<f64> {
        Ok(moment_magnitude(self.m0()?))
    }

    pub fn min_depth_in_m(&self) -> Result<f64> {
        Ok(depth_of(self.extreme(Ordering::Less, depth_of)?))
    }

    pub fn max_depth_in_m(&self) -> Result<f64> {
        Ok(depth_of(self.extreme(Ordering::Greater, depth_of)?))
    }

    pub fn min_latitude(&self) -> Result<f64> {
        Ok(self.extreme(Ordering::Less, |s| s.latitude())?.latitude())
    }

    pub fn max_latitude(&self) -> Result<f64> {
        Ok(self.extreme(Ordering::Greater, |s| s.latitude())?.latitude())
    }

    pub fn min_longitude(&self) -> Result<f64> {
        Ok(self.extreme(Ordering::Less, |s| s.longitude())?.longitude())
    }

    pub fn max_longitude(&self) -> Result<f64> {
        Ok(self.extreme(Ordering::Greater, |s| s.longitude())?.longitude())
    }

    /// Earliest time shift of any sub-source [s]
    pub fn time_shift(&self) -> Result<f64> {
        Ok(time_shift_of(self.earliest()?))
    }

    /// Spread between the latest and earliest time shift [s]
    pub fn rupture_duration(&self) -> Result<f64> {
        let latest = time_shift_of(self.extreme(Ordering::Greater, time_shift_of)?);
        Ok(latest - self.time_shift()?)
    }

    pub fn resample_sliprate(&mut self, dt: f64, nsamp: usize) -> Result<()> {
        self.pointsources
            .iter_mut()
            .try_for_each(|ps| ps.resample_sliprate(dt, nsamp))
    }

    pub fn set_sliprate_dirac(&mut self, dt: f64, nsamp: usize) -> Result<()> {
        self.pointsources
            .iter_mut()
            .try_for_each(|ps| ps.set_sliprate_dirac(dt, nsamp))
    }

    pub fn set_sliprate_lp(
        &mut self,
        dt: f64,
        nsamp: usize,
        freq: f64,
        corners: usize,
        zerophase: bool,
    ) -> Result<()> {
        self.pointsources
            .iter_mut()
            .try_for_each(|ps| ps.set_sliprate_lp(dt, nsamp, freq, corners, zerophase))
    }

    pub fn normalize_sliprate(&mut self) -> Result<()> {
        self.pointsources
            .iter_mut()
            .try_for_each(Source::normalize_sliprate)
    }

    pub fn lp_sliprate(&mut self, freq: f64, corners: usize, zerophase: bool) -> Result<()> {
        self.pointsources
            .iter_mut()
            .try_for_each(|ps| ps.lp_sliprate(freq, corners, zerophase))
    }

    /// Compute the centroid moment tensor with the default parallel setting.
    /// `dt` falls back to the first sub-source's sampling and `nsamp` to the
    /// length needed by the latest sub-source.
    pub fn compute_centroid(
        &mut self,
        planet_radius: f64,
        dt: Option<f64>,
        nsamp: Option<usize>,
    ) -> Result<&Source> {
        let config = CentroidConfig {
            planet_radius_m: planet_radius,
            dt,
            nsamp,
            ..CentroidConfig::default()
        };
        self.compute_centroid_with(&config)
    }

    /// Compute the centroid moment tensor and store it as the CMT.
    ///
    /// All sub-source sliprates are resampled in place to the output
    /// sampling first; that step is kept even if a later one fails.
    pub fn compute_centroid_with(&mut self, config: &CentroidConfig) -> Result<&Source> {
        config.validate()?;
        self.nonempty()?;
        if let Some(index) = self.iter().position(|ps| ps.sliprate().is_none()) {
            return Err(SourceError::State(format!(
                "point source {index} has no sliprate, cannot compute centroid"
            )));
        }

        let planet_radius = config.planet_radius_m;
        let dt = match config.dt {
            Some(dt) => dt,
            None => self.pointsources[0].dt().ok_or_else(|| {
                SourceError::State("first point source has no sliprate".to_string())
            })?,
        };
        let nsamp = match config.nsamp {
            Some(nsamp) => nsamp,
            None => {
                let latest = self.extreme(Ordering::Greater, time_shift_of)?;
                let length = latest.sliprate().map_or(0, SourceTimeFunction::len);
                let needed = time_shift_of(latest) / dt + length as f64;
                (needed.ceil() as usize).max(1)
            }
        };
        tracing::debug!(
            npointsources = self.len(),
            dt,
            nsamp,
            "computing centroid"
        );

        let m0_total = self.m0()?;
        if m0_total == 0.0 || !m0_total.is_finite() {
            return Err(SourceError::State(format!(
                "cannot weight by a total scalar moment of {m0_total}"
            )));
        }

        if config.parallel {
            self.pointsources
                .par_iter_mut()
                .try_for_each(|ps| ps.resample_sliprate(dt, nsamp))?;
        } else {
            self.resample_sliprate(dt, nsamp)?;
        }
        tracing::debug!("resampled sliprates");

        let shifter = SpectralShifter::for_samples(nsamp);
        let contribution = |ps: &Source| {
            let weight = ps.m0() / m0_total;
            let shifted = shifter.shift(
                ps.sliprate().map(SourceTimeFunction::samples).unwrap_or_default(),
                time_shift_of(ps) / dt,
                nsamp,
            );
            Contribution {
                position: ps.point().cartesian(planet_radius) * weight,
                tensor: rotate_symm_tensor_voigt_src_to_earth(
                    &ps.tensor_voigt(),
                    ps.point().longitude_rad(),
                    ps.point().colatitude_rad(),
                )
                .0,
                sliprate: shifted.into_iter().map(|s| s * weight).collect(),
            }
        };
        let contributions: Vec<Contribution> = if config.parallel {
            self.pointsources.par_iter().map(contribution).collect()
        } else {
            self.pointsources.iter().map(contribution).collect()
        };

        let mut position = Vector3::<f64>::zeros();
        let mut tensor = [0.0; 6];
        let mut sliprate = vec![0.0; nsamp];
        for part in &contributions {
            position += part.position;
            for (sum, value) in tensor.iter_mut().zip(part.tensor) {
                *sum += value;
            }
            for (sum, value) in sliprate.iter_mut().zip(&part.sliprate) {
                *sum += value;
            }
        }

        let centroid = GeodeticPoint::from_cartesian(&position, planet_radius)?;
        let local = rotate_symm_tensor_voigt_earth_to_src(
            &VoigtTensor(tensor),
            centroid.longitude_rad(),
            centroid.colatitude_rad(),
        );
        tracing::debug!(
            latitude = centroid.latitude(),
            longitude = centroid.longitude(),
            depth_in_m = centroid.depth_in_m().unwrap_or(0.0),
            "centroid located"
        );

        let cmt = Source::new(centroid, MomentTensor::from_voigt(&local))
            .with_time_shift(0.0)
            .with_sliprate(SourceTimeFunction::new(sliprate, dt)?);
        Ok(self.cmt.insert(cmt))
    }
}

impl Index<usize> for FiniteSource {
    type Output = Source;

    fn index(&self, index: usize) -> &Source {
        &self.pointsources[index]
    }
}

impl<'a> IntoIterator for &'a FiniteSource {
    type Item = &'a Source;
    type IntoIter = std::slice::Iter<'a, Source>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl From<Vec<Source>> for FiniteSource {
    fn from(pointsources: Vec<Source>) -> Self {
        Self::new(pointsources)
    }
}

impl fmt::Display for FiniteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (Ok(m0), Ok(mw)) = (self.m0(), self.moment_magnitude()) else {
            return writeln!(f, "Finite source: no point sources");
        };
        let hypocenter = self
            .hypocenter
            .or_else(|| self.earliest().ok().map(|s| *s.point()));

        writeln!(f, "Finite source:")?;
        writeln!(f, "  moment magnitude     : {mw:4.2}")?;
        writeln!(f, "  scalar moment        : {m0:10.2e} Nm")?;
        writeln!(f, "  point sources        : {}", self.len())?;
        if let (Ok(duration), Ok(shift)) = (self.rupture_duration(), self.time_shift()) {
            writeln!(f, "  rupture duration     : {duration:6.1} s")?;
            writeln!(f, "  time shift           : {shift:6.1} s")?;
        }
        if let (Ok(lo), Ok(hi)) = (self.min_depth_in_m(), self.max_depth_in_m()) {
            writeln!(f, "  depth                : {lo:.1} .. {hi:.1} m")?;
        }
        if let (Ok(lo), Ok(hi)) = (self.min_latitude(), self.max_latitude()) {
            writeln!(f, "  latitude             : {lo:.3} .. {hi:.3} deg")?;
        }
        if let (Ok(lo), Ok(hi)) = (self.min_longitude(), self.max_longitude()) {
            writeln!(f, "  longitude            : {lo:.3} .. {hi:.3} deg")?;
        }
        if let Some(h) = hypocenter {
            writeln!(
                f,
                "  hypocenter           : {:.3} deg, {:.3} deg, {:.1} m",
                h.latitude(),
                h.longitude(),
                h.depth_in_m().unwrap_or(0.0)
            )?;
        }
        Ok(())
    }
}
