//! Point sources and receivers
//!
//! [`Source`] is a point moment-tensor source with an optional source time
//! function, [`ForceSource`] a point force and [`Receiver`] a station
//! location. All of them share the geometry of [`GeodeticPoint`] through the
//! [`Located`] trait.

use serde::{Deserialize, Serialize};

use crate::geodetic::GeodeticPoint;
use crate::rotation::rotate_vector_src_to_earth;
use crate::stf::SourceTimeFunction;
use crate::tensor::{MomentTensor, RtpTensor, VoigtTensor};
use crate::{Result, SourceError};

/// Anything placed at a geodetic point
pub trait Located {
    fn point(&self) -> &GeodeticPoint;

    fn latitude(&self) -> f64 {
        self.point().latitude()
    }

    fn longitude(&self) -> f64 {
        self.point().longitude()
    }

    fn depth_in_m(&self) -> Option<f64> {
        self.point().depth_in_m()
    }

    fn colatitude(&self) -> f64 {
        self.point().colatitude()
    }

    fn radius_in_m(&self, planet_radius: f64) -> f64 {
        self.point().radius_in_m(planet_radius)
    }

    fn x(&self, planet_radius: f64) -> f64 {
        self.point().x(planet_radius)
    }

    fn y(&self, planet_radius: f64) -> f64 {
        self.point().y(planet_radius)
    }

    fn z(&self, planet_radius: f64) -> f64 {
        self.point().z(planet_radius)
    }
}

/// Fault angles a double-couple source was built from [rad]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaultAngles {
    pub strike: f64,
    pub dip: f64,
    pub rake: f64,
}

/// Point moment-tensor source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    point: GeodeticPoint,
    tensor: MomentTensor,
    /// Origin time correction [s], only meaningful inside finite sources
    time_shift: Option<f64>,
    sliprate: Option<SourceTimeFunction>,
    fault_angles: Option<FaultAngles>,
}

impl Located for Source {
    fn point(&self) -> &GeodeticPoint {
        &self.point
    }
}

impl Source {
    pub fn new(point: GeodeticPoint, tensor: MomentTensor) -> Self {
        Self {
            point,
            tensor,
            time_shift: None,
            sliprate: None,
            fault_angles: None,
        }
    }

    /// Double-couple source from strike, dip and rake [deg] and scalar moment
    /// M0 [N·m]
    pub fn from_strike_dip_rake(
        point: GeodeticPoint,
        strike: f64,
        dip: f64,
        rake: f64,
        m0: f64,
    ) -> Self {
        let mut source = Self::new(
            point,
            MomentTensor::from_strike_dip_rake(strike, dip, rake, m0),
        );
        source.fault_angles = Some(FaultAngles {
            strike: strike.to_radians(),
            dip: dip.to_radians(),
            rake: rake.to_radians(),
        });
        source
    }

    pub fn with_time_shift(mut self, time_shift: f64) -> Self {
        self.time_shift = Some(time_shift);
        self
    }

    pub fn with_sliprate(mut self, sliprate: SourceTimeFunction) -> Self {
        self.sliprate = Some(sliprate);
        self
    }

    pub fn moment_tensor(&self) -> &MomentTensor {
        &self.tensor
    }

    pub fn fault_angles(&self) -> Option<&FaultAngles> {
        self.fault_angles.as_ref()
    }

    pub fn time_shift(&self) -> Option<f64> {
        self.time_shift
    }

    pub fn sliprate(&self) -> Option<&SourceTimeFunction> {
        self.sliprate.as_ref()
    }

    /// Sampling interval of the sliprate, if one is set
    pub fn dt(&self) -> Option<f64> {
        self.sliprate.as_ref().map(SourceTimeFunction::dt)
    }

    /// Scalar moment M0 [N·m]
    pub fn m0(&self) -> f64 {
        self.tensor.m0()
    }

    pub fn moment_magnitude(&self) -> f64 {
        self.tensor.moment_magnitude()
    }

    /// Components as `[rr, tt, pp, rt, rp, tp]`
    pub fn tensor(&self) -> RtpTensor {
        self.tensor.rtp()
    }

    /// Components in Voigt order `[tt, pp, rr, rp, rt, tp]`
    pub fn tensor_voigt(&self) -> VoigtTensor {
        self.tensor.voigt()
    }

    /// Replace the sliprate and time shift. With `normalize` the samples are
    /// divided by their trapezoidal-rule integral.
    pub fn set_sliprate(
        &mut self,
        sliprate: Vec<f64>,
        dt: f64,
        time_shift: Option<f64>,
        normalize: bool,
    ) -> Result<()> {
        let mut stf = SourceTimeFunction::new(sliprate, dt)?;
        if normalize {
            stf.normalize()?;
        }
        self.sliprate = Some(stf);
        self.time_shift = time_shift;
        Ok(())
    }

    pub fn set_sliprate_dirac(&mut self, dt: f64, nsamp: usize) -> Result<()> {
        self.sliprate = Some(SourceTimeFunction::dirac(dt, nsamp)?);
        Ok(())
    }

    /// Lowpass filtered Dirac sliprate. Like the other mutators except
    /// [`Source::set_sliprate`] and [`Source::set_sliprate_dirac`], this
    /// needs a sliprate to be assigned already.
    pub fn set_sliprate_lp(
        &mut self,
        dt: f64,
        nsamp: usize,
        freq: f64,
        corners: usize,
        zerophase: bool,
    ) -> Result<()> {
        self.sliprate_mut()?;
        self.sliprate = Some(SourceTimeFunction::lowpassed_dirac(
            dt, nsamp, freq, corners, zerophase,
        )?);
        Ok(())
    }

    /// Linear interpolation of the sliprate onto `nsamp` samples spaced `dt`
    pub fn resample_sliprate(&mut self, dt: f64, nsamp: usize) -> Result<()> {
        self.sliprate_mut()?.resample(dt, nsamp)
    }

    pub fn normalize_sliprate(&mut self) -> Result<()> {
        self.sliprate_mut()?.normalize()
    }

    pub fn lp_sliprate(&mut self, freq: f64, corners: usize, zerophase: bool) -> Result<()> {
        self.sliprate_mut()?.lowpass(freq, corners, zerophase)
    }

    fn sliprate_mut(&mut self) -> Result<&mut SourceTimeFunction> {
        self.sliprate
            .as_mut()
            .ok_or_else(|| SourceError::State("source has no sliprate assigned".to_string()))
    }
}

/// Point force source [N]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForceSource {
    point: GeodeticPoint,
    pub f_r: f64,
    pub f_t: f64,
    pub f_p: f64,
}

impl Located for ForceSource {
    fn point(&self) -> &GeodeticPoint {
        &self.point
    }
}

impl ForceSource {
    pub fn new(point: GeodeticPoint, f_r: f64, f_t: f64, f_p: f64) -> Self {
        Self { point, f_r, f_t, f_p }
    }

    /// Components as `[f_t, f_p, f_r]`, the order the rotation routines use
    pub fn force_tpr(&self) -> [f64; 3] {
        [self.f_t, self.f_p, self.f_r]
    }

    /// Components as `[f_r, f_t, f_p]`
    pub fn force_rtp(&self) -> [f64; 3] {
        [self.f_r, self.f_t, self.f_p]
    }

    /// Force expressed in the earth-centered Cartesian frame
    pub fn force_earth(&self) -> [f64; 3] {
        rotate_vector_src_to_earth(
            &self.force_tpr(),
            self.point.longitude_rad(),
            self.point.colatitude_rad(),
        )
    }
}

/// Seismic receiver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receiver {
    point: GeodeticPoint,
    /// Network code, empty if unknown
    pub network: String,
    /// Station code, empty if unknown
    pub station: String,
}

impl Located for Receiver {
    fn point(&self) -> &GeodeticPoint {
        &self.point
    }
}

impl Receiver {
    pub fn new(
        point: GeodeticPoint,
        network: impl Into<String>,
        station: impl Into<String>,
    ) -> Self {
        Self {
            point,
            network: network.into(),
            station: station.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn point() -> GeodeticPoint {
        GeodeticPoint::new(89.91, 0.0, Some(12_000.0)).unwrap()
    }

    #[test]
    fn test_sliprate_mutators_need_sliprate() {
        let mut source = Source::new(point(), MomentTensor::default());
        assert!(matches!(source.normalize_sliprate(), Err(SourceError::State(_))));
        assert!(matches!(source.resample_sliprate(0.1, 10), Err(SourceError::State(_))));
        assert!(matches!(source.lp_sliprate(1.0, 4, false), Err(SourceError::State(_))));
        assert!(matches!(
            source.set_sliprate_lp(0.1, 10, 1.0, 4, false),
            Err(SourceError::State(_))
        ));

        source.set_sliprate_dirac(0.1, 10).unwrap();
        assert!(source.set_sliprate_lp(0.1, 100, 1.0, 4, false).is_ok());
        assert_eq!(source.sliprate().unwrap().len(), 100);
    }

    #[test]
    fn test_set_sliprate_normalizes_and_sets_time_shift() {
        let mut source = Source::new(point(), MomentTensor::default()).with_time_shift(4.0);
        source
            .set_sliprate(vec![0.0, 1.0, 2.0, 1.0, 0.0], 0.5, Some(1.5), true)
            .unwrap();
        assert_relative_eq!(source.sliprate().unwrap().integral(), 1.0, epsilon = 1e-12);
        assert_eq!(source.time_shift(), Some(1.5));
        assert_eq!(source.dt(), Some(0.5));

        source
            .set_sliprate(vec![0.0, 1.0, 2.0], 0.5, None, false)
            .unwrap();
        assert_eq!(source.sliprate().unwrap().samples(), &[0.0, 1.0, 2.0]);
        assert_eq!(source.time_shift(), None);
    }

    #[test]
    fn test_strike_dip_rake_keeps_angles() {
        let source = Source::from_strike_dip_rake(point(), 79.0, 10.0, 20.0, 1e17);
        let angles = source.fault_angles().unwrap();
        assert_relative_eq!(angles.strike, 79.0_f64.to_radians());
        assert_relative_eq!(source.m0(), 1e17, max_relative = 1e-12);
    }

    #[test]
    fn test_force_orderings() {
        let force = ForceSource::new(point(), 1.0, 2.0, 3.0);
        assert_eq!(force.force_tpr(), [2.0, 3.0, 1.0]);
        assert_eq!(force.force_rtp(), [1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_radial_force_points_outward() {
        let equator = GeodeticPoint::new(0.0, 90.0, None).unwrap();
        let force = ForceSource::new(equator, 1e10, 0.0, 0.0);
        let earth = force.force_earth();
        assert!(earth[0].abs() < 1e-3);
        assert_relative_eq!(earth[1], 1e10, max_relative = 1e-12);
        assert!(earth[2].abs() < 1e-3);
    }

    #[test]
    fn test_shared_geometry() {
        let receiver = Receiver::new(point(), "AB", "CDE");
        assert_relative_eq!(receiver.colatitude(), 0.09, epsilon = 1e-12);
        assert_eq!(receiver.depth_in_m(), Some(12_000.0));
        assert_eq!(receiver.station, "CDE");
    }
}
