//! Geodetic positions on a spherical planet
//!
//! Latitude/longitude in degrees with an optional depth below the reference
//! radius. Cartesian coordinates use a geocentric spherical projection, not
//! an ellipsoid.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::{Result, SourceError};

/// Mean earth radius used as the default reference radius [m]
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A point given by latitude, longitude and optional depth
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeodeticPoint {
    /// Latitude [deg], within [-90, 90]
    latitude: f64,
    /// Longitude [deg], unconstrained
    longitude: f64,
    /// Depth below the reference radius [m]
    depth_in_m: Option<f64>,
}

impl GeodeticPoint {
    /// Create a new point, rejecting latitudes outside [-90, 90]
    pub fn new(latitude: f64, longitude: f64, depth_in_m: Option<f64>) -> Result<Self> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(SourceError::Validation(format!(
                "invalid latitude value: {latitude}"
            )));
        }

        Ok(Self {
            latitude,
            longitude,
            depth_in_m,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn depth_in_m(&self) -> Option<f64> {
        self.depth_in_m
    }

    pub fn colatitude(&self) -> f64 {
        90.0 - self.latitude
    }

    pub fn colatitude_rad(&self) -> f64 {
        self.colatitude().to_radians()
    }

    pub fn latitude_rad(&self) -> f64 {
        self.latitude.to_radians()
    }

    pub fn longitude_rad(&self) -> f64 {
        self.longitude.to_radians()
    }

    /// Distance from the planet center; the full radius if no depth is set
    pub fn radius_in_m(&self, planet_radius: f64) -> f64 {
        match self.depth_in_m {
            Some(depth) => planet_radius - depth,
            None => planet_radius,
        }
    }

    pub fn x(&self, planet_radius: f64) -> f64 {
        self.latitude_rad().cos() * self.longitude_rad().cos() * self.radius_in_m(planet_radius)
    }

    pub fn y(&self, planet_radius: f64) -> f64 {
        self.latitude_rad().cos() * self.longitude_rad().sin() * self.radius_in_m(planet_radius)
    }

    pub fn z(&self, planet_radius: f64) -> f64 {
        self.latitude_rad().sin() * self.radius_in_m(planet_radius)
    }

    /// Earth-centered Cartesian position (x, y, z) [m]
    pub fn cartesian(&self, planet_radius: f64) -> Vector3<f64> {
        Vector3::new(
            self.x(planet_radius),
            self.y(planet_radius),
            self.z(planet_radius),
        )
    }

    /// Inverse of [`GeodeticPoint::cartesian`]: the depth is measured from
    /// `planet_radius` down to the norm of `position`.
    pub fn from_cartesian(position: &Vector3<f64>, planet_radius: f64) -> Result<Self> {
        let norm = position.norm();
        if norm == 0.0 || !norm.is_finite() {
            return Err(SourceError::Validation(format!(
                "cannot place a point at cartesian position with norm {norm}"
            )));
        }

        let colatitude = (position.z / norm).clamp(-1.0, 1.0).acos().to_degrees();
        let longitude = position.y.atan2(position.x).to_degrees();

        Self::new(90.0 - colatitude, longitude, Some(planet_radius - norm))
    }
}
