use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnNull};

use crate::geodetic::EARTH_RADIUS_M;
use crate::{Result, SourceError};

/// Rigidity assumed when converting slip to moment [Pa]
pub const DEFAULT_RIGIDITY_PA: f64 = 32e9;

/// Settings for reading finite rupture descriptions
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuptureConfig {
    /// Shear modulus mu used in M0 = mu * area * slip [Pa]
    #[serde_as(as = "DefaultOnNull")]
    pub rigidity_pa: f64,
    /// Normalize every sliprate read from file to unit integral
    #[serde_as(as = "DefaultOnNull")]
    pub normalize_sliprate: bool,
}

impl Default for RuptureConfig {
    fn default() -> Self {
        Self {
            rigidity_pa: DEFAULT_RIGIDITY_PA,
            normalize_sliprate: false,
        }
    }
}

/// Settings for collapsing a finite source into its centroid
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CentroidConfig {
    #[serde_as(as = "DefaultOnNull")]
    pub planet_radius_m: f64,
    /// Output sampling interval; the first sub-source's dt when unset
    pub dt: Option<f64>,
    /// Output length; derived from the latest sub-source when unset
    pub nsamp: Option<usize>,
    /// Process sub-sources on the rayon thread pool
    #[serde_as(as = "DefaultOnNull")]
    pub parallel: bool,
}

impl Default for CentroidConfig {
    fn default() -> Self {
        Self {
            planet_radius_m: EARTH_RADIUS_M,
            dt: None,
            nsamp: None,
            parallel: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub rupture: RuptureConfig,
    pub centroid: CentroidConfig,
}

impl RuptureConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.rigidity_pa.is_finite() || self.rigidity_pa <= 0.0 {
            return Err(SourceError::InvalidConfig(
                "rigidity_pa must be positive and finite".to_string(),
            ));
        }

        Ok(())
    }
}

impl CentroidConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.planet_radius_m.is_finite() || self.planet_radius_m <= 0.0 {
            return Err(SourceError::InvalidConfig(
                "planet_radius_m must be positive and finite".to_string(),
            ));
        }

        if let Some(dt) = self.dt {
            if !dt.is_finite() || dt <= 0.0 {
                return Err(SourceError::InvalidConfig(
                    "dt must be positive and finite".to_string(),
                ));
            }
        }

        if self.nsamp == Some(0) {
            return Err(SourceError::InvalidConfig(
                "nsamp must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

impl SourceConfig {
    pub fn validate(&self) -> Result<()> {
        self.rupture.validate()?;
        self.centroid.validate()
    }

    /// Parse and validate a TOML document. Missing tables and keys keep
    /// their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = SourceConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.rupture.rigidity_pa, 32e9);
        assert_eq!(config.centroid.planet_radius_m, 6_371_000.0);
        assert!(config.centroid.parallel);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SourceConfig::from_toml_str(
            r#"
            [centroid]
            planet_radius_m = 3389500.0
            nsamp = 512
            "#,
        )
        .unwrap();
        assert_eq!(config.centroid.planet_radius_m, 3_389_500.0);
        assert_eq!(config.centroid.nsamp, Some(512));
        assert_eq!(config.centroid.dt, None);
        assert_eq!(config.rupture, RuptureConfig::default());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = SourceConfig::from_toml_str("[rupture]\nrigidity_pa = -1.0\n").unwrap_err();
        assert!(matches!(err, SourceError::InvalidConfig(_)));

        let err = SourceConfig::from_toml_str("[centroid]\nnsamp = 0\n").unwrap_err();
        assert!(matches!(err, SourceError::InvalidConfig(_)));

        let err = SourceConfig::from_toml_str("[centroid]\ndt = 0.0\n").unwrap_err();
        assert!(matches!(err, SourceError::InvalidConfig(_)));

        let err = SourceConfig::from_toml_str("[centroid\n").unwrap_err();
        assert!(matches!(err, SourceError::Toml(_)));
    }

    #[test]
    fn test_from_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[rupture]\nnormalize_sliprate = true").unwrap();
        let config = SourceConfig::from_toml_file(file.path()).unwrap();
        assert!(config.rupture.normalize_sliprate);

        let missing = SourceConfig::from_toml_file("/nonexistent/seismic-source.toml");
        assert!(matches!(missing, Err(SourceError::Io(_))));
    }
}
