//! Seismic sources for wavefield synthesis
//!
//! Point moment-tensor sources, point force sources and finite ruptures built
//! from many point sources. A finite source can be collapsed into a single
//! centroid moment tensor (CMT) whose source time function carries the
//! time-shifted rupture history of all sub-sources.

pub mod config;
pub mod filter;
pub mod finite;
pub mod formats;
pub mod geodetic;
pub mod rotation;
pub mod source;
pub mod spectral;
pub mod stf;
pub mod synthetic;
pub mod tensor;

use thiserror::Error;

// Re-export main types
pub use config::{CentroidConfig, RuptureConfig, SourceConfig};
pub use finite::FiniteSource;
pub use formats::{FiniteSourceFormat, ReceiverFormat, SourceFormat};
pub use geodetic::{GeodeticPoint, EARTH_RADIUS_M};
pub use source::{ForceSource, Located, Receiver, Source};
pub use stf::SourceTimeFunction;
pub use synthetic::{generate_rupture, RuptureSimConfig};
pub use tensor::{MomentTensor, RtpTensor, VoigtTensor};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("could not parse {format} input: {reason}")]
    Parse { format: &'static str, reason: String },
    #[error("invalid state: {0}")]
    State(String),
    #[error("not implemented: {0}")]
    NotImplemented(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, SourceError>;
