//! Text formats for sources, finite ruptures and receivers
//!
//! Each family of inputs has a format enum listing the supported kinds in
//! the order they are tried. `parse` runs the handlers in that order and
//! returns the first success. A [`SourceError::NotImplemented`] answer ends
//! the search at once since the input was recognised; otherwise only the
//! last failure is reported.

pub mod cmtsolution;
pub mod srf;
pub mod stations;
pub mod usgs_param;

use std::path::Path;
use std::str::FromStr;

use crate::config::RuptureConfig;
use crate::finite::FiniteSource;
use crate::source::{Receiver, Source};
use crate::{Result, SourceError};

pub(crate) fn parse_error(format: &'static str, reason: impl Into<String>) -> SourceError {
    SourceError::Parse {
        format,
        reason: reason.into(),
    }
}

pub(crate) fn parse_value<T: FromStr>(token: &str, format: &'static str, what: &str) -> Result<T> {
    token
        .parse()
        .map_err(|_| parse_error(format, format!("invalid {what}: {token:?}")))
}

/// Sample counts are written as integers or integral floats
pub(crate) fn parse_count(token: &str, format: &'static str, what: &str) -> Result<usize> {
    let value: f64 = parse_value(token, format, what)?;
    if value < 0.0 || value.fract() != 0.0 || !value.is_finite() {
        return Err(parse_error(format, format!("invalid {what}: {token:?}")));
    }
    Ok(value as usize)
}

/// Parse exactly `N` whitespace-separated floats from `line`
pub(crate) fn parse_floats<const N: usize>(
    line: &str,
    format: &'static str,
    what: &str,
) -> Result<[f64; N]> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != N {
        return Err(parse_error(
            format,
            format!("{what} needs {N} values, found {}", tokens.len()),
        ));
    }
    let mut values = [0.0; N];
    for (value, token) in values.iter_mut().zip(tokens) {
        *value = parse_value(token, format, what)?;
    }
    Ok(values)
}

/// Run `attempt` for every format in order, see the module docs
fn dispatch<F, T, R>(formats: &[F], family: &'static str, mut attempt: T) -> Result<R>
where
    F: Copy + std::fmt::Debug,
    T: FnMut(F) -> Result<R>,
{
    let mut last = None;
    for &format in formats {
        match attempt(format) {
            Ok(parsed) => return Ok(parsed),
            Err(err @ SourceError::NotImplemented(_)) => return Err(err),
            Err(err) => {
                tracing::debug!(?format, error = %err, "format did not match");
                last = Some(err);
            }
        }
    }
    Err(match last {
        Some(err @ SourceError::Parse { .. }) => err,
        Some(err) => parse_error(family, err.to_string()),
        None => parse_error(family, "no formats to try"),
    })
}

/// Point source formats, in the order [`SourceFormat::parse`] tries them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    CmtSolution,
}

impl SourceFormat {
    pub const PRIORITY: [SourceFormat; 1] = [SourceFormat::CmtSolution];

    pub fn parse_str(self, text: &str) -> Result<Source> {
        match self {
            SourceFormat::CmtSolution => cmtsolution::parse_cmtsolution(text),
        }
    }

    pub fn parse(text: &str) -> Result<Source> {
        dispatch(&Self::PRIORITY, "source", |format| format.parse_str(text))
    }

    pub fn parse_file(path: impl AsRef<Path>) -> Result<Source> {
        Self::parse(&std::fs::read_to_string(path)?)
    }
}

/// Finite rupture formats, in the order [`FiniteSourceFormat::parse`]
/// tries them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FiniteSourceFormat {
    /// Standard rupture format
    Srf,
    /// Segmented fault parameters as published by the USGS
    UsgsParam,
}

impl FiniteSourceFormat {
    pub const PRIORITY: [FiniteSourceFormat; 2] =
        [FiniteSourceFormat::Srf, FiniteSourceFormat::UsgsParam];

    pub fn parse_str(self, text: &str, config: &RuptureConfig) -> Result<FiniteSource> {
        match self {
            FiniteSourceFormat::Srf => srf::parse_srf(text, config),
            FiniteSourceFormat::UsgsParam => usgs_param::parse_usgs_param(text),
        }
    }

    pub fn parse(text: &str, config: &RuptureConfig) -> Result<FiniteSource> {
        dispatch(&Self::PRIORITY, "finite source", |format| {
            format.parse_str(text, config)
        })
    }

    pub fn parse_file(path: impl AsRef<Path>, config: &RuptureConfig) -> Result<FiniteSource> {
        Self::parse(&std::fs::read_to_string(path)?, config)
    }
}

/// Receiver formats, in the order [`ReceiverFormat::parse`] tries them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiverFormat {
    Stations,
}

impl ReceiverFormat {
    pub const PRIORITY: [ReceiverFormat; 1] = [ReceiverFormat::Stations];

    pub fn parse_str(self, text: &str) -> Result<Vec<Receiver>> {
        let receivers = match self {
            ReceiverFormat::Stations => stations::parse_stations(text)?,
        };
        Ok(purge_duplicates(receivers))
    }

    /// Receivers in input order with later duplicates removed
    pub fn parse(text: &str) -> Result<Vec<Receiver>> {
        dispatch(&Self::PRIORITY, "receiver", |format| format.parse_str(text))
    }

    pub fn parse_file(path: impl AsRef<Path>) -> Result<Vec<Receiver>> {
        Self::parse(&std::fs::read_to_string(path)?)
    }
}

fn purge_duplicates(receivers: Vec<Receiver>) -> Vec<Receiver> {
    let mut unique: Vec<Receiver> = Vec::with_capacity(receivers.len());
    for receiver in receivers {
        if !unique.contains(&receiver) {
            unique.push(receiver);
        }
    }
    unique
}
