//! CMTSOLUTION point sources
//!
//! A fixed layout of 13 lines. The first two (catalog header and event name)
//! are skipped, the value of every other line is its last token:
//! time shift, half duration, latitude, longitude, depth [km] and the six
//! tensor components Mrr, Mtt, Mpp, Mrt, Mrp, Mtp [dyn·cm].

use std::path::Path;

use super::{parse_error, parse_value};
use crate::geodetic::GeodeticPoint;
use crate::source::Source;
use crate::tensor::MomentTensor;
use crate::Result;

const FORMAT: &str = "cmtsolution";

const FIELDS: [&str; 11] = [
    "time shift",
    "half duration",
    "latitude",
    "longitude",
    "depth",
    "Mrr",
    "Mtt",
    "Mpp",
    "Mrt",
    "Mrp",
    "Mtp",
];

pub fn parse_cmtsolution(text: &str) -> Result<Source> {
    let lines: Vec<&str> = text.lines().collect();
    if lines.len() < 2 + FIELDS.len() {
        return Err(parse_error(
            FORMAT,
            format!("expected 13 lines, found {}", lines.len()),
        ));
    }

    let mut values = [0.0; FIELDS.len()];
    for ((value, line), field) in values.iter_mut().zip(&lines[2..]).zip(FIELDS) {
        let token = line
            .split_whitespace()
            .last()
            .ok_or_else(|| parse_error(FORMAT, format!("missing {field}")))?;
        *value = parse_value(token, FORMAT, field)?;
    }
    let [time_shift, _half_duration, latitude, longitude, depth_km, rr, tt, pp, rt, rp, tp] =
        values;

    let point = GeodeticPoint::new(latitude, longitude, Some(depth_km * 1e3))?;
    // dyn·cm to N·m
    let tensor = MomentTensor::new(
        rr * 1e-7,
        tt * 1e-7,
        pp * 1e-7,
        rt * 1e-7,
        rp * 1e-7,
        tp * 1e-7,
    );

    Ok(Source::new(point, tensor).with_time_shift(time_shift))
}

pub fn read_cmtsolution_file(path: impl AsRef<Path>) -> Result<Source> {
    parse_cmtsolution(&std::fs::read_to_string(path)?)
}
