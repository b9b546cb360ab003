//! Standard rupture format (SRF)
//!
//! Only the `POINTS` block is read. Every point has two header lines
//!
//! ```text
//! lon lat depth_km strike dip area_cm2 t_init dt
//! rake slip1_cm n1 slip2_cm n2 slip3_cm n3
//! ```
//!
//! followed by `n1` and then `n2` sliprate samples, which may wrap over
//! several lines. Each slip component with samples becomes one point source.

use std::path::Path;

use super::{parse_count, parse_error, parse_floats, parse_value};
use crate::config::RuptureConfig;
use crate::finite::FiniteSource;
use crate::geodetic::GeodeticPoint;
use crate::source::Source;
use crate::{Result, SourceError};

const FORMAT: &str = "srf";

struct PointHeader {
    point: GeodeticPoint,
    strike: f64,
    dip: f64,
    area_m2: f64,
    t_init: f64,
    dt: f64,
}

/// Read `count` samples starting at the next line, continuing over as many
/// lines as needed
fn read_samples<'a, I>(lines: &mut I, count: usize) -> Result<Vec<f64>>
where
    I: Iterator<Item = &'a str>,
{
    let mut samples = Vec::with_capacity(count);
    while samples.len() < count {
        let line = lines.next().ok_or_else(|| {
            parse_error(
                FORMAT,
                format!("expected {count} sliprate samples, found {}", samples.len()),
            )
        })?;
        for token in line.split_whitespace() {
            samples.push(parse_value::<f64>(token, FORMAT, "sliprate sample")?);
        }
    }
    if samples.len() != count {
        return Err(parse_error(
            FORMAT,
            format!("expected {count} sliprate samples, found {}", samples.len()),
        ));
    }
    Ok(samples)
}

fn point_source(
    header: &PointHeader,
    rake: f64,
    slip_m: f64,
    samples: Vec<f64>,
    config: &RuptureConfig,
) -> Result<Source> {
    let m0 = header.area_m2 * config.rigidity_pa * slip_m;
    let mut source =
        Source::from_strike_dip_rake(header.point, header.strike, header.dip, rake, m0);
    source.set_sliprate(
        samples,
        header.dt,
        Some(header.t_init),
        config.normalize_sliprate,
    )?;
    Ok(source)
}

/// Parse an SRF document into a finite source with its hypocenter set
pub fn parse_srf(text: &str, config: &RuptureConfig) -> Result<FiniteSource> {
    let mut lines = text.lines();

    let npoints = loop {
        let line = lines
            .next()
            .ok_or_else(|| parse_error(FORMAT, "no POINTS block"))?;
        let mut tokens = line.split_whitespace();
        if tokens.next() == Some("POINTS") {
            let count = tokens
                .next()
                .ok_or_else(|| parse_error(FORMAT, "POINTS without a count"))?;
            break parse_count(count, FORMAT, "point count")?;
        }
    };

    let mut sources = Vec::with_capacity(npoints);
    for index in 0..npoints {
        let missing = || parse_error(FORMAT, format!("point {index} is truncated"));

        let [lon, lat, depth_km, strike, dip, area_cm2, t_init, dt] =
            parse_floats::<8>(lines.next().ok_or_else(missing)?, FORMAT, "point header")?;
        let slip_line = lines.next().ok_or_else(missing)?;
        let tokens: Vec<&str> = slip_line.split_whitespace().collect();
        if tokens.len() != 7 {
            return Err(parse_error(
                FORMAT,
                format!("slip line of point {index} needs 7 values, found {}", tokens.len()),
            ));
        }
        let rake: f64 = parse_value(tokens[0], FORMAT, "rake")?;
        let slip1_cm: f64 = parse_value(tokens[1], FORMAT, "slip1")?;
        let n1 = parse_count(tokens[2], FORMAT, "n1")?;
        let slip2_cm: f64 = parse_value(tokens[3], FORMAT, "slip2")?;
        let n2 = parse_count(tokens[4], FORMAT, "n2")?;
        let n3 = parse_count(tokens[6], FORMAT, "n3")?;
        if n3 > 0 {
            return Err(SourceError::NotImplemented(format!(
                "slip along the third axis (point {index})"
            )));
        }

        let header = PointHeader {
            point: GeodeticPoint::new(lat, lon, Some(depth_km * 1e3))?,
            strike,
            dip,
            area_m2: area_cm2 * 1e-4,
            t_init,
            dt,
        };
        for (slip_cm, count) in [(slip1_cm, n1), (slip2_cm, n2)] {
            if count > 0 {
                let samples = read_samples(&mut lines, count)?;
                sources.push(point_source(&header, rake, slip_cm * 1e-2, samples, config)?);
            }
        }
    }

    tracing::info!(
        npoints,
        npointsources = sources.len(),
        "read SRF rupture"
    );

    let mut finite = FiniteSource::new(sources);
    if !finite.is_empty() {
        finite.find_hypocenter()?;
    }
    Ok(finite)
}

pub fn read_srf_file(path: impl AsRef<Path>, config: &RuptureConfig) -> Result<FiniteSource> {
    parse_srf(&std::fs::read_to_string(path)?, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Located;
    use approx::assert_relative_eq;

    const TWO_POINTS: &str = "\
1.0
PLANE 1
 -117.0 34.0 10 6 5.0 3.0
 180.0 90.0 0.0 0.0 1.0
POINTS 3
-117.0 34.0 1.5 180.0 90.0 1.0e10 0.5 0.1
0.0 100.0 5 0.0 0 0.0 0
0.0 1.0 2.0
1.0 0.0
-117.1 34.1 2.5 180.0 90.0 1.0e10 1.0 0.1
0.0 50.0 4 20.0 3 0.0 0
0.0 2.0 2.0 0.0
0.0 1.0 0.0
-117.2 34.2 3.5 180.0 90.0 1.0e10 2.0 0.1
0.0 0.0 0 0.0 0 0.0 0
";

    #[test]
    fn test_one_source_per_slip_component() {
        let finite = parse_srf(TWO_POINTS, &RuptureConfig::default()).unwrap();
        // the last point has no samples at all
        assert_eq!(finite.len(), 3);

        let first = &finite[0];
        assert_relative_eq!(first.depth_in_m().unwrap(), 1_500.0);
        assert_eq!(first.time_shift(), Some(0.5));
        assert_eq!(first.dt(), Some(0.1));
        assert_eq!(first.sliprate().unwrap().samples(), &[0.0, 1.0, 2.0, 1.0, 0.0]);
        // area 1e6 m^2, slip 1 m
        assert_relative_eq!(first.m0(), 1e6 * 32e9, max_relative = 1e-12);

        assert_eq!(finite[1].sliprate().unwrap().len(), 4);
        assert_eq!(finite[2].sliprate().unwrap().len(), 3);
        assert_relative_eq!(finite[2].m0(), 1e6 * 32e9 * 0.2, max_relative = 1e-12);

        assert_eq!(finite.epicenter_latitude(), Some(34.0));
    }

    #[test]
    fn test_rigidity_and_normalization_follow_config() {
        let config = RuptureConfig {
            rigidity_pa: 30e9,
            normalize_sliprate: true,
        };
        let finite = parse_srf(TWO_POINTS, &config).unwrap();
        assert_relative_eq!(finite[0].m0(), 1e6 * 30e9, max_relative = 1e-12);
        for source in &finite {
            assert_relative_eq!(source.sliprate().unwrap().integral(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_third_axis_is_not_implemented() {
        let text = "POINTS 1\n\
                    0.0 0.0 1.0 0.0 90.0 1.0 0.0 0.1\n\
                    0.0 1.0 2 0.0 0 1.0 2\n\
                    1.0 1.0\n\
                    1.0 1.0\n";
        assert!(matches!(
            parse_srf(text, &RuptureConfig::default()),
            Err(SourceError::NotImplemented(_))
        ));
    }

    #[test]
    fn test_truncated_input() {
        let text = "POINTS 2\n\
                    0.0 0.0 1.0 0.0 90.0 1.0 0.0 0.1\n\
                    0.0 1.0 2 0.0 0 0.0 0\n\
                    1.0 1.0\n";
        assert!(matches!(
            parse_srf(text, &RuptureConfig::default()),
            Err(SourceError::Parse { .. })
        ));
        assert!(parse_srf("no points here", &RuptureConfig::default()).is_err());
    }
}
