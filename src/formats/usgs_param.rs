//! USGS finite fault parameter files (`.param`)
//!
//! The first line ends with the number of fault segments. Each segment has
//! a boundary block followed by a `#Lat. Lon. depth ...` header and one row
//! per subfault:
//!
//! ```text
//! lat lon depth_km slip_cm rake strike dip t_rup t_rise t_fall mo_dyncm
//! ```
//!
//! The rows run until the next `#Fault_segment` line. Subfaults carry no
//! sliprate.

use std::path::Path;

use super::{parse_count, parse_error, parse_floats};
use crate::finite::FiniteSource;
use crate::geodetic::GeodeticPoint;
use crate::source::Source;
use crate::Result;

const FORMAT: &str = "usgs param";
const ROWS_HEADER: &str = "#Lat. Lon. depth";
const SEGMENT_HEADER: &str = "#Fault_segment";

pub fn parse_usgs_param(text: &str) -> Result<FiniteSource> {
    let mut lines = text.lines();
    let first = lines
        .next()
        .ok_or_else(|| parse_error(FORMAT, "empty input"))?;
    let count = first
        .split(|c: char| c.is_whitespace() || c == '=')
        .filter(|token| !token.is_empty())
        .last()
        .ok_or_else(|| parse_error(FORMAT, "missing segment count"))?;
    let nseg = parse_count(count, FORMAT, "segment count")?;

    let mut sources = Vec::new();
    for segment in 0..nseg {
        if !lines.by_ref().any(|line| line.contains(ROWS_HEADER)) {
            return Err(parse_error(
                FORMAT,
                format!("segment {segment} of {nseg} has no subfault table"),
            ));
        }

        for line in lines.by_ref() {
            if line.contains(SEGMENT_HEADER) {
                break;
            }
            if line.trim().is_empty() {
                continue;
            }
            let [lat, lon, depth_km, _slip_cm, rake, strike, dip, t_rup, _t_rise, _t_fall, mo] =
                parse_floats::<11>(line, FORMAT, "subfault row")?;
            let point = GeodeticPoint::new(lat, lon, Some(depth_km * 1e3))?;
            sources.push(
                Source::from_strike_dip_rake(point, strike, dip, rake, mo * 1e-7)
                    .with_time_shift(t_rup),
            );
        }
    }

    tracing::info!(nseg, npointsources = sources.len(), "read USGS param rupture");

    let mut finite = FiniteSource::new(sources);
    if !finite.is_empty() {
        finite.find_hypocenter()?;
    }
    Ok(finite)
}

pub fn read_usgs_param_file(path: impl AsRef<Path>) -> Result<FiniteSource> {
    parse_usgs_param(&std::fs::read_to_string(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Located;
    use crate::SourceError;
    use approx::assert_relative_eq;

    const TWO_SEGMENTS: &str = "\
#Total number of fault_segments=     2
#Fault_segment =   1 nx(Along-strike)=    2 Dx=  2.00km ny(downdip)=    1 Dy=  2.00km
#Boundary of Fault_segment     1. EQ in cell (1,1). Lon: -117.5   Lat:   35.7
#Lon.  Lat.  Depth
  -117.60   35.80    0.50
#Lat. Lon. depth slip rake strike dip t_rup t_ris t_fal mo
   35.70  -117.50   8.00  120.0  180.0  320.0  85.0   2.50  1.0  1.0  1.0e+25
   35.72  -117.52   9.00   80.0  170.0  320.0  85.0   1.25  1.0  1.0  2.0e+25
#Fault_segment =   2 nx(Along-strike)=    1 Dx=  2.00km ny(downdip)=    1 Dy=  2.00km
#Boundary of Fault_segment     2. EQ in cell (1,1). Lon: -117.4   Lat:   35.6
#Lat. Lon. depth slip rake strike dip t_rup t_ris t_fal mo

   35.60  -117.40  12.00   10.0  175.0  140.0  80.0   4.00  1.0  1.0  5.0e+24
";

    #[test]
    fn test_reads_all_segments() {
        let finite = parse_usgs_param(TWO_SEGMENTS).unwrap();
        assert_eq!(finite.len(), 3);

        let second = &finite[1];
        assert_relative_eq!(second.depth_in_m().unwrap(), 9_000.0);
        assert_eq!(second.time_shift(), Some(1.25));
        assert!(second.sliprate().is_none());
        assert_relative_eq!(second.m0(), 2.0e18, max_relative = 1e-12);

        assert_relative_eq!(finite.m0().unwrap(), 3.5e18, max_relative = 1e-12);
        assert_eq!(finite.epicenter_latitude(), Some(35.72));
        assert_eq!(finite[2].longitude(), -117.40);
    }

    #[test]
    fn test_missing_segment_table() {
        let text = "#Total number of fault_segments=     2\n\
                    #Lat. Lon. depth slip rake strike dip t_rup t_ris t_fal mo\n\
                    35.70 -117.50 8.00 120.0 180.0 320.0 85.0 2.50 1.0 1.0 1.0e+25\n";
        assert!(matches!(
            parse_usgs_param(text),
            Err(SourceError::Parse { .. })
        ));
    }

    #[test]
    fn test_bad_row() {
        let text = "#Total number of fault_segments=     1\n\
                    #Lat. Lon. depth slip rake strike dip t_rup t_ris t_fal mo\n\
                    35.70 -117.50 8.00\n";
        assert!(parse_usgs_param(text).is_err());
    }
}
