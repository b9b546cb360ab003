//! STATIONS receiver lists
//!
//! One receiver per line: `station network latitude longitude elevation
//! burial`. Elevation and burial are read but not used.

use std::path::Path;

use super::{parse_error, parse_value};
use crate::geodetic::GeodeticPoint;
use crate::source::Receiver;
use crate::Result;

const FORMAT: &str = "stations";

/// Receivers in file order, duplicates included
pub fn parse_stations(text: &str) -> Result<Vec<Receiver>> {
    let mut receivers = Vec::new();
    for (number, line) in text.lines().enumerate() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }
        let [station, network, lat, lon, elevation, burial] = tokens[..] else {
            return Err(parse_error(
                FORMAT,
                format!("line {} needs 6 columns, found {}", number + 1, tokens.len()),
            ));
        };
        let latitude: f64 = parse_value(lat, FORMAT, "latitude")?;
        let longitude: f64 = parse_value(lon, FORMAT, "longitude")?;
        parse_value::<f64>(elevation, FORMAT, "elevation")?;
        parse_value::<f64>(burial, FORMAT, "burial")?;

        receivers.push(Receiver::new(
            GeodeticPoint::new(latitude, longitude, None)?,
            network,
            station,
        ));
    }

    if receivers.is_empty() {
        return Err(parse_error(FORMAT, "no receivers found"));
    }
    tracing::info!(nreceivers = receivers.len(), "read STATIONS file");
    Ok(receivers)
}

pub fn read_stations_file(path: impl AsRef<Path>) -> Result<Vec<Receiver>> {
    parse_stations(&std::fs::read_to_string(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Located;
    use crate::SourceError;
    use std::io::Write;

    #[test]
    fn test_parse_lines() {
        let receivers = parse_stations(
            "AAK   II  42.6390   74.4940  1633.1  30.0\n\n\
             ANMO  IU  34.9459 -106.4572  1850.0 100.0\n",
        )
        .unwrap();
        assert_eq!(receivers.len(), 2);
        assert_eq!(receivers[0].network, "II");
        assert_eq!(receivers[0].station, "AAK");
        assert_eq!(receivers[1].longitude(), -106.4572);
        assert_eq!(receivers[1].depth_in_m(), None);
    }

    #[test]
    fn test_rejects_bad_lines() {
        assert!(matches!(
            parse_stations("AAK II 42.6 74.5 1633.1\n"),
            Err(SourceError::Parse { .. })
        ));
        assert!(matches!(
            parse_stations("AAK II 95.0 74.5 1633.1 30.0\n"),
            Err(SourceError::Validation(_))
        ));
        assert!(parse_stations("").is_err());
    }

    #[test]
    fn test_read_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "BFO GR 48.3319 8.3311 589.0 0.0").unwrap();
        let receivers = read_stations_file(file.path()).unwrap();
        assert_eq!(receivers[0].station, "BFO");
    }
}
