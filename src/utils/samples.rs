//! Externally supplied samples.
//!
//! Sample files hold one `x,y` pair per line, where `x` is an unsigned 32-bit
//! position across the whole domain and `y` the target value there. Blank
//! lines and lines starting with `#` are ignored.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Samples in canonical coordinates, sorted by position.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Samples {
    pub points: Vec<f64>,
    pub values: Vec<f64>,
}

/// Maps a 32-bit position onto `[-1, 1]`.
pub fn position_to_u(x: u32) -> f64 {
    2.0 * (f64::from(x) / f64::from(u32::MAX)) - 1.0
}

pub fn load_csv(path: &Path) -> io::Result<Samples> {
    parse_csv(BufReader::new(File::open(path)?))
}

pub fn parse_csv<R: BufRead>(reader: R) -> io::Result<Samples> {
    let mut rows = Vec::new();

    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut fields = line.split(',').map(str::trim);

        let (Some(x), Some(y)) = (fields.next(), fields.next()) else {
            log::warn!("line {}: expected `x,y`, skipping", number + 1);
            continue;
        };

        let invalid = |what: &str| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("line {}: invalid {what}", number + 1),
            )
        };

        let x: u32 = x.parse().map_err(|_| invalid("position"))?;
        let y: f64 = y.parse().map_err(|_| invalid("value"))?;

        rows.push((x, y));
    }

    rows.sort_by_key(|&(x, _)| x);

    log::info!("read {} samples", rows.len());

    Ok(Samples {
        points: rows.iter().map(|&(x, _)| position_to_u(x)).collect(),
        values: rows.iter().map(|&(_, y)| y).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_and_comments() {
        let text = "# x,y\n\n4294967295, 1.0\n0,-1.0\n2147483648,0.5\nbad\n";

        let samples = parse_csv(text.as_bytes()).unwrap();

        assert_eq!(samples.points.len(), 3);
        assert_eq!(samples.points[0], -1.0);
        assert_eq!(samples.points[2], 1.0);
        assert!(samples.points[1].abs() < 1e-9);
        assert_eq!(samples.values, vec![-1.0, 0.5, 1.0]);
    }

    #[test]
    fn malformed_numbers() {
        let err = parse_csv("1,2\n-3,4\n".as_bytes()).unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert_eq!(err.to_string(), "line 2: invalid position");

        assert!(parse_csv("1,abc\n".as_bytes()).is_err());
    }
}
