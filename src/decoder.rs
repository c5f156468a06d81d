use thiserror::Error;

/// Keys matched verbatim in the listener line protocol.
const SITE_ID_KEY: &str = "site_id";
const GPS_WEEK_KEY: &str = "gps_week";
const GPS_MILLISECOND_KEY: &str = "gps_millisecond";
const SATELLITE_NUMBER_KEY: &str = "Satellite number";

/// Keys matched by containment: the receiver prints the unit in the key,
/// for example "Real-time XYZ (m)".
const XYZ_KEY_FRAGMENT: &str = "Real-time XYZ";
const ENU_KEY_FRAGMENT: &str = "Real-time ENU";

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid integer for \"{key}\": \"{value}\"")]
    InvalidInteger { key: String, value: String },

    #[error("invalid component in 3-vector for \"{key}\": \"{value}\"")]
    InvalidVector { key: String, value: String },

    #[error("expected 3 components for \"{key}\", found {found}: \"{value}\"")]
    VectorLength {
        key: String,
        value: String,
        found: usize,
    },
}

/// One decoded key/value pair from a listener output line.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldUpdate {
    SiteId(String),
    GpsWeek(u32),
    GpsMillisecond(u64),
    Xyz([f64; 3]),
    SatelliteNumber(u32),
    Enu([f64; 3]),
}

/// Decodes one trimmed line of listener output.
///
/// Lines without a `=` separator and lines with an unrecognized key are
/// not errors: they decode to `None`. Only recognized keys carrying a
/// malformed numeric payload yield a [ParseError].
pub fn decode(line: &str) -> Result<Option<FieldUpdate>, ParseError> {
    let Some((key, value)) = line.split_once('=') else {
        return Ok(None);
    };

    let (key, value) = (key.trim(), value.trim());

    let update = if key == SITE_ID_KEY {
        FieldUpdate::SiteId(value.to_string())
    } else if key == GPS_WEEK_KEY {
        FieldUpdate::GpsWeek(parse_integer(key, value)?)
    } else if key == GPS_MILLISECOND_KEY {
        FieldUpdate::GpsMillisecond(parse_integer(key, value)?)
    } else if key.contains(XYZ_KEY_FRAGMENT) {
        FieldUpdate::Xyz(parse_triple(key, value)?)
    } else if key == SATELLITE_NUMBER_KEY {
        FieldUpdate::SatelliteNumber(parse_integer(key, value)?)
    } else if key.contains(ENU_KEY_FRAGMENT) {
        FieldUpdate::Enu(parse_triple(key, value)?)
    } else {
        return Ok(None);
    };

    Ok(Some(update))
}

fn parse_integer<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidInteger {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_triple(key: &str, value: &str) -> Result<[f64; 3], ParseError> {
    let mut components = [0.0; 3];
    let mut count = 0;

    for item in value.split(',') {
        if count == 3 {
            count += 1;
            break;
        }

        components[count] = item.trim().parse().map_err(|_| ParseError::InvalidVector {
            key: key.to_string(),
            value: value.to_string(),
        })?;

        count += 1;
    }

    if count != 3 {
        return Err(ParseError::VectorLength {
            key: key.to_string(),
            value: value.to_string(),
            found: count,
        });
    }

    Ok(components)
}
