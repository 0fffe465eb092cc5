use crate::error::{Field, ValidationError};

pub const LATITUDE_RANGE: (f64, f64) = (-90.0, 90.0);
pub const LONGITUDE_RANGE: (f64, f64) = (-180.0, 180.0);

/// Check a city form in three passes: presence, numeric format, range.
///
/// All fields are checked for presence before any is parsed, and both
/// coordinates are parsed before either is range-checked, so a malformed
/// number is never reported as a range error.
pub fn validate_city_fields(
    name: &str,
    latitude: &str,
    longitude: &str,
) -> Result<(f64, f64), ValidationError> {
    let name = name.trim();
    let latitude = latitude.trim();
    let longitude = longitude.trim();

    if name.is_empty() {
        return Err(ValidationError::Missing(Field::Name));
    }
    if latitude.is_empty() {
        return Err(ValidationError::Missing(Field::Latitude));
    }
    if longitude.is_empty() {
        return Err(ValidationError::Missing(Field::Longitude));
    }

    let lat = parse_coordinate(latitude, Field::Latitude)?;
    let lon = parse_coordinate(longitude, Field::Longitude)?;

    check_range(lat, LATITUDE_RANGE, Field::Latitude)?;
    check_range(lon, LONGITUDE_RANGE, Field::Longitude)?;

    Ok((lat, lon))
}

fn parse_coordinate(value: &str, field: Field) -> Result<f64, ValidationError> {
    // f64::from_str accepts "NaN" and "inf"; neither is a coordinate.
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or(ValidationError::NotNumeric(field))
}

fn check_range(value: f64, (min, max): (f64, f64), field: Field) -> Result<(), ValidationError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange(field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_fields() {
        let (lat, lon) = validate_city_fields("Paris", "48.85", "2.35").unwrap();
        assert_eq!(lat, 48.85);
        assert_eq!(lon, 2.35);
    }

    #[test]
    fn accepts_range_bounds() {
        assert!(validate_city_fields("Pole", "90", "-180").is_ok());
        assert!(validate_city_fields("Pole", "-90", "180").is_ok());
    }

    #[test]
    fn rejects_missing_fields_in_order() {
        assert_eq!(
            validate_city_fields("  ", "1", "1"),
            Err(ValidationError::Missing(Field::Name))
        );
        assert_eq!(
            validate_city_fields("X", "", "abc"),
            Err(ValidationError::Missing(Field::Latitude))
        );
        assert_eq!(
            validate_city_fields("X", "1", " "),
            Err(ValidationError::Missing(Field::Longitude))
        );
    }

    #[test]
    fn malformed_numbers_are_format_errors_not_range_errors() {
        for bad in ["abc", "1,5", "12.3.4", "NaN", "inf", "-infinity", "1e"] {
            assert_eq!(
                validate_city_fields("X", bad, "500"),
                Err(ValidationError::NotNumeric(Field::Latitude)),
                "latitude {bad:?}"
            );
            assert_eq!(
                validate_city_fields("X", "95", bad),
                Err(ValidationError::NotNumeric(Field::Longitude)),
                "longitude {bad:?}"
            );
        }
    }

    #[test]
    fn rejects_out_of_range() {
        for (lat, lon, field) in [
            ("90.0001", "0", Field::Latitude),
            ("-91", "0", Field::Latitude),
            ("0", "180.5", Field::Longitude),
            ("0", "-1000", Field::Longitude),
        ] {
            assert_eq!(
                validate_city_fields("X", lat, lon),
                Err(ValidationError::OutOfRange(field))
            );
        }
    }
}
