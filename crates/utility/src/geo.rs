/// Number of decimal digits the upstream API and the database carry for
/// station coordinates.
pub const COORDINATE_DECIMALS: u32 = 7;

/// Rounds a coordinate to [`COORDINATE_DECIMALS`] decimal places.
///
/// Uses `f64::round` semantics, i.e. ties round half away from zero.
pub fn round_coordinate(value: f64) -> f64 {
    let factor = 10f64.powi(COORDINATE_DECIMALS as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_seven_decimal_places() {
        assert_eq!(round_coordinate(48.123456789), 48.1234568);
        assert_eq!(round_coordinate(16.123456749), 16.1234567);
    }

    #[test]
    fn keeps_exact_values_untouched() {
        assert_eq!(round_coordinate(48.1234567), 48.1234567);
        assert_eq!(round_coordinate(-16.37), -16.37);
    }

    #[test]
    fn rounds_negative_coordinates_away_from_zero() {
        assert_eq!(round_coordinate(-48.123456789), -48.1234568);
    }
}
