// SPDX-License-Identifier: MPL-2.0
//! Metadata domain types.
//!
//! Pure domain types for geotagging with no external dependencies.

// =============================================================================
// GpsCoordinates
// =============================================================================

/// GPS coordinates in decimal degrees.
///
/// This type represents geographic coordinates using the WGS84 coordinate
/// system (latitude and longitude in decimal degrees).
///
/// # Example
///
/// ```
/// use roadlens::domain::metadata::GpsCoordinates;
///
/// let coords = GpsCoordinates::new(48.8566, 2.3522); // Paris
/// assert!(coords.is_valid());
/// assert_eq!(coords.format(), "48.856600° N, 2.352200° E");
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsCoordinates {
    /// Latitude in decimal degrees (-90.0 to 90.0)
    latitude: f64,
    /// Longitude in decimal degrees (-180.0 to 180.0)
    longitude: f64,
}

impl GpsCoordinates {
    /// Creates new GPS coordinates.
    ///
    /// Values outside valid ranges will be clamped:
    /// - Latitude: -90.0 to 90.0
    /// - Longitude: -180.0 to 180.0
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: latitude.clamp(-90.0, 90.0),
            longitude: longitude.clamp(-180.0, 180.0),
        }
    }

    /// Returns the latitude in decimal degrees.
    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Returns the longitude in decimal degrees.
    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Returns whether these coordinates are valid (not NaN or infinite).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// EXIF latitude reference: `'N'` for zero and positive values, `'S'` otherwise.
    #[must_use]
    pub fn latitude_ref(&self) -> char {
        if self.latitude >= 0.0 {
            'N'
        } else {
            'S'
        }
    }

    /// EXIF longitude reference: `'E'` for zero and positive values, `'W'` otherwise.
    #[must_use]
    pub fn longitude_ref(&self) -> char {
        if self.longitude >= 0.0 {
            'E'
        } else {
            'W'
        }
    }

    /// Formats the coordinates as a human-readable string.
    ///
    /// Format: "48.856600° N, 2.352200° E"
    #[must_use]
    pub fn format(&self) -> String {
        format!(
            "{:.6}° {}, {:.6}° {}",
            self.latitude.abs(),
            self.latitude_ref(),
            self.longitude.abs(),
            self.longitude_ref()
        )
    }
}

impl Default for GpsCoordinates {
    fn default() -> Self {
        Self {
            latitude: 0.0,
            longitude: 0.0,
        }
    }
}

// =============================================================================
// ExifRational
// =============================================================================

/// Unsigned EXIF rational (`RATIONAL` type, two `u32`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExifRational {
    numerator: u32,
    denominator: u32,
}

impl ExifRational {
    /// Creates a rational, returning `None` for a zero denominator.
    #[must_use]
    pub fn new(numerator: u32, denominator: u32) -> Option<Self> {
        (denominator != 0).then_some(Self {
            numerator,
            denominator,
        })
    }

    /// Creates a whole-number rational (`n/1`).
    #[must_use]
    pub fn whole(numerator: u32) -> Self {
        Self {
            numerator,
            denominator: 1,
        }
    }

    #[must_use]
    pub fn numerator(self) -> u32 {
        self.numerator
    }

    #[must_use]
    pub fn denominator(self) -> u32 {
        self.denominator
    }

    /// Returns the value as a float.
    #[must_use]
    pub fn to_f64(self) -> f64 {
        f64::from(self.numerator) / f64::from(self.denominator)
    }
}

// =============================================================================
// DmsCoordinate
// =============================================================================

/// Fixed-point denominator for the seconds component (two decimal digits).
pub const SECONDS_DENOMINATOR: u32 = 100;

/// A coordinate magnitude split into degrees, minutes and seconds rationals.
///
/// Degrees and minutes are whole numbers; seconds are stored with two decimal
/// digits (`round(seconds * 100) / 100`). The sign of the source value is not
/// represented here; it is carried by the EXIF reference tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DmsCoordinate {
    pub degrees: ExifRational,
    pub minutes: ExifRational,
    pub seconds: ExifRational,
}

impl DmsCoordinate {
    /// Decomposes a signed decimal-degree value.
    ///
    /// Returns `None` for non-finite input.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_decimal(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }

        let absolute = value.abs();
        let degrees = absolute.floor();
        let minutes_decimal = (absolute - degrees) * 60.0;
        let minutes = minutes_decimal.floor();
        let seconds = (minutes_decimal - minutes) * 60.0;

        // Bounded by 180 degrees, 59 minutes and 6000 hundredths of a second.
        Some(Self {
            degrees: ExifRational::whole(degrees as u32),
            minutes: ExifRational::whole(minutes as u32),
            seconds: ExifRational::new(
                (seconds * f64::from(SECONDS_DENOMINATOR)).round() as u32,
                SECONDS_DENOMINATOR,
            )?,
        })
    }

    /// Returns the three components in EXIF order.
    #[must_use]
    pub fn components(&self) -> [ExifRational; 3] {
        [self.degrees, self.minutes, self.seconds]
    }

    /// Reassembles the unsigned decimal-degree value.
    #[must_use]
    pub fn to_decimal(&self) -> f64 {
        self.degrees.to_f64() + self.minutes.to_f64() / 60.0 + self.seconds.to_f64() / 3600.0
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gps_coordinates_new() {
        let coords = GpsCoordinates::new(48.8566, 2.3522);
        assert!((coords.latitude() - 48.8566).abs() < f64::EPSILON);
        assert!((coords.longitude() - 2.3522).abs() < f64::EPSILON);
    }

    #[test]
    fn gps_coordinates_clamps_latitude() {
        let coords = GpsCoordinates::new(100.0, 0.0);
        assert!((coords.latitude() - 90.0).abs() < f64::EPSILON);

        let coords = GpsCoordinates::new(-100.0, 0.0);
        assert!((coords.latitude() - -90.0).abs() < f64::EPSILON);
    }

    #[test]
    fn gps_coordinates_clamps_longitude() {
        let coords = GpsCoordinates::new(0.0, 200.0);
        assert!((coords.longitude() - 180.0).abs() < f64::EPSILON);

        let coords = GpsCoordinates::new(0.0, -200.0);
        assert!((coords.longitude() - -180.0).abs() < f64::EPSILON);
    }

    #[test]
    fn gps_coordinates_nan_is_invalid() {
        assert!(!GpsCoordinates::new(f64::NAN, 0.0).is_valid());
        assert!(GpsCoordinates::new(-33.9, 151.2).is_valid());
    }

    #[test]
    fn references_at_zero_are_north_and_east() {
        let origin = GpsCoordinates::new(0.0, 0.0);
        assert_eq!(origin.latitude_ref(), 'N');
        assert_eq!(origin.longitude_ref(), 'E');
    }

    #[test]
    fn references_follow_sign() {
        let sydney = GpsCoordinates::new(-33.9, 151.2);
        assert_eq!((sydney.latitude_ref(), sydney.longitude_ref()), ('S', 'E'));

        let paris_west = GpsCoordinates::new(48.85, -2.35);
        assert_eq!(
            (paris_west.latitude_ref(), paris_west.longitude_ref()),
            ('N', 'W')
        );
    }

    #[test]
    fn gps_coordinates_format() {
        let sydney = GpsCoordinates::new(-33.8688, 151.2093);
        assert_eq!(sydney.format(), "33.868800° S, 151.209300° E");

        let nyc = GpsCoordinates::new(40.7128, -74.0060);
        assert_eq!(nyc.format(), "40.712800° N, 74.006000° W");
    }

    #[test]
    fn rational_rejects_zero_denominator() {
        assert!(ExifRational::new(1, 0).is_none());
        assert_eq!(ExifRational::new(3024, 100).map(ExifRational::to_f64), Some(30.24));
    }

    #[test]
    fn dms_decomposes_paris_latitude() {
        let dms = DmsCoordinate::from_decimal(48.8584).expect("finite value");
        assert_eq!(dms.degrees, ExifRational::whole(48));
        assert_eq!(dms.minutes, ExifRational::whole(51));
        assert_eq!(dms.seconds.denominator(), SECONDS_DENOMINATOR);

        let expected_seconds = (0.8584 * 60.0 - 51.0) * 60.0;
        assert!((dms.seconds.to_f64() - expected_seconds).abs() <= 0.01);
    }

    #[test]
    fn dms_ignores_sign() {
        assert_eq!(
            DmsCoordinate::from_decimal(-33.9),
            DmsCoordinate::from_decimal(33.9)
        );
    }

    #[test]
    fn dms_rejects_non_finite() {
        assert!(DmsCoordinate::from_decimal(f64::INFINITY).is_none());
        assert!(DmsCoordinate::from_decimal(f64::NAN).is_none());
    }

    #[test]
    fn dms_round_trip_is_within_rounding_precision() {
        for value in [0.0, 12.345_678, 89.999_9, 151.2093, 179.5] {
            let dms = DmsCoordinate::from_decimal(value).expect("finite value");
            // 0.005 seconds of rounding error
            assert!((dms.to_decimal() - value).abs() < 0.005 / 3600.0 + 1e-12);
        }
    }
}
