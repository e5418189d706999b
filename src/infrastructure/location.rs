// SPDX-License-Identifier: MPL-2.0
//! Location adapters.

use crate::application::port::LocationProvider;
use crate::domain::metadata::GpsCoordinates;
use crate::error::CaptureError;
use futures_util::future::{self, BoxFuture, FutureExt};

/// Provider reporting a fixed position, or no fix at all.
///
/// Stands in for a device positioning service when captures run from a frame
/// directory, with the position taken from the command line or configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FixedLocationProvider {
    coordinate: Option<GpsCoordinates>,
}

impl FixedLocationProvider {
    #[must_use]
    pub fn new(coordinate: Option<GpsCoordinates>) -> Self {
        Self { coordinate }
    }

    /// Builds a provider from optional latitude and longitude; both are
    /// required for a fix.
    #[must_use]
    pub fn from_parts(latitude: Option<f64>, longitude: Option<f64>) -> Self {
        let coordinate = match (latitude, longitude) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => {
                Some(GpsCoordinates::new(lat, lon))
            }
            _ => None,
        };
        Self { coordinate }
    }

    #[must_use]
    pub fn coordinate(&self) -> Option<GpsCoordinates> {
        self.coordinate
    }
}

impl LocationProvider for FixedLocationProvider {
    fn current_coordinate(&self) -> BoxFuture<'static, Result<GpsCoordinates, CaptureError>> {
        let result = self
            .coordinate
            .ok_or_else(|| CaptureError::LocationUnavailable("no position configured".into()));
        future::ready(result).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixed_position_resolves() {
        let provider = FixedLocationProvider::new(Some(GpsCoordinates::new(10.0, -20.0)));
        let coordinate = provider.current_coordinate().await.unwrap();
        assert_eq!(coordinate, GpsCoordinates::new(10.0, -20.0));
    }

    #[tokio::test]
    async fn no_position_is_unavailable() {
        let provider = FixedLocationProvider::default();
        assert!(matches!(
            provider.current_coordinate().await,
            Err(CaptureError::LocationUnavailable(_))
        ));
    }

    #[test]
    fn from_parts_needs_both_values() {
        assert!(FixedLocationProvider::from_parts(Some(1.0), None)
            .coordinate()
            .is_none());
        assert!(FixedLocationProvider::from_parts(Some(f64::NAN), Some(1.0))
            .coordinate()
            .is_none());
        assert!(FixedLocationProvider::from_parts(Some(1.0), Some(2.0))
            .coordinate()
            .is_some());
    }
}
