//! Coordinates and the viewport search area.
//!
//! A "search in view" request takes the visible map bounds and turns them
//! into a circle the Places API accepts: the center of the box, and the
//! distance from that center to the north-east corner, capped so a zoomed-out
//! viewport never exceeds the service's radius limit.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mean earth radius used by web map widgets for `distanceTo`.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Whether the coordinate is finite and inside the WGS84 ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// Great-circle distance in meters (haversine).
    #[must_use]
    pub fn distance_to(&self, other: &LatLng) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let delta_lat = (other.lat - self.lat).to_radians();
        let delta_lng = (other.lng - self.lng).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_METERS * c
    }
}

impl std::fmt::Display for LatLng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4},{:.4}", self.lat, self.lng)
    }
}

impl std::str::FromStr for LatLng {
    type Err = BoundsError;

    /// Parses `"LAT,LNG"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lng) = s
            .split_once(',')
            .ok_or_else(|| BoundsError::Parse(s.to_string()))?;
        let lat = lat
            .trim()
            .parse::<f64>()
            .map_err(|_| BoundsError::Parse(s.to_string()))?;
        let lng = lng
            .trim()
            .parse::<f64>()
            .map_err(|_| BoundsError::Parse(s.to_string()))?;
        let point = LatLng::new(lat, lng);
        if !point.is_valid() {
            return Err(BoundsError::OutOfRange(point));
        }
        Ok(point)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum BoundsError {
    #[error("expected LAT,LNG but got '{0}'")]
    Parse(String),

    #[error("coordinate {0} is outside the valid latitude/longitude range")]
    OutOfRange(LatLng),

    #[error("south-west corner {south_west} lies north of north-east corner {north_east}")]
    Inverted {
        north_east: LatLng,
        south_west: LatLng,
    },
}

/// Visible map area as reported by the map widget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportBounds {
    pub north_east: LatLng,
    pub south_west: LatLng,
}

impl ViewportBounds {
    /// Checks both corners and their ordering.
    ///
    /// # Errors
    ///
    /// Returns [`BoundsError::OutOfRange`] for an invalid corner and
    /// [`BoundsError::Inverted`] when the corners are swapped north/south.
    pub fn new(north_east: LatLng, south_west: LatLng) -> Result<Self, BoundsError> {
        for corner in [north_east, south_west] {
            if !corner.is_valid() {
                return Err(BoundsError::OutOfRange(corner));
            }
        }
        if south_west.lat > north_east.lat {
            return Err(BoundsError::Inverted {
                north_east,
                south_west,
            });
        }
        Ok(Self {
            north_east,
            south_west,
        })
    }

    /// A south-west longitude east of the north-east one means the box wraps
    /// across the 180th meridian.
    #[must_use]
    pub fn crosses_antimeridian(&self) -> bool {
        self.south_west.lng > self.north_east.lng
    }

    /// Geometric center of the box, averaged per axis. Longitude is averaged
    /// eastward from the south-west corner when the box wraps.
    #[must_use]
    pub fn center(&self) -> LatLng {
        let lat = (self.south_west.lat + self.north_east.lat) / 2.0;
        let lng = if self.crosses_antimeridian() {
            let span = self.north_east.lng + 360.0 - self.south_west.lng;
            normalize_lng(self.south_west.lng + span / 2.0)
        } else {
            (self.south_west.lng + self.north_east.lng) / 2.0
        };
        LatLng::new(lat, lng)
    }
}

fn normalize_lng(lng: f64) -> f64 {
    if lng > 180.0 {
        lng - 360.0
    } else {
        lng
    }
}

/// Circle handed to the nearby search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchArea {
    pub center: LatLng,
    pub radius_meters: f64,
}

/// Derive the search circle for a viewport, capping the radius at `cap_meters`.
///
/// # Errors
///
/// Returns a [`BoundsError`] if the bounds fail [`ViewportBounds::new`]'s checks
/// (bounds deserialized from a request skip the constructor).
pub fn viewport_search_area(
    bounds: &ViewportBounds,
    cap_meters: f64,
) -> Result<SearchArea, BoundsError> {
    let bounds = ViewportBounds::new(bounds.north_east, bounds.south_west)?;
    let center = bounds.center();
    let distance = center.distance_to(&bounds.north_east);
    Ok(SearchArea {
        center,
        radius_meters: capped_radius(distance, cap_meters),
    })
}

fn capped_radius(distance_meters: f64, cap_meters: f64) -> f64 {
    distance_meters.min(cap_meters)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let a = LatLng::new(59.0, 18.0);
        let b = LatLng::new(60.0, 18.0);
        let d = a.distance_to(&b);
        assert!((d - 111_194.93).abs() < 1.0, "got {d}");
    }

    #[test]
    fn distance_to_self_is_zero() {
        let p = LatLng::new(59.3293, 18.0686);
        assert!(p.distance_to(&p).abs() < f64::EPSILON);
    }

    #[test]
    fn capped_radius_applies_cap_only_when_exceeded() {
        assert!((capped_radius(50_000.0, 30_000.0) - 30_000.0).abs() < f64::EPSILON);
        assert!((capped_radius(10_000.0, 30_000.0) - 10_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn center_is_midpoint_of_corners() {
        let bounds =
            ViewportBounds::new(LatLng::new(60.0, 20.0), LatLng::new(58.0, 16.0)).unwrap();
        assert_eq!(bounds.center(), LatLng::new(59.0, 18.0));
    }

    #[test]
    fn large_viewport_is_capped() {
        // Roughly all of southern Sweden: center-to-corner is hundreds of km.
        let bounds =
            ViewportBounds::new(LatLng::new(61.0, 20.0), LatLng::new(55.0, 11.0)).unwrap();
        let area = viewport_search_area(&bounds, 30_000.0).unwrap();
        assert!((area.radius_meters - 30_000.0).abs() < f64::EPSILON);
        assert_eq!(area.center, LatLng::new(58.0, 15.5));
    }

    #[test]
    fn small_viewport_uses_corner_distance() {
        let bounds =
            ViewportBounds::new(LatLng::new(59.36, 18.12), LatLng::new(59.30, 18.00)).unwrap();
        let area = viewport_search_area(&bounds, 30_000.0).unwrap();
        let expected = bounds.center().distance_to(&bounds.north_east);
        assert!(expected < 30_000.0);
        assert!((area.radius_meters - expected).abs() < f64::EPSILON);
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let err = ViewportBounds::new(LatLng::new(58.0, 20.0), LatLng::new(60.0, 16.0))
            .unwrap_err();
        assert!(matches!(err, BoundsError::Inverted { .. }));
    }

    #[test]
    fn antimeridian_viewport_centers_on_the_wrapped_side() {
        let bounds =
            ViewportBounds::new(LatLng::new(10.0, -160.0), LatLng::new(0.0, 170.0)).unwrap();
        assert!(bounds.crosses_antimeridian());
        assert_eq!(bounds.center(), LatLng::new(5.0, -175.0));
    }

    #[test]
    fn antimeridian_search_stays_near_the_corners() {
        // Around Fiji: 2 degrees wide, straddling 180.
        let bounds =
            ViewportBounds::new(LatLng::new(-16.0, -179.0), LatLng::new(-18.0, 179.0)).unwrap();
        let area = viewport_search_area(&bounds, 500_000.0).unwrap();
        assert!((area.center.lng.abs() - 180.0).abs() < 1e-9, "got {}", area.center);
        assert!(area.radius_meters < 200_000.0, "got {}", area.radius_meters);
    }

    #[test]
    fn deserialized_bounds_are_checked_before_use() {
        let bounds: ViewportBounds = serde_json::from_value(serde_json::json!({
            "north_east": { "lat": 91.0, "lng": 18.0 },
            "south_west": { "lat": 59.0, "lng": 17.0 }
        }))
        .unwrap();
        let err = viewport_search_area(&bounds, 30_000.0).unwrap_err();
        assert!(matches!(err, BoundsError::OutOfRange(_)));
    }

    #[test]
    fn parses_lat_lng_pair() {
        let p: LatLng = "59.3293, 18.0686".parse().unwrap();
        assert_eq!(p, LatLng::new(59.3293, 18.0686));
        assert!("59.3".parse::<LatLng>().is_err());
        assert!(matches!(
            "120.0,18.0".parse::<LatLng>(),
            Err(BoundsError::OutOfRange(_))
        ));
    }
}
