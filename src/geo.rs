//! Geographic coordinates, great-circle distance and bounding regions

/// Mean Earth radius in meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A point on the globe in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl Coordinates {
    /// Create a new coordinate pair
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether latitude and longitude are finite and inside their ranges
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Format as `lat, lon` with four decimals
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }

    /// Great-circle distance to `other` in meters
    #[must_use]
    pub fn distance_to(&self, other: &Coordinates) -> f64 {
        haversine_meters(self, other)
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.format_coordinates())
    }
}

/// Haversine distance between two points in meters.
///
/// The inner term is clamped to `[0, 1]` so rounding can never push
/// `sqrt(1 - a)` negative for near-antipodal points.
#[must_use]
pub fn haversine_meters(from: &Coordinates, to: &Coordinates) -> f64 {
    let phi1 = from.latitude.to_radians();
    let phi2 = to.latitude.to_radians();
    let d_phi = (to.latitude - from.latitude).to_radians();
    let d_lambda = (to.longitude - from.longitude).to_radians();

    let a = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Axis-aligned lat/lon box grown point by point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub south_west: Coordinates,
    pub north_east: Coordinates,
}

impl Bounds {
    /// Zero-sized box on a single point
    #[must_use]
    pub const fn at(point: Coordinates) -> Self {
        Self {
            south_west: point,
            north_east: point,
        }
    }

    /// Grow the box so it holds `point`
    pub fn extend(&mut self, point: Coordinates) {
        self.south_west.latitude = self.south_west.latitude.min(point.latitude);
        self.south_west.longitude = self.south_west.longitude.min(point.longitude);
        self.north_east.latitude = self.north_east.latitude.max(point.latitude);
        self.north_east.longitude = self.north_east.longitude.max(point.longitude);
    }

    #[must_use]
    pub fn contains(&self, point: &Coordinates) -> bool {
        let latitudes = self.south_west.latitude..=self.north_east.latitude;
        let longitudes = self.south_west.longitude..=self.north_east.longitude;
        latitudes.contains(&point.latitude) && longitudes.contains(&point.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_identical_points_are_zero_apart() {
        let p = Coordinates::new(13.826_678, 100.575_003);
        assert_eq!(haversine_meters(&p, &p), 0.0);
    }

    #[test]
    fn test_short_hop_near_store() {
        let store = Coordinates::new(13.8267, 100.5750);
        let user = Coordinates::new(13.8267, 100.5751);
        let d = store.distance_to(&user);
        assert!((d - 10.8).abs() < 0.5, "got {d}");
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = Coordinates::new(13.8267, 100.5750);
        let b = Coordinates::new(13.90, 100.60);
        assert!((a.distance_to(&b) - b.distance_to(&a)).abs() < 1e-6);
    }

    #[test]
    fn test_antipodal_points_stay_finite() {
        let a = Coordinates::new(0.0, 0.0);
        let b = Coordinates::new(0.0, 180.0);
        let d = haversine_meters(&a, &b);
        assert!(d.is_finite());
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_M).abs() < 1.0);

        let c = Coordinates::new(-13.8267, -79.425);
        let e = Coordinates::new(13.8267, 100.575);
        assert!(haversine_meters(&c, &e).is_finite());
    }

    #[rstest]
    #[case(Coordinates::new(13.8267, 100.5750), Coordinates::new(13.90, 100.60))]
    #[case(Coordinates::new(46.8182, 8.2275), Coordinates::new(47.3769, 8.5417))]
    #[case(Coordinates::new(-33.8688, 151.2093), Coordinates::new(51.5074, -0.1278))]
    fn test_matches_haversine_crate(#[case] from: Coordinates, #[case] to: Coordinates) {
        let reference = haversine::distance(
            haversine::Location {
                latitude: from.latitude,
                longitude: from.longitude,
            },
            haversine::Location {
                latitude: to.latitude,
                longitude: to.longitude,
            },
            haversine::Units::Kilometers,
        ) * 1000.0;
        let ours = haversine_meters(&from, &to);
        let error = (ours - reference).abs();
        assert!(error < 1e-3 * reference.max(1.0), "{ours} vs {reference}");
    }

    #[rstest]
    #[case(90.0, 180.0, true)]
    #[case(-90.0, -180.0, true)]
    #[case(90.5, 0.0, false)]
    #[case(0.0, -180.1, false)]
    #[case(f64::NAN, 0.0, false)]
    fn test_coordinate_validity(#[case] lat: f64, #[case] lon: f64, #[case] valid: bool) {
        assert_eq!(Coordinates::new(lat, lon).is_valid(), valid);
    }

    #[test]
    fn test_bounds_cover_both_points() {
        let user = Coordinates::new(13.90, 100.60);
        let store = Coordinates::new(13.8267, 100.5750);
        let mut bounds = Bounds::at(user);
        bounds.extend(store);

        assert_eq!(bounds.south_west, Coordinates::new(13.8267, 100.5750));
        assert_eq!(bounds.north_east, Coordinates::new(13.90, 100.60));
        assert!(bounds.contains(&user));
        assert!(bounds.contains(&store));
        assert!(!bounds.contains(&Coordinates::new(13.95, 100.58)));
    }

    #[test]
    fn test_point_bounds() {
        let store = Coordinates::new(13.8267, 100.5750);
        let bounds = Bounds::at(store);
        assert_eq!(bounds.south_west, bounds.north_east);
        assert!(bounds.contains(&store));
        assert!(!bounds.contains(&Coordinates::new(13.8268, 100.5750)));
    }

    #[test]
    fn test_format_coordinates() {
        let p = Coordinates::new(13.826_678_422_033_615, 100.575_003_006_732_89);
        assert_eq!(p.format_coordinates(), "13.8267, 100.5750");
    }
}
