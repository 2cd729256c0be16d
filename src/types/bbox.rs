//! WGS84 bounding boxes used both for the advertised extent of a coverage and
//! for the user's area of interest.

use crate::error::MeteoFranceError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A rectangular extent in geographic coordinates (EPSG:4326, degrees).
///
/// # Examples
///
/// ```
/// use meteofrance_wcs::BoundingBox;
///
/// // Brittany
/// let bbox = BoundingBox::new(-5.2, 47.2, -1.0, 48.9).unwrap();
/// assert!(bbox.contains(-3.0, 48.0));
/// assert!(BoundingBox::new(2.0, 45.0, 1.0, 46.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// Creates a bounding box from its corners.
    ///
    /// # Errors
    ///
    /// Returns [`MeteoFranceError::InvalidBoundingBox`] if a coordinate is not finite
    /// or if a minimum is not strictly smaller than its maximum.
    pub fn new(
        min_lon: f64,
        min_lat: f64,
        max_lon: f64,
        max_lat: f64,
    ) -> Result<Self, MeteoFranceError> {
        let bbox = Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        };
        if bbox.is_valid() {
            Ok(bbox)
        } else {
            Err(MeteoFranceError::InvalidBoundingBox(bbox))
        }
    }

    pub fn is_valid(&self) -> bool {
        [self.min_lon, self.min_lat, self.max_lon, self.max_lat]
            .iter()
            .all(|c| c.is_finite())
            && self.min_lon < self.max_lon
            && self.min_lat < self.max_lat
    }

    /// Overlap of two boxes, `None` when they do not share any area.
    pub fn intersection(&self, other: &BoundingBox) -> Option<BoundingBox> {
        let overlap = BoundingBox {
            min_lon: self.min_lon.max(other.min_lon),
            min_lat: self.min_lat.max(other.min_lat),
            max_lon: self.max_lon.min(other.max_lon),
            max_lat: self.max_lat.min(other.max_lat),
        };
        overlap.is_valid().then_some(overlap)
    }

    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        (self.min_lon..=self.max_lon).contains(&lon) && (self.min_lat..=self.max_lat).contains(&lat)
    }

    pub fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }
}

impl TryFrom<(f64, f64, f64, f64)> for BoundingBox {
    type Error = MeteoFranceError;

    fn try_from(value: (f64, f64, f64, f64)) -> Result<Self, Self::Error> {
        BoundingBox::new(value.0, value.1, value.2, value.3)
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}, {})",
            self.min_lon, self.min_lat, self.max_lon, self.max_lat
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn france() -> BoundingBox {
        BoundingBox::new(-12.0, 37.5, 16.0, 55.4).unwrap()
    }

    #[test]
    fn test_rejects_inverted_or_flat_boxes() {
        assert!(matches!(
            BoundingBox::new(3.0, 45.0, 2.0, 46.0),
            Err(MeteoFranceError::InvalidBoundingBox(_))
        ));
        assert!(BoundingBox::new(2.0, 45.0, 2.0, 46.0).is_err());
        assert!(BoundingBox::new(f64::NAN, 45.0, 2.0, 46.0).is_err());
    }

    #[test]
    fn test_intersection_clips_to_domain() {
        let wide = BoundingBox::new(-20.0, 40.0, 0.0, 60.0).unwrap();
        let clipped = wide.intersection(&france()).unwrap();
        assert_eq!(clipped, BoundingBox::new(-12.0, 40.0, 0.0, 55.4).unwrap());
    }

    #[test]
    fn test_disjoint_boxes_have_no_intersection() {
        let pacific = BoundingBox::new(-170.0, -10.0, -150.0, 10.0).unwrap();
        assert_eq!(pacific.intersection(&france()), None);
    }

    #[test]
    fn test_try_from_tuple() {
        let bbox = BoundingBox::try_from((-1.0, 43.0, 1.5, 44.0)).unwrap();
        assert_eq!(bbox.width(), 2.5);
        assert_eq!(bbox.height(), 1.0);
        assert!(bbox.contains(0.0, 43.5));
        assert!(!bbox.contains(2.0, 43.5));
    }
}
