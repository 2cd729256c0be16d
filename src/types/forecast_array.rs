//! Contains [`ForecastArray`], the `(time, y, x)` grid produced by
//! [`crate::CoverageSession::create_3d_array`].

use crate::types::bbox::BoundingBox;
use crate::types::coverage_id::CoverageId;
use chrono::{DateTime, Utc};
use ndarray::{Array3, ArrayView2, Axis};

/// Forecast values of one coverage over a bounding box, one 2D frame per time step.
///
/// Frames are ordered by ascending time; `times[i]` is the valid time of
/// `values.index_axis(Axis(0), i)`. Row 0 of each frame is the northern edge,
/// as delivered by the service.
#[derive(Debug, Clone)]
pub struct ForecastArray {
    pub title: String,
    pub coverage_id: CoverageId,
    pub bbox: BoundingBox,
    pub times: Vec<DateTime<Utc>>,
    pub values: Array3<f32>,
}

impl ForecastArray {
    /// Number of time steps.
    pub fn len(&self) -> usize {
        self.values.len_of(Axis(0))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(time, y, x)` dimensions.
    pub fn shape(&self) -> (usize, usize, usize) {
        self.values.dim()
    }

    pub fn frame(&self, index: usize) -> Option<ArrayView2<'_, f32>> {
        (index < self.len()).then(|| self.values.index_axis(Axis(0), index))
    }

    /// Smallest and largest finite values over every frame.
    pub fn value_range(&self) -> Option<(f32, f32)> {
        self.values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |range, v| match range {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> ForecastArray {
        let mut values = Array3::<f32>::zeros((2, 2, 3));
        values[[0, 0, 0]] = -4.5;
        values[[1, 1, 2]] = 12.0;
        values[[1, 0, 1]] = f32::NAN;
        ForecastArray {
            title: "Temperature at specified height level above ground".to_string(),
            coverage_id: CoverageId::from("TEMPERATURE__SPECIFIC_HEIGHT_LEVEL_ABOVE_GROUND___2020-02-27T09.00.00Z"),
            bbox: BoundingBox::new(-1.0, 43.0, 1.0, 44.0).unwrap(),
            times: vec![
                Utc.with_ymd_and_hms(2020, 2, 27, 10, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2020, 2, 27, 11, 0, 0).unwrap(),
            ],
            values,
        }
    }

    #[test]
    fn test_shape_and_frames() {
        let array = sample();
        assert_eq!(array.len(), 2);
        assert_eq!(array.shape(), (2, 2, 3));
        assert_eq!(array.frame(1).unwrap()[[1, 2]], 12.0);
        assert!(array.frame(2).is_none());
    }

    #[test]
    fn test_value_range_skips_nan() {
        assert_eq!(sample().value_range(), Some((-4.5, 12.0)));
    }
}
