//! Search for the most recent model run whose forecast reaches far enough ahead.

use crate::types::run_time::RunTime;
use crate::wcs::description::CoverageDescription;
use chrono::{DateTime, Duration, Utc};
use log::{info, warn};
use std::future::Future;

/// The run-time accepted by [`scan_run_times`].
#[derive(Debug, Clone, PartialEq)]
pub struct HorizonMatch {
    pub run_time: RunTime,
    pub description: CoverageDescription,
    /// Time steps `t` with `now < t <= now + horizon`, ascending.
    pub requested_steps: Vec<DateTime<Utc>>,
}

/// Walks `run_times` from most recent to oldest, describing each one, and
/// returns the first whose last time step is at or after `now + horizon_hours`.
///
/// `describe` is called once per visited run-time; its first error stops the
/// scan. `Ok(None)` means no run-time covers the horizon, which includes a
/// horizon too far ahead to be represented.
pub async fn scan_run_times<F, Fut, E>(
    run_times: &[RunTime],
    now: DateTime<Utc>,
    horizon_hours: u32,
    mut describe: F,
) -> Result<Option<HorizonMatch>, E>
where
    F: FnMut(RunTime) -> Fut,
    Fut: Future<Output = Result<CoverageDescription, E>>,
{
    let Some(limit) = now.checked_add_signed(Duration::hours(i64::from(horizon_hours))) else {
        warn!("Horizon of {} hours is out of range", horizon_hours);
        return Ok(None);
    };
    let mut candidates = run_times.to_vec();
    candidates.sort_unstable_by(|a, b| b.cmp(a));
    candidates.dedup();

    for run_time in candidates {
        let description = describe(run_time).await?;
        match description.last_time_step() {
            Some(last) if last >= limit => {
                info!("Run time {} covers the next {} hours", run_time, horizon_hours);
                let requested_steps = description
                    .time_steps
                    .iter()
                    .copied()
                    .filter(|t| *t > now && *t <= limit)
                    .collect();
                return Ok(Some(HorizonMatch {
                    run_time,
                    description,
                    requested_steps,
                }));
            }
            last => warn!(
                "Run time {} ends at {:?}, before {}",
                run_time, last, limit
            ),
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::bbox::BoundingBox;
    use crate::wcs::description::time_steps;
    use chrono::TimeZone;
    use std::cell::RefCell;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 2, 27, 10, 23, 0).unwrap()
    }

    fn run_time(day: u32, hour: u32) -> RunTime {
        RunTime::from(Utc.with_ymd_and_hms(2020, 2, day, hour, 0, 0).unwrap())
    }

    /// A run starting at `run_time` forecasting `length_hours` hours ahead.
    fn description(run_time: RunTime, length_hours: i64) -> CoverageDescription {
        let begin = run_time.to_utc() + Duration::hours(1);
        let end = run_time.to_utc() + Duration::hours(length_hours);
        CoverageDescription {
            max_bbox: BoundingBox {
                min_lon: -12.0,
                min_lat: 37.5,
                max_lon: 16.0,
                max_lat: 55.4,
            },
            axis_labels: vec![],
            uom_labels: vec![],
            begin,
            end,
            time_steps: time_steps(begin, end, Duration::hours(1)),
        }
    }

    #[tokio::test]
    async fn test_latest_run_time_is_kept_when_it_covers_the_horizon() {
        let run_times = [run_time(27, 3), run_time(27, 6), run_time(26, 18)];
        let visited = RefCell::new(Vec::new());
        let found = scan_run_times(&run_times, now(), 24, |rt| {
            visited.borrow_mut().push(rt);
            async move { Ok::<_, ()>(description(rt, 42)) }
        })
        .await
        .unwrap()
        .unwrap();
        assert_eq!(found.run_time, run_time(27, 6));
        assert_eq!(visited.into_inner(), [run_time(27, 6)]);
        assert_eq!(found.requested_steps.len(), 24);
        assert_eq!(
            found.requested_steps[0],
            Utc.with_ymd_and_hms(2020, 2, 27, 11, 0, 0).unwrap()
        );
        assert_eq!(
            found.requested_steps[23],
            Utc.with_ymd_and_hms(2020, 2, 28, 10, 0, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn test_falls_back_to_older_run_time() {
        // The latest run only reaches 12 hours ahead, the previous one 48 hours.
        let latest = run_time(27, 9);
        let previous = run_time(27, 6);
        let found = scan_run_times(&[previous, latest], now(), 24, |rt| async move {
            let length = if rt == latest { 12 } else { 48 };
            Ok::<_, ()>(description(rt, length))
        })
        .await
        .unwrap()
        .unwrap();
        assert_eq!(found.run_time, previous);
        assert!(found.description.last_time_step().unwrap() >= now() + Duration::hours(24));
    }

    #[tokio::test]
    async fn test_never_accepts_a_short_run() {
        let found = scan_run_times(&[run_time(27, 6), run_time(27, 9)], now(), 48, |rt| async move {
            Ok::<_, ()>(description(rt, 30))
        })
        .await
        .unwrap();
        assert_eq!(found, None);
    }

    #[tokio::test]
    async fn test_describe_error_stops_the_scan() {
        let calls = RefCell::new(0);
        let result = scan_run_times(&[run_time(27, 6), run_time(27, 9)], now(), 6, |_| {
            *calls.borrow_mut() += 1;
            async { Err::<CoverageDescription, _>("boom") }
        })
        .await;
        assert_eq!(result, Err("boom"));
        assert_eq!(calls.into_inner(), 1);
    }

    #[tokio::test]
    async fn test_unrepresentable_horizon_is_not_covered() {
        let calls = RefCell::new(0);
        let found = scan_run_times(&[run_time(27, 6)], now(), u32::MAX, |rt| {
            *calls.borrow_mut() += 1;
            async move { Ok::<_, ()>(description(rt, 48)) }
        })
        .await
        .unwrap();
        assert!(found.is_none());
        assert_eq!(calls.into_inner(), 0);
    }

    #[tokio::test]
    async fn test_empty_list() {
        let found = scan_run_times(&[], now(), 6, |rt| async move {
            Ok::<_, ()>(description(rt, 30))
        })
        .await
        .unwrap();
        assert!(found.is_none());
    }
}
