//! Statistics calculation engine.
//!
//! Turns raw scrim rows into derived facts:
//! - Team roster inference from free-text team names
//! - Map winner determination
//! - Team fight reconstruction and outcome analysis
//! - Hero population comparisons (per-10 rates, z-scores, percentiles)
//! - MVP scoring
//! - Team rollups (roles, hero pool, map modes, trends, quick wins, trios)
//!   and the combined team report

pub mod comparator;
pub mod context;
pub mod dataset;
pub mod fight_stats;
pub mod fights;
pub mod hero_pool;
pub mod map_modes;
pub mod mvp;
pub mod overview;
pub mod quick_wins;
pub mod report;
pub mod roles;
pub mod roster;
pub mod trends;
pub mod trios;
pub mod winner;

pub use context::RequestContext;
pub use dataset::TeamDataset;

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

use crate::storage::StoreError;

/// Errors that abort an analytics request.
///
/// Indeterminate results (no winner, degenerate population) are not errors;
/// they surface as `None` or empty collections.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Run an analytics future under a deadline.
///
/// On expiry the future is dropped, abandoning any in-flight store reads, and
/// the request fails as a whole.
pub async fn with_deadline<T, F>(deadline: Duration, fut: F) -> Result<T, AnalyticsError>
where
    F: Future<Output = Result<T, AnalyticsError>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => Err(AnalyticsError::Timeout(deadline)),
    }
}

/// Per-10-minute rate of a stat total.
pub fn per_ten(total: f64, seconds_played: f64) -> f64 {
    if seconds_played <= 0.0 {
        0.0
    } else {
        total / seconds_played * 600.0
    }
}

/// Ratio that reads as zero when the denominator is zero.
pub fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_ten() {
        assert_eq!(per_ten(10.0, 600.0), 10.0);
        assert_eq!(per_ten(5.0, 300.0), 10.0);
        assert_eq!(per_ten(5.0, 0.0), 0.0);
    }

    #[test]
    fn test_ratio_or_zero() {
        assert_eq!(ratio_or_zero(6.0, 3.0), 2.0);
        assert_eq!(ratio_or_zero(6.0, 0.0), 0.0);
    }

    #[tokio::test]
    async fn test_with_deadline_passes_result() {
        let result = with_deadline(Duration::from_secs(1), async { Ok::<_, AnalyticsError>(5) }).await;
        assert_eq!(result.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_with_deadline_times_out() {
        let result = with_deadline(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, AnalyticsError>(5)
        })
        .await;

        let err = result.unwrap_err();
        assert!(matches!(err, AnalyticsError::Timeout(d) if d == Duration::from_millis(10)));
        assert_eq!(err.to_string(), "Request timed out after 10ms");
    }
}
