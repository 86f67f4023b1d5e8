use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::api::state::AppState;
use crate::api::{ApiError, Envelope};
use crate::calculate::comparator::{compare_stat_value_to_distribution, ComparisonQuery, StatComparison};
use crate::models::StatKind;

#[derive(Debug, Deserialize)]
pub struct CompareParams {
    pub hero: String,
    pub stat: String,
    /// Raw stat total.
    pub value: f64,
    /// Seconds played on the hero.
    pub time: f64,
    pub min_maps: Option<u32>,
    pub min_time: Option<f64>,
}

/// Compare a raw stat value against the hero's peer population.
pub async fn compare(
    State(state): State<AppState>,
    Query(params): Query<CompareParams>,
) -> Result<Json<Envelope<Option<StatComparison>>>, ApiError> {
    let stat: StatKind = params.stat.parse().map_err(ApiError::BadRequest)?;

    let analytics = &state.config.analytics;
    let query = ComparisonQuery::new(params.hero.trim(), stat, params.value, params.time)
        .with_thresholds(
            params.min_maps.unwrap_or(analytics.comparator_min_maps),
            params.min_time.unwrap_or(analytics.comparator_min_time_seconds),
        )
        .with_sample_limit(analytics.sample_limit);

    let ctx = state.context();
    let comparison = state
        .deadline(compare_stat_value_to_distribution(&ctx, &query))
        .await?;
    Ok(Json(Envelope::from_option(comparison)))
}
