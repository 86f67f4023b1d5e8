//! MVP scoring.
//!
//! Each of a fixed set of stats is compared against the hero population and
//! turned into points (four per standard deviation, weighted, capped at ±10).
//! A player's score on a map is the sum over every hero they played there.

use std::collections::BTreeMap;

use futures::future::try_join_all;
use serde::Serialize;
use tracing::{debug, info, instrument};

use super::comparator::{
    compare_stat_value_to_distribution, ComparisonQuery, StatComparison, MIN_SEGMENT_SECONDS,
};
use super::{AnalyticsError, RequestContext};
use crate::models::{MapId, PlayerStatRow, StatKind};

pub const DEFAULT_MVP_MIN_MAPS: u32 = 5;
pub const DEFAULT_MVP_MIN_TIME_SECONDS: f64 = 300.0;

pub const POINTS_PER_STD_DEV: f64 = 4.0;
pub const MAX_STAT_POINTS: f64 = 10.0;

/// Scored stats and their weights.
pub const MVP_STATS: [(StatKind, f64); 11] = [
    (StatKind::Eliminations, 1.0),
    (StatKind::FinalBlows, 1.0),
    (StatKind::Deaths, 1.0),
    (StatKind::HeroDamageDealt, 1.0),
    (StatKind::HealingDealt, 1.0),
    (StatKind::SoloKills, 1.0),
    (StatKind::DamageBlocked, 0.6),
    (StatKind::UltimatesEarned, 0.4),
    (StatKind::ObjectiveKills, 0.4),
    (StatKind::OffensiveAssists, 0.3),
    (StatKind::DefensiveAssists, 0.3),
];

/// Points for one stat.
pub fn points_for(z_score: f64, weight: f64) -> f64 {
    (z_score * POINTS_PER_STD_DEV * weight).clamp(-MAX_STAT_POINTS, MAX_STAT_POINTS)
}

/// Peer population thresholds used for MVP comparisons.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MvpThresholds {
    pub min_maps: u32,
    pub min_time_seconds: f64,
}

impl Default for MvpThresholds {
    fn default() -> Self {
        Self {
            min_maps: DEFAULT_MVP_MIN_MAPS,
            min_time_seconds: DEFAULT_MVP_MIN_TIME_SECONDS,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MvpQuery {
    pub map_id: MapId,
    pub player_name: String,
    pub thresholds: MvpThresholds,
}

impl MvpQuery {
    pub fn new(map_id: MapId, player_name: impl Into<String>) -> Self {
        Self {
            map_id,
            player_name: player_name.into(),
            thresholds: MvpThresholds::default(),
        }
    }

    pub fn with_thresholds(mut self, thresholds: MvpThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }
}

/// One stat's share of an MVP score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatContribution {
    pub stat: StatKind,
    pub hero: String,
    pub raw_value: f64,
    pub per10_value: f64,
    pub hero_avg_per10: f64,
    pub z_score: f64,
    pub points_awarded: f64,
    pub percentile: f64,
    pub sample_size: usize,
}

impl StatContribution {
    fn from_comparison(
        stat: StatKind,
        weight: f64,
        hero: &str,
        raw_value: f64,
        comparison: StatComparison,
    ) -> Self {
        Self {
            stat,
            hero: hero.to_string(),
            raw_value,
            per10_value: comparison.per10_value,
            hero_avg_per10: comparison.hero_avg_per10,
            z_score: comparison.z_score,
            points_awarded: points_for(comparison.z_score, weight),
            percentile: comparison.estimated_percentile,
            sample_size: comparison.total_players,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MvpScoreResult {
    pub player_name: String,
    /// Hero with the most time played on the map.
    pub hero: String,
    pub total_score: f64,
    pub contributions: Vec<StatContribution>,
}

/// Final row of each hero segment with at least a minute played, in order of
/// first appearance.
pub fn final_hero_segments(rows: &[PlayerStatRow]) -> Vec<&PlayerStatRow> {
    let mut order: Vec<&str> = Vec::new();
    let mut latest: BTreeMap<&str, &PlayerStatRow> = BTreeMap::new();
    for row in rows {
        let hero = row.player_hero.as_str();
        match latest.get(hero) {
            None => {
                order.push(hero);
                latest.insert(hero, row);
            }
            Some(best) if row.round_number > best.round_number => {
                latest.insert(hero, row);
            }
            Some(_) => {}
        }
    }

    order
        .into_iter()
        .filter_map(|hero| latest.get(hero).copied())
        .filter(|row| row.hero_time_played >= MIN_SEGMENT_SECONDS)
        .collect()
}

/// Hero with the most time across segments; first one wins a tie.
fn primary_hero(segments: &[&PlayerStatRow]) -> Option<String> {
    let mut best: Option<&PlayerStatRow> = None;
    for segment in segments.iter().copied() {
        if best.map_or(true, |b| segment.hero_time_played > b.hero_time_played) {
            best = Some(segment);
        }
    }
    best.map(|row| row.player_hero.clone())
}

/// Score one player on one map.
///
/// `Ok(None)` when no stat of any hero segment could be compared.
#[instrument(skip(ctx, query), fields(request = %ctx.id(), map_id = %query.map_id, player = %query.player_name))]
pub async fn calculate_mvp_score(
    ctx: &RequestContext,
    query: &MvpQuery,
) -> Result<Option<MvpScoreResult>, AnalyticsError> {
    let rows = ctx
        .player_stats_for_map_player(query.map_id, &query.player_name)
        .await?;
    let segments = final_hero_segments(&rows);
    let Some(hero) = primary_hero(&segments) else {
        debug!("no hero segment long enough to score");
        return Ok(None);
    };

    let comparisons = segments.iter().flat_map(move |segment| {
        MVP_STATS.into_iter().map(move |(stat, weight)| async move {
            let raw_value = stat.value(segment);
            let comparison = ComparisonQuery::new(
                segment.player_hero.clone(),
                stat,
                raw_value,
                segment.hero_time_played,
            )
            .with_thresholds(query.thresholds.min_maps, query.thresholds.min_time_seconds);

            let result = compare_stat_value_to_distribution(ctx, &comparison).await?;
            Ok::<_, AnalyticsError>(result.map(|c| {
                StatContribution::from_comparison(stat, weight, &segment.player_hero, raw_value, c)
            }))
        })
    });

    let contributions: Vec<StatContribution> =
        try_join_all(comparisons).await?.into_iter().flatten().collect();

    if contributions.is_empty() {
        debug!("no comparable stats");
        return Ok(None);
    }

    let total_score = contributions.iter().map(|c| c.points_awarded).sum();
    Ok(Some(MvpScoreResult {
        player_name: query.player_name.clone(),
        hero,
        total_score,
        contributions,
    }))
}

/// Highest scoring player on a map. Equal scores keep the first player in
/// store order.
#[instrument(skip(ctx), fields(request = %ctx.id()))]
pub async fn get_mvp_for_map(
    ctx: &RequestContext,
    map_id: MapId,
    thresholds: MvpThresholds,
) -> Result<Option<MvpScoreResult>, AnalyticsError> {
    let players = ctx.player_names_on_map(map_id).await?;

    let scores = try_join_all(players.iter().map(|name| async move {
        let query = MvpQuery::new(map_id, name.clone()).with_thresholds(thresholds);
        calculate_mvp_score(ctx, &query).await
    }))
    .await?;

    let mut best: Option<MvpScoreResult> = None;
    for score in scores.into_iter().flatten() {
        if best.as_ref().map_or(true, |b| score.total_score > b.total_score) {
            best = Some(score);
        }
    }

    if let Some(mvp) = &best {
        info!(player = %mvp.player_name, score = mvp.total_score, "map mvp");
    }
    Ok(best)
}
