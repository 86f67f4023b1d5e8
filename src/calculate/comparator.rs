//! Hero population comparisons.
//!
//! A player's stat on a hero is judged against everyone else who played that
//! hero enough: rates are normalized per 10 minutes played, the population's
//! mean and sample standard deviation give a z-score, and the z-scores of the
//! population give a rank and percentile.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, instrument};

use super::{per_ten, AnalyticsError, RequestContext};
use crate::models::{round1, MapId, PlayerStatRow, StatKind};

/// Hero segments shorter than this are ignored everywhere.
pub const MIN_SEGMENT_SECONDS: f64 = 60.0;

pub const DEFAULT_MIN_MAPS: u32 = 10;
pub const DEFAULT_MIN_TIME_SECONDS: f64 = 600.0;
pub const DEFAULT_SAMPLE_LIMIT: usize = 500;

/// Keep only the last round's row per (map, player); earlier rounds are
/// partial cumulative totals.
pub fn final_rows_per_map_player(rows: &[PlayerStatRow]) -> Vec<&PlayerStatRow> {
    let mut latest: HashMap<(MapId, &str), usize> = HashMap::new();
    for (idx, row) in rows.iter().enumerate() {
        latest
            .entry((row.map_id, row.player_name.as_str()))
            .and_modify(|best| {
                if row.round_number > rows[*best].round_number {
                    *best = idx;
                }
            })
            .or_insert(idx);
    }

    let mut picked: Vec<usize> = latest.into_values().collect();
    picked.sort_unstable();
    picked.into_iter().map(|idx| &rows[idx]).collect()
}

/// One qualifying peer in a hero population.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeerSample {
    pub player_name: String,
    pub maps: u32,
    pub time_played: f64,
    pub total: f64,
    pub per10: f64,
}

/// Peers for one hero and stat.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Population {
    pub members: Vec<PeerSample>,
}

impl Population {
    pub fn per10_values(&self) -> Vec<f64> {
        self.members.iter().map(|m| m.per10).collect()
    }
}

/// Memoization key for a population.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PopulationKey {
    pub hero: String,
    pub stat: StatKind,
    pub min_maps: u32,
    pub min_time_bits: u64,
    pub sample_limit: usize,
}

/// Build the peer population from every row of one hero.
///
/// Players qualify with at least `min_maps` maps of 60s or more and at least
/// `min_time_seconds` in total. When more than `sample_limit` qualify, the
/// ones with the most time played are kept.
pub fn build_population(
    rows: &[PlayerStatRow],
    stat: StatKind,
    min_maps: u32,
    min_time_seconds: f64,
    sample_limit: usize,
) -> Population {
    let mut by_player: BTreeMap<&str, (u32, f64, f64)> = BTreeMap::new();
    for row in final_rows_per_map_player(rows) {
        if row.hero_time_played < MIN_SEGMENT_SECONDS {
            continue;
        }
        let entry = by_player.entry(row.player_name.as_str()).or_default();
        entry.0 += 1;
        entry.1 += row.hero_time_played;
        entry.2 += stat.value(row);
    }

    let mut members: Vec<PeerSample> = by_player
        .into_iter()
        .filter(|(_, (maps, time, _))| *maps >= min_maps && *time >= min_time_seconds)
        .map(|(name, (maps, time_played, total))| PeerSample {
            player_name: name.to_string(),
            maps,
            time_played,
            total,
            per10: per_ten(total, time_played),
        })
        .collect();

    if members.len() > sample_limit {
        members.sort_by(|a, b| {
            b.time_played
                .total_cmp(&a.time_played)
                .then_with(|| a.player_name.cmp(&b.player_name))
        });
        members.truncate(sample_limit);
    }

    Population { members }
}

/// Mean and sample standard deviation of a population.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Baseline {
    pub mean: f64,
    pub std_dev: f64,
    pub count: usize,
}

/// `None` when the spread is undefined (fewer than two values) or zero.
pub fn population_baseline(values: &[f64]) -> Option<Baseline> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let std_dev = variance.sqrt();

    if !std_dev.is_finite() || std_dev == 0.0 {
        return None;
    }

    Some(Baseline {
        mean,
        std_dev,
        count: values.len(),
    })
}

/// Z-score oriented so that positive is always better.
pub fn z_score(value: f64, baseline: &Baseline, inverted: bool) -> f64 {
    if inverted {
        (baseline.mean - value) / baseline.std_dev
    } else {
        (value - baseline.mean) / baseline.std_dev
    }
}

/// Rank (1 = best) and percentile of `z` among `population_z`.
pub fn rank_and_percentile(z: f64, population_z: &[f64]) -> (u32, f64) {
    let above = population_z.iter().filter(|p| **p > z).count();
    let below = population_z.iter().filter(|p| **p < z).count();
    let percentile = if population_z.is_empty() {
        0.0
    } else {
        round1(below as f64 / population_z.len() as f64 * 100.0)
    };
    (above as u32 + 1, percentile)
}

/// A stat comparison request.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonQuery {
    pub hero: String,
    pub stat: StatKind,
    /// Raw stat total for the segment being judged.
    pub value: f64,
    pub time_played_seconds: f64,
    pub min_maps: u32,
    pub min_time_seconds: f64,
    pub sample_limit: usize,
}

impl ComparisonQuery {
    pub fn new(hero: impl Into<String>, stat: StatKind, value: f64, time_played_seconds: f64) -> Self {
        Self {
            hero: hero.into(),
            stat,
            value,
            time_played_seconds,
            min_maps: DEFAULT_MIN_MAPS,
            min_time_seconds: DEFAULT_MIN_TIME_SECONDS,
            sample_limit: DEFAULT_SAMPLE_LIMIT,
        }
    }

    pub fn with_thresholds(mut self, min_maps: u32, min_time_seconds: f64) -> Self {
        self.min_maps = min_maps;
        self.min_time_seconds = min_time_seconds;
        self
    }

    pub fn with_sample_limit(mut self, sample_limit: usize) -> Self {
        self.sample_limit = sample_limit;
        self
    }

    fn population_key(&self) -> PopulationKey {
        PopulationKey {
            hero: self.hero.clone(),
            stat: self.stat,
            min_maps: self.min_maps,
            min_time_bits: self.min_time_seconds.to_bits(),
            sample_limit: self.sample_limit,
        }
    }
}

/// Where a value sits in its hero population.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatComparison {
    pub per10_value: f64,
    pub hero_avg_per10: f64,
    pub hero_std_per10: f64,
    pub z_score: f64,
    pub estimated_rank: u32,
    pub total_players: usize,
    pub estimated_percentile: f64,
}

/// Compare against an already built population.
pub fn compare_to_population(
    population: &Population,
    stat: StatKind,
    value: f64,
    time_played_seconds: f64,
) -> Option<StatComparison> {
    if time_played_seconds <= 0.0 {
        return None;
    }
    let values = population.per10_values();
    let baseline = population_baseline(&values)?;

    let per10_value = per_ten(value, time_played_seconds);
    let z = z_score(per10_value, &baseline, stat.is_inverted());
    let population_z: Vec<f64> = values
        .iter()
        .map(|v| z_score(*v, &baseline, stat.is_inverted()))
        .collect();
    let (estimated_rank, estimated_percentile) = rank_and_percentile(z, &population_z);

    Some(StatComparison {
        per10_value,
        hero_avg_per10: baseline.mean,
        hero_std_per10: baseline.std_dev,
        z_score: z,
        estimated_rank,
        total_players: baseline.count,
        estimated_percentile,
    })
}

/// Load (once per request) the population for a query.
pub async fn population_for(
    ctx: &RequestContext,
    query: &ComparisonQuery,
) -> Result<Arc<Population>, AnalyticsError> {
    ctx.population(query.population_key(), || async {
        let rows = ctx.player_stats_for_hero(&query.hero).await?;
        let population = build_population(
            &rows,
            query.stat,
            query.min_maps,
            query.min_time_seconds,
            query.sample_limit,
        );
        debug!(
            hero = %query.hero,
            stat = %query.stat,
            peers = population.members.len(),
            "built hero population"
        );
        Ok(Arc::new(population))
    })
    .await
}

/// Compare a stat value to the hero's peer population.
///
/// `Ok(None)` means the comparison is undefined (no usable population or no
/// time played); callers should leave the stat out, not score it as zero.
#[instrument(skip(ctx, query), fields(hero = %query.hero, stat = %query.stat))]
pub async fn compare_stat_value_to_distribution(
    ctx: &RequestContext,
    query: &ComparisonQuery,
) -> Result<Option<StatComparison>, AnalyticsError> {
    if query.hero.trim().is_empty() {
        return Err(AnalyticsError::InvalidInput("hero must not be empty".to_string()));
    }
    if !query.value.is_finite() || !query.time_played_seconds.is_finite() {
        return Err(AnalyticsError::InvalidInput(
            "value and time played must be finite".to_string(),
        ));
    }

    let population = population_for(ctx, query).await?;
    Ok(compare_to_population(
        &population,
        query.stat,
        query.value,
        query.time_played_seconds,
    ))
}
