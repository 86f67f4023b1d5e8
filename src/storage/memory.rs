//! In-memory table store.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tracing::debug;

use super::{StatsStore, StoreError};
use crate::models::{
    Kill, MapId, MapRecord, MatchStart, MercyRez, ObjectiveCaptured, PlayerStatRow, RoundEnd,
    Scrim, TeamId, UltimateStart,
};

/// All tables of the store, held as plain vectors in stored order.
#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub scrims: Vec<Scrim>,
    pub maps: Vec<MapRecord>,
    pub player_stats: Vec<PlayerStatRow>,
    pub kills: Vec<Kill>,
    pub rezzes: Vec<MercyRez>,
    pub ultimates: Vec<UltimateStart>,
    pub match_starts: Vec<MatchStart>,
    pub round_ends: Vec<RoundEnd>,
    pub captures: Vec<ObjectiveCaptured>,
}

pub(crate) fn scrims_for_team(scrims: &[Scrim], team_id: TeamId) -> Vec<Scrim> {
    let mut out: Vec<Scrim> = scrims
        .iter()
        .filter(|s| s.team_id == team_id)
        .cloned()
        .collect();
    out.sort_by_key(|s| (s.date, s.id));
    out
}

pub(crate) fn maps_for_scrims(maps: &[MapRecord], scrims: &[Scrim]) -> Vec<MapRecord> {
    let scrim_ids: HashSet<_> = scrims.iter().map(|s| s.id).collect();
    let mut out: Vec<MapRecord> = maps
        .iter()
        .filter(|m| scrim_ids.contains(&m.scrim_id))
        .cloned()
        .collect();
    out.sort_by_key(|m| m.id);
    out
}

pub(crate) fn distinct_names_on_map(rows: &[PlayerStatRow], map_id: MapId) -> Vec<String> {
    let mut seen = HashSet::new();
    rows.iter()
        .filter(|r| r.map_id == map_id)
        .filter(|r| seen.insert(r.player_name.clone()))
        .map(|r| r.player_name.clone())
        .collect()
}

/// Rows whose map id is in `map_ids`, keeping stored order.
pub(crate) fn for_maps<T: Clone>(rows: &[T], map_ids: &[MapId], map_of: impl Fn(&T) -> MapId) -> Vec<T> {
    let wanted: HashSet<MapId> = map_ids.iter().copied().collect();
    rows.iter()
        .filter(|r| wanted.contains(&map_of(r)))
        .cloned()
        .collect()
}

/// Stable sort by match time.
pub(crate) fn by_match_time<T>(mut rows: Vec<T>, time_of: impl Fn(&T) -> f64) -> Vec<T> {
    rows.sort_by(|a, b| time_of(a).total_cmp(&time_of(b)));
    rows
}

/// Store backed by in-memory tables.
///
/// Counts every query so callers can check how often the store was hit.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Tables,
    queries: AtomicUsize,
    failure: Option<String>,
}

impl MemoryStore {
    pub fn new(tables: Tables) -> Self {
        Self {
            tables,
            queries: AtomicUsize::new(0),
            failure: None,
        }
    }

    /// Make every query fail with [`StoreError::Unavailable`].
    pub fn failing(mut self, reason: impl Into<String>) -> Self {
        self.failure = Some(reason.into());
        self
    }

    /// Number of queries issued so far.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    fn begin(&self, query: &str) -> Result<&Tables, StoreError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        debug!(query, "memory store query");
        match &self.failure {
            Some(reason) => Err(StoreError::Unavailable(reason.clone())),
            None => Ok(&self.tables),
        }
    }
}

#[async_trait]
impl StatsStore for MemoryStore {
    async fn scrims_for_team(&self, team_id: TeamId) -> Result<Vec<Scrim>, StoreError> {
        let t = self.begin("scrims_for_team")?;
        Ok(scrims_for_team(&t.scrims, team_id))
    }

    async fn maps_for_team(&self, team_id: TeamId) -> Result<Vec<MapRecord>, StoreError> {
        let t = self.begin("maps_for_team")?;
        let scrims = scrims_for_team(&t.scrims, team_id);
        Ok(maps_for_scrims(&t.maps, &scrims))
    }

    async fn player_names_on_map(&self, map_id: MapId) -> Result<Vec<String>, StoreError> {
        let t = self.begin("player_names_on_map")?;
        Ok(distinct_names_on_map(&t.player_stats, map_id))
    }

    async fn player_stats_for_maps(
        &self,
        map_ids: &[MapId],
    ) -> Result<Vec<PlayerStatRow>, StoreError> {
        let t = self.begin("player_stats_for_maps")?;
        Ok(for_maps(&t.player_stats, map_ids, |r| r.map_id))
    }

    async fn player_stats_for_map_player(
        &self,
        map_id: MapId,
        player_name: &str,
    ) -> Result<Vec<PlayerStatRow>, StoreError> {
        let t = self.begin("player_stats_for_map_player")?;
        Ok(t.player_stats
            .iter()
            .filter(|r| r.map_id == map_id && r.player_name == player_name)
            .cloned()
            .collect())
    }

    async fn player_stats_for_hero(&self, hero: &str) -> Result<Vec<PlayerStatRow>, StoreError> {
        let t = self.begin("player_stats_for_hero")?;
        Ok(t.player_stats
            .iter()
            .filter(|r| r.player_hero == hero)
            .cloned()
            .collect())
    }

    async fn match_starts_for_maps(
        &self,
        map_ids: &[MapId],
    ) -> Result<Vec<MatchStart>, StoreError> {
        let t = self.begin("match_starts_for_maps")?;
        Ok(for_maps(&t.match_starts, map_ids, |r| r.map_id))
    }

    async fn round_ends_for_maps(&self, map_ids: &[MapId]) -> Result<Vec<RoundEnd>, StoreError> {
        let t = self.begin("round_ends_for_maps")?;
        Ok(for_maps(&t.round_ends, map_ids, |r| r.map_id))
    }

    async fn captures_for_maps(
        &self,
        map_ids: &[MapId],
    ) -> Result<Vec<ObjectiveCaptured>, StoreError> {
        let t = self.begin("captures_for_maps")?;
        Ok(by_match_time(for_maps(&t.captures, map_ids, |r| r.map_id), |r| r.match_time))
    }

    async fn kills_for_maps(&self, map_ids: &[MapId]) -> Result<Vec<Kill>, StoreError> {
        let t = self.begin("kills_for_maps")?;
        Ok(by_match_time(for_maps(&t.kills, map_ids, |r| r.map_id), |r| r.match_time))
    }

    async fn rezzes_for_maps(&self, map_ids: &[MapId]) -> Result<Vec<MercyRez>, StoreError> {
        let t = self.begin("rezzes_for_maps")?;
        Ok(by_match_time(for_maps(&t.rezzes, map_ids, |r| r.map_id), |r| r.match_time))
    }

    async fn ultimates_for_maps(
        &self,
        map_ids: &[MapId],
    ) -> Result<Vec<UltimateStart>, StoreError> {
        let t = self.begin("ultimates_for_maps")?;
        Ok(by_match_time(for_maps(&t.ultimates, map_ids, |r| r.map_id), |r| r.match_time))
    }
}
