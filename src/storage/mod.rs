//! Read-only access to the scrim data store.
//!
//! The analytics engine never writes. It reads typed rows through the
//! [`StatsStore`] trait, which has two adapters:
//! - [`MemoryStore`]: tables held in memory (tests, embedding)
//! - [`JsonlStore`]: one JSONL file per table under a data directory

mod jsonl;
mod memory;

pub use jsonl::*;
pub use memory::*;

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    Kill, MapId, MapRecord, MatchStart, MercyRez, ObjectiveCaptured, PlayerStatRow, RoundEnd,
    Scrim, TeamId, UltimateStart,
};

/// Errors that can occur while reading from the store.
///
/// A store error is never turned into an empty result: callers can always
/// tell "no data" apart from "could not read the data".
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed row at {path:?} line {line}: {source}")]
    Malformed {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Logical tables of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Scrim,
    Map,
    PlayerStat,
    Kill,
    MercyRez,
    UltimateStart,
    MatchStart,
    RoundEnd,
    ObjectiveCaptured,
}

impl Table {
    /// Get the filename for this table.
    pub fn filename(&self) -> &'static str {
        match self {
            Table::Scrim => "scrims.jsonl",
            Table::Map => "maps.jsonl",
            Table::PlayerStat => "player_stats.jsonl",
            Table::Kill => "kills.jsonl",
            Table::MercyRez => "mercy_rezzes.jsonl",
            Table::UltimateStart => "ultimate_starts.jsonl",
            Table::MatchStart => "match_starts.jsonl",
            Table::RoundEnd => "round_ends.jsonl",
            Table::ObjectiveCaptured => "objective_captures.jsonl",
        }
    }
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn tables_dir(&self) -> PathBuf {
        self.data_dir.join("tables")
    }

    pub fn table_path(&self, table: Table) -> PathBuf {
        self.tables_dir().join(table.filename())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}

/// Typed read operations the analytics engine needs.
///
/// Event queries return rows ordered by `match_time` ascending, ties in
/// stored order.
#[async_trait]
pub trait StatsStore: Send + Sync {
    /// Every scrim owned by the team, ordered by date.
    async fn scrims_for_team(&self, team_id: TeamId) -> Result<Vec<Scrim>, StoreError>;

    /// Every map belonging to the team's scrims, ordered by map id.
    async fn maps_for_team(&self, team_id: TeamId) -> Result<Vec<MapRecord>, StoreError>;

    /// Distinct player names on one map, in first-seen order.
    async fn player_names_on_map(&self, map_id: MapId) -> Result<Vec<String>, StoreError>;

    async fn player_stats_for_maps(
        &self,
        map_ids: &[MapId],
    ) -> Result<Vec<PlayerStatRow>, StoreError>;

    async fn player_stats_for_map_player(
        &self,
        map_id: MapId,
        player_name: &str,
    ) -> Result<Vec<PlayerStatRow>, StoreError>;

    /// Every row for one hero across all maps in the store.
    async fn player_stats_for_hero(&self, hero: &str) -> Result<Vec<PlayerStatRow>, StoreError>;

    async fn match_starts_for_maps(&self, map_ids: &[MapId])
        -> Result<Vec<MatchStart>, StoreError>;

    async fn round_ends_for_maps(&self, map_ids: &[MapId]) -> Result<Vec<RoundEnd>, StoreError>;

    async fn captures_for_maps(
        &self,
        map_ids: &[MapId],
    ) -> Result<Vec<ObjectiveCaptured>, StoreError>;

    async fn kills_for_maps(&self, map_ids: &[MapId]) -> Result<Vec<Kill>, StoreError>;

    async fn rezzes_for_maps(&self, map_ids: &[MapId]) -> Result<Vec<MercyRez>, StoreError>;

    async fn ultimates_for_maps(&self, map_ids: &[MapId])
        -> Result<Vec<UltimateStart>, StoreError>;
}
