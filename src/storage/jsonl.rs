//! JSONL (JSON Lines) table store.
//!
//! Each table is one file under `<data_dir>/tables/`, one JSON object per
//! line. Files are read on every query; a missing file is an empty table, a
//! malformed line is an error.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::marker::PhantomData;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::memory::{by_match_time, distinct_names_on_map, for_maps, maps_for_scrims, scrims_for_team};
use super::{StatsStore, StorageConfig, StoreError, Table};
use crate::models::{
    Kill, MapId, MapRecord, MatchStart, MercyRez, ObjectiveCaptured, PlayerStatRow, RoundEnd,
    Scrim, TeamId, UltimateStart,
};

/// JSONL file reader.
pub struct JsonlReader<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: DeserializeOwned> JsonlReader<T> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    /// Create a reader for one table.
    pub fn for_table(config: &StorageConfig, table: Table) -> Self {
        Self::new(config.table_path(table))
    }

    /// Read every row. A missing file reads as an empty table.
    pub fn read_all(&self) -> Result<Vec<T>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        let mut rows = Vec::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let row = serde_json::from_str(&line).map_err(|source| StoreError::Malformed {
                path: self.path.clone(),
                line: idx + 1,
                source,
            })?;
            rows.push(row);
        }

        debug!("Read {} rows from {:?}", rows.len(), self.path);
        Ok(rows)
    }
}

/// Store reading JSONL tables from a data directory.
#[derive(Debug, Clone)]
pub struct JsonlStore {
    config: StorageConfig,
}

impl JsonlStore {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    async fn read<T>(&self, table: Table) -> Result<Vec<T>, StoreError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let reader = JsonlReader::<T>::for_table(&self.config, table);
        tokio::task::spawn_blocking(move || reader.read_all())
            .await
            .map_err(|e| StoreError::Unavailable(format!("reader task failed: {}", e)))?
    }
}

#[async_trait]
impl StatsStore for JsonlStore {
    async fn scrims_for_team(&self, team_id: TeamId) -> Result<Vec<Scrim>, StoreError> {
        let scrims: Vec<Scrim> = self.read(Table::Scrim).await?;
        Ok(scrims_for_team(&scrims, team_id))
    }

    async fn maps_for_team(&self, team_id: TeamId) -> Result<Vec<MapRecord>, StoreError> {
        let (scrims, maps): (Vec<Scrim>, Vec<MapRecord>) =
            tokio::try_join!(self.read(Table::Scrim), self.read(Table::Map))?;
        Ok(maps_for_scrims(&maps, &scrims_for_team(&scrims, team_id)))
    }

    async fn player_names_on_map(&self, map_id: MapId) -> Result<Vec<String>, StoreError> {
        let rows: Vec<PlayerStatRow> = self.read(Table::PlayerStat).await?;
        Ok(distinct_names_on_map(&rows, map_id))
    }

    async fn player_stats_for_maps(
        &self,
        map_ids: &[MapId],
    ) -> Result<Vec<PlayerStatRow>, StoreError> {
        let rows: Vec<PlayerStatRow> = self.read(Table::PlayerStat).await?;
        Ok(for_maps(&rows, map_ids, |r| r.map_id))
    }

    async fn player_stats_for_map_player(
        &self,
        map_id: MapId,
        player_name: &str,
    ) -> Result<Vec<PlayerStatRow>, StoreError> {
        let rows: Vec<PlayerStatRow> = self.read(Table::PlayerStat).await?;
        Ok(rows
            .into_iter()
            .filter(|r| r.map_id == map_id && r.player_name == player_name)
            .collect())
    }

    async fn player_stats_for_hero(&self, hero: &str) -> Result<Vec<PlayerStatRow>, StoreError> {
        let rows: Vec<PlayerStatRow> = self.read(Table::PlayerStat).await?;
        Ok(rows.into_iter().filter(|r| r.player_hero == hero).collect())
    }

    async fn match_starts_for_maps(
        &self,
        map_ids: &[MapId],
    ) -> Result<Vec<MatchStart>, StoreError> {
        let rows: Vec<MatchStart> = self.read(Table::MatchStart).await?;
        Ok(for_maps(&rows, map_ids, |r| r.map_id))
    }

    async fn round_ends_for_maps(&self, map_ids: &[MapId]) -> Result<Vec<RoundEnd>, StoreError> {
        let rows: Vec<RoundEnd> = self.read(Table::RoundEnd).await?;
        Ok(for_maps(&rows, map_ids, |r| r.map_id))
    }

    async fn captures_for_maps(
        &self,
        map_ids: &[MapId],
    ) -> Result<Vec<ObjectiveCaptured>, StoreError> {
        let rows: Vec<ObjectiveCaptured> = self.read(Table::ObjectiveCaptured).await?;
        Ok(by_match_time(for_maps(&rows, map_ids, |r| r.map_id), |r| r.match_time))
    }

    async fn kills_for_maps(&self, map_ids: &[MapId]) -> Result<Vec<Kill>, StoreError> {
        let rows: Vec<Kill> = self.read(Table::Kill).await?;
        Ok(by_match_time(for_maps(&rows, map_ids, |r| r.map_id), |r| r.match_time))
    }

    async fn rezzes_for_maps(&self, map_ids: &[MapId]) -> Result<Vec<MercyRez>, StoreError> {
        let rows: Vec<MercyRez> = self.read(Table::MercyRez).await?;
        Ok(by_match_time(for_maps(&rows, map_ids, |r| r.map_id), |r| r.match_time))
    }

    async fn ultimates_for_maps(
        &self,
        map_ids: &[MapId],
    ) -> Result<Vec<UltimateStart>, StoreError> {
        let rows: Vec<UltimateStart> = self.read(Table::UltimateStart).await?;
        Ok(by_match_time(for_maps(&rows, map_ids, |r| r.map_id), |r| r.match_time))
    }
}
