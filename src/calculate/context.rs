//! Request-scoped query memoization.
//!
//! A [`RequestContext`] lives for one logical request. Every store query and
//! every expensive derived value (rosters, hero populations) is computed at
//! most once per context, keyed by the query arguments. Nothing is shared
//! across contexts, so results never leak between requests or go stale.

use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use tokio::sync::{Mutex, OnceCell};
use uuid::Uuid;

use super::comparator::{Population, PopulationKey};
use super::AnalyticsError;
use crate::models::{
    Kill, MapId, MapRecord, MatchStart, MercyRez, ObjectiveCaptured, PlayerStatRow, RoundEnd,
    Scrim, TeamId, UltimateStart,
};
use crate::storage::StatsStore;

/// Keyed once-cells: the first caller for a key runs the initializer,
/// concurrent callers for the same key wait for it.
struct Memo<K, V> {
    cells: Mutex<HashMap<K, Arc<OnceCell<V>>>>,
}

impl<K, V> Default for Memo<K, V> {
    fn default() -> Self {
        Self {
            cells: Mutex::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash, V: Clone> Memo<K, V> {
    async fn get_or_try_init<F, Fut>(&self, key: K, init: F) -> Result<V, AnalyticsError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, AnalyticsError>>,
    {
        let cell = {
            let mut cells = self.cells.lock().await;
            cells.entry(key).or_default().clone()
        };
        // A failed init leaves the cell empty; the error propagates as-is.
        cell.get_or_try_init(init).await.cloned()
    }
}

type Rows<T> = Arc<Vec<T>>;

/// Per-request view over a [`StatsStore`].
pub struct RequestContext {
    id: Uuid,
    store: Arc<dyn StatsStore>,
    scrims: Memo<TeamId, Rows<Scrim>>,
    maps: Memo<TeamId, Rows<MapRecord>>,
    names_on_map: Memo<MapId, Rows<String>>,
    stats_for_maps: Memo<Vec<MapId>, Rows<PlayerStatRow>>,
    stats_for_map_player: Memo<(MapId, String), Rows<PlayerStatRow>>,
    stats_for_hero: Memo<String, Rows<PlayerStatRow>>,
    match_starts: Memo<Vec<MapId>, Rows<MatchStart>>,
    round_ends: Memo<Vec<MapId>, Rows<RoundEnd>>,
    captures: Memo<Vec<MapId>, Rows<ObjectiveCaptured>>,
    kills: Memo<Vec<MapId>, Rows<Kill>>,
    rezzes: Memo<Vec<MapId>, Rows<MercyRez>>,
    ultimates: Memo<Vec<MapId>, Rows<UltimateStart>>,
    rosters: Memo<TeamId, Arc<BTreeSet<String>>>,
    populations: Memo<PopulationKey, Arc<Population>>,
}

fn sorted_key(map_ids: &[MapId]) -> Vec<MapId> {
    let mut key = map_ids.to_vec();
    key.sort();
    key.dedup();
    key
}

impl RequestContext {
    pub fn new(store: Arc<dyn StatsStore>) -> Self {
        Self {
            id: Uuid::new_v4(),
            store,
            scrims: Memo::default(),
            maps: Memo::default(),
            names_on_map: Memo::default(),
            stats_for_maps: Memo::default(),
            stats_for_map_player: Memo::default(),
            stats_for_hero: Memo::default(),
            match_starts: Memo::default(),
            round_ends: Memo::default(),
            captures: Memo::default(),
            kills: Memo::default(),
            rezzes: Memo::default(),
            ultimates: Memo::default(),
            rosters: Memo::default(),
            populations: Memo::default(),
        }
    }

    /// Identifier used to correlate log lines of one request.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub async fn scrims_for_team(&self, team_id: TeamId) -> Result<Rows<Scrim>, AnalyticsError> {
        self.scrims
            .get_or_try_init(team_id, || async {
                Ok(Arc::new(self.store.scrims_for_team(team_id).await?))
            })
            .await
    }

    pub async fn maps_for_team(&self, team_id: TeamId) -> Result<Rows<MapRecord>, AnalyticsError> {
        self.maps
            .get_or_try_init(team_id, || async {
                Ok(Arc::new(self.store.maps_for_team(team_id).await?))
            })
            .await
    }

    pub async fn player_names_on_map(&self, map_id: MapId) -> Result<Rows<String>, AnalyticsError> {
        self.names_on_map
            .get_or_try_init(map_id, || async {
                Ok(Arc::new(self.store.player_names_on_map(map_id).await?))
            })
            .await
    }

    pub async fn player_stats_for_maps(
        &self,
        map_ids: &[MapId],
    ) -> Result<Rows<PlayerStatRow>, AnalyticsError> {
        let key = sorted_key(map_ids);
        self.stats_for_maps
            .get_or_try_init(key.clone(), || async move {
                Ok(Arc::new(self.store.player_stats_for_maps(&key).await?))
            })
            .await
    }

    pub async fn player_stats_for_map_player(
        &self,
        map_id: MapId,
        player_name: &str,
    ) -> Result<Rows<PlayerStatRow>, AnalyticsError> {
        self.stats_for_map_player
            .get_or_try_init((map_id, player_name.to_string()), || async {
                Ok(Arc::new(
                    self.store
                        .player_stats_for_map_player(map_id, player_name)
                        .await?,
                ))
            })
            .await
    }

    pub async fn player_stats_for_hero(
        &self,
        hero: &str,
    ) -> Result<Rows<PlayerStatRow>, AnalyticsError> {
        self.stats_for_hero
            .get_or_try_init(hero.to_string(), || async {
                Ok(Arc::new(self.store.player_stats_for_hero(hero).await?))
            })
            .await
    }

    pub async fn match_starts_for_maps(
        &self,
        map_ids: &[MapId],
    ) -> Result<Rows<MatchStart>, AnalyticsError> {
        let key = sorted_key(map_ids);
        self.match_starts
            .get_or_try_init(key.clone(), || async move {
                Ok(Arc::new(self.store.match_starts_for_maps(&key).await?))
            })
            .await
    }

    pub async fn round_ends_for_maps(
        &self,
        map_ids: &[MapId],
    ) -> Result<Rows<RoundEnd>, AnalyticsError> {
        let key = sorted_key(map_ids);
        self.round_ends
            .get_or_try_init(key.clone(), || async move {
                Ok(Arc::new(self.store.round_ends_for_maps(&key).await?))
            })
            .await
    }

    pub async fn captures_for_maps(
        &self,
        map_ids: &[MapId],
    ) -> Result<Rows<ObjectiveCaptured>, AnalyticsError> {
        let key = sorted_key(map_ids);
        self.captures
            .get_or_try_init(key.clone(), || async move {
                Ok(Arc::new(self.store.captures_for_maps(&key).await?))
            })
            .await
    }

    pub async fn kills_for_maps(&self, map_ids: &[MapId]) -> Result<Rows<Kill>, AnalyticsError> {
        let key = sorted_key(map_ids);
        self.kills
            .get_or_try_init(key.clone(), || async move {
                Ok(Arc::new(self.store.kills_for_maps(&key).await?))
            })
            .await
    }

    pub async fn rezzes_for_maps(
        &self,
        map_ids: &[MapId],
    ) -> Result<Rows<MercyRez>, AnalyticsError> {
        let key = sorted_key(map_ids);
        self.rezzes
            .get_or_try_init(key.clone(), || async move {
                Ok(Arc::new(self.store.rezzes_for_maps(&key).await?))
            })
            .await
    }

    pub async fn ultimates_for_maps(
        &self,
        map_ids: &[MapId],
    ) -> Result<Rows<UltimateStart>, AnalyticsError> {
        let key = sorted_key(map_ids);
        self.ultimates
            .get_or_try_init(key.clone(), || async move {
                Ok(Arc::new(self.store.ultimates_for_maps(&key).await?))
            })
            .await
    }

    /// Memoize a team roster computed by `init`.
    pub(crate) async fn roster<F, Fut>(
        &self,
        team_id: TeamId,
        init: F,
    ) -> Result<Arc<BTreeSet<String>>, AnalyticsError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Arc<BTreeSet<String>>, AnalyticsError>>,
    {
        self.rosters.get_or_try_init(team_id, init).await
    }

    /// Memoize a hero population computed by `init`.
    pub(crate) async fn population<F, Fut>(
        &self,
        key: PopulationKey,
        init: F,
    ) -> Result<Arc<Population>, AnalyticsError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Arc<Population>, AnalyticsError>>,
    {
        self.populations.get_or_try_init(key, init).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, Tables};

    fn store() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::new(Tables {
            kills: vec![Kill {
                map_id: MapId(1),
                match_time: 3.0,
                ..Default::default()
            }],
            ..Default::default()
        }))
    }

    #[tokio::test]
    async fn test_repeated_query_hits_store_once() {
        let store = store();
        let ctx = RequestContext::new(store.clone());

        let a = ctx.kills_for_maps(&[MapId(1), MapId(2)]).await.unwrap();
        let b = ctx.kills_for_maps(&[MapId(2), MapId(1)]).await.unwrap();

        assert_eq!(a.len(), 1);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(store.query_count(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_queries_share_one_fetch() {
        let store = store();
        let ctx = RequestContext::new(store.clone());

        let (a, b) = tokio::join!(ctx.kills_for_maps(&[MapId(1)]), ctx.kills_for_maps(&[MapId(1)]));
        assert!(a.is_ok() && b.is_ok());
        assert_eq!(store.query_count(), 1);
    }

    #[tokio::test]
    async fn test_contexts_do_not_share() {
        let store = store();

        RequestContext::new(store.clone())
            .kills_for_maps(&[MapId(1)])
            .await
            .unwrap();
        RequestContext::new(store.clone())
            .kills_for_maps(&[MapId(1)])
            .await
            .unwrap();

        assert_eq!(store.query_count(), 2);
    }

    #[tokio::test]
    async fn test_store_failure_is_not_cached_as_empty() {
        let store = Arc::new(MemoryStore::new(Tables::default()).failing("offline"));
        let ctx = RequestContext::new(store.clone());

        assert!(ctx.maps_for_team(TeamId(1)).await.is_err());
        assert!(ctx.maps_for_team(TeamId(1)).await.is_err());
        assert_eq!(store.query_count(), 2);
    }
}
