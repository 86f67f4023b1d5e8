//! Per-team dataset shared by the aggregation views.
//!
//! Loading issues every store read for the team at once and derives the
//! per-map facts (our side, winner, outcome) a single time. Views are then
//! plain functions over a [`TeamDataset`].

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, instrument};

use super::fights::{analyze_fight_outcome, collect_events, reconstruct_fights, FightAnalysis};
use super::roster::resolve_roster;
use super::winner::{calculate_winner, partition_captures, WinnerInput};
use super::{AnalyticsError, RequestContext};
use crate::models::{
    final_round, FightEvent, MapId, MapOutcome, MapType, PlayerStatRow, Scrim, ScrimId, TeamId,
};

/// Derived facts about one of the team's maps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapFacts {
    pub map_id: MapId,
    pub scrim_id: ScrimId,
    pub date: DateTime<Utc>,
    pub map_name: String,
    pub map_type: Option<MapType>,
    /// Team name the roster played under on this map.
    pub our_side: Option<String>,
    pub winner: Option<String>,
    pub outcome: Option<MapOutcome>,
}

/// Everything the team views read, loaded once per request.
#[derive(Debug, Clone, Default)]
pub struct TeamDataset {
    pub team_id: TeamId,
    pub roster: Arc<BTreeSet<String>>,
    pub scrims: Arc<Vec<Scrim>>,
    /// Chronological: scrim date, then map id.
    pub maps: Vec<MapFacts>,
    stats: Arc<Vec<PlayerStatRow>>,
    events: BTreeMap<MapId, Vec<FightEvent>>,
}

/// Team name shared by the most distinct roster players on one map's rows.
/// Ties keep the first name seen.
pub fn our_side_name(rows: &[&PlayerStatRow], roster: &BTreeSet<String>) -> Option<String> {
    let mut order: Vec<&str> = Vec::new();
    let mut players: HashMap<&str, HashSet<&str>> = HashMap::new();
    for row in rows.iter().filter(|r| roster.contains(&r.player_name)) {
        players
            .entry(row.player_team.as_str())
            .or_insert_with(|| {
                order.push(row.player_team.as_str());
                HashSet::new()
            })
            .insert(row.player_name.as_str());
    }

    let mut best: Option<(&str, usize)> = None;
    for name in order {
        let count = players[name].len();
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((name, count));
        }
    }
    best.map(|(name, _)| name.to_string())
}

/// Outcome for our side given the map's winner.
pub fn outcome_for(
    our_side: Option<&str>,
    winner: Option<&str>,
    team_names: Option<(&str, &str)>,
) -> Option<MapOutcome> {
    let our_side = our_side?;
    let winner = winner?;
    let (team_1, team_2) = team_names?;
    // A side name matching neither team cannot be judged.
    if our_side != team_1 && our_side != team_2 {
        return None;
    }
    Some(if winner == our_side {
        MapOutcome::Win
    } else {
        MapOutcome::Loss
    })
}

impl TeamDataset {
    /// Load a team's dataset.
    #[instrument(skip(ctx), fields(request = %ctx.id()))]
    pub async fn load(ctx: &RequestContext, team_id: TeamId) -> Result<Self, AnalyticsError> {
        let maps = ctx.maps_for_team(team_id).await?;
        let map_ids: Vec<MapId> = maps.iter().map(|m| m.id).collect();

        let (roster, scrims, stats, starts, rounds, captures, kills, rezzes, ultimates) = tokio::try_join!(
            resolve_roster(ctx, team_id),
            ctx.scrims_for_team(team_id),
            ctx.player_stats_for_maps(&map_ids),
            ctx.match_starts_for_maps(&map_ids),
            ctx.round_ends_for_maps(&map_ids),
            ctx.captures_for_maps(&map_ids),
            ctx.kills_for_maps(&map_ids),
            ctx.rezzes_for_maps(&map_ids),
            ctx.ultimates_for_maps(&map_ids),
        )?;

        let scrim_dates: HashMap<ScrimId, DateTime<Utc>> =
            scrims.iter().map(|s| (s.id, s.date)).collect();

        let mut rows_by_map: HashMap<MapId, Vec<&PlayerStatRow>> = HashMap::new();
        for row in stats.iter() {
            rows_by_map.entry(row.map_id).or_default().push(row);
        }

        let mut facts = Vec::with_capacity(maps.len());
        for map in maps.iter() {
            let Some(date) = scrim_dates.get(&map.scrim_id).copied() else {
                continue;
            };
            let details = starts.iter().find(|s| s.map_id == map.id);
            let round = final_round(rounds.iter().filter(|r| r.map_id == map.id));
            let (team_1_captures, team_2_captures) = match details {
                Some(d) => partition_captures(d, captures.iter().filter(|c| c.map_id == map.id)),
                None => (Vec::new(), Vec::new()),
            };

            let winner = calculate_winner(&WinnerInput {
                match_details: details,
                final_round: round,
                team_1_captures: &team_1_captures,
                team_2_captures: &team_2_captures,
            });
            let our_side = rows_by_map
                .get(&map.id)
                .and_then(|rows| our_side_name(rows, &roster));
            let outcome = outcome_for(
                our_side.as_deref(),
                winner.as_deref(),
                details.map(|d| (d.team_1_name.as_str(), d.team_2_name.as_str())),
            );

            facts.push(MapFacts {
                map_id: map.id,
                scrim_id: map.scrim_id,
                date,
                map_name: details
                    .map(|d| d.map_name.clone())
                    .unwrap_or_else(|| map.name.clone()),
                map_type: details.map(|d| d.map_type),
                our_side,
                winner,
                outcome,
            });
        }
        facts.sort_by_key(|f| (f.date, f.map_id));

        let mut events: BTreeMap<MapId, Vec<FightEvent>> = BTreeMap::new();
        for event in collect_events(
            kills.iter().cloned(),
            rezzes.iter().cloned(),
            ultimates.iter().cloned(),
        ) {
            events.entry(event_map(&event)).or_default().push(event);
        }

        info!(
            %team_id,
            maps = facts.len(),
            roster = roster.len(),
            "team dataset loaded"
        );

        Ok(Self {
            team_id,
            roster,
            scrims,
            maps: facts,
            stats,
            events,
        })
    }

    /// Final row per (player, hero) for roster players on one map.
    pub fn roster_segments(&self, map_id: MapId) -> Vec<&PlayerStatRow> {
        let mut order: Vec<(&str, &str)> = Vec::new();
        let mut latest: HashMap<(&str, &str), &PlayerStatRow> = HashMap::new();
        for row in self.stats.iter().filter(|r| r.map_id == map_id) {
            if !self.roster.contains(&row.player_name) {
                continue;
            }
            let key = (row.player_name.as_str(), row.player_hero.as_str());
            match latest.get(&key) {
                None => {
                    order.push(key);
                    latest.insert(key, row);
                }
                Some(best) if row.round_number > best.round_number => {
                    latest.insert(key, row);
                }
                Some(_) => {}
            }
        }
        order.into_iter().filter_map(|k| latest.get(&k).copied()).collect()
    }

    /// Fight analyses for every map where our side is known, in map order.
    pub fn fight_analyses(&self) -> Vec<(MapId, FightAnalysis)> {
        let mut out = Vec::new();
        for facts in &self.maps {
            let (Some(side), Some(events)) = (&facts.our_side, self.events.get(&facts.map_id)) else {
                continue;
            };
            for fight in reconstruct_fights(events.clone()) {
                out.push((facts.map_id, analyze_fight_outcome(&fight, side)));
            }
        }
        out
    }

    /// Maps with a determined outcome.
    pub fn decided_maps(&self) -> impl Iterator<Item = &MapFacts> {
        self.maps.iter().filter(|m| m.outcome.is_some())
    }
}

fn event_map(event: &FightEvent) -> MapId {
    match event {
        FightEvent::Kill(k) => k.map_id,
        FightEvent::MercyRez(r) => r.map_id,
        FightEvent::UltimateStart(u) => u.map_id,
    }
}

/// Builders for team datasets used across the view tests.
#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::TimeZone;

    use crate::models::{
        Kill, MapRecord, MatchStart, RoundEnd, Scrim, ScrimId, TeamId, UltimateStart,
    };
    use crate::storage::Tables;

    use super::*;

    pub const US: &str = "Alpha";
    pub const THEM: &str = "Bravo";

    /// Our default lineup: one tank, two damage, two supports.
    pub const LINEUP: [(&str, &str); 5] = [
        ("tank1", "Reinhardt"),
        ("dps1", "Tracer"),
        ("dps2", "Sojourn"),
        ("sup1", "Ana"),
        ("sup2", "Kiriko"),
    ];

    pub struct TeamBuilder {
        pub tables: Tables,
        next_map: i64,
    }

    impl TeamBuilder {
        pub fn new() -> Self {
            Self {
                tables: Tables::default(),
                next_map: 1,
            }
        }

        /// Add a scrim with one map; returns the map id.
        ///
        /// `won`: Some(true) we win 3-1, Some(false) we lose 1-3, None a 2-2
        /// draw with no captures.
        pub fn map(
            &mut self,
            date: (i32, u32, u32),
            map_type: MapType,
            map_name: &str,
            won: Option<bool>,
            lineup: &[(&str, &str)],
        ) -> MapId {
            let id = self.next_map;
            self.next_map += 1;
            let map_id = MapId(id);
            let scrim_id = ScrimId(id);

            self.tables.scrims.push(Scrim {
                id: scrim_id,
                team_id: TeamId(1),
                name: format!("Scrim {}", id),
                date: Utc
                    .with_ymd_and_hms(date.0, date.1, date.2, 18, 0, 0)
                    .single()
                    .unwrap(),
                opponent: Some(THEM.to_string()),
            });
            self.tables.maps.push(MapRecord {
                id: map_id,
                scrim_id,
                name: map_name.to_string(),
            });
            self.tables.match_starts.push(MatchStart {
                map_id,
                match_time: 0.0,
                map_name: map_name.to_string(),
                map_type,
                team_1_name: US.to_string(),
                team_2_name: THEM.to_string(),
            });
            let (team_1_score, team_2_score) = match won {
                Some(true) => (3, 1),
                Some(false) => (1, 3),
                None => (2, 2),
            };
            self.tables.round_ends.push(RoundEnd {
                map_id,
                round_number: 3,
                team_1_score,
                team_2_score,
                ..Default::default()
            });

            for (player, hero) in lineup {
                self.tables.player_stats.push(stat_row(map_id, US, player, hero, 600.0));
            }
            for i in 1..=5 {
                let name = format!("enemy{}", i);
                self.tables.player_stats.push(stat_row(map_id, THEM, &name, "Mercy", 600.0));
            }
            map_id
        }

        pub fn kill(&mut self, map_id: MapId, t: f64, attacker: &str, victim: &str) {
            self.tables.kills.push(Kill {
                map_id,
                match_time: t,
                attacker_team: attacker.to_string(),
                victim_team: victim.to_string(),
                ..Default::default()
            });
        }

        pub fn ult(&mut self, map_id: MapId, t: f64, team: &str) {
            self.tables.ultimates.push(UltimateStart {
                map_id,
                match_time: t,
                player_team: team.to_string(),
                ..Default::default()
            });
        }

        pub async fn load(self) -> TeamDataset {
            let ctx = RequestContext::new(Arc::new(crate::storage::MemoryStore::new(self.tables)));
            TeamDataset::load(&ctx, TeamId(1)).await.unwrap()
        }
    }

    pub fn stat_row(map_id: MapId, team: &str, player: &str, hero: &str, time: f64) -> PlayerStatRow {
        PlayerStatRow {
            map_id,
            round_number: 3,
            player_team: team.to_string(),
            player_name: player.to_string(),
            player_hero: hero.to_string(),
            hero_time_played: time,
            eliminations: 20.0,
            final_blows: 10.0,
            deaths: 5.0,
            hero_damage_dealt: 8000.0,
            healing_dealt: 1000.0,
            damage_taken: 6000.0,
            damage_blocked: 500.0,
            ultimates_earned: 4.0,
            ultimates_used: 4.0,
            ..Default::default()
        }
    }
}
