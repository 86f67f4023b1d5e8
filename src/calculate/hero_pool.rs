//! Hero pool depth and specialists.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use super::TeamDataset;
use crate::models::{role_for_hero, round1, MapId, Role, WinRecord, TOTAL_HEROES};

/// Heroes need this many decided games to rank by win rate.
pub const TOP_WINRATE_MIN_GAMES: u32 = 3;
pub const TOP_WINRATE_LIMIT: usize = 5;
/// Share of a hero's playtime that makes a player its specialist.
pub const SPECIALIST_SHARE: f64 = 0.3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeroPlayer {
    pub player_name: String,
    pub time_played: f64,
    /// Percent of the hero's team playtime.
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeroUsage {
    pub hero: String,
    pub role: Option<Role>,
    pub time_played: f64,
    pub games: u32,
    /// Most playtime first.
    pub players: Vec<HeroPlayer>,
    pub record: WinRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Specialist {
    pub player_name: String,
    pub hero: String,
    pub share: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HeroPoolAnalysis {
    /// Most playtime first.
    pub heroes: Vec<HeroUsage>,
    pub unique_heroes: usize,
    /// 0 to 100.
    pub diversity_score: f64,
    pub top_winrates: Vec<HeroUsage>,
    pub specialists: Vec<Specialist>,
}

#[derive(Default)]
struct HeroAccumulator {
    time_played: f64,
    maps: HashSet<MapId>,
    players: BTreeMap<String, f64>,
    record: WinRecord,
}

pub fn diversity_score(unique_heroes: usize) -> f64 {
    (unique_heroes as f64 / TOTAL_HEROES as f64).min(1.0) * 100.0
}

pub fn hero_pool_analysis(dataset: &TeamDataset) -> HeroPoolAnalysis {
    let mut heroes: BTreeMap<String, HeroAccumulator> = BTreeMap::new();

    for facts in &dataset.maps {
        for row in dataset.roster_segments(facts.map_id) {
            if row.hero_time_played <= 0.0 {
                continue;
            }
            let acc = heroes.entry(row.player_hero.clone()).or_default();
            acc.time_played += row.hero_time_played;
            *acc.players.entry(row.player_name.clone()).or_default() += row.hero_time_played;
            if acc.maps.insert(facts.map_id) {
                acc.record.record(facts.outcome);
            }
        }
    }

    let mut usage: Vec<HeroUsage> = heroes
        .into_iter()
        .map(|(hero, acc)| {
            let mut players: Vec<HeroPlayer> = acc
                .players
                .into_iter()
                .map(|(player_name, time_played)| HeroPlayer {
                    player_name,
                    time_played,
                    share: round1(time_played / acc.time_played * 100.0),
                })
                .collect();
            players.sort_by(|a, b| b.time_played.total_cmp(&a.time_played));

            HeroUsage {
                role: role_for_hero(&hero),
                hero,
                time_played: acc.time_played,
                games: acc.maps.len() as u32,
                players,
                record: acc.record,
            }
        })
        .collect();
    usage.sort_by(|a, b| b.time_played.total_cmp(&a.time_played));

    let specialists = usage
        .iter()
        .flat_map(|h| {
            h.players
                .iter()
                .filter(|p| p.time_played / h.time_played >= SPECIALIST_SHARE)
                .map(|p| Specialist {
                    player_name: p.player_name.clone(),
                    hero: h.hero.clone(),
                    share: p.share,
                })
        })
        .collect();

    let mut top_winrates: Vec<HeroUsage> = usage
        .iter()
        .filter(|h| h.record.games >= TOP_WINRATE_MIN_GAMES)
        .cloned()
        .collect();
    top_winrates.sort_by(|a, b| {
        b.record
            .win_rate
            .total_cmp(&a.record.win_rate)
            .then_with(|| b.record.games.cmp(&a.record.games))
    });
    top_winrates.truncate(TOP_WINRATE_LIMIT);

    HeroPoolAnalysis {
        unique_heroes: usage.len(),
        diversity_score: diversity_score(usage.len()),
        heroes: usage,
        top_winrates,
        specialists,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculate::dataset::fixtures::*;
    use crate::models::MapType;

    #[test]
    fn test_diversity_score() {
        assert_eq!(diversity_score(0), 0.0);
        assert_eq!(diversity_score(41), 100.0);
        assert_eq!(diversity_score(60), 100.0);
        assert!((diversity_score(10) - 24.39).abs() < 0.01);
    }

    #[tokio::test]
    async fn test_hero_pool() {
        let mut team = TeamBuilder::new();
        for day in 1..=3 {
            team.map((2024, 4, day), MapType::Control, "Busan", Some(true), &LINEUP);
        }
        // Fourth map: dps1 swaps to Genji, lost.
        let mut lineup = LINEUP;
        lineup[1] = ("dps1", "Genji");
        team.map((2024, 4, 4), MapType::Control, "Busan", Some(false), &lineup);

        let pool = hero_pool_analysis(&team.load().await);

        assert_eq!(pool.unique_heroes, 6);
        let tracer = pool.heroes.iter().find(|h| h.hero == "Tracer").unwrap();
        assert_eq!(tracer.games, 3);
        assert_eq!(tracer.record.wins, 3);
        assert_eq!(tracer.role, Some(Role::Damage));

        let genji = pool.heroes.iter().find(|h| h.hero == "Genji").unwrap();
        assert_eq!(genji.games, 1);
        assert_eq!(genji.record.losses, 1);
        // Only heroes with 3+ decided games rank.
        assert!(pool.top_winrates.iter().all(|h| h.record.games >= 3));
        assert!(!pool.top_winrates.iter().any(|h| h.hero == "Genji"));
        assert_eq!(pool.top_winrates[0].record.win_rate, 100.0);

        // Every hero here has a single player, so each is a specialist.
        assert_eq!(pool.specialists.len(), 6);
    }

    #[tokio::test]
    async fn test_shared_hero_specialist_share() {
        let mut team = TeamBuilder::new();
        let map = team.map((2024, 4, 1), MapType::Control, "Busan", Some(true), &LINEUP);
        // A second roster player spends a little time on Ana too.
        team.tables.player_stats.push(stat_row(map, US, "sup2", "Ana", 100.0));

        let pool = hero_pool_analysis(&team.load().await);
        let ana = pool.heroes.iter().find(|h| h.hero == "Ana").unwrap();

        assert_eq!(ana.players[0].player_name, "sup1");
        assert_eq!(ana.players[1].share, 14.3);
        assert!(pool
            .specialists
            .iter()
            .all(|s| !(s.hero == "Ana" && s.player_name == "sup2")));
    }

    #[tokio::test]
    async fn test_specialist_share_is_not_rounded() {
        let mut team = TeamBuilder::new();
        let map = team.map((2024, 4, 1), MapType::Control, "Busan", Some(true), &LINEUP);
        // 256.8 / 856.8 is just under 30%.
        team.tables.player_stats.push(stat_row(map, US, "sup2", "Ana", 256.8));

        let pool = hero_pool_analysis(&team.load().await);
        let ana = pool.heroes.iter().find(|h| h.hero == "Ana").unwrap();

        assert_eq!(ana.players[1].player_name, "sup2");
        assert_eq!(ana.players[1].share, 30.0);
        assert!(!pool
            .specialists
            .iter()
            .any(|s| s.hero == "Ana" && s.player_name == "sup2"));
    }

    #[tokio::test]
    async fn test_empty_pool() {
        let pool = hero_pool_analysis(&TeamBuilder::new().load().await);
        assert_eq!(pool, HeroPoolAnalysis::default());
    }
}
