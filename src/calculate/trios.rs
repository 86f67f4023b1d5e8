//! Best five-player lineups by role.
//!
//! A map counts toward a lineup only when the roster fielded exactly one
//! tank, two damage and two support players, each placed by the hero they
//! played longest on that map.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use super::TeamDataset;
use crate::models::{role_for_hero, MapOutcome, PlayerStatRow, Role, WinRecord};

pub const TRIO_MIN_GAMES: u32 = 3;
pub const TRIO_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Lineup {
    pub tank: String,
    /// Sorted.
    pub damage: [String; 2],
    /// Sorted.
    pub support: [String; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleTrio {
    pub lineup: Lineup,
    pub record: WinRecord,
}

/// Each player's role on one map, from their longest-played hero.
fn player_roles<'a>(segments: &[&'a PlayerStatRow]) -> Vec<(&'a str, Role)> {
    let mut order: Vec<&str> = Vec::new();
    let mut longest: HashMap<&str, &PlayerStatRow> = HashMap::new();
    for row in segments.iter().copied() {
        match longest.get(row.player_name.as_str()) {
            None => {
                order.push(row.player_name.as_str());
                longest.insert(row.player_name.as_str(), row);
            }
            Some(best) if row.hero_time_played > best.hero_time_played => {
                longest.insert(row.player_name.as_str(), row);
            }
            Some(_) => {}
        }
    }

    order
        .into_iter()
        .filter_map(|name| {
            let row = longest.get(name)?;
            role_for_hero(&row.player_hero).map(|role| (name, role))
        })
        .collect()
}

/// Lineup fielded on a map, if it is exactly 1/2/2.
pub fn lineup_for_map(segments: &[&PlayerStatRow]) -> Option<Lineup> {
    let roles = player_roles(segments);
    let mut tanks: Vec<String> = Vec::new();
    let mut damage: Vec<String> = Vec::new();
    let mut support: Vec<String> = Vec::new();
    for (name, role) in roles {
        match role {
            Role::Tank => tanks.push(name.to_string()),
            Role::Damage => damage.push(name.to_string()),
            Role::Support => support.push(name.to_string()),
        }
    }

    if tanks.len() != 1 || damage.len() != 2 || support.len() != 2 {
        return None;
    }
    damage.sort();
    support.sort();

    let [d1, d2]: [String; 2] = damage.try_into().ok()?;
    let [s1, s2]: [String; 2] = support.try_into().ok()?;
    Some(Lineup {
        tank: tanks.remove(0),
        damage: [d1, d2],
        support: [s1, s2],
    })
}

pub fn best_role_trios(dataset: &TeamDataset) -> Vec<RoleTrio> {
    let mut records: BTreeMap<Lineup, WinRecord> = BTreeMap::new();
    for facts in dataset.decided_maps() {
        let outcome: Option<MapOutcome> = facts.outcome;
        let segments = dataset.roster_segments(facts.map_id);
        if let Some(lineup) = lineup_for_map(&segments) {
            records.entry(lineup).or_default().record(outcome);
        }
    }

    let mut trios: Vec<RoleTrio> = records
        .into_iter()
        .filter(|(_, record)| record.games >= TRIO_MIN_GAMES)
        .map(|(lineup, record)| RoleTrio { lineup, record })
        .collect();
    trios.sort_by(|a, b| {
        b.record
            .win_rate
            .total_cmp(&a.record.win_rate)
            .then_with(|| b.record.games.cmp(&a.record.games))
    });
    trios.truncate(TRIO_LIMIT);
    trios
}
