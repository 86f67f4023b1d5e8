//! Timestamped combat events: kills, resurrections and ultimate casts.

use serde::{Deserialize, Serialize};

use super::MapId;

/// A final blow on an enemy player.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Kill {
    pub map_id: MapId,
    /// Seconds since the map started.
    pub match_time: f64,
    pub attacker_team: String,
    pub attacker_name: String,
    pub attacker_hero: String,
    pub victim_team: String,
    pub victim_name: String,
    pub victim_hero: String,
    pub event_ability: Option<String>,
}

/// A Mercy resurrection. Treated as reversing one kill against the
/// resurrecting team.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MercyRez {
    pub map_id: MapId,
    pub match_time: f64,
    pub resurrecter_team: String,
    pub resurrecter_player: String,
    pub resurrecter_hero: String,
    pub resurrectee_team: String,
    pub resurrectee_player: String,
    pub resurrectee_hero: String,
}

/// An ultimate ability being cast.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UltimateStart {
    pub map_id: MapId,
    pub match_time: f64,
    pub player_team: String,
    pub player_name: String,
    pub player_hero: String,
    pub ultimate_id: i64,
}

/// Any event that takes part in fight reconstruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FightEvent {
    Kill(Kill),
    MercyRez(MercyRez),
    UltimateStart(UltimateStart),
}

impl FightEvent {
    pub fn match_time(&self) -> f64 {
        match self {
            FightEvent::Kill(k) => k.match_time,
            FightEvent::MercyRez(r) => r.match_time,
            FightEvent::UltimateStart(u) => u.match_time,
        }
    }
}

impl From<Kill> for FightEvent {
    fn from(k: Kill) -> Self {
        FightEvent::Kill(k)
    }
}

impl From<MercyRez> for FightEvent {
    fn from(r: MercyRez) -> Self {
        FightEvent::MercyRez(r)
    }
}

impl From<UltimateStart> for FightEvent {
    fn from(u: UltimateStart) -> Self {
        FightEvent::UltimateStart(u)
    }
}
