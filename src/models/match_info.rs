//! Per-map match metadata: sides, map type, round results and captures.

use serde::{Deserialize, Serialize};

use super::MapId;

/// Game mode of a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MapType {
    Control,
    Hybrid,
    Escort,
    Push,
    Flashpoint,
    Clash,
}

impl MapType {
    pub const ALL: [MapType; 6] = [
        MapType::Control,
        MapType::Hybrid,
        MapType::Escort,
        MapType::Push,
        MapType::Flashpoint,
        MapType::Clash,
    ];
}

impl std::fmt::Display for MapType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MapType::Control => "Control",
            MapType::Hybrid => "Hybrid",
            MapType::Escort => "Escort",
            MapType::Push => "Push",
            MapType::Flashpoint => "Flashpoint",
            MapType::Clash => "Clash",
        };
        write!(f, "{}", name)
    }
}

/// Match start record: which team names occupy each side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchStart {
    pub map_id: MapId,
    #[serde(default)]
    pub match_time: f64,
    pub map_name: String,
    pub map_type: MapType,
    pub team_1_name: String,
    pub team_2_name: String,
}

/// End-of-round scoreboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundEnd {
    pub map_id: MapId,
    pub round_number: u32,
    pub match_time: f64,
    pub capturing_team: String,
    pub team_1_score: u32,
    pub team_2_score: u32,
    pub objective_index: u32,
    pub control_team_1_progress: f64,
    pub control_team_2_progress: f64,
    pub match_time_remaining: f64,
}

/// An objective being captured.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectiveCaptured {
    pub map_id: MapId,
    pub round_number: u32,
    pub match_time: f64,
    pub capturing_team: String,
    pub objective_index: u32,
    pub control_team_1_progress: f64,
    pub control_team_2_progress: f64,
    pub match_time_remaining: f64,
}

/// Pick the final round (highest round number) from a map's round ends.
pub fn final_round<'a, I>(rounds: I) -> Option<&'a RoundEnd>
where
    I: IntoIterator<Item = &'a RoundEnd>,
{
    // First maximum wins on duplicated round numbers.
    rounds.into_iter().fold(None, |best: Option<&RoundEnd>, r| match best {
        Some(b) if b.round_number >= r.round_number => Some(b),
        _ => Some(r),
    })
}
