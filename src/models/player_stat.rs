//! Per-round player stat rows and the stat columns analytics can read.

use serde::{Deserialize, Serialize};

use super::MapId;

/// One player's cumulative stats for one hero segment of one round.
///
/// Counters are cumulative within a map, so the row with the highest
/// `round_number` per (map, player, hero) holds the final totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerStatRow {
    pub map_id: MapId,
    pub round_number: u32,
    pub player_team: String,
    pub player_name: String,
    pub player_hero: String,
    /// Seconds on this hero.
    pub hero_time_played: f64,

    pub eliminations: f64,
    pub final_blows: f64,
    pub deaths: f64,
    pub all_damage_dealt: f64,
    pub barrier_damage_dealt: f64,
    pub hero_damage_dealt: f64,
    pub healing_dealt: f64,
    pub healing_received: f64,
    pub self_healing: f64,
    pub damage_taken: f64,
    pub damage_blocked: f64,
    pub defensive_assists: f64,
    pub offensive_assists: f64,
    pub ultimates_earned: f64,
    pub ultimates_used: f64,
    pub multikill_best: f64,
    pub multikills: f64,
    pub solo_kills: f64,
    pub objective_kills: f64,
    pub environmental_kills: f64,
    pub environmental_deaths: f64,
    pub critical_hits: f64,
    pub critical_hit_accuracy: f64,
    pub scoped_accuracy: f64,
    pub scoped_critical_hit_accuracy: f64,
    pub scoped_critical_hit_kills: f64,
    pub shots_fired: f64,
    pub shots_hit: f64,
    pub shots_missed: f64,
    pub weapon_accuracy: f64,
}

/// A stat column that can be compared against a hero population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKind {
    Eliminations,
    FinalBlows,
    Deaths,
    AllDamageDealt,
    HeroDamageDealt,
    HealingDealt,
    DamageTaken,
    DamageBlocked,
    SoloKills,
    UltimatesEarned,
    UltimatesUsed,
    ObjectiveKills,
    OffensiveAssists,
    DefensiveAssists,
    CriticalHits,
    EnvironmentalKills,
}

impl StatKind {
    /// Read this stat from a row.
    pub fn value(self, row: &PlayerStatRow) -> f64 {
        match self {
            StatKind::Eliminations => row.eliminations,
            StatKind::FinalBlows => row.final_blows,
            StatKind::Deaths => row.deaths,
            StatKind::AllDamageDealt => row.all_damage_dealt,
            StatKind::HeroDamageDealt => row.hero_damage_dealt,
            StatKind::HealingDealt => row.healing_dealt,
            StatKind::DamageTaken => row.damage_taken,
            StatKind::DamageBlocked => row.damage_blocked,
            StatKind::SoloKills => row.solo_kills,
            StatKind::UltimatesEarned => row.ultimates_earned,
            StatKind::UltimatesUsed => row.ultimates_used,
            StatKind::ObjectiveKills => row.objective_kills,
            StatKind::OffensiveAssists => row.offensive_assists,
            StatKind::DefensiveAssists => row.defensive_assists,
            StatKind::CriticalHits => row.critical_hits,
            StatKind::EnvironmentalKills => row.environmental_kills,
        }
    }

    /// Stats where a lower value is better.
    pub fn is_inverted(self) -> bool {
        matches!(self, StatKind::Deaths | StatKind::DamageTaken)
    }

    /// Column name as stored.
    pub fn as_str(self) -> &'static str {
        match self {
            StatKind::Eliminations => "eliminations",
            StatKind::FinalBlows => "final_blows",
            StatKind::Deaths => "deaths",
            StatKind::AllDamageDealt => "all_damage_dealt",
            StatKind::HeroDamageDealt => "hero_damage_dealt",
            StatKind::HealingDealt => "healing_dealt",
            StatKind::DamageTaken => "damage_taken",
            StatKind::DamageBlocked => "damage_blocked",
            StatKind::SoloKills => "solo_kills",
            StatKind::UltimatesEarned => "ultimates_earned",
            StatKind::UltimatesUsed => "ultimates_used",
            StatKind::ObjectiveKills => "objective_kills",
            StatKind::OffensiveAssists => "offensive_assists",
            StatKind::DefensiveAssists => "defensive_assists",
            StatKind::CriticalHits => "critical_hits",
            StatKind::EnvironmentalKills => "environmental_kills",
        }
    }
}

impl std::fmt::Display for StatKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for StatKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.trim().to_lowercase()))
            .map_err(|_| format!("unknown stat: {}", s))
    }
}
