//! Scrims and the maps played in them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{MapId, ScrimId, TeamId};

/// A practice session owned by a team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scrim {
    pub id: ScrimId,
    pub team_id: TeamId,
    pub name: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub opponent: Option<String>,
}

/// One map played within a scrim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapRecord {
    pub id: MapId,
    pub scrim_id: ScrimId,
    #[serde(default)]
    pub name: String,
}
