//! Team overview record.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::TeamDataset;
use crate::models::{TeamId, WinRecord};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TeamOverview {
    pub team_id: TeamId,
    pub roster: Vec<String>,
    pub scrims: usize,
    pub maps_played: usize,
    pub record: WinRecord,
    /// Maps with no determinable winner (draws, Push, missing data).
    pub undetermined: usize,
    pub first_scrim: Option<DateTime<Utc>>,
    pub last_scrim: Option<DateTime<Utc>>,
}

pub fn team_overview(dataset: &TeamDataset) -> TeamOverview {
    let record = WinRecord::from_outcomes(dataset.maps.iter().map(|m| m.outcome));
    TeamOverview {
        team_id: dataset.team_id,
        roster: dataset.roster.iter().cloned().collect(),
        scrims: dataset.scrims.len(),
        maps_played: dataset.maps.len(),
        undetermined: dataset.maps.len() - record.games as usize,
        record,
        first_scrim: dataset.scrims.iter().map(|s| s.date).min(),
        last_scrim: dataset.scrims.iter().map(|s| s.date).max(),
    }
}
