//! Win rates by map mode and by map.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;

use super::TeamDataset;
use crate::models::{MapType, WinRecord};

/// Modes need this many decided games to be ranked best or worst.
pub const MODE_RANK_MIN_GAMES: u32 = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPerformance {
    pub map_name: String,
    pub record: WinRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModePerformance {
    pub map_type: MapType,
    pub record: WinRecord,
    /// Alphabetical.
    pub maps: Vec<MapPerformance>,
    pub best_map: Option<String>,
    /// Only set when the mode has more than one map.
    pub worst_map: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MapModeAnalysis {
    pub modes: Vec<ModePerformance>,
    pub best_mode: Option<MapType>,
    /// Only set when more than one mode qualifies.
    pub worst_mode: Option<MapType>,
}

/// Higher win rate first, then more games.
fn by_win_rate_desc(a: &WinRecord, b: &WinRecord) -> Ordering {
    b.win_rate
        .total_cmp(&a.win_rate)
        .then_with(|| b.games.cmp(&a.games))
}

/// Lower win rate first, then more games.
fn by_win_rate_asc(a: &WinRecord, b: &WinRecord) -> Ordering {
    a.win_rate
        .total_cmp(&b.win_rate)
        .then_with(|| b.games.cmp(&a.games))
}

pub fn map_mode_performance(dataset: &TeamDataset) -> MapModeAnalysis {
    let mut modes: BTreeMap<MapType, BTreeMap<String, WinRecord>> = BTreeMap::new();
    for facts in dataset.decided_maps() {
        let Some(map_type) = facts.map_type else {
            continue;
        };
        if map_type == MapType::Push {
            continue;
        }
        modes
            .entry(map_type)
            .or_default()
            .entry(facts.map_name.clone())
            .or_default()
            .record(facts.outcome);
    }

    let modes: Vec<ModePerformance> = MapType::ALL
        .iter()
        .filter_map(|t| modes.remove_entry(t))
        .map(|(map_type, maps)| {
            let maps: Vec<MapPerformance> = maps
                .into_iter()
                .map(|(map_name, record)| MapPerformance { map_name, record })
                .collect();

            let mut record = WinRecord::default();
            for map in &maps {
                record.merge(&map.record);
            }
            let best_map = maps
                .iter()
                .min_by(|a, b| by_win_rate_desc(&a.record, &b.record))
                .map(|m| m.map_name.clone());
            let worst_map = if maps.len() > 1 {
                maps.iter()
                    .min_by(|a, b| by_win_rate_asc(&a.record, &b.record))
                    .map(|m| m.map_name.clone())
            } else {
                None
            };

            ModePerformance {
                map_type,
                record,
                maps,
                best_map,
                worst_map,
            }
        })
        .collect();

    let ranked: Vec<&ModePerformance> = modes
        .iter()
        .filter(|m| m.record.games >= MODE_RANK_MIN_GAMES)
        .collect();
    let best_mode = ranked
        .iter()
        .min_by(|a, b| by_win_rate_desc(&a.record, &b.record))
        .map(|m| m.map_type);
    let worst_mode = if ranked.len() > 1 {
        ranked
            .iter()
            .min_by(|a, b| by_win_rate_asc(&a.record, &b.record))
            .map(|m| m.map_type)
    } else {
        None
    };

    MapModeAnalysis {
        modes,
        best_mode,
        worst_mode,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculate::dataset::fixtures::*;

    #[tokio::test]
    async fn test_modes_exclude_push_and_rank() {
        let mut team = TeamBuilder::new();
        // Control: 3 games, 2 wins over two maps.
        team.map((2024, 5, 1), MapType::Control, "Ilios", Some(true), &LINEUP);
        team.map((2024, 5, 2), MapType::Control, "Ilios", Some(true), &LINEUP);
        team.map((2024, 5, 3), MapType::Control, "Busan", Some(false), &LINEUP);
        // Escort: 3 games, 1 win.
        team.map((2024, 5, 4), MapType::Escort, "Dorado", Some(true), &LINEUP);
        team.map((2024, 5, 5), MapType::Escort, "Dorado", Some(false), &LINEUP);
        team.map((2024, 5, 6), MapType::Escort, "Dorado", Some(false), &LINEUP);
        // Hybrid: too few games to rank.
        team.map((2024, 5, 7), MapType::Hybrid, "Midtown", Some(true), &LINEUP);
        // Push never counts.
        team.map((2024, 5, 8), MapType::Push, "Colosseo", Some(true), &LINEUP);

        let analysis = map_mode_performance(&team.load().await);

        let types: Vec<MapType> = analysis.modes.iter().map(|m| m.map_type).collect();
        assert_eq!(types, vec![MapType::Control, MapType::Hybrid, MapType::Escort]);

        let control = &analysis.modes[0];
        assert_eq!(control.record.games, 3);
        assert_eq!(control.record.wins, 2);
        assert_eq!(control.best_map.as_deref(), Some("Ilios"));
        assert_eq!(control.worst_map.as_deref(), Some("Busan"));

        let hybrid = &analysis.modes[1];
        assert_eq!(hybrid.best_map.as_deref(), Some("Midtown"));
        assert_eq!(hybrid.worst_map, None);

        assert_eq!(analysis.best_mode, Some(MapType::Control));
        assert_eq!(analysis.worst_mode, Some(MapType::Escort));
    }

    #[tokio::test]
    async fn test_undecided_maps_do_not_count() {
        let mut team = TeamBuilder::new();
        team.map((2024, 5, 1), MapType::Control, "Ilios", None, &LINEUP);
        team.map((2024, 5, 2), MapType::Control, "Ilios", Some(false), &LINEUP);

        let analysis = map_mode_performance(&team.load().await);
        assert_eq!(analysis.modes[0].record.games, 1);
        assert_eq!(analysis.modes[0].record.losses, 1);
        assert_eq!(analysis.best_mode, None);
    }

    #[tokio::test]
    async fn test_empty() {
        let analysis = map_mode_performance(&TeamBuilder::new().load().await);
        assert_eq!(analysis, MapModeAnalysis::default());
    }
}
