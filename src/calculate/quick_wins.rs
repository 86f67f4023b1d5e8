//! Quick-win insights: best weekday, fight length, first-pick conversion.

use chrono::{Datelike, Weekday};
use serde::Serialize;

use super::fight_stats::{summarize_fights, SituationStats};
use super::TeamDataset;
use crate::models::WinRecord;

/// A weekday needs this many decided games to be considered.
pub const BEST_DAY_MIN_GAMES: u32 = 3;
/// Longer fights are clock artifacts and are left out of the average.
pub const MAX_FIGHT_SECONDS: f64 = 300.0;

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayPerformance {
    pub weekday: String,
    pub record: WinRecord,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QuickWins {
    pub best_day: Option<DayPerformance>,
    /// Seconds, over fights shorter than [`MAX_FIGHT_SECONDS`].
    pub avg_fight_duration: f64,
    pub first_pick: SituationStats,
}

pub fn quick_wins(dataset: &TeamDataset) -> QuickWins {
    let mut by_day = [WinRecord::default(); 7];
    for facts in dataset.decided_maps() {
        let idx = facts.date.weekday().num_days_from_monday() as usize;
        by_day[idx].record(facts.outcome);
    }

    // Earlier weekday wins a tie.
    let mut best_day: Option<DayPerformance> = None;
    for (day, record) in WEEKDAYS.iter().zip(by_day) {
        if record.games < BEST_DAY_MIN_GAMES {
            continue;
        }
        if best_day
            .as_ref()
            .map_or(true, |b| record.win_rate > b.record.win_rate)
        {
            best_day = Some(DayPerformance {
                weekday: weekday_name(*day).to_string(),
                record,
            });
        }
    }

    let analyses = dataset.fight_analyses();
    let durations: Vec<f64> = analyses
        .iter()
        .map(|(_, a)| a.duration)
        .filter(|d| *d < MAX_FIGHT_SECONDS)
        .collect();
    let avg_fight_duration = if durations.is_empty() {
        0.0
    } else {
        durations.iter().sum::<f64>() / durations.len() as f64
    };

    QuickWins {
        best_day,
        avg_fight_duration,
        first_pick: summarize_fights(analyses.iter().map(|(_, a)| a)).first_pick,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculate::dataset::fixtures::*;
    use crate::models::MapType;

    #[tokio::test]
    async fn test_best_day_needs_three_games() {
        let mut team = TeamBuilder::new();
        // Mondays (4, 11, 18 March 2024): W W L.
        team.map((2024, 3, 4), MapType::Control, "Ilios", Some(true), &LINEUP);
        team.map((2024, 3, 11), MapType::Control, "Ilios", Some(true), &LINEUP);
        team.map((2024, 3, 18), MapType::Control, "Ilios", Some(false), &LINEUP);
        // Tuesdays: two wins only, not enough games.
        team.map((2024, 3, 5), MapType::Control, "Ilios", Some(true), &LINEUP);
        team.map((2024, 3, 12), MapType::Control, "Ilios", Some(true), &LINEUP);

        let wins = quick_wins(&team.load().await);
        let best = wins.best_day.unwrap();
        assert_eq!(best.weekday, "Monday");
        assert_eq!(best.record.games, 3);
        assert_eq!(best.record.wins, 2);
    }

    #[tokio::test]
    async fn test_fight_duration_ignores_long_fights() {
        let mut team = TeamBuilder::new();
        let map = team.map((2024, 3, 4), MapType::Control, "Ilios", Some(true), &LINEUP);
        // 10s fight.
        team.kill(map, 0.0, US, THEM);
        team.kill(map, 10.0, US, THEM);
        // 20s fight.
        team.kill(map, 100.0, THEM, US);
        team.kill(map, 110.0, US, THEM);
        team.kill(map, 120.0, US, THEM);
        // One continuous 350s brawl.
        for i in 0..=35 {
            team.kill(map, 1000.0 + i as f64 * 10.0, US, THEM);
        }

        let wins = quick_wins(&team.load().await);
        assert_eq!(wins.avg_fight_duration, 15.0);
        assert_eq!(wins.first_pick.fights, 2);
        assert_eq!(wins.first_pick.won, 2);
        assert!(wins.best_day.is_none());
    }

    #[tokio::test]
    async fn test_empty_quick_wins() {
        let wins = quick_wins(&TeamBuilder::new().load().await);
        assert_eq!(wins, QuickWins::default());
    }
}
