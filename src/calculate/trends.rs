//! Win rate over time, recent form and streaks.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::TeamDataset;
use crate::models::{MapOutcome, WinRecord};

/// Trailing windows reported as recent form.
pub const RECENT_FORM_WINDOWS: [usize; 3] = [5, 10, 20];

/// Bucket size for win-rate trends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendPeriod {
    /// ISO week, starting Monday.
    #[default]
    Week,
    /// Calendar month.
    Month,
}

impl std::str::FromStr for TrendPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "week" => Ok(TrendPeriod::Week),
            "month" => Ok(TrendPeriod::Month),
            other => Err(format!("unknown period: {} (expected week or month)", other)),
        }
    }
}

/// First day of the bucket containing `date`.
pub fn period_start(date: DateTime<Utc>, period: TrendPeriod) -> NaiveDate {
    let day = date.date_naive();
    match period {
        TrendPeriod::Week => day - Duration::days(day.weekday().num_days_from_monday() as i64),
        TrendPeriod::Month => day - Duration::days(day.day0() as i64),
    }
}

fn period_label(start: NaiveDate, period: TrendPeriod) -> String {
    match period {
        TrendPeriod::Week => {
            let week = start.iso_week();
            format!("{}-W{:02}", week.year(), week.week())
        }
        TrendPeriod::Month => start.format("%Y-%m").to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodBucket {
    pub period_start: NaiveDate,
    pub label: String,
    pub record: WinRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentForm {
    pub window: usize,
    pub record: WinRecord,
}

/// A run of identical outcomes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Streak {
    pub outcome: MapOutcome,
    pub length: u32,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PerformanceTrends {
    pub period: TrendPeriod,
    /// Oldest first.
    pub buckets: Vec<PeriodBucket>,
    pub recent_form: Vec<RecentForm>,
    pub current_streak: Option<Streak>,
    pub longest_win_streak: Option<Streak>,
    pub longest_loss_streak: Option<Streak>,
}

/// Split chronological outcomes into runs.
pub fn streaks(outcomes: &[(DateTime<Utc>, MapOutcome)]) -> Vec<Streak> {
    let mut runs: Vec<Streak> = Vec::new();
    for (date, outcome) in outcomes {
        match runs.last_mut() {
            Some(run) if run.outcome == *outcome => {
                run.length += 1;
                run.end = *date;
            }
            _ => runs.push(Streak {
                outcome: *outcome,
                length: 1,
                start: *date,
                end: *date,
            }),
        }
    }
    runs
}

/// Longest run of `outcome`; the earliest wins a tie.
fn longest(runs: &[Streak], outcome: MapOutcome) -> Option<Streak> {
    let mut best: Option<&Streak> = None;
    for run in runs.iter().filter(|r| r.outcome == outcome) {
        if best.map_or(true, |b| run.length > b.length) {
            best = Some(run);
        }
    }
    best.cloned()
}

pub fn performance_trends(dataset: &TeamDataset, period: TrendPeriod) -> PerformanceTrends {
    let decided: Vec<(DateTime<Utc>, MapOutcome)> = dataset
        .decided_maps()
        .filter_map(|m| m.outcome.map(|o| (m.date, o)))
        .collect();

    let mut by_bucket: BTreeMap<NaiveDate, WinRecord> = BTreeMap::new();
    for (date, outcome) in &decided {
        by_bucket
            .entry(period_start(*date, period))
            .or_default()
            .record(Some(*outcome));
    }
    let buckets = by_bucket
        .into_iter()
        .map(|(start, record)| PeriodBucket {
            period_start: start,
            label: period_label(start, period),
            record,
        })
        .collect();

    let recent_form = RECENT_FORM_WINDOWS
        .iter()
        .map(|window| {
            let skip = decided.len().saturating_sub(*window);
            RecentForm {
                window: *window,
                record: WinRecord::from_outcomes(decided[skip..].iter().map(|(_, o)| Some(*o))),
            }
        })
        .collect();

    let runs = streaks(&decided);

    PerformanceTrends {
        period,
        buckets,
        recent_form,
        current_streak: runs.last().cloned(),
        longest_win_streak: longest(&runs, MapOutcome::Win),
        longest_loss_streak: longest(&runs, MapOutcome::Loss),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculate::dataset::fixtures::*;
    use crate::models::MapType;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).single().unwrap()
    }

    #[test]
    fn test_week_starts_monday() {
        // 2024-03-07 is a Thursday.
        let start = period_start(at(2024, 3, 7), TrendPeriod::Week);
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
        assert_eq!(period_label(start, TrendPeriod::Week), "2024-W10");

        // Sunday belongs to the week that started six days earlier.
        let sunday = period_start(at(2024, 3, 10), TrendPeriod::Week);
        assert_eq!(sunday, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
    }

    #[test]
    fn test_month_bucket() {
        let start = period_start(at(2024, 2, 29), TrendPeriod::Month);
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(period_label(start, TrendPeriod::Month), "2024-02");
    }

    #[test]
    fn test_period_from_str() {
        assert_eq!("Week".parse::<TrendPeriod>(), Ok(TrendPeriod::Week));
        assert_eq!("month".parse::<TrendPeriod>(), Ok(TrendPeriod::Month));
        assert!("year".parse::<TrendPeriod>().is_err());
    }

    #[test]
    fn test_streak_detection() {
        use MapOutcome::*;
        let outcomes = vec![
            (at(2024, 1, 1), Win),
            (at(2024, 1, 2), Win),
            (at(2024, 1, 3), Loss),
            (at(2024, 1, 4), Win),
            (at(2024, 1, 5), Win),
            (at(2024, 1, 6), Win),
            (at(2024, 1, 7), Loss),
            (at(2024, 1, 8), Loss),
        ];

        let runs = streaks(&outcomes);
        assert_eq!(runs.len(), 4);

        let win = longest(&runs, Win).unwrap();
        assert_eq!(win.length, 3);
        assert_eq!((win.start, win.end), (at(2024, 1, 4), at(2024, 1, 6)));

        let loss = longest(&runs, Loss).unwrap();
        assert_eq!(loss.length, 2);
        assert_eq!(loss.start, at(2024, 1, 7));
    }

    #[tokio::test]
    async fn test_trends_over_dataset() {
        let mut team = TeamBuilder::new();
        // Week of 2024-03-04: W W L; week of 2024-03-11: W, then an undecided map.
        team.map((2024, 3, 4), MapType::Control, "Ilios", Some(true), &LINEUP);
        team.map((2024, 3, 5), MapType::Control, "Ilios", Some(true), &LINEUP);
        team.map((2024, 3, 6), MapType::Control, "Ilios", Some(false), &LINEUP);
        team.map((2024, 3, 12), MapType::Control, "Ilios", Some(true), &LINEUP);
        team.map((2024, 3, 13), MapType::Control, "Ilios", None, &LINEUP);

        let dataset = team.load().await;
        let trends = performance_trends(&dataset, TrendPeriod::Week);

        assert_eq!(trends.buckets.len(), 2);
        assert_eq!(trends.buckets[0].record.games, 3);
        assert_eq!(trends.buckets[0].record.wins, 2);
        assert_eq!(trends.buckets[1].label, "2024-W11");

        assert_eq!(trends.recent_form[0].window, 5);
        assert_eq!(trends.recent_form[0].record.games, 4);
        assert_eq!(trends.recent_form[0].record.wins, 3);

        let current = trends.current_streak.unwrap();
        assert_eq!(current.outcome, MapOutcome::Win);
        assert_eq!(current.length, 1);
        assert_eq!(trends.longest_win_streak.unwrap().length, 2);

        let monthly = performance_trends(&dataset, TrendPeriod::Month);
        assert_eq!(monthly.buckets.len(), 1);
        assert_eq!(monthly.buckets[0].record.games, 4);
    }

    #[tokio::test]
    async fn test_recent_form_window() {
        let mut team = TeamBuilder::new();
        for day in 1..=7 {
            team.map((2024, 6, day), MapType::Escort, "Dorado", Some(day > 2), &LINEUP);
        }

        let trends = performance_trends(&team.load().await, TrendPeriod::Week);
        let last_five = &trends.recent_form[0];
        assert_eq!(last_five.record.games, 5);
        assert_eq!(last_five.record.wins, 5);
        assert_eq!(trends.recent_form[1].record.games, 7);
    }

    #[tokio::test]
    async fn test_empty_trends() {
        let trends = performance_trends(&TeamBuilder::new().load().await, TrendPeriod::Month);
        assert!(trends.buckets.is_empty());
        assert!(trends.current_streak.is_none());
        assert!(trends.recent_form.iter().all(|f| f.record.games == 0));
    }
}
