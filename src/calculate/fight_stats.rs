//! Team fight statistics across all of a team's maps.

use serde::Serialize;

use super::fights::FightAnalysis;
use super::{ratio_or_zero, TeamDataset};
use crate::models::win_rate_percent;

/// Fights in one situation and how many of them were won.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SituationStats {
    pub fights: u32,
    pub won: u32,
    /// Percent.
    pub win_rate: f64,
}

impl SituationStats {
    fn add(&mut self, won: bool) {
        self.fights += 1;
        if won {
            self.won += 1;
        }
        self.win_rate = win_rate_percent(self.won, self.fights);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TeamFightStats {
    pub total_fights: u32,
    pub fights_won: u32,
    pub fight_win_rate: f64,
    pub first_pick: SituationStats,
    pub first_death: SituationStats,
    pub first_ult: SituationStats,
    pub dry_fights: SituationStats,
    pub ultimates_used: u32,
    /// Fights won per ultimate used.
    pub ultimate_efficiency: f64,
    pub avg_ults_in_won_fights: f64,
    pub avg_ults_in_lost_fights: f64,
    pub wasted_ultimates: u32,
}

/// Fold per-fight analyses into team totals.
pub fn summarize_fights<'a>(analyses: impl IntoIterator<Item = &'a FightAnalysis>) -> TeamFightStats {
    let mut stats = TeamFightStats::default();
    let mut ults_in_won = 0u32;
    let mut ults_in_lost = 0u32;

    for fight in analyses {
        stats.total_fights += 1;
        if fight.won {
            stats.fights_won += 1;
            ults_in_won += fight.our_ults_used;
        } else {
            ults_in_lost += fight.our_ults_used;
        }
        if fight.had_first_pick {
            stats.first_pick.add(fight.won);
        }
        if fight.had_first_death {
            stats.first_death.add(fight.won);
        }
        if fight.used_first_ult {
            stats.first_ult.add(fight.won);
        }
        if fight.is_dry_fight {
            stats.dry_fights.add(fight.won);
        }
        stats.ultimates_used += fight.our_ults_used;
        stats.wasted_ultimates += fight.wasted_ults;
    }

    let fights_lost = stats.total_fights - stats.fights_won;
    stats.fight_win_rate = win_rate_percent(stats.fights_won, stats.total_fights);
    stats.ultimate_efficiency = ratio_or_zero(stats.fights_won as f64, stats.ultimates_used as f64);
    stats.avg_ults_in_won_fights = ratio_or_zero(ults_in_won as f64, stats.fights_won as f64);
    stats.avg_ults_in_lost_fights = ratio_or_zero(ults_in_lost as f64, fights_lost as f64);
    stats
}

pub fn team_fight_stats(dataset: &TeamDataset) -> TeamFightStats {
    let analyses = dataset.fight_analyses();
    summarize_fights(analyses.iter().map(|(_, a)| a))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculate::dataset::fixtures::*;
    use crate::models::MapType;

    fn fight(won: bool, first_pick: bool, ults: u32, wasted: u32) -> FightAnalysis {
        FightAnalysis {
            won,
            had_first_pick: first_pick,
            had_first_death: !first_pick,
            our_ults_used: ults,
            is_dry_fight: ults == 0,
            wasted_ults: wasted,
            ..Default::default()
        }
    }

    #[test]
    fn test_summarize_fights() {
        let fights = vec![
            fight(true, true, 2, 0),
            fight(true, true, 0, 0),
            fight(false, false, 1, 1),
            fight(false, true, 3, 2),
        ];

        let stats = summarize_fights(&fights);
        assert_eq!(stats.total_fights, 4);
        assert_eq!(stats.fights_won, 2);
        assert_eq!(stats.fight_win_rate, 50.0);
        assert_eq!(stats.first_pick.fights, 3);
        assert_eq!(stats.first_pick.won, 2);
        assert_eq!(stats.first_death.fights, 1);
        assert_eq!(stats.first_death.won, 0);
        assert_eq!(stats.dry_fights.fights, 1);
        assert_eq!(stats.dry_fights.win_rate, 100.0);
        assert_eq!(stats.ultimates_used, 6);
        assert_eq!(stats.ultimate_efficiency, 2.0 / 6.0);
        assert_eq!(stats.avg_ults_in_won_fights, 1.0);
        assert_eq!(stats.avg_ults_in_lost_fights, 2.0);
        assert_eq!(stats.wasted_ultimates, 3);
    }

    #[test]
    fn test_no_fights() {
        assert_eq!(summarize_fights(&Vec::<FightAnalysis>::new()), TeamFightStats::default());
    }

    #[tokio::test]
    async fn test_fight_stats_from_events() {
        let mut team = TeamBuilder::new();
        let map = team.map((2024, 3, 4), MapType::Control, "Ilios", Some(true), &LINEUP);
        // Fight 1: we pick first and win with one ult.
        team.kill(map, 10.0, US, THEM);
        team.ult(map, 11.0, US);
        team.kill(map, 12.0, US, THEM);
        team.kill(map, 14.0, THEM, US);
        // Fight 2: well past the gap, enemy wins; we stay dry.
        team.kill(map, 60.0, THEM, US);
        team.ult(map, 61.0, THEM);
        team.kill(map, 63.0, THEM, US);

        let stats = team_fight_stats(&team.load().await);
        assert_eq!(stats.total_fights, 2);
        assert_eq!(stats.fights_won, 1);
        assert_eq!(stats.first_pick.fights, 1);
        assert_eq!(stats.first_pick.won, 1);
        assert_eq!(stats.first_death.fights, 1);
        assert_eq!(stats.dry_fights.fights, 1);
        assert_eq!(stats.dry_fights.won, 0);
        assert_eq!(stats.first_ult.fights, 1);
        assert_eq!(stats.ultimate_efficiency, 1.0);
    }
}
