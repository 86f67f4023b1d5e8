//! Role performance and role balance.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use super::{per_ten, ratio_or_zero, TeamDataset};
use crate::models::{role_for_hero, BalanceRating, MapId, Role};

/// Summed roster stats for one role.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RolePerformance {
    pub role: Option<Role>,
    pub maps_played: u32,
    pub time_played: f64,
    pub eliminations: f64,
    pub final_blows: f64,
    pub deaths: f64,
    pub hero_damage_dealt: f64,
    pub healing_dealt: f64,
    pub damage_taken: f64,
    pub damage_blocked: f64,
    pub ultimates_earned: f64,
    pub ultimates_used: f64,
    pub eliminations_per10: f64,
    pub final_blows_per10: f64,
    pub deaths_per10: f64,
    pub hero_damage_per10: f64,
    pub healing_per10: f64,
    pub damage_taken_per10: f64,
    /// Final blows per death, zero without deaths.
    pub kd_ratio: f64,
}

impl RolePerformance {
    fn empty(role: Role) -> Self {
        Self {
            role: Some(role),
            ..Default::default()
        }
    }

    fn finish(&mut self) {
        let t = self.time_played;
        self.eliminations_per10 = per_ten(self.eliminations, t);
        self.final_blows_per10 = per_ten(self.final_blows, t);
        self.deaths_per10 = per_ten(self.deaths, t);
        self.hero_damage_per10 = per_ten(self.hero_damage_dealt, t);
        self.healing_per10 = per_ten(self.healing_dealt, t);
        self.damage_taken_per10 = per_ten(self.damage_taken, t);
        self.kd_ratio = ratio_or_zero(self.final_blows, self.deaths);
    }
}

/// Per-role totals across all of the team's maps, always one entry per role
/// in [`Role::ALL`] order.
pub fn role_performance_stats(dataset: &TeamDataset) -> Vec<RolePerformance> {
    let mut by_role: BTreeMap<Role, RolePerformance> =
        Role::ALL.iter().map(|r| (*r, RolePerformance::empty(*r))).collect();
    let mut maps_seen: HashSet<(Role, MapId)> = HashSet::new();

    for facts in &dataset.maps {
        for row in dataset.roster_segments(facts.map_id) {
            let Some(role) = role_for_hero(&row.player_hero) else {
                continue;
            };
            let Some(perf) = by_role.get_mut(&role) else {
                continue;
            };
            if maps_seen.insert((role, row.map_id)) {
                perf.maps_played += 1;
            }
            perf.time_played += row.hero_time_played;
            perf.eliminations += row.eliminations;
            perf.final_blows += row.final_blows;
            perf.deaths += row.deaths;
            perf.hero_damage_dealt += row.hero_damage_dealt;
            perf.healing_dealt += row.healing_dealt;
            perf.damage_taken += row.damage_taken;
            perf.damage_blocked += row.damage_blocked;
            perf.ultimates_earned += row.ultimates_earned;
            perf.ultimates_used += row.ultimates_used;
        }
    }

    Role::ALL
        .iter()
        .filter_map(|role| by_role.remove(role))
        .map(|mut perf| {
            perf.finish();
            perf
        })
        .collect()
}

/// Normalized sub-scores and composite for one role.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleScore {
    pub role: Role,
    pub kd_score: f64,
    pub survival_score: f64,
    pub ult_efficiency_score: f64,
    pub activity_score: f64,
    pub composite: f64,
    pub is_heavy: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleBalance {
    pub roles: Vec<RoleScore>,
    pub balance_score: f64,
    pub rating: BalanceRating,
    pub heavy_roles: Vec<Role>,
}

impl Default for RoleBalance {
    fn default() -> Self {
        Self {
            roles: Vec::new(),
            balance_score: 0.0,
            rating: BalanceRating::NeedsImprovement,
            heavy_roles: Vec::new(),
        }
    }
}

const KD_CAP: f64 = 2.0;
const ULT_EFFICIENCY_CAP: f64 = 3.0;
const ACTIVITY_CAP_SECONDS: f64 = 3600.0;
const HEAVY_ROLE_SCORE: f64 = 0.7;
const HEAVY_ROLE_MAX_BALANCE: f64 = 0.6;

fn score_role(perf: &RolePerformance, role: Role) -> RoleScore {
    if perf.time_played <= 0.0 {
        return RoleScore {
            role,
            kd_score: 0.0,
            survival_score: 0.0,
            ult_efficiency_score: 0.0,
            activity_score: 0.0,
            composite: 0.0,
            is_heavy: false,
        };
    }

    let kd_score = perf.kd_ratio.min(KD_CAP) / KD_CAP;
    let survival_score = (1.0 - perf.deaths_per10 / 2.0).max(0.0);
    let ult_efficiency = ratio_or_zero(perf.eliminations, perf.ultimates_used);
    let ult_efficiency_score = ult_efficiency.min(ULT_EFFICIENCY_CAP) / ULT_EFFICIENCY_CAP;
    let activity_score = perf.time_played.min(ACTIVITY_CAP_SECONDS) / ACTIVITY_CAP_SECONDS;
    let composite = (kd_score + survival_score + ult_efficiency_score + activity_score) / 4.0;

    RoleScore {
        role,
        kd_score,
        survival_score,
        ult_efficiency_score,
        activity_score,
        composite,
        is_heavy: false,
    }
}

/// Score each role and measure how even they are.
///
/// A role never played scores zero and counts toward the spread. With no
/// playtime at all the empty result is returned.
pub fn role_balance_analysis(performance: &[RolePerformance]) -> RoleBalance {
    let mut roles: Vec<RoleScore> = performance
        .iter()
        .filter_map(|perf| perf.role.map(|role| score_role(perf, role)))
        .collect();

    if performance.iter().all(|p| p.time_played <= 0.0) || roles.is_empty() {
        return RoleBalance::default();
    }

    let max = roles.iter().map(|r| r.composite).fold(f64::MIN, f64::max);
    let min = roles.iter().map(|r| r.composite).fold(f64::MAX, f64::min);
    let balance_score = 1.0 - (max - min);

    let mut heavy_roles = Vec::new();
    for score in roles.iter_mut() {
        score.is_heavy = score.composite > HEAVY_ROLE_SCORE && balance_score < HEAVY_ROLE_MAX_BALANCE;
        if score.is_heavy {
            heavy_roles.push(score.role);
        }
    }

    RoleBalance {
        roles,
        balance_score,
        rating: BalanceRating::from_score(balance_score),
        heavy_roles,
    }
}
