//! Every team view in one document.

use serde::Serialize;

use super::fight_stats::{team_fight_stats, TeamFightStats};
use super::hero_pool::{hero_pool_analysis, HeroPoolAnalysis};
use super::map_modes::{map_mode_performance, MapModeAnalysis};
use super::overview::{team_overview, TeamOverview};
use super::quick_wins::{quick_wins, QuickWins};
use super::roles::{role_balance_analysis, role_performance_stats, RoleBalance, RolePerformance};
use super::trends::{performance_trends, PerformanceTrends, TrendPeriod};
use super::trios::{best_role_trios, RoleTrio};
use super::TeamDataset;

#[derive(Debug, Clone, Serialize)]
pub struct TeamReport {
    pub overview: TeamOverview,
    pub roles: Vec<RolePerformance>,
    pub role_balance: RoleBalance,
    pub hero_pool: HeroPoolAnalysis,
    pub map_modes: MapModeAnalysis,
    pub trends: PerformanceTrends,
    pub quick_wins: QuickWins,
    pub trios: Vec<RoleTrio>,
    pub fights: TeamFightStats,
}

pub fn team_report(dataset: &TeamDataset, period: TrendPeriod) -> TeamReport {
    let roles = role_performance_stats(dataset);
    TeamReport {
        overview: team_overview(dataset),
        role_balance: role_balance_analysis(&roles),
        roles,
        hero_pool: hero_pool_analysis(dataset),
        map_modes: map_mode_performance(dataset),
        trends: performance_trends(dataset, period),
        quick_wins: quick_wins(dataset),
        trios: best_role_trios(dataset),
        fights: team_fight_stats(dataset),
    }
}
