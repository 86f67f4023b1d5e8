//! Team-scoped analytics endpoints.
//!
//! Every view except the roster loads one [`TeamDataset`] under the request
//! deadline and renders it. A team with no maps answers `"empty"`.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::api::state::AppState;
use crate::api::{ApiError, Envelope};
use crate::calculate::fight_stats::{team_fight_stats, TeamFightStats};
use crate::calculate::hero_pool::{hero_pool_analysis, HeroPoolAnalysis};
use crate::calculate::map_modes::{map_mode_performance, MapModeAnalysis};
use crate::calculate::overview::{team_overview, TeamOverview};
use crate::calculate::quick_wins::{quick_wins as quick_wins_view, QuickWins};
use crate::calculate::report::{team_report, TeamReport};
use crate::calculate::roles::{role_balance_analysis, role_performance_stats, RoleBalance, RolePerformance};
use crate::calculate::roster::resolve_roster;
use crate::calculate::trends::{performance_trends, PerformanceTrends, TrendPeriod};
use crate::calculate::trios::{best_role_trios, RoleTrio};
use crate::calculate::TeamDataset;
use crate::models::TeamId;

type TeamResponse<T> = Result<Json<Envelope<T>>, ApiError>;

async fn load_team(state: &AppState, team_id: TeamId) -> Result<TeamDataset, ApiError> {
    let ctx = state.context();
    Ok(state.deadline(TeamDataset::load(&ctx, team_id)).await?)
}

/// Render a view over the team's dataset.
async fn team_view<T>(
    state: &AppState,
    team_id: TeamId,
    view: impl FnOnce(&TeamDataset) -> T,
) -> TeamResponse<T> {
    let dataset = load_team(state, team_id).await?;
    let is_empty = dataset.maps.is_empty();
    Ok(Json(Envelope::new(view(&dataset), is_empty)))
}

// ── Roster ──────────────────────────────────────────────────────

pub async fn roster(
    State(state): State<AppState>,
    Path(team_id): Path<TeamId>,
) -> TeamResponse<Vec<String>> {
    let ctx = state.context();
    let roster = state.deadline(resolve_roster(&ctx, team_id)).await?;
    let names: Vec<String> = roster.iter().cloned().collect();
    let is_empty = names.is_empty();
    Ok(Json(Envelope::new(names, is_empty)))
}

// ── Views ───────────────────────────────────────────────────────

pub async fn overview(
    State(state): State<AppState>,
    Path(team_id): Path<TeamId>,
) -> TeamResponse<TeamOverview> {
    team_view(&state, team_id, team_overview).await
}

pub async fn roles(
    State(state): State<AppState>,
    Path(team_id): Path<TeamId>,
) -> TeamResponse<Vec<RolePerformance>> {
    team_view(&state, team_id, role_performance_stats).await
}

pub async fn role_balance(
    State(state): State<AppState>,
    Path(team_id): Path<TeamId>,
) -> TeamResponse<RoleBalance> {
    team_view(&state, team_id, |d| role_balance_analysis(&role_performance_stats(d))).await
}

pub async fn hero_pool(
    State(state): State<AppState>,
    Path(team_id): Path<TeamId>,
) -> TeamResponse<HeroPoolAnalysis> {
    team_view(&state, team_id, hero_pool_analysis).await
}

pub async fn map_modes(
    State(state): State<AppState>,
    Path(team_id): Path<TeamId>,
) -> TeamResponse<MapModeAnalysis> {
    team_view(&state, team_id, map_mode_performance).await
}

#[derive(Debug, Deserialize)]
pub struct TrendsParams {
    pub period: Option<String>,
}

impl TrendsParams {
    fn period(&self) -> Result<TrendPeriod, ApiError> {
        match self.period.as_deref() {
            Some(raw) => raw.parse().map_err(ApiError::BadRequest),
            None => Ok(TrendPeriod::default()),
        }
    }
}

pub async fn trends(
    State(state): State<AppState>,
    Path(team_id): Path<TeamId>,
    Query(params): Query<TrendsParams>,
) -> TeamResponse<PerformanceTrends> {
    let period = params.period()?;
    team_view(&state, team_id, |d| performance_trends(d, period)).await
}

pub async fn quick_wins(
    State(state): State<AppState>,
    Path(team_id): Path<TeamId>,
) -> TeamResponse<QuickWins> {
    team_view(&state, team_id, quick_wins_view).await
}

pub async fn trios(
    State(state): State<AppState>,
    Path(team_id): Path<TeamId>,
) -> TeamResponse<Vec<RoleTrio>> {
    team_view(&state, team_id, best_role_trios).await
}

pub async fn fights(
    State(state): State<AppState>,
    Path(team_id): Path<TeamId>,
) -> TeamResponse<TeamFightStats> {
    team_view(&state, team_id, team_fight_stats).await
}

// ── Report ──────────────────────────────────────────────────────

pub async fn report(
    State(state): State<AppState>,
    Path(team_id): Path<TeamId>,
    Query(params): Query<TrendsParams>,
) -> TeamResponse<TeamReport> {
    let period = params.period()?;
    team_view(&state, team_id, |d| team_report(d, period)).await
}
