use axum::extract::{Path, State};
use axum::Json;

use crate::api::state::AppState;
use crate::api::{ApiError, Envelope};
use crate::calculate::mvp::{calculate_mvp_score, get_mvp_for_map, MvpQuery, MvpScoreResult};
use crate::models::MapId;

/// Highest scoring player on a map.
pub async fn map_mvp(
    State(state): State<AppState>,
    Path(map_id): Path<MapId>,
) -> Result<Json<Envelope<Option<MvpScoreResult>>>, ApiError> {
    let ctx = state.context();
    let thresholds = state.config.analytics.mvp_thresholds();
    let mvp = state
        .deadline(get_mvp_for_map(&ctx, map_id, thresholds))
        .await?;
    Ok(Json(Envelope::from_option(mvp)))
}

/// MVP score for one player. 404 when the player has no rows on the map.
pub async fn player_mvp(
    State(state): State<AppState>,
    Path((map_id, player)): Path<(MapId, String)>,
) -> Result<Json<Envelope<Option<MvpScoreResult>>>, ApiError> {
    let ctx = state.context();
    let query = MvpQuery::new(map_id, player.clone())
        .with_thresholds(state.config.analytics.mvp_thresholds());

    // Outer None: player not on the map.
    let scored = state
        .deadline(async {
            let names = ctx.player_names_on_map(map_id).await?;
            if !names.iter().any(|name| *name == player) {
                return Ok(None);
            }
            calculate_mvp_score(&ctx, &query).await.map(Some)
        })
        .await?;

    match scored {
        Some(score) => Ok(Json(Envelope::from_option(score))),
        None => Err(ApiError::NotFound(format!(
            "player {} on map {}",
            player, map_id
        ))),
    }
}

#[cfg(test)]
mod tests {
    use crate::api::routes::test_support::*;
    use crate::calculate::dataset::fixtures::*;
    use crate::config::AppConfig;
    use crate::models::{MapId, MapType};
    use crate::storage::{MemoryStore, Tables};
    use axum::http::StatusCode;

    /// Three maps plus rival Ana players so healing has a spread.
    fn tables() -> Tables {
        let mut team = TeamBuilder::new();
        for day in 4..=6 {
            team.map((2024, 3, day), MapType::Control, "Ilios", Some(true), &LINEUP);
        }
        for (i, healing) in [600.0, 800.0, 1400.0].into_iter().enumerate() {
            let mut row = stat_row(MapId(i as i64 + 1), THEM, &format!("rival{}", i), "Ana", 600.0);
            row.healing_dealt = healing;
            team.tables.player_stats.push(row);
        }
        team.tables
    }

    fn config() -> AppConfig {
        let mut config = AppConfig::default();
        config.analytics.mvp_min_maps = 1;
        config.analytics.mvp_min_time_seconds = 60.0;
        config
    }

    #[tokio::test]
    async fn test_map_mvp() {
        let app = app_with(MemoryStore::new(tables()), config());
        let (status, json) = get_json(app, "/api/maps/1/mvp").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert!(json["data"]["total_score"].is_number());
    }

    #[tokio::test]
    async fn test_player_mvp() {
        let app = app_with(MemoryStore::new(tables()), config());
        let (status, json) = get_json(app, "/api/maps/1/players/sup1/mvp").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["player_name"], "sup1");
        assert_eq!(json["data"]["hero"], "Ana");
    }

    #[tokio::test]
    async fn test_player_not_on_map() {
        let app = app_with(MemoryStore::new(tables()), config());
        let (status, json) = get_json(app, "/api/maps/1/players/nobody/mvp").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_no_population_is_empty() {
        // Default thresholds: nobody has ten maps on a hero.
        let (status, json) = get_json(app(tables()), "/api/maps/1/mvp").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "empty");
        assert!(json["data"].is_null());
    }

    #[tokio::test]
    async fn test_map_mvp_store_failure() {
        let (status, _) = get_json(failing_app(), "/api/maps/1/mvp").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
