//! Team roster inference.
//!
//! Team names in stat rows are free text and can change between maps, so a
//! team's roster is inferred from who keeps showing up together. The most
//! frequent player (the anchor) pins down which side-name belongs to the team
//! on each map, and everyone playing under that name joins the roster.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, instrument};

use super::{AnalyticsError, RequestContext};
use crate::models::{MapId, PlayerStatRow, TeamId};

/// Players ordered by number of maps they appeared on, most first.
/// Ties keep first-encountered order.
pub fn players_by_frequency(rows: &[PlayerStatRow]) -> Vec<(String, u32)> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, u32> = HashMap::new();
    let mut seen_on_map: HashSet<(MapId, &str)> = HashSet::new();

    for row in rows {
        if !seen_on_map.insert((row.map_id, row.player_name.as_str())) {
            continue;
        }
        let count = counts.entry(row.player_name.clone()).or_insert_with(|| {
            order.push(row.player_name.clone());
            0
        });
        *count += 1;
    }

    let mut ranked: Vec<(String, u32)> = order
        .into_iter()
        .map(|name| {
            let count = counts[&name];
            (name, count)
        })
        .collect();
    // Stable, so equal counts stay in first-encountered order.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

/// Infer a roster from every stat row of the team's maps.
pub fn resolve_roster_from_rows(rows: &[PlayerStatRow]) -> BTreeSet<String> {
    let ranked = players_by_frequency(rows);
    if ranked.is_empty() {
        return BTreeSet::new();
    }

    let mut rows_by_map: BTreeMap<MapId, Vec<&PlayerStatRow>> = BTreeMap::new();
    for row in rows {
        rows_by_map.entry(row.map_id).or_default().push(row);
    }

    let mut roster = BTreeSet::new();
    for (map_id, map_rows) in &rows_by_map {
        // The anchor decides the side when present. Otherwise the next most
        // frequent player on this map does, which can pick the wrong side if
        // that player switched teams between scrims. Kept as-is: there is no
        // stable team identifier to do better with.
        let side_name = ranked.iter().find_map(|(name, _)| {
            map_rows
                .iter()
                .find(|r| &r.player_name == name)
                .map(|r| r.player_team.as_str())
        });

        let Some(side_name) = side_name else {
            continue;
        };
        debug!(%map_id, side_name, "resolved side name");

        roster.extend(
            map_rows
                .iter()
                .filter(|r| r.player_team == side_name)
                .map(|r| r.player_name.clone()),
        );
    }

    roster
}

/// Resolve a team's roster from the store. Memoized per request.
#[instrument(skip(ctx), fields(request = %ctx.id()))]
pub async fn resolve_roster(
    ctx: &RequestContext,
    team_id: TeamId,
) -> Result<Arc<BTreeSet<String>>, AnalyticsError> {
    ctx.roster(team_id, || async {
        let maps = ctx.maps_for_team(team_id).await?;
        if maps.is_empty() {
            return Ok(Arc::new(BTreeSet::new()));
        }

        let map_ids: Vec<MapId> = maps.iter().map(|m| m.id).collect();
        let rows = ctx.player_stats_for_maps(&map_ids).await?;
        let roster = resolve_roster_from_rows(&rows);
        debug!(maps = map_ids.len(), players = roster.len(), "roster resolved");
        Ok(Arc::new(roster))
    })
    .await
}
