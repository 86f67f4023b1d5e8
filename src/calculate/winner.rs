//! Map winner determination.

use std::cmp::Ordering;

use tracing::debug;

use crate::models::{MapType, MatchStart, ObjectiveCaptured, RoundEnd};

/// Everything needed to decide one map's winner.
#[derive(Debug, Clone, Copy, Default)]
pub struct WinnerInput<'a> {
    pub match_details: Option<&'a MatchStart>,
    pub final_round: Option<&'a RoundEnd>,
    pub team_1_captures: &'a [&'a ObjectiveCaptured],
    pub team_2_captures: &'a [&'a ObjectiveCaptured],
}

/// Split a map's captures by which side's name captured them.
///
/// Captures credited to neither name are dropped.
pub fn partition_captures<'a>(
    match_details: &MatchStart,
    captures: impl IntoIterator<Item = &'a ObjectiveCaptured>,
) -> (Vec<&'a ObjectiveCaptured>, Vec<&'a ObjectiveCaptured>) {
    let mut team_1 = Vec::new();
    let mut team_2 = Vec::new();
    for capture in captures {
        if capture.capturing_team == match_details.team_1_name {
            team_1.push(capture);
        } else if capture.capturing_team == match_details.team_2_name {
            team_2.push(capture);
        }
    }
    (team_1, team_2)
}

/// Decide which team name won the map.
///
/// `None` means the winner cannot be determined: missing match details or
/// final round, a Push map, or a tie on both score and captures. Callers must
/// drop such maps from win/loss math rather than count them as losses.
pub fn calculate_winner(input: &WinnerInput<'_>) -> Option<String> {
    let details = input.match_details?;

    if details.map_type == MapType::Push {
        debug!(map_id = %details.map_id, "winner undefined for push map");
        return None;
    }

    let round = input.final_round?;

    match round.team_1_score.cmp(&round.team_2_score) {
        Ordering::Greater => return Some(details.team_1_name.clone()),
        Ordering::Less => return Some(details.team_2_name.clone()),
        Ordering::Equal => {}
    }

    match input.team_1_captures.len().cmp(&input.team_2_captures.len()) {
        Ordering::Greater => Some(details.team_1_name.clone()),
        Ordering::Less => Some(details.team_2_name.clone()),
        Ordering::Equal => {
            debug!(map_id = %details.map_id, "score and captures tied, no winner");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MapId;

    fn details(map_type: MapType) -> MatchStart {
        MatchStart {
            map_id: MapId(1),
            match_time: 0.0,
            map_name: "Test".to_string(),
            map_type,
            team_1_name: "Alpha".to_string(),
            team_2_name: "Bravo".to_string(),
        }
    }

    fn round(team_1_score: u32, team_2_score: u32) -> RoundEnd {
        RoundEnd {
            map_id: MapId(1),
            round_number: 3,
            team_1_score,
            team_2_score,
            ..Default::default()
        }
    }

    fn capture(team: &str) -> ObjectiveCaptured {
        ObjectiveCaptured {
            map_id: MapId(1),
            capturing_team: team.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_higher_score_wins() {
        let d = details(MapType::Escort);
        let r = round(3, 2);
        let input = WinnerInput {
            match_details: Some(&d),
            final_round: Some(&r),
            ..Default::default()
        };

        assert_eq!(calculate_winner(&input), Some("Alpha".to_string()));
    }

    #[test]
    fn test_team_2_wins() {
        let d = details(MapType::Control);
        let r = round(0, 2);
        let input = WinnerInput {
            match_details: Some(&d),
            final_round: Some(&r),
            ..Default::default()
        };

        assert_eq!(calculate_winner(&input), Some("Bravo".to_string()));
    }

    #[test]
    fn test_tie_broken_by_captures() {
        let d = details(MapType::Hybrid);
        let r = round(2, 2);
        let a1 = capture("Alpha");
        let a2 = capture("Alpha");
        let b1 = capture("Bravo");
        let input = WinnerInput {
            match_details: Some(&d),
            final_round: Some(&r),
            team_1_captures: &[&a1, &a2],
            team_2_captures: &[&b1],
        };

        assert_eq!(calculate_winner(&input), Some("Alpha".to_string()));
    }

    #[test]
    fn test_full_tie_is_undetermined() {
        let d = details(MapType::Control);
        let r = round(1, 1);
        let a1 = capture("Alpha");
        let b1 = capture("Bravo");
        let input = WinnerInput {
            match_details: Some(&d),
            final_round: Some(&r),
            team_1_captures: &[&a1],
            team_2_captures: &[&b1],
        };

        assert_eq!(calculate_winner(&input), None);
        // Same input, same answer.
        assert_eq!(calculate_winner(&input), calculate_winner(&input));
    }

    #[test]
    fn test_missing_inputs_are_undetermined() {
        let d = details(MapType::Escort);
        let r = round(3, 0);

        let no_details = WinnerInput {
            final_round: Some(&r),
            ..Default::default()
        };
        assert_eq!(calculate_winner(&no_details), None);

        let no_round = WinnerInput {
            match_details: Some(&d),
            ..Default::default()
        };
        assert_eq!(calculate_winner(&no_round), None);
    }

    #[test]
    fn test_push_is_unsupported() {
        let d = details(MapType::Push);
        let r = round(3, 0);
        let input = WinnerInput {
            match_details: Some(&d),
            final_round: Some(&r),
            ..Default::default()
        };

        assert_eq!(calculate_winner(&input), None);
    }

    #[test]
    fn test_partition_captures() {
        let d = details(MapType::Control);
        let caps = vec![capture("Alpha"), capture("Bravo"), capture("Alpha"), capture("Charlie")];

        let (team_1, team_2) = partition_captures(&d, &caps);
        assert_eq!(team_1.len(), 2);
        assert_eq!(team_2.len(), 1);
    }
}
