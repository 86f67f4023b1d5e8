//! Team fight reconstruction.
//!
//! A map's kills, resurrections and ultimate casts are one interleaved
//! stream. Fights are recovered by cutting that stream wherever nothing
//! happens for longer than [`FIGHT_GAP_SECONDS`].

use serde::Serialize;

use crate::models::{FightEvent, Kill, MercyRez, UltimateStart};

/// Idle time that ends a fight.
pub const FIGHT_GAP_SECONDS: f64 = 15.0;

/// Running kill differential at or below which an ultimate counts as wasted.
/// A heuristic threshold, not a measured one.
pub const WASTED_ULT_DIFF: i32 = -3;

/// A contiguous cluster of events.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fight {
    pub start: f64,
    pub end: f64,
    pub events: Vec<FightEvent>,
}

impl Fight {
    fn open(event: FightEvent) -> Self {
        let t = event.match_time();
        Self {
            start: t,
            end: t,
            events: vec![event],
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// How one fight went for one team.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FightAnalysis {
    pub our_kills: u32,
    pub enemy_kills: u32,
    pub won: bool,
    pub had_first_pick: bool,
    pub had_first_death: bool,
    pub used_first_ult: bool,
    pub is_dry_fight: bool,
    pub our_ults_used: u32,
    pub enemy_ults_used: u32,
    pub wasted_ults: u32,
    pub duration: f64,
}

/// Merge a map's event tables into one stream, in arrival order.
pub fn collect_events(
    kills: impl IntoIterator<Item = Kill>,
    rezzes: impl IntoIterator<Item = MercyRez>,
    ultimates: impl IntoIterator<Item = UltimateStart>,
) -> Vec<FightEvent> {
    kills
        .into_iter()
        .map(FightEvent::from)
        .chain(rezzes.into_iter().map(FightEvent::from))
        .chain(ultimates.into_iter().map(FightEvent::from))
        .collect()
}

/// Cluster events into fights.
///
/// Events are stably sorted by match time; a new fight starts whenever an
/// event comes more than [`FIGHT_GAP_SECONDS`] after the current fight's last
/// event. Single greedy pass, no merging or splitting afterwards.
pub fn reconstruct_fights(mut events: Vec<FightEvent>) -> Vec<Fight> {
    events.sort_by(|a, b| a.match_time().total_cmp(&b.match_time()));

    let mut fights: Vec<Fight> = Vec::new();
    for event in events {
        let t = event.match_time();
        match fights.last_mut() {
            Some(current) if t - current.end <= FIGHT_GAP_SECONDS => {
                current.end = t;
                current.events.push(event);
            }
            _ => fights.push(Fight::open(event)),
        }
    }
    fights
}

/// Analyse a fight from the point of view of `our_team`.
pub fn analyze_fight_outcome(fight: &Fight, our_team: &str) -> FightAnalysis {
    let mut analysis = FightAnalysis {
        duration: fight.duration(),
        ..Default::default()
    };
    let mut first_kill_seen = false;
    let mut first_ult_seen = false;

    for event in &fight.events {
        match event {
            FightEvent::Kill(kill) => {
                let ours = kill.attacker_team == our_team;
                if ours {
                    analysis.our_kills += 1;
                } else {
                    analysis.enemy_kills += 1;
                }
                if !first_kill_seen {
                    first_kill_seen = true;
                    analysis.had_first_pick = ours;
                    analysis.had_first_death = kill.victim_team == our_team;
                }
            }
            FightEvent::MercyRez(rez) => {
                // The revived player is no longer dead: undo one kill
                // against the resurrecting side.
                if rez.resurrecter_team == our_team {
                    analysis.enemy_kills = analysis.enemy_kills.saturating_sub(1);
                } else {
                    analysis.our_kills = analysis.our_kills.saturating_sub(1);
                }
            }
            FightEvent::UltimateStart(ult) => {
                let ours = ult.player_team == our_team;
                if !first_ult_seen {
                    first_ult_seen = true;
                    analysis.used_first_ult = ours;
                }
                if ours {
                    analysis.our_ults_used += 1;
                    let diff = analysis.our_kills as i32 - analysis.enemy_kills as i32;
                    if diff <= WASTED_ULT_DIFF {
                        analysis.wasted_ults += 1;
                    }
                } else {
                    analysis.enemy_ults_used += 1;
                }
            }
        }
    }

    analysis.won = analysis.our_kills > analysis.enemy_kills;
    analysis.is_dry_fight = analysis.our_ults_used == 0;
    analysis
}
