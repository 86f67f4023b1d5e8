//! Static hero roster and role assignments.

use serde::{Deserialize, Serialize};

/// Overwatch role a hero belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    Tank,
    Damage,
    Support,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Tank, Role::Damage, Role::Support];
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Tank => write!(f, "Tank"),
            Role::Damage => write!(f, "Damage"),
            Role::Support => write!(f, "Support"),
        }
    }
}

/// Total number of heroes in the pool, used for diversity scoring.
pub const TOTAL_HEROES: usize = 41;

static HEROES: [(&str, Role); TOTAL_HEROES] = [
    ("D.Va", Role::Tank),
    ("Doomfist", Role::Tank),
    ("Junker Queen", Role::Tank),
    ("Mauga", Role::Tank),
    ("Orisa", Role::Tank),
    ("Ramattra", Role::Tank),
    ("Reinhardt", Role::Tank),
    ("Roadhog", Role::Tank),
    ("Sigma", Role::Tank),
    ("Winston", Role::Tank),
    ("Wrecking Ball", Role::Tank),
    ("Zarya", Role::Tank),
    ("Ashe", Role::Damage),
    ("Bastion", Role::Damage),
    ("Cassidy", Role::Damage),
    ("Echo", Role::Damage),
    ("Genji", Role::Damage),
    ("Hanzo", Role::Damage),
    ("Junkrat", Role::Damage),
    ("Mei", Role::Damage),
    ("Pharah", Role::Damage),
    ("Reaper", Role::Damage),
    ("Sojourn", Role::Damage),
    ("Soldier: 76", Role::Damage),
    ("Sombra", Role::Damage),
    ("Symmetra", Role::Damage),
    ("Torbjörn", Role::Damage),
    ("Tracer", Role::Damage),
    ("Venture", Role::Damage),
    ("Widowmaker", Role::Damage),
    ("Ana", Role::Support),
    ("Baptiste", Role::Support),
    ("Brigitte", Role::Support),
    ("Illari", Role::Support),
    ("Juno", Role::Support),
    ("Kiriko", Role::Support),
    ("Lifeweaver", Role::Support),
    ("Lúcio", Role::Support),
    ("Mercy", Role::Support),
    ("Moira", Role::Support),
    ("Zenyatta", Role::Support),
];

/// Look up a hero's role. Matching ignores case and surrounding whitespace.
pub fn role_for_hero(hero: &str) -> Option<Role> {
    let hero = hero.trim().to_lowercase();
    HEROES
        .iter()
        .find(|(name, _)| name.to_lowercase() == hero)
        .map(|(_, role)| *role)
}
