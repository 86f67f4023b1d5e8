//! Core data models: raw store rows and shared derived types.

mod events;
mod hero;
mod ids;
mod match_info;
mod player_stat;
mod scrim;
mod stats;

pub use events::*;
pub use hero::*;
pub use ids::*;
pub use match_info::*;
pub use player_stat::*;
pub use scrim::*;
pub use stats::*;
