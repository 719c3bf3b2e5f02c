mod error;
pub mod match_data;
pub mod types;

pub use error::*;
pub use match_data::{KillEvent, MatchData, RosterEntry, RoundEvent, TickFrame};
