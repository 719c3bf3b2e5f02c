use serde::{Deserialize, Serialize};
use std::fmt;

/// Server tick rate of the recorded match.
pub const TICKS_PER_SECOND: u32 = 64;

/// Per-match player identifier (the `userid` keys of the roster).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u32);

impl PlayerId {
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for PlayerId {
    fn from(v: u32) -> Self {
        PlayerId(v)
    }
}

/// A server tick number as recorded in the log.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tick(pub u32);

impl Tick {
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Seconds elapsed between `origin` and this tick. Negative if this tick
    /// comes before `origin`.
    pub fn seconds_since(self, origin: Tick) -> f64 {
        (self.0 as i64 - origin.0 as i64) as f64 / TICKS_PER_SECOND as f64
    }

    /// Ticks elapsed since `origin`, saturating at zero.
    pub fn ticks_since(self, origin: Tick) -> u32 {
        self.0.saturating_sub(origin.0)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for Tick {
    fn from(v: u32) -> Self {
        Tick(v)
    }
}

/// World-space position on the map plane, in game units.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldPos {
    pub x: f32,
    pub y: f32,
}

impl WorldPos {
    pub const ORIGIN: WorldPos = WorldPos { x: 0.0, y: 0.0 };
}

/// Which team a player is rendered as.
///
/// The log encodes teams as raw integers (2 and 3) and bots with a `"BOT"`
/// identity; both are converted once at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Team code 3 (attackers).
    SideA,
    /// Team code 2 (defenders).
    SideB,
    Bot,
    /// A human player without a team code, or with one outside {2, 3}.
    Unassigned,
}

impl Side {
    pub const SIDE_B_CODE: i64 = 2;
    pub const SIDE_A_CODE: i64 = 3;

    /// Convert a raw team code. Anything other than 2 or 3 is unassigned.
    pub fn from_code(code: i64) -> Side {
        match code {
            Self::SIDE_A_CODE => Side::SideA,
            Self::SIDE_B_CODE => Side::SideB,
            _ => Side::Unassigned,
        }
    }

    /// True for players on one of the two playing teams.
    pub fn is_team(self) -> bool {
        matches!(self, Side::SideA | Side::SideB)
    }

    /// The opposing side. Bots and unassigned players never swap.
    pub fn swapped(self) -> Side {
        match self {
            Side::SideA => Side::SideB,
            Side::SideB => Side::SideA,
            other => other,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Side::SideA => "side A",
            Side::SideB => "side B",
            Side::Bot => "bot",
            Side::Unassigned => "unassigned",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_codes_map_to_teams() {
        assert_eq!(Side::from_code(2), Side::SideB);
        assert_eq!(Side::from_code(3), Side::SideA);
        assert_eq!(Side::from_code(1), Side::Unassigned);
    }

    #[test]
    fn only_teams_swap() {
        assert_eq!(Side::SideA.swapped(), Side::SideB);
        assert_eq!(Side::SideB.swapped(), Side::SideA);
        assert_eq!(Side::Bot.swapped(), Side::Bot);
        assert_eq!(Side::Unassigned.swapped(), Side::Unassigned);
    }

    #[test]
    fn seconds_since_uses_tick_rate() {
        assert_eq!(Tick(1064).seconds_since(Tick(1000)), 1.0);
        assert_eq!(Tick(1000).seconds_since(Tick(1000)), 0.0);
        assert_eq!(Tick(968).seconds_since(Tick(1000)), -0.5);
        assert_eq!(Tick(10).ticks_since(Tick(20)), 0);
    }
}
