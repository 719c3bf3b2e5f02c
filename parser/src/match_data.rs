use std::collections::HashMap;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::{ErrorKind, Section};
use crate::types::{PlayerId, Side, Tick, WorldPos};

/// Identity string the recorder writes for bot players.
const BOT_IDENTITY: &str = "BOT";

/// One player from the roster section.
#[derive(Debug, Clone, PartialEq)]
pub struct RosterEntry {
    pub id: PlayerId,
    /// Network identity of the player, `"BOT"` for bots.
    pub identity: String,
    pub name: String,
    /// Side as recorded in the roster. The rendered side changes on side swaps.
    pub side: Side,
    /// Display number shown on the player's tag and list entry.
    /// Only team members are numbered.
    pub number: Option<u32>,
    /// Position of the player within its team's list.
    pub slot: Option<u32>,
}

/// Round state recorded at a round boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundEvent {
    /// Match phase identifier. A change between events marks a side swap.
    pub phase: i64,
    pub score_a: i64,
    pub score_b: i64,
}

/// A single kill from the kill feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KillEvent {
    pub victim: PlayerId,
    /// `PlayerId(0)` for world kills.
    pub attacker: PlayerId,
    pub assister: Option<PlayerId>,
    pub weapon: String,
    pub headshot: bool,
    pub wallbang: bool,
}

/// Positions of every player recorded at one tick. Players who are dead or
/// disconnected are simply absent.
#[derive(Debug, Clone, Default)]
pub struct TickFrame {
    pub tick: Tick,
    pub positions: HashMap<PlayerId, WorldPos>,
}

impl TickFrame {
    pub fn position(&self, player: PlayerId) -> Option<WorldPos> {
        self.positions.get(&player).copied()
    }
}

/// A fully decoded match log.
///
/// The order of `frames` is the authoritative tick sequence for playback.
#[derive(Debug, Clone, Default)]
pub struct MatchData {
    roster: Vec<RosterEntry>,
    rounds: HashMap<Tick, RoundEvent>,
    kills: HashMap<Tick, Vec<KillEvent>>,
    frames: Vec<TickFrame>,
}

impl MatchData {
    pub fn from_file(path: &Path) -> Result<Self, ErrorKind> {
        let bytes = std::fs::read(path)?;
        Self::from_slice(&bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, ErrorKind> {
        let document: Value = serde_json::from_slice(bytes)?;
        Self::from_value(document)
    }

    /// Decode the 4-section document `[players, rounds, kill_feed, positions]`.
    pub fn from_value(document: Value) -> Result<Self, ErrorKind> {
        let Value::Array(sections) = document else {
            return Err(ErrorKind::NotAnArray);
        };
        let [players, rounds, kills, positions]: [Value; 4] = sections
            .try_into()
            .map_err(|sections: Vec<Value>| ErrorKind::SectionCount {
                found: sections.len(),
            })?;

        let roster = decode_players(expect_object(Section::Players, players)?)?;
        let rounds = decode_rounds(expect_object(Section::Rounds, rounds)?)?;
        let kills = decode_kills(expect_object(Section::KillFeed, kills)?)?;
        let frames = decode_positions(expect_object(Section::Positions, positions)?)?;

        info!(
            players = roster.len(),
            rounds = rounds.len(),
            kill_ticks = kills.len(),
            ticks = frames.len(),
            "loaded match data"
        );

        Ok(MatchData {
            roster,
            rounds,
            kills,
            frames,
        })
    }

    /// Roster in creation order: bots and unassigned players first, then
    /// side B, then side A, each in file order.
    pub fn roster(&self) -> &[RosterEntry] {
        &self.roster
    }

    pub fn player(&self, id: PlayerId) -> Option<&RosterEntry> {
        self.roster.iter().find(|entry| entry.id == id)
    }

    pub fn frames(&self) -> &[TickFrame] {
        &self.frames
    }

    pub fn frame(&self, index: usize) -> Option<&TickFrame> {
        self.frames.get(index)
    }

    pub fn tick_count(&self) -> usize {
        self.frames.len()
    }

    pub fn ticks(&self) -> impl Iterator<Item = Tick> + '_ {
        self.frames.iter().map(|frame| frame.tick)
    }

    pub fn round_event(&self, tick: Tick) -> Option<&RoundEvent> {
        self.rounds.get(&tick)
    }

    /// Kills recorded at `tick`, in feed order.
    pub fn kills_at(&self, tick: Tick) -> &[KillEvent] {
        self.kills.get(&tick).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn kill_count(&self) -> usize {
        self.kills.values().map(Vec::len).sum()
    }
}

fn expect_object(section: Section, value: Value) -> Result<Map<String, Value>, ErrorKind> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(ErrorKind::NotAnObject { section }),
    }
}

fn parse_tick(section: Section, key: &str) -> Result<Tick, ErrorKind> {
    key.trim()
        .parse::<u32>()
        .map(Tick)
        .map_err(|_| ErrorKind::InvalidKey {
            section,
            key: key.to_string(),
        })
}

fn parse_player_key(section: Section, key: &str) -> Result<PlayerId, ErrorKind> {
    key.trim()
        .parse::<u32>()
        .map(PlayerId)
        .map_err(|_| ErrorKind::InvalidKey {
            section,
            key: key.to_string(),
        })
}

fn text_field(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_i64().is_some_and(|n| n != 0),
        _ => false,
    }
}

/// Player referenced by an event, as a number or numeric string.
fn player_ref(value: &Value) -> Option<PlayerId> {
    let raw = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }?;
    u32::try_from(raw).ok().map(PlayerId)
}

fn decode_players(players: Map<String, Value>) -> Result<Vec<RosterEntry>, ErrorKind> {
    let mut unplaced = Vec::new();
    let mut side_b = Vec::new();
    let mut side_a = Vec::new();

    for (key, value) in players {
        let id = parse_player_key(Section::Players, &key)?;
        let fields = value.as_array().ok_or_else(|| {
            ErrorKind::malformed(Section::Players, &key, "expected an array")
        })?;
        if !(2..=3).contains(&fields.len()) {
            return Err(ErrorKind::malformed(
                Section::Players,
                &key,
                "expected [identity, name] or [identity, name, side]",
            ));
        }

        let identity = text_field(&fields[0]);
        let name = text_field(&fields[1]);
        let side = if identity == BOT_IDENTITY {
            Side::Bot
        } else {
            fields
                .get(2)
                .and_then(Value::as_i64)
                .map(Side::from_code)
                .unwrap_or(Side::Unassigned)
        };
        if side == Side::Unassigned && fields.len() == 3 {
            debug!(player = %id, code = %fields[2], "unknown side code, player left unassigned");
        }

        let entry = RosterEntry {
            id,
            identity,
            name,
            side,
            number: None,
            slot: None,
        };
        match side {
            Side::SideB => side_b.push(entry),
            Side::SideA => side_a.push(entry),
            Side::Bot | Side::Unassigned => unplaced.push(entry),
        }
    }

    let mut number = 0;
    for team in [&mut side_b, &mut side_a] {
        for (slot, entry) in team.iter_mut().enumerate() {
            entry.number = Some(number);
            entry.slot = Some(slot as u32);
            number += 1;
        }
    }

    unplaced.extend(side_b);
    unplaced.extend(side_a);
    Ok(unplaced)
}

fn decode_rounds(rounds: Map<String, Value>) -> Result<HashMap<Tick, RoundEvent>, ErrorKind> {
    rounds
        .into_iter()
        .map(|(key, value)| {
            let tick = parse_tick(Section::Rounds, &key)?;
            let integer = |field: &Value, what: &str| {
                field.as_i64().ok_or_else(|| {
                    ErrorKind::malformed(Section::Rounds, &key, format!("{what} must be an integer"))
                })
            };
            let Some([phase, score_a, score_b, ..]) = value.as_array().map(Vec::as_slice) else {
                return Err(ErrorKind::malformed(
                    Section::Rounds,
                    &key,
                    "expected [phase, score_a, score_b]",
                ));
            };
            let event = RoundEvent {
                phase: integer(phase, "phase")?,
                score_a: integer(score_a, "score A")?,
                score_b: integer(score_b, "score B")?,
            };
            Ok((tick, event))
        })
        .collect()
}

fn decode_kills(feed: Map<String, Value>) -> Result<HashMap<Tick, Vec<KillEvent>>, ErrorKind> {
    feed.into_iter()
        .map(|(key, value)| {
            let tick = parse_tick(Section::KillFeed, &key)?;
            let entries = value.as_array().ok_or_else(|| {
                ErrorKind::malformed(Section::KillFeed, &key, "expected an array of kills")
            })?;
            let kills = entries
                .iter()
                .map(|entry| decode_kill(&key, entry))
                .collect::<Result<Vec<_>, _>>()?;
            Ok((tick, kills))
        })
        .collect()
}

fn decode_kill(key: &str, entry: &Value) -> Result<KillEvent, ErrorKind> {
    let malformed = |reason: &str| ErrorKind::malformed(Section::KillFeed, key, reason);

    let Some([victim, attacker, assister, weapon, headshot, wallbang, ..]) =
        entry.as_array().map(Vec::as_slice)
    else {
        return Err(malformed(
            "expected [victim, attacker, assister, weapon, headshot, wallbang]",
        ));
    };

    Ok(KillEvent {
        victim: player_ref(victim).ok_or_else(|| malformed("victim id is missing"))?,
        attacker: player_ref(attacker).ok_or_else(|| malformed("attacker id is missing"))?,
        // 0 is the recorder's "no assist"
        assister: player_ref(assister).filter(|id| id.raw() != 0),
        weapon: text_field(weapon),
        headshot: flag(headshot),
        wallbang: flag(wallbang),
    })
}

fn decode_positions(positions: Map<String, Value>) -> Result<Vec<TickFrame>, ErrorKind> {
    positions
        .into_iter()
        .map(|(key, value)| {
            let tick = parse_tick(Section::Positions, &key)?;
            let players = match value {
                Value::Object(players) => players,
                Value::Null => Map::new(),
                Value::Array(items) if items.is_empty() => Map::new(),
                _ => {
                    return Err(ErrorKind::malformed(
                        Section::Positions,
                        &key,
                        "expected an object of player positions",
                    ));
                }
            };
            let positions = players
                .into_iter()
                .map(|(player, pos)| {
                    let id = parse_player_key(Section::Positions, &player)?;
                    let pos: WorldPos = serde_json::from_value(pos).map_err(|e| {
                        ErrorKind::malformed(Section::Positions, &key, format!("player {player}: {e}"))
                    })?;
                    Ok((id, pos))
                })
                .collect::<Result<HashMap<_, _>, ErrorKind>>()?;
            Ok(TickFrame { tick, positions })
        })
        .collect()
}
