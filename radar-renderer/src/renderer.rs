use std::collections::HashMap;

use tracing::{debug, info};

use radar_replays::types::{PlayerId, Side, Tick, WorldPos};
use radar_replays::{MatchData, TickFrame};

use crate::draw_command::{ElementHandle, RenderSink, TextSize};
use crate::kill_feed::{KILL_FEED_LEN, KillFeed, KillFeedEntry, describe_kill};
use crate::map_data::{DisplayPos, MapInfo, OFF_CANVAS};

// Visual constants
pub const SIDE_A_COLOR: [u8; 3] = [0xCC, 0xBA, 0x7C];
pub const SIDE_B_COLOR: [u8; 3] = [0x5D, 0x79, 0xAE];
pub const NEUTRAL_COLOR: [u8; 3] = [255, 255, 255];
/// Tag text drawn over a side A marker.
pub const SIDE_A_TAG_COLOR: [u8; 3] = [0, 0, 0];
/// Tracer color for kills by anyone not on side B.
pub const KILL_TRACER_COLOR: [u8; 3] = [0xCC, 0x9F, 0x06];
/// List entry color for players without a position (dead or disconnected).
pub const DEAD_COLOR: [u8; 3] = [0x9B, 0x9B, 0x9B];

// HUD layout in display space. The map covers 0..MAP_SIZE on both axes, so
// negative Y is below the map and Y > MAP_SIZE is above it.
const TICK_CAPTION_POS: DisplayPos = DisplayPos::new(0, -25);
const TIME_CAPTION_POS: DisplayPos = DisplayPos::new(0, -50);
const TICK_VALUE_POS: DisplayPos = DisplayPos::new(100, -25);
const TIME_VALUE_POS: DisplayPos = DisplayPos::new(100, -50);
const SCORE_POS: DisplayPos = DisplayPos::new(600, 1050);
const KILL_FEED_POS: DisplayPos = DisplayPos::new(760, 1150);
const KILL_FEED_ROW_HEIGHT: i32 = 20;
const PLAYER_LIST_TOP: i32 = -50;
const PLAYER_LIST_ROW_HEIGHT: i32 = 20;
/// Rows per list column. Larger teams wrap back to the top row.
const PLAYER_LIST_ROWS: u32 = 5;
const SIDE_B_LIST_X: i32 = 200;
const SIDE_A_LIST_X: i32 = 500;

/// Configurable rendering options.
#[derive(Clone, Debug)]
pub struct RenderOptions {
    pub show_tracers: bool,
    pub show_player_numbers: bool,
    pub show_player_list: bool,
    pub show_score: bool,
    pub show_timer: bool,
    pub show_kill_feed: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            show_tracers: true,
            show_player_numbers: true,
            show_player_list: true,
            show_score: true,
            show_timer: true,
            show_kill_feed: true,
        }
    }
}

/// Colors applied to a player's elements for a given side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SidePalette {
    pub marker: [u8; 3],
    pub tag: [u8; 3],
    pub list: [u8; 3],
}

pub fn side_palette(side: Side) -> SidePalette {
    match side {
        Side::SideA => SidePalette {
            marker: SIDE_A_COLOR,
            tag: SIDE_A_TAG_COLOR,
            list: SIDE_A_COLOR,
        },
        Side::SideB => SidePalette {
            marker: SIDE_B_COLOR,
            tag: NEUTRAL_COLOR,
            list: SIDE_B_COLOR,
        },
        Side::Bot | Side::Unassigned => SidePalette {
            marker: NEUTRAL_COLOR,
            tag: NEUTRAL_COLOR,
            list: NEUTRAL_COLOR,
        },
    }
}

/// Tracer color for a kill, from the attacker's current side.
pub fn tracer_color(attacker_side: Option<Side>) -> [u8; 3] {
    match attacker_side {
        Some(Side::SideB) => SIDE_B_COLOR,
        _ => KILL_TRACER_COLOR,
    }
}

/// Lifecycle of a playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackPhase {
    /// No tick has been advanced yet.
    NotStarted,
    Playing,
    /// Every tick has been played. Further advances do nothing.
    Finished,
}

/// Position of playback in the tick sequence.
///
/// Moves forward by exactly one tick per step and never goes back.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaybackCursor {
    next_index: usize,
    total: usize,
    started: bool,
    /// Set by the first step taken past the last tick.
    finished: bool,
    current: Option<Tick>,
    previous: Option<Tick>,
}

/// The tick a cursor step landed on.
#[derive(Debug, Clone, Copy)]
pub struct CursorStep<'a> {
    pub index: usize,
    pub current: &'a TickFrame,
    /// Frame before `current`, or `current` itself for the first tick.
    pub previous: &'a TickFrame,
}

impl PlaybackCursor {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    pub fn phase(&self) -> PlaybackPhase {
        if self.finished {
            PlaybackPhase::Finished
        } else if self.started {
            PlaybackPhase::Playing
        } else {
            PlaybackPhase::NotStarted
        }
    }

    /// Index of the next tick to be played.
    pub fn next_index(&self) -> usize {
        self.next_index
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn current_tick(&self) -> Option<Tick> {
        self.current
    }

    pub fn previous_tick(&self) -> Option<Tick> {
        self.previous
    }

    fn step<'a>(&mut self, data: &'a MatchData) -> Option<CursorStep<'a>> {
        let index = self.next_index;
        if index >= self.total {
            self.finished = true;
            return None;
        }
        self.started = true;
        let current = data.frame(index)?;
        let previous = index
            .checked_sub(1)
            .and_then(|i| data.frame(i))
            .unwrap_or(current);

        self.next_index += 1;
        self.current = Some(current.tick);
        self.previous = Some(previous.tick);
        Some(CursorStep {
            index,
            current,
            previous,
        })
    }
}

/// Sink elements belonging to one player, plus the side it is drawn as.
#[derive(Debug, Clone)]
pub struct PlayerMarker {
    pub id: PlayerId,
    /// Current rendered side. Starts as the roster side and flips on side swaps.
    pub side: Side,
    pub marker: ElementHandle,
    /// Number tag drawn on top of the marker.
    pub tag: ElementHandle,
    /// Entry in the player list below the map. Only team members have one.
    pub list_label: Option<ElementHandle>,
}

impl PlayerMarker {
    fn apply_side_colors(&self, sink: &mut dyn RenderSink) {
        let palette = side_palette(self.side);
        sink.set_color(self.marker, palette.marker);
        sink.set_color(self.tag, palette.tag);
        if let Some(label) = self.list_label {
            sink.set_color(label, palette.list);
        }
    }
}

/// HUD labels updated during playback.
#[derive(Debug, Clone)]
pub struct Hud {
    pub tick: ElementHandle,
    pub time: ElementHandle,
    pub score: ElementHandle,
    /// One label per kill feed row, top row first.
    pub kill_feed: Vec<ElementHandle>,
}

impl Hud {
    fn create(options: &RenderOptions, sink: &mut dyn RenderSink) -> Self {
        let (tick_caption, time_caption) = if options.show_timer {
            ("tick:", "time:")
        } else {
            ("", "")
        };
        sink.create_label(tick_caption, TICK_CAPTION_POS, NEUTRAL_COLOR, TextSize::Normal);
        sink.create_label(time_caption, TIME_CAPTION_POS, NEUTRAL_COLOR, TextSize::Normal);
        let tick = sink.create_label("", TICK_VALUE_POS, NEUTRAL_COLOR, TextSize::Normal);
        let time = sink.create_label("", TIME_VALUE_POS, NEUTRAL_COLOR, TextSize::Normal);
        let score_text = if options.show_score { "0 - 0" } else { "" };
        let score = sink.create_label(score_text, SCORE_POS, NEUTRAL_COLOR, TextSize::Large);
        let kill_feed = (0..KILL_FEED_LEN as i32)
            .map(|row| {
                let pos = DisplayPos::new(
                    KILL_FEED_POS.x,
                    KILL_FEED_POS.y - row * KILL_FEED_ROW_HEIGHT,
                );
                sink.create_label("", pos, NEUTRAL_COLOR, TextSize::Normal)
            })
            .collect();
        Self {
            tick,
            time,
            score,
            kill_feed,
        }
    }
}

/// What happened during one call to `advance`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub index: usize,
    pub tick: Tick,
    pub previous: Tick,
    /// Whole seconds since the first played tick.
    pub elapsed_seconds: i64,
    pub kills: usize,
    /// Tracers left in the sink after this tick.
    pub tracers: usize,
    pub visible_players: usize,
    pub side_swap: bool,
}

/// Playback state machine.
///
/// Created once per match. Each `advance` plays the next tick: it clears
/// last tick's tracers, draws this tick's kills, moves every player, applies
/// round events (score and side swaps) and updates the HUD, all through a
/// `RenderSink`.
pub struct RadarRenderer<'a> {
    data: &'a MatchData,
    map_info: MapInfo,
    pub options: RenderOptions,

    cursor: PlaybackCursor,
    /// Playback-relative time origin
    first_tick: Option<Tick>,
    round_phase: Option<i64>,
    tracers: Vec<ElementHandle>,
    players: Vec<PlayerMarker>,
    player_index: HashMap<PlayerId, usize>,
    hud: Hud,
    kill_feed: KillFeed,
    side_swaps: usize,
}

impl<'a> RadarRenderer<'a> {
    /// Create the HUD and one marker, tag and list entry per player.
    pub fn new(data: &'a MatchData, options: RenderOptions, sink: &mut dyn RenderSink) -> Self {
        let hud = Hud::create(&options, sink);

        let mut players = Vec::with_capacity(data.roster().len());
        let mut player_index = HashMap::with_capacity(data.roster().len());
        for entry in data.roster() {
            let palette = side_palette(entry.side);
            let marker = sink.create_marker(OFF_CANVAS, palette.marker);
            let tag_text = match entry.number {
                Some(number) if options.show_player_numbers => number.to_string(),
                _ => String::new(),
            };
            let tag = sink.create_label(&tag_text, OFF_CANVAS, palette.tag, TextSize::Small);

            let list_x = match entry.side {
                Side::SideB => Some(SIDE_B_LIST_X),
                Side::SideA => Some(SIDE_A_LIST_X),
                Side::Bot | Side::Unassigned => None,
            };
            let list_label = match (entry.number, entry.slot, list_x) {
                (Some(number), Some(slot), Some(x)) if options.show_player_list => {
                    let row = (slot % PLAYER_LIST_ROWS) as i32;
                    let pos = DisplayPos::new(x, PLAYER_LIST_TOP - PLAYER_LIST_ROW_HEIGHT * row);
                    let text = format!("{number}: {}", entry.name);
                    Some(sink.create_label(&text, pos, palette.list, TextSize::Normal))
                }
                _ => None,
            };

            player_index.insert(entry.id, players.len());
            players.push(PlayerMarker {
                id: entry.id,
                side: entry.side,
                marker,
                tag,
                list_label,
            });
        }

        info!(
            players = players.len(),
            ticks = data.tick_count(),
            "radar renderer ready"
        );

        Self {
            data,
            map_info: MapInfo::DE_MIRAGE,
            options,
            cursor: PlaybackCursor::new(data.tick_count()),
            first_tick: None,
            round_phase: None,
            tracers: Vec::new(),
            players,
            player_index,
            hud,
            kill_feed: KillFeed::new(),
            side_swaps: 0,
        }
    }

    /// Play the next tick. Returns `None` once every tick has been played.
    pub fn advance(&mut self, sink: &mut dyn RenderSink) -> Option<TickReport> {
        let data = self.data;
        let step = self.cursor.step(data)?;
        let tick = step.current.tick;

        // Tracers live for exactly one tick
        for line in self.tracers.drain(..) {
            sink.remove_line(line);
        }

        let first_tick = *self.first_tick.get_or_insert(tick);

        let kills = data.kills_at(tick);
        if self.options.show_kill_feed {
            self.kill_feed.expire(tick);
        }
        for kill in kills {
            let attacker_side = self.player_side(kill.attacker);
            debug!(
                %tick,
                victim = %kill.victim,
                attacker = %kill.attacker,
                weapon = %kill.weapon,
                "kill"
            );

            if self.options.show_tracers {
                // Missing endpoints fall back to the world origin
                let victim = step.previous.position(kill.victim).unwrap_or(WorldPos::ORIGIN);
                let attacker = step.current.position(kill.attacker).unwrap_or(WorldPos::ORIGIN);
                let line = sink.create_line(
                    self.map_info.world_to_display(victim),
                    self.map_info.world_to_display(attacker),
                    tracer_color(attacker_side),
                );
                self.tracers.push(line);
            }

            if self.options.show_kill_feed {
                let text = describe_kill(
                    kill,
                    &self.player_name(kill.attacker),
                    &self.player_name(kill.victim),
                );
                let color = attacker_side
                    .map(|side| side_palette(side).list)
                    .unwrap_or(NEUTRAL_COLOR);
                self.kill_feed.push(KillFeedEntry { tick, text, color });
            }
        }

        let mut visible_players = 0;
        for player in &self.players {
            match step.current.position(player.id) {
                Some(world) => {
                    let pos = self.map_info.world_to_display(world);
                    sink.set_position(player.marker, pos);
                    sink.set_position(player.tag, pos);
                    player.apply_side_colors(sink);
                    visible_players += 1;
                }
                None => {
                    sink.set_position(player.marker, OFF_CANVAS);
                    sink.set_position(player.tag, OFF_CANVAS);
                    if let Some(label) = player.list_label {
                        sink.set_color(label, DEAD_COLOR);
                    }
                }
            }
        }

        let mut side_swap = false;
        if let Some(round) = data.round_event(tick) {
            if self.options.show_score {
                let score = format!("{} - {}", round.score_a, round.score_b);
                sink.set_text(self.hud.score, &score);
            }
            // The first phase seen only sets the baseline
            if self.round_phase.is_some_and(|phase| phase != round.phase) {
                self.swap_sides(sink, tick);
                side_swap = true;
            }
            self.round_phase = Some(round.phase);
        }

        let elapsed_seconds = tick.seconds_since(first_tick).round_ties_even() as i64;
        if self.options.show_timer {
            sink.set_text(self.hud.tick, &tick.to_string());
            sink.set_text(self.hud.time, &elapsed_seconds.to_string());
        }

        if self.options.show_kill_feed {
            self.refresh_kill_feed(sink);
        }

        Some(TickReport {
            index: step.index,
            tick,
            previous: step.previous.tick,
            elapsed_seconds,
            kills: kills.len(),
            tracers: self.tracers.len(),
            visible_players,
            side_swap,
        })
    }

    fn swap_sides(&mut self, sink: &mut dyn RenderSink, tick: Tick) {
        for player in self.players.iter_mut().filter(|p| p.side.is_team()) {
            player.side = player.side.swapped();
            player.apply_side_colors(sink);
        }
        self.side_swaps += 1;
        info!(%tick, swaps = self.side_swaps, "teams switched sides");
    }

    fn refresh_kill_feed(&self, sink: &mut dyn RenderSink) {
        let mut entries = self.kill_feed.newest_first();
        for &label in &self.hud.kill_feed {
            match entries.next() {
                Some(entry) => {
                    sink.set_text(label, &entry.text);
                    sink.set_color(label, entry.color);
                }
                None => sink.set_text(label, ""),
            }
        }
    }

    fn player_name(&self, id: PlayerId) -> String {
        self.data
            .player(id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| format!("#{id}"))
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.cursor.phase()
    }

    pub fn cursor(&self) -> &PlaybackCursor {
        &self.cursor
    }

    pub fn map_info(&self) -> &MapInfo {
        &self.map_info
    }

    pub fn first_tick(&self) -> Option<Tick> {
        self.first_tick
    }

    /// Phase of the last round event seen, if any.
    pub fn round_phase(&self) -> Option<i64> {
        self.round_phase
    }

    /// Tracer lines currently present in the sink.
    pub fn active_tracers(&self) -> &[ElementHandle] {
        &self.tracers
    }

    pub fn players(&self) -> &[PlayerMarker] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Option<&PlayerMarker> {
        self.player_index.get(&id).map(|&i| &self.players[i])
    }

    /// Current rendered side of a player, `None` for ids not in the roster.
    pub fn player_side(&self, id: PlayerId) -> Option<Side> {
        self.player(id).map(|p| p.side)
    }

    pub fn hud(&self) -> &Hud {
        &self.hud
    }

    pub fn kill_feed(&self) -> &KillFeed {
        &self.kill_feed
    }

    pub fn side_swaps(&self) -> usize {
        self.side_swaps
    }
}
