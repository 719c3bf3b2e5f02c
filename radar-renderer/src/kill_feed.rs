use std::collections::VecDeque;

use radar_replays::KillEvent;
use radar_replays::types::{TICKS_PER_SECOND, Tick};

/// Maximum number of entries shown at once.
pub const KILL_FEED_LEN: usize = 5;
/// How long an entry stays in the feed.
pub const KILL_FEED_DURATION_TICKS: u32 = 5 * TICKS_PER_SECOND;

/// A single rendered line of the kill feed.
#[derive(Debug, Clone, PartialEq)]
pub struct KillFeedEntry {
    pub tick: Tick,
    pub text: String,
    /// Attacker's side color at the time of the kill
    pub color: [u8; 3],
}

/// Rolling list of recent kills, newest last.
#[derive(Debug, Default)]
pub struct KillFeed {
    entries: VecDeque<KillFeedEntry>,
}

impl KillFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: KillFeedEntry) {
        self.entries.push_back(entry);
        while self.entries.len() > KILL_FEED_LEN {
            self.entries.pop_front();
        }
    }

    /// Drop entries older than the feed duration as of `now`.
    pub fn expire(&mut self, now: Tick) {
        self.entries
            .retain(|entry| now.ticks_since(entry.tick) <= KILL_FEED_DURATION_TICKS);
    }

    /// Entries newest first, the order they are listed on screen.
    pub fn newest_first(&self) -> impl Iterator<Item = &KillFeedEntry> {
        self.entries.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Format a kill as `attacker [weapon] victim`, with `(HS)`/`(WB)` markers.
pub fn describe_kill(kill: &KillEvent, attacker_name: &str, victim_name: &str) -> String {
    let mut text = format!("{attacker_name} [{}] {victim_name}", kill.weapon);
    if kill.headshot {
        text.push_str(" (HS)");
    }
    if kill.wallbang {
        text.push_str(" (WB)");
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use radar_replays::types::PlayerId;

    fn entry(tick: u32) -> KillFeedEntry {
        KillFeedEntry {
            tick: Tick(tick),
            text: format!("kill at {tick}"),
            color: [0, 0, 0],
        }
    }

    #[test]
    fn keeps_only_the_latest_entries() {
        let mut feed = KillFeed::new();
        for tick in 0..8 {
            feed.push(entry(tick));
        }
        assert_eq!(feed.len(), KILL_FEED_LEN);
        let ticks: Vec<u32> = feed.newest_first().map(|e| e.tick.raw()).collect();
        assert_eq!(ticks, vec![7, 6, 5, 4, 3]);
    }

    #[test]
    fn entries_expire_after_duration() {
        let mut feed = KillFeed::new();
        feed.push(entry(1000));
        feed.push(entry(1100));
        feed.expire(Tick(1000 + KILL_FEED_DURATION_TICKS));
        assert_eq!(feed.len(), 2);
        feed.expire(Tick(1001 + KILL_FEED_DURATION_TICKS));
        assert_eq!(feed.len(), 1);
        feed.expire(Tick(1101 + KILL_FEED_DURATION_TICKS));
        assert!(feed.is_empty());
    }

    #[test]
    fn describe_marks_headshots_and_wallbangs() {
        let kill = KillEvent {
            victim: PlayerId(1),
            attacker: PlayerId(2),
            assister: None,
            weapon: "awp".to_string(),
            headshot: true,
            wallbang: true,
        };
        assert_eq!(describe_kill(&kill, "alice", "bob"), "alice [awp] bob (HS) (WB)");

        let plain = KillEvent {
            headshot: false,
            wallbang: false,
            ..kill
        };
        assert_eq!(describe_kill(&plain, "alice", "bob"), "alice [awp] bob");
    }
}
