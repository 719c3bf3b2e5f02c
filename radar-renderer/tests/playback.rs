use radar_replays::MatchData;
use radar_replays::types::{PlayerId, Side, Tick};
use radar_renderer::map_data::{DisplayPos, OFF_CANVAS};
use radar_renderer::renderer::{
    DEAD_COLOR, KILL_TRACER_COLOR, SIDE_A_COLOR, SIDE_B_COLOR, side_palette,
};
use radar_renderer::{PlaybackPhase, RadarRenderer, RecordingSink, RenderOptions, SinkCommand};
use serde_json::json;

fn load(document: serde_json::Value) -> MatchData {
    MatchData::from_slice(document.to_string().as_bytes()).unwrap()
}

#[test]
fn kill_with_absent_victim_draws_tracer_from_world_origin() {
    let data = load(json!([
        {"7": ["STEAM_7", "alice", 3]},
        {},
        {"105": [[8, 7, 0, "deagle", false, false]]},
        {
            "104": {},
            "105": {"7": {"x": 0.0, "y": 0.0}}
        }
    ]));
    let mut sink = RecordingSink::new();
    let mut renderer = RadarRenderer::new(&data, RenderOptions::default(), &mut sink);

    renderer.advance(&mut sink).unwrap();
    assert!(renderer.active_tracers().is_empty());

    sink.take_commands();
    let report = renderer.advance(&mut sink).unwrap();
    assert_eq!(report.tick, Tick(105));
    assert_eq!(report.tracers, 1);

    let created: Vec<_> = sink
        .commands()
        .iter()
        .filter_map(|cmd| match cmd {
            SinkCommand::CreateLine { from, to, color, .. } => Some((*from, *to, *color)),
            _ => None,
        })
        .collect();
    assert_eq!(
        created,
        vec![(
            DisplayPos::new(646, 681),
            DisplayPos::new(646, 681),
            KILL_TRACER_COLOR
        )]
    );
}

#[test]
fn tracers_are_removed_on_the_next_tick() {
    let data = load(json!([
        {"1": ["STEAM_1", "alice", 3], "2": ["STEAM_2", "bob", 2]},
        {},
        {"11": [[1, 2, 0, "usp", true, false]]},
        {
            "10": {"1": {"x": 0, "y": 0}, "2": {"x": 10, "y": 10}},
            "11": {"2": {"x": 10, "y": 10}},
            "12": {"2": {"x": 20, "y": 20}}
        }
    ]));
    let mut sink = RecordingSink::new();
    let mut renderer = RadarRenderer::new(&data, RenderOptions::default(), &mut sink);

    renderer.advance(&mut sink);
    let report = renderer.advance(&mut sink).unwrap();
    assert_eq!(report.tracers, 1);
    let tracer = renderer.active_tracers()[0];
    assert_eq!(sink.scene().lines().next().unwrap().2, SIDE_B_COLOR);

    sink.take_commands();
    let report = renderer.advance(&mut sink).unwrap();
    assert_eq!(report.tracers, 0);
    assert!(sink
        .commands()
        .contains(&SinkCommand::RemoveLine { handle: tracer }));
    assert_eq!(sink.scene().lines().count(), 0);
}

#[test]
fn phase_change_flips_and_recolors_team_players() {
    let data = load(json!([
        {
            "1": ["STEAM_1", "alice", 3],
            "2": ["STEAM_2", "bob", 2],
            "3": ["BOT", "Bot Kyle", 3]
        },
        {
            "100": [1, 3, 2],
            "200": [2, 3, 3]
        },
        {},
        {
            "100": {"1": {"x": 0, "y": 0}, "2": {"x": 1, "y": 1}, "3": {"x": 2, "y": 2}},
            "200": {"1": {"x": 0, "y": 0}, "2": {"x": 1, "y": 1}, "3": {"x": 2, "y": 2}}
        }
    ]));
    let mut sink = RecordingSink::new();
    let mut renderer = RadarRenderer::new(&data, RenderOptions::default(), &mut sink);

    let first = renderer.advance(&mut sink).unwrap();
    assert!(!first.side_swap);
    assert_eq!(renderer.round_phase(), Some(1));

    let second = renderer.advance(&mut sink).unwrap();
    assert!(second.side_swap);
    assert_eq!(renderer.round_phase(), Some(2));

    let alice = renderer.player(PlayerId(1)).unwrap();
    assert_eq!(alice.side, Side::SideB);
    assert_eq!(sink.scene().color(alice.marker), Some(SIDE_B_COLOR));
    assert_eq!(sink.scene().color(alice.tag), Some(side_palette(Side::SideB).tag));

    let bob = renderer.player(PlayerId(2)).unwrap();
    assert_eq!(bob.side, Side::SideA);
    assert_eq!(sink.scene().color(bob.marker), Some(SIDE_A_COLOR));
    assert_eq!(sink.scene().color(bob.list_label.unwrap()), Some(SIDE_A_COLOR));

    let bot = renderer.player(PlayerId(3)).unwrap();
    assert_eq!(bot.side, Side::Bot);
    assert_eq!(sink.scene().color(bot.marker), Some(side_palette(Side::Bot).marker));

    assert_eq!(sink.scene().text(renderer.hud().score), Some("3 - 3"));
    assert_eq!(renderer.phase(), PlaybackPhase::Playing);
    assert!(renderer.advance(&mut sink).is_none());
    assert_eq!(renderer.phase(), PlaybackPhase::Finished);
}

#[test]
fn last_tick_leaves_playback_playing_until_the_next_advance() {
    let data = load(json!([{}, {}, {}, {"1": {}, "2": {}}]));
    let mut sink = RecordingSink::new();
    let mut renderer = RadarRenderer::new(&data, RenderOptions::default(), &mut sink);

    assert_eq!(renderer.advance(&mut sink).unwrap().index, 0);
    assert_eq!(renderer.phase(), PlaybackPhase::Playing);
    assert_eq!(renderer.advance(&mut sink).unwrap().index, 1);
    assert_eq!(renderer.phase(), PlaybackPhase::Playing);
    assert!(renderer.advance(&mut sink).is_none());
    assert_eq!(renderer.phase(), PlaybackPhase::Finished);
}

#[test]
fn repeated_phase_does_not_swap() {
    let data = load(json!([
        {"1": ["STEAM_1", "alice", 3]},
        {"10": [4, 0, 0], "20": [4, 1, 0], "30": [4, 1, 1]},
        {},
        {"10": {}, "20": {}, "30": {}}
    ]));
    let mut sink = RecordingSink::new();
    let mut renderer = RadarRenderer::new(&data, RenderOptions::default(), &mut sink);
    while let Some(report) = renderer.advance(&mut sink) {
        assert!(!report.side_swap);
    }
    assert_eq!(renderer.player_side(PlayerId(1)), Some(Side::SideA));
}

#[test]
fn disconnected_player_is_hidden_and_grayed() {
    let data = load(json!([
        {"1": ["STEAM_1", "alice", 3]},
        {},
        {},
        {"1000": {"1": {"x": 100, "y": 200}}, "1064": {}}
    ]));
    let mut sink = RecordingSink::new();
    let mut renderer = RadarRenderer::new(&data, RenderOptions::default(), &mut sink);

    let first = renderer.advance(&mut sink).unwrap();
    assert_eq!(first.elapsed_seconds, 0);
    assert_eq!(first.visible_players, 1);

    let second = renderer.advance(&mut sink).unwrap();
    assert_eq!(second.elapsed_seconds, 1);
    assert_eq!(second.visible_players, 0);

    let alice = renderer.player(PlayerId(1)).unwrap();
    assert_eq!(sink.scene().position(alice.marker), Some(OFF_CANVAS));
    assert_eq!(sink.scene().position(alice.tag), Some(OFF_CANVAS));
    assert_eq!(sink.scene().color(alice.list_label.unwrap()), Some(DEAD_COLOR));
}

#[test]
fn advancing_after_finish_is_a_no_op() {
    let data = load(json!([{}, {}, {}, {"5": {}}]));
    let mut sink = RecordingSink::new();
    let mut renderer = RadarRenderer::new(&data, RenderOptions::default(), &mut sink);
    assert_eq!(renderer.phase(), PlaybackPhase::NotStarted);
    assert!(renderer.advance(&mut sink).is_some());
    assert_eq!(renderer.phase(), PlaybackPhase::Playing);

    let before = sink.scene().len();
    sink.take_commands();
    for _ in 0..3 {
        assert!(renderer.advance(&mut sink).is_none());
        assert_eq!(renderer.phase(), PlaybackPhase::Finished);
    }
    assert!(sink.commands().is_empty());
    assert_eq!(sink.scene().len(), before);
}
