use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::{debug, info};

use radar_replays::types::Tick;

use crate::RenderError;
use crate::draw_command::RenderSink;
use crate::drawing::ImageSink;
use crate::renderer::{PlaybackPhase, RadarRenderer, TickReport};

/// Upper bound on frames driven in one playback.
pub const MAX_FRAMES: usize = 1500;

/// Which frame to capture as a still image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpMode {
    Frame(usize),
    Midpoint,
    Last,
}

impl DumpMode {
    /// Index of the captured frame in a playback of `frames` frames.
    /// Out-of-range frame numbers capture the last frame.
    pub fn frame_index(self, frames: usize) -> usize {
        let last = frames.saturating_sub(1);
        match self {
            DumpMode::Frame(n) => n.min(last),
            DumpMode::Midpoint => frames / 2,
            DumpMode::Last => last,
        }
    }
}

impl FromStr for DumpMode {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mid" => Ok(DumpMode::Midpoint),
            "last" => Ok(DumpMode::Last),
            n => n
                .parse::<usize>()
                .map(DumpMode::Frame)
                .map_err(|_| RenderError::InvalidDumpMode(n.to_string())),
        }
    }
}

/// Totals for one driven playback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackSummary {
    pub frames: usize,
    pub first_tick: Option<Tick>,
    pub last_tick: Option<Tick>,
    pub kills: usize,
    pub side_swaps: usize,
    /// Playback ran past its last tick.
    pub finished: bool,
}

/// Drives a `RadarRenderer` one tick per frame.
#[derive(Debug, Clone)]
pub struct ReplayDriver {
    max_frames: usize,
}

impl Default for ReplayDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplayDriver {
    pub fn new() -> Self {
        Self {
            max_frames: MAX_FRAMES,
        }
    }

    pub fn with_max_frames(max_frames: usize) -> Self {
        Self { max_frames }
    }

    /// Number of frames a full playback of `renderer` will produce.
    pub fn frame_count(&self, renderer: &RadarRenderer<'_>) -> usize {
        let remaining = renderer.cursor().total() - renderer.cursor().next_index();
        remaining.min(self.max_frames)
    }

    /// Advance until the match finishes, the frame limit is hit, or
    /// `on_frame` breaks. `on_frame` sees the sink after each tick.
    pub fn play<S, F>(
        &self,
        renderer: &mut RadarRenderer<'_>,
        sink: &mut S,
        mut on_frame: F,
    ) -> Result<PlaybackSummary, RenderError>
    where
        S: RenderSink,
        F: FnMut(&TickReport, &S) -> Result<ControlFlow<()>, RenderError>,
    {
        let mut summary = PlaybackSummary::default();
        while summary.frames < self.max_frames {
            let Some(report) = renderer.advance(sink) else {
                break;
            };
            summary.frames += 1;
            summary.kills += report.kills;
            summary.last_tick = Some(report.tick);
            debug!(
                index = report.index,
                tick = %report.tick,
                elapsed = report.elapsed_seconds,
                tracers = report.tracers,
                players = report.visible_players,
                "frame"
            );

            if on_frame(&report, sink)?.is_break() {
                break;
            }
        }

        summary.first_tick = renderer.first_tick();
        summary.side_swaps = renderer.side_swaps();
        summary.finished = renderer.phase() == PlaybackPhase::Finished;
        info!(
            frames = summary.frames,
            kills = summary.kills,
            side_swaps = summary.side_swaps,
            finished = summary.finished,
            "playback stopped"
        );
        Ok(summary)
    }

    /// Play up to the frame selected by `mode` and save it as an image at `path`.
    pub fn dump_frame(
        &self,
        renderer: &mut RadarRenderer<'_>,
        sink: &mut ImageSink,
        mode: DumpMode,
        path: &Path,
    ) -> Result<PlaybackSummary, RenderError> {
        let frames = self.frame_count(renderer);
        if frames == 0 {
            return Err(RenderError::NothingToRender);
        }
        let target = mode.frame_index(frames);
        info!(?mode, frame = target, of = frames, "dumping frame");

        let mut frame = 0;
        self.play(renderer, sink, |_, sink| {
            if frame == target {
                sink.save_frame(path)?;
                return Ok(ControlFlow::Break(()));
            }
            frame += 1;
            Ok(ControlFlow::Continue(()))
        })
    }

    /// Play the match and save every frame into `dir` as `00000.png`, `00001.png`, ...
    pub fn dump_frames(
        &self,
        renderer: &mut RadarRenderer<'_>,
        sink: &mut ImageSink,
        dir: &Path,
    ) -> Result<PlaybackSummary, RenderError> {
        let frames = self.frame_count(renderer);
        if frames == 0 {
            return Err(RenderError::NothingToRender);
        }
        std::fs::create_dir_all(dir)?;
        info!(dir = %dir.display(), frames, "dumping frame sequence");

        let mut frame = 0;
        self.play(renderer, sink, |_, sink| {
            sink.save_frame(&frame_path(dir, frame))?;
            frame += 1;
            Ok(ControlFlow::Continue(()))
        })
    }
}

/// Path of frame `frame` in a dumped sequence.
pub fn frame_path(dir: &Path, frame: usize) -> PathBuf {
    dir.join(format!("{frame:05}.png"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::RenderOptions;
    use crate::scene::RecordingSink;
    use radar_replays::MatchData;
    use serde_json::json;

    fn ticks(n: u32) -> MatchData {
        let positions: serde_json::Map<String, serde_json::Value> = (0..n)
            .map(|i| ((1000 + i * 8).to_string(), json!({"1": {"x": 0, "y": 0}})))
            .collect();
        MatchData::from_value(json!([
            {"1": ["STEAM_1", "alice", 3]},
            {},
            {"1016": [[1, 0, 0, "world", false, false]]},
            positions
        ]))
        .unwrap()
    }

    #[test]
    fn dump_mode_parsing() {
        assert_eq!("mid".parse::<DumpMode>().unwrap(), DumpMode::Midpoint);
        assert_eq!("last".parse::<DumpMode>().unwrap(), DumpMode::Last);
        assert_eq!("12".parse::<DumpMode>().unwrap(), DumpMode::Frame(12));
        assert!(matches!(
            "soon".parse::<DumpMode>(),
            Err(RenderError::InvalidDumpMode(_))
        ));
    }

    #[test]
    fn dump_mode_frame_index() {
        assert_eq!(DumpMode::Midpoint.frame_index(10), 5);
        assert_eq!(DumpMode::Last.frame_index(10), 9);
        assert_eq!(DumpMode::Frame(3).frame_index(10), 3);
        assert_eq!(DumpMode::Frame(30).frame_index(10), 9);
        assert_eq!(DumpMode::Last.frame_index(0), 0);
    }

    #[test]
    fn plays_whole_match() {
        let data = ticks(5);
        let mut sink = RecordingSink::new();
        let mut renderer = RadarRenderer::new(&data, RenderOptions::default(), &mut sink);
        let driver = ReplayDriver::new();
        assert_eq!(driver.frame_count(&renderer), 5);

        let mut seen = Vec::new();
        let summary = driver
            .play(&mut renderer, &mut sink, |report, _| {
                seen.push(report.tick.raw());
                Ok(ControlFlow::Continue(()))
            })
            .unwrap();
        assert_eq!(seen, vec![1000, 1008, 1016, 1024, 1032]);
        assert_eq!(
            summary,
            PlaybackSummary {
                frames: 5,
                first_tick: Some(Tick(1000)),
                last_tick: Some(Tick(1032)),
                kills: 1,
                side_swaps: 0,
                finished: true,
            }
        );
    }

    #[test]
    fn frame_limit_stops_early() {
        let data = ticks(5);
        let mut sink = RecordingSink::new();
        let mut renderer = RadarRenderer::new(&data, RenderOptions::default(), &mut sink);
        let driver = ReplayDriver::with_max_frames(2);
        assert_eq!(driver.frame_count(&renderer), 2);

        let summary = driver
            .play(&mut renderer, &mut sink, |_, _| Ok(ControlFlow::Continue(())))
            .unwrap();
        assert_eq!(summary.frames, 2);
        assert!(!summary.finished);
        assert_eq!(renderer.phase(), PlaybackPhase::Playing);
    }

    #[test]
    fn dump_frame_writes_png() {
        let data = ticks(4);
        let mut sink = ImageSink::new(None);
        let mut renderer = RadarRenderer::new(&data, RenderOptions::default(), &mut sink);
        let path = std::env::temp_dir().join(format!("radar_dump_{}.png", std::process::id()));

        let summary = ReplayDriver::new()
            .dump_frame(&mut renderer, &mut sink, DumpMode::Midpoint, &path)
            .unwrap();
        assert_eq!(summary.frames, 3);
        assert_eq!(summary.last_tick, Some(Tick(1016)));

        let saved = image::open(&path).unwrap();
        assert_eq!(
            (saved.width(), saved.height()),
            (crate::drawing::CANVAS_WIDTH, crate::drawing::CANVAS_HEIGHT)
        );
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn dump_frames_writes_every_frame() {
        let data = ticks(3);
        let mut sink = ImageSink::new(None);
        let mut renderer = RadarRenderer::new(&data, RenderOptions::default(), &mut sink);
        let dir = std::env::temp_dir().join(format!("radar_frames_{}", std::process::id()));

        let summary = ReplayDriver::new()
            .dump_frames(&mut renderer, &mut sink, &dir)
            .unwrap();
        assert_eq!(summary.frames, 3);
        assert!(summary.finished);

        for frame in 0..3 {
            let saved = image::open(frame_path(&dir, frame)).unwrap();
            assert_eq!(
                (saved.width(), saved.height()),
                (crate::drawing::CANVAS_WIDTH, crate::drawing::CANVAS_HEIGHT)
            );
        }
        assert_eq!(frame_path(&dir, 2), dir.join("00002.png"));
        assert!(!frame_path(&dir, 3).exists());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn dump_frame_of_empty_match_fails() {
        let data = MatchData::from_value(json!([{}, {}, {}, {}])).unwrap();
        let mut sink = ImageSink::new(None);
        let mut renderer = RadarRenderer::new(&data, RenderOptions::default(), &mut sink);
        let path = std::env::temp_dir().join("radar_dump_empty.png");
        let err = ReplayDriver::new()
            .dump_frame(&mut renderer, &mut sink, DumpMode::Last, &path)
            .unwrap_err();
        assert!(matches!(err, RenderError::NothingToRender));
    }
}
