use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{App, Arg};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use radar_replays::MatchData;

use radar_renderer::drawing::{ImageSink, load_map_image};
use radar_renderer::driver::{DumpMode, ReplayDriver};
use radar_renderer::renderer::RadarRenderer;
use radar_renderer::RendererConfig;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn load_config(path: Option<&str>) -> anyhow::Result<RendererConfig> {
    match path {
        Some(path) => RendererConfig::load(Path::new(path))
            .with_context(|| format!("failed to load config {path}")),
        None => Ok(RendererConfig::default()),
    }
}

fn build_sink(map: Option<&str>, font: Option<&str>) -> ImageSink {
    let map_image = map.and_then(|path| match load_map_image(Path::new(path)) {
        Ok(image) => Some(image),
        Err(e) => {
            warn!(path, error = %e, "could not load map image, using blank background");
            None
        }
    });
    let mut sink = ImageSink::new(map_image);

    if let Some(path) = font
        && let Err(e) = sink.load_font(Path::new(path))
    {
        warn!(path, error = %e, "could not load font");
    }
    if !sink.has_font() {
        warn!("no font loaded, text will not be drawn");
    }
    sink
}

fn main() -> anyhow::Result<()> {
    let matches = App::new("Radar Renderer")
        .about("Plays back a recorded match position log as a top-down radar and saves its frames as PNG")
        .arg(
            Arg::with_name("OUTPUT")
                .help("Output PNG file path (defaults to the match path with a .png extension)")
                .short("o")
                .long("output")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("DUMP_FRAME")
                .help("Frame to save: a frame number, 'mid' for the midpoint or 'last' (default)")
                .long("dump-frame")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("FRAMES")
                .help("Save every frame as a numbered PNG into this directory")
                .long("frames")
                .takes_value(true)
                .conflicts_with("DUMP_FRAME"),
        )
        .arg(
            Arg::with_name("MAP")
                .help("Radar background image")
                .long("map")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("FONT")
                .help("TTF/OTF font used for labels")
                .long("font")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("CONFIG")
                .help("Path to a TOML config file")
                .long("config")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("NO_TRACERS")
                .help("Hide kill tracers")
                .long("no-tracers"),
        )
        .arg(
            Arg::with_name("NO_KILL_FEED")
                .help("Hide the kill feed")
                .long("no-kill-feed"),
        )
        .arg(
            Arg::with_name("GENERATE_CONFIG")
                .help("Print a default config file and exit")
                .long("generate-config"),
        )
        .arg(
            Arg::with_name("MATCH")
                .help("The match JSON file to play back")
                .required_unless("GENERATE_CONFIG")
                .index(1),
        )
        .get_matches();

    if matches.is_present("GENERATE_CONFIG") {
        print!("{}", RendererConfig::generate_default_toml());
        return Ok(());
    }

    init_tracing();

    let match_path = PathBuf::from(
        matches
            .value_of("MATCH")
            .context("missing match file argument")?,
    );
    let output = matches
        .value_of("OUTPUT")
        .map(PathBuf::from)
        .unwrap_or_else(|| match_path.with_extension("png"));
    let dump_mode = match matches.value_of("DUMP_FRAME") {
        Some(value) => value.parse::<DumpMode>()?,
        None => DumpMode::Last,
    };

    let mut config = load_config(matches.value_of("CONFIG"))?;
    config.apply_cli_overrides(&matches);

    let data = MatchData::from_file(&match_path)
        .with_context(|| format!("failed to load match {}", match_path.display()))?;
    info!(
        players = data.roster().len(),
        ticks = data.tick_count(),
        kills = data.kill_count(),
        "match loaded"
    );

    let mut sink = build_sink(matches.value_of("MAP"), matches.value_of("FONT"));
    let mut renderer = RadarRenderer::new(&data, config.into_render_options(), &mut sink);

    let driver = ReplayDriver::new();
    let summary = match matches.value_of("FRAMES") {
        Some(dir) => {
            let dir = PathBuf::from(dir);
            driver
                .dump_frames(&mut renderer, &mut sink, &dir)
                .with_context(|| format!("failed to render frames into {}", dir.display()))?
        }
        None => driver
            .dump_frame(&mut renderer, &mut sink, dump_mode, &output)
            .with_context(|| format!("failed to render {}", output.display()))?,
    };

    info!(
        frames = summary.frames,
        kills = summary.kills,
        finished = summary.finished,
        "done"
    );
    Ok(())
}
