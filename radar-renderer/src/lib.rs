pub mod config;
pub mod draw_command;
pub mod drawing;
pub mod driver;
mod error;
pub mod kill_feed;
pub mod map_data;
pub mod renderer;
pub mod scene;

pub use config::RendererConfig;
pub use draw_command::{CommandSink, ElementHandle, RenderSink, SinkCommand, TextSize};
pub use drawing::ImageSink;
pub use driver::{DumpMode, PlaybackSummary, ReplayDriver};
pub use error::RenderError;
pub use map_data::{DisplayPos, MapInfo, WorldPos};
pub use renderer::{PlaybackPhase, RadarRenderer, RenderOptions, TickReport};
pub use scene::{RecordingSink, Scene};
