use thiserror::Error;

/// Errors raised while producing or saving rendered frames.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The font file could not be parsed.
    #[error("invalid font: {0}")]
    Font(String),
    /// The config file could not be parsed.
    #[error("invalid config: {0}")]
    Config(String),
    #[error("invalid dump frame {0:?}, expected a frame number, 'mid' or 'last'")]
    InvalidDumpMode(String),
    /// A frame was requested from a match without ticks.
    #[error("match has no ticks to render")]
    NothingToRender,
}
