use serde::{Deserialize, Serialize};

use crate::renderer::RenderOptions;

/// Renderer configuration, loadable from a TOML file.
///
/// All fields default to their standard values. CLI flags override config file values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    // Display toggles (all default true)
    pub show_tracers: bool,
    pub show_player_numbers: bool,
    pub show_player_list: bool,
    pub show_score: bool,
    pub show_timer: bool,
    pub show_kill_feed: bool,
}

impl Default for RendererConfig {
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

impl RendererConfig {
    /// Load config from a TOML file.
    #[cfg(feature = "bin")]
    pub fn load(path: &std::path::Path) -> Result<Self, crate::RenderError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    #[cfg(feature = "bin")]
    pub fn from_toml(contents: &str) -> Result<Self, crate::RenderError> {
        toml::from_str(contents).map_err(|e| crate::RenderError::Config(e.to_string()))
    }

    /// Convert into RenderOptions for the renderer.
    pub fn into_render_options(self) -> RenderOptions {
        RenderOptions {
            show_tracers: self.show_tracers,
            show_player_numbers: self.show_player_numbers,
            show_player_list: self.show_player_list,
            show_score: self.show_score,
            show_timer: self.show_timer,
            show_kill_feed: self.show_kill_feed,
        }
    }

    /// Generate a commented default TOML config string.
    pub fn generate_default_toml() -> String {
        r#"# Radar Renderer Configuration
# Place this file as radar_renderer.toml next to the executable,
# or specify with --config <path>.

# Display toggles (true = show, false = hide)

# Show a line from victim to attacker on the tick of each kill
show_tracers = true

# Show player numbers on top of the position markers
show_player_numbers = true

# Show the numbered player list below the radar
show_player_list = true

# Show the round score above the radar
show_score = true

# Show the tick and elapsed seconds below the radar
show_timer = true

# Show recent kills in the top-right corner
show_kill_feed = true
"#
        .to_string()
    }

    /// Apply CLI flag overrides. Flags use negative form (--no-X disables).
    #[cfg(feature = "bin")]
    pub fn apply_cli_overrides(&mut self, matches: &clap::ArgMatches) {
        if matches.is_present("NO_TRACERS") {
            self.show_tracers = false;
        }
        if matches.is_present("NO_KILL_FEED") {
            self.show_kill_feed = false;
        }
    }
}
