pub use radar_replays::types::WorldPos;

/// Side length of the radar image in display pixels.
pub const MAP_SIZE: u32 = 1024;

/// Where markers go when their player has no position at the current tick.
/// Outside the map on both axes so nothing is drawn for them.
pub const OFF_CANVAS: DisplayPos = DisplayPos { x: -100, y: -100 };

/// Map metadata for coordinate conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapInfo {
    /// World X of the radar image's left edge.
    pub origin_x: f64,
    /// World Y of the radar image's bottom edge.
    pub origin_y: f64,
    /// World units per display pixel.
    pub scale: f64,
}

/// Position in display space.
/// (0,0) is the bottom-left corner of the radar image, positive Y = up.
/// HUD text lives outside [0, MAP_SIZE) on the Y axis.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DisplayPos {
    pub x: i32,
    pub y: i32,
}

impl DisplayPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl MapInfo {
    /// de_mirage radar bounds.
    pub const DE_MIRAGE: MapInfo = MapInfo {
        origin_x: -3230.0,
        origin_y: -3407.0,
        scale: 5.0,
    };

    /// Convert world coordinates to display pixel coordinates, rounding down.
    pub fn world_to_display(&self, pos: WorldPos) -> DisplayPos {
        DisplayPos {
            x: ((pos.x as f64 - self.origin_x) / self.scale).floor() as i32,
            y: ((pos.y as f64 - self.origin_y) / self.scale).floor() as i32,
        }
    }
}

impl Default for MapInfo {
    fn default() -> Self {
        Self::DE_MIRAGE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_origin_maps_inside_radar() {
        let px = MapInfo::DE_MIRAGE.world_to_display(WorldPos::ORIGIN);
        assert_eq!(px, DisplayPos::new(646, 681));
    }

    #[test]
    fn map_corner_maps_to_display_origin() {
        let px = MapInfo::DE_MIRAGE.world_to_display(WorldPos {
            x: -3230.0,
            y: -3407.0,
        });
        assert_eq!(px, DisplayPos::new(0, 0));

        let px = MapInfo::DE_MIRAGE.world_to_display(WorldPos {
            x: -3230.0 + 5.0 * 1024.0,
            y: -3407.0 + 5.0 * 512.0,
        });
        assert_eq!(px, DisplayPos::new(1024, 512));
    }

    #[test]
    fn points_past_the_corner_land_off_the_map() {
        let px = MapInfo::DE_MIRAGE.world_to_display(WorldPos {
            x: -3232.0,
            y: -3409.0,
        });
        assert_eq!(px, DisplayPos::new(-1, -1));
    }

    #[test]
    fn transform_is_repeatable() {
        let pos = WorldPos {
            x: -1234.5,
            y: 987.25,
        };
        let map = MapInfo::default();
        assert_eq!(map.world_to_display(pos), map.world_to_display(pos));
    }
}
