use std::path::Path;

use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut, draw_text_mut, text_size};
use tracing::info;

use crate::RenderError;
use crate::draw_command::{CommandSink, ElementHandle, SinkCommand, TextSize};
use crate::map_data::{DisplayPos, MAP_SIZE};
use crate::scene::{Element, ElementKind, Scene};

/// Space above and below the radar for HUD text (score, kill feed, timer, player list).
pub const HUD_MARGIN: u32 = 160;
pub const CANVAS_WIDTH: u32 = MAP_SIZE;
pub const CANVAS_HEIGHT: u32 = MAP_SIZE + 2 * HUD_MARGIN;

const MARKER_RADIUS: i32 = 5;

const COLOR_BACKGROUND: Rgb<u8> = Rgb([20, 25, 35]);
const COLOR_BLANK_MAP: Rgb<u8> = Rgb([30, 40, 60]);

fn text_scale(size: TextSize) -> PxScale {
    match size {
        TextSize::Small => PxScale::from(12.0),
        TextSize::Normal => PxScale::from(16.0),
        TextSize::Large => PxScale::from(28.0),
    }
}

/// Convert a display position (Y up, map at 0..MAP_SIZE) to a canvas pixel (Y down).
pub fn to_canvas(pos: DisplayPos) -> (i32, i32) {
    (pos.x, HUD_MARGIN as i32 + MAP_SIZE as i32 - pos.y)
}

/// Load a radar background image, scaled to the radar size.
pub fn load_map_image(path: &Path) -> Result<RgbImage, RenderError> {
    let image = image::open(path)?.to_rgb8();
    info!(
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        "loaded map image"
    );
    if image.width() != MAP_SIZE || image.height() != MAP_SIZE {
        return Ok(image::imageops::resize(
            &image,
            MAP_SIZE,
            MAP_SIZE,
            image::imageops::FilterType::Lanczos3,
        ));
    }
    Ok(image)
}

/// Software sink that rasterizes the scene to an `RgbImage`.
///
/// Commands only update the retained scene; pixels are produced on demand by
/// `render`. Labels are skipped when no font has been loaded.
pub struct ImageSink {
    scene: Scene,
    /// Pre-built background: HUD margins plus the map image.
    base_canvas: RgbImage,
    font: Option<FontVec>,
}

impl ImageSink {
    pub fn new(map_image: Option<RgbImage>) -> Self {
        let mut base = RgbImage::from_pixel(CANVAS_WIDTH, CANVAS_HEIGHT, COLOR_BACKGROUND);
        match map_image {
            Some(map) => {
                for y in 0..map.height().min(MAP_SIZE) {
                    for x in 0..map.width().min(MAP_SIZE) {
                        base.put_pixel(x, y + HUD_MARGIN, *map.get_pixel(x, y));
                    }
                }
            }
            None => {
                for y in 0..MAP_SIZE {
                    for x in 0..MAP_SIZE {
                        base.put_pixel(x, y + HUD_MARGIN, COLOR_BLANK_MAP);
                    }
                }
            }
        }

        Self {
            scene: Scene::new(),
            base_canvas: base,
            font: None,
        }
    }

    /// Use the TTF/OTF font at `path` for labels.
    pub fn load_font(&mut self, path: &Path) -> Result<(), RenderError> {
        let data = std::fs::read(path)?;
        self.set_font_data(data)
    }

    pub fn set_font_data(&mut self, data: Vec<u8>) -> Result<(), RenderError> {
        let font = FontVec::try_from_vec(data).map_err(|e| RenderError::Font(e.to_string()))?;
        self.font = Some(font);
        Ok(())
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Canvas dimensions.
    pub fn canvas_size(&self) -> (u32, u32) {
        (CANVAS_WIDTH, CANVAS_HEIGHT)
    }

    /// Rasterize the current scene: lines, then markers, then labels.
    pub fn render(&self) -> RgbImage {
        let mut canvas = self.base_canvas.clone();
        let elements: Vec<&Element> = self.scene.elements().map(|(_, e)| e).collect();

        for element in &elements {
            if let ElementKind::Line { to } = element.kind {
                let (x1, y1) = to_canvas(element.pos);
                let (x2, y2) = to_canvas(to);
                draw_line_segment_mut(
                    &mut canvas,
                    (x1 as f32, y1 as f32),
                    (x2 as f32, y2 as f32),
                    Rgb(element.color),
                );
            }
        }

        for element in &elements {
            if let ElementKind::Marker = element.kind {
                draw_marker(&mut canvas, to_canvas(element.pos), Rgb(element.color));
            }
        }

        if let Some(font) = &self.font {
            for element in &elements {
                if let ElementKind::Label { text, size } = &element.kind {
                    draw_label(&mut canvas, font, element, text, *size);
                }
            }
        }

        canvas
    }

    /// Render the current scene and write it to `path`. Format follows the extension.
    pub fn save_frame(&self, path: &Path) -> Result<(), RenderError> {
        self.render().save(path)?;
        info!(path = %path.display(), "saved frame");
        Ok(())
    }
}

impl CommandSink for ImageSink {
    fn allocate_handle(&mut self) -> ElementHandle {
        self.scene.allocate_handle()
    }

    fn submit(&mut self, cmd: SinkCommand) {
        self.scene.apply(cmd);
    }
}

fn draw_marker(image: &mut RgbImage, (x, y): (i32, i32), color: Rgb<u8>) {
    let w = image.width() as i32;
    let h = image.height() as i32;
    if x < -MARKER_RADIUS || x >= w + MARKER_RADIUS || y < -MARKER_RADIUS || y >= h + MARKER_RADIUS {
        return;
    }
    draw_filled_circle_mut(image, (x, y), MARKER_RADIUS, color);
}

fn draw_label(image: &mut RgbImage, font: &FontVec, element: &Element, text: &str, size: TextSize) {
    if text.is_empty() {
        return;
    }
    let scale = text_scale(size);
    let (mut x, mut y) = to_canvas(element.pos);
    // Tags sit centered on their marker
    if size == TextSize::Small {
        let (tw, th) = text_size(scale, font, text);
        x -= tw as i32 / 2;
        y -= th as i32 / 2;
    }
    draw_text_mut(image, Rgb(element.color), x, y, scale, font, text);
}
