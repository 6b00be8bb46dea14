//! The raster the user draws on.
//!
//! Primitives are built as epaint [`Shape`]s, tessellated with the same
//! tessellator egui uses for the screen, and filled into an RGBA buffer by
//! [`rasterize`]. Only pixels are kept; nothing about the primitives survives
//! the call.

mod rasterize;

use egui::epaint::text::{FontDefinitions, Fonts};
use egui::epaint::{Mesh, TessellationOptions, Tessellator};
use egui::{Align2, Color32, ColorImage, FontId, Pos2, Rect, Shape, Stroke};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, Rgba, RgbaImage};

use crate::config::{SnapshotEncoding, SurfaceConfig};
use crate::error::SurfaceError;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const MAX_FONT_TEXTURE_SIDE: usize = 2048;

/// Owned RGBA raster plus the pen state used to draw on it
pub struct DrawingSurface {
    config: SurfaceConfig,
    pixels: RgbaImage,
    stroke_color: Color32,
    fonts: Fonts,
    /// Bumped on every pixel mutation so viewers know when to re-upload
    revision: u64,
}

impl std::fmt::Debug for DrawingSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrawingSurface")
            .field("width", &self.pixels.width())
            .field("height", &self.pixels.height())
            .field("stroke_color", &self.stroke_color)
            .field("revision", &self.revision)
            .finish()
    }
}

impl Default for DrawingSurface {
    fn default() -> Self {
        Self::new(SurfaceConfig::default())
    }
}

impl DrawingSurface {
    pub fn new(config: SurfaceConfig) -> Self {
        let mut surface = Self {
            config,
            pixels: RgbaImage::from_pixel(config.width.max(1), config.height.max(1), WHITE),
            stroke_color: Color32::BLACK,
            fonts: Fonts::new(1.0, MAX_FONT_TEXTURE_SIDE, FontDefinitions::default()),
            revision: 0,
        };
        surface.initialize(Color32::BLACK);
        surface
    }

    /// Reset to the configured size, blank white, with `color` as the pen
    pub fn initialize(&mut self, color: Color32) {
        self.pixels = RgbaImage::from_pixel(
            self.config.width.max(1),
            self.config.height.max(1),
            WHITE,
        );
        self.stroke_color = color;
        self.touch();
    }

    /// Blank the raster without touching the pen
    pub fn clear(&mut self) {
        for pixel in self.pixels.pixels_mut() {
            *pixel = WHITE;
        }
        self.touch();
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn size(&self) -> [usize; 2] {
        [self.width() as usize, self.height() as usize]
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn stroke_color(&self) -> Color32 {
        self.stroke_color
    }

    pub fn line_width(&self) -> f32 {
        self.config.line_width
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color32> {
        self.pixels
            .get_pixel_checked(x, y)
            .map(|p| Color32::from_rgba_unmultiplied(p.0[0], p.0[1], p.0[2], p.0[3]))
    }

    /// True when every pixel is opaque white
    pub fn is_blank(&self) -> bool {
        self.pixels.pixels().all(|p| *p == WHITE)
    }

    /// Stroke a path through `points` with round caps and joins
    pub fn draw_freehand(&mut self, points: &[Pos2], color: Color32) {
        if points.is_empty() {
            return;
        }
        self.stroke_color = color;
        let width = self.config.line_width;
        let mut shapes = Vec::with_capacity(points.len() + 1);
        if points.len() > 1 {
            shapes.push(Shape::line(points.to_vec(), Stroke::new(width, color)));
        }
        // Discs at every vertex give the rounded caps and joins.
        shapes.extend(
            points
                .iter()
                .map(|&p| Shape::circle_filled(p, width / 2.0, color)),
        );
        self.paint(shapes);
    }

    /// Outline of the axis-aligned rectangle spanned by two opposite corners
    pub fn draw_rectangle(&mut self, corner1: Pos2, corner2: Pos2, color: Color32) {
        self.stroke_color = color;
        let rect = Rect::from_two_pos(corner1, corner2);
        let stroke = Stroke::new(self.config.line_width, color);
        self.paint(vec![Shape::rect_stroke(rect, 0.0, stroke)]);
    }

    /// Circle outline centered at `center` passing through `edge`
    pub fn draw_circle(&mut self, center: Pos2, edge: Pos2, color: Color32) {
        self.stroke_color = color;
        let radius = center.distance(edge);
        let stroke = Stroke::new(self.config.line_width, color);
        self.paint(vec![Shape::circle_stroke(center, radius, stroke)]);
    }

    /// Render `text` with its baseline-left corner at `position`
    pub fn draw_text(&mut self, position: Pos2, text: &str, color: Color32) {
        if text.is_empty() {
            return;
        }
        let font = FontId::proportional(self.config.font_size);
        let shape = Shape::text(&self.fonts, position, Align2::LEFT_BOTTOM, text, font, color);
        self.paint(vec![shape]);
    }

    fn paint(&mut self, shapes: Vec<Shape>) {
        let mut tessellator = Tessellator::new(
            1.0,
            TessellationOptions::default(),
            self.fonts.font_image_size(),
            Vec::new(),
        );
        let mut mesh = Mesh::default();
        for shape in shapes {
            tessellator.tessellate_shape(shape, &mut mesh);
        }
        // Fetched after tessellation so glyphs laid out for this call are in the atlas.
        let atlas = self.fonts.image();
        rasterize::fill_mesh(&mut self.pixels, &mesh, &atlas);
        self.touch();
    }

    /// Lossless PNG of the current raster
    pub fn export_image(&self) -> Result<Vec<u8>, SurfaceError> {
        encode(&self.pixels, SnapshotEncoding::Png)
    }

    /// Encoded copy for the history buffer
    pub fn export_snapshot(&self, encoding: SnapshotEncoding) -> Result<Vec<u8>, SurfaceError> {
        encode(&self.pixels, encoding)
    }

    /// Clear to white, then draw the decoded `image` at the origin
    pub fn restore_from(&mut self, image: &RgbaImage) {
        self.clear();
        image::imageops::overlay(&mut self.pixels, image, 0, 0);
        self.touch();
    }

    /// Pixels in the form egui textures take
    pub fn to_color_image(&self) -> ColorImage {
        ColorImage::from_rgba_unmultiplied(self.size(), self.pixels.as_raw())
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

pub(crate) fn encode(pixels: &RgbaImage, encoding: SnapshotEncoding) -> Result<Vec<u8>, SurfaceError> {
    let mut bytes = Vec::new();
    match encoding {
        SnapshotEncoding::Png => pixels
            .write_with_encoder(PngEncoder::new(&mut bytes))
            .map_err(SurfaceError::Encode)?,
        SnapshotEncoding::Jpeg { quality } => {
            // JPEG has no alpha channel; the surface is always opaque anyway.
            let rgb = DynamicImage::ImageRgba8(pixels.clone()).to_rgb8();
            rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100)))
                .map_err(SurfaceError::Encode)?;
        }
    }
    Ok(bytes)
}

pub(crate) fn decode(bytes: &[u8]) -> Result<RgbaImage, SurfaceError> {
    let image = image::load_from_memory(bytes).map_err(SurfaceError::Decode)?;
    Ok(image.to_rgba8())
}
