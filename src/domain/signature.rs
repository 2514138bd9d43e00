//! Freehand signature capture surface.
//!
//! The surface works in logical units and keeps a backing RGBA raster that is
//! `pixel_ratio` times larger so strokes stay crisp on dense displays.

use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{imageops, imageops::FilterType, ImageFormat, Rgba, RgbaImage};

use super::errors::{ClientError, ClientResult};

const INK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const DEFAULT_LINE_WIDTH: f32 = 2.0;
const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// A point in logical surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Pointer or touch input delivered to the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Point),
    Move(Point),
    Up,
    Leave,
    Cancel,
}

/// Whether the surface consumed an event.
///
/// `Captured` events belong to a stroke and must not be forwarded to
/// scrolling, zooming or focus navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerResponse {
    Captured,
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    Drawing,
}

#[derive(Debug, Clone)]
pub struct SignatureCapture {
    width: u32,
    height: u32,
    pixel_ratio: f32,
    line_width: f32,
    raster: RgbaImage,
    state: CaptureState,
    last_point: Option<Point>,
}

fn backing_size(logical: u32, pixel_ratio: f32) -> u32 {
    if logical == 0 {
        return 0;
    }
    ((logical as f32 * pixel_ratio).round() as u32).max(1)
}

impl SignatureCapture {
    pub fn new(width: u32, height: u32, pixel_ratio: f32) -> Self {
        let pixel_ratio = if pixel_ratio > 0.0 { pixel_ratio } else { 1.0 };
        Self {
            width,
            height,
            pixel_ratio,
            line_width: DEFAULT_LINE_WIDTH,
            raster: RgbaImage::new(backing_size(width, pixel_ratio), backing_size(height, pixel_ratio)),
            state: CaptureState::Idle,
            last_point: None,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn is_drawing(&self) -> bool {
        self.state == CaptureState::Drawing
    }

    pub fn raster(&self) -> &RgbaImage {
        &self.raster
    }

    fn contains(&self, point: Point) -> bool {
        point.x >= 0.0
            && point.y >= 0.0
            && point.x <= self.width as f32
            && point.y <= self.height as f32
    }

    /// Feeds one pointer event through the idle/drawing state machine.
    pub fn handle(&mut self, event: PointerEvent) -> PointerResponse {
        match (self.state, event) {
            (CaptureState::Idle, PointerEvent::Down(point)) => {
                if !self.contains(point) {
                    return PointerResponse::Ignored;
                }
                self.state = CaptureState::Drawing;
                self.last_point = Some(point);
                PointerResponse::Captured
            }
            (CaptureState::Drawing, PointerEvent::Down(point)) => {
                // a second press without a release restarts the stroke
                self.last_point = Some(point);
                PointerResponse::Captured
            }
            (CaptureState::Drawing, PointerEvent::Move(point)) => {
                if let Some(last) = self.last_point {
                    self.draw_segment(last, point);
                }
                self.last_point = Some(point);
                PointerResponse::Captured
            }
            (CaptureState::Drawing, PointerEvent::Up | PointerEvent::Leave | PointerEvent::Cancel) => {
                self.state = CaptureState::Idle;
                self.last_point = None;
                PointerResponse::Captured
            }
            (CaptureState::Idle, _) => PointerResponse::Ignored,
        }
    }

    /// Rasterizes a round-capped segment in logical coordinates.
    fn draw_segment(&mut self, from: Point, to: Point) {
        if from == to {
            return;
        }
        let (w, h) = self.raster.dimensions();
        if w == 0 || h == 0 {
            return;
        }

        let ratio = self.pixel_ratio;
        let (ax, ay) = (from.x * ratio, from.y * ratio);
        let (bx, by) = (to.x * ratio, to.y * ratio);
        let radius = (self.line_width * ratio / 2.0).max(0.5);
        let radius_sq = radius * radius;

        let min_x = (ax.min(bx) - radius).floor().max(0.0) as u32;
        let min_y = (ay.min(by) - radius).floor().max(0.0) as u32;
        let max_x = ((ax.max(bx) + radius).ceil().max(0.0) as u32).min(w - 1);
        let max_y = ((ay.max(by) + radius).ceil().max(0.0) as u32).min(h - 1);

        let (dx, dy) = (bx - ax, by - ay);
        let len_sq = dx * dx + dy * dy;

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;
                let t = (((px - ax) * dx + (py - ay) * dy) / len_sq).clamp(0.0, 1.0);
                let cx = ax + t * dx;
                let cy = ay + t * dy;
                if (px - cx).powi(2) + (py - cy).powi(2) <= radius_sq {
                    self.raster.put_pixel(x, y, INK);
                }
            }
        }
    }

    /// Resets the surface to fully transparent and ends any stroke.
    pub fn clear(&mut self) {
        let (w, h) = self.raster.dimensions();
        self.raster = RgbaImage::new(w, h);
        self.state = CaptureState::Idle;
        self.last_point = None;
    }

    /// Resizes the surface, redrawing existing ink scaled to the new size.
    pub fn resize(&mut self, width: u32, height: u32, pixel_ratio: f32) {
        let pixel_ratio = if pixel_ratio > 0.0 { pixel_ratio } else { self.pixel_ratio };
        if width == self.width && height == self.height && pixel_ratio == self.pixel_ratio {
            return;
        }

        let snapshot = if self.is_empty() { None } else { Some(self.raster.clone()) };
        let new_w = backing_size(width, pixel_ratio);
        let new_h = backing_size(height, pixel_ratio);

        self.raster = match snapshot {
            Some(previous) if new_w > 0 && new_h > 0 => {
                imageops::resize(&previous, new_w, new_h, FilterType::Triangle)
            }
            _ => RgbaImage::new(new_w, new_h),
        };
        self.width = width;
        self.height = height;
        self.pixel_ratio = pixel_ratio;
        if let Some(last) = self.last_point {
            if !self.contains(last) {
                self.last_point = None;
            }
        }
    }

    /// True when every pixel is fully transparent.
    pub fn is_empty(&self) -> bool {
        self.raster.pixels().all(|pixel| pixel[3] == 0)
    }

    /// Whether any ink falls inside the logical unit cell at `(x, y)`.
    pub fn is_inked(&self, x: u32, y: u32) -> bool {
        let (w, h) = self.raster.dimensions();
        let ratio = self.pixel_ratio;
        let x0 = (x as f32 * ratio).floor() as u32;
        let y0 = (y as f32 * ratio).floor() as u32;
        let x1 = (((x + 1) as f32 * ratio).ceil() as u32).min(w);
        let y1 = (((y + 1) as f32 * ratio).ceil() as u32).min(h);

        (y0..y1).any(|py| (x0..x1).any(|px| self.raster.get_pixel(px, py)[3] != 0))
    }

    /// PNG data URI of the surface, or `None` when nothing was drawn.
    pub fn export(&self) -> ClientResult<Option<String>> {
        if self.is_empty() {
            return Ok(None);
        }

        let mut png = Vec::new();
        self.raster
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|e| ClientError::Signature(e.to_string()))?;

        Ok(Some(format!("{}{}", PNG_DATA_URI_PREFIX, STANDARD.encode(&png))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stroke(pad: &mut SignatureCapture, from: (f32, f32), to: (f32, f32)) {
        pad.handle(PointerEvent::Down(Point::new(from.0, from.1)));
        pad.handle(PointerEvent::Move(Point::new(to.0, to.1)));
        pad.handle(PointerEvent::Up);
    }

    #[test]
    fn test_new_surface_is_empty() {
        let pad = SignatureCapture::new(40, 20, 2.0);
        assert!(pad.is_empty());
        assert_eq!(pad.raster().dimensions(), (80, 40));
        assert_eq!(pad.state(), CaptureState::Idle);
    }

    #[test]
    fn test_stroke_marks_surface() {
        let mut pad = SignatureCapture::new(40, 20, 2.0);
        stroke(&mut pad, (5.0, 5.0), (30.0, 12.0));
        assert!(!pad.is_empty());
        assert!(pad.is_inked(5, 5));
        assert!(!pad.is_inked(38, 1));
    }

    #[test]
    fn test_press_without_move_draws_nothing() {
        let mut pad = SignatureCapture::new(40, 20, 1.0);
        pad.handle(PointerEvent::Down(Point::new(10.0, 10.0)));
        pad.handle(PointerEvent::Move(Point::new(10.0, 10.0)));
        pad.handle(PointerEvent::Up);
        assert!(pad.is_empty());
    }

    #[test]
    fn test_state_transitions() {
        let mut pad = SignatureCapture::new(40, 20, 1.0);
        assert_eq!(pad.handle(PointerEvent::Move(Point::new(1.0, 1.0))), PointerResponse::Ignored);
        assert_eq!(pad.handle(PointerEvent::Down(Point::new(1.0, 1.0))), PointerResponse::Captured);
        assert!(pad.is_drawing());
        assert_eq!(pad.handle(PointerEvent::Move(Point::new(4.0, 4.0))), PointerResponse::Captured);
        assert_eq!(pad.handle(PointerEvent::Leave), PointerResponse::Captured);
        assert!(!pad.is_drawing());

        // moves after leaving do not draw
        let before = pad.raster().clone();
        pad.handle(PointerEvent::Move(Point::new(30.0, 15.0)));
        assert_eq!(pad.raster(), &before);
    }

    #[test]
    fn test_touch_cancel_ends_stroke() {
        let mut pad = SignatureCapture::new(40, 20, 1.0);
        pad.handle(PointerEvent::Down(Point::new(1.0, 1.0)));
        pad.handle(PointerEvent::Cancel);
        assert_eq!(pad.state(), CaptureState::Idle);
    }

    #[test]
    fn test_press_outside_surface_is_ignored() {
        let mut pad = SignatureCapture::new(10, 10, 1.0);
        assert_eq!(pad.handle(PointerEvent::Down(Point::new(15.0, 2.0))), PointerResponse::Ignored);
        assert_eq!(pad.state(), CaptureState::Idle);
    }

    #[test]
    fn test_clear_empties_and_idles() {
        let mut pad = SignatureCapture::new(40, 20, 2.0);
        pad.handle(PointerEvent::Down(Point::new(2.0, 2.0)));
        pad.handle(PointerEvent::Move(Point::new(20.0, 10.0)));
        pad.clear();
        assert!(pad.is_empty());
        assert_eq!(pad.state(), CaptureState::Idle);
    }

    #[test]
    fn test_resize_before_drawing_stays_empty() {
        let mut pad = SignatureCapture::new(40, 20, 2.0);
        pad.resize(60, 30, 2.0);
        assert!(pad.is_empty());
        assert_eq!(pad.raster().dimensions(), (120, 60));
    }

    #[test]
    fn test_resize_preserves_scaled_ink() {
        let mut pad = SignatureCapture::new(20, 10, 1.0);
        stroke(&mut pad, (2.0, 5.0), (18.0, 5.0));
        pad.resize(40, 20, 2.0);

        assert_eq!((pad.width(), pad.height()), (40, 20));
        assert_eq!(pad.raster().dimensions(), (80, 40));
        assert!(!pad.is_empty());
        // the horizontal line now sits at twice the logical position
        assert!(pad.is_inked(20, 10));
        assert!(!pad.is_inked(20, 1));
    }

    #[test]
    fn test_resize_to_zero_is_empty() {
        let mut pad = SignatureCapture::new(20, 10, 1.0);
        stroke(&mut pad, (2.0, 5.0), (18.0, 5.0));
        pad.resize(0, 0, 1.0);
        assert!(pad.is_empty());
    }

    #[test]
    fn test_export_empty_is_none() {
        let pad = SignatureCapture::new(40, 20, 2.0);
        assert_eq!(pad.export().unwrap(), None);
    }

    #[test]
    fn test_export_produces_png_data_uri() {
        let mut pad = SignatureCapture::new(40, 20, 1.0);
        stroke(&mut pad, (5.0, 5.0), (30.0, 12.0));

        let uri = pad.export().unwrap().unwrap();
        assert!(uri.starts_with(PNG_DATA_URI_PREFIX));

        let png = STANDARD.decode(&uri[PNG_DATA_URI_PREFIX.len()..]).unwrap();
        let decoded = image::load_from_memory_with_format(&png, ImageFormat::Png)
            .unwrap()
            .to_rgba8();
        assert_eq!(&decoded, pad.raster());
    }
}
